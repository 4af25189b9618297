use crate::models::{FormatOptions, RetrievalResult};

/// Chat-template control tokens that must never reach the model from
/// retrieved text.
const CONTROL_TOKENS: &[&str] = &[
    "<|im_start|>",
    "<|im_end|>",
    "<|endoftext|>",
    "<|system|>",
    "<|user|>",
    "<|assistant|>",
];

/// Strip chat-template control tokens from `text`.
pub fn sanitize_for_prompt(text: &str) -> String {
    let mut out = text.to_string();
    for token in CONTROL_TOKENS {
        if out.contains(token) {
            out = out.replace(token, "");
        }
    }
    out
}

/// Keep at most `max_chars` characters, marking the cut with `...`.
pub fn truncate_to_char_boundary(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &s[..cut]),
        None => s.to_string(),
    }
}

/// Render results as numbered documents separated by blank lines.
/// Returns an empty string when there is nothing to render.
pub fn format_retrieved_context(results: &[RetrievalResult]) -> String {
    format_retrieved_context_with(results, &FormatOptions::default())
}

/// [`format_retrieved_context`] honoring per-request format options.
pub fn format_retrieved_context_with(results: &[RetrievalResult], options: &FormatOptions) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| format_document(i + 1, r, options))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_document(index: usize, result: &RetrievalResult, options: &FormatOptions) -> String {
    let content = sanitize_for_prompt(&result.content);
    let content = match options.max_chars_per_doc {
        Some(max) => truncate_to_char_boundary(&content, max),
        None => content,
    };
    let hide_source = options.hide_source.unwrap_or(false);
    let (source, date) = provenance(result);
    let relevance = result.score.map(|s| (s * 100.0).round() as i64);

    if let Some(template) = options.template.as_deref() {
        let (source, date) = if hide_source { ("", "") } else { (source, date) };
        return template
            .replace("{index}", &index.to_string())
            .replace("{source}", source)
            .replace("{date}", date)
            .replace("{score}", &relevance.map_or_else(|| "N/A".to_string(), |p| p.to_string()))
            .replace("{content}", &content);
    }

    let mut doc = format!("[Document {index}]:\n{content}");
    if !hide_source {
        doc.push_str(&source_line(source, date));
    }
    doc.push_str(&match relevance {
        Some(percent) => format!("\nRelevance: {percent}%"),
        None => "\nRelevance: N/A".to_string(),
    });
    doc
}

fn source_line(source: &str, date: &str) -> String {
    if date.is_empty() {
        format!("\nSource: {source}")
    } else {
        format!("\nSource: {source} ({date})")
    }
}

fn provenance(result: &RetrievalResult) -> (&str, &str) {
    match &result.metadata {
        Some(meta) => {
            let source = if meta.source.is_empty() {
                "Unknown source"
            } else {
                meta.source.as_str()
            };
            (source, meta.date.as_str())
        }
        None => ("Unknown source", ""),
    }
}
