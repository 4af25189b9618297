use std::io::Read;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use prompt_rag::config::Config;
use prompt_rag::models::EnhanceRequest;
use prompt_rag::RagEnhancer;

/// Reads an `EnhanceRequest` JSON document on stdin and prints the resulting
/// system prompt on stdout.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only the prompt.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env();
    tracing::info!("Retrieval API: {:?}", config.retrieval.api);

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read request from stdin")?;
    let req: EnhanceRequest =
        serde_json::from_str(&input).context("Failed to parse request JSON")?;

    let enhancer = RagEnhancer::from_config(&config);
    let model = req.selected_model.as_deref().unwrap_or(&config.default_model);

    let prompt = enhancer
        .enhance_prompt_with_rag(&req.system_prompt, &req.messages, &req.request_hints, model)
        .await;

    println!("{prompt}");
    Ok(())
}
