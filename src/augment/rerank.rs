use std::cmp::Ordering;

use crate::models::RetrievalResult;

/// Put results that quote the query verbatim (case-insensitive) first, then
/// order by descending score. Missing scores count as 0. The sort is stable.
pub fn rerank_results(query: &str, results: Vec<RetrievalResult>) -> Vec<RetrievalResult> {
    let needle = query.to_lowercase();

    let mut keyed: Vec<(bool, RetrievalResult)> = results
        .into_iter()
        .map(|r| (r.content.to_lowercase().contains(&needle), r))
        .collect();

    keyed.sort_by(|(a_contains, a), (b_contains, b)| {
        b_contains.cmp(a_contains).then_with(|| {
            let a_score = a.score.unwrap_or(0.0);
            let b_score = b.score.unwrap_or(0.0);
            b_score.partial_cmp(&a_score).unwrap_or(Ordering::Equal)
        })
    });

    keyed.into_iter().map(|(_, r)| r).collect()
}
