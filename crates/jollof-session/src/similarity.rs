use serde::{Deserialize, Serialize};

/// Cosine similarity of two embeddings
///
/// Empty inputs and zero-norm vectors score 0. Components missing from the
/// shorter vector count as 0 in the dot product.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    let norm_a = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// A candidate with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scored<T> {
    pub item: T,
    pub score: f64,
}

/// Top `k` candidates by similarity, highest first
///
/// Candidates without an embedding score 0. Ties keep input order.
pub fn rank_top_k<T, F>(query: &[f32], candidates: Vec<T>, embedding: F, k: usize) -> Vec<Scored<T>>
where
    F: Fn(&T) -> Option<&[f32]>,
{
    let mut scored: Vec<Scored<T>> = candidates
        .into_iter()
        .map(|item| {
            let score = embedding(&item)
                .map(|e| cosine_similarity(query, e))
                .unwrap_or(0.0);
            Scored { item, score }
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k);
    scored
}
