//! Similarity computation for embeddings.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Compute the cosine similarity between two embeddings.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical direction
/// - 0.0 means orthogonal, or no comparison possible
/// - -1.0 means opposite direction
///
/// Vectors of different lengths score 0.0, as do empty and zero-magnitude
/// vectors.
///
/// Each vector is first scaled by its largest absolute component, so very
/// large components do not overflow.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let scale_a = max_abs(a);
    let scale_b = max_abs(b);
    if scale_a == 0.0 || scale_b == 0.0 {
        return 0.0;
    }

    let dot_product: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x / scale_a) * (y / scale_b))
        .sum();
    let magnitude_a: f64 = a.iter().map(|x| (x / scale_a).powi(2)).sum::<f64>().sqrt();
    let magnitude_b: f64 = b.iter().map(|x| (x / scale_b).powi(2)).sum::<f64>().sqrt();

    dot_product / (magnitude_a * magnitude_b)
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}

/// Compute the average of multiple embeddings.
///
/// No embeddings yields an empty vector, meaning "no embedding could be
/// computed". All inputs must share the first one's length.
pub fn average(embeddings: &[Embedding]) -> Result<Embedding> {
    let Some(first) = embeddings.first() else {
        return Ok(Vec::new());
    };

    let dim = first.len();
    if let Some(bad) = embeddings.iter().find(|e| e.len() != dim) {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dim,
            actual: bad.len(),
        });
    }

    let n = embeddings.len() as f64;
    let mut result = vec![0.0f64; dim];

    for embedding in embeddings {
        for (acc, val) in result.iter_mut().zip(embedding.iter()) {
            *acc += val;
        }
    }
    for acc in &mut result {
        *acc /= n;
    }

    Ok(result)
}

/// Normalize an embedding to unit length.
///
/// A zero vector is left unchanged.
pub fn normalize(embedding: &mut Embedding) {
    let magnitude: f64 = embedding.iter().map(|x| x * x).sum::<f64>().sqrt();
    if magnitude > 0.0 {
        for x in embedding.iter_mut() {
            *x /= magnitude;
        }
    }
}

/// A ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult<T> {
    /// The ranked item.
    pub item: T,

    /// Similarity to the query, `None` when the candidate carries no signal.
    pub score: Option<f64>,
}

/// Find the top-k candidates most similar to `query`.
///
/// Candidates whose embedding is absent or empty, or whose score is not
/// finite, get a `None` score and sort after every scored candidate.
/// The sort is stable: equal scores keep their input order.
pub fn find_top_k<'a, T, I>(query: &[f64], candidates: I, k: usize) -> Vec<SimilarityResult<T>>
where
    I: IntoIterator<Item = (T, Option<&'a [f64]>)>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<SimilarityResult<T>> = candidates
        .into_iter()
        .map(|(item, embedding)| {
            let score = embedding
                .filter(|e| !e.is_empty())
                .map(|e| cosine_similarity(query, e))
                .filter(|s| s.is_finite());
            SimilarityResult { item, score }
        })
        .collect();

    // `None < Some(_)`, so reversing puts unscored candidates last.
    scored.sort_by_key(|r| Reverse(r.score.map(OrderedFloat)));
    scored.truncate(k);
    scored
}
