//! Post-query candidate filtering.
//!
//! The index returns candidates already ordered by descending similarity;
//! this stage applies the similarity floor and the final top-N cap without
//! ever re-ordering them.

use uuid::Uuid;

use crate::models::Candidate;

/// Keep candidates whose score meets the inclusive `min_score` floor, up to
/// `top_n` identifiers, preserving the input order.
///
/// Accumulation stops once `top_n` identifiers are kept; later candidates are
/// not evaluated. This short-circuit is safe because the input is already
/// ranked by descending score. Fewer than `top_n` survivors (including none)
/// is a valid outcome, not an error.
pub fn rank_candidates(candidates: &[Candidate], min_score: f32, top_n: usize) -> Vec<Uuid> {
    let mut kept = Vec::with_capacity(top_n.min(candidates.len()));

    for candidate in candidates {
        if kept.len() >= top_n {
            break;
        }

        if candidate.score >= min_score {
            kept.push(candidate.id);
        } else {
            tracing::debug!(
                id = %candidate.id,
                score = candidate.score,
                threshold = min_score,
                "candidate below similarity threshold, skipping"
            );
        }
    }

    kept
}
