//! Top-1 selection over classifier scores, restricted to labels with metadata.

use herbpedia_core::{ClassificationResult, PlantInfo, PlantMetadata};

use crate::labels::LabelSet;

/// Pick the highest-scoring label that has a metadata entry and enrich it.
///
/// Scores are paired with labels by position. Only strictly greater scores
/// replace the current best, so exact ties go to the label that comes first
/// in the label set, and a score must be above zero to be selected at all.
/// NaN never wins. Returns `None` when no known label scores above zero.
pub fn select(
    scores: &[f32],
    labels: &LabelSet,
    metadata: &PlantMetadata,
) -> Option<ClassificationResult> {
    let mut best: Option<(&str, &PlantInfo, f32)> = None;

    for (label, &score) in labels.iter().zip(scores) {
        let Some(info) = metadata.get(label) else {
            continue;
        };
        let best_score = best.map_or(0.0, |(_, _, s)| s);
        if score > best_score {
            best = Some((label, info, score));
        }
    }

    best.map(|(label, info, score)| ClassificationResult::enrich(label, score, info))
}

/// All `(label, score)` pairs sorted by descending score, ties in label order.
/// NaN scores sort last.
pub fn ranked<'a>(scores: &[f32], labels: &'a LabelSet) -> Vec<(&'a str, f32)> {
    let mut pairs: Vec<(&str, f32)> = labels.iter().zip(scores.iter().copied()).collect();
    pairs.sort_by(|a, b| rank_key(b.1).total_cmp(&rank_key(a.1)));
    pairs
}

fn rank_key(score: f32) -> f32 {
    if score.is_nan() { f32::NEG_INFINITY } else { score }
}
