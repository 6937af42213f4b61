use thiserror::Error;

use crate::core::gallery::Gallery;

#[derive(Debug, Error, PartialEq)]
pub enum MatchError {
    #[error("Feature vector has {actual} dimensions, gallery expects {expected}")]
    Dimension { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Matched {
        identity_id: String,
        display_name: String,
        confidence: f32,
        distance: f32,
    },
    Unmatched,
}

impl MatchResult {
    pub fn detected_but_unmatched(&self) -> bool {
        matches!(self, MatchResult::Unmatched)
    }
}

/// Nearest-neighbour identity matching under a distance tolerance.
///
/// Pure: the result depends only on the observed vector, the gallery and the
/// tolerance.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    tolerance: f32,
}

impl Matcher {
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }

    /// Returns the eligible record with the smallest distance to `observed`.
    ///
    /// A record is eligible when its distance is at most the tolerance. On
    /// equal distances the record that comes first in gallery order wins.
    /// Confidence is `1 - distance` clamped to `[0, 1]`.
    pub fn best_match(&self, observed: &[f32], gallery: &Gallery) -> Result<MatchResult, MatchError> {
        if gallery.is_empty() {
            return Ok(MatchResult::Unmatched);
        }
        if observed.len() != gallery.dimension() {
            return Err(MatchError::Dimension {
                expected: gallery.dimension(),
                actual: observed.len(),
            });
        }

        let mut best: Option<(usize, f32)> = None;
        for (index, record) in gallery.records().iter().enumerate() {
            let distance = euclidean_distance(observed, &record.feature_vector);
            // NaN never passes this check.
            if !(distance <= self.tolerance) {
                continue;
            }
            // Strict comparison keeps the earliest record on ties.
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((index, distance));
            }
        }

        Ok(match best {
            Some((index, distance)) => {
                let record = &gallery.records()[index];
                MatchResult::Matched {
                    identity_id: record.identity_id.clone(),
                    display_name: record.display_name.clone(),
                    confidence: (1.0 - distance).clamp(0.0, 1.0),
                    distance,
                }
            }
            None => MatchResult::Unmatched,
        })
    }
}

pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
