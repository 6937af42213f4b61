// src/core/matching/mod.rs
mod matcher;

pub use matcher::{euclidean_distance, MatchError, MatchResult, Matcher};
