//! Scoring engine: pure signal folding plus the agent that keeps one
//! running score per user and signal kind.

pub mod agent;
pub mod score;

pub use agent::ScoringAgent;
pub use score::{probability_of, SketchyScore, HALF_LIFE, PRIOR};
