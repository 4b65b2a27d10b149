pub mod scorer;
pub mod signals;
pub mod weights;

// Re-export key types for convenience
pub use scorer::{HybridScorer, RankOutput, RankedRecord};
pub use weights::{SignalWeights, WeightProfiles};
