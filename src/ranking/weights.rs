/// Intent-driven weight resolution
///
/// Maps a free-form intent label to a normalized weight vector over the four
/// ranking signals. Resolution is two-level: exact profile-name match first,
/// then substring heuristics, then the default profile. The profile table is
/// an immutable value passed in at construction — tests can substitute
/// alternate tables without touching global state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Weights over the four ranking signals.
///
/// Raw profiles in a `WeightProfiles` table are unnormalized; the vector
/// returned by `WeightProfiles::resolve` always sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights {
    pub similarity: f64,
    pub doc_quality: f64,
    pub recency: f64,
    pub popularity: f64,
}

impl SignalWeights {
    pub fn new(similarity: f64, doc_quality: f64, recency: f64, popularity: f64) -> Self {
        SignalWeights {
            similarity,
            doc_quality,
            recency,
            popularity,
        }
    }

    pub fn sum(&self) -> f64 {
        self.similarity + self.doc_quality + self.recency + self.popularity
    }

    /// Divide each weight by the profile sum. A zero-sum profile is treated
    /// as sum 1.0 so the result stays finite.
    pub fn normalized(&self) -> SignalWeights {
        let s = match self.sum() {
            s if s == 0.0 => 1.0,
            s => s,
        };
        SignalWeights {
            similarity: self.similarity / s,
            doc_quality: self.doc_quality / s,
            recency: self.recency / s,
            popularity: self.popularity / s,
        }
    }
}

/// Immutable table of named raw weight profiles.
#[derive(Debug, Clone)]
pub struct WeightProfiles {
    profiles: HashMap<String, SignalWeights>,
}

impl WeightProfiles {
    /// The built-in profile set: recommend, latest, popular, reliable, default.
    pub fn builtin() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert("recommend".to_string(), SignalWeights::new(4.0, 3.0, 1.0, 2.0));
        profiles.insert("latest".to_string(), SignalWeights::new(2.0, 1.0, 5.0, 1.0));
        profiles.insert("popular".to_string(), SignalWeights::new(2.5, 1.5, 1.0, 5.0));
        profiles.insert("reliable".to_string(), SignalWeights::new(3.0, 5.0, 1.0, 1.0));
        profiles.insert("default".to_string(), SignalWeights::new(4.0, 3.0, 1.0, 2.0));
        WeightProfiles { profiles }
    }

    /// Build a table from arbitrary named profiles (primarily for tests).
    pub fn new(profiles: HashMap<String, SignalWeights>) -> Self {
        WeightProfiles { profiles }
    }

    /// Resolve an intent label to a normalized weight vector.
    ///
    /// Exact match against the profile table wins; otherwise substring
    /// heuristics pick the closest profile in priority order; an empty or
    /// unrecognized intent degrades to "recommend" / "default". The returned
    /// vector always sums to 1.0.
    pub fn resolve(&self, intent: Option<&str>) -> SignalWeights {
        let intent_l = intent.unwrap_or("").trim().to_lowercase();

        let base = self.profiles.get(&intent_l).copied().unwrap_or_else(|| {
            let name = if intent_l.contains("latest") {
                "latest"
            } else if intent_l.contains("popular") || intent_l.contains("trend") {
                "popular"
            } else if intent_l.contains("reliab") || intent_l.contains("quality") {
                "reliable"
            } else if intent_l.contains("recommend") || intent_l.is_empty() {
                "recommend"
            } else {
                "default"
            };
            self.fallback_profile(name)
        });

        base.normalized()
    }

    /// Look up a fallback profile by name, degrading to "default" and then to
    /// uniform weights when a substituted table is missing entries.
    fn fallback_profile(&self, name: &str) -> SignalWeights {
        self.profiles
            .get(name)
            .or_else(|| self.profiles.get("default"))
            .copied()
            .unwrap_or_else(|| SignalWeights::new(1.0, 1.0, 1.0, 1.0))
    }
}

impl Default for WeightProfiles {
    fn default() -> Self {
        WeightProfiles::builtin()
    }
}
