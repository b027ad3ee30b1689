use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Tuning values for one road generation run.
///
/// The defaults reproduce the classic town generator. Network shape is
/// sensitive to the density and jitter values, so change them with care.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How much a road is shortened per retry when its end is invalid.
    pub shrink_step: i32,
    /// A road that would need shortening at or below this length is dropped.
    pub min_length: i32,

    /// Lower clamp for the branching density.
    pub density_min: i32,
    /// Upper clamp for the branching density.
    pub density_max: i32,
    /// Branch-delay jitter is only drawn when density exceeds this value.
    pub jitter_density_threshold: i32,
    /// Inclusive lower bound of the jitter draw. Negative draws prune the branch.
    pub jitter_min: i32,
    /// Exclusive upper bound of the jitter draw.
    pub jitter_max: i32,
    /// Number of branch slots tried at every committed road end.
    pub branch_slots: usize,

    /// Hard cap on scheduler steps for a single run.
    pub max_steps: usize,
    /// Runs producing this many roads or fewer count as degenerate.
    pub sparse_threshold: usize,
    /// Maximum number of full re-runs when a result is degenerate.
    pub max_attempts: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shrink_step: 10,
            min_length: 10,
            density_min: 50,
            density_max: 500,
            jitter_density_threshold: 200,
            jitter_min: -2,
            jitter_max: 8,
            branch_slots: 3,
            max_steps: 1_000_000,
            sparse_threshold: 50,
            max_attempts: 100,
        }
    }
}

/// Derives a seed from the wall clock, for runs that are not meant to be
/// reproducible.
pub fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_jitter_range_prunes_two_in_ten() {
        let cfg = Config::default();
        let span = cfg.jitter_max - cfg.jitter_min;
        let negative = (cfg.jitter_min..cfg.jitter_max).filter(|j| *j < 0).count();
        assert_eq!(span, 10);
        assert_eq!(negative, 2);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "max_steps": 42 }"#).unwrap();
        assert_eq!(cfg.max_steps, 42);
        assert_eq!(cfg.shrink_step, Config::default().shrink_step);
    }
}
