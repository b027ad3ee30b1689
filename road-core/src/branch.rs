//! Proposes new candidate roads branching off a committed road.
//!
//! Branching never looks at the network; everything it proposes is checked
//! later by [`crate::constraints::validate`].

use crate::{
    config::Config,
    geometry::RoadSegment,
    types::{BranchDelay, Point},
};
use rand::Rng;

/// A road proposed for growth together with its scheduling priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub segment: RoadSegment,
    pub branch_delay: BranchDelay,
}

impl Candidate {
    pub fn new(segment: RoadSegment, branch_delay: BranchDelay) -> Self {
        Self {
            segment,
            branch_delay,
        }
    }
}

/// Branching density at `end`: the truncated distance to `reference`,
/// clamped into `[cfg.density_min, cfg.density_max]`.
///
/// Density bounds the length of new branches and, above
/// `cfg.jitter_density_threshold`, enables random pruning.
pub fn density(end: Point, reference: Point, cfg: &Config) -> i32 {
    let distance = (end - reference).as_dvec2().length() as i32;
    distance.max(cfg.density_min).min(cfg.density_max)
}

/// Proposes up to `cfg.branch_slots` children starting at the end of
/// `parent`.
///
/// For each slot, in this order:
/// 1. draw a delay jitter (only when the density is above the threshold,
///    otherwise it is `0`); a negative jitter drops the slot,
/// 2. turn the parent's angle by a random multiple of 90°,
/// 3. draw a length in `[-density/4, density - density/4)`.
///
/// Children inherit the parent's width and get
/// `parent.branch_delay + 1 + jitter` as their delay.
///
/// ### Parameters
/// - `parent` - The candidate that was just committed.
/// - `reference` - Point the density is measured from, usually the map center.
/// - `cfg` - Density and jitter settings.
/// - `rng` - Source of randomness for this run.
pub fn branch(
    parent: &Candidate,
    reference: Point,
    cfg: &Config,
    rng: &mut impl Rng,
) -> Vec<Candidate> {
    let child_delay = parent.branch_delay + 1;
    let start = parent.segment.end();
    let density = density(start, reference, cfg);

    // An empty jitter range degrades to always drawing `jitter_min`.
    let jitter_max = cfg.jitter_max.max(cfg.jitter_min.saturating_add(1));

    let mut children = Vec::with_capacity(cfg.branch_slots);
    for _ in 0..cfg.branch_slots {
        let jitter = if density > cfg.jitter_density_threshold {
            rng.random_range(cfg.jitter_min..jitter_max)
        } else {
            0
        };
        if jitter < 0 {
            continue;
        }

        let turn = 90 * rng.random_range(0..4);
        let length = rng.random_range(0..density.max(1)) - density / 4;

        let segment = RoadSegment::new(
            start,
            length,
            parent.segment.angle + turn,
            parent.segment.width,
        );
        children.push(Candidate::new(segment, child_delay + jitter));
    }
    children
}
