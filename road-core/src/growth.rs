//! Priority-driven growth of the road network.
//!
//! [`RoadGrowth`] keeps a min-heap of candidates keyed by branch delay.
//! Each step pops the most urgent candidate and validates it against the
//! roads committed so far. Accepted roads are appended to the network and
//! branch into new candidates; rejected ones are dropped without children.
//! A run ends when the queue is empty.

use crate::{
    branch::{self, Candidate},
    config::Config,
    constraints::{self, Rejection},
    geometry::{Rect, RoadSegment},
    types::{BranchDelay, Point},
};
use log::{debug, info, warn};
use rand::Rng;
use std::{cmp::Ordering, collections::BinaryHeap, ops::Deref};

/// The committed roads of a finished run, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Network {
    roads: Vec<RoadSegment>,
}

impl Network {
    pub fn as_slice(&self) -> &[RoadSegment] {
        &self.roads
    }

    pub fn into_vec(self) -> Vec<RoadSegment> {
        self.roads
    }
}

impl Deref for Network {
    type Target = [RoadSegment];

    fn deref(&self) -> &Self::Target {
        &self.roads
    }
}

/// Heap entry. Lower delay pops first; equal delays pop in insertion order.
#[derive(Debug, PartialEq, Eq)]
struct Queued {
    candidate: Candidate,
    seq: u64,
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .candidate
            .branch_delay
            .cmp(&self.candidate.branch_delay)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// What happened to the candidate handled by one [`RoadGrowth::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The road was committed and proposed `children` new candidates.
    Committed {
        road: RoadSegment,
        branch_delay: BranchDelay,
        children: usize,
    },
    /// The candidate was discarded.
    Rejected {
        candidate: RoadSegment,
        reason: Rejection,
    },
}

/// State of one road generation run.
#[derive(Debug)]
pub struct RoadGrowth {
    map: Rect,
    forbidden: Vec<Rect>,
    reference: Point,
    cfg: Config,

    queue: BinaryHeap<Queued>,
    next_seq: u64,
    committed: Vec<RoadSegment>,
    steps: usize,
}

impl RoadGrowth {
    /// Starts a run seeded with `start` at branch delay `0`.
    ///
    /// Density is measured from the center of `map`.
    pub fn new(map: Rect, forbidden: Vec<Rect>, start: RoadSegment, cfg: Config) -> Self {
        let mut growth = Self {
            map,
            forbidden,
            reference: map.center(),
            cfg,
            queue: BinaryHeap::new(),
            next_seq: 0,
            committed: Vec::new(),
            steps: 0,
        };
        growth.push(Candidate::new(start, 0));
        growth
    }

    /// Measures branching density from `reference` instead of the map center.
    pub fn with_reference(mut self, reference: Point) -> Self {
        self.reference = reference;
        self
    }

    pub fn map(&self) -> &Rect {
        &self.map
    }

    pub fn forbidden_areas(&self) -> &[Rect] {
        &self.forbidden
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Roads committed so far, oldest first.
    pub fn committed(&self) -> &[RoadSegment] {
        &self.committed
    }

    /// Number of candidates waiting in the queue.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of candidates handled so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// `true` once the queue is empty or the step cap was reached.
    pub fn is_finished(&self) -> bool {
        self.queue.is_empty() || self.steps >= self.cfg.max_steps
    }

    fn push(&mut self, candidate: Candidate) {
        self.queue.push(Queued {
            candidate,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Handles the most urgent candidate.
    ///
    /// Returns `None` when the run is finished.
    pub fn step(&mut self, rng: &mut impl Rng) -> Option<StepOutcome> {
        if self.steps >= self.cfg.max_steps {
            return None;
        }
        let Queued { candidate, .. } = self.queue.pop()?;
        self.steps += 1;

        match constraints::validate(
            &self.committed,
            candidate.segment,
            &self.map,
            &self.forbidden,
            &self.cfg,
        ) {
            Ok(road) => {
                self.committed.push(road);
                let accepted = Candidate::new(road, candidate.branch_delay);
                let children = branch::branch(&accepted, self.reference, &self.cfg, rng);
                let count = children.len();
                for child in children {
                    self.push(child);
                }
                Some(StepOutcome::Committed {
                    road,
                    branch_delay: candidate.branch_delay,
                    children: count,
                })
            }
            Err(reason) => Some(StepOutcome::Rejected {
                candidate: candidate.segment,
                reason,
            }),
        }
    }

    /// Steps until the run is finished.
    pub fn run(&mut self, rng: &mut impl Rng) {
        while self.step(rng).is_some() {}

        if !self.queue.is_empty() {
            warn!(
                "road growth stopped after {} steps with {} candidates pending",
                self.steps,
                self.queue.len()
            );
        }
        debug!(
            "road growth finished: {} roads in {} steps",
            self.committed.len(),
            self.steps
        );
    }

    /// Consumes the run and returns what was committed.
    pub fn finish(self) -> Network {
        Network {
            roads: self.committed,
        }
    }
}

/// Grows a road network from `start` until no candidate is left.
///
/// The result may be empty, e.g. when `start` begins on invalid ground.
///
/// ### Parameters
/// - `map` - Generation area.
/// - `forbidden` - Areas where no road may start or end.
/// - `start` - Seed road.
/// - `cfg` - Tuning values.
/// - `rng` - Randomness for this run only.
pub fn generate(
    map: Rect,
    forbidden: &[Rect],
    start: RoadSegment,
    cfg: &Config,
    rng: &mut impl Rng,
) -> Network {
    let mut growth = RoadGrowth::new(map, forbidden.to_vec(), start, *cfg);
    growth.run(rng);
    growth.finish()
}

/// Result of [`generate_dense`].
#[derive(Clone, Debug)]
pub struct GenerationReport {
    pub network: Network,
    /// Number of full runs performed, including the returned one.
    pub attempts: usize,
}

impl GenerationReport {
    /// `true` if the returned network is above the sparse threshold.
    pub fn is_dense(&self, cfg: &Config) -> bool {
        self.network.len() > cfg.sparse_threshold
    }
}

/// Repeats [`generate`] with fresh randomness while the result has
/// `cfg.sparse_threshold` roads or fewer.
///
/// Gives up after `cfg.max_attempts` runs and returns the last network.
pub fn generate_dense(
    map: Rect,
    forbidden: &[Rect],
    start: RoadSegment,
    cfg: &Config,
    rng: &mut impl Rng,
) -> GenerationReport {
    let mut attempts = 0;
    loop {
        let network = generate(map, forbidden, start, cfg, rng);
        attempts += 1;

        if network.len() > cfg.sparse_threshold {
            return GenerationReport { network, attempts };
        }
        if attempts >= cfg.max_attempts {
            warn!(
                "giving up after {} attempts; last network has {} roads",
                attempts,
                network.len()
            );
            return GenerationReport { network, attempts };
        }
        info!(
            "attempt {} produced only {} roads, regenerating",
            attempts,
            network.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::is_valid_point;
    use rand::{SeedableRng, rngs::StdRng};

    fn road(x: i32, y: i32, length: i32, angle: i32) -> RoadSegment {
        RoadSegment::new(Point::new(x, y), length, angle, 3)
    }

    fn town_forbidden() -> Vec<Rect> {
        vec![
            Rect::new(0, 0, 20, 600),
            Rect::new(0, 0, 800, 20),
            Rect::new(0, 580, 800, 600),
            Rect::new(780, 0, 800, 600),
            Rect::new(250, 0, 550, 100),
        ]
    }

    #[test]
    fn queue_pops_lowest_delay_first_then_fifo() {
        let mut heap = BinaryHeap::new();
        let entries = [(3, 0), (1, 1), (2, 2), (1, 3)];
        for (delay, seq) in entries {
            heap.push(Queued {
                candidate: Candidate::new(road(0, 0, 10, 0), delay),
                seq,
            });
        }

        let order: Vec<(BranchDelay, u64)> = std::iter::from_fn(|| heap.pop())
            .map(|q| (q.candidate.branch_delay, q.seq))
            .collect();
        assert_eq!(order, vec![(1, 1), (1, 3), (2, 2), (3, 0)]);
    }

    #[test]
    fn first_road_is_the_starting_segment() {
        let map = Rect::from_size(800, 600);
        let start = road(400, 300, 10, 0);
        let mut rng = StdRng::seed_from_u64(1);

        let network = generate(map, &[], start, &Config::default(), &mut rng);

        assert!(!network.is_empty());
        assert_eq!(network[0], start);
        assert_eq!(network[0].start, Point::new(400, 300));
    }

    #[test]
    fn fully_forbidden_map_yields_empty_network() {
        let map = Rect::from_size(100, 100);
        let forbidden = [Rect::new(0, 0, 100, 100)];
        let mut rng = StdRng::seed_from_u64(1);

        let network = generate(map, &forbidden, road(50, 50, 10, 0), &Config::default(), &mut rng);
        assert!(network.is_empty());
    }

    #[test]
    fn first_step_commits_and_branches() {
        let map = Rect::from_size(800, 600);
        let start = road(400, 300, 10, 0);
        let mut growth = RoadGrowth::new(map, Vec::new(), start, Config::default());
        let mut rng = StdRng::seed_from_u64(5);

        assert_eq!(growth.pending(), 1);
        let outcome = growth.step(&mut rng);
        assert_eq!(
            outcome,
            Some(StepOutcome::Committed {
                road: start,
                branch_delay: 0,
                children: 3,
            })
        );
        // Near the center every slot branches.
        assert_eq!(growth.pending(), 3);
        assert_eq!(growth.committed(), &[start]);
        assert_eq!(growth.steps(), 1);
    }

    #[test]
    fn children_branch_from_the_shortened_end() {
        let map = Rect::from_size(800, 600);
        let start = road(750, 300, 95, 0);
        // Low density at the end, so no slot is pruned.
        let mut growth = RoadGrowth::new(map, Vec::new(), start, Config::default())
            .with_reference(Point::new(795, 300));
        let mut rng = StdRng::seed_from_u64(5);

        let Some(StepOutcome::Committed {
            road: accepted,
            children,
            ..
        }) = growth.step(&mut rng)
        else {
            panic!("starting road should be committed");
        };

        assert_eq!(accepted.length, 45);
        assert_eq!(growth.committed(), &[accepted]);
        assert_eq!(children, 3);
        assert_eq!(growth.pending(), 3);
        assert!(
            growth
                .queue
                .iter()
                .all(|q| q.candidate.segment.start == Point::new(795, 300))
        );
    }

    #[test]
    fn extreme_starting_lengths_do_not_panic() {
        let map = Rect::from_size(800, 600);
        let cfg = Config::default();

        let mut rng = StdRng::seed_from_u64(3);
        let network = generate(map, &[], road(400, 300, i32::MAX, 0), &cfg, &mut rng);
        assert_eq!(network[0].length, 397);
        for r in network.iter() {
            assert!(is_valid_point(r.end(), &map, &[]), "{r:?}");
        }

        let network = generate(map, &[], road(400, 300, i32::MIN, 0), &cfg, &mut rng);
        assert!(network.is_empty());
    }

    #[test]
    fn rejected_candidate_has_no_children() {
        let map = Rect::from_size(100, 100);
        let start = road(150, 50, 10, 0);
        let mut growth = RoadGrowth::new(map, Vec::new(), start, Config::default());
        let mut rng = StdRng::seed_from_u64(5);

        assert_eq!(
            growth.step(&mut rng),
            Some(StepOutcome::Rejected {
                candidate: start,
                reason: Rejection::StartInvalid,
            })
        );
        assert!(growth.is_finished());
        assert_eq!(growth.step(&mut rng), None);
    }

    #[test]
    fn committed_roads_respect_constraints() {
        let map = Rect::from_size(800, 600);
        let forbidden = town_forbidden();
        let cfg = Config::default();

        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let network = generate(map, &forbidden, road(300, 105, 200, 0), &cfg, &mut rng);

            for r in network.iter() {
                assert!(is_valid_point(r.start, &map, &forbidden), "{r:?}");
                assert!(is_valid_point(r.end(), &map, &forbidden), "{r:?}");
            }

            for (i, a) in network.iter().enumerate() {
                for b in &network[i + 1..] {
                    if a.is_horizontal() == b.is_horizontal() {
                        assert!(
                            !a.bounding_rect().overlaps(&b.bounding_rect()),
                            "{a:?} overlaps {b:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn same_seed_same_network() {
        let map = Rect::from_size(800, 600);
        let forbidden = town_forbidden();
        let start = road(400, 300, 200, 0);
        let cfg = Config::default();

        let a = generate(map, &forbidden, start, &cfg, &mut StdRng::seed_from_u64(42));
        let b = generate(map, &forbidden, start, &cfg, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn step_cap_stops_the_run() {
        let map = Rect::from_size(800, 600);
        let cfg = Config {
            max_steps: 4,
            ..Config::default()
        };
        let mut growth = RoadGrowth::new(map, Vec::new(), road(400, 300, 10, 0), cfg);
        let mut rng = StdRng::seed_from_u64(9);

        growth.run(&mut rng);

        assert_eq!(growth.steps(), 4);
        assert!(growth.is_finished());
        assert!(growth.committed().len() <= 4);
    }

    #[test]
    fn dense_generation_gives_up_on_hopeless_maps() {
        let map = Rect::from_size(100, 100);
        let forbidden = [Rect::new(0, 0, 100, 100)];
        let cfg = Config {
            max_attempts: 3,
            ..Config::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        let report = generate_dense(map, &forbidden, road(50, 50, 10, 0), &cfg, &mut rng);
        assert_eq!(report.attempts, 3);
        assert!(report.network.is_empty());
        assert!(!report.is_dense(&cfg));
    }

    #[test]
    fn dense_generation_accepts_first_good_run() {
        let map = Rect::from_size(800, 600);
        let cfg = Config {
            sparse_threshold: 0,
            ..Config::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        let report = generate_dense(map, &[], road(400, 300, 10, 0), &cfg, &mut rng);
        assert_eq!(report.attempts, 1);
        assert!(report.is_dense(&cfg));
    }

    #[test]
    fn network_is_insertion_ordered_view() {
        let map = Rect::from_size(800, 600);
        let mut growth = RoadGrowth::new(map, Vec::new(), road(400, 300, 10, 0), Config::default());
        let mut rng = StdRng::seed_from_u64(2);
        growth.run(&mut rng);

        let committed = growth.committed().to_vec();
        let network = growth.finish();
        assert_eq!(network.as_slice(), committed.as_slice());
        assert_eq!(network.into_vec(), committed);
    }
}
