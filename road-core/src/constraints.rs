//! Local constraints a candidate road must satisfy before it is committed.
//!
//! A candidate is checked in three stages:
//! 1. its start must be a valid point (on the map, outside forbidden areas),
//! 2. its end must be a valid point, shortening the road step by step
//!    until it is or until it gets too short,
//! 3. its padded footprint must not overlap any committed road of the same
//!    orientation.
//!
//! Failing a stage is a routine outcome of generation and is reported as a
//! [`Rejection`] value.

use crate::{
    config::Config,
    geometry::{Rect, RoadSegment},
    types::Point,
};
use std::fmt;

/// Why a candidate road was discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The start point is off the map or inside a forbidden area.
    StartInvalid,
    /// No valid end point was found before the road got too short.
    EndUnreachable,
    /// The footprint collides with a committed road of the same orientation.
    OverlapConflict,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Rejection::StartInvalid => "road not starting on valid ground",
            Rejection::EndUnreachable => "road cannot end on valid ground",
            Rejection::OverlapConflict => "road overlaps with another road",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Rejection {}

/// Returns `true` if `p` lies on the map and outside every forbidden area.
pub fn is_valid_point(p: Point, map: &Rect, forbidden: &[Rect]) -> bool {
    map.contains(p) && !forbidden.iter().any(|area| area.contains(p))
}

/// Validates `candidate` against the map, the forbidden areas and the roads
/// committed so far.
///
/// ### Parameters
/// - `committed` - Roads already part of the network.
/// - `candidate` - The proposed road.
/// - `map` - Generation area.
/// - `forbidden` - Areas where no road may start or end.
/// - `cfg` - Shrink step and minimum length.
///
/// ### Returns
/// The accepted road, possibly shorter than `candidate`, or the reason it
/// was rejected.
pub fn validate(
    committed: &[RoadSegment],
    candidate: RoadSegment,
    map: &Rect,
    forbidden: &[Rect],
    cfg: &Config,
) -> Result<RoadSegment, Rejection> {
    if !is_valid_point(candidate.start, map, forbidden) {
        return Err(Rejection::StartInvalid);
    }

    let road = shrink_to_valid_end(candidate, map, forbidden, cfg)?;

    // Crossing roads are fine; only parallel roads may not crowd each other.
    let horizontal = road.is_horizontal();
    let footprint = road.bounding_rect();
    let conflict = committed
        .iter()
        .filter(|other| other.is_horizontal() == horizontal)
        .any(|other| footprint.overlaps(&other.bounding_rect()));

    if conflict {
        Err(Rejection::OverlapConflict)
    } else {
        Ok(road)
    }
}

/// Shortens `road` by `cfg.shrink_step` until its end is a valid point.
///
/// Lengths that cannot end on the map are skipped in one jump, so the
/// remaining attempts are bounded by the map size rather than the
/// initial length.
fn shrink_to_valid_end(
    mut road: RoadSegment,
    map: &Rect,
    forbidden: &[Rect],
    cfg: &Config,
) -> Result<RoadSegment, Rejection> {
    let step = cfg.shrink_step.max(1);

    let reach = max_reach(road.start, map).max(cfg.min_length as i64);
    let excess = road.length as i64 - reach;
    if excess > 0 {
        road.length -= ((excess / step as i64) * step as i64) as i32;
    }

    let max_shrinks = road.length.saturating_sub(cfg.min_length).max(0) / step + 1;

    for _ in 0..=max_shrinks {
        if is_valid_point(road.end(), map, forbidden) {
            return Ok(road);
        }
        if road.length <= cfg.min_length {
            break;
        }
        road.length -= step;
    }

    Err(Rejection::EndUnreachable)
}

/// Upper bound on the length of any road from `start` that still ends on
/// `map`: the distance to the farthest corner plus truncation slack.
fn max_reach(start: Point, map: &Rect) -> i64 {
    let dx = (start.x as i64 - map.min.x as i64)
        .abs()
        .max((map.max.x as i64 - start.x as i64).abs());
    let dy = (start.y as i64 - map.min.y as i64)
        .abs()
        .max((map.max.y as i64 - start.y as i64).abs());
    ((dx * dx + dy * dy) as f64).sqrt().ceil() as i64 + 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> Rect {
        Rect::from_size(800, 600)
    }

    fn road(x: i32, y: i32, length: i32, angle: i32) -> RoadSegment {
        RoadSegment::new(Point::new(x, y), length, angle, 3)
    }

    #[test]
    fn accepts_road_fully_inside_map() {
        let r = road(400, 300, 100, 0);
        assert_eq!(validate(&[], r, &map(), &[], &Config::default()), Ok(r));
    }

    #[test]
    fn rejects_start_off_map() {
        let r = road(900, 300, 10, 180);
        assert_eq!(
            validate(&[], r, &map(), &[], &Config::default()),
            Err(Rejection::StartInvalid)
        );
    }

    #[test]
    fn rejects_start_in_forbidden_area_without_shrinking() {
        let water = Rect::new(0, 0, 800, 100);
        let r = road(400, 50, 200, 90);
        assert_eq!(
            validate(&[], r, &map(), &[water], &Config::default()),
            Err(Rejection::StartInvalid)
        );
    }

    #[test]
    fn shrinks_road_until_end_is_on_map() {
        // 750 + 95 would leave the map; 750 + 45 is the first valid end.
        let r = road(750, 300, 95, 0);
        let accepted = validate(&[], r, &map(), &[], &Config::default()).unwrap();
        assert_eq!(accepted.length, 45);
        assert_eq!(accepted.end(), Point::new(795, 300));
        assert_eq!(accepted.start, r.start);
    }

    #[test]
    fn shrinks_road_out_of_forbidden_area() {
        let water = Rect::new(450, 0, 800, 600);
        let r = road(400, 300, 100, 0);
        let accepted = validate(&[], r, &map(), &[water], &Config::default()).unwrap();
        assert_eq!(accepted.length, 40);
        assert!(is_valid_point(accepted.end(), &map(), &[water]));
    }

    #[test]
    fn rejects_when_shrinking_reaches_floor() {
        let water = Rect::new(401, 0, 800, 600);
        let r = road(400, 300, 100, 0);
        assert_eq!(
            validate(&[], r, &map(), &[water], &Config::default()),
            Err(Rejection::EndUnreachable)
        );
    }

    #[test]
    fn rejects_negative_length_with_invalid_end() {
        let r = road(5, 300, -20, 0);
        assert_eq!(
            validate(&[], r, &map(), &[], &Config::default()),
            Err(Rejection::EndUnreachable)
        );
    }

    #[test]
    fn extreme_lengths_do_not_overflow() {
        // Lengths that cannot end on the map are skipped; the first one
        // that fits keeps the same remainder modulo the shrink step.
        let long = validate(&[], road(400, 300, i32::MAX, 0), &map(), &[], &Config::default());
        assert_eq!(long.map(|r| r.length), Ok(397));

        assert_eq!(
            validate(&[], road(400, 300, i32::MIN, 0), &map(), &[], &Config::default()),
            Err(Rejection::EndUnreachable)
        );
    }

    #[test]
    fn rejects_parallel_overlap() {
        let first = road(100, 100, 100, 0);
        let second = road(150, 100, 100, 0);
        assert_eq!(
            validate(&[first], second, &map(), &[], &Config::default()),
            Err(Rejection::OverlapConflict)
        );
    }

    #[test]
    fn overlap_is_not_resolved_by_shrinking() {
        let first = road(100, 100, 100, 0);
        // Shortening would avoid the first road, but overlap never shrinks.
        let second = road(50, 100, 100, 0);
        assert_eq!(
            validate(&[first], second, &map(), &[], &Config::default()),
            Err(Rejection::OverlapConflict)
        );
    }

    #[test]
    fn parallel_roads_far_enough_apart_are_accepted() {
        let first = road(100, 100, 100, 0);
        let second = road(100, 120, 100, 0);
        assert!(validate(&[first], second, &map(), &[], &Config::default()).is_ok());
    }

    #[test]
    fn crossing_roads_are_never_compared() {
        let horizontal = road(100, 150, 100, 0);
        let vertical = road(150, 100, 100, 90);
        assert!(validate(&[horizontal], vertical, &map(), &[], &Config::default()).is_ok());
    }

    #[test]
    fn zero_length_road_is_accepted_on_valid_ground() {
        let first = road(100, 100, 100, 0);
        let dot = road(150, 100, 0, 0);
        assert_eq!(
            validate(&[first], dot, &map(), &[], &Config::default()),
            Ok(dot)
        );
    }

    #[test]
    fn rejection_messages() {
        assert_eq!(
            Rejection::OverlapConflict.to_string(),
            "road overlaps with another road"
        );
    }
}
