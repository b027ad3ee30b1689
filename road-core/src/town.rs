//! Town descriptors and the map layout they are generated on.
//!
//! A descriptor file is a JSON array of towns. Each town says on which
//! sides of the map there is water; [`TownLayout`] turns those flags into
//! forbidden areas and provides the starting road.

use crate::{
    geometry::{Rect, RoadSegment},
    types::Point,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Town {
    pub name: String,
    #[serde(rename = "isThereRiver", default)]
    pub has_river: String,
    #[serde(rename = "waterOnTop", default)]
    pub water_on_north: bool,
    #[serde(rename = "waterOnRight", default)]
    pub water_on_east: bool,
    #[serde(rename = "waterOnBottom", default)]
    pub water_on_south: bool,
    #[serde(rename = "waterOnLeft", default)]
    pub water_on_west: bool,
}

impl Town {
    /// The name with every character that is not an ASCII letter replaced
    /// by `_`, safe to use as a file stem.
    pub fn sane_name(&self) -> String {
        self.name
            .chars()
            .map(|c| if c.is_ascii_alphabetic() { c } else { '_' })
            .collect()
    }
}

/// Parses a JSON array of town descriptors.
pub fn parse_towns(json: &str) -> serde_json::Result<Vec<Town>> {
    serde_json::from_str(json)
}

/// Map dimensions and the starting road shared by every generated town.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownLayout {
    pub width: i32,
    pub height: i32,
    /// Width of the strip kept free along each map edge.
    pub margin: i32,
    /// Water strips are `margin + rand(water_jitter)` thick.
    pub water_jitter: i32,
    pub start_length: i32,
    pub road_width: i32,
}

impl Default for TownLayout {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            margin: 20,
            water_jitter: 20,
            start_length: 200,
            road_width: 3,
        }
    }
}

impl TownLayout {
    pub fn map_rect(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// The four strips along the map edges: left, top, bottom, right.
    pub fn margins(&self) -> Vec<Rect> {
        let (w, h, m) = (self.width, self.height, self.margin);
        vec![
            Rect::new(0, 0, m, h),
            Rect::new(0, 0, w, m),
            Rect::new(0, h - m, w, h),
            Rect::new(w - m, 0, w, h),
        ]
    }

    /// Water strips for the sides flagged on `town`, in north, east,
    /// south, west order.
    pub fn water_areas(&self, town: &Town, rng: &mut impl Rng) -> Vec<Rect> {
        let (w, h) = (self.width, self.height);
        let mut thickness = || self.margin + rng.random_range(0..self.water_jitter.max(1));

        let mut water = Vec::with_capacity(4);
        if town.water_on_north {
            water.push(Rect::new(0, 0, w, thickness()));
        }
        if town.water_on_east {
            water.push(Rect::new(w - thickness(), 0, w, h));
        }
        if town.water_on_south {
            water.push(Rect::new(0, h - thickness(), w, h));
        }
        if town.water_on_west {
            water.push(Rect::new(0, 0, thickness(), h));
        }
        water
    }

    /// Margins followed by the town's water.
    pub fn forbidden_areas(&self, town: &Town, rng: &mut impl Rng) -> Vec<Rect> {
        let mut areas = self.margins();
        areas.extend(self.water_areas(town, rng));
        areas
    }

    /// A horizontal road heading east from the map center.
    pub fn starting_segment(&self) -> RoadSegment {
        RoadSegment::new(
            self.map_rect().center(),
            self.start_length,
            0,
            self.road_width,
        )
    }

    /// A fixed coastline north of the center, with the first road running
    /// along the shore. Returns `(forbidden areas, water, starting road)`.
    pub fn coast_demo(&self) -> (Vec<Rect>, Rect, RoadSegment) {
        let water = Rect::new(250, 0, 550, 100);
        let mut forbidden = self.margins();
        forbidden.push(water);
        let start = RoadSegment::new(
            Point::new(300, 105),
            self.start_length,
            0,
            self.road_width,
        );
        (forbidden, water, start)
    }
}
