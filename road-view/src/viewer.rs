//! Interactive road network viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the generation state
//! (layout, forbidden areas, growth run, random generator) and implements
//! [`eframe::App`] to draw the map and drive the growth from an egui UI.

use eframe::App;
use glam::Vec2;
use log::info;
use rand::{SeedableRng, rngs::StdRng};
use road_core::{
    config::{Config, seed_from_clock},
    geometry::{Rect, RoadSegment},
    growth::{Network, RoadGrowth, StepOutcome, generate_dense},
    town::{Town, TownLayout},
    types::Point,
};

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The generation core: [`RoadGrowth`], [`Config`], [`TownLayout`].
/// - The towns loaded from a descriptor file, if any.
/// - UI state (pan/zoom, timing) and the eframe/egui callbacks.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, call [`Viewer::step_once`].
/// 3. Render forbidden areas and roads.
///
/// ### Fields
/// - `layout` - Map size, margins and starting road.
/// - `cfg` - Growth tuning values, editable in the side panel.
/// - `towns` - Town descriptors; `selected` indexes into them, `None`
///   meaning the built-in coast demo.
///
/// - `seed` - Seed of the current run, shown so a map can be reproduced.
/// - `rng` - Generator owned by the current run.
///
/// - `forbidden` - Forbidden areas of the current run.
/// - `water` - The subset of `forbidden` drawn as water.
/// - `growth` - The run being stepped.
/// - `finished` - Network produced by [`Viewer::generate_town`]; drawn
///   instead of the stepped run while present.
/// - `attempts` - Number of full runs the last [`Viewer::generate_town`] needed.
///
/// - `running` - Whether growth is currently auto-advancing.
/// - `steps_per_tick` - Candidates handled per automatic step.
/// - `zoom` - Zoom factor for world-to-screen coordinate mapping.
/// - `pan` - Screen-space pan offset in pixels.
///
/// - `last_road` - Road committed by the most recent step (for highlighting).
///
/// - `step_interval` - Target time between automatic steps (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `last_step_dt` - Actual time delta between the last two steps (for display only).
pub struct Viewer {
    layout: TownLayout,
    cfg: Config,
    towns: Vec<Town>,
    selected: Option<usize>,

    seed: u64,
    rng: StdRng,

    forbidden: Vec<Rect>,
    water: Vec<Rect>,
    growth: RoadGrowth,
    finished: Option<Network>,
    attempts: usize,

    running: bool,
    steps_per_tick: usize,
    zoom: f32,
    pan: egui::Vec2,

    last_road: Option<RoadSegment>,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a viewer showing the coast demo with a clock-derived seed.
    ///
    /// ### Parameters
    /// - `towns` - Descriptors selectable in the side panel; may be empty.
    ///
    /// ### Returns
    /// A fully-initialized [`Viewer`] ready to be passed to `eframe::run_native`.
    pub fn new(towns: Vec<Town>) -> Self {
        let layout = TownLayout::default();
        let cfg = Config::default();
        let seed = seed_from_clock();
        let mut rng = StdRng::seed_from_u64(seed);
        let (forbidden, water, start) = Self::scene(&layout, None, &towns, &mut rng);
        let growth = RoadGrowth::new(layout.map_rect(), forbidden.clone(), start, cfg);

        Self {
            layout,
            cfg,
            towns,
            selected: None,
            seed,
            rng,
            forbidden,
            water,
            growth,
            finished: None,
            attempts: 0,
            running: false,
            steps_per_tick: 20,
            zoom: 1.0,
            pan: egui::vec2(0.0, 0.0),
            last_road: None,
            step_interval: 0.02,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        }
    }

    /// Builds forbidden areas, water and the starting road for the
    /// selected town, or for the coast demo when nothing is selected.
    fn scene(
        layout: &TownLayout,
        selected: Option<usize>,
        towns: &[Town],
        rng: &mut StdRng,
    ) -> (Vec<Rect>, Vec<Rect>, RoadSegment) {
        match selected.and_then(|i| towns.get(i)) {
            Some(town) => {
                let water = layout.water_areas(town, rng);
                let mut forbidden = layout.margins();
                forbidden.extend(water.iter().copied());
                (forbidden, water, layout.starting_segment())
            }
            None => {
                let (forbidden, water, start) = layout.coast_demo();
                (forbidden, vec![water], start)
            }
        }
    }

    /// Restarts the current scene from `seed`.
    ///
    /// This keeps the configuration and camera settings, but rebuilds the
    /// forbidden areas and the growth run, drops any finished network and
    /// stops auto-running.
    fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        let (forbidden, water, start) =
            Self::scene(&self.layout, self.selected, &self.towns, &mut self.rng);
        self.growth = RoadGrowth::new(self.layout.map_rect(), forbidden.clone(), start, self.cfg);
        self.forbidden = forbidden;
        self.water = water;
        self.finished = None;
        self.attempts = 0;
        self.last_road = None;
        self.running = false;
    }

    /// Restarts the current scene with a fresh seed.
    fn regenerate(&mut self) {
        self.seed = seed_from_clock();
        info!("regenerating with seed {}", self.seed);
        self.reset();
    }

    /// Switches to another town (or the coast demo) and restarts.
    fn select_town(&mut self, selected: Option<usize>) {
        self.selected = selected.filter(|&i| i < self.towns.len());
        self.reset();
    }

    /// Handles a single candidate of the current run.
    ///
    /// If the candidate was committed it is remembered in `last_road` so
    /// it can be highlighted in the next frame.
    fn step_once(&mut self) {
        if let Some(StepOutcome::Committed { road, .. }) = self.growth.step(&mut self.rng) {
            self.last_road = Some(road);
        }
        if self.growth.is_finished() {
            self.running = false;
        }
    }

    /// Generates the whole town at once, re-running while the result is
    /// too sparse.
    fn generate_town(&mut self) {
        let start = match self.selected.and_then(|i| self.towns.get(i)) {
            Some(_) => self.layout.starting_segment(),
            None => self.layout.coast_demo().2,
        };
        let report = generate_dense(
            self.layout.map_rect(),
            &self.forbidden,
            start,
            &self.cfg,
            &mut self.rng,
        );
        info!(
            "generated {} roads in {} attempts",
            report.network.len(),
            report.attempts
        );
        self.attempts = report.attempts;
        self.finished = Some(report.network);
        self.last_road = None;
        self.running = false;
    }

    /// Roads currently on screen.
    fn roads(&self) -> &[RoadSegment] {
        match &self.finished {
            Some(network) => network.as_slice(),
            None => self.growth.committed(),
        }
    }

    /// Converts a map position to screen-space.
    ///
    /// The map center is placed at the center of `rect`, scaled by `zoom`
    /// and offset by `pan`. Map y grows downwards like screen y.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        let local = p - self.layout.map_rect().center().as_vec2();
        egui::pos2(
            center.x + local.x * self.zoom + self.pan.x,
            center.y + local.y * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to map coordinates.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] (up to floating
    /// point rounding).
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (p.y - center.y - self.pan.y) / self.zoom;
        Vec2::new(x, y) + self.layout.map_rect().center().as_vec2()
    }

    fn point_to_screen(&self, p: Point, rect: egui::Rect) -> egui::Pos2 {
        self.world_to_screen(p.as_vec2(), rect)
    }

    fn rect_to_screen(&self, r: &Rect, rect: egui::Rect) -> egui::Rect {
        egui::Rect::from_min_max(
            self.point_to_screen(r.min, rect),
            self.point_to_screen(r.max, rect),
        )
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `i32` [`egui::DragValue`].
    fn labeled_drag_i32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut i32,
        range: std::ops::RangeInclusive<i32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running && !self.growth.is_finished();
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.0..=1.0)
                        .speed(0.01),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Generate").clicked() {
                    self.generate_town();
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if ui.button("New seed").clicked() {
                    self.regenerate();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (timing, roads, queue, seed).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("seed = {}", self.seed));
                ui.label(format!("roads = {}", self.roads().len()));
                if self.finished.is_some() {
                    ui.label(format!("attempts = {}", self.attempts));
                } else {
                    ui.label(format!("pending = {}", self.growth.pending()));
                    ui.label(format!("steps = {}", self.growth.steps()));
                }
            });
        });
    }

    /// Builds the right-hand panel for town selection and tuning values.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Town");

                let mut selected = self.selected;
                let current = match self.selected.and_then(|i| self.towns.get(i)) {
                    Some(town) => town.name.clone(),
                    None => "Coast demo".to_owned(),
                };
                egui::ComboBox::from_id_salt("town_select")
                    .selected_text(current)
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut selected, None, "Coast demo");
                        for (i, town) in self.towns.iter().enumerate() {
                            ui.selectable_value(&mut selected, Some(i), town.name.as_str());
                        }
                    });
                if selected != self.selected {
                    self.select_town(selected);
                }

                ui.separator();
                ui.label("Seed");
                ui.horizontal(|ui| {
                    ui.add(egui::DragValue::new(&mut self.seed));
                    if ui.button("Apply").clicked() {
                        self.reset();
                    }
                });

                ui.separator();
                ui.heading("Config");
                ui.label("Shrinking");
                Self::labeled_drag_i32(ui, "shrink_step:", &mut self.cfg.shrink_step, 1..=100, 1.0);
                Self::labeled_drag_i32(ui, "min_length:", &mut self.cfg.min_length, 0..=200, 1.0);

                ui.separator();
                ui.label("Branching");
                Self::labeled_drag_i32(
                    ui,
                    "density_min:",
                    &mut self.cfg.density_min,
                    1..=1000,
                    1.0,
                );
                Self::labeled_drag_i32(
                    ui,
                    "density_max:",
                    &mut self.cfg.density_max,
                    1..=1000,
                    1.0,
                );
                Self::labeled_drag_i32(
                    ui,
                    "jitter_threshold:",
                    &mut self.cfg.jitter_density_threshold,
                    0..=1000,
                    1.0,
                );
                Self::labeled_drag_usize(
                    ui,
                    "branch_slots:",
                    &mut self.cfg.branch_slots,
                    0..=8,
                    1.0,
                );

                ui.separator();
                ui.label("Runs");
                Self::labeled_drag_usize(
                    ui,
                    "sparse_threshold:",
                    &mut self.cfg.sparse_threshold,
                    0..=1000,
                    1.0,
                );
                Self::labeled_drag_usize(
                    ui,
                    "max_attempts:",
                    &mut self.cfg.max_attempts,
                    1..=1000,
                    1.0,
                );
                Self::labeled_drag_usize(
                    ui,
                    "steps_per_tick:",
                    &mut self.steps_per_tick,
                    1..=1000,
                    1.0,
                );

                // Keep the density range well formed while dragging.
                self.cfg.density_max = self.cfg.density_max.max(self.cfg.density_min);

                ui.separator();
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = Config::default();
                }
                ui.small("Config changes apply on Reset or Generate.");
            });
    }

    /// Builds the central panel where the map is drawn and navigated.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // Map background.
            let map = self.rect_to_screen(&self.layout.map_rect(), rect);
            painter.rect_filled(map, 0.0, egui::Color32::WHITE);

            // Forbidden areas: margins faintly, water in blue.
            for area in &self.forbidden {
                let color = if self.water.contains(area) {
                    egui::Color32::from_rgb(0, 0, 255)
                } else {
                    egui::Color32::from_gray(225)
                };
                painter.rect_filled(self.rect_to_screen(area, rect), 0.0, color);
            }

            // Roads.
            for road in self.roads() {
                let a = self.point_to_screen(road.start, rect);
                let b = self.point_to_screen(road.end(), rect);
                let width = (road.width as f32 * self.zoom).max(1.0);
                painter.line_segment([a, b], egui::Stroke::new(width, egui::Color32::BLACK));
            }

            if let Some(road) = self.last_road.filter(|_| self.finished.is_none()) {
                let a = self.point_to_screen(road.start, rect);
                let b = self.point_to_screen(road.end(), rect);
                let width = (road.width as f32 * self.zoom).max(1.0);
                painter.line_segment([a, b], egui::Stroke::new(width, egui::Color32::RED));
            }

            if let Some(hover) = response.hover_pos() {
                let p = self.screen_to_world(hover, rect);
                painter.text(
                    rect.left_top() + egui::vec2(8.0, 8.0),
                    egui::Align2::LEFT_TOP,
                    format!("({:.0}, {:.0})", p.x, p.y),
                    egui::FontId::monospace(12.0),
                    egui::Color32::DARK_GRAY,
                );
            }

            // Auto-run growth if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    for _ in 0..self.steps_per_tick {
                        self.step_once();
                        if !self.running {
                            break;
                        }
                    }
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
