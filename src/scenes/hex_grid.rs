use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rand::Rng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::config::show::positive;
use crate::foundation::clock::Clock;
use crate::foundation::color::Color;
use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::{KineticaError, KineticaResult};
use crate::foundation::math::wrap;
use crate::scene::lifecycle::{Composition, SceneCx};
use crate::scenes::palette::{GLOW_TEAL, GLOW_WHITE, GlowSpec, PALETTE};
use crate::shape::arena::{ShapeArena, ShapeId};
use crate::shape::decorator::{Decorator, DecoratorKind};
use crate::shape::geometry::Geometry;
use crate::surface::display_list::Surface;
use crate::timing::timers::Scheduler;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HexGridConfig {
    /// Center-to-vertex distance used for tiling.
    pub cell_radius: f64,
    /// Drawn radius is `cell_radius - cell_gap`.
    pub cell_gap: f64,
    pub border_color: Color,
    pub border_width: f64,
    /// Wave time gained per 60 fps frame.
    pub wave_rate: f64,
    pub beat_glow: GlowSpec,
    /// Cells within this distance of the center join a ripple.
    pub ripple_radius: f64,
    pub ripple_delay_ms_per_px: f64,
    pub ripple_glow: GlowSpec,
}

impl Default for HexGridConfig {
    fn default() -> Self {
        Self {
            cell_radius: 100.0,
            cell_gap: 1.0,
            border_color: Color(0x111122),
            border_width: 1.0,
            wave_rate: 0.02,
            beat_glow: GlowSpec::new(GLOW_WHITE, 4.0, 500.0),
            ripple_radius: 300.0,
            ripple_delay_ms_per_px: 2.0,
            ripple_glow: GlowSpec::new(GLOW_TEAL, 3.0, 400.0),
        }
    }
}

impl HexGridConfig {
    pub fn validate(&self) -> KineticaResult<()> {
        positive("hex_grid.cell_radius", self.cell_radius, false)?;
        positive("hex_grid.ripple_radius", self.ripple_radius, false)?;
        positive("hex_grid.ripple_delay_ms_per_px", self.ripple_delay_ms_per_px, true)?;
        positive("hex_grid.wave_rate", self.wave_rate, true)?;
        if !(0.0..self.cell_radius).contains(&self.cell_gap) {
            return Err(KineticaError::validation(
                "hex_grid.cell_gap must be in [0, cell_radius)",
            ));
        }
        Ok(())
    }
}

/// One tile and its grid coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HexCell {
    pub id: ShapeId,
    pub col: u32,
    pub row: u32,
}

/// Pointy-top hexagon tiling with a diagonal color wave, beat flashes and ripples.
pub struct HexState {
    config: HexGridConfig,
    arena: ShapeArena,
    cells: Vec<HexCell>,
    time: f64,
    clock: Clock,
    rng: SmallRng,
}

impl HexState {
    pub fn new(config: HexGridConfig, surface: &Surface, clock: &Clock, rng: SmallRng) -> Self {
        Self {
            config,
            arena: ShapeArena::new(surface, clock),
            cells: Vec::new(),
            time: 0.0,
            clock: clock.clone(),
            rng,
        }
    }

    /// Tile `canvas` plus a one-cell margin; odd rows shift right by half a cell.
    pub fn build(&mut self, canvas: Canvas) {
        let radius = self.config.cell_radius;
        let hex_w = 3f64.sqrt() * radius;
        let row_step = 2.0 * radius * 0.75;
        let cols = (canvas.width_f64() / hex_w).ceil() as u32 + 2;
        let rows = (canvas.height_f64() / row_step).ceil() as u32 + 2;

        self.cells.reserve((cols * rows) as usize);
        for row in 0..rows {
            let offset = if row % 2 == 1 { hex_w / 2.0 } else { 0.0 };
            for col in 0..cols {
                let center = Point::new(f64::from(col) * hex_w + offset, f64::from(row) * row_step);
                let id = self
                    .arena
                    .spawn(Geometry::hexagon(radius - self.config.cell_gap));
                let shape = &mut self.arena[id];
                shape
                    .set_position(center)
                    .set_fill(PALETTE[((col + row) as usize) % PALETTE.len()]);
                shape.add_decorator(Decorator::border(
                    self.config.border_color,
                    self.config.border_width,
                ));
                self.cells.push(HexCell { id, col, row });
            }
        }
    }

    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    pub fn arena(&self) -> &ShapeArena {
        &self.arena
    }

    /// Accumulated wave time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Wave color of a cell at wave time `time`.
    pub fn wave_color(col: u32, row: u32, time: f64) -> Color {
        let n = PALETTE.len();
        let wave = wrap(f64::from(col) * 0.3 + f64::from(row) * 0.2 + time, n as f64);
        let idx = (wave.floor() as usize).min(n - 1);
        let t = wave - idx as f64;
        PALETTE[idx].lerp(PALETTE[(idx + 1) % n], t)
    }

    /// Advance the wave by `delta_time` frames, recolor every cell, prune and redraw.
    pub fn step(&mut self, delta_time: f64) {
        self.time += delta_time * self.config.wave_rate;
        for cell in &self.cells {
            let Some(shape) = self.arena.get_mut(cell.id) else {
                continue;
            };
            shape.remove_decorators_of(DecoratorKind::Fill);
            shape.set_fill(Self::wave_color(cell.col, cell.row, self.time));
        }

        let now = self.clock.now_ms();
        for cell in &self.cells {
            if let Some(shape) = self.arena.get_mut(cell.id) {
                shape.prune_expired(now);
                shape.render();
            }
        }
    }

    fn random_cell(&mut self) -> Option<HexCell> {
        if self.cells.is_empty() {
            return None;
        }
        Some(self.cells[self.rng.random_range(0..self.cells.len())])
    }

    /// Flash one random cell.
    pub fn on_beat(&mut self) -> Option<HexCell> {
        let cell = self.random_cell()?;
        self.glow(cell.id, self.config.beat_glow);
        Some(cell)
    }

    fn glow(&mut self, id: ShapeId, spec: GlowSpec) {
        let now = self.clock.now_ms();
        if let Some(shape) = self.arena.get_mut(id) {
            shape.add_decorator(spec.at(now));
        }
    }

    /// Cells within the ripple radius of `center`, with their glow delay.
    pub fn ripple_targets(&self, center: ShapeId) -> Vec<(ShapeId, f64)> {
        let Some(origin) = self.arena.get(center).map(|s| s.position) else {
            return Vec::new();
        };
        self.cells
            .iter()
            .filter_map(|cell| {
                let dist = self.arena.get(cell.id)?.position.distance(origin);
                (dist <= self.config.ripple_radius)
                    .then_some((cell.id, dist * self.config.ripple_delay_ms_per_px))
            })
            .collect()
    }

    /// Destroy every cell.
    pub fn destroy(&mut self) {
        self.cells.clear();
        self.arena.destroy_all();
    }
}

/// Start a ripple from a random cell; returns the number of glows scheduled.
///
/// Scheduled callbacks hold a weak reference, so a ripple outliving its grid does
/// nothing.
pub fn ripple(state: &Rc<RefCell<HexState>>, scheduler: &Scheduler) -> usize {
    let (targets, spec) = {
        let mut st = state.borrow_mut();
        let Some(center) = st.random_cell() else {
            return 0;
        };
        (st.ripple_targets(center.id), st.config.ripple_glow)
    };

    for &(id, delay) in &targets {
        let weak: Weak<RefCell<HexState>> = Rc::downgrade(state);
        scheduler.after(delay, move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().glow(id, spec);
            }
        });
    }
    tracing::trace!(cells = targets.len(), "ripple scheduled");
    targets.len()
}

/// The `hexagon-grid` scene.
pub struct HexagonGrid {
    config: HexGridConfig,
    state: Option<Rc<RefCell<HexState>>>,
}

impl HexagonGrid {
    pub fn new(config: HexGridConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }
}

impl Composition for HexagonGrid {
    fn on_setup(&mut self, cx: &mut SceneCx<'_>) -> KineticaResult<()> {
        let mut state = HexState::new(self.config.clone(), cx.surface(), cx.clock(), cx.rng());
        state.build(cx.canvas());
        let state = Rc::new(RefCell::new(state));

        let wave = Rc::clone(&state);
        cx.add_ticker(move |tick| wave.borrow_mut().step(tick.delta_time));

        let beat = Rc::clone(&state);
        cx.on_timing("beat", move |_| {
            beat.borrow_mut().on_beat();
        })?;

        let measure = Rc::clone(&state);
        let scheduler = cx.scheduler();
        cx.on_timing("measure", move |_| {
            ripple(&measure, &scheduler);
        })?;

        self.state = Some(state);
        Ok(())
    }

    fn on_destroy(&mut self) {
        if let Some(state) = self.state.take() {
            state.borrow_mut().destroy();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scenes/hex_grid.rs"]
mod tests;
