//! The grid background as one owned object.
//!
//! [`GenerativeGrid`] bundles the seeded layout (grid, structures, fill queue) with the fill
//! scheduler. The embedding view layer owns it (optionally through a [`GridSwitch`]), feeds
//! it frame callbacks, viewport changes and interaction signals, and renders from
//! [`GridSnapshot`]s. Nothing here is global.
//!
//! Lifecycle:
//!
//! 1. [`GenerativeGrid::new`] builds the layout for a viewport and seed.
//! 2. [`GenerativeGrid::mount`] paints the base surface and either draws the reduced-motion
//!    final state or waits `start_delay_ms` before animating.
//! 3. The host calls [`GenerativeGrid::on_frame`] every time a tick it was asked for fires.
//! 4. [`GenerativeGrid::resize`] regenerates everything and fast-forwards to the previous
//!    progress fraction.

use crate::{
    config::GridConfig,
    fill::build_queue,
    foundation::core::Viewport,
    foundation::error::InkgridResult,
    grid::Grid,
    random::{SeededRandom, session_seed},
    scheduler::{FillScheduler, FrameHost, FrameOutcome, GateRegion, Interaction},
    structures::{Structure, StructureGenerator},
    surface::DrawSurface,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPreference {
    Full,
    Reduced,
}

/// Presentation state for the view layer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GridState {
    /// Built but not yet mounted on a surface.
    Unmounted,
    /// Mounted; animation starts once `start_at_ms` is reached.
    Waiting { start_at_ms: f64 },
    Animating,
    /// Animating, but held by the visibility gate.
    Paused,
    /// Every queued cell has been drawn.
    Complete,
    /// Drawn without motion up to the reduced-motion coverage.
    Static,
    /// Stopped before completion.
    Stopped,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GridSnapshot {
    pub state: GridState,
    pub seed: u64,
    pub viewport: Viewport,
    pub cols: usize,
    pub rows: usize,
    pub structures: usize,
    pub queue_len: usize,
    pub fill_index: usize,
    pub progress: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Unmounted,
    Waiting { start_at_ms: f64 },
    Running,
    Static,
}

#[derive(Clone, Debug)]
pub struct GenerativeGrid {
    config: GridConfig,
    seed: u64,
    rng: SeededRandom,
    grid: Grid,
    structures: Vec<Structure>,
    scheduler: FillScheduler,
    phase: Phase,
    last_outcome: Option<FrameOutcome>,
}

impl GenerativeGrid {
    pub fn new(config: GridConfig, viewport: Viewport, seed: u64) -> InkgridResult<Self> {
        config.validate()?;
        let scheduler = FillScheduler::new(config.target_fps, config.pause_threshold);
        let mut this = Self {
            grid: Grid::new(viewport, config.cell_size),
            config,
            seed,
            rng: SeededRandom::new(seed),
            structures: Vec::new(),
            scheduler,
            phase: Phase::Unmounted,
            last_outcome: None,
        };
        this.rebuild(viewport);
        Ok(this)
    }

    /// Same as [`GenerativeGrid::new`] with a fresh [`session_seed`].
    pub fn with_session_seed(config: GridConfig, viewport: Viewport) -> InkgridResult<Self> {
        Self::new(config, viewport, session_seed())
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn structures(&self) -> &[Structure] {
        &self.structures
    }

    pub fn scheduler(&self) -> &FillScheduler {
        &self.scheduler
    }

    /// Regenerate grid, structures and queue for `viewport`. The generator keeps drawing
    /// from the same sequence, so a rebuild does not repeat the previous layout.
    #[tracing::instrument(skip(self))]
    fn rebuild(&mut self, viewport: Viewport) {
        let mut grid = Grid::new(viewport, self.config.cell_size);
        let generator = StructureGenerator::new(self.config.attempts);
        let structures =
            generator.generate(grid.cols(), grid.rows(), &mut self.rng, &self.config.palette);
        let queue = build_queue(&mut grid, &structures);
        tracing::debug!(
            cols = grid.cols(),
            rows = grid.rows(),
            structures = structures.len(),
            queue = queue.len(),
            "grid rebuilt"
        );

        self.grid = grid;
        self.structures = structures;
        self.scheduler.set_queue(queue);
    }

    /// Clear to the background color and draw the full separator lattice.
    pub fn paint_base(&self, surface: &mut dyn DrawSurface) {
        surface.clear(self.config.background);
        for (from, to) in self.grid.lattice_lines() {
            surface.stroke_line(from, to, &self.config.grid_line);
        }
    }

    pub fn mount(
        &mut self,
        motion: MotionPreference,
        now_ms: f64,
        surface: &mut dyn DrawSurface,
        host: &mut dyn FrameHost,
    ) {
        self.paint_base(surface);
        match motion {
            MotionPreference::Reduced => {
                self.render_final_state(self.config.reduced_motion_coverage, surface);
                self.phase = Phase::Static;
            }
            MotionPreference::Full => {
                self.phase = Phase::Waiting {
                    start_at_ms: now_ms + self.config.start_delay_ms,
                };
                self.scheduler.request_tick(host);
            }
        }
        tracing::debug!(?motion, seed = self.seed, "grid mounted");
    }

    /// Draw the first `floor(queue_len * coverage)` cells immediately, without animation.
    #[tracing::instrument(skip(self, surface))]
    pub fn render_final_state(&mut self, coverage: f64, surface: &mut dyn DrawSurface) {
        let coverage = if coverage.is_nan() {
            0.0
        } else {
            coverage.clamp(0.0, 1.0)
        };
        let target = (self.scheduler.queue().len() as f64 * coverage).floor() as usize;
        self.scheduler
            .draw_until(target, &mut self.grid, &self.config.grid_line, surface);
    }

    /// Frame callback. `gate` is the current extent of the gating region; `None` means no
    /// region is tracked and the animation never pauses.
    pub fn on_frame(
        &mut self,
        now_ms: f64,
        gate: Option<GateRegion>,
        surface: &mut dyn DrawSurface,
        host: &mut dyn FrameHost,
    ) -> FrameOutcome {
        self.scheduler.tick_fired();
        let outcome = match self.phase {
            Phase::Waiting { start_at_ms } => {
                if now_ms >= start_at_ms {
                    self.phase = Phase::Running;
                    self.scheduler.start(now_ms, host);
                    tracing::debug!(queue = self.scheduler.queue().len(), "fill started");
                } else {
                    self.scheduler.request_tick(host);
                }
                FrameOutcome::Idle
            }
            Phase::Running => {
                let height = self.grid.viewport().height;
                let visible = gate.is_none_or(|g| g.is_visible(height));
                self.scheduler.on_frame(
                    now_ms,
                    visible,
                    &mut self.grid,
                    &self.config.grid_line,
                    surface,
                    host,
                )
            }
            Phase::Unmounted | Phase::Static => FrameOutcome::Stopped,
        };
        self.last_outcome = Some(outcome);
        outcome
    }

    /// Regenerate for a new viewport, then fast-forward to the progress fraction reached
    /// before the resize.
    #[tracing::instrument(skip(self, surface))]
    pub fn resize(&mut self, viewport: Viewport, surface: &mut dyn DrawSurface) {
        let progress = self.scheduler.progress();
        self.rebuild(viewport);
        self.paint_base(surface);

        let target = (self.scheduler.queue().len() as f64 * progress).floor() as usize;
        self.scheduler
            .draw_until(target, &mut self.grid, &self.config.grid_line, surface);
        tracing::debug!(progress, fill_index = target, "resized");
    }

    /// Start a new run over the current layout from an empty surface.
    pub fn restart(
        &mut self,
        now_ms: f64,
        surface: &mut dyn DrawSurface,
        host: &mut dyn FrameHost,
    ) {
        self.grid.clear_filled();
        self.scheduler.rewind();
        self.paint_base(surface);
        self.phase = Phase::Running;
        self.last_outcome = None;
        self.scheduler.start(now_ms, host);
    }

    /// Cooperative stop; the next frame callback exits without rescheduling.
    pub fn stop(&mut self) {
        if let Phase::Waiting { .. } = self.phase {
            self.phase = Phase::Running;
        }
        self.scheduler.stop();
    }

    pub fn nudge(&mut self, interaction: Interaction, now_ms: f64) {
        if self.phase != Phase::Running {
            return;
        }
        self.scheduler.nudge(
            interaction,
            now_ms,
            self.config.scroll_boost,
            self.config.hover_boost,
        );
    }

    pub fn state(&self) -> GridState {
        match self.phase {
            Phase::Unmounted => GridState::Unmounted,
            Phase::Waiting { start_at_ms } => GridState::Waiting { start_at_ms },
            Phase::Static => GridState::Static,
            Phase::Running => {
                if self.scheduler.is_animating() {
                    if self.last_outcome == Some(FrameOutcome::Paused) {
                        GridState::Paused
                    } else {
                        GridState::Animating
                    }
                } else if self.scheduler.is_complete() {
                    GridState::Complete
                } else {
                    GridState::Stopped
                }
            }
        }
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            state: self.state(),
            seed: self.seed,
            viewport: self.grid.viewport(),
            cols: self.grid.cols(),
            rows: self.grid.rows(),
            structures: self.structures.len(),
            queue_len: self.scheduler.queue().len(),
            fill_index: self.scheduler.fill_index(),
            progress: self.scheduler.progress(),
        }
    }
}

/// Holds at most one grid instance for the view layer to toggle on and off.
#[derive(Debug, Default)]
pub struct GridSwitch {
    instance: Option<GenerativeGrid>,
}

impl GridSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.instance.is_some()
    }

    /// Create the instance with `make` unless one already exists.
    pub fn enable(
        &mut self,
        make: impl FnOnce() -> InkgridResult<GenerativeGrid>,
    ) -> InkgridResult<&mut GenerativeGrid> {
        let grid = match self.instance.take() {
            Some(g) => g,
            None => make()?,
        };
        Ok(self.instance.insert(grid))
    }

    /// Stop and release the instance.
    pub fn disable(&mut self) -> Option<GenerativeGrid> {
        let mut grid = self.instance.take()?;
        grid.stop();
        Some(grid)
    }

    pub fn get(&self) -> Option<&GenerativeGrid> {
        self.instance.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut GenerativeGrid> {
        self.instance.as_mut()
    }
}
