use crate::{
    grid::Grid,
    surface::{DrawSurface, LineStyle},
};

pub const DEFAULT_TARGET_FPS: f64 = 35.0;

/// Cells per accepted frame at multiplier 1 are `ceil(FILL_RATE_BASE / fps)`.
const FILL_RATE_BASE: f64 = 100.0;

/// The host side of the animation loop: asks for the frame callback to run again.
///
/// A browser embedding maps this onto `requestAnimationFrame`; tests use [`ManualHost`].
pub trait FrameHost {
    fn schedule_next_tick(&mut self);
}

/// Counts outstanding tick requests instead of running a real frame clock.
#[derive(Clone, Debug, Default)]
pub struct ManualHost {
    pending: usize,
    requested: u64,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one outstanding request. Returns `false` when the loop has stopped asking.
    pub fn take_pending(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        self.pending -= 1;
        true
    }

    pub fn has_pending(&self) -> bool {
        self.pending > 0
    }

    /// Outstanding requests not yet consumed.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }
}

impl FrameHost for ManualHost {
    fn schedule_next_tick(&mut self) {
        self.pending += 1;
        self.requested += 1;
    }
}

/// Monotonic fake clock advancing by a fixed step (ms).
#[derive(Clone, Copy, Debug)]
pub struct SyntheticClock {
    now_ms: f64,
    step_ms: f64,
}

impl SyntheticClock {
    pub fn new(start_ms: f64, step_ms: f64) -> Self {
        Self {
            now_ms: start_ms,
            step_ms,
        }
    }

    /// ~60 Hz display refresh.
    pub fn display_60hz() -> Self {
        Self::new(0.0, 1000.0 / 60.0)
    }

    pub fn now(&self) -> f64 {
        self.now_ms
    }

    pub fn advance(&mut self) -> f64 {
        self.now_ms += self.step_ms;
        self.now_ms
    }
}

/// Vertical extent of the gating region, in viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GateRegion {
    pub top: f64,
    pub bottom: f64,
}

impl GateRegion {
    pub fn is_visible(self, viewport_height: f64) -> bool {
        self.bottom > 0.0 && self.top < viewport_height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum FrameOutcome {
    /// Not animating; the loop did not reschedule itself.
    Stopped,
    /// Gate region hidden past the pause threshold; rescheduled without drawing.
    Paused,
    /// Frame interval not yet elapsed; rescheduled without drawing.
    Idle,
    /// One fill step was applied.
    Stepped { drawn: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoostSpec {
    pub multiplier: f64,
    /// `None` holds the boost until it is explicitly released.
    pub duration_ms: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interaction {
    Scroll,
    HoverEnter,
    HoverLeave,
}

/// Transient fill-rate multiplier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FillBoost {
    multiplier: f64,
    expires_at_ms: Option<f64>,
}

impl Default for FillBoost {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            expires_at_ms: None,
        }
    }
}

impl FillBoost {
    pub fn arm(&mut self, spec: BoostSpec, now_ms: f64) {
        self.multiplier = spec.multiplier;
        self.expires_at_ms = spec.duration_ms.map(|d| now_ms + d);
    }

    pub fn release(&mut self) {
        *self = Self::default();
    }

    pub fn multiplier_at(&self, now_ms: f64) -> f64 {
        match self.expires_at_ms {
            Some(t) if now_ms >= t => 1.0,
            _ => self.multiplier,
        }
    }
}

/// Drives one fill queue onto a surface, one paced step per accepted frame.
#[derive(Clone, Debug)]
pub struct FillScheduler {
    queue: Vec<usize>,
    fill_index: usize,
    animating: bool,
    last_frame_ms: f64,
    target_fps: f64,
    frame_interval_ms: f64,
    pause_threshold: f64,
    boost: FillBoost,
    tick_requested: bool, // a host tick is outstanding
}

impl FillScheduler {
    pub fn new(target_fps: f64, pause_threshold: f64) -> Self {
        Self {
            queue: Vec::new(),
            fill_index: 0,
            animating: false,
            last_frame_ms: 0.0,
            target_fps,
            frame_interval_ms: 1000.0 / target_fps,
            pause_threshold,
            boost: FillBoost::default(),
            tick_requested: false,
        }
    }

    /// Replace the queue and rewind the cursor. The animating flag is left untouched.
    pub fn set_queue(&mut self, queue: Vec<usize>) {
        self.queue = queue;
        self.fill_index = 0;
    }

    pub fn queue(&self) -> &[usize] {
        &self.queue
    }

    pub fn fill_index(&self) -> usize {
        self.fill_index
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn is_complete(&self) -> bool {
        self.fill_index >= self.queue.len()
    }

    pub fn frame_interval_ms(&self) -> f64 {
        self.frame_interval_ms
    }

    /// Drawn fraction in `[0, 1]`; an empty queue reports 0.
    pub fn progress(&self) -> f64 {
        if self.queue.is_empty() {
            return 0.0;
        }
        self.fill_index as f64 / self.queue.len() as f64
    }

    pub fn multiplier_at(&self, now_ms: f64) -> f64 {
        self.boost.multiplier_at(now_ms)
    }

    pub fn fills_per_frame(&self, now_ms: f64) -> usize {
        let n = (FILL_RATE_BASE / self.target_fps * self.multiplier_at(now_ms)).ceil();
        (n as usize).max(1)
    }

    /// Begin (or resume) animating from `now_ms`. When a tick is already outstanding it is
    /// reused, so a loop never runs as two callback chains.
    pub fn start(&mut self, now_ms: f64, host: &mut dyn FrameHost) {
        self.animating = true;
        self.last_frame_ms = now_ms;
        self.request_tick(host);
    }

    pub(crate) fn request_tick(&mut self, host: &mut dyn FrameHost) {
        if !self.tick_requested {
            self.tick_requested = true;
            host.schedule_next_tick();
        }
    }

    /// Mark the outstanding tick as delivered.
    pub(crate) fn tick_fired(&mut self) {
        self.tick_requested = false;
    }

    /// Cooperative: takes effect at the next frame callback.
    pub fn stop(&mut self) {
        self.animating = false;
    }

    pub(crate) fn rewind(&mut self) {
        self.fill_index = 0;
        self.boost.release();
    }

    /// Apply an interaction nudge. Ignored unless animating.
    pub fn nudge(
        &mut self,
        interaction: Interaction,
        now_ms: f64,
        scroll: BoostSpec,
        hover: BoostSpec,
    ) {
        if !self.animating {
            return;
        }
        match interaction {
            Interaction::Scroll => self.boost.arm(scroll, now_ms),
            Interaction::HoverEnter => self.boost.arm(hover, now_ms),
            Interaction::HoverLeave => self.boost.release(),
        }
    }

    /// One invocation of the frame callback.
    pub fn on_frame(
        &mut self,
        now_ms: f64,
        gate_visible: bool,
        grid: &mut Grid,
        line: &LineStyle,
        surface: &mut dyn DrawSurface,
        host: &mut dyn FrameHost,
    ) -> FrameOutcome {
        self.tick_fired();
        if !self.animating {
            return FrameOutcome::Stopped;
        }

        // Hidden gate pauses only once the cursor is past the threshold fraction.
        let threshold = self.queue.len() as f64 * self.pause_threshold;
        if !gate_visible && self.fill_index as f64 > threshold {
            self.request_tick(host);
            return FrameOutcome::Paused;
        }

        let delta = now_ms - self.last_frame_ms;
        let outcome = if delta >= self.frame_interval_ms {
            let drawn = self.step(now_ms, grid, line, surface);
            self.last_frame_ms = now_ms - delta % self.frame_interval_ms;
            FrameOutcome::Stepped { drawn }
        } else {
            FrameOutcome::Idle
        };

        self.request_tick(host);
        outcome
    }

    fn step(
        &mut self,
        now_ms: f64,
        grid: &mut Grid,
        line: &LineStyle,
        surface: &mut dyn DrawSurface,
    ) -> usize {
        let before = self.fill_index;
        let target = (before + self.fills_per_frame(now_ms)).min(self.queue.len());
        self.draw_until(target, grid, line, surface);
        if self.is_complete() {
            self.animating = false;
            tracing::debug!(cells = self.queue.len(), "fill complete");
        }
        tracing::trace!(from = before, to = self.fill_index, "fill step");
        self.fill_index - before
    }

    /// Draw queue entries from the cursor up to `target` (clamped to the queue length) and
    /// move the cursor there. A target behind the cursor draws nothing.
    pub fn draw_until(
        &mut self,
        target: usize,
        grid: &mut Grid,
        line: &LineStyle,
        surface: &mut dyn DrawSurface,
    ) {
        let target = target.min(self.queue.len());
        while self.fill_index < target {
            paint_cell(grid, self.queue[self.fill_index], line, surface);
            self.fill_index += 1;
        }
    }
}

/// Fill one cell at full opacity, then restore its right/bottom separators.
pub fn paint_cell(
    grid: &mut Grid,
    index: usize,
    line: &LineStyle,
    surface: &mut dyn DrawSurface,
) {
    let Some(cell) = grid.cell(index) else {
        return;
    };
    if let Some(color) = cell.color {
        surface.fill_rect(cell.rect(), color);
    }
    for (from, to) in grid.cell_edge_lines(cell) {
        surface.stroke_line(from, to, line);
    }
    if let Some(cell) = grid.cell_mut(index) {
        cell.filled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fill::build_queue,
        foundation::core::{Rgba8, Viewport},
        grid::CellCoord,
        structures::{Structure, StructureKind},
        surface::RecordingSurface,
    };

    fn fixture(cells: usize) -> (Grid, FillScheduler) {
        let mut grid = Grid::new(Viewport::new(320.0, 320.0).unwrap(), 32.0);
        let structures = vec![Structure {
            id: 0,
            color: Rgba8::rgb(10, 20, 30),
            kind: StructureKind::HorizontalBar,
            cells: (0..cells).map(|i| CellCoord::new(i / 10, i % 10)).collect(),
        }];
        let queue = build_queue(&mut grid, &structures);
        let mut s = FillScheduler::new(DEFAULT_TARGET_FPS, 0.5);
        s.set_queue(queue);
        (grid, s)
    }

    #[test]
    fn fills_per_frame_follows_fps_and_boost() {
        let mut s = FillScheduler::new(35.0, 0.5);
        assert_eq!(s.fills_per_frame(0.0), 3);

        s.animating = true;
        let scroll = BoostSpec {
            multiplier: 1.5,
            duration_ms: Some(500.0),
        };
        let hover = BoostSpec {
            multiplier: 1.3,
            duration_ms: None,
        };
        s.nudge(Interaction::Scroll, 100.0, scroll, hover);
        assert_eq!(s.fills_per_frame(200.0), 5);
        assert_eq!(s.fills_per_frame(600.0), 3);

        s.nudge(Interaction::HoverEnter, 700.0, scroll, hover);
        assert_eq!(s.fills_per_frame(100_000.0), 4);
        s.nudge(Interaction::HoverLeave, 100_001.0, scroll, hover);
        assert_eq!(s.fills_per_frame(100_002.0), 3);
    }

    #[test]
    fn nudges_ignored_when_idle() {
        let mut s = FillScheduler::new(35.0, 0.5);
        let spec = BoostSpec {
            multiplier: 3.0,
            duration_ms: None,
        };
        s.nudge(Interaction::Scroll, 0.0, spec, spec);
        assert_eq!(s.multiplier_at(1.0), 1.0);
    }

    #[test]
    fn frame_pacing_carries_remainder() {
        let (mut grid, mut s) = fixture(100);
        let mut surface = RecordingSurface::new();
        let mut host = ManualHost::new();
        let line = LineStyle::default();
        let interval = s.frame_interval_ms();

        s.start(0.0, &mut host);
        assert_eq!(
            s.on_frame(interval * 0.5, true, &mut grid, &line, &mut surface, &mut host),
            FrameOutcome::Idle
        );
        // 2.5 intervals elapsed: one step, last frame lands on 2 intervals.
        let out = s.on_frame(interval * 2.5, true, &mut grid, &line, &mut surface, &mut host);
        assert_eq!(out, FrameOutcome::Stepped { drawn: 3 });
        assert!((s.last_frame_ms - interval * 2.0).abs() < 1e-9);
        // Only half an interval since the carried timestamp.
        assert_eq!(
            s.on_frame(interval * 2.9, true, &mut grid, &line, &mut surface, &mut host),
            FrameOutcome::Idle
        );
        assert!(matches!(
            s.on_frame(interval * 3.05, true, &mut grid, &line, &mut surface, &mut host),
            FrameOutcome::Stepped { .. }
        ));
    }

    #[test]
    fn completes_then_stops_rescheduling() {
        let (mut grid, mut s) = fixture(7);
        let mut surface = RecordingSurface::new();
        let mut host = ManualHost::new();
        let line = LineStyle::default();

        s.start(0.0, &mut host);
        let mut now = 0.0;
        let mut last = FrameOutcome::Idle;
        while host.take_pending() {
            now += 30.0;
            last = s.on_frame(now, true, &mut grid, &line, &mut surface, &mut host);
            assert!(s.fill_index() <= s.queue().len());
        }
        assert_eq!(last, FrameOutcome::Stopped);
        assert!(s.is_complete());
        assert!(!s.is_animating());
        assert_eq!(surface.fill_count(), 7);
        assert_eq!(grid.filled_count(), 7);
    }

    #[test]
    fn hidden_gate_pauses_only_past_threshold() {
        let (mut grid, mut s) = fixture(100);
        let mut surface = RecordingSurface::new();
        let mut host = ManualHost::new();
        let line = LineStyle::default();

        s.start(0.0, &mut host);
        // Below half: hidden gate does not pause.
        assert!(matches!(
            s.on_frame(100.0, false, &mut grid, &line, &mut surface, &mut host),
            FrameOutcome::Stepped { .. }
        ));

        s.draw_until(51, &mut grid, &line, &mut surface);
        let before = s.fill_index();
        let requested = host.requested();
        assert_eq!(
            s.on_frame(10_000.0, false, &mut grid, &line, &mut surface, &mut host),
            FrameOutcome::Paused
        );
        assert_eq!(s.fill_index(), before);
        assert_eq!(host.requested(), requested + 1);
        assert!(s.is_animating());

        assert!(matches!(
            s.on_frame(10_100.0, true, &mut grid, &line, &mut surface, &mut host),
            FrameOutcome::Stepped { .. }
        ));
    }

    #[test]
    fn stop_is_observed_on_next_frame() {
        let (mut grid, mut s) = fixture(50);
        let mut surface = RecordingSurface::new();
        let mut host = ManualHost::new();
        let line = LineStyle::default();

        s.start(0.0, &mut host);
        s.stop();
        let requested = host.requested();
        assert_eq!(
            s.on_frame(1000.0, true, &mut grid, &line, &mut surface, &mut host),
            FrameOutcome::Stopped
        );
        assert_eq!(host.requested(), requested);
        assert_eq!(surface.fill_count(), 0);
    }

    #[test]
    fn start_reuses_an_outstanding_tick() {
        let (mut grid, mut s) = fixture(40);
        let mut surface = RecordingSurface::new();
        let mut host = ManualHost::new();
        let line = LineStyle::default();

        s.start(0.0, &mut host);
        s.start(5.0, &mut host);
        assert_eq!(host.pending(), 1);

        // Stop then start before the stale tick fires: still one chain.
        s.stop();
        s.start(10.0, &mut host);
        assert_eq!(host.pending(), 1);

        let mut now = 10.0;
        while host.take_pending() {
            now += 30.0;
            s.on_frame(now, true, &mut grid, &line, &mut surface, &mut host);
            assert!(host.pending() <= 1);
        }
        assert!(s.is_complete());
        assert_eq!(surface.fill_count(), 40);
    }

    #[test]
    fn empty_queue_finishes_on_first_step() {
        let (mut grid, mut s) = fixture(0);
        let mut surface = RecordingSurface::new();
        let mut host = ManualHost::new();
        let line = LineStyle::default();

        assert_eq!(s.progress(), 0.0);
        s.start(0.0, &mut host);
        assert_eq!(
            s.on_frame(100.0, true, &mut grid, &line, &mut surface, &mut host),
            FrameOutcome::Stepped { drawn: 0 }
        );
        assert!(!s.is_animating());
    }

    #[test]
    fn border_cells_skip_border_lines() {
        let mut grid = Grid::new(Viewport::new(64.0, 64.0).unwrap(), 32.0);
        let structures = vec![Structure {
            id: 0,
            color: Rgba8::rgb(1, 1, 1),
            kind: StructureKind::Square,
            cells: vec![CellCoord::new(1, 1)],
        }];
        let queue = build_queue(&mut grid, &structures);
        let mut surface = RecordingSurface::new();
        paint_cell(&mut grid, queue[0], &LineStyle::default(), &mut surface);
        assert_eq!(surface.fill_count(), 1);
        assert_eq!(surface.line_count(), 0);
    }
}
