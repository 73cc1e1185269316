use crate::{foundation::core::Rgba8, grid::CellCoord, palette::Palette, random::SeededRandom};

/// Placement attempts per generation pass.
pub const DEFAULT_ATTEMPTS: u32 = 150;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    HorizontalBar,
    Square,
    Rectangle,
    VerticalBar,
    LShape,
}

impl StructureKind {
    /// Map one uniform draw onto the kind thresholds
    /// `[0,.15) [.15,.5) [.5,.85) [.85,.95) [.95,1)`.
    pub fn from_roll(roll: f64) -> Self {
        if roll < 0.15 {
            Self::HorizontalBar
        } else if roll < 0.5 {
            Self::Square
        } else if roll < 0.85 {
            Self::Rectangle
        } else if roll < 0.95 {
            Self::VerticalBar
        } else {
            Self::LShape
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Structure {
    pub id: u32,
    pub color: Rgba8,
    pub kind: StructureKind,
    pub cells: Vec<CellCoord>,
}

/// `rows x cols` claim map.
#[derive(Clone, Debug)]
pub struct CoverageMap {
    cols: usize,
    rows: usize,
    covered: Vec<bool>,
}

impl CoverageMap {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            covered: vec![false; cols * rows],
        }
    }

    /// Out-of-range coordinates report as covered so they can never be claimed.
    pub fn is_covered(&self, at: CellCoord) -> bool {
        if at.row >= self.rows || at.col >= self.cols {
            return true;
        }
        self.covered[at.row * self.cols + at.col]
    }

    pub fn all_free(&self, cells: &[CellCoord]) -> bool {
        cells.iter().all(|c| !self.is_covered(*c))
    }

    fn claim(&mut self, cells: &[CellCoord]) {
        for c in cells {
            self.covered[c.row * self.cols + c.col] = true;
        }
    }

    pub fn covered_count(&self) -> usize {
        self.covered.iter().filter(|c| **c).count()
    }
}

/// First-fit placement of non-overlapping colored structures on a `cols x rows` lattice.
#[derive(Clone, Debug)]
pub struct StructureGenerator {
    pub attempts: u32,
}

impl Default for StructureGenerator {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
        }
    }
}

impl StructureGenerator {
    pub fn new(attempts: u32) -> Self {
        Self { attempts }
    }

    /// Run exactly `attempts` placement attempts. Candidates that touch an already covered
    /// cell are dropped whole; there is no retry within an attempt. Ids are assigned per
    /// attempt, so skipped attempts leave gaps in the id sequence.
    #[tracing::instrument(skip(self, rng, palette))]
    pub fn generate(
        &self,
        cols: usize,
        rows: usize,
        rng: &mut SeededRandom,
        palette: &Palette,
    ) -> Vec<Structure> {
        let mut structures = Vec::new();
        if cols == 0 || rows == 0 {
            return structures;
        }

        let mut coverage = CoverageMap::new(cols, rows);
        for id in 0..self.attempts {
            let kind = StructureKind::from_roll(rng.next_f64());
            let cells = match kind {
                StructureKind::HorizontalBar => horizontal_bar(cols, rows, rng),
                StructureKind::Square => square(cols, rows, rng),
                StructureKind::Rectangle => rectangle(cols, rows, rng),
                StructureKind::VerticalBar => vertical_bar(cols, rows, rng),
                StructureKind::LShape => l_shape(cols, rows, rng),
            };

            if cells.is_empty() || !coverage.all_free(&cells) {
                continue;
            }
            let Some(color) = palette.pick(rng) else {
                continue;
            };

            coverage.claim(&cells);
            structures.push(Structure {
                id,
                color,
                kind,
                cells,
            });
        }

        tracing::debug!(
            placed = structures.len(),
            covered = coverage.covered_count(),
            "structures generated"
        );
        structures
    }
}

/// `floor(r * (dim - span))`, or 0 when the span does not fit.
fn start_within(rng: &mut SeededRandom, dim: usize, span: usize) -> usize {
    let r = rng.next_f64();
    if span >= dim {
        return 0;
    }
    (r * (dim - span) as f64).floor() as usize
}

/// Cells of a `height x width` block at `(row0, col0)`, clipped to the lattice.
fn block(
    row0: usize,
    col0: usize,
    height: usize,
    width: usize,
    cols: usize,
    rows: usize,
) -> Vec<CellCoord> {
    let row_end = (row0 + height).min(rows);
    let col_end = (col0 + width).min(cols);
    let mut cells =
        Vec::with_capacity(row_end.saturating_sub(row0) * col_end.saturating_sub(col0));
    for row in row0..row_end {
        for col in col0..col_end {
            cells.push(CellCoord::new(row, col));
        }
    }
    cells
}

fn horizontal_bar(cols: usize, rows: usize, rng: &mut SeededRandom) -> Vec<CellCoord> {
    let start_row = rng.below(rows);
    let height = (1 + rng.below(3)).min(rows - start_row);
    block(start_row, 0, height, cols, cols, rows)
}

fn square(cols: usize, rows: usize, rng: &mut SeededRandom) -> Vec<CellCoord> {
    let size = 2 + rng.below(8);
    let start_row = start_within(rng, rows, size);
    let start_col = start_within(rng, cols, size);
    block(start_row, start_col, size, size, cols, rows)
}

fn rectangle(cols: usize, rows: usize, rng: &mut SeededRandom) -> Vec<CellCoord> {
    let width = 3 + rng.below(10);
    let height = 2 + rng.below(6);
    let start_row = start_within(rng, rows, height);
    let start_col = start_within(rng, cols, width);
    block(start_row, start_col, height, width, cols, rows)
}

fn vertical_bar(cols: usize, rows: usize, rng: &mut SeededRandom) -> Vec<CellCoord> {
    let start_col = rng.below(cols);
    let width = (1 + rng.below(2)).min(cols - start_col);
    let start_row = (rng.next_f64() * rows as f64 * 0.3).floor() as usize;
    let height = (rows as f64 * 0.4).floor() as usize
        + (rng.next_f64() * rows as f64 * 0.3).floor() as usize;
    block(start_row.min(rows), start_col, height, width, cols, rows)
}

/// Vertical run down `start_col`, then a run of the same length along its bottom row,
/// sharing the corner cell.
fn l_shape(cols: usize, rows: usize, rng: &mut SeededRandom) -> Vec<CellCoord> {
    let size = 4 + rng.below(5);
    let start_row = start_within(rng, rows, size);
    let start_col = start_within(rng, cols, size);

    let bottom = (start_row + size).min(rows) - 1;
    let mut cells: Vec<CellCoord> = (start_row..=bottom)
        .map(|row| CellCoord::new(row, start_col))
        .collect();
    let col_end = (start_col + size).min(cols);
    cells.extend((start_col + 1..col_end).map(|col| CellCoord::new(bottom, col)));
    cells
}
