use crate::foundation::core::{Point, Rect, Rgba8, Viewport};

/// Integer cell address, row-major.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct CellCoord {
    pub row: usize,
    pub col: usize,
}

impl CellCoord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Option<Rgba8>, // set only when a structure claims the cell
    pub filled: bool,
    pub structure_id: Option<u32>,
}

impl GridCell {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn coord(&self) -> CellCoord {
        CellCoord::new(self.row, self.col)
    }
}

/// Row-major cell lattice covering a viewport exactly.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Grid {
    viewport: Viewport,
    cell_size: f64,
    cols: usize,
    rows: usize,
    cells: Vec<GridCell>,
}

impl Grid {
    /// Tile `viewport` with `cell_size` squares. The last column and row shrink to the
    /// remainder so the union of cells is exactly the viewport.
    pub fn new(viewport: Viewport, cell_size: f64) -> Self {
        let cols = span_count(viewport.width, cell_size);
        let rows = span_count(viewport.height, cell_size);

        let mut cells = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                let x = col as f64 * cell_size;
                let y = row as f64 * cell_size;
                let width = if col + 1 == cols {
                    viewport.width - x
                } else {
                    cell_size
                };
                let height = if row + 1 == rows {
                    viewport.height - y
                } else {
                    cell_size
                };
                cells.push(GridCell {
                    row,
                    col,
                    x,
                    y,
                    width,
                    height,
                    color: None,
                    filled: false,
                    structure_id: None,
                });
            }
        }

        Self {
            viewport,
            cell_size,
            cols,
            rows,
            cells,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn index_of(&self, at: CellCoord) -> Option<usize> {
        (at.row < self.rows && at.col < self.cols).then_some(at.row * self.cols + at.col)
    }

    pub fn get(&self, at: CellCoord) -> Option<&GridCell> {
        self.index_of(at).map(|i| &self.cells[i])
    }

    pub fn cell(&self, index: usize) -> Option<&GridCell> {
        self.cells.get(index)
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> Option<&mut GridCell> {
        self.cells.get_mut(index)
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.filled).count()
    }

    pub(crate) fn clear_filled(&mut self) {
        for c in &mut self.cells {
            c.filled = false;
        }
    }

    /// Base lattice: interior vertical lines then interior horizontal lines, each spanning
    /// the full viewport. Lines on the outer border are not included.
    pub fn lattice_lines(&self) -> Vec<(Point, Point)> {
        let mut lines = Vec::new();
        if self.cell_size <= 0.0 {
            return lines;
        }
        let Viewport { width, height } = self.viewport;

        let mut x = self.cell_size;
        while x < width {
            lines.push((Point::new(x, 0.0), Point::new(x, height)));
            x += self.cell_size;
        }
        let mut y = self.cell_size;
        while y < height {
            lines.push((Point::new(0.0, y), Point::new(width, y)));
            y += self.cell_size;
        }
        lines
    }

    /// Right and bottom separators of one cell, omitted where they would sit on the
    /// viewport border.
    pub fn cell_edge_lines(&self, cell: &GridCell) -> Vec<(Point, Point)> {
        let mut lines = Vec::with_capacity(2);
        let right = cell.x + cell.width;
        let bottom = cell.y + cell.height;
        if right < self.viewport.width {
            lines.push((Point::new(right, cell.y), Point::new(right, bottom)));
        }
        if bottom < self.viewport.height {
            lines.push((Point::new(cell.x, bottom), Point::new(right, bottom)));
        }
        lines
    }
}

fn span_count(extent: f64, cell_size: f64) -> usize {
    if extent <= 0.0 || cell_size <= 0.0 {
        return 0;
    }
    (extent / cell_size).ceil() as usize
}
