use crate::{grid::Grid, structures::Structure};

/// Flatten structures into a fill order and stamp each claimed cell with its structure's
/// color and id.
///
/// The result holds cell indices into `grid`, sorted by `(row, col)` no matter which
/// structure a cell came from or the order structures were placed in. Coordinates outside
/// the grid are ignored.
pub fn build_queue(grid: &mut Grid, structures: &[Structure]) -> Vec<usize> {
    let mut queue = Vec::with_capacity(structures.iter().map(|s| s.cells.len()).sum());

    for structure in structures {
        for &at in &structure.cells {
            let Some(index) = grid.index_of(at) else {
                continue;
            };
            if let Some(cell) = grid.cell_mut(index) {
                cell.color = Some(structure.color);
                cell.structure_id = Some(structure.id);
                queue.push(index);
            }
        }
    }

    // Row-major indices already sort as (row, col).
    queue.sort_unstable();
    queue.dedup();
    queue
}
