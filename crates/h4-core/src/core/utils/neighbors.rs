//! Open-boundary cell list for short-range candidate search.

use super::geometry::bounding_box;
use nalgebra::Point3;

// Upper bound on allocated cells per member atom before the grid is coarsened.
const MAX_CELLS_PER_MEMBER: usize = 8;
const MIN_CELL_BUDGET: usize = 512;

/// Spatial bins over a subset of atoms.
///
/// Any member within `cell_size` of a query point lies in one of the 27 cells around the
/// point's cell, so [`CellList::candidates`] returns a superset of the true neighbors.
#[derive(Debug, Clone)]
pub struct CellList {
    origin: Point3<f64>,
    cell_size: f64,
    n_cells: [usize; 3],
    cell_start: Vec<u32>,
    cell_count: Vec<u32>,
    sorted_indices: Vec<usize>,
}

impl CellList {
    /// Bins `members` (indices into `positions`) with cells of at least `cutoff` edge length.
    ///
    /// For widely scattered input the edge is doubled until the grid stays within a memory
    /// budget proportional to the member count; candidates remain a superset either way.
    /// Returns `None` when the members span a box no finite grid can cover.
    pub fn build(positions: &[Point3<f64>], members: &[usize], cutoff: f64) -> Option<Self> {
        let Some((min, max)) = bounding_box(members.iter().map(|&i| &positions[i])) else {
            return Some(Self {
                origin: Point3::origin(),
                cell_size: cutoff,
                n_cells: [1; 3],
                cell_start: vec![0],
                cell_count: vec![0],
                sorted_indices: Vec::new(),
            });
        };

        let extent: [f64; 3] = (max - min).into();
        if !cutoff.is_finite() || cutoff <= 0.0 || extent.iter().any(|e| !e.is_finite()) {
            return None;
        }
        let budget = (members.len() * MAX_CELLS_PER_MEMBER).max(MIN_CELL_BUDGET) as f64;
        let mut cell_size = cutoff;
        while Self::grid_shape(&extent, cell_size).iter().product::<f64>() > budget {
            cell_size *= 2.0;
            if !cell_size.is_finite() {
                return None;
            }
        }
        let n_cells = Self::grid_shape(&extent, cell_size).map(|n| n as usize);
        let n_cells_total = n_cells.iter().product::<usize>();

        let cell_of = |i: usize| -> usize {
            let rel = positions[i] - min;
            let cx = ((rel.x / cell_size) as usize).min(n_cells[0] - 1);
            let cy = ((rel.y / cell_size) as usize).min(n_cells[1] - 1);
            let cz = ((rel.z / cell_size) as usize).min(n_cells[2] - 1);
            cx + cy * n_cells[0] + cz * n_cells[0] * n_cells[1]
        };

        let mut sorted_indices = members.to_vec();
        sorted_indices.sort_by_key(|&i| (cell_of(i), i));

        let mut cell_start = vec![0u32; n_cells_total];
        let mut cell_count = vec![0u32; n_cells_total];
        for &idx in &sorted_indices {
            cell_count[cell_of(idx)] += 1;
        }
        let mut offset = 0u32;
        for c in 0..n_cells_total {
            cell_start[c] = offset;
            offset += cell_count[c];
        }

        Some(Self {
            origin: min,
            cell_size,
            n_cells,
            cell_start,
            cell_count,
            sorted_indices,
        })
    }

    // Cells per axis, kept in f64 so huge extents cannot overflow before the budget check.
    fn grid_shape(extent: &[f64; 3], cell_size: f64) -> [f64; 3] {
        extent.map(|e| (e / cell_size).floor() + 1.0)
    }

    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sorted_indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sorted_indices.is_empty()
    }

    /// Member indices, ascending, from the 27 cells surrounding `point`.
    pub fn candidates(&self, point: &Point3<f64>) -> Vec<usize> {
        let mut found = Vec::new();
        if self.sorted_indices.is_empty() {
            return found;
        }

        let rel = point - self.origin;
        let [nx, ny, nz] = self.n_cells.map(|n| n as i64);
        // Clamped so that the +-1 neighbor offsets below cannot overflow.
        let home = [(rel.x, nx), (rel.y, ny), (rel.z, nz)]
            .map(|(d, n)| ((d / self.cell_size).floor() as i64).clamp(-2, n + 1));

        for dz in -1..=1 {
            let cz = home[2] + dz;
            if !(0..nz).contains(&cz) {
                continue;
            }
            for dy in -1..=1 {
                let cy = home[1] + dy;
                if !(0..ny).contains(&cy) {
                    continue;
                }
                for dx in -1..=1 {
                    let cx = home[0] + dx;
                    if !(0..nx).contains(&cx) {
                        continue;
                    }
                    let cell = (cx + cy * nx + cz * nx * ny) as usize;
                    let start = self.cell_start[cell] as usize;
                    let count = self.cell_count[cell] as usize;
                    found.extend_from_slice(&self.sorted_indices[start..start + count]);
                }
            }
        }

        found.sort_unstable();
        found
    }
}
