/// Single coordinate axis used for board width, height, rows and columns.
pub type Coord = u8;

/// Count type used for mine counts, flag counts and total-tile counts.
pub type CellCount = u16;

/// Linear, row-major position of a tile: `col + row * width`.
pub type TileIndex = u16;

/// Two-dimensional coordinates `(row, col)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Maps a linear index to `(row, col)` on a board `width` tiles wide.
pub const fn index_to_coords(index: TileIndex, width: Coord) -> Coord2 {
    let width = width as TileIndex;
    ((index / width) as Coord, (index % width) as Coord)
}

/// Maps `(row, col)` to a linear index on a board `width` tiles wide.
pub const fn coords_to_index((row, col): Coord2, width: Coord) -> TileIndex {
    col as TileIndex + row as TileIndex * width as TileIndex
}

/// Row/column displacements in emission order: down, down-right, down-left, up, up-left, up-right,
/// right, left.
const DISPLACEMENTS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (1, -1),
    (-1, 0),
    (-1, -1),
    (-1, 1),
    (0, 1),
    (0, -1),
];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(coords: Coord2, delta: (i8, i8), bounds: Coord2) -> Option<Coord2> {
    let (row, col) = coords;
    let (d_row, d_col) = delta;
    let (rows, cols) = bounds;

    let next_row = row.checked_add_signed(d_row)?;
    if next_row >= rows {
        return None;
    }

    let next_col = col.checked_add_signed(d_col)?;
    if next_col >= cols {
        return None;
    }

    Some((next_row, next_col))
}

/// Iterator over the in-bounds neighbors of a tile, yielding linear indices.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    index: u8,
}

impl NeighborIter {
    /// An out-of-bounds `center` yields no neighbors.
    pub fn new(center: TileIndex, width: Coord, height: Coord) -> Self {
        let bounds = (height, width);
        let center = if width == 0 {
            (height, 0)
        } else {
            index_to_coords(center, width)
        };
        let index = if center.0 < height && center.1 < width {
            0
        } else {
            DISPLACEMENTS.len() as u8
        };
        Self {
            center,
            bounds,
            index,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = TileIndex;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item =
                apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if let Some(coords) = next_item {
                return Some(coords_to_index(coords, self.bounds.1));
            }
        }
    }
}
