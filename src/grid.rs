/// Row-major flat grid, `index = row * cols + col`.
/// Dimensions are fixed once allocated.
#[derive(Clone, Debug)]
pub struct Grid<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::default(); rows * cols],
            rows,
            cols,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row * self.cols + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[self.idx(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, v: T) {
        let i = self.idx(row, col);
        self.data[i] = v;
    }

    /// Overwrite every cell without reallocating.
    pub fn fill(&mut self, v: T) {
        self.data.fill(v);
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

#[inline]
pub fn in_bounds(row: i64, col: i64, rows: usize, cols: usize) -> bool {
    row >= 0 && row < rows as i64 && col >= 0 && col < cols as i64
}

/// Resolve a possibly out-of-range position. With `wrap` both axes are
/// taken modulo the grid size (torus); otherwise out-of-range is `None`.
#[inline]
pub fn resolve(row: i64, col: i64, rows: usize, cols: usize, wrap: bool) -> Option<(usize, usize)> {
    if in_bounds(row, col, rows, cols) {
        return Some((row as usize, col as usize));
    }
    if !wrap || rows == 0 || cols == 0 {
        return None;
    }
    let r = row.rem_euclid(rows as i64) as usize;
    let c = col.rem_euclid(cols as i64) as usize;
    Some((r, c))
}

const OFFSETS8: [(i64, i64); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

/// The 8-connected neighborhood of `(row, col)`.
/// On grids narrower than 3 cells a wrapped neighbor may repeat.
pub fn neighbors8(
    row: usize,
    col: usize,
    rows: usize,
    cols: usize,
    wrap: bool,
) -> impl Iterator<Item = (usize, usize)> {
    let mut out = [(0usize, 0usize); 8];
    let mut n = 0;
    for (dr, dc) in OFFSETS8 {
        if let Some(pos) = resolve(row as i64 + dr, col as i64 + dc, rows, cols, wrap) {
            out[n] = pos;
            n += 1;
        }
    }
    out.into_iter().take(n)
}
