use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::Params;
use crate::decay::Decay;
use crate::error::{Error, Result};
use crate::grid::{Grid, neighbors8};
use crate::patterns::Pattern;

/// Width of the uniform draw used by `randomize`. `floor(u * 1.75)` is
/// nonzero with probability 0.75 / 1.75.
const SEED_SPREAD: f64 = 1.75;

/// B3/S23.
#[inline]
pub fn next_state(alive: bool, neighbors: u8) -> bool {
    matches!((alive, neighbors), (true, 2) | (true, 3) | (false, 3))
}

#[inline]
fn count_live(alive: &Grid<bool>, row: usize, col: usize, wrap: bool) -> u8 {
    neighbors8(row, col, alive.rows(), alive.cols(), wrap)
        .filter(|&(r, c)| alive.get(r, c))
        .count() as u8
}

/// What the render sink sees for one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellView {
    pub row: usize,
    pub col: usize,
    pub alive: bool,
    pub alpha: f32,
}

/// Double-buffered Life grid with a fading alpha trail.
///
/// Generations are computed into `next_alive` from a full snapshot of
/// neighbor counts and only then copied over `alive`, so no cell ever sees
/// a neighbor's next state within the same generation.
pub struct GridSimulation {
    alive: Grid<bool>,
    /// Only meaningful between `compute_next` and `apply_next`.
    next_alive: Grid<bool>,
    neighbors: Grid<u8>,
    alpha: Grid<f32>,
    wrap: bool,

    paused: bool,
    timer_ms: f64,
    interval_ms: f64,
    decay: Decay,

    generation: u64,
    rng: StdRng,
}

impl GridSimulation {
    /// Allocate a `rows x cols` grid with the default rates. When `seed` is
    /// set the grid is randomized straight away.
    pub fn new(rows: usize, cols: usize, wrap: bool, seed: bool) -> Self {
        let defaults = Params::default();
        let decay = Decay::new(defaults.decay_factor, defaults.decay_epsilon);
        let mut sim = Self::build(
            rows,
            cols,
            wrap,
            defaults.update_interval_ms(),
            decay,
            StdRng::from_os_rng(),
        );
        if seed {
            sim.randomize();
        }
        sim
    }

    pub fn from_params(params: &Params) -> Result<Self> {
        params.validate()?;
        let rng = match params.rng_seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        let mut sim = Self::build(
            params.rows,
            params.cols,
            params.wrap,
            params.update_interval_ms(),
            Decay::new(params.decay_factor, params.decay_epsilon),
            rng,
        );
        if params.seed {
            sim.randomize();
        }
        debug!(
            "simulation {}x{} wrap={} interval={:.1}ms decay={:?}",
            params.rows,
            params.cols,
            params.wrap,
            sim.interval_ms,
            sim.decay
        );
        Ok(sim)
    }

    fn build(
        rows: usize,
        cols: usize,
        wrap: bool,
        interval_ms: f64,
        decay: Decay,
        rng: StdRng,
    ) -> Self {
        Self {
            alive: Grid::new(rows, cols),
            next_alive: Grid::new(rows, cols),
            neighbors: Grid::new(rows, cols),
            alpha: Grid::new(rows, cols),
            wrap,
            paused: false,
            timer_ms: 0.0,
            interval_ms,
            decay,
            generation: 0,
            rng,
        }
    }

    pub fn randomize(&mut self) {
        let rng = &mut self.rng;
        for (alive, alpha) in self
            .alive
            .as_mut_slice()
            .iter_mut()
            .zip(self.alpha.as_mut_slice())
        {
            let draw = (rng.random::<f64>() * SEED_SPREAD).floor();
            *alive = draw != 0.0;
            *alpha = draw as f32;
        }
        self.recount_neighbors();
    }

    pub fn clear(&mut self) {
        self.alive.fill(false);
        self.alpha.fill(0.0);
        self.neighbors.fill(0);
    }

    /// Stamp `pattern` with its top-left corner at `(row, col)`.
    /// Nothing is written unless the whole pattern fits.
    pub fn place(&mut self, pattern: &Pattern, row: usize, col: usize) -> Result<()> {
        let mut targets = Vec::with_capacity(pattern.cells.len());
        for &(dr, dc) in pattern.cells {
            match (row.checked_add(dr), col.checked_add(dc)) {
                (Some(r), Some(c)) => {
                    self.check_bounds(r, c)?;
                    targets.push((r, c));
                }
                _ => return Err(self.out_of_bounds(row.saturating_add(dr), col.saturating_add(dc))),
            }
        }
        for (r, c) in targets {
            self.alive.set(r, c, true);
            self.alpha.set(r, c, 1.0);
        }
        self.recount_neighbors();
        Ok(())
    }

    /// Set a single cell. Neighbor counts around it are kept current.
    pub fn set_alive(&mut self, row: usize, col: usize, alive: bool) -> Result<()> {
        self.check_bounds(row, col)?;
        self.alive.set(row, col, alive);
        if alive {
            self.alpha.set(row, col, 1.0);
        }
        let (rows, cols) = (self.rows(), self.cols());
        for (r, c) in neighbors8(row, col, rows, cols, self.wrap) {
            let n = count_live(&self.alive, r, c, self.wrap);
            self.neighbors.set(r, c, n);
        }
        Ok(())
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<()> {
        if row < self.rows() && col < self.cols() {
            Ok(())
        } else {
            Err(self.out_of_bounds(row, col))
        }
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> Error {
        Error::OutOfBounds {
            row,
            col,
            rows: self.rows(),
            cols: self.cols(),
        }
    }

    pub fn advance_generation(&mut self) {
        self.recount_neighbors();
        self.compute_next();
        self.apply_next();
        self.generation += 1;
        if log::log_enabled!(log::Level::Trace) {
            trace!("generation {} population {}", self.generation, self.population());
        }
    }

    fn recount_neighbors(&mut self) {
        let cols = self.cols();
        if cols == 0 {
            return;
        }
        let alive = &self.alive;
        let wrap = self.wrap;
        self.neighbors
            .as_mut_slice()
            .par_chunks_mut(cols)
            .enumerate()
            .for_each(|(row, out)| {
                for (col, n) in out.iter_mut().enumerate() {
                    *n = count_live(alive, row, col, wrap);
                }
            });
    }

    fn compute_next(&mut self) {
        self.next_alive
            .as_mut_slice()
            .par_iter_mut()
            .zip(self.alive.as_slice().par_iter())
            .zip(self.neighbors.as_slice().par_iter())
            .for_each(|((next, &alive), &n)| *next = next_state(alive, n));
    }

    fn apply_next(&mut self) {
        self.alive
            .as_mut_slice()
            .copy_from_slice(self.next_alive.as_slice());
    }

    pub fn update_visual_alpha(&mut self) {
        let decay = self.decay;
        self.alpha
            .as_mut_slice()
            .par_iter_mut()
            .zip(self.alive.as_slice().par_iter())
            .for_each(|(alpha, &alive)| {
                *alpha = if alive { 1.0 } else { decay.step(*alpha) };
            });
    }

    /// Feed one frame's elapsed time. Advances at most one generation and
    /// always refreshes alpha. Returns whether a generation was advanced.
    pub fn tick(&mut self, delta_ms: f64) -> bool {
        let step = !self.paused && self.accumulate(delta_ms);
        if step {
            self.advance_generation();
        }
        self.update_visual_alpha();
        step
    }

    fn accumulate(&mut self, delta_ms: f64) -> bool {
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.timer_ms += delta_ms;
        }
        if self.timer_ms < self.interval_ms {
            return false;
        }
        self.timer_ms -= self.interval_ms;
        if self.timer_ms >= self.interval_ms {
            let dropped = (self.timer_ms / self.interval_ms).floor();
            self.timer_ms %= self.interval_ms;
            debug!("frame ran long, dropped {dropped} generation(s)");
        }
        true
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.alive.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.alive.cols()
    }

    #[inline]
    pub fn wraps(&self) -> bool {
        self.wrap
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn population(&self) -> usize {
        self.alive.as_slice().iter().filter(|&&a| a).count()
    }

    #[inline]
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.alive.get(row, col)
    }

    #[inline]
    pub fn alpha(&self, row: usize, col: usize) -> f32 {
        self.alpha.get(row, col)
    }

    /// Cached count from the last recount, i.e. for the generation that
    /// was current when it ran.
    #[inline]
    pub fn neighbor_count(&self, row: usize, col: usize) -> u8 {
        self.neighbors.get(row, col)
    }

    /// Live neighbors of `(row, col)` in the current generation.
    pub fn count_live_neighbors(&self, row: usize, col: usize) -> u8 {
        count_live(&self.alive, row, col, self.wrap)
    }

    pub fn alpha_grid(&self) -> &Grid<f32> {
        &self.alpha
    }

    /// Row-major walk over every cell.
    pub fn cells(&self) -> impl Iterator<Item = CellView> + '_ {
        let cols = self.cols();
        self.alive
            .as_slice()
            .iter()
            .zip(self.alpha.as_slice())
            .enumerate()
            .map(move |(i, (&alive, &alpha))| CellView {
                row: i / cols,
                col: i % cols,
                alive,
                alpha,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{BLINKER, BLOCK, GLIDER};

    fn seeded(rows: usize, cols: usize, wrap: bool, seed: bool) -> GridSimulation {
        GridSimulation::from_params(&Params {
            rows,
            cols,
            wrap,
            seed,
            rng_seed: Some(11),
            ..Params::default()
        })
        .unwrap()
    }

    fn snapshot(sim: &GridSimulation) -> Vec<bool> {
        sim.cells().map(|c| c.alive).collect()
    }

    #[test]
    fn rule_table() {
        // Neighbors of the center of a 3x3 unwrapped grid.
        let around = [(0, 0), (0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1), (2, 2)];
        for center in [false, true] {
            for n in 0..=8 {
                let mut sim = GridSimulation::new(3, 3, false, false);
                sim.set_alive(1, 1, center).unwrap();
                for &(r, c) in &around[..n] {
                    sim.set_alive(r, c, true).unwrap();
                }
                assert_eq!(sim.count_live_neighbors(1, 1), n as u8);
                sim.advance_generation();
                let expected = if center { n == 2 || n == 3 } else { n == 3 };
                assert_eq!(sim.is_alive(1, 1), expected, "alive={center} n={n}");
                assert_eq!(next_state(center, n as u8), expected);
            }
        }
    }

    #[test]
    fn blinker_uses_previous_generation() {
        let mut sim = seeded(5, 5, false, false);
        sim.place(&BLINKER, 2, 1).unwrap();
        assert_eq!(sim.neighbor_count(1, 2), 3);

        sim.advance_generation();
        let vertical: Vec<_> = sim.cells().filter(|c| c.alive).map(|c| (c.row, c.col)).collect();
        assert_eq!(vertical, vec![(1, 2), (2, 2), (3, 2)]);
        // Cached counts describe the horizontal phase that produced this one.
        assert_eq!(sim.neighbor_count(2, 2), 2);
        assert_eq!(sim.neighbor_count(2, 1), 1);
        assert_eq!(sim.neighbor_count(3, 2), 3);

        sim.advance_generation();
        let horizontal: Vec<_> = sim.cells().filter(|c| c.alive).map(|c| (c.row, c.col)).collect();
        assert_eq!(horizontal, vec![(2, 1), (2, 2), (2, 3)]);
    }

    #[test]
    fn wrap_counts_across_edges() {
        let mut flat = seeded(4, 4, false, false);
        let mut torus = seeded(4, 4, true, false);
        for sim in [&mut flat, &mut torus] {
            sim.set_alive(0, 0, true).unwrap();
            sim.set_alive(3, 3, true).unwrap();
            sim.set_alive(0, 3, true).unwrap();
        }
        assert_eq!(flat.count_live_neighbors(3, 0), 0);
        assert_eq!(torus.count_live_neighbors(3, 0), 3);
        assert!(torus.wraps() && !flat.wraps());
    }

    #[test]
    fn randomize_bias_and_alpha() {
        let sim = seeded(200, 200, true, true);
        let live = sim.population() as f64 / (200.0 * 200.0);
        assert!((live - 0.75 / 1.75).abs() < 0.02, "live fraction {live}");
        for cell in sim.cells() {
            assert_eq!(cell.alpha, if cell.alive { 1.0 } else { 0.0 });
        }
        for (r, c) in [(0, 0), (57, 199), (123, 4)] {
            assert_eq!(sim.neighbor_count(r, c), sim.count_live_neighbors(r, c));
        }
    }

    #[test]
    fn randomize_is_reproducible_with_a_seed() {
        let a = seeded(30, 30, true, true);
        let b = seeded(30, 30, true, true);
        assert_eq!(snapshot(&a), snapshot(&b));
    }

    #[test]
    fn clear_twice_matches_once() {
        let mut sim = seeded(20, 20, true, true);
        sim.clear();
        let once: Vec<_> = sim.cells().collect();
        sim.clear();
        let twice: Vec<_> = sim.cells().collect();
        assert_eq!(once, twice);
        for cell in twice {
            assert!(!cell.alive);
            assert_eq!(cell.alpha, 0.0);
            assert_eq!(sim.neighbor_count(cell.row, cell.col), 0);
        }
        assert_eq!((sim.rows(), sim.cols()), (20, 20));
    }

    #[test]
    fn dead_cell_fades_to_exact_zero() {
        let mut sim = seeded(5, 5, false, false);
        sim.set_alive(2, 2, true).unwrap();
        sim.advance_generation();
        assert!(!sim.is_alive(2, 2));
        assert_eq!(sim.alpha(2, 2), 1.0);

        let mut prev = sim.alpha(2, 2);
        let mut ticks = 0;
        while prev > 0.0 {
            sim.update_visual_alpha();
            let a = sim.alpha(2, 2);
            assert!(a < prev);
            assert!(a == 0.0 || a >= 0.005);
            prev = a;
            ticks += 1;
            assert!(ticks <= 32, "alpha never reached zero");
        }
        for _ in 0..5 {
            sim.update_visual_alpha();
            assert_eq!(sim.alpha(2, 2), 0.0);
        }
    }

    #[test]
    fn reborn_cell_snaps_to_full_alpha() {
        let mut sim = seeded(6, 6, false, false);
        sim.place(&BLINKER, 2, 1).unwrap();
        sim.advance_generation();
        for _ in 0..3 {
            sim.update_visual_alpha();
        }
        assert!(!sim.is_alive(2, 1));
        assert!(sim.alpha(2, 1) > 0.0 && sim.alpha(2, 1) < 1.0);

        sim.advance_generation();
        assert!(sim.is_alive(2, 1));
        sim.update_visual_alpha();
        assert_eq!(sim.alpha(2, 1), 1.0);
    }

    #[test]
    fn small_deltas_accumulate_to_one_step() {
        let mut sim = seeded(4, 4, false, false);
        assert_eq!(sim.interval_ms(), 50.0);
        for _ in 0..4 {
            assert!(!sim.tick(10.0));
        }
        assert_eq!(sim.generation(), 0);
        assert!(sim.tick(10.0));
        assert_eq!(sim.generation(), 1);
    }

    #[test]
    fn long_frame_steps_once_and_drops_the_rest() {
        let mut sim = seeded(4, 4, false, false);
        assert!(sim.tick(500.0));
        assert_eq!(sim.generation(), 1);
        assert!(!sim.tick(0.0));
        assert!(!sim.tick(f64::NAN));
        assert!(!sim.tick(-100.0));
        assert_eq!(sim.generation(), 1);
    }

    #[test]
    fn paused_tick_only_fades() {
        let mut sim = seeded(6, 6, false, false);
        sim.place(&BLINKER, 2, 1).unwrap();
        sim.advance_generation();
        sim.set_paused(true);

        let before = snapshot(&sim);
        let faded_before = sim.alpha(2, 1);
        for _ in 0..10 {
            assert!(!sim.tick(1000.0));
        }
        assert_eq!(snapshot(&sim), before);
        assert_eq!(sim.generation(), 1);
        assert!(sim.alpha(2, 1) < faded_before);
        assert_eq!(sim.alpha(2, 2), 1.0);
    }

    #[test]
    fn place_is_all_or_nothing() {
        let mut sim = seeded(3, 3, false, false);
        assert!(matches!(
            sim.place(&BLOCK, 2, 2),
            Err(Error::OutOfBounds { row: 2, col: 3, .. })
        ));
        assert_eq!(sim.population(), 0);
        assert!(sim.set_alive(3, 0, true).is_err());
        sim.place(&BLOCK, 1, 1).unwrap();
        assert_eq!(sim.population(), 4);
        assert_eq!(sim.alpha(1, 1), 1.0);
    }

    #[test]
    fn place_rejects_positions_past_usize_max() {
        let mut sim = seeded(4, 4, false, false);
        assert!(matches!(
            sim.place(&GLIDER, 0, usize::MAX),
            Err(Error::OutOfBounds { row: 0, col: usize::MAX, .. })
        ));
        assert!(sim.place(&GLIDER, usize::MAX, 0).is_err());
        assert_eq!(sim.population(), 0);
    }

    #[test]
    fn new_with_seed_randomizes() {
        let sim = GridSimulation::new(50, 50, true, true);
        assert!(sim.population() > 0);
        assert!(sim.cells().all(|c| c.alpha == if c.alive { 1.0 } else { 0.0 }));
        assert_eq!(GridSimulation::new(50, 50, true, false).population(), 0);
    }
}
