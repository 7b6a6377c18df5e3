use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Construction-time parameters for a simulation session.
///
/// Missing JSON fields fall back to [`Params::default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // Grid
    pub rows: usize,
    pub cols: usize,
    /// Pixels per cell edge. Only the renderer looks at this.
    pub cell_size: usize,
    pub wrap: bool,
    /// Randomize the grid right after allocation.
    pub seed: bool,

    // Timing
    pub update_rate_hz: f64,

    // Fade trail
    pub decay_factor: f32,
    pub decay_epsilon: f32,

    /// Fixed RNG seed for reproducible runs. `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            rows: 45,
            cols: 80,
            cell_size: 16,
            wrap: true,
            seed: true,
            update_rate_hz: 20.0,
            decay_factor: 0.25,
            decay_epsilon: 0.005,
            rng_seed: None,
        }
    }
}

impl Params {
    /// Slower ticks with a long, soft trail behind dying cells.
    pub fn long_trail() -> Self {
        Self {
            update_rate_hz: 15.0,
            decay_factor: 0.075,
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let params: Params = serde_json::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::EmptyGrid {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !self.update_rate_hz.is_finite() || self.update_rate_hz <= 0.0 {
            return Err(Error::UpdateRate(self.update_rate_hz));
        }
        if !(self.decay_factor > 0.0 && self.decay_factor <= 1.0) {
            return Err(Error::DecayFactor(self.decay_factor));
        }
        if !(self.decay_epsilon > 0.0 && self.decay_epsilon < 1.0) {
            return Err(Error::DecayEpsilon(self.decay_epsilon));
        }
        Ok(())
    }

    /// Milliseconds between two automatic generation steps.
    #[inline]
    pub fn update_interval_ms(&self) -> f64 {
        1000.0 / self.update_rate_hz
    }

    pub fn width_px(&self) -> usize {
        self.cols * self.cell_size
    }

    pub fn height_px(&self) -> usize {
        self.rows * self.cell_size
    }
}
