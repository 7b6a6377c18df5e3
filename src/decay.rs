#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Exponential fade applied to dead cells each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decay {
    /// Fraction of the remaining alpha removed per step.
    pub factor: f32,
    /// Below this the alpha snaps to exactly zero.
    pub epsilon: f32,
}

impl Default for Decay {
    fn default() -> Self {
        Self {
            factor: 0.25,
            epsilon: 0.005,
        }
    }
}

impl Decay {
    pub fn new(factor: f32, epsilon: f32) -> Self {
        Self { factor, epsilon }
    }

    /// One fade step for a dead cell.
    #[inline]
    pub fn step(&self, alpha: f32) -> f32 {
        if alpha <= 0.0 {
            return 0.0;
        }
        let next = lerp(alpha, 0.0, self.factor);
        if next < self.epsilon { 0.0 } else { next }
    }
}
