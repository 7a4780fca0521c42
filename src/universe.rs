use serde::Serialize;

use crate::linspace::Linspace;

/// Sample count used by the built-in systems, matching the reference grids.
pub const DEFAULT_RESOLUTION: usize = 1000;

/// A continuous domain `[min, max]`, sampled at `resolution` evenly spaced points
/// for defuzzification and plotting.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Universe {
    min: f64,
    max: f64,
    resolution: usize,
}

impl Universe {
    /// Returns `None` unless `min < max` (both finite) and `resolution >= 2`.
    pub fn new(min: f64, max: f64, resolution: usize) -> Option<Self> {
        if !(min.is_finite() && max.is_finite()) || min >= max || resolution < 2 {
            return None;
        }

        Some(Self { min, max, resolution })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn contains(&self, x: f64) -> bool {
        (self.min..=self.max).contains(&x)
    }

    /// The sample grid, first and last points pinned to `min` and `max`.
    pub fn samples(&self) -> impl ExactSizeIterator<Item = f64> {
        Linspace::new(self.min, self.max, self.resolution)
    }
}
