use num::Float;

/// Evenly spaced samples over a closed interval, like `numpy.linspace`.
pub(crate) struct Linspace<F> {
    start: F,
    end: F,
    step: F,
    index: usize,
    len: usize,
}

impl<F: Float> Linspace<F> {
    pub(crate) fn new(min: F, max: F, n: usize) -> Self {
        let step = if n > 1 {
            let num_steps = F::from(n - 1).unwrap_or_else(F::one);
            (max - min) / num_steps
        } else {
            F::zero()
        };

        Linspace {
            start: min,
            end: max,
            step,
            index: 0,
            len: n,
        }
    }
}

impl<F: Float> Iterator for Linspace<F> {
    type Item = F;

    #[inline]
    fn next(&mut self) -> Option<F> {
        if self.index >= self.len {
            return None;
        }

        let i = self.index;
        self.index += 1;

        // numpy pins the last sample to `stop` instead of accumulating rounding error
        if i + 1 == self.len && self.len > 1 {
            return Some(self.end);
        }

        Some(self.start + self.step * F::from(i).unwrap_or_else(F::zero))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.index;
        (n, Some(n))
    }
}

impl<F: Float> ExactSizeIterator for Linspace<F> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_endpoints() {
        let xs: Vec<f64> = Linspace::new(0., 100., 1000).collect();

        assert_eq!(xs.len(), 1000);
        assert_eq!(xs[0], 0.);
        assert_eq!(xs[999], 100.);
        assert!((xs[1] - 100. / 999.).abs() < 1e-12);
    }

    #[test]
    fn test_linspace_small() {
        assert_eq!(Linspace::new(0., 1., 3).collect::<Vec<f64>>(), vec![0., 0.5, 1.]);
        assert_eq!(Linspace::new(2., 5., 1).collect::<Vec<f64>>(), vec![2.]);
        assert_eq!(Linspace::<f64>::new(2., 5., 0).count(), 0);
    }
}
