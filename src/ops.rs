use std::iter::Sum;

use num::Float;
use serde::{Deserialize, Serialize};

use crate::math::interp;

/// And operator method for combining the propositions of a rule premise.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AndOp {
    #[default]
    Min,
    Prod,
    BoundedProd,
    DrasticProd,
}

impl AndOp {
    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Min => F::min(u, v),
            Self::Prod => u * v,
            Self::BoundedProd => F::max(F::zero(), u + v - F::one()),
            Self::DrasticProd => {
                if u == F::one() {
                    v
                } else if v == F::one() {
                    u
                } else {
                    F::zero()
                }
            },
        }
    }
}

/// Or operator method for combining the propositions of a rule premise.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrOp {
    #[default]
    Max,
    ProbOr,
    BoundedSum,
    DrasticSum,
}

impl OrOp {
    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Max => F::max(u, v),
            Self::ProbOr => u + v - u * v,
            Self::BoundedSum => F::min(F::one(), u + v),
            Self::DrasticSum => {
                if v == F::zero() {
                    u
                } else if u == F::zero() {
                    v
                } else {
                    F::one()
                }
            },
        }
    }
}

/// How a rule's firing strength shapes its consequent term.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplicationOp {
    /// Mamdani: `min(strength, mu)`
    #[default]
    Clip,
    /// Larsen: `strength * mu`
    Scale,
}

impl ImplicationOp {
    pub fn call<F: Float>(self, strength: F, membership: F) -> F {
        match self {
            Self::Clip => F::min(strength, membership),
            Self::Scale => strength * membership,
        }
    }
}

/// Method for aggregating the implied consequents of the fired rules.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationOp {
    #[default]
    Max,
    ProbOr,
    BoundedSum,
}

impl AggregationOp {
    pub fn call<F: Float>(
        self,
        u: impl IntoIterator<Item = F>,
        v: impl IntoIterator<Item = F>,
    ) -> impl Iterator<Item = F> {
        u.into_iter().zip(v).map(move |(u, v)| match self {
            Self::Max => F::max(u, v),
            Self::ProbOr => u + v - u * v,
            Self::BoundedSum => F::min(F::one(), u + v),
        })
    }
}

/// Method for defuzzificating the aggregated membership function.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefuzzificationOp {
    /// Discrete centroid, `sum(x * mu) / sum(mu)` over the samples
    #[default]
    Centroid,
    /// Center of Gravity of the piecewise-linear area
    Cog,
    /// Bisector of Area
    Bisector,
    /// Mean of the values for which the membership function is maximum
    Mom,
    /// Smallest value for which the membership function is maximum
    Som,
    /// Largest value for which the membership function is maximum
    Lom,
}

impl DefuzzificationOp {
    /// Crisp value of `membership` sampled at `universe`.
    ///
    /// `None` when the set is empty (zero everywhere) or the slices are mismatched:
    /// there is nothing to defuzzificate.
    pub fn call<F: Float + Sum>(self, universe: &[F], membership: &[F]) -> Option<F> {
        if universe.len() != membership.len() || universe.is_empty() {
            return None;
        }

        let maximum = membership.iter().copied().fold(F::zero(), F::max);

        if maximum <= F::zero() {
            return None;
        }

        let two = F::one() + F::one();

        match self {
            Self::Centroid => {
                let den = membership.iter().copied().sum::<F>();
                let num = universe
                    .iter()
                    .zip(membership)
                    .map(|(x, mu)| *x * *mu)
                    .sum::<F>();

                Some(num / den)
            },
            Self::Cog => {
                // Each interval is a rectangle plus a right triangle
                let three = two + F::one();
                let (num, den) = universe
                    .windows(2)
                    .zip(membership.windows(2))
                    .map(|(x, mu)| {
                        let base = x[1] - x[0];
                        let area_rect = F::min(mu[0], mu[1]) * base;
                        let center_rect = x[0] + base / two;
                        let area_tri = base * F::abs(mu[1] - mu[0]) / two;
                        let center_tri = if mu[1] > mu[0] {
                            x[0] + two / three * base
                        } else {
                            x[0] + base / three
                        };

                        (area_rect * center_rect + area_tri * center_tri, area_rect + area_tri)
                    })
                    .fold((F::zero(), F::zero()), |(n, d), (a, b)| (n + a, d + b));

                if den == F::zero() {
                    // a single non-zero sample has no area
                    return Self::Mom.call(universe, membership);
                }

                Some(num / den)
            },
            Self::Bisector => {
                let areas: Vec<F> = universe
                    .windows(2)
                    .zip(membership.windows(2))
                    .map(|(x, mu)| (mu[0] + mu[1]) * (x[1] - x[0]) / two)
                    .collect();
                let total_area = areas.iter().copied().sum::<F>();

                if total_area == F::zero() {
                    return Self::Mom.call(universe, membership);
                }

                let target = total_area / two;
                let mut cum_area = F::zero();

                for (i, area) in areas.iter().copied().enumerate() {
                    cum_area = cum_area + area;

                    if cum_area >= target {
                        let xp = [universe[i], universe[i + 1]];
                        let fp = [cum_area - area, cum_area];

                        // invert the cumulative area on this interval
                        return interp(target, fp.into_iter().zip(xp));
                    }
                }

                universe.last().copied()
            },
            Self::Mom => {
                let (len, sum) = maxima(universe, membership, maximum)
                    .fold((0usize, F::zero()), |(len, sum), x| (len + 1, sum + x));

                Some(sum / F::from(len)?)
            },
            Self::Som => maxima(universe, membership, maximum).reduce(F::min),
            Self::Lom => maxima(universe, membership, maximum).reduce(F::max),
        }
    }
}

fn maxima<'u, F: Float>(universe: &'u [F], membership: &'u [F], maximum: F) -> impl Iterator<Item = F> + 'u {
    universe
        .iter()
        .copied()
        .zip(membership.iter().copied())
        .filter_map(move |(x, mu)| if mu == maximum { Some(x) } else { None })
}

/// The operator set an engine evaluates with. Defaults to classic Mamdani
/// (min / max / clip / max / centroid).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Operators {
    pub and: AndOp,
    pub or: OrOp,
    pub implication: ImplicationOp,
    pub aggregation: AggregationOp,
    pub defuzzification: DefuzzificationOp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linspace::Linspace;
    use crate::terms::Shape;

    fn sampled(shape: Shape) -> (Vec<f64>, Vec<f64>) {
        let xs: Vec<f64> = Linspace::new(0., 100., 1000).collect();
        let mu = xs.iter().map(|x| shape.degree(*x)).collect();

        (xs, mu)
    }

    fn assert_close(actual: Option<f64>, expected: f64, tol: f64) {
        let actual = actual.expect("defuzzificated value");

        assert!((actual - expected).abs() <= tol, "{actual} != {expected} +- {tol}");
    }

    #[test]
    fn test_norms() {
        assert_eq!(AndOp::Min.call(0.3, 0.7), 0.3);
        assert_eq!(AndOp::Prod.call(0.5, 0.5), 0.25);
        assert_eq!(AndOp::BoundedProd.call(0.3, 0.5), 0.);
        assert_eq!(AndOp::DrasticProd.call(1., 0.4), 0.4);
        assert_eq!(AndOp::DrasticProd.call(0.9, 0.4), 0.);
        assert_eq!(OrOp::Max.call(0.3, 0.7), 0.7);
        assert_eq!(OrOp::ProbOr.call(0.5, 0.5), 0.75);
        assert_eq!(OrOp::BoundedSum.call(0.6, 0.7), 1.);
        assert_eq!(OrOp::DrasticSum.call(0., 0.4), 0.4);
        assert_eq!(OrOp::DrasticSum.call(0.2, 0.4), 1.);
    }

    #[test]
    fn test_implication_and_aggregation() {
        assert_eq!(ImplicationOp::Clip.call(0.4, 0.9), 0.4);
        assert_eq!(ImplicationOp::Scale.call(0.5, 0.5), 0.25);

        let agg: Vec<f64> = AggregationOp::Max.call([0.1, 0.5, 0.], [0.3, 0.2, 0.]).collect();

        assert_eq!(agg, vec![0.3, 0.5, 0.]);

        let agg: Vec<f64> = AggregationOp::BoundedSum.call([0.6], [0.6]).collect();

        assert_eq!(agg, vec![1.]);
    }

    #[test]
    fn test_centroid_of_low_shoulder() {
        let (xs, mu) = sampled(Shape::trap(0., 0., 10., 30.));

        // rectangle [0, 10] plus triangle [10, 30], exact centroid 10.833
        assert_close(DefuzzificationOp::Centroid.call(&xs, &mu), 10.806, 0.01);
        assert_close(DefuzzificationOp::Cog.call(&xs, &mu), 10.833, 0.01);
        assert_close(DefuzzificationOp::Bisector.call(&xs, &mu), 10., 0.1);
        assert_close(DefuzzificationOp::Mom.call(&xs, &mu), 5., 0.1);
        assert_close(DefuzzificationOp::Som.call(&xs, &mu), 0., 0.);
        assert_close(DefuzzificationOp::Lom.call(&xs, &mu), 10., 0.1);
    }

    #[test]
    fn test_symmetric_set_centers() {
        let (xs, mu) = sampled(Shape::tri(30., 50., 70.));

        for op in [
            DefuzzificationOp::Centroid,
            DefuzzificationOp::Cog,
            DefuzzificationOp::Bisector,
            DefuzzificationOp::Mom,
        ] {
            assert_close(op.call(&xs, &mu), 50., 0.1);
        }
    }

    #[test]
    fn test_empty_set_has_no_value() {
        let xs: Vec<f64> = Linspace::new(0., 100., 1000).collect();
        let zeros = vec![0.; 1000];

        for op in [
            DefuzzificationOp::Centroid,
            DefuzzificationOp::Cog,
            DefuzzificationOp::Bisector,
            DefuzzificationOp::Mom,
            DefuzzificationOp::Som,
            DefuzzificationOp::Lom,
        ] {
            assert_eq!(op.call(&xs, &zeros), None, "{op:?}");
        }

        assert_eq!(DefuzzificationOp::Centroid.call(&xs, &zeros[..10]), None);
    }

    #[test]
    fn test_single_spike() {
        let xs = [0., 1., 2., 3.];
        let mu = [0., 0., 0.5, 0.];

        assert_eq!(DefuzzificationOp::Centroid.call(&xs, &mu), Some(2.));
        assert_close(DefuzzificationOp::Cog.call(&xs, &mu), 2., 1e-12);
    }
}
