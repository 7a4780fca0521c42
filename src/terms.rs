use serde::{Deserialize, Serialize};

/// Piecewise-linear membership function shapes.
///
/// Control points may lie outside the owning variable's universe. That is how open
/// "low"/"high" shoulders are written, e.g. `Trapezoidal { a: -30., b: -3.333, .. }`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// 0 at `a`, 1 at `b`, 0 again at `c`
    Triangular { a: f64, b: f64, c: f64 },
    /// 0 at `a`, 1 over `[b, c]`, 0 again at `d`
    Trapezoidal { a: f64, b: f64, c: f64, d: f64 },
}

impl Shape {
    pub const fn tri(a: f64, b: f64, c: f64) -> Self {
        Shape::Triangular { a, b, c }
    }

    pub const fn trap(a: f64, b: f64, c: f64, d: f64) -> Self {
        Shape::Trapezoidal { a, b, c, d }
    }

    pub fn points(&self) -> Vec<f64> {
        match *self {
            Shape::Triangular { a, b, c } => vec![a, b, c],
            Shape::Trapezoidal { a, b, c, d } => vec![a, b, c, d],
        }
    }

    /// Control points are finite and sorted ascending.
    pub fn is_well_formed(&self) -> bool {
        let points = self.points();

        points.iter().all(|p| p.is_finite()) && points.windows(2).all(|w| w[0] <= w[1])
    }

    /// Degree of membership of `x`, in `[0, 1]`.
    ///
    /// Degenerate edges (`a == b`, `b == c`, `c == d`) become steps, so no branch
    /// ever divides by a zero-width edge.
    pub fn degree(&self, x: f64) -> f64 {
        let degree = match *self {
            Shape::Triangular { a, b, c } => {
                if x < a || x > c {
                    0.
                } else if x == b {
                    1.
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (c - x) / (c - b)
                }
            },
            Shape::Trapezoidal { a, b, c, d } => {
                if x < a || x > d {
                    0.
                } else if x < b {
                    (x - a) / (b - a)
                } else if x <= c {
                    1.
                } else {
                    (d - x) / (d - c)
                }
            },
        };

        degree.clamp(0., 1.)
    }

    /// Interval outside of which the degree is zero.
    pub fn support(&self) -> (f64, f64) {
        match *self {
            Shape::Triangular { a, c, .. } => (a, c),
            Shape::Trapezoidal { a, d, .. } => (a, d),
        }
    }
}

/// A named fuzzy set: one linguistic term of a variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Term {
    name: String,
    shape: Shape,
}

impl Term {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn degree(&self, x: f64) -> f64 {
        self.shape.degree(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle() {
        let tri = Shape::tri(35., 45., 55.);

        assert_eq!(tri.degree(35.), 0.);
        assert_eq!(tri.degree(40.), 0.5);
        assert_eq!(tri.degree(45.), 1.);
        assert_eq!(tri.degree(52.5), 0.25);
        assert_eq!(tri.degree(55.), 0.);
        assert_eq!(tri.degree(80.), 0.);
        assert_eq!(tri.degree(-1.), 0.);
    }

    #[test]
    fn test_trapezoid_shoulders_outside_universe() {
        // COF "baixa": open low shoulder
        let low = Shape::trap(-30., -3.333, 35., 45.);

        assert_eq!(low.degree(0.), 1.);
        assert_eq!(low.degree(35.), 1.);
        assert_eq!(low.degree(40.), 0.5);
        assert_eq!(low.degree(45.), 0.);
        assert!(low.degree(-20.) > 0. && low.degree(-20.) < 1.);
        assert_eq!(low.degree(-31.), 0.);

        // COF "alta": open high shoulder beyond the universe max of 80
        let high = Shape::trap(45., 55., 100., 100.);

        assert_eq!(high.degree(50.), 0.5);
        assert_eq!(high.degree(80.), 1.);
        assert_eq!(high.degree(100.), 1.);
        assert_eq!(high.degree(100.5), 0.);
    }

    #[test]
    fn test_degenerate_edges_are_steps() {
        let left = Shape::trap(0., 0., 10., 25.);

        assert_eq!(left.degree(0.), 1.);
        assert_eq!(left.degree(-0.001), 0.);
        assert_eq!(left.degree(17.5), 0.5);

        let right = Shape::trap(25., 40., 40., 40.);

        assert_eq!(right.degree(40.), 1.);
        assert_eq!(right.degree(32.5), 0.5);
        assert_eq!(right.degree(40.001), 0.);

        let spike = Shape::tri(5., 5., 5.);

        assert_eq!(spike.degree(5.), 1.);
        assert_eq!(spike.degree(4.999), 0.);
        assert_eq!(spike.degree(5.001), 0.);

        let half = Shape::tri(0., 10., 10.);

        assert_eq!(half.degree(10.), 1.);
        assert_eq!(half.degree(5.), 0.5);
    }

    #[test]
    fn test_well_formed() {
        assert!(Shape::tri(1., 1., 2.).is_well_formed());
        assert!(Shape::trap(-30., -3.333, 35., 45.).is_well_formed());
        assert!(!Shape::tri(2., 1., 3.).is_well_formed());
        assert!(!Shape::trap(0., 5., 4., 10.).is_well_formed());
        assert!(!Shape::tri(0., f64::NAN, 1.).is_well_formed());
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&Shape::tri(10., 30., 50.)).unwrap();

        assert_eq!(json, r#"{"kind":"triangular","a":10.0,"b":30.0,"c":50.0}"#);
        assert_eq!(serde_json::from_str::<Shape>(&json).unwrap(), Shape::tri(10., 30., 50.));
    }
}
