use crate::error::BuildError;

/// Triangular membership function over `a <= b <= c`.
///
/// `a == b` or `b == c` gives a shoulder: the degree is 1 at that boundary
/// instead of 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    a: f64,
    b: f64,
    c: f64,
}

impl Triangle {
    pub fn new(a: f64, b: f64, c: f64) -> Result<Self, BuildError> {
        let finite = a.is_finite() && b.is_finite() && c.is_finite();

        if !finite || a > b || b > c {
            return Err(BuildError::InvalidShape { a, b, c });
        }

        Ok(Triangle { a, b, c })
    }

    pub fn params(&self) -> (f64, f64, f64) {
        (self.a, self.b, self.c)
    }

    /// Degree of membership of `x`, always within `[0, 1]`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let Triangle { a, b, c } = *self;

        if x == b {
            return 1.;
        }
        if x.is_nan() || x <= a || x >= c {
            return 0.;
        }

        // a < x < c and x != b, so the active slope has a nonzero base
        let degree = if x < b { (x - a) / (b - a) } else { (c - x) / (c - b) };

        degree.clamp(0., 1.)
    }
}

#[test]
fn test_triangle_points() {
    let tri = Triangle::new(20., 50., 80.).unwrap();

    assert_eq!(tri.evaluate(20.), 0.);
    assert_eq!(tri.evaluate(50.), 1.);
    assert_eq!(tri.evaluate(80.), 0.);
    assert_eq!(tri.evaluate(35.), 0.5);
    assert_eq!(tri.evaluate(65.), 0.5);
    assert_eq!(tri.evaluate(-1000.), 0.);
    assert_eq!(tri.evaluate(1000.), 0.);
    assert_eq!(tri.evaluate(f64::NAN), 0.);
}

#[test]
fn test_triangle_shoulders() {
    let left = Triangle::new(0., 0., 30.).unwrap();
    assert_eq!(left.evaluate(0.), 1.);
    assert_eq!(left.evaluate(-5.), 0.);
    assert_eq!(left.evaluate(15.), 0.5);
    assert_eq!(left.evaluate(30.), 0.);

    let right = Triangle::new(70., 100., 100.).unwrap();
    assert_eq!(right.evaluate(100.), 1.);
    assert_eq!(right.evaluate(85.), 0.5);
    assert_eq!(right.evaluate(101.), 0.);

    let spike = Triangle::new(1., 1., 1.).unwrap();
    assert_eq!(spike.evaluate(1.), 1.);
    assert_eq!(spike.evaluate(1.5), 0.);
}

#[test]
fn test_triangle_rejects_bad_params() {
    assert_eq!(
        Triangle::new(3., 2., 5.),
        Err(BuildError::InvalidShape { a: 3., b: 2., c: 5. })
    );
    assert!(Triangle::new(0., 1., f64::INFINITY).is_err());
    assert!(Triangle::new(f64::NAN, 1., 2.).is_err());
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::Triangle;

    fn ordered() -> impl Strategy<Value = (f64, f64, f64)> {
        (-1000.0..1000.0f64, 0.001..500.0f64, 0.001..500.0f64).prop_map(|(a, d1, d2)| (a, a + d1, a + d1 + d2))
    }

    proptest! {
        #[test]
        fn degree_is_bounded((a, b, c) in ordered(), x in -5000.0..5000.0f64) {
            let tri = Triangle::new(a, b, c).unwrap();
            let degree = tri.evaluate(x);

            prop_assert!((0. ..=1.).contains(&degree));
        }

        #[test]
        fn peak_and_feet((a, b, c) in ordered()) {
            let tri = Triangle::new(a, b, c).unwrap();

            prop_assert_eq!(tri.evaluate(a), 0.);
            prop_assert_eq!(tri.evaluate(b), 1.);
            prop_assert_eq!(tri.evaluate(c), 0.);
        }

        #[test]
        fn monotonic_slopes((a, b, c) in ordered(), t1 in 0.0..=1.0f64, t2 in 0.0..=1.0f64) {
            let tri = Triangle::new(a, b, c).unwrap();
            let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };

            let (x1, x2) = (a + (b - a) * lo, a + (b - a) * hi);
            prop_assert!(tri.evaluate(x1) <= tri.evaluate(x2) + 1e-9);

            let (x1, x2) = (b + (c - b) * lo, b + (c - b) * hi);
            prop_assert!(tri.evaluate(x1) + 1e-9 >= tri.evaluate(x2));
        }
    }
}
