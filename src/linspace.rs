/// Evenly spaced samples over `[min, max]`, computed like `numpy.linspace`.
#[derive(Clone, Debug)]
pub struct Linspace {
    start: f64,
    step: f64,
    index: usize,
    len: usize,
}

impl Linspace {
    pub fn new(min: f64, max: f64, n: usize) -> Self {
        let step = if n > 1 {
            let num_steps = (n - 1) as f64;
            (max - min) / num_steps
        } else {
            0.
        };
        Linspace {
            start: min,
            step,
            index: 0,
            len: n,
        }
    }

    /// Samples `[min, max]` at roughly `step` apart, always including both ends.
    pub fn with_step(min: f64, max: f64, step: f64) -> Self {
        // floor is closest approx to int() truncation, but a quotient such as
        // 4.999999999999999 has to land on 5 rather than 4
        let num = ((max - min) / step + 1e-9).floor() as usize + 1;

        Self::new(min, max, num)
    }
}

impl Iterator for Linspace {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        if self.index >= self.len {
            None
        } else {
            let i = self.index;
            self.index += 1;
            Some(self.start + self.step * i as f64)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.index;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Linspace {}

#[test]
fn test_linspace_with_step() {
    let points: Vec<f64> = Linspace::with_step(0., 120., 1.).collect();

    assert_eq!(points.len(), 121);
    assert_eq!(points[0], 0.);
    assert_eq!(points[60], 60.);
    assert_eq!(points[120], 120.);

    let points: Vec<f64> = Linspace::with_step(0., 0.5, 0.1).collect();
    assert_eq!(points.len(), 6);
    assert_eq!(points[5], 0.5);
}

#[test]
fn test_linspace_single_point() {
    let points: Vec<f64> = Linspace::new(3., 3., 1).collect();

    assert_eq!(points, vec![3.]);
}
