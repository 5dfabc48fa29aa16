use std::f64::consts::PI;

use rand::Rng;

/// Smallest peak height.
pub const MIN_HEIGHT: f64 = 0.1;

/// Peak width bounds as fractions of the domain width.
pub const SCALE_FRACTION: (f64, f64) = (0.025, 0.15);

/// Gaussian with unit height, center `loc`, deviation `scale`.
pub fn ugauss(x: f64, loc: f64, scale: f64) -> f64 {
    let xm = (x - loc) / scale;
    (-(xm * xm) / 2.0).exp()
}

/// Gaussian with unit area, center `loc`, deviation `scale`.
pub fn gauss(x: f64, loc: f64, scale: f64) -> f64 {
    ugauss(x, loc, scale) / (scale * (2.0 * PI).sqrt())
}

/// A single Gaussian bump.
///
/// value(x) = height · exp(−((x − location)/scale)² / 2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub location: f64,
    pub height: f64,
    pub scale: f64,
}

impl Peak {
    pub fn new(location: f64, height: f64, scale: f64) -> Self {
        Self {
            location,
            height,
            scale,
        }
    }

    /// Evaluate the peak at `x`.
    pub fn eval(&self, x: f64) -> f64 {
        self.height * ugauss(x, self.location, self.scale)
    }
}

/// Draw a random peak for the domain [low, high].
///
/// Location is uniform in [low, high), height uniform in [0.1, 1), and
/// scale uniform in [0.025, 0.15) of the domain width. Draw order is
/// location, height, scale.
pub fn generate_peak<R: Rng + ?Sized>(low: f64, high: f64, rng: &mut R) -> Peak {
    let width = high - low;
    let location = width * rng.gen::<f64>() + low;
    let height = MIN_HEIGHT + (1.0 - MIN_HEIGHT) * rng.gen::<f64>();
    let (lo, hi) = SCALE_FRACTION;
    let scale = width * (lo + (hi - lo) * rng.gen::<f64>());
    Peak::new(location, height, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assert_near(a: f64, b: f64, eps: f64) {
        assert!(
            (a - b).abs() < eps,
            "expected {a} ≈ {b} (diff = {})",
            (a - b).abs()
        );
    }

    #[test]
    fn test_ugauss_unit_height() {
        assert_near(ugauss(3.0, 3.0, 0.5), 1.0, 1e-15);
        assert_near(ugauss(4.0, 3.0, 1.0), (-0.5_f64).exp(), 1e-15);
    }

    #[test]
    fn test_gauss_unit_area() {
        // Trapezoid over ±10σ
        let (loc, scale) = (2.0, 0.7);
        let n = 4000;
        let a = loc - 10.0 * scale;
        let h = 20.0 * scale / n as f64;
        let mut area = 0.0;
        for k in 0..n {
            let x0 = a + k as f64 * h;
            area += 0.5 * h * (gauss(x0, loc, scale) + gauss(x0 + h, loc, scale));
        }
        assert_near(area, 1.0, 1e-6);
    }

    #[test]
    fn test_peak_eval_at_center() {
        let p = Peak::new(10.0, 0.4, 2.0);
        assert_near(p.eval(10.0), 0.4, 1e-15);
        assert!(p.eval(14.0) < 0.4);
        assert_near(p.eval(8.0), p.eval(12.0), 1e-15);
    }

    #[test]
    fn test_generate_peak_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let (low, high) = (20.0, 70.0);
        for _ in 0..500 {
            let p = generate_peak(low, high, &mut rng);
            assert!(p.location >= low && p.location <= high);
            assert!(p.height >= 0.1 && p.height < 1.0);
            assert!(p.scale >= 0.025 * 50.0 && p.scale <= 0.15 * 50.0);
        }
    }

    #[test]
    fn test_generate_peak_seeded() {
        let a = generate_peak(0.0, 1.0, &mut StdRng::seed_from_u64(42));
        let b = generate_peak(0.0, 1.0, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
