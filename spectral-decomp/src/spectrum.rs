use rand::Rng;

use crate::peak::{generate_peak, Peak};

/// Fewest peaks in a generated spectrum.
pub const MIN_PEAKS: usize = 3;
/// Most peaks in a generated spectrum.
pub const MAX_PEAKS: usize = 6;

/// A synthetic spectrum: superposed Gaussian peaks over [low, high].
///
/// Peak centers lie in the domain and every peak height is below 1.0, but
/// overlapping peaks can push the sum above 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    low: f64,
    high: f64,
    peaks: Vec<Peak>,
}

impl Spectrum {
    /// Build a spectrum from explicit peaks.
    pub fn new(low: f64, high: f64, peaks: Vec<Peak>) -> Self {
        Self { low, high, peaks }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn peaks(&self) -> &[Peak] {
        &self.peaks
    }

    /// Evaluate the spectrum at a single coordinate.
    pub fn eval(&self, x: f64) -> f64 {
        self.peaks.iter().map(|p| p.eval(x)).sum()
    }

    /// Evaluate the spectrum at every coordinate of `xs`.
    pub fn sample(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }
}

/// Generate a random spectrum of 3 to 6 peaks over [low, high].
pub fn make_spectrum<R: Rng + ?Sized>(low: f64, high: f64, rng: &mut R) -> Spectrum {
    let n_peaks = MIN_PEAKS + rng.gen_range(0..=MAX_PEAKS - MIN_PEAKS);
    let peaks = (0..n_peaks)
        .map(|_| generate_peak(low, high, &mut *rng))
        .collect();
    Spectrum::new(low, high, peaks)
}
