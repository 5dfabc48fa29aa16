use faer::Mat;
use rand::Rng;

use crate::types::DecompError;
use crate::utils::{validate_matrix, validate_vector};

/// Draw `n` random mixing amplitudes in [0, 1).
///
/// With `complete` set the amplitudes are normalized to sum to 1.
pub fn random_mixture<R: Rng + ?Sized>(
    n: usize,
    complete: bool,
    rng: &mut R,
) -> Result<Vec<f64>, DecompError> {
    if n == 0 {
        return Err(DecompError::InvalidInput(
            "mixture needs at least one amplitude".into(),
        ));
    }
    let mut amps: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();
    if complete {
        let total: f64 = amps.iter().sum();
        if total > 0.0 {
            amps.iter_mut().for_each(|a| *a /= total);
        } else {
            amps.iter_mut().for_each(|a| *a = 1.0 / n as f64);
        }
    }
    Ok(amps)
}

/// Synthesize a measured spectrum: Bᵀ·amplitudes plus uniform noise in
/// [0, noise_level) drawn independently per sample.
pub fn synthesize_measured<R: Rng + ?Sized>(
    bases: &Mat<f64>,
    amplitudes: &[f64],
    noise_level: f64,
    rng: &mut R,
) -> Result<Vec<f64>, DecompError> {
    validate_matrix(bases, 1, 1)?;
    validate_vector(amplitudes, "amplitude count", bases.nrows())?;
    if !noise_level.is_finite() || noise_level < 0.0 {
        return Err(DecompError::InvalidInput(format!(
            "noise level must be finite and non-negative, got {noise_level}"
        )));
    }

    Ok((0..bases.ncols())
        .map(|j| {
            let clean: f64 = amplitudes
                .iter()
                .enumerate()
                .map(|(i, a)| a * bases[(i, j)])
                .sum();
            clean + noise_level * rng.gen::<f64>()
        })
        .collect())
}
