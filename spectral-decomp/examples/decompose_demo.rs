//! Decomposition demo: recover a known mixture from a noisy measurement.
//!
//! Set `SPECTRAL_LOG=debug` to see solver events.

use rand::rngs::StdRng;
use rand::SeedableRng;
use spectral_decomp::{
    basis_matrix, build_dictionary, decompose, linspace, random_mixture, synthesize_measured,
    DecompError, DictionaryConfig,
};
use tracing_subscriber::EnvFilter;

const SEED: u64 = 2019;
const NOISE_LEVEL: f64 = 0.05;
const COMPLETE: bool = true;

fn main() -> Result<(), DecompError> {
    let filter =
        EnvFilter::try_from_env("SPECTRAL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = DictionaryConfig::default();
    let mut rng = StdRng::seed_from_u64(SEED);

    let dictionary = build_dictionary(config.n_bases, config.low, config.high, &mut rng)?;
    let grid = linspace(config.low, config.high, config.n_samples);
    let bases = basis_matrix(&dictionary, &grid);

    println!("Basis dictionary ({} spectra)", dictionary.len());
    for basis in &dictionary {
        let peak_max = basis.sample(&grid).into_iter().fold(0.0_f64, f64::max);
        println!(
            "  {:>2} {:<8} peaks={} max={:.3}",
            basis.id,
            basis.name,
            basis.spectrum.peaks().len(),
            peak_max
        );
    }

    let truth = random_mixture(config.n_bases, COMPLETE, &mut rng)?;
    let measured = synthesize_measured(&bases, &truth, NOISE_LEVEL, &mut rng)?;

    let result = decompose(&bases, &measured, COMPLETE)?;

    println!("\nDecomposition (complete={COMPLETE}, noise level={NOISE_LEVEL})");
    println!("  Status: {}", result.status);
    println!("  Objective: {:.6}", result.objective);
    println!("  Noise estimate: {:.6}", result.noise);
    println!("\n  {:<8} {:>8} {:>8}", "basis", "true", "found");
    for ((basis, t), a) in dictionary.iter().zip(&truth).zip(&result.amplitudes) {
        println!("  {:<8} {:>8.4} {:>8.4}", basis.name, t, a);
    }
    println!(
        "\n  Max residual: {:.6}",
        result.max_residual(&bases, &measured)?
    );

    Ok(())
}
