//! # spectral-decomp
//!
//! Decompose a noisy measured spectrum into a non-negative mixture of basis
//! spectra plus a uniform noise floor.
//!
//! - **Basis generation** ([`build_dictionary`], [`make_spectrum`]): seeded
//!   dictionaries of synthetic spectra, each a sum of 3–6 Gaussian peaks
//! - **Decomposition** ([`decompose()`], [`decompose_with`]): infinity-norm
//!   fit of amplitudes and noise as a linear program
//! - **Solver seam** ([`ConvexSolver`], [`ClarabelSolver`]): pluggable LP
//!   backend, Clarabel by default
//! - **Synthesis** ([`synthesize_measured`], [`random_mixture`]): build test
//!   measurements from a known mixture
//!
//! ## Quick Start
//!
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use spectral_decomp::{basis_matrix, build_dictionary, decompose, linspace, synthesize_measured};
//!
//! let mut rng = StdRng::seed_from_u64(17);
//! let dictionary = build_dictionary(4, 0.0, 100.0, &mut rng).unwrap();
//! let grid = linspace(0.0, 100.0, 100);
//! let bases = basis_matrix(&dictionary, &grid);
//!
//! let measured = synthesize_measured(&bases, &[0.1, 0.2, 0.3, 0.4], 0.0, &mut rng).unwrap();
//! let result = decompose(&bases, &measured, true).unwrap();
//! assert_eq!(result.amplitudes.len(), 4);
//! ```

pub mod basis;
pub mod decompose;
pub mod peak;
pub mod solver;
pub mod spectrum;
pub mod synth;
pub mod types;
pub mod utils;

pub use basis::{basis_matrix, build_dictionary, generate_name, BasisSpectrum};
pub use decompose::{decompose, decompose_batch, decompose_with, NOISE_SCALE};
pub use peak::{gauss, generate_peak, ugauss, Peak};
pub use solver::{
    ClarabelSolver, ConvexSolver, LinearConstraint, LinearProgram, SolverOutcome, SolverSettings,
};
pub use spectrum::{make_spectrum, Spectrum, MAX_PEAKS, MIN_PEAKS};
pub use synth::{random_mixture, synthesize_measured};
pub use types::{DecompError, DecomposeConfig, Decomposition, DictionaryConfig, SolveStatus};
pub use utils::linspace;
