use faer::Mat;

/// Error types for spectral decomposition.
#[derive(Debug, thiserror::Error)]
pub enum DecompError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("shape mismatch: {what} expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("solver failed with status {status}")]
    SolverFailed { status: SolveStatus },

    #[error("solver error: {0}")]
    SolverError(String),
}

/// Configuration for a single decomposition.
#[derive(Debug, Clone)]
pub struct DecomposeConfig {
    /// Require the amplitudes to sum to exactly 1 (complete mixture).
    pub complete: bool,
    /// Upper bound on each amplitude.
    pub amplitude_bound: f64,
    /// Upper bound on the solved noise variable.
    pub noise_bound: f64,
}

impl Default for DecomposeConfig {
    fn default() -> Self {
        Self {
            complete: false,
            amplitude_bound: 1.0,
            noise_bound: 1.0,
        }
    }
}

impl DecomposeConfig {
    /// Default bounds with the given completeness regime.
    pub fn with_complete(complete: bool) -> Self {
        Self {
            complete,
            ..Default::default()
        }
    }
}

/// Parameters for generating a basis dictionary and its sample grid.
#[derive(Debug, Clone)]
pub struct DictionaryConfig {
    /// Number of basis spectra.
    pub n_bases: usize,
    /// Lower end of the spectral domain.
    pub low: f64,
    /// Upper end of the spectral domain.
    pub high: f64,
    /// Number of sample points (bins) on the shared grid.
    pub n_samples: usize,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            n_bases: 10,
            low: 0.0,
            high: 100.0,
            n_samples: 100,
        }
    }
}

/// Outcome reported by a convex solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    OptimalInaccurate,
    Infeasible,
    Unbounded,
    IterationLimit,
    NumericalFailure,
}

impl SolveStatus {
    /// Whether the solution values may be used.
    pub fn is_usable(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::OptimalInaccurate)
    }
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::OptimalInaccurate => write!(f, "optimal_inaccurate"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
            SolveStatus::IterationLimit => write!(f, "iteration_limit"),
            SolveStatus::NumericalFailure => write!(f, "numerical_failure"),
        }
    }
}

/// Result of a decomposition.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Recovered amplitude per basis (R).
    pub amplitudes: Vec<f64>,
    /// Noise estimate, half the solved noise floor.
    pub noise: f64,
    /// Achieved worst-case residual.
    pub objective: f64,
    /// Solver status the result was accepted under.
    pub status: SolveStatus,
}

impl Decomposition {
    /// Number of bases the result covers.
    pub fn n_bases(&self) -> usize {
        self.amplitudes.len()
    }

    /// Noise floor as solved, before the 0.5 normalization.
    pub fn noise_floor(&self) -> f64 {
        2.0 * self.noise
    }

    /// Reconstruct the spectrum: Bᵀa + noise floor.
    pub fn reconstruct(&self, bases: &Mat<f64>) -> Result<Vec<f64>, DecompError> {
        if bases.nrows() != self.amplitudes.len() {
            return Err(DecompError::ShapeMismatch {
                what: "basis rows",
                expected: self.amplitudes.len(),
                found: bases.nrows(),
            });
        }
        let floor = self.noise_floor();
        Ok((0..bases.ncols())
            .map(|j| {
                let mixed: f64 = self
                    .amplitudes
                    .iter()
                    .enumerate()
                    .map(|(i, a)| a * bases[(i, j)])
                    .sum();
                mixed + floor
            })
            .collect())
    }

    /// Largest absolute difference between the reconstruction and `measured`.
    pub fn max_residual(&self, bases: &Mat<f64>, measured: &[f64]) -> Result<f64, DecompError> {
        let recon = self.reconstruct(bases)?;
        if recon.len() != measured.len() {
            return Err(DecompError::ShapeMismatch {
                what: "measured length",
                expected: recon.len(),
                found: measured.len(),
            });
        }
        Ok(recon
            .iter()
            .zip(measured)
            .map(|(r, m)| (r - m).abs())
            .fold(0.0_f64, f64::max))
    }
}

impl std::fmt::Display for Decomposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "status: {}", self.status)?;
        writeln!(f, "objective: {:.6}", self.objective)?;
        writeln!(f, "noise: {:.6}", self.noise)?;
        for (i, a) in self.amplitudes.iter().enumerate() {
            writeln!(f, "  basis {i}: {a:.6}")?;
        }
        Ok(())
    }
}
