use faer::Mat;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::solver::{ClarabelSolver, ConvexSolver, LinearProgram};
use crate::types::{DecompError, DecomposeConfig, Decomposition, SolveStatus};
use crate::utils::{validate_matrix, validate_vector};

/// Factor applied to the solved noise variable before it is reported.
pub const NOISE_SCALE: f64 = 0.5;

/// Decompose a measured spectrum against a basis matrix with the default
/// Clarabel backend.
///
/// # Arguments
/// * `bases` - Basis matrix (R bases × C sample points), rows are bases.
/// * `measured` - Measured spectrum (C).
/// * `complete` - Require the amplitudes to sum to exactly 1.
pub fn decompose(
    bases: &Mat<f64>,
    measured: &[f64],
    complete: bool,
) -> Result<Decomposition, DecompError> {
    decompose_with(
        &ClarabelSolver::default(),
        bases,
        measured,
        &DecomposeConfig::with_complete(complete),
    )
}

/// Decompose a measured spectrum using the given solver.
///
/// # Model
/// Find amplitudes a (R) and a noise floor n minimizing
/// ‖Bᵀa + n·1 − m‖∞ subject to 0 ≤ aᵢ ≤ amplitude_bound,
/// 0 ≤ n ≤ noise_bound, and Σaᵢ = 1 when `config.complete` is set.
///
/// The reported noise is `NOISE_SCALE · n`. An optimal-inaccurate solve is
/// accepted with a warning; any other non-optimal status is an error.
pub fn decompose_with(
    solver: &dyn ConvexSolver,
    bases: &Mat<f64>,
    measured: &[f64],
    config: &DecomposeConfig,
) -> Result<Decomposition, DecompError> {
    validate_matrix(bases, 1, 1)?;
    validate_vector(measured, "measured length", bases.ncols())?;
    validate_config(config)?;

    let n_bases = bases.nrows();
    let problem = build_problem(bases, measured, config);
    debug!(
        solver = solver.name(),
        n_bases,
        n_samples = measured.len(),
        complete = config.complete,
        "solving decomposition"
    );

    let outcome = solver.solve(&problem)?;
    match outcome.status {
        SolveStatus::Optimal => {}
        SolveStatus::OptimalInaccurate => {
            warn!(
                solver = solver.name(),
                objective = outcome.objective,
                "decomposition solve is inaccurate"
            );
        }
        status => return Err(DecompError::SolverFailed { status }),
    }

    if outcome.values.len() != problem.n_vars() {
        return Err(DecompError::ShapeMismatch {
            what: "solution length",
            expected: problem.n_vars(),
            found: outcome.values.len(),
        });
    }

    // Interior-point iterates can sit a hair outside the box
    let amplitudes: Vec<f64> = outcome.values[..n_bases]
        .iter()
        .map(|a| a.clamp(0.0, config.amplitude_bound))
        .collect();
    let noise = NOISE_SCALE * outcome.values[n_bases].clamp(0.0, config.noise_bound);

    debug!(objective = outcome.objective, noise, "decomposition solved");
    Ok(Decomposition {
        amplitudes,
        noise,
        objective: outcome.objective,
        status: outcome.status,
    })
}

/// Decompose many measured spectra against one basis matrix, in parallel.
///
/// Fails with the first error encountered.
pub fn decompose_batch(
    solver: &dyn ConvexSolver,
    bases: &Mat<f64>,
    measurements: &[Vec<f64>],
    config: &DecomposeConfig,
) -> Result<Vec<Decomposition>, DecompError> {
    validate_matrix(bases, 1, 1)?;
    measurements
        .par_iter()
        .map(|measured| decompose_with(solver, bases, measured, config))
        .collect()
}

fn validate_config(config: &DecomposeConfig) -> Result<(), DecompError> {
    for (name, bound) in [
        ("amplitude_bound", config.amplitude_bound),
        ("noise_bound", config.noise_bound),
    ] {
        if !bound.is_finite() || bound < 0.0 {
            return Err(DecompError::InvalidInput(format!(
                "{name} must be finite and non-negative, got {bound}"
            )));
        }
    }
    Ok(())
}

/// Epigraph form of the infinity-norm problem.
///
/// Variables are laid out as [a₀ … a_{R−1}, n, t]; the objective is t and
/// each sample j contributes ±(Σᵢ Bᵢⱼ aᵢ + n − mⱼ) ≤ t.
pub(crate) fn build_problem(
    bases: &Mat<f64>,
    measured: &[f64],
    config: &DecomposeConfig,
) -> LinearProgram {
    let n_bases = bases.nrows();
    let mut lp = LinearProgram::new();

    let amps: Vec<usize> = (0..n_bases)
        .map(|_| lp.add_var(0.0, (0.0, config.amplitude_bound)))
        .collect();
    let noise = lp.add_var(0.0, (0.0, config.noise_bound));
    let t = lp.add_var(1.0, (0.0, f64::INFINITY));

    for (j, &m) in measured.iter().enumerate() {
        let mut upper: Vec<(usize, f64)> = amps
            .iter()
            .map(|&i| (i, bases[(i, j)]))
            .filter(|&(_, b)| b != 0.0)
            .collect();
        upper.push((noise, 1.0));
        let mut lower: Vec<(usize, f64)> = upper.iter().map(|&(i, v)| (i, -v)).collect();

        upper.push((t, -1.0));
        lower.push((t, -1.0));
        lp.add_inequality(upper, m);
        lp.add_inequality(lower, -m);
    }

    if config.complete {
        lp.add_equality(amps.iter().map(|&i| (i, 1.0)).collect(), 1.0);
    }

    lp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverOutcome;
    use std::sync::Mutex;

    fn assert_near(a: f64, b: f64, eps: f64) {
        assert!(
            (a - b).abs() < eps,
            "expected {a} ≈ {b} (diff = {})",
            (a - b).abs()
        );
    }

    /// Returns a canned outcome and remembers the last program it saw.
    struct FakeSolver {
        status: SolveStatus,
        values: Vec<f64>,
        objective: f64,
        seen: Mutex<Option<LinearProgram>>,
    }

    impl FakeSolver {
        fn new(status: SolveStatus, values: Vec<f64>, objective: f64) -> Self {
            Self {
                status,
                values,
                objective,
                seen: Mutex::new(None),
            }
        }

        fn last_problem(&self) -> LinearProgram {
            self.seen.lock().unwrap().clone().unwrap()
        }
    }

    impl ConvexSolver for FakeSolver {
        fn solve(&self, problem: &LinearProgram) -> Result<SolverOutcome, DecompError> {
            *self.seen.lock().unwrap() = Some(problem.clone());
            Ok(SolverOutcome {
                status: self.status,
                values: self.values.clone(),
                objective: self.objective,
            })
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn two_indicator_bases() -> Mat<f64> {
        // Disjoint supports; column 4 is covered by neither basis.
        let mut b = Mat::<f64>::zeros(2, 5);
        b[(0, 0)] = 1.0;
        b[(0, 1)] = 1.0;
        b[(1, 2)] = 1.0;
        b[(1, 3)] = 1.0;
        b
    }

    fn mix(bases: &Mat<f64>, amps: &[f64], floor: f64) -> Vec<f64> {
        (0..bases.ncols())
            .map(|j| {
                floor
                    + amps
                        .iter()
                        .enumerate()
                        .map(|(i, a)| a * bases[(i, j)])
                        .sum::<f64>()
            })
            .collect()
    }

    #[test]
    fn test_problem_layout_partial() {
        let bases = two_indicator_bases();
        let measured = vec![0.1; 5];
        let lp = build_problem(&bases, &measured, &DecomposeConfig::default());

        assert_eq!(lp.n_vars(), 4);
        assert_eq!(lp.objective, vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(lp.bounds[0], (0.0, 1.0));
        assert_eq!(lp.bounds[2], (0.0, 1.0));
        assert_eq!(lp.inequalities.len(), 10);
        assert!(lp.equalities.is_empty());
    }

    #[test]
    fn test_problem_layout_complete() {
        let bases = two_indicator_bases();
        let measured = vec![0.1; 5];
        let lp = build_problem(&bases, &measured, &DecomposeConfig::with_complete(true));

        assert_eq!(lp.equalities.len(), 1);
        assert_eq!(lp.equalities[0].coeffs, vec![(0, 1.0), (1, 1.0)]);
        assert_eq!(lp.equalities[0].rhs, 1.0);
    }

    #[test]
    fn test_problem_residual_rows() {
        let bases = two_indicator_bases();
        let measured = vec![0.1, 0.2, 0.3, 0.4, 0.5];
        let lp = build_problem(&bases, &measured, &DecomposeConfig::default());

        // Column 0: a0 + n - t <= 0.1 and -a0 - n - t <= -0.1
        assert_eq!(lp.inequalities[0].coeffs, vec![(0, 1.0), (2, 1.0), (3, -1.0)]);
        assert_eq!(lp.inequalities[0].rhs, 0.1);
        assert_eq!(lp.inequalities[1].coeffs, vec![(0, -1.0), (2, -1.0), (3, -1.0)]);
        assert_eq!(lp.inequalities[1].rhs, -0.1);
        // Column 4 has no basis support
        assert_eq!(lp.inequalities[8].coeffs, vec![(2, 1.0), (3, -1.0)]);
    }

    #[test]
    fn test_fake_solver_noise_scaled() {
        let bases = two_indicator_bases();
        let measured = vec![0.0; 5];
        let solver = FakeSolver::new(SolveStatus::Optimal, vec![0.25, 0.75, 0.4, 0.01], 0.01);
        let config = DecomposeConfig::with_complete(true);
        let result = decompose_with(&solver, &bases, &measured, &config).unwrap();

        assert_eq!(result.amplitudes, vec![0.25, 0.75]);
        assert_near(result.noise, 0.2, 1e-15);
        assert_near(result.noise_floor(), 0.4, 1e-15);
        assert_eq!(result.objective, 0.01);
        assert_eq!(result.status, SolveStatus::Optimal);
        assert_eq!(solver.last_problem().equalities.len(), 1);
    }

    #[test]
    fn test_fake_solver_inaccurate_accepted() {
        let bases = two_indicator_bases();
        let solver = FakeSolver::new(
            SolveStatus::OptimalInaccurate,
            vec![0.5, 0.5, 0.0, 0.2],
            0.2,
        );
        let result =
            decompose_with(&solver, &bases, &[0.0; 5], &DecomposeConfig::default()).unwrap();
        assert_eq!(result.status, SolveStatus::OptimalInaccurate);
        assert_eq!(result.amplitudes.len(), 2);
    }

    #[test]
    fn test_fake_solver_failure_is_error() {
        let bases = two_indicator_bases();
        for status in [
            SolveStatus::Infeasible,
            SolveStatus::Unbounded,
            SolveStatus::IterationLimit,
            SolveStatus::NumericalFailure,
        ] {
            let solver = FakeSolver::new(status, vec![0.0; 4], 0.0);
            let err = decompose_with(&solver, &bases, &[0.0; 5], &DecomposeConfig::default())
                .unwrap_err();
            match err {
                DecompError::SolverFailed { status: s } => assert_eq!(s, status),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_fake_solver_short_solution() {
        let bases = two_indicator_bases();
        let solver = FakeSolver::new(SolveStatus::Optimal, vec![0.5], 0.0);
        let err = decompose_with(&solver, &bases, &[0.0; 5], &DecomposeConfig::default())
            .unwrap_err();
        assert!(matches!(err, DecompError::ShapeMismatch { expected: 4, found: 1, .. }));
    }

    #[test]
    fn test_fake_solver_clamps_box() {
        let bases = two_indicator_bases();
        let solver = FakeSolver::new(
            SolveStatus::Optimal,
            vec![-1e-12, 1.0 + 1e-12, -1e-12, 0.0],
            0.0,
        );
        let result =
            decompose_with(&solver, &bases, &[0.0; 5], &DecomposeConfig::default()).unwrap();
        assert_eq!(result.amplitudes, vec![0.0, 1.0]);
        assert_eq!(result.noise, 0.0);
    }

    #[test]
    fn test_shape_mismatch_before_solve() {
        let bases = Mat::<f64>::zeros(3, 100);
        let measured = vec![0.0; 99];
        let solver = FakeSolver::new(SolveStatus::Optimal, vec![0.0; 5], 0.0);
        let err = decompose_with(&solver, &bases, &measured, &DecomposeConfig::default())
            .unwrap_err();
        assert!(matches!(
            err,
            DecompError::ShapeMismatch {
                expected: 100,
                found: 99,
                ..
            }
        ));
        assert!(solver.seen.lock().unwrap().is_none());
    }

    #[test]
    fn test_invalid_config() {
        let bases = two_indicator_bases();
        let solver = FakeSolver::new(SolveStatus::Optimal, vec![0.0; 4], 0.0);
        let config = DecomposeConfig {
            noise_bound: f64::NAN,
            ..Default::default()
        };
        assert!(decompose_with(&solver, &bases, &[0.0; 5], &config).is_err());
    }

    #[test]
    fn test_clarabel_recovers_complete_mixture() {
        let bases = two_indicator_bases();
        let measured = mix(&bases, &[0.3, 0.7], 0.0);
        let result = decompose(&bases, &measured, true).unwrap();

        assert_near(result.amplitudes[0], 0.3, 1e-4);
        assert_near(result.amplitudes[1], 0.7, 1e-4);
        assert_near(result.noise, 0.0, 1e-4);
        assert_near(result.objective, 0.0, 1e-4);
    }

    #[test]
    fn test_clarabel_recovers_noise_floor() {
        let bases = two_indicator_bases();
        let measured = mix(&bases, &[0.3, 0.7], 0.2);
        let result = decompose(&bases, &measured, true).unwrap();

        assert_near(result.amplitudes[0], 0.3, 1e-4);
        assert_near(result.amplitudes[1], 0.7, 1e-4);
        assert_near(result.noise, 0.1, 1e-4);
        assert_near(result.max_residual(&bases, &measured).unwrap(), 0.0, 1e-4);
    }

    #[test]
    fn test_clarabel_partial_mixture() {
        let bases = two_indicator_bases();
        let measured = mix(&bases, &[0.2, 0.5], 0.0);
        let result = decompose(&bases, &measured, false).unwrap();

        assert_near(result.amplitudes[0], 0.2, 1e-4);
        assert_near(result.amplitudes[1], 0.5, 1e-4);
        assert_near(result.objective, 0.0, 1e-4);
    }

    #[test]
    fn test_clarabel_complete_sum_constraint_binds() {
        // Best unconstrained fit sums to 0.4; the complete regime must still sum to 1.
        let bases = two_indicator_bases();
        let measured = mix(&bases, &[0.1, 0.3], 0.0);
        let result = decompose(&bases, &measured, true).unwrap();

        let total: f64 = result.amplitudes.iter().sum();
        assert_near(total, 1.0, 1e-4);
        assert!(result.objective > 0.1);
    }

    #[test]
    fn test_batch_matches_single() {
        let bases = two_indicator_bases();
        let measurements = vec![
            mix(&bases, &[0.3, 0.7], 0.0),
            mix(&bases, &[0.6, 0.4], 0.1),
        ];
        let solver = ClarabelSolver::default();
        let config = DecomposeConfig::with_complete(true);
        let batch = decompose_batch(&solver, &bases, &measurements, &config).unwrap();

        assert_eq!(batch.len(), 2);
        for (m, r) in measurements.iter().zip(&batch) {
            let single = decompose_with(&solver, &bases, m, &config).unwrap();
            for (a, b) in single.amplitudes.iter().zip(&r.amplitudes) {
                assert_near(*a, *b, 1e-9);
            }
        }
    }

    #[test]
    fn test_batch_reports_shape_error() {
        let bases = two_indicator_bases();
        let measurements = vec![vec![0.0; 5], vec![0.0; 4]];
        let result = decompose_batch(
            &ClarabelSolver::default(),
            &bases,
            &measurements,
            &DecomposeConfig::default(),
        );
        assert!(result.is_err());
    }
}
