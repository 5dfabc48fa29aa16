//! Linear-program model and the solver backends that consume it.
//!
//! The decomposer only ever talks to a [`ConvexSolver`]; the Clarabel
//! interior-point backend is the default implementation.

use clarabel::algebra::CscMatrix;
use clarabel::solver::*;

use crate::types::{DecompError, SolveStatus};

/// Sparse linear constraint row: Σ coeff·x[index] (op) rhs.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub coeffs: Vec<(usize, f64)>,
    pub rhs: f64,
}

impl LinearConstraint {
    pub fn new(coeffs: Vec<(usize, f64)>, rhs: f64) -> Self {
        Self { coeffs, rhs }
    }
}

/// Minimize cᵀx subject to equality rows, `row · x <= rhs` rows, and
/// per-variable bounds.
#[derive(Debug, Clone, Default)]
pub struct LinearProgram {
    pub objective: Vec<f64>,
    /// (lower, upper) per variable; infinite entries are unbounded.
    pub bounds: Vec<(f64, f64)>,
    pub equalities: Vec<LinearConstraint>,
    pub inequalities: Vec<LinearConstraint>,
}

impl LinearProgram {
    /// Empty program with no variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable with objective coefficient and bounds, returning its index.
    pub fn add_var(&mut self, cost: f64, bounds: (f64, f64)) -> usize {
        self.objective.push(cost);
        self.bounds.push(bounds);
        self.objective.len() - 1
    }

    pub fn add_equality(&mut self, coeffs: Vec<(usize, f64)>, rhs: f64) {
        self.equalities.push(LinearConstraint::new(coeffs, rhs));
    }

    pub fn add_inequality(&mut self, coeffs: Vec<(usize, f64)>, rhs: f64) {
        self.inequalities.push(LinearConstraint::new(coeffs, rhs));
    }

    pub fn n_vars(&self) -> usize {
        self.objective.len()
    }

    /// Check indices, bounds, and coefficients.
    pub fn validate(&self) -> Result<(), DecompError> {
        let n = self.n_vars();
        if n == 0 {
            return Err(DecompError::SolverError("program has no variables".into()));
        }
        if self.bounds.len() != n {
            return Err(DecompError::SolverError(format!(
                "{} bounds for {n} variables",
                self.bounds.len()
            )));
        }
        if self.objective.iter().any(|c| !c.is_finite()) {
            return Err(DecompError::SolverError(
                "objective has non-finite coefficients".into(),
            ));
        }
        for (i, &(lo, hi)) in self.bounds.iter().enumerate() {
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(DecompError::SolverError(format!(
                    "variable {i} has invalid bounds ({lo}, {hi})"
                )));
            }
        }
        for row in self.equalities.iter().chain(&self.inequalities) {
            if !row.rhs.is_finite() {
                return Err(DecompError::SolverError(
                    "constraint has non-finite right-hand side".into(),
                ));
            }
            for &(idx, coeff) in &row.coeffs {
                if idx >= n {
                    return Err(DecompError::SolverError(format!(
                        "constraint references variable {idx}, program has {n}"
                    )));
                }
                if !coeff.is_finite() {
                    return Err(DecompError::SolverError(
                        "constraint has non-finite coefficients".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// What a solver returns for a program.
#[derive(Debug, Clone)]
pub struct SolverOutcome {
    pub status: SolveStatus,
    /// Variable values, one per program variable. Meaningful only when the
    /// status is usable.
    pub values: Vec<f64>,
    /// Achieved objective value.
    pub objective: f64,
}

/// A backend able to solve a [`LinearProgram`].
pub trait ConvexSolver: Send + Sync {
    /// Solve the program. `Err` means the solver could not run at all; a
    /// solver that ran but failed reports it through the outcome status.
    fn solve(&self, problem: &LinearProgram) -> Result<SolverOutcome, DecompError>;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Settings for the Clarabel backend.
#[derive(Debug, Clone)]
pub struct SolverSettings {
    pub max_iter: u32,
    pub tol_gap_abs: f64,
    pub tol_gap_rel: f64,
    pub tol_feas: f64,
    /// Print Clarabel's iteration log to stdout.
    pub verbose: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iter: 200,
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
            tol_feas: 1e-8,
            verbose: false,
        }
    }
}

/// Interior-point backend built on Clarabel.
///
/// Equalities become a zero cone; inequalities and finite variable bounds
/// become a nonnegative cone on the slack `b - Ax`.
#[derive(Debug, Clone, Default)]
pub struct ClarabelSolver {
    pub settings: SolverSettings,
}

impl ClarabelSolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }
}

impl ConvexSolver for ClarabelSolver {
    fn solve(&self, problem: &LinearProgram) -> Result<SolverOutcome, DecompError> {
        problem.validate()?;
        let n = problem.n_vars();

        let mut triplets: Vec<(usize, usize, f64)> = Vec::new();
        let mut b: Vec<f64> = Vec::new();

        for row in &problem.equalities {
            let r = b.len();
            triplets.extend(row.coeffs.iter().map(|&(j, v)| (r, j, v)));
            b.push(row.rhs);
        }
        let n_eq = b.len();

        for row in &problem.inequalities {
            let r = b.len();
            triplets.extend(row.coeffs.iter().map(|&(j, v)| (r, j, v)));
            b.push(row.rhs);
        }
        for (j, &(lo, hi)) in problem.bounds.iter().enumerate() {
            if lo.is_finite() {
                triplets.push((b.len(), j, -1.0));
                b.push(-lo);
            }
            if hi.is_finite() {
                triplets.push((b.len(), j, 1.0));
                b.push(hi);
            }
        }
        let n_ineq = b.len() - n_eq;
        if b.is_empty() {
            return Err(DecompError::SolverError("program has no constraints".into()));
        }

        let a = csc_from_triplets(b.len(), n, triplets);
        let p = CscMatrix::<f64>::zeros((n, n));

        let mut cones = Vec::new();
        if n_eq > 0 {
            cones.push(ZeroConeT(n_eq));
        }
        if n_ineq > 0 {
            cones.push(NonnegativeConeT(n_ineq));
        }

        let settings: DefaultSettings<f64> = DefaultSettings {
            max_iter: self.settings.max_iter,
            tol_gap_abs: self.settings.tol_gap_abs,
            tol_gap_rel: self.settings.tol_gap_rel,
            tol_feas: self.settings.tol_feas,
            verbose: self.settings.verbose,
            ..DefaultSettings::default()
        };

        let mut solver = DefaultSolver::new(&p, &problem.objective, &a, &b, &cones, settings);
        solver.solve();

        Ok(SolverOutcome {
            status: map_status(&solver.solution.status),
            values: solver.solution.x.clone(),
            objective: solver.solution.obj_val,
        })
    }

    fn name(&self) -> &str {
        "clarabel"
    }
}

fn map_status(status: &SolverStatus) -> SolveStatus {
    match status {
        SolverStatus::Solved => SolveStatus::Optimal,
        SolverStatus::AlmostSolved => SolveStatus::OptimalInaccurate,
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
            SolveStatus::Infeasible
        }
        SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
            SolveStatus::Unbounded
        }
        SolverStatus::MaxIterations | SolverStatus::MaxTime => SolveStatus::IterationLimit,
        _ => SolveStatus::NumericalFailure,
    }
}

/// Assemble an m × n CSC matrix, summing duplicate entries.
fn csc_from_triplets(m: usize, n: usize, mut triplets: Vec<(usize, usize, f64)>) -> CscMatrix<f64> {
    triplets.sort_by(|x, y| (x.1, x.0).cmp(&(y.1, y.0)));

    let mut colptr = vec![0usize; n + 1];
    let mut rowval: Vec<usize> = Vec::with_capacity(triplets.len());
    let mut nzval: Vec<f64> = Vec::with_capacity(triplets.len());
    let mut last: Option<(usize, usize)> = None;

    for (r, c, v) in triplets {
        if last == Some((r, c)) {
            if let Some(tail) = nzval.last_mut() {
                *tail += v;
            }
            continue;
        }
        rowval.push(r);
        nzval.push(v);
        colptr[c + 1] += 1;
        last = Some((r, c));
    }
    for c in 0..n {
        colptr[c + 1] += colptr[c];
    }

    CscMatrix::new(m, n, colptr, rowval, nzval)
}
