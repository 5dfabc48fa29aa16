use numpy::ndarray::{Array1, Array2};
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ============================================================================
// Helper conversions
// ============================================================================

fn array_to_faer(arr: &PyReadonlyArray2<f64>) -> faer::Mat<f64> {
    let view = arr.as_array();
    let (nrows, ncols) = view.dim();
    faer::Mat::<f64>::from_fn(nrows, ncols, |i, j| view[[i, j]])
}

fn faer_to_array2(m: &faer::Mat<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

fn decomp_err_to_py(e: sd::DecompError) -> PyErr {
    match e {
        sd::DecompError::SolverFailed { .. } | sd::DecompError::SolverError(_) => {
            PyRuntimeError::new_err(e.to_string())
        }
        _ => PyValueError::new_err(e.to_string()),
    }
}

// ============================================================================
// Basis dictionary
// ============================================================================

/// Dictionary of random Gaussian-peak basis spectra.
///
/// Create with `BasisDictionary(n, low, high, seed)`.
#[pyclass]
#[derive(Clone)]
struct BasisDictionary {
    bases: Vec<sd::BasisSpectrum>,
}

#[pymethods]
impl BasisDictionary {
    /// Generate a dictionary.
    ///
    /// Parameters
    /// ----------
    /// n : int
    ///     Number of basis spectra.
    /// low, high : float
    ///     Spectral domain.
    /// seed : int
    ///     Random seed.
    #[new]
    #[pyo3(signature = (n=10, low=0.0, high=100.0, seed=0))]
    fn new(n: usize, low: f64, high: f64, seed: u64) -> PyResult<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let bases = sd::build_dictionary(n, low, high, &mut rng).map_err(decomp_err_to_py)?;
        Ok(Self { bases })
    }

    fn __len__(&self) -> usize {
        self.bases.len()
    }

    /// Basis ids.
    #[getter]
    fn ids(&self) -> Vec<usize> {
        self.bases.iter().map(|b| b.id).collect()
    }

    /// Basis names.
    #[getter]
    fn names(&self) -> Vec<String> {
        self.bases.iter().map(|b| b.name.clone()).collect()
    }

    /// Peaks of basis `id` as (location, height, scale) tuples.
    fn peaks(&self, id: usize) -> PyResult<Vec<(f64, f64, f64)>> {
        let basis = self
            .bases
            .get(id)
            .ok_or_else(|| PyValueError::new_err(format!("no basis with id {id}")))?;
        Ok(basis
            .spectrum
            .peaks()
            .iter()
            .map(|p| (p.location, p.height, p.scale))
            .collect())
    }

    /// Sample every basis on a grid: array of shape (n_bases, len(grid)).
    fn sample<'py>(
        &self,
        py: Python<'py>,
        grid: PyReadonlyArray1<f64>,
    ) -> Bound<'py, PyArray2<f64>> {
        let xs = grid.as_array().to_vec();
        faer_to_array2(&sd::basis_matrix(&self.bases, &xs)).into_pyarray(py)
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Evenly spaced grid over [low, high], both ends included.
#[pyfunction]
fn linspace<'py>(py: Python<'py>, low: f64, high: f64, n: usize) -> Bound<'py, PyArray1<f64>> {
    Array1::from(sd::linspace(low, high, n)).into_pyarray(py)
}

/// Synthesize a measured spectrum from a basis matrix.
///
/// Parameters
/// ----------
/// bases : numpy.ndarray
///     Basis matrix (n_bases x n_samples).
/// amplitudes : numpy.ndarray
///     Mixing amplitudes (n_bases).
/// noise : float
///     Uniform noise level added per sample.
/// seed : int
///     Random seed.
#[pyfunction]
#[pyo3(signature = (bases, amplitudes, noise=0.0, seed=0))]
fn synthesize<'py>(
    py: Python<'py>,
    bases: PyReadonlyArray2<f64>,
    amplitudes: PyReadonlyArray1<f64>,
    noise: f64,
    seed: u64,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let mat = array_to_faer(&bases);
    let amps = amplitudes.as_array().to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    let measured =
        sd::synthesize_measured(&mat, &amps, noise, &mut rng).map_err(decomp_err_to_py)?;
    Ok(Array1::from(measured).into_pyarray(py))
}

/// Decompose a measured spectrum.
///
/// Parameters
/// ----------
/// bases : numpy.ndarray
///     Basis matrix (n_bases x n_samples).
/// measured : numpy.ndarray
///     Measured spectrum (n_samples).
/// complete : bool
///     Require amplitudes to sum to 1.
///
/// Returns
/// -------
/// tuple
///     (amplitudes, noise, objective)
#[pyfunction]
#[pyo3(signature = (bases, measured, complete=false))]
fn decompose<'py>(
    py: Python<'py>,
    bases: PyReadonlyArray2<f64>,
    measured: PyReadonlyArray1<f64>,
    complete: bool,
) -> PyResult<(Bound<'py, PyArray1<f64>>, f64, f64)> {
    let mat = array_to_faer(&bases);
    let m = measured.as_array().to_vec();
    let result = sd::decompose(&mat, &m, complete).map_err(decomp_err_to_py)?;
    Ok((
        Array1::from(result.amplitudes).into_pyarray(py),
        result.noise,
        result.objective,
    ))
}

// ============================================================================
// Module definition
// ============================================================================

/// Spectral decomposition against Gaussian-peak basis dictionaries.
///
/// Classes
/// -------
/// BasisDictionary : Seeded dictionary of random basis spectra
///
/// Functions
/// ---------
/// linspace : Shared sample grid
/// synthesize : Measured spectrum from a known mixture
/// decompose : Recover amplitudes and noise from a measurement
#[pymodule]
fn spectral_decomp(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<BasisDictionary>()?;
    m.add_function(wrap_pyfunction!(linspace, m)?)?;
    m.add_function(wrap_pyfunction!(synthesize, m)?)?;
    m.add_function(wrap_pyfunction!(decompose, m)?)?;
    Ok(())
}
