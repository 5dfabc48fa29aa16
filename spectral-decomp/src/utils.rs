use faer::Mat;

use crate::types::DecompError;

/// Validate that a matrix meets minimum dimension requirements and contains no NaN/Inf.
pub fn validate_matrix(x: &Mat<f64>, min_rows: usize, min_cols: usize) -> Result<(), DecompError> {
    let (rows, cols) = (x.nrows(), x.ncols());
    if rows < min_rows {
        return Err(DecompError::InvalidInput(format!(
            "matrix has {rows} rows, need at least {min_rows}"
        )));
    }
    if cols < min_cols {
        return Err(DecompError::InvalidInput(format!(
            "matrix has {cols} columns, need at least {min_cols}"
        )));
    }
    for j in 0..cols {
        for i in 0..rows {
            if !x[(i, j)].is_finite() {
                return Err(DecompError::InvalidInput(
                    "matrix contains NaN or Inf values".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Validate that a vector has the expected length and only finite entries.
pub fn validate_vector(
    v: &[f64],
    what: &'static str,
    expected: usize,
) -> Result<(), DecompError> {
    if v.len() != expected {
        return Err(DecompError::ShapeMismatch {
            what,
            expected,
            found: v.len(),
        });
    }
    if v.iter().any(|x| !x.is_finite()) {
        return Err(DecompError::InvalidInput(format!(
            "{what} contains NaN or Inf values"
        )));
    }
    Ok(())
}

/// Validate a spectral domain [low, high].
pub fn validate_range(low: f64, high: f64) -> Result<(), DecompError> {
    if !low.is_finite() || !high.is_finite() {
        return Err(DecompError::InvalidInput(
            "domain bounds must be finite".into(),
        ));
    }
    if high <= low {
        return Err(DecompError::InvalidInput(format!(
            "domain upper bound {high} must exceed lower bound {low}"
        )));
    }
    Ok(())
}

/// `n` evenly spaced points from `low` to `high`, both ends included.
pub fn linspace(low: f64, high: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![low],
        _ => {
            let step = (high - low) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { high } else { low + step * i as f64 })
                .collect()
        }
    }
}
