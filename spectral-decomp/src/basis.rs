use faer::Mat;
use rand::Rng;

use crate::spectrum::{make_spectrum, Spectrum};
use crate::types::DecompError;
use crate::utils::validate_range;

const VOWELS: &[u8] = b"aeiou";
const CONSONANTS: &[u8] = b"bcdfghjklmnpqrstvwxz";
const NAME_SUFFIX: &str = "ium";

/// Generate a pronounceable element-like name, e.g. "Bovium".
///
/// The stem is consonant, vowel, consonant, drawn in that order.
pub fn generate_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = CONSONANTS[rng.gen_range(0..CONSONANTS.len())];
    let vowel = VOWELS[rng.gen_range(0..VOWELS.len())];
    let last = CONSONANTS[rng.gen_range(0..CONSONANTS.len())];

    let mut name = String::with_capacity(3 + NAME_SUFFIX.len());
    name.push(first.to_ascii_uppercase() as char);
    name.push(vowel as char);
    name.push(last as char);
    name.push_str(NAME_SUFFIX);
    name
}

/// A named member of a decomposition dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisSpectrum {
    /// Position in the dictionary; also the row in the basis matrix.
    pub id: usize,
    pub name: String,
    pub spectrum: Spectrum,
}

impl BasisSpectrum {
    /// Evaluate at a single coordinate.
    pub fn eval(&self, x: f64) -> f64 {
        self.spectrum.eval(x)
    }

    /// Sample on a coordinate grid.
    pub fn sample(&self, xs: &[f64]) -> Vec<f64> {
        self.spectrum.sample(xs)
    }
}

/// Build a dictionary of `n` random basis spectra over [low, high].
///
/// Ids count from 0 within this dictionary. For each basis the spectrum is
/// drawn before the name.
pub fn build_dictionary<R: Rng + ?Sized>(
    n: usize,
    low: f64,
    high: f64,
    rng: &mut R,
) -> Result<Vec<BasisSpectrum>, DecompError> {
    validate_range(low, high)?;
    if n == 0 {
        return Err(DecompError::InvalidInput(
            "dictionary needs at least one basis".into(),
        ));
    }

    let mut dictionary = Vec::with_capacity(n);
    for id in 0..n {
        let spectrum = make_spectrum(low, high, rng);
        let name = generate_name(rng);
        dictionary.push(BasisSpectrum { id, name, spectrum });
    }
    Ok(dictionary)
}

/// Sample every basis on `grid`: an (n_bases × grid.len()) matrix.
pub fn basis_matrix(dictionary: &[BasisSpectrum], grid: &[f64]) -> Mat<f64> {
    let rows: Vec<Vec<f64>> = dictionary.iter().map(|b| b.sample(grid)).collect();
    Mat::from_fn(rows.len(), grid.len(), |i, j| rows[i][j])
}
