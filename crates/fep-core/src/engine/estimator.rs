//! Re-weighting estimation of free-energy differences from a reduced-potential matrix.
//!
//! `u_kn[k, n]` is the reduced potential of sample `n` evaluated under state `k`'s
//! potential. Samples are ordered by the state they were drawn from: the first `n_k[0]`
//! columns come from state 0, the next `n_k[1]` from state 1, and so on.

use super::error::EngineError;
use nalgebra::{DMatrix, DVector};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EstimatorError {
    #[error("At least one state is required")]
    NoStates,
    #[error("Sample counts ({counts}) do not match the {states} x {samples} reduced-potential matrix")]
    ShapeMismatch {
        states: usize,
        samples: usize,
        counts: usize,
    },
    #[error("State {state} has no samples")]
    EmptyState { state: usize },
    #[error("Non-finite reduced potential for state {state}, sample {sample}")]
    NonFinite { state: usize, sample: usize },
}

/// Free-energy differences, their uncertainties and the state overlap, in units of kT.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorOutput {
    /// `delta_f[(i, j)] = f_j − f_i`.
    pub delta_f: DMatrix<f64>,
    /// One-sigma uncertainty of `delta_f`.
    pub d_delta_f: DMatrix<f64>,
    /// Overlap matrix; each row sums to one. Estimators may return an approximation.
    pub overlap: DMatrix<f64>,
}

/// The seam to a statistical estimator (e.g., an external MBAR solver).
pub trait ReweightingEstimator {
    fn estimate(&self, u_kn: &DMatrix<f64>, n_k: &[usize])
    -> Result<EstimatorOutput, EstimatorError>;
}

/// Closed-form estimator chaining exponential averages between adjacent states.
///
/// Each link `k → k+1` uses the samples of state `k`:
/// `ΔF = −ln ⟨exp(−(u_{k+1} − u_k))⟩_k`. Link variances come from the delta method and
/// add up along the chain. The overlap matrix is an approximation built from the mixture
/// weights implied by the chained free energies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialAveraging;

fn log_sum_exp(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + values.map(|v| (v - max).exp()).sum::<f64>().ln()
}

fn validate(u_kn: &DMatrix<f64>, n_k: &[usize]) -> Result<Vec<usize>, EstimatorError> {
    let states = u_kn.nrows();
    if states == 0 {
        return Err(EstimatorError::NoStates);
    }
    if n_k.len() != states || n_k.iter().sum::<usize>() != u_kn.ncols() {
        return Err(EstimatorError::ShapeMismatch {
            states,
            samples: u_kn.ncols(),
            counts: n_k.len(),
        });
    }
    if let Some(state) = n_k.iter().position(|&n| n == 0) {
        return Err(EstimatorError::EmptyState { state });
    }
    for state in 0..states {
        for sample in 0..u_kn.ncols() {
            if !u_kn[(state, sample)].is_finite() {
                return Err(EstimatorError::NonFinite { state, sample });
            }
        }
    }
    let mut offsets = Vec::with_capacity(states);
    let mut start = 0;
    for &n in n_k {
        offsets.push(start);
        start += n;
    }
    Ok(offsets)
}

impl ExponentialAveraging {
    /// `(ΔF, var ΔF)` for the link `k → k+1`.
    fn link(u_kn: &DMatrix<f64>, k: usize, offset: usize, count: usize) -> (f64, f64) {
        let exponents: Vec<f64> = (offset..offset + count)
            .map(|n| -(u_kn[(k + 1, n)] - u_kn[(k, n)]))
            .collect();
        let n = count as f64;
        let delta_f = -(log_sum_exp(exponents.iter().copied()) - n.ln());

        if count < 2 {
            return (delta_f, 0.0);
        }
        let max = exponents.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = exponents.iter().map(|e| (e - max).exp()).collect();
        let mean = weights.iter().sum::<f64>() / n;
        let var = weights.iter().map(|w| (w - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (delta_f, var / (n * mean * mean))
    }

    /// Approximate overlap shaped like the MBAR overlap `O = Wᵀ W diag(N)`, with mixture
    /// weights `W_nk = exp(f_k − u_kn) / Σ_l N_l exp(f_l − u_ln)`.
    ///
    /// Chained estimates do not satisfy the self-consistency that makes every weight
    /// column sum to one, so columns and then rows are normalised explicitly. The result
    /// is row-stochastic but in general neither symmetric nor equal to the MBAR overlap;
    /// use it as a diagnostic of neighbouring-state coverage only.
    fn overlap(u_kn: &DMatrix<f64>, n_k: &[usize], f: &[f64]) -> DMatrix<f64> {
        let states = u_kn.nrows();
        let samples = u_kn.ncols();
        let log_n: Vec<f64> = n_k.iter().map(|&n| (n as f64).ln()).collect();

        let mut weights = DMatrix::<f64>::zeros(samples, states);
        for n in 0..samples {
            let log_denominator =
                log_sum_exp((0..states).map(|l| log_n[l] + f[l] - u_kn[(l, n)]));
            for k in 0..states {
                weights[(n, k)] = (f[k] - u_kn[(k, n)] - log_denominator).exp();
            }
        }
        for mut column in weights.column_iter_mut() {
            let sum: f64 = column.iter().sum();
            if sum > 0.0 {
                column /= sum;
            }
        }

        let counts = DMatrix::from_diagonal(&DVector::from_iterator(
            states,
            n_k.iter().map(|&n| n as f64),
        ));
        let mut overlap = weights.transpose() * &weights * counts;
        for mut row in overlap.row_iter_mut() {
            let sum: f64 = row.iter().sum();
            if sum > 0.0 {
                row /= sum;
            }
        }
        overlap
    }
}

impl ReweightingEstimator for ExponentialAveraging {
    fn estimate(
        &self,
        u_kn: &DMatrix<f64>,
        n_k: &[usize],
    ) -> Result<EstimatorOutput, EstimatorError> {
        let offsets = validate(u_kn, n_k)?;
        let states = u_kn.nrows();

        let mut f = vec![0.0; states];
        let mut cumulative_var = vec![0.0; states];
        for k in 0..states.saturating_sub(1) {
            let (delta, var) = Self::link(u_kn, k, offsets[k], n_k[k]);
            f[k + 1] = f[k] + delta;
            cumulative_var[k + 1] = cumulative_var[k] + var;
        }

        let delta_f = DMatrix::from_fn(states, states, |i, j| f[j] - f[i]);
        let d_delta_f = DMatrix::from_fn(states, states, |i, j| {
            (cumulative_var[j] - cumulative_var[i]).abs().sqrt()
        });
        let overlap = Self::overlap(u_kn, n_k, &f);

        Ok(EstimatorOutput {
            delta_f,
            d_delta_f,
            overlap,
        })
    }
}

/// Per-pair reduced potentials of one environment, keyed `(potential_state, conformation_state)`
/// with 1-based state indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReducedPotentialMatrix {
    nr_of_states: usize,
    entries: BTreeMap<(usize, usize), Vec<f64>>,
}

impl ReducedPotentialMatrix {
    pub fn new(nr_of_states: usize) -> Self {
        Self {
            nr_of_states,
            entries: BTreeMap::new(),
        }
    }

    pub fn nr_of_states(&self) -> usize {
        self.nr_of_states
    }

    pub fn insert(&mut self, potential_state: usize, conformation_state: usize, energies: Vec<f64>) {
        self.entries
            .insert((potential_state, conformation_state), energies);
    }

    pub fn get(&self, potential_state: usize, conformation_state: usize) -> Option<&[f64]> {
        self.entries
            .get(&(potential_state, conformation_state))
            .map(Vec::as_slice)
    }

    /// Builds `u_kn` (row = potential state) and the per-conformation-state sample counts.
    ///
    /// Every pair must be present, and for each conformation state all potentials must
    /// have evaluated the same number of frames.
    pub fn assemble(&self) -> Result<(DMatrix<f64>, Vec<usize>), EngineError> {
        let states = self.nr_of_states;
        let mut n_k = Vec::with_capacity(states);
        for conformation in 1..=states {
            let mut expected: Option<usize> = None;
            for potential in 1..=states {
                let found = self
                    .get(potential, conformation)
                    .ok_or(EngineError::MissingPair {
                        potential_state: potential,
                        conformation_state: conformation,
                    })?
                    .len();
                let want = *expected.get_or_insert(found);
                if want != found {
                    return Err(EngineError::NonRectangular {
                        potential_state: potential,
                        conformation_state: conformation,
                        expected: want,
                        found,
                    });
                }
            }
            n_k.push(expected.unwrap_or(0));
        }

        let total: usize = n_k.iter().sum();
        let mut u_kn = DMatrix::<f64>::zeros(states, total);
        for potential in 1..=states {
            let mut column = 0;
            for conformation in 1..=states {
                for &value in self.get(potential, conformation).unwrap_or(&[]) {
                    u_kn[(potential - 1, column)] = value;
                    column += 1;
                }
            }
        }
        Ok((u_kn, n_k))
    }
}
