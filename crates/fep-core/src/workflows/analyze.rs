use crate::core::io::results::{self, PairEnergies};
use crate::core::models::environment::Environment;
use crate::engine::config::FepConfig;
use crate::engine::error::EngineError;
use crate::engine::estimator::{EstimatorOutput, ReducedPotentialMatrix, ReweightingEstimator};
use crate::engine::progress::{Progress, ProgressReporter};
use nalgebra::DMatrix;
use tracing::{info, instrument};

/// Free-energy estimates for both environments of one structure's ladder.
///
/// Everything is computed at construction time; accessors only project the stored result.
#[derive(Debug, Clone)]
pub struct FreeEnergyCalculator {
    nr_of_states: usize,
    waterbox: EstimatorOutput,
    complex: EstimatorOutput,
}

impl FreeEnergyCalculator {
    /// Loads all `nr_of_states²` result files of `structure` and runs the estimator on
    /// each environment.
    pub fn new<E: ReweightingEstimator>(
        config: &FepConfig,
        nr_of_states: usize,
        structure: &str,
        estimator: &E,
    ) -> Result<Self, EngineError> {
        Self::with_reporter(config, nr_of_states, structure, estimator, &ProgressReporter::new())
    }

    /// Like [`FreeEnergyCalculator::new`], reporting one task step per loaded result file.
    #[instrument(skip_all, name = "free_energy_analysis", fields(structure = structure, states = nr_of_states))]
    pub fn with_reporter<E: ReweightingEstimator>(
        config: &FepConfig,
        nr_of_states: usize,
        structure: &str,
        estimator: &E,
        reporter: &ProgressReporter,
    ) -> Result<Self, EngineError> {
        let results_dir = config.results_dir();
        let mut waterbox = ReducedPotentialMatrix::new(nr_of_states);
        let mut complex = ReducedPotentialMatrix::new(nr_of_states);

        reporter.report(Progress::PhaseStart {
            name: "Loading Energies",
        });
        reporter.report(Progress::TaskStart {
            total_steps: (nr_of_states * nr_of_states) as u64,
        });
        for potential in 1..=nr_of_states {
            for conformation in 1..=nr_of_states {
                let path =
                    results::pair_result_path(&results_dir, structure, potential, conformation);
                let PairEnergies {
                    waterbox: w,
                    complex: c,
                } = PairEnergies::read_from_path(&path)?;
                waterbox.insert(potential, conformation, w);
                complex.insert(potential, conformation, c);
                reporter.report(Progress::PairProcessed {
                    potential_state: potential,
                    conformation_state: conformation,
                });
                reporter.report(Progress::TaskIncrement);
            }
        }
        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);
        reporter.message(format!(
            "Loaded {} pair files from {}",
            nr_of_states * nr_of_states,
            results_dir.display()
        ));
        info!(files = nr_of_states * nr_of_states, "Loaded pair energies.");

        Self::from_matrices(&waterbox, &complex, estimator)
    }

    /// Runs the estimator on matrices that are already in memory.
    ///
    /// Both environments must describe the same number of states.
    pub fn from_matrices<E: ReweightingEstimator>(
        waterbox: &ReducedPotentialMatrix,
        complex: &ReducedPotentialMatrix,
        estimator: &E,
    ) -> Result<Self, EngineError> {
        if waterbox.nr_of_states() != complex.nr_of_states() {
            return Err(EngineError::StateCountMismatch {
                waterbox: waterbox.nr_of_states(),
                complex: complex.nr_of_states(),
            });
        }
        let run = |matrix: &ReducedPotentialMatrix| -> Result<EstimatorOutput, EngineError> {
            let (u_kn, n_k) = matrix.assemble()?;
            Ok(estimator.estimate(&u_kn, &n_k)?)
        };
        Ok(Self {
            nr_of_states: waterbox.nr_of_states(),
            waterbox: run(waterbox)?,
            complex: run(complex)?,
        })
    }

    pub fn nr_of_states(&self) -> usize {
        self.nr_of_states
    }

    fn output(&self, environment: Environment) -> &EstimatorOutput {
        match environment {
            Environment::Waterbox => &self.waterbox,
            Environment::Complex => &self.complex,
        }
    }

    /// `ΔF[(i, j)] = f_j − f_i` in kT.
    pub fn free_energy_differences(&self, environment: Environment) -> &DMatrix<f64> {
        &self.output(environment).delta_f
    }

    pub fn uncertainties(&self, environment: Environment) -> &DMatrix<f64> {
        &self.output(environment).d_delta_f
    }

    pub fn overlap(&self, environment: Environment) -> &DMatrix<f64> {
        &self.output(environment).overlap
    }

    /// `ΔG = ΔF_complex(0 → K−1) − ΔF_waterbox(0 → K−1)` with the two uncertainties summed.
    pub fn end_state_free_energy_difference(&self) -> (f64, f64) {
        let last = self.nr_of_states.saturating_sub(1);
        let end = |out: &EstimatorOutput| (out.delta_f[(0, last)], out.d_delta_f[(0, last)]);
        let (complex, d_complex) = end(&self.complex);
        let (waterbox, d_waterbox) = end(&self.waterbox);
        (complex - waterbox, d_complex + d_waterbox)
    }
}
