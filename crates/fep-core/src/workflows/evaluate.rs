use crate::core::io::results::{self, PairEnergies};
use crate::core::models::environment::Environment;
use crate::engine::config::FepConfig;
use crate::engine::error::EngineError;
use crate::engine::layout;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::simulation::{
    EnergyContext, ExternalError, SimulationEngine, TrajectoryReader, reduced_potential,
};
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Re-evaluates every frame of `conformation_state`'s trajectory under the potential of
/// `potential_state`, returning one reduced potential per frame.
///
/// The environment tag is validated before the structure is resolved, and both happen
/// before any file is touched.
#[instrument(skip_all, name = "energy_evaluation", fields(environment = environment, potential = potential_state, conformation = conformation_state))]
pub fn evaluate<E, R>(
    environment: &str,
    potential_state: usize,
    conformation_state: usize,
    structure_name: &str,
    config: &FepConfig,
    engine: &E,
    reader: &R,
) -> Result<Vec<f64>, EngineError>
where
    E: SimulationEngine,
    R: TrajectoryReader,
{
    let environment: Environment = environment.parse()?;
    let structure = config
        .structure(structure_name)
        .ok_or_else(|| EngineError::StructureNotFound {
            name: structure_name.to_string(),
        })?;
    let stem = &structure.files(environment).intermediate_filename;
    let ladder = config.ladder_dir(&structure.name);

    let potential_dir = layout::state_dir(&ladder, potential_state);
    let files = layout::potential_files(&potential_dir, stem);
    debug!(system = %files.system_xml.display(), "Loading potential.");
    let mut context = engine
        .load(&files)
        .map_err(|source| EngineError::Simulation {
            state: potential_state,
            source,
        })?;

    let trajectory_path =
        layout::trajectory_file(&layout::state_dir(&ladder, conformation_state), stem);
    let trajectory = reader
        .read(&trajectory_path, &files.topology)
        .map_err(|source| EngineError::Trajectory {
            path: trajectory_path.clone(),
            source,
        })?;

    let simulation_err = |source: ExternalError| EngineError::Simulation {
        state: potential_state,
        source,
    };
    let mut energies = Vec::with_capacity(trajectory.len());
    for frame in &trajectory.frames {
        context
            .set_periodic_box(frame.cell_length_nm)
            .map_err(simulation_err)?;
        context
            .set_positions(&frame.positions)
            .map_err(simulation_err)?;
        let potential_energy = context.potential_energy().map_err(simulation_err)?;
        energies.push(reduced_potential(potential_energy, frame.cell_length_nm));
    }

    info!(frames = energies.len(), "Re-evaluated trajectory.");
    Ok(energies)
}

/// Evaluates one state pair in both environments and stores the result file.
///
/// Returns the path of the written `energy_<structure>_<i>_<j>.json`.
#[instrument(skip_all, name = "pair_evaluation", fields(structure = structure_name, potential = potential_state, conformation = conformation_state))]
pub fn evaluate_pair<E, R>(
    potential_state: usize,
    conformation_state: usize,
    structure_name: &str,
    config: &FepConfig,
    engine: &E,
    reader: &R,
) -> Result<PathBuf, EngineError>
where
    E: SimulationEngine,
    R: TrajectoryReader,
{
    let mut energies = PairEnergies::default();
    for environment in Environment::ALL {
        let values = evaluate(
            environment.as_str(),
            potential_state,
            conformation_state,
            structure_name,
            config,
            engine,
            reader,
        )?;
        energies.set(environment, values);
    }

    let path = results::pair_result_path(
        &config.results_dir(),
        structure_name,
        potential_state,
        conformation_state,
    );
    energies.write_to_path(&path)?;
    Ok(path)
}

/// Evaluates every `(i, j)` pair of a ladder with `nr_of_states` states.
pub fn evaluate_all_pairs<E, R>(
    nr_of_states: usize,
    structure_name: &str,
    config: &FepConfig,
    engine: &E,
    reader: &R,
    reporter: &ProgressReporter,
) -> Result<Vec<PathBuf>, EngineError>
where
    E: SimulationEngine,
    R: TrajectoryReader,
{
    reporter.report(Progress::PhaseStart {
        name: "Energy Re-evaluation",
    });
    reporter.report(Progress::TaskStart {
        total_steps: (nr_of_states * nr_of_states) as u64,
    });

    let mut written = Vec::with_capacity(nr_of_states * nr_of_states);
    for potential in 1..=nr_of_states {
        for conformation in 1..=nr_of_states {
            written.push(evaluate_pair(
                potential,
                conformation,
                structure_name,
                config,
                engine,
                reader,
            )?);
            reporter.report(Progress::PairProcessed {
                potential_state: potential,
                conformation_state: conformation,
            });
            reporter.report(Progress::TaskIncrement);
        }
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    Ok(written)
}
