use crate::cli::CheckArgs;
use crate::config::{AppConfig, build_config};
use crate::error::{CliError, Result};
use fepladder::core::io::toppar;
use fepladder::core::models::environment::Environment;
use fepladder::engine::config::{FepConfig, StructureConfig};
use fepladder::engine::layout::{self, BaseSetup, HELPER_SCRIPTS, RUN_SCRIPT, SUBMIT_SCRIPT};
use std::path::PathBuf;
use tracing::{debug, info};

/// How far a state directory has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateStatus {
    Missing,
    Built,
    Simulated,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let app = build_config(&args.config)?;
    let config = &app.core_config;
    println!(
        "Configuration OK: {} ({} frames per state)",
        config.system_name(),
        config.simulation.frames_per_state()
    );

    let mut missing_total = 0;
    for name in app.select_structures(args.structure.as_deref())? {
        let structure = config
            .structure(&name)
            .ok_or_else(|| CliError::Argument(format!("Unknown structure '{}'", name)))?;

        let missing = missing_inputs(config, structure);
        if missing.is_empty() {
            println!("\n✓ Base setup of '{}' is complete.", name);
        } else {
            println!("\n✗ Base setup of '{}' is missing {} file(s):", name, missing.len());
            for path in &missing {
                println!("    {}", path.display());
            }
        }
        missing_total += missing.len();

        report_ladder(&app, structure)?;
    }

    if missing_total > 0 {
        return Err(CliError::Validation(format!(
            "{} required input file(s) missing",
            missing_total
        )));
    }
    Ok(())
}

/// Every input a state build copies, that does not exist on disk.
pub fn missing_inputs(config: &FepConfig, structure: &StructureConfig) -> Vec<PathBuf> {
    let base_dir = config.base_setup_dir(structure);
    let base = BaseSetup::new(&base_dir);

    let mut required = Vec::new();
    for environment in Environment::ALL {
        let files = structure.files(environment);
        required.push(base.crd_file(environment, files));
        required.push(base.rst_file(environment, files));
        required.push(base.simulation_parameter(environment, files));
    }
    let ligand_dir = base.ligand_dir(&structure.tlc);
    required.push(ligand_dir.join(toppar::ligand_rtf_name(&structure.tlc)));
    required.push(ligand_dir.join(toppar::ligand_prm_name(&structure.tlc)));
    required.extend(
        HELPER_SCRIPTS
            .iter()
            .chain([&RUN_SCRIPT])
            .map(|script| base.script(script)),
    );
    required.push(config.paths.toppar_dir.clone());
    required.push(config.paths.bin_dir.join(SUBMIT_SCRIPT));

    required
        .into_iter()
        .inspect(|path| debug!(path = %path.display(), "Checking input"))
        .filter(|path| !path.exists())
        .collect()
}

/// `Simulated` once both environments have serialized potentials and a trajectory.
pub fn state_status(config: &FepConfig, structure: &StructureConfig, index: usize) -> StateStatus {
    let dir = layout::state_dir(&config.ladder_dir(&structure.name), index);
    if !dir.is_dir() {
        return StateStatus::Missing;
    }
    let simulated = Environment::ALL.iter().all(|&environment| {
        let stem = &structure.files(environment).intermediate_filename;
        let files = layout::potential_files(&dir, stem);
        files.system_xml.is_file()
            && files.integrator_xml.is_file()
            && layout::trajectory_file(&dir, stem).is_file()
    });
    if simulated {
        StateStatus::Simulated
    } else {
        StateStatus::Built
    }
}

fn report_ladder(app: &AppConfig, structure: &StructureConfig) -> Result<()> {
    let plan = app.plan_for(&structure.name)?;
    if plan.is_empty() {
        return Ok(());
    }
    let statuses: Vec<StateStatus> = plan
        .iter()
        .map(|state| state_status(&app.core_config, structure, state.index))
        .collect();
    let count = |status| statuses.iter().filter(|&&s| s == status).count();
    info!(structure = %structure.name, states = plan.len(), "Checked ladder.");
    println!(
        "  Ladder {}: {} state(s) planned, {} built, {} simulated, {} missing",
        app.core_config.ladder_dir(&structure.name).display(),
        plan.len(),
        count(StateStatus::Built),
        count(StateStatus::Simulated),
        count(StateStatus::Missing)
    );
    Ok(())
}
