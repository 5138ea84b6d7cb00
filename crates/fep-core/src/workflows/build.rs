use crate::core::io::dummy_params::{self, PRM_FILE_NAME, RTF_FILE_NAME};
use crate::core::io::pdb::PdbFile;
use crate::core::io::psf::PsfFile;
use crate::core::io::template::{self, SERIALIZER_BOILERPLATE};
use crate::core::io::toppar::{self, STREAM_FILE_NAME};
use crate::core::io::traits::TopologyFile;
use crate::core::models::environment::Environment;
use crate::core::models::system::MolecularSystem;
use crate::core::mutation::Mutation;
use crate::engine::config::{FepConfig, StructureConfig};
use crate::engine::error::EngineError;
use crate::engine::layout::{self, BaseSetup, HELPER_SCRIPTS, RUN_SCRIPT, SUBMIT_SCRIPT, TOPPAR_DIR};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::sequencer::{MutationPlan, Strategy};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// What to do with an output directory that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectoryPolicy {
    /// Delete it with all contents and start from an empty directory.
    #[default]
    Reset,
    /// Keep it and overwrite state directories as they are written.
    Reuse,
    /// Refuse to run.
    RequireAbsent,
}

/// What to do with a state directory whose construction failed halfway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Leave the partial directory for inspection.
    #[default]
    Leave,
    /// Remove the partial directory.
    Clean,
}

/// The directory a structure's `intst<N>` ladder is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirectory {
    path: PathBuf,
}

impl OutputDirectory {
    pub fn create(path: impl Into<PathBuf>, policy: DirectoryPolicy) -> Result<Self, EngineError> {
        let path = path.into();
        if path.exists() {
            match policy {
                DirectoryPolicy::Reset => {
                    warn!(path = %path.display(), "Removing existing output directory");
                    fs::remove_dir_all(&path).map_err(EngineError::io(&path))?;
                }
                DirectoryPolicy::Reuse => {}
                DirectoryPolicy::RequireAbsent => return Err(EngineError::DirectoryExists(path)),
            }
        }
        fs::create_dir_all(&path).map_err(EngineError::io(&path))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state_dir(&self, index: usize) -> PathBuf {
        layout::state_dir(&self.path, index)
    }
}

/// One ligand in both of its environments, together with its base setup.
#[derive(Debug, Clone)]
pub struct SystemStructure {
    pub name: String,
    /// Three-letter tag of the ligand residue.
    pub tlc: String,
    /// CHARMM-GUI style base setup (`<base>/{waterbox,complex}/openmm/...`).
    pub base_dir: PathBuf,
    pub complex: MolecularSystem,
    pub waterbox: MolecularSystem,
}

impl SystemStructure {
    /// Combines a configured structure with its two topologies; the base directory is
    /// taken from the configuration.
    pub fn from_config(
        config: &FepConfig,
        structure: &StructureConfig,
        complex: MolecularSystem,
        waterbox: MolecularSystem,
    ) -> Self {
        Self {
            name: structure.name.clone(),
            tlc: structure.tlc.clone(),
            base_dir: config.base_setup_dir(structure),
            complex,
            waterbox,
        }
    }

    pub fn topology(&self, environment: Environment) -> &MolecularSystem {
        match environment {
            Environment::Complex => &self.complex,
            Environment::Waterbox => &self.waterbox,
        }
    }

    pub fn topology_mut(&mut self, environment: Environment) -> &mut MolecularSystem {
        match environment {
            Environment::Complex => &mut self.complex,
            Environment::Waterbox => &mut self.waterbox,
        }
    }
}

/// Writes one self-contained simulation bundle per intermediate state.
///
/// Mutations are applied to the in-memory topologies in plan order, so each state builds
/// on the one before it.
pub struct IntermediateStateFactory<'a> {
    structure: SystemStructure,
    mutations: Vec<Box<dyn Mutation>>,
    config: &'a FepConfig,
    output: OutputDirectory,
    failure_policy: FailurePolicy,
    reporter: &'a ProgressReporter<'a>,
}

impl<'a> IntermediateStateFactory<'a> {
    pub fn new(
        structure: SystemStructure,
        mutations: Vec<Box<dyn Mutation>>,
        config: &'a FepConfig,
        output: OutputDirectory,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            structure,
            mutations,
            config,
            output,
            failure_policy: FailurePolicy::default(),
            reporter,
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn structure(&self) -> &SystemStructure {
        &self.structure
    }

    pub fn output(&self) -> &OutputDirectory {
        &self.output
    }

    /// Builds every state of the plan derived from the mutation list.
    #[instrument(skip_all, name = "build_intermediate_states", fields(structure = %self.structure.name))]
    pub fn generate_intermediate_states(
        &mut self,
        strategy: Strategy,
    ) -> Result<MutationPlan, EngineError> {
        let plan = MutationPlan::new(&self.mutations, strategy);
        let files = self.structure_config()?.clone();
        info!(
            states = plan.len(),
            mutations = self.mutations.len(),
            %strategy,
            "Generating intermediate states."
        );

        self.reporter.report(Progress::PhaseStart {
            name: "Intermediate States",
        });
        self.reporter.report(Progress::TaskStart {
            total_steps: plan.len() as u64,
        });

        for planned in plan.iter() {
            let mutation = self.mutations[planned.mutation].as_ref();
            debug!(
                state = planned.index,
                mutation = mutation.name(),
                step = planned.step,
                "Building state"
            );
            let dir = self.output.state_dir(planned.index);
            write_state(
                &mut self.structure,
                &files,
                self.config,
                mutation,
                planned.step,
                &dir,
                self.failure_policy,
            )?;
            self.reporter.report(Progress::StateWritten {
                index: planned.index,
            });
            self.reporter.report(Progress::TaskIncrement);
        }

        self.reporter.report(Progress::TaskFinish);
        self.reporter.report(Progress::PhaseFinish);
        self.reporter.message(format!(
            "{} intermediate states written to {}",
            plan.len(),
            self.output.path().display()
        ));
        info!(states = plan.len(), "All intermediate states written.");
        Ok(plan)
    }

    /// Builds `intst<state>` by applying step `state` of `mutation`, outside of any plan.
    #[instrument(skip_all, name = "build_specific_state", fields(state = state))]
    pub fn generate_specific_intermediate_state(
        &mut self,
        mutation: &dyn Mutation,
        state: usize,
    ) -> Result<PathBuf, EngineError> {
        let files = self.structure_config()?.clone();
        let dir = self.output.state_dir(state);
        info!(path = %dir.display(), mutation = mutation.name(), "Writing intermediate state.");
        write_state(
            &mut self.structure,
            &files,
            self.config,
            mutation,
            state,
            &dir,
            self.failure_policy,
        )?;
        self.reporter.report(Progress::StateWritten { index: state });
        Ok(dir)
    }

    fn structure_config(&self) -> Result<&StructureConfig, EngineError> {
        self.config
            .structure(&self.structure.name)
            .ok_or_else(|| EngineError::StructureNotFound {
                name: self.structure.name.clone(),
            })
    }
}

fn write_state(
    structure: &mut SystemStructure,
    files: &StructureConfig,
    config: &FepConfig,
    mutation: &dyn Mutation,
    step: usize,
    dir: &Path,
    failure_policy: FailurePolicy,
) -> Result<(), EngineError> {
    let result = populate_state_dir(structure, files, config, mutation, step, dir);
    if result.is_err() && failure_policy == FailurePolicy::Clean && dir.exists() {
        if let Err(err) = fs::remove_dir_all(dir) {
            warn!(path = %dir.display(), error = %err, "Failed to clean partial state directory");
        }
    }
    result
}

fn populate_state_dir(
    structure: &mut SystemStructure,
    files: &StructureConfig,
    config: &FepConfig,
    mutation: &dyn Mutation,
    step: usize,
    dir: &Path,
) -> Result<(), EngineError> {
    fs::create_dir_all(dir).map_err(EngineError::io(dir))?;

    for environment in Environment::ALL {
        let tlc = structure.tlc.clone();
        let topology = structure.topology_mut(environment);
        mutation.mutate(topology, &tlc, step)?;
        write_topology::<PsfFile>(topology, &dir.join(layout::topology_file_name(environment, "psf")))?;
        write_topology::<PdbFile>(topology, &dir.join(layout::topology_file_name(environment, "pdb")))?;
    }

    // Both environments carry the same ligand, so one of them defines the dummy parameters.
    let view = structure.waterbox.view(&structure.tlc);
    write_file(&dir.join(RTF_FILE_NAME), |w| dummy_params::write_rtf(&view, w))?;
    write_file(&dir.join(PRM_FILE_NAME), |w| dummy_params::write_prm(&view, w))?;
    write_file(&dir.join(STREAM_FILE_NAME), |w| {
        toppar::write_stream(&structure.tlc, w)
    })?;

    copy_base_files(structure, files, config, dir)
}

fn write_topology<F: TopologyFile>(system: &MolecularSystem, path: &Path) -> Result<(), EngineError> {
    F::write_to_path(system, path).map_err(|source| EngineError::TopologyWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> Result<(), EngineError> {
    let file = File::create(path).map_err(EngineError::io(path))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).map_err(EngineError::io(path))?;
    writer.flush().map_err(EngineError::io(path))
}

fn copy_file(source: &Path, target: &Path) -> Result<(), EngineError> {
    fs::copy(source, target).map_err(EngineError::io(source))?;
    Ok(())
}

fn copy_tree(source: &Path, target: &Path) -> Result<(), EngineError> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(source).to_path_buf();
            EngineError::Io {
                path,
                source: err.into(),
            }
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .unwrap_or_else(|_| entry.path());
        let destination = target.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination).map_err(EngineError::io(&destination))?;
        } else {
            copy_file(entry.path(), &destination)?;
        }
    }
    Ok(())
}

fn copy_base_files(
    structure: &SystemStructure,
    files: &StructureConfig,
    config: &FepConfig,
    dir: &Path,
) -> Result<(), EngineError> {
    let base = BaseSetup::new(&structure.base_dir);

    for environment in [Environment::Waterbox, Environment::Complex] {
        let env_files = files.files(environment);
        copy_file(
            &base.crd_file(environment, env_files),
            &dir.join(layout::topology_file_name(environment, "crd")),
        )?;
        copy_file(
            &base.rst_file(environment, env_files),
            &dir.join(layout::topology_file_name(environment, "rst")),
        )?;
    }

    let ligand_dir = base.ligand_dir(&structure.tlc);
    for name in [
        toppar::ligand_rtf_name(&structure.tlc),
        toppar::ligand_prm_name(&structure.tlc),
    ] {
        copy_file(&ligand_dir.join(&name), &dir.join(&name))?;
    }

    for script in HELPER_SCRIPTS {
        copy_file(&base.script(script), &dir.join(script))?;
    }

    for environment in [Environment::Waterbox, Environment::Complex] {
        let env_files = files.files(environment);
        let source = base.simulation_parameter(environment, env_files);
        let target = dir.join(format!("{}.inp", env_files.intermediate_filename));
        let reader = BufReader::new(File::open(&source).map_err(EngineError::io(&source))?);
        let mut writer = BufWriter::new(File::create(&target).map_err(EngineError::io(&target))?);
        template::rewrite_simulation_parameters(reader, &mut writer, config.simulation.nsteps)
            .map_err(|source_err| EngineError::Template {
                path: source.clone(),
                source: source_err,
            })?;
        writer.flush().map_err(EngineError::io(&target))?;
    }

    let run_script = dir.join(RUN_SCRIPT);
    copy_file(&base.script(RUN_SCRIPT), &run_script)?;
    let mut script = OpenOptions::new()
        .append(true)
        .open(&run_script)
        .map_err(EngineError::io(&run_script))?;
    script
        .write_all(SERIALIZER_BOILERPLATE.as_bytes())
        .map_err(EngineError::io(&run_script))?;

    copy_tree(&config.paths.toppar_dir, &dir.join(TOPPAR_DIR))?;
    copy_file(
        &config.paths.bin_dir.join(SUBMIT_SCRIPT),
        &dir.join(SUBMIT_SCRIPT),
    )
}
