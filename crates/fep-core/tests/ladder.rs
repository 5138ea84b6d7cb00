use fepladder::core::io::toppar;
use fepladder::core::models::atom::{Atom, LennardJones};
use fepladder::core::models::environment::Environment;
use fepladder::core::models::system::MolecularSystem;
use fepladder::core::models::topology::{AngleParams, BondParams};
use fepladder::core::mutation::{Mutation, MutationSpec};
use fepladder::engine::config::{EnvironmentFiles, FepConfig, FepConfigBuilder, StructureConfig};
use fepladder::engine::estimator::ExponentialAveraging;
use fepladder::engine::layout::{self, BaseSetup, HELPER_SCRIPTS, RUN_SCRIPT, SUBMIT_SCRIPT};
use fepladder::engine::progress::ProgressReporter;
use fepladder::engine::sequencer::Strategy;
use fepladder::engine::simulation::{
    EnergyContext, ExternalError, Frame, PotentialFiles, SimulationEngine, Trajectory,
    TrajectoryReader,
};
use fepladder::workflows::analyze::FreeEnergyCalculator;
use fepladder::workflows::build::{
    DirectoryPolicy, IntermediateStateFactory, OutputDirectory, SystemStructure,
};
use fepladder::workflows::evaluate::evaluate_all_pairs;
use nalgebra::Point3;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn structure(name: &str, tlc: &str) -> StructureConfig {
    let files = |env: &str| EnvironmentFiles {
        intermediate_filename: format!("lig_in_{}", env),
        crd_file_name: "step3_input".into(),
        rst_file_name: "step4_equilibration".into(),
        simulation_parameter: "step5_production.inp".into(),
    };
    StructureConfig {
        name: name.into(),
        tlc: tlc.into(),
        waterbox: files("waterbox"),
        complex: files("complex"),
    }
}

fn config(root: &Path) -> FepConfig {
    FepConfigBuilder::new()
        .structure1(structure("ethanol", "ETH"))
        .structure2(structure("methane", "LIG"))
        .nsteps(2000)
        .nstdcd(100)
        .free_energy_type("rsfe")
        .analysis_dir_base(root.join("analysis"))
        .data_dir_base(root.join("data"))
        .bin_dir(root.join("bin"))
        .toppar_dir(root.join("toppar"))
        .build()
        .unwrap()
}

fn write_base_setup(config: &FepConfig, structure: &StructureConfig) {
    let base_dir = config.base_setup_dir(structure);
    let base = BaseSetup::new(&base_dir);
    for environment in Environment::ALL {
        let files = structure.files(environment);
        fs::create_dir_all(base.openmm_dir(environment)).unwrap();
        fs::write(base.crd_file(environment, files), "* coordinates\n").unwrap();
        fs::write(base.rst_file(environment, files), "<State/>\n").unwrap();
        fs::write(
            base.simulation_parameter(environment, files),
            "nstep = 10 # steps\ntemp = 300.0 # K\n",
        )
        .unwrap();
    }
    for script in HELPER_SCRIPTS.iter().chain([&RUN_SCRIPT]) {
        fs::write(base.script(script), "import sys\n").unwrap();
    }
    let ligand = base.ligand_dir(&structure.tlc);
    fs::create_dir_all(&ligand).unwrap();
    fs::write(ligand.join(toppar::ligand_rtf_name(&structure.tlc)), "").unwrap();
    fs::write(ligand.join(toppar::ligand_prm_name(&structure.tlc)), "").unwrap();
    fs::create_dir_all(&config.paths.toppar_dir).unwrap();
    fs::write(config.paths.toppar_dir.join("top_all36_cgenff.rtf"), "").unwrap();
    fs::create_dir_all(&config.paths.bin_dir).unwrap();
    fs::write(config.paths.bin_dir.join(SUBMIT_SCRIPT), "").unwrap();
}

/// `ETH` with a hydroxyl group (`O1`, `HO1`) that is decoupled, in a one-water box.
fn ethanol() -> MolecularSystem {
    let mut system = MolecularSystem::new();
    let lig = system.add_residue("HETA", 1, "ETH");
    let mut add = |name: &str, ty: &str, q: f64, mass: f64| {
        system
            .add_atom_to_residue(
                lig,
                Atom::new(name, ty, lig, Point3::new(0.1, 0.2, 0.3))
                    .with_charge(q)
                    .with_mass(mass)
                    .with_lj(LennardJones::new(-0.05, 1.5)),
            )
            .unwrap()
    };
    let c1 = add("C1", "CG321", 0.05, 12.011);
    let o1 = add("O1", "OG311", -0.65, 15.999);
    let ho1 = add("HO1", "HGP1", 0.42, 1.008);
    let wat = system.add_residue("SOLV", 1, "TIP3");
    system
        .add_atom_to_residue(wat, Atom::new("OH2", "OT", wat, Point3::origin()))
        .unwrap();
    system.add_bond([c1, o1], BondParams { k: 428.0, req: 1.42 }).unwrap();
    system.add_bond([o1, ho1], BondParams { k: 545.0, req: 0.96 }).unwrap();
    system
        .add_angle([c1, o1, ho1], AngleParams { k: 50.0, theteq: 106.0 })
        .unwrap();
    system.set_box_length(Some(30.0));
    system
}

fn mutations() -> Vec<Box<dyn Mutation>> {
    let hydroxyl = || vec!["O1".to_string(), "HO1".to_string()];
    [
        MutationSpec::Charge { atoms: hydroxyl(), steps: 3 },
        MutationSpec::Steric { atoms: hydroxyl(), steps: 3 },
        MutationSpec::Bonded { atoms: vec!["HO1".into()], steps: 2 },
    ]
    .into_iter()
    .map(|spec| spec.into_mutation().unwrap())
    .collect()
}

/// Potential energy grows by 1 kJ/mol per state index.
struct LadderEngine;

struct LadderContext {
    offset: f64,
}

impl SimulationEngine for LadderEngine {
    type Context = LadderContext;

    fn load(&self, files: &PotentialFiles) -> Result<LadderContext, ExternalError> {
        if !files.topology.is_file() {
            return Err(format!("missing {}", files.topology.display()).into());
        }
        let state: f64 = files
            .system_xml
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix("intst"))
            .and_then(|n| n.parse().ok())
            .ok_or("state index not found")?;
        Ok(LadderContext { offset: state })
    }
}

impl EnergyContext for LadderContext {
    fn set_periodic_box(&mut self, _edge_nm: f64) -> Result<(), ExternalError> {
        Ok(())
    }

    fn set_positions(&mut self, _positions: &[Point3<f64>]) -> Result<(), ExternalError> {
        Ok(())
    }

    fn potential_energy(&mut self) -> Result<f64, ExternalError> {
        Ok(self.offset)
    }
}

struct FixedTrajectory;

impl TrajectoryReader for FixedTrajectory {
    fn read(&self, _trajectory: &Path, topology: &Path) -> Result<Trajectory, ExternalError> {
        if !topology.is_file() {
            return Err("topology missing".into());
        }
        Ok(Trajectory {
            frames: vec![
                Frame {
                    positions: vec![Point3::origin(); 4],
                    cell_length_nm: 3.0,
                };
                20
            ],
        })
    }
}

#[test]
fn ladder_is_built_evaluated_and_analyzed() {
    let root = tempdir().unwrap();
    let config = config(root.path());
    let ethanol_config = config.structure("ethanol").unwrap();
    write_base_setup(&config, ethanol_config);

    let structure = SystemStructure::from_config(&config, ethanol_config, ethanol(), ethanol());
    let output =
        OutputDirectory::create(config.ladder_dir("ethanol"), DirectoryPolicy::RequireAbsent)
            .unwrap();
    let reporter = ProgressReporter::new();
    let mut factory =
        IntermediateStateFactory::new(structure, mutations(), &config, output, &reporter);
    let plan = factory.generate_intermediate_states(Strategy::Separate).unwrap();

    // 3 + (3 - 1) + (2 - 1)
    assert_eq!(plan.len(), 6);
    for index in 1..=plan.len() {
        let dir = layout::state_dir(&config.ladder_dir("ethanol"), index);
        for environment in Environment::ALL {
            assert!(dir.join(layout::topology_file_name(environment, "psf")).is_file());
        }
    }

    let written = evaluate_all_pairs(
        plan.len(),
        "ethanol",
        &config,
        &LadderEngine,
        &FixedTrajectory,
        &reporter,
    )
    .unwrap();
    assert_eq!(written.len(), 36);

    let calculator =
        FreeEnergyCalculator::new(&config, plan.len(), "ethanol", &ExponentialAveraging).unwrap();
    let kt_kj_mol = 1.380649e-23 * 300.0 * 6.02214076e23 / 1e3;
    for environment in Environment::ALL {
        let delta_f = calculator.free_energy_differences(environment);
        for k in 0..plan.len() {
            assert_eq!(delta_f[(k, k)], 0.0);
        }
        let expected = 5.0 / kt_kj_mol;
        assert!((delta_f[(0, 5)] - expected).abs() < 1e-9);
    }
    let (dg, ddg) = calculator.end_state_free_energy_difference();
    assert!(dg.abs() < 1e-9);
    assert!(ddg.is_finite() && ddg >= 0.0);
}

#[test]
fn existing_ladder_is_kept_when_absence_is_required() {
    let root = tempdir().unwrap();
    let config = config(root.path());
    let ladder = config.ladder_dir("methane");
    fs::create_dir_all(ladder.join("intst1")).unwrap();

    assert!(OutputDirectory::create(&ladder, DirectoryPolicy::RequireAbsent).is_err());
    assert!(ladder.join("intst1").is_dir());
}
