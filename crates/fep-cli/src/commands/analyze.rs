use crate::cli::AnalyzeArgs;
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::utils::export::write_matrix_csv;
use crate::utils::progress::CliProgressHandler;
use fepladder::core::models::environment::Environment;
use fepladder::engine::error::EngineError;
use fepladder::engine::estimator::ExponentialAveraging;
use fepladder::engine::progress::ProgressReporter;
use fepladder::engine::simulation::{AVOGADRO_PER_MOL, BOLTZMANN_J_PER_K, TEMPERATURE_K};
use fepladder::workflows::analyze::FreeEnergyCalculator;
use std::fs;
use std::path::Path;
use tracing::info;

const J_PER_KCAL: f64 = 4184.0;

/// kT at the evaluation temperature, in kcal/mol.
fn kt_kcal_mol() -> f64 {
    BOLTZMANN_J_PER_K * TEMPERATURE_K * AVOGADRO_PER_MOL / J_PER_KCAL
}

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let app = build_config(&args.config)?;
    if app.core_config.structure(&args.structure).is_none() {
        return Err(EngineError::StructureNotFound {
            name: args.structure.clone(),
        }
        .into());
    }
    let nr_of_states = match args.states {
        Some(n) => n,
        None => app.plan_for(&args.structure)?.len(),
    };
    if nr_of_states == 0 {
        return Err(CliError::Argument(format!(
            "No intermediate states for '{}'. Configure mutations or pass --states.",
            args.structure
        )));
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!(structure = %args.structure, states = nr_of_states, "Invoking the free-energy analysis.");
    let calculator = FreeEnergyCalculator::with_reporter(
        &app.core_config,
        nr_of_states,
        &args.structure,
        &ExponentialAveraging,
        &reporter,
    )?;

    let kt = kt_kcal_mol();
    let last = nr_of_states - 1;
    println!(
        "\nFree-energy differences for '{}' ({} states):",
        args.structure, nr_of_states
    );
    for environment in Environment::ALL {
        let delta_f = calculator.free_energy_differences(environment)[(0, last)];
        let d_delta_f = calculator.uncertainties(environment)[(0, last)];
        println!(
            "  {:<9} ΔF = {:>10.4} ± {:.4} kT  ({:>10.4} ± {:.4} kcal/mol)",
            environment.as_str(),
            delta_f,
            d_delta_f,
            delta_f * kt,
            d_delta_f * kt
        );
    }
    let (dg, ddg) = calculator.end_state_free_energy_difference();
    println!(
        "  {:<9} ΔG = {:>10.4} ± {:.4} kT  ({:>10.4} ± {:.4} kcal/mol)",
        "total",
        dg,
        ddg,
        dg * kt,
        ddg * kt
    );

    if let Some(dir) = &args.csv_dir {
        export_matrices(dir, &args.structure, &calculator)?;
        println!("Matrices written to {}", dir.display());
    }

    Ok(())
}

fn export_matrices(dir: &Path, structure: &str, calculator: &FreeEnergyCalculator) -> Result<()> {
    fs::create_dir_all(dir)?;
    for environment in Environment::ALL {
        let prefix = format!("{}_{}", structure, environment);
        write_matrix_csv(
            &dir.join(format!("{}_delta_f.csv", prefix)),
            calculator.free_energy_differences(environment),
        )?;
        write_matrix_csv(
            &dir.join(format!("{}_d_delta_f.csv", prefix)),
            calculator.uncertainties(environment),
        )?;
        write_matrix_csv(
            &dir.join(format!("{}_overlap.csv", prefix)),
            calculator.overlap(environment),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fepladder::core::io::results::{PairEnergies, pair_result_path};
    use crate::cli::ConfigArgs;
    use fepladder::engine::estimator::ReducedPotentialMatrix;
    use tempfile::{TempDir, tempdir};

    const CONFIG: &str = r#"
        [simulation]
        nsteps = 40000
        nstdcd = 1000

        [paths]
        analysis-dir-base = "analysis"
        data-dir-base = "data"
        bin-dir = "bin"
        toppar-dir = "toppar"

        [[structures]]
        name = "toluene"
        tlc = "UNK"

        [[structures]]
        name = "methane"
        tlc = "LIG"
        "#;

    fn analyze_args(structure: &str, states: Option<usize>) -> (TempDir, AnalyzeArgs) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, CONFIG).unwrap();
        let args = AnalyzeArgs {
            config: ConfigArgs {
                config: path,
                nsteps: None,
                nstdcd: None,
                set_values: vec![],
            },
            structure: structure.to_string(),
            states,
            csv_dir: None,
        };
        (dir, args)
    }

    #[test]
    fn kt_at_300_kelvin() {
        assert!((kt_kcal_mol() - 0.5962).abs() < 1e-3);
    }

    #[test]
    fn unknown_structure_is_reported_before_planning() {
        let (_dir, args) = analyze_args("benzene", None);
        let err = run(args).unwrap_err();
        assert!(matches!(
            err,
            CliError::Core(EngineError::StructureNotFound { ref name }) if name == "benzene"
        ));
    }

    #[test]
    fn structure_without_mutations_needs_explicit_states() {
        let (_dir, args) = analyze_args("methane", None);
        let err = run(args).unwrap_err();
        assert!(matches!(err, CliError::Argument(ref msg) if msg.contains("methane")));
    }

    #[test]
    fn exports_three_matrices_per_environment() {
        let dir = tempdir().unwrap();
        let mut matrix = ReducedPotentialMatrix::new(2);
        for i in 1..=2 {
            for j in 1..=2 {
                matrix.insert(i, j, vec![i as f64; 3]);
            }
        }
        let calculator =
            FreeEnergyCalculator::from_matrices(&matrix, &matrix, &ExponentialAveraging).unwrap();
        export_matrices(dir.path(), "toluene", &calculator).unwrap();

        for env in ["waterbox", "complex"] {
            for kind in ["delta_f", "d_delta_f", "overlap"] {
                assert!(dir.path().join(format!("toluene_{env}_{kind}.csv")).is_file());
            }
        }
        let delta_f = fs::read_to_string(dir.path().join("toluene_complex_delta_f.csv")).unwrap();
        assert!(delta_f.starts_with("state,1,2\n1,0,"));
    }

    #[test]
    fn result_files_round_trip_through_the_analysis() {
        let root = tempdir().unwrap();
        let results = root.path().join("results");
        for i in 1..=3 {
            for j in 1..=3 {
                PairEnergies {
                    waterbox: vec![0.5 * i as f64; 4],
                    complex: vec![i as f64; 4],
                }
                .write_to_path(&pair_result_path(&results, "toluene", i, j))
                .unwrap();
            }
        }
        let mut waterbox = ReducedPotentialMatrix::new(3);
        let mut complex = ReducedPotentialMatrix::new(3);
        for i in 1..=3 {
            for j in 1..=3 {
                let e = PairEnergies::read_from_path(&pair_result_path(&results, "toluene", i, j))
                    .unwrap();
                waterbox.insert(i, j, e.waterbox);
                complex.insert(i, j, e.complex);
            }
        }
        let calculator =
            FreeEnergyCalculator::from_matrices(&waterbox, &complex, &ExponentialAveraging).unwrap();
        let (dg, _) = calculator.end_state_free_energy_difference();
        assert!((dg - 1.0).abs() < 1e-9);
    }
}
