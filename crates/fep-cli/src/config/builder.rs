use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileEnvironmentFiles, FileStructureConfig};
use super::models::AppConfig;
use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use fepladder::core::mutation::MutationSpec;
use fepladder::engine::config::{ConfigError, EnvironmentFiles, FepConfigBuilder, StructureConfig};
use fepladder::engine::sequencer::Strategy;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub fn build_config(args: &ConfigArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();
    let file_config = FileConfig::from_file(&args.config)?;
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let simulation = file_config.simulation.take().unwrap_or_default();
    let nsteps = args.nsteps.or(simulation.nsteps);
    let nstdcd = args.nstdcd.or(simulation.nstdcd);
    let free_energy_type = file_config
        .free_energy_type
        .take()
        .unwrap_or_else(|| defaults.free_energy_type.clone());
    let strategy: Strategy = file_config
        .strategy
        .as_deref()
        .unwrap_or(&defaults.strategy)
        .parse()
        .map_err(|e: ConfigError| CliError::Config(e.to_string()))?;

    if file_config.structures.len() != 2 {
        return Err(CliError::Config(format!(
            "Expected exactly two [[structures]] entries, found {}",
            file_config.structures.len()
        )));
    }
    let mut mutations = BTreeMap::new();
    let mut structures = Vec::with_capacity(2);
    for structure in file_config.structures {
        let (config, specs) = merge_structure(structure, &defaults);
        mutations.insert(config.name.clone(), specs);
        structures.push(config);
    }
    let mut structures = structures.into_iter();

    let paths = file_config.paths.take().unwrap_or_default();
    let mut builder = FepConfigBuilder::new().free_energy_type(free_energy_type);
    if let Some(nsteps) = nsteps {
        builder = builder.nsteps(nsteps);
    }
    if let Some(nstdcd) = nstdcd {
        builder = builder.nstdcd(nstdcd);
    }
    if let (Some(first), Some(second)) = (structures.next(), structures.next()) {
        builder = builder.structure1(first).structure2(second);
    }
    if let Some(path) = paths.analysis_dir_base {
        builder = builder.analysis_dir_base(path);
    }
    if let Some(path) = paths.data_dir_base {
        builder = builder.data_dir_base(path);
    }
    if let Some(path) = paths.bin_dir {
        builder = builder.bin_dir(path);
    }
    if let Some(path) = paths.toppar_dir {
        builder = builder.toppar_dir(path);
    }

    let core_config = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        core_config,
        strategy,
        mutations,
    })
}

fn merge_structure(
    structure: FileStructureConfig,
    defaults: &DefaultsConfig,
) -> (StructureConfig, Vec<MutationSpec>) {
    let config = StructureConfig {
        waterbox: merge_environment(structure.waterbox, "waterbox", defaults),
        complex: merge_environment(structure.complex, "complex", defaults),
        name: structure.name,
        tlc: structure.tlc,
    };
    (config, structure.mutations)
}

fn merge_environment(
    files: Option<FileEnvironmentFiles>,
    environment: &str,
    defaults: &DefaultsConfig,
) -> EnvironmentFiles {
    let files = files.unwrap_or_default();
    EnvironmentFiles {
        intermediate_filename: files
            .intermediate_filename
            .unwrap_or_else(|| defaults.intermediate_filename(environment)),
        crd_file_name: files
            .crd_file_name
            .unwrap_or_else(|| defaults.crd_file_name.clone()),
        rst_file_name: files
            .rst_file_name
            .unwrap_or_else(|| defaults.rst_file_name.clone()),
        simulation_parameter: files
            .simulation_parameter
            .unwrap_or_else(|| defaults.simulation_parameter.clone()),
    }
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let invalid_integer =
            |_| CliError::Config(format!("Invalid integer value for {}: {}", key, value_str));

        match key {
            "simulation.nsteps" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .nsteps = Some(value_str.parse().map_err(invalid_integer)?);
            }
            "simulation.nstdcd" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .nstdcd = Some(value_str.parse().map_err(invalid_integer)?);
            }
            "free-energy-type" => config.free_energy_type = Some(value_str.to_string()),
            "strategy" => config.strategy = Some(value_str.to_string()),
            "paths.analysis-dir-base" => {
                config.paths.get_or_insert_with(Default::default).analysis_dir_base =
                    Some(PathBuf::from(value_str));
            }
            "paths.data-dir-base" => {
                config.paths.get_or_insert_with(Default::default).data_dir_base =
                    Some(PathBuf::from(value_str));
            }
            "paths.bin-dir" => {
                config.paths.get_or_insert_with(Default::default).bin_dir =
                    Some(PathBuf::from(value_str));
            }
            "paths.toppar-dir" => {
                config.paths.get_or_insert_with(Default::default).toppar_dir =
                    Some(PathBuf::from(value_str));
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
