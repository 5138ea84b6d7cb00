/// Values used when neither the command line nor the config file sets them.
///
/// Sampling lengths (`nsteps`, `nstdcd`) have no default and must be configured.
pub struct DefaultsConfig {
    pub free_energy_type: String,
    pub strategy: String,
    pub crd_file_name: String,
    pub rst_file_name: String,
    pub simulation_parameter: String,
}

impl DefaultsConfig {
    /// `lig_in_<environment>`, the stem every state file of an environment shares.
    pub fn intermediate_filename(&self, environment: &str) -> String {
        format!("lig_in_{}", environment)
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            free_energy_type: "rsfe".to_string(),
            strategy: "separate".to_string(),
            crd_file_name: "step3_input".to_string(),
            rst_file_name: "step4_equilibration".to_string(),
            simulation_parameter: "step5_production.inp".to_string(),
        }
    }
}
