use fepladder::core::mutation::{Mutation, MutationSpec};
use fepladder::engine::config::FepConfig;
use fepladder::engine::error::EngineError;
use fepladder::engine::sequencer::{MutationPlan, Strategy};
use std::collections::BTreeMap;

pub struct AppConfig {
    pub core_config: FepConfig,
    pub strategy: Strategy,
    /// Mutation lists keyed by structure name.
    pub mutations: BTreeMap<String, Vec<MutationSpec>>,
}

impl AppConfig {
    pub fn mutations_for(&self, structure: &str) -> Result<Vec<Box<dyn Mutation>>, EngineError> {
        self.mutations
            .get(structure)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .cloned()
            .map(|spec| spec.into_mutation().map_err(EngineError::from))
            .collect()
    }

    pub fn plan_for(&self, structure: &str) -> Result<MutationPlan, EngineError> {
        Ok(MutationPlan::new(&self.mutations_for(structure)?, self.strategy))
    }

    /// Names of the selected structures, or both configured structures if none is selected.
    pub fn select_structures(&self, selected: Option<&str>) -> Result<Vec<String>, EngineError> {
        match selected {
            Some(name) => self
                .core_config
                .structure(name)
                .map(|s| vec![s.name.clone()])
                .ok_or_else(|| EngineError::StructureNotFound {
                    name: name.to_string(),
                }),
            None => Ok(self
                .core_config
                .structures
                .iter()
                .map(|s| s.name.clone())
                .collect()),
        }
    }
}
