//! Run configuration for the CLI: a TOML file merged with command-line overrides and
//! built-in defaults, in that order of decreasing precedence.

pub mod builder;
pub mod defaults;
pub mod file;
pub mod models;

pub use builder::build_config;
pub use models::AppConfig;
