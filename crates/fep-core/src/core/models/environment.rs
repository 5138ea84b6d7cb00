use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The two environments every structure is simulated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Environment {
    /// The ligand solvated in a box of water.
    Waterbox,
    /// The ligand bound to its host.
    Complex,
}

impl Environment {
    /// Both environments in the order the builder processes them.
    pub const ALL: [Environment; 2] = [Environment::Complex, Environment::Waterbox];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waterbox => "waterbox",
            Self::Complex => "complex",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown environment '{0}'. Expected 'waterbox' or 'complex'.")]
pub struct ParseEnvironmentError(pub String);

impl FromStr for Environment {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waterbox" => Ok(Self::Waterbox),
            "complex" => Ok(Self::Complex),
            other => Err(ParseEnvironmentError(other.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
