//! Identification of the shipped storage backends.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies the type of database backend.
///
/// Used by [`StorageConfig`](crate::config::StorageConfig) to select the
/// backend to connect.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process storage, lost on exit.
    #[default]
    Memory,
    /// MongoDB (document store). Requires the `mongodb` feature.
    #[value(name = "mongodb")]
    MongoDB,
}

impl BackendKind {
    /// Name used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::MongoDB => "mongodb",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "mongodb" | "mongo" => Ok(BackendKind::MongoDB),
            _ => Err(format!("unknown storage backend: {}", s)),
        }
    }
}
