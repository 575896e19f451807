use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Key-value store backend types
///
/// Defined in core because configuration selects the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KvBackend {
    Memory,
    Local,
}

impl FromStr for KvBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(KvBackend::Memory),
            "local" => Ok(KvBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid key-value backend: {}", s)),
        }
    }
}

impl Display for KvBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            KvBackend::Memory => write!(f, "memory"),
            KvBackend::Local => write!(f, "local"),
        }
    }
}
