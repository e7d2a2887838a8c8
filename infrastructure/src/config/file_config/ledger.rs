//! Usage ledger configuration from TOML (`[ledger]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw ledger configuration from TOML
///
/// # Example
///
/// ```toml
/// [ledger]
/// path = "~/.local/share/ctxprobe/usage.jsonl"
/// ```
///
/// Without a path, calls are recorded in memory for the duration of the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLedgerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl FileLedgerConfig {
    /// The ledger path with a leading `~/` expanded to the home directory.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        let path = self.path.as_ref()?;
        match path.strip_prefix("~") {
            Ok(rest) => dirs::home_dir().map(|home| home.join(rest)),
            Err(_) => Some(path.clone()),
        }
    }
}
