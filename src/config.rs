//! Editor settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// How long a rejected-connection notice stays visible, in milliseconds.
    pub notice_ttl_ms: u64,
    /// Whether node config problems also need confirmation before save or
    /// execute, in addition to the validation report.
    pub confirm_config_issues: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            notice_ttl_ms: 3000,
            confirm_config_issues: true,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }
}
