use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::types::TimezonePolicy;

/// Microsoft Graph API root.
pub const GRAPH_ENDPOINT: &str = "https://graph.microsoft.com/v1.0";
/// Admin API used to refresh preview/live projections.
pub const ADMIN_ENDPOINT: &str = "https://admin.hlx.page";
/// Default workbook holding the publish-later job table.
pub const DEFAULT_CRONTAB_PATH: &str = "/.helix/crontab.xlsx";
/// Default table name inside the crontab workbook.
pub const DEFAULT_JOBS_TABLE: &str = "jobs";
/// Minimum gap between "now" and a schedulable timestamp, in minutes.
pub const DEFAULT_LEAD_TIME_MINUTES: i64 = 10;

/// Top-level config (sidecron.toml + SIDECRON_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidecronConfig {
    pub sharepoint: SharepointConfig,
    pub project: ProjectConfig,
    #[serde(default)]
    pub crontab: CrontabConfig,
}

/// Connection settings for the Sharepoint site backing the crontab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharepointConfig {
    /// OAuth2 authority, e.g. `https://login.microsoftonline.com/<tenant>`.
    pub authority: String,
    pub client_id: String,
    pub client_secret: String,
    /// Sharepoint hostname, e.g. `adobe.sharepoint.com`.
    pub domain: String,
    pub domain_id: String,
    pub site_id: String,
    /// Drive-relative root the workbook path is resolved against.
    #[serde(default)]
    pub root_path: String,
}

/// The project coordinates used to template admin API calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub owner: String,
    pub repo: String,
    #[serde(rename = "ref", default = "default_ref")]
    pub git_ref: String,
}

/// Crontab workbook settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrontabConfig {
    #[serde(default = "default_workbook_path")]
    pub workbook_path: String,
    #[serde(default = "default_table")]
    pub table: String,
    /// Timezone applied to crontab wall-clock times, on both read and write.
    #[serde(default)]
    pub timezone: TimezonePolicy,
    #[serde(default = "default_lead_time")]
    pub lead_time_minutes: i64,
}

impl Default for CrontabConfig {
    fn default() -> Self {
        Self {
            workbook_path: default_workbook_path(),
            table: default_table(),
            timezone: TimezonePolicy::default(),
            lead_time_minutes: default_lead_time(),
        }
    }
}

impl SidecronConfig {
    /// Load config from a TOML file with SIDECRON_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. SIDECRON_CONFIG env var
    ///   3. ~/.sidecron/sidecron.toml
    ///
    /// Env overrides use a double underscore between the section and the
    /// field, so field names may themselves contain underscores:
    /// `SIDECRON_SHAREPOINT__CLIENT_SECRET` maps to
    /// `sharepoint.client_secret`.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .or_else(|| std::env::var("SIDECRON_CONFIG").ok())
            .unwrap_or_else(default_config_path);

        let config: SidecronConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("SIDECRON_").split("__"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.sidecron/sidecron.toml", home)
}

fn default_ref() -> String {
    "main".to_string()
}

fn default_workbook_path() -> String {
    DEFAULT_CRONTAB_PATH.to_string()
}

fn default_table() -> String {
    DEFAULT_JOBS_TABLE.to_string()
}

fn default_lead_time() -> i64 {
    DEFAULT_LEAD_TIME_MINUTES
}
