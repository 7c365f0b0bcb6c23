use crate::dependency::DependencyEntry;
use crate::error::{Result, TriggerError};
use crate::paths;
use crate::reconcile::TriggerEnvs;
use crate::selection::{DesiredState, SelectionSet};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What the last successful reconciliation left behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerState {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Serialized selection: kind -> template id or list of ids.
    #[serde(default)]
    pub triggers: String,
    /// Kind -> generated resource name.
    #[serde(default)]
    pub resources: IndexMap<String, String>,
    /// Kind -> environment values handed to that kind's function.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub trigger_envs: TriggerEnvs,
    #[serde(default)]
    pub depends_on: Vec<DependencyEntry>,
    pub last_updated: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

impl Default for TriggerState {
    fn default() -> Self {
        Self {
            version: default_version(),
            triggers: String::new(),
            resources: IndexMap::new(),
            trigger_envs: TriggerEnvs::new(),
            depends_on: Vec::new(),
            last_updated: Utc::now(),
        }
    }
}

impl TriggerState {
    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::state_path(root);
        if !path.exists() {
            return Err(TriggerError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let state: TriggerState = serde_yaml::from_str(&data)?;
        Ok(state)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::state_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // ---------------------------------------------------------------------------
    // Accessors / mutations
    // ---------------------------------------------------------------------------

    /// The persisted selection, if any was recorded.
    pub fn previous(&self) -> Result<Option<SelectionSet>> {
        SelectionSet::parse_previous(Some(&self.triggers))
    }

    pub fn record(
        &mut self,
        desired: &DesiredState,
        resources: IndexMap<String, String>,
        trigger_envs: TriggerEnvs,
        depends_on: Vec<DependencyEntry>,
    ) -> Result<()> {
        self.triggers = if desired.is_empty() {
            String::new()
        } else {
            desired.to_json_string()?
        };
        self.resources = resources;
        self.trigger_envs = trigger_envs;
        self.depends_on = depends_on;
        self.last_updated = Utc::now();
        Ok(())
    }
}
