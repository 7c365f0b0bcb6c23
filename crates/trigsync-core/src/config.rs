use crate::error::{Result, TriggerError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ProvisionerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionerConfig {
    /// Executable implementing the provisioning protocol; a bare name is
    /// looked up on `PATH`, a relative path is resolved against the root.
    #[serde(default = "default_provisioner_command")]
    pub command: String,
    #[serde(default = "default_provider_tag")]
    pub provider: String,
    #[serde(default = "default_service")]
    pub service: String,
}

fn default_provisioner_command() -> String {
    "trigsync-provision".to_string()
}

fn default_provider_tag() -> String {
    "awscloudformation".to_string()
}

fn default_service() -> String {
    "Lambda".to_string()
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            command: default_provisioner_command(),
            provider: default_provider_tag(),
            service: default_service(),
        }
    }
}

impl ProvisionerConfig {
    /// The command as handed to `which`: relative paths are anchored at `root`.
    pub fn resolved_command(&self, root: &Path) -> String {
        if self.command.contains(std::path::MAIN_SEPARATOR) && Path::new(&self.command).is_relative()
        {
            root.join(&self.command).to_string_lossy().into_owned()
        } else {
            self.command.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: ProjectConfig,
    /// Resource whose triggers are managed, e.g. `cognito`. Names the
    /// top-level catalog document.
    #[serde(default = "default_resource")]
    pub resource: String,
    /// Category of the dependent resource, e.g. `auth`.
    #[serde(default = "default_category")]
    pub category: String,
    /// Provider tag stamped on dependency entries this tool owns.
    #[serde(default = "default_trigger_provider")]
    pub trigger_provider: String,
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: PathBuf,
    /// Boilerplate copied for the `custom` pseudo-template.
    #[serde(default = "default_custom_template")]
    pub custom_template: PathBuf,
    #[serde(default = "default_module_extension")]
    pub module_extension: String,
    /// Generated resources are named `<prefix><TriggerKind>`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_name_prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_stack: Option<String>,
    #[serde(default = "default_target_dir")]
    pub target_dir: PathBuf,
    /// Offer to open each freshly copied module.
    #[serde(default = "default_edit_prompt")]
    pub edit_prompt: bool,
    #[serde(default)]
    pub provisioner: ProvisionerConfig,
}

fn default_version() -> u32 {
    1
}

fn default_resource() -> String {
    "cognito".to_string()
}

fn default_category() -> String {
    "auth".to_string()
}

fn default_trigger_provider() -> String {
    "Cognito".to_string()
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from("triggers")
}

fn default_custom_template() -> PathBuf {
    PathBuf::from("triggers/trigger-custom.js")
}

fn default_module_extension() -> String {
    "js".to_string()
}

fn default_target_dir() -> PathBuf {
    PathBuf::from("amplify/backend")
}

fn default_edit_prompt() -> bool {
    true
}

impl Config {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            version: default_version(),
            project: ProjectConfig {
                name: project_name.into(),
            },
            resource: default_resource(),
            category: default_category(),
            trigger_provider: default_trigger_provider(),
            catalog_dir: default_catalog_dir(),
            custom_template: default_custom_template(),
            module_extension: default_module_extension(),
            resource_name_prefix: String::new(),
            parent_stack: None,
            target_dir: default_target_dir(),
            edit_prompt: default_edit_prompt(),
            provisioner: ProvisionerConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(TriggerError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Resource name prefix, defaulting to the project name.
    pub fn effective_prefix(&self) -> &str {
        if self.resource_name_prefix.is_empty() {
            &self.project.name
        } else {
            &self.resource_name_prefix
        }
    }

    pub fn catalog_root(&self, root: &Path) -> PathBuf {
        root.join(&self.catalog_dir)
    }

    pub fn custom_template_path(&self, root: &Path) -> PathBuf {
        root.join(&self.custom_template)
    }

    pub fn target_root(&self, root: &Path) -> PathBuf {
        root.join(&self.target_dir)
    }

    /// Check the config against the project on disk.
    pub fn validate(&self, root: &Path) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut push = |level: WarnLevel, message: String| {
            warnings.push(ConfigWarning { level, message });
        };

        let catalog_root = self.catalog_root(root);
        let map = paths::catalog_map_path(&catalog_root, &self.resource);
        if !map.is_file() {
            push(
                WarnLevel::Error,
                format!("trigger catalog '{}' does not exist", map.display()),
            );
        }

        if !self.custom_template_path(root).is_file() {
            push(
                WarnLevel::Warning,
                format!(
                    "custom template '{}' does not exist; the 'custom' module cannot be generated",
                    self.custom_template.display()
                ),
            );
        }

        if self.module_extension.is_empty() || self.module_extension.starts_with('.') {
            push(
                WarnLevel::Error,
                format!(
                    "module_extension '{}' must be a bare extension such as 'js'",
                    self.module_extension
                ),
            );
        }

        if self.effective_prefix().is_empty() {
            push(
                WarnLevel::Error,
                "resource name prefix is empty and project name is blank".to_string(),
            );
        }

        if which::which(self.provisioner.resolved_command(root)).is_err() {
            push(
                WarnLevel::Warning,
                format!(
                    "provisioner '{}' is not installed; configure and apply will fail",
                    self.provisioner.command
                ),
            );
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
