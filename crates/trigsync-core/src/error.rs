use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("not initialized: run 'trigsync init'")]
    NotInitialized,

    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("catalog not found: {}", .0.display())]
    CatalogNotFound(PathBuf),

    #[error("malformed catalog {}: {reason}", .path.display())]
    CatalogParse { path: PathBuf, reason: String },

    #[error("no implementations found for '{0}' in the catalog")]
    NoImplementations(String),

    #[error("invalid trigger kind '{0}': must start with a letter and contain only letters, digits, '-' or '_'")]
    InvalidKind(String),

    #[error("invalid template id '{0}': must start with a letter and contain only letters, digits, '-' or '_'")]
    InvalidTemplate(String),

    #[error("selection fragment must name exactly one trigger kind, got {0}")]
    InvalidFragment(usize),

    #[error("template source not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("provisioning capability unavailable: {0}; install it to manage trigger resources")]
    ProvisioningUnavailable(String),

    #[error("provisioning {operation} failed for '{resource}': {reason}")]
    ProvisioningFailed {
        operation: &'static str,
        resource: String,
        reason: String,
    },

    #[error("failed to delete module {}: {source}", .path.display())]
    ArtifactDeletion {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("interactive prompt unavailable: {0}")]
    PromptUnavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TriggerError>;
