//! The resource-provisioning capability.
//!
//! Creating, updating and removing the function resource behind a trigger is
//! delegated to an external backend. [`Provisioner`] is the seam; the
//! shipped implementation, [`CommandProvisioner`], drives an executable that
//! speaks a small JSON-over-stdin protocol.
//!
//! # Protocol
//! - `<command> add` / `<command> update`: reads a [`ProvisionRequest`] as JSON
//!   from stdin.
//! - `<command> remove`: no stdin. Must delete the resource and its directory.
//!
//! Every invocation sees `TRIGSYNC_PROVIDER`, `TRIGSYNC_SERVICE`,
//! `TRIGSYNC_RESOURCE_NAME` and `TRIGSYNC_TARGET_DIR` in its environment.
//! A non-zero exit status is a failure; stderr becomes the reason.

use crate::error::{Result, TriggerError};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Options for creating or updating one trigger's function resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionRequest {
    /// Trigger kind the resource serves.
    pub trigger: String,
    /// Category of the resource that depends on this trigger.
    pub category: String,
    pub modules: Vec<String>,
    pub resource_name: String,
    pub function_name: String,
    pub role_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_stack: Option<String>,
    /// Serialized per-kind environment data.
    pub trigger_envs: String,
    pub target_dir: PathBuf,
}

pub trait Provisioner {
    fn add(&mut self, provider: &str, service: &str, request: &ProvisionRequest) -> Result<()>;

    fn update(&mut self, provider: &str, service: &str, request: &ProvisionRequest) -> Result<()>;

    /// Remove the resource `name` together with `target_dir`.
    fn remove(&mut self, provider: &str, service: &str, name: &str, target_dir: &Path)
        -> Result<()>;
}

// ---------------------------------------------------------------------------
// CommandProvisioner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CommandProvisioner {
    program: PathBuf,
}

impl CommandProvisioner {
    /// Look `command` up on `PATH` (or as a path). `None` when not installed.
    pub fn detect(command: &str) -> Option<Self> {
        which::which(command).ok().map(|program| Self { program })
    }

    /// Like [`detect`](Self::detect), but absence is an error.
    pub fn locate(command: &str) -> Result<Self> {
        Self::detect(command)
            .ok_or_else(|| TriggerError::ProvisioningUnavailable(format!("'{command}' not found")))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(
        &self,
        operation: &'static str,
        provider: &str,
        service: &str,
        name: &str,
        target_dir: &Path,
        stdin_json: Option<String>,
    ) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(operation)
            .env("TRIGSYNC_PROVIDER", provider)
            .env("TRIGSYNC_SERVICE", service)
            .env("TRIGSYNC_RESOURCE_NAME", name)
            .env("TRIGSYNC_TARGET_DIR", target_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if stdin_json.is_some() {
            cmd.stdin(Stdio::piped());
        } else {
            cmd.stdin(Stdio::null());
        }

        let failed = |reason: String| TriggerError::ProvisioningFailed {
            operation,
            resource: name.to_string(),
            reason,
        };

        let mut child = cmd.spawn().map_err(|e| failed(e.to_string()))?;
        if let Some(json) = stdin_json {
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(json.as_bytes())
                    .map_err(|e| failed(format!("failed to write stdin: {e}")))?;
            }
        }
        let output = child.wait_with_output().map_err(|e| failed(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr.trim().chars().take(500).collect::<String>();
            return Err(failed(if reason.is_empty() {
                format!("exited with {}", output.status)
            } else {
                reason
            }));
        }
        tracing::debug!(operation, resource = name, "provisioner finished");
        Ok(())
    }
}

impl Provisioner for CommandProvisioner {
    fn add(&mut self, provider: &str, service: &str, request: &ProvisionRequest) -> Result<()> {
        let json = serde_json::to_string(request)?;
        self.run(
            "add",
            provider,
            service,
            &request.resource_name,
            &request.target_dir,
            Some(json),
        )
    }

    fn update(&mut self, provider: &str, service: &str, request: &ProvisionRequest) -> Result<()> {
        let json = serde_json::to_string(request)?;
        self.run(
            "update",
            provider,
            service,
            &request.resource_name,
            &request.target_dir,
            Some(json),
        )
    }

    fn remove(
        &mut self,
        provider: &str,
        service: &str,
        name: &str,
        target_dir: &Path,
    ) -> Result<()> {
        self.run("remove", provider, service, name, target_dir, None)
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_missing_command_is_none() {
        assert!(CommandProvisioner::detect("trigsync-provisioner-that-does-not-exist").is_none());
    }

    #[test]
    fn locate_missing_command_is_unavailable() {
        let err = CommandProvisioner::locate("trigsync-provisioner-that-does-not-exist")
            .unwrap_err();
        assert!(matches!(err, TriggerError::ProvisioningUnavailable(_)));
    }

    #[test]
    fn request_serializes_camel_case() {
        let request = ProvisionRequest {
            trigger: "PreSignUp".to_string(),
            category: "auth".to_string(),
            modules: vec!["recaptcha".to_string()],
            resource_name: "authPreSignUp".to_string(),
            function_name: "authPreSignUp".to_string(),
            role_name: "authPreSignUp".to_string(),
            parent_stack: None,
            trigger_envs: "[]".to_string(),
            target_dir: PathBuf::from("/tmp/function/authPreSignUp"),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["resourceName"], "authPreSignUp");
        assert_eq!(json["triggerEnvs"], "[]");
        assert!(json.get("parentStack").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn command_provisioner_reports_stderr_on_failure() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("provision.sh");
        std::fs::write(&script, "#!/bin/sh\necho \"boom: $1 $TRIGSYNC_RESOURCE_NAME\" >&2\nexit 3\n")
            .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut provisioner = CommandProvisioner::locate(script.to_str().unwrap()).unwrap();
        let err = provisioner
            .remove("awscloudformation", "Lambda", "authPreSignUp", dir.path())
            .unwrap_err();
        match err {
            TriggerError::ProvisioningFailed { operation, reason, .. } => {
                assert_eq!(operation, "remove");
                assert_eq!(reason, "boom: remove authPreSignUp");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
