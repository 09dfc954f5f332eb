// config.rs — Gate configuration.
//
// GateConfig says where the policy set and entity graph live, which
// principal the gate speaks for, and where callers keep the audit log.
// `for_project()` produces the default `.ag/` layout; `.ag/gate.toml`
// overrides any field:
//
//   policy_path = "policies/agent_policy.cedar"
//   entities_path = "policies/agent_entities.json"
//   principal = 'Agent::"osworld-agent"'
//   evaluation_timeout_ms = 250
//   evaluation_workers = 8
//
// Relative paths resolve against the project root. Missing fields fall back
// to the defaults via `#[serde(default = ...)]`, so a gate.toml only needs
// the fields it changes.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ag_policy::{default_principal, EntityRef};
use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// Directory holding gate state inside a project.
pub const GATE_DIR: &str = ".ag";

/// Default cap on concurrent deadline-bounded evaluation workers.
pub const DEFAULT_EVALUATION_WORKERS: usize = 8;

/// Configuration for an enforcement gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Policy text file.
    #[serde(default = "default_policy_path")]
    pub policy_path: PathBuf,

    /// Entity JSON file.
    #[serde(default = "default_entities_path")]
    pub entities_path: PathBuf,

    /// The fixed identity every request is made for.
    #[serde(default = "default_principal")]
    pub principal: EntityRef,

    /// Optional evaluation deadline in milliseconds.
    #[serde(default)]
    pub evaluation_timeout_ms: Option<u64>,

    /// Maximum deadline-bounded evaluations in flight at once, counting
    /// workers that outlived their deadline and are still running.
    #[serde(default = "default_evaluation_workers")]
    pub evaluation_workers: usize,

    /// Append-only audit log written by callers.
    #[serde(default = "default_audit_log")]
    pub audit_log: PathBuf,
}

fn default_policy_path() -> PathBuf {
    Path::new(GATE_DIR).join("policy.cedar")
}

fn default_entities_path() -> PathBuf {
    Path::new(GATE_DIR).join("entities.json")
}

fn default_evaluation_workers() -> usize {
    DEFAULT_EVALUATION_WORKERS
}

fn default_audit_log() -> PathBuf {
    Path::new(GATE_DIR).join("audit.jsonl")
}

impl GateConfig {
    /// Config with explicit policy and entity paths and defaults elsewhere.
    pub fn new(policy_path: impl Into<PathBuf>, entities_path: impl Into<PathBuf>) -> Self {
        Self {
            policy_path: policy_path.into(),
            entities_path: entities_path.into(),
            principal: default_principal(),
            evaluation_timeout_ms: None,
            evaluation_workers: DEFAULT_EVALUATION_WORKERS,
            audit_log: default_audit_log(),
        }
    }

    /// The standard `.ag/` layout for a project.
    pub fn for_project(project_root: impl AsRef<Path>) -> Self {
        Self::new(default_policy_path(), default_entities_path()).resolve(project_root.as_ref())
    }

    /// Load a TOML config file; relative paths resolve against `project_root`.
    pub fn load(path: impl AsRef<Path>, project_root: impl AsRef<Path>) -> Result<Self, GateError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| GateError::config_load(path, e))?;
        let config: GateConfig =
            toml::from_str(&content).map_err(|e| GateError::config_load(path, e))?;
        Ok(config.resolve(project_root.as_ref()))
    }

    /// Load `<root>/.ag/gate.toml` if present, otherwise the default layout.
    ///
    /// A config file that exists but fails to parse is an error, not a
    /// silent fallback.
    pub fn load_or_default(project_root: impl AsRef<Path>) -> Result<Self, GateError> {
        let root = project_root.as_ref();
        let path = Self::config_path(root);
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading gate config");
            Self::load(&path, root)
        } else {
            Ok(Self::for_project(root))
        }
    }

    /// Location of the config file for a project.
    pub fn config_path(project_root: impl AsRef<Path>) -> PathBuf {
        project_root.as_ref().join(GATE_DIR).join("gate.toml")
    }

    pub fn evaluation_timeout(&self) -> Option<Duration> {
        self.evaluation_timeout_ms.map(Duration::from_millis)
    }

    fn resolve(mut self, root: &Path) -> Self {
        for path in [
            &mut self.policy_path,
            &mut self.entities_path,
            &mut self.audit_log,
        ] {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
        self
    }
}
