use std::collections::BTreeMap;
use std::path::PathBuf;

/// Connection settings used for both the API client and kubectl invocations.
#[derive(Debug, Clone)]
pub struct KubectlOptions {
    pub context: Option<String>,
    pub config_path: Option<PathBuf>,
    pub namespace: String,
    pub env: BTreeMap<String, String>,
}

impl Default for KubectlOptions {
    fn default() -> Self {
        Self {
            context: None,
            config_path: None,
            namespace: "default".to_string(),
            env: BTreeMap::new(),
        }
    }
}

impl KubectlOptions {
    /// Global flags placed in front of every kubectl subcommand.
    pub fn global_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(ctx) = &self.context {
            args.push("--context".to_string());
            args.push(ctx.clone());
        }
        if let Some(path) = &self.config_path {
            args.push("--kubeconfig".to_string());
            args.push(path.display().to_string());
        }
        args.push("--namespace".to_string());
        args.push(self.namespace.clone());
        args
    }
}

/// Outcome of the test the dump belongs to.
#[derive(Debug, Clone)]
pub struct TestRun {
    pub name: String,
    pub failed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodRef {
    pub name: String,
    pub namespace: String,
}

/// Files written for a single pod.
#[derive(Debug, Clone)]
pub struct DebugArtifact {
    pub pod: PodRef,
    pub log_path: PathBuf,
    pub description_path: PathBuf,
    pub logs_ok: bool,
    pub description_ok: bool,
}
