use crate::types::KubectlOptions;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kubectl-debug-dump")]
#[command(about = "Dump pod logs and descriptions for a failed test run")]
pub struct Cli {
    /// Root directory for debug output
    #[arg(long, env = "KUBE_DEBUG_DIRECTORY", default_value = "debug")]
    pub debug_directory: PathBuf,

    /// Test name; becomes the first path segment under the debug directory
    #[arg(long, env = "KUBE_DEBUG_TEST_NAME")]
    pub test_name: String,

    /// Label selector (repeatable, defaults to every pod in the namespace)
    #[arg(short = 'l', long)]
    pub selector: Vec<String>,

    /// Namespace
    #[arg(short = 'n', long, default_value = "default")]
    pub namespace: String,

    /// Context
    #[arg(long)]
    pub context: Option<String>,

    /// Path to the kubeconfig file
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Extra environment variable for kubectl, as KEY=VALUE (repeatable)
    #[arg(long = "kubectl-env", value_parser = parse_key_val)]
    pub kubectl_env: Vec<(String, String)>,

    /// Treat the test as failed without running a command
    #[arg(long)]
    pub failed: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Test command to run; a non-zero exit triggers the dump
    #[arg(last = true)]
    pub command: Vec<String>,
}

impl Cli {
    pub fn kubectl_options(&self) -> KubectlOptions {
        KubectlOptions {
            context: self.context.clone(),
            config_path: self.kubeconfig.clone(),
            namespace: self.namespace.clone(),
            env: self.kubectl_env.iter().cloned().collect(),
        }
    }

    /// Selectors to dump; an empty selector matches every pod.
    pub fn selectors(&self) -> Vec<String> {
        if self.selector.is_empty() {
            vec![String::new()]
        } else {
            self.selector.clone()
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}
