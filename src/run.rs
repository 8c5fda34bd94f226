use crate::debug::DebugDumper;
use crate::kubectl::KubectlRunner;
use crate::kubernetes::ClusterConnector;
use crate::types::{KubectlOptions, TestRun};
use anyhow::Context;
use std::path::Path;
use tokio::process::Command;
use tracing::{error, info};

/// Run the wrapped test command, if any, and return its exit code.
pub async fn run_test_command(command: &[String]) -> anyhow::Result<Option<i32>> {
    let Some((program, args)) = command.split_first() else {
        return Ok(None);
    };

    info!("running test command: {}", command.join(" "));
    let status = Command::new(program)
        .args(args)
        .status()
        .await
        .with_context(|| format!("failed to spawn test command '{}'", program))?;

    let code = match status.code() {
        Some(code) => code,
        None => {
            error!("test command terminated by signal");
            1
        }
    };
    Ok(Some(code))
}

/// Dump every selector and return the code the process should exit with.
///
/// A failing test command's code always wins; a dump error only turns an
/// otherwise successful run into exit code 1.
pub async fn dump_selectors<C, R>(
    dumper: &DebugDumper<C, R>,
    test: &TestRun,
    options: &KubectlOptions,
    debug_dir: &Path,
    selectors: &[String],
    test_exit_code: i32,
) -> i32
where
    C: ClusterConnector,
    R: KubectlRunner,
{
    let mut dump_failed = false;

    for selector in selectors {
        match dumper
            .write_pods_debug_info_if_failed(test, options, debug_dir, selector)
            .await
        {
            Ok(Some(artifacts)) => {
                let failures = artifacts
                    .iter()
                    .filter(|a| !a.logs_ok || !a.description_ok)
                    .count();
                info!(
                    selector = %selector,
                    pods = artifacts.len(),
                    failures,
                    "debug dump complete"
                );
            }
            Ok(None) => {}
            Err(err) => {
                error!(selector = %selector, error = %err, "failed to dump debug info");
                dump_failed = true;
            }
        }
    }

    if !test.failed {
        info!(test = %test.name, "test passed, nothing to dump");
    }

    match (test_exit_code, dump_failed) {
        (0, true) => 1,
        (code, _) => code,
    }
}
