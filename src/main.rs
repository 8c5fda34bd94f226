use clap::Parser;
use kubectl_debug_dump::cli::Cli;
use kubectl_debug_dump::run::{dump_selectors, run_test_command};
use kubectl_debug_dump::{DebugDumper, KubeconfigConnector, Kubectl, TestRun};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let test_exit_code = run_test_command(&cli.command).await?.unwrap_or(0);

    let test = TestRun {
        name: cli.test_name.clone(),
        failed: cli.failed || test_exit_code != 0,
    };
    let dumper = DebugDumper::new(KubeconfigConnector, Kubectl::default());

    let exit_code = dump_selectors(
        &dumper,
        &test,
        &cli.kubectl_options(),
        &cli.debug_directory,
        &cli.selectors(),
        test_exit_code,
    )
    .await;

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
