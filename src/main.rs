use std::process::ExitCode;

use anyhow::Context;

use epidoc_stats::{Cli, Config, Diagnostics, Output, pipeline};

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("ERROR, UNEXPECTED EXCEPTION");
            println!("{:#}", e);
            eprintln!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

/// Resolve configuration, then run the report with a diagnostics subscriber
/// that lives exactly as long as the run.
fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::from_cli(cli).context("invalid command line")?;

    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(config.log_level.to_tracing_level())
        .with_target(false)
        .without_time()
        .finish();

    tracing::subscriber::with_default(subscriber, || report(&config))
}

fn report(config: &Config) -> anyhow::Result<()> {
    let mut diagnostics = Diagnostics::new(config.log_level);
    let argv: Vec<String> = std::env::args().collect();
    config.announce(&argv, &mut diagnostics);

    let report = pipeline::run(config, &mut diagnostics).with_context(|| {
        format!(
            "could not report on {} with schema {}",
            config.root.display(),
            config.schema_path.display()
        )
    })?;

    let stdout = std::io::stdout();
    Output::new()
        .write_report(&mut stdout.lock(), &report)
        .context("failed to write report")?;

    Ok(())
}
