use anyhow::Result;
use clap::Parser;
use openwhisk_bench_plots::cli;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    init_logging(args.verbose);
    let is_json = args.json;

    match cli::run(args) {
        Ok(()) => Ok(()),
        Err(e) => {
            if is_json {
                // JSON consumers get a JSON error object instead of a report
                println!("{}", serde_json::json!({ "error": format!("{e:#}") }));
                std::process::exit(1);
            }
            Err(e)
        }
    }
}
