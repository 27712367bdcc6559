use clap::Parser;
use nutriscan::config::AppConfig;
use nutriscan::error::Error;
use nutriscan::{cli, log, metrics, render, Args};
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match AppConfig::load(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration Error: {}", err);
            std::process::exit(exitcode::CONFIG);
        }
    };

    log::init(config.log.clone());
    metrics::describe();

    debug!(msg = "NutriScan", version = nutriscan::VERSION, base_url = config.service.base_url);

    if let Err(err) = cli::run(args, config).await {
        error!(msg = "Command failed", error = err.to_string());

        match &err {
            Error::Submission(submission) => eprintln!("{}", render::error(submission)),
            _ => eprintln!("Error: {err}"),
        }

        std::process::exit(err.exit_code());
    }
}
