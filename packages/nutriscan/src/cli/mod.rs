mod predict;

use crate::{
    config::{AppConfig, LogConfig, LogFormat, LogLevel},
    domain::UploadedDocument,
    error::Error,
    log::RENDER,
    render, ReportSubmissionClient,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

pub use predict::Predict;

#[derive(Clone, Debug, Parser)]
#[command(version, about, verbatim_doc_comment)]
///
/// NutriScan
///
/// Personalised diet recommendations from a health profile or a blood report.
///
pub struct Args {
    /// Optional path to a NutriScan configuration file.
    ///
    /// Default is "nutriscan.toml".
    /// Configuration is loaded from this file, if present.
    /// Environment variables are used instead of the file or to override any values defined in the file.
    #[arg(short = 'p', long, default_value_t = AppConfig::default_path(), verbatim_doc_comment, global = true)]
    pub config_file_path: String,

    ///
    /// Optional log level.
    ///
    #[arg(short, long, value_enum, default_value_t = LogConfig::default_log_level(), env = "NS_LOG__LEVEL", global = true)]
    pub log_level: LogLevel,

    ///
    /// Optional log format. Default level is "pretty" if running in a terminal session, otherwise "structured".
    ///
    #[arg(short='f', long, value_enum, default_value_t = LogConfig::default_log_format(), env = "NS_LOG__FORMAT", global = true)]
    pub log_format: LogFormat,

    ///
    /// Optional analysis service address, overrides service.base_url.
    ///
    #[arg(short = 'u', long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Recommend a daily diet for a health profile
    Predict(Predict),

    /// Extract health fields from a blood report
    ScanReport {
        /// Report image or document
        file: PathBuf,
    },

    /// Build a seven day plan from a blood report
    WeeklyPlan {
        /// Report image or document
        file: PathBuf,
    },
}

///
/// Runs the command specified on the command line and prints the outcome to stdout
///
pub async fn run(args: Args, config: AppConfig) -> Result<(), Error> {
    let client = ReportSubmissionClient::init(&config.service)?;

    let output = match args.command {
        Commands::Predict(predict) => {
            debug!(target: RENDER, ?predict);
            predict.run(&client).await?
        }
        Commands::ScanReport { file } => {
            let document = UploadedDocument::from_path(&file).await?;
            let extraction = client.submit_document(document).await?;
            format!(
                "{}\n{}",
                render::extraction(&extraction),
                render::profile(&client.draft())
            )
        }
        Commands::WeeklyPlan { file } => {
            let document = UploadedDocument::from_path(&file).await?;
            let plan = client.submit_weekly_plan(document).await?;
            render::weekly_plan(&plan)
        }
    };

    print!("{output}");

    Ok(())
}
