use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use common::{SUMMARY_STEM, config::ChartConfig};
use eyre::{ContextCompat, Result};
use fio::merge_fio_results;
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Library crates whose events follow the base log level.
const MODULES: &[&str] = &["fio", "fio_summary"];

const DEFAULT_LOG: &str = "../assets/fio_summary.jsonl";

#[derive(Parser)]
#[command(version, about = "Merge fio results into a summary log and chart them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Extra tracing directives, e.g. `fio=debug`
    #[arg(short, long)]
    log: Vec<String>,
    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Append new fio results to the summary log
    Merge {
        /// Directory holding fio JSON results; the log is written here too
        #[arg(short, long, default_value = "../data")]
        input: PathBuf,
        /// Summary log name without extension
        #[arg(short, long, default_value = SUMMARY_STEM)]
        name: String,
    },
    /// Render IOPS and latency bar charts from the summary log
    Plot {
        /// Summary log to read
        #[arg(short, long, default_value = DEFAULT_LOG)]
        input: PathBuf,
        /// Directory for the PNG files
        #[arg(short, long, default_value = "../bar_plots")]
        output: PathBuf,
        /// Image resolution [default: 120]
        #[arg(long)]
        dpi: Option<u32>,
        /// YAML file overriding chart colors and labels
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show record count, last update and latest values of the summary log
    Info {
        /// Summary log to read
        #[arg(short, long, default_value = DEFAULT_LOG)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let _guard = init_logging(&args.log, args.log_file.as_deref())?;

    if let Err(err) = run(args.command) {
        error!("{err:#?}");
        return Err(err);
    }
    Ok(())
}

fn init_logging(directives: &[String], log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("info".to_owned());
    let mut env_filter = EnvFilter::new(format!("fio_trend={log_level}"));

    for directive in directives {
        env_filter = env_filter.add_directive(directive.parse()?);
    }

    for module in MODULES {
        if !directives.iter().any(|x| x.split(['=', ':']).next() == Some(*module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path.file_name().context("Log file path has no file name")?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (
                Some(layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Merge { input, name } => {
            merge_fio_results(&input, &name)?;
        }
        Commands::Plot {
            input,
            output,
            dpi,
            config,
        } => {
            let config = ChartConfig::load(config.as_deref())?.with_dpi(dpi);
            fio_summary::visualize(&input, &output, &config)?;
        }
        Commands::Info { input } => {
            if let Some(text) = fio_summary::info(&input) {
                print!("{text}");
            }
        }
    }
    Ok(())
}
