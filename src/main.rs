// kmodctl - kernel module lifecycle wrapper
// Main entry point

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use kmodctl::app::{Action, App};
use kmodctl::config::Config;
use kmodctl::messages::{self, Messages};
use kmodctl::version::build_info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "kmodctl")]
#[command(author, about, long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show version information
    #[arg(short = 'V', long)]
    version: bool,

    /// Show detailed build information
    #[arg(long)]
    build_info: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the kernel module
    Start,
    /// Unload the kernel module
    Stop,
    /// Print whether the module is loaded and its target registered
    Running {
        /// Check once instead of polling
        #[arg(long)]
        no_wait: bool,
    },
    /// Like `running`, but explain why the module is not ready
    Probe {
        /// Check once instead of polling
        #[arg(long)]
        no_wait: bool,
    },
    /// Print a status report
    Status {
        /// String prepended to every line
        #[arg(long, default_value = "")]
        prefix: String,
    },
    /// Print module version information
    Version,
}

impl From<Command> for Action {
    fn from(command: Command) -> Self {
        match command {
            Command::Start => Action::Start,
            Command::Stop => Action::Stop,
            Command::Running { no_wait } => Action::Running { wait: !no_wait },
            Command::Probe { no_wait } => Action::Probe { wait: !no_wait },
            Command::Status { prefix } => Action::Status { prefix },
            Command::Version => Action::Version,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.version {
        println!("{}", build_info().format_detailed());
        return Ok(ExitCode::SUCCESS);
    }

    if cli.build_info {
        println!("{}", build_info().format_display());
        println!("\n{}", build_info().format_build_info());
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(ExitCode::from(2));
    };

    let config = Config::load(cli.config)?;
    init_logging(cli.debug, config.log_file.as_deref())?;

    if let Some(path) = &config.messages_path {
        let catalog = Messages::load(path)
            .with_context(|| format!("loading message catalog {}", path.display()))?;
        messages::install(catalog)?;
    }

    let app = App::from_config(&config);
    let code = app.execute(&Action::from(command), &mut std::io::stdout().lock())?;
    Ok(ExitCode::from(code))
}

fn init_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let builder = tracing_subscriber::fmt().with_max_level(level);

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            let subscriber = builder
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false) // Disable ANSI colors in log file
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    tracing::debug!("kmodctl {} starting", kmodctl::version::version());
    Ok(())
}
