// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use texttrack::app_config::{Config, LogLevel};
use texttrack::app_controller::Controller;
use texttrack::{ObserverError, StyleEvent, StyleObserver};

const NOTIFICATION_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a JSON script of session and style operations
    Run(RunArgs),

    /// Print the configured initial closed captions style
    Style {
        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: PathBuf,
    },

    /// Generate shell completions for texttrack
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Script file: a JSON array of operations
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Print style notifications as they are delivered
    #[arg(short, long)]
    notifications: bool,

    /// Print the render engine state of every open session at the end
    #[arg(long)]
    show_render: bool,

    /// Exit with an error if any step did not return OK
    #[arg(long)]
    strict: bool,
}

/// texttrack - text track rendering session manager
#[derive(Parser, Debug)]
#[command(name = "texttrack")]
#[command(version)]
#[command(about = "Drive text track render sessions and closed captions styles")]
#[command(long_about = "texttrack manages text track render sessions (closed captions, teletext,
DVB subtitles, WebVTT, TTML, SCTE) and the closed captions style applied to them.

EXAMPLES:
    texttrack run script.json                     # Run a script with conf.json
    texttrack run -n script.json                  # Also print style notifications
    texttrack run --show-render --strict demo.json
    texttrack style -c conf.json                  # Show the configured style
    texttrack completions bash > texttrack.bash   # Generate bash completions

SCRIPT FORMAT:
    [
      {\"op\": \"open_session\", \"display_handle\": \"wayland-0\"},
      {\"op\": \"set_session_closed_captions_service\", \"session\": 1, \"service\": \"CC1\"},
      {\"op\": \"unmute_session\", \"session\": 1},
      {\"op\": \"send_session_data\", \"session\": 1, \"data_type\": \"CC\", \"data\": \"...\"}
    ]")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                color,
                now,
                tag,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Observer printing every style event as a JSON line
fn printing_observer() -> Arc<dyn StyleObserver> {
    Arc::new(|event: &StyleEvent| -> Result<(), ObserverError> {
        let line = serde_json::json!({ "notification": event });
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", line).map_err(|e| ObserverError::Unreachable(e.to_string()))
    })
}

fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    match cli.command {
        Commands::Run(args) => run_script(args),
        Commands::Style { config_path } => show_style(&config_path),
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "texttrack", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn run_script(args: RunArgs) -> Result<()> {
    let config = Config::load_or_create(&args.config_path)?
        .with_log_level_override(args.log_level.map(LogLevel::from));
    log::set_max_level(config.log_level.to_level_filter());

    let steps = Controller::load_script(&args.script)?;
    let controller = Controller::with_config(config)?;

    let observer = printing_observer();
    if args.notifications {
        controller.manager().register(Arc::clone(&observer))?;
    }

    let outcomes = controller.run(&steps);
    for outcome in &outcomes {
        println!("{}", serde_json::to_string(outcome).context("Failed to serialize outcome")?);
    }

    if args.notifications {
        if !controller.manager().wait_for_notifications(NOTIFICATION_DRAIN_TIMEOUT) {
            warn!("Some style notifications were still pending at exit");
        }
        controller.manager().unregister(&observer)?;
    }

    if args.show_render {
        for info in controller.manager().sessions() {
            let rendered = controller.renderer().session(info.id);
            let line = serde_json::json!({ "session": info, "render": rendered });
            println!("{}", line);
        }
    }

    let failed = outcomes.iter().filter(|o| !o.status.is_ok()).count();
    info!("{} step(s) run, {} failed", outcomes.len(), failed);
    if args.strict && failed > 0 {
        return Err(anyhow!("{} step(s) did not return OK", failed));
    }
    Ok(())
}

fn show_style(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    config.validate().context("Configuration validation failed")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&config.closed_captions_style)
            .context("Failed to serialize style")?
    );
    Ok(())
}
