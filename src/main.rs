// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use subconvert::app_config::{self, Config};
use subconvert::app_controller::{ConversionOptions, Controller, FileOutcome};
use subconvert::formats::TimeKind;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert subtitle files (default command)
    Convert(ConvertArgs),

    /// Generate shell completions for subconvert
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input subtitle file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    options: ConvertOptions,
}

#[derive(Args, Debug, Clone)]
struct ConvertOptions {
    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Output format (name, option key or extension, e.g. 'srt', 'microdvd', 'mpl2')
    #[arg(short, long, value_name = "FORMAT")]
    to: Option<String>,

    /// Frame rate of the input
    #[arg(long)]
    fps: Option<f64>,

    /// Change the frame rate of the output
    #[arg(long, value_name = "FPS")]
    to_fps: Option<f64>,

    /// Re-time subtitles, e.g. '+2s', '-0:00:01.500' or '1: 0:00:05, -1: +3s'
    #[arg(short, long, value_name = "EXPR", allow_hyphen_values = true)]
    sync: Option<String>,

    /// Directory for converted files (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// List supported formats and exit
    #[arg(long)]
    list_formats: bool,
}

/// subconvert - subtitle converter and synchronizer
#[derive(Parser, Debug)]
#[command(name = "subconvert")]
#[command(version)]
#[command(about = "Convert and re-time subtitle files")]
#[command(long_about = "subconvert reads MicroDVD, SubRip, SubViewer, TMP and MPL2 subtitles, detects their format,
optionally re-times them and writes them in another format.

EXAMPLES:
    subconvert movie.sub                         # Convert to SubRip (default config)
    subconvert -t microdvd --fps 25 movie.srt    # Write MicroDVD frames at 25 fps
    subconvert --fps 25 --to-fps 23.976 a.sub    # Change the frame rate
    subconvert -s '+1m 2s' movie.srt             # Delay every subtitle
    subconvert -s '1: 0:00:04, -1: 1:30:00' a.srt # Stretch between two anchors
    subconvert -o out/ /subtitles/               # Convert an entire directory
    subconvert completions bash > subconvert.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    convert: ConvertArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
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
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() {
    // The logger accepts everything, the effective level is set through log::set_max_level
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialise logging: {}", e);
    }
    log::set_max_level(LevelFilter::Info);

    if let Err(e) = run(CommandLineOptions::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: CommandLineOptions) -> Result<()> {
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subconvert", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Convert(args)) => run_convert(args),
        None => run_convert(cli.convert),
    }
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    let options = args.options;

    // If log level is set via command line, apply it immediately
    if let Some(level) = options.log_level {
        let level: app_config::LogLevel = level.into();
        log::set_max_level(level.into());
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(fps) = options.fps {
        config.fps = fps;
    }
    if let Some(format) = &options.to {
        config.output_format = format.clone();
    }
    if let Some(level) = options.log_level {
        config.log_level = level.into();
    }

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.into());

    let controller = Controller::with_config(config)?;

    if options.list_formats {
        print_formats(&controller);
        return Ok(());
    }

    let input_path = args
        .input_path
        .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;
    let conversion = ConversionOptions {
        to_fps: options.to_fps,
        sync: options.sync.clone(),
        force_overwrite: options.force_overwrite,
    };
    let output_dir = options.output_dir.as_deref();

    if input_path.is_file() {
        match controller.run_file(&input_path, output_dir, &conversion)? {
            FileOutcome::Converted(_) => {}
            FileOutcome::Skipped(path) => info!("Nothing written, {} exists", path.display()),
        }
    } else if input_path.is_dir() {
        let summary = controller.run_folder(&input_path, output_dir, &conversion)?;
        if summary.failed > 0 {
            return Err(anyhow!("{} of the files could not be converted", summary.failed));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    Ok(())
}

fn print_formats(controller: &Controller) {
    println!("{:<12} {:<10} {:<5} TIMING", "NAME", "KEY", "EXT");
    for format in controller.registry().iter() {
        let timing = match format.time_kind() {
            TimeKind::Frame => "frames",
            TimeKind::Time => "time",
        };
        println!(
            "{:<12} {:<10} {:<5} {}",
            format.name(),
            format.option_key(),
            format.extension(),
            timing
        );
    }
}
