use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::converter::SubConverter;
use crate::file_utils::FileManager;
use crate::formats::{FormatRegistry, SubFormat};
use crate::parser::SubParser;
use crate::subtitle_processor::SubtitleSequence;
use crate::sync::{parse_sync_expr, TimeSync};

// @module: Application controller for subtitle conversion

/// Name of the summary log written next to processed folders
pub const FOLDER_LOG_FILE: &str = "subconvert.log";

/// Per-run switches that are not part of the configuration file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionOptions {
    /// Re-express the parsed subtitles at this frame rate before writing
    pub to_fps: Option<f64>,
    /// `--sync` expression applied after parsing
    pub sync: Option<String>,
    /// Replace existing output files
    pub force_overwrite: bool,
}

/// What happened to one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Converted(PathBuf),
    /// Output already existed
    Skipped(PathBuf),
}

/// Counts of a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for subtitle conversion
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Formats available for reading and writing
    registry: FormatRegistry,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let controller = Self {
            config,
            registry: FormatRegistry::with_builtin(),
        };
        controller.output_format()?;
        Ok(controller)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Format selected by `output_format`
    pub fn output_format(&self) -> Result<&dyn SubFormat> {
        self.registry.find(&self.config.output_format).ok_or_else(|| {
            anyhow!(
                "Unknown output format '{}' (available: {})",
                self.config.output_format,
                self.registry.names().join(", ")
            )
        })
    }

    /// Parse, re-time and render subtitle text held in memory
    pub fn convert_lines<S: AsRef<str>>(&self, lines: &[S], output_name: &str, options: &ConversionOptions) -> Result<String> {
        let parser = SubParser::new(&self.registry).with_limits(self.config.parser.into());
        let outcome = parser.parse(lines, self.config.fps)?;
        info!("Detected {} format ({} subtitles)", outcome.format, outcome.sequence.len());

        let mut sequence = outcome.sequence;
        self.retime(&mut sequence, options)?;

        let format = self.output_format()?;
        let converter = SubConverter::new(format).with_header_defaults(self.config.header.clone());
        Ok(converter.convert_to_string(&sequence, output_name))
    }

    fn retime(&self, sequence: &mut SubtitleSequence, options: &ConversionOptions) -> Result<()> {
        if let Some(fps) = options.to_fps {
            sequence.change_fps(fps)?;
            debug!("Changed frame rate to {}", fps);
        }

        if let Some(expr) = options.sync.as_deref() {
            let points = parse_sync_expr(expr, sequence)?;
            let report = TimeSync::new(sequence).sync(&points)?;
            if !report.is_clean() {
                warn!("{} subtitles were pinned to a sync anchor", report.clamped.len());
            }
        }
        Ok(())
    }

    /// Convert one file; output goes to `output_dir`, or next to the input when not given
    pub fn run_file(&self, input_file: &Path, output_dir: Option<&Path>, options: &ConversionOptions) -> Result<FileOutcome> {
        let start_time = Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => input_file.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let format = self.output_format()?;
        let output_path = FileManager::generate_output_path(input_file, &output_dir, format.extension());

        if output_path.exists() && !options.force_overwrite {
            warn!("Skipping file, {} already exists (use -f to force overwrite)", output_path.display());
            return Ok(FileOutcome::Skipped(output_path));
        }

        let lines = FileManager::read_lines(input_file)?;
        let output_name = output_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let content = self
            .convert_lines(&lines, &output_name, options)
            .with_context(|| format!("Failed to convert {}", input_file.display()))?;

        FileManager::write_to_file(&output_path, &content)?;
        info!(
            "Success: {} ({})",
            output_path.display(),
            Self::format_duration(start_time.elapsed())
        );
        Ok(FileOutcome::Converted(output_path))
    }

    /// Convert every subtitle file found under `input_dir`.
    ///
    /// Failures are counted and logged, they do not stop the run.
    pub fn run_folder(&self, input_dir: &Path, output_dir: Option<&Path>, options: &ConversionOptions) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let extensions = self.registry.extensions();
        let files = FileManager::find_files(input_dir, &extensions)?;
        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }

        let folder_pb = ProgressBar::new(files.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));

        let mut summary = FolderSummary::default();

        for file in &files {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            // Keep the folder layout when writing somewhere else
            let target_dir = match (output_dir, file.parent()) {
                (Some(out), Some(parent)) => out.join(parent.strip_prefix(input_dir).unwrap_or(Path::new(""))),
                (Some(out), None) => out.to_path_buf(),
                (None, parent) => parent.map(Path::to_path_buf).unwrap_or_else(|| input_dir.to_path_buf()),
            };

            match self.run_file(file, Some(&target_dir), options) {
                Ok(FileOutcome::Converted(_)) => summary.converted += 1,
                Ok(FileOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
            }
            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        let summary_message = format!(
            "Folder processing completed: {} converted, {} skipped, {} errors",
            summary.converted, summary.skipped, summary.failed
        );
        info!("{}", summary_message);

        let log_file_path = input_dir.join(FOLDER_LOG_FILE);
        let log_line = format!(
            "{} - {} - Duration: {}",
            input_dir.display(),
            summary_message,
            Self::format_duration(start_time.elapsed())
        );
        if let Err(e) = FileManager::append_to_log_file(&log_file_path, &log_line) {
            warn!("Failed to write folder log: {}", e);
        }

        Ok(summary)
    }

    // Format duration in a human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
