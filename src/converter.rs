use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::formats::{Markup, SubFormat};
use crate::frame_time::FrameTime;
use crate::subtitle_header::SubtitleHeader;
use crate::subtitle_processor::{Subtitle, SubtitleSequence};

// @module: Rendering of subtitle sequences into a target format

/// Header values used when the sequence does not provide them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderDefaults {
    /// Program that wrote the file
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub comment: String,

    #[serde(default = "default_zero")]
    pub delay: String,

    #[serde(default = "default_zero")]
    pub cd_track: String,
}

impl Default for HeaderDefaults {
    fn default() -> Self {
        Self {
            program: default_program(),
            author: String::new(),
            source: String::new(),
            comment: String::new(),
            delay: default_zero(),
            cd_track: default_zero(),
        }
    }
}

fn default_program() -> String {
    "subconvert".to_string()
}

fn default_zero() -> String {
    "0".to_string()
}

/// Renders a `SubtitleSequence` with one format
pub struct SubConverter<'a> {
    format: &'a dyn SubFormat,
    defaults: HeaderDefaults,
}

impl<'a> SubConverter<'a> {
    pub fn new(format: &'a dyn SubFormat) -> Self {
        Self {
            format,
            defaults: HeaderDefaults::default(),
        }
    }

    pub fn with_header_defaults(mut self, defaults: HeaderDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn format(&self) -> &dyn SubFormat {
        self.format
    }

    /// Render the header (if the format has one) and every subtitle.
    ///
    /// `output_name` is the name of the file being written; its stem is the default title.
    /// Each returned chunk is ready to be written as-is.
    pub fn convert(&self, sequence: &SubtitleSequence, output_name: &str) -> Vec<String> {
        let subs = sequence.subtitles();
        let mut chunks = Vec::with_capacity(subs.len() + 1);

        if self.format.has_header() {
            let header = self.resolved_header(sequence.header(), output_name);
            if let Some(rendered) = self.format.format_header(&header) {
                chunks.push(rendered);
            }
        }

        for (i, sub) in subs.iter().enumerate() {
            let Some(start) = sub.start() else {
                warn!("Skipping subtitle {} without start time", i + 1);
                continue;
            };
            let end = Self::end_time(subs, i, &start);
            let text = self.format_text(sub.text().unwrap_or(""));

            chunks.push(self.format.format_record(
                i + 1,
                &self.format.format_time(&start),
                &self.format.format_time(&end),
                &text,
            ));
        }

        chunks
    }

    /// Render into one string
    pub fn convert_to_string(&self, sequence: &SubtitleSequence, output_name: &str) -> String {
        self.convert(sequence, output_name).concat()
    }

    /// Placeholders to the target markup; unknown placeholders stay as they are
    fn format_text(&self, text: &str) -> String {
        self.format.encode_text(trim_line_breaks(text)).trim().to_string()
    }

    fn resolved_header(&self, header: &SubtitleHeader, output_name: &str) -> SubtitleHeader {
        let mut resolved = header.clone();
        let title = Path::new(output_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();

        let defaults = [
            ("title", title.as_str()),
            ("program", self.defaults.program.as_str()),
            ("author", self.defaults.author.as_str()),
            ("source", self.defaults.source.as_str()),
            ("comment", self.defaults.comment.as_str()),
            ("delay", self.defaults.delay.as_str()),
            ("cd_track", self.defaults.cd_track.as_str()),
            ("filepath", output_name),
        ];
        for (key, value) in defaults {
            if !resolved.contains(key) {
                resolved.add(key, value);
            }
        }
        resolved
    }

    /// The stored end, or one inferred from the next subtitle's start
    fn end_time(subs: &[Subtitle], index: usize, start: &FrameTime) -> FrameTime {
        if let Some(end) = subs[index].end() {
            return end;
        }

        let inferred = match subs.get(index + 1).and_then(Subtitle::start) {
            Some(next_start) => SubtitleSequence::successor_end(start, &next_start),
            None => SubtitleSequence::last_end(start),
        };
        inferred.unwrap_or(*start)
    }
}

/// Strip whitespace and line break placeholders from both ends of placeholder text
fn trim_line_breaks(text: &str) -> &str {
    let new_line = Markup::NewLine.placeholder();
    let mut text = text.trim();
    loop {
        let stripped = text
            .strip_prefix(new_line)
            .or_else(|| text.strip_suffix(new_line))
            .map(str::trim);
        match stripped {
            Some(rest) => text = rest,
            None => return text,
        }
    }
}
