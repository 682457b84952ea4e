use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;
use crate::formats::{EVERY_LINE, Formatting, Markup, SectionMatch, SubFormat, TimeKind, non_empty};
use crate::frame_time::FrameTime;

// @const: {start}{end}text, the end frame may be left empty
static RECORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{(\d+)\}\{(\d*)\}(.*)$").unwrap()
});

/// MicroDVD: one subtitle per line, timed in frames
#[derive(Debug, Clone)]
pub struct MicroDvd {
    formatting: Formatting,
}

impl MicroDvd {
    pub fn new() -> Self {
        Self {
            formatting: Formatting::new()
                .with(Markup::BoldOpen, "{y:b}")
                .with(Markup::BoldClose, "")
                .with(Markup::ItalicOpen, "{y:i}")
                .with(Markup::ItalicClose, "")
                .with(Markup::UnderlineOpen, "{y:u}")
                .with(Markup::UnderlineClose, "")
                .with(Markup::NewLine, "|"),
        }
    }

    fn frame(fps: f64, digits: &str) -> Result<FrameTime, SubtitleError> {
        let frame: i64 = digits
            .parse()
            .map_err(|_| SubtitleError::MalformedTime(digits.to_string()))?;
        FrameTime::from_frame(fps, frame)
    }
}

impl Default for MicroDvd {
    fn default() -> Self {
        Self::new()
    }
}

impl SubFormat for MicroDvd {
    fn name(&self) -> &str {
        "MicroDVD"
    }

    fn option_key(&self) -> &str {
        "microdvd"
    }

    fn extension(&self) -> &str {
        "sub"
    }

    fn time_kind(&self) -> TimeKind {
        TimeKind::Frame
    }

    fn formatting(&self) -> &Formatting {
        &self.formatting
    }

    fn end_of_record(&self) -> &Regex {
        &EVERY_LINE
    }

    fn parse_record(&self, section: &str, fps: f64) -> Result<SectionMatch, SubtitleError> {
        let Some(caps) = RECORD_REGEX.captures(section.trim()) else {
            return Ok(SectionMatch::NoMatch);
        };

        let start = Self::frame(fps, &caps[1])?;
        let end = match &caps[2] {
            "" => None,
            digits => Some(Self::frame(fps, digits)?),
        };
        let text = non_empty(&caps[3]).map(|t| self.decode_text(t));

        Ok(SectionMatch::Subtitle { start, end, text })
    }

    fn format_time(&self, time: &FrameTime) -> String {
        time.to_frame_string()
    }

    fn format_record(&self, _index: usize, start: &str, end: &str, text: &str) -> String {
        format!("{{{}}}{{{}}}{}\n", start, end, text)
    }
}
