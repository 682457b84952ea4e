use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;
use crate::formats::{EVERY_LINE, Formatting, Markup, SectionMatch, SubFormat, TimeKind, non_empty};
use crate::frame_time::FrameTime;

// @const: [start][end]text, times in deciseconds, the end may be left empty
static RECORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(\d+)\]\[(\d*)\](.*)$").unwrap()
});

// @const: A slash opening a line marks it as italic
static ITALIC_LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|\|)/").unwrap());

const MS_PER_DECISECOND: i64 = 100;

/// MPL2: one subtitle per line, timed in tenths of a second
#[derive(Debug, Clone)]
pub struct Mpl2 {
    formatting: Formatting,
}

impl Mpl2 {
    pub fn new() -> Self {
        Self {
            formatting: Formatting::new()
                .with(Markup::BoldOpen, "")
                .with(Markup::BoldClose, "")
                .with(Markup::ItalicOpen, "/")
                .with(Markup::ItalicClose, "")
                .with(Markup::UnderlineOpen, "")
                .with(Markup::UnderlineClose, "")
                .with(Markup::NewLine, "|"),
        }
    }

    fn time(fps: f64, digits: &str) -> Result<FrameTime, SubtitleError> {
        let deciseconds: i64 = digits
            .parse()
            .map_err(|_| SubtitleError::MalformedTime(digits.to_string()))?;
        let ms = deciseconds
            .checked_mul(MS_PER_DECISECOND)
            .ok_or_else(|| SubtitleError::MalformedTime(digits.to_string()))?;
        FrameTime::from_ms(fps, ms)
    }
}

impl Default for Mpl2 {
    fn default() -> Self {
        Self::new()
    }
}

impl SubFormat for Mpl2 {
    fn name(&self) -> &str {
        "MPL2"
    }

    fn option_key(&self) -> &str {
        "mpl2"
    }

    fn extension(&self) -> &str {
        "txt"
    }

    fn time_kind(&self) -> TimeKind {
        TimeKind::Time
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

        let start = Self::time(fps, &caps[1])?;
        let end = match &caps[2] {
            "" => None,
            digits => Some(Self::time(fps, digits)?),
        };
        let text = non_empty(&caps[3]).map(|t| self.decode_text(t));

        Ok(SectionMatch::Subtitle { start, end, text })
    }

    fn format_time(&self, time: &FrameTime) -> String {
        (((time.ms() as f64) / MS_PER_DECISECOND as f64).round() as i64).to_string()
    }

    fn format_record(&self, _index: usize, start: &str, end: &str, text: &str) -> String {
        format!("[{}][{}]{}\n", start, end, text)
    }

    // Slashes only mean italics at the start of a line
    fn decode_text(&self, raw: &str) -> String {
        let italic = format!("${{1}}{}", Markup::ItalicOpen.placeholder());
        ITALIC_LINE_REGEX
            .replace_all(raw, italic.as_str())
            .replace('|', Markup::NewLine.placeholder())
    }
}
