use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;
use crate::formats::{EVERY_LINE, Formatting, Markup, SectionMatch, SubFormat, TimeKind, clock_time, non_empty};
use crate::frame_time::FrameTime;

// @const: H:MM:SS:text
static RECORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2}):(.*)$").unwrap()
});

/// TMP Player: one subtitle per line, start time only
#[derive(Debug, Clone)]
pub struct Tmp {
    formatting: Formatting,
}

impl Tmp {
    pub fn new() -> Self {
        Self {
            formatting: Formatting::new()
                .with(Markup::BoldOpen, "")
                .with(Markup::BoldClose, "")
                .with(Markup::ItalicOpen, "")
                .with(Markup::ItalicClose, "")
                .with(Markup::UnderlineOpen, "")
                .with(Markup::UnderlineClose, "")
                .with(Markup::NewLine, "|"),
        }
    }
}

impl Default for Tmp {
    fn default() -> Self {
        Self::new()
    }
}

impl SubFormat for Tmp {
    fn name(&self) -> &str {
        "TMP"
    }

    fn option_key(&self) -> &str {
        "tmp"
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

        let start = clock_time(fps, &caps[1], &caps[2], &caps[3], None)?;
        let text = non_empty(&caps[4]).map(|t| self.decode_text(t));

        Ok(SectionMatch::Subtitle {
            start,
            end: None,
            text,
        })
    }

    fn format_time(&self, time: &FrameTime) -> String {
        format!(
            "{}{:02}:{:02}:{:02}",
            if time.is_negative() { "-" } else { "" },
            time.hours(),
            time.minutes(),
            time.seconds()
        )
    }

    fn format_record(&self, _index: usize, start: &str, _end: &str, text: &str) -> String {
        format!("{}:{}\n", start, text)
    }
}
