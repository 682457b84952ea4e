use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;
use crate::formats::{BLANK_LINE, Formatting, Markup, SectionMatch, SubFormat, TimeKind, clock_time, non_empty};
use crate::frame_time::FrameTime;

// @const: Counter line, "HH:MM:SS,mmm --> HH:MM:SS,mmm" line, then the text lines
static RECORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^\s*\d+[ \t]*\n[ \t]*(-?\d+):(\d{2}):(\d{2})[,.](\d{1,3})[ \t]*-->[ \t]*(-?\d+):(\d{2}):(\d{2})[,.](\d{1,3})[^\n]*(?:\n(.*))?$",
    )
    .unwrap()
});

/// SubRip (`.srt`): numbered blocks separated by an empty line
#[derive(Debug, Clone)]
pub struct SubRip {
    formatting: Formatting,
}

impl SubRip {
    pub fn new() -> Self {
        Self {
            formatting: Formatting::new()
                .with(Markup::BoldOpen, "<b>")
                .with(Markup::BoldClose, "</b>")
                .with(Markup::ItalicOpen, "<i>")
                .with(Markup::ItalicClose, "</i>")
                .with(Markup::UnderlineOpen, "<u>")
                .with(Markup::UnderlineClose, "</u>")
                .with(Markup::NewLine, "\n"),
        }
    }
}

impl Default for SubRip {
    fn default() -> Self {
        Self::new()
    }
}

impl SubFormat for SubRip {
    fn name(&self) -> &str {
        "SubRip"
    }

    fn option_key(&self) -> &str {
        "srt"
    }

    fn extension(&self) -> &str {
        "srt"
    }

    fn time_kind(&self) -> TimeKind {
        TimeKind::Time
    }

    fn formatting(&self) -> &Formatting {
        &self.formatting
    }

    fn end_of_record(&self) -> &Regex {
        &BLANK_LINE
    }

    fn parse_record(&self, section: &str, fps: f64) -> Result<SectionMatch, SubtitleError> {
        let Some(caps) = RECORD_REGEX.captures(section) else {
            return Ok(SectionMatch::NoMatch);
        };

        let start = clock_time(fps, &caps[1], &caps[2], &caps[3], Some(&caps[4]))?;
        let end = clock_time(fps, &caps[5], &caps[6], &caps[7], Some(&caps[8]))?;
        let text = caps
            .get(9)
            .and_then(|m| non_empty(m.as_str()))
            .map(|t| self.decode_text(t));

        Ok(SectionMatch::Subtitle {
            start,
            end: Some(end),
            text,
        })
    }

    fn format_time(&self, time: &FrameTime) -> String {
        format!(
            "{}{:02}:{:02}:{:02},{:03}",
            if time.is_negative() { "-" } else { "" },
            time.hours(),
            time.minutes(),
            time.seconds(),
            time.milliseconds()
        )
    }

    fn format_record(&self, index: usize, start: &str, end: &str, text: &str) -> String {
        format!("{}\n{} --> {}\n{}\n\n", index, start, end, text)
    }
}
