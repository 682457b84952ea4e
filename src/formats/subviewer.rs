use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;
use crate::formats::{BLANK_LINE, Formatting, Markup, SectionMatch, SubFormat, TimeKind, clock_time, non_empty};
use crate::frame_time::FrameTime;
use crate::subtitle_header::SubtitleHeader;

// @const: [INFORMATION] ... [END INFORMATION] followed by the [SUBTITLE] marker
static HEADER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\[INFORMATION\](.*?)\[END INFORMATION\].*?\[SUBTITLE\]").unwrap()
});

// @const: One "[KEY]value" line of the information block
static HEADER_FIELD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*\[([A-Za-z][A-Za-z ]*)\]([^\n]*)$").unwrap()
});

// @const: "HH:MM:SS.cc,HH:MM:SS.cc" timing line
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(\d+):(\d{2}):(\d{2})\.(\d{2}),(\d+):(\d{2}):(\d{2})\.(\d{2})[ \t]*$").unwrap()
});

// @const: Style directives such as [COLF]&HFFFFFF,[STYLE]bd
static DIRECTIVE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\[[A-Z]").unwrap());

/// SubViewer 2.0: information header, then blocks of a timing line and text
#[derive(Debug, Clone)]
pub struct SubViewer {
    formatting: Formatting,
}

impl SubViewer {
    pub fn new() -> Self {
        Self {
            formatting: Formatting::new()
                .with(Markup::BoldOpen, "")
                .with(Markup::BoldClose, "")
                .with(Markup::ItalicOpen, "")
                .with(Markup::ItalicClose, "")
                .with(Markup::UnderlineOpen, "")
                .with(Markup::UnderlineClose, "")
                .with(Markup::NewLine, "[br]"),
        }
    }
}

impl Default for SubViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl SubFormat for SubViewer {
    fn name(&self) -> &str {
        "SubViewer"
    }

    fn option_key(&self) -> &str {
        "subviewer"
    }

    fn extension(&self) -> &str {
        "sub"
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

    fn has_header(&self) -> bool {
        true
    }

    fn parse_header(&self, section: &str, header: &mut SubtitleHeader) -> bool {
        let Some(caps) = HEADER_REGEX.captures(section) else {
            return false;
        };

        for field in HEADER_FIELD_REGEX.captures_iter(&caps[1]) {
            let value = field[2].trim();
            if !value.is_empty() {
                header.add(&field[1], value);
            }
        }
        true
    }

    fn parse_record(&self, section: &str, fps: f64) -> Result<SectionMatch, SubtitleError> {
        let Some(caps) = TIMING_REGEX.captures(section) else {
            let only_directives = section
                .lines()
                .filter(|line| !line.trim().is_empty())
                .all(|line| DIRECTIVE_REGEX.is_match(line));
            return Ok(if only_directives { SectionMatch::Ignored } else { SectionMatch::NoMatch });
        };

        let start = clock_time(fps, &caps[1], &caps[2], &caps[3], Some(&caps[4]))?;
        let end = clock_time(fps, &caps[5], &caps[6], &caps[7], Some(&caps[8]))?;

        let rest = caps.get(0).map_or("", |m| &section[m.end()..]);
        let text = non_empty(rest).map(|t| self.decode_text(t));

        Ok(SectionMatch::Subtitle {
            start,
            end: Some(end),
            text,
        })
    }

    fn format_header(&self, header: &SubtitleHeader) -> Option<String> {
        let field = |key: &str| header.get(key).unwrap_or("").to_string();
        Some(format!(
            "[INFORMATION]\n\
             [TITLE]{}\n\
             [AUTHOR]{}\n\
             [SOURCE]{}\n\
             [PRG]{}\n\
             [FILEPATH]{}\n\
             [DELAY]{}\n\
             [CD TRACK]{}\n\
             [COMMENT]{}\n\
             [END INFORMATION]\n\
             [SUBTITLE]\n\
             [COLF]&HFFFFFF,[STYLE]bd,[SIZE]18,[FONT]Arial\n\n",
            field("title"),
            field("author"),
            field("source"),
            field("program"),
            field("filepath"),
            field("delay"),
            field("cd_track"),
            field("comment"),
        ))
    }

    fn format_time(&self, time: &FrameTime) -> String {
        format!(
            "{}{:02}:{:02}:{:02}.{:02}",
            if time.is_negative() { "-" } else { "" },
            time.hours(),
            time.minutes(),
            time.seconds(),
            time.milliseconds() / 10
        )
    }

    fn format_record(&self, _index: usize, start: &str, end: &str, text: &str) -> String {
        format!("{},{}\n{}\n\n", start, end, text)
    }
}
