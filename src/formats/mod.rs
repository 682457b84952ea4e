/*!
 * Subtitle text formats.
 *
 * Every format implements [`SubFormat`]: it recognises one record (or header) of its dialect in a
 * section of raw text and renders records back. Formats are collected in a [`FormatRegistry`],
 * which the parser and converter consult in registration order.
 *
 * Record text travels between formats with generic formatting placeholders (see [`Markup`]);
 * each format maps them to and from its own markup through a [`Formatting`] table.
 */

use std::fmt;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;
use crate::frame_time::FrameTime;
use crate::subtitle_header::SubtitleHeader;

pub mod microdvd;
pub mod mpl2;
pub mod subrip;
pub mod subviewer;
pub mod tmp;

pub use microdvd::MicroDvd;
pub use mpl2::Mpl2;
pub use subrip::SubRip;
pub use subviewer::SubViewer;
pub use tmp::Tmp;

// @const: End-of-record marker for formats with one record per line
pub(crate) static EVERY_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^").unwrap());

// @const: End-of-record marker for formats separating records with an empty line
pub(crate) static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*$").unwrap());

/// Generic formatting marks that may be embedded in subtitle text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Markup {
    BoldOpen,
    BoldClose,
    ItalicOpen,
    ItalicClose,
    UnderlineOpen,
    UnderlineClose,
    NewLine,
}

impl Markup {
    pub const ALL: [Markup; 7] = [
        Markup::BoldOpen,
        Markup::BoldClose,
        Markup::ItalicOpen,
        Markup::ItalicClose,
        Markup::UnderlineOpen,
        Markup::UnderlineClose,
        Markup::NewLine,
    ];

    /// Placeholder text standing for this mark inside a `Subtitle`
    pub fn placeholder(&self) -> &'static str {
        match self {
            Markup::BoldOpen => "{gsp_b_}",
            Markup::BoldClose => "{_gsp_b}",
            Markup::ItalicOpen => "{gsp_i_}",
            Markup::ItalicClose => "{_gsp_i}",
            Markup::UnderlineOpen => "{gsp_u_}",
            Markup::UnderlineClose => "{_gsp_u}",
            Markup::NewLine => "{gsp_nl}",
        }
    }
}

/// Mapping between generic placeholders and one format's markup.
///
/// A mark without an entry is unsupported: its placeholder is written out verbatim. A mark mapped
/// to an empty string is dropped from the output.
#[derive(Debug, Clone, Default)]
pub struct Formatting {
    codes: Vec<(Markup, &'static str)>,
}

impl Formatting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of one mark
    pub fn with(mut self, markup: Markup, code: &'static str) -> Self {
        self.codes.retain(|(m, _)| *m != markup);
        self.codes.push((markup, code));
        self
    }

    pub fn get(&self, markup: Markup) -> Option<&'static str> {
        self.codes.iter().find(|(m, _)| *m == markup).map(|(_, code)| *code)
    }

    /// Replace placeholders with this format's markup
    pub fn encode(&self, text: &str) -> String {
        let mut result = text.to_string();
        for markup in Markup::ALL {
            if let Some(code) = self.get(markup) {
                result = result.replace(markup.placeholder(), code);
            }
        }
        result
    }

    /// Replace this format's markup with placeholders; empty codes cannot be recognised
    pub fn decode(&self, text: &str) -> String {
        let mut codes: Vec<&(Markup, &'static str)> =
            self.codes.iter().filter(|(_, code)| !code.is_empty()).collect();
        // Longest first so that a code never eats the prefix of a longer one
        codes.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

        let mut result = text.to_string();
        for (markup, code) in codes {
            result = result.replace(*code, markup.placeholder());
        }
        result
    }
}

/// How a format writes times
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeKind {
    /// Frame numbers
    Frame,
    /// Clock times
    Time,
}

/// What a format recognised in one section of input
#[derive(Debug, Clone, PartialEq)]
pub enum SectionMatch {
    /// A timed record; `text` is `None` when the record carries no text
    Subtitle {
        start: FrameTime,
        end: Option<FrameTime>,
        text: Option<String>,
    },
    /// Format-specific content that is not a subtitle (style directives and the like)
    Ignored,
    /// Not this format's record
    NoMatch,
}

/// Capability set of one subtitle text format
pub trait SubFormat: Send + Sync + fmt::Debug {
    /// Display name, unique within a registry
    fn name(&self) -> &str;

    /// Short key used on the command line and in the configuration
    fn option_key(&self) -> &str;

    /// File extension without the dot
    fn extension(&self) -> &str;

    fn time_kind(&self) -> TimeKind;

    fn formatting(&self) -> &Formatting;

    /// Matches the line (without terminator) that closes a record
    fn end_of_record(&self) -> &Regex;

    fn has_header(&self) -> bool {
        false
    }

    /// Try to read a complete header from the accumulated lines; returns whether it matched
    fn parse_header(&self, _section: &str, _header: &mut SubtitleHeader) -> bool {
        false
    }

    /// Recognise one record in a section of raw text
    fn parse_record(&self, section: &str, fps: f64) -> Result<SectionMatch, SubtitleError>;

    /// Render the header block; `header` already has defaults filled in
    fn format_header(&self, _header: &SubtitleHeader) -> Option<String> {
        None
    }

    fn format_time(&self, time: &FrameTime) -> String;

    /// Render one record; `index` is 1-based and `text` already carries this format's markup
    fn format_record(&self, index: usize, start: &str, end: &str, text: &str) -> String;

    /// Raw record text to placeholder text
    fn decode_text(&self, raw: &str) -> String {
        self.formatting().decode(raw)
    }

    /// Placeholder text to raw record text
    fn encode_text(&self, text: &str) -> String {
        self.formatting().encode(text)
    }
}

/// Parse `H`, `MM`, `SS` and fractional digits captured by a format regex
pub(crate) fn clock_time(fps: f64, hours: &str, minutes: &str, seconds: &str, fraction: Option<&str>) -> Result<FrameTime, SubtitleError> {
    let text = match fraction {
        Some(fraction) => format!("{}:{}:{}.{}", hours, minutes, seconds, fraction),
        None => format!("{}:{}:{}", hours, minutes, seconds),
    };
    FrameTime::from_time_string(fps, &text)
}

/// Treat blank record text as absent
pub(crate) fn non_empty(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Ordered collection of formats consulted by the parser and converter
#[derive(Debug, Default)]
pub struct FormatRegistry {
    formats: Vec<Box<dyn SubFormat>>,
}

impl FormatRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding MicroDVD, SubRip, SubViewer, TMP and MPL2, tried in that order
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register(MicroDvd::new())
            .register(SubRip::new())
            .register(SubViewer::new())
            .register(Tmp::new())
            .register(Mpl2::new());
        registry
    }

    /// Add a format at the end of the trial order; a format with the same name is replaced in place
    pub fn register<F: SubFormat + 'static>(&mut self, format: F) -> &mut Self {
        let format: Box<dyn SubFormat> = Box::new(format);
        match self.formats.iter().position(|f| f.name() == format.name()) {
            Some(pos) => {
                debug!("Replacing registered format {}", format.name());
                self.formats[pos] = format;
            }
            None => self.formats.push(format),
        }
        self
    }

    /// Formats in trial order
    pub fn iter(&self) -> impl Iterator<Item = &dyn SubFormat> {
        self.formats.iter().map(|f| f.as_ref())
    }

    /// Look a format up by name, option key or extension, ignoring case
    pub fn find(&self, key: &str) -> Option<&dyn SubFormat> {
        let key = key.trim().trim_start_matches('.');
        self.iter()
            .find(|f| f.name().eq_ignore_ascii_case(key) || f.option_key().eq_ignore_ascii_case(key))
            .or_else(|| self.iter().find(|f| f.extension().eq_ignore_ascii_case(key)))
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|f| f.name()).collect()
    }

    /// Extensions of all registered formats, without duplicates
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = Vec::new();
        for format in self.iter() {
            if !extensions.contains(&format.extension()) {
                extensions.push(format.extension());
            }
        }
        extensions
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}
