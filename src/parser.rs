/*!
 * Format detection and parsing of raw subtitle text.
 *
 * Each registered format is tried in registration order. A format accumulates input lines into
 * sections (ended by its end-of-record marker) and recognises one record per section. The first
 * format that confirms at least one subtitle wins.
 */

use log::{debug, warn};

use crate::errors::SubtitleError;
use crate::formats::{FormatRegistry, SectionMatch, SubFormat};
use crate::frame_time::check_fps;
use crate::subtitle_processor::{Subtitle, SubtitleSequence};

const UTF8_BOM: char = '\u{feff}';

/// Bounds on how far a format may read before it has to prove itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserLimits {
    /// Lines a header-bearing format may consume looking for its header
    pub max_header_lines: usize,
    /// Lines a header-less format may consume before its first subtitle
    pub max_lookahead_lines: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_header_lines: 50,
            max_lookahead_lines: 35,
        }
    }
}

/// Parsed subtitles together with the format that recognised them
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub sequence: SubtitleSequence,
    /// Name of the matching format
    pub format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    SeekingHeader,
    SeekingRecord,
    /// Stopped before the end of input: not this format
    Done,
}

enum SectionFlow {
    Continue,
    Abandon,
}

/// Drives the registered formats over a list of input lines
pub struct SubParser<'a> {
    registry: &'a FormatRegistry,
    limits: ParserLimits,
}

impl<'a> SubParser<'a> {
    pub fn new(registry: &'a FormatRegistry) -> Self {
        Self {
            registry,
            limits: ParserLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: ParserLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Parse a whole text, splitting it into lines first
    pub fn parse_str(&self, content: &str, fps: f64) -> Result<ParseOutcome, SubtitleError> {
        let lines: Vec<&str> = content.split_inclusive('\n').collect();
        self.parse(&lines, fps)
    }

    /// Parse decoded input lines (terminators may be included) with the first format that matches
    pub fn parse<S: AsRef<str>>(&self, lines: &[S], fps: f64) -> Result<ParseOutcome, SubtitleError> {
        let lines = Self::prepare(lines, fps)?;

        for format in self.registry.iter() {
            debug!("Trying subtitle format {}", format.name());
            if let Some(sequence) = self.try_format(format, &lines, fps)? {
                debug!("Input recognised as {} ({} subtitles)", format.name(), sequence.len());
                return Ok(ParseOutcome {
                    sequence,
                    format: format.name().to_string(),
                });
            }
        }

        Err(SubtitleError::UnknownFormat)
    }

    /// Parse with one given format only
    pub fn parse_as<S: AsRef<str>>(&self, format: &dyn SubFormat, lines: &[S], fps: f64) -> Result<ParseOutcome, SubtitleError> {
        let lines = Self::prepare(lines, fps)?;
        match self.try_format(format, &lines, fps)? {
            Some(sequence) => Ok(ParseOutcome {
                sequence,
                format: format.name().to_string(),
            }),
            None => Err(SubtitleError::UnknownFormat),
        }
    }

    /// Validate the rate, drop line terminators and a leading byte-order mark
    fn prepare<S: AsRef<str>>(lines: &[S], fps: f64) -> Result<Vec<String>, SubtitleError> {
        check_fps(fps)?;

        let lines: Vec<String> = lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let line = line.as_ref();
                let line = if i == 0 { line.trim_start_matches(UTF8_BOM) } else { line };
                line.trim_end_matches(['\n', '\r']).to_string()
            })
            .collect();

        if lines.iter().all(|line| line.trim().is_empty()) {
            return Err(SubtitleError::EmptyInput);
        }
        Ok(lines)
    }

    /// Run one format over the input; `Ok(None)` means the format does not match
    fn try_format(&self, format: &dyn SubFormat, lines: &[String], fps: f64) -> Result<Option<SubtitleSequence>, SubtitleError> {
        let mut state = if format.has_header() {
            ParserState::SeekingHeader
        } else {
            ParserState::SeekingRecord
        };
        let mut sequence = SubtitleSequence::new();
        let mut section = String::new();
        let mut confirmed = 0usize;

        for (i, line) in lines.iter().enumerate() {
            let line_no = i + 1;
            match state {
                ParserState::SeekingHeader => {
                    section.push_str(line);
                    section.push('\n');
                    if format.parse_header(&section, sequence.header_mut()) {
                        debug!("{}: header ends at line {}", format.name(), line_no);
                        section.clear();
                        state = ParserState::SeekingRecord;
                    } else if line_no >= self.limits.max_header_lines {
                        debug!("{}: no header within {} lines", format.name(), line_no);
                        state = ParserState::Done;
                    }
                }
                ParserState::SeekingRecord => {
                    if !format.has_header() && confirmed == 0 && line_no > self.limits.max_lookahead_lines {
                        debug!("{}: no subtitle within {} lines", format.name(), self.limits.max_lookahead_lines);
                        state = ParserState::Done;
                        continue;
                    }

                    section.push_str(line);
                    section.push('\n');
                    if format.end_of_record().is_match(line) {
                        let flow = Self::handle_section(format, &section, fps, line_no, &mut sequence, &mut confirmed)?;
                        section.clear();
                        if let SectionFlow::Abandon = flow {
                            state = ParserState::Done;
                        }
                    }
                }
                ParserState::Done => break,
            }
        }

        match state {
            ParserState::SeekingHeader | ParserState::Done => Ok(None),
            ParserState::SeekingRecord => {
                let flow = Self::handle_section(format, &section, fps, lines.len(), &mut sequence, &mut confirmed)?;
                match flow {
                    SectionFlow::Continue if confirmed > 0 => Ok(Some(sequence)),
                    _ => Ok(None),
                }
            }
        }
    }

    fn handle_section(
        format: &dyn SubFormat,
        section: &str,
        fps: f64,
        line_no: usize,
        sequence: &mut SubtitleSequence,
        confirmed: &mut usize,
    ) -> Result<SectionFlow, SubtitleError> {
        if section.trim().is_empty() {
            return Ok(SectionFlow::Continue);
        }

        let parse_error = |message: String| SubtitleError::ParseError { line: line_no, message };

        let failure = match format.parse_record(section, fps) {
            Ok(SectionMatch::Subtitle { start, end, text: Some(text) }) => {
                let sub = Subtitle::new(start, end, text).map_err(|e| parse_error(e.to_string()))?;
                sequence.append(sub).map_err(|e| parse_error(e.to_string()))?;
                *confirmed += 1;
                return Ok(SectionFlow::Continue);
            }
            Ok(SectionMatch::Subtitle { start, .. }) => {
                warn!("Skipping subtitle without text at {} (line {})", start, line_no);
                return Ok(SectionFlow::Continue);
            }
            Ok(SectionMatch::Ignored) => {
                debug!("{}: ignoring section ending at line {}", format.name(), line_no);
                return Ok(SectionFlow::Continue);
            }
            Ok(SectionMatch::NoMatch) => {
                let first_line = section.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
                format!("expected a {} subtitle, found '{}'", format.name(), first_line.trim())
            }
            Err(e) => e.to_string(),
        };

        if *confirmed > 0 {
            Err(parse_error(failure))
        } else {
            debug!("{}: not matching ({})", format.name(), failure);
            Ok(SectionFlow::Abandon)
        }
    }
}
