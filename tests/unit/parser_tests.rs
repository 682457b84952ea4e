/*!
 * Tests for format detection and parsing
 */

use subconvert::errors::SubtitleError;
use subconvert::formats::{FormatRegistry, SubRip};
use subconvert::parser::{ParserLimits, SubParser};
use crate::common::{ends, starts, MICRODVD_SAMPLE, MPL2_SAMPLE, SUBRIP_SAMPLE, SUBVIEWER_SAMPLE, TMP_SAMPLE};

#[test]
fn test_parse_withSingleSubRipRecord_shouldReadTimesAndText() {
    let registry = FormatRegistry::with_builtin();
    let outcome = SubParser::new(&registry)
        .parse_str("1\n00:00:01,000 --> 00:00:02,500\nHello\n\n", 25.0)
        .unwrap();

    assert_eq!(outcome.format, "SubRip");
    assert_eq!(outcome.sequence.len(), 1);

    let sub = outcome.sequence.get(0).unwrap();
    assert_eq!(sub.start().unwrap().ms(), 1000);
    assert_eq!(sub.end().unwrap().ms(), 2500);
    assert_eq!(sub.text(), Some("Hello"));
}

#[test]
fn test_parse_withSubRipSample_shouldKeepLineBreaksAsPlaceholders() {
    let registry = FormatRegistry::with_builtin();
    let outcome = SubParser::new(&registry).parse_str(SUBRIP_SAMPLE, 25.0).unwrap();

    assert_eq!(outcome.sequence.len(), 2);
    assert_eq!(
        outcome.sequence.get(1).unwrap().text(),
        Some("It contains{gsp_nl}{gsp_i_}multiple lines{_gsp_i}.")
    );
}

#[test]
fn test_parse_withMicroDvd_shouldDetectFrames() {
    let registry = FormatRegistry::with_builtin();
    let outcome = SubParser::new(&registry).parse_str(MICRODVD_SAMPLE, 25.0).unwrap();

    assert_eq!(outcome.format, "MicroDVD");
    assert_eq!(starts(&outcome.sequence), vec![0, 2000]);
    assert_eq!(ends(&outcome.sequence), vec![1000, 4000]);
    assert_eq!(outcome.sequence.fps(), Some(25.0));
}

#[test]
fn test_parse_withSubViewer_shouldReadHeaderAndSkipDirectives() {
    let registry = FormatRegistry::with_builtin();
    let outcome = SubParser::new(&registry).parse_str(SUBVIEWER_SAMPLE, 25.0).unwrap();

    assert_eq!(outcome.format, "SubViewer");
    assert_eq!(starts(&outcome.sequence), vec![1000, 3000]);
    assert_eq!(ends(&outcome.sequence), vec![2500, 4000]);
    assert_eq!(outcome.sequence.get(0).unwrap().text(), Some("First{gsp_nl}line"));

    let header = outcome.sequence.header();
    assert_eq!(header.get("title"), Some("Movie"));
    assert_eq!(header.get("prg"), Some("Tool"));
    assert_eq!(header.get("cd_track"), Some("1"));
}

#[test]
fn test_parse_withTmp_shouldInferEndTimes() {
    let registry = FormatRegistry::with_builtin();
    let outcome = SubParser::new(&registry).parse_str(TMP_SAMPLE, 25.0).unwrap();

    assert_eq!(outcome.format, "TMP");
    assert_eq!(starts(&outcome.sequence), vec![1000, 3000]);
    assert_eq!(ends(&outcome.sequence), vec![2700, 5500]);
    assert!(outcome.sequence.has_pending_end());
}

#[test]
fn test_parse_withMpl2_shouldReadDeciseconds() {
    let registry = FormatRegistry::with_builtin();
    let outcome = SubParser::new(&registry).parse_str(MPL2_SAMPLE, 25.0).unwrap();

    assert_eq!(outcome.format, "MPL2");
    assert_eq!(starts(&outcome.sequence), vec![1000, 3000]);
    assert_eq!(ends(&outcome.sequence), vec![2500, 5500]);
}

#[test]
fn test_parse_withBomAndCrLf_shouldStripThem() {
    let registry = FormatRegistry::with_builtin();
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nHi\r\n\r\n";
    let outcome = SubParser::new(&registry).parse_str(content, 25.0).unwrap();

    assert_eq!(outcome.format, "SubRip");
    assert_eq!(outcome.sequence.get(0).unwrap().text(), Some("Hi"));
}

#[test]
fn test_parse_withLinesVector_shouldAcceptOwnedStrings() {
    let registry = FormatRegistry::with_builtin();
    let lines = vec!["{0}{25}One\n".to_string(), "{25}{50}Two".to_string()];
    let outcome = SubParser::new(&registry).parse(&lines, 25.0).unwrap();

    assert_eq!(outcome.sequence.len(), 2);
}

#[test]
fn test_parse_withEmptyInput_shouldFailEmptyInput() {
    let registry = FormatRegistry::with_builtin();
    let parser = SubParser::new(&registry);

    assert_eq!(parser.parse_str("", 25.0).unwrap_err(), SubtitleError::EmptyInput);
    assert_eq!(parser.parse_str("\n   \n\n", 25.0).unwrap_err(), SubtitleError::EmptyInput);
}

#[test]
fn test_parse_withUnrecognisedText_shouldFailUnknownFormat() {
    let registry = FormatRegistry::with_builtin();
    let result = SubParser::new(&registry).parse_str("hello world\nthis is not a subtitle\n", 25.0);

    assert_eq!(result.unwrap_err(), SubtitleError::UnknownFormat);
}

#[test]
fn test_parse_withHugeFrameNumber_shouldFailWithoutPanic() {
    let registry = FormatRegistry::with_builtin();
    let result = SubParser::new(&registry).parse_str("{300000000000000000}{}Hello\n", 25.0);

    assert_eq!(result.unwrap_err(), SubtitleError::UnknownFormat);
}

#[test]
fn test_parse_withStartAtEndOfTimeRange_shouldFailParseError() {
    let registry = FormatRegistry::with_builtin();
    let result = SubParser::new(&registry).parse_str("[92233720368547758][]Hello\n", 25.0);

    assert!(matches!(result, Err(SubtitleError::ParseError { line: 1, .. })));
}

#[test]
fn test_parse_withInvalidFps_shouldFailInvalidRate() {
    let registry = FormatRegistry::with_builtin();
    let result = SubParser::new(&registry).parse_str(MICRODVD_SAMPLE, 0.0);

    assert_eq!(result.unwrap_err(), SubtitleError::InvalidRate(0.0));
}

#[test]
fn test_parse_withGarbageAfterConfirmedRecords_shouldFailParseError() {
    let registry = FormatRegistry::with_builtin();
    let content = "{0}{25}First\n{50}{75}Second\ngarbage line\n";
    let result = SubParser::new(&registry).parse_str(content, 25.0);

    assert!(
        matches!(result, Err(SubtitleError::ParseError { line: 3, .. })),
        "unexpected result: {:?}",
        result
    );
}

#[test]
fn test_parse_withRecordWithoutText_shouldSkipIt() {
    let registry = FormatRegistry::with_builtin();
    let outcome = SubParser::new(&registry)
        .parse_str("{0}{25}\n{50}{75}Text\n", 25.0)
        .unwrap();

    assert_eq!(outcome.sequence.len(), 1);
    assert_eq!(outcome.sequence.get(0).unwrap().text(), Some("Text"));
}

#[test]
fn test_parse_withLongLeadingGap_shouldRespectLookahead() {
    let registry = FormatRegistry::with_builtin();
    let content = format!("{}{{0}}{{25}}Late\n", "\n".repeat(40));

    let result = SubParser::new(&registry).parse_str(&content, 25.0);
    assert_eq!(result.unwrap_err(), SubtitleError::UnknownFormat);

    let limits = ParserLimits {
        max_header_lines: 50,
        max_lookahead_lines: 60,
    };
    let outcome = SubParser::new(&registry).with_limits(limits).parse_str(&content, 25.0).unwrap();
    assert_eq!(outcome.format, "MicroDVD");
}

#[test]
fn test_parseAs_withOtherFormat_shouldFailUnknownFormat() {
    let registry = FormatRegistry::with_builtin();
    let parser = SubParser::new(&registry);

    let result = parser.parse_as(&SubRip::new(), &[MICRODVD_SAMPLE], 25.0);
    assert_eq!(result.unwrap_err(), SubtitleError::UnknownFormat);

    let lines: Vec<&str> = SUBRIP_SAMPLE.split_inclusive('\n').collect();
    let outcome = parser.parse_as(&SubRip::new(), &lines, 25.0).unwrap();
    assert_eq!(outcome.format, "SubRip");
}
