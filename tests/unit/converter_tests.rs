/*!
 * Tests for rendering sequences into target formats
 */

use subconvert::converter::{HeaderDefaults, SubConverter};
use subconvert::formats::{MicroDvd, Mpl2, SubRip, SubViewer, Tmp};
use subconvert::frame_time::FrameTime;
use subconvert::subtitle_processor::{Subtitle, SubtitleSequence};
use crate::common::sequence_of;

#[test]
fn test_convert_toSubRip_shouldRenderNumberedBlocks() {
    let sequence = sequence_of(25.0, &[(1000, 2500, "Hello"), (3000, 4000, "World")]);
    let format = SubRip::new();

    let output = SubConverter::new(&format).convert_to_string(&sequence, "out.srt");

    assert_eq!(
        output,
        "1\n00:00:01,000 --> 00:00:02,500\nHello\n\n2\n00:00:03,000 --> 00:00:04,000\nWorld\n\n"
    );
}

#[test]
fn test_convert_toMicroDvd_shouldWriteFrames() {
    let mut sequence = SubtitleSequence::new();
    let sub = Subtitle::new(
        FrameTime::from_frame(25.0, 25).unwrap(),
        Some(FrameTime::from_frame(25.0, 62).unwrap()),
        "Hello",
    )
    .unwrap();
    sequence.append(sub).unwrap();
    let format = MicroDvd::new();

    let chunks = SubConverter::new(&format).convert(&sequence, "out.sub");

    assert_eq!(chunks, vec!["{25}{62}Hello\n".to_string()]);
}

#[test]
fn test_convert_withPlaceholders_shouldUseTargetMarkup() {
    let sequence = sequence_of(25.0, &[(1000, 2000, "{gsp_b_}Bold{_gsp_b}{gsp_nl}Next")]);

    let srt = SubRip::new();
    let microdvd = MicroDvd::new();
    let tmp = Tmp::new();

    assert!(SubConverter::new(&srt)
        .convert_to_string(&sequence, "a.srt")
        .contains("\n<b>Bold</b>\nNext\n"));
    assert_eq!(
        SubConverter::new(&microdvd).convert_to_string(&sequence, "a.sub"),
        "{25}{50}{y:b}Bold|Next\n"
    );
    assert_eq!(SubConverter::new(&tmp).convert_to_string(&sequence, "a.txt"), "00:00:01:Bold|Next\n");
}

#[test]
fn test_convert_withSurroundingWhitespace_shouldTrimText() {
    let sequence = sequence_of(25.0, &[(1000, 2000, "  Hello {gsp_nl}")]);
    let format = Mpl2::new();

    let output = SubConverter::new(&format).convert_to_string(&sequence, "a.txt");

    assert_eq!(output, "[10][20]Hello\n");
}

#[test]
fn test_convert_withLeadingAndTrailingLineBreaks_shouldDropThem() {
    let sequence = sequence_of(25.0, &[(1000, 2000, "{gsp_nl}Hello{gsp_nl}World{gsp_nl} ")]);
    let format = MicroDvd::new();

    let output = SubConverter::new(&format).convert_to_string(&sequence, "a.sub");

    assert_eq!(output, "{25}{50}Hello|World\n");
}

#[test]
fn test_convert_toSubViewer_shouldFillHeaderDefaults() {
    let sequence = sequence_of(25.0, &[(1000, 2500, "Hi")]);
    let format = SubViewer::new();
    let defaults = HeaderDefaults {
        author: "Me".to_string(),
        ..HeaderDefaults::default()
    };

    let chunks = SubConverter::new(&format)
        .with_header_defaults(defaults)
        .convert(&sequence, "dir/movie.sub");

    assert_eq!(chunks.len(), 2);
    let header = &chunks[0];
    assert!(header.contains("[TITLE]movie\n"), "header was: {}", header);
    assert!(header.contains("[AUTHOR]Me\n"));
    assert!(header.contains("[PRG]subconvert\n"));
    assert!(header.contains("[FILEPATH]dir/movie.sub\n"));
    assert!(header.contains("[DELAY]0\n"));
    assert_eq!(chunks[1], "00:00:01.00,00:00:02.50\nHi\n\n");
}

#[test]
fn test_convert_withSequenceHeader_shouldPreferItOverDefaults() {
    let mut sequence = sequence_of(25.0, &[(1000, 2500, "Hi")]);
    sequence.header_mut().add("title", "Original");
    sequence.header_mut().add("prg", "OtherTool");
    let format = SubViewer::new();

    let output = SubConverter::new(&format).convert_to_string(&sequence, "movie.sub");

    assert!(output.contains("[TITLE]Original\n"));
    assert!(output.contains("[PRG]OtherTool\n"));
    // The sequence itself is left alone
    assert!(!sequence.header().contains("author"));
}

#[test]
fn test_convert_withEmptySequence_shouldOnlyRenderHeader() {
    let sequence = SubtitleSequence::new();

    let srt = SubRip::new();
    assert!(SubConverter::new(&srt).convert(&sequence, "a.srt").is_empty());

    let subviewer = SubViewer::new();
    assert_eq!(SubConverter::new(&subviewer).convert(&sequence, "a.sub").len(), 1);
}

#[test]
fn test_headerDefaults_fromPartialJson_shouldFillMissingFields() {
    let defaults: HeaderDefaults = serde_json::from_str(r#"{"author": "Me"}"#).unwrap();

    assert_eq!(defaults.author, "Me");
    assert_eq!(defaults.program, "subconvert");
    assert_eq!(defaults.cd_track, "0");
}
