/*!
 * End-to-end conversion tests: parse, re-time and render between formats
 */

use anyhow::Result;
use subconvert::converter::SubConverter;
use subconvert::formats::FormatRegistry;
use subconvert::parser::SubParser;
use subconvert::sync::{parse_sync_expr, TimeSync};
use crate::common::{starts, MICRODVD_SAMPLE, SUBRIP_SAMPLE, SUBVIEWER_SAMPLE, TMP_SAMPLE};

/// Parse `content` and render it with the format registered under `target`
fn convert(registry: &FormatRegistry, content: &str, fps: f64, target: &str, output_name: &str) -> Result<String> {
    let outcome = SubParser::new(registry).parse_str(content, fps)?;
    let format = registry.find(target).ok_or_else(|| anyhow::anyhow!("no format {}", target))?;
    Ok(SubConverter::new(format).convert_to_string(&outcome.sequence, output_name))
}

#[test]
fn test_microDvdToSubRip_andBack_shouldRoundTrip() -> Result<()> {
    let registry = FormatRegistry::with_builtin();

    let srt = convert(&registry, MICRODVD_SAMPLE, 25.0, "srt", "movie.srt")?;
    assert_eq!(
        srt,
        "1\n00:00:00,000 --> 00:00:01,000\nHello\nWorld\n\n2\n00:00:02,000 --> 00:00:04,000\n<i>Italic\n\n"
    );

    let back = convert(&registry, &srt, 25.0, "microdvd", "movie.sub")?;
    assert_eq!(back, MICRODVD_SAMPLE);
    Ok(())
}

#[test]
fn test_microDvdRoundTrip_withNtscRate_shouldKeepFrames() -> Result<()> {
    let registry = FormatRegistry::with_builtin();
    let original = "{0}{24}A\n{48}{96}B\n";

    let srt = convert(&registry, original, 23.976, "srt", "movie.srt")?;
    assert!(srt.contains("00:00:00,000 --> 00:00:01,001"));
    assert!(srt.contains("00:00:02,002 --> 00:00:04,004"));

    let back = convert(&registry, &srt, 23.976, "microdvd", "movie.sub")?;
    assert_eq!(back, original);
    Ok(())
}

#[test]
fn test_subViewerToSubRip_shouldDropHeaderAndKeepLineBreaks() -> Result<()> {
    let registry = FormatRegistry::with_builtin();

    let srt = convert(&registry, SUBVIEWER_SAMPLE, 25.0, "srt", "movie.srt")?;

    assert_eq!(
        srt,
        "1\n00:00:01,000 --> 00:00:02,500\nFirst\nline\n\n2\n00:00:03,000 --> 00:00:04,000\nSecond\n\n"
    );
    Ok(())
}

#[test]
fn test_subRipToSubViewer_andBack_shouldKeepTimesAndText() -> Result<()> {
    let registry = FormatRegistry::with_builtin();

    let sub = convert(&registry, SUBRIP_SAMPLE, 25.0, "subviewer", "movie.sub")?;
    assert!(sub.starts_with("[INFORMATION]\n[TITLE]movie\n"));
    assert!(sub.contains("It contains[br]multiple lines."));

    let outcome = SubParser::new(&registry).parse_str(&sub, 25.0)?;
    assert_eq!(outcome.format, "SubViewer");
    assert_eq!(starts(&outcome.sequence), vec![1_000, 5_000]);
    assert_eq!(outcome.sequence.header().get("title"), Some("movie"));
    assert_eq!(outcome.sequence.get(1).unwrap().text(), Some("It contains{gsp_nl}multiple lines."));
    Ok(())
}

#[test]
fn test_tmpToSubRip_shouldWriteInferredEnds() -> Result<()> {
    let registry = FormatRegistry::with_builtin();

    let srt = convert(&registry, TMP_SAMPLE, 25.0, "srt", "movie.srt")?;

    assert_eq!(
        srt,
        "1\n00:00:01,000 --> 00:00:02,700\nHello\n\n2\n00:00:03,000 --> 00:00:05,500\nWorld\n\n"
    );
    Ok(())
}

#[test]
fn test_syncThenConvert_shouldWriteShiftedTimes() -> Result<()> {
    let registry = FormatRegistry::with_builtin();
    let mut sequence = SubParser::new(&registry).parse_str(SUBRIP_SAMPLE, 25.0)?.sequence;

    let points = parse_sync_expr("1: 0:00:02, -1: 0:00:10", &sequence)?;
    TimeSync::new(&mut sequence).sync(&points)?;

    let format = registry.find("mpl2").unwrap();
    let output = SubConverter::new(format).convert_to_string(&sequence, "movie.txt");
    assert_eq!(output, "[20][50]This is a test subtitle.\n[100][140]It contains|/multiple lines.\n");
    Ok(())
}

#[test]
fn test_changeFps_thenConvert_shouldDoubleFrames() -> Result<()> {
    let registry = FormatRegistry::with_builtin();
    let mut sequence = SubParser::new(&registry).parse_str(MICRODVD_SAMPLE, 25.0)?.sequence;

    sequence.change_fps(50.0)?;

    let format = registry.find("microdvd").unwrap();
    let output = SubConverter::new(format).convert_to_string(&sequence, "movie.sub");
    assert_eq!(output, "{0}{50}Hello|World\n{100}{200}{y:i}Italic\n");
    Ok(())
}
