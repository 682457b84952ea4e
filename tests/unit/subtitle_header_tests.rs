/*!
 * Tests for subtitle header fields
 */

use subconvert::subtitle_header::SubtitleHeader;

#[test]
fn test_header_withDefaultAliases_shouldResolveToCanonicalKeys() {
    let mut header = SubtitleHeader::new();
    header.add("PRG", "Tool");
    header.add("CD Track", "2");
    header.add("File Path", "/tmp/movie.sub");

    assert_eq!(header.get("program"), Some("Tool"));
    assert_eq!(header.get("prg"), Some("Tool"));
    assert_eq!(header.get("cdtrack"), Some("2"));
    assert_eq!(header.get("cd_track"), Some("2"));
    assert_eq!(header.get("filepath"), Some("/tmp/movie.sub"));
    assert_eq!(header.len(), 3);
}

#[test]
fn test_header_withMixedCaseKeys_shouldBeCaseInsensitive() {
    let mut header = SubtitleHeader::new();
    header.add(" Title ", "Movie");

    assert!(header.contains("TITLE"));
    assert_eq!(header.get("title"), Some("Movie"));

    header.add("title", "Other");
    assert_eq!(header.get("Title"), Some("Other"));
    assert_eq!(header.len(), 1);
}

#[test]
fn test_header_withCustomAlias_shouldUseIt() {
    let mut header = SubtitleHeader::new();
    header.register_alias("writer", "author");
    header.add("writer", "Someone");

    assert_eq!(header.get("author"), Some("Someone"));
    assert_eq!(header.remove("WRITER"), Some("Someone".to_string()));
    assert!(header.is_empty());
}

#[test]
fn test_header_default_shouldHaveNoAliases() {
    let mut header = SubtitleHeader::default();
    header.add("prg", "Tool");

    assert_eq!(header.get("program"), None);
    assert_eq!(header.get("prg"), Some("Tool"));
}

#[test]
fn test_header_clear_shouldKeepAliases() {
    let mut header = SubtitleHeader::new();
    header.add("prg", "Tool");
    header.clear();
    assert!(header.is_empty());

    header.add("prg", "Again");
    let entries: Vec<(&str, &str)> = header.iter().collect();
    assert_eq!(entries, vec![("program", "Again")]);
}
