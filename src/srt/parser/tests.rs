use super::*;

const SAMPLE: &str = "1\n00:00:01,000 --> 00:00:02,500\nHello there\n\n2\n00:00:03,000 --> 00:00:05,000\nGeneral Kenobi\nYou are a bold one\n";

#[test]
fn test_parse_srt_reads_blocks() {
    let entries = parse_srt(SAMPLE).expect("parse");

    assert_eq!(
        entries,
        vec![
            SrtEntry {
                id: 1,
                start_time: "00:00:01,000".to_string(),
                end_time: "00:00:02,500".to_string(),
                text: "Hello there".to_string(),
            },
            SrtEntry {
                id: 2,
                start_time: "00:00:03,000".to_string(),
                end_time: "00:00:05,000".to_string(),
                text: "General Kenobi\nYou are a bold one".to_string(),
            },
        ]
    );
}

#[test]
fn test_parse_srt_handles_crlf_and_extra_blank_lines() {
    let content = "7\r\n00:00:01,000 --> 00:00:02,000\r\nOne\r\n\r\n  \r\n\r\n9\r\n00:00:03,000 --> 00:00:04,000\r\nTwo\r\n";

    let entries = parse_srt(content).expect("parse");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, 1);
    assert_eq!(entries[0].text, "One");
    assert_eq!(entries[1].id, 2);
    assert_eq!(entries[1].text, "Two");
}

#[test]
fn test_parse_srt_empty_input() {
    assert!(parse_srt("").expect("empty").is_empty());
    assert!(parse_srt(" \n\n ").expect("blank").is_empty());
}

#[test]
fn test_parse_srt_rejects_short_block() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nFine\n\n2\n00:00:03,000 --> 00:00:04,000\n";

    assert_eq!(
        parse_srt(content),
        Err(SrtError::InvalidBlock { block: 2 })
    );
}

#[test]
fn test_parse_srt_rejects_bad_timecode() {
    let content = "1\n00:00:01.000 -> 00:00:02.000\nDots are not commas\n";

    assert_eq!(
        parse_srt(content),
        Err(SrtError::InvalidTimecode { block: 1 })
    );
}

#[test]
fn test_format_srt_layout() {
    let entries = parse_srt(SAMPLE).expect("parse");

    assert_eq!(format_srt(&entries), SAMPLE);
    assert_eq!(format_srt(&[]), "\n");
}
