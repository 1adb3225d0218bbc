//! Placeholder PDF synthesis.
//!
//! Used whenever a real conversion to PDF is unavailable. The output is a
//! single-page PDF 1.4 document describing the original upload. Cross
//! reference offsets are computed from the generated bytes so strict
//! readers accept the file without recovery scanning.

use chrono::{DateTime, SecondsFormat, Utc};

/// Page size in points (US Letter).
const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;

/// Build a placeholder PDF stamped with the current time.
pub fn synthesize(original_type: &str, original_name: &str) -> Vec<u8> {
    synthesize_at(original_type, original_name, Utc::now())
}

/// Build a placeholder PDF stamped with `generated_at`.
pub fn synthesize_at(
    original_type: &str,
    original_name: &str,
    generated_at: DateTime<Utc>,
) -> Vec<u8> {
    let content = content_stream(original_type, original_name, generated_at);

    let mut stream_object = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
    stream_object.extend_from_slice(&content);
    stream_object.extend_from_slice(b"\nendstream");

    let objects: [Vec<u8>; 5] = [
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_vec(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>",
            PAGE_WIDTH, PAGE_HEIGHT
        )
        .into_bytes(),
        stream_object,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    ];

    let mut out: Vec<u8> = Vec::with_capacity(1024 + content.len());
    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    // Each entry is exactly 20 bytes including the two-byte line ending.
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );

    out
}

fn content_stream(
    original_type: &str,
    original_name: &str,
    generated_at: DateTime<Utc>,
) -> Vec<u8> {
    let lines = [
        (16, "Converted Document".to_string()),
        (12, format!("Original file: {}", original_name)),
        (12, format!("Original type: {}", original_type)),
        (
            12,
            format!(
                "Generated: {}",
                generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
        ),
        (
            10,
            "A full conversion was not available; this page describes the source file."
                .to_string(),
        ),
    ];

    let mut stream = b"BT\n72 720 Td\n".to_vec();
    for (index, (size, text)) in lines.iter().enumerate() {
        if index > 0 {
            stream.extend_from_slice(b"0 -24 Td\n");
        }
        stream.extend_from_slice(format!("/F1 {} Tf\n(", size).as_bytes());
        stream.extend_from_slice(&escape_text(text));
        stream.extend_from_slice(b") Tj\n");
    }
    stream.extend_from_slice(b"ET");
    stream
}

/// Encode a string as a WinAnsi PDF literal string body.
///
/// Latin-1 and the Windows-1252 punctuation block map to their single
/// byte; anything the font encoding cannot show becomes `?`.
fn escape_text(text: &str) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                escaped.push(b'\\');
                escaped.push(c as u8);
            }
            '\r' | '\n' | '\t' => escaped.push(b' '),
            ' '..='~' | '\u{a0}'..='\u{ff}' => escaped.push(c as u8),
            c => escaped.push(win_ansi_extra(c).unwrap_or(b'?')),
        }
    }
    escaped
}

/// Byte for characters Windows-1252 places in 0x80..=0x9F.
fn win_ansi_extra(c: char) -> Option<u8> {
    let byte = match c {
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017d}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203a}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017e}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// One char per byte so string offsets equal byte offsets.
    fn as_text(bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { '?' })
            .collect()
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_structure() {
        let pdf = synthesize_at("application/msword", "report.doc", fixed_time());
        let text = as_text(&pdf);

        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert_eq!(text.matches("/Type /Page ").count(), 1);
        assert!(text.contains("/Count 1"));
        assert!(text.contains("(Original file: report.doc) Tj"));
        assert!(text.contains("(Original type: application/msword) Tj"));
        assert!(text.contains("(Generated: 2024-03-09T12:30:00Z) Tj"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let pdf = synthesize_at(
            "text/plain",
            "a much longer file name than usual.txt",
            fixed_time(),
        );
        let text = as_text(&pdf);

        let startxref = text.rfind("startxref\n").unwrap();
        let xref_offset: usize = text[startxref + 10..]
            .lines()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert!(text[xref_offset..].starts_with("xref\n0 6\n"));

        let entries: Vec<&str> = text[xref_offset..].lines().skip(3).take(5).collect();
        for (index, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            let expected = format!("{} 0 obj", index + 1);
            assert!(
                text[offset..].starts_with(&expected),
                "object {} not at offset {}",
                index + 1,
                offset
            );
        }
    }

    #[test]
    fn test_stream_length_matches_content() {
        let pdf = synthesize_at("image/png", "photo.png", fixed_time());
        let text = as_text(&pdf);

        let length_start = text.find("/Length ").unwrap() + 8;
        let length: usize = text[length_start..]
            .split_whitespace()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        let stream_start = text.find("stream\n").unwrap() + 7;
        let stream_end = text.find("\nendstream").unwrap();
        assert_eq!(stream_end - stream_start, length);
    }

    /// Decode WinAnsi bytes in the Latin-1 range back to text.
    fn latin1(bytes: &[u8]) -> String {
        bytes.iter().map(|&b| b as char).collect()
    }

    #[test]
    fn test_escapes_special_characters() {
        assert_eq!(escape_text("a(b)c\\d"), b"a\\(b\\)c\\\\d");
        assert_eq!(escape_text("line\nbreak"), b"line break");
        assert_eq!(escape_text("café"), b"caf\xE9");
        assert_eq!(escape_text("\u{2018}q\u{2019} \u{20ac}5"), b"\x91q\x92 \x805");
        assert_eq!(escape_text("\u{65e5}\u{672c}.txt"), b"??.txt");
    }

    #[test]
    fn test_latin1_name_survives() {
        let pdf = synthesize_at(
            "application/msword",
            "résumé (final) \\ x.docx",
            fixed_time(),
        );
        assert!(latin1(&pdf).contains("(Original file: résumé \\(final\\) \\\\ x.docx) Tj"));
    }

    #[test]
    fn test_non_ascii_name_keeps_valid_length() {
        let pdf = synthesize_at(
            "application/msword",
            "Ünïcödé \u{2014} 日本.docx",
            fixed_time(),
        );
        let text = as_text(&pdf);

        let length_start = text.find("/Length ").unwrap() + 8;
        let length: usize = text[length_start..]
            .split_whitespace()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        let stream_start = text.find("stream\n").unwrap() + 7;
        let stream_end = text.find("\nendstream").unwrap();
        assert_eq!(stream_end - stream_start, length);
        assert!(latin1(&pdf).contains("(Original file: Ünïcödé \u{97} ??.docx) Tj"));
    }
}
