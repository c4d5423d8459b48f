//! Content sniffing over the leading bytes of a file.
//!
//! This is the fallback tier of media type detection: it runs only when the
//! file's extension is missing or unknown.  Signatures are checked in table
//! order and the first match wins; the final entry always matches, so the
//! sniffer never fails to produce a media type.

/// Only this many leading bytes are considered.
pub const SNIFF_LEN: usize = 512;

/// The answer when nothing more specific matches.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Plain text with no byte order mark.
pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

enum Signature {
    /// `data` starts with `pattern`.
    Exact(&'static [u8], &'static str),
    /// `data & mask` starts with `pattern`, optionally after leading whitespace.
    Masked {
        mask: &'static [u8],
        pattern: &'static [u8],
        skip_whitespace: bool,
        media_type: &'static str,
    },
    /// An HTML tag, case-insensitive, followed by a space or `>`.
    Html(&'static [u8]),
    /// An ISO base media file whose `ftyp` box names an mp4 brand.
    Mp4,
    /// No binary control bytes at all.
    Text,
}

const SIGNATURES: &[Signature] = &[
    Signature::Masked {
        mask: b"\xFF\xFF\x00\x00",
        pattern: b"\xFE\xFF\x00\x00",
        skip_whitespace: false,
        media_type: "text/plain; charset=utf-16be",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\x00\x00",
        pattern: b"\xFF\xFE\x00\x00",
        skip_whitespace: false,
        media_type: "text/plain; charset=utf-16le",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\x00",
        pattern: b"\xEF\xBB\xBF\x00",
        skip_whitespace: false,
        media_type: TEXT_PLAIN_UTF8,
    },
    Signature::Html(b"<!DOCTYPE HTML"),
    Signature::Html(b"<HTML"),
    Signature::Html(b"<HEAD"),
    Signature::Html(b"<SCRIPT"),
    Signature::Html(b"<IFRAME"),
    Signature::Html(b"<H1"),
    Signature::Html(b"<DIV"),
    Signature::Html(b"<FONT"),
    Signature::Html(b"<TABLE"),
    Signature::Html(b"<A"),
    Signature::Html(b"<STYLE"),
    Signature::Html(b"<TITLE"),
    Signature::Html(b"<B"),
    Signature::Html(b"<BODY"),
    Signature::Html(b"<BR"),
    Signature::Html(b"<P"),
    Signature::Html(b"<!--"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\xFF",
        pattern: b"<?xml",
        skip_whitespace: true,
        media_type: "text/xml; charset=utf-8",
    },
    Signature::Exact(b"%PDF-", "application/pdf"),
    Signature::Exact(b"%!PS-Adobe-", "application/postscript"),
    Signature::Exact(b"GIF87a", "image/gif"),
    Signature::Exact(b"GIF89a", "image/gif"),
    Signature::Exact(b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    Signature::Exact(b"\xFF\xD8\xFF", "image/jpeg"),
    Signature::Exact(b"BM", "image/bmp"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WEBPVP",
        skip_whitespace: false,
        media_type: "image/webp",
    },
    Signature::Exact(b"\x00\x00\x01\x00", "image/x-icon"),
    Signature::Exact(b"\x00\x00\x02\x00", "image/x-icon"),
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00WAVE",
        skip_whitespace: false,
        media_type: "audio/wave",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"RIFF\x00\x00\x00\x00AVI ",
        skip_whitespace: false,
        media_type: "video/avi",
    },
    Signature::Masked {
        mask: b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        pattern: b"FORM\x00\x00\x00\x00AIFF",
        skip_whitespace: false,
        media_type: "audio/aiff",
    },
    Signature::Exact(b"OggS\x00", "application/ogg"),
    Signature::Exact(b"MThd\x00\x00\x00\x06", "audio/midi"),
    Signature::Exact(b"ID3", "audio/mpeg"),
    Signature::Mp4,
    Signature::Exact(b"\x1A\x45\xDF\xA3", "video/webm"),
    // Embedded OpenType: the magic sits at offset 34.
    Signature::Masked {
        mask: b"\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\xFF\xFF",
        pattern: b"\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00LP",
        skip_whitespace: false,
        media_type: "application/vnd.ms-fontobject",
    },
    Signature::Exact(b"\x00\x01\x00\x00", "font/ttf"),
    Signature::Exact(b"OTTO", "font/otf"),
    Signature::Exact(b"ttcf", "font/collection"),
    Signature::Exact(b"wOFF", "font/woff"),
    Signature::Exact(b"wOF2", "font/woff2"),
    Signature::Exact(b"\x1F\x8B\x08", "application/x-gzip"),
    Signature::Exact(b"PK\x03\x04", "application/zip"),
    Signature::Exact(b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    Signature::Exact(b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    Signature::Exact(b"\x00asm", "application/wasm"),
    Signature::Text,
];

impl Signature {
    fn matches(&self, data: &[u8], first_non_ws: usize) -> Option<&'static str> {
        match self {
            Signature::Exact(pattern, media_type) => {
                data.starts_with(pattern).then_some(*media_type)
            }
            Signature::Masked {
                mask,
                pattern,
                skip_whitespace,
                media_type,
            } => {
                let data = if *skip_whitespace {
                    &data[first_non_ws..]
                } else {
                    data
                };
                if data.len() < pattern.len() {
                    return None;
                }
                data.iter()
                    .zip(mask.iter())
                    .zip(pattern.iter())
                    .all(|((d, m), p)| d & m == *p)
                    .then_some(*media_type)
            }
            Signature::Html(tag) => {
                let data = &data[first_non_ws..];
                if data.len() < tag.len() + 1 {
                    return None;
                }
                let (head, rest) = data.split_at(tag.len());
                (head.eq_ignore_ascii_case(tag) && matches!(rest[0], b' ' | b'>'))
                    .then_some("text/html; charset=utf-8")
            }
            Signature::Mp4 => is_mp4(data).then_some("video/mp4"),
            Signature::Text => (!data.iter().any(|b| is_binary_byte(*b))).then_some(TEXT_PLAIN_UTF8),
        }
    }
}

/// Guess a media type from the leading bytes of `data`.
///
/// Empty input is plain text.  Anything unrecognised that contains binary
/// control bytes is `application/octet-stream`.
pub fn sniff_media_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];
    let first_non_ws = data
        .iter()
        .position(|b| !is_whitespace_byte(*b))
        .unwrap_or(data.len());
    SIGNATURES
        .iter()
        .find_map(|sig| sig.matches(data, first_non_ws))
        .unwrap_or(OCTET_STREAM)
}

fn is_whitespace_byte(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

fn is_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if box_size < 12 || box_size % 4 != 0 || data.len() < box_size {
        return false;
    }
    if &data[4..8] != b"ftyp" {
        return false;
    }
    // Major brand at 8..12, then compatible brands from 16 on; 12..16 is the
    // minor version.
    (8..box_size)
        .step_by(4)
        .filter(|offset| *offset != 12)
        .any(|offset| data[offset..].starts_with(b"mp4"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images() {
        assert_eq!(
            sniff_media_type(b"\x89PNG\x0D\x0A\x1A\x0A\x00\x00\x00\x0DIHDR"),
            "image/png"
        );
        assert_eq!(sniff_media_type(b"\xFF\xD8\xFF\xE0\x00\x10JFIF"), "image/jpeg");
        assert_eq!(sniff_media_type(b"GIF89a\x01\x00"), "image/gif");
        assert_eq!(
            sniff_media_type(b"RIFF\x24\x00\x00\x00WEBPVP8 "),
            "image/webp"
        );
    }

    #[test]
    fn icons_and_cursors() {
        assert_eq!(sniff_media_type(b"\x00\x00\x01\x00\x01\x00  "), "image/x-icon");
        assert_eq!(sniff_media_type(b"\x00\x00\x02\x00\x01\x00  "), "image/x-icon");
    }

    #[test]
    fn fonts() {
        let mut eot = vec![0u8; 34];
        eot.extend_from_slice(b"LP");
        assert_eq!(sniff_media_type(&eot), "application/vnd.ms-fontobject");
        assert_eq!(sniff_media_type(&eot[..35]), OCTET_STREAM);
        // The bytes before the magic are not inspected.
        let mut eot = vec![0xAB; 34];
        eot.extend_from_slice(b"LP\x00\x00");
        assert_eq!(sniff_media_type(&eot), "application/vnd.ms-fontobject");

        // Table count 0x0100 must not matter.
        assert_eq!(sniff_media_type(b"\x00\x01\x00\x00\x01\x00\x00\x00"), "font/ttf");
        assert_eq!(sniff_media_type(b"\x00\x01\x00\x00\x00\x0F\x00\x80"), "font/ttf");
        assert_eq!(sniff_media_type(b"OTTO\x00\x0B"), "font/otf");
        assert_eq!(sniff_media_type(b"ttcf\x00\x01"), "font/collection");
        assert_eq!(sniff_media_type(b"wOFF\x00\x01"), "font/woff");
        assert_eq!(sniff_media_type(b"wOF2\x00\x01"), "font/woff2");
    }

    #[test]
    fn documents_and_archives() {
        assert_eq!(sniff_media_type(b"%PDF-1.7\n%\xE2\xE3"), "application/pdf");
        assert_eq!(sniff_media_type(b"PK\x03\x04\x14\x00"), "application/zip");
        assert_eq!(
            sniff_media_type(b"\x1F\x8B\x08\x00\x00\x00"),
            "application/x-gzip"
        );
        assert_eq!(sniff_media_type(b"\x00asm\x01\x00\x00\x00"), "application/wasm");
    }

    #[test]
    fn audio_video() {
        assert_eq!(
            sniff_media_type(b"RIFF\x24\x00\x00\x00WAVEfmt "),
            "audio/wave"
        );
        assert_eq!(sniff_media_type(b"ID3\x03\x00"), "audio/mpeg");
        let mut mp4 = b"\x00\x00\x00\x18ftypisom\x00\x00\x02\x00isommp41".to_vec();
        mp4.extend_from_slice(&[0u8; 8]);
        assert_eq!(sniff_media_type(&mp4), "video/mp4");
    }

    #[test]
    fn html_and_xml() {
        assert_eq!(
            sniff_media_type(b"  \n<!doctype html>\n<html>"),
            "text/html; charset=utf-8"
        );
        assert_eq!(sniff_media_type(b"<p>hello</p>"), "text/html; charset=utf-8");
        // A tag name must be followed by a space or '>'.
        assert_eq!(sniff_media_type(b"<pre>x</pre>"), TEXT_PLAIN_UTF8);
        assert_eq!(
            sniff_media_type(b"<?xml version=\"1.0\"?><a/>"),
            "text/xml; charset=utf-8"
        );
    }

    #[test]
    fn byte_order_marks() {
        assert_eq!(
            sniff_media_type(b"\xFE\xFF\x00h"),
            "text/plain; charset=utf-16be"
        );
        assert_eq!(
            sniff_media_type(b"\xFF\xFEh\x00"),
            "text/plain; charset=utf-16le"
        );
        assert_eq!(sniff_media_type(b"\xEF\xBB\xBFhello"), TEXT_PLAIN_UTF8);
    }

    #[test]
    fn text_versus_binary() {
        assert_eq!(sniff_media_type(b""), TEXT_PLAIN_UTF8);
        assert_eq!(sniff_media_type(b"just some words\r\n\tand more"), TEXT_PLAIN_UTF8);
        assert_eq!(sniff_media_type("héllo wörld".as_bytes()), TEXT_PLAIN_UTF8);
        assert_eq!(sniff_media_type(b"abc\x00def"), OCTET_STREAM);
        assert_eq!(sniff_media_type(b"\x01\x02\x03\x04"), OCTET_STREAM);
    }

    #[test]
    fn only_prefix_is_sniffed() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0x00);
        assert_eq!(sniff_media_type(&data), TEXT_PLAIN_UTF8);
    }
}
