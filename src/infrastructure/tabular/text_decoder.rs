// ============================================================
// TEXT DECODER
// ============================================================
// Byte -> text decoding for uploads, UTF-8 first with a Latin-1 fallback

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

/// Character produced by a decoder for bytes it cannot map
pub const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// Text encodings an upload may be decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    /// ISO-8859-1 as browsers implement the label (windows-1252 superset)
    Latin1,
}

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "iso-8859-1",
        }
    }

    fn encoding(&self) -> &'static Encoding {
        match self {
            TextEncoding::Utf8 => UTF_8,
            TextEncoding::Latin1 => WINDOWS_1252,
        }
    }

    /// Decode bytes, stripping a leading BOM. Malformed sequences become
    /// U+FFFD rather than failing.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let (text, _had_errors) = self.encoding().decode_with_bom_removal(bytes);
        text.into_owned()
    }
}
