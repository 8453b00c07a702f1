//! FIGfonts
//!
//! Font types and the logic for parsing `.flf` files.

mod header;

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::num::NonZero;
use std::ops::RangeInclusive;
use std::path::Path;

use bstr::{BString, ByteSlice as _};
use itertools::Itertools as _;
use log::{debug, trace, warn};
use thiserror::Error;

pub use header::{FillChar, Header, HeaderError, SIGNATURE};

use crate::render::{RenderError, Renderer};
use crate::row_ext::RowExt as _;

/// The first character every FIGfont provides a glyph for (space).
pub const FIRST_CODEPOINT: u8 = b' ';
/// The last character every FIGfont provides a glyph for (tilde).
pub const LAST_CODEPOINT: u8 = b'~';
/// The printable ASCII range decoded into the glyph table, in file order.
pub const CODEPOINTS: RangeInclusive<u8> = FIRST_CODEPOINT..=LAST_CODEPOINT;

/// A FIGfont: decoded header metrics plus one [`Glyph`] for every printable ASCII character.
///
/// A `Font` is immutable once decoded, so it can be shared between threads and used by any number
/// of [`Renderer`]s at once.
#[derive(Debug)]
pub struct Font {
    header: Header,
    comments: String,
    glyphs: HashMap<u8, Glyph>,
    max_width: usize,
}

impl Font {
    /// Decodes the contents of an `.flf` file.
    ///
    /// Non-fatal issues are logged as warnings and otherwise dropped; use
    /// [`Font::from_bytes_with_warnings`] to inspect them.
    ///
    /// # Errors
    /// Returns `Err` on a fatal decoding error; see [`FontError`] for details.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self, FontError> {
        let (font, warnings) = Self::from_bytes_with_warnings(bytes)?;
        for warning in warnings {
            warn!("{warning}");
        }
        Ok(font)
    }

    /// Decodes the contents of an `.flf` file and also returns any non-fatal issues found while
    /// decoding.
    ///
    /// See [`FontWarning`] for details on these warnings. Notably, a glyph whose rows do not all
    /// have the same length is only a warning, but may render unexpectedly.
    ///
    /// # Errors
    /// Returns `Err` on a fatal decoding error; see [`FontError`] for details.
    pub fn from_bytes_with_warnings(
        bytes: impl AsRef<[u8]>,
    ) -> Result<(Self, Vec<FontWarning>), FontError> {
        let mut warnings = Vec::new();
        let font_string: BString = bytes
            .as_ref()
            .replace("\r\n", "\n")
            .into_iter()
            .map(|c| if c == b'\r' { b'\n' } else { c })
            .collect();

        let mut lines = font_string.lines();
        let Some(header_line) = lines.next() else {
            return Err(FontError::BadHeader(HeaderError::Missing));
        };
        let header = Header::decode_with_warnings(header_line, &mut warnings)?;
        let comments =
            String::from_utf8_lossy(&bstr::join("\n", lines.by_ref().take(header.comment_lines)))
                .into_owned();
        let glyphs = Self::decode_glyphs(&mut lines, &header, &mut warnings)?;

        if let Some(line) = lines.next() {
            warnings.push(FontWarning::TrailingContent(line.into()));
        }

        let max_width = glyphs.values().map(Glyph::width).max().unwrap_or(0);
        debug!(
            "decoded {} glyphs of height {}, widest is {max_width}",
            glyphs.len(),
            header.height
        );
        let font = Self {
            header,
            comments,
            glyphs,
            max_width,
        };
        Ok((font, warnings))
    }

    /// Reads a FIGfont from a byte stream until end of input.
    ///
    /// # Errors
    /// Returns [`FontError::Io`] if reading fails, or any decoding error of
    /// [`Font::from_bytes`].
    pub fn from_reader(mut reader: impl Read) -> Result<Self, FontError> {
        let mut bytes = Vec::new();
        let _ = reader.read_to_end(&mut bytes)?;
        Self::from_bytes(bytes)
    }

    /// Reads a FIGfont from an `.flf` file.
    ///
    /// # Errors
    /// Returns [`FontError::Io`] if the file cannot be read, or any decoding error of
    /// [`Font::from_bytes`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref();
        debug!("loading font from {}", path.display());
        Self::from_bytes(fs::read(path)?)
    }

    /// Renders a string with the most aggressive layout the font supports.
    ///
    /// # Errors
    /// Returns `Err` if `string` contains a character without a glyph; see [`RenderError`].
    pub fn render(&self, string: &str) -> Result<String, RenderError> {
        Renderer::new(self).render(string)
    }

    /// The *comments* portion of the FIGfont, between the header and the glyphs. Usually contains
    /// information about the font author.
    #[must_use]
    pub fn comments(&self) -> &str {
        &self.comments
    }

    /// The fully decoded font header.
    #[must_use]
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// The fill character, shorthand for `font.header().fill_char`.
    #[must_use]
    pub const fn fill_char(&self) -> FillChar {
        self.header.fill_char
    }

    /// Number of rows of every glyph, shorthand for `font.header().height.get()`.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.header.height.get()
    }

    /// The maximum width across all glyphs in this font, measured in bytes.
    #[must_use]
    pub const fn max_width(&self) -> usize {
        self.max_width
    }

    /// Looks up the glyph for a character.
    ///
    /// # Errors
    /// [`RenderError::UnsupportedCharacter`] if `char` is not printable ASCII, and
    /// [`RenderError::MissingGlyph`] if the table has no entry for it.
    pub fn glyph(&self, char: char) -> Result<&Glyph, RenderError> {
        let codepoint = u8::try_from(char)
            .ok()
            .filter(|codepoint| CODEPOINTS.contains(codepoint))
            .ok_or(RenderError::UnsupportedCharacter(char))?;
        self.glyphs
            .get(&codepoint)
            .ok_or(RenderError::MissingGlyph(char))
    }

    /// All glyphs in ascending character order.
    pub fn glyphs(&self) -> impl Iterator<Item = (char, &Glyph)> {
        CODEPOINTS.filter_map(|codepoint| {
            self.glyphs
                .get(&codepoint)
                .map(|glyph| (char::from(codepoint), glyph))
        })
    }

    #[expect(
        single_use_lifetimes,
        reason = "https://github.com/rust-lang/rust/issues/137575"
    )]
    fn decode_glyphs<'a>(
        mut lines: impl Iterator<Item = &'a [u8]>,
        header: &Header,
        warnings: &mut Vec<FontWarning>,
    ) -> Result<HashMap<u8, Glyph>, FontError> {
        let height = header.height.get();
        let mut glyphs = HashMap::with_capacity(CODEPOINTS.len());
        for codepoint in CODEPOINTS {
            let rows = lines.by_ref().take(height).collect_vec();
            if rows.is_empty() {
                return Err(FontError::IncompleteCharacterSet {
                    decoded: glyphs.len(),
                    next: char::from(codepoint),
                });
            }
            if rows.len() != height {
                return Err(FontError::HeightMismatch {
                    codepoint: char::from(codepoint),
                    expected: header.height,
                    found: rows.len(),
                });
            }
            let glyph = Glyph::decode(rows, codepoint, header, warnings);
            trace!("glyph {:?}: width {}", char::from(codepoint), glyph.width);
            drop(glyphs.insert(codepoint, glyph));
        }
        Ok(glyphs)
    }
}

/// The rows of one character in a font
///
/// Rows are stored exactly as they appear in the font file minus their end marks, so they may
/// still contain the font's [fill character](FillChar). It is replaced by a blank only in the
/// rendered output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Glyph {
    width: usize,
    rows: Vec<Vec<u8>>,
}

impl Glyph {
    /// Creates a glyph from its rows, e.g. to drive a [`Layout`](crate::render::Layout) directly.
    ///
    /// The width is that of the longest row.
    pub fn new<R: Into<Vec<u8>>>(rows: impl IntoIterator<Item = R>) -> Self {
        let rows = rows.into_iter().map(Into::into).collect_vec();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { width, rows }
    }

    /// The rows, top to bottom.
    #[must_use]
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    /// Width of the widest row, in bytes.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    fn decode(
        lines: Vec<&[u8]>,
        codepoint: u8,
        header: &Header,
        warnings: &mut Vec<FontWarning>,
    ) -> Self {
        let codepoint = char::from(codepoint);
        let mut too_large_length = None;
        let mut blank_end_mark = false;
        let rows = lines
            .into_iter()
            .map(|line| {
                if header.max_length.is_some_and(|max_length| line.len() > max_length) {
                    too_large_length = Some(line.len());
                }
                let (row, end_mark) = line.split_end_mark();
                if end_mark == Some(b' ') {
                    blank_end_mark = true;
                }
                row.to_owned()
            })
            .collect_vec();
        if let (Some(length), Some(max_length)) = (too_large_length, header.max_length) {
            warnings.push(FontWarning::ExcessLength {
                codepoint,
                length,
                max_length,
            });
        }
        if blank_end_mark {
            warnings.push(FontWarning::BlankEndMark(codepoint));
        }
        if !rows.iter().map(Vec::len).all_equal() {
            warnings.push(FontWarning::InconsistentWidth(codepoint));
        }
        Self::new(rows)
    }
}

/// An error in decoding a FIGfont
#[derive(Debug, Error)]
pub enum FontError {
    /// An error in decoding the header
    #[error("bad header: {0}")]
    BadHeader(#[from] HeaderError),
    /// The input ended in the middle of a glyph.
    #[error("glyph {codepoint:?} has {found} rows, expected {expected}")]
    HeightMismatch {
        /// The character whose glyph is cut short
        codepoint: char,
        /// The height from the header
        expected: NonZero<usize>,
        /// The number of rows that were left in the input
        found: usize,
    },
    /// The input ended before a glyph for every printable ASCII character was decoded.
    #[error("incomplete character set: decoded {decoded} glyphs, input ends before {next:?}")]
    IncompleteCharacterSet {
        /// The number of glyphs decoded
        decoded: usize,
        /// The first character without a glyph
        next: char,
    },
    /// The font could not be read.
    #[error("could not read font: {0}")]
    Io(#[from] io::Error),
}

/// A non-fatal issue with a FIGfont found while decoding
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum FontWarning {
    /// The baseline parameter cannot be parsed as a `usize`.
    #[error(r#"could not parse "{0}" as the baseline parameter"#)]
    Baseline(BString),
    /// The baseline parameter is not between 1 and the height parameter (inclusive).
    #[error("baseline {baseline} not between 1 and {height} (height)")]
    BaselineOutOfRange {
        /// The baseline parameter
        baseline: usize,
        /// The height parameter
        height: NonZero<usize>,
    },
    /// The max length parameter cannot be parsed as a `usize`.
    #[error(r#"could not parse "{0}" as the max length parameter"#)]
    MaxLength(BString),
    /// The rows of a glyph do not all have the same length, which may cause unexpected
    /// rendering behavior.
    #[error("glyph {0:?} has inconsistent width")]
    InconsistentWidth(char),
    /// A raw glyph row is longer than the maximum specified in the header.
    #[error("glyph {codepoint:?} has a row of length {length} > {max_length} (from header)")]
    ExcessLength {
        /// The character
        codepoint: char,
        /// The length of a row that is too long, end marks included
        length: usize,
        /// The maximum length of a row specified in the header
        max_length: usize,
    },
    /// A row of a glyph uses a blank as its end mark. This likely indicates an extraneous
    /// trailing space, especially in combination with [`FontWarning::InconsistentWidth`].
    #[error("glyph {0:?} uses a blank as end mark")]
    BlankEndMark(char),
    /// The font contains data after the printable ASCII glyphs; it is not decoded.
    #[error("unexpected content after glyphs: {0}")]
    TrailingContent(BString),
}

#[cfg(test)]
pub(crate) mod tests {
    use std::num::NonZero;

    use super::{CODEPOINTS, Font, FontError, FontWarning, Glyph, HeaderError};
    use crate::render::{LayoutMode, RenderError};

    /// Builds the text of a font whose glyph for `c` is produced by `rows(c)`, each row closed
    /// with an `@` end mark (doubled on the last row), or `#` if the row itself ends in `@`.
    pub(crate) fn synthetic_font(
        header: &str,
        comments: &[&str],
        rows: impl Fn(char) -> Vec<String>,
    ) -> String {
        let mut font = format!("{header}\n");
        for comment in comments {
            font.push_str(comment);
            font.push('\n');
        }
        for codepoint in CODEPOINTS {
            let rows = rows(char::from(codepoint));
            let last = rows.len() - 1;
            for (i, row) in rows.iter().enumerate() {
                let mark = if row.ends_with('@') { '#' } else { '@' };
                font.push_str(row);
                font.push(mark);
                if i == last {
                    font.push(mark);
                }
                font.push('\n');
            }
        }
        font
    }

    /// Height 1, fill `$`: every character renders as itself.
    pub(crate) fn identity_font(old_layout: i32) -> Font {
        let text = synthetic_font(&format!("flf2a$ 1 1 3 {old_layout} 0"), &[], |c| {
            vec![c.to_string()]
        });
        Font::from_bytes(text).unwrap()
    }

    #[test_log::test]
    fn every_printable_character_has_a_glyph() {
        let text = synthetic_font("flf2a$ 3 2 6 15 2", &["made by hand", "for tests"], |c| {
            vec![format!(" {c}"), format!("{c}$"), "  ".to_owned()]
        });
        let (font, warnings) = Font::from_bytes_with_warnings(text).unwrap();
        assert_eq!(warnings, []);
        assert_eq!(font.glyphs().count(), 95);
        assert!(font.glyphs().all(|(_, glyph)| glyph.height() == 3));
        assert_eq!(font.comments(), "made by hand\nfor tests");
        assert_eq!(font.header().layout, LayoutMode::Smushing);
        assert_eq!(font.max_width(), 2);

        let glyph = font.glyph('A').unwrap();
        assert_eq!(glyph.rows(), [b" A".to_vec(), b"A$".to_vec(), b"  ".to_vec()]);
        assert_eq!(font.glyphs().next().map(|(c, _)| c), Some(' '));
        assert_eq!(font.glyphs().last().map(|(c, _)| c), Some('~'));
    }

    #[test]
    fn end_marks_are_stripped() {
        let text = synthetic_font("flf2a$ 2 2 6 0 0", &[], |c| {
            if c == 'x' {
                // a mark character that also appears as content stays put
                vec!["@x".to_owned(), "x@".to_owned()]
            } else {
                vec!["a".to_owned(), "b".to_owned()]
            }
        });
        let font = Font::from_bytes(text).unwrap();
        assert_eq!(font.glyph('x').unwrap().rows(), [b"@x".to_vec(), b"x@".to_vec()]);
        assert_eq!(font.glyph('y').unwrap().rows(), [b"a".to_vec(), b"b".to_vec()]);
    }

    #[test]
    fn other_end_mark_characters() {
        let mut text = String::from("flf2a$ 1 1 4 -1 0\n");
        for codepoint in CODEPOINTS {
            text.push(char::from(codepoint));
            text.push_str("##\n");
        }
        let font = Font::from_bytes(text).unwrap();
        assert_eq!(font.glyph('%').unwrap().rows(), [b"%".to_vec()]);
        // the glyph for '#' is "#" followed by "##", and only two marks are stripped
        assert_eq!(font.glyph('#').unwrap().rows(), [b"#".to_vec()]);
    }

    #[test]
    fn crlf_line_endings() {
        let text = synthetic_font("flf2a$ 2 2 6 0 1", &["comment"], |c| {
            vec![c.to_string(), c.to_string()]
        })
        .replace('\n', "\r\n");
        let (font, warnings) = Font::from_bytes_with_warnings(text).unwrap();
        assert_eq!(warnings, []);
        assert_eq!(font.comments(), "comment");
        assert_eq!(font.glyph('Q').unwrap().rows(), [b"Q".to_vec(), b"Q".to_vec()]);
    }

    #[test]
    fn missing_signature() {
        let text = synthetic_font("flf2$ 1 1 3 0 0", &[], |c| vec![c.to_string()]);
        assert!(matches!(
            Font::from_bytes(text).unwrap_err(),
            FontError::BadHeader(HeaderError::UnknownSignature(_))
        ));
        assert!(matches!(
            Font::from_bytes("").unwrap_err(),
            FontError::BadHeader(HeaderError::Missing)
        ));
    }

    #[test]
    fn truncated_before_tilde() {
        let text = synthetic_font("flf2a$ 2 2 4 0 0", &[], |c| {
            vec![c.to_string(), c.to_string()]
        });
        let lines: Vec<&str> = text.lines().collect();
        // header plus 94 glyphs of two rows each
        let truncated = lines[..1 + 94 * 2].join("\n");
        let err = Font::from_bytes(truncated).unwrap_err();
        assert!(
            matches!(
                err,
                FontError::IncompleteCharacterSet {
                    decoded: 94,
                    next: '~'
                }
            ),
            "{err:?}"
        );
    }

    #[test]
    fn truncated_inside_glyph() {
        let text = synthetic_font("flf2a$ 3 2 4 0 0", &[], |c| {
            vec![c.to_string(), c.to_string(), c.to_string()]
        });
        let lines: Vec<&str> = text.lines().collect();
        let truncated = lines[..1 + 3 * 10 + 2].join("\n");
        let err = Font::from_bytes(truncated).unwrap_err();
        assert!(
            matches!(
                err,
                FontError::HeightMismatch {
                    codepoint: '*',
                    found: 2,
                    ..
                }
            ),
            "{err:?}"
        );
    }

    #[test]
    fn comments_eat_into_glyphs() {
        // Comment_Lines claims one line too many, so the glyph table ends up one line short
        let text = synthetic_font("flf2a$ 1 1 3 0 2", &["only one"], |c| vec![c.to_string()]);
        assert!(matches!(
            Font::from_bytes(text).unwrap_err(),
            FontError::IncompleteCharacterSet { decoded: 94, .. }
        ));
    }

    #[test]
    fn warnings() {
        let mut text = synthetic_font("flf2a$ 2 1 5 0 0", &[], |c| match c {
            'a' => vec!["a ".to_owned(), "aaa".to_owned()],
            'b' => vec!["bbbbb".to_owned(), "b".to_owned()],
            _ => vec![c.to_string(), c.to_string()],
        });
        text.push_str("196\n");
        let (font, warnings) = Font::from_bytes_with_warnings(text).unwrap();
        assert_eq!(
            warnings,
            [
                FontWarning::InconsistentWidth('a'),
                FontWarning::ExcessLength {
                    codepoint: 'b',
                    length: 6,
                    max_length: 5
                },
                FontWarning::InconsistentWidth('b'),
                FontWarning::TrailingContent("196".into()),
            ]
        );
        assert_eq!(font.glyph('b').unwrap().width(), 5);
    }

    #[test]
    fn blank_end_mark_warning() {
        let text = synthetic_font("flf2a$ 1 1 3 0 0", &[], |c| vec![c.to_string()])
            .replace("A@@", "A  ");
        let (_, warnings) = Font::from_bytes_with_warnings(text).unwrap();
        assert_eq!(warnings, [FontWarning::BlankEndMark('A')]);
    }

    #[test]
    fn lookup_outside_table() {
        let font = identity_font(0);
        assert!(matches!(
            font.glyph('\n'),
            Err(RenderError::UnsupportedCharacter('\n'))
        ));
        assert!(matches!(
            font.glyph('é'),
            Err(RenderError::UnsupportedCharacter('é'))
        ));
        assert!(font.glyph('~').is_ok());
        assert!(font.glyph(' ').is_ok());
    }

    #[test]
    fn glyph_new() {
        let glyph = Glyph::new(["ab", "c"]);
        assert_eq!(glyph.width(), 2);
        assert_eq!(glyph.height(), 2);
        assert_eq!(glyph.rows(), [b"ab".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn read_from_stream() {
        let text = synthetic_font("flf2a$ 1 1 3 -1 0", &[], |c| vec![c.to_string()]);
        let font = Font::from_reader(text.as_bytes()).unwrap();
        assert_eq!(font.header().height, NonZero::new(1).unwrap());
        assert_eq!(font.header().layout, LayoutMode::FullSize);
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            Font::from_path("does/not/exist.flf").unwrap_err(),
            FontError::Io(_)
        ));
    }
}
