use std::num::NonZero;
use std::str::{self, FromStr};

use bstr::{BString, ByteSlice as _};
use itertools::Itertools as _;
use log::debug;
use thiserror::Error;

use crate::font::FontWarning;
use crate::render::LayoutMode;

/// The signature every FIGfont header starts with, directly followed by the fill character.
pub const SIGNATURE: &[u8; 5] = b"flf2a";

/// A FIGfont header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// The fill character (*hardblank*); see [`FillChar`].
    pub fill_char: FillChar,
    /// Number of rows in each glyph. Every glyph of a font has the same height, including any
    /// empty space above or below the visible shape.
    pub height: NonZero<usize>,
    /// Rows from the top of the tallest glyph down to the baseline. Does not affect rendering.
    ///
    /// `None` if the parameter is present but not a non-negative integer; see
    /// [`FontWarning::Baseline`].
    pub baseline: Option<usize>,
    /// Upper bound on the raw length of a glyph row, end marks included. Does not affect
    /// rendering; use [`Font::max_width`](crate::font::Font::max_width) for the real maximum.
    ///
    /// `None` if the parameter is present but not a non-negative integer; see
    /// [`FontWarning::MaxLength`].
    pub max_length: Option<usize>,
    /// The raw `Old_Layout` parameter. Only its sign is significant, see [`Header::layout`].
    pub old_layout: i32,
    /// Number of comment lines between the header and the glyphs.
    pub comment_lines: usize,
    /// The most aggressive layout the font supports, derived from the sign of `old_layout`.
    pub layout: LayoutMode,
    /// The optional `Print_Direction` parameter, if present and numeric.
    pub print_direction: Option<i32>,
    /// The optional `Full_Layout` parameter, if present and numeric.
    pub full_layout: Option<i32>,
    /// The optional `Codetag_Count` parameter, if present and numeric.
    pub code_tag_count: Option<usize>,
}

impl Header {
    /// Decode a header line.
    ///
    /// # Errors
    /// Any fatal decoding errors, see [`HeaderError`] for details.
    pub fn decode(header_line: impl AsRef<[u8]>) -> Result<Self, HeaderError> {
        Self::decode_with_warnings(header_line.as_ref(), &mut Vec::new())
    }

    pub(crate) fn decode_with_warnings(
        header_line: &[u8],
        warnings: &mut Vec<FontWarning>,
    ) -> Result<Self, HeaderError> {
        let mut parameters = header_line
            .split(u8::is_ascii_whitespace)
            .filter(|parameter| !parameter.is_empty());
        let Some(
            [
                signature_and_fill,
                height,
                baseline,
                max_length,
                old_layout,
                comment_lines,
            ],
        ) = parameters.next_array()
        else {
            return Err(HeaderError::NotEnoughParameters(header_line.into()));
        };
        let Some(fill_char) = signature_and_fill.strip_prefix(SIGNATURE) else {
            return Err(HeaderError::UnknownSignature(signature_and_fill.into()));
        };
        let Ok(fill_char) = fill_char.bytes().exactly_one() else {
            return Err(HeaderError::FillCharLength(fill_char.into()));
        };
        let fill_char = fill_char
            .try_into()
            .map_err(HeaderError::InvalidFillChar)?;
        let Some(height) = NonZero::new(IntParameter::Height.parse(height)?) else {
            return Err(HeaderError::ZeroHeight);
        };
        let baseline = IntParameter::Baseline.parse(baseline).map_or_else(
            |_| {
                warnings.push(FontWarning::Baseline(baseline.into()));
                None
            },
            Some,
        );
        if let Some(baseline) = baseline {
            if !(0 < baseline && baseline <= height.get()) {
                warnings.push(FontWarning::BaselineOutOfRange { baseline, height });
            }
        }
        let max_length = IntParameter::MaxLength.parse(max_length).map_or_else(
            |_| {
                warnings.push(FontWarning::MaxLength(max_length.into()));
                None
            },
            Some,
        );
        let old_layout = IntParameter::OldLayout.parse(old_layout)?;
        let comment_lines = IntParameter::CommentLines.parse(comment_lines)?;

        // Trailing parameters vary between format revisions and are never required.
        let print_direction = parameters
            .next()
            .and_then(|token| IntParameter::PrintDirection.parse(token).ok());
        let full_layout = parameters
            .next()
            .and_then(|token| IntParameter::FullLayout.parse(token).ok());
        let code_tag_count = parameters
            .next()
            .and_then(|token| IntParameter::CodeTagCount.parse(token).ok());

        let header = Self {
            fill_char,
            height,
            baseline,
            max_length,
            old_layout,
            comment_lines,
            layout: LayoutMode::from_old_layout(old_layout),
            print_direction,
            full_layout,
            code_tag_count,
        };
        debug!(
            "decoded header: fill {:?}, height {}, old layout {} ({:?}), {} comment lines",
            char::from(header.fill_char.0),
            header.height,
            header.old_layout,
            header.layout,
            header.comment_lines,
        );
        Ok(header)
    }
}

#[derive(Debug, Clone, Copy)]
enum IntParameter {
    Height,
    Baseline,
    MaxLength,
    OldLayout,
    CommentLines,
    PrintDirection,
    FullLayout,
    CodeTagCount,
}

impl IntParameter {
    fn parse<T: FromStr>(self, bytes: &[u8]) -> Result<T, HeaderError> {
        str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| HeaderError::Parse(self.name(), bytes.into()))
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Height => "Height",
            Self::Baseline => "Baseline",
            Self::MaxLength => "Max_Length",
            Self::OldLayout => "Old_Layout",
            Self::CommentLines => "Comment_Lines",
            Self::PrintDirection => "Print_Direction",
            Self::FullLayout => "Full_Layout",
            Self::CodeTagCount => "Codetag_Count",
        }
    }
}

/// A fill character (*hardblank*)
///
/// The fill character stands in for a blank cell inside a glyph row. It is displayed as a blank
/// (`' '`) once rendered, but while glyphs are being packed together it counts as visible, so it
/// keeps adjacent glyphs a certain distance apart.
///
/// The usual fill character is a `$`, but it can be any byte except a blank (`' '`), a
/// carriage-return, a newline or a null byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillChar(u8);

impl FillChar {
    /// The fill character as a byte.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl PartialEq<u8> for FillChar {
    fn eq(&self, other: &u8) -> bool {
        self.0 == *other
    }
}

impl TryFrom<u8> for FillChar {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if matches!(value, b' ' | b'\r' | b'\n' | 0) {
            Err(value)
        } else {
            Ok(Self(value))
        }
    }
}

/// An error in decoding a FIGfont header
#[derive(Debug, Error)]
pub enum HeaderError {
    /// There is no header, ie the contents are empty.
    #[error("missing header")]
    Missing,
    /// The header has fewer than the five required parameters after the signature.
    #[error(r#""{0}" does not include enough parameters"#)]
    NotEnoughParameters(BString),
    /// The first token does not begin with `"flf2a"`.
    #[error(r#"{0} does not begin with "flf2a""#)]
    UnknownSignature(BString),
    /// The fill character is either missing or longer than one byte.
    #[error(r#"fill character "{0}" is not exactly one character"#)]
    FillCharLength(BString),
    /// The fill character is a blank (space), a carriage-return, a newline or a null byte.
    #[error("{0:#04x} must not be the fill character")]
    InvalidFillChar(u8),
    /// One of the required integer parameters cannot be parsed.
    #[error("{1} cannot be parsed as the parameter `{0}`")]
    Parse(&'static str, BString),
    /// The height parameter is 0.
    #[error("height parameter is 0")]
    ZeroHeight,
}
