//! Renderer and rendering settings
mod layout;

use enumset::EnumSet;
use log::debug;
use thiserror::Error;

use crate::font::{Font, Glyph};

pub use layout::{Layout, LayoutMode, SmushRule, smush};

/// The main type for rendering
///
/// A renderer pairs a [`Font`] with a [`Layout`]. The pairing is checked when it is made: a font
/// that only supports [`LayoutMode::Fitting`] cannot be rendered with
/// [`LayoutMode::Smushing`], so every later call to [`render()`](Renderer::render) only fails on
/// characters that have no glyph.
///
/// The other methods are meant to be used in a builder pattern:
/// ```
/// # use figtext::font::Font;
/// # use figtext::render::{LayoutMode, Renderer, SmushRule};
/// # fn font() -> Font {
/// #     let mut text = String::from("flf2a$ 1 1 3 1 0\n");
/// #     for c in ' '..='~' {
/// #         let mark = if c == '@' { '#' } else { '@' };
/// #         text.extend([c, mark, mark, '\n']);
/// #     }
/// #     Font::from_bytes(text).unwrap()
/// # }
/// let font = font();
/// let renderer = Renderer::new(&font)
///     .layout_mode(LayoutMode::Smushing)?
///     .smush_rules(SmushRule::EqualCharacter | SmushRule::BigX);
/// assert_eq!(renderer.render::<String>("/\\")?, "|");
/// assert_eq!(renderer.render::<String>("\\/")?, "Y");
/// // opposite pairs are not active, so the left character is kept
/// assert_eq!(renderer.render::<String>("[]")?, "[");
/// # Ok::<(), figtext::render::RenderError>(())
/// ```
#[must_use]
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'font> {
    font: &'font Font,
    layout: Layout,
}

impl<'font> Renderer<'font> {
    /// Creates a new renderer using the tightest layout the font supports, with every smushing
    /// rule active.
    pub fn new(font: &'font Font) -> Self {
        Self {
            font,
            layout: Layout::new(font.header().layout),
        }
    }

    /// Creates a new renderer with the given layout mode.
    ///
    /// # Errors
    /// [`RenderError::UnsupportedLayout`] if the font does not support `mode`.
    pub fn with_layout(font: &'font Font, mode: LayoutMode) -> Result<Self, RenderError> {
        Self::new(font).layout_mode(mode)
    }

    /// Sets the layout mode.
    ///
    /// # Errors
    /// [`RenderError::UnsupportedLayout`] if the font does not support `mode`.
    pub fn layout_mode(mut self, mode: LayoutMode) -> Result<Self, RenderError> {
        let supported = self.font.header().layout;
        if !mode.supported_by(supported) {
            return Err(RenderError::UnsupportedLayout {
                requested: mode,
                supported,
            });
        }
        self.layout.set_mode(mode);
        Ok(self)
    }

    /// Sets the active smushing rules. Only relevant for [`LayoutMode::Smushing`].
    pub fn smush_rules(mut self, rules: EnumSet<SmushRule>) -> Self {
        self.layout.set_smushing(rules);
        self
    }

    /// The font being rendered.
    #[must_use]
    pub const fn font(&self) -> &'font Font {
        self.font
    }

    /// The layout in use.
    #[must_use]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Renders the given string, joining the rows with newlines (without a trailing newline).
    ///
    /// The output type can be:
    /// * [`Vec<u8>`]: recommended in case the font uses bytes that are not valid UTF-8;
    /// * [`String`]: a convenience wrapper using [`String::from_utf8_lossy`] after rendering as
    ///   [`Vec<u8>`].
    ///
    /// # Errors
    /// [`RenderError::UnsupportedCharacter`] if `string` contains anything but printable ASCII.
    pub fn render<Output: RenderOutput>(&self, string: &str) -> Result<Output, RenderError> {
        let rows = self.render_rows(string)?;
        Ok(Output::from_bytes(rows.join(&b'\n')))
    }

    /// Renders the given string into its rows, top to bottom.
    ///
    /// # Errors
    /// [`RenderError::UnsupportedCharacter`] if `string` contains anything but printable ASCII.
    pub fn render_lines(&self, string: &str) -> Result<Vec<String>, RenderError> {
        let rows = self.render_rows(string)?;
        Ok(rows.into_iter().map(String::from_bytes).collect())
    }

    fn render_rows(&self, string: &str) -> Result<Vec<Vec<u8>>, RenderError> {
        let glyphs = string
            .chars()
            .map(|c| self.font.glyph(c))
            .collect::<Result<Vec<&Glyph>, _>>()?;
        debug!(
            "rendering {} glyphs with {:?}",
            glyphs.len(),
            self.layout.mode()
        );
        self.layout
            .compose(&glyphs, self.font.fill_char(), self.font.height())
    }
}

/// Trait to generically bound the renderer output
///
/// Implementations are provided for [`Vec<u8>`] and [`String`]. Effectively a version of
/// [`From<Vec<u8>>`].
pub trait RenderOutput {
    /// Convert the byte level rendered output.
    fn from_bytes(bytes: Vec<u8>) -> Self;
}

impl RenderOutput for Vec<u8> {
    fn from_bytes(bytes: Vec<u8>) -> Self {
        bytes
    }
}

impl RenderOutput for String {
    fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::from_utf8_lossy(&bytes).into_owned()
    }
}

/// An error while pairing a layout with a font or while rendering
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The character is outside the printable ASCII range (`' '..='~'`).
    #[error("{0:?} is not a printable ASCII character")]
    UnsupportedCharacter(char),
    /// The font has no glyph for a printable ASCII character.
    #[error("font has no glyph for {0:?}")]
    MissingGlyph(char),
    /// A glyph passed to [`Layout::compose`] does not have the expected number of rows.
    #[error("glyph has {found} rows, expected {expected}")]
    HeightMismatch {
        /// The height of the rendered block
        expected: usize,
        /// The height of the glyph
        found: usize,
    },
    /// The font does not support the requested layout mode.
    #[error("layout {requested:?} needs a font supporting it, but the font only supports {supported:?}")]
    UnsupportedLayout {
        /// The layout mode asked for
        requested: LayoutMode,
        /// The tightest layout mode the font supports
        supported: LayoutMode,
    },
}
