//! A crate for parsing FIGfonts and rendering text using these fonts.
//!
//! # Features
//!
//! - Decoding `.flf` FIGfont files ([`Font`](crate::font::Font)), with non-fatal issues reported
//!   as [`FontWarning`](crate::font::FontWarning)s
//! - Full-size, fitting (kerning) and smushing layouts
//!   ([`LayoutMode`](crate::render::LayoutMode))
//! - Controlled smushing rules that can be switched on and off
//!   ([`SmushRule`](crate::render::SmushRule))
//!
//! # Example
//!
//! ```
//! # use figtext::font::Font;
//! # use figtext::render::{LayoutMode, Renderer};
//! let font = Font::from_path(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts/mini.flf"))?;
//!
//! let full_size = Renderer::with_layout(&font, LayoutMode::FullSize)?;
//! let expected = concat!(
//! r"  /   ", "\n",
//! r" /  _ ", "\n",
//! r"/  (_)"
//! );
//! assert_eq!(full_size.render::<String>("/o")?, expected);
//!
//! let fitted = Renderer::with_layout(&font, LayoutMode::Fitting)?;
//! assert_eq!(fitted.render_lines("/o")?, [r"  / ", r" /_ ", r"/(_)"]);
//!
//! // the font supports smushing, so this is the default
//! assert_eq!(font.render("/o")?, "  /\n / \n(_)");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod font;
pub mod render;
mod row_ext;
