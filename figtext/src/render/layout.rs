use std::cmp::Ordering;

use enumset::{EnumSet, EnumSetType};
use log::trace;

use crate::font::{FillChar, Glyph};
use crate::render::RenderError;
use crate::row_ext::RowExt as _;

/// Layout modes, ordered from the loosest to the tightest packing
///
/// Every font declares the tightest mode it supports (see
/// [`Header::layout`](crate::font::Header::layout)); a [`Renderer`](crate::render::Renderer) can
/// only use that mode or a looser one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayoutMode {
    /// No kerning: glyphs are laid out as rectangles, side by side.
    FullSize = 0,
    /// Glyphs are moved closer until they touch, removing blank columns between them but never
    /// overlapping visible sub-characters. Fill characters count as visible.
    Fitting = 1,
    /// Glyphs are moved one column closer after they touch, merging the two touching
    /// sub-characters of each row according to the smushing rules (see [`SmushRule`]). If a row
    /// cannot be smushed, the glyph is only fitted.
    Smushing = 2,
}

impl LayoutMode {
    /// Derives the capability a font declares through its `Old_Layout` header parameter: negative
    /// means [`FullSize`](Self::FullSize), zero [`Fitting`](Self::Fitting) and positive
    /// [`Smushing`](Self::Smushing).
    #[must_use]
    pub const fn from_old_layout(old_layout: i32) -> Self {
        match old_layout {
            ..0 => Self::FullSize,
            0 => Self::Fitting,
            1.. => Self::Smushing,
        }
    }

    /// The shrink level: 0, 1 or 2.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Returns true if this mode may be used with a font declaring `capability`.
    #[must_use]
    pub const fn supported_by(self, capability: Self) -> bool {
        self.ordinal() <= capability.ordinal()
    }
}

/// Controlled smushing rules
///
/// Rules are tried in declaration order. Before any of them, two sub-characters of which one is
/// a blank always smush to the other one. If no active rule applies, *universal smushing* keeps the
/// left sub-character.
#[derive(EnumSetType, Debug)]
#[enumset(repr = "u8")]
pub enum SmushRule {
    /// Two identical sub-characters smush into one.
    EqualCharacter = 0,
    /// An underscore (`_`) is replaced by any of: `|`, `/`, `\`, `[`, `]`, `{`, `}`, `(`, `)`,
    /// `<` or `>`.
    Underscore = 1,
    /// A hierarchy of five classes is used: `|`, `/\`, `[]`, `{}` and `()`. When two smushing
    /// sub-characters are from different classes, the one from the latter class is used.
    Hierarchy = 2,
    /// Smushes opposing brackets (`[]`), braces (`{}`) and parentheses (`()`) together, replacing
    /// any such pair with a vertical bar (`|`).
    ///
    /// The pairs are smushed in either order, but they must be of the same kind.
    OppositePair = 3,
    /// Smushes `/\` into `|`, `\/` into `Y`, and `><` into `X`.
    ///
    /// Here the pairs *are* ordered, in particular `<>` is not affected by this rule.
    BigX = 4,
}

impl SmushRule {
    fn smush(self, end: u8, start: u8) -> Option<u8> {
        match self {
            Self::EqualCharacter => (end == start).then_some(end),
            Self::Underscore => underscore(start, end).or_else(|| underscore(end, start)),
            Self::Hierarchy => match rank(end).cmp(&rank(start)) {
                Ordering::Greater => Some(end),
                Ordering::Less => Some(start),
                Ordering::Equal => None,
            },
            Self::OppositePair => matches!(
                (end, start),
                (b'[', b']')
                    | (b']', b'[')
                    | (b'{', b'}')
                    | (b'}', b'{')
                    | (b'(', b')')
                    | (b')', b'(')
            )
            .then_some(b'|'),
            Self::BigX => match (end, start) {
                (b'/', b'\\') => Some(b'|'),
                (b'\\', b'/') => Some(b'Y'),
                (b'>', b'<') => Some(b'X'),
                _ => None,
            },
        }
    }
}

fn underscore(a: u8, b: u8) -> Option<u8> {
    (matches!(
        b,
        b'|' | b'/' | b'\\' | b'[' | b']' | b'{' | b'}' | b'(' | b')' | b'<' | b'>'
    ) && a == b'_')
        .then_some(b)
}

const fn rank(c: u8) -> u8 {
    match c {
        b'|' => 1,
        b'/' | b'\\' => 3,
        b'[' | b']' => 4,
        b'{' | b'}' => 5,
        b'(' | b')' => 6,
        _ => 0,
    }
}

/// Smushes two touching sub-characters with every rule active; `left` ends the rendered output so
/// far and `right` starts the next glyph.
///
/// ```
/// # use figtext::render::smush;
/// assert_eq!(smush(b' ', b'X'), b'X');
/// assert_eq!(smush(b'[', b']'), b'|');
/// assert_eq!(smush(b'\\', b'/'), b'Y');
/// assert_eq!(smush(b'a', b'b'), b'a');
/// ```
#[must_use]
pub fn smush(left: u8, right: u8) -> u8 {
    Layout::new(LayoutMode::Smushing).smush(left, right)
}

/// Combination of a layout mode and a set of smushing rules
///
/// The smushing rules are only relevant if the layout mode is [`LayoutMode::Smushing`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    mode: LayoutMode,
    smushing: EnumSet<SmushRule>,
}

impl Layout {
    /// A layout with the given mode and every smushing rule active.
    #[must_use]
    pub fn new(mode: LayoutMode) -> Self {
        Self {
            mode,
            smushing: EnumSet::all(),
        }
    }

    /// Returns the layout mode.
    #[must_use]
    pub const fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Sets the layout mode.
    pub const fn set_mode(&mut self, mode: LayoutMode) {
        self.mode = mode;
    }

    /// Returns true if the given smushing rule is active.
    #[must_use]
    pub fn smushing_rule_active(&self, rule: SmushRule) -> bool {
        self.smushing.contains(rule)
    }

    /// Replaces the set of active smushing rules.
    pub fn set_smushing(&mut self, rules: EnumSet<SmushRule>) {
        self.smushing = rules;
    }

    /// Smushes two touching sub-characters with the active rules.
    #[must_use]
    pub fn smush(&self, end: u8, start: u8) -> u8 {
        if end == b' ' {
            return start;
        }
        if start == b' ' {
            return end;
        }
        self.smushing
            .iter()
            .find_map(|rule| rule.smush(end, start))
            // universal smushing
            .unwrap_or(end)
    }

    /// Lays out glyphs left to right into `height` rows, then replaces every `fill` with a blank.
    ///
    /// # Errors
    /// [`RenderError::HeightMismatch`] if any glyph does not have exactly `height` rows.
    pub fn compose(
        &self,
        glyphs: &[&Glyph],
        fill: FillChar,
        height: usize,
    ) -> Result<Vec<Vec<u8>>, RenderError> {
        if let Some(glyph) = glyphs.iter().find(|glyph| glyph.height() != height) {
            return Err(RenderError::HeightMismatch {
                expected: height,
                found: glyph.height(),
            });
        }
        let mut rows = vec![Vec::new(); height];
        for glyph in glyphs {
            match self.mode {
                LayoutMode::FullSize => append(&mut rows, glyph.rows().iter().map(Vec::as_slice)),
                LayoutMode::Fitting => {
                    let trimmed = trim_deep(&mut rows, glyph);
                    append(&mut rows, trimmed);
                }
                LayoutMode::Smushing => self.append_smushed(&mut rows, glyph, fill),
            }
        }
        for c in rows.iter_mut().flatten() {
            if fill == *c {
                *c = b' ';
            }
        }
        Ok(rows)
    }

    fn append_smushed(&self, rows: &mut [Vec<u8>], glyph: &Glyph, fill: FillChar) {
        let trimmed = trim_deep(rows, glyph);
        let smushable = rows
            .iter()
            .zip(&trimmed)
            .all(|(end, start)| match (end.last(), start.first()) {
                (Some(&end), Some(&start)) => !(fill == end && fill != start),
                _ => false,
            });
        trace!("smushing glyph: {smushable}");
        if !smushable {
            append(rows, trimmed);
            return;
        }
        for (row, start) in rows.iter_mut().zip(trimmed) {
            if let (Some(end), Some((&first, rest))) = (row.last_mut(), start.split_first()) {
                *end = self.smush(*end, first);
                row.extend_from_slice(rest);
            }
        }
    }
}

fn append<'g>(rows: &mut [Vec<u8>], glyph_rows: impl IntoIterator<Item = &'g [u8]>) {
    for (row, glyph_row) in rows.iter_mut().zip(glyph_rows) {
        row.extend_from_slice(glyph_row);
    }
}

/// Removes as many blank columns between `rows` and `glyph` as every row allows: blanks come off
/// the end of `rows` first, then off the start of the glyph. Returns the trimmed glyph rows.
fn trim_deep<'g>(rows: &mut [Vec<u8>], glyph: &'g Glyph) -> Vec<&'g [u8]> {
    let deep_trim = rows
        .iter()
        .zip(glyph.rows())
        .map(|(end, start)| end.trailing_blanks() + start.leading_blanks())
        .min()
        .unwrap_or(0);
    trace!("deep trim of {deep_trim} columns");
    rows.iter_mut()
        .zip(glyph.rows())
        .map(|(end, start)| {
            let popped = end.trailing_blanks().min(deep_trim);
            end.truncate(end.len() - popped);
            &start[deep_trim - popped..]
        })
        .collect()
}
