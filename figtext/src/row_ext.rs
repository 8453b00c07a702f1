/// Byte-level helpers for glyph rows and rendered rows.
pub(crate) trait RowExt {
    /// Number of blanks (`' '`) at the start of the row.
    fn leading_blanks(&self) -> usize;

    /// Number of blanks (`' '`) at the end of the row.
    fn trailing_blanks(&self) -> usize;

    /// Splits a raw font line into its content and end mark. The end mark is the last byte,
    /// together with one more copy of it directly before (the doubled mark closing a glyph).
    fn split_end_mark(&self) -> (&[u8], Option<u8>);
}

impl RowExt for [u8] {
    fn leading_blanks(&self) -> usize {
        count_blanks(self.iter().copied())
    }

    fn trailing_blanks(&self) -> usize {
        count_blanks(self.iter().rev().copied())
    }

    fn split_end_mark(&self) -> (&[u8], Option<u8>) {
        let Some((&mark, rest)) = self.split_last() else {
            return (self, None);
        };
        let content = rest.strip_suffix(&[mark]).unwrap_or(rest);
        (content, Some(mark))
    }
}

fn count_blanks(row: impl IntoIterator<Item = u8>) -> usize {
    row.into_iter().take_while(|&c| c == b' ').count()
}

#[cfg(test)]
mod tests {
    use super::RowExt as _;

    #[test]
    fn blanks() {
        assert_eq!(b"  ab ".leading_blanks(), 2);
        assert_eq!(b"  ab ".trailing_blanks(), 1);
        assert_eq!(b"    ".leading_blanks(), 4);
        assert_eq!(b"".trailing_blanks(), 0);
        // hardblanks are not blanks
        assert_eq!(b"$ a".leading_blanks(), 0);
    }

    #[test]
    fn end_marks() {
        assert_eq!(b" _ @".split_end_mark(), (&b" _ "[..], Some(b'@')));
        assert_eq!(b" _ @@".split_end_mark(), (&b" _ "[..], Some(b'@')));
        // at most two marks are stripped
        assert_eq!(b"x@@@".split_end_mark(), (&b"x@"[..], Some(b'@')));
        assert_eq!(b"#".split_end_mark(), (&b""[..], Some(b'#')));
        assert_eq!(b"".split_end_mark(), (&b""[..], None));
    }
}
