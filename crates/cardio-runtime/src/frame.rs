#![forbid(unsafe_code)]

//! Line-oriented render target.
//!
//! A [`Frame`] is a fixed grid of text rows. Models write whole lines; text
//! wider than the frame is cut at a character boundary by display width.

use unicode_width::UnicodeWidthChar;

/// Whole-line emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emphasis {
    #[default]
    Plain,
    Bold,
    /// Inverted colors, used for the focused line.
    Reverse,
    Dim,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Row {
    text: String,
    emphasis: Emphasis,
}

/// Fixed-size text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u16,
    height: u16,
    rows: Vec<Row>,
}

impl Frame {
    /// Blank frame.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            rows: vec![Row::default(); usize::from(height)],
        }
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Write a plain line. Returns `false` when `y` is off-frame.
    pub fn set_line(&mut self, y: u16, text: &str) -> bool {
        self.set_styled_line(y, text, Emphasis::Plain)
    }

    /// Write a line with emphasis. Returns `false` when `y` is off-frame.
    pub fn set_styled_line(&mut self, y: u16, text: &str, emphasis: Emphasis) -> bool {
        let width = usize::from(self.width);
        let Some(row) = self.rows.get_mut(usize::from(y)) else {
            return false;
        };
        row.text = truncate_to_width(text, width);
        row.emphasis = emphasis;
        true
    }

    /// Text of row `y`.
    #[must_use]
    pub fn line(&self, y: u16) -> Option<&str> {
        self.rows.get(usize::from(y)).map(|r| r.text.as_str())
    }

    /// Emphasis of row `y`.
    #[must_use]
    pub fn emphasis(&self, y: u16) -> Option<Emphasis> {
        self.rows.get(usize::from(y)).map(|r| r.emphasis)
    }

    /// Rows top to bottom with their emphasis.
    pub fn rows(&self) -> impl Iterator<Item = (&str, Emphasis)> {
        self.rows.iter().map(|r| (r.text.as_str(), r.emphasis))
    }

    /// All rows joined by newlines, trailing blank rows dropped.
    #[must_use]
    pub fn text(&self) -> String {
        let last = self
            .rows
            .iter()
            .rposition(|r| !r.text.trim_end().is_empty())
            .map_or(0, |i| i + 1);
        self.rows[..last]
            .iter()
            .map(|r| r.text.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether any row contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.rows.iter().any(|r| r.text.contains(needle))
    }

    /// Index of the first row containing `needle`.
    #[must_use]
    pub fn find_row(&self, needle: &str) -> Option<u16> {
        self.rows
            .iter()
            .position(|r| r.text.contains(needle))
            .and_then(|i| u16::try_from(i).ok())
    }
}

/// Cut `text` so its display width fits in `width` columns.
#[must_use]
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::with_capacity(text.len().min(width * 4));
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lines_are_truncated_by_width() {
        let mut f = Frame::new(5, 2);
        assert!(f.set_line(0, "abcdefgh"));
        assert_eq!(f.line(0), Some("abcde"));
        f.set_line(1, "日本語");
        assert_eq!(f.line(1), Some("日本"));
    }

    #[test]
    fn off_frame_is_rejected() {
        let mut f = Frame::new(5, 1);
        assert!(!f.set_line(1, "x"));
    }

    #[test]
    fn text_drops_trailing_blank_rows() {
        let mut f = Frame::new(10, 4);
        f.set_line(0, "one");
        f.set_styled_line(1, "two  ", Emphasis::Reverse);
        assert_eq!(f.text(), "one\ntwo");
        assert_eq!(f.emphasis(1), Some(Emphasis::Reverse));
        assert_eq!(f.find_row("two"), Some(1));
        assert!(!f.contains("three"));
    }

    #[test]
    fn empty_frame_text_is_empty() {
        assert_eq!(Frame::new(3, 3).text(), "");
    }
}
