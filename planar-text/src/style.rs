//! The slice of resolved element style the interaction layer reads.

/// Horizontal alignment of lines within the text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextAlign {
    /// Lines start at the left edge.
    #[default]
    Left,
    /// Lines are centered. `middle` in stylesheets resolves here too.
    Center,
    /// Lines end at the right edge.
    Right,
}

impl TextAlign {
    /// Parses a resolved `text-align` value. Unknown values fall back to
    /// [`TextAlign::Left`].
    pub fn from_css(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "center" | "middle" => Self::Center,
            "right" | "end" => Self::Right,
            _ => Self::Left,
        }
    }

    /// Offset of a line of `line_width` inside a box of `total_width`.
    pub fn line_offset(self, total_width: f32, line_width: f32) -> f32 {
        let slack = (total_width - line_width).max(0.0);
        match self {
            Self::Left => 0.0,
            Self::Center => slack * 0.5,
            Self::Right => slack,
        }
    }
}

/// Resolved style of a text element, as produced by the style cascade.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextStyle {
    /// Line alignment.
    pub text_align: TextAlign,
    /// Font size in CSS pixels.
    pub font_size: f32,
    /// Line height in CSS pixels.
    pub line_height: f32,
    /// Width of the visible field for clipped single-line inputs.
    pub clip_width: Option<f32>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text_align: TextAlign::Left,
            font_size: 16.0,
            line_height: 19.2,
            clip_width: None,
        }
    }
}

impl TextStyle {
    /// Sets the alignment.
    pub fn with_align(mut self, text_align: TextAlign) -> Self {
        self.text_align = text_align;
        self
    }

    /// Sets the visible field width of a clipped input.
    pub fn with_clip_width(mut self, clip_width: f32) -> Self {
        self.clip_width = Some(clip_width);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_css_alignment() {
        assert_eq!(TextAlign::from_css("center"), TextAlign::Center);
        assert_eq!(TextAlign::from_css(" Middle "), TextAlign::Center);
        assert_eq!(TextAlign::from_css("right"), TextAlign::Right);
        assert_eq!(TextAlign::from_css("justify"), TextAlign::Left);
    }

    #[test]
    fn line_offset_uses_slack() {
        assert_eq!(TextAlign::Left.line_offset(100.0, 40.0), 0.0);
        assert_eq!(TextAlign::Center.line_offset(100.0, 40.0), 30.0);
        assert_eq!(TextAlign::Right.line_offset(100.0, 40.0), 60.0);
        assert_eq!(TextAlign::Right.line_offset(40.0, 100.0), 0.0);
    }
}
