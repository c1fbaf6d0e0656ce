/// Measures rendered text so the placement engine can reason about extents.
pub trait TextMeasure {
    /// Width in pixels of `text` drawn at `font_px`.
    fn text_width(&self, text: &str, font_px: f64) -> f64;
}

/// Width estimate without a font rasterizer: ASCII glyphs take roughly half an
/// em, everything else (CJK, emoji) a full em.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedMeasure {
    pub narrow_ratio: f64,
    pub wide_ratio: f64,
}

impl Default for EstimatedMeasure {
    fn default() -> Self {
        Self {
            narrow_ratio: 0.55,
            wide_ratio: 1.0,
        }
    }
}

impl TextMeasure for EstimatedMeasure {
    fn text_width(&self, text: &str, font_px: f64) -> f64 {
        text.chars()
            .map(|c| if c.is_ascii() { self.narrow_ratio } else { self.wide_ratio })
            .sum::<f64>()
            * font_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_is_narrower_than_cjk() {
        let measure = EstimatedMeasure::default();
        let ascii = measure.text_width("ab", 20.0);
        let cjk = measure.text_width("弹幕", 20.0);
        assert!((ascii - 22.0).abs() < 1e-9);
        assert!((cjk - 40.0).abs() < 1e-9);
        assert_eq!(measure.text_width("", 20.0), 0.0);
    }
}
