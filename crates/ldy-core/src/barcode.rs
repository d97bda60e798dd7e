//! Barcode tokens and the display bitmap attached to laundry bags.
//!
//! The bitmap is a deterministic picture of the token, not a scannable
//! symbology. Staff type or scan the printed token text; nothing in the
//! system decodes the bars.

use uuid::Uuid;

pub const TOKEN_PREFIX: &str = "LDY";
pub const TOKEN_DIGITS: usize = 8;

pub const CANVAS_WIDTH: usize = 300;
pub const CANVAS_HEIGHT: usize = 120;

const BAR_TOP: usize = 20;
const BAR_WIDTH: usize = 3;
const FIRST_BAR_X: usize = 20;
const BAR_BASE_HEIGHT: u32 = 60;

/// A fresh `LDY` + 8 digit token. Uniqueness is checked by the caller.
pub fn generate_token() -> String {
    let n = Uuid::new_v4().as_u128() % 100_000_000;
    format!("{TOKEN_PREFIX}{n:0width$}", width = TOKEN_DIGITS)
}

pub fn is_token(s: &str) -> bool {
    match s.strip_prefix(TOKEN_PREFIX) {
        Some(digits) => digits.len() == TOKEN_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Monochrome bitmap, row-major, `true` = black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<bool>,
    /// Literal token printed beneath the bars.
    pub caption: String,
}

impl BarcodeImage {
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.pixels[y * self.width + x]
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.pixels[row * self.width + col] = true;
            }
        }
    }

    /// Plain PBM (`P1`). The caption travels as a comment line.
    pub fn to_pbm(&self) -> String {
        let mut out = String::with_capacity(self.width * self.height * 2 + 64);
        out.push_str("P1\n");
        for line in self.caption.lines() {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&format!("{} {}\n", self.width, self.height));
        for row in 0..self.height {
            let start = row * self.width;
            let line: Vec<&str> = self.pixels[start..start + self.width]
                .iter()
                .map(|dark| if *dark { "1" } else { "0" })
                .collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        out
    }
}

/// Draw `token` as bars: per character code `c`, three 3px bar positions
/// 4px apart, bar `j` drawn when `c + j` is even, height `60 + c % 20`.
/// Characters are separated by an extra 2px. Bars past the right edge are
/// clipped.
pub fn render_barcode(token: &str) -> BarcodeImage {
    let mut img = BarcodeImage {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        pixels: vec![false; CANVAS_WIDTH * CANVAS_HEIGHT],
        caption: token.to_string(),
    };

    let mut x = FIRST_BAR_X;
    for ch in token.chars() {
        let code = u32::from(ch);
        let height = (BAR_BASE_HEIGHT + code % 20) as usize;
        for j in 0..3u32 {
            if (code + j) % 2 == 0 && x < img.width {
                img.fill_rect(x, BAR_TOP, BAR_WIDTH, height);
            }
            x += BAR_WIDTH + 1;
        }
        x += 2;
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_have_fixed_shape() {
        for _ in 0..100 {
            let t = generate_token();
            assert!(is_token(&t), "bad token {t}");
            assert_eq!(t.len(), 11);
        }
        assert!(!is_token("LDY1234"));
        assert!(!is_token("ABC12345678"));
        assert!(!is_token("LDY1234567x"));
    }

    #[test]
    fn render_is_deterministic() {
        assert_eq!(render_barcode("LDY12345678"), render_barcode("LDY12345678"));
        assert_ne!(
            render_barcode("LDY12345678").pixels,
            render_barcode("LDY87654321").pixels
        );
    }

    #[test]
    fn first_character_bars_follow_parity() {
        // 'L' = 76: bars 0 and 2 drawn, bar 1 skipped; height 60 + 76 % 20 = 76.
        let img = render_barcode("L");
        assert!(img.is_dark(20, 20));
        assert!(img.is_dark(22, 20));
        assert!(!img.is_dark(23, 20));
        assert!(!img.is_dark(24, 20));
        assert!(img.is_dark(28, 20));
        assert!(img.is_dark(20, 20 + 75));
        assert!(!img.is_dark(20, 20 + 76));
        assert!(!img.is_dark(20, 19));
        // 'M' = 77 would start at x = 20 + 12 + 2 = 34; nothing else drawn.
        assert!(!img.is_dark(34, 20));
    }

    #[test]
    fn long_tokens_are_clipped_to_canvas() {
        let img = render_barcode(&"0".repeat(40));
        assert_eq!(img.pixels.len(), CANVAS_WIDTH * CANVAS_HEIGHT);
        // '0' = 48 draws bars 0 and 2; the last bar that fits starts at x=294.
        assert!(img.is_dark(294, BAR_TOP));
        assert!(img.is_dark(296, BAR_TOP));
        assert!(!img.is_dark(297, BAR_TOP));
        assert!(!img.is_dark(CANVAS_WIDTH, BAR_TOP));
    }

    #[test]
    fn pbm_carries_caption_and_dimensions() {
        let pbm = render_barcode("LDY00000001").to_pbm();
        let mut lines = pbm.lines();
        assert_eq!(lines.next(), Some("P1"));
        assert_eq!(lines.next(), Some("# LDY00000001"));
        assert_eq!(lines.next(), Some("300 120"));
        assert_eq!(pbm.lines().count(), 3 + CANVAS_HEIGHT);
    }
}
