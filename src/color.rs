//! Colors as stored in BMP palettes and direct-color pixel data.
//!
//! Alpha is tracked on a 0..=127 scale, where 0 is fully opaque and 127 is
//! fully transparent, until it is converted to an ordinary 8-bit RGBA pixel.

use image::Rgba;

//===========================================================================//

pub(crate) const ALPHA_OPAQUE: u8 = 0;
pub(crate) const ALPHA_TRANSPARENT: u8 = 127;

//===========================================================================//

/// A decoded BGR(A) color record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Color {
    pub(crate) red: u8,
    pub(crate) green: u8,
    pub(crate) blue: u8,
    pub(crate) alpha: u8,
}

impl Color {
    pub(crate) const CLEAR: Color =
        Color { red: 0, green: 0, blue: 0, alpha: ALPHA_TRANSPARENT };

    /// Returns the same color with its alpha forced to fully opaque.
    pub(crate) fn opaque(self) -> Color {
        Color { alpha: ALPHA_OPAQUE, ..self }
    }

    pub(crate) fn to_rgba(self) -> Rgba<u8> {
        let alpha = self.alpha.min(ALPHA_TRANSPARENT);
        let alpha = u8::MAX - ((alpha << 1) + (alpha >> 6));
        Rgba([self.red, self.green, self.blue, alpha])
    }
}

//===========================================================================//

/// What has been learned about alpha across every color decoded so far.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct AlphaStats {
    /// True if any color was neither fully opaque nor fully transparent.
    pub(crate) had_partial_alpha: bool,
    /// True if every color was fully transparent.
    pub(crate) all_fully_transparent: bool,
}

impl AlphaStats {
    pub(crate) fn new() -> AlphaStats {
        AlphaStats { had_partial_alpha: false, all_fully_transparent: true }
    }

    fn observe(self, alpha: u8) -> AlphaStats {
        AlphaStats {
            had_partial_alpha: self.had_partial_alpha
                || (alpha != ALPHA_OPAQUE && alpha != ALPHA_TRANSPARENT),
            all_fully_transparent: self.all_fully_transparent
                && alpha == ALPHA_TRANSPARENT,
        }
    }
}

/// Decodes a 3-byte (BGR) or 4-byte (BGRA) color record.  A missing alpha
/// byte means fully opaque.
pub(crate) fn decode_color(
    record: &[u8],
    stats: AlphaStats,
) -> (Color, AlphaStats) {
    debug_assert!(record.len() == 3 || record.len() == 4);
    let alpha = match record.get(3) {
        Some(&alpha) => ALPHA_TRANSPARENT - alpha / 2,
        None => ALPHA_OPAQUE,
    };
    let color = Color {
        red: record[2],
        green: record[1],
        blue: record[0],
        alpha,
    };
    (color, stats.observe(alpha))
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{decode_color, AlphaStats, Color, ALPHA_TRANSPARENT};
    use image::Rgba;

    #[test]
    fn three_byte_records_are_opaque() {
        let (color, stats) = decode_color(&[1, 2, 3], AlphaStats::new());
        assert_eq!(color, Color { red: 3, green: 2, blue: 1, alpha: 0 });
        assert_eq!(color.to_rgba(), Rgba([3, 2, 1, 255]));
        assert!(!stats.had_partial_alpha);
        assert!(!stats.all_fully_transparent);
    }

    #[test]
    fn alpha_byte_maps_onto_half_scale() {
        let (color, _) = decode_color(&[0, 0, 0, 255], AlphaStats::new());
        assert_eq!(color.alpha, 0);
        let (color, _) = decode_color(&[0, 0, 0, 254], AlphaStats::new());
        assert_eq!(color.alpha, 0);
        let (color, _) = decode_color(&[0, 0, 0, 0], AlphaStats::new());
        assert_eq!(color.alpha, ALPHA_TRANSPARENT);
        let (color, _) = decode_color(&[0, 0, 0, 128], AlphaStats::new());
        assert_eq!(color.alpha, 63);
    }

    #[test]
    fn rgba_conversion_hits_both_ends() {
        let clear = Color { red: 9, green: 8, blue: 7, alpha: 127 };
        assert_eq!(clear.to_rgba(), Rgba([9, 8, 7, 0]));
        assert_eq!(clear.opaque().to_rgba(), Rgba([9, 8, 7, 255]));
        let half = Color { red: 0, green: 0, blue: 0, alpha: 63 };
        assert_eq!(half.to_rgba(), Rgba([0, 0, 0, 129]));
    }

    #[test]
    fn stats_are_threaded_through() {
        let stats = AlphaStats::new();
        let (_, stats) = decode_color(&[0, 0, 0, 0], stats);
        assert!(stats.all_fully_transparent);
        assert!(!stats.had_partial_alpha);
        let (_, stats) = decode_color(&[0, 0, 0, 100], stats);
        assert!(!stats.all_fully_transparent);
        assert!(stats.had_partial_alpha);
        let (_, stats) = decode_color(&[0, 0, 0, 255], stats);
        assert!(stats.had_partial_alpha);
    }
}

//===========================================================================//
