//===========================================================================//

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BmpDepth {
    One,
    Four,
    Eight,
    TwentyFour,
    ThirtyTwo,
}

impl BmpDepth {
    pub(crate) fn from_bits_per_pixel(
        bits_per_pixel: u16,
    ) -> Option<BmpDepth> {
        match bits_per_pixel {
            1 => Some(BmpDepth::One),
            4 => Some(BmpDepth::Four),
            8 => Some(BmpDepth::Eight),
            24 => Some(BmpDepth::TwentyFour),
            32 => Some(BmpDepth::ThirtyTwo),
            _ => None,
        }
    }

    pub(crate) fn bits_per_pixel(&self) -> u16 {
        match *self {
            BmpDepth::One => 1,
            BmpDepth::Four => 4,
            BmpDepth::Eight => 8,
            BmpDepth::TwentyFour => 24,
            BmpDepth::ThirtyTwo => 32,
        }
    }

    /// Returns the number of palette entries, or zero for direct-color
    /// depths.
    pub(crate) fn num_colors(&self) -> usize {
        match *self {
            BmpDepth::One => 2,
            BmpDepth::Four => 16,
            BmpDepth::Eight => 256,
            BmpDepth::TwentyFour | BmpDepth::ThirtyTwo => 0,
        }
    }

    pub(crate) fn is_indexed(&self) -> bool {
        self.num_colors() > 0
    }

    /// Returns the number of bytes holding pixels in one row of `width`
    /// pixels, not counting padding.
    pub(crate) fn row_data_size(&self, width: u32) -> usize {
        (width as usize * self.bits_per_pixel() as usize + 7) / 8
    }

    /// Returns the number of bytes in one row of `width` pixels, padded to a
    /// multiple of four.
    pub(crate) fn row_stride(&self, width: u32) -> usize {
        ((self.row_data_size(width) + 3) / 4) * 4
    }
}

//===========================================================================//


//===========================================================================//
