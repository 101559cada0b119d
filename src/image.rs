use crate::bitmap;
use crate::error::InvalidFormatError;
use crate::icondir::IconDir;
use crate::raster;
use image::{DynamicImage, RgbaImage};
use log::debug;
use std::io::{self, Read};

//===========================================================================//

/// A decoded image.  Pixels are 8-bit RGBA, in row-major order from top to
/// bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedImage {
    pixels: RgbaImage,
    has_alpha: bool,
}

impl DecodedImage {
    pub(crate) fn from_parts(pixels: RgbaImage, has_alpha: bool) -> Self {
        DecodedImage { pixels, has_alpha }
    }

    /// Decodes an image from the contents of an ICO file, or, failing that,
    /// from a PNG, BMP, GIF or JPEG file.  For ICO files, the directory entry
    /// with the most pixels is decoded.
    pub fn decode(data: &[u8]) -> Result<DecodedImage, InvalidFormatError> {
        let icondir = match IconDir::parse(data) {
            Ok(icondir) => icondir,
            Err(error) if error.is_soft() => {
                debug!("{}; trying the generic codec", error);
                return Ok(raster::decode(data)?);
            }
            Err(error) => return Err(error.into()),
        };
        let entry = icondir.largest_entry()?;
        debug!(
            "Decoding entry {} of {} ({}x{})",
            entry.index(),
            icondir.entries().len(),
            entry.width(),
            entry.height()
        );
        let payload = icondir.payload(entry)?;
        Ok(bitmap::decode_entry(payload, entry)?)
    }

    /// Reads all of `reader` and decodes it as with
    /// [`decode`](DecodedImage::decode).  Malformed data is reported as an
    /// error of kind [`io::ErrorKind::InvalidData`].
    pub fn read<R: Read>(mut reader: R) -> io::Result<DecodedImage> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(DecodedImage::decode(&data)?)
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Returns true if the image carries an alpha channel that should be
    /// honored when compositing.  Images produced by this crate always do.
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Returns the RGBA data for this image, in row-major order from top to
    /// bottom.
    pub fn rgba_data(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Returns the RGBA value of one pixel.  Panics if the coordinates are
    /// out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    /// Returns the underlying pixel buffer.
    pub fn as_rgba_image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Unwraps the underlying pixel buffer.
    pub fn into_rgba_image(self) -> RgbaImage {
        self.pixels
    }
}

impl From<RgbaImage> for DecodedImage {
    fn from(pixels: RgbaImage) -> DecodedImage {
        DecodedImage { pixels, has_alpha: true }
    }
}

impl From<DynamicImage> for DecodedImage {
    fn from(image: DynamicImage) -> DecodedImage {
        let has_alpha = image.color().has_alpha();
        DecodedImage { pixels: image.into_rgba8(), has_alpha }
    }
}

//===========================================================================//


//===========================================================================//
