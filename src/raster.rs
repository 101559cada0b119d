use crate::error::DecodeError;
use crate::image::DecodedImage;
use image::RgbaImage;
use log::debug;

//===========================================================================//

// The signature that all PNG files start with.
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G'];

// Size limits for decoded images:
const MIN_WIDTH: u32 = 1;
const MIN_HEIGHT: u32 = 1;

//===========================================================================//

/// Returns true if the data is encoded as a PNG.
pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(PNG_SIGNATURE)
}

/// Decodes a complete PNG, BMP, GIF or JPEG file.  The result always
/// reports an alpha channel, whatever the source format supports.
pub(crate) fn decode(data: &[u8]) -> Result<DecodedImage, DecodeError> {
    let pixels = if is_png(data) {
        read_png(data)?
    } else {
        match image::load_from_memory(data) {
            Ok(image) => image.into_rgba8(),
            Err(error) => {
                return Err(DecodeError::UnrecognizedFormat(error.to_string()))
            }
        }
    };
    debug!(
        "Decoded {}x{} image with the generic codec",
        pixels.width(),
        pixels.height()
    );
    Ok(DecodedImage::from_parts(pixels, true))
}

fn read_png(data: &[u8]) -> Result<RgbaImage, DecodeError> {
    let malformed = |error: png::DecodingError| {
        DecodeError::UnrecognizedFormat(format!("Malformed PNG data: {}", error))
    };
    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(
        png::Transformations::EXPAND | png::Transformations::STRIP_16,
    );
    let mut png_reader = decoder.read_info().map_err(malformed)?;
    validate_png_info(png_reader.info())?;
    let mut buffer = vec![0u8; png_reader.output_buffer_size()];
    let frame = png_reader.next_frame(&mut buffer).map_err(malformed)?;
    buffer.truncate(frame.buffer_size());
    if frame.bit_depth != png::BitDepth::Eight {
        return Err(DecodeError::UnrecognizedFormat(format!(
            "Unsupported PNG bit depth: {:?}",
            frame.bit_depth
        )));
    }
    let rgba_data = match frame.color_type {
        png::ColorType::Rgba => buffer,
        png::ColorType::Rgb => {
            let mut rgba = Vec::with_capacity(buffer.len() / 3 * 4);
            for rgb in buffer.chunks_exact(3) {
                rgba.extend_from_slice(rgb);
                rgba.push(u8::MAX);
            }
            rgba
        }
        png::ColorType::GrayscaleAlpha => {
            let mut rgba = Vec::with_capacity(buffer.len() * 2);
            for gray_alpha in buffer.chunks_exact(2) {
                let gray = gray_alpha[0];
                rgba.extend_from_slice(&[gray, gray, gray, gray_alpha[1]]);
            }
            rgba
        }
        png::ColorType::Grayscale => {
            let mut rgba = Vec::with_capacity(buffer.len() * 4);
            for gray in buffer.into_iter() {
                rgba.extend_from_slice(&[gray, gray, gray, u8::MAX]);
            }
            rgba
        }
        png::ColorType::Indexed => {
            // EXPAND turns palette indices into RGB(A), so this only shows
            // up if the decoder ignored the transformation.
            return Err(DecodeError::UnrecognizedFormat(
                "Unexpanded indexed PNG data".to_string(),
            ));
        }
    };
    RgbaImage::from_raw(frame.width, frame.height, rgba_data).ok_or_else(
        || {
            DecodeError::UnrecognizedFormat(
                "PNG data length doesn't match its dimensions".to_string(),
            )
        },
    )
}

fn validate_png_info(info: &png::Info) -> Result<(), DecodeError> {
    if info.width < MIN_WIDTH || info.height < MIN_HEIGHT {
        return Err(DecodeError::UnrecognizedFormat(format!(
            "Invalid PNG size (was {}x{}, but must be at least {}x{})",
            info.width, info.height, MIN_WIDTH, MIN_HEIGHT
        )));
    }
    Ok(())
}

//===========================================================================//


//===========================================================================//
