use crate::bmpdepth::BmpDepth;
use crate::color::{decode_color, AlphaStats, Color};
use crate::error::DecodeError;
use crate::icondir::IconDirEntry;
use crate::image::DecodedImage;
use crate::raster;
use byteorder::{LittleEndian, ReadBytesExt};
use image::{Rgba, RgbaImage};
use log::{debug, trace};
use std::io::{self, Cursor, Read};

//===========================================================================//

// The size of a BITMAPINFOHEADER struct, in bytes.
const BMP_HEADER_LEN: u32 = 40;

//===========================================================================//

/// Decodes the image data of an ICO directory entry.  PNG-compressed entries
/// (and anything else the generic codec recognizes) are handed off to it;
/// everything else is parsed as a headered DIB followed by an AND mask.
pub(crate) fn decode_entry(
    payload: &[u8],
    entry: &IconDirEntry,
) -> Result<DecodedImage, DecodeError> {
    match raster::decode(payload) {
        Ok(image) => {
            debug!("Entry {} holds a compressed image", entry.index());
            return Ok(image);
        }
        Err(error) => {
            trace!("Entry {} is not a raster file ({})", entry.index(), error)
        }
    }
    decode_dib(payload, entry.width(), entry.height(), entry.bits_per_pixel())
}

/// Decodes a DIB payload of the given size.  If `bits_per_pixel` is zero,
/// the color depth is taken from the BITMAPINFOHEADER instead.
pub(crate) fn decode_dib(
    payload: &[u8],
    width: u32,
    height: u32,
    bits_per_pixel: u16,
) -> Result<DecodedImage, DecodeError> {
    let mut reader = Cursor::new(payload);
    let header_size = reader.read_u32::<LittleEndian>().map_err(|_| {
        DecodeError::MalformedBitmapHeader(format!(
            "payload is only {} bytes",
            payload.len()
        ))
    })?;
    let mut bits_per_pixel = bits_per_pixel;
    if header_size == BMP_HEADER_LEN {
        let header_bits_per_pixel =
            read_info_header(&mut reader).map_err(|_| {
                DecodeError::MalformedBitmapHeader(format!(
                    "BITMAPINFOHEADER cut short ({} bytes)",
                    payload.len()
                ))
            })?;
        if bits_per_pixel == 0 {
            bits_per_pixel = header_bits_per_pixel;
        }
    }
    let depth = match BmpDepth::from_bits_per_pixel(bits_per_pixel) {
        Some(depth) => depth,
        None => return Err(DecodeError::UnsupportedBitDepth(bits_per_pixel)),
    };
    if header_size as u64 > payload.len() as u64 {
        return Err(DecodeError::MalformedBitmapHeader(format!(
            "header size is {}, but payload is only {} bytes",
            header_size,
            payload.len()
        )));
    }
    reader.set_position(header_size as u64);

    // Read in the color table:
    let mut stats = AlphaStats::new();
    let num_colors = depth.num_colors();
    let mut palette = Vec::<Color>::with_capacity(num_colors);
    let mut record = [0u8; 4];
    for _ in 0..num_colors {
        if reader.read_exact(&mut record).is_err() {
            return Err(DecodeError::InsufficientPixelData {
                needed: 4 * num_colors as u64,
                available: remaining(&reader),
            });
        }
        let (color, new_stats) = decode_color(&record, stats);
        stats = new_stats;
        palette.push(color);
    }
    // Some icons leave every alpha byte in the color table at zero; that is
    // filler, not an invisible icon.
    if depth.is_indexed() && stats.all_fully_transparent {
        debug!("Color table is entirely transparent; treating it as opaque");
        for color in palette.iter_mut() {
            *color = color.opaque();
        }
    }

    // Read in the color ("XOR") data, which is stored row by row, starting
    // from the *bottom* row:
    let num_pixels = (width as usize) * (height as usize);
    let needed_bits = (bits_per_pixel as u64) * (num_pixels as u64);
    if remaining(&reader) * 8 < needed_bits {
        return Err(DecodeError::InsufficientPixelData {
            needed: (needed_bits + 7) / 8,
            available: remaining(&reader),
        });
    }
    let width = width as usize;
    let row_data_size = depth.row_data_size(width as u32);
    let row_padding_size = depth.row_stride(width as u32) - row_data_size;
    let mut row_data = vec![0u8; row_data_size];
    let mut xor = vec![Color::CLEAR; num_pixels];
    for row in 0..(height as usize) {
        // Skipped padding can leave the last row short; its missing bytes
        // read as zero.
        row_data.fill(0);
        read_partial(&mut reader, &mut row_data);
        let start = (height as usize - row - 1) * width;
        let pixels = &mut xor[start..(start + width)];
        match depth {
            BmpDepth::One => {
                for (col, pixel) in pixels.iter_mut().enumerate() {
                    let index = (row_data[col / 8] >> (7 - col % 8)) & 0x1;
                    *pixel = palette[index as usize];
                }
            }
            BmpDepth::Four => {
                for (col, pixel) in pixels.iter_mut().enumerate() {
                    let shift = 4 * (1 - col % 2);
                    let index = (row_data[col / 2] >> shift) & 0xf;
                    *pixel = palette[index as usize];
                }
            }
            BmpDepth::Eight => {
                for (col, pixel) in pixels.iter_mut().enumerate() {
                    *pixel = palette[row_data[col] as usize];
                }
            }
            BmpDepth::TwentyFour | BmpDepth::ThirtyTwo => {
                let record_len = (bits_per_pixel / 8) as usize;
                for (pixel, record) in
                    pixels.iter_mut().zip(row_data.chunks_exact(record_len))
                {
                    let (color, new_stats) = decode_color(record, stats);
                    stats = new_stats;
                    *pixel = color;
                }
            }
        }
        skip(&mut reader, row_padding_size);
    }

    let mut canvas =
        RgbaImage::from_pixel(width as u32, height, Rgba([0, 0, 0, 0]));

    // Read in the AND mask (1 bit per pixel), which again is stored row by
    // row, starting from the *bottom* row, with each row padded to a multiple
    // of four bytes.  It is ignored if the color data carried real alpha
    // values or if there isn't enough data left for it.
    let mask_fits = remaining(&reader) * 8 >= num_pixels as u64;
    if stats.had_partial_alpha || !mask_fits {
        debug!(
            "Skipping AND mask (partial alpha: {}, mask fits: {})",
            stats.had_partial_alpha, mask_fits
        );
        for (index, color) in xor.iter().enumerate() {
            let (col, row) = (index % width, index / width);
            canvas.put_pixel(col as u32, row as u32, color.to_rgba());
        }
    } else {
        let mask_data_size = BmpDepth::One.row_data_size(width as u32);
        let mask_padding_size =
            BmpDepth::One.row_stride(width as u32) - mask_data_size;
        let mut mask_data = vec![0u8; mask_data_size];
        for row in 0..(height as usize) {
            // Bits missing from a short final row read as zero.
            mask_data.fill(0);
            read_partial(&mut reader, &mut mask_data);
            let y = height as usize - row - 1;
            for col in 0..width {
                if (mask_data[col / 8] >> (7 - col % 8)) & 0x1 == 0 {
                    let color = xor[y * width + col];
                    canvas.put_pixel(col as u32, y as u32, color.to_rgba());
                }
            }
            skip(&mut reader, mask_padding_size);
        }
    }

    Ok(DecodedImage::from_parts(canvas, true))
}

/// Reads the remainder of a BITMAPINFOHEADER (after its size field) and
/// returns its bits-per-pixel.
fn read_info_header<R: Read>(reader: &mut R) -> io::Result<u16> {
    let width = reader.read_i32::<LittleEndian>()?;
    let height = reader.read_i32::<LittleEndian>()?;
    let _planes = reader.read_u16::<LittleEndian>()?;
    let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
    let _compression = reader.read_u32::<LittleEndian>()?;
    let _image_size = reader.read_u32::<LittleEndian>()?;
    let _horz_ppm = reader.read_i32::<LittleEndian>()?;
    let _vert_ppm = reader.read_i32::<LittleEndian>()?;
    let _colors_used = reader.read_u32::<LittleEndian>()?;
    let _colors_important = reader.read_u32::<LittleEndian>()?;
    trace!(
        "BITMAPINFOHEADER: {}x{} (doubled height) @ {} bpp",
        width,
        height,
        bits_per_pixel
    );
    Ok(bits_per_pixel)
}

fn remaining(reader: &Cursor<&[u8]>) -> u64 {
    (reader.get_ref().len() as u64).saturating_sub(reader.position())
}

fn skip(reader: &mut Cursor<&[u8]>, num_bytes: usize) {
    let position = reader.position() + num_bytes as u64;
    reader.set_position(position);
}

/// Fills as much of `buffer` as the reader has left, leaving the rest
/// untouched.
fn read_partial(reader: &mut Cursor<&[u8]>, buffer: &mut [u8]) {
    let data = *reader.get_ref();
    let start = (reader.position() as usize).min(data.len());
    let available = (data.len() - start).min(buffer.len());
    buffer[..available].copy_from_slice(&data[start..(start + available)]);
    skip(reader, available);
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::decode_dib;
    use crate::error::DecodeError;
    use byteorder::{LittleEndian, WriteBytesExt};

    fn info_header(width: i32, height: i32, bits_per_pixel: u16) -> Vec<u8> {
        let mut data = Vec::new();
        data.write_u32::<LittleEndian>(40).unwrap();
        data.write_i32::<LittleEndian>(width).unwrap();
        data.write_i32::<LittleEndian>(2 * height).unwrap();
        data.write_u16::<LittleEndian>(1).unwrap();
        data.write_u16::<LittleEndian>(bits_per_pixel).unwrap();
        data.extend_from_slice(&[0u8; 24]);
        data
    }

    #[test]
    fn decode_1bpp() {
        let mut input = info_header(2, 2, 1);
        input.extend_from_slice(
            b"\
            \x55\x00\x55\x00\xff\xff\xff\x00\
            \
            \xc0\x00\x00\x00\
            \x40\x00\x00\x00\
            \
            \x40\x00\x00\x00\
            \x00\x00\x00\x00",
        );
        let image = decode_dib(&input, 2, 2, 1).unwrap();
        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 2);
        assert!(image.has_alpha());
        let rgba: &[u8] = b"\
            \x55\x00\x55\xff\xff\xff\xff\xff\
            \xff\xff\xff\xff\x00\x00\x00\x00";
        assert_eq!(image.rgba_data(), rgba);
    }

    #[test]
    fn decode_4bpp() {
        let mut input = info_header(5, 3, 4);
        input.extend_from_slice(
            b"\
            \x00\x00\x00\x00\x00\x00\x00\x00\
            \x00\x00\x7f\x00\x00\x00\xff\x00\
            \x00\x7f\x00\x00\x00\xff\x00\x00\
            \x00\x7f\x7f\x00\x00\xff\xff\x00\
            \x7f\x00\x00\x00\xff\x00\x00\x00\
            \x7f\x00\x7f\x00\xff\x00\xff\x00\
            \x7f\x7f\x00\x00\xff\xff\x00\x00\
            \x7f\x7f\x7f\x00\xff\xff\xff\x00\
            \
            \x0f\x35\x00\x00\
            \xf3\x59\x10\x00\
            \x05\x91\x00\x00\
            \
            \x88\x00\x00\x00\
            \x00\x00\x00\x00\
            \x88\x00\x00\x00",
        );
        let image = decode_dib(&input, 5, 3, 4).unwrap();
        let rgba: &[u8] = b"\
            \x00\x00\x00\x00\x00\xff\x00\xff\x00\x00\xff\xff\
            \x00\x00\x00\xff\x00\x00\x00\x00\
            \xff\xff\xff\xff\xff\x00\x00\xff\x00\xff\x00\xff\
            \x00\x00\xff\xff\x00\x00\x00\xff\
            \x00\x00\x00\x00\xff\xff\xff\xff\xff\x00\x00\xff\
            \x00\xff\x00\xff\x00\x00\x00\x00";
        assert_eq!(image.rgba_data(), rgba);
    }

    #[test]
    fn decode_8bpp_with_row_padding() {
        let mut input = info_header(3, 2, 8);
        for index in 0..256u32 {
            let index = index as u8;
            input.extend_from_slice(&[index, 0x10, 255 - index, 0]);
        }
        // Bottom row, then top row; each padded from 3 to 4 bytes.
        input.extend_from_slice(b"\x01\x02\x03\xee\x04\x05\x06\xee");
        // Mask: transparent in the middle of the bottom row.
        input.extend_from_slice(b"\x40\x00\x00\x00\x00\x00\x00\x00");
        let image = decode_dib(&input, 3, 2, 8).unwrap();
        assert_eq!(image.pixel(0, 0), [251, 0x10, 4, 255]);
        assert_eq!(image.pixel(1, 0), [250, 0x10, 5, 255]);
        assert_eq!(image.pixel(2, 0), [249, 0x10, 6, 255]);
        assert_eq!(image.pixel(0, 1), [254, 0x10, 1, 255]);
        assert_eq!(image.pixel(1, 1), [0, 0, 0, 0]);
        assert_eq!(image.pixel(2, 1), [252, 0x10, 3, 255]);
    }

    #[test]
    fn bits_per_pixel_from_header() {
        let mut input = info_header(1, 2, 24);
        // Two 24-bpp rows, each padded to 4 bytes.
        input.extend_from_slice(b"\x01\x02\x03\x00\x04\x05\x06\x00");
        // Mask hides the bottom pixel.
        input.extend_from_slice(b"\x80\x00\x00\x00\x00\x00\x00\x00");
        let image = decode_dib(&input, 1, 2, 0).unwrap();
        assert_eq!(image.pixel(0, 0), [6, 5, 4, 255]);
        assert_eq!(image.pixel(0, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn core_header_is_skipped() {
        let mut input = b"\x0c\x00\x00\x00\xaa\xaa\xaa\xaa\xaa\xaa\xaa\xaa"
            .to_vec();
        input.extend_from_slice(b"\x10\x20\x30\x00");
        let image = decode_dib(&input, 1, 1, 24).unwrap();
        assert_eq!(image.pixel(0, 0), [0x30, 0x20, 0x10, 255]);
    }

    #[test]
    fn partial_alpha_ignores_mask() {
        let mut input = info_header(2, 1, 32);
        input.extend_from_slice(b"\x0a\x14\x1e\x80\x01\x02\x03\xff");
        input.extend_from_slice(b"\xc0\x00\x00\x00");
        let image = decode_dib(&input, 2, 1, 32).unwrap();
        assert_eq!(image.pixel(0, 0), [0x1e, 0x14, 0x0a, 129]);
        assert_eq!(image.pixel(1, 0), [3, 2, 1, 255]);
    }

    #[test]
    fn partial_alpha_in_palette_ignores_mask() {
        let mut input = info_header(2, 1, 1);
        input.extend_from_slice(b"\x00\x00\xff\x80\x00\xff\x00\xff");
        input.extend_from_slice(b"\x40\x00\x00\x00");
        input.extend_from_slice(b"\xc0\x00\x00\x00");
        let image = decode_dib(&input, 2, 1, 1).unwrap();
        assert_eq!(image.pixel(0, 0), [0xff, 0, 0, 129]);
        assert_eq!(image.pixel(1, 0), [0, 0xff, 0, 255]);
    }

    #[test]
    fn opaque_32bpp_uses_mask() {
        let mut input = info_header(2, 1, 32);
        input.extend_from_slice(b"\x0a\x14\x1e\xff\x01\x02\x03\xff");
        input.extend_from_slice(b"\x80\x00\x00\x00");
        let image = decode_dib(&input, 2, 1, 32).unwrap();
        assert_eq!(image.pixel(0, 0), [0, 0, 0, 0]);
        assert_eq!(image.pixel(1, 0), [3, 2, 1, 255]);
    }

    #[test]
    fn missing_mask_writes_every_pixel() {
        let mut input = info_header(2, 1, 24);
        input.extend_from_slice(b"\x01\x02\x03\x04\x05\x06\x00\x00");
        let image = decode_dib(&input, 2, 1, 24).unwrap();
        assert_eq!(image.pixel(0, 0), [3, 2, 1, 255]);
        assert_eq!(image.pixel(1, 0), [6, 5, 4, 255]);
    }

    #[test]
    fn short_mask_rows_read_as_zero() {
        let mut input = info_header(1, 8, 32);
        input.extend_from_slice(&[1, 2, 3, 255].repeat(8));
        // Only the bottom mask row is present, and it is unpadded.
        input.push(0x80);
        let image = decode_dib(&input, 1, 8, 32).unwrap();
        assert_eq!(image.pixel(0, 7), [0, 0, 0, 0]);
        for y in 0..7 {
            assert_eq!(image.pixel(0, y), [3, 2, 1, 255]);
        }
    }

    #[test]
    fn unpadded_last_row_reads_as_zero() {
        let mut input = info_header(1, 2, 24);
        input.extend_from_slice(b"\x01\x02\x03\x00\x04\x05");
        let image = decode_dib(&input, 1, 2, 24).unwrap();
        assert_eq!(image.pixel(0, 1), [3, 2, 1, 255]);
        assert_eq!(image.pixel(0, 0), [0, 5, 4, 255]);
    }

    #[test]
    fn short_1bpp_rows_read_as_zero() {
        let mut input = info_header(1, 8, 1);
        input.extend_from_slice(b"\x00\x00\xff\x00\x00\xff\x00\x00");
        // One byte is enough for 8 one-bit pixels, but each row is padded
        // to 4 bytes.
        input.push(0x80);
        let image = decode_dib(&input, 1, 8, 1).unwrap();
        assert_eq!(image.pixel(0, 7), [0, 0xff, 0, 255]);
        for y in 0..7 {
            assert_eq!(image.pixel(0, y), [0xff, 0, 0, 255]);
        }
    }

    #[test]
    fn unsupported_bit_depth() {
        let input = info_header(1, 1, 16);
        assert_eq!(
            decode_dib(&input, 1, 1, 0).unwrap_err(),
            DecodeError::UnsupportedBitDepth(16)
        );
        assert_eq!(
            decode_dib(&input, 1, 1, 2).unwrap_err(),
            DecodeError::UnsupportedBitDepth(2)
        );
    }

    #[test]
    fn insufficient_pixel_data() {
        let mut input = info_header(4, 4, 32);
        input.extend_from_slice(&[0xff; 60]);
        assert_eq!(
            decode_dib(&input, 4, 4, 32).unwrap_err(),
            DecodeError::InsufficientPixelData { needed: 64, available: 60 }
        );
    }

    #[test]
    fn truncated_palette() {
        let mut input = info_header(1, 1, 8);
        input.extend_from_slice(&[0u8; 100]);
        assert!(matches!(
            decode_dib(&input, 1, 1, 8),
            Err(DecodeError::InsufficientPixelData { .. })
        ));
    }

    #[test]
    fn malformed_header() {
        assert!(matches!(
            decode_dib(b"\x28\x00", 1, 1, 32),
            Err(DecodeError::MalformedBitmapHeader(_))
        ));
        assert!(matches!(
            decode_dib(&info_header(1, 1, 32)[..20], 1, 1, 32),
            Err(DecodeError::MalformedBitmapHeader(_))
        ));
        assert!(matches!(
            decode_dib(b"\x00\x01\x00\x00\x00\x00", 1, 1, 32),
            Err(DecodeError::MalformedBitmapHeader(_))
        ));
    }
}

//===========================================================================//
