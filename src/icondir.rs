use crate::error::DecodeError;
use crate::restype::ResourceType;
use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::io;

//===========================================================================//

// The size of an ICONDIR header, in bytes.
const ICONDIR_LEN: usize = 6;

// The size of a single ICONDIRENTRY struct, in bytes.
const ICONDIRENTRY_LEN: usize = 16;

//===========================================================================//

/// The parsed directory of an ICO file, borrowing the file's bytes.
#[derive(Clone, Debug)]
pub struct IconDir<'a> {
    entries: Vec<IconDirEntry>,
    data: &'a [u8],
}

impl<'a> IconDir<'a> {
    /// Parses the ICONDIR header and directory entries of an ICO file.
    ///
    /// Returns [`DecodeError::NotIcoFormat`] if the header doesn't describe
    /// an icon file with at least one image; callers are expected to try a
    /// generic decoder in that case.  A nonzero reserved byte in any entry
    /// aborts the whole parse.
    pub fn parse(data: &'a [u8]) -> Result<IconDir<'a>, DecodeError> {
        if data.len() < ICONDIR_LEN {
            return Err(DecodeError::TooShortInput { len: data.len() });
        }
        let (reserved, restype, num_entries) = read_header(data)
            .map_err(|_| DecodeError::TooShortInput { len: data.len() })?;
        let resource_type = ResourceType::from_number(restype);
        if resource_type == Some(ResourceType::Cursor) {
            debug!("CUR resource; not decoding as an icon");
        }
        if reserved != 0
            || resource_type != Some(ResourceType::Icon)
            || num_entries == 0
        {
            return Err(DecodeError::NotIcoFormat {
                reserved,
                restype,
                count: num_entries,
            });
        }

        // Never look at more entries than the input can actually hold, no
        // matter what the header claims.
        let num_entries = num_entries as usize;
        let max_entries = (data.len() - ICONDIR_LEN) / ICONDIRENTRY_LEN;
        if num_entries > max_entries {
            debug!(
                "ICONDIR claims {} entries, but only {} fit in {} bytes",
                num_entries,
                max_entries,
                data.len()
            );
        }
        let num_entries = num_entries.min(max_entries);
        let mut entries = Vec::<IconDirEntry>::with_capacity(num_entries);
        for index in 0..num_entries {
            let start = ICONDIR_LEN + ICONDIRENTRY_LEN * index;
            let entry = match IconDirEntry::read(index, &data[start..]) {
                Ok(entry) => entry?,
                Err(_) => continue,
            };
            trace!(
                "ICONDIRENTRY {}: {}x{} @ {} bpp, {} bytes at offset {}",
                index,
                entry.width,
                entry.height,
                entry.bits_per_pixel,
                entry.data_size,
                entry.data_offset
            );
            entries.push(entry);
        }
        Ok(IconDir { entries, data })
    }

    /// Returns the entries in this directory.
    pub fn entries(&self) -> &[IconDirEntry] {
        &self.entries
    }

    /// Returns the entry with the largest pixel area.  If several entries
    /// share the largest area, the first one wins.
    pub fn largest_entry(&self) -> Result<&IconDirEntry, DecodeError> {
        let mut most_pixels = 0;
        let mut most = None;
        for entry in self.entries.iter() {
            let pixels = entry.pixel_area();
            if pixels > most_pixels {
                most_pixels = pixels;
                most = Some(entry);
            }
        }
        most.ok_or(DecodeError::EmptyDirectory)
    }

    /// Returns the raw, encoded image data for the given entry.
    pub fn payload(
        &self,
        entry: &IconDirEntry,
    ) -> Result<&'a [u8], DecodeError> {
        let truncated = DecodeError::TruncatedImageData {
            offset: entry.data_offset,
            size: entry.data_size,
            len: self.data.len(),
        };
        let start = entry.data_offset as usize;
        let end = match start.checked_add(entry.data_size as usize) {
            Some(end) => end,
            None => return Err(truncated),
        };
        self.data.get(start..end).ok_or(truncated)
    }
}

fn read_header(mut reader: &[u8]) -> io::Result<(u16, u16, u16)> {
    let reserved = reader.read_u16::<LittleEndian>()?;
    let restype = reader.read_u16::<LittleEndian>()?;
    let num_entries = reader.read_u16::<LittleEndian>()?;
    Ok((reserved, restype, num_entries))
}

//===========================================================================//

/// One entry in an ICO file's directory.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct IconDirEntry {
    index: usize,
    width: u32,
    height: u32,
    num_colors: u8,
    color_planes: u16,
    bits_per_pixel: u16,
    data_size: u32,
    data_offset: u32,
}

impl IconDirEntry {
    /// Reads one ICONDIRENTRY.  The outer error means the struct was cut
    /// short; the inner one means it was read but is invalid.
    fn read(
        index: usize,
        mut reader: &[u8],
    ) -> io::Result<Result<IconDirEntry, DecodeError>> {
        let width_byte = reader.read_u8()?;
        let height_byte = reader.read_u8()?;
        let num_colors = reader.read_u8()?;
        let reserved = reader.read_u8()?;
        let color_planes = reader.read_u16::<LittleEndian>()?;
        let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
        let data_size = reader.read_u32::<LittleEndian>()?;
        let data_offset = reader.read_u32::<LittleEndian>()?;
        if reserved != 0 {
            return Ok(Err(DecodeError::InvalidDirectoryEntry {
                index,
                reserved,
            }));
        }
        // A width/height byte of zero indicates a size of 256.
        let width = if width_byte == 0 { 256 } else { width_byte as u32 };
        let height = if height_byte == 0 { 256 } else { height_byte as u32 };
        Ok(Ok(IconDirEntry {
            index,
            width,
            height,
            num_colors,
            color_planes,
            bits_per_pixel,
            data_size,
            data_offset,
        }))
    }

    /// Returns the position of this entry within the directory.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the number of pixels in the image.
    pub fn pixel_area(&self) -> u32 {
        self.width * self.height
    }

    /// Returns the palette size recorded in the directory (0 means none or
    /// 256).
    pub fn num_colors(&self) -> u8 {
        self.num_colors
    }

    /// Returns the number of color planes recorded in the directory.
    pub fn color_planes(&self) -> u16 {
        self.color_planes
    }

    /// Returns the bits-per-pixel recorded in the directory.  Zero means
    /// the value has to come from the bitmap header instead.
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Returns the size of the encoded image data, in bytes.
    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    /// Returns the offset of the encoded image data from the start of the
    /// file.
    pub fn data_offset(&self) -> u32 {
        self.data_offset
    }
}

//===========================================================================//


//===========================================================================//
