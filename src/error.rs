use std::io;
use thiserror::Error;

//===========================================================================//

/// The reason a decode attempt failed.  These distinctions are kept for
/// diagnostics; callers of [`DecodedImage::decode`](crate::DecodedImage)
/// only ever see them wrapped in an [`InvalidFormatError`].
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DecodeError {
    /// The input is too short to hold an ICONDIR header.
    #[error("Input too short (was {len} bytes, but must be at least 6)")]
    TooShortInput {
        /// Length of the input, in bytes.
        len: usize,
    },
    /// The header does not describe an icon file with at least one image.
    #[error(
        "Not an ICO file (reserved={reserved}, type={restype}, \
         count={count})"
    )]
    NotIcoFormat {
        /// The reserved header field (must be 0).
        reserved: u16,
        /// The resource type field (must be 1).
        restype: u16,
        /// The number of directory entries (must be nonzero).
        count: u16,
    },
    /// A directory entry has a nonzero reserved byte.
    #[error(
        "Invalid reserved field value in ICONDIRENTRY {index} \
         (was {reserved}, but must be 0)"
    )]
    InvalidDirectoryEntry {
        /// Index of the offending entry.
        index: usize,
        /// The value found in the reserved byte.
        reserved: u8,
    },
    /// No directory entry describes an image with any pixels.
    #[error("No directory entry has a nonzero pixel area")]
    EmptyDirectory,
    /// The selected entry's payload lies (partly) outside the input.
    #[error(
        "Image data out of range (offset {offset}, size {size}, but input \
         is only {len} bytes)"
    )]
    TruncatedImageData {
        /// Declared payload offset.
        offset: u32,
        /// Declared payload size.
        size: u32,
        /// Length of the whole input.
        len: usize,
    },
    /// The BITMAPINFOHEADER is missing or cut short.
    #[error("Malformed BMP header: {0}")]
    MalformedBitmapHeader(String),
    /// The bitmap uses a color depth this decoder does not handle.
    #[error("Unsupported BMP bits-per-pixel ({0})")]
    UnsupportedBitDepth(u16),
    /// The payload ends before all of the color data has been read.
    #[error(
        "Pixel data too short (needed {needed} bytes, but only {available} \
         remain)"
    )]
    InsufficientPixelData {
        /// Bytes required.
        needed: u64,
        /// Bytes actually left in the payload.
        available: u64,
    },
    /// Neither the ICO decoder nor the generic raster codec could make
    /// sense of the data.
    #[error("Unrecognized image format: {0}")]
    UnrecognizedFormat(String),
}

impl DecodeError {
    /// Returns true if this error only means "try something else" rather
    /// than a terminal failure.
    pub fn is_soft(&self) -> bool {
        matches!(self, DecodeError::NotIcoFormat { .. })
    }
}

//===========================================================================//

/// The single error surfaced when image construction fails.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("Invalid image format: {cause}")]
pub struct InvalidFormatError {
    #[source]
    cause: DecodeError,
}

impl InvalidFormatError {
    /// Returns the underlying reason the input was rejected.
    pub fn cause(&self) -> &DecodeError {
        &self.cause
    }

    /// Unwraps the underlying reason the input was rejected.
    pub fn into_cause(self) -> DecodeError {
        self.cause
    }
}

impl From<DecodeError> for InvalidFormatError {
    fn from(cause: DecodeError) -> InvalidFormatError {
        InvalidFormatError { cause }
    }
}

impl From<InvalidFormatError> for io::Error {
    fn from(error: InvalidFormatError) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, error)
    }
}

impl From<DecodeError> for io::Error {
    fn from(error: DecodeError) -> io::Error {
        InvalidFormatError::from(error).into()
    }
}

//===========================================================================//


//===========================================================================//
