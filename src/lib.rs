//! A library for decoding the largest image out of ICO files.
//!
//! Given the bytes of an ICO file, [`DecodedImage::decode`] picks the
//! directory entry with the most pixels and decodes it, whether it is stored
//! as a PNG or as a classic BMP with an AND mask.  Input that isn't an ICO
//! file at all (a mislabeled PNG, BMP, GIF or JPEG, say) is decoded with a
//! generic codec instead.  Decoded images can then be resized with
//! [`DecodedImage::resize`], which letterboxes them onto a transparent
//! canvas.
//!
//! # Example
//!
//! ```no_run
//! use icoread::DecodedImage;
//! let file = std::fs::File::open("favicon.ico").unwrap();
//! let image = DecodedImage::read(file).unwrap();
//! let thumbnail = image.resize(Some(32), Some(32), false);
//! assert_eq!(thumbnail.width(), 32);
//! assert_eq!(thumbnail.height(), 32);
//! ```
//!
//! [`DecodedImage::resize`] returns a [`Cow`](std::borrow::Cow), which
//! borrows the input when no bounds are given.  Use `into_owned` to keep the
//! result or to chain another resize:
//!
//! ```no_run
//! # let image: icoread::DecodedImage = unimplemented!();
//! let banner = image.resize(Some(64), None, true).into_owned();
//! let icon = banner.resize(Some(16), Some(16), false).into_owned();
//! assert_eq!(icon.width(), 16);
//! ```

#![warn(missing_docs)]

mod bitmap;
mod bmpdepth;
mod color;
mod error;
mod icondir;
mod image;
mod raster;
mod resize;
mod restype;

pub use crate::error::{DecodeError, InvalidFormatError};
pub use crate::icondir::{IconDir, IconDirEntry};
pub use crate::image::DecodedImage;
pub use crate::raster::is_png;
