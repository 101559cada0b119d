//! Aspect-preserving resizing onto a transparent, letterboxed canvas.

use crate::image::DecodedImage;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::debug;
use std::borrow::Cow;

//===========================================================================//

/// Where a resized image lands on its canvas.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Letterbox {
    pub(crate) canvas_width: u32,
    pub(crate) canvas_height: u32,
    pub(crate) x: u32,
    pub(crate) y: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Letterbox {
    /// Fits a `src_width`x`src_height` image into the given bounds.  Returns
    /// `None` if neither bound is set, meaning the image is left alone.  A
    /// bound of zero counts as unset.
    ///
    /// Unless `allow_enlarge` is set, a bound larger than the image does not
    /// scale the image up; the canvas still takes the bound's size and the
    /// image is centered on it.  The fitted size is rounded to the nearest
    /// pixel and the centering offsets round down.
    pub(crate) fn fit(
        src_width: u32,
        src_height: u32,
        max_width: Option<u32>,
        max_height: Option<u32>,
        allow_enlarge: bool,
    ) -> Option<Letterbox> {
        let max_width = max_width.filter(|&width| width > 0);
        let max_height = max_height.filter(|&height| height > 0);
        if max_width.is_none() && max_height.is_none() {
            return None;
        }
        let mut fit_width = match max_width {
            Some(width) if allow_enlarge || width <= src_width => width,
            _ => src_width,
        } as f64;
        let mut fit_height = match max_height {
            Some(height) if allow_enlarge || height <= src_height => height,
            _ => src_height,
        } as f64;
        let ratio = src_width as f64 / src_height as f64;
        if fit_width / fit_height > ratio {
            fit_width = fit_height * ratio;
        } else {
            fit_height = fit_width / ratio;
        }
        let width = (fit_width.round() as u32).max(1);
        let height = (fit_height.round() as u32).max(1);
        let canvas_width = max_width.unwrap_or(width);
        let canvas_height = max_height.unwrap_or(height);
        Some(Letterbox {
            canvas_width,
            canvas_height,
            x: canvas_width.saturating_sub(width) / 2,
            y: canvas_height.saturating_sub(height) / 2,
            width,
            height,
        })
    }
}

//===========================================================================//

impl DecodedImage {
    /// Scales the image to fit within `max_width` x `max_height`, keeping
    /// its aspect ratio, and centers it on a transparent canvas of that size.
    /// A missing bound takes the fitted image's size on that axis.  Images
    /// are only scaled up if `allow_enlarge` is set.
    ///
    /// If both bounds are `None`, the image itself is returned, borrowed;
    /// otherwise a new image is returned, owned.  The input is never
    /// modified.
    ///
    /// # Panics
    ///
    /// Panics if the canvas size in bytes overflows `usize`.  A canvas too
    /// large to allocate aborts the process, as with any other allocation,
    /// so callers passing untrusted bounds should cap them first.
    pub fn resize(
        &self,
        max_width: Option<u32>,
        max_height: Option<u32>,
        allow_enlarge: bool,
    ) -> Cow<'_, DecodedImage> {
        let letterbox = match Letterbox::fit(
            self.width(),
            self.height(),
            max_width,
            max_height,
            allow_enlarge,
        ) {
            Some(letterbox) => letterbox,
            None => return Cow::Borrowed(self),
        };
        debug!(
            "Resizing {}x{} to {}x{} at ({}, {}) on a {}x{} canvas",
            self.width(),
            self.height(),
            letterbox.width,
            letterbox.height,
            letterbox.x,
            letterbox.y,
            letterbox.canvas_width,
            letterbox.canvas_height
        );
        let resampled = imageops::resize(
            self.as_rgba_image(),
            letterbox.width,
            letterbox.height,
            FilterType::Triangle,
        );
        let mut canvas = RgbaImage::from_pixel(
            letterbox.canvas_width,
            letterbox.canvas_height,
            Rgba([0, 0, 0, 0]),
        );
        imageops::overlay(
            &mut canvas,
            &resampled,
            letterbox.x as i64,
            letterbox.y as i64,
        );
        Cow::Owned(DecodedImage::from_parts(canvas, true))
    }
}

//===========================================================================//


//===========================================================================//
