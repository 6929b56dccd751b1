//! CPU-side color texture sourced from the color map.

use std::path::Path;

use image::RgbaImage;

use crate::core::{Error, Result, Rgba};
use crate::terrain::config::FilterMode;

/// RGBA8 projection of the color map, one texel per grid cell.
///
/// The display shell uploads `pixels()` whenever `take_dirty()` reports a
/// change; the revision counter lets it detect changes without consuming
/// the flag.
#[derive(Clone, Debug)]
pub struct ColorTexture {
    width: u32,
    height: u32,
    filter_mode: FilterMode,
    pixels: Vec<u8>,
    dirty: bool,
    revision: u64,
}

impl ColorTexture {
    pub fn new(width: u32, height: u32, filter_mode: FilterMode) -> Self {
        Self {
            width,
            height,
            filter_mode,
            pixels: vec![0; width as usize * height as usize * 4],
            dirty: true,
            revision: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn texel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    pub fn set_filter_mode(&mut self, filter_mode: FilterMode) {
        if self.filter_mode != filter_mode {
            self.filter_mode = filter_mode;
            self.mark_dirty();
        }
    }

    /// Raw RGBA8 bytes, row-major like the color map
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Copy the whole color map into the texture.
    pub fn sync(&mut self, colors: &[Rgba]) -> Result<()> {
        if colors.len() != self.texel_count() {
            return Err(Error::LengthMismatch {
                expected: self.texel_count(),
                actual: colors.len(),
            });
        }
        for (texel, color) in self.pixels.chunks_exact_mut(4).zip(colors) {
            texel.copy_from_slice(&color.to_rgba8());
        }
        self.mark_dirty();
        Ok(())
    }

    /// Write a single texel. Out-of-range indices are ignored.
    pub fn set_texel(&mut self, index: usize, color: Rgba) -> bool {
        match self.pixels.get_mut(index * 4..index * 4 + 4) {
            Some(texel) => {
                texel.copy_from_slice(&color.to_rgba8());
                true
            }
            None => false,
        }
    }

    pub fn texel(&self, index: usize) -> Option<[u8; 4]> {
        let texel = self.pixels.get(index * 4..index * 4 + 4)?;
        Some([texel[0], texel[1], texel[2], texel[3]])
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns whether the texture changed since the last call and clears
    /// the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn to_image(&self) -> Result<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or(
            Error::LengthMismatch {
                expected: self.texel_count() * 4,
                actual: self.pixels.len(),
            },
        )
    }

    /// Export as PNG (format picked from the extension).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.to_image()?.save(path.as_ref())?;
        log::info!("Saved {}x{} color texture to {:?}", self.width, self.height, path.as_ref());
        Ok(())
    }
}
