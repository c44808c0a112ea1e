//! Page textures.

use std::path::Path;

use anyhow::Context;
use pagecurl_core::{Color, TexRect};

/// RGBA8 texture data before upload.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Smallest power of two `>= n`; 0 maps to 0.
pub fn next_power_of_two(n: u32) -> u32 {
    if n == 0 { 0 } else { n.next_power_of_two() }
}

impl TextureData {
    pub const BYTES_PER_PIXEL: usize = 4;

    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        assert_eq!(
            data.len(),
            width as usize * height as usize * Self::BYTES_PER_PIXEL,
            "Data size doesn't match RGBA8 format"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// Texture filled with one color.
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let px = [color.red(), color.green(), color.blue(), color.alpha()];
        let data = px.repeat(width as usize * height as usize);
        Self::new_rgba8(width, height, data)
    }

    /// 1x1 white stand-in for pages whose image is missing.
    pub fn blank() -> Self {
        Self::solid(1, 1, Color::WHITE)
    }

    pub fn load_png<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading page image {}", path.display());

        let img = image::open(path)
            .with_context(|| format!("Failed to open image {}", path.display()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self::new_rgba8(width, height, rgba.into_raw()))
    }

    /// Checkerboard with 8px cells.
    pub fn create_test_texture(size: u32) -> Self {
        let mut data = Vec::with_capacity(size as usize * size as usize * Self::BYTES_PER_PIXEL);
        for y in 0..size {
            for x in 0..size {
                if ((x / 8) + (y / 8)) % 2 == 0 {
                    data.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    data.extend_from_slice(&[128, 128, 128, 255]);
                }
            }
        }
        Self::new_rgba8(size, size, data)
    }

    pub fn is_power_of_two(&self) -> bool {
        self.width.is_power_of_two() && self.height.is_power_of_two()
    }

    /// Copies the image into the top-left corner of a power-of-two sized
    /// transparent texture. The returned rect covers the original image.
    pub fn pad_to_power_of_two(&self) -> (TextureData, TexRect) {
        let new_w = next_power_of_two(self.width).max(1);
        let new_h = next_power_of_two(self.height).max(1);
        let rect = TexRect::new(
            0.0,
            0.0,
            self.width as f32 / new_w as f32,
            self.height as f32 / new_h as f32,
        );
        if new_w == self.width && new_h == self.height {
            return (self.clone(), rect);
        }

        let mut data = vec![0u8; new_w as usize * new_h as usize * Self::BYTES_PER_PIXEL];
        let src_row = self.width as usize * Self::BYTES_PER_PIXEL;
        let dst_row = new_w as usize * Self::BYTES_PER_PIXEL;
        for (y, row) in self.data.chunks_exact(src_row.max(1)).enumerate() {
            let start = y * dst_row;
            data[start..start + src_row].copy_from_slice(row);
        }
        (Self::new_rgba8(new_w, new_h, data), rect)
    }

    /// RGBA of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * Self::BYTES_PER_PIXEL;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}
