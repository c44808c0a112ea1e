//! Page provider backed by a directory of PNG files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use mesh::{PageProvider, PageSide, TexturePage};
use pagecurl_core::TexRect;

use crate::texture::TextureData;

/// Serves the `.png` files of a directory, sorted by file name, one file
/// per page. Page `i` uses texture id `i` on both sides; decoded and
/// padded textures are kept for upload by the host and reused on reload.
pub struct DirectoryProvider {
    pages: Vec<PathBuf>,
    textures: HashMap<u32, TextureData>,
    rects: HashMap<u32, TexRect>,
    page_size: Option<(u32, u32)>,
}

impl DirectoryProvider {
    pub fn open(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read page directory {}", dir.display()))?;

        let mut pages = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to list {}", dir.display()))?
                .path();
            let is_png = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if path.is_file() && is_png {
                pages.push(path);
            }
        }
        pages.sort();
        log::info!("Found {} pages in {}", pages.len(), dir.display());
        Ok(Self::from_paths(pages))
    }

    pub fn from_paths(pages: Vec<PathBuf>) -> Self {
        Self {
            pages,
            textures: HashMap::new(),
            rects: HashMap::new(),
            page_size: None,
        }
    }

    pub fn page_path(&self, index: usize) -> Option<&Path> {
        self.pages.get(index).map(PathBuf::as_path)
    }

    /// Padded texture for a texture id handed out by `update_page`.
    pub fn texture(&self, id: u32) -> Option<&TextureData> {
        self.textures.get(&id)
    }

    #[inline]
    pub fn page_size(&self) -> Option<(u32, u32)> {
        self.page_size
    }

    fn decode(&self, index: usize) -> TextureData {
        let Some(path) = self.page_path(index) else {
            return TextureData::blank();
        };
        match TextureData::load_png(path) {
            Ok(tex) => tex,
            Err(err) => {
                log::warn!("Page {} unreadable, using a blank page: {:#}", index, err);
                TextureData::blank()
            }
        }
    }
}

impl PageProvider for DirectoryProvider {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn update_page(&mut self, page: &mut TexturePage, index: usize) {
        let id = index as u32;
        let rect = match self.rects.get(&id) {
            Some(&rect) => rect,
            None => {
                let (texture, rect) = self.decode(index).pad_to_power_of_two();
                self.textures.insert(id, texture);
                self.rects.insert(id, rect);
                rect
            }
        };
        page.set_texture(PageSide::Both, index, Some(id), Some(rect));
    }

    fn set_page_size(&mut self, width: u32, height: u32) {
        if self.page_size != Some((width, height)) {
            log::debug!("Page size now {}x{}", width, height);
            self.page_size = Some((width, height));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pagecurl-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(path: &Path, w: u32, h: u32) {
        image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn pages_are_sorted_pngs() {
        let dir = scratch_dir("sorted");
        write_png(&dir.join("b.png"), 2, 2);
        write_png(&dir.join("a.png"), 2, 2);
        std::fs::write(dir.join("notes.txt"), "skip me").unwrap();

        let p = DirectoryProvider::open(&dir).unwrap();
        assert_eq!(p.page_count(), 2);
        assert_eq!(p.page_path(0).unwrap().file_name().unwrap(), "a.png");
        assert_eq!(p.page_path(1).unwrap().file_name().unwrap(), "b.png");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn update_page_pads_and_assigns_both_sides() {
        let dir = scratch_dir("update");
        write_png(&dir.join("page.png"), 3, 4);
        let mut p = DirectoryProvider::open(&dir).unwrap();

        let mut page = TexturePage::new();
        p.update_page(&mut page, 0);
        assert_eq!(page.texture_front(), Some(0));
        assert_eq!(page.texture_back(), Some(0));
        assert!(!page.has_back_texture());
        assert!(page.textures_changed());
        assert_eq!(page.rect_texture(), Some(TexRect::new(0.0, 0.0, 0.75, 1.0)));

        let tex = p.texture(0).unwrap();
        assert_eq!((tex.width, tex.height), (4, 4));
        assert_eq!(tex.pixel(0, 0), [10, 20, 30, 255]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn reloading_a_page_reuses_the_decoded_texture() {
        let dir = scratch_dir("cached");
        let path = dir.join("page.png");
        write_png(&path, 3, 4);
        let mut p = DirectoryProvider::open(&dir).unwrap();
        let mut page = TexturePage::new();
        p.update_page(&mut page, 0);

        // A decode now would fall back to a blank page.
        std::fs::write(&path, b"not a png").unwrap();
        let mut again = TexturePage::new();
        p.update_page(&mut again, 0);
        assert_eq!(again.rect_texture(), Some(TexRect::new(0.0, 0.0, 0.75, 1.0)));
        assert_eq!(p.texture(0).unwrap().pixel(0, 0), [10, 20, 30, 255]);
        assert!(again.textures_changed());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unreadable_page_falls_back_to_blank() {
        let dir = scratch_dir("broken");
        std::fs::write(dir.join("broken.png"), b"not a png").unwrap();
        let mut p = DirectoryProvider::open(&dir).unwrap();
        let mut page = TexturePage::new();
        p.update_page(&mut page, 0);
        assert_eq!(p.texture(0), Some(&TextureData::blank()));
        assert_eq!(page.rect_texture(), Some(TexRect::FULL));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(DirectoryProvider::open("/nonexistent/pages").is_err());
    }
}
