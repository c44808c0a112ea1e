//! Page textures, blend colors and the provider that fills them.

use pagecurl_core::{Color, TexRect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSide {
    Front,
    Back,
    Both,
}

/// Texture ids, source rect and blend colors for one sheet.
#[derive(Clone, Debug)]
pub struct TexturePage {
    color_front: Color,
    color_back: Color,
    texture_front: Option<u32>,
    texture_back: Option<u32>,
    rect_texture: Option<TexRect>,
    page: usize,
    textures_changed: bool,
}

impl TexturePage {
    pub fn new() -> Self {
        Self {
            color_front: Color::WHITE,
            color_back: Color::WHITE,
            texture_front: None,
            texture_back: None,
            rect_texture: None,
            page: 0,
            textures_changed: false,
        }
    }

    /// Blend color for a side. `Both` reads the back color.
    pub fn color(&self, side: PageSide) -> Color {
        match side {
            PageSide::Front => self.color_front,
            PageSide::Back | PageSide::Both => self.color_back,
        }
    }

    pub fn set_color(&mut self, color: Color, side: PageSide) {
        match side {
            PageSide::Front => self.color_front = color,
            PageSide::Back => self.color_back = color,
            PageSide::Both => {
                self.color_front = color;
                self.color_back = color;
            }
        }
    }

    pub fn set_texture(
        &mut self,
        side: PageSide,
        page: usize,
        texture_id: Option<u32>,
        rect: Option<TexRect>,
    ) {
        self.page = page;
        self.rect_texture = rect;
        match side {
            PageSide::Front => self.texture_front = texture_id,
            PageSide::Back => self.texture_back = texture_id,
            PageSide::Both => {
                self.texture_front = texture_id;
                self.texture_back = texture_id;
            }
        }
        self.textures_changed = true;
    }

    /// True unless both sides carry the same texture id.
    pub fn has_back_texture(&self) -> bool {
        match (self.texture_front, self.texture_back) {
            (Some(front), Some(back)) => front != back,
            _ => true,
        }
    }

    #[inline]
    pub fn textures_changed(&self) -> bool {
        self.textures_changed
    }

    /// Marks pending texture changes as consumed by the draw step.
    #[inline]
    pub fn acknowledge(&mut self) {
        self.textures_changed = false;
    }

    pub(crate) fn mark_changed(&mut self) {
        self.textures_changed = true;
    }

    /// White on both sides, nothing pending. Texture ids are kept.
    pub fn reset(&mut self) {
        self.color_front = Color::WHITE;
        self.color_back = Color::WHITE;
        self.acknowledge();
    }

    #[inline]
    pub fn rect_texture(&self) -> Option<TexRect> {
        self.rect_texture
    }

    pub fn set_rect_texture(&mut self, rect: Option<TexRect>) {
        self.rect_texture = rect;
    }

    #[inline]
    pub fn texture_front(&self) -> Option<u32> {
        self.texture_front
    }

    #[inline]
    pub fn texture_back(&self) -> Option<u32> {
        self.texture_back
    }

    #[inline]
    pub fn page(&self) -> usize {
        self.page
    }
}

impl Default for TexturePage {
    fn default() -> Self {
        Self::new()
    }
}

/// Supplies page content to a book. Implementations decode images and
/// own the texture ids; the mesh only stores ids and rects.
pub trait PageProvider {
    fn page_count(&self) -> usize;

    /// Fill `page` for page `index` (`0..page_count()`).
    fn update_page(&mut self, page: &mut TexturePage, index: usize);

    /// Pixel size a page will be drawn at.
    fn set_page_size(&mut self, _width: u32, _height: u32) {}
}
