//! View and page rectangles, and pixel to view-space translation.

use pagecurl_core::{DVec2, PageRect};
use serde::{Deserialize, Serialize};

use crate::config::{BookConfig, Margins};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Single page; the left page sits just off screen.
    #[default]
    One,
    /// Facing pages split at the middle of the view.
    Two,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct PageLayout {
    view_mode: ViewMode,
    margins: Margins,
    view_top: f64,
    view_bottom: f64,
    viewport: (u32, u32),
    view_rect: PageRect,
    left: PageRect,
    right: PageRect,
    page_size: Option<(u32, u32)>,
}

impl PageLayout {
    pub fn new(config: &BookConfig) -> Self {
        Self {
            view_mode: config.view_mode,
            margins: config.margins,
            view_top: config.view_top,
            view_bottom: config.view_bottom,
            viewport: (0, 0),
            view_rect: PageRect::default(),
            left: PageRect::default(),
            right: PageRect::default(),
            page_size: None,
        }
    }

    #[inline]
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    #[inline]
    pub fn view_rect(&self) -> PageRect {
        self.view_rect
    }

    #[inline]
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Last reported page size in pixels.
    #[inline]
    pub fn page_size(&self) -> Option<(u32, u32)> {
        self.page_size
    }

    pub fn page_rect(&self, page: Page) -> PageRect {
        match page {
            Page::Left => self.left,
            Page::Right => self.right,
        }
    }

    /// Recomputes the view rect for a new surface size. Returns the page
    /// pixel size when the page rects were rebuilt.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> Option<(u32, u32)> {
        self.viewport = (width, height);
        if width == 0 || height == 0 {
            log::warn!("Ignoring empty viewport {}x{}", width, height);
            self.view_rect = PageRect::default();
            return None;
        }
        let ratio = width as f64 / height as f64;
        let mut view = PageRect::new(-ratio, self.view_top, ratio, self.view_bottom);
        let fitted_width = ratio * view.height();
        let delta = view.width() - fitted_width;
        view.left += delta / 2.0;
        view.right -= delta / 2.0;
        self.view_rect = view;
        self.update_page_rects()
    }

    pub fn set_margins(&mut self, margins: Margins) -> Option<(u32, u32)> {
        self.margins = margins;
        self.update_page_rects()
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Option<(u32, u32)> {
        self.view_mode = mode;
        self.update_page_rects()
    }

    /// Maps a surface pixel (y down) into view space (y up).
    pub fn translate(&self, x: f64, y: f64) -> DVec2 {
        let (w, h) = self.viewport;
        let v = &self.view_rect;
        DVec2::new(
            v.left + v.width() * x / w.max(1) as f64,
            v.top - v.height() * y / h.max(1) as f64,
        )
    }

    fn update_page_rects(&mut self) -> Option<(u32, u32)> {
        let view = self.view_rect;
        if view.is_empty() {
            return None;
        }
        let m = self.margins;
        let mut area = view;
        area.left += view.width() * m.left;
        area.right -= view.width() * m.right;
        area.top -= view.height() * m.top;
        area.bottom += view.height() * m.bottom;

        match self.view_mode {
            ViewMode::One => {
                self.right = area;
                self.left = area.offset(-area.width(), 0.0);
            }
            ViewMode::Two => {
                let mid = area.center_x();
                self.left = PageRect { right: mid, ..area };
                self.right = PageRect { left: mid, ..area };
            }
        }

        let (vw, vh) = self.viewport;
        let page_w = (self.right.width() * vw as f64 / view.width()) as u32;
        let page_h = (self.right.height() * vh as f64 / view.height()) as u32;
        log::info!(
            "Page rects updated ({:?}): page {}x{} px",
            self.view_mode,
            page_w,
            page_h
        );
        self.page_size = Some((page_w, page_h));
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn one_page_fills_view_and_parks_left_page() {
        let mut l = PageLayout::new(&BookConfig::default());
        assert_eq!(l.set_viewport(400, 800), Some((400, 800)));
        let v = l.view_rect();
        assert!(approx(v.left, -0.5) && approx(v.right, 0.5));
        assert_eq!(l.page_rect(Page::Right), v);
        let left = l.page_rect(Page::Left);
        assert!(approx(left.right, v.left));
        assert!(approx(left.width(), v.width()));
    }

    #[test]
    fn two_pages_split_at_center() {
        let cfg = BookConfig {
            view_mode: ViewMode::Two,
            ..Default::default()
        };
        let mut l = PageLayout::new(&cfg);
        assert_eq!(l.set_viewport(1600, 800), Some((800, 800)));
        let (left, right) = (l.page_rect(Page::Left), l.page_rect(Page::Right));
        assert!(approx(left.right, 0.0) && approx(right.left, 0.0));
        assert!(approx(left.left, -2.0) && approx(right.right, 2.0));
    }

    #[test]
    fn margins_shrink_page() {
        let mut l = PageLayout::new(&BookConfig::default());
        l.set_viewport(800, 800);
        let size = l.set_margins(Margins::new(0.1, 0.25, 0.1, 0.25));
        assert_eq!(size, Some((640, 400)));
        let r = l.page_rect(Page::Right);
        assert!(approx(r.left, -0.8) && approx(r.right, 0.8));
        assert!(approx(r.top, 0.5) && approx(r.bottom, -0.5));
    }

    #[test]
    fn translate_flips_y() {
        let mut l = PageLayout::new(&BookConfig::default());
        l.set_viewport(800, 400);
        let top_left = l.translate(0.0, 0.0);
        assert!(approx(top_left.x, -2.0) && approx(top_left.y, 1.0));
        let center = l.translate(400.0, 200.0);
        assert!(approx(center.x, 0.0) && approx(center.y, 0.0));
        let bottom_right = l.translate(800.0, 400.0);
        assert!(approx(bottom_right.x, 2.0) && approx(bottom_right.y, -1.0));
    }

    #[test]
    fn no_rects_before_viewport() {
        let mut l = PageLayout::new(&BookConfig::default());
        assert_eq!(l.set_view_mode(ViewMode::Two), None);
        assert_eq!(l.set_viewport(0, 10), None);
        assert_eq!(l.page_size(), None);
    }
}
