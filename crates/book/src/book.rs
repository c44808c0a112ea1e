//! Book controller: owns the left, right and curl meshes, routes touch
//! input through the solver and swaps meshes when a turn completes.

use std::time::{Duration, Instant};

use mesh::{MeshHandle, PageProvider};
use pagecurl_core::{Color, CoreError, CoreResult, DVec2};

use crate::animation::{AnimationTarget, CurlAnimation};
use crate::config::{BookConfig, Margins};
use crate::layout::{Page, PageLayout, ViewMode};
use crate::solver::{self, CurlCommand, CurlState, SolverInput};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
}

/// Single pointer sample in surface pixels (y down).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub x: f64,
    pub y: f64,
    pub pressure: f64,
}

impl TouchEvent {
    pub fn new(action: TouchAction, x: f64, y: f64) -> Self {
        Self {
            action,
            x,
            y,
            pressure: solver::DEFAULT_PRESSURE,
        }
    }
}

pub struct Book {
    config: BookConfig,
    layout: PageLayout,
    provider: Option<Box<dyn PageProvider + Send>>,
    page_left: MeshHandle,
    page_right: MeshHandle,
    page_curl: MeshHandle,
    /// Meshes to draw, back to front.
    visible: Vec<MeshHandle>,
    current_index: usize,
    curl_state: CurlState,
    drag_start: DVec2,
    pointer: DVec2,
    pressure: f64,
    animation: Option<CurlAnimation>,
    allow_last_page_curl: bool,
    render_left_page: bool,
}

impl Book {
    pub fn new(config: BookConfig) -> Self {
        let splits = config.max_curl_splits;
        let page_left = MeshHandle::new(splits);
        let page_right = MeshHandle::new(splits);
        let page_curl = MeshHandle::new(splits);
        page_left.set_flip_texture(true);
        page_right.set_flip_texture(false);

        Self {
            layout: PageLayout::new(&config),
            allow_last_page_curl: config.allow_last_page_curl,
            render_left_page: config.render_left_page,
            config,
            provider: None,
            page_left,
            page_right,
            page_curl,
            visible: Vec::with_capacity(3),
            current_index: 0,
            curl_state: CurlState::None,
            drag_start: DVec2::ZERO,
            pointer: DVec2::ZERO,
            pressure: solver::DEFAULT_PRESSURE,
            animation: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    #[inline]
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[inline]
    pub fn curl_state(&self) -> CurlState {
        self.curl_state
    }

    #[inline]
    pub fn view_mode(&self) -> ViewMode {
        self.layout.view_mode()
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    #[inline]
    pub fn background(&self) -> Color {
        self.config.background_color()
    }

    pub fn page_count(&self) -> usize {
        self.provider.as_ref().map_or(0, |p| p.page_count())
    }

    /// Meshes to draw this frame, back to front.
    #[inline]
    pub fn visible_meshes(&self) -> &[MeshHandle] {
        &self.visible
    }

    pub fn mesh(&self, page: Page) -> &MeshHandle {
        match page {
            Page::Left => &self.page_left,
            Page::Right => &self.page_right,
        }
    }

    #[inline]
    pub fn curl_mesh(&self) -> &MeshHandle {
        &self.page_curl
    }

    pub fn set_allow_last_page_curl(&mut self, allow: bool) {
        self.allow_last_page_curl = allow;
    }

    pub fn set_render_left_page(&mut self, render: bool) {
        self.render_left_page = render;
    }

    pub fn set_page_provider(&mut self, mut provider: Box<dyn PageProvider + Send>) {
        if let Some((w, h)) = self.layout.page_size() {
            provider.set_page_size(w, h);
        }
        log::info!("Page provider set: {} pages", provider.page_count());
        self.provider = Some(provider);
        self.current_index = 0;
        self.update_pages();
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if let Some((w, h)) = self.layout.set_viewport(width, height) {
            self.on_page_size_changed(w, h);
        }
    }

    pub fn set_margins(&mut self, margins: Margins) {
        if let Some((w, h)) = self.layout.set_margins(margins) {
            self.on_page_size_changed(w, h);
        }
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.page_left.set_flip_texture(mode == ViewMode::One);
        if let Some((w, h)) = self.layout.set_view_mode(mode) {
            self.on_page_size_changed(w, h);
        }
    }

    pub fn set_current_index(&mut self, index: usize) {
        self.current_index = match &self.provider {
            None => 0,
            Some(p) if self.allow_last_page_curl => index.min(p.page_count()),
            Some(p) => index.min(p.page_count().saturating_sub(1)),
        };
        self.update_pages();
    }

    /// Like `set_current_index`, but rejects indices past the last allowed page.
    pub fn jump_to(&mut self, index: usize) -> CoreResult<()> {
        let count = self.page_count();
        let last = if self.allow_last_page_curl {
            count
        } else {
            count.saturating_sub(1)
        };
        if index > last {
            return Err(CoreError::PageOutOfRange { index, count });
        }
        self.set_current_index(index);
        Ok(())
    }

    /// Drops cached texture ids on every mesh, e.g. after the host lost
    /// its graphics context.
    pub fn reset_textures(&self) {
        for mesh in [&self.page_left, &self.page_right, &self.page_curl] {
            mesh.reset_texture();
        }
    }

    fn on_page_size_changed(&mut self, width: u32, height: u32) {
        if let Some(p) = self.provider.as_mut() {
            p.set_page_size(width, height);
        }
        self.update_pages();
    }

    /// Handles a pointer sample. Returns false when the event is ignored.
    pub fn on_touch(&mut self, event: TouchEvent) -> bool {
        if self.animation.is_some() {
            return false;
        }
        let Some(count) = self.provider.as_ref().map(|p| p.page_count()) else {
            return false;
        };
        let right = self.layout.page_rect(Page::Right);
        let left = self.layout.page_rect(Page::Left);

        self.pointer = self.layout.translate(event.x, event.y);
        self.pressure = if self.config.touch_pressure {
            event.pressure
        } else {
            solver::DEFAULT_PRESSURE
        };

        match event.action {
            TouchAction::Down => {
                let mut start = self.pointer;
                start.y = start.y.clamp(right.bottom, right.top);
                let last_blocked = !self.allow_last_page_curl && self.current_index + 1 >= count;

                let split = match self.view_mode() {
                    ViewMode::Two => right.left,
                    ViewMode::One => right.center_x(),
                };
                if start.x < split && self.current_index > 0 {
                    start.x = match self.view_mode() {
                        ViewMode::Two => left.left,
                        ViewMode::One => right.left,
                    };
                    self.drag_start = start;
                    self.start_curl(CurlState::Left);
                    if self.view_mode() == ViewMode::One {
                        self.remove_visible(&self.page_left.clone());
                    }
                } else if start.x >= split && self.current_index < count {
                    if last_blocked {
                        return false;
                    }
                    start.x = right.right;
                    self.drag_start = start;
                    self.start_curl(CurlState::Right);
                }

                if self.curl_state == CurlState::None {
                    return false;
                }
                self.update_curl_pos(self.pointer);
            }
            TouchAction::Move => {
                if self.curl_state != CurlState::None {
                    self.update_curl_pos(self.pointer);
                }
            }
            TouchAction::Up | TouchAction::Cancel => {
                if self.curl_state != CurlState::None {
                    self.start_release(Instant::now());
                }
            }
        }
        true
    }

    /// Advances the release animation. Returns true while a redraw is needed.
    pub fn on_frame(&mut self, now: Instant) -> bool {
        let Some(anim) = self.animation else {
            return false;
        };
        if self.view_mode() == ViewMode::One {
            self.render_left_page = false;
        }

        if !anim.is_finished(now) {
            self.update_curl_pos(anim.position_at(now));
            return true;
        }

        match anim.event() {
            AnimationTarget::SetCurlToRight => {
                std::mem::swap(&mut self.page_right, &mut self.page_curl);
                self.page_right
                    .place(self.layout.page_rect(Page::Right), false);
                self.remove_visible(&self.page_curl.clone());
                if self.curl_state == CurlState::Left {
                    self.current_index = self.current_index.saturating_sub(1);
                }
            }
            AnimationTarget::SetCurlToLeft => {
                std::mem::swap(&mut self.page_left, &mut self.page_curl);
                self.page_left.place(self.layout.page_rect(Page::Left), true);
                self.remove_visible(&self.page_curl.clone());
                if !self.render_left_page {
                    self.remove_visible(&self.page_left.clone());
                }
                if self.curl_state == CurlState::Right {
                    self.current_index += 1;
                }
            }
        }
        log::debug!(
            "Turn finished ({:?}), current page {}",
            anim.event(),
            self.current_index
        );
        self.curl_state = CurlState::None;
        self.animation = None;
        true
    }

    fn start_release(&mut self, now: Instant) {
        let right = self.layout.page_rect(Page::Right);
        let left = self.layout.page_rect(Page::Left);
        let to_right = match self.view_mode() {
            ViewMode::One => self.pointer.x > right.center_x(),
            ViewMode::Two => self.pointer.x > right.left,
        };

        let mut target = self.drag_start;
        let event = if to_right {
            target.x = right.right;
            AnimationTarget::SetCurlToRight
        } else {
            target.x = if self.curl_state == CurlState::Right || self.view_mode() == ViewMode::Two {
                left.left
            } else {
                right.left
            };
            AnimationTarget::SetCurlToLeft
        };

        let duration = Duration::from_millis(self.config.animation_ms);
        log::debug!("Release toward {:?} from {:?}", event, self.pointer);
        self.animation = Some(CurlAnimation::new(
            self.pointer,
            target,
            event,
            now,
            duration,
        ));
    }

    fn start_curl(&mut self, side: CurlState) {
        let count = self.page_count();
        let right = self.layout.page_rect(Page::Right);
        let left = self.layout.page_rect(Page::Left);
        self.clear_visible();

        match side {
            CurlState::Right => {
                std::mem::swap(&mut self.page_right, &mut self.page_curl);
                if self.current_index > 0 {
                    self.page_left.place(left, true);
                    if self.render_left_page {
                        self.add_visible(self.page_left.clone());
                    }
                }
                if self.current_index + 1 < count {
                    self.load_page(Page::Right, self.current_index + 1);
                    self.page_right.place(right, false);
                    self.add_visible(self.page_right.clone());
                }
                self.page_curl.place(right, false);
            }
            CurlState::Left => {
                std::mem::swap(&mut self.page_left, &mut self.page_curl);
                if self.current_index > 1 {
                    self.load_page(Page::Left, self.current_index - 2);
                    self.page_left.place(left, true);
                    self.add_visible(self.page_left.clone());
                }
                if self.current_index < count {
                    self.page_right.place(right, false);
                    self.add_visible(self.page_right.clone());
                }
                if self.view_mode() == ViewMode::One
                    || (self.curl_state == CurlState::Left && self.view_mode() == ViewMode::Two)
                {
                    self.page_curl.place(right, false);
                } else {
                    self.page_curl.place(left, true);
                }
            }
            CurlState::None => return,
        }
        self.add_visible(self.page_curl.clone());
        self.curl_state = side;
        log::debug!("Curl started ({:?}) at page {}", side, self.current_index);
    }

    fn update_curl_pos(&mut self, pointer: DVec2) {
        let right = self.layout.page_rect(Page::Right);
        let input = SolverInput {
            pointer,
            drag_start: self.drag_start,
            state: self.curl_state,
            view_mode: self.view_mode(),
            left_page: self.layout.page_rect(Page::Left),
            right_page: right,
            radius: solver::nominal_radius(right.width(), self.pressure),
        };
        match solver::solve(&input) {
            CurlCommand::Curl { pos, dir, radius } => self.page_curl.curl(pos, dir, radius),
            CurlCommand::Reset => self.page_curl.reset(),
        }
    }

    /// Reloads all three meshes for the current index and curl state.
    pub fn update_pages(&mut self) {
        let Some(count) = self.provider.as_ref().map(|p| p.page_count()) else {
            return;
        };
        if self.layout.page_size().is_none_or(|(w, h)| w == 0 || h == 0) {
            return;
        }
        self.clear_visible();

        let index = self.current_index as isize;
        let mut left_idx = index - 1;
        let mut right_idx = index;
        let mut curl_idx = -1;
        match self.curl_state {
            CurlState::Left => {
                curl_idx = left_idx;
                left_idx -= 1;
            }
            CurlState::Right => {
                curl_idx = right_idx;
                right_idx += 1;
            }
            CurlState::None => {}
        }
        let in_range = |i: isize| i >= 0 && (i as usize) < count;

        let right = self.layout.page_rect(Page::Right);
        let left = self.layout.page_rect(Page::Left);
        if in_range(right_idx) {
            self.load_page(Page::Right, right_idx as usize);
            self.page_right.place(right, false);
            self.add_visible(self.page_right.clone());
        }
        if in_range(left_idx) {
            self.load_page(Page::Left, left_idx as usize);
            self.page_left.place(left, true);
            if self.render_left_page {
                self.add_visible(self.page_left.clone());
            }
        }
        if in_range(curl_idx) {
            let mesh = self.page_curl.clone();
            if let Some(p) = self.provider.as_mut() {
                load_into(p.as_mut(), &mesh, curl_idx as usize);
            }
            match (self.curl_state, self.view_mode()) {
                (CurlState::Left, ViewMode::Two) => mesh.place(left, true),
                _ => mesh.place(right, false),
            }
            self.add_visible(mesh);
        }
    }

    fn load_page(&mut self, page: Page, index: usize) {
        let mesh = self.mesh(page).clone();
        if let Some(p) = self.provider.as_mut() {
            load_into(p.as_mut(), &mesh, index);
        }
    }

    fn add_visible(&mut self, mesh: MeshHandle) {
        self.remove_visible(&mesh);
        self.visible.push(mesh);
    }

    fn remove_visible(&mut self, mesh: &MeshHandle) {
        self.visible.retain(|m| !m.ptr_eq(mesh));
    }

    fn clear_visible(&mut self) {
        self.visible.clear();
    }
}

/// The provider fills a detached copy; the mesh lock is only taken to
/// read the current page and to swap the filled one in.
fn load_into(provider: &mut (dyn PageProvider + Send), mesh: &MeshHandle, index: usize) {
    let mut page = mesh.with_page(|page| page.clone());
    page.reset();
    provider.update_page(&mut page, index);
    mesh.with_page(|current| *current = page);
}
