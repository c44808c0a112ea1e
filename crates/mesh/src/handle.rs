//! Mesh-scoped lock. Every curl, reset, texture edit and draw goes
//! through the same mutex and completes before the next one starts.

use std::sync::Arc;

use glam::DVec2;
use pagecurl_core::PageRect;
use parking_lot::{Mutex, MutexGuard};

use crate::curl::{CurlMesh, MeshDraw};
use crate::page::TexturePage;

#[derive(Clone)]
pub struct MeshHandle(Arc<Mutex<CurlMesh>>);

impl MeshHandle {
    pub fn new(max_curl_splits: usize) -> Self {
        Self::from_mesh(CurlMesh::new(max_curl_splits))
    }

    pub fn from_mesh(mesh: CurlMesh) -> Self {
        Self(Arc::new(Mutex::new(mesh)))
    }

    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, CurlMesh> {
        self.0.lock()
    }

    /// `None` while another caller holds the mesh.
    #[inline]
    pub fn try_lock(&self) -> Option<MutexGuard<'_, CurlMesh>> {
        self.0.try_lock()
    }

    pub fn curl(&self, pos: DVec2, dir: DVec2, radius: f64) {
        self.lock().curl(pos, dir, radius);
    }

    pub fn reset(&self) {
        self.lock().reset();
    }

    pub fn set_rect(&self, rect: PageRect) {
        self.lock().set_rect(rect);
    }

    pub fn set_flip_texture(&self, flip: bool) {
        self.lock().set_flip_texture(flip);
    }

    pub fn reset_texture(&self) {
        self.lock().reset_texture();
    }

    /// Rect, flip and reset in one locked step.
    pub fn place(&self, rect: PageRect, flip: bool) {
        let mut mesh = self.lock();
        mesh.set_rect(rect);
        mesh.set_flip_texture(flip);
        mesh.reset();
    }

    pub fn with_page<R>(&self, f: impl FnOnce(&mut TexturePage) -> R) -> R {
        f(self.lock().texture_page_mut())
    }

    /// Runs the draw step and hands the buffers to `f` while locked.
    pub fn draw<R>(&self, f: impl FnOnce(MeshDraw<'_>) -> R) -> R {
        let mut mesh = self.lock();
        f(mesh.prepare_draw())
    }

    #[inline]
    pub fn ptr_eq(&self, other: &MeshHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for MeshHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MeshHandle")
            .field(&Arc::as_ptr(&self.0))
            .finish()
    }
}
