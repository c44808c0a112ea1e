//! Draw step. Locks each visible mesh, runs its draw preparation and
//! flattens the result into a `Frame`: packed vertex arrays plus an
//! ordered list of triangle-strip draw calls for the host's graphics API.

use bytemuck::{Pod, Zeroable};
use mesh::{MeshDraw, MeshHandle};
use pagecurl_core::Color;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SurfaceVertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

impl SurfaceVertex {
    pub const STRIDE: usize = std::mem::size_of::<SurfaceVertex>();
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ShadowVertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

impl ShadowVertex {
    pub const STRIDE: usize = std::mem::size_of::<ShadowVertex>();
}

/// Which vertex array a draw call reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Surface,
    Shadow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    DropShadow,
    FrontBlank,
    FrontTextured,
    BackBlank,
    BackTextured,
    SelfShadow,
}

impl Pass {
    pub fn source(self) -> Source {
        match self {
            Pass::DropShadow | Pass::SelfShadow => Source::Shadow,
            _ => Source::Surface,
        }
    }

    /// Blank faces are drawn opaque; everything else is alpha blended.
    pub fn blended(self) -> bool {
        !matches!(self, Pass::FrontBlank | Pass::BackBlank)
    }
}

/// Triangle strip over `first..first + count` of the pass's vertex array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub pass: Pass,
    pub first: u32,
    pub count: u32,
    pub texture: Option<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub clear_color: [f32; 4],
    pub surface: Vec<SurfaceVertex>,
    pub shadow: Vec<ShadowVertex>,
    pub calls: Vec<DrawCall>,
}

impl Frame {
    pub fn surface_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.surface)
    }

    pub fn shadow_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.shadow)
    }

    pub fn calls_for(&self, pass: Pass) -> impl Iterator<Item = &DrawCall> {
        self.calls.iter().filter(move |c| c.pass == pass)
    }

    fn clear(&mut self) {
        self.surface.clear();
        self.shadow.clear();
        self.calls.clear();
    }
}

/// Reuses one `Frame` across builds.
pub struct FrameBuilder {
    background: Color,
    frame: Frame,
}

/// Strips shorter than this rasterize nothing.
const MIN_STRIP: usize = 3;

impl FrameBuilder {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            frame: Frame::default(),
        }
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    #[inline]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Builds the frame for `meshes`, drawn in order.
    pub fn build(&mut self, meshes: &[MeshHandle]) -> &Frame {
        self.frame.clear();
        self.frame.clear_color = self.background.to_rgba_f32();
        for mesh in meshes {
            let frame = &mut self.frame;
            mesh.draw(|draw| append_mesh(frame, &draw));
        }
        log::trace!(
            "Frame built: {} meshes, {} surface / {} shadow vertices, {} calls",
            meshes.len(),
            self.frame.surface.len(),
            self.frame.shadow.len(),
            self.frame.calls.len()
        );
        &self.frame
    }
}

fn append_mesh(frame: &mut Frame, draw: &MeshDraw<'_>) {
    let surface_base = frame.surface.len();
    let shadow_base = frame.shadow.len();

    let positions = draw.positions.chunks_exact(3);
    let colors = draw.colors.chunks_exact(4);
    let uvs = draw.tex_coords.chunks_exact(2);
    frame
        .surface
        .extend(positions.zip(colors).zip(uvs).map(|((p, c), t)| SurfaceVertex {
            pos: [p[0], p[1], p[2]],
            color: [c[0], c[1], c[2], c[3]],
            uv: [t[0], t[1]],
        }));

    let positions = draw.shadow_positions.chunks_exact(3);
    let colors = draw.shadow_colors.chunks_exact(4);
    frame
        .shadow
        .extend(positions.zip(colors).map(|(p, c)| ShadowVertex {
            pos: [p[0], p[1], p[2]],
            color: [c[0], c[1], c[2], c[3]],
        }));

    let mut push = |pass: Pass, range: &std::ops::Range<usize>, texture: Option<u32>| {
        if range.len() < MIN_STRIP {
            return;
        }
        let base = match pass.source() {
            Source::Surface => surface_base,
            Source::Shadow => shadow_base,
        };
        frame.calls.push(DrawCall {
            pass,
            first: (base + range.start) as u32,
            count: range.len() as u32,
            texture,
        });
    };

    push(Pass::DropShadow, &draw.drop_shadow, None);
    push(Pass::FrontBlank, &draw.front, None);
    if draw.front_texture.is_some() {
        push(Pass::FrontTextured, &draw.front, draw.front_texture);
    }
    push(Pass::BackBlank, &draw.back, None);
    if draw.back_texture.is_some() {
        push(Pass::BackTextured, &draw.back, draw.back_texture);
    }
    push(Pass::SelfShadow, &draw.self_shadow, None);
}
