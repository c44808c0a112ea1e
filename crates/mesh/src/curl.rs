//! Page curl mesh: splits a rectangle into a flat part, a half-cylinder
//! and a part lying flipped on top, plus drop and self shadow strips.

use std::f64::consts::PI;
use std::ops::Range;

use glam::{DVec2, DVec3};
use pagecurl_core::{PageRect, TexRect};

use crate::page::{PageSide, TexturePage};
use crate::pool::{FixedVec, FloatBuffer};
use crate::vertex::{ShadowVertex, Vertex};

const SHADOW_INNER_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 0.5];
const SHADOW_OUTER_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

/// Bounding edges of the sorted rectangle as vertex index pairs. The
/// first vertex of each pair is never left of the second one.
type Edges = [[usize; 2]; 4];

/// Read-only view of a mesh ready for drawing.
#[derive(Clone, Debug)]
pub struct MeshDraw<'a> {
    /// xyz per vertex.
    pub positions: &'a [f32],
    /// rgba per vertex.
    pub colors: &'a [f32],
    /// uv per vertex.
    pub tex_coords: &'a [f32],
    pub shadow_positions: &'a [f32],
    pub shadow_colors: &'a [f32],
    /// Triangle strip vertex ranges.
    pub front: Range<usize>,
    pub back: Range<usize>,
    pub drop_shadow: Range<usize>,
    pub self_shadow: Range<usize>,
    /// Texture to bind for each face, if any.
    pub front_texture: Option<u32>,
    pub back_texture: Option<u32>,
}

impl MeshDraw<'_> {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn shadow_vertex_count(&self) -> usize {
        self.shadow_positions.len() / 3
    }
}

pub struct CurlMesh {
    max_curl_splits: usize,
    /// 0 = top-left, 1 = bottom-left, 2 = top-right, 3 = bottom-right.
    rectangle: [Vertex; 4],
    flip_texture: bool,

    texture_page: TexturePage,
    texture_rect_front: TexRect,
    texture_rect_back: TexRect,
    texture_back: bool,
    bound_textures: [Option<u32>; 2],

    scan_lines: FixedVec<f64>,
    hits: FixedVec<Vertex>,
    output: FixedVec<Vertex>,
    drop_shadow: FixedVec<ShadowVertex>,
    self_shadow: FixedVec<ShadowVertex>,

    buf_vertices: FloatBuffer,
    buf_colors: FloatBuffer,
    buf_tex_coords: FloatBuffer,
    buf_shadow_vertices: FloatBuffer,
    buf_shadow_colors: FloatBuffer,

    vert_count_front: usize,
    vert_count_back: usize,
    drop_shadow_count: usize,
    self_shadow_count: usize,
    emitted: usize,
}

impl CurlMesh {
    /// `max_curl_splits` is how many lines approximate the curl; values
    /// below 1 are raised to 1.
    pub fn new(max_curl_splits: usize) -> Self {
        let splits = max_curl_splits.max(1);
        let max_vertices = Self::max_vertex_count_for(splits);
        let max_shadow = (splits + 2) * 2;

        let mut rectangle = [Vertex::default(); 4];
        // Penumbra directions drive the fake self shadow falloff.
        rectangle[0].penumbra = DVec2::new(-1.0, 1.0);
        rectangle[1].penumbra = DVec2::new(-1.0, -1.0);
        rectangle[2].penumbra = DVec2::new(1.0, 1.0);
        rectangle[3].penumbra = DVec2::new(1.0, -1.0);

        let mut mesh = Self {
            max_curl_splits: splits,
            rectangle,
            flip_texture: false,
            texture_page: TexturePage::new(),
            texture_rect_front: TexRect::FULL,
            texture_rect_back: TexRect::FULL,
            texture_back: false,
            bound_textures: [None; 2],
            scan_lines: FixedVec::new("scan lines", splits + 2),
            hits: FixedVec::new("intersections", 4),
            output: FixedVec::new("output vertices", 7),
            drop_shadow: FixedVec::new("drop shadow", max_shadow),
            self_shadow: FixedVec::new("self shadow", max_shadow),
            buf_vertices: FloatBuffer::new("vertex", max_vertices * 3),
            buf_colors: FloatBuffer::new("color", max_vertices * 4),
            buf_tex_coords: FloatBuffer::new("texcoord", max_vertices * 2),
            buf_shadow_vertices: FloatBuffer::new("shadow vertex", max_shadow * 2 * 3),
            buf_shadow_colors: FloatBuffer::new("shadow color", max_shadow * 2 * 4),
            vert_count_front: 0,
            vert_count_back: 0,
            drop_shadow_count: 0,
            self_shadow_count: 0,
            emitted: 0,
        };
        mesh.set_tex_coords(0.0, 0.0, 1.0, 1.0);
        mesh
    }

    /// 4 rectangle corners, at most 2 corner/edge helpers and 2 per split.
    #[inline]
    pub const fn max_vertex_count_for(max_curl_splits: usize) -> usize {
        4 + 2 + 2 * max_curl_splits
    }

    #[inline]
    pub fn max_curl_splits(&self) -> usize {
        self.max_curl_splits
    }

    #[inline]
    pub fn max_vertex_count(&self) -> usize {
        Self::max_vertex_count_for(self.max_curl_splits)
    }

    #[inline]
    pub fn vert_count_front(&self) -> usize {
        self.vert_count_front
    }

    #[inline]
    pub fn vert_count_back(&self) -> usize {
        self.vert_count_back
    }

    #[inline]
    pub fn drop_shadow_count(&self) -> usize {
        self.drop_shadow_count
    }

    #[inline]
    pub fn self_shadow_count(&self) -> usize {
        self.self_shadow_count
    }

    /// Vertices written by the last `curl` or `reset`.
    #[inline]
    pub fn emitted_vertex_count(&self) -> usize {
        self.emitted
    }

    #[inline]
    pub fn flip_texture(&self) -> bool {
        self.flip_texture
    }

    #[inline]
    pub fn texture_page(&self) -> &TexturePage {
        &self.texture_page
    }

    #[inline]
    pub fn texture_page_mut(&mut self) -> &mut TexturePage {
        &mut self.texture_page
    }

    /// Update mesh bounds.
    pub fn set_rect(&mut self, r: PageRect) {
        self.rectangle[0].pos = DVec3::new(r.left, r.top, 0.0);
        self.rectangle[1].pos = DVec3::new(r.left, r.bottom, 0.0);
        self.rectangle[2].pos = DVec3::new(r.right, r.top, 0.0);
        self.rectangle[3].pos = DVec3::new(r.right, r.bottom, 0.0);
    }

    /// Mirrors texture coordinates horizontally.
    pub fn set_flip_texture(&mut self, flip: bool) {
        self.flip_texture = flip;
        if flip {
            self.set_tex_coords(1.0, 0.0, 0.0, 1.0);
        } else {
            self.set_tex_coords(0.0, 0.0, 1.0, 1.0);
        }
    }

    fn set_tex_coords(&mut self, left: f64, top: f64, right: f64, bottom: f64) {
        self.rectangle[0].tex = DVec2::new(left, top);
        self.rectangle[1].tex = DVec2::new(left, bottom);
        self.rectangle[2].tex = DVec2::new(right, top);
        self.rectangle[3].tex = DVec2::new(right, bottom);
    }

    /// Back to a flat rectangle drawn with the front face only.
    pub fn reset(&mut self) {
        self.rewind_surface();
        self.emitted = 0;
        for i in 0..4 {
            let mut v = self.rectangle[i];
            self.apply_side(&mut v, !self.flip_texture);
            self.add_vertex(&v);
        }
        self.vert_count_front = 4;
        self.vert_count_back = 0;
        self.rewind_surface();

        self.drop_shadow.clear();
        self.self_shadow.clear();
        self.drop_shadow_count = 0;
        self.self_shadow_count = 0;
    }

    /// Forget resolved texture ids; they are picked up again from the
    /// texture page on the next draw.
    pub fn reset_texture(&mut self) {
        self.bound_textures = [None; 2];
        self.texture_page.mark_changed();
    }

    /// Curls the mesh around the line through `curl_pos`, rolling toward
    /// `curl_dir`. A zero or non-finite direction, or a rectangle without
    /// area, resets the mesh.
    pub fn curl(&mut self, curl_pos: DVec2, curl_dir: DVec2, radius: f64) {
        let Some(dir) = curl_dir.try_normalize() else {
            log::debug!("Degenerate curl direction {curl_dir:?}, resetting mesh");
            self.reset();
            return;
        };
        let width = self.rectangle[2].pos.x - self.rectangle[0].pos.x;
        let height = self.rectangle[0].pos.y - self.rectangle[1].pos.y;
        if width == 0.0 || height == 0.0 || !curl_pos.is_finite() {
            log::debug!(
                "Degenerate curl geometry ({width}x{height} at {curl_pos:?}), resetting mesh"
            );
            self.reset();
            return;
        }
        let radius = radius.max(0.0);

        self.rewind_surface();
        self.emitted = 0;

        let mut curl_angle = dir.x.clamp(-1.0, 1.0).acos();
        if dir.y > 0.0 {
            curl_angle = -curl_angle;
        }

        // Rectangle in curl space (curl heading to +x), sorted by
        // descending x, then descending y.
        let mut rotated = [Vertex::default(); 4];
        for i in 0..4 {
            let mut v = self.rectangle[i];
            v.translate(-curl_pos);
            v.rotate_z(-curl_angle);
            let mut at = i;
            for (j, other) in rotated[..i].iter().enumerate() {
                if v.pos.x > other.pos.x || (v.pos.x == other.pos.x && v.pos.y > other.pos.y) {
                    at = j;
                    break;
                }
            }
            rotated.copy_within(at..i, at + 1);
            rotated[at] = v;
        }

        // Vertex 3 is not always the corner opposite vertex 0.
        let mut edges: Edges = [[0, 1], [0, 2], [1, 3], [2, 3]];
        let v0 = rotated[0].pos.truncate();
        if v0.distance(rotated[2].pos.truncate()) > v0.distance(rotated[3].pos.truncate()) {
            edges[1][1] = 3;
            edges[2][1] = 2;
        }

        self.vert_count_front = 0;
        self.vert_count_back = 0;
        self.drop_shadow.clear();
        self.self_shadow.clear();

        let curl_len = PI * radius;
        self.scan_lines.clear();
        self.scan_lines.push(0.0);
        let splits = self.max_curl_splits;
        for i in 1..splits {
            self.scan_lines.push(-curl_len * i as f64 / (splits - 1) as f64);
        }
        // Everything left of the left-most corner is fully rotated.
        self.scan_lines.push(rotated[3].pos.x - 1.0);
        let last_area = self.scan_lines.len() - 1;

        let mut scan_x_max = rotated[0].pos.x + 1.0;
        for area in 0..self.scan_lines.len() {
            let scan_x_min = self.scan_lines[area];

            // Zero radius collapses interior areas onto the fold line; the
            // corners on it belong to the first and last areas only.
            let empty_area = scan_x_min == scan_x_max;
            for vertex in &rotated {
                if empty_area || vertex.pos.x < scan_x_min || vertex.pos.x > scan_x_max {
                    continue;
                }
                // Pair the corner with the opposite edge point at its x so
                // strips stay well formed.
                intersections(&rotated, &edges, vertex.pos.x, &mut self.hits);
                match self.hits.len() {
                    1 if self.hits[0].pos.y > vertex.pos.y => {
                        self.output.push(self.hits[0]);
                        self.output.push(*vertex);
                    }
                    0 | 1 => {
                        self.output.push(*vertex);
                        for &hit in self.hits.iter() {
                            self.output.push(hit);
                        }
                    }
                    n => log::warn!("Corner at x={:.4} hit {n} edges, skipped", vertex.pos.x),
                }
            }

            intersections(&rotated, &edges, scan_x_min, &mut self.hits);
            match self.hits.len() {
                0 => {}
                2 => {
                    let (a, b) = (self.hits[0], self.hits[1]);
                    let (high, low) = if a.pos.y < b.pos.y { (b, a) } else { (a, b) };
                    self.output.push(high);
                    self.output.push(low);
                }
                // A corner lying exactly on the scan line, already emitted above.
                1 => {}
                n => log::warn!("Scan line x={scan_x_min:.4} hit {n} edges, skipped"),
            }

            for k in 0..self.output.len() {
                let mut v = self.output[k];
                let texture_front;
                if area == 0 {
                    texture_front = true;
                    self.vert_count_front += 1;
                } else if area == last_area || curl_len == 0.0 {
                    v.pos.x = -(curl_len + v.pos.x);
                    v.pos.z = 2.0 * radius;
                    v.penumbra.x = -v.penumbra.x;
                    texture_front = false;
                    self.vert_count_back += 1;
                } else {
                    // Here x lies in [-curl_len, 0], map it onto the cylinder.
                    let rot_y = PI * (v.pos.x / curl_len);
                    let (sin, cos) = rot_y.sin_cos();
                    v.pos.x = radius * sin;
                    v.pos.z = radius - radius * cos;
                    v.penumbra.x *= cos;
                    v.color_factor = (0.1 + 0.9 * (sin + 1.0).max(0.0).sqrt()) as f32;
                    if v.pos.z >= radius {
                        texture_front = false;
                        self.vert_count_back += 1;
                    } else {
                        texture_front = true;
                        self.vert_count_front += 1;
                    }
                }

                self.apply_side(&mut v, texture_front != self.flip_texture);

                v.rotate_z(curl_angle);
                v.translate(curl_pos);
                self.add_vertex(&v);

                if v.pos.z > 0.0 && v.pos.z <= radius {
                    let sv = ShadowVertex {
                        pos: v.pos,
                        penumbra: (v.pos.z / 2.0) * -dir,
                        penumbra_color: v.pos.z / radius,
                    };
                    let idx = (self.drop_shadow.len() + 1) / 2;
                    self.drop_shadow.insert(idx, sv);
                }
                if v.pos.z > radius {
                    let sv = ShadowVertex {
                        pos: v.pos,
                        penumbra: ((v.pos.z - radius) / 3.0) * v.penumbra,
                        penumbra_color: (v.pos.z - radius) / (2.0 * radius),
                    };
                    let idx = (self.self_shadow.len() + 1) / 2;
                    self.self_shadow.insert(idx, sv);
                }
            }
            self.output.clear();

            scan_x_max = scan_x_min;
        }

        self.rewind_surface();

        self.buf_shadow_vertices.rewind();
        self.buf_shadow_colors.rewind();
        self.drop_shadow_count = write_shadow_strip(
            &self.drop_shadow,
            &mut self.buf_shadow_vertices,
            &mut self.buf_shadow_colors,
        );
        self.self_shadow_count = write_shadow_strip(
            &self.self_shadow,
            &mut self.buf_shadow_vertices,
            &mut self.buf_shadow_colors,
        );
        self.buf_shadow_vertices.rewind();
        self.buf_shadow_colors.rewind();
    }

    /// Draw step: consumes pending texture page changes, then exposes the
    /// buffers. A page change resets the mesh.
    pub fn prepare_draw(&mut self) -> MeshDraw<'_> {
        if let Some(rect) = self.texture_page.rect_texture() {
            self.texture_rect_front = rect;
            self.texture_rect_back = rect;
        }

        if self.texture_page.textures_changed() {
            let rect = self.texture_page.rect_texture().unwrap_or(TexRect::FULL);
            self.bound_textures[0] = self.texture_page.texture_front();
            self.texture_rect_front = rect;

            self.texture_back = self.texture_page.has_back_texture();
            if self.texture_back {
                self.bound_textures[1] = self.texture_page.texture_back();
                self.texture_rect_back = rect;
            } else {
                self.texture_rect_back = self.texture_rect_front;
            }

            self.texture_page.acknowledge();
            self.reset();
        }

        self.draw_view()
    }

    /// Current buffers without touching texture state.
    pub fn draw_view(&self) -> MeshDraw<'_> {
        let count = self.vert_count_front + self.vert_count_back;
        let shadow_count = self.drop_shadow_count + self.self_shadow_count;
        let back_start = self.vert_count_front.saturating_sub(2);

        let [front_id, back_id] = self.bound_textures;
        let front_texture = if !self.flip_texture || !self.texture_back {
            front_id
        } else {
            back_id
        };
        let back_texture = if self.flip_texture || !self.texture_back {
            front_id
        } else {
            back_id
        };

        MeshDraw {
            positions: self.buf_vertices.head(count * 3),
            colors: self.buf_colors.head(count * 4),
            tex_coords: self.buf_tex_coords.head(count * 2),
            shadow_positions: self.buf_shadow_vertices.head(shadow_count * 3),
            shadow_colors: self.buf_shadow_colors.head(shadow_count * 4),
            front: 0..self.vert_count_front,
            back: back_start..count,
            drop_shadow: 0..self.drop_shadow_count,
            self_shadow: self.drop_shadow_count..shadow_count,
            front_texture,
            back_texture,
        }
    }

    /// Scale texcoords into the side's source rect and take its color.
    fn apply_side(&self, v: &mut Vertex, front: bool) {
        let (rect, side) = if front {
            (self.texture_rect_front, PageSide::Front)
        } else {
            (self.texture_rect_back, PageSide::Back)
        };
        v.tex.x *= rect.right as f64;
        v.tex.y *= rect.bottom as f64;
        v.color = self.texture_page.color(side);
    }

    fn add_vertex(&mut self, v: &Vertex) {
        self.buf_vertices
            .put_all(&[v.pos.x as f32, v.pos.y as f32, v.pos.z as f32]);
        let [r, g, b, a] = v.color.to_rgba_f32();
        let f = v.color_factor;
        self.buf_colors.put_all(&[f * r, f * g, f * b, a]);
        self.buf_tex_coords.put_all(&[v.tex.x as f32, v.tex.y as f32]);
        self.emitted += 1;
    }

    fn rewind_surface(&mut self) {
        self.buf_vertices.rewind();
        self.buf_colors.rewind();
        self.buf_tex_coords.rewind();
    }
}

/// Edge/scan line crossings at `scan_x`, interpolated from the right
/// vertex of each edge.
fn intersections(rotated: &[Vertex; 4], edges: &Edges, scan_x: f64, out: &mut FixedVec<Vertex>) {
    out.clear();
    for &[a, b] in edges {
        let (v1, v2) = (&rotated[a], &rotated[b]);
        if v1.pos.x > scan_x && v2.pos.x < scan_x {
            let c = (scan_x - v2.pos.x) / (v1.pos.x - v2.pos.x);
            let mut n = v2.lerp_toward(v1, c);
            n.pos.x = scan_x;
            out.push(n);
        }
    }
}

/// Writes each shadow vertex as an inner/outer pair, returns vertices written.
fn write_shadow_strip(
    list: &[ShadowVertex],
    vertices: &mut FloatBuffer,
    colors: &mut FloatBuffer,
) -> usize {
    for sv in list {
        let (x, y, z) = (sv.pos.x as f32, sv.pos.y as f32, sv.pos.z as f32);
        vertices.put_all(&[x, y, z]);
        vertices.put_all(&[
            (sv.pos.x + sv.penumbra.x) as f32,
            (sv.pos.y + sv.penumbra.y) as f32,
            z,
        ]);
        let t = sv.penumbra_color as f32;
        for j in 0..4 {
            colors.put(SHADOW_OUTER_COLOR[j] + (SHADOW_INNER_COLOR[j] - SHADOW_OUTER_COLOR[j]) * t);
        }
        colors.put_all(&SHADOW_OUTER_COLOR);
    }
    list.len() * 2
}
