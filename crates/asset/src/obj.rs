//! OBJ export of a drawn mesh surface, for inspecting curl geometry in
//! external tools.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    ops::Range,
    path::Path,
};

use anyhow::{Context, Result};
use mesh::MeshDraw;

/// Writes positions, texture coordinates and the front and back strips
/// as triangle faces. Degenerate strip triangles are dropped.
pub fn write_obj<W: Write>(out: &mut W, draw: &MeshDraw<'_>) -> io::Result<()> {
    writeln!(out, "# page curl mesh: {} vertices", draw.vertex_count())?;
    for p in draw.positions.chunks_exact(3) {
        writeln!(out, "v {} {} {}", p[0], p[1], p[2])?;
    }
    for t in draw.tex_coords.chunks_exact(2) {
        // OBJ texture space is y up
        writeln!(out, "vt {} {}", t[0], 1.0 - t[1])?;
    }

    writeln!(out, "g front")?;
    write_strip(out, draw, draw.front.clone())?;
    writeln!(out, "g back")?;
    write_strip(out, draw, draw.back.clone())?;
    Ok(())
}

pub fn save_obj(path: impl AsRef<Path>, draw: &MeshDraw<'_>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create OBJ file: {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_obj(&mut out, draw)
        .and_then(|_| out.flush())
        .with_context(|| format!("Failed to write OBJ file: {}", path.display()))?;
    log::info!("Wrote {} vertices to {}", draw.vertex_count(), path.display());
    Ok(())
}

fn write_strip<W: Write>(out: &mut W, draw: &MeshDraw<'_>, strip: Range<usize>) -> io::Result<()> {
    if strip.len() < 3 {
        return Ok(());
    }
    for i in strip.start..strip.end - 2 {
        // alternate winding so every strip triangle faces the same way
        let (a, b, c) = if (i - strip.start) % 2 == 0 {
            (i, i + 1, i + 2)
        } else {
            (i + 1, i, i + 2)
        };
        if is_degenerate(draw.positions, a, b, c) {
            continue;
        }
        // OBJ indices are 1-based
        writeln!(out, "f {0}/{0} {1}/{1} {2}/{2}", a + 1, b + 1, c + 1)?;
    }
    Ok(())
}

fn is_degenerate(positions: &[f32], a: usize, b: usize, c: usize) -> bool {
    let p = |i: usize| [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]];
    let (pa, pb, pc) = (p(a), p(b), p(c));
    let u = [pb[0] - pa[0], pb[1] - pa[1], pb[2] - pa[2]];
    let v = [pc[0] - pa[0], pc[1] - pa[1], pc[2] - pa[2]];
    let cross = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    cross.iter().all(|x| x.abs() < 1e-12)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh::CurlMesh;
    use pagecurl_core::{DVec2, PageRect};

    fn flat_mesh() -> CurlMesh {
        let mut mesh = CurlMesh::new(6);
        mesh.set_rect(PageRect::new(0.0, 1.0, 1.0, 0.0));
        mesh.set_flip_texture(false);
        mesh.reset();
        mesh
    }

    fn export(mesh: &CurlMesh) -> String {
        let mut buf = Vec::new();
        write_obj(&mut buf, &mesh.draw_view()).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn count(text: &str, tag: &str) -> usize {
        text.lines().filter(|l| l.starts_with(tag)).count()
    }

    #[test]
    fn flat_page_is_two_triangles() {
        let text = export(&flat_mesh());
        assert_eq!(count(&text, "v "), 4);
        assert_eq!(count(&text, "vt "), 4);
        assert_eq!(count(&text, "f "), 2);
        assert!(text.contains("f 1/1 2/2 3/3"));
        assert!(text.contains("f 3/3 2/2 4/4"));
    }

    #[test]
    fn curled_page_exports_back_faces() {
        let mut mesh = flat_mesh();
        mesh.curl(DVec2::new(0.5, 0.5), DVec2::new(-1.0, 0.0), 0.1);
        let text = export(&mesh);
        assert_eq!(count(&text, "v "), mesh.emitted_vertex_count());
        let back = text.split("g back").nth(1).unwrap();
        assert!(count(back, "f ") > 0);
        for line in text.lines().filter(|l| l.starts_with("f ")) {
            for idx in line[2..].split_whitespace() {
                let v: usize = idx.split('/').next().unwrap().parse().unwrap();
                assert!(v >= 1 && v <= mesh.emitted_vertex_count());
            }
        }
    }
}
