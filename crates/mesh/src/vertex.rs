//! Scratch vertex types used while sweeping the curl.

use glam::{DVec2, DVec3};
use pagecurl_core::Color;

/// Working vertex: position, texcoord, penumbra direction and color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub pos: DVec3,
    /// Texture coordinate in [0,1] until scaled into a source rect.
    pub tex: DVec2,
    pub penumbra: DVec2,
    pub color: Color,
    /// Brightness multiplier in [0,1].
    pub color_factor: f32,
}

impl Vertex {
    #[inline]
    pub fn translate(&mut self, d: DVec2) {
        self.pos.x += d.x;
        self.pos.y += d.y;
    }

    /// Rotates position and penumbra clockwise by `theta` around z.
    pub fn rotate_z(&mut self, theta: f64) {
        let (sin, cos) = theta.sin_cos();
        let x = self.pos.x * cos + self.pos.y * sin;
        let y = self.pos.x * -sin + self.pos.y * cos;
        self.pos.x = x;
        self.pos.y = y;
        let px = self.penumbra.x * cos + self.penumbra.y * sin;
        let py = self.penumbra.x * -sin + self.penumbra.y * cos;
        self.penumbra = DVec2::new(px, py);
    }

    /// Lerps position, texcoord and penumbra from `self` toward `other`.
    pub fn lerp_toward(&self, other: &Vertex, c: f64) -> Vertex {
        Vertex {
            pos: DVec3::new(
                self.pos.x + (other.pos.x - self.pos.x) * c,
                self.pos.y + (other.pos.y - self.pos.y) * c,
                self.pos.z,
            ),
            tex: self.tex + (other.tex - self.tex) * c,
            penumbra: self.penumbra + (other.penumbra - self.penumbra) * c,
            ..*self
        }
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            pos: DVec3::ZERO,
            tex: DVec2::ZERO,
            penumbra: DVec2::ZERO,
            color: Color::WHITE,
            color_factor: 1.0,
        }
    }
}

/// Vertex of the drop shadow or self shadow strip.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ShadowVertex {
    pub pos: DVec3,
    pub penumbra: DVec2,
    /// Blend factor between outer (0) and inner (1) shadow color.
    pub penumbra_color: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn rotate_quarter_turn_is_clockwise() {
        let mut v = Vertex {
            pos: DVec3::new(1.0, 0.0, 0.0),
            penumbra: DVec2::new(0.0, 1.0),
            ..Default::default()
        };
        v.rotate_z(FRAC_PI_2);
        assert!((v.pos.x - 0.0).abs() < 1e-12);
        assert!((v.pos.y + 1.0).abs() < 1e-12);
        assert!((v.penumbra.x - 1.0).abs() < 1e-12);
        assert!(v.penumbra.y.abs() < 1e-12);
    }

    #[test]
    fn rotate_back_restores() {
        let mut v = Vertex {
            pos: DVec3::new(0.3, -0.7, 0.2),
            ..Default::default()
        };
        let orig = v;
        v.rotate_z(0.8);
        v.rotate_z(-0.8);
        assert!((v.pos - orig.pos).length() < 1e-12);
    }

    #[test]
    fn lerp_keeps_z_and_color() {
        let a = Vertex {
            pos: DVec3::new(0.0, 0.0, 2.0),
            color: Color::BLACK,
            ..Default::default()
        };
        let b = Vertex {
            pos: DVec3::new(2.0, 4.0, 9.0),
            tex: DVec2::new(1.0, 1.0),
            ..Default::default()
        };
        let m = a.lerp_toward(&b, 0.5);
        assert_eq!(m.pos, DVec3::new(1.0, 2.0, 2.0));
        assert_eq!(m.tex, DVec2::new(0.5, 0.5));
        assert_eq!(m.color, Color::BLACK);
    }
}
