//! Turns a pointer position into a curl (position, direction, radius).
//!
//! The curl follows the pointer from the drag start, shrinking its radius
//! as the drag approaches two page widths, and is clamped so the curl
//! line never crosses the spine of the page being turned.

use std::f64::consts::PI;

use pagecurl_core::{DVec2, PageRect};

use crate::layout::ViewMode;

/// Pressure used when touch pressure is disabled.
pub const DEFAULT_PRESSURE: f64 = 0.8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CurlState {
    #[default]
    None,
    Left,
    Right,
}

/// What the curl mesh should do next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CurlCommand {
    Curl { pos: DVec2, dir: DVec2, radius: f64 },
    Reset,
}

#[derive(Clone, Copy, Debug)]
pub struct SolverInput {
    pub pointer: DVec2,
    pub drag_start: DVec2,
    pub state: CurlState,
    pub view_mode: ViewMode,
    pub left_page: PageRect,
    pub right_page: PageRect,
    /// Nominal radius before arc-length compression.
    pub radius: f64,
}

/// A third of the page width, scaled down by pressure.
pub fn nominal_radius(page_width: f64, pressure: f64) -> f64 {
    page_width / 3.0 * (1.0 - pressure).max(0.0)
}

pub fn solve(input: &SolverInput) -> CurlCommand {
    let right = input.right_page;
    let mut radius = input.radius;
    let mut pos = input.pointer;
    let start = input.drag_start;

    let dir = match (input.state, input.view_mode) {
        (CurlState::None, _) => return CurlCommand::Reset,
        (CurlState::Right, _) | (CurlState::Left, ViewMode::Two) => {
            let dir = pos - start;
            let dist = dir.length();
            if dist == 0.0 {
                return CurlCommand::Reset;
            }
            let page_width = right.width();
            let mut arc_len = radius * PI;
            if dist > page_width * 2.0 - arc_len {
                arc_len = (page_width * 2.0 - dist).max(0.0);
                radius = arc_len / PI;
            }
            if dist >= arc_len {
                let t = (dist - arc_len) / 2.0;
                match input.view_mode {
                    ViewMode::Two => pos.x -= dir.x * t / dist,
                    ViewMode::One => radius = radius.min(pos.x - right.left).max(0.0),
                }
                pos.y -= dir.y * t / dist;
            } else {
                let angle = PI * (dist / arc_len).sqrt();
                let t = radius * angle.sin();
                pos += dir * t / dist;
            }
            dir
        }
        (CurlState::Left, ViewMode::One) => {
            radius = radius.min(pos.x - right.left).max(0.0);
            pos.x -= (right.right - pos.x).min(radius);
            DVec2::new(pos.x + start.x, pos.y - start.y)
        }
    };

    let clamped = match (input.state, input.view_mode) {
        (CurlState::Left, ViewMode::Two) => clamp_to_left_page(pos, dir, &input.left_page),
        _ => clamp_to_right_page(pos, dir, &right),
    };
    let Some((pos, dir)) = clamped else {
        return CurlCommand::Reset;
    };

    match dir.try_normalize() {
        Some(dir) => CurlCommand::Curl { pos, dir, radius },
        None => CurlCommand::Reset,
    }
}

/// Spine on the left edge. `None` when the curl has left the page.
fn clamp_to_right_page(mut pos: DVec2, mut dir: DVec2, page: &PageRect) -> Option<(DVec2, DVec2)> {
    if pos.x >= page.right {
        return None;
    }
    if pos.x < page.left {
        pos.x = page.left;
    }
    if dir.y != 0.0 {
        // y where the curl line meets the spine
        let spine_y = pos.y + (pos.x - page.left) * dir.x / dir.y;
        if dir.y < 0.0 && spine_y < page.top {
            dir = DVec2::new(pos.y - page.top, page.left - pos.x);
        } else if dir.y > 0.0 && spine_y > page.bottom {
            dir = DVec2::new(page.bottom - pos.y, pos.x - page.left);
        }
    }
    Some((pos, dir))
}

/// Spine on the right edge. `None` when the curl has left the page.
fn clamp_to_left_page(mut pos: DVec2, mut dir: DVec2, page: &PageRect) -> Option<(DVec2, DVec2)> {
    if pos.x <= page.left {
        return None;
    }
    if pos.x > page.right {
        pos.x = page.right;
    }
    if dir.y != 0.0 {
        let spine_y = pos.y + (pos.x - page.right) * dir.x / dir.y;
        if dir.y < 0.0 && spine_y < page.top {
            dir = DVec2::new(page.top - pos.y, pos.x - page.right);
        } else if dir.y > 0.0 && spine_y > page.bottom {
            dir = DVec2::new(pos.y - page.bottom, page.right - pos.x);
        }
    }
    Some((pos, dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RIGHT: PageRect = PageRect::new(0.0, 1.0, 1.0, -1.0);
    const LEFT: PageRect = PageRect::new(-1.0, 1.0, 0.0, -1.0);

    fn input(
        state: CurlState,
        mode: ViewMode,
        start: DVec2,
        pointer: DVec2,
        radius: f64,
    ) -> SolverInput {
        SolverInput {
            pointer,
            drag_start: start,
            state,
            view_mode: mode,
            left_page: LEFT,
            right_page: RIGHT,
            radius,
        }
    }

    #[test]
    fn nominal_radius_scales_with_pressure() {
        assert!((nominal_radius(0.9, DEFAULT_PRESSURE) - 0.06).abs() < 1e-12);
        assert_eq!(nominal_radius(0.9, 1.5), 0.0);
        assert!((nominal_radius(0.9, 0.0) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn no_curl_state_resets() {
        let start = DVec2::new(1.0, 0.0);
        let i = input(CurlState::None, ViewMode::One, start, DVec2::new(0.5, 0.0), 0.2);
        assert_eq!(solve(&i), CurlCommand::Reset);
    }

    #[test]
    fn pointer_at_drag_start_resets() {
        let start = DVec2::new(1.0, 0.0);
        for mode in [ViewMode::One, ViewMode::Two] {
            let i = input(CurlState::Right, mode, start, start, 0.2);
            assert_eq!(solve(&i), CurlCommand::Reset);
        }
    }

    #[test]
    fn pointer_at_spine_drag_start_resets() {
        let start = DVec2::new(RIGHT.left, 0.0);
        for mode in [ViewMode::One, ViewMode::Two] {
            let i = input(CurlState::Right, mode, start, start, 0.2);
            assert_eq!(solve(&i), CurlCommand::Reset);
        }
        let i = input(CurlState::Left, ViewMode::One, start, start, 0.2);
        assert_eq!(solve(&i), CurlCommand::Reset);
    }

    #[test]
    fn pointer_past_right_edge_resets() {
        let start = DVec2::new(1.0, 0.0);
        let i = input(CurlState::Right, ViewMode::One, start, DVec2::new(1.2, 0.1), 0.2);
        assert_eq!(solve(&i), CurlCommand::Reset);
    }

    #[test]
    fn full_page_drag_compresses_radius() {
        let r = 0.45;
        let start = DVec2::new(1.0, 0.0);
        let i = input(CurlState::Right, ViewMode::Two, start, DVec2::new(0.0, 0.0), r);
        let CurlCommand::Curl { pos, dir, radius } = solve(&i) else {
            panic!("expected a curl");
        };
        assert!(radius < r);
        assert!((radius - 1.0 / PI).abs() < 1e-9);
        assert!((pos - DVec2::new(0.0, 0.0)).length() < 1e-9);
        assert!((dir - DVec2::new(-1.0, 0.0)).length() < 1e-12);

        let i = input(CurlState::Right, ViewMode::One, start, DVec2::new(0.25, 0.0), r);
        let CurlCommand::Curl { radius, .. } = solve(&i) else {
            panic!("expected a curl");
        };
        assert!(radius < r);
        assert!((radius - 1.25 / PI).abs() < 1e-9);
    }

    #[test]
    fn short_drag_leads_the_pointer() {
        let start = DVec2::new(1.0, 0.0);
        let pointer = DVec2::new(0.9, 0.0);
        let i = input(CurlState::Right, ViewMode::One, start, pointer, 0.3);
        let CurlCommand::Curl { pos, radius, .. } = solve(&i) else {
            panic!("expected a curl");
        };
        let arc = 0.3 * PI;
        let expected = 0.9 - 0.3 * (PI * (0.1 / arc).sqrt()).sin();
        assert!((pos.x - expected).abs() < 1e-9);
        assert!(pos.x < pointer.x);
        assert_eq!(radius, 0.3);
    }

    #[test]
    fn one_page_left_curl_folds_from_spine() {
        let start = DVec2::new(0.0, 0.0);
        let i = input(CurlState::Left, ViewMode::One, start, DVec2::new(0.5, 0.0), 0.2);
        let CurlCommand::Curl { pos, dir, radius } = solve(&i) else {
            panic!("expected a curl");
        };
        assert_eq!(radius, 0.2);
        assert!((pos.x - 0.3).abs() < 1e-12);
        assert!((dir - DVec2::new(1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn curl_line_is_pinned_to_spine_corner() {
        // Dragging down-left from the top right corner tilts the curl line
        // into the spine; it must be re-aimed through the top-left corner.
        let start = DVec2::new(1.0, 1.0);
        let i = input(CurlState::Right, ViewMode::Two, start, DVec2::new(0.2, -0.2), 0.05);
        let CurlCommand::Curl { pos, dir, .. } = solve(&i) else {
            panic!("expected a curl");
        };
        let corner = DVec2::new(RIGHT.left, RIGHT.top);
        assert!(((corner - pos).dot(dir)).abs() < 1e-9);
        assert!((dir.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn two_page_left_curl_resets_past_left_edge() {
        let start = DVec2::new(-1.0, 0.0);
        let mut i = input(CurlState::Left, ViewMode::Two, start, DVec2::new(-1.1, 0.0), 0.2);
        assert_eq!(solve(&i), CurlCommand::Reset);
        i.pointer = DVec2::new(-0.5, 0.0);
        let CurlCommand::Curl { pos, dir, .. } = solve(&i) else {
            panic!("expected a curl");
        };
        assert!(pos.x > LEFT.left && pos.x <= LEFT.right);
        assert!(dir.x > 0.0);
    }
}
