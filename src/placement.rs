//! Mapping from on-screen positions to cue angles.

use crate::math::Vec2;

/// Widest angle a cue can be placed at, in either direction.
pub const MAX_ANGLE: f32 = 90.0;

/// Screen rectangle of an object, in desktop pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// How the desktop is spread over the listener's field of hearing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayLayout {
    /// Horizontal span covered by the full desktop width.
    pub width_degrees: f32,
    /// Angle of the bottom edge of the desktop.
    pub height_min_degrees: f32,
    /// Vertical span from the bottom edge to the top edge.
    pub height_magnitude_degrees: f32,
}

impl Default for DisplayLayout {
    fn default() -> Self {
        Self {
            width_degrees: 180.0,
            height_min_degrees: -40.0,
            height_magnitude_degrees: 50.0,
        }
    }
}

impl DisplayLayout {
    /// Cue angles `(angle_x, angle_y)` for a point on a desktop of `desktop_size` pixels.
    ///
    /// Objects without a location, and degenerate desktops, are placed at the desktop centre.
    /// Both angles are clamped to `[-MAX_ANGLE, MAX_ANGLE]`.
    pub fn angles_for(&self, point: Option<Vec2>, desktop_size: Vec2) -> Vec2 {
        let (fraction_x, fraction_up) = match point {
            Some(point) if desktop_size.x > 0.0 && desktop_size.y > 0.0 => (
                (point.x - desktop_size.x / 2.0) / desktop_size.x,
                (desktop_size.y - point.y) / desktop_size.y,
            ),
            _ => (0.0, 0.5),
        };

        let angle_x = fraction_x * self.width_degrees;
        let angle_y = self.height_magnitude_degrees * fraction_up + self.height_min_degrees;
        Vec2::new(
            angle_x.clamp(-MAX_ANGLE, MAX_ANGLE),
            angle_y.clamp(-MAX_ANGLE, MAX_ANGLE),
        )
    }

    pub fn angles_for_rect(&self, rect: Option<ScreenRect>, desktop_size: Vec2) -> Vec2 {
        self.angles_for(rect.map(|rect| rect.center()), desktop_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESKTOP: Vec2 = Vec2::new(1920.0, 1080.0);

    #[test]
    fn test_center_of_desktop() {
        let layout = DisplayLayout::default();
        let angles = layout.angles_for(Some(Vec2::new(960.0, 540.0)), DESKTOP);
        assert_eq!(angles, Vec2::new(0.0, -15.0));
    }

    #[test]
    fn test_edges() {
        let layout = DisplayLayout::default();

        let top_left = layout.angles_for(Some(Vec2::new(0.0, 0.0)), DESKTOP);
        assert_eq!(top_left, Vec2::new(-90.0, 10.0));

        let bottom_right = layout.angles_for(Some(DESKTOP), DESKTOP);
        assert_eq!(bottom_right, Vec2::new(90.0, -40.0));
    }

    #[test]
    fn test_offscreen_points_are_clamped() {
        let layout = DisplayLayout {
            width_degrees: 360.0,
            height_min_degrees: -80.0,
            height_magnitude_degrees: 200.0,
        };
        let angles = layout.angles_for(Some(Vec2::new(-500.0, -2000.0)), DESKTOP);
        assert_eq!(angles, Vec2::new(-90.0, 90.0));
    }

    #[test]
    fn test_missing_location_is_centered() {
        let layout = DisplayLayout::default();
        assert_eq!(layout.angles_for(None, DESKTOP), Vec2::new(0.0, -15.0));
        assert_eq!(
            layout.angles_for(Some(Vec2::new(10.0, 10.0)), Vec2::ZERO),
            Vec2::new(0.0, -15.0)
        );
    }

    #[test]
    fn test_rect_center() {
        let layout = DisplayLayout::default();
        let rect = ScreenRect::new(900.0, 500.0, 120.0, 80.0);
        assert_eq!(rect.center(), Vec2::new(960.0, 540.0));
        assert_eq!(
            layout.angles_for_rect(Some(rect), DESKTOP),
            Vec2::new(0.0, -15.0)
        );
    }
}
