//! Math types for PetalCue

pub use glam::{Vec2, Vec3};

/// Straight ahead of the listener in Steam Audio's right-handed frame
/// (+X right, +Y up, +Z forward as seen by the binaural effect).
pub const FORWARD: Vec3 = Vec3::Z;

/// Turns a 2D cue position into the unit direction handed to the binaural effect.
///
/// The position is placed on a plane one unit in front of the listener, so
/// `(angle_x, angle_y)` becomes `(angle_x, angle_y, 1.0)` before normalization.
/// Vectors that cannot be normalized (zero length, or non-finite components) resolve to
/// [`FORWARD`].
pub fn direction_from_angles(angle_x: f32, angle_y: f32) -> Vec3 {
    Vec3::new(angle_x, angle_y, 1.0)
        .try_normalize()
        .unwrap_or(FORWARD)
}
