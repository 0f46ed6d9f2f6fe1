//! Orbit camera driven by a trackball.

use crate::trackball::Trackball;
use glam::{Mat4, Vec2, Vec3};

/// The closest the camera may dolly towards its target.
pub const MIN_DOLLY: f32 = 0.01;

/// Looks at the origin from `dolly` units away, rotated by a trackball and
/// shifted in the view plane by a pan offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    trackball: Trackball,
    dolly: f32,
    initial_dolly: f32,
    pan: Vec2,
}

impl OrbitCamera {
    /// Constructor.
    pub fn new(dolly: f32) -> Self {
        let dolly = dolly.max(MIN_DOLLY);
        OrbitCamera {
            trackball: Trackball::default(),
            dolly,
            initial_dolly: dolly,
            pan: Vec2::ZERO,
        }
    }

    /// Rotates by a drag between two points in normalized device coordinates.
    pub fn rotate(&mut self, from: Vec2, to: Vec2) {
        self.trackball.track(from.x, from.y, to.x, to.y);
    }

    /// Moves towards (negative) or away from (positive) the target.
    pub fn dolly_by(&mut self, delta: f32) {
        self.dolly = (self.dolly + delta).max(MIN_DOLLY);
    }

    /// Shifts the view in its own plane.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan += Vec2::new(dx, dy);
    }

    /// Back to the construction distance with no rotation or pan.
    pub fn reset(&mut self) {
        self.trackball.reset();
        self.dolly = self.initial_dolly;
        self.pan = Vec2::ZERO;
    }

    /// Distance to the target.
    pub fn dolly(&self) -> f32 {
        self.dolly
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn trackball(&self) -> &Trackball {
        &self.trackball
    }

    /// World-to-view transform.
    pub fn view_mx(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(self.pan.x, self.pan.y, -self.dolly)) * self.trackball.rot()
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        OrbitCamera::new(5.0)
    }
}
