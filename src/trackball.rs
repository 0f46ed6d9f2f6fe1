//! Virtual trackball rotation.

use glam::{Mat4, Quat, Vec3};

/// Default radius of the virtual sphere, in normalized device coordinates.
pub const DEFAULT_RADIUS: f32 = 0.8;

const EPSILON: f32 = 1e-6;

/// Accumulates rotations from 2D drags projected onto a virtual sphere.
///
/// Points are in normalized device coordinates, `[-1, 1]` on both axes with
/// `+y` up. Inside the sphere the point is lifted onto it; outside it lands
/// on a hyperbolic sheet so dragging past the rim keeps rotating smoothly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trackball {
    q: Quat,
    radius: f32,
}

impl Trackball {
    /// Constructor.
    pub fn new(radius: f32) -> Self {
        Trackball { q: Quat::IDENTITY, radius }
    }

    /// Returns the sphere radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Returns the accumulated rotation.
    pub fn quat(&self) -> Quat {
        self.q
    }

    /// Returns the accumulated rotation as a 4x4 matrix.
    pub fn rot(&self) -> Mat4 {
        Mat4::from_quat(self.q)
    }

    /// Back to the identity rotation.
    pub fn reset(&mut self) {
        self.q = Quat::IDENTITY;
    }

    /// Rotates by the drag from `(p1x, p1y)` to `(p2x, p2y)`.
    ///
    /// The increment is applied before the accumulated rotation. Identical
    /// points or a degenerate axis leave the rotation unchanged.
    pub fn track(&mut self, p1x: f32, p1y: f32, p2x: f32, p2y: f32) {
        if p1x == p2x && p1y == p2y {
            return;
        }
        let a = self.map_to_sphere(p1x, p1y);
        let b = self.map_to_sphere(p2x, p2y);
        let axis = a.cross(b);
        if axis.length_squared() < EPSILON * EPSILON || !axis.is_finite() {
            return;
        }
        let angle = a.dot(b).clamp(-1.0, 1.0).acos();
        let delta = Quat::from_axis_angle(axis.normalize(), angle);
        self.q = (delta * self.q).normalize();
    }

    fn map_to_sphere(&self, x: f32, y: f32) -> Vec3 {
        let r2 = self.radius * self.radius;
        let d2 = x * x + y * y;
        let z = if d2 <= r2 * 0.5 {
            (r2 - d2).sqrt()
        } else {
            (r2 * 0.5) / d2.sqrt()
        };
        Vec3::new(x, y, z).normalize()
    }
}

impl Default for Trackball {
    fn default() -> Self {
        Trackball::new(DEFAULT_RADIUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same_rotation(a: Quat, b: Quat) -> bool {
        a.abs_diff_eq(b, 1e-5) || a.abs_diff_eq(-b, 1e-5)
    }

    #[test]
    fn starts_at_identity() {
        let trackball = Trackball::default();
        assert_eq!(trackball.quat(), Quat::IDENTITY);
        assert_eq!(trackball.rot(), Mat4::IDENTITY);
        assert_eq!(trackball.radius(), DEFAULT_RADIUS);
    }

    #[test]
    fn identical_points_do_nothing() {
        let mut trackball = Trackball::default();
        trackball.track(0.3, -0.2, 0.3, -0.2);
        assert_eq!(trackball.quat(), Quat::IDENTITY);
    }

    #[test]
    fn stays_normalized_and_finite() {
        let mut trackball = Trackball::default();
        let points = [(0.0, 0.0), (0.9, 0.1), (-0.7, 0.95), (2.0, -3.0), (0.0, 0.0001)];
        for window in points.windows(2) {
            let ((x1, y1), (x2, y2)) = (window[0], window[1]);
            trackball.track(x1, y1, x2, y2);
            let q = trackball.quat();
            assert!(q.is_finite());
            assert!((q.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn reset_restores_identity() {
        let mut trackball = Trackball::default();
        trackball.track(0.0, 0.0, 0.5, 0.0);
        assert_ne!(trackball.quat(), Quat::IDENTITY);
        trackball.reset();
        assert_eq!(trackball.quat(), Quat::IDENTITY);
    }

    #[test]
    fn horizontal_drag_rotates_about_y() {
        let mut trackball = Trackball::default();
        trackball.track(0.0, 0.0, 0.3, 0.0);
        let (axis, angle) = trackball.quat().to_axis_angle();
        assert!(angle > 0.0);
        assert!(axis.abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn composition_is_order_sensitive() {
        let (a, c, e) = ((0.0, 0.0), (0.5, 0.0), (0.5, 0.5));

        let mut first = Trackball::default();
        first.track(a.0, a.1, c.0, c.1);
        first.track(c.0, c.1, e.0, e.1);

        let mut second = Trackball::default();
        second.track(c.0, c.1, e.0, e.1);
        second.track(a.0, a.1, c.0, c.1);

        assert!(!same_rotation(first.quat(), second.quat()));
    }

    #[test]
    fn continued_drag_differs_from_direct_drag() {
        let mut continued = Trackball::default();
        continued.track(0.0, 0.0, 0.5, 0.0);
        continued.track(0.5, 0.0, 0.5, 0.5);

        let mut direct = Trackball::default();
        direct.track(0.0, 0.0, 0.5, 0.5);

        // A diagonal drag through the centre has no roll; the bent path does.
        let (c, d) = (continued.quat(), direct.quat());
        assert!(d.z.abs() < 1e-5, "direct {:?}", d);
        assert!(c.z > 0.05, "continued {:?}", c);
        assert!(!same_rotation(c, d));
        assert!(d.abs_diff_eq(Quat::from_xyzw(-0.339, 0.339, 0.0, 0.877), 2e-3), "direct {:?}", d);
        assert!(c.abs_diff_eq(Quat::from_xyzw(-0.297, 0.377, 0.104, 0.871), 2e-3), "continued {:?}", c);
    }
}
