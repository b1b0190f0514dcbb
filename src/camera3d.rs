use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use winit::dpi::PhysicalSize;

use crate::config::OrbitConfig;

const DEFAULT_UP: Vec3 = Vec3::Y;
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
const MIN_DISTANCE: f32 = 0.1;
const MAX_DISTANCE: f32 = 10_000.0;
/// Residual motion below this is dropped so damping settles.
const SETTLE_EPSILON: f32 = 1e-6;

/// Perspective camera looking at a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera3D {
    pub fn new(position: Vec3, target: Vec3, fov_y_radians: f32, near: f32, far: f32) -> Self {
        Self { position, target, up: DEFAULT_UP, fov_y_radians, near, far }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Projection into wgpu clip space (depth 0..1).
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_radians, aspect.max(0.0001), self.near, self.far)
    }

    pub fn view_projection(&self, viewport: PhysicalSize<u32>) -> Mat4 {
        let aspect = if viewport.height > 0 { viewport.width as f32 / viewport.height as f32 } else { 1.0 };
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

/// Orbit controls: rotate around a target, dolly towards it, pan across the view plane.
///
/// Input methods only queue motion; [`OrbitControls::update`] applies it once per frame. With
/// damping enabled the queued rotation and pan bleed out over several frames.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub radius: f32,
    pub yaw_radians: f32,
    pub pitch_radians: f32,
    pub fov_y_radians: f32,
    pub near: f32,
    pub far: f32,
    settings: OrbitConfig,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_pan: Vec3,
    pending_zoom: f32,
}

impl OrbitControls {
    pub fn from_camera(camera: &Camera3D, settings: OrbitConfig) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE);
        let yaw_radians = offset.x.atan2(offset.z);
        let pitch_radians = (-(offset.y / radius).clamp(-1.0, 1.0)).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT);
        Self {
            target: camera.target,
            radius,
            yaw_radians,
            pitch_radians,
            fov_y_radians: camera.fov_y_radians,
            near: camera.near,
            far: camera.far,
            settings,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_pan: Vec3::ZERO,
            pending_zoom: 1.0,
        }
    }

    fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw_radians, self.pitch_radians, 0.0)
    }

    pub fn camera(&self) -> Camera3D {
        let offset = self.rotation() * Vec3::new(0.0, 0.0, self.radius);
        Camera3D::new(self.target + offset, self.target, self.fov_y_radians, self.near, self.far)
    }

    /// Queues a rotation from a pointer drag. A drag across the full viewport height is one turn.
    pub fn rotate(&mut self, delta_pixels: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let scale = std::f32::consts::TAU / viewport_height * self.settings.rotate_speed;
        self.pending_yaw -= delta_pixels.x * scale;
        self.pending_pitch -= delta_pixels.y * scale;
    }

    /// Queues a dolly; positive steps move towards the target.
    pub fn zoom(&mut self, steps: f32) {
        self.pending_zoom *= 0.95_f32.powf(steps * self.settings.zoom_speed);
    }

    /// Queues a pan so the scene follows the pointer at the target's depth.
    pub fn pan(&mut self, delta_pixels: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let world_per_pixel = 2.0 * self.radius * (self.fov_y_radians * 0.5).tan() / viewport_height;
        let rotation = self.rotation();
        let right = rotation * Vec3::X;
        let up = rotation * Vec3::Y;
        let step = world_per_pixel * self.settings.pan_speed;
        self.pending_pan += (-right * delta_pixels.x + up * delta_pixels.y) * step;
    }

    pub fn is_settled(&self) -> bool {
        self.pending_yaw.abs() < SETTLE_EPSILON
            && self.pending_pitch.abs() < SETTLE_EPSILON
            && self.pending_pan.length_squared() < SETTLE_EPSILON * SETTLE_EPSILON
            && (self.pending_zoom - 1.0).abs() < SETTLE_EPSILON
    }

    /// Applies queued motion. Returns true if the camera moved.
    pub fn update(&mut self) -> bool {
        if self.is_settled() {
            self.clear_pending();
            return false;
        }
        let share = if self.settings.damping { self.settings.damping_factor.clamp(0.0, 1.0) } else { 1.0 };

        self.yaw_radians = crate::wrap_angle(self.yaw_radians + self.pending_yaw * share);
        self.pitch_radians = (self.pitch_radians + self.pending_pitch * share).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.target += self.pending_pan * share;
        self.radius = (self.radius * self.pending_zoom).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.pending_zoom = 1.0;

        if self.settings.damping {
            let keep = 1.0 - share;
            self.pending_yaw *= keep;
            self.pending_pitch *= keep;
            self.pending_pan *= keep;
        } else {
            self.clear_pending();
        }
        true
    }

    fn clear_pending(&mut self) {
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_pan = Vec3::ZERO;
        self.pending_zoom = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initial_camera() -> Camera3D {
        Camera3D::new(Vec3::new(0.0, 10.0, -30.0), Vec3::ZERO, 75.0_f32.to_radians(), 1.0, 500.0)
    }

    fn controls(damping: bool) -> OrbitControls {
        let settings = OrbitConfig { damping, ..OrbitConfig::default() };
        OrbitControls::from_camera(&initial_camera(), settings)
    }

    #[test]
    fn view_projection_is_finite() {
        let vp = initial_camera().view_projection(PhysicalSize::new(1280, 720));
        assert!(!vp.to_cols_array().iter().any(|v| v.is_nan() || v.is_infinite()));
    }

    #[test]
    fn controls_reproduce_initial_camera() {
        let camera = controls(false).camera();
        assert!(camera.position.distance(Vec3::new(0.0, 10.0, -30.0)) < 1e-3, "{:?}", camera.position);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn rotate_keeps_distance_to_target() {
        let mut orbit = controls(false);
        let before = orbit.camera().position;
        orbit.rotate(Vec2::new(120.0, -40.0), 720.0);
        assert!(orbit.update());
        let after = orbit.camera().position;
        assert!(after.distance(before) > 1.0);
        assert!((after.length() - before.length()).abs() < 1e-3);
    }

    #[test]
    fn pitch_never_flips_over_the_pole() {
        let mut orbit = controls(false);
        orbit.rotate(Vec2::new(0.0, 100_000.0), 720.0);
        orbit.update();
        assert!(orbit.pitch_radians.abs() <= PITCH_LIMIT + 1e-6);
        assert!(orbit.camera().position.is_finite());
    }

    #[test]
    fn zoom_moves_towards_target() {
        let mut orbit = controls(false);
        let start = orbit.radius;
        orbit.zoom(3.0);
        orbit.update();
        assert!(orbit.radius < start);
        orbit.zoom(-6.0);
        orbit.update();
        assert!(orbit.radius > start);
    }

    #[test]
    fn pan_moves_target_and_camera_together() {
        let mut orbit = controls(false);
        let offset_before = orbit.camera().position - orbit.target;
        orbit.pan(Vec2::new(50.0, 0.0), 720.0);
        orbit.update();
        assert!(orbit.target.length() > 0.1);
        assert!(orbit.target.y.abs() < 1e-4, "horizontal drag stays in the view plane");
        let offset_after = orbit.camera().position - orbit.target;
        assert!(offset_before.distance(offset_after) < 1e-3);
    }

    #[test]
    fn damping_spreads_motion_over_frames() {
        let mut damped = controls(true);
        let start_yaw = damped.yaw_radians;
        damped.rotate(Vec2::new(100.0, 0.0), 720.0);
        damped.update();
        let first_step = crate::wrap_angle(damped.yaw_radians - start_yaw).abs();
        assert!(first_step > 0.0);
        assert!(!damped.is_settled());
        assert!(damped.update(), "motion carries into the next frame");

        let mut undamped = controls(false);
        undamped.rotate(Vec2::new(100.0, 0.0), 720.0);
        undamped.update();
        let full_step = crate::wrap_angle(undamped.yaw_radians - start_yaw).abs();
        assert!(first_step < full_step);
        assert!(undamped.is_settled());
        assert!(!undamped.update());
    }

    #[test]
    fn damping_eventually_settles() {
        let mut orbit = controls(true);
        orbit.rotate(Vec2::new(10.0, 10.0), 720.0);
        let mut frames = 0;
        while orbit.update() {
            frames += 1;
            assert!(frames < 10_000, "damping never settled");
        }
        assert!(orbit.is_settled());
    }
}
