/*
MIT License

Copyright (c) 2021, 2022, 2024, 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use cgmath::{Deg, InnerSpace, Matrix3, Matrix4, PerspectiveFov, Point3, Rad, Vector3, vec3, vec4};
use log::warn;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::Dimensions;

static SWITCH_Z_AXIS: LazyLock<Matrix4<f32>> =
    LazyLock::new(|| Matrix4::from_nonuniform_scale(1., 1., -1.));
static TO_WEBGPU_NDCS: LazyLock<Matrix4<f32>> = LazyLock::new(|| {
    Matrix4::from_translation(vec3(0., 0., 0.5)) * Matrix4::from_nonuniform_scale(1., 1., 0.5)
});

pub struct CameraView {
    pub eye: Point3<f32>,
    pub center: Point3<f32>,
    pub up: Vector3<f32>,
}

impl CameraView {
    #[must_use]
    pub fn calc_view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_lh(self.eye, self.center, self.up)
    }
    #[must_use]
    pub fn forward(&self) -> Vector3<f32> {
        (self.center - self.eye).normalize()
    }
    pub fn set_pose(&mut self, eye: Point3<f32>, forward: Vector3<f32>) {
        self.eye = eye;
        self.center = eye + forward.normalize();
    }
    pub fn move_x(&mut self, val: f32) {
        let right = self.up.cross(self.forward());
        self.eye += right * val;
        self.center += right * val;
    }
    pub fn move_y(&mut self, val: f32) {
        self.eye += self.up * val;
        self.center += self.up * val;
    }
    pub fn move_z(&mut self, val: f32) {
        let forward = self.forward();
        self.eye += forward * val;
        self.center += forward * val;
    }
    pub fn tilt(&mut self, val: f32) {
        let forward = self.forward();
        let right = self.up.cross(forward);
        let rotation = Matrix3::from_axis_angle(right, Rad(val));
        let rotated_forward = rotation * forward;
        self.center = self.eye + rotated_forward * (self.center - self.eye).magnitude();
    }
    pub fn pan(&mut self, val: f32) {
        let forward = self.forward();
        let rotation = Matrix3::from_axis_angle(self.up, Rad(val));
        let rotated_forward = rotation * forward;
        self.center = self.eye + rotated_forward * (self.center - self.eye).magnitude();
    }
}

impl Default for CameraView {
    fn default() -> Self {
        // The viewer starts just in front of the garage forecourt, facing
        // down the scene's -z axis.
        Self {
            eye: Point3 {
                x: 0.0,
                y: 0.0,
                z: 3.0,
            },
            center: Point3 {
                x: 0.0,
                y: 0.0,
                z: 2.0,
            },
            up: Vector3 {
                x: 0.0,
                y: 1.0,
                z: 0.0,
            },
        }
    }
}

pub trait CameraProjection {
    fn calc_projection(&self) -> Matrix4<f32>;
    fn resize_screen(&mut self, dimensions: Dimensions);
    /// Scroll-wheel zoom; projections that cannot zoom ignore it.
    fn zoom(&mut self, _delta_deg: f32) {}
}

pub struct PerspectiveCameraConfig {
    pub fovy_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCameraConfig {
    pub const MIN_FOVY_DEG: f32 = 1.0;
    pub const MAX_FOVY_DEG: f32 = 45.0;
}

impl Default for PerspectiveCameraConfig {
    fn default() -> Self {
        // The far plane is huge on purpose: the road runs for several
        // thousand units.
        Self {
            fovy_deg: Self::MAX_FOVY_DEG,
            aspect: 16. / 9.,
            near: 0.1,
            far: 10_000.0,
        }
    }
}

impl CameraProjection for PerspectiveCameraConfig {
    fn calc_projection(&self) -> Matrix4<f32> {
        Matrix4::from(PerspectiveFov {
            fovy: Rad::from(Deg(self.fovy_deg)),
            aspect: self.aspect,
            near: self.near,
            far: self.far,
        })
    }
    fn resize_screen(&mut self, dimensions: Dimensions) {
        self.aspect = dimensions.surface_ratio();
    }
    fn zoom(&mut self, delta_deg: f32) {
        self.fovy_deg =
            (self.fovy_deg - delta_deg).clamp(Self::MIN_FOVY_DEG, Self::MAX_FOVY_DEG);
    }
}

pub struct Camera {
    projection: Box<dyn CameraProjection>,
    view: CameraView,
    projection_cache: Matrix4<f32>,
    view_cache: Matrix4<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            CameraView::default(),
            Box::new(PerspectiveCameraConfig::default()),
        )
    }
}

impl Camera {
    #[must_use]
    pub fn new(view: CameraView, projection: Box<dyn CameraProjection>) -> Self {
        let view_cache = view.calc_view_matrix();
        let projection_cache = projection.calc_projection();
        Self {
            projection,
            view,
            projection_cache,
            view_cache,
        }
    }
    fn update_view_cache(&mut self) {
        self.view_cache = self.view.calc_view_matrix();
    }
    fn update_projection_cache(&mut self) {
        self.projection_cache = self.projection.calc_projection();
    }
    pub fn resize_screen(&mut self, dimensions: Dimensions) {
        self.projection.resize_screen(dimensions);
        self.update_projection_cache();
    }
    #[must_use]
    pub fn get_camera_matrix(&self) -> Matrix4<f32> {
        (*TO_WEBGPU_NDCS) * self.projection_cache * (*SWITCH_Z_AXIS) * self.view_cache
    }
    /// Same chain with the view translation removed, so the skybox stays
    /// glued to the horizon.
    #[must_use]
    pub fn get_skybox_matrix(&self) -> Matrix4<f32> {
        let mut rotation_only = self.view_cache;
        rotation_only.w = vec4(0., 0., 0., 1.);
        (*TO_WEBGPU_NDCS) * self.projection_cache * (*SWITCH_Z_AXIS) * rotation_only
    }
    #[must_use]
    pub fn eye_position(&self) -> Point3<f32> {
        self.view.eye
    }
    #[must_use]
    pub fn forward(&self) -> Vector3<f32> {
        self.view.forward()
    }
    pub fn set_pose(&mut self, eye: Point3<f32>, forward: Vector3<f32>) {
        self.view.set_pose(eye, forward);
        self.update_view_cache();
    }
    pub fn move_z(&mut self, val: f32) {
        self.view.move_z(val);
        self.update_view_cache();
    }
    pub fn move_x(&mut self, val: f32) {
        self.view.move_x(val);
        self.update_view_cache();
    }
    pub fn move_y(&mut self, val: f32) {
        self.view.move_y(val);
        self.update_view_cache();
    }
    pub fn pan(&mut self, val: f32) {
        self.view.pan(val);
        self.update_view_cache();
    }
    pub fn tilt(&mut self, val: f32) {
        self.view.tilt(val);
        self.update_view_cache();
    }
    pub fn zoom(&mut self, delta_deg: f32) {
        self.projection.zoom(delta_deg);
        self.update_projection_cache();
    }
}

/// Winit adapter for the free-fly camera: WASD/arrow movement with a Shift
/// boost, mouse look, scroll-wheel zoom.
pub struct FlyCamera {
    pub controlled_camera: Camera,
    pub mouse_look_enabled: bool,
    enabled_keys: BTreeSet<KeyCode>,
    key_speed: f32,
    rotation_speed: f32,
}

impl FlyCamera {
    // Per-frame step; the scene is built at a scale of hundreds of units.
    const DEFAULT_KEY_SPEED: f32 = 5.0;
    const DEFAULT_ROTATION_SPEED: f32 = 1.0 / 500.0;
    const SPEED_MULTIPLICATOR: f32 = 10.0;
    const SCROLL_ZOOM_DEG: f32 = 1.0;

    #[must_use]
    pub fn new(camera: Camera) -> Self {
        Self {
            controlled_camera: camera,
            mouse_look_enabled: true,
            enabled_keys: BTreeSet::new(),
            key_speed: Self::DEFAULT_KEY_SPEED,
            rotation_speed: Self::DEFAULT_ROTATION_SPEED,
        }
    }

    #[must_use]
    pub fn get_camera_matrix(&self) -> Matrix4<f32> {
        self.controlled_camera.get_camera_matrix()
    }

    pub fn update_screen_size(&mut self, dimensions: Dimensions) {
        self.controlled_camera.resize_screen(dimensions);
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn mouse_event_listener(&mut self, event: &DeviceEvent) {
        match event {
            DeviceEvent::MouseMotion { delta } if self.mouse_look_enabled => {
                self.controlled_camera
                    .pan(delta.0 as f32 * self.rotation_speed);
                // Reversed: moving the mouse up tilts the view up.
                self.controlled_camera
                    .tilt(delta.1 as f32 * self.rotation_speed);
            }
            DeviceEvent::MouseWheel {
                delta: MouseScrollDelta::LineDelta(_, y),
            } => {
                self.controlled_camera.zoom(y * Self::SCROLL_ZOOM_DEG);
            }
            _ => {}
        }
    }

    pub fn keyboard_event_listener(&mut self, input: &KeyEvent) {
        let PhysicalKey::Code(key_code) = input.physical_key else {
            warn!("Strange key pushed");
            return;
        };
        if input.state == ElementState::Pressed {
            self.enabled_keys.insert(key_code);
        } else {
            self.enabled_keys.remove(&key_code);
        }
    }

    pub fn update_control(&mut self) {
        if self.enabled_keys.is_empty() {
            return;
        }
        let mut key_speed = self.key_speed;
        if self.enabled_keys.contains(&KeyCode::ShiftLeft)
            || self.enabled_keys.contains(&KeyCode::ShiftRight)
        {
            key_speed *= Self::SPEED_MULTIPLICATOR;
        }
        for key in &self.enabled_keys {
            match *key {
                KeyCode::KeyW | KeyCode::ArrowUp => self.controlled_camera.move_z(key_speed),
                KeyCode::KeyS | KeyCode::ArrowDown => self.controlled_camera.move_z(-key_speed),
                KeyCode::KeyA | KeyCode::ArrowLeft => self.controlled_camera.move_x(-key_speed),
                KeyCode::KeyD | KeyCode::ArrowRight => self.controlled_camera.move_x(key_speed),
                KeyCode::PageUp => self.controlled_camera.move_y(key_speed),
                KeyCode::PageDown => self.controlled_camera.move_y(-key_speed),
                _ => {}
            }
        }
    }
}

impl AsRef<Camera> for FlyCamera {
    fn as_ref(&self) -> &Camera {
        &self.controlled_camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec3_close(actual: Vector3<f32>, expected: Vector3<f32>) {
        assert!(
            (actual - expected).magnitude() < 1e-5,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn default_view_faces_negative_z() {
        let view = CameraView::default();
        assert_vec3_close(view.forward(), vec3(0.0, 0.0, -1.0));
    }

    #[test]
    fn set_pose_normalizes_forward() {
        let mut view = CameraView::default();
        view.set_pose(Point3::new(1.0, 2.0, 3.0), vec3(0.0, 0.0, -10.0));
        assert_vec3_close(view.forward(), vec3(0.0, 0.0, -1.0));
        assert_vec3_close(
            view.eye - Point3::new(0.0, 0.0, 0.0),
            vec3(1.0, 2.0, 3.0),
        );
    }

    #[test]
    fn zoom_clamps_to_configured_range() {
        let mut projection = PerspectiveCameraConfig::default();
        projection.zoom(100.0);
        assert_eq!(projection.fovy_deg, PerspectiveCameraConfig::MIN_FOVY_DEG);
        projection.zoom(-100.0);
        assert_eq!(projection.fovy_deg, PerspectiveCameraConfig::MAX_FOVY_DEG);
    }

    #[test]
    fn moving_forward_keeps_direction() {
        let mut view = CameraView::default();
        view.move_z(10.0);
        assert_vec3_close(
            view.eye - Point3::new(0.0, 0.0, 0.0),
            vec3(0.0, 0.0, -7.0),
        );
        assert_vec3_close(view.forward(), vec3(0.0, 0.0, -1.0));
    }

    #[test]
    fn pan_preserves_eye_position() {
        let mut view = CameraView::default();
        view.pan(0.5);
        assert_vec3_close(
            view.eye - Point3::new(0.0, 0.0, 0.0),
            vec3(0.0, 0.0, 3.0),
        );
    }
}
