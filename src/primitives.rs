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

pub mod shapes;

use std::cell::RefCell;
use std::rc::Rc;

use crate::draw_context::{Drawable, StorageBuffer, StorageBufferType, Uniform};
use cgmath::{Deg, InnerSpace, Matrix, Matrix3, Matrix4, SquareMatrix, Vector3};
use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};

fn extract_rotation(matrix: Matrix4<f32>) -> Matrix3<f32> {
    // Upper-left 3x3, with per-column normalization to strip scaling.
    let a = Matrix3::from_cols(
        matrix.x.truncate(),
        matrix.y.truncate(),
        matrix.z.truncate(),
    );
    Matrix3::from_cols(a.x.normalize(), a.y.normalize(), a.z.normalize())
}

pub trait Shareable: Sized {
    fn into_shareable(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }
}

pub struct Object3DUniforms {
    pub model: Uniform<[[f32; 4]; 4]>,
    pub normals: Option<Uniform<[[f32; 3]; 3]>>,
}

/// One drawable with its model transform. Lit objects also carry the
/// normal matrix (inverse-transpose of the rotation part).
pub struct Object3D {
    drawable: Drawable,
    transform: Matrix4<f32>,
    opacity: f32,
    uniforms: Object3DUniforms,
}

impl Object3D {
    pub fn new(drawable: Drawable, uniforms: Object3DUniforms) -> Self {
        Object3D {
            drawable,
            transform: Matrix4::<f32>::identity(),
            opacity: 1.0,
            uniforms,
        }
    }
    pub fn set_transform(&mut self, transform: Matrix4<f32>) {
        self.transform = transform;
        self.uniforms.model.write_uniform(self.transform.into());
        self.update_normal_mat();
    }
    pub fn apply_transform(&mut self, transform: Matrix4<f32>) {
        self.set_transform(transform * self.transform);
    }
    #[must_use]
    pub fn get_transform(&self) -> &Matrix4<f32> {
        &self.transform
    }
    fn update_normal_mat(&mut self) {
        let Some(normal_transform) = &mut self.uniforms.normals else {
            return;
        };
        let rotation_mat = extract_rotation(self.transform);
        let normal_mat = rotation_mat
            .invert()
            .unwrap_or_else(Matrix3::identity)
            .transpose();
        normal_transform.write_uniform(normal_mat.into());
    }
    pub fn set_opacity(&mut self, value: f32) {
        self.opacity = value.clamp(0., 1.);
        self.drawable.set_blend_color_opacity(f64::from(self.opacity));
    }
    #[must_use]
    pub fn get_opacity(&self) -> f32 {
        self.opacity
    }
}

impl Shareable for Object3D {}

impl AsRef<Drawable> for Object3D {
    fn as_ref(&self) -> &Drawable {
        &self.drawable
    }
}

/// Per-instance placement: translation, then scale, then yaw, composed the
/// way the placement table composes full transforms.
#[derive(Clone)]
pub struct Object3DInstance {
    translation: Vector3<f32>,
    scale: Vector3<f32>,
    yaw: Deg<f32>,
}

impl Default for Object3DInstance {
    fn default() -> Self {
        Object3DInstance {
            translation: Vector3::new(0., 0., 0.),
            scale: Vector3::new(1., 1., 1.),
            yaw: Deg(0.),
        }
    }
}

impl Object3DInstance {
    pub fn set_translation(&mut self, translation: Vector3<f32>) {
        self.translation = translation;
    }
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = Vector3::new(scale, scale, scale);
    }
    pub fn set_yaw(&mut self, yaw: Deg<f32>) {
        self.yaw = yaw;
    }
    #[must_use]
    pub fn get_transform(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
            * Matrix4::from_angle_y(self.yaw)
    }
    #[must_use]
    pub fn get_normal_matrix(&self) -> Matrix3<f32> {
        Matrix3::from_angle_y(self.yaw)
    }
}

pub struct Object3DInstanceGroupHandlers {
    instances: Vec<Object3DInstance>,
    transforms: StorageBuffer<[[f32; 4]; 4]>,
    normal_mats: StorageBuffer<[[f32; 3]; 3]>,
}

impl Object3DInstanceGroupHandlers {
    pub fn new(context: &crate::draw_context::DrawContext, count: u32) -> Self {
        Object3DInstanceGroupHandlers {
            instances: vec![Object3DInstance::default(); count as usize],
            transforms: StorageBuffer::new_array(context, &vec![[[0.; 4]; 4]; count as usize]),
            normal_mats: StorageBuffer::new_array(context, &vec![[[0.; 3]; 3]; count as usize]),
        }
    }
    #[must_use]
    pub fn transforms(&self) -> &StorageBuffer<[[f32; 4]; 4]> {
        &self.transforms
    }
    #[must_use]
    pub fn normal_mats(&self) -> &StorageBuffer<[[f32; 3]; 3]> {
        &self.normal_mats
    }
    pub fn update_instances<F>(&mut self, f: F)
    where
        F: Fn(usize, &mut Object3DInstance) + 'static + Send + Sync,
    {
        let transforms_writer = self.transforms.start_write();
        let transforms_iter = transforms_writer.storage_buffer.local_buffer.par_iter_mut();
        let normal_mats_writer = self.normal_mats.start_write();
        let normals_iter = normal_mats_writer
            .storage_buffer
            .local_buffer
            .par_iter_mut();

        self.instances
            .par_iter_mut()
            .enumerate()
            .zip(transforms_iter)
            .zip(normals_iter)
            .for_each(|(((idx, instance), transform), normal)| {
                f(idx, instance);
                *transform =
                    Into::<[[f32; 4]; 4]>::into(instance.get_transform()).apply_alignment();
                *normal =
                    Into::<[[f32; 3]; 3]>::into(instance.get_normal_matrix()).apply_alignment();
            });
    }
}

pub struct Object3DInstanceGroup {
    drawable: Drawable,
    handlers: Object3DInstanceGroupHandlers,
}

impl Object3DInstanceGroup {
    pub fn new(drawable: Drawable, handlers: Object3DInstanceGroupHandlers) -> Self {
        Self { drawable, handlers }
    }
    pub fn update_instances<F>(&mut self, f: F)
    where
        F: Fn(usize, &mut Object3DInstance) + 'static + Send + Sync,
    {
        self.handlers.update_instances(f);
    }
}

impl Shareable for Object3DInstanceGroup {}

impl AsRef<Drawable> for Object3DInstanceGroup {
    fn as_ref(&self) -> &Drawable {
        &self.drawable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec4;

    #[test]
    fn instance_transform_applies_scale_before_yaw() {
        let mut instance = Object3DInstance::default();
        instance.set_translation(Vector3::new(10.0, 0.0, 0.0));
        instance.set_scale(2.0);
        instance.set_yaw(Deg(90.0));
        // Local +x rotated by yaw 90 lands on -z, doubled, then translated.
        let transformed = instance.get_transform() * vec4(1.0, 0.0, 0.0, 1.0);
        assert!((transformed.x - 10.0).abs() < 1e-5);
        assert!((transformed.z - (-2.0)).abs() < 1e-5);
    }

    #[test]
    fn extract_rotation_strips_scaling() {
        let matrix = Matrix4::from_angle_y(Deg(90.0)) * Matrix4::from_scale(42.0);
        let rotation = extract_rotation(matrix);
        let rotated = rotation * Vector3::unit_x();
        assert!((rotated.magnitude() - 1.0).abs() < 1e-5);
        assert!((rotated.z - (-1.0)).abs() < 1e-4);
    }
}
