/*
MIT License

Copyright (c) 2025 Vincent Hiribarren

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

//! The scene's fixed light rig and its GPU packing. One directional light,
//! three point lights, nine spotlights, uploaded together as a single
//! uniform. Scalar parameters ride in the `w` lanes of the vec4 rows so the
//! buffer matches WGSL uniform alignment exactly.

use bytemuck::{Pod, Zeroable};
use cgmath::{Deg, Point3, Rad, Vector3, vec3};

pub const POINT_LIGHT_COUNT: usize = 3;
pub const SPOT_LIGHT_COUNT: usize = 9;

/// Spot slot driven by the camera each frame.
pub const SPOT_FLASHLIGHT: usize = 0;
/// Spot slots driven by the driving car each frame.
pub const SPOT_HEADLIGHTS: std::ops::Range<usize> = 5..9;

#[derive(Clone, Copy, Debug)]
pub struct DirLight {
    pub direction: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

#[derive(Clone, Copy, Debug)]
pub struct PointLight {
    pub position: Point3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct SpotLight {
    pub position: Point3<f32>,
    pub direction: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub cut_off: Deg<f32>,
    pub outer_cut_off: Deg<f32>,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl SpotLight {
    /// The scene's warm sodium-tinted spotlight with the standard cone;
    /// only origin, aim and falloff vary between the nine slots.
    #[must_use]
    pub fn warm(position: Point3<f32>, direction: Vector3<f32>, quadratic: f32) -> Self {
        Self {
            position,
            direction,
            ambient: vec3(0.0, 0.0, 0.0),
            diffuse: vec3(1.0, 0.8, 0.1),
            specular: vec3(0.5, 0.5, 0.5),
            cut_off: Deg(12.5),
            outer_cut_off: Deg(17.5),
            constant: 1.0,
            linear: 0.0,
            quadratic,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LightRig {
    pub dir: DirLight,
    pub points: [PointLight; POINT_LIGHT_COUNT],
    pub spots: [SpotLight; SPOT_LIGHT_COUNT],
}

/// Static parts of the rig: moonlight, the garage forecourt lamps, the
/// street lamp under the overhang, and the parked wrecker's crossed beams.
/// Dynamic slots (flashlight, headlights) start dark and are overwritten
/// every frame.
#[must_use]
pub fn night_rig() -> LightRig {
    let forecourt_lamp = |position: Point3<f32>| PointLight {
        position,
        ambient: vec3(10.0, 10.0, 10.0),
        diffuse: vec3(0.9, 0.9, 0.9),
        specular: vec3(1.0, 1.0, 1.0),
        constant: 17.0,
        linear: 0.09,
        quadratic: 0.032,
    };
    let dark_spot = SpotLight::warm(Point3::new(0.0, 0.0, 0.0), vec3(0.0, -1.0, 0.0), 1.0);
    let mut spots = [dark_spot; SPOT_LIGHT_COUNT];
    // Wrecker parked by the garage: two beams lighting the forecourt, and
    // two glow lights aimed back at the headlamps themselves.
    spots[1] = SpotLight::warm(
        Point3::new(34.29, 36.21, -53.63),
        vec3(0.985, -0.158, -0.058),
        0.000_01,
    );
    spots[2] = SpotLight::warm(
        Point3::new(64.38, 33.26, -54.59),
        vec3(-0.999, 0.027, 0.032),
        0.004,
    );
    spots[3] = SpotLight::warm(
        Point3::new(43.17, 34.06, -112.10),
        vec3(0.989, -0.142, 0.048),
        0.000_01,
    );
    spots[4] = SpotLight::warm(
        Point3::new(66.82, 37.20, -113.89),
        vec3(-0.964, -0.224, 0.135),
        0.004,
    );
    LightRig {
        dir: DirLight {
            direction: vec3(-2.0, -1.0, -0.3),
            ambient: vec3(0.35, 0.35, 0.35),
            diffuse: vec3(1.0, 0.8, 0.1),
            specular: vec3(0.5, 0.5, 0.5),
        },
        points: [
            forecourt_lamp(Point3::new(34.29, 36.21, -53.63)),
            forecourt_lamp(Point3::new(-9.0, 35.0, -109.0)),
            forecourt_lamp(Point3::new(12.0, -43.9, -27.0)),
        ],
        spots,
    }
}

/// The camera-mounted flashlight, recomputed from the eye pose each frame.
#[must_use]
pub fn flashlight(position: Point3<f32>, direction: Vector3<f32>) -> SpotLight {
    SpotLight::warm(position, direction, 0.000_01)
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct RawDirLight {
    direction: [f32; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct RawPointLight {
    position_constant: [f32; 4],
    ambient_linear: [f32; 4],
    diffuse_quadratic: [f32; 4],
    specular: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct RawSpotLight {
    position_cut_off: [f32; 4],
    direction_outer_cut_off: [f32; 4],
    ambient_constant: [f32; 4],
    diffuse_linear: [f32; 4],
    specular_quadratic: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct RawLightRig {
    dir: RawDirLight,
    points: [RawPointLight; POINT_LIGHT_COUNT],
    spots: [RawSpotLight; SPOT_LIGHT_COUNT],
}

impl crate::draw_context::UniformType for RawLightRig {
    type AlignedType = Self;
    fn apply_alignment(&self) -> Self::AlignedType {
        *self
    }
}

fn pack(v: Vector3<f32>, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

fn pack_point(p: Point3<f32>, w: f32) -> [f32; 4] {
    [p.x, p.y, p.z, w]
}

impl LightRig {
    #[must_use]
    pub fn to_raw(&self) -> RawLightRig {
        RawLightRig {
            dir: RawDirLight {
                direction: pack(self.dir.direction, 0.0),
                ambient: pack(self.dir.ambient, 0.0),
                diffuse: pack(self.dir.diffuse, 0.0),
                specular: pack(self.dir.specular, 0.0),
            },
            points: self.points.map(|light| RawPointLight {
                position_constant: pack_point(light.position, light.constant),
                ambient_linear: pack(light.ambient, light.linear),
                diffuse_quadratic: pack(light.diffuse, light.quadratic),
                specular: pack(light.specular, 0.0),
            }),
            spots: self.spots.map(|light| RawSpotLight {
                // Cutoffs are uploaded as cosines; the shader compares them
                // against a dot product directly.
                position_cut_off: pack_point(light.position, Rad::from(light.cut_off).0.cos()),
                direction_outer_cut_off: pack(
                    light.direction,
                    Rad::from(light.outer_cut_off).0.cos(),
                ),
                ambient_constant: pack(light.ambient, light.constant),
                diffuse_linear: pack(light.diffuse, light.linear),
                specular_quadratic: pack(light.specular, light.quadratic),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn raw_rig_matches_wgsl_uniform_layout() {
        assert_eq!(size_of::<RawDirLight>(), 64);
        assert_eq!(size_of::<RawPointLight>(), 64);
        assert_eq!(size_of::<RawSpotLight>(), 80);
        assert_eq!(
            size_of::<RawLightRig>(),
            64 + POINT_LIGHT_COUNT * 64 + SPOT_LIGHT_COUNT * 80
        );
    }

    #[test]
    fn cutoffs_are_packed_as_cosines() {
        let rig = night_rig();
        let raw = rig.to_raw();
        let expected_inner = 12.5_f32.to_radians().cos();
        let expected_outer = 17.5_f32.to_radians().cos();
        assert!((raw.spots[1].position_cut_off[3] - expected_inner).abs() < 1e-6);
        assert!((raw.spots[1].direction_outer_cut_off[3] - expected_outer).abs() < 1e-6);
        // The inner cone is tighter, so its cosine is the larger one.
        assert!(raw.spots[1].position_cut_off[3] > raw.spots[1].direction_outer_cut_off[3]);
    }

    #[test]
    fn point_lights_pack_attenuation_in_w_lanes() {
        let raw = night_rig().to_raw();
        for point in &raw.points {
            assert_eq!(point.position_constant[3], 17.0);
            assert_eq!(point.ambient_linear[3], 0.09);
            assert_eq!(point.diffuse_quadratic[3], 0.032);
        }
    }

    #[test]
    fn dynamic_slots_are_reserved() {
        assert_eq!(SPOT_FLASHLIGHT, 0);
        assert_eq!(SPOT_HEADLIGHTS.len(), 4);
        assert!(SPOT_HEADLIGHTS.end <= SPOT_LIGHT_COUNT);
    }
}
