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

//! The one moving thing in the scene: a car driving down the highway at
//! constant speed, looping back to the horizon when it runs off the far
//! end. Its position is a pure function of elapsed time, and its four
//! headlight spotlights ride along at fixed offsets.

use cgmath::{Deg, Matrix4, Point3, vec3};

use crate::lights::SpotLight;

pub struct DrivePath {
    /// x of the driving lane.
    pub lane_x: f32,
    /// z where a lap starts, far behind the camera.
    pub start_z: f32,
    /// z where the car wraps back to the start.
    pub reset_z: f32,
    /// Units per second, toward -z.
    pub speed: f32,
}

impl Default for DrivePath {
    fn default() -> Self {
        Self {
            lane_x: 450.0,
            start_z: 3685.0,
            reset_z: -4730.0,
            speed: 300.0,
        }
    }
}

/// Offsets of the four headlight spots relative to the car's z, and their
/// fixed aim directions. "Beam" spots throw light down the road, "glow"
/// spots point back at the headlamp housings so they read as lit.
const BEAM_RIGHT: HeadlightSlot = HeadlightSlot {
    offset: [24.04, 23.76, -76.53],
    direction: [-0.0001, -0.103, -0.995],
    quadratic: 0.000_01,
};
const GLOW_RIGHT: HeadlightSlot = HeadlightSlot {
    offset: [25.07, 24.54, -92.58],
    direction: [-0.009, -0.052, 0.999],
    quadratic: 0.004,
};
const BEAM_LEFT: HeadlightSlot = HeadlightSlot {
    offset: [-24.37, 23.41, -77.89],
    direction: [-0.012, -0.104, -0.995],
    quadratic: 0.000_01,
};
const GLOW_LEFT: HeadlightSlot = HeadlightSlot {
    offset: [-24.93, 24.54, -93.02],
    direction: [-0.009, -0.052, 0.999],
    quadratic: 0.004,
};

struct HeadlightSlot {
    offset: [f32; 3],
    direction: [f32; 3],
    quadratic: f32,
}

impl DrivePath {
    #[must_use]
    pub fn cycle_length(&self) -> f32 {
        self.start_z - self.reset_z
    }

    /// Car z at a given elapsed time, wrapped to the lap.
    #[must_use]
    pub fn car_z(&self, elapsed_secs: f32) -> f32 {
        let traveled = (self.speed * elapsed_secs).rem_euclid(self.cycle_length());
        self.start_z - traveled
    }

    #[must_use]
    pub fn car_transform(&self, car_z: f32) -> Matrix4<f32> {
        Matrix4::from_translation(vec3(self.lane_x, 0.0, car_z))
            * Matrix4::from_scale(35.0)
            * Matrix4::from_angle_y(Deg(180.0))
    }

    /// The four headlight spotlights for a car at `car_z`, in rig order:
    /// right beam, right glow, left beam, left glow.
    #[must_use]
    pub fn headlights(&self, car_z: f32) -> [SpotLight; 4] {
        [BEAM_RIGHT, GLOW_RIGHT, BEAM_LEFT, GLOW_LEFT].map(|slot| {
            SpotLight::warm(
                Point3::new(
                    self.lane_x + slot.offset[0],
                    slot.offset[1],
                    car_z + slot.offset[2],
                ),
                vec3(slot.direction[0], slot.direction[1], slot.direction[2]),
                slot.quadratic,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_the_horizon() {
        let path = DrivePath::default();
        assert_eq!(path.car_z(0.0), 3685.0);
    }

    #[test]
    fn drives_toward_negative_z() {
        let path = DrivePath::default();
        assert_eq!(path.car_z(1.0), 3685.0 - 300.0);
        assert!(path.car_z(2.0) < path.car_z(1.0));
    }

    #[test]
    fn wraps_after_a_full_lap() {
        let path = DrivePath::default();
        let lap_secs = path.cycle_length() / path.speed;
        let just_before = path.car_z(lap_secs - 0.01);
        let just_after = path.car_z(lap_secs + 0.01);
        assert!(just_before < path.reset_z + path.speed * 0.02);
        assert!(just_after > path.start_z - path.speed * 0.02);
    }

    #[test]
    fn car_z_never_leaves_the_lap() {
        let path = DrivePath::default();
        for i in 0..1000 {
            let z = path.car_z(i as f32 * 0.73);
            assert!(z <= path.start_z && z > path.reset_z, "z out of lap: {z}");
        }
    }

    #[test]
    fn headlights_track_the_car() {
        let path = DrivePath::default();
        let at_start = path.headlights(path.start_z);
        // Original dressing: right beam at z 3608.47 for a car at 3685.
        assert!((at_start[0].position.z - 3608.47).abs() < 1e-3);
        assert!((at_start[0].position.x - 474.04).abs() < 1e-3);
        let later = path.headlights(path.start_z - 500.0);
        for (before, after) in at_start.iter().zip(later.iter()) {
            assert!((before.position.z - after.position.z - 500.0).abs() < 1e-3);
            assert_eq!(before.position.y, after.position.y);
        }
    }

    #[test]
    fn beams_point_down_the_road_and_glows_point_back() {
        let path = DrivePath::default();
        let lights = path.headlights(0.0);
        assert!(lights[0].direction.z < -0.9); // right beam
        assert!(lights[1].direction.z > 0.9); // right glow
        assert!(lights[2].direction.z < -0.9); // left beam
        assert!(lights[3].direction.z > 0.9); // left glow
    }

    #[test]
    fn car_transform_places_the_car_in_lane() {
        let path = DrivePath::default();
        let transform = path.car_transform(100.0);
        assert_eq!(transform.w.x, 450.0);
        assert_eq!(transform.w.z, 100.0);
    }
}
