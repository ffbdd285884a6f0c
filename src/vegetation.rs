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

//! The grass strip along the roadside: a fixed row of billboards, each with
//! a random-looking but reproducible yaw. The sway animation is entirely in
//! the vertex shader; the placements never change after startup.

use cgmath::{Vector3, vec3};

pub const GRASS_BLADE_COUNT: usize = 28;
pub const GRASS_SCALE: f32 = 100.0;

const GRASS_ANCHOR: Vector3<f32> = Vector3 {
    x: 90.0,
    y: 40.0,
    z: -500.0,
};
const GRASS_SPACING: f32 = 25.0;
const GRASS_MAX_YAW_DEG: f32 = 90.0;
// Fixed seed so every run dresses the strip identically.
const GRASS_SEED: u32 = 0x6e72_6f61;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrassBlade {
    pub position: Vector3<f32>,
    pub yaw_deg: f32,
}

/// xorshift32; good enough to scatter yaw angles, and deterministic.
struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }
    fn next_f32(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x as f32) / (u32::MAX as f32)
    }
}

/// The strip runs parallel to the highway, one blade every 25 units.
#[must_use]
pub fn grass_strip() -> Vec<GrassBlade> {
    let mut rng = XorShift32::new(GRASS_SEED);
    (0..GRASS_BLADE_COUNT)
        .map(|i| GrassBlade {
            position: vec3(
                GRASS_ANCHOR.x,
                GRASS_ANCHOR.y,
                GRASS_ANCHOR.z - GRASS_SPACING * i as f32,
            ),
            yaw_deg: rng.next_f32() * GRASS_MAX_YAW_DEG,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_has_the_expected_blade_count() {
        assert_eq!(grass_strip().len(), GRASS_BLADE_COUNT);
    }

    #[test]
    fn blades_march_down_the_roadside() {
        let strip = grass_strip();
        for (i, blade) in strip.iter().enumerate() {
            assert_eq!(blade.position.x, GRASS_ANCHOR.x);
            assert_eq!(blade.position.y, GRASS_ANCHOR.y);
            assert_eq!(
                blade.position.z,
                GRASS_ANCHOR.z - GRASS_SPACING * i as f32
            );
        }
    }

    #[test]
    fn yaws_stay_in_range() {
        for blade in grass_strip() {
            assert!(blade.yaw_deg >= 0.0 && blade.yaw_deg <= GRASS_MAX_YAW_DEG);
        }
    }

    #[test]
    fn strip_is_deterministic() {
        assert_eq!(grass_strip(), grass_strip());
    }

    #[test]
    fn yaws_are_not_all_identical() {
        let strip = grass_strip();
        assert!(strip.iter().any(|b| (b.yaw_deg - strip[0].yaw_deg).abs() > 1.0));
    }
}
