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

//! The fixed placement table of the scene. Every transform is a literal:
//! the set was dressed by eye and these are the numbers it ended up with.

use cgmath::{Deg, Matrix4, Vector3, vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Garage,
    Diner,
    ParkedCar,
    DrivingCar,
    /// Highway segment with guard rails.
    RoadShoulder,
    /// Bare road segment, no rails.
    RoadPlain,
    /// Short connector segment.
    RoadNarrow,
}

impl ModelKind {
    pub const ALL: [ModelKind; 7] = [
        ModelKind::Garage,
        ModelKind::Diner,
        ModelKind::ParkedCar,
        ModelKind::DrivingCar,
        ModelKind::RoadShoulder,
        ModelKind::RoadPlain,
        ModelKind::RoadNarrow,
    ];

    #[must_use]
    pub fn asset_path(self) -> &'static str {
        match self {
            ModelKind::Garage => "resources/models/garage/garage.obj",
            ModelKind::Diner => "resources/models/diner/diner.obj",
            ModelKind::ParkedCar => "resources/models/parked_car/parked_car.obj",
            ModelKind::DrivingCar => "resources/models/driving_car/driving_car.obj",
            ModelKind::RoadShoulder => "resources/models/road_shoulder/road.obj",
            ModelKind::RoadPlain => "resources/models/road_plain/road.obj",
            ModelKind::RoadNarrow => "resources/models/road_narrow/road.obj",
        }
    }
}

pub struct ScenePlacement {
    pub kind: ModelKind,
    pub transform: Matrix4<f32>,
}

/// translate, then scale, then yaw — the composition order the whole set
/// was dressed with.
fn place(translation: Vector3<f32>, scale: Vector3<f32>, yaw: Deg<f32>) -> Matrix4<f32> {
    Matrix4::from_translation(translation)
        * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
        * Matrix4::from_angle_y(yaw)
}

fn place_uniform(translation: Vector3<f32>, scale: f32, yaw: Deg<f32>) -> Matrix4<f32> {
    place(translation, vec3(scale, scale, scale), yaw)
}

/// Static placements; the driving car is animated and placed by the drive
/// path instead.
#[must_use]
pub fn scene_placements() -> Vec<ScenePlacement> {
    use ModelKind::*;
    let mut placements = vec![
        ScenePlacement {
            kind: Garage,
            transform: place_uniform(vec3(-140.0, 0.0, -30.0), 1.05, Deg(90.0)),
        },
        ScenePlacement {
            kind: Diner,
            transform: place_uniform(vec3(-80.0, 0.0, -750.0), 7.0, Deg(90.0)),
        },
        ScenePlacement {
            kind: ParkedCar,
            transform: place_uniform(vec3(-10.0, -0.3, -83.0), 0.2, Deg(90.0)),
        },
    ];
    // The highway: a straight row of segments along x = 370.
    for z in [-50.0, -659.0, -2486.0, 1168.0] {
        placements.push(ScenePlacement {
            kind: RoadShoulder,
            transform: place_uniform(vec3(370.0, 0.0, z), 40.0, Deg(0.0)),
        });
    }
    placements.push(ScenePlacement {
        kind: RoadShoulder,
        transform: place(vec3(370.0, 0.0, 2616.0), vec3(40.0, 40.0, 150.0), Deg(0.0)),
    });
    placements.push(ScenePlacement {
        kind: RoadShoulder,
        transform: place(vec3(370.0, 0.0, -3781.0), vec3(40.0, 40.0, 130.0), Deg(0.0)),
    });
    for z in [-1268.0, 559.0, -1877.0] {
        placements.push(ScenePlacement {
            kind: RoadPlain,
            transform: place_uniform(vec3(370.0, 0.0, z), 40.0, Deg(0.0)),
        });
    }
    placements.push(ScenePlacement {
        kind: RoadNarrow,
        transform: place(vec3(370.0, 0.0, -1178.0), vec3(40.0, 40.0, 28.0), Deg(0.0)),
    });
    // Two bare diagonals branching off toward the garage and the diner.
    placements.push(ScenePlacement {
        kind: RoadPlain,
        transform: place_uniform(vec3(80.0, -3.0, 350.0), 57.0, Deg(225.0)),
    });
    // This one was dressed rotate-first, and its non-uniform scale makes
    // the order visible, so it stays rotate-first.
    placements.push(ScenePlacement {
        kind: RoadPlain,
        transform: Matrix4::from_translation(vec3(100.0, -3.0, -1620.0))
            * Matrix4::from_angle_y(Deg(150.0))
            * Matrix4::from_nonuniform_scale(45.0, 60.0, 70.0),
    });
    placements
}

/// Dirt plane under everything.
#[must_use]
pub fn ground_transform() -> Matrix4<f32> {
    place_uniform(vec3(0.0, -6.0, 0.0), 100.0, Deg(0.0))
}

/// A stray cardboard box behind the diner.
#[must_use]
pub fn cardboard_box_transform() -> Matrix4<f32> {
    place_uniform(vec3(-280.0, 35.5, -550.0), 25.0, Deg(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(kind: ModelKind) -> usize {
        scene_placements()
            .iter()
            .filter(|p| p.kind == kind)
            .count()
    }

    #[test]
    fn placement_counts_are_fixed() {
        assert_eq!(count(ModelKind::Garage), 1);
        assert_eq!(count(ModelKind::Diner), 1);
        assert_eq!(count(ModelKind::ParkedCar), 1);
        assert_eq!(count(ModelKind::DrivingCar), 0);
        assert_eq!(count(ModelKind::RoadShoulder), 6);
        assert_eq!(count(ModelKind::RoadPlain), 5);
        assert_eq!(count(ModelKind::RoadNarrow), 1);
        assert_eq!(scene_placements().len(), 15);
    }

    #[test]
    fn highway_segments_share_the_lane() {
        let placements = scene_placements();
        let highway = placements.iter().filter(|p| {
            matches!(
                p.kind,
                ModelKind::RoadShoulder | ModelKind::RoadPlain | ModelKind::RoadNarrow
            ) && p.transform.w.x == 370.0
        });
        assert_eq!(highway.count(), 10);
    }

    #[test]
    fn garage_translation_lands_in_the_matrix() {
        let placements = scene_placements();
        let garage = placements
            .iter()
            .find(|p| p.kind == ModelKind::Garage)
            .expect("garage placement");
        assert_eq!(garage.transform.w.x, -140.0);
        assert_eq!(garage.transform.w.y, 0.0);
        assert_eq!(garage.transform.w.z, -30.0);
    }

    #[test]
    fn ground_sits_below_the_origin() {
        let ground = ground_transform();
        assert_eq!(ground.w.y, -6.0);
        // Uniform x100 scaling of the 100-unit plane covers the whole set.
        assert_eq!(ground.x.x, 100.0);
    }
}
