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

//! Literal vertex tables for the procedural set dressing. Everything here is
//! drawn non-indexed, one attribute buffer per shader location.

macro_rules! vertex_count {
    ($table:expr) => {{
        const LEN: usize = $table.len();
        assert!(!(LEN > u32::MAX as usize), "Value exceeds u32::MAX");
        LEN as u32
    }};
}

/// Unit cube centered on the origin, 12 triangles with uv per face.
#[rustfmt::skip]
pub const CUBE_POSITIONS: &[[f32; 3]] = &[
    // back face
    [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5],
    [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5], [-0.5, -0.5, -0.5],
    // front face
    [-0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5, -0.5,  0.5],
    [ 0.5,  0.5,  0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5],
    // left face
    [-0.5,  0.5,  0.5], [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5],
    [-0.5, -0.5, -0.5], [-0.5,  0.5,  0.5], [-0.5, -0.5,  0.5],
    // right face
    [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5],
    [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5],
    // bottom face
    [-0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5],
    [ 0.5, -0.5,  0.5], [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5],
    // top face
    [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
    [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
];

#[rustfmt::skip]
pub const CUBE_UVS: &[[f32; 2]] = &[
    [0., 0.], [1., 0.], [1., 1.],  [1., 1.], [0., 1.], [0., 0.],
    [0., 0.], [1., 1.], [1., 0.],  [1., 1.], [0., 0.], [0., 1.],
    [1., 0.], [0., 1.], [1., 1.],  [0., 1.], [1., 0.], [0., 0.],
    [1., 0.], [1., 1.], [0., 1.],  [0., 1.], [0., 0.], [1., 0.],
    [0., 1.], [1., 0.], [1., 1.],  [1., 0.], [0., 1.], [0., 0.],
    [0., 1.], [1., 1.], [1., 0.],  [1., 0.], [0., 0.], [0., 1.],
];

pub const CUBE_VERTEX_COUNT: u32 = vertex_count!(CUBE_POSITIONS);

/// Skybox cube, positions only; faces wind inward so the cube is seen from
/// its center.
#[rustfmt::skip]
pub const SKYBOX_POSITIONS: &[[f32; 3]] = &[
    [-1.,  1., -1.], [-1., -1., -1.], [ 1., -1., -1.],
    [ 1., -1., -1.], [ 1.,  1., -1.], [-1.,  1., -1.],

    [-1., -1.,  1.], [-1., -1., -1.], [-1.,  1., -1.],
    [-1.,  1., -1.], [-1.,  1.,  1.], [-1., -1.,  1.],

    [ 1., -1., -1.], [ 1., -1.,  1.], [ 1.,  1.,  1.],
    [ 1.,  1.,  1.], [ 1.,  1., -1.], [ 1., -1., -1.],

    [-1., -1.,  1.], [-1.,  1.,  1.], [ 1.,  1.,  1.],
    [ 1.,  1.,  1.], [ 1., -1.,  1.], [-1., -1.,  1.],

    [-1.,  1., -1.], [ 1.,  1., -1.], [ 1.,  1.,  1.],
    [ 1.,  1.,  1.], [-1.,  1.,  1.], [-1.,  1., -1.],

    [-1., -1., -1.], [-1., -1.,  1.], [ 1., -1., -1.],
    [ 1., -1., -1.], [-1., -1.,  1.], [ 1., -1.,  1.],
];

pub const SKYBOX_VERTEX_COUNT: u32 = vertex_count!(SKYBOX_POSITIONS);

/// One grass blade: a unit-height quad rooted at x in [0, 1], v=0 at the top.
#[rustfmt::skip]
pub const BILLBOARD_POSITIONS: &[[f32; 3]] = &[
    [0.,  0.5, 0.], [0., -0.5, 0.], [1., -0.5, 0.],
    [0.,  0.5, 0.], [1., -0.5, 0.], [1.,  0.5, 0.],
];

#[rustfmt::skip]
pub const BILLBOARD_UVS: &[[f32; 2]] = &[
    [0., 0.], [0., 1.], [1., 1.],
    [0., 0.], [1., 1.], [1., 0.],
];

pub const BILLBOARD_VERTEX_COUNT: u32 = vertex_count!(BILLBOARD_POSITIONS);

/// Ground plane: a 100x100 quad (before scaling) with the texture tiled
/// twice in each direction and +y normals.
#[rustfmt::skip]
pub const PLANE_POSITIONS: &[[f32; 3]] = &[
    [ 50., 0.,  50.], [-50., 0., -50.], [-50., 0.,  50.],
    [ 50., 0.,  50.], [ 50., 0., -50.], [-50., 0., -50.],
];

#[rustfmt::skip]
pub const PLANE_UVS: &[[f32; 2]] = &[
    [2., 0.], [0., 2.], [0., 0.],
    [2., 0.], [2., 2.], [0., 2.],
];

#[rustfmt::skip]
pub const PLANE_NORMALS: &[[f32; 3]] = &[
    [0., 1., 0.], [0., 1., 0.], [0., 1., 0.],
    [0., 1., 0.], [0., 1., 0.], [0., 1., 0.],
];

pub const PLANE_VERTEX_COUNT: u32 = vertex_count!(PLANE_POSITIONS);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_tables_are_consistent() {
        assert_eq!(CUBE_POSITIONS.len(), CUBE_UVS.len());
        assert_eq!(BILLBOARD_POSITIONS.len(), BILLBOARD_UVS.len());
        assert_eq!(PLANE_POSITIONS.len(), PLANE_UVS.len());
        assert_eq!(PLANE_POSITIONS.len(), PLANE_NORMALS.len());
        assert_eq!(CUBE_VERTEX_COUNT, 36);
        assert_eq!(SKYBOX_VERTEX_COUNT, 36);
        assert_eq!(BILLBOARD_VERTEX_COUNT, 6);
        assert_eq!(PLANE_VERTEX_COUNT, 6);
    }
}
