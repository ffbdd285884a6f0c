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

//! CPU-side mesh representation used by the loaders. Attributes are kept in
//! separate arrays, one per shader location, the way the drawable builder
//! consumes them.

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Returns `true` if the mesh has geometry and its attribute arrays
    /// line up.
    pub fn is_valid(&self) -> bool {
        !self.positions.is_empty()
            && !self.indices.is_empty()
            && self.normals.len() == self.positions.len()
            && self.uvs.len() == self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_data_validity() {
        let mesh = MeshData {
            positions: vec![[0.0; 3]],
            normals: vec![[0.0, 0.0, 1.0]],
            uvs: vec![[0.0; 2]],
            indices: vec![0],
        };
        assert!(mesh.is_valid());
        assert!(!MeshData::default().is_valid());
    }

    #[test]
    fn mismatched_attribute_lengths_are_invalid() {
        let mesh = MeshData {
            positions: vec![[0.0; 3]; 2],
            normals: vec![[0.0, 0.0, 1.0]],
            uvs: vec![[0.0; 2]; 2],
            indices: vec![0, 1],
        };
        assert!(!mesh.is_valid());
    }
}
