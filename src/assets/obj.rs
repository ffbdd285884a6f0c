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

//! OBJ parser supporting positions, normals, texture coordinates and
//! `usemtl` material groups. Faces are fan-triangulated, vertices are
//! deduplicated per group.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result, anyhow};

use super::mesh::MeshData;

/// One run of faces sharing a material.
#[derive(Clone, Debug, Default)]
pub struct ObjGroup {
    pub material: Option<String>,
    pub mesh: MeshData,
}

/// A parsed OBJ file: its material groups plus the `mtllib` reference.
#[derive(Clone, Debug, Default)]
pub struct ObjFile {
    pub mtl_lib: Option<String>,
    pub groups: Vec<ObjGroup>,
}

pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<ObjFile> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open OBJ file: {}", path.as_ref().display()))?;
    load_obj_from_reader(BufReader::new(file))
}

pub fn load_obj_from_reader<R: BufRead>(reader: R) -> Result<ObjFile> {
    parse_obj(reader)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<ObjFile> {
    parse_obj(io::Cursor::new(contents))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
struct VertexKey(usize, Option<usize>, Option<usize>);

#[derive(Default)]
struct GroupBuilder {
    material: Option<String>,
    unique: HashMap<VertexKey, u32>,
    mesh: MeshData,
}

impl GroupBuilder {
    fn with_material(material: Option<String>) -> Self {
        Self {
            material,
            ..Self::default()
        }
    }
    fn finish(self, groups: &mut Vec<ObjGroup>) {
        if self.mesh.is_valid() {
            groups.push(ObjGroup {
                material: self.material,
                mesh: self.mesh,
            });
        }
    }
}

fn parse_obj<R: BufRead>(reader: R) -> Result<ObjFile> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut texcoords: Vec<[f32; 2]> = Vec::new();

    let mut mtl_lib: Option<String> = None;
    let mut groups: Vec<ObjGroup> = Vec::new();
    let mut current = GroupBuilder::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let tag = parts
            .next()
            .ok_or_else(|| anyhow!("Malformed OBJ line {}: '{}'", line_no + 1, trimmed))?;

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), line_no, "x coordinate")?;
                let y = parse_f32(parts.next(), line_no, "y coordinate")?;
                let z = parse_f32(parts.next(), line_no, "z coordinate")?;
                positions.push([x, y, z]);
            }
            "vt" => {
                let u = parse_f32(parts.next(), line_no, "u coordinate")?;
                let v = parse_f32(parts.next(), line_no, "v coordinate")?;
                texcoords.push([u, v]);
            }
            "vn" => {
                let nx = parse_f32(parts.next(), line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), line_no, "nz coordinate")?;
                normals.push([nx, ny, nz]);
            }
            "mtllib" => {
                mtl_lib = parts.next().map(str::to_owned);
            }
            "usemtl" => {
                let material = parts.next().map(str::to_owned);
                let previous = std::mem::replace(&mut current, GroupBuilder::with_material(material));
                previous.finish(&mut groups);
            }
            "f" => {
                let mut face_indices: Vec<u32> = Vec::new();
                for part in parts {
                    let (vi, vti, vni) = parse_face_vertex(
                        part,
                        positions.len(),
                        texcoords.len(),
                        normals.len(),
                        line_no,
                    )?;
                    let key = VertexKey(vi, vti, vni);
                    let index = match current.unique.get(&key) {
                        Some(&idx) => idx,
                        None => {
                            let position = positions.get(vi).copied().ok_or_else(|| {
                                anyhow!("Position index out of bounds on line {}", line_no + 1)
                            })?;
                            let uv = vti
                                .and_then(|i| texcoords.get(i).copied())
                                .unwrap_or([0.0, 0.0]);
                            let normal = vni
                                .and_then(|i| normals.get(i).copied())
                                .unwrap_or([0.0, 0.0, 1.0]);

                            let idx = u32::try_from(current.mesh.positions.len())
                                .map_err(|_| anyhow!("Too many vertices in OBJ (>{})", u32::MAX))?;
                            current.mesh.positions.push(position);
                            current.mesh.normals.push(normal);
                            current.mesh.uvs.push(uv);
                            current.unique.insert(key, idx);
                            idx
                        }
                    };
                    face_indices.push(index);
                }

                if face_indices.len() < 3 {
                    continue;
                }
                // Triangulate fan
                for tri in 1..(face_indices.len() - 1) {
                    current.mesh.indices.push(face_indices[0]);
                    current.mesh.indices.push(face_indices[tri]);
                    current.mesh.indices.push(face_indices[tri + 1]);
                }
            }
            _ => {
                // Ignore other directives (o/g/s/etc.)
            }
        }
    }
    current.finish(&mut groups);

    if groups.is_empty() {
        anyhow::bail!("OBJ contained no triangles");
    }

    Ok(ObjFile { mtl_lib, groups })
}

fn parse_f32(value: Option<&str>, line_no: usize, what: &str) -> Result<f32> {
    let token = value.ok_or_else(|| anyhow!("Missing {} on line {}", what, line_no + 1))?;
    token
        .parse::<f32>()
        .with_context(|| format!("Failed to parse {} on line {}", what, line_no + 1))
}

fn parse_face_vertex(
    token: &str,
    pos_count: usize,
    tex_count: usize,
    norm_count: usize,
    line_no: usize,
) -> Result<(usize, Option<usize>, Option<usize>)> {
    let mut split = token.split('/');
    let pos = split
        .next()
        .ok_or_else(|| anyhow!("Malformed face element '{}' on line {}", token, line_no + 1))?;
    let pos_idx = resolve_index(pos, pos_count, line_no)?;

    let tex_idx = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, tex_count, line_no)?),
        _ => None,
    };

    let norm_idx = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, norm_count, line_no)?),
        _ => None,
    };

    Ok((pos_idx, tex_idx, norm_idx))
}

fn resolve_index(token: &str, len: usize, line_no: usize) -> Result<usize> {
    let raw = token
        .parse::<i32>()
        .with_context(|| format!("Invalid index '{}' on line {}", token, line_no + 1))?;
    if raw == 0 {
        anyhow::bail!("OBJ indices are 1-based; found 0 on line {}", line_no + 1);
    }

    let idx = if raw > 0 {
        (raw - 1) as isize
    } else {
        (len as isize) + (raw as isize)
    };

    if idx < 0 || idx as usize >= len {
        anyhow::bail!(
            "OBJ index {} resolved out of bounds (len={}) on line {}",
            raw,
            len,
            line_no + 1
        );
    }

    Ok(idx as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_triangle() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            vn 0.0 0.0 1.0
            vt 0.0 0.0
            vt 1.0 0.0
            vt 0.0 1.0
            f 1/1/1 2/2/1 3/3/1
        "#;
        let obj = load_obj_from_str(src).expect("parse triangle");
        assert_eq!(obj.groups.len(), 1);
        let mesh = &obj.groups[0].mesh;
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.indices.len(), 3);
        assert!(mesh.is_valid());
    }

    #[test]
    fn quad_is_fan_triangulated() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 1.0 1.0 0.0
            v 0.0 1.0 0.0
            f 1 2 3 4
        "#;
        let obj = load_obj_from_str(src).expect("parse quad");
        let mesh = &obj.groups[0].mesh;
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn negative_indices_resolve_from_end() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            f -3 -2 -1
        "#;
        let obj = load_obj_from_str(src).expect("parse negative indices");
        assert_eq!(obj.groups[0].mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn usemtl_starts_a_new_group() {
        let src = r#"
            mtllib scene.mtl
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            usemtl bricks
            f 1 2 3
            usemtl glass
            f 3 2 1
        "#;
        let obj = load_obj_from_str(src).expect("parse groups");
        assert_eq!(obj.mtl_lib.as_deref(), Some("scene.mtl"));
        assert_eq!(obj.groups.len(), 2);
        assert_eq!(obj.groups[0].material.as_deref(), Some("bricks"));
        assert_eq!(obj.groups[1].material.as_deref(), Some("glass"));
        assert!(obj.groups.iter().all(|g| g.mesh.indices.len() == 3));
    }

    #[test]
    fn missing_attributes_get_defaults() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            f 1 2 3
        "#;
        let obj = load_obj_from_str(src).expect("parse bare positions");
        let mesh = &obj.groups[0].mesh;
        assert_eq!(mesh.normals[0], [0.0, 0.0, 1.0]);
        assert_eq!(mesh.uvs[0], [0.0, 0.0]);
    }

    #[test]
    fn vertices_dedup_within_a_group() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            v 1.0 1.0 0.0
            f 1 2 3
            f 3 2 4
        "#;
        let obj = load_obj_from_str(src).expect("parse shared vertices");
        let mesh = &obj.groups[0].mesh;
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn empty_obj_is_an_error() {
        assert!(load_obj_from_str("# nothing here\n").is_err());
    }

    #[test]
    fn zero_index_is_an_error() {
        let src = "v 0 0 0\nf 0 0 0\n";
        assert!(load_obj_from_str(src).is_err());
    }

    #[test]
    fn out_of_bounds_index_is_an_error() {
        let src = "v 0 0 0\nf 1 2 3\n";
        assert!(load_obj_from_str(src).is_err());
    }
}
