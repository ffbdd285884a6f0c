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

//! Model loading: OBJ geometry plus the diffuse textures its MTL points at.

pub mod mesh;
pub mod mtl;
pub mod obj;

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::warn;

pub use mesh::MeshData;

/// A model part ready for GPU upload: geometry and the resolved path of its
/// diffuse texture, if the material declared one.
#[derive(Clone, Debug)]
pub struct ModelPart {
    pub mesh: MeshData,
    pub diffuse_map: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub struct ModelData {
    pub parts: Vec<ModelPart>,
}

/// Loads an OBJ and resolves its material references. A missing or broken
/// MTL is not fatal: the parts just lose their texture assignment and the
/// caller falls back to a placeholder.
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelData> {
    let path = path.as_ref();
    let obj = obj::load_obj_from_path(path)?;
    let obj_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let materials = match &obj.mtl_lib {
        Some(mtl_name) => {
            let mtl_path = obj_dir.join(mtl_name);
            match mtl::load_mtl_from_path(&mtl_path) {
                Ok(materials) => materials,
                Err(err) => {
                    warn!(
                        "Material library failed to load at path {}: {err:#}",
                        mtl_path.display()
                    );
                    mtl::MaterialLib::new()
                }
            }
        }
        None => mtl::MaterialLib::new(),
    };

    let parts = obj
        .groups
        .into_iter()
        .map(|group| {
            let diffuse_map = group
                .material
                .as_ref()
                .and_then(|name| materials.get(name))
                .and_then(|material| material.diffuse_map.as_ref())
                .map(|rel_path| obj_dir.join(rel_path));
            ModelPart {
                mesh: group.mesh,
                diffuse_map,
            }
        })
        .collect();

    Ok(ModelData { parts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn load_model_resolves_material_paths() {
        let dir = std::env::temp_dir().join("nightroad_assets_test");
        fs::create_dir_all(&dir).expect("temp dir");
        fs::write(
            dir.join("part.obj"),
            "mtllib part.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl painted\nf 1 2 3\n",
        )
        .expect("write obj");
        fs::write(dir.join("part.mtl"), "newmtl painted\nmap_Kd paint.png\n")
            .expect("write mtl");

        let model = load_model(dir.join("part.obj")).expect("load model");
        assert_eq!(model.parts.len(), 1);
        assert_eq!(
            model.parts[0].diffuse_map.as_deref(),
            Some(dir.join("paint.png").as_path())
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_model_survives_missing_mtl() {
        let dir = std::env::temp_dir().join("nightroad_assets_test_nomtl");
        fs::create_dir_all(&dir).expect("temp dir");
        fs::write(
            dir.join("bare.obj"),
            "mtllib nowhere.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        )
        .expect("write obj");

        let model = load_model(dir.join("bare.obj")).expect("load model");
        assert_eq!(model.parts.len(), 1);
        assert!(model.parts[0].diffuse_map.is_none());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_model_missing_file_errors() {
        assert!(load_model("definitely/not/a/model.obj").is_err());
    }
}
