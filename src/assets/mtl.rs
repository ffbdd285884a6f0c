//! Minimal MTL parser: the viewer only cares about the diffuse texture of
//! each material, everything else is left to the shader's constants.

use std::{
    collections::HashMap,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Material {
    pub diffuse_map: Option<String>,
}

pub type MaterialLib = HashMap<String, Material>;

pub fn load_mtl_from_path(path: impl AsRef<Path>) -> Result<MaterialLib> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open MTL file: {}", path.as_ref().display()))?;
    parse_mtl(BufReader::new(file))
}

pub fn load_mtl_from_str(contents: &str) -> Result<MaterialLib> {
    parse_mtl(io::Cursor::new(contents))
}

fn parse_mtl<R: BufRead>(reader: R) -> Result<MaterialLib> {
    let mut materials = MaterialLib::new();
    let mut current: Option<String> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };
        match tag {
            "newmtl" => {
                let name = parts.next().unwrap_or_default().to_owned();
                materials.insert(name.clone(), Material::default());
                current = Some(name);
            }
            // Textures can carry options before the filename; the path is
            // the last token.
            "map_Kd" => {
                if let (Some(name), Some(path)) = (&current, parts.last()) {
                    if let Some(material) = materials.get_mut(name) {
                        material.diffuse_map = Some(path.to_owned());
                    }
                }
            }
            _ => {
                // Ka/Kd/Ks/Ns/illum/d and friends are ignored.
            }
        }
    }
    Ok(materials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_diffuse_maps_per_material() {
        let src = r#"
            # two materials
            newmtl bricks
            Kd 0.8 0.8 0.8
            map_Kd bricks_diffuse.png

            newmtl plain
            Kd 1.0 0.0 0.0
        "#;
        let lib = load_mtl_from_str(src).expect("parse mtl");
        assert_eq!(lib.len(), 2);
        assert_eq!(
            lib["bricks"].diffuse_map.as_deref(),
            Some("bricks_diffuse.png")
        );
        assert_eq!(lib["plain"].diffuse_map, None);
    }

    #[test]
    fn map_kd_options_are_skipped() {
        let src = "newmtl wood\nmap_Kd -bm 0.5 wood.jpg\n";
        let lib = load_mtl_from_str(src).expect("parse mtl");
        assert_eq!(lib["wood"].diffuse_map.as_deref(), Some("wood.jpg"));
    }

    #[test]
    fn map_kd_without_material_is_ignored() {
        let lib = load_mtl_from_str("map_Kd orphan.png\n").expect("parse mtl");
        assert!(lib.is_empty());
    }
}
