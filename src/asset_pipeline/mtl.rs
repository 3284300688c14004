//! Wavefront MTL material libraries.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::color::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct MtlMaterial {
    pub name: String,
    pub diffuse: Color,
    pub specular: Color,
    pub shininess: f32,
    pub opacity: f32,
    /// Resolved against the library's directory
    pub diffuse_map: Option<PathBuf>,
}

impl MtlMaterial {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            diffuse: Color::WHITE,
            specular: Color::from_hex(0x111111),
            shininess: 30.0,
            opacity: 1.0,
            diffuse_map: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialLibrary {
    pub materials: Vec<MtlMaterial>,
}

impl MaterialLibrary {
    pub fn get(&self, name: &str) -> Option<&MtlMaterial> {
        self.materials.iter().find(|material| material.name == name)
    }
}

fn parse_color(args: &[&str]) -> Result<Color> {
    let values = args
        .iter()
        .take(3)
        .map(|arg| arg.parse::<f32>().with_context(|| format!("invalid number {:?}", arg)))
        .collect::<Result<Vec<_>>>()?;

    match values[..] {
        // Gamma encoded like any other authored color
        [r, g, b] => Ok(Color::from_srgb(r, g, b)),
        // A single value means grey
        [v] => Ok(Color::from_srgb(v, v, v)),
        _ => bail!("expected a color, got {:?}", args),
    }
}

fn parse_scalar(args: &[&str]) -> Result<f32> {
    let arg = args.first().context("missing value")?;
    arg.parse()
        .with_context(|| format!("invalid number {:?}", arg))
}

pub fn parse(reader: impl BufRead, base_dir: &Path) -> Result<MaterialLibrary> {
    let mut library = MaterialLibrary::default();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line.context("failed to read MTL")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            continue;
        };
        let args: Vec<&str> = words.collect();

        if keyword == "newmtl" {
            library.materials.push(MtlMaterial::named(&args.join(" ")));
            continue;
        }

        let Some(material) = library.materials.last_mut() else {
            log::warn!("MTL line {}: {:?} before any newmtl", line_number + 1, keyword);
            continue;
        };

        let result: Result<()> = (|| {
            match keyword {
                "Kd" => material.diffuse = parse_color(&args)?,
                "Ks" => material.specular = parse_color(&args)?,
                "Ns" => material.shininess = parse_scalar(&args)?,
                "d" => material.opacity = parse_scalar(&args)?,
                "Tr" => material.opacity = 1.0 - parse_scalar(&args)?,
                "map_Kd" => {
                    // Options such as `-s 1 1 1` come before the file name
                    let file = args.last().context("map_Kd without a file")?;
                    material.diffuse_map = Some(base_dir.join(file));
                }
                other => log::debug!("Ignoring MTL statement {:?}", other),
            }
            Ok(())
        })();

        result.with_context(|| format!("MTL line {}: {:?}", line_number + 1, line))?;
    }

    log::debug!("Parsed MTL with {} materials", library.materials.len());
    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = "\
# two materials
newmtl Paint
Ka 0.1 0.1 0.1
Kd 0.8 0.6 0.0
Ks 0.5 0.5 0.5
Ns 96
d 1.0
illum 2

newmtl Glass
Kd 0.2 0.3 0.4
Tr 0.75
map_Kd -s 1 1 1 textures/glass.png
map_Bump ignored.png
";

    #[test]
    fn parses_materials_in_order() {
        let library = parse(LIBRARY.as_bytes(), Path::new("models")).unwrap();
        assert_eq!(library.materials.len(), 2);

        let paint = library.get("Paint").unwrap();
        assert_eq!(paint.diffuse, Color::from_srgb(0.8, 0.6, 0.0));
        assert!((paint.diffuse.0.x - 0.603_827).abs() < 1e-4);
        assert!((paint.diffuse.0.y - 0.318_547).abs() < 1e-4);
        assert_eq!(paint.shininess, 96.0);
        assert_eq!(paint.diffuse_map, None);

        let glass = library.get("Glass").unwrap();
        assert!((glass.opacity - 0.25).abs() < 1e-6);
        assert_eq!(
            glass.diffuse_map.as_deref(),
            Some(Path::new("models/textures/glass.png"))
        );
    }

    #[test]
    fn missing_statements_keep_defaults() {
        let library = parse("newmtl Plain\n".as_bytes(), Path::new(".")).unwrap();
        let plain = library.get("Plain").unwrap();
        assert_eq!(plain.diffuse, Color::WHITE);
        assert_eq!(plain.opacity, 1.0);
    }

    #[test]
    fn bad_numbers_are_errors() {
        let err = parse("newmtl X\nKd red 0 0\n".as_bytes(), Path::new(".")).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }
}
