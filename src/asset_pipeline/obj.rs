//! Wavefront OBJ geometry.

use std::collections::HashMap;
use std::io::BufRead;

use anyhow::{anyhow, bail, Context, Result};
use glam::{Vec2, Vec3};

use crate::model::{Model, Vertex};

#[derive(Default, PartialEq, Debug)]
pub struct ObjSet {
    pub mtllib: Option<String>,
    pub objects: Vec<Object>,
}

/// Faces sharing an object name and material.
#[derive(Default, PartialEq, Debug)]
pub struct Object {
    pub name: String,
    pub mtl: Option<String>,
    pub faces: Vec<Face>,
}

/// Always a triangle; polygons are fanned on parse.
pub type Face = [ObjVertex; 3];

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct ObjVertex {
    pub position: Vec3,
    pub texture: Option<Vec2>,
    pub normal: Vec3,
}

/// Geometry for one object/material pair, ready to become a scene model.
#[derive(Debug)]
pub struct ObjModel {
    pub model: Model,
    pub material: Option<String>,
}

#[derive(Default)]
struct Attributes {
    positions: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    normals: Vec<Vec3>,
}

/// Resolves a 1-based (or negative, relative) OBJ index into a list of `len` items.
fn resolve_index(token: &str, len: usize) -> Result<usize> {
    let index: i64 = token
        .parse()
        .with_context(|| format!("invalid index {:?}", token))?;

    let resolved = match index {
        0 => bail!("index 0 is not valid in OBJ"),
        i if i > 0 => i - 1,
        i => len as i64 + i,
    };

    if resolved < 0 || resolved as usize >= len {
        bail!("index {} out of range (have {})", index, len);
    }
    Ok(resolved as usize)
}

/// A face corner before normals are filled in.
struct Corner {
    position: Vec3,
    texture: Option<Vec2>,
    normal: Option<Vec3>,
}

fn parse_corner(token: &str, attributes: &Attributes) -> Result<Corner> {
    let mut parts = token.split('/');

    let position = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("face vertex {:?} has no position", token))?;
    let position = attributes.positions[resolve_index(position, attributes.positions.len())?];

    let texture = match parts.next() {
        Some(s) if !s.is_empty() => {
            Some(attributes.texcoords[resolve_index(s, attributes.texcoords.len())?])
        }
        _ => None,
    };

    let normal = match parts.next() {
        Some(s) if !s.is_empty() => {
            Some(attributes.normals[resolve_index(s, attributes.normals.len())?])
        }
        _ => None,
    };

    Ok(Corner {
        position,
        texture,
        normal,
    })
}

fn parse_floats<const N: usize>(args: &[&str]) -> Result<[f32; N]> {
    if args.len() < N {
        bail!("expected {} numbers, got {}", N, args.len());
    }

    let mut out = [0.0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg
            .parse()
            .with_context(|| format!("invalid number {:?}", arg))?;
    }
    Ok(out)
}

fn triangle(corners: [&Corner; 3]) -> Face {
    let [a, b, c] = corners;
    let flat = (b.position - a.position)
        .cross(c.position - a.position)
        .normalize_or_zero();

    corners.map(|corner| ObjVertex {
        position: corner.position,
        texture: corner.texture,
        normal: corner.normal.map(Vec3::normalize_or_zero).unwrap_or(flat),
    })
}

impl ObjSet {
    /// Starts a new object unless the current one is still empty, in which case it is
    /// renamed or re-materialed in place.
    fn begin_object(&mut self, name: Option<&str>, mtl: Option<&str>) {
        let (current_name, current_mtl) = match self.objects.last() {
            Some(last) => (last.name.clone(), last.mtl.clone()),
            None => ("default".to_string(), None),
        };

        let object = Object {
            name: name.map(str::to_string).unwrap_or(current_name),
            mtl: mtl.map(str::to_string).or(current_mtl),
            faces: Vec::new(),
        };

        match self.objects.last_mut() {
            Some(last) if last.faces.is_empty() => *last = object,
            _ => self.objects.push(object),
        }
    }

    fn current(&mut self) -> &mut Object {
        if self.objects.is_empty() {
            self.begin_object(None, None);
        }
        let last = self.objects.len() - 1;
        &mut self.objects[last]
    }

    pub fn face_count(&self) -> usize {
        self.objects.iter().map(|object| object.faces.len()).sum()
    }

    /// One model per non-empty object, with identical corners merged into one vertex.
    pub fn to_models(&self) -> Vec<ObjModel> {
        self.objects
            .iter()
            .filter(|object| !object.faces.is_empty())
            .map(|object| {
                let mut vertices = Vec::new();
                let mut indices = Vec::with_capacity(object.faces.len() * 3);
                let mut seen: HashMap<[u32; 8], u32> = HashMap::new();

                for corner in object.faces.iter().flatten() {
                    // OBJ puts v = 0 at the bottom of the image
                    let uv = corner
                        .texture
                        .map(|t| Vec2::new(t.x, 1.0 - t.y))
                        .unwrap_or(Vec2::ZERO);
                    let vertex = Vertex::new(corner.position, corner.normal, uv);

                    let key: [u32; 8] = bytemuck::cast(vertex);
                    let index = *seen.entry(key).or_insert_with(|| {
                        vertices.push(vertex);
                        (vertices.len() - 1) as u32
                    });
                    indices.push(index);
                }

                ObjModel {
                    model: Model::single(object.name.clone(), vertices, indices),
                    material: object.mtl.clone(),
                }
            })
            .collect()
    }
}

pub fn parse(reader: impl BufRead) -> Result<ObjSet> {
    let mut set = ObjSet::default();
    let mut attributes = Attributes::default();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line.context("failed to read OBJ")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            continue;
        };
        let args: Vec<&str> = words.collect();

        let result: Result<()> = (|| {
            match keyword {
                "v" => {
                    let [x, y, z] = parse_floats::<3>(&args)?;
                    attributes.positions.push(Vec3::new(x, y, z));
                }
                "vt" => {
                    // Some exporters write only u; v defaults to 0 and w is dropped
                    let [u] = parse_floats::<1>(&args)?;
                    let v = match args.get(1) {
                        Some(_) => parse_floats::<2>(&args)?[1],
                        None => 0.0,
                    };
                    attributes.texcoords.push(Vec2::new(u, v));
                }
                "vn" => {
                    let [x, y, z] = parse_floats::<3>(&args)?;
                    attributes.normals.push(Vec3::new(x, y, z));
                }
                "f" => {
                    if args.len() < 3 {
                        bail!("face needs at least 3 vertices, got {}", args.len());
                    }
                    let corners = args
                        .iter()
                        .map(|token| parse_corner(token, &attributes))
                        .collect::<Result<Vec<_>>>()?;

                    let object = set.current();
                    for i in 1..corners.len() - 1 {
                        object
                            .faces
                            .push(triangle([&corners[0], &corners[i], &corners[i + 1]]));
                    }
                }
                "o" | "g" => {
                    let name = args.join(" ");
                    set.begin_object(Some(&name), None);
                }
                "usemtl" => {
                    let name = args.join(" ");
                    set.begin_object(None, Some(&name));
                }
                "mtllib" => set.mtllib = Some(args.join(" ")),
                "s" | "l" | "p" => {}
                other => log::debug!("Ignoring OBJ statement {:?}", other),
            }
            Ok(())
        })();

        result.with_context(|| format!("OBJ line {}: {:?}", line_number + 1, line))?;
    }

    set.objects.retain(|object| !object.faces.is_empty());

    log::debug!(
        "Parsed OBJ: {} objects, {} triangles, {} positions",
        set.objects.len(),
        set.face_count(),
        attributes.positions.len()
    );

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# a unit quad
mtllib quad.mtl
o Quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl Paint
s off
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn parses_and_fans_a_quad() {
        let set = parse(QUAD.as_bytes()).unwrap();

        assert_eq!(set.mtllib.as_deref(), Some("quad.mtl"));
        assert_eq!(set.objects.len(), 1);
        let object = &set.objects[0];
        assert_eq!(object.name, "Quad");
        assert_eq!(object.mtl.as_deref(), Some("Paint"));
        assert_eq!(object.faces.len(), 2);
        assert_eq!(object.faces[1][2].position, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn models_share_corners_and_flip_v() {
        let set = parse(QUAD.as_bytes()).unwrap();
        let models = set.to_models();

        assert_eq!(models.len(), 1);
        assert_eq!(models[0].material.as_deref(), Some("Paint"));

        let primitive = &models[0].model.primitives[0];
        assert_eq!(primitive.vertices.len(), 4);
        assert_eq!(primitive.indices.len(), 6);
        assert_eq!(primitive.vertices[0].tex_coords, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn all_index_forms_and_negative_indices() {
        let source = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vn 0 0 1
f 1 2 3
f 1/1 2/1 3/1
f 1//1 2//1 3//1
f -3/-1/-1 -2/-1/-1 -1/-1/-1
";
        let set = parse(source.as_bytes()).unwrap();
        assert_eq!(set.face_count(), 4);

        let faces = &set.objects[0].faces;
        assert_eq!(faces[0][0].texture, None);
        assert_eq!(faces[1][0].texture, Some(Vec2::ZERO));
        assert_eq!(faces[3], faces[2].map(|v| ObjVertex {
            texture: Some(Vec2::ZERO),
            ..v
        }));
    }

    #[test]
    fn texture_coordinates_may_omit_v() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.25\nvt 0.5 0.75 0\nf 1/1 2/2 3/1\n";
        let set = parse(source.as_bytes()).unwrap();
        let face = &set.objects[0].faces[0];

        assert_eq!(face[0].texture, Some(Vec2::new(0.25, 0.0)));
        assert_eq!(face[1].texture, Some(Vec2::new(0.5, 0.75)));
        assert!(parse("vt\n".as_bytes()).is_err());
    }

    #[test]
    fn missing_normals_get_the_face_normal() {
        let set = parse("v 0 0 0\nv 0 0 1\nv 1 0 0\nf 1 2 3\n".as_bytes()).unwrap();
        for corner in &set.objects[0].faces[0] {
            assert!((corner.normal - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn usemtl_splits_an_object() {
        let source = "\
o Bus
v 0 0 0
v 1 0 0
v 0 1 0
usemtl Body
f 1 2 3
usemtl Glass
f 1 2 3
";
        let set = parse(source.as_bytes()).unwrap();
        let names: Vec<_> = set
            .objects
            .iter()
            .map(|o| (o.name.as_str(), o.mtl.as_deref()))
            .collect();
        assert_eq!(names, vec![("Bus", Some("Body")), ("Bus", Some("Glass"))]);
    }

    #[test]
    fn errors_name_the_line() {
        let err = parse("v 0 0 0\nf 1 2 7\n".as_bytes()).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("line 2"), "{}", message);
        assert!(message.contains("out of range"), "{}", message);

        assert!(parse("v 0 zero 0\n".as_bytes()).is_err());
        assert!(parse("v 0 0 0\nf 0 1 1\n".as_bytes()).is_err());
    }
}
