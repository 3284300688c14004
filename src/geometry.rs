//! Procedural primitive meshes.
//!
//! All generators emit indexed triangle lists wound counter-clockwise when seen from
//! the outside, with unit normals and UVs in [0, 1]. Segment counts follow the usual
//! conventions: a sphere with `w` x `h` segments has `(w + 1) * (h + 1)` vertices, so
//! the texture seam gets its own column of vertices.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::model::{Model, Vertex};

pub fn box_geometry(width: f32, height: f32, depth: f32) -> Model {
    let half = Vec3::new(width, height, depth) * 0.5;
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    // (normal, v axis); the u axis is v x n so that u x v = n
    let faces = [
        (Vec3::X, Vec3::Y),
        (Vec3::NEG_X, Vec3::Y),
        (Vec3::Y, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::Z),
        (Vec3::Z, Vec3::Y),
        (Vec3::NEG_Z, Vec3::Y),
    ];

    for (normal, v_axis) in faces {
        let u_axis = v_axis.cross(normal);
        let base = vertices.len() as u32;

        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = (normal + u_axis * su + v_axis * sv) * half;
            let uv = Vec2::new((su + 1.0) * 0.5, 1.0 - (sv + 1.0) * 0.5);
            vertices.push(Vertex::new(position, normal, uv));
        }

        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Model::single("Box", vertices, indices)
}

pub fn sphere_geometry(radius: f32, width_segments: u32, height_segments: u32) -> Model {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut vertices = Vec::new();
    let mut grid = Vec::with_capacity(height_segments as usize + 1);

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = v * PI;
        let mut row = Vec::with_capacity(width_segments as usize + 1);

        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * TAU;

            let position = Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            );
            let normal = position.normalize_or(Vec3::Y);

            row.push(vertices.len() as u32);
            vertices.push(Vertex::new(position, normal, Vec2::new(u, v)));
        }

        grid.push(row);
    }

    let mut indices = Vec::new();

    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];

            // The poles collapse to a single point, so only one triangle per quad there
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments as usize - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Model::single("Sphere", vertices, indices)
}

pub fn cylinder_geometry(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
) -> Model {
    let radial_segments = radial_segments.max(3);
    let half_height = height / 2.0;
    let slope = (radius_bottom - radius_top) / height;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Torso: a top ring and a bottom ring
    let mut rings = [Vec::new(), Vec::new()];
    for (y, ring) in rings.iter_mut().enumerate() {
        let v = y as f32;
        let radius = v * (radius_bottom - radius_top) + radius_top;

        for x in 0..=radial_segments {
            let u = x as f32 / radial_segments as f32;
            let theta = u * TAU;
            let (sin, cos) = theta.sin_cos();

            let position = Vec3::new(radius * sin, -v * height + half_height, radius * cos);
            let normal = Vec3::new(sin, slope, cos).normalize();

            ring.push(vertices.len() as u32);
            vertices.push(Vertex::new(position, normal, Vec2::new(u, v)));
        }
    }

    for x in 0..radial_segments as usize {
        let a = rings[0][x];
        let b = rings[1][x];
        let c = rings[1][x + 1];
        let d = rings[0][x + 1];

        indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    if radius_top > 0.0 {
        push_cap(&mut vertices, &mut indices, radius_top, half_height, radial_segments, true);
    }
    if radius_bottom > 0.0 {
        push_cap(&mut vertices, &mut indices, radius_bottom, half_height, radial_segments, false);
    }

    Model::single("Cylinder", vertices, indices)
}

fn push_cap(
    vertices: &mut Vec<Vertex>,
    indices: &mut Vec<u32>,
    radius: f32,
    half_height: f32,
    radial_segments: u32,
    top: bool,
) {
    let sign = if top { 1.0 } else { -1.0 };
    let normal = Vec3::new(0.0, sign, 0.0);

    // One center vertex per segment so each wedge gets its own UV
    let center_start = vertices.len() as u32;
    for _ in 0..radial_segments {
        vertices.push(Vertex::new(
            Vec3::new(0.0, half_height * sign, 0.0),
            normal,
            Vec2::splat(0.5),
        ));
    }

    let ring_start = vertices.len() as u32;
    for x in 0..=radial_segments {
        let u = x as f32 / radial_segments as f32;
        let (sin, cos) = (u * TAU).sin_cos();

        vertices.push(Vertex::new(
            Vec3::new(radius * sin, half_height * sign, radius * cos),
            normal,
            Vec2::new(cos * 0.5 + 0.5, sin * 0.5 * sign + 0.5),
        ));
    }

    for x in 0..radial_segments {
        let center = center_start + x;
        let i = ring_start + x;

        if top {
            indices.extend_from_slice(&[i, i + 1, center]);
        } else {
            indices.extend_from_slice(&[i + 1, i, center]);
        }
    }
}

pub fn cone_geometry(radius: f32, height: f32, radial_segments: u32) -> Model {
    let mut model = cylinder_geometry(0.0, radius, height, radial_segments);
    model.name = "Cone".to_string();
    model
}

/// A `width` x `height` rectangle in the XY plane, facing +Z.
pub fn plane_geometry(width: f32, height: f32) -> Model {
    let half_width = width / 2.0;
    let half_height = height / 2.0;

    let mut vertices = Vec::with_capacity(4);
    for iy in 0..=1 {
        for ix in 0..=1 {
            let position = Vec3::new(
                ix as f32 * width - half_width,
                -(iy as f32 * height - half_height),
                0.0,
            );
            vertices.push(Vertex::new(
                position,
                Vec3::Z,
                Vec2::new(ix as f32, iy as f32),
            ));
        }
    }

    let (a, b, c, d) = (0, 2, 3, 1);
    Model::single("Plane", vertices, vec![a, b, d, b, c, d])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelPrimitive;

    fn assert_unit_normals(model: &Model) {
        for vertex in &model.primitives[0].vertices {
            assert!(
                (vertex.normal.length() - 1.0).abs() < 1e-4,
                "normal {:?} is not unit length",
                vertex.normal
            );
        }
    }

    /// Every non-degenerate triangle's winding normal should agree with its vertex normals.
    fn assert_outward_winding(primitive: &ModelPrimitive) {
        for face in 0..primitive.triangle_count() {
            let [a, b, c] = primitive.triangle(face);
            let face_normal = (b.position - a.position).cross(c.position - a.position);
            if face_normal.length() < 1e-6 {
                continue;
            }

            let vertex_normal = a.normal + b.normal + c.normal;
            assert!(
                face_normal.dot(vertex_normal) > 0.0,
                "triangle {} is wound inward",
                face
            );
        }
    }

    #[test]
    fn box_has_four_vertices_per_face() {
        let model = box_geometry(3.0, 1.0, 1.5);
        assert_eq!(model.vertex_count(), 24);
        assert_eq!(model.index_count(), 36);
        assert_unit_normals(&model);
        assert_outward_winding(&model.primitives[0]);

        let bounds = model.bounding_box().unwrap();
        assert_eq!(bounds.size(), Vec3::new(3.0, 1.0, 1.5));
        assert_eq!(bounds.center(), Vec3::ZERO);
    }

    #[test]
    fn sphere_vertex_and_index_counts() {
        let model = sphere_geometry(0.2, 12, 6);
        assert_eq!(model.vertex_count(), 13 * 7);
        assert_eq!(model.index_count(), 6 * 12 * (6 - 1));
        assert_unit_normals(&model);
        assert_outward_winding(&model.primitives[0]);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let model = sphere_geometry(5.0, 32, 32);
        for vertex in &model.primitives[0].vertices {
            assert!((vertex.position.length() - 5.0).abs() < 1e-3);
        }
    }

    #[test]
    fn cylinder_has_torso_and_two_caps() {
        let segments = 16;
        let model = cylinder_geometry(0.4, 0.4, 0.4, segments);
        let torso = 2 * (segments + 1);
        let cap = segments + (segments + 1);

        assert_eq!(model.vertex_count() as u32, torso + 2 * cap);
        assert_eq!(model.index_count() as u32, segments * 6 + 2 * segments * 3);
        assert_outward_winding(&model.primitives[0]);

        let bounds = model.bounding_box().unwrap();
        assert!((bounds.size().y - 0.4).abs() < 1e-6);
    }

    #[test]
    fn cone_has_no_top_cap() {
        let segments = 16;
        let model = cone_geometry(2.0, 1.5, segments);
        let torso = 2 * (segments + 1);
        let cap = segments + (segments + 1);

        assert_eq!(model.vertex_count() as u32, torso + cap);
        assert_outward_winding(&model.primitives[0]);
    }

    #[test]
    fn zero_radius_cone_is_degenerate_but_valid() {
        let model = cone_geometry(0.0, 1.5, 16);
        assert_eq!(model.vertex_count(), 2 * 17);
        assert!(model.primitives[0]
            .indices
            .iter()
            .all(|&i| (i as usize) < model.vertex_count()));
    }

    #[test]
    fn plane_faces_positive_z() {
        let model = plane_geometry(42.0, 6.0);
        assert_eq!(model.vertex_count(), 4);
        assert_eq!(model.index_count(), 6);
        assert_outward_winding(&model.primitives[0]);

        let bounds = model.bounding_box().unwrap();
        assert_eq!(bounds.size(), Vec3::new(42.0, 6.0, 0.0));
    }
}
