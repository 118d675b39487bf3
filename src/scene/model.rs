use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};
use nalgebra::{vector, Vector2, Vector3};
use obj::raw::object::Polygon;
use obj::raw::{parse_obj, RawObj};

use crate::error::{RenderError, Result};

/// Indices of the attributes of one face vertex. Indices are 0-based, absent ones are None.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FaceIndex {
    pub position: usize,
    pub uv: Option<usize>,
    pub normal: Option<usize>,
}

/// Triangle mesh. Polygons are triangulated on load, so every face has exactly 3 vertices.
#[derive(Debug, Default, Clone)]
pub struct Mesh {
    pub positions: Vec<Vector3<f32>>,
    pub uvs: Vec<Vector2<f32>>,     // Texture space, v = 0 is the top row.
    pub normals: Vec<Vector3<f32>>, // Normalized.
    pub faces: Vec<[FaceIndex; 3]>,
}

impl Mesh {
    /// Parses a wavefront obj file.
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| RenderError::file(path, e))?;
        let mesh = Mesh::parse_obj(BufReader::new(file))?;
        info!(
            "Mesh loaded: {} | vertices: {} | uvs: {} | normals: {} | faces: {}",
            path.display(),
            mesh.positions.len(),
            mesh.uvs.len(),
            mesh.normals.len(),
            mesh.faces.len()
        );
        return Ok(mesh);
    }

    pub fn parse_obj<R: BufRead>(input: R) -> Result<Mesh> {
        return Ok(Mesh::from_raw_obj(parse_obj(input)?));
    }

    /// Conversion from what obj-rs gives us. Obj texture v goes up, so it's flipped to the texture
    /// space, where rows go down.
    pub fn from_raw_obj(raw: RawObj) -> Mesh {
        let positions = raw.positions.iter().map(|&(x, y, z, _)| vector![x, y, z]).collect();
        let uvs = raw.tex_coords.iter().map(|&(u, v, _)| vector![u, 1.0 - v]).collect();
        let normals = raw
            .normals
            .iter()
            .map(|&(x, y, z)| {
                let normal = vector![x, y, z];
                normal.try_normalize(f32::EPSILON).unwrap_or(normal)
            })
            .collect();

        let mut faces = Vec::with_capacity(raw.polygons.len());
        for (polygon_index, polygon) in raw.polygons.iter().enumerate() {
            let vertices = polygon_face_indices(polygon);
            if vertices.len() < 3 {
                warn!("Skipping polygon {} with {} vertices", polygon_index, vertices.len());
                continue;
            }
            // Fan triangulation around the first vertex.
            for i in 1..vertices.len() - 1 {
                faces.push([vertices[0], vertices[i], vertices[i + 1]]);
            }
        }

        return Mesh { positions, uvs, normals, faces };
    }

    /// Checks that every face vertex references existing attributes. Missing uv or normal
    /// indices are fine unless they are required.
    pub fn check_attributes(&self, require_uv: bool, require_normal: bool) -> Result<()> {
        fn check(
            face: usize,
            slot: usize,
            attribute: &'static str,
            index: Option<usize>,
            len: usize,
            required: bool,
        ) -> Result<()> {
            match index {
                None if required => Err(RenderError::MissingAttribute { face, slot, attribute }),
                Some(index) if index >= len => Err(RenderError::IndexOutOfBounds { face, slot, attribute, index, len }),
                _ => Ok(()),
            }
        }

        for (face, vertices) in self.faces.iter().enumerate() {
            for (slot, vertex) in vertices.iter().enumerate() {
                check(face, slot, "position", Some(vertex.position), self.positions.len(), true)?;
                check(face, slot, "uv", vertex.uv, self.uvs.len(), require_uv)?;
                check(face, slot, "normal", vertex.normal, self.normals.len(), require_normal)?;
            }
        }
        return Ok(());
    }

    /// Attribute indices of a face vertex.
    pub fn face_index(&self, face: usize, slot: usize) -> FaceIndex {
        return self.faces[face][slot];
    }

    pub fn position(&self, face: usize, slot: usize) -> Vector3<f32> {
        return self.positions[self.face_index(face, slot).position];
    }

    /// Uv of a face vertex, zero when the vertex has none.
    pub fn uv(&self, face: usize, slot: usize) -> Vector2<f32> {
        return self.face_index(face, slot).uv.map_or(Vector2::zeros(), |i| self.uvs[i]);
    }

    /// Normal of a face vertex, zero when the vertex has none.
    pub fn normal(&self, face: usize, slot: usize) -> Vector3<f32> {
        return self.face_index(face, slot).normal.map_or(Vector3::zeros(), |i| self.normals[i]);
    }
}

fn polygon_face_indices(polygon: &Polygon) -> Vec<FaceIndex> {
    return match polygon {
        Polygon::P(v) => v
            .iter()
            .map(|&position| FaceIndex { position, uv: None, normal: None })
            .collect(),
        Polygon::PT(v) => v
            .iter()
            .map(|&(position, uv)| FaceIndex { position, uv: Some(uv), normal: None })
            .collect(),
        Polygon::PN(v) => v
            .iter()
            .map(|&(position, normal)| FaceIndex { position, uv: None, normal: Some(normal) })
            .collect(),
        Polygon::PTN(v) => v
            .iter()
            .map(|&(position, uv, normal)| FaceIndex { position, uv: Some(uv), normal: Some(normal) })
            .collect(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 2
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quad_is_fan_triangulated() {
        let mesh = Mesh::parse_obj(QUAD.as_bytes()).unwrap();
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.faces.len(), 2);
        let positions: Vec<Vec<usize>> = mesh.faces.iter().map(|f| f.iter().map(|i| i.position).collect()).collect();
        assert_eq!(positions, vec![vec![0, 1, 2], vec![0, 2, 3]]);
        assert_eq!(mesh.faces[1][2], FaceIndex { position: 3, uv: Some(3), normal: Some(0) });
    }

    #[test]
    fn uvs_are_flipped_and_normals_normalized() {
        let mesh = Mesh::parse_obj(QUAD.as_bytes()).unwrap();
        assert_eq!(mesh.uvs[0], vector![0.0, 1.0]);
        assert_eq!(mesh.uvs[2], vector![1.0, 0.0]);
        assert_eq!(mesh.normals[0], vector![0.0, 0.0, 1.0]);
        assert_eq!(mesh.uv(0, 1), vector![1.0, 1.0]);
        assert_eq!(mesh.position(1, 2), vector![0.0, 1.0, 0.0]);
    }

    #[test]
    fn missing_attributes_are_none() {
        let mesh = Mesh::parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n".as_bytes()).unwrap();
        assert_eq!(mesh.faces[0][0], FaceIndex { position: 0, uv: None, normal: None });
        assert_eq!(mesh.normal(0, 0), Vector3::zeros());
        assert!(mesh.check_attributes(false, false).is_ok());
        assert!(matches!(
            mesh.check_attributes(true, false),
            Err(RenderError::MissingAttribute { face: 0, slot: 0, attribute: "uv" })
        ));
    }

    #[test]
    fn out_of_range_indices_are_reported() {
        let mut mesh = Mesh::parse_obj(QUAD.as_bytes()).unwrap();
        mesh.normals.clear();
        assert!(matches!(
            mesh.check_attributes(true, true),
            Err(RenderError::IndexOutOfBounds { attribute: "normal", index: 0, len: 0, .. })
        ));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(Mesh::parse_obj("v 1 abc 3\n".as_bytes()), Err(RenderError::Obj(_))));
    }
}
