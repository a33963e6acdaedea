//! Loader-neutral mesh description and OBJ import.
//!
//! [`MeshData`] is what a parser hands to [`Model`](crate::model::Model):
//! global position/normal/texcoord arrays plus named groups of polygons whose
//! corners index into those arrays (0-based). OBJ files are parsed with
//! `tobj`, keeping quads and n-gons as authored.

use std::io::BufRead;
use std::path::Path;

use log::{debug, warn};
use thiserror::Error;

use crate::math::vec4::Vec4;

/// Errors returned when building a model or background from external data.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The OBJ file could not be opened or parsed.
    #[error("OBJ load failed: {0}")]
    Obj(#[from] tobj::LoadError),
    /// The image file could not be opened or decoded.
    #[error("image load failed: {0}")]
    Image(#[from] image::ImageError),
    /// Loading succeeded but produced no polygons.
    #[error("model `{0}` contains no polygons")]
    EmptyModel(String),
    /// A face references a position, normal or texcoord that does not exist.
    #[error("geometry `{geometry}` references {kind} {index}, but only {len} exist")]
    InvalidIndex {
        geometry: String,
        kind: &'static str,
        index: usize,
        len: usize,
    },
}

/// One polygon corner: indices into the mesh's global arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceVertex {
    pub position: usize,
    pub tex_coord: Option<usize>,
    pub normal: Option<usize>,
}

impl FaceVertex {
    pub const fn new(position: usize) -> Self {
        Self {
            position,
            tex_coord: None,
            normal: None,
        }
    }
}

/// A named group of polygons.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryData {
    pub name: String,
    pub faces: Vec<Vec<FaceVertex>>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Points, w = 1.
    pub positions: Vec<Vec4>,
    /// Directions, w = 0.
    pub normals: Vec<Vec4>,
    /// (u, v, w) in x/y/z.
    pub tex_coords: Vec<Vec4>,
    pub geometries: Vec<GeometryData>,
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: false,
        single_index: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

impl MeshData {
    /// Parse an OBJ file. Every object/group becomes one geometry.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let (models, materials) = tobj::load_obj(path.as_ref(), &load_options())?;
        if let Err(e) = materials {
            debug!("No materials for {}: {e}", path.as_ref().display());
        }
        Ok(Self::from_tobj(&models))
    }

    /// Parse OBJ text from any buffered reader. `mtllib` references are ignored.
    pub fn from_obj_reader<R: BufRead>(reader: &mut R) -> Result<Self, LoadError> {
        let (models, _) = tobj::load_obj_buf(reader, &load_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })?;
        Ok(Self::from_tobj(&models))
    }

    /// Concatenates tobj's per-model arrays into global arrays, offsetting the
    /// face indices of each model accordingly.
    fn from_tobj(models: &[tobj::Model]) -> Self {
        let mut data = MeshData::default();

        for model in models {
            let mesh = &model.mesh;
            let position_offset = data.positions.len();
            let normal_offset = data.normals.len();
            let tex_offset = data.tex_coords.len();

            data.positions.extend(mesh.positions.chunks_exact(3).map(|p| {
                Vec4::point(f64::from(p[0]), f64::from(p[1]), f64::from(p[2]))
            }));
            data.normals.extend(mesh.normals.chunks_exact(3).map(|n| {
                Vec4::direction(f64::from(n[0]), f64::from(n[1]), f64::from(n[2]))
            }));
            data.tex_coords.extend(
                mesh.texcoords
                    .chunks_exact(2)
                    .map(|t| Vec4::direction(f64::from(t[0]), f64::from(t[1]), 0.0)),
            );

            let corner = |i: usize| FaceVertex {
                position: mesh.indices[i] as usize + position_offset,
                tex_coord: mesh
                    .texcoord_indices
                    .get(i)
                    .map(|&t| t as usize + tex_offset),
                normal: mesh.normal_indices.get(i).map(|&n| n as usize + normal_offset),
            };

            // Empty arities means every face is a triangle
            let arities: Vec<usize> = if mesh.face_arities.is_empty() {
                vec![3; mesh.indices.len() / 3]
            } else {
                mesh.face_arities.iter().map(|&a| a as usize).collect()
            };

            let mut faces = Vec::with_capacity(arities.len());
            let mut start = 0;
            for arity in arities {
                faces.push((start..start + arity).map(corner).collect());
                start += arity;
            }

            if faces.is_empty() {
                warn!("Skipping group `{}` with no faces", model.name);
                continue;
            }
            data.geometries.push(GeometryData {
                name: model.name.clone(),
                faces,
            });
        }

        data
    }

    /// Axis-aligned cube spanning [-1, 1]³: 8 corners, 6 outward-facing quads.
    pub fn cube() -> Self {
        let positions = vec![
            Vec4::point(-1.0, -1.0, 1.0),
            Vec4::point(1.0, -1.0, 1.0),
            Vec4::point(1.0, 1.0, 1.0),
            Vec4::point(-1.0, 1.0, 1.0),
            Vec4::point(-1.0, -1.0, -1.0),
            Vec4::point(1.0, -1.0, -1.0),
            Vec4::point(1.0, 1.0, -1.0),
            Vec4::point(-1.0, 1.0, -1.0),
        ];
        // Counter-clockwise seen from outside
        let quads: [[usize; 4]; 6] = [
            [0, 1, 2, 3], // front  +z
            [5, 4, 7, 6], // back   -z
            [4, 0, 3, 7], // left   -x
            [1, 5, 6, 2], // right  +x
            [3, 2, 6, 7], // top    +y
            [4, 5, 1, 0], // bottom -y
        ];
        let faces = quads
            .iter()
            .map(|quad| quad.iter().map(|&i| FaceVertex::new(i)).collect())
            .collect();

        Self {
            positions,
            normals: Vec::new(),
            tex_coords: Vec::new(),
            geometries: vec![GeometryData {
                name: "cube".to_string(),
                faces,
            }],
        }
    }

    pub fn polygon_count(&self) -> usize {
        self.geometries.iter().map(|g| g.faces.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TWO_GROUPS: &str = "\
o first
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1 4//1
o second
v 0 0 1
v 1 0 1
v 0 1 1
vt 0.5 0.5
f 5/1 6/1 7/1
";

    #[test]
    fn groups_become_geometries_with_global_indices() {
        let mesh = MeshData::from_obj_reader(&mut Cursor::new(TWO_GROUPS)).unwrap();

        assert_eq!(mesh.positions.len(), 7);
        assert_eq!(mesh.geometries.len(), 2);
        assert_eq!(mesh.geometries[0].name, "first");

        let quad = &mesh.geometries[0].faces[0];
        assert_eq!(quad.len(), 4);
        assert_eq!(quad[3].position, 3);
        assert_eq!(quad[0].normal, Some(0));
        assert_eq!(quad[0].tex_coord, None);

        let tri = &mesh.geometries[1].faces[0];
        assert_eq!(tri.len(), 3);
        let positions: Vec<usize> = tri.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![4, 5, 6]);
        assert_eq!(tri[2].tex_coord, Some(0));
        assert_eq!(mesh.positions[6], Vec4::point(0.0, 1.0, 1.0));
    }

    #[test]
    fn cube_has_six_quads() {
        let cube = MeshData::cube();
        assert_eq!(cube.positions.len(), 8);
        assert_eq!(cube.polygon_count(), 6);
        assert!(cube.geometries[0].faces.iter().all(|f| f.len() == 4));
    }

    #[test]
    fn missing_file_is_an_obj_error() {
        let err = MeshData::from_obj("/definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, LoadError::Obj(_)));
    }
}
