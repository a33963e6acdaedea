//! A loaded mesh with its transforms, material and animation track.
//!
//! A [`Model`] owns the global vertex arrays of one file and one [`Geometry`]
//! per named group. Geometries index into the model's arrays, so every
//! position, normal and texcoord exists exactly once per model.

use std::io::BufRead;
use std::path::Path;

use log::{debug, info};

use crate::animation::Animation;
use crate::geometry::{include_point, BoundingBox, Bounds, Geometry};
use crate::material::Material;
use crate::math::mat4::Mat4;
use crate::math::vec4::Vec4;
use crate::mesh::{GeometryData, LoadError, MeshData};
use crate::transform::{apply_in_space, Space};

#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    positions: Vec<Vec4>,
    normals: Vec<Vec4>,
    tex_coords: Vec<Vec4>,
    geometries: Vec<Geometry>,
    object_to_world: Mat4,
    view_transform: Mat4,
    material: Material,
    bounds: Bounds,
    bounding_box: BoundingBox,
    animation: Animation,
}

impl Model {
    /// Load a model from an OBJ file.
    pub fn from_obj<P: AsRef<Path>>(name: impl Into<String>, path: P) -> Result<Self, LoadError> {
        let mesh = MeshData::from_obj(path.as_ref())?;
        Self::from_mesh_data(name, mesh)
    }

    /// Load a model from OBJ text.
    pub fn from_obj_reader<R: BufRead>(name: impl Into<String>, reader: &mut R) -> Result<Self, LoadError> {
        let mesh = MeshData::from_obj_reader(reader)?;
        Self::from_mesh_data(name, mesh)
    }

    /// Built-in cube spanning [-1, 1]³.
    pub fn cube(name: impl Into<String>) -> Self {
        let mesh = MeshData::cube();
        let bounds = Bounds {
            min: Vec4::point(-1.0, -1.0, -1.0),
            max: Vec4::point(1.0, 1.0, 1.0),
        };
        let mut model = Self::empty(name.into(), mesh.positions, bounds);
        model.add_geometries(mesh.geometries);
        model
    }

    /// Builds a model from parsed mesh data, validating every face index.
    pub fn from_mesh_data(name: impl Into<String>, mesh: MeshData) -> Result<Self, LoadError> {
        let name = name.into();
        if mesh.polygon_count() == 0 {
            return Err(LoadError::EmptyModel(name));
        }

        for data in &mesh.geometries {
            for corner in data.faces.iter().flatten() {
                check_index(&data.name, "position", Some(corner.position), mesh.positions.len())?;
                check_index(&data.name, "normal", corner.normal, mesh.normals.len())?;
                check_index(&data.name, "texcoord", corner.tex_coord, mesh.tex_coords.len())?;
            }
        }

        let mut bounds = None;
        for &p in &mesh.positions {
            include_point(&mut bounds, p);
        }
        let bounds = bounds.ok_or_else(|| LoadError::EmptyModel(name.clone()))?;

        let MeshData {
            positions,
            normals,
            tex_coords,
            geometries,
        } = mesh;
        let mut model = Self::empty(name, positions, bounds);
        model.normals = normals;
        model.tex_coords = tex_coords;

        model.add_geometries(geometries);

        let half = model.dimensions() * 0.5;
        info!(
            "Loaded model `{}`: {} geometries, half extents ({:.3}, {:.3}, {:.3})",
            model.name,
            model.geometries.len(),
            half.x,
            half.y,
            half.z
        );
        Ok(model)
    }

    fn add_geometries(&mut self, geometries: Vec<GeometryData>) {
        for data in geometries {
            let mut geometry = Geometry::new(data.name);
            for face in &data.faces {
                geometry.add_polygon(&self.positions, face);
            }
            geometry.finish(&mut self.normals);
            debug!(
                "Geometry `{}`: {} polygons, {} vertices",
                geometry.name(),
                geometry.polygons.len(),
                geometry.vertices.len()
            );
            self.geometries.push(geometry);
        }
    }

    fn empty(name: String, positions: Vec<Vec4>, bounds: Bounds) -> Self {
        Self {
            name,
            positions,
            normals: Vec::new(),
            tex_coords: Vec::new(),
            geometries: Vec::new(),
            object_to_world: Mat4::identity(),
            view_transform: Mat4::identity(),
            material: Material::default(),
            bounds,
            bounding_box: BoundingBox::new(bounds),
            animation: Animation::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positions(&self) -> &[Vec4] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec4] {
        &self.normals
    }

    pub fn tex_coords(&self) -> &[Vec4] {
        &self.tex_coords
    }

    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    pub fn polygon_count(&self) -> usize {
        self.geometries.iter().map(|g| g.polygons.len()).sum()
    }

    // ============ Bounds ============

    /// Object-space extent along each axis, w = 0.
    pub fn dimensions(&self) -> Vec4 {
        self.bounds.dimensions()
    }

    /// Object-space center of the bounding box, w = 1.
    pub fn bbox_center(&self) -> Vec4 {
        self.bounds.center()
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }

    // ============ Transforms ============

    pub fn object_to_world(&self) -> &Mat4 {
        &self.object_to_world
    }

    /// Overlay applied after the camera's view transform.
    pub fn view_transform(&self) -> &Mat4 {
        &self.view_transform
    }

    pub fn set_transforms(&mut self, object_to_world: Mat4, view_transform: Mat4) {
        self.object_to_world = object_to_world;
        self.view_transform = view_transform;
    }

    pub fn translate(&mut self, m: &Mat4, space: Space) {
        apply_in_space(m, space, &mut self.object_to_world, &mut self.view_transform);
    }

    pub fn rotate(&mut self, m: &Mat4, space: Space) {
        apply_in_space(m, space, &mut self.object_to_world, &mut self.view_transform);
    }

    pub fn scale(&mut self, m: &Mat4, space: Space) {
        apply_in_space(m, space, &mut self.object_to_world, &mut self.view_transform);
    }

    // ============ Material & Animation ============

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut Animation {
        &mut self.animation
    }
}

fn check_index(geometry: &str, kind: &'static str, index: Option<usize>, len: usize) -> Result<(), LoadError> {
    match index {
        Some(index) if index >= len => Err(LoadError::InvalidIndex {
            geometry: geometry.to_string(),
            kind,
            index,
            len,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::FaceVertex;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    const PYRAMID: &str = "\
g base
v -1 0 -1
v 1 0 -1
v 1 0 1
v -1 0 1
v 0 2 0
f 1 2 3 4
g sides
f 1 5 2
f 2 5 3
f 3 5 4
f 4 5 1
";

    #[test]
    fn loads_obj_text_into_geometries() {
        let model = Model::from_obj_reader("pyramid", &mut Cursor::new(PYRAMID)).unwrap();
        assert_eq!(model.geometries().len(), 2);
        assert_eq!(model.polygon_count(), 5);
        assert_relative_eq!(model.dimensions(), Vec4::direction(2.0, 2.0, 2.0));
        assert_relative_eq!(model.bbox_center(), Vec4::point(0.0, 1.0, 0.0));
    }

    #[test]
    fn every_vertex_gets_a_normal() {
        let model = Model::from_obj_reader("pyramid", &mut Cursor::new(PYRAMID)).unwrap();
        for geometry in model.geometries() {
            for vertex in geometry.vertices.values() {
                let normal = model.normals()[vertex.normal.unwrap()];
                assert_relative_eq!(normal.length3(), 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn cube_has_outward_normals_and_unit_bounds() {
        let cube = Model::cube("cube");
        let polygons = &cube.geometries()[0].polygons;
        assert_eq!(polygons.len(), 6);
        for polygon in polygons {
            // Outward: normal points the same way as the face center
            assert_relative_eq!(polygon.normal, polygon.center.with_w(0.0), epsilon = 1e-12);
        }
        assert_relative_eq!(cube.dimensions(), Vec4::direction(2.0, 2.0, 2.0));
    }

    #[test]
    fn cube_bounding_box_matches_its_faces() {
        let cube = Model::cube("cube");
        let bbox = cube.bounding_box();
        let mut box_centers: Vec<Vec4> = bbox.faces.iter().map(|f| f.center).collect();
        let mut face_centers: Vec<Vec4> = cube.geometries()[0].polygons.iter().map(|p| p.center).collect();
        let key = |v: &Vec4| (v.x * 100.0 + v.y * 10.0 + v.z) as i64;
        box_centers.sort_by_key(key);
        face_centers.sort_by_key(key);
        assert_eq!(box_centers, face_centers);
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let err = Model::from_mesh_data("nothing", MeshData::default()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyModel(name) if name == "nothing"));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mesh = MeshData {
            positions: vec![Vec4::point(0.0, 0.0, 0.0), Vec4::point(1.0, 0.0, 0.0)],
            geometries: vec![GeometryData {
                name: "broken".to_string(),
                faces: vec![vec![FaceVertex::new(0), FaceVertex::new(1), FaceVertex::new(2)]],
            }],
            ..MeshData::default()
        };
        let err = Model::from_mesh_data("broken", mesh).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidIndex { kind: "position", index: 2, len: 2, .. }
        ));
    }

    #[test]
    fn space_selects_which_transform_changes() {
        let mut model = Model::cube("cube");
        let t = Mat4::translation(1.0, 0.0, 0.0);

        model.translate(&t, Space::View);
        assert_eq!(*model.object_to_world(), Mat4::identity());
        assert_eq!(*model.view_transform(), t);

        model.scale(&Mat4::scaling(2.0), Space::Object);
        model.translate(&t, Space::World);
        let origin = Vec4::point(0.0, 0.0, 0.0) * *model.object_to_world();
        assert_relative_eq!(origin, Vec4::point(1.0, 0.0, 0.0));
        let corner = Vec4::point(1.0, 0.0, 0.0) * *model.object_to_world();
        assert_relative_eq!(corner, Vec4::point(3.0, 0.0, 0.0));
    }
}
