//! Polygon/vertex graph of one named sub-mesh, with bounding boxes.
//!
//! Vertices and polygons reference each other by index: a [`Polygon`] lists
//! the position indices of its corners, which are also the keys of the owning
//! [`Geometry`]'s vertex map, and each [`Vertex`] lists the polygons (by index
//! into [`Geometry::polygons`]) that share it.

use std::collections::HashMap;

use crate::math::vec4::Vec4;
use crate::math::EPSILON;
use crate::mesh::FaceVertex;

/// Normal assigned to polygons and vertices whose normal cannot be derived.
pub const DEFAULT_NORMAL: Vec4 = Vec4::direction(0.0, 0.0, 1.0);

/// Axis-aligned extent of a point set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec4,
    pub max: Vec4,
}

impl Bounds {
    pub fn from_point(p: Vec4) -> Self {
        Self {
            min: p.with_w(1.0),
            max: p.with_w(1.0),
        }
    }

    /// Grows the bounds to contain `p`.
    pub fn include(&mut self, p: Vec4) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Extent along each axis, w = 0.
    pub fn dimensions(&self) -> Vec4 {
        (self.max - self.min).with_w(0.0)
    }

    pub fn center(&self) -> Vec4 {
        ((self.min + self.max) * 0.5).with_w(1.0)
    }
}

/// Grows `bounds`, starting it at `p` if it is still empty.
pub(crate) fn include_point(bounds: &mut Option<Bounds>, p: Vec4) {
    match bounds {
        Some(b) => b.include(p),
        None => *bounds = Some(Bounds::from_point(p)),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: usize,
    pub tex_coord: Option<usize>,
    /// Unset until loaded from the file or computed from the neighbours.
    pub normal: Option<usize>,
    pub neighbors: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub vertices: Vec<usize>,
    pub normal: Vec4,
    pub center: Vec4,
}

impl Polygon {
    /// Positions of the corners, in order.
    pub fn corners(&self, positions: &[Vec4]) -> Vec<Vec4> {
        self.vertices.iter().map(|&v| positions[v]).collect()
    }
}

/// Face normal `cross(v1 - v0, v2 - v1)`, normalized with w = 0.
///
/// Counter-clockwise corners produce the outward normal. For quads, a
/// near-zero first or second edge is replaced by the following one. Fewer than
/// 3 corners, or collinear corners, give [`DEFAULT_NORMAL`].
pub fn polygon_normal(points: &[Vec4]) -> Vec4 {
    if points.len() < 3 {
        return DEFAULT_NORMAL;
    }

    let mut e1 = points[1] - points[0];
    let mut e2 = points[2] - points[1];

    if points.len() == 4 {
        let e3 = points[3] - points[2];
        if e1.length3() < EPSILON {
            e1 = e2;
            e2 = e3;
        } else if e2.length3() < EPSILON {
            e2 = e3;
        }
    }

    let normal = e1.cross(e2);
    if normal.length3() < EPSILON {
        DEFAULT_NORMAL
    } else {
        normal.normalize3()
    }
}

/// Mean of the corners, w = 1.
pub fn polygon_center(points: &[Vec4]) -> Vec4 {
    if points.is_empty() {
        return Vec4::point(0.0, 0.0, 0.0);
    }
    let sum = points.iter().fold(Vec4::ZERO, |acc, &p| acc + p);
    (sum / points.len() as f64).with_w(1.0)
}

/// One quad of a [`BoundingBox`]. `corners` index into the box's corner array.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxFace {
    pub corners: [usize; 4],
    pub normal: Vec4,
    pub center: Vec4,
}

/// Wireframe proxy for an axis-aligned box: 8 corners and 6 quads.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub bounds: Bounds,
    pub corners: [Vec4; 8],
    pub faces: [BoxFace; 6],
}

impl BoundingBox {
    /// Faces come in the order front (+z), back, left (-x), right, top (+y), bottom.
    pub fn new(bounds: Bounds) -> Self {
        let Bounds { min, max } = bounds;
        let mid = bounds.center();

        let corners = [
            Vec4::point(min.x, min.y, max.z), // front bottom left
            Vec4::point(min.x, max.y, max.z), // front top left
            Vec4::point(max.x, max.y, max.z), // front top right
            Vec4::point(max.x, min.y, max.z), // front bottom right
            Vec4::point(min.x, min.y, min.z), // back bottom left
            Vec4::point(min.x, max.y, min.z), // back top left
            Vec4::point(max.x, max.y, min.z), // back top right
            Vec4::point(max.x, min.y, min.z), // back bottom right
        ];

        let face = |corners: [usize; 4], normal: Vec4, center: Vec4| BoxFace {
            corners,
            normal,
            center,
        };
        let faces = [
            face(
                [0, 1, 2, 3],
                Vec4::direction(0.0, 0.0, 1.0),
                Vec4::point(mid.x, mid.y, max.z),
            ),
            face(
                [4, 5, 6, 7],
                Vec4::direction(0.0, 0.0, -1.0),
                Vec4::point(mid.x, mid.y, min.z),
            ),
            face(
                [4, 5, 1, 0],
                Vec4::direction(-1.0, 0.0, 0.0),
                Vec4::point(min.x, mid.y, mid.z),
            ),
            face(
                [7, 6, 2, 3],
                Vec4::direction(1.0, 0.0, 0.0),
                Vec4::point(max.x, mid.y, mid.z),
            ),
            face(
                [1, 5, 6, 2],
                Vec4::direction(0.0, 1.0, 0.0),
                Vec4::point(mid.x, max.y, mid.z),
            ),
            face(
                [0, 4, 7, 3],
                Vec4::direction(0.0, -1.0, 0.0),
                Vec4::point(mid.x, min.y, mid.z),
            ),
        ];

        Self {
            bounds,
            corners,
            faces,
        }
    }

    /// Corner positions of one face, in drawing order.
    pub fn face_corners(&self, face: &BoxFace) -> [Vec4; 4] {
        face.corners.map(|i| self.corners[i])
    }
}

/// A named sub-mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    name: String,
    pub polygons: Vec<Polygon>,
    pub vertices: HashMap<usize, Vertex>,
    bounds: Option<Bounds>,
    bounding_box: Option<BoundingBox>,
}

impl Geometry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            polygons: Vec::new(),
            vertices: HashMap::new(),
            bounds: None,
            bounding_box: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    /// Box around this geometry's own vertices. Built by [`Geometry::finish`].
    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    /// Adds a polygon whose corners index into `positions`.
    ///
    /// The first reference to a position creates its [`Vertex`] and fixes its
    /// texcoord/normal indices; later references only register the polygon
    /// as a neighbour. Indices must already be validated against `positions`.
    pub fn add_polygon(&mut self, positions: &[Vec4], face: &[FaceVertex]) {
        let polygon_index = self.polygons.len();
        let mut corners = Vec::with_capacity(face.len());

        for corner in face {
            let vertex = self.vertices.entry(corner.position).or_insert_with(|| Vertex {
                position: corner.position,
                tex_coord: corner.tex_coord,
                normal: corner.normal,
                neighbors: Vec::new(),
            });
            vertex.neighbors.push(polygon_index);

            let p = positions[corner.position];
            include_point(&mut self.bounds, p);
            corners.push(p);
        }

        self.polygons.push(Polygon {
            vertices: face.iter().map(|c| c.position).collect(),
            normal: polygon_normal(&corners),
            center: polygon_center(&corners),
        });
    }

    /// Average of the neighbouring polygons' normals, normalized.
    pub fn vertex_normal(&self, vertex: &Vertex) -> Vec4 {
        let sum = vertex
            .neighbors
            .iter()
            .fold(Vec4::ZERO, |acc, &p| acc + self.polygons[p].normal);
        if sum.length3() < EPSILON {
            DEFAULT_NORMAL
        } else {
            sum.normalize3()
        }
    }

    /// Fills in every unset vertex normal, appending the computed normals to
    /// the model-wide `normals` array.
    pub fn compute_vertex_normals(&mut self, normals: &mut Vec<Vec4>) {
        let mut missing: Vec<usize> = self
            .vertices
            .iter()
            .filter(|(_, v)| v.normal.is_none())
            .map(|(&k, _)| k)
            .collect();
        missing.sort_unstable();

        for key in missing {
            let normal = self.vertex_normal(&self.vertices[&key]);
            normals.push(normal);
            if let Some(vertex) = self.vertices.get_mut(&key) {
                vertex.normal = Some(normals.len() - 1);
            }
        }
    }

    /// Completes loading: vertex normals and the geometry's bounding box.
    pub fn finish(&mut self, normals: &mut Vec<Vec4>) {
        self.compute_vertex_normals(normals);
        self.bounding_box = self.bounds.map(BoundingBox::new);
    }
}
