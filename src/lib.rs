use std::f64::consts::SQRT_2;

use glam::{DMat3, DVec3};

mod mesh;
#[cfg(feature = "wasm")]
mod wasm;

pub use mesh::{
    generate_mesh, Mesh, MeshConfig, MeshError, SharedMesh, DEFAULT_LEVELS, DEFAULT_MAX_LEVELS,
    DEFAULT_SCALE,
};

/// A point in space. Equality is bitwise on the coordinates.
pub type Point3 = DVec3;

/// The 12 vertices of a tetrahedron's 4 triangular faces, 3 per face.
pub type FaceList = [DVec3; 12];

/// Indices into a [`FaceList`] of the corners the four children are grown towards:
/// face A's three vertices (p0, p2, p1), then the apex p3 as the last vertex of face D.
const CHILD_CORNERS: [usize; 4] = [0, 1, 2, 11];

// =============================================================================

/// A Tetrahedron, represented as 4x 3D points in generation order (p0, p1, p2, p3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tetrahedron {
    vertices: [DVec3; 4],
}

impl Tetrahedron {
    pub fn new(vertices: [DVec3; 4]) -> Tetrahedron {
        Self { vertices }
    }

    /// Build the tetrahedron centred on `base` with the given `scale`.
    pub fn generate(base: DVec3, scale: f64) -> Tetrahedron {
        Self::new(tetrahedron_corners(base, scale))
    }

    /// Recover the corners from a face list laid out by [`Tetrahedron::faces`].
    pub fn from_faces(faces: &FaceList) -> Tetrahedron {
        Self::new([faces[0], faces[2], faces[1], faces[5]])
    }

    pub fn vertices(&self) -> &[DVec3; 4] {
        &self.vertices
    }

    /// Expand into 4 faces of 3 vertices each, wound so the face normals point outwards.
    pub fn faces(&self) -> FaceList {
        let [p0, p1, p2, p3] = self.vertices;
        [
            p0, p2, p1, // A
            p0, p1, p3, // B
            p0, p3, p2, // C
            p1, p2, p3, // D
        ]
    }

    /// Returns the signed volume of this [`Tetrahedron`]. Positive for generated tetrahedra.
    pub fn volume(&self) -> f64 {
        let a = self.vertices[1] - self.vertices[0];
        let b = self.vertices[2] - self.vertices[0];
        let c = self.vertices[3] - self.vertices[0];

        (a.cross(b)).dot(c) / 6.0
    }

    pub fn centroid(&self) -> DVec3 {
        self.vertices.iter().sum::<DVec3>() / 4.0
    }

    /// Compute the tetrahedra-local (barycentric) coordinate matrix for this [`Tetrahedron`].
    /// Apply it to `point - vertices[0]`.
    pub fn to_tetra_coords(&self) -> DMat3 {
        let a = self.vertices[1] - self.vertices[0];
        let b = self.vertices[2] - self.vertices[0];
        let c = self.vertices[3] - self.vertices[0];

        DMat3::from_cols(a, b, c).inverse()
    }

    /// Test if a point is inside this [`Tetrahedron`], allowing `epsilon` of slack on
    /// each barycentric coordinate. False when the volume is exactly zero; nearly
    /// flat tetrahedra are ill-conditioned.
    pub fn contains_point(&self, point: DVec3, epsilon: f64) -> bool {
        if self.volume() == 0.0 {
            return false;
        }

        let local = self.to_tetra_coords() * (point - self.vertices[0]);
        local.cmpge(DVec3::splat(-epsilon)).all() && local.element_sum() <= 1.0 + epsilon
    }
}

// =============================================================================

/// The 4 corners of the tetrahedron centred on `base`.
///
/// p0..p2 lie in the plane of `base` on a circle of radius `scale`, p3 sits
/// `scale * sqrt(2)` above it. The same offsets are used at every level of the
/// fractal, so they must not be "corrected" towards an ideal shape.
pub fn tetrahedron_corners(base: DVec3, scale: f64) -> [DVec3; 4] {
    let DVec3 { x, y, z } = base;
    let sqrt_3 = 3.0f64.sqrt();
    let dy = scale * sqrt_3 * 0.5;
    let dx = scale * -0.5;

    let p0 = DVec3::new(x + scale, y, z);
    let p1 = DVec3::new(x + dx, y + dy, z);
    let p2 = DVec3::new(x + dx, y - dy, z);
    let p3 = DVec3::new(x, y, z + scale * SQRT_2);
    [p0, p1, p2, p3]
}

/// The face list of the tetrahedron centred on `base`. A `scale` of zero yields
/// `base` twelve times.
pub fn tetrahedron(base: DVec3, scale: f64) -> FaceList {
    Tetrahedron::generate(base, scale).faces()
}

pub fn midpoint(a: DVec3, b: DVec3) -> DVec3 {
    (a + b) * 0.5
}

/// Centres of the four half-scale children of the tetrahedron at `base`, in emission order.
pub fn child_bases(base: DVec3, scale: f64) -> [DVec3; 4] {
    let faces = tetrahedron(base, scale);
    CHILD_CORNERS.map(|corner| midpoint(base, faces[corner]))
}

/// Number of points [`subdivide`] emits for `levels`, or `None` on overflow.
pub fn emitted_vertex_count(levels: u32) -> Option<usize> {
    4usize.checked_pow(levels)?.checked_mul(12)
}

// =============================================================================

/// Generate the Sierpinski tetrahedron as a flat list of face vertices.
///
/// Depth 0 is a single [`tetrahedron`]. Otherwise the output is the
/// concatenation of the four children from [`child_bases`], each subdivided at
/// half scale and one level less. The result holds `12 * 4^levels` points.
///
/// No validation is done here; see [`MeshConfig`] for a checked entry point.
pub fn subdivide(base: DVec3, scale: f64, levels: u32) -> Vec<DVec3> {
    let mut out = Vec::new();
    subdivide_into(&mut out, base, scale, levels);
    out
}

/// Like [`subdivide`], appending to `out`.
pub fn subdivide_into(out: &mut Vec<DVec3>, base: DVec3, scale: f64, levels: u32) {
    if let Some(count) = emitted_vertex_count(levels) {
        out.reserve(count);
    }

    // Pending subtrees, popped depth-first. Holds at most 3 * levels + 1 entries.
    let mut pending = vec![(base, scale, levels)];

    while let Some((base, scale, levels)) = pending.pop() {
        if levels == 0 {
            out.extend_from_slice(&tetrahedron(base, scale));
            continue;
        }

        let children = child_bases(base, scale);
        pending.extend(
            children
                .iter()
                .rev()
                .map(|&child| (child, scale * 0.5, levels - 1)),
        );
    }
}

// =============================================================================

/// Axis aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB<T> {
    min: T,
    max: T,
}

impl<T> AABB<T>
where
    T: Copy + StrictBound,
{
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> T {
        self.min
    }

    pub fn max(&self) -> T {
        self.max
    }

    pub fn contains(&self, point: &T) -> bool {
        self.min.all_less_eq_than(point) && point.all_less_eq_than(&self.max)
    }
}

impl AABB<DVec3> {
    /// The smallest box around `points`, `None` if there are none.
    pub fn from_points<I: IntoIterator<Item = DVec3>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;

        Some(points.fold(Self::new(first, first), |bb, p| {
            Self::new(bb.min.min(p), bb.max.max(p))
        }))
    }

    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }
}

pub trait StrictBound {
    fn all_less_eq_than(&self, other: &Self) -> bool;
}

impl StrictBound for DVec3 {
    fn all_less_eq_than(&self, other: &Self) -> bool {
        self.cmple(*other).all()
    }
}

// =============================================================================
