use glam::DVec3;
use itertools::Itertools;
use log::{debug, trace, warn};
use rstar::{primitives::GeomWithData, PointDistance, RTree};
use thiserror::Error;

use crate::{emitted_vertex_count, subdivide, FaceList, Tetrahedron, AABB};

pub const DEFAULT_SCALE: f64 = 0.2;
pub const DEFAULT_LEVELS: u32 = 2;
pub const DEFAULT_MAX_LEVELS: u32 = 10;

/// Depth from which generation gets logged as a warning.
const LARGE_MESH_LEVELS: u32 = 8;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("recursion depth {levels} exceeds the configured maximum of {max}")]
    LevelsTooDeep { levels: u32, max: u32 },
    #[error("scale must be finite and non-negative, got {0}")]
    InvalidScale(f64),
    #[error("base point must be finite, got {0}")]
    InvalidBase(DVec3),
    #[error("depth {0} produces more vertices than a u32 index buffer can address")]
    TooManyVertices(u32),
    #[error("base point needs 3 coordinates, got {0}")]
    BadBaseLength(usize),
}

// =============================================================================

/// Parameters for a checked mesh generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshConfig {
    pub base: DVec3,
    pub scale: f64,
    pub levels: u32,
    /// Deepest recursion accepted by [`MeshConfig::generate`].
    pub max_levels: u32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            base: DVec3::ZERO,
            scale: DEFAULT_SCALE,
            levels: DEFAULT_LEVELS,
            max_levels: DEFAULT_MAX_LEVELS,
        }
    }
}

impl MeshConfig {
    pub fn new(scale: f64, levels: u32) -> Self {
        Self {
            scale,
            levels,
            ..Default::default()
        }
    }

    pub fn with_base(mut self, base: DVec3) -> Self {
        self.base = base;
        self
    }

    pub fn with_max_levels(mut self, max_levels: u32) -> Self {
        self.max_levels = max_levels;
        self
    }

    /// Number of vertices the mesh will hold, checking every parameter on the way.
    pub fn vertex_count(&self) -> Result<u32, MeshError> {
        if self.levels > self.max_levels {
            return Err(MeshError::LevelsTooDeep {
                levels: self.levels,
                max: self.max_levels,
            });
        }
        if !self.scale.is_finite() || self.scale < 0.0 {
            return Err(MeshError::InvalidScale(self.scale));
        }
        if !self.base.is_finite() {
            return Err(MeshError::InvalidBase(self.base));
        }

        emitted_vertex_count(self.levels)
            .and_then(|count| u32::try_from(count).ok())
            .ok_or(MeshError::TooManyVertices(self.levels))
    }

    pub fn generate(&self) -> Result<Mesh, MeshError> {
        let count = self.vertex_count()?;

        if self.levels >= LARGE_MESH_LEVELS {
            warn!(
                "generating {count} vertices for depth {}, this may take a while",
                self.levels
            );
        }

        let points = subdivide(self.base, self.scale, self.levels);
        debug_assert_eq!(points.len(), count as usize);

        let vertices = points.iter().flat_map(|p| p.to_array()).collect();
        let indices = (0..count).collect();

        debug!(
            "generated sierpinski mesh: levels={} scale={} base={} vertices={count}",
            self.levels, self.scale, self.base
        );

        Ok(Mesh { vertices, indices })
    }
}

/// Generate the fractal around the origin.
pub fn generate_mesh(scale: f64, levels: u32) -> Result<Mesh, MeshError> {
    MeshConfig::new(scale, levels).generate()
}

// =============================================================================

/// Vertex and index buffers ready for upload. Every three consecutive vertices
/// form one outward wound triangle, and `indices[i] == i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<f64>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Flat positions, 3 floats per vertex.
    pub fn vertices(&self) -> &[f64] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn into_buffers(self) -> (Vec<f64>, Vec<u32>) {
        (self.vertices, self.indices)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn tetrahedron_count(&self) -> usize {
        self.vertex_count() / 12
    }

    pub fn positions(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.vertices.chunks_exact(3).map(DVec3::from_slice)
    }

    pub fn triangles(&self) -> impl Iterator<Item = [DVec3; 3]> + '_ {
        self.positions().tuples().map(|(a, b, c)| [a, b, c])
    }

    /// The emitted tetrahedra, in traversal order.
    pub fn tetrahedra(&self) -> impl Iterator<Item = Tetrahedron> + '_ {
        self.vertices.chunks_exact(36).map(|chunk| {
            let faces: FaceList =
                std::array::from_fn(|i| DVec3::from_slice(&chunk[i * 3..i * 3 + 3]));
            Tetrahedron::from_faces(&faces)
        })
    }

    /// One unit normal per triangle, following the winding.
    pub fn face_normals(&self) -> Vec<DVec3> {
        self.triangles()
            .map(|[a, b, c]| (b - a).cross(c - a).normalize_or_zero())
            .collect()
    }

    /// Single precision copy of the vertex buffer.
    pub fn to_f32(&self) -> Vec<f32> {
        self.vertices.iter().map(|&v| v as f32).collect()
    }

    pub fn bounds(&self) -> Option<AABB<DVec3>> {
        AABB::<DVec3>::from_points(self.positions())
    }

    /// Merge vertices closer than `epsilon` into a shared-vertex mesh.
    ///
    /// The first occurrence of a position is kept. Triangle order and winding
    /// are unchanged. A negative or NaN `epsilon` is treated as zero, so only
    /// exactly coincident positions are merged.
    pub fn to_shared(&self, epsilon: f64) -> SharedMesh {
        let mut lookup: RTree<IndexedPoint> = RTree::new();
        let mut positions = Vec::new();
        let mut indices = Vec::with_capacity(self.indices.len());
        // f64::max returns the other operand for NaN
        let epsilon = epsilon.max(0.0);
        let epsilon_sq = epsilon * epsilon;

        for point in self.positions() {
            let key = point.to_array();

            let existing = lookup
                .nearest_neighbor(&key)
                .filter(|found| found.distance_2(&key) <= epsilon_sq)
                .map(|found| found.data);

            let index = match existing {
                Some(index) => index,
                None => {
                    // bounded by self.indices, which is u32
                    let index = positions.len() as u32;
                    positions.push(point);
                    lookup.insert(IndexedPoint::new(key, index));
                    index
                }
            };

            indices.push(index);
        }

        trace!(
            "merged {} vertices into {} shared positions",
            self.vertex_count(),
            positions.len()
        );

        SharedMesh { positions, indices }
    }
}

// =============================================================================

type IndexedPoint = GeomWithData<[f64; 3], u32>;

/// A mesh where coincident vertices share one position.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedMesh {
    positions: Vec<DVec3>,
    indices: Vec<u32>,
}

impl SharedMesh {
    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    /// Triangle list, 3 entries per triangle.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertices(&self) -> Vec<f64> {
        self.positions.iter().flat_map(|p| p.to_array()).collect()
    }

    pub fn triangles(&self) -> impl Iterator<Item = [DVec3; 3]> + '_ {
        self.indices
            .iter()
            .map(|&i| self.positions[i as usize])
            .tuples()
            .map(|(a, b, c)| [a, b, c])
    }
}

// =============================================================================
