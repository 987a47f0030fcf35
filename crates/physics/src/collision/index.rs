//! Spatial indices over collision triangles.
//!
//! The collision world only needs one thing from an index: "which triangles
//! might touch this box". [`LinearIndex`] answers by scanning every bound,
//! [`BvhIndex`] by walking a parry3d [`Qbvh`]. Both return candidates in
//! ascending order so query results never depend on the index in use.

use std::fmt;

use parry3d::bounding_volume::{Aabb, BoundingVolume};
use parry3d::partitioning::Qbvh;

use super::geometry::Triangle;

/// Broad-phase lookup of triangles by bounding box.
pub trait TriangleIndex {
    /// Build the index over the given triangles. Indices returned by
    /// [`query`](Self::query) refer to positions in this slice.
    fn build(triangles: &[Triangle]) -> Self
    where
        Self: Sized;

    /// Append the indices of all triangles whose bounds intersect `bounds`.
    fn query(&self, bounds: &Aabb, out: &mut Vec<usize>);

    /// Number of indexed triangles.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Brute-force index: one bounds test per triangle.
///
/// Fine for synthetic test worlds with a handful of triangles.
#[derive(Debug, Clone, Default)]
pub struct LinearIndex {
    bounds: Vec<Aabb>,
}

impl TriangleIndex for LinearIndex {
    fn build(triangles: &[Triangle]) -> Self {
        Self {
            bounds: triangles.iter().map(Triangle::aabb).collect(),
        }
    }

    fn query(&self, bounds: &Aabb, out: &mut Vec<usize>) {
        out.extend(
            self.bounds
                .iter()
                .enumerate()
                .filter(|(_, aabb)| aabb.intersects(bounds))
                .map(|(i, _)| i),
        );
    }

    fn len(&self) -> usize {
        self.bounds.len()
    }
}

/// Bounding volume hierarchy built with parry3d.
pub struct BvhIndex {
    qbvh: Qbvh<u32>,
    len: usize,
}

impl TriangleIndex for BvhIndex {
    fn build(triangles: &[Triangle]) -> Self {
        let mut qbvh = Qbvh::new();
        qbvh.clear_and_rebuild(
            triangles
                .iter()
                .enumerate()
                .map(|(i, tri)| (i as u32, tri.aabb())),
            0.0,
        );
        Self {
            qbvh,
            len: triangles.len(),
        }
    }

    fn query(&self, bounds: &Aabb, out: &mut Vec<usize>) {
        let mut hits: Vec<u32> = Vec::new();
        self.qbvh.intersect_aabb(bounds, &mut hits);
        hits.sort_unstable();
        out.extend(hits.into_iter().map(|i| i as usize));
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl fmt::Debug for BvhIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BvhIndex").field("len", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::collision::geometry::{aabb_from, TriangleSoup};

    fn scattered_boxes() -> Vec<Triangle> {
        let mut soup = TriangleSoup::new();
        for i in 0..8 {
            for j in 0..8 {
                soup.add_box(
                    Vec3::new(i as f32 * 3.0, 0.0, j as f32 * 3.0),
                    Vec3::splat(0.5),
                );
            }
        }
        soup.triangles().collect()
    }

    #[test]
    fn test_linear_and_bvh_agree() {
        let triangles = scattered_boxes();
        let linear = LinearIndex::build(&triangles);
        let bvh = BvhIndex::build(&triangles);
        assert_eq!(linear.len(), bvh.len());

        let probes = [
            aabb_from(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)),
            aabb_from(Vec3::new(2.0, -0.2, 2.0), Vec3::new(7.0, 0.2, 4.0)),
            aabb_from(Vec3::new(100.0, 0.0, 100.0), Vec3::new(101.0, 1.0, 101.0)),
            aabb_from(Vec3::new(-50.0, -50.0, -50.0), Vec3::new(50.0, 50.0, 50.0)),
        ];

        for probe in probes {
            let mut a = Vec::new();
            let mut b = Vec::new();
            linear.query(&probe, &mut a);
            bvh.query(&probe, &mut b);
            assert_eq!(a, b, "indices disagree for {:?}", probe);
        }
    }

    #[test]
    fn test_query_miss_is_empty() {
        let triangles = scattered_boxes();
        let bvh = BvhIndex::build(&triangles);
        let mut out = Vec::new();
        bvh.query(
            &aabb_from(Vec3::splat(500.0), Vec3::splat(501.0)),
            &mut out,
        );
        assert!(out.is_empty());
    }
}
