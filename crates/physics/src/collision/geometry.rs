//! Triangle geometry and the soup builder used to assemble collision meshes.
//!
//! Collision geometry is a flat list of world-space triangles. Winding is
//! counter-clockwise when seen from outside, so [`Triangle::normal`] points
//! away from solid space. The builders here always respect that winding.

use glam::Vec3;
use parry3d::bounding_volume::Aabb;
use parry3d::math::Point;
use serde::{Deserialize, Serialize};

/// A single collision triangle in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub const fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Unit face normal, or zero for a degenerate triangle.
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a).normalize_or_zero()
    }

    /// Twice the triangle area.
    pub fn double_area(&self) -> f32 {
        (self.b - self.a).cross(self.c - self.a).length()
    }

    pub fn is_degenerate(&self) -> bool {
        self.double_area() < 1e-8
    }

    pub fn min(&self) -> Vec3 {
        self.a.min(self.b).min(self.c)
    }

    pub fn max(&self) -> Vec3 {
        self.a.max(self.b).max(self.c)
    }

    /// Axis-aligned bounds for the spatial index.
    pub fn aabb(&self) -> Aabb {
        aabb_from(self.min(), self.max())
    }

    /// The same triangle as a parry3d shape for narrow-phase queries.
    pub fn to_shape(&self) -> parry3d::shape::Triangle {
        parry3d::shape::Triangle::new(to_point(self.a), to_point(self.b), to_point(self.c))
    }
}

#[inline]
pub(crate) fn to_point(v: Vec3) -> Point<f32> {
    Point::new(v.x, v.y, v.z)
}

#[inline]
pub(crate) fn aabb_from(min: Vec3, max: Vec3) -> Aabb {
    Aabb::new(to_point(min), to_point(max))
}

/// A ramp shaped as a closed triangular prism running along the X axis.
///
/// The sloped face starts at `base_z` (the low edge) and rises toward +Z,
/// so its normal looks toward -Z and up. A vertical back face closes the
/// prism at the crest, and triangular end caps close both X ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfRamp {
    /// X coordinate where the ramp starts (usually the larger X).
    pub start_x: f32,
    /// X coordinate where the ramp ends.
    pub end_x: f32,
    /// Height of the bottom of the prism.
    pub base_y: f32,
    /// Z coordinate of the low edge of the sloped face.
    pub base_z: f32,
    /// Vertical size from the low edge to the crest.
    pub height: f32,
    /// Face angle from horizontal, in degrees.
    pub angle_deg: f32,
}

impl SurfRamp {
    /// Horizontal depth of the sloped face along Z.
    pub fn run(&self) -> f32 {
        let tan = self.angle_deg.to_radians().tan();
        if tan.abs() < 1e-4 {
            0.0
        } else {
            self.height / tan
        }
    }

    /// Outward normal of the sloped face.
    pub fn face_normal(&self) -> Vec3 {
        let angle = self.angle_deg.to_radians();
        Vec3::new(0.0, angle.cos(), -angle.sin())
    }

    /// Point on the sloped face at the given X and vertical height above the base.
    pub fn face_point(&self, x: f32, height_above_base: f32) -> Vec3 {
        let h = height_above_base.clamp(0.0, self.height);
        let run = self.run();
        let z = if self.height > 0.0 {
            self.base_z + run * (h / self.height)
        } else {
            self.base_z
        };
        Vec3::new(x, self.base_y + h, z)
    }
}

/// Builder for a merged triangle position buffer.
///
/// Every three consecutive vertices form one triangle. The result is what
/// [`CollisionWorld::set_geometry`](super::CollisionWorld::set_geometry)
/// consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleSoup {
    vertices: Vec<Vec3>,
}

impl TriangleSoup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing position buffer. A trailing partial triangle is kept
    /// as-is and ignored later by the collision world.
    pub fn from_vertices(vertices: Vec<Vec3>) -> Self {
        Self { vertices }
    }

    pub fn add_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) -> &mut Self {
        self.vertices.extend_from_slice(&[a, b, c]);
        self
    }

    /// Add a planar quad given in counter-clockwise order.
    pub fn add_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> &mut Self {
        self.add_triangle(a, b, c);
        self.add_triangle(a, c, d)
    }

    /// Add a closed axis-aligned box with outward-facing triangles.
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3) -> &mut Self {
        let lo = center - half_extents;
        let hi = center + half_extents;
        let (x0, y0, z0) = (lo.x, lo.y, lo.z);
        let (x1, y1, z1) = (hi.x, hi.y, hi.z);

        // +Y
        self.add_quad(
            Vec3::new(x0, y1, z0),
            Vec3::new(x0, y1, z1),
            Vec3::new(x1, y1, z1),
            Vec3::new(x1, y1, z0),
        );
        // -Y
        self.add_quad(
            Vec3::new(x0, y0, z0),
            Vec3::new(x1, y0, z0),
            Vec3::new(x1, y0, z1),
            Vec3::new(x0, y0, z1),
        );
        // +X
        self.add_quad(
            Vec3::new(x1, y0, z0),
            Vec3::new(x1, y1, z0),
            Vec3::new(x1, y1, z1),
            Vec3::new(x1, y0, z1),
        );
        // -X
        self.add_quad(
            Vec3::new(x0, y0, z0),
            Vec3::new(x0, y0, z1),
            Vec3::new(x0, y1, z1),
            Vec3::new(x0, y1, z0),
        );
        // +Z
        self.add_quad(
            Vec3::new(x0, y0, z1),
            Vec3::new(x1, y0, z1),
            Vec3::new(x1, y1, z1),
            Vec3::new(x0, y1, z1),
        );
        // -Z
        self.add_quad(
            Vec3::new(x0, y0, z0),
            Vec3::new(x0, y1, z0),
            Vec3::new(x1, y1, z0),
            Vec3::new(x1, y0, z0),
        )
    }

    /// Add an indexed mesh. Triangles referencing missing vertices are skipped.
    pub fn add_indexed(&mut self, vertices: &[Vec3], indices: &[[u32; 3]]) -> &mut Self {
        let mut skipped = 0usize;
        for [i, j, k] in indices.iter().copied() {
            let lookup = |idx: u32| vertices.get(idx as usize).copied();
            match (lookup(i), lookup(j), lookup(k)) {
                (Some(a), Some(b), Some(c)) => {
                    self.add_triangle(a, b, c);
                }
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            log::warn!(
                "Skipped {} indexed triangles referencing missing vertices ({} available)",
                skipped,
                vertices.len()
            );
        }
        self
    }

    /// Add a closed ramp prism.
    pub fn add_surf_ramp(&mut self, ramp: &SurfRamp) -> &mut Self {
        let (x_hi, x_lo) = if ramp.start_x >= ramp.end_x {
            (ramp.start_x, ramp.end_x)
        } else {
            (ramp.end_x, ramp.start_x)
        };
        let run = ramp.run();
        let y_low = ramp.base_y;
        let y_top = ramp.base_y + ramp.height;
        let z_low = ramp.base_z;
        let z_back = ramp.base_z + run;

        let low = |x: f32| Vec3::new(x, y_low, z_low);
        let crest = |x: f32| Vec3::new(x, y_top, z_back);
        let back = |x: f32| Vec3::new(x, y_low, z_back);

        // Sloped face
        self.add_quad(low(x_lo), crest(x_lo), crest(x_hi), low(x_hi));
        // Back face (+Z)
        self.add_quad(back(x_lo), back(x_hi), crest(x_hi), crest(x_lo));
        // Bottom (-Y)
        self.add_quad(low(x_lo), low(x_hi), back(x_hi), back(x_lo));
        // End caps
        self.add_triangle(low(x_hi), crest(x_hi), back(x_hi));
        self.add_triangle(low(x_lo), back(x_lo), crest(x_lo))
    }

    /// Append every triangle of another soup.
    pub fn extend(&mut self, other: &TriangleSoup) -> &mut Self {
        self.vertices.extend_from_slice(&other.vertices);
        self
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn into_vertices(self) -> Vec<Vec3> {
        self.vertices
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.vertices
            .chunks_exact(3)
            .map(|t| Triangle::new(t[0], t[1], t[2]))
    }

    /// A square floor at Y = 0 spanning `[-half_extent, half_extent]` in X and Z.
    pub fn flat_floor(half_extent: f32) -> Self {
        let h = half_extent;
        let corners = [
            Vec3::new(-h, 0.0, -h),
            Vec3::new(-h, 0.0, h),
            Vec3::new(h, 0.0, h),
            Vec3::new(h, 0.0, -h),
        ];
        let mut soup = Self::new();
        soup.add_indexed(&corners, &[[0, 1, 2], [0, 2, 3]]);
        soup
    }

    /// A single ramp prism.
    pub fn surf_ramp(ramp: &SurfRamp) -> Self {
        let mut soup = Self::new();
        soup.add_surf_ramp(ramp);
        soup
    }
}
