//! Collision world holding the static triangle mesh of the active map.
//!
//! The world stores a flat list of triangles plus a spatial index over them
//! and answers capsule queries against it. Geometry is replaced wholesale by
//! [`CollisionWorld::set_geometry`]; it is never edited in place.

use glam::Vec3;
use parry3d::math::Isometry;
use parry3d::query;
use thiserror::Error;

use super::geometry::{Triangle, TriangleSoup};
use super::index::{BvhIndex, TriangleIndex};
use super::query::CollisionQuery;
use super::trace::{Capsule, GroundProbe, OverlapResult, TraceResult};
use crate::math::{angle_from_up_deg, VECTOR_EPSILON};

/// Coarse samples taken along a sweep before bisecting.
pub const COARSE_TRACE_STEPS: u32 = 12;

/// Bisection rounds between the last clear and first colliding sample.
pub const BISECTION_STEPS: u32 = 8;

/// Push-out passes for a stationary overlap query.
pub const OVERLAP_PASSES: u32 = 3;

/// Distance a trace backs off from the impact along the hit normal.
pub const TRACE_SKIN: f32 = 0.002;

/// Extra clearance added after each push-out pass.
const RESOLVE_SKIN: f32 = 0.001;

/// Triangles closer than `radius - OVERLAP_TOLERANCE` count as penetrating.
const OVERLAP_TOLERANCE: f32 = 1e-4;

/// Sweeps shorter than this become a static overlap test.
const MIN_TRACE_DISTANCE: f32 = 1e-5;

/// Contact reach used to find a normal at the clear side of an impact.
const NORMAL_PROBE_MARGIN: f32 = 0.01;

/// Contacts whose push barely aligns with the pass direction are cleared
/// by their raw depth instead of depth / alignment.
const MIN_PUSH_ALIGNMENT: f32 = 0.1;

/// Errors raised while building collision geometry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollisionError {
    #[error("collision geometry has no triangles")]
    EmptyGeometry,

    #[error("position buffer length {len} is not a multiple of 3")]
    UnalignedPositions { len: usize },
}

/// One penetrating triangle.
#[derive(Debug, Clone, Copy)]
struct Contact {
    depth: f32,
    push: Vec3,
}

fn deepest(contacts: &[Contact]) -> Option<Contact> {
    contacts.iter().copied().fold(None, |best, c| match best {
        Some(b) if b.depth >= c.depth => Some(b),
        _ => Some(c),
    })
}

/// Depth-weighted push direction, falling back to the deepest push.
fn combined_push(contacts: &[Contact]) -> Option<Vec3> {
    let sum: Vec3 = contacts.iter().map(|c| c.push * c.depth).sum();
    if sum.length_squared() > VECTOR_EPSILON * VECTOR_EPSILON {
        Some(sum.normalize())
    } else {
        deepest(contacts).map(|c| c.push)
    }
}

/// The collision world containing the static map mesh.
///
/// Generic over the broad-phase index so a brute-force [`LinearIndex`]
/// and the default [`BvhIndex`] are interchangeable.
///
/// [`LinearIndex`]: super::LinearIndex
#[derive(Debug)]
pub struct CollisionWorld<I = BvhIndex> {
    triangles: Vec<Triangle>,
    /// `None` while the world has no geometry.
    index: Option<I>,
    bounds: Option<(Vec3, Vec3)>,
}

impl<I> Default for CollisionWorld<I> {
    fn default() -> Self {
        Self {
            triangles: Vec::new(),
            index: None,
            bounds: None,
        }
    }
}

impl<I: TriangleIndex> CollisionWorld<I> {
    /// Create an empty collision world. Every query against it misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a world from a triangle soup.
    pub fn from_soup(soup: &TriangleSoup) -> Result<Self, CollisionError> {
        let mut world = Self::new();
        world.set_geometry(soup.vertices())?;
        Ok(world)
    }

    /// Build a world from a flat `[x, y, z, x, y, z, ...]` buffer.
    pub fn from_flat_positions(positions: &[f32]) -> Result<Self, CollisionError> {
        if positions.len() < 3 {
            return Err(CollisionError::EmptyGeometry);
        }
        if positions.len() % 3 != 0 {
            return Err(CollisionError::UnalignedPositions {
                len: positions.len(),
            });
        }

        let vertices: Vec<Vec3> = positions
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
            .collect();

        let mut world = Self::new();
        world.set_geometry(&vertices)?;
        Ok(world)
    }

    /// Replace the mesh and rebuild the spatial index.
    ///
    /// Every three consecutive vertices form a triangle. A trailing partial
    /// triangle is ignored, as are zero-area triangles. On error the previous
    /// geometry is left untouched.
    pub fn set_geometry(&mut self, vertices: &[Vec3]) -> Result<(), CollisionError> {
        if vertices.len() < 3 {
            return Err(CollisionError::EmptyGeometry);
        }

        let trailing = vertices.len() % 3;
        if trailing != 0 {
            log::warn!("Ignoring {} trailing vertices of a partial triangle", trailing);
        }

        let total = vertices.len() / 3;
        let triangles: Vec<Triangle> = vertices
            .chunks_exact(3)
            .map(|t| Triangle::new(t[0], t[1], t[2]))
            .filter(|t| !t.is_degenerate())
            .collect();

        if triangles.is_empty() {
            return Err(CollisionError::EmptyGeometry);
        }
        if triangles.len() < total {
            log::debug!("Dropped {} degenerate triangles", total - triangles.len());
        }

        let (min, max) = triangles.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), t| (min.min(t.min()), max.max(t.max())),
        );

        self.index = Some(I::build(&triangles));
        self.triangles = triangles;
        self.bounds = Some((min, max));

        log::debug!(
            "Collision geometry rebuilt: {} triangles, bounds {:?} .. {:?}",
            self.triangles.len(),
            min,
            max
        );
        Ok(())
    }

    /// Remove all geometry.
    pub fn clear(&mut self) {
        self.triangles.clear();
        self.index = None;
        self.bounds = None;
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// World-space bounds of all geometry.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.bounds
    }

    /// Triangles penetrated by the capsule, grown by `margin`.
    fn contacts(&self, feet: Vec3, capsule: Capsule, margin: f32) -> Vec<Contact> {
        let Some(index) = &self.index else {
            return Vec::new();
        };

        let mut candidates = Vec::new();
        index.query(&capsule.bounds(feet, margin + OVERLAP_TOLERANCE), &mut candidates);

        let (bottom, top) = capsule.segment(feet);
        let mid = (bottom + top) * 0.5;
        let reach = capsule.radius + margin;
        let shape = capsule.to_shape(feet);
        let identity = Isometry::identity();

        let mut contacts = Vec::new();
        for tri in candidates.into_iter().filter_map(|i| self.triangles.get(i)) {
            let triangle = tri.to_shape();
            let Ok(Some(hit)) = query::contact(&identity, &shape, &identity, &triangle, margin)
            else {
                continue;
            };
            if hit.dist >= margin - OVERLAP_TOLERANCE {
                continue;
            }

            // Face normal oriented toward the capsule
            let mut face = tri.normal();
            if face.dot(mid - tri.a) < 0.0 {
                face = -face;
            }

            // Distance from the core segment to the triangle
            let core_dist = hit.dist + capsule.radius;
            // normal1 points out of the capsule toward the triangle
            let n = hit.normal1.into_inner();
            let push = -Vec3::new(n.x, n.y, n.z);

            let (push, depth) = if core_dist > VECTOR_EPSILON && push.is_finite() {
                if push.dot(face) < 0.0 {
                    // Segment already passed behind the face
                    (-push, reach + core_dist)
                } else {
                    (push, margin - hit.dist)
                }
            } else {
                (face, reach)
            };

            if push != Vec3::ZERO {
                contacts.push(Contact { depth, push });
            }
        }
        contacts
    }

    fn overlaps(&self, feet: Vec3, capsule: Capsule) -> bool {
        !self.contacts(feet, capsule, 0.0).is_empty()
    }

    fn contact_normal(&self, feet: Vec3, capsule: Capsule, margin: f32) -> Option<Vec3> {
        combined_push(&self.contacts(feet, capsule, margin))
    }

    fn resolve_overlap(&self, feet: Vec3, capsule: Capsule) -> OverlapResult {
        let mut position = feet;
        let mut weighted = Vec3::ZERO;
        let mut strongest: Option<Contact> = None;
        let mut initial_depth: Option<f32> = None;

        for _ in 0..OVERLAP_PASSES {
            let contacts = self.contacts(position, capsule, 0.0);
            let Some(pass_deepest) = deepest(&contacts) else {
                break;
            };

            initial_depth.get_or_insert(pass_deepest.depth);
            if strongest.map_or(true, |s| pass_deepest.depth > s.depth) {
                strongest = Some(pass_deepest);
            }

            let pass_sum: Vec3 = contacts.iter().map(|c| c.push * c.depth).sum();
            weighted += pass_sum;

            let direction = combined_push(&contacts).unwrap_or(pass_deepest.push);

            // Far enough along `direction` to clear the deepest contact
            let distance = contacts
                .iter()
                .map(|c| {
                    let along = c.push.dot(direction);
                    if along > MIN_PUSH_ALIGNMENT {
                        c.depth / along
                    } else {
                        c.depth
                    }
                })
                .fold(0.0_f32, f32::max)
                .min(capsule.radius * 2.0);

            position += direction * (distance + RESOLVE_SKIN);
        }

        let Some(strongest) = strongest else {
            return OverlapResult::clear(feet);
        };

        let normal = if weighted.length_squared() > VECTOR_EPSILON * VECTOR_EPSILON {
            weighted.normalize()
        } else {
            strongest.push
        };

        OverlapResult {
            collided: true,
            depth: initial_depth.unwrap_or(0.0),
            normal,
            position,
        }
    }

    fn sweep(&self, start: Vec3, end: Vec3, capsule: Capsule) -> TraceResult {
        if self.index.is_none() {
            return TraceResult::no_hit(end);
        }

        let start = self.resolve_overlap(start, capsule).position;
        let delta = end - start;

        if delta.length_squared() < MIN_TRACE_DISTANCE * MIN_TRACE_DISTANCE {
            let overlap = self.resolve_overlap(start, capsule);
            return if overlap.collided {
                TraceResult::hit(0.0, overlap.position, overlap.normal)
            } else {
                TraceResult::no_hit(start)
            };
        }

        let mut lo = 0.0_f32;
        let mut first_hit = None;
        for step in 1..=COARSE_TRACE_STEPS {
            let t = step as f32 / COARSE_TRACE_STEPS as f32;
            if self.overlaps(start + delta * t, capsule) {
                first_hit = Some(t);
                break;
            }
            lo = t;
        }

        let Some(mut hi) = first_hit else {
            return TraceResult::no_hit(end);
        };

        for _ in 0..BISECTION_STEPS {
            let mid = (lo + hi) * 0.5;
            if self.overlaps(start + delta * mid, capsule) {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        let clear = start + delta * lo;
        let impact = start + delta * hi;
        let normal = self
            .contact_normal(impact, capsule, 0.0)
            .or_else(|| self.contact_normal(clear, capsule, NORMAL_PROBE_MARGIN))
            .unwrap_or(Vec3::Y);

        let backed_off = clear + normal * TRACE_SKIN;
        let safe = if self.overlaps(backed_off, capsule) {
            clear
        } else {
            backed_off
        };

        TraceResult::hit(lo, safe, normal)
    }

    fn probe_ground(
        &self,
        feet: Vec3,
        capsule: Capsule,
        probe_distance: f32,
    ) -> Option<GroundProbe> {
        if probe_distance <= 0.0 {
            return None;
        }

        let trace = self.sweep(feet, feet - Vec3::Y * probe_distance, capsule);
        if !trace.hit {
            return None;
        }

        Some(GroundProbe {
            distance: trace.fraction * probe_distance,
            position: trace.end_position,
            normal: trace.normal,
            slope_angle_deg: angle_from_up_deg(trace.normal),
        })
    }
}

impl<I: TriangleIndex> CollisionQuery for CollisionWorld<I> {
    fn query_ground(
        &self,
        feet: Vec3,
        capsule: Capsule,
        probe_distance: f32,
    ) -> Option<GroundProbe> {
        self.probe_ground(feet, capsule, probe_distance)
    }

    fn trace_capsule(&self, start: Vec3, end: Vec3, capsule: Capsule) -> TraceResult {
        self.sweep(start, end, capsule)
    }

    fn resolve_capsule_position(&self, feet: Vec3, capsule: Capsule) -> OverlapResult {
        self.resolve_overlap(feet, capsule)
    }
}
