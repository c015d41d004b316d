use crate::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Substitute for an exactly-zero ray direction component in the slab test.
pub const RAY_DIR_EPSILON: f32 = 1e-4;

/// Two faces closer than this (in distance from the query point) get their normals blended.
pub const CORNER_BLEND_DISTANCE: f32 = 0.3;

/// One side of an axis-aligned [`Rect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Face {
    MinX,
    MaxX,
    MinZ,
    MaxZ,
}

impl Face {
    pub const ALL: [Face; 4] = [Face::MinX, Face::MaxX, Face::MinZ, Face::MaxZ];

    /// Outward unit normal.
    pub fn normal(self) -> Vec2 {
        match self {
            Face::MinX => Vec2::new(-1.0, 0.0),
            Face::MaxX => Vec2::new(1.0, 0.0),
            Face::MinZ => Vec2::new(0.0, -1.0),
            Face::MaxZ => Vec2::new(0.0, 1.0),
        }
    }
}

/// Axis-aligned rectangle on the floor plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Rect {
    pub const fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
        }
    }

    pub fn from_center(center: Vec2, half_x: f32, half_z: f32) -> Self {
        Self::new(
            center.x - half_x,
            center.x + half_x,
            center.z - half_z,
            center.z + half_z,
        )
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_z + self.max_z) * 0.5,
        )
    }

    pub fn is_valid(&self) -> bool {
        [self.min_x, self.max_x, self.min_z, self.max_z]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_z <= self.max_z
    }

    /// Grow every side outward by `by`.
    pub fn expand(&self, by: f32) -> Self {
        Self::new(
            self.min_x - by,
            self.max_x + by,
            self.min_z - by,
            self.max_z + by,
        )
    }

    /// Shrink every side inward by `by`, collapsing to the centre line on an axis that is too
    /// narrow.
    pub fn inset(&self, by: f32) -> Self {
        let c = self.center();
        let (min_x, max_x) = if self.max_x - self.min_x >= 2.0 * by {
            (self.min_x + by, self.max_x - by)
        } else {
            (c.x, c.x)
        };
        let (min_z, max_z) = if self.max_z - self.min_z >= 2.0 * by {
            (self.min_z + by, self.max_z - by)
        } else {
            (c.z, c.z)
        };
        Self::new(min_x, max_x, min_z, max_z)
    }

    /// Inclusive containment.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.z >= self.min_z && p.z <= self.max_z
    }

    /// Exclusive containment (points on the boundary are outside).
    pub fn contains_strict(&self, p: Vec2) -> bool {
        p.x > self.min_x && p.x < self.max_x && p.z > self.min_z && p.z < self.max_z
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.min_x, self.max_x),
            p.z.clamp(self.min_z, self.max_z),
        )
    }

    /// Signed distance from `p` to each side, measured inward (negative once `p` is past it).
    pub fn face_distances(&self, p: Vec2) -> [(Face, f32); 4] {
        [
            (Face::MinX, p.x - self.min_x),
            (Face::MaxX, self.max_x - p.x),
            (Face::MinZ, p.z - self.min_z),
            (Face::MaxZ, self.max_z - p.z),
        ]
    }

    /// [`Rect::face_distances`] sorted nearest first; ties keep `MinX, MaxX, MinZ, MaxZ` order.
    pub fn faces_by_distance(&self, p: Vec2) -> [(Face, f32); 4] {
        let mut faces = self.face_distances(p);
        faces.sort_by(|a, b| a.1.total_cmp(&b.1));
        faces
    }

    /// Outward normal of the face nearest to `p`.
    ///
    /// When the two nearest faces are within [`CORNER_BLEND_DISTANCE`] of each other their
    /// normals are interpolated, with weight `d1 / (d1 + d2)` on the nearest face, so the
    /// direction changes smoothly around corners.
    pub fn face_normal(&self, p: Vec2) -> Vec2 {
        let faces = self.faces_by_distance(p);
        let (nearest, d1) = faces[0];
        let (second, d2) = faces[1];

        if d2 - d1 < CORNER_BLEND_DISTANCE {
            let total = d1 + d2;
            let t = if total > 0.001 { d1 / total } else { 0.5 };
            let blended = nearest.normal().lerp(second.normal(), 1.0 - t);
            if let Some(n) = blended.try_normalize(1e-6) {
                return n;
            }
        }
        nearest.normal()
    }

    /// Point just outside `face`, keeping the other coordinate of `p`.
    pub fn snap_outside(&self, p: Vec2, face: Face, margin: f32) -> Vec2 {
        match face {
            Face::MinX => Vec2::new(self.min_x - margin, p.z),
            Face::MaxX => Vec2::new(self.max_x + margin, p.z),
            Face::MinZ => Vec2::new(p.x, self.min_z - margin),
            Face::MaxZ => Vec2::new(p.x, self.max_z + margin),
        }
    }

    /// Slab test for the segment `origin + dir * t`, `t ∈ [0, max_len]`.
    ///
    /// Returns the entry parameter (clamped to 0 when the origin is already inside).
    /// Zero direction components are replaced by [`RAY_DIR_EPSILON`].
    pub fn ray_entry(&self, origin: Vec2, dir: Vec2, max_len: f32) -> Option<f32> {
        let dx = if dir.x != 0.0 { dir.x } else { RAY_DIR_EPSILON };
        let dz = if dir.z != 0.0 { dir.z } else { RAY_DIR_EPSILON };

        let mut tx0 = (self.min_x - origin.x) / dx;
        let mut tx1 = (self.max_x - origin.x) / dx;
        if tx0 > tx1 {
            core::mem::swap(&mut tx0, &mut tx1);
        }

        let mut tz0 = (self.min_z - origin.z) / dz;
        let mut tz1 = (self.max_z - origin.z) / dz;
        if tz0 > tz1 {
            core::mem::swap(&mut tz0, &mut tz1);
        }

        let t_min = tx0.max(tz0);
        let t_max = tx1.min(tz1);

        if t_min <= t_max && t_max >= 0.0 && t_min <= max_len {
            Some(t_min.max(0.0))
        } else {
            None
        }
    }
}

/// A static forbidden zone: an axis-aligned rectangle given by centre and size.
///
/// `length` spans X and `width` spans Z. Orientation is not modelled; a belt rendered rotated by
/// 90° still collides as if it were unrotated.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Obstacle {
    pub center_x: f32,
    pub center_z: f32,
    pub length: f32,
    pub width: f32,
}

impl Obstacle {
    pub const fn new(center_x: f32, center_z: f32, length: f32, width: f32) -> Self {
        Self {
            center_x,
            center_z,
            length,
            width,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x, self.center_z)
    }

    pub fn half_length(&self) -> f32 {
        self.length * 0.5
    }

    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    /// Finite centre and non-negative finite size.
    pub fn is_valid(&self) -> bool {
        self.center_x.is_finite()
            && self.center_z.is_finite()
            && self.length.is_finite()
            && self.width.is_finite()
            && self.length >= 0.0
            && self.width >= 0.0
    }

    pub fn footprint(&self) -> Rect {
        Rect::from_center(self.center(), self.half_length(), self.half_width())
    }

    /// Footprint grown by an agent radius.
    pub fn expanded(&self, radius: f32) -> Rect {
        self.footprint().expand(radius)
    }

    /// Coarse circular extent used for clearance estimates: `max(length, width) / 2`.
    pub fn coarse_extent(&self) -> f32 {
        self.half_length().max(self.half_width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_normal_picks_nearest_side() {
        let rect = Rect::new(0.0, 10.0, 0.0, 2.0);
        assert_eq!(rect.face_normal(Vec2::new(5.0, 0.2)), Face::MinZ.normal());
        assert_eq!(rect.face_normal(Vec2::new(9.8, 1.0)), Face::MaxX.normal());
    }

    #[test]
    fn face_normal_blends_near_corner() {
        let rect = Rect::new(0.0, 10.0, 0.0, 10.0);
        let n = rect.face_normal(Vec2::new(0.1, 0.1));
        assert!(n.x < 0.0 && n.z < 0.0);
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn ray_entry_handles_axis_aligned_rays() {
        let rect = Rect::new(1.0, 2.0, -0.5, 0.5);
        let hit = rect.ray_entry(Vec2::ZERO, Vec2::X, 5.0);
        assert!((hit.expect("hit") - 1.0).abs() < 1e-5);
        assert!(rect.ray_entry(Vec2::ZERO, Vec2::X, 0.5).is_none());
        assert!(rect.ray_entry(Vec2::ZERO, -Vec2::X, 5.0).is_none());
    }

    #[test]
    fn inset_collapses_narrow_axis() {
        let rect = Rect::new(0.0, 0.2, 0.0, 4.0).inset(0.25);
        assert_eq!(rect.min_x, rect.max_x);
        assert_eq!(rect.min_z, 0.25);
    }
}
