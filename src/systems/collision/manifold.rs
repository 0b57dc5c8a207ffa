use crate::domain::handle::BodyHandle;
use crate::rigid_body::Vec2;

pub const MAX_CONTACT_POINTS: usize = 2;

/// Which box edges produced a contact point.
///
/// Edges are numbered 1..=4 per box, 0 meaning "no edge". The pair of
/// incoming/outgoing edges on each body identifies the point across frames
/// even when its position drifts, which is what warm starting keys on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId {
    pub in_edge1: u8,
    pub out_edge1: u8,
    pub in_edge2: u8,
    pub out_edge2: u8,
}

impl FeatureId {
    /// Identity for single-point manifolds (circle contacts)
    pub fn single(region: u8) -> Self {
        Self { in_edge1: region, ..Self::default() }
    }

    /// Swap the roles of the two bodies
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.in_edge1, &mut self.in_edge2);
        std::mem::swap(&mut self.out_edge1, &mut self.out_edge2);
    }

    pub fn key(&self) -> u32 {
        u32::from_le_bytes([self.in_edge1, self.out_edge1, self.in_edge2, self.out_edge2])
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContactPoint {
    /// World-space contact location
    pub position: Vec2,
    /// Overlap along the normal; negative for a gap inside the contact margin
    pub penetration: f32,
    pub feature: FeatureId,
    /// Accumulated impulses, carried across frames for warm starting
    pub normal_impulse: f32,
    pub tangent_impulse: f32,
}

/// Contact set between two bodies. `normal` points from A to B.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Manifold {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub normal: Vec2,
    points: [ContactPoint; MAX_CONTACT_POINTS],
    point_count: usize,
}

impl Manifold {
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, normal: Vec2) -> Self {
        Self {
            body_a,
            body_b,
            normal,
            points: [ContactPoint::default(); MAX_CONTACT_POINTS],
            point_count: 0,
        }
    }

    /// Add a point; extra points beyond the capacity are ignored.
    pub fn push(&mut self, point: ContactPoint) {
        if self.point_count < MAX_CONTACT_POINTS {
            self.points[self.point_count] = point;
            self.point_count += 1;
        }
    }

    pub fn points(&self) -> &[ContactPoint] {
        &self.points[..self.point_count]
    }

    pub fn points_mut(&mut self) -> &mut [ContactPoint] {
        &mut self.points[..self.point_count]
    }

    pub fn len(&self) -> usize {
        self.point_count
    }

    pub fn is_empty(&self) -> bool {
        self.point_count == 0
    }

    pub fn max_penetration(&self) -> f32 {
        self.points().iter().fold(0.0f32, |m, p| m.max(p.penetration))
    }
}
