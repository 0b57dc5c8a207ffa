use crate::rigid_body::Vec2;

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self { min: center - half, max: center + half }
    }

    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    #[inline]
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    pub fn fattened(&self, margin: f32) -> Aabb {
        let m = Vec2::new(margin, margin);
        Aabb { min: self.min - m, max: self.max + m }
    }

    /// Perimeter, used as the insertion cost metric in 2D
    pub fn perimeter(&self) -> f32 {
        2.0 * ((self.max.x - self.min.x) + (self.max.y - self.min.y))
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Slab test. Returns the entry fraction in `[0, max_fraction]` or `None`.
    ///
    /// Axes where the ray is exactly parallel are handled by a containment
    /// check instead of dividing by zero.
    pub fn ray_fraction(&self, origin: Vec2, dir: Vec2, max_fraction: f32) -> Option<f32> {
        let mut t_min = 0.0f32;
        let mut t_max = max_fraction;

        for (o, d, lo, hi) in [
            (origin.x, dir.x, self.min.x, self.max.x),
            (origin.y, dir.y, self.min.y, self.max.y),
        ] {
            if d == 0.0 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t1 = (lo - o) * inv;
            let mut t2 = (hi - o) * inv;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_overlap() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = Aabb::new(Vec2::new(1.0, 0.5), Vec2::new(2.0, 2.0));
        assert!(a.overlaps(&b));
        assert!(!a.contains(&b));
        assert!(a.union(&b).contains(&b));
    }

    #[test]
    fn ray_parallel_to_slab() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let hit = a.ray_fraction(Vec2::new(-1.0, 0.5), Vec2::new(1.0, 0.0), 10.0);
        assert_eq!(hit, Some(1.0));
        let miss = a.ray_fraction(Vec2::new(-1.0, 2.0), Vec2::new(1.0, 0.0), 10.0);
        assert_eq!(miss, None);
    }

    #[test]
    fn long_ray_with_tiny_slope_still_hits() {
        // The y component is below f32::EPSILON but the ray climbs 0.5 over its length
        let a = Aabb::new(Vec2::new(5.0e6, -0.2), Vec2::new(6.0e6, 0.2));
        let hit = a.ray_fraction(Vec2::new(0.0, -0.5), Vec2::new(1.0, 1.0e-7), 1.0e7);
        let t = hit.expect("ray crosses the box");
        assert!((t - 5.0e6).abs() < 1.0, "t = {}", t);
    }
}
