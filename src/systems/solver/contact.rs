//! Contact constraints.
//!
//! An `Arbiter` owns the persistent manifold of one body pair. Each step the
//! fresh narrow-phase result is merged in: points whose feature key matches a
//! point from last frame inherit its accumulated impulses. A point whose key
//! changed falls back to the nearest unclaimed old point within
//! `WARM_START_MATCH_DISTANCE`, so a corner that flips between clip features
//! keeps its impulse. Anything else starts from zero.
//!
//! Points with negative penetration are speculative: their bias lets the
//! bodies close the remaining gap this step but no further.

use crate::domain::handle::BodyHandle;
use crate::rigid_body::{Body, Vec2};
use crate::systems::collision::{Manifold, MAX_CONTACT_POINTS};

use super::{inverse_mass, Constraint, StepContext};

/// Arbiters are keyed by the ordered body pair
pub type ArbiterKey = (BodyHandle, BodyHandle);

/// How far a point may move between frames and still count as the same point
pub const WARM_START_MATCH_DISTANCE: f32 = 0.05;

/// Normals must agree this closely for a position match
const MATCH_NORMAL_COS: f32 = 0.99;

#[derive(Clone, Copy, Debug, Default)]
struct PointSolve {
    r1: Vec2,
    r2: Vec2,
    mass_normal: f32,
    mass_tangent: f32,
    bias: f32,
    active: bool,
}

#[derive(Clone, Debug)]
pub struct Arbiter {
    manifold: Manifold,
    /// Mixed material values for the pair
    friction: f32,
    restitution: f32,
    solve: [PointSolve; MAX_CONTACT_POINTS],
    skipped: u32,
}

impl Arbiter {
    pub fn new(manifold: Manifold, a: &Body, b: &Body) -> Self {
        Self {
            manifold,
            friction: (a.material.friction * b.material.friction).sqrt(),
            restitution: a.material.restitution.max(b.material.restitution),
            solve: [PointSolve::default(); MAX_CONTACT_POINTS],
            skipped: 0,
        }
    }

    pub fn key(&self) -> ArbiterKey {
        (self.manifold.body_a, self.manifold.body_b)
    }

    pub fn manifold(&self) -> &Manifold {
        &self.manifold
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Points skipped by the last `pre_step`
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    /// Merge a fresh manifold for the same pair.
    ///
    /// Returns how many points carried impulses over from last frame.
    pub fn update(&mut self, fresh: Manifold, warm_starting: bool) -> usize {
        let old = self.manifold;
        let mut merged = fresh;
        let mut claimed = [false; MAX_CONTACT_POINTS];
        let mut source: [Option<usize>; MAX_CONTACT_POINTS] = [None; MAX_CONTACT_POINTS];

        for (i, p) in merged.points().iter().enumerate() {
            let key = p.feature.key();
            if let Some(j) = old.points().iter().position(|o| o.feature.key() == key) {
                if !claimed[j] {
                    claimed[j] = true;
                    source[i] = Some(j);
                }
            }
        }

        if old.normal.dot(merged.normal) >= MATCH_NORMAL_COS {
            let max_sq = WARM_START_MATCH_DISTANCE * WARM_START_MATCH_DISTANCE;
            for (i, p) in merged.points().iter().enumerate() {
                if source[i].is_some() {
                    continue;
                }
                let mut best: Option<(usize, f32)> = None;
                for (j, o) in old.points().iter().enumerate() {
                    let d = (o.position - p.position).length_squared();
                    if !claimed[j] && d <= max_sq && best.map_or(true, |(_, bd)| d < bd) {
                        best = Some((j, d));
                    }
                }
                if let Some((j, _)) = best {
                    claimed[j] = true;
                    source[i] = Some(j);
                }
            }
        }

        let mut carried = 0;
        for (p, src) in merged.points_mut().iter_mut().zip(source.iter()) {
            match src {
                Some(j) if warm_starting => {
                    let o = old.points()[*j];
                    p.normal_impulse = o.normal_impulse;
                    p.tangent_impulse = o.tangent_impulse;
                    carried += 1;
                }
                _ => {
                    p.normal_impulse = 0.0;
                    p.tangent_impulse = 0.0;
                }
            }
        }

        self.manifold = merged;
        carried
    }

    /// Velocity error left after the solve, summed over active points.
    ///
    /// A point pushing (`Pn > 0`) should hit its target velocity exactly; a
    /// slack point only needs to be separating at least as fast as its bias.
    pub fn residual(&self, a: &Body, b: &Body) -> f32 {
        let n = self.manifold.normal;
        let mut total = 0.0;
        for (p, s) in self.manifold.points().iter().zip(self.solve.iter()) {
            if !s.active {
                continue;
            }
            let vn = (b.velocity_at(s.r2) - a.velocity_at(s.r1)).dot(n);
            total += if p.normal_impulse > 0.0 {
                (vn - s.bias).abs()
            } else {
                (s.bias - vn).max(0.0)
            };
        }
        total
    }
}

impl Constraint for Arbiter {
    fn pre_step(&mut self, ctx: &StepContext, a: &Body, b: &Body) -> bool {
        let n = self.manifold.normal;
        let t = n.cross_scalar(1.0);
        self.skipped = 0;
        self.solve = [PointSolve::default(); MAX_CONTACT_POINTS];

        for (i, p) in self.manifold.points().iter().enumerate() {
            let r1 = p.position - a.position;
            let r2 = p.position - b.position;

            let rn1 = r1.dot(n);
            let rn2 = r2.dot(n);
            let k_normal = a.inv_mass
                + b.inv_mass
                + a.inv_inertia * (r1.length_squared() - rn1 * rn1)
                + b.inv_inertia * (r2.length_squared() - rn2 * rn2);

            let rt1 = r1.dot(t);
            let rt2 = r2.dot(t);
            let k_tangent = a.inv_mass
                + b.inv_mass
                + a.inv_inertia * (r1.length_squared() - rt1 * rt1)
                + b.inv_inertia * (r2.length_squared() - rt2 * rt2);

            let (Some(mass_normal), Some(mass_tangent)) =
                (inverse_mass(k_normal), inverse_mass(k_tangent))
            else {
                self.skipped += 1;
                continue;
            };

            let mut bias = if p.penetration < 0.0 {
                // Speculative: allow closing the gap, nothing more
                p.penetration * ctx.inv_dt
            } else {
                ctx.position_bias((p.penetration - ctx.linear_slop).max(0.0))
            };

            let vn = (b.velocity_at(r2) - a.velocity_at(r1)).dot(n);
            if self.restitution > 0.0 && vn < -ctx.restitution_threshold {
                bias = bias.max(-self.restitution * vn);
            }

            self.solve[i] = PointSolve { r1, r2, mass_normal, mass_tangent, bias, active: true };
        }

        (self.skipped as usize) < self.manifold.len()
    }

    fn warm_start(&self, a: &mut Body, b: &mut Body) {
        let n = self.manifold.normal;
        let t = n.cross_scalar(1.0);
        for (p, s) in self.manifold.points().iter().zip(self.solve.iter()) {
            if !s.active {
                continue;
            }
            let impulse = n * p.normal_impulse + t * p.tangent_impulse;
            a.apply_impulse(-impulse, s.r1);
            b.apply_impulse(impulse, s.r2);
        }
    }

    fn apply_impulse(&mut self, ctx: &StepContext, a: &mut Body, b: &mut Body) {
        let n = self.manifold.normal;
        let t = n.cross_scalar(1.0);
        let friction = self.friction;
        let points = self.manifold.points_mut();

        for (p, s) in points.iter_mut().zip(self.solve.iter()) {
            if !s.active {
                continue;
            }

            // Normal
            let vn = (b.velocity_at(s.r2) - a.velocity_at(s.r1)).dot(n);
            let mut dpn = s.mass_normal * (-vn + s.bias);
            if ctx.accumulate_impulses {
                let old = p.normal_impulse;
                p.normal_impulse = (old + dpn).max(0.0);
                dpn = p.normal_impulse - old;
            } else {
                dpn = dpn.max(0.0);
                p.normal_impulse += dpn;
            }
            let pn = n * dpn;
            a.apply_impulse(-pn, s.r1);
            b.apply_impulse(pn, s.r2);

            // Friction, bounded by the current normal impulse
            let vt = (b.velocity_at(s.r2) - a.velocity_at(s.r1)).dot(t);
            let mut dpt = s.mass_tangent * -vt;
            let max_pt = friction * p.normal_impulse;
            if ctx.accumulate_impulses {
                let old = p.tangent_impulse;
                p.tangent_impulse = (old + dpt).clamp(-max_pt, max_pt);
                dpt = p.tangent_impulse - old;
            } else {
                dpt = dpt.clamp(-max_pt, max_pt);
                p.tangent_impulse += dpt;
            }
            let pt = t * dpt;
            a.apply_impulse(-pt, s.r1);
            b.apply_impulse(pt, s.r2);
        }
    }

    fn reset_impulse(&mut self) {
        for p in self.manifold.points_mut() {
            p.normal_impulse = 0.0;
            p.tangent_impulse = 0.0;
        }
    }
}
