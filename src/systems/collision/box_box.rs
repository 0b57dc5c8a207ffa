//! Box vs box: separating-axis test plus reference-face clipping.
//!
//! The four face normals are tested; the reference face is the one with the
//! least penetration. Body A's faces win unless a face of B is clearly better
//! (relative/absolute tolerance), which keeps the choice stable frame to
//! frame and makes exact ties resolve to A. The incident edge of the other
//! box is clipped against the reference face's side planes, leaving up to
//! two points. Points up to `margin` outside the reference face are kept
//! with a negative penetration.

use crate::domain::handle::BodyHandle;
use crate::rigid_body::{Body, Vec2};

use super::manifold::{ContactPoint, FeatureId, Manifold};

const RELATIVE_TOL: f32 = 0.95;
const ABSOLUTE_TOL: f32 = 0.01;

const NO_EDGE: u8 = 0;
const EDGE1: u8 = 1;
const EDGE2: u8 = 2;
const EDGE3: u8 = 3;
const EDGE4: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    FaceAX,
    FaceAY,
    FaceBX,
    FaceBY,
}

#[derive(Clone, Copy, Debug, Default)]
struct ClipVertex {
    v: Vec2,
    fp: FeatureId,
}

#[inline]
fn sign(x: f32) -> f32 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Keep the part of the segment on the negative side of `dot(normal, x) = offset`.
fn clip_segment_to_line(
    v_in: &[ClipVertex; 2],
    normal: Vec2,
    offset: f32,
    clip_edge: u8,
) -> ([ClipVertex; 2], usize) {
    let mut v_out = [ClipVertex::default(); 2];
    let mut num_out = 0;

    let distance0 = normal.dot(v_in[0].v) - offset;
    let distance1 = normal.dot(v_in[1].v) - offset;

    if distance0 <= 0.0 {
        v_out[num_out] = v_in[0];
        num_out += 1;
    }
    if distance1 <= 0.0 {
        v_out[num_out] = v_in[1];
        num_out += 1;
    }

    if distance0 * distance1 < 0.0 && num_out < 2 {
        let interp = distance0 / (distance0 - distance1);
        let mut cv = ClipVertex {
            v: v_in[0].v + (v_in[1].v - v_in[0].v) * interp,
            fp: FeatureId::default(),
        };
        if distance0 > 0.0 {
            cv.fp = v_in[0].fp;
            cv.fp.in_edge1 = clip_edge;
            cv.fp.in_edge2 = NO_EDGE;
        } else {
            cv.fp = v_in[1].fp;
            cv.fp.out_edge1 = clip_edge;
            cv.fp.out_edge2 = NO_EDGE;
        }
        v_out[num_out] = cv;
        num_out += 1;
    }

    (v_out, num_out)
}

/// Edge of the incident box most anti-parallel to `normal`, in world space.
fn compute_incident_edge(h: Vec2, body: &Body, normal: Vec2) -> [ClipVertex; 2] {
    let mut c = [ClipVertex::default(); 2];

    // Normal in the incident box's frame, flipped to point into it
    let n = -body.rotation.inv_rotate(normal);
    let n_abs = n.abs();

    if n_abs.x > n_abs.y {
        if sign(n.x) > 0.0 {
            c[0].v = Vec2::new(h.x, -h.y);
            c[0].fp.in_edge2 = EDGE3;
            c[0].fp.out_edge2 = EDGE4;

            c[1].v = Vec2::new(h.x, h.y);
            c[1].fp.in_edge2 = EDGE4;
            c[1].fp.out_edge2 = EDGE1;
        } else {
            c[0].v = Vec2::new(-h.x, h.y);
            c[0].fp.in_edge2 = EDGE1;
            c[0].fp.out_edge2 = EDGE2;

            c[1].v = Vec2::new(-h.x, -h.y);
            c[1].fp.in_edge2 = EDGE2;
            c[1].fp.out_edge2 = EDGE3;
        }
    } else if sign(n.y) > 0.0 {
        c[0].v = Vec2::new(h.x, h.y);
        c[0].fp.in_edge2 = EDGE4;
        c[0].fp.out_edge2 = EDGE1;

        c[1].v = Vec2::new(-h.x, h.y);
        c[1].fp.in_edge2 = EDGE1;
        c[1].fp.out_edge2 = EDGE2;
    } else {
        c[0].v = Vec2::new(-h.x, -h.y);
        c[0].fp.in_edge2 = EDGE2;
        c[0].fp.out_edge2 = EDGE3;

        c[1].v = Vec2::new(h.x, -h.y);
        c[1].fp.in_edge2 = EDGE3;
        c[1].fp.out_edge2 = EDGE4;
    }

    c[0].v = body.world_point(c[0].v);
    c[1].v = body.world_point(c[1].v);
    c
}

pub(super) fn collide_boxes(
    handle_a: BodyHandle,
    a: &Body,
    h_a: Vec2,
    handle_b: BodyHandle,
    b: &Body,
    h_b: Vec2,
    margin: f32,
) -> Option<Manifold> {
    let pos_a = a.position;
    let pos_b = b.position;
    let rot_a = a.rotation.to_mat22();
    let rot_b = b.rotation.to_mat22();
    let rot_at = rot_a.transpose();
    let rot_bt = rot_b.transpose();

    let dp = pos_b - pos_a;
    let d_a = rot_at.mul_vec(dp);
    let d_b = rot_bt.mul_vec(dp);

    let c = rot_at.mul_mat(&rot_b);
    let abs_c = c.abs();
    let abs_ct = abs_c.transpose();

    // Box A faces
    let face_a = d_a.abs() - h_a - abs_c.mul_vec(h_b);
    if face_a.x > margin || face_a.y > margin {
        return None;
    }

    // Box B faces
    let face_b = d_b.abs() - abs_ct.mul_vec(h_a) - h_b;
    if face_b.x > margin || face_b.y > margin {
        return None;
    }

    // Least penetrating axis, biased toward A
    let mut axis = Axis::FaceAX;
    let mut separation = face_a.x;
    let mut normal = if d_a.x > 0.0 { rot_a.col1 } else { -rot_a.col1 };

    if face_a.y > RELATIVE_TOL * separation + ABSOLUTE_TOL * h_a.y {
        axis = Axis::FaceAY;
        separation = face_a.y;
        normal = if d_a.y > 0.0 { rot_a.col2 } else { -rot_a.col2 };
    }

    if face_b.x > RELATIVE_TOL * separation + ABSOLUTE_TOL * h_b.x {
        axis = Axis::FaceBX;
        separation = face_b.x;
        normal = if d_b.x > 0.0 { rot_b.col1 } else { -rot_b.col1 };
    }

    if face_b.y > RELATIVE_TOL * separation + ABSOLUTE_TOL * h_b.y {
        axis = Axis::FaceBY;
        normal = if d_b.y > 0.0 { rot_b.col2 } else { -rot_b.col2 };
    }

    // Clipping planes of the reference face
    let (front_normal, front, side_normal, neg_side, pos_side, neg_edge, pos_edge, incident) =
        match axis {
            Axis::FaceAX => {
                let front_normal = normal;
                let side_normal = rot_a.col2;
                let side = pos_a.dot(side_normal);
                (
                    front_normal,
                    pos_a.dot(front_normal) + h_a.x,
                    side_normal,
                    -side + h_a.y,
                    side + h_a.y,
                    EDGE3,
                    EDGE1,
                    compute_incident_edge(h_b, b, front_normal),
                )
            }
            Axis::FaceAY => {
                let front_normal = normal;
                let side_normal = rot_a.col1;
                let side = pos_a.dot(side_normal);
                (
                    front_normal,
                    pos_a.dot(front_normal) + h_a.y,
                    side_normal,
                    -side + h_a.x,
                    side + h_a.x,
                    EDGE2,
                    EDGE4,
                    compute_incident_edge(h_b, b, front_normal),
                )
            }
            Axis::FaceBX => {
                let front_normal = -normal;
                let side_normal = rot_b.col2;
                let side = pos_b.dot(side_normal);
                (
                    front_normal,
                    pos_b.dot(front_normal) + h_b.x,
                    side_normal,
                    -side + h_b.y,
                    side + h_b.y,
                    EDGE3,
                    EDGE1,
                    compute_incident_edge(h_a, a, front_normal),
                )
            }
            Axis::FaceBY => {
                let front_normal = -normal;
                let side_normal = rot_b.col1;
                let side = pos_b.dot(side_normal);
                (
                    front_normal,
                    pos_b.dot(front_normal) + h_b.y,
                    side_normal,
                    -side + h_b.x,
                    side + h_b.x,
                    EDGE2,
                    EDGE4,
                    compute_incident_edge(h_a, a, front_normal),
                )
            }
        };

    let (clip1, np) = clip_segment_to_line(&incident, -side_normal, neg_side, neg_edge);
    if np < 2 {
        return None;
    }
    let (clip2, np) = clip_segment_to_line(&clip1, side_normal, pos_side, pos_edge);
    if np < 2 {
        return None;
    }

    let mut manifold = Manifold::new(handle_a, handle_b, normal);
    for cv in clip2.iter() {
        let sep = front_normal.dot(cv.v) - front;
        if sep <= margin {
            let mut feature = cv.fp;
            if matches!(axis, Axis::FaceBX | Axis::FaceBY) {
                feature.flip();
            }
            manifold.push(ContactPoint {
                // Slide onto the reference face
                position: cv.v - front_normal * sep,
                penetration: -sep,
                feature,
                normal_impulse: 0.0,
                tangent_impulse: 0.0,
            });
        }
    }

    if manifold.is_empty() {
        None
    } else {
        Some(manifold)
    }
}
