//! Collision detection and response for vector-sprite bodies
//!
//! Broad phase is an axis-aligned box test, narrow phase walks every edge pair
//! of two world-space outlines. Rocks additionally bounce off each other as
//! circles with an unequal-mass impulse.

use glam::Vec2;

use super::body::Body;
use crate::consts::MIN_CONTACT_DISTANCE;

/// Broad phase: do the freshly computed bounding boxes overlap?
#[inline]
pub fn bounds_overlap(a: &Body, b: &Body) -> bool {
    a.bounds().overlaps(&b.bounds())
}

/// Intersection point of segments `p1-p2` and `p3-p4`, endpoints included.
/// Parallel and collinear segments never intersect.
pub fn segment_intersection(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Option<Vec2> {
    let r = p2 - p1;
    let s = p4 - p3;
    let denom = r.perp_dot(s);
    if denom.abs() < f32::EPSILON {
        return None;
    }

    let offset = p3 - p1;
    let t = offset.perp_dot(s) / denom;
    let u = offset.perp_dot(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(p1 + r * t)
    } else {
        None
    }
}

/// Narrow phase: first crossing between any edge of `a` and any edge of `b`.
///
/// Both outlines are closed (last point joins the first). Edges of `a` form
/// the outer loop, so the result is stable for a given pair of outlines.
pub fn polygon_edges_intersect(a: &[Vec2], b: &[Vec2]) -> Option<Vec2> {
    for (a1, a2) in closed_edges(a) {
        for (b1, b2) in closed_edges(b) {
            if let Some(point) = segment_intersection(a1, a2, b1, b2) {
                return Some(point);
            }
        }
    }
    None
}

/// Edges of a closed outline, starting with last-to-first
fn closed_edges(points: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    let n = points.len();
    (0..n).map(move |i| (points[(i + n - 1) % n], points[i]))
}

/// A body treated as a circle for contact response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleBody {
    pub position: Vec2,
    pub heading: Vec2,
    pub radius: f32,
    pub mass: f32,
}

/// What happened to a circle pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Not touching
    Apart,
    /// Centres too close for a usable normal; left alone this tick
    Degenerate,
    /// Pushed apart, already moving away from each other
    Separated,
    /// Pushed apart and bounced
    Impact,
}

/// Separate two overlapping circles and, if they approach, exchange an
/// unequal-mass impulse along the contact normal.
///
/// The impulse is `j = (1 + e) * v_n / (m1 + m2)`; `a` gains `j * m2 * n` and
/// `b` loses `j * m1 * n`, so equal masses meeting head-on leave with their
/// velocities reversed and scaled by `e`.
pub fn resolve_circle_pair(a: &mut CircleBody, b: &mut CircleBody, restitution: f32) -> Contact {
    let delta = b.position - a.position;
    let distance = delta.length();
    let min_distance = a.radius + b.radius;

    if distance >= min_distance {
        return Contact::Apart;
    }
    if distance <= MIN_CONTACT_DISTANCE {
        return Contact::Degenerate;
    }

    let normal = delta / distance;
    let half_overlap = (min_distance - distance) * 0.5;
    a.position -= normal * half_overlap;
    b.position += normal * half_overlap;

    let closing = (b.heading - a.heading).dot(normal);
    if closing >= 0.0 {
        return Contact::Separated;
    }

    let impulse = (1.0 + restitution) * closing / (a.mass + b.mass);
    a.heading += normal * (impulse * b.mass);
    b.heading -= normal * (impulse * a.mass);
    Contact::Impact
}
