use log::debug;
use ndarray::{arr1, Array1};

use crate::cone::Cone;
use crate::math::{cross, dist_sq, norm_sq};
use crate::observer::DebugSink;

/// Slack on the squared speed cap, so circle intersections from stage 3 that
/// sit exactly on the cap are not lost to rounding.
const SPEED_SLACK: f64 = 1e-9;

/// Boundary rays closer to parallel than this have no usable intersection.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Best feasible velocity found so far during one agent's solve, tracked by
/// squared distance to the preferred velocity.
struct Candidate {
    distance: f64,
    velocity: Array1<f64>,
}

impl Candidate {
    fn new() -> Self {
        Candidate {
            distance: f64::INFINITY,
            velocity: arr1(&[0.0, 0.0]),
        }
    }

    /// Acceptance rule: within the speed cap, outside every cone, and a
    /// strict improvement over the current best. Ties are not re-accepted.
    fn consider(
        &mut self,
        proposed: Array1<f64>,
        preferred: &Array1<f64>,
        vmax: f64,
        cones: &[Cone],
        epsilon: f64,
    ) -> bool {
        if norm_sq(&proposed) > vmax * vmax + SPEED_SLACK {
            return false;
        }
        if !cones.iter().all(|cone| cone.permits(&proposed, epsilon)) {
            return false;
        }
        let distance = dist_sq(&proposed, preferred);
        if distance >= self.distance {
            return false;
        }
        self.distance = distance;
        self.velocity = proposed;
        true
    }
}

/// Find the feasible velocity closest to `preferred`, or `None` when every
/// candidate is blocked and the caller has to fall back.
///
/// Candidates are drawn from four batches: the preferred velocity itself
/// (short-circuits the whole search when feasible), projections of the
/// preferred velocity onto cone boundaries, intersections of the speed circle
/// with cone boundaries, and pairwise cone boundary intersections.
pub fn solve_velocity(
    agent: usize,
    preferred: &Array1<f64>,
    vmax: f64,
    cones: &[Cone],
    epsilon: f64,
    sink: &mut dyn DebugSink,
) -> Option<Array1<f64>> {
    debug!("solve_velocity(agent {}, {} cones)", agent, cones.len());
    let mut best = Candidate::new();

    // stage 1: a free agent never pays for the rest of the search
    if best.consider(preferred.clone(), preferred, vmax, cones, epsilon) {
        sink.candidate(agent, &best.velocity);
        return Some(best.velocity);
    }

    let mut propose = |best: &mut Candidate, velocity: Array1<f64>| {
        if best.consider(velocity, preferred, vmax, cones, epsilon) {
            sink.candidate(agent, &best.velocity);
        }
    };

    // stage 2: project the preferred velocity onto each boundary ray, keeping
    // forward projections whose foot actually faces the forbidden side
    for cone in cones {
        let w = preferred - &cone.apex;

        let t = w.dot(&cone.left);
        if t >= 0.0 && cross(&cone.left, &w) >= 0.0 {
            propose(&mut best, &cone.apex + &(&cone.left * t));
        }

        let t = w.dot(&cone.right);
        if t >= 0.0 && cross(&cone.right, &w) <= 0.0 {
            propose(&mut best, &cone.apex + &(&cone.right * t));
        }
    }

    // stage 3: intersect the speed-cap circle with each boundary ray; with a
    // unit direction the ray parameter solves t^2 + 2bt + c = 0
    for cone in cones {
        for boundary in [&cone.left, &cone.right] {
            let b = cone.apex.dot(boundary);
            let c = norm_sq(&cone.apex) - vmax * vmax;
            let discriminant = b * b - c;
            if discriminant < 0.0 {
                continue;
            }
            let root = discriminant.sqrt();
            for t in [-b + root, -b - root] {
                if t >= 0.0 {
                    propose(&mut best, &cone.apex + &(boundary * t));
                }
            }
        }
    }

    // stage 4: forward intersections between the boundary rays of every
    // ordered pair of distinct cones, via Cramer's rule
    for (i, first) in cones.iter().enumerate() {
        for (j, second) in cones.iter().enumerate() {
            if i == j {
                continue;
            }
            for da in [&first.left, &first.right] {
                for db in [&second.left, &second.right] {
                    let det = cross(da, db);
                    if det.abs() <= PARALLEL_EPSILON {
                        continue;
                    }
                    let delta = &second.apex - &first.apex;
                    let ta = cross(&delta, db) / det;
                    let tb = cross(&delta, da) / det;
                    if ta >= 0.0 && tb >= 0.0 {
                        propose(&mut best, &first.apex + &(da * ta));
                    }
                }
            }
        }
    }

    if best.distance.is_finite() {
        Some(best.velocity)
    } else {
        debug!("solve_velocity(agent {}) exhausted all candidates", agent);
        None
    }
}
