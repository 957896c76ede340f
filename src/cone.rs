use log::debug;
use ndarray::{arr1, Array1};

use crate::agent::Agent;
use crate::math::{cross, norm};

/// Velocity-space obstacle for one ordered pair of agents.
///
/// Relative to `apex`, every velocity between the two boundary rays is
/// predicted to drive `we` into the other agent. The apex sits at the average
/// of both current velocities, so each agent carries half of the avoidance
/// burden (the reciprocal assumption).
#[derive(Debug, Clone, PartialEq)]
pub struct Cone {
    pub apex: Array1<f64>,
    /// Unit direction of the boundary at bearing - opening.
    pub left: Array1<f64>,
    /// Unit direction of the boundary at bearing + opening.
    pub right: Array1<f64>,
}

impl Cone {
    /// Build the obstacle cone `other` casts into the velocity space of `we`.
    ///
    /// Returns `None` when the pair is no threat: coincident positions (no
    /// bearing can be defined) or, with `cull` set, pairs further apart than
    /// the combined radii plus the culling distance.
    ///
    /// Overlapping agents would push the sine of the opening angle past 1;
    /// the ratio is clamped instead, which widens the cone into the
    /// half-plane facing the other agent and steers straight apart.
    pub fn between(we: &Agent, other: &Agent, margin: f64, cull: Option<f64>) -> Option<Cone> {
        let offset = &other.position - &we.position;
        let distance = norm(&offset);
        if distance == 0.0 {
            debug!("skipping cone for coincident agents");
            return None;
        }

        let combined = we.radius + other.radius + 2.0 * margin;
        if let Some(cull) = cull {
            if distance > we.radius + other.radius + cull {
                return None;
            }
        }

        // rotate the normalized offset by the opening angle on either side,
        // sharing one sin/cos pair; mirrored agent pairs then build exactly
        // negated boundaries, and exact candidate ties stay ties instead of
        // flipping on one-ulp noise
        let direction = &offset / distance;
        let sin = (combined / distance).clamp(-1.0, 1.0);
        let cos = (1.0 - sin * sin).sqrt();
        let (dx, dy) = (direction[0], direction[1]);

        Some(Cone {
            apex: (&we.velocity + &other.velocity) * 0.5,
            left: arr1(&[dx * cos + dy * sin, -dx * sin + dy * cos]),
            right: arr1(&[dx * cos - dy * sin, dx * sin + dy * cos]),
        })
    }

    /// Whether `velocity` lies outside this cone, i.e. on the allowed side of
    /// at least one boundary. `epsilon` keeps velocities sitting exactly on a
    /// boundary from flickering between the two verdicts.
    pub fn permits(&self, velocity: &Array1<f64>, epsilon: f64) -> bool {
        let w = velocity - &self.apex;
        cross(&self.left, &w) <= epsilon || cross(&self.right, &w) >= -epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr1;

    const EPSILON: f64 = 1.0 / 1024.0;

    fn agent_at(x: f64, y: f64, radius: f64) -> Agent {
        Agent::new(arr1(&[x, y]), arr1(&[x, y]), 1.0, radius)
    }

    #[test]
    fn apex_is_average_of_velocities() {
        let mut a = agent_at(0.0, 0.0, 0.1);
        let mut b = agent_at(2.0, 0.0, 0.1);
        a.velocity = arr1(&[1.0, 2.0]);
        b.velocity = arr1(&[3.0, 4.0]);
        let cone = Cone::between(&a, &b, 0.1, None).unwrap();
        assert_eq!(cone.apex, arr1(&[2.0, 3.0]));
    }

    #[test]
    fn boundaries_are_unit_length_with_expected_opening() {
        let a = agent_at(0.0, 0.0, 0.2);
        let b = agent_at(3.0, 0.0, 0.3);
        let margin = 0.1;
        let cone = Cone::between(&a, &b, margin, None).unwrap();

        assert_relative_eq!(norm(&cone.left), 1.0, max_relative = 1e-12);
        assert_relative_eq!(norm(&cone.right), 1.0, max_relative = 1e-12);

        // angle between the boundaries is twice the opening angle
        let opening = ((0.2 + 0.3 + 2.0 * margin) / 3.0).asin();
        assert_relative_eq!(
            cone.left.dot(&cone.right),
            (2.0 * opening).cos(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn mirrored_pairs_build_exactly_negated_boundaries() {
        // a pair reflected through the midpoint must see bit-identical
        // mirror cones, or exact candidate ties break asymmetrically
        let mut a = agent_at(0.3, 1.0, 0.11);
        let mut b = agent_at(-0.3, -1.0, 0.11);
        a.velocity = arr1(&[0.04, -0.19]);
        b.velocity = arr1(&[-0.04, 0.19]);

        let ab = Cone::between(&a, &b, 0.1, None).unwrap();
        let ba = Cone::between(&b, &a, 0.1, None).unwrap();

        assert_eq!(&ab.left * -1.0, ba.left);
        assert_eq!(&ab.right * -1.0, ba.right);
        assert_eq!(&ab.apex * -1.0, ba.apex);
    }

    #[test]
    fn coincident_agents_produce_no_cone() {
        let a = agent_at(1.0, 1.0, 0.1);
        let b = agent_at(1.0, 1.0, 0.1);
        assert!(Cone::between(&a, &b, 0.1, None).is_none());
    }

    #[test]
    fn overlapping_agents_clamp_to_half_plane() {
        // distance (0.1) is well below the combined radius (0.6)
        let a = agent_at(0.0, 0.0, 0.2);
        let b = agent_at(0.1, 0.0, 0.2);
        let cone = Cone::between(&a, &b, 0.1, None).unwrap();

        assert!(cone.left[0].is_finite() && cone.left[1].is_finite());
        assert!(cone.right[0].is_finite() && cone.right[1].is_finite());

        // clamped opening is a quarter turn, so the cone spans the full
        // half-plane towards the other agent
        assert_relative_eq!(cone.left.dot(&cone.right), -1.0, max_relative = 1e-9);

        // moving straight away is permitted, moving straight at it is not
        assert!(cone.permits(&arr1(&[-1.0, 0.0]), EPSILON));
        assert!(!cone.permits(&arr1(&[1.0, 0.1]), EPSILON));
    }

    #[test]
    fn culling_skips_distant_pairs_but_keeps_close_ones() {
        let a = agent_at(0.0, 0.0, 0.1);
        let b = agent_at(5.0, 0.0, 0.1);
        assert!(Cone::between(&a, &b, 0.1, Some(1.0)).is_none());
        assert!(Cone::between(&a, &b, 0.1, Some(10.0)).is_some());
        // no culling keeps every pair
        assert!(Cone::between(&a, &b, 0.1, None).is_some());
    }

    #[test]
    fn permits_velocities_outside_and_rejects_inside() {
        let a = agent_at(0.0, 0.0, 0.1);
        let b = agent_at(2.0, 0.0, 0.1);
        let cone = Cone::between(&a, &b, 0.1, None).unwrap();

        // straight at the other agent, apex at the origin: forbidden
        assert!(!cone.permits(&arr1(&[1.0, 0.0]), EPSILON));
        // straight away: allowed
        assert!(cone.permits(&arr1(&[-1.0, 0.0]), EPSILON));
        // perpendicular, outside the narrow cone: allowed
        assert!(cone.permits(&arr1(&[0.0, 1.0]), EPSILON));
        // the apex itself sits on both boundaries and is tolerated
        assert!(cone.permits(&cone.apex.clone(), EPSILON));
    }
}
