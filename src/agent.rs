use ndarray::{arr1, Array1};

use crate::math::{norm, normalize};

/// Struct for representing a single agent of the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub position: Array1<f64>,
    pub target: Array1<f64>,
    pub velocity: Array1<f64>,
    /// Velocity this agent would pick if it were alone; recomputed every tick.
    pub preferred: Array1<f64>,
    pub vmax: f64,
    pub radius: f64,
}

impl Agent {
    pub fn new(position: Array1<f64>, target: Array1<f64>, vmax: f64, radius: f64) -> Self {
        Agent {
            position,
            target,
            velocity: arr1(&[0.0, 0.0]),
            preferred: arr1(&[0.0, 0.0]),
            vmax,
            radius,
        }
    }

    /// Velocity pointing at the target, capped at `vmax`.
    ///
    /// Inside the cap the full offset is returned, so the agent decelerates
    /// and arrives at the target exactly within one tick.
    pub fn preferred_velocity(&self) -> Array1<f64> {
        let offset = &self.target - &self.position;
        if norm(&offset) <= self.vmax {
            offset
        } else {
            normalize(&offset) * self.vmax
        }
    }
}
