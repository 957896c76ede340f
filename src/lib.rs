mod candidate;
mod math;
pub mod agent;
pub mod cone;
pub mod observer;
pub mod simulation;

use ndarray::Array1;

pub use agent::Agent;
pub use cone::Cone;
pub use ndarray;
pub use observer::{DebugSink, NoopSink};
pub use simulation::{ExhaustedPolicy, SimConfig, Simulation};

/// Find the feasible velocity closest to `preferred` for a single agent.
///
/// `cones` is the agent's velocity-space obstacle set for this tick and
/// `epsilon` the boundary tolerance of the feasibility tests. The return
/// value is `None` when every candidate is blocked; [`Simulation`] maps that
/// onto its configured [`ExhaustedPolicy`].
pub fn resolve(
    preferred: &Array1<f64>,
    vmax: f64,
    cones: &[Cone],
    epsilon: f64,
) -> Option<Array1<f64>> {
    candidate::solve_velocity(0, preferred, vmax, cones, epsilon, &mut NoopSink)
}
