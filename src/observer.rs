use ndarray::Array1;

use crate::cone::Cone;

/// Observer for the per-agent solve, meant for debug drawing.
///
/// Every hook is a no-op by default; the sink only watches and must not feed
/// anything back into the solver.
pub trait DebugSink {
    /// A cone was built for the agent with the given index.
    fn cone(&mut self, agent: usize, cone: &Cone) {
        let _ = (agent, cone);
    }

    /// A proposed velocity passed the acceptance rule and became the current
    /// best candidate.
    fn candidate(&mut self, agent: usize, velocity: &Array1<f64>) {
        let _ = (agent, velocity);
    }

    /// The final velocity picked for the agent this tick, anchored at its
    /// previous-tick position.
    fn chosen(&mut self, agent: usize, position: &Array1<f64>, velocity: &Array1<f64>) {
        let _ = (agent, position, velocity);
    }
}

/// Default sink used when no observer is registered.
pub struct NoopSink;

impl DebugSink for NoopSink {}
