use log::warn;
use ndarray::{arr1, Array1};

use crate::agent::Agent;
use crate::candidate::solve_velocity;
use crate::cone::Cone;
use crate::math::{norm, normalize};
use crate::observer::{DebugSink, NoopSink};

/// What an agent does on a tick where the search finds no feasible velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustedPolicy {
    /// Stop for this tick.
    Freeze,
    /// Keep the previous tick's velocity.
    KeepVelocity,
}

/// Tunables of the solver, passed through the whole pipeline instead of
/// living in process-wide state.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Safety margin in world units, added twice to the combined radius of
    /// every agent pair when building cones.
    pub safety_margin: f64,
    /// Tolerance of the cone boundary feasibility tests.
    pub boundary_epsilon: f64,
    /// Skip pairs further apart than their combined radii plus this distance.
    /// `None` considers every pair; when set, it must stay generous enough to
    /// cover one tick of combined travel, or real threats get dropped.
    pub cull_distance: Option<f64>,
    pub exhausted_policy: ExhaustedPolicy,
    /// Cap on velocity change per second. Off by default; enable explicitly
    /// to smooth out hard swerves.
    pub accel_limit: Option<f64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            safety_margin: 0.1,
            boundary_epsilon: 1.0 / 1024.0,
            cull_distance: None,
            exhausted_policy: ExhaustedPolicy::Freeze,
            accel_limit: None,
        }
    }
}

/// Two-slot double buffer owning all agent state. The front slot is the last
/// published tick and is read-only during a solve; the back slot is the write
/// target. The slots trade roles after every tick.
#[derive(Debug, Clone)]
struct AgentStore {
    slots: [Vec<Agent>; 2],
    front: usize,
}

impl AgentStore {
    fn new(agents: Vec<Agent>) -> Self {
        let back = agents.clone();
        AgentStore {
            slots: [agents, back],
            front: 0,
        }
    }

    fn read(&self) -> &[Agent] {
        &self.slots[self.front]
    }

    /// Previous tick read-only, current tick writable.
    fn split(&mut self) -> (&[Agent], &mut [Agent]) {
        let (head, tail) = self.slots.split_at_mut(1);
        if self.front == 0 {
            (&head[0], &mut tail[0])
        } else {
            (&tail[0], &mut head[0])
        }
    }

    fn swap(&mut self) {
        self.front = 1 - self.front;
    }
}

/// The per-tick pipeline: preferred velocities, obstacle cones, candidate
/// search and integration, all against the previous tick's snapshot.
#[derive(Debug)]
pub struct Simulation {
    store: AgentStore,
    config: SimConfig,
    // cone scratch space, reused across agents and ticks
    scratch: Vec<Cone>,
    exhausted: u64,
}

impl Simulation {
    pub fn new(agents: Vec<Agent>, config: SimConfig) -> Self {
        Simulation {
            store: AgentStore::new(agents),
            config,
            scratch: Vec::new(),
            exhausted: 0,
        }
    }

    /// The last published tick.
    pub fn agents(&self) -> &[Agent] {
        self.store.read()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// How many per-agent solves have run out of candidates so far. A rising
    /// count is the sign of an over-constrained scene.
    pub fn exhausted_searches(&self) -> u64 {
        self.exhausted
    }

    /// Advance the simulation by one tick of `dt` seconds.
    ///
    /// A `dt` of zero recomputes every velocity without moving anyone.
    pub fn step(&mut self, dt: f64) {
        self.step_with_observer(dt, &mut NoopSink);
    }

    /// Like [`step`](Self::step), but reports cones, accepted candidates and
    /// chosen velocities to the given sink.
    pub fn step_with_observer(&mut self, dt: f64, sink: &mut dyn DebugSink) {
        let Simulation {
            store,
            config,
            scratch,
            exhausted,
        } = self;
        let (previous, current) = store.split();

        for (index, agent) in previous.iter().enumerate() {
            let preferred = agent.preferred_velocity();

            scratch.clear();
            for (other_index, other) in previous.iter().enumerate() {
                if other_index == index {
                    continue;
                }
                let cone = Cone::between(agent, other, config.safety_margin, config.cull_distance);
                if let Some(cone) = cone {
                    sink.cone(index, &cone);
                    scratch.push(cone);
                }
            }

            let velocity = match solve_velocity(
                index,
                &preferred,
                agent.vmax,
                scratch.as_slice(),
                config.boundary_epsilon,
                &mut *sink,
            ) {
                Some(velocity) => velocity,
                None => {
                    *exhausted += 1;
                    warn!(
                        "agent {} has no feasible velocity, applying {:?}",
                        index, config.exhausted_policy
                    );
                    fallback_velocity(config.exhausted_policy, agent)
                }
            };

            sink.chosen(index, &agent.position, &velocity);
            current[index] = integrate(agent, velocity, preferred, dt, config.accel_limit);
        }

        store.swap();
    }
}

/// Velocity used when the search exhausts every candidate.
fn fallback_velocity(policy: ExhaustedPolicy, previous: &Agent) -> Array1<f64> {
    match policy {
        ExhaustedPolicy::Freeze => arr1(&[0.0, 0.0]),
        ExhaustedPolicy::KeepVelocity => previous.velocity.clone(),
    }
}

/// Advance one agent by one tick. With `accel_limit` set, the velocity change
/// is capped at `limit * dt` before integrating.
fn integrate(
    previous: &Agent,
    mut velocity: Array1<f64>,
    preferred: Array1<f64>,
    dt: f64,
    accel_limit: Option<f64>,
) -> Agent {
    if let Some(limit) = accel_limit {
        let delta = &velocity - &previous.velocity;
        let allowed = limit * dt;
        if norm(&delta) > allowed {
            velocity = &previous.velocity + &(normalize(&delta) * allowed);
        }
    }
    Agent {
        position: &previous.position + &(&velocity * dt),
        target: previous.target.clone(),
        preferred,
        vmax: previous.vmax,
        radius: previous.radius,
        velocity,
    }
}
