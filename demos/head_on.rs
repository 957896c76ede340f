use clearpath_rs::{ndarray::arr1, Agent, SimConfig, Simulation};

fn main() {
    env_logger::init();

    let agents = vec![
        Agent::new(arr1(&[0.0, 1.0]), arr1(&[0.0, -1.0]), 0.2, 0.11),
        Agent::new(arr1(&[0.0, -1.0]), arr1(&[0.0, 1.0]), 0.2, 0.11),
    ];
    let mut simulation = Simulation::new(agents, SimConfig::default());

    for tick in 0..600 {
        simulation.step(1.0 / 60.0);
        if tick % 60 == 0 {
            for (i, agent) in simulation.agents().iter().enumerate() {
                println!(
                    "tick {:3} agent {}: position {:.4} velocity {:.4}",
                    tick, i, agent.position, agent.velocity
                );
            }
        }
    }
    println!(
        "exhausted searches: {}",
        simulation.exhausted_searches()
    );
}
