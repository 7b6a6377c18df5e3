pub mod config;
pub mod controller;
pub mod decay;
pub mod error;
pub mod grid;
pub mod patterns;
pub mod render;
pub mod simulation;

use std::time::Instant;

use log::info;

pub use config::Params;
pub use controller::{Command, Script, SimulationController};
pub use error::{Error, Result};
pub use simulation::{CellView, GridSimulation};

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Drive `frames` frames at a fixed `frame_ms` delta, replaying `script`
/// before each frame's tick and handing the settled grid to `on_frame`.
pub fn run<F>(
    controller: &mut SimulationController,
    frames: usize,
    frame_ms: f64,
    script: &Script,
    mut on_frame: F,
) -> Result<Vec<Timing>>
where
    F: FnMut(usize, &GridSimulation) -> Result<()>,
{
    let total_start = Instant::now();
    let mut commands_ms = 0.0;
    let mut tick_ms = 0.0;
    let mut sink_ms = 0.0;
    let mut steps = 0usize;

    for frame in 0..frames {
        let t = Instant::now();
        for command in script.due(frame) {
            controller.apply(command);
        }
        commands_ms += t.elapsed().as_secs_f64() * 1000.0;

        let t = Instant::now();
        if controller.tick(frame_ms) {
            steps += 1;
        }
        tick_ms += t.elapsed().as_secs_f64() * 1000.0;

        let t = Instant::now();
        on_frame(frame, controller.simulation())?;
        sink_ms += t.elapsed().as_secs_f64() * 1000.0;
    }

    info!(
        "{} frames, {} timed generations, final generation {}",
        frames,
        steps,
        controller.simulation().generation()
    );

    Ok(vec![
        Timing {
            name: "commands",
            ms: commands_ms,
        },
        Timing {
            name: "tick",
            ms: tick_ms,
        },
        Timing {
            name: "frame_sink",
            ms: sink_ms,
        },
        Timing {
            name: "TOTAL",
            ms: total_start.elapsed().as_secs_f64() * 1000.0,
        },
    ])
}
