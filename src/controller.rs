use std::str::FromStr;

use log::debug;

use crate::error::{Error, Result};
use crate::simulation::GridSimulation;

/// One discrete user action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    Step,
    Clear,
    Randomize,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pause" | "toggle-pause" => Ok(Command::TogglePause),
            "step" => Ok(Command::Step),
            "clear" => Ok(Command::Clear),
            "randomize" | "random" => Ok(Command::Randomize),
            other => Err(Error::UnknownCommand(other.to_string())),
        }
    }
}

/// Routes commands onto a single owned simulation. The pause flag lives
/// on the simulation itself.
pub struct SimulationController {
    sim: GridSimulation,
}

impl SimulationController {
    pub fn new(sim: GridSimulation) -> Self {
        Self { sim }
    }

    pub fn toggle_pause(&mut self) {
        let paused = !self.sim.is_paused();
        self.sim.set_paused(paused);
        debug!("{}", if paused { "paused" } else { "running" });
    }

    /// Advance exactly one generation, only while paused.
    pub fn step_once(&mut self) -> bool {
        if !self.sim.is_paused() {
            return false;
        }
        self.sim.advance_generation();
        true
    }

    pub fn randomize(&mut self) {
        self.sim.randomize();
    }

    pub fn clear(&mut self) {
        self.sim.clear();
    }

    pub fn apply(&mut self, command: Command) {
        debug!("command {command:?} at generation {}", self.sim.generation());
        match command {
            Command::TogglePause => self.toggle_pause(),
            Command::Step => {
                self.step_once();
            }
            Command::Clear => self.clear(),
            Command::Randomize => self.randomize(),
        }
    }

    pub fn tick(&mut self, delta_ms: f64) -> bool {
        self.sim.tick(delta_ms)
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.sim.is_paused()
    }

    pub fn simulation(&self) -> &GridSimulation {
        &self.sim
    }

    pub fn into_inner(self) -> GridSimulation {
        self.sim
    }
}

/// Commands to replay at fixed frame numbers, e.g. `"10:pause,12:step"`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Script {
    entries: Vec<(usize, Command)>,
}

impl Script {
    /// Commands due on `frame`, in the order they were written.
    pub fn due(&self, frame: usize) -> impl Iterator<Item = Command> + '_ {
        self.entries
            .iter()
            .filter(move |(f, _)| *f == frame)
            .map(|&(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromStr for Script {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut entries: Vec<(usize, Command)> = Vec::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (frame, command) = entry
                .split_once(':')
                .ok_or_else(|| Error::BadScriptEntry(entry.to_string()))?;
            let frame: usize = frame
                .trim()
                .parse()
                .map_err(|_| Error::BadScriptEntry(entry.to_string()))?;
            entries.push((frame, command.parse::<Command>()?));
        }
        // Stable, so same-frame commands keep their written order.
        entries.sort_by_key(|&(f, _)| f);
        Ok(Self { entries })
    }
}
