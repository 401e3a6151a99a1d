//! The simulation context and its tick scheduler.
//!
//! A [`Simulation`] owns the trail field, the agent population, the config
//! store with its source, and the shared jitter accumulator. Every tick runs,
//! in order: a config reload when its countdown reaches zero, the tick
//! counter increment, a diffusion pass when its countdown reaches zero, one
//! step of every agent, and a copy of the field into the frame grid exposed
//! through [`Engine::field`].

use crate::agent::{Agent, SpawnArea};
use crate::config::{
    ConfigSource, ConfigStore, FileSource, ReloadReport, SensorConfig, DEFAULT_ANGLE_CHANGE_DEG,
    DEFAULT_SENSOR_REACH,
};
use crate::jitter::Jitter;
use crate::trail::{TrailField, DEFAULT_DECAY};
use physarum_core::{Engine, EngineError, Grid, ParamReader, Xorshift64};
use serde_json::{json, Value};
use tracing::{debug, info};

const DEFAULT_AGENT_COUNT: usize = 400_000;
const DEFAULT_SPAWN_RADIUS: f64 = 200.0;
const DEFAULT_SPAWN_ANGLE_DEVIATION: f64 = 30.0;
const DEFAULT_DIFFUSION_INTERVAL: u32 = 5;
const DEFAULT_RELOAD_INTERVAL: u32 = 100;
const DEFAULT_CONFIG_PATH: &str = "config.txt";

/// Construction-time parameters.
///
/// `sensor_reach` and `angle_change` only seed the [`ConfigStore`]; the
/// config source overrides them from the first tick on.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    pub agent_count: usize,
    pub spawn_radius: f32,
    /// Degrees.
    pub spawn_angle_deviation: f32,
    /// Decay constant subtracted before averaging during diffusion.
    pub decay: u32,
    /// Ticks between diffusion passes (at least 1).
    pub diffusion_interval: u32,
    /// Ticks between config reloads (at least 1).
    pub reload_interval: u32,
    pub sensor_reach: i32,
    /// Degrees.
    pub angle_change: f32,
    /// Step agents on the rayon pool when the `parallel` feature is enabled.
    pub parallel: bool,
    pub config_path: String,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            agent_count: DEFAULT_AGENT_COUNT,
            spawn_radius: DEFAULT_SPAWN_RADIUS as f32,
            spawn_angle_deviation: DEFAULT_SPAWN_ANGLE_DEVIATION as f32,
            decay: DEFAULT_DECAY,
            diffusion_interval: DEFAULT_DIFFUSION_INTERVAL,
            reload_interval: DEFAULT_RELOAD_INTERVAL,
            sensor_reach: DEFAULT_SENSOR_REACH,
            angle_change: DEFAULT_ANGLE_CHANGE_DEG,
            parallel: true,
            config_path: DEFAULT_CONFIG_PATH.to_owned(),
        }
    }
}

impl SimulationParams {
    /// Extracts parameters from a JSON object, falling back to defaults.
    pub fn from_json(params: &Value) -> Self {
        let r = ParamReader::new(params);
        let d = Self::default();
        let u32_param = |name: &str, default: u32| {
            u32::try_from(r.usize(name, default as usize)).unwrap_or(default)
        };
        Self {
            agent_count: r.usize("agent_count", d.agent_count),
            spawn_radius: r.f32("spawn_radius", d.spawn_radius),
            spawn_angle_deviation: r.f32("spawn_angle_deviation", d.spawn_angle_deviation),
            decay: u32_param("decay", d.decay),
            diffusion_interval: u32_param("diffusion_interval", d.diffusion_interval),
            reload_interval: u32_param("reload_interval", d.reload_interval),
            sensor_reach: r.i32("sensor_reach", d.sensor_reach),
            angle_change: r.f32("angle_change", d.angle_change),
            parallel: r.bool("parallel", d.parallel),
            config_path: r.string("config_path", &d.config_path),
        }
    }
}

pub struct Simulation {
    field: TrailField,
    frame: Grid,
    agents: Vec<Agent>,
    config: ConfigStore,
    source: Box<dyn ConfigSource>,
    jitter: Jitter,
    params: SimulationParams,
    tick: u64,
    diffusion_countdown: u32,
    reload_countdown: u32,
    diffusion_passes: u64,
    last_reload: ReloadReport,
}

impl Simulation {
    /// Creates a simulation with `params.agent_count` agents spawned around
    /// the grid center.
    ///
    /// Returns `EngineError::InvalidDimensions` if width or height is zero.
    pub fn new(
        width: usize,
        height: usize,
        seed: u64,
        params: SimulationParams,
        source: Box<dyn ConfigSource>,
    ) -> Result<Self, EngineError> {
        let params = SimulationParams {
            diffusion_interval: params.diffusion_interval.max(1),
            reload_interval: params.reload_interval.max(1),
            ..params
        };
        let field = TrailField::new(width, height, params.decay)?;
        let frame = Grid::new(width, height)?;

        let area = SpawnArea::centered(
            width,
            height,
            params.spawn_radius,
            params.spawn_angle_deviation,
        );
        let mut spawn_rng = Xorshift64::new(seed);
        let agents = (0..params.agent_count)
            .map(|i| Agent::spawn(&area, &mut spawn_rng, Xorshift64::stream(seed, i as u64)))
            .collect();

        info!(
            width,
            height,
            seed,
            agents = params.agent_count,
            "simulation created"
        );

        Ok(Self {
            field,
            frame,
            agents,
            config: ConfigStore::new(params.sensor_reach, params.angle_change),
            source,
            jitter: Jitter::new(),
            diffusion_countdown: params.diffusion_interval,
            reload_countdown: 0,
            params,
            tick: 0,
            diffusion_passes: 0,
            last_reload: ReloadReport::default(),
        })
    }

    /// Creates a simulation from a JSON params object, reading runtime
    /// tunables from the file named by `config_path`.
    pub fn from_json(
        width: usize,
        height: usize,
        seed: u64,
        json_params: &Value,
    ) -> Result<Self, EngineError> {
        let params = SimulationParams::from_json(json_params);
        let source = Box::new(FileSource::new(&params.config_path));
        Self::new(width, height, seed, params, source)
    }

    pub fn trail(&self) -> &TrailField {
        &self.field
    }

    /// Mutable access for seeding the field between ticks.
    pub fn trail_mut(&mut self) -> &mut TrailField {
        &mut self.field
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn settings(&self) -> &SimulationParams {
        &self.params
    }

    /// Outcome of the most recent config reload.
    pub fn last_reload(&self) -> &ReloadReport {
        &self.last_reload
    }

    /// Number of diffusion passes run so far.
    pub fn diffusion_passes(&self) -> u64 {
        self.diffusion_passes
    }

    /// Current value of the shared jitter accumulator.
    pub fn jitter_value(&self) -> u64 {
        self.jitter.value()
    }
}

fn step_sequential(agents: &mut [Agent], field: &TrailField, sensors: SensorConfig, jitter: &Jitter) {
    for agent in agents {
        agent.step(field, sensors, jitter);
    }
}

#[cfg(feature = "parallel")]
fn step_all(
    agents: &mut [Agent],
    field: &TrailField,
    sensors: SensorConfig,
    jitter: &Jitter,
    parallel: bool,
) {
    use rayon::prelude::*;

    if parallel {
        agents.par_iter_mut().for_each(|agent| {
            agent.step(field, sensors, jitter);
        });
    } else {
        step_sequential(agents, field, sensors, jitter);
    }
}

#[cfg(not(feature = "parallel"))]
fn step_all(
    agents: &mut [Agent],
    field: &TrailField,
    sensors: SensorConfig,
    jitter: &Jitter,
    _parallel: bool,
) {
    step_sequential(agents, field, sensors, jitter);
}

impl Engine for Simulation {
    fn step(&mut self) -> Result<(), EngineError> {
        if self.reload_countdown == 0 {
            self.last_reload = self.config.reload(self.source.as_ref());
            self.reload_countdown = self.params.reload_interval;
        }
        self.reload_countdown -= 1;

        self.tick += 1;

        if self.diffusion_countdown == 0 {
            self.field.diffuse();
            self.diffusion_passes += 1;
            self.diffusion_countdown = self.params.diffusion_interval;
            debug!(tick = self.tick, "diffusion pass");
        }
        self.diffusion_countdown -= 1;

        let sensors = self.config.snapshot();
        step_all(
            &mut self.agents,
            &self.field,
            sensors,
            &self.jitter,
            self.params.parallel,
        );

        self.field.copy_into(&mut self.frame)
    }

    fn tick(&self) -> u64 {
        self.tick
    }

    fn field(&self) -> &Grid {
        &self.frame
    }

    fn params(&self) -> Value {
        json!({
            "agent_count": self.agents.len(),
            "spawn_radius": self.params.spawn_radius,
            "spawn_angle_deviation": self.params.spawn_angle_deviation,
            "decay": self.params.decay,
            "diffusion_interval": self.params.diffusion_interval,
            "reload_interval": self.params.reload_interval,
            "sensor_reach": self.config.sensor_reach(),
            "angle_change": self.config.angle_change_deg(),
            "parallel": self.params.parallel,
            "config_path": self.params.config_path,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "agent_count": {
                "type": "integer",
                "default": DEFAULT_AGENT_COUNT,
                "min": 0,
                "description": "Number of agents spawned at startup"
            },
            "spawn_radius": {
                "type": "number",
                "default": DEFAULT_SPAWN_RADIUS,
                "min": 0.0,
                "description": "Agents spawn within this distance of the grid center"
            },
            "spawn_angle_deviation": {
                "type": "number",
                "default": DEFAULT_SPAWN_ANGLE_DEVIATION,
                "min": 0.0,
                "max": 180.0,
                "description": "Maximum deviation in degrees from the heading toward the center"
            },
            "decay": {
                "type": "integer",
                "default": DEFAULT_DECAY,
                "min": 0,
                "description": "Subtracted from the neighbour sum before averaging in each diffusion pass"
            },
            "diffusion_interval": {
                "type": "integer",
                "default": DEFAULT_DIFFUSION_INTERVAL,
                "min": 1,
                "description": "Ticks between diffusion passes"
            },
            "reload_interval": {
                "type": "integer",
                "default": DEFAULT_RELOAD_INTERVAL,
                "min": 1,
                "description": "Ticks between config source reloads"
            },
            "sensor_reach": {
                "type": "integer",
                "default": DEFAULT_SENSOR_REACH,
                "description": "Initial probe distance; overridden by sensorReach in the config source"
            },
            "angle_change": {
                "type": "number",
                "default": DEFAULT_ANGLE_CHANGE_DEG,
                "description": "Initial sensor offset in degrees; overridden by angleChange in the config source"
            },
            "parallel": {
                "type": "boolean",
                "default": true,
                "description": "Step agents in parallel (jitter order becomes nondeterministic)"
            },
            "config_path": {
                "type": "string",
                "default": DEFAULT_CONFIG_PATH,
                "description": "key=value file re-read every reload_interval ticks"
            }
        })
    }
}
