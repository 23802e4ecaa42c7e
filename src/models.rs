use serde::{Deserialize, Serialize};

use crate::battery::PowerSupply;
use crate::dispatch::PolicyKind;
use crate::station::CapacityMode;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SimConfig {
    pub stations: Vec<StationConfig>,
    /// Base arrival rate in jobs per second, before profile modulation.
    pub arrival_rate: f64,
    /// Simulated horizon in seconds.
    pub sim_time: f64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub assignment: AssignmentConfig,
    #[serde(default)]
    pub relaunch_on_recharge: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StationConfig {
    pub power_supply: PowerSupply,
    /// Mean service time per server, seconds. One entry per server.
    pub service_times: Vec<f64>,
    #[serde(default)]
    pub capacity: CapacityMode,
    #[serde(default)]
    pub dispatch: PolicyKind,
    #[serde(default)]
    pub max_recharge_cycles: Option<u32>,
    /// Desired working time per activation, seconds. Unset means "burn the
    /// whole residual"; a shorter budget leaves the battery paused.
    #[serde(default)]
    pub activation_budget: Option<f64>,
    #[serde(default = "default_working_slots")]
    pub working_slots: Vec<[f64; 2]>,
    #[serde(default)]
    pub solar_panel: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileConfig {
    /// Constant multiplier of 1.0 around the clock.
    #[default]
    Flat,
    /// The built-in day curve with morning and afternoon peaks.
    Daily,
    /// Custom interpolation nodes: hour of day paired with a level in [0, 1].
    Custom {
        hours: Vec<f64>,
        levels: Vec<f64>,
    },
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentConfig {
    /// Uniform pick over all stations; the arrival is lost if the pick is
    /// not admissible.
    #[default]
    Random,
    /// Highest capacity rate among the currently admissible stations.
    HighestCapacity,
}

impl std::fmt::Display for AssignmentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AssignmentConfig::Random => "random",
            AssignmentConfig::HighestCapacity => "highest-capacity",
        };
        f.write_str(label)
    }
}

fn default_working_slots() -> Vec<[f64; 2]> {
    vec![[0.0, f64::INFINITY]]
}
