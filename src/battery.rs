use serde::{Deserialize, Serialize};

/// Time a battery spends on the charging pad before it is full again.
pub const RECHARGE_DURATION: f64 = 3600.0;

/// Discharge budget granted by an activation without the solar bonus.
pub const BASELINE_RESIDUAL: f64 = 1500.0;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatteryStatus {
    Empty,
    Full,
    InUse,
    Paused,
}

impl std::fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BatteryStatus::Empty => "empty",
            BatteryStatus::Full => "full",
            BatteryStatus::InUse => "in-use",
            BatteryStatus::Paused => "paused",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerSupply {
    Base,
    W45,
    W65,
    W75,
    Wired,
}

impl std::fmt::Display for PowerSupply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PowerSupply::Base => "base",
            PowerSupply::W45 => "w45",
            PowerSupply::W65 => "w65",
            PowerSupply::W75 => "w75",
            PowerSupply::Wired => "wired",
        };
        f.write_str(label)
    }
}

impl PowerSupply {
    pub fn max_residual(self) -> f64 {
        match self {
            PowerSupply::Base => 25.0 * 60.0,
            PowerSupply::W45 => 35.0 * 60.0,
            PowerSupply::W65 => 40.0 * 60.0,
            PowerSupply::W75 => 45.0 * 60.0,
            PowerSupply::Wired => f64::INFINITY,
        }
    }

    /// Mains-powered stations never discharge and never switch off.
    pub fn is_infinite(self) -> bool {
        matches!(self, PowerSupply::Wired)
    }
}

#[derive(Clone, Debug)]
pub struct Battery {
    pub status: BatteryStatus,
    pub residual: f64,
    pub max_residual: f64,
    pub cycles: u32,
    supply: PowerSupply,
}

impl Battery {
    pub fn new(supply: PowerSupply) -> Self {
        Self {
            status: BatteryStatus::Full,
            residual: 0.0,
            max_residual: supply.max_residual(),
            cycles: 0,
            supply,
        }
    }

    pub fn is_infinite(&self) -> bool {
        self.supply.is_infinite()
    }

    /// Full -> InUse. The solar bonus unlocks the supply-specific maximum;
    /// otherwise the discharge budget is the fixed baseline.
    pub fn activate(&mut self, solar_bonus: bool) {
        debug_assert_eq!(self.status, BatteryStatus::Full);
        self.residual = if solar_bonus || self.is_infinite() {
            self.max_residual
        } else {
            BASELINE_RESIDUAL.min(self.max_residual)
        };
        self.status = BatteryStatus::InUse;
    }

    /// Paused -> InUse, keeping the accumulated residual. Used when a
    /// suspended station is requisitioned again.
    pub fn resume(&mut self) {
        debug_assert_eq!(self.status, BatteryStatus::Paused);
        self.status = BatteryStatus::InUse;
    }

    /// Burns `duration` seconds of residual. Reaching exactly zero empties
    /// the battery; stopping short pauses it with the remainder intact.
    pub fn consume(&mut self, duration: f64) -> BatteryStatus {
        debug_assert_eq!(self.status, BatteryStatus::InUse);
        self.residual = (self.residual - duration).max(0.0);
        self.status = if self.residual == 0.0 {
            BatteryStatus::Empty
        } else {
            BatteryStatus::Paused
        };
        self.status
    }

    /// Empty/Paused -> Full, closing one complete recharge cycle.
    pub fn recharge(&mut self) {
        debug_assert_ne!(self.status, BatteryStatus::InUse);
        self.status = BatteryStatus::Full;
        self.residual = 0.0;
        self.cycles += 1;
    }
}
