use serde::Serialize;

use crate::battery::BatteryStatus;
use crate::measure::{Sample, Totals};
use crate::station::Station;

#[derive(Clone, Debug, Serialize)]
pub struct ServerSummary {
    pub mean_service_time: f64,
    pub selections: u64,
    pub busy_time: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct StationSummary {
    pub id: usize,
    pub capacity_rate: f64,
    pub battery_status: BatteryStatus,
    pub recharge_cycles: u32,
    pub servers: Vec<ServerSummary>,
}

impl StationSummary {
    pub fn from_station(station: &Station) -> Self {
        Self {
            id: station.id,
            capacity_rate: station.capacity_rate(),
            battery_status: station.battery.status,
            recharge_cycles: station.battery.cycles,
            servers: station
                .servers()
                .iter()
                .map(|server| ServerSummary {
                    mean_service_time: server.mean_service_time,
                    selections: server.selections,
                    busy_time: server.busy_time,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RunMetadata {
    pub seed: u64,
    pub horizon: f64,
    pub assignment: String,
    pub stations: usize,
}

/// Rates and averages derived from the final totals. `avg_delay` is absent
/// until at least one job departed.
#[derive(Clone, Debug, Serialize)]
pub struct DerivedMetrics {
    pub arrival_rate: f64,
    pub departure_rate: f64,
    pub loss_rate: f64,
    pub avg_users: f64,
    pub avg_delay: Option<f64>,
}

impl DerivedMetrics {
    pub fn from_totals(totals: &Totals, horizon: f64) -> Self {
        let span = if totals.time > 0.0 { totals.time } else { horizon };
        Self {
            arrival_rate: totals.arrivals as f64 / span,
            departure_rate: totals.departures as f64 / span,
            loss_rate: totals.losses as f64 / span,
            avg_users: totals.user_time_integral / span,
            avg_delay: if totals.departures > 0 {
                Some(totals.total_delay / totals.departures as f64)
            } else {
                None
            },
        }
    }
}

#[derive(Serialize)]
pub struct SimulationResult {
    pub totals: Totals,
    pub metrics: DerivedMetrics,
    pub stations: Vec<StationSummary>,
    pub metadata: RunMetadata,
    /// One sample per handled event, in event order. Raw input for external
    /// post-processing; omitted from the JSON report.
    #[serde(skip_serializing)]
    pub history: Vec<Sample>,
}
