use crate::models::SimConfig;
use crate::report::SimulationResult;

pub trait Formatter {
    fn write(&self, result: &SimulationResult) -> String;
}

pub struct HumanFormatter;
pub struct SummaryFormatter;
pub struct JsonFormatter;

impl Formatter for SummaryFormatter {
    fn write(&self, result: &SimulationResult) -> String {
        let mut out = String::new();
        out.push_str("Summary:\n");
        out.push_str(&format!("arrivals: {}\n", result.totals.arrivals));
        out.push_str(&format!("departures: {}\n", result.totals.departures));
        out.push_str(&format!("losses: {}\n", result.totals.losses));
        out.push_str(&format!("avg users: {:.3}\n", result.metrics.avg_users));
        match result.metrics.avg_delay {
            Some(delay) => out.push_str(&format!("avg delay: {:.3} s\n", delay)),
            None => out.push_str("avg delay: n/a\n"),
        }
        out
    }
}

impl Formatter for HumanFormatter {
    fn write(&self, result: &SimulationResult) -> String {
        let mut out = String::new();
        out.push_str("Metadata:\n");
        out.push_str(&format!("seed: {}\n", result.metadata.seed));
        out.push_str(&format!("horizon: {} s\n", result.metadata.horizon));
        out.push_str(&format!("assignment: {}\n", result.metadata.assignment));
        out.push_str("Stations:\n");
        for station in &result.stations {
            out.push_str(&format!(
                "- station {} (rate {:.3}/s, battery {}, {} recharge cycles)\n",
                station.id, station.capacity_rate, station.battery_status, station.recharge_cycles
            ));
            for (idx, server) in station.servers.iter().enumerate() {
                out.push_str(&format!(
                    "  server {}: {} selections, busy {:.1} s\n",
                    idx, server.selections, server.busy_time
                ));
            }
        }
        out.push_str(&SummaryFormatter.write(result));
        out
    }
}

impl Formatter for JsonFormatter {
    fn write(&self, result: &SimulationResult) -> String {
        let mut out =
            serde_json::to_string_pretty(result).unwrap_or_else(|err| format!("{{\"error\":\"{}\"}}", err));
        out.push('\n');
        out
    }
}

/// Deterministic rendering of a parsed config for `show-config`.
pub fn render_config(config: &SimConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!("Arrival rate: {}/s\n", config.arrival_rate));
    out.push_str(&format!("Horizon: {} s\n", config.sim_time));
    out.push_str(&format!("Seed: {}\n", config.seed));
    out.push_str(&format!("Assignment: {}\n", config.assignment));
    out.push_str("Stations:\n");
    for (id, station) in config.stations.iter().enumerate() {
        out.push_str(&format!(
            "- station {}: {} servers, power {}, capacity {}, dispatch {}\n",
            id,
            station.service_times.len(),
            station.power_supply,
            station.capacity,
            station.dispatch
        ));
    }
    out
}
