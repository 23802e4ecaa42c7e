use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::battery::{BatteryStatus, RECHARGE_DURATION};
use crate::error::{Error, Result};
use crate::events::{EventKind, EventQueue};
use crate::measure::{Accumulator, Delta};
use crate::models::{AssignmentConfig, SimConfig};
use crate::profile::ArrivalProfile;
use crate::report::{DerivedMetrics, RunMetadata, SimulationResult, StationSummary};
use crate::station::{CapacityMode, Job, Station};

pub struct SimulationEngine {
    config: SimConfig,
    stations: Vec<Station>,
    fes: EventQueue,
    rng: StdRng,
    profile: ArrivalProfile,
    acc: Accumulator,
}

impl SimulationEngine {
    pub fn new(config: SimConfig) -> Result<Self> {
        validate_config(&config)?;
        let profile = ArrivalProfile::from_config(&config.profile)?;
        let stations = config
            .stations
            .iter()
            .enumerate()
            .map(|(id, station)| Station::new(id, station))
            .collect();
        let rng = StdRng::seed_from_u64(config.seed);

        Ok(Self {
            config,
            stations,
            fes: EventQueue::new(),
            rng,
            profile,
            acc: Accumulator::new(),
        })
    }

    pub fn run(mut self) -> Result<SimulationResult> {
        self.fes.push(0.0, EventKind::Arrival);

        while let Some(event) = self.fes.pop() {
            if event.time >= self.config.sim_time {
                break;
            }
            let delta = match event.kind {
                EventKind::Arrival => self.handle_arrival(event.time)?,
                EventKind::Departure { station, server } => {
                    self.handle_departure(event.time, station, server)?
                }
                EventKind::SwitchOff { station, duration } => {
                    self.handle_switch_off(event.time, station, duration)
                }
                EventKind::Recharge { station } => self.handle_recharge(event.time, station),
            };
            self.acc.apply(event.time, delta);
        }

        let (totals, history) = self.acc.into_parts();
        let metrics = DerivedMetrics::from_totals(&totals, self.config.sim_time);
        Ok(SimulationResult {
            totals,
            metrics,
            stations: self
                .stations
                .iter()
                .map(StationSummary::from_station)
                .collect(),
            metadata: RunMetadata {
                seed: self.config.seed,
                horizon: self.config.sim_time,
                assignment: self.config.assignment.to_string(),
                stations: self.stations.len(),
            },
            history,
        })
    }

    fn handle_arrival(&mut self, time: f64) -> Result<Delta> {
        let mut delta = Delta::default();

        let candidate = self.candidate_station(time);
        let admitted = candidate.filter(|station_id| {
            self.stations[*station_id]
                .attempt_admit(time, Job::new(time))
                .is_ok()
        });
        match admitted {
            Some(station_id) => {
                delta.users += 1;
                if self.stations[station_id].can_engage_server() {
                    self.engage_and_schedule(time, station_id)?;
                }
            }
            None => {
                delta.losses += 1;
                // compensate the shortfall with another ready station, if any
                if let Some(requested) = self.request_station(time) {
                    delta = delta.merge(self.launch_station(time, requested));
                }
            }
        }

        // schedule the next arrival at the time-of-day modulated rate
        let rate = self.config.arrival_rate * self.profile.multiplier(hour_of_day(time));
        if rate > 0.0 {
            let gap = self.sample_exp(rate);
            self.fes.push(time + gap, EventKind::Arrival);
        }

        delta.arrivals += 1;
        Ok(delta)
    }

    fn handle_departure(&mut self, time: f64, station_id: usize, server_id: usize) -> Result<Delta> {
        let mut delta = Delta::default();
        let station = &mut self.stations[station_id];

        // a departure outliving its station's shutdown is a lost job
        if station.battery.status != BatteryStatus::InUse || !station.server_busy(server_id) {
            delta.losses += 1;
            return Ok(delta);
        }

        let job = station.consume(server_id)?;
        delta.users -= 1;
        delta.departures += 1;
        delta.delay += time - job.arrival_time;

        if self.stations[station_id].can_engage_server() {
            self.engage_and_schedule(time, station_id)?;
        }
        Ok(delta)
    }

    fn handle_switch_off(&mut self, time: f64, station_id: usize, duration: f64) -> Delta {
        let mut delta = Delta {
            active_stations: -1,
            ..Delta::default()
        };

        let status = self.stations[station_id].battery.consume(duration);
        let dropped = self.stations[station_id].force_clear();
        delta.users -= dropped as i64;

        if status == BatteryStatus::Empty {
            self.fes.push(
                time + RECHARGE_DURATION,
                EventKind::Recharge {
                    station: station_id,
                },
            );
            delta.charging_stations += 1;
            if let Some(requested) = self.request_station(time) {
                delta = delta.merge(self.launch_station(time, requested));
            }
        }
        delta
    }

    fn handle_recharge(&mut self, time: f64, station_id: usize) -> Delta {
        let mut delta = Delta {
            charging_stations: -1,
            ..Delta::default()
        };
        self.stations[station_id].battery.recharge();
        if self.config.relaunch_on_recharge && self.stations[station_id].is_ready(time) {
            delta = delta.merge(self.launch_station(time, station_id));
        }
        delta
    }

    /// Candidate station for an arriving job, per the assignment policy.
    /// Admission is the candidate's to refuse; `None` is an immediate loss.
    fn candidate_station(&mut self, time: f64) -> Option<usize> {
        match self.config.assignment {
            AssignmentConfig::Random => Some(self.rng.gen_range(0..self.stations.len())),
            AssignmentConfig::HighestCapacity => self
                .stations
                .iter()
                .filter(|station| station.admission(time).is_ok())
                .max_by(|a, b| {
                    a.capacity_rate()
                        .total_cmp(&b.capacity_rate())
                        .then(b.id.cmp(&a.id))
                })
                .map(|station| station.id),
        }
    }

    /// Ready station to requisition after a loss or a shutdown: ranked by
    /// capacity rate, indexed by the current arrival intensity so busy hours
    /// reach deeper into the ranking.
    fn request_station(&self, time: f64) -> Option<usize> {
        let mut ready: Vec<&Station> = self
            .stations
            .iter()
            .filter(|station| station.is_ready(time))
            .collect();
        if ready.is_empty() {
            return None;
        }
        ready.sort_by(|a, b| {
            b.capacity_rate()
                .total_cmp(&a.capacity_rate())
                .then(a.id.cmp(&b.id))
        });
        let intensity = self.profile.multiplier(hour_of_day(time));
        let idx = (((ready.len() - 1) as f64) * intensity) as usize;
        Some(ready[idx.min(ready.len() - 1)].id)
    }

    /// Activates (or resumes) a station and schedules the switch-off that
    /// ends its discharge budget. Mains-powered stations never switch off.
    fn launch_station(&mut self, time: f64, station_id: usize) -> Delta {
        let switch_off = {
            let station = &mut self.stations[station_id];
            match station.battery.status {
                BatteryStatus::Full => {
                    let solar = station.solar_panel && in_solar_window(time);
                    station.battery.activate(solar);
                }
                BatteryStatus::Paused => station.battery.resume(),
                _ => {}
            }
            let budget = match station.activation_budget {
                Some(desired) => desired.min(station.battery.residual),
                None => station.battery.residual,
            };
            (!station.battery.is_infinite()).then_some(budget)
        };

        if let Some(budget) = switch_off {
            self.fes.push(
                time + budget,
                EventKind::SwitchOff {
                    station: station_id,
                    duration: budget,
                },
            );
        }
        Delta {
            active_stations: 1,
            ..Delta::default()
        }
    }

    fn engage_and_schedule(&mut self, time: f64, station_id: usize) -> Result<()> {
        let (server_id, mean) = self.stations[station_id].engage_server(time, &mut self.rng)?;
        let service = self.sample_exp(1.0 / mean);
        self.stations[station_id].accrue_service(server_id, service);
        self.fes.push(
            time + service,
            EventKind::Departure {
                station: station_id,
                server: server_id,
            },
        );
        Ok(())
    }

    fn sample_exp(&mut self, rate: f64) -> f64 {
        let mut u = self.rng.gen::<f64>();
        if u <= f64::MIN_POSITIVE {
            u = f64::MIN_POSITIVE;
        }
        -u.ln() / rate
    }
}

pub fn run_simulation(config: &SimConfig) -> Result<SimulationResult> {
    SimulationEngine::new(config.clone())?.run()
}

fn hour_of_day(time: f64) -> f64 {
    (time / 3600.0).rem_euclid(24.0)
}

fn in_solar_window(time: f64) -> bool {
    (8.0..=16.0).contains(&hour_of_day(time))
}

pub fn validate_config(config: &SimConfig) -> Result<()> {
    if config.stations.is_empty() {
        return Err(Error::EmptyStations);
    }
    for (id, station) in config.stations.iter().enumerate() {
        if station.service_times.is_empty() {
            return Err(Error::NoServers(id));
        }
        for mean in &station.service_times {
            if !(*mean > 0.0) {
                return Err(Error::InvalidServiceTime(id, *mean));
            }
        }
        if let CapacityMode::Bounded(0) = station.capacity {
            return Err(Error::InvalidCapacity(id));
        }
        for slot in &station.working_slots {
            if slot[0] < 0.0 || !(slot[0] < slot[1]) {
                return Err(Error::InvalidWorkingSlot(id, slot[0], slot[1]));
            }
        }
        if let Some(budget) = station.activation_budget {
            if !(budget > 0.0) {
                return Err(Error::InvalidActivationBudget(id, budget));
            }
        }
    }
    if !(config.arrival_rate > 0.0) {
        return Err(Error::InvalidArrivalRate(config.arrival_rate));
    }
    if !(config.sim_time > 0.0) {
        return Err(Error::InvalidHorizon(config.sim_time));
    }
    Ok(())
}
