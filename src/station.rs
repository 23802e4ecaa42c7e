use std::collections::VecDeque;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::battery::{Battery, BatteryStatus};
use crate::dispatch::{build_policy, DispatchPolicy, SelectionContext};
use crate::error::{Error, Result};
use crate::models::StationConfig;

/// A unit of work. Lives in its station's queue from admission until the
/// departure that consumes it.
#[derive(Clone, Copy, Debug)]
pub struct Job {
    pub arrival_time: f64,
    /// Set once a server is engaged for this job.
    pub start_service_time: Option<f64>,
}

impl Job {
    pub fn new(arrival_time: f64) -> Self {
        Self {
            arrival_time,
            start_service_time: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Server {
    pub idle: bool,
    pub mean_service_time: f64,
    pub busy_time: f64,
    pub selections: u64,
}

impl Server {
    pub fn new(mean_service_time: f64) -> Self {
        Self {
            idle: true,
            mean_service_time,
            busy_time: 0.0,
            selections: 0,
        }
    }
}

/// Replaces the source material's overloaded `buffer_size = 0` sentinel with
/// three named modes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CapacityMode {
    #[default]
    Unbounded,
    /// No waiting room: an arrival is admitted only if a server is idle.
    ZeroBuffer,
    /// System capacity, jobs in service included.
    Bounded(usize),
}

impl std::fmt::Display for CapacityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapacityMode::Unbounded => f.write_str("unbounded"),
            CapacityMode::ZeroBuffer => f.write_str("zero-buffer"),
            CapacityMode::Bounded(limit) => write!(f, "bounded({})", limit),
        }
    }
}

/// Why an arrival could not be admitted. Losses are expected-frequency
/// outcomes, not errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LossReason {
    OutsideWorkingSlot,
    RechargeBudgetSpent,
    BatteryUnavailable,
    QueueFull,
}

/// One queueing station: a FIFO queue of every job in the system (the head
/// section is in service), a pool of heterogeneous servers, and a battery.
pub struct Station {
    pub id: usize,
    capacity: CapacityMode,
    queue: VecDeque<Job>,
    servers: Vec<Server>,
    policy: Box<dyn DispatchPolicy>,
    pub battery: Battery,
    working_slots: Vec<[f64; 2]>,
    max_recharge_cycles: Option<u32>,
    pub solar_panel: bool,
    pub activation_budget: Option<f64>,
}

impl Station {
    pub fn new(id: usize, config: &StationConfig) -> Self {
        let servers: Vec<Server> = config
            .service_times
            .iter()
            .map(|mean| Server::new(*mean))
            .collect();
        let policy = build_policy(config.dispatch, servers.len());
        Self {
            id,
            capacity: config.capacity,
            queue: VecDeque::new(),
            servers,
            policy,
            battery: Battery::new(config.power_supply),
            working_slots: config.working_slots.clone(),
            max_recharge_cycles: config.max_recharge_cycles,
            solar_panel: config.solar_panel,
            activation_budget: config.activation_budget,
        }
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn busy_servers(&self) -> usize {
        self.servers.iter().filter(|server| !server.idle).count()
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn is_full(&self) -> bool {
        match self.capacity {
            CapacityMode::Unbounded => false,
            CapacityMode::ZeroBuffer => self.busy_servers() == self.servers.len(),
            CapacityMode::Bounded(limit) => self.queue.len() >= limit,
        }
    }

    /// Engagement is possible while there are both an idle server and a job
    /// not yet in service; never more servers engaged than jobs queued.
    pub fn can_engage_server(&self) -> bool {
        let busy = self.busy_servers();
        busy < self.servers.len() && busy < self.queue.len()
    }

    /// Fatal-guarded append. Callers decide admission via `admission()` or
    /// `attempt_admit()` first.
    pub fn insert(&mut self, job: Job) -> Result<()> {
        if self.is_full() {
            return Err(Error::CapacityViolation(self.id));
        }
        self.queue.push_back(job);
        Ok(())
    }

    /// Full admission check in loss-priority order, then insert.
    pub fn attempt_admit(&mut self, time: f64, job: Job) -> std::result::Result<(), LossReason> {
        self.admission(time)?;
        self.queue.push_back(job);
        Ok(())
    }

    pub fn admission(&self, time: f64) -> std::result::Result<(), LossReason> {
        if !self.is_in_working_slot(time) {
            return Err(LossReason::OutsideWorkingSlot);
        }
        if self.has_exceeded_max_recharge_cycles() {
            return Err(LossReason::RechargeBudgetSpent);
        }
        if self.battery.status != BatteryStatus::InUse {
            return Err(LossReason::BatteryUnavailable);
        }
        if self.is_full() {
            return Err(LossReason::QueueFull);
        }
        Ok(())
    }

    /// Picks an idle server through the dispatch policy and marks it busy;
    /// the oldest not-yet-served job enters service now. Returns the pick
    /// and its mean service time for sampling.
    pub fn engage_server(&mut self, time: f64, rng: &mut dyn RngCore) -> Result<(usize, f64)> {
        let mut ctx = SelectionContext {
            station_id: self.id,
            servers: &self.servers,
            rng,
        };
        let server_id = self.policy.select(&mut ctx)?;
        let server = &mut self.servers[server_id];
        server.idle = false;
        server.selections += 1;
        let mean = server.mean_service_time;
        if let Some(job) = self
            .queue
            .iter_mut()
            .find(|job| job.start_service_time.is_none())
        {
            job.start_service_time = Some(time);
        }
        Ok((server_id, mean))
    }

    pub fn accrue_service(&mut self, server_id: usize, duration: f64) {
        self.servers[server_id].busy_time += duration;
    }

    pub fn release(&mut self, server_id: usize) {
        self.servers[server_id].idle = true;
    }

    pub fn server_busy(&self, server_id: usize) -> bool {
        !self.servers[server_id].idle
    }

    /// Pops the oldest job and frees the server that finished it. An empty
    /// queue here is an event-ordering bug, not a runtime condition.
    pub fn consume(&mut self, server_id: usize) -> Result<Job> {
        let job = self.queue.pop_front().ok_or(Error::EmptyQueue(self.id))?;
        self.servers[server_id].idle = true;
        Ok(job)
    }

    /// Drops every queued job (in-flight included) and frees all servers.
    /// Returns how many jobs were dropped.
    pub fn force_clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        for server in &mut self.servers {
            server.idle = true;
        }
        dropped
    }

    /// Aggregate service rate, for ranking stations by throughput.
    pub fn capacity_rate(&self) -> f64 {
        self.servers
            .iter()
            .map(|server| 1.0 / server.mean_service_time)
            .sum()
    }

    pub fn is_in_working_slot(&self, time: f64) -> bool {
        self.working_slots
            .iter()
            .any(|slot| slot[0] <= time && time < slot[1])
    }

    pub fn has_exceeded_max_recharge_cycles(&self) -> bool {
        self.max_recharge_cycles
            .map_or(false, |cap| self.battery.cycles >= cap)
    }

    /// Ready to be requisitioned: charged (or paused with charge left),
    /// inside a working slot, recharge budget remaining.
    pub fn is_ready(&self, time: f64) -> bool {
        matches!(
            self.battery.status,
            BatteryStatus::Paused | BatteryStatus::Full
        ) && self.is_in_working_slot(time)
            && !self.has_exceeded_max_recharge_cycles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::PowerSupply;
    use crate::dispatch::PolicyKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(service_times: Vec<f64>, capacity: CapacityMode) -> StationConfig {
        StationConfig {
            power_supply: PowerSupply::Wired,
            service_times,
            capacity,
            dispatch: PolicyKind::Fastest,
            max_recharge_cycles: None,
            activation_budget: None,
            working_slots: vec![[0.0, f64::INFINITY]],
            solar_panel: false,
        }
    }

    fn active_station(service_times: Vec<f64>, capacity: CapacityMode) -> Station {
        let mut station = Station::new(0, &config(service_times, capacity));
        station.battery.activate(false);
        station
    }

    #[test]
    fn busy_servers_never_exceed_pool_size() {
        let mut station = active_station(vec![10.0, 10.0], CapacityMode::Unbounded);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..4 {
            station.insert(Job::new(0.0)).unwrap();
        }
        while station.can_engage_server() {
            station.engage_server(0.0, &mut rng).unwrap();
        }
        assert_eq!(station.busy_servers(), 2);
        assert!(station.engage_server(0.0, &mut rng).is_err());
    }

    #[test]
    fn engagement_never_outruns_the_queue() {
        let mut station = active_station(vec![10.0, 10.0, 10.0], CapacityMode::Unbounded);
        let mut rng = StdRng::seed_from_u64(1);
        station.insert(Job::new(0.0)).unwrap();
        assert!(station.can_engage_server());
        station.engage_server(0.0, &mut rng).unwrap();
        // one job in the system, one server engaged: demand is covered
        assert!(!station.can_engage_server());
    }

    #[test]
    fn bounded_queue_rejects_when_full() {
        let mut station = active_station(vec![10.0], CapacityMode::Bounded(2));
        station.insert(Job::new(0.0)).unwrap();
        station.insert(Job::new(1.0)).unwrap();
        assert!(station.is_full());
        assert_eq!(station.admission(2.0), Err(LossReason::QueueFull));
        assert!(station.insert(Job::new(2.0)).is_err());
        assert_eq!(station.queue_len(), 2);
    }

    #[test]
    fn zero_buffer_is_full_exactly_when_no_server_is_idle() {
        let mut station = active_station(vec![10.0], CapacityMode::ZeroBuffer);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!station.is_full());
        station.insert(Job::new(0.0)).unwrap();
        station.engage_server(0.0, &mut rng).unwrap();
        assert!(station.is_full());
        assert_eq!(station.admission(0.0), Err(LossReason::QueueFull));
        assert_eq!(station.queue_len(), 1);
    }

    #[test]
    fn unbounded_queue_is_never_full() {
        let mut station = active_station(vec![10.0], CapacityMode::Unbounded);
        for i in 0..500 {
            station.insert(Job::new(i as f64)).unwrap();
        }
        assert!(!station.is_full());
    }

    #[test]
    fn engage_then_release_leaves_the_queue_unchanged() {
        let mut station = active_station(vec![10.0], CapacityMode::Unbounded);
        let mut rng = StdRng::seed_from_u64(1);
        station.insert(Job::new(0.0)).unwrap();
        let (server_id, _) = station.engage_server(0.0, &mut rng).unwrap();
        station.release(server_id);
        assert_eq!(station.queue_len(), 1);
        assert_eq!(station.busy_servers(), 0);
    }

    #[test]
    fn consume_pops_jobs_in_arrival_order() {
        let mut station = active_station(vec![10.0, 10.0], CapacityMode::Unbounded);
        let mut rng = StdRng::seed_from_u64(1);
        station.insert(Job::new(1.0)).unwrap();
        station.insert(Job::new(2.0)).unwrap();
        let (server_id, _) = station.engage_server(0.0, &mut rng).unwrap();
        assert_eq!(station.consume(server_id).unwrap().arrival_time, 1.0);
        assert_eq!(station.consume(server_id).unwrap().arrival_time, 2.0);
        assert!(station.consume(server_id).is_err());
    }

    #[test]
    fn engagement_stamps_the_service_start() {
        let mut station = active_station(vec![10.0], CapacityMode::Unbounded);
        let mut rng = StdRng::seed_from_u64(1);
        station.insert(Job::new(1.0)).unwrap();
        station.insert(Job::new(2.0)).unwrap();
        let (server_id, _) = station.engage_server(5.0, &mut rng).unwrap();

        let job = station.consume(server_id).unwrap();
        assert_eq!(job.start_service_time, Some(5.0));
        // the second job never entered service
        station.release(server_id);
        let waiting = station.consume(server_id).unwrap();
        assert_eq!(waiting.start_service_time, None);
    }

    #[test]
    fn force_clear_drops_jobs_and_frees_servers() {
        let mut station = active_station(vec![10.0, 10.0], CapacityMode::Unbounded);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..3 {
            station.insert(Job::new(0.0)).unwrap();
        }
        station.engage_server(0.0, &mut rng).unwrap();
        station.engage_server(0.0, &mut rng).unwrap();
        assert_eq!(station.force_clear(), 3);
        assert_eq!(station.queue_len(), 0);
        assert_eq!(station.busy_servers(), 0);
    }

    #[test]
    fn admission_reports_the_first_failing_check() {
        let mut config = config(vec![10.0], CapacityMode::Unbounded);
        config.working_slots = vec![[100.0, 200.0]];
        config.max_recharge_cycles = Some(0);
        let station = Station::new(0, &config);
        assert_eq!(station.admission(50.0), Err(LossReason::OutsideWorkingSlot));
        assert_eq!(
            station.admission(150.0),
            Err(LossReason::RechargeBudgetSpent)
        );
    }

    #[test]
    fn admission_requires_an_active_battery() {
        let config = config(vec![10.0], CapacityMode::Unbounded);
        let station = Station::new(0, &config);
        // battery is Full but not activated yet
        assert_eq!(station.admission(0.0), Err(LossReason::BatteryUnavailable));
    }

    #[test]
    fn capacity_rate_sums_server_rates() {
        let station = active_station(vec![10.0, 20.0], CapacityMode::Unbounded);
        assert!((station.capacity_rate() - 0.15).abs() < 1e-12);
    }

    #[test]
    fn recharge_budget_exhaustion_excludes_the_station() {
        let mut config = config(vec![10.0], CapacityMode::Unbounded);
        config.power_supply = PowerSupply::Base;
        config.max_recharge_cycles = Some(1);
        let mut station = Station::new(0, &config);
        assert!(station.is_ready(0.0));

        station.battery.activate(false);
        station.battery.consume(station.battery.residual);
        station.battery.recharge();
        assert!(station.has_exceeded_max_recharge_cycles());
        assert!(!station.is_ready(0.0));
    }

    #[test]
    fn working_slot_bounds_are_half_open() {
        let mut config = config(vec![10.0], CapacityMode::Unbounded);
        config.working_slots = vec![[0.0, 100.0], [200.0, 300.0]];
        let station = Station::new(0, &config);
        assert!(station.is_in_working_slot(0.0));
        assert!(!station.is_in_working_slot(100.0));
        assert!(station.is_in_working_slot(250.0));
        assert!(!station.is_in_working_slot(300.0));
    }
}
