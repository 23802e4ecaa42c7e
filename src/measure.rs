use serde::Serialize;

/// Per-event change set returned by a handler. Handlers never touch the
/// running counters directly; the accumulator folds deltas in.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Delta {
    pub arrivals: u64,
    pub departures: u64,
    pub losses: u64,
    pub users: i64,
    pub active_stations: i64,
    pub charging_stations: i64,
    pub delay: f64,
}

impl Delta {
    pub fn merge(self, other: Delta) -> Delta {
        Delta {
            arrivals: self.arrivals + other.arrivals,
            departures: self.departures + other.departures,
            losses: self.losses + other.losses,
            users: self.users + other.users,
            active_stations: self.active_stations + other.active_stations,
            charging_stations: self.charging_stations + other.charging_stations,
            delay: self.delay + other.delay,
        }
    }
}

/// Running counters over the whole run. `user_time_integral` weights the user
/// count by the time it was held, for the time-average number of users.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Totals {
    pub time: f64,
    pub arrivals: u64,
    pub departures: u64,
    pub losses: u64,
    pub users: i64,
    pub active_stations: i64,
    pub charging_stations: i64,
    pub user_time_integral: f64,
    pub total_delay: f64,
}

/// Snapshot of the counters right after one event was folded in. The ordered
/// sample history is what post-processing consumers (warm-up filters,
/// exporters, plotters) work from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Sample {
    pub time: f64,
    pub arrivals: u64,
    pub departures: u64,
    pub losses: u64,
    pub users: i64,
    pub active_stations: i64,
    pub charging_stations: i64,
    pub total_delay: f64,
}

#[derive(Default)]
pub struct Accumulator {
    totals: Totals,
    history: Vec<Sample>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event's delta in at `time`, advancing the user-time
    /// integral across the gap since the previous event, and appends one
    /// sample.
    pub fn apply(&mut self, time: f64, delta: Delta) {
        self.totals.user_time_integral += self.totals.users as f64 * (time - self.totals.time);
        self.totals.time = time;
        self.totals.arrivals += delta.arrivals;
        self.totals.departures += delta.departures;
        self.totals.losses += delta.losses;
        self.totals.users += delta.users;
        self.totals.active_stations += delta.active_stations;
        self.totals.charging_stations += delta.charging_stations;
        self.totals.total_delay += delta.delay;

        self.history.push(Sample {
            time,
            arrivals: self.totals.arrivals,
            departures: self.totals.departures,
            losses: self.totals.losses,
            users: self.totals.users,
            active_stations: self.totals.active_stations,
            charging_stations: self.totals.charging_stations,
            total_delay: self.totals.total_delay,
        });
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn into_parts(self) -> (Totals, Vec<Sample>) {
        (self.totals, self.history)
    }
}
