mod fastest;
mod random;
mod round_robin;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::station::Server;

pub use fastest::FastestPolicy;
pub use random::RandomPolicy;
pub use round_robin::RoundRobinPolicy;

/// Picks which idle server takes the next job of a station.
pub trait DispatchPolicy {
    fn select(&mut self, ctx: &mut SelectionContext) -> Result<usize>;
}

pub struct SelectionContext<'a> {
    pub station_id: usize,
    pub servers: &'a [Server],
    pub rng: &'a mut dyn RngCore,
}

impl SelectionContext<'_> {
    pub fn idle_servers(&self) -> impl Iterator<Item = usize> + '_ {
        self.servers
            .iter()
            .enumerate()
            .filter(|(_, server)| server.idle)
            .map(|(idx, _)| idx)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    #[default]
    Fastest,
    Random,
    RoundRobin,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [
        PolicyKind::Fastest,
        PolicyKind::Random,
        PolicyKind::RoundRobin,
    ];
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PolicyKind::Fastest => "fastest",
            PolicyKind::Random => "random",
            PolicyKind::RoundRobin => "round-robin",
        };
        f.write_str(label)
    }
}

pub fn build_policy(kind: PolicyKind, server_count: usize) -> Box<dyn DispatchPolicy> {
    match kind {
        PolicyKind::Fastest => Box::new(FastestPolicy),
        PolicyKind::Random => Box::new(RandomPolicy),
        PolicyKind::RoundRobin => Box::new(RoundRobinPolicy::new(server_count)),
    }
}
