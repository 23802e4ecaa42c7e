use std::collections::VecDeque;

use crate::dispatch::{DispatchPolicy, SelectionContext};
use crate::error::{Error, Result};

/// Rotation over all server ids. Busy servers are skipped by rotating them to
/// the back; the chosen server rotates to the back as well, so over time every
/// server gets its turn. Worst case one full rotation per call.
pub struct RoundRobinPolicy {
    rotation: VecDeque<usize>,
}

impl RoundRobinPolicy {
    pub fn new(server_count: usize) -> Self {
        Self {
            rotation: (0..server_count).collect(),
        }
    }
}

impl DispatchPolicy for RoundRobinPolicy {
    fn select(&mut self, ctx: &mut SelectionContext) -> Result<usize> {
        for _ in 0..self.rotation.len() {
            let id = self
                .rotation
                .pop_front()
                .ok_or(Error::ServerUnavailable(ctx.station_id))?;
            self.rotation.push_back(id);
            if ctx.servers[id].idle {
                return Ok(id);
            }
        }
        Err(Error::ServerUnavailable(ctx.station_id))
    }
}
