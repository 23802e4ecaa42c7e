use rand::Rng;

use crate::dispatch::{DispatchPolicy, SelectionContext};
use crate::error::{Error, Result};

/// Uniform choice among the idle servers, drawn from the engine RNG.
#[derive(Default)]
pub struct RandomPolicy;

impl DispatchPolicy for RandomPolicy {
    fn select(&mut self, ctx: &mut SelectionContext) -> Result<usize> {
        let candidates: Vec<usize> = ctx.idle_servers().collect();
        if candidates.is_empty() {
            return Err(Error::ServerUnavailable(ctx.station_id));
        }
        let pick = ctx.rng.gen_range(0..candidates.len());
        Ok(candidates[pick])
    }
}
