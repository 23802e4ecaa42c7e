use crate::dispatch::{DispatchPolicy, SelectionContext};
use crate::error::{Error, Result};

/// Prefers the idle server with the lowest mean service time; ties go to the
/// lowest id so the pick is stable.
#[derive(Default)]
pub struct FastestPolicy;

impl DispatchPolicy for FastestPolicy {
    fn select(&mut self, ctx: &mut SelectionContext) -> Result<usize> {
        ctx.idle_servers()
            .min_by(|a, b| {
                ctx.servers[*a]
                    .mean_service_time
                    .total_cmp(&ctx.servers[*b].mean_service_time)
                    .then(a.cmp(b))
            })
            .ok_or(Error::ServerUnavailable(ctx.station_id))
    }
}
