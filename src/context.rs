//! Per-call execution context

use crate::events::EventSink;
use crate::token::AssetLedger;

/// What a state-changing call can see of the outside world: the current
/// time, the asset ledger holding the balances, and where to announce
/// what happened.
pub struct Context<'a> {
    /// Current unix timestamp in seconds
    pub now: u64,
    pub assets: &'a mut dyn AssetLedger,
    pub events: &'a mut dyn EventSink,
}

impl<'a> Context<'a> {
    pub fn new(now: u64, assets: &'a mut dyn AssetLedger, events: &'a mut dyn EventSink) -> Self {
        Self {
            now,
            assets,
            events,
        }
    }
}
