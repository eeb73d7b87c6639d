//! Observable notifications
//!
//! Components never return events through their control flow; they append
//! them to an [`EventSink`] handed in by the caller once a call has fully
//! succeeded. Failed calls emit nothing.

use serde::{Deserialize, Serialize};

use crate::crypto::Identity;
use crate::multisig::{CallOutput, Operation};

/// Everything a component can announce
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// An owner was added to or removed from the authority
    OwnerUpdated { owner: Identity, added: bool },
    /// A threshold-approved operation was forwarded and succeeded
    Executed {
        target: Identity,
        operation: Operation,
        result: CallOutput,
        nonce: u64,
    },
    /// Genesis fixed the shared vesting start time
    VestingStarted { start_at: u64 },
    VestingCreated {
        account: Identity,
        amount: u128,
        start_at: u64,
    },
    BatchVestingCreated {
        accounts: Vec<Identity>,
        amounts: Vec<u128>,
        start_at: u64,
    },
    Claimed { account: Identity, amount: u128 },
    Withdrawn { to: Identity, amount: u128 },
    Transfer {
        from: Identity,
        to: Identity,
        amount: u128,
    },
}

/// An event together with the component that emitted it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub source: Identity,
    pub event: Event,
}

/// Destination for emitted events
pub trait EventSink {
    fn emit(&mut self, source: Identity, event: Event);
}

/// Append-only in-memory event log
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in emission order
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Events emitted by one component
    pub fn events_from(&self, source: &Identity) -> Vec<&Event> {
        self.records
            .iter()
            .filter(|r| &r.source == source)
            .map(|r| &r.event)
            .collect()
    }

    pub fn last(&self) -> Option<&Event> {
        self.records.last().map(|r| &r.event)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, source: Identity, event: Event) {
        log::debug!("event from {}: {:?}", source, event);
        self.records.push(EventRecord { source, event });
    }
}
