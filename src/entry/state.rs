use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::code::{InputBuffer, RegionRequest};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EntryPhase {
    Empty,
    Accumulating,
    /// GG is being resolved; keystrokes are refused until it settles.
    AwaitingRegion,
    /// Decodable, more optional characters may follow.
    Complete,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryState {
    pub session_id: String,
    pub opened_at: DateTime<Utc>,
    pub buffer: InputBuffer,
    pub pending_region: Option<RegionRequest>,
    /// Bumped whenever the buffer is replaced wholesale, so a lookup that
    /// started before a cancel cannot write into the new session.
    #[serde(skip)]
    pub generation: u64,
}

impl Default for EntryState {
    fn default() -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            opened_at: Utc::now(),
            buffer: InputBuffer::new(),
            pending_region: None,
            generation: 0,
        }
    }
}

impl EntryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> EntryPhase {
        if self.pending_region.is_some() {
            EntryPhase::AwaitingRegion
        } else if self.buffer.is_complete() {
            EntryPhase::Complete
        } else if self.buffer.is_empty() {
            EntryPhase::Empty
        } else {
            EntryPhase::Accumulating
        }
    }

    /// Start a fresh session with `seed` as its opening buffer.
    pub fn restart(&mut self, seed: InputBuffer) {
        self.session_id = Uuid::new_v4().to_string();
        self.opened_at = Utc::now();
        self.buffer = seed;
        self.pending_region = None;
        self.generation += 1;
    }

    pub fn begin_lookup(&mut self, request: RegionRequest) -> u64 {
        self.pending_region = Some(request);
        self.generation += 1;
        self.generation
    }

    /// Clear the pending lookup if it is still the one started at
    /// `generation`. Returns false for a stale result.
    pub fn finish_lookup(&mut self, generation: u64) -> bool {
        if self.generation != generation || self.pending_region.is_none() {
            return false;
        }
        self.pending_region = None;
        true
    }
}
