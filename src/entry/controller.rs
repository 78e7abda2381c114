use std::sync::Arc;

use serde::Serialize;
use tokio::{sync::Mutex, time};

use crate::{
    code::{
        decode, DecodeError, Guide, IncrementalValidator, InputBuffer, Keystroke, RegionRequest,
    },
    log_debug, log_error, log_info, log_warn,
    models::Observation,
    observers::ObserverDirectory,
};

use super::{EntryConfig, EntryPhase, EntryState};

const ENABLE_LOGS: bool = true;

/// What one keystroke did to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum KeyOutcome {
    Accepted { autofilled: String },
    Rejected,
    /// A region lookup is in flight; the keystroke was dropped.
    Busy,
    /// Unknown observer code; the buffer was cleared.
    Reset,
    /// Characters removed by a failed range check or a backspace.
    Backtracked { dropped: usize },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySnapshot {
    pub session_id: String,
    pub phase: EntryPhase,
    pub code: String,
    pub len: usize,
    pub guide: Guide,
    pub pending_region: Option<RegionRequest>,
}

impl EntrySnapshot {
    fn of(state: &EntryState) -> Self {
        Self {
            session_id: state.session_id.clone(),
            phase: state.phase(),
            code: state.buffer.to_string(),
            len: state.buffer.len(),
            guide: Guide::render(state.buffer.as_str()),
            pending_region: state.pending_region.clone(),
        }
    }
}

/// One short-entry session at a time, fed keystroke by keystroke.
pub struct EntryController<D> {
    state: Arc<Mutex<EntryState>>,
    validator: Arc<IncrementalValidator>,
    directory: Arc<D>,
    config: EntryConfig,
}

impl<D> Clone for EntryController<D> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            validator: Arc::clone(&self.validator),
            directory: Arc::clone(&self.directory),
            config: self.config.clone(),
        }
    }
}

impl<D: ObserverDirectory> EntryController<D> {
    pub fn new(validator: IncrementalValidator, directory: Arc<D>, config: EntryConfig) -> Self {
        let mut state = EntryState::new();
        state.restart(opening_buffer(&validator, &config));

        Self {
            state: Arc::new(Mutex::new(state)),
            validator: Arc::new(validator),
            directory,
            config,
        }
    }

    pub async fn snapshot(&self) -> EntrySnapshot {
        EntrySnapshot::of(&*self.state.lock().await)
    }

    /// Discard the current session and start a new one.
    pub async fn open(&self) -> EntrySnapshot {
        let mut state = self.state.lock().await;
        state.restart(self.seed());
        log_debug!("entry session {} opened", state.session_id);
        EntrySnapshot::of(&state)
    }

    pub async fn cancel(&self) {
        let mut state = self.state.lock().await;
        log_info!(
            "entry session {} cancelled at {} characters",
            state.session_id,
            state.buffer.len()
        );
        state.restart(self.seed());
    }

    pub async fn press_key(&self, ch: char) -> KeyOutcome {
        let (request, generation, mut autofilled) = {
            let mut state = self.state.lock().await;
            if state.pending_region.is_some() {
                return KeyOutcome::Busy;
            }

            match self.validator.try_append(&state.buffer, ch) {
                Keystroke::Rejected => return KeyOutcome::Rejected,
                Keystroke::ResetAll => {
                    state.buffer.clear();
                    return KeyOutcome::Reset;
                }
                Keystroke::Backtrack(dropped) => {
                    state.buffer = state.buffer.after_backtrack(dropped);
                    return KeyOutcome::Backtracked { dropped };
                }
                Keystroke::Accepted(accepted) => {
                    state.buffer = accepted.buffer;
                    let Some(request) = accepted.region_request else {
                        return KeyOutcome::Accepted {
                            autofilled: accepted.autofilled,
                        };
                    };
                    let generation = state.begin_lookup(request.clone());
                    (request, generation, accepted.autofilled)
                }
            }
        };

        // The lookup runs in its own task so the session settles even if the
        // caller stops polling this future. Other callers see AwaitingRegion
        // and get Busy until then.
        let worker = self.clone();
        let lookup = tokio::spawn(async move {
            worker.complete_lookup(request, generation).await
        });
        match lookup.await {
            Ok(filled) => autofilled.push_str(&filled),
            Err(err) => {
                log_error!("region lookup task failed: {err}");
                self.state.lock().await.finish_lookup(generation);
            }
        }
        KeyOutcome::Accepted { autofilled }
    }

    /// Remove the last character, typed or auto-filled.
    pub async fn backspace(&self) -> KeyOutcome {
        let mut state = self.state.lock().await;
        if state.pending_region.is_some() {
            return KeyOutcome::Busy;
        }
        match state.buffer.pop() {
            Some(_) => KeyOutcome::Backtracked { dropped: 1 },
            None => KeyOutcome::Rejected,
        }
    }

    /// Decode the buffer and start the next session.
    pub async fn submit(&self) -> Result<Observation, DecodeError> {
        let mut state = self.state.lock().await;
        let observation = decode(state.buffer.as_str())?;
        log_info!(
            "entry session {} submitted: {}",
            state.session_id,
            state.buffer.as_str().trim_end()
        );
        state.restart(self.seed());
        Ok(observation)
    }

    fn seed(&self) -> InputBuffer {
        opening_buffer(&self.validator, &self.config)
    }

    /// Resolve GG and write it into the session that asked for it. Returns
    /// the characters injected, empty if the session moved on or the region
    /// is left for manual entry.
    async fn complete_lookup(&self, request: RegionRequest, generation: u64) -> String {
        let region = self.resolve_region(&request).await;

        let mut state = self.state.lock().await;
        if !state.finish_lookup(generation) {
            log_debug!("dropping region for {} from a closed session", request.observer);
            return String::new();
        }
        match self.validator.apply_region(&state.buffer, region) {
            Some(filled) => {
                state.buffer = filled.buffer;
                filled.autofilled
            }
            None => String::new(),
        }
    }

    async fn resolve_region(&self, request: &RegionRequest) -> Option<u8> {
        let lookup = self
            .directory
            .lookup_region(&request.observer, request.year, request.month);

        match time::timeout(self.config.lookup_timeout, lookup).await {
            Ok(Ok(Some(regions))) => {
                let region = request.site.pick(&regions);
                if region.is_none() {
                    log_warn!(
                        "observer {} has no secondary site in {:02}/{:02}; enter GG manually",
                        request.observer,
                        request.month,
                        request.year
                    );
                }
                region
            }
            Ok(Ok(None)) => {
                log_warn!(
                    "no site registered for observer {} in {:02}/{:02}; enter GG manually",
                    request.observer,
                    request.month,
                    request.year
                );
                None
            }
            Ok(Err(err)) => {
                log_warn!("region lookup for observer {} failed: {err:#}", request.observer);
                None
            }
            Err(_) => {
                log_warn!(
                    "region lookup for observer {} timed out after {:?}",
                    request.observer,
                    self.config.lookup_timeout
                );
                None
            }
        }
    }
}

fn opening_buffer(validator: &IncrementalValidator, config: &EntryConfig) -> InputBuffer {
    config
        .fixed_observer
        .as_deref()
        .map(|code| validator.seed(code))
        .unwrap_or_default()
}
