//! Line-oriented driver over [`EntryController`], used by the binary.

use anyhow::Result;
use log::info;

use crate::{models::ObservationRecord, AppState};

use super::{EntryController, EntrySnapshot, KeyOutcome};

/// Erases the last character.
pub const BACKSPACE: char = '<';
/// Abandons the session.
pub const CANCEL: &str = "!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineCommand {
    Submit,
    Cancel,
    Keys(String),
}

impl LineCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        match line {
            "" => LineCommand::Submit,
            CANCEL => LineCommand::Cancel,
            keys => LineCommand::Keys(keys.to_string()),
        }
    }
}

/// Outcome of one input line.
#[derive(Debug)]
pub enum LineResult {
    Typed {
        outcomes: Vec<KeyOutcome>,
        snapshot: EntrySnapshot,
    },
    Stored(ObservationRecord),
    Cancelled(EntrySnapshot),
}

pub async fn type_keys<D>(controller: &EntryController<D>, keys: &str) -> Vec<KeyOutcome>
where
    D: crate::observers::ObserverDirectory,
{
    let mut outcomes = Vec::with_capacity(keys.len());
    for ch in keys.chars() {
        let outcome = if ch == BACKSPACE {
            controller.backspace().await
        } else {
            controller.press_key(ch).await
        };
        outcomes.push(outcome);
    }
    outcomes
}

/// Decode the current session and store it.
pub(crate) async fn submit_entry(state: &AppState) -> Result<ObservationRecord> {
    let observation = state.entry.submit().await?;
    let record = state.db.insert_observation(&observation).await?;
    info!("Stored observation {} ({})", record.id, record.code.trim_end());
    Ok(record)
}

pub(crate) async fn handle_line(state: &AppState, line: &str) -> Result<LineResult> {
    match LineCommand::parse(line) {
        LineCommand::Submit => submit_entry(state).await.map(LineResult::Stored),
        LineCommand::Cancel => {
            state.entry.cancel().await;
            Ok(LineResult::Cancelled(state.entry.snapshot().await))
        }
        LineCommand::Keys(keys) => {
            let outcomes = type_keys(&state.entry, &keys).await;
            Ok(LineResult::Typed {
                outcomes,
                snapshot: state.entry.snapshot().await,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_control_lines() {
        assert_eq!(LineCommand::parse("\n"), LineCommand::Submit);
        assert_eq!(LineCommand::parse("!\r\n"), LineCommand::Cancel);
        assert_eq!(
            LineCommand::parse("44 1<"),
            LineCommand::Keys("44 1<".into())
        );
    }
}
