use serde::Serialize;

use crate::{log_debug, log_info};

use super::{
    autofill::{next_fill, region_digits, Fill, RegionRequest},
    buffer::InputBuffer,
    grammar::{FieldGrammar, Verdict},
    layout::{Field, REGION_TRIGGER_LEN, SECTOR_END, SECTOR_START},
};

const ENABLE_LOGS: bool = false;

/// Result of offering one character to the validator. The caller's buffer is
/// never touched; `Accepted` carries the successor buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keystroke {
    Accepted(Accepted),
    Rejected,
    /// Unknown observer code: discard the whole buffer.
    ResetAll,
    /// A completed two-digit field is out of range. Apply with
    /// [`InputBuffer::after_backtrack`].
    Backtrack(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Accepted {
    pub buffer: InputBuffer,
    /// Characters injected after the keystroke.
    pub autofilled: String,
    /// Set when GG should come from the observer directory before any
    /// further input is applied.
    pub region_request: Option<RegionRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct IncrementalValidator {
    grammar: FieldGrammar,
}

impl IncrementalValidator {
    pub fn new(grammar: FieldGrammar) -> Self {
        Self { grammar }
    }

    pub fn try_append(&self, buffer: &InputBuffer, ch: char) -> Keystroke {
        let len = buffer.len();
        let ch = normalize(len, ch);

        match self.grammar.verdict(buffer.as_str(), len, ch) {
            Verdict::Accept => {
                let mut next = buffer.clone();
                next.push(ch);
                Keystroke::Accepted(self.settle(next, String::new()))
            }
            Verdict::Reject => Keystroke::Rejected,
            Verdict::ResetAll => {
                log_info!("unknown observer code, resetting entry");
                Keystroke::ResetAll
            }
            Verdict::Backtrack(dropped) => {
                log_debug!(
                    "{} out of range at offset {len}, dropping {dropped}",
                    Field::at(len).map_or("?", |field| field.mnemonic())
                );
                Keystroke::Backtrack(dropped)
            }
        }
    }

    /// Complete a pending region lookup. `None` (not found, failed, timed
    /// out) or a region the grammar refuses leaves GG for manual entry.
    pub fn apply_region(&self, buffer: &InputBuffer, region: Option<u8>) -> Option<Accepted> {
        if buffer.len() != REGION_TRIGGER_LEN {
            return None;
        }
        let digits = region_digits(region?);
        let mut next = buffer.clone();
        for ch in digits.chars() {
            if self.grammar.verdict(next.as_str(), next.len(), ch) != Verdict::Accept {
                log_info!("region {digits} from directory rejected, GG left for manual entry");
                return None;
            }
            next.push(ch);
        }
        Some(self.settle(next, digits))
    }

    /// Build a session's opening buffer from `code` (the fixed observer).
    /// Anything the grammar refuses yields an empty buffer.
    pub fn seed(&self, code: &str) -> InputBuffer {
        let mut buffer = InputBuffer::new();
        for ch in code.trim().chars() {
            match self.try_append(&buffer, ch) {
                Keystroke::Accepted(accepted) => buffer = accepted.buffer,
                _ => return InputBuffer::new(),
            }
        }
        buffer
    }

    /// Run auto-fill until it goes idle or asks for a region.
    fn settle(&self, mut buffer: InputBuffer, mut autofilled: String) -> Accepted {
        loop {
            match next_fill(&buffer) {
                Fill::Append(chars) => {
                    let before = buffer.len();
                    for ch in chars.chars() {
                        let verdict = self.grammar.verdict(buffer.as_str(), buffer.len(), ch);
                        if verdict != Verdict::Accept {
                            break;
                        }
                        buffer.push(ch);
                        autofilled.push(ch);
                    }
                    if buffer.len() == before {
                        break;
                    }
                }
                Fill::LookupRegion(request) => {
                    return Accepted {
                        buffer,
                        autofilled,
                        region_request: Some(request),
                    };
                }
                Fill::Idle => break,
            }
        }
        Accepted {
            buffer,
            autofilled,
            region_request: None,
        }
    }
}

fn normalize(len: usize, ch: char) -> char {
    if Field::Observer.span().contains(&len) {
        ch.to_ascii_uppercase()
    } else if (SECTOR_START..SECTOR_END).contains(&len) {
        ch.to_ascii_lowercase()
    } else {
        ch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> IncrementalValidator {
        IncrementalValidator::new(FieldGrammar::new(["44", "A3"]))
    }

    fn type_all(validator: &IncrementalValidator, text: &str) -> InputBuffer {
        let mut buffer = InputBuffer::new();
        for ch in text.chars() {
            match validator.try_append(&buffer, ch) {
                Keystroke::Accepted(accepted) => buffer = accepted.buffer,
                other => panic!("'{ch}' after {buffer:?}: {other:?}"),
            }
        }
        buffer
    }

    #[test]
    fn rejected_character_leaves_buffer_alone() {
        let v = validator();
        let buffer = type_all(&v, "44");
        assert_eq!(v.try_append(&buffer, '6'), Keystroke::Rejected);
        assert_eq!(v.try_append(&buffer, '/'), Keystroke::Rejected);
        assert_eq!(buffer.as_str(), "44");
    }

    #[test]
    fn observer_code_is_uppercased() {
        let v = validator();
        assert_eq!(type_all(&v, "a3").as_str(), "A3");
    }

    #[test]
    fn unknown_observer_resets() {
        let v = validator();
        let buffer = type_all(&v, "4");
        assert_eq!(v.try_append(&buffer, '5'), Keystroke::ResetAll);
    }

    #[test]
    fn month_thirteen_backtracks_to_first_digit() {
        let v = validator();
        let buffer = type_all(&v, "441251");
        let Keystroke::Backtrack(dropped) = v.try_append(&buffer, '3') else {
            panic!("expected backtrack");
        };
        assert_eq!(buffer.after_backtrack(dropped).as_str(), "441251");
    }

    #[test]
    fn registered_site_requests_region() {
        let v = validator();
        let buffer = type_all(&v, "44125061201230110633120122/");
        let Keystroke::Accepted(accepted) = v.try_append(&buffer, '/') else {
            panic!("expected accept");
        };
        assert_eq!(accepted.buffer.len(), REGION_TRIGGER_LEN);
        assert!(accepted.region_request.is_some());

        let filled = v.apply_region(&accepted.buffer, Some(17)).unwrap();
        // EE=12 has no pillar and V=2 has no sectors.
        assert_eq!(
            filled.buffer.as_str(),
            format!("44125061201230110633120122//178////{}", " ".repeat(15))
        );
        assert_eq!(filled.autofilled, format!("178////{}", " ".repeat(15)));
    }

    #[test]
    fn failed_lookup_leaves_region_manual() {
        let v = validator();
        let buffer = type_all(&v, "44125061201230110633120122//");
        assert_eq!(v.apply_region(&buffer, None), None);
        assert_eq!(v.apply_region(&buffer, Some(18)), None);
        let typed = type_all(&v, "44125061201230110633120122//17");
        assert_eq!(typed.len(), 50);
    }

    #[test]
    fn sector_letters_are_lowercased() {
        let v = validator();
        let buffer = type_all(&v, "44125061211230110633010112//17A-B");
        assert!(buffer.as_str().ends_with("a-b"));
    }

    #[test]
    fn seed_accepts_known_code_only() {
        let v = validator();
        assert_eq!(v.seed("44").as_str(), "44");
        assert_eq!(v.seed("45").as_str(), "");
        assert_eq!(v.seed("").as_str(), "");
    }
}
