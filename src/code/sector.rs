//! Circular-halo sector notation: letters `a`-`h` at even offsets, separators
//! at odd offsets. `-` asserts the next letter is the cyclic successor of the
//! previous one, `/` asserts it is not. A space after a letter ends the field.
//!
//! Shared by the numeric short entry and the labeled-field form.

use thiserror::Error;

use super::layout::SECTOR_LEN;

const LETTERS: &[u8; 8] = b"abcdefgh";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectorError {
    #[error("only letters a-h are allowed, got '{0}'")]
    NotASector(char),
    #[error("letter '{0}' already used")]
    LetterReused(char),
    #[error("after '{prev}-' expected '{expected}'")]
    SuccessorRequired { prev: char, expected: char },
    #[error("after '{prev}/' cannot use '{successor}'")]
    SuccessorForbidden { prev: char, successor: char },
    #[error("only '-' or '/' allowed as separator, got '{0}'")]
    BadSeparator(char),
    #[error("space only allowed after a letter")]
    MisplacedSpace,
    #[error("sector notation longer than 15 characters")]
    TooLong,
}

/// Result of a successful check: the accepted notation and whether a
/// terminating space was seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorCheck {
    pub notation: String,
    pub terminated: bool,
}

fn index_of(letter: char) -> Option<usize> {
    LETTERS.iter().position(|&b| b as char == letter)
}

fn successor(letter: char) -> Option<char> {
    index_of(letter).map(|idx| LETTERS[(idx + 1) % LETTERS.len()] as char)
}

/// Incremental state over accepted sector characters.
#[derive(Debug, Default, Clone)]
struct SectorState {
    accepted: String,
    used: [bool; 8],
}

impl SectorState {
    fn push(&mut self, raw: char) -> Result<bool, SectorError> {
        let ch = raw.to_ascii_lowercase();
        let count = self.accepted.len();

        if ch == ' ' {
            return if count % 2 == 1 {
                Ok(true)
            } else {
                Err(SectorError::MisplacedSpace)
            };
        }

        if count >= SECTOR_LEN {
            return Err(SectorError::TooLong);
        }

        if count % 2 == 1 {
            if ch != '-' && ch != '/' {
                return Err(SectorError::BadSeparator(ch));
            }
            self.accepted.push(ch);
            return Ok(false);
        }

        let idx = index_of(ch).ok_or(SectorError::NotASector(ch))?;
        if self.used[idx] {
            return Err(SectorError::LetterReused(ch));
        }

        let bytes = self.accepted.as_bytes();
        if count >= 2 {
            let separator = bytes[count - 1] as char;
            let prev = bytes[count - 2] as char;
            if let Some(next) = successor(prev) {
                match separator {
                    '-' if ch != next => {
                        return Err(SectorError::SuccessorRequired {
                            prev,
                            expected: next,
                        })
                    }
                    '/' if ch == next => {
                        return Err(SectorError::SuccessorForbidden {
                            prev,
                            successor: next,
                        })
                    }
                    _ => {}
                }
            }
        }

        self.used[idx] = true;
        self.accepted.push(ch);
        Ok(false)
    }
}

/// Strict check: the first offending character fails the whole value.
/// Characters after a terminating space are not inspected.
pub fn check(value: &str) -> Result<SectorCheck, SectorError> {
    let mut state = SectorState::default();
    for ch in value.chars() {
        if state.push(ch)? {
            return Ok(SectorCheck {
                notation: state.accepted,
                terminated: true,
            });
        }
    }
    Ok(SectorCheck {
        notation: state.accepted,
        terminated: false,
    })
}

/// Lenient variant for free-form fields: offending characters are dropped.
pub fn clean(value: &str) -> String {
    let mut state = SectorState::default();
    for ch in value.chars() {
        match state.push(ch) {
            Ok(true) => break,
            Ok(false) | Err(_) => {}
        }
    }
    state.accepted
}

/// Whether a terminating space is legal after `accepted` sector characters.
pub fn can_terminate(accepted: usize) -> bool {
    accepted % 2 == 1
}
