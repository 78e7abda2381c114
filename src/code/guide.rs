//! Echo line shown under the entry field.

use serde::Serialize;

use super::layout::{MAX_LEN, PILLAR_END, SECTOR_END};

/// Entered text grouped for reading, plus the column of the next position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Guide {
    pub entered: String,
    pub caret: usize,
}

impl Guide {
    pub fn render(code: &str) -> Self {
        let mut entered = String::new();
        for (idx, ch) in code.chars().take(MAX_LEN).enumerate() {
            entered.push(ch);
            // Groups of five through the pillar block, then one gap after
            // the pillar and one after the sectors.
            if (idx + 1) % 5 == 0 && idx + 1 < PILLAR_END {
                entered.push(' ');
            }
            if idx + 1 == PILLAR_END || idx + 1 == SECTOR_END {
                entered.push(' ');
            }
        }
        let caret = entered.chars().count();
        Self { entered, caret }
    }

    pub fn caret_line(&self) -> String {
        format!("{}^", " ".repeat(self.caret))
    }
}

impl std::fmt::Display for Guide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.entered)?;
        write!(f, "{}", self.caret_line())
    }
}
