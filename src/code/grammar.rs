//! Per-position grammar of the short-entry code.
//!
//! Positions 0-29 are driven by a slot table; the pillar, sector and remark
//! blocks are dispatched by offset.

use std::collections::HashSet;

use super::{
    autofill::{pillar_template, USER_SLOT},
    layout::{
        days_in_month, region_is_valid, sectors_editable, Field, MANDATORY_LEN, MAX_LEN,
        PILLAR_END, PILLAR_START, SECTOR_END, SECTOR_START,
    },
    sector,
};

/// Decision for one candidate character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
    /// The observer code is unknown; everything typed so far is void.
    ResetAll,
    /// A completed two-digit field is out of range; drop this many characters.
    Backtrack(usize),
}

impl Verdict {
    fn accept_if(ok: bool) -> Self {
        if ok {
            Verdict::Accept
        } else {
            Verdict::Reject
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PairCheck {
    Any,
    Range(u8, u8),
    DayOfMonth,
    HaloType,
    Region,
}

impl PairCheck {
    fn passes(self, value: u8, prefix: &str) -> bool {
        match self {
            PairCheck::Any => true,
            PairCheck::Range(lo, hi) => (lo..=hi).contains(&value),
            PairCheck::DayOfMonth => Field::Month
                .number(prefix)
                .is_some_and(|month| (1..=days_in_month(month)).contains(&value)),
            PairCheck::HaloType => (1..=77).contains(&value) || value == 99,
            PairCheck::Region => region_is_valid(value),
        }
    }
}

/// Two-character field. `slashes`/`blanks` admit `//` and two spaces as
/// whole-field placeholders; a placeholder never mixes with a digit.
#[derive(Debug)]
struct PairRule {
    slashes: bool,
    blanks: bool,
    check: PairCheck,
    backtrack: usize,
}

const fn pair(check: PairCheck) -> PairRule {
    PairRule {
        slashes: false,
        blanks: false,
        check,
        backtrack: 1,
    }
}

const fn optional_pair(check: PairCheck) -> PairRule {
    PairRule {
        slashes: true,
        blanks: false,
        check,
        backtrack: 1,
    }
}

const YEAR: PairRule = pair(PairCheck::Any);
const MONTH: PairRule = pair(PairCheck::Range(1, 12));
const DAY: PairRule = pair(PairCheck::DayOfMonth);
const HOUR: PairRule = optional_pair(PairCheck::Range(0, 23));
const MINUTE: PairRule = optional_pair(PairCheck::Range(0, 59));
const DURATION: PairRule = optional_pair(PairCheck::Any);
const HALO_TYPE: PairRule = pair(PairCheck::HaloType);
const PRECIPITATION: PairRule = PairRule {
    slashes: true,
    blanks: true,
    check: PairCheck::Any,
    backtrack: 1,
};
const REGION: PairRule = PairRule {
    slashes: false,
    blanks: false,
    check: PairCheck::Region,
    backtrack: 2,
};
const PILLAR: PairRule = optional_pair(PairCheck::Range(1, 90));

#[derive(Debug, Clone, Copy)]
enum Slot {
    One(&'static str),
    ObserverLead,
    ObserverTrail,
    Lead(&'static PairRule),
    Trail(&'static PairRule),
}

const DIGIT_OR_SLASH: &str = "0123456789/";

const SLOTS: [Slot; MANDATORY_LEN] = [
    Slot::ObserverLead,
    Slot::ObserverTrail,
    Slot::One("12345"),
    Slot::Lead(&YEAR),
    Slot::Trail(&YEAR),
    Slot::Lead(&MONTH),
    Slot::Trail(&MONTH),
    Slot::Lead(&DAY),
    Slot::Trail(&DAY),
    Slot::One("012"),
    Slot::Lead(&HOUR),
    Slot::Trail(&HOUR),
    Slot::Lead(&MINUTE),
    Slot::Trail(&MINUTE),
    Slot::One("0124567/"),
    Slot::Lead(&DURATION),
    Slot::Trail(&DURATION),
    Slot::One(DIGIT_OR_SLASH),
    Slot::One(DIGIT_OR_SLASH),
    Slot::One(DIGIT_OR_SLASH),
    Slot::Lead(&HALO_TYPE),
    Slot::Trail(&HALO_TYPE),
    Slot::One("0123/"),
    Slot::One("012345/"),
    Slot::One("12/"),
    Slot::One("012345678 "),
    Slot::Lead(&PRECIPITATION),
    Slot::Trail(&PRECIPITATION),
    Slot::Lead(&REGION),
    Slot::Trail(&REGION),
];

fn lead(rule: &PairRule, ch: char) -> Verdict {
    Verdict::accept_if(
        ch.is_ascii_digit() || (rule.slashes && ch == '/') || (rule.blanks && ch == ' '),
    )
}

fn trail(rule: &PairRule, prefix: &str, ch: char) -> Verdict {
    let Some(first) = prefix.chars().last() else {
        return Verdict::Reject;
    };
    match (first, ch) {
        ('/', '/') if rule.slashes => Verdict::Accept,
        (' ', ' ') if rule.blanks => Verdict::Accept,
        (a, b) if a.is_ascii_digit() && b.is_ascii_digit() => {
            let value = (a as u8 - b'0') * 10 + (b as u8 - b'0');
            if rule.check.passes(value, prefix) {
                Verdict::Accept
            } else {
                Verdict::Backtrack(rule.backtrack)
            }
        }
        _ => Verdict::Reject,
    }
}

/// Validation table plus the set of observer codes the session may use.
#[derive(Debug, Clone, Default)]
pub struct FieldGrammar {
    known_observers: HashSet<String>,
}

impl FieldGrammar {
    pub fn new<I, S>(known_observers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            known_observers: known_observers
                .into_iter()
                .map(|code| code.as_ref().trim().to_ascii_uppercase())
                .collect(),
        }
    }

    pub fn knows(&self, code: &str) -> bool {
        self.known_observers.contains(&code.to_ascii_uppercase())
    }

    /// Decide whether `ch` may follow `prefix`. `prefix` must itself satisfy
    /// the grammar at every length.
    pub fn verdict(&self, prefix: &str, len: usize, ch: char) -> Verdict {
        if len >= MAX_LEN {
            return Verdict::Reject;
        }
        if len < MANDATORY_LEN {
            return self.slot_verdict(prefix, len, ch);
        }
        if len < PILLAR_END {
            return pillar_verdict(prefix, len, ch);
        }
        if len < SECTOR_END {
            return sector_verdict(prefix, len, ch);
        }
        Verdict::accept_if(!ch.is_control())
    }

    fn slot_verdict(&self, prefix: &str, len: usize, ch: char) -> Verdict {
        match SLOTS[len] {
            Slot::One(alphabet) => Verdict::accept_if(alphabet.contains(ch)),
            Slot::ObserverLead => {
                Verdict::accept_if(ch.is_ascii_digit() || ch.is_ascii_uppercase())
            }
            Slot::ObserverTrail => {
                if !ch.is_ascii_digit() {
                    return Verdict::Reject;
                }
                let code: String = prefix.chars().chain(std::iter::once(ch)).collect();
                if self.knows(&code) {
                    Verdict::Accept
                } else {
                    Verdict::ResetAll
                }
            }
            Slot::Lead(rule) => lead(rule, ch),
            Slot::Trail(rule) => trail(rule, prefix, ch),
        }
    }
}

fn pillar_verdict(prefix: &str, len: usize, ch: char) -> Verdict {
    let template = pillar_template(Field::HaloType.number(prefix));
    let expected = template.as_bytes()[len - PILLAR_START];
    if expected != USER_SLOT {
        return Verdict::accept_if(ch == expected as char);
    }
    // HO at 31-32, HU at 33-34.
    if (len - PILLAR_START) % 2 == 1 {
        lead(&PILLAR, ch)
    } else {
        trail(&PILLAR, prefix, ch)
    }
}

fn sector_verdict(prefix: &str, len: usize, ch: char) -> Verdict {
    let block = prefix.get(SECTOR_START..).unwrap_or("");
    if !sectors_editable(prefix) || block.contains(' ') {
        return Verdict::accept_if(ch == ' ');
    }
    if ch == ' ' {
        return Verdict::accept_if(sector::can_terminate(len - SECTOR_START));
    }
    let mut candidate = block.to_string();
    candidate.push(ch);
    Verdict::accept_if(sector::check(&candidate).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> FieldGrammar {
        FieldGrammar::new(["44", "07", "A3"])
    }

    /// Run `text` through the grammar, returning the verdict of the first
    /// character that is not accepted.
    fn feed(grammar: &FieldGrammar, text: &str) -> Result<(), (usize, Verdict)> {
        let mut prefix = String::new();
        for (len, ch) in text.chars().enumerate() {
            match grammar.verdict(&prefix, len, ch) {
                Verdict::Accept => prefix.push(ch),
                other => return Err((len, other)),
            }
        }
        Ok(())
    }

    #[test]
    fn accepts_a_full_prefix() {
        assert_eq!(feed(&grammar(), "44125061201230110633120122//17"), Ok(()));
    }

    #[test]
    fn unknown_observer_resets() {
        assert_eq!(feed(&grammar(), "45"), Err((1, Verdict::ResetAll)));
        assert_eq!(feed(&grammar(), "a3"), Err((0, Verdict::Reject)));
        assert_eq!(feed(&grammar(), "A3"), Ok(()));
    }

    #[test]
    fn month_out_of_range_backtracks_one() {
        assert_eq!(feed(&grammar(), "441251"), Ok(()));
        assert_eq!(feed(&grammar(), "4412513"), Err((6, Verdict::Backtrack(1))));
        assert_eq!(feed(&grammar(), "4412500"), Err((6, Verdict::Backtrack(1))));
    }

    #[test]
    fn february_allows_29_but_not_30() {
        assert_eq!(feed(&grammar(), "441250229"), Ok(()));
        assert_eq!(feed(&grammar(), "441230229"), Ok(()));
        assert_eq!(feed(&grammar(), "441250230"), Err((8, Verdict::Backtrack(1))));
        assert_eq!(feed(&grammar(), "441250431"), Err((8, Verdict::Backtrack(1))));
    }

    #[test]
    fn hour_accepts_slash_pair_only_whole() {
        assert_eq!(feed(&grammar(), "4412506120//"), Ok(()));
        assert_eq!(feed(&grammar(), "4412506120/5"), Err((11, Verdict::Reject)));
        assert_eq!(feed(&grammar(), "44125061205/"), Err((11, Verdict::Reject)));
        assert_eq!(feed(&grammar(), "441250612024"), Err((11, Verdict::Backtrack(1))));
    }

    #[test]
    fn cirrus_density_excludes_three() {
        assert_eq!(feed(&grammar(), "441250612012300"), Ok(()));
        assert_eq!(feed(&grammar(), "441250612012303"), Err((14, Verdict::Reject)));
    }

    #[test]
    fn halo_type_range() {
        let base = "44125061201230110633";
        assert_eq!(feed(&grammar(), &format!("{base}77")), Ok(()));
        assert_eq!(feed(&grammar(), &format!("{base}99")), Ok(()));
        assert_eq!(
            feed(&grammar(), &format!("{base}78")),
            Err((21, Verdict::Backtrack(1)))
        );
        assert_eq!(
            feed(&grammar(), &format!("{base}00")),
            Err((21, Verdict::Backtrack(1)))
        );
    }

    #[test]
    fn precipitation_placeholders() {
        let base = "44125061201230110633120122";
        assert_eq!(feed(&grammar(), &format!("{base}//")), Ok(()));
        assert_eq!(feed(&grammar(), &format!("{base}  ")), Ok(()));
        assert_eq!(feed(&grammar(), &format!("{base}99")), Ok(()));
        assert_eq!(feed(&grammar(), &format!("{base}/ ")), Err((27, Verdict::Reject)));
        assert_eq!(feed(&grammar(), &format!("{base} 1")), Err((27, Verdict::Reject)));
    }

    #[test]
    fn excluded_region_backtracks_two() {
        let base = "44125061201230110633120122//";
        assert_eq!(feed(&grammar(), &format!("{base}17")), Ok(()));
        assert_eq!(
            feed(&grammar(), &format!("{base}18")),
            Err((29, Verdict::Backtrack(2)))
        );
        assert_eq!(
            feed(&grammar(), &format!("{base}40")),
            Err((29, Verdict::Backtrack(2)))
        );
    }

    #[test]
    fn pillar_block_follows_halo_type() {
        // EE=08: HO typed, HU fixed to slashes.
        let upper = "44125061201230110633080122//17";
        assert_eq!(feed(&grammar(), &format!("{upper}825//")), Ok(()));
        assert_eq!(feed(&grammar(), &format!("{upper}82512")), Err((33, Verdict::Reject)));
        assert_eq!(
            feed(&grammar(), &format!("{upper}891")),
            Err((32, Verdict::Backtrack(1)))
        );
        // EE=09: HO fixed, HU typed.
        let lower = "44125061201230110633090122//17";
        assert_eq!(feed(&grammar(), &format!("{lower}8//40")), Ok(()));
        assert_eq!(feed(&grammar(), &format!("{lower}84")), Err((31, Verdict::Reject)));
        // Anything else: all slashes.
        let other = "44125061201230110633220122//17";
        assert_eq!(feed(&grammar(), &format!("{other}8////")), Ok(()));
        assert_eq!(feed(&grammar(), &format!("{other}81")), Err((31, Verdict::Reject)));
    }

    #[test]
    fn sector_block_only_for_incomplete_circular_halos() {
        // EE=01 V=1: editable.
        let circular = "44125061201230110633010112//178////";
        assert_eq!(feed(&grammar(), &format!("{circular}a-b")), Ok(()));
        assert_eq!(feed(&grammar(), &format!("{circular}a-c")), Err((37, Verdict::Reject)));
        assert_eq!(feed(&grammar(), &format!("{circular}a/c")), Ok(()));
        assert_eq!(feed(&grammar(), &format!("{circular}a/b")), Err((37, Verdict::Reject)));
        assert_eq!(feed(&grammar(), &format!("{circular} ")), Err((35, Verdict::Reject)));
        // Terminated block only takes padding.
        assert_eq!(feed(&grammar(), &format!("{circular}a  ")), Ok(()));
        assert_eq!(feed(&grammar(), &format!("{circular}a b")), Err((37, Verdict::Reject)));
        // EE=01 V=2: padding only.
        let complete = "44125061201230110633010122//178////";
        assert_eq!(feed(&grammar(), &format!("{complete}a")), Err((35, Verdict::Reject)));
        assert_eq!(feed(&grammar(), &format!("{complete}   ")), Ok(()));
    }

    #[test]
    fn remarks_take_printable_text_up_to_capacity() {
        let mut prefix = String::from("44125061201230110633220122//178////");
        prefix.push_str(&" ".repeat(15));
        let g = grammar();
        assert_eq!(g.verdict(&prefix, 50, 'ä'), Verdict::Accept);
        assert_eq!(g.verdict(&prefix, 50, '\n'), Verdict::Reject);
        assert_eq!(g.verdict(&prefix, MAX_LEN, 'x'), Verdict::Reject);
    }
}
