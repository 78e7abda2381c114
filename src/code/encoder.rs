//! [`Observation`] back to its short-entry code.

use crate::models::{Observation, PRECIPITATION_OCCURRED, UNSPECIFIED};

use super::{
    autofill::{pillar_template, USER_SLOT},
    layout::{REMARKS_MAX, SECTOR_LEN},
    sector,
};

pub fn encode(obs: &Observation) -> String {
    let mut code = String::with_capacity(64);

    code.push_str(&obs.observer_code());
    push_digit(&mut code, obs.object);
    push_pair(&mut code, obs.year);
    push_pair(&mut code, obs.month);
    push_pair(&mut code, obs.day);
    push_digit(&mut code, obs.site);
    push_pair(&mut code, obs.hour);
    push_pair(&mut code, obs.minute);
    push_digit(&mut code, obs.cirrus_density);
    push_pair(&mut code, obs.duration);
    push_digit(&mut code, obs.cloud_cover);
    push_digit(&mut code, obs.cirrus_type);
    push_digit(&mut code, obs.low_clouds);
    push_pair(&mut code, obs.halo_type);
    push_digit(&mut code, obs.brightness);
    push_digit(&mut code, obs.color);
    push_digit(&mut code, obs.completeness);
    match obs.weather_front {
        UNSPECIFIED => code.push(' '),
        front => push_digit(&mut code, front),
    }
    match obs.precipitation {
        UNSPECIFIED => code.push_str("  "),
        PRECIPITATION_OCCURRED => code.push_str("//"),
        hours => push_pair(&mut code, hours),
    }
    push_pair(&mut code, obs.region);

    code.push_str(&pillar_block(obs));

    let sectors = sector::clean(&obs.sectors);
    code.push_str(&format!("{sectors:<width$}", width = SECTOR_LEN));
    code.extend(obs.remarks.trim().chars().take(REMARKS_MAX));
    code
}

fn push_digit(code: &mut String, value: i16) {
    match u32::try_from(value).ok().and_then(|v| char::from_digit(v, 10)) {
        Some(digit) => code.push(digit),
        None => code.push('/'),
    }
}

fn push_pair(code: &mut String, value: i16) {
    if (0..100).contains(&value) {
        code.push_str(&format!("{value:02}"));
    } else {
        code.push_str("//");
    }
}

fn pillar_block(obs: &Observation) -> String {
    let mut typed = String::new();
    push_pair(&mut typed, obs.pillar_upper);
    push_pair(&mut typed, obs.pillar_lower);
    let typed: Vec<char> = typed.chars().collect();

    // Template offset 1-2 is HO, 3-4 is HU.
    pillar_template(u8::try_from(obs.halo_type).ok())
        .char_indices()
        .map(|(idx, slot)| match idx.checked_sub(1).and_then(|at| typed.get(at)) {
            Some(&digit) if slot == USER_SLOT as char => digit,
            _ => slot,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::decoder::decode;

    #[test]
    fn decoded_codes_encode_back() {
        let codes = [
            format!("44125061201230110633120122//178////{}", " ".repeat(15)),
            format!("44125061201230110633080122//17825//{}", " ".repeat(15)),
            format!("44125061201230110633090122//178//40{}", " ".repeat(15)),
            format!("44125061201230110633100122  1783340{}some text", " ".repeat(15)),
            format!("A3125061201230110633010112//178////a-b/d{}x", " ".repeat(10)),
            format!("4412506120////////3122/12   178////{}", " ".repeat(15)),
        ];
        for code in codes {
            let obs = decode(&code).unwrap();
            assert_eq!(encode(&obs), code);
        }
    }

    #[test]
    fn unspecified_front_is_blank() {
        let obs = Observation {
            weather_front: UNSPECIFIED,
            precipitation: UNSPECIFIED,
            ..Observation::default()
        };
        let code = encode(&obs);
        assert_eq!(&code[25..28], "   ");
    }

    #[test]
    fn unspecified_observer_keeps_the_layout() {
        let code = encode(&Observation::default());
        assert_eq!(code.len(), 50);
        assert_eq!(&code[..5], "/////");
        assert_eq!(&code[30..35], "8////");
        assert_eq!(decode(&code).unwrap().observer, UNSPECIFIED);
    }

    #[test]
    fn hand_built_sectors_are_cleaned() {
        let obs = Observation {
            halo_type: 1,
            sectors: "A-C-b/x/d".into(),
            ..Observation::default()
        };
        let code = encode(&obs);
        assert_eq!(code[35..50].trim_end(), "a-b/d");
    }
}
