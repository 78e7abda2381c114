//! Finished buffer to [`Observation`].
//!
//! Decoding only reshapes the text. Range checks already happened keystroke
//! by keystroke, so any placeholder decodes to a sentinel and anything
//! unparseable does too; the decoder never panics on hand-built input.

use thiserror::Error;

use crate::models::{
    observation::observer_number, Observation, PRECIPITATION_OCCURRED, UNSPECIFIED,
};

use super::layout::{
    Field, MANDATORY_LEN, PILLAR_END, PILLAR_START, REMARKS_MAX, SECTOR_END, SECTOR_START,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("input incomplete: {len} of 30 mandatory characters")]
    Incomplete { len: usize },
}

pub fn decode(code: &str) -> Result<Observation, DecodeError> {
    let len = code.chars().count();
    if len < MANDATORY_LEN || !code.is_char_boundary(MANDATORY_LEN) {
        return Err(DecodeError::Incomplete { len });
    }

    let value = |field: Field| numeric(field.slice(code));
    let has_pillar = code.get(PILLAR_START..PILLAR_END).is_some_and(|block| block.starts_with('8'));
    let pillar = |field: Field| if has_pillar { value(field) } else { UNSPECIFIED };

    Ok(Observation {
        observer: Field::Observer
            .slice(code)
            .and_then(observer_number)
            .unwrap_or(UNSPECIFIED),
        object: value(Field::Object),
        year: value(Field::Year),
        month: value(Field::Month),
        day: value(Field::Day),
        site: value(Field::Site),
        hour: value(Field::Hour),
        minute: value(Field::Minute),
        cirrus_density: value(Field::CirrusDensity),
        duration: value(Field::Duration),
        cloud_cover: value(Field::CloudCover),
        cirrus_type: value(Field::CirrusType),
        low_clouds: value(Field::LowClouds),
        halo_type: value(Field::HaloType),
        brightness: value(Field::Brightness),
        color: value(Field::Color),
        completeness: value(Field::Completeness),
        weather_front: value(Field::WeatherFront),
        precipitation: precipitation(Field::Precipitation.slice(code)),
        region: value(Field::Region),
        pillar_upper: pillar(Field::PillarUpper),
        pillar_lower: pillar(Field::PillarLower),
        sectors: sectors(code),
        remarks: remarks(code),
    })
}

fn numeric(raw: Option<&str>) -> i16 {
    raw.filter(|text| text.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|text| text.parse().ok())
        .unwrap_or(UNSPECIFIED)
}

fn precipitation(raw: Option<&str>) -> i16 {
    match raw {
        Some("//") => PRECIPITATION_OCCURRED,
        other => numeric(other),
    }
}

fn sectors(code: &str) -> String {
    let block = match code.get(SECTOR_START..) {
        Some(rest) => rest.chars().take(SECTOR_END - SECTOR_START).collect::<String>(),
        None => return String::new(),
    };
    block.split(' ').next().unwrap_or_default().to_string()
}

fn remarks(code: &str) -> String {
    code.get(SECTOR_END..)
        .map(|rest| rest.trim().chars().take(REMARKS_MAX).collect())
        .unwrap_or_default()
}
