use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};

use crate::{
    code::encode,
    db::{
        connection::Database,
        helpers::{parse_datetime, to_i16},
    },
    models::{Observation, ObservationRecord},
};

const COLUMNS: &str = "id, code, observer, object, year, month, day, site, hour, minute,
    cirrus_density, duration, cloud_cover, cirrus_type, low_clouds, halo_type, brightness,
    color, completeness, weather_front, precipitation, region, pillar_upper, pillar_lower,
    sectors, remarks, recorded_at";

fn row_to_record(row: &Row) -> Result<ObservationRecord> {
    let number = |column: &str| -> Result<i16> { to_i16(row.get(column)?, column) };
    let recorded_at: String = row.get("recorded_at")?;

    Ok(ObservationRecord {
        id: row.get("id")?,
        code: row.get("code")?,
        recorded_at: parse_datetime(&recorded_at, "recorded_at")?,
        observation: Observation {
            observer: number("observer")?,
            object: number("object")?,
            year: number("year")?,
            month: number("month")?,
            day: number("day")?,
            site: number("site")?,
            hour: number("hour")?,
            minute: number("minute")?,
            cirrus_density: number("cirrus_density")?,
            duration: number("duration")?,
            cloud_cover: number("cloud_cover")?,
            cirrus_type: number("cirrus_type")?,
            low_clouds: number("low_clouds")?,
            halo_type: number("halo_type")?,
            brightness: number("brightness")?,
            color: number("color")?,
            completeness: number("completeness")?,
            weather_front: number("weather_front")?,
            precipitation: number("precipitation")?,
            region: number("region")?,
            pillar_upper: number("pillar_upper")?,
            pillar_lower: number("pillar_lower")?,
            sectors: row.get("sectors")?,
            remarks: row.get("remarks")?,
        },
    })
}

impl Database {
    pub async fn insert_observation(&self, observation: &Observation) -> Result<ObservationRecord> {
        let record = ObservationRecord {
            id: uuid::Uuid::new_v4().to_string(),
            code: encode(observation),
            recorded_at: Utc::now(),
            observation: observation.clone(),
        };
        let stored = record.clone();

        self.execute(move |conn| {
            let obs = &record.observation;
            conn.execute(
                &format!(
                    "INSERT INTO observations ({COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                             ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27)"
                ),
                params![
                    record.id,
                    record.code,
                    obs.observer,
                    obs.object,
                    obs.year,
                    obs.month,
                    obs.day,
                    obs.site,
                    obs.hour,
                    obs.minute,
                    obs.cirrus_density,
                    obs.duration,
                    obs.cloud_cover,
                    obs.cirrus_type,
                    obs.low_clouds,
                    obs.halo_type,
                    obs.brightness,
                    obs.color,
                    obs.completeness,
                    obs.weather_front,
                    obs.precipitation,
                    obs.region,
                    obs.pillar_upper,
                    obs.pillar_lower,
                    obs.sectors,
                    obs.remarks,
                    record.recorded_at.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert observation")?;
            Ok(())
        })
        .await?;

        Ok(stored)
    }

    /// All observations, oldest sighting first.
    pub async fn list_observations(&self) -> Result<Vec<ObservationRecord>> {
        let mut records = self
            .execute(|conn| {
                let mut stmt = conn.prepare(&format!("SELECT {COLUMNS} FROM observations"))?;
                let mut rows = stmt.query([])?;
                let mut records = Vec::new();
                while let Some(row) = rows.next()? {
                    records.push(row_to_record(row)?);
                }
                Ok(records)
            })
            .await?;

        records.sort_by(|a, b| a.observation.chronological_cmp(&b.observation));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::decode;

    #[tokio::test]
    async fn stores_and_lists_chronologically() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("halo.sqlite3")).unwrap();

        let later = decode("44125061201230110633120122//17").unwrap();
        let earlier = decode("4419912312////0/////080122//178////").unwrap();
        let stored = db.insert_observation(&later).await.unwrap();
        db.insert_observation(&earlier).await.unwrap();

        assert_eq!(stored.code.len(), 50);
        assert!(stored.code.starts_with("44125061201230110633120122//178////"));

        let records = db.list_observations().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].observation.year, 99);
        assert_eq!(records[0].observation.hour, -1);
        assert_eq!(records[1].observation, later);
        assert_eq!(records[1].id, stored.id);
    }
}
