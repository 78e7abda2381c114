use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::{
    db::{connection::Database, helpers::to_u8},
    models::{month_key, ObserverSite, SiteRegions},
};

fn row_to_site(row: &Row) -> Result<ObserverSite> {
    let secondary_region: Option<i64> = row.get("secondary_region")?;
    let active: i64 = row.get("active")?;

    Ok(ObserverSite {
        code: row.get("code")?,
        since_month: to_u8(row.get("since_month")?, "since_month")?,
        since_year: to_u8(row.get("since_year")?, "since_year")?,
        main_site: row.get("main_site")?,
        main_region: to_u8(row.get("main_region")?, "main_region")?,
        secondary_site: row.get("secondary_site")?,
        secondary_region: secondary_region
            .map(|region| to_u8(region, "secondary_region"))
            .transpose()?,
        active: active != 0,
    })
}

impl Database {
    /// Insert or replace the site period starting at the record's month.
    pub async fn insert_observer_site(&self, site: &ObserverSite) -> Result<()> {
        let record = site.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO observer_sites (id, code, since_month, since_year, month_key,
                     main_site, main_region, secondary_site, secondary_region, active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(code, since_year, since_month) DO UPDATE SET
                     main_site = excluded.main_site,
                     main_region = excluded.main_region,
                     secondary_site = excluded.secondary_site,
                     secondary_region = excluded.secondary_region,
                     active = excluded.active",
                params![
                    uuid::Uuid::new_v4().to_string(),
                    record.code.to_ascii_uppercase(),
                    record.since_month,
                    record.since_year,
                    record.month_key(),
                    record.main_site,
                    record.main_region,
                    record.secondary_site,
                    record.secondary_region,
                    record.active,
                    Utc::now().to_rfc3339(),
                ],
            )
            .with_context(|| format!("failed to insert site for observer {}", record.code))?;
            Ok(())
        })
        .await
    }

    pub async fn list_observer_sites(&self, code: &str) -> Result<Vec<ObserverSite>> {
        let code = code.to_ascii_uppercase();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT code, since_month, since_year, main_site, main_region,
                        secondary_site, secondary_region, active
                 FROM observer_sites
                 WHERE code = ?1
                 ORDER BY month_key",
            )?;
            let mut rows = stmt.query(params![code])?;
            let mut sites = Vec::new();
            while let Some(row) = rows.next()? {
                sites.push(row_to_site(row)?);
            }
            Ok(sites)
        })
        .await
    }

    /// Distinct observer codes, optionally only those with an active period.
    pub async fn list_observer_codes(&self, active_only: bool) -> Result<Vec<String>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT code FROM observer_sites
                 WHERE ?1 = 0 OR active = 1
                 ORDER BY code",
            )?;
            let codes = stmt
                .query_map(params![active_only], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(codes)
        })
        .await
    }

    /// Regions of the period in force during `month`/`year` (two-digit year).
    pub async fn find_site_regions(
        &self,
        code: &str,
        year: u8,
        month: u8,
    ) -> Result<Option<SiteRegions>> {
        let code = code.to_ascii_uppercase();
        let key = month_key(year, month);
        self.execute(move |conn| {
            let row = conn
                .query_row(
                    "SELECT main_region, secondary_region FROM observer_sites
                     WHERE code = ?1 AND month_key <= ?2
                     ORDER BY month_key DESC
                     LIMIT 1",
                    params![code, key],
                    |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Option<i64>>(1)?)),
                )
                .optional()?;

            row.map(|(main, secondary)| -> Result<SiteRegions> {
                Ok(SiteRegions {
                    main: to_u8(main, "main_region")?,
                    secondary: secondary
                        .map(|region| to_u8(region, "secondary_region"))
                        .transpose()?,
                })
            })
            .transpose()
        })
        .await
    }
}
