//! Competitor configuration and price observations.

use chrono::NaiveDate;
use innkeep_core::{
  StayRange,
  competitor::{CompetitorConfig, PriceObservation},
  store::PriceStore,
};

use crate::{
  Error, Result, SqliteStore,
  encode::{OBSERVATION_COLUMNS, RawObservation, encode_date, encode_decimal, encode_dt},
};

impl PriceStore for SqliteStore {
  type Error = Error;

  async fn save(&self, observation: PriceObservation) -> Result<()> {
    self
      .with_conn(move |conn| {
        conn.execute(
          "INSERT INTO competitor_prices (
             source, room_mapping, price, currency, original_price,
             original_currency, search_checkin, search_checkout, captured_at, method
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
           ON CONFLICT (source, room_mapping, search_checkin) DO UPDATE SET
             price             = excluded.price,
             currency          = excluded.currency,
             original_price    = excluded.original_price,
             original_currency = excluded.original_currency,
             search_checkout   = excluded.search_checkout,
             captured_at       = excluded.captured_at,
             method            = excluded.method",
          rusqlite::params![
            observation.source,
            observation.room_mapping,
            encode_decimal(observation.price),
            observation.currency,
            encode_decimal(observation.original_price),
            observation.original_currency,
            encode_date(observation.search_checkin),
            encode_date(observation.search_checkout),
            encode_dt(observation.captured_at),
            observation.method.as_ref(),
          ],
        )?;
        Ok(())
      })
      .await
  }

  async fn purge_all(&self) -> Result<usize> {
    let removed = self
      .with_conn(|conn| Ok(conn.execute("DELETE FROM competitor_prices", [])?))
      .await?;
    tracing::info!(removed, "competitor prices purged");
    Ok(removed)
  }

  async fn latest_for(
    &self,
    source: &str,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<PriceObservation>> {
    let range = StayRange::new(start, end)?;
    let source = source.to_owned();

    let raws: Vec<RawObservation> = self
      .with_conn(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {OBSERVATION_COLUMNS} FROM competitor_prices
           WHERE source = ?1 AND search_checkin >= ?2 AND search_checkin < ?3
           ORDER BY search_checkin, room_mapping"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              source,
              encode_date(range.check_in()),
              encode_date(range.check_out()),
            ],
            RawObservation::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawObservation::into_observation).collect()
  }

  async fn list_competitors(&self, enabled_only: bool) -> Result<Vec<CompetitorConfig>> {
    self
      .with_conn(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT name, url_template, room_mapping, enabled FROM competitors
           WHERE (?1 = 0 OR enabled = 1)
           ORDER BY name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![enabled_only], |row| {
            Ok(CompetitorConfig {
              name:         row.get(0)?,
              url_template: row.get(1)?,
              room_mapping: row.get(2)?,
              enabled:      row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn upsert_competitor(&self, competitor: CompetitorConfig) -> Result<()> {
    self
      .with_conn(move |conn| {
        conn.execute(
          "INSERT INTO competitors (name, url_template, room_mapping, enabled)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (name) DO UPDATE SET
             url_template = excluded.url_template,
             room_mapping = excluded.room_mapping,
             enabled      = excluded.enabled",
          rusqlite::params![
            competitor.name,
            competitor.url_template,
            competitor.room_mapping,
            competitor.enabled,
          ],
        )?;
        Ok(())
      })
      .await
  }
}
