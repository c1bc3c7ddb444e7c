//! Channel sync log: write-once audit rows.

use chrono::Utc;
use innkeep_core::{
  store::ChannelSyncLog,
  sync::{ChannelSyncEntry, NewSyncEntry, SyncStatus},
};
use rusqlite::Connection;
use uuid::Uuid;

use crate::{
  Error, Result, SqliteStore,
  encode::{RawSyncEntry, SYNC_COLUMNS, encode_dt, encode_uuid},
};

/// Insert a log row on `conn`, which may be an open transaction.
pub(crate) fn append_entry(conn: &Connection, entry: NewSyncEntry) -> Result<ChannelSyncEntry> {
  let stored = ChannelSyncEntry {
    id:         Uuid::new_v4(),
    channel:    entry.channel,
    action:     entry.action,
    booking_id: entry.booking_id,
    payload:    entry.payload,
    status:     SyncStatus::Pending,
    created_at: Utc::now(),
  };

  conn.execute(
    "INSERT INTO channel_sync_log
       (entry_id, channel, action, booking_id, payload, status, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    rusqlite::params![
      encode_uuid(stored.id),
      stored.channel,
      stored.action.as_ref(),
      stored.booking_id.map(encode_uuid),
      serde_json::to_string(&stored.payload)?,
      stored.status.as_ref(),
      encode_dt(stored.created_at),
    ],
  )?;

  Ok(stored)
}

impl ChannelSyncLog for SqliteStore {
  type Error = Error;

  async fn append(&self, entry: NewSyncEntry) -> Result<ChannelSyncEntry> {
    self.with_conn(move |conn| append_entry(conn, entry)).await
  }

  async fn entries(&self, booking_id: Option<Uuid>) -> Result<Vec<ChannelSyncEntry>> {
    let booking_str = booking_id.map(encode_uuid);

    let raws: Vec<RawSyncEntry> = self
      .with_conn(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SYNC_COLUMNS} FROM channel_sync_log
           WHERE (?1 IS NULL OR booking_id = ?1)
           ORDER BY seq"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![booking_str], RawSyncEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSyncEntry::into_entry).collect()
  }
}
