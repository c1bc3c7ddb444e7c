//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Days, NaiveDate, Utc};
use innkeep_core::{
  Error as CoreError,
  booking::{BookingPatch, BookingStatus, GuestInfo, NewBooking, PaymentStatus},
  competitor::{AcquisitionMethod, CompetitorConfig, PriceObservation},
  room::{AvailabilityQuery, AvailabilityUpdate, Room, RoomPatch},
  store::{BookingLedger, ChannelSyncLog, InventoryLedger, PriceStore},
  sync::SyncAction,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{Error, SqliteStore};

fn d(y: i32, m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, day).unwrap() }

fn suite() -> Room {
  Room {
    id:            1,
    name:          "Garden Suite".into(),
    category:      "suite".into(),
    max_occupancy: 4,
    base_price:    Decimal::from(1200),
    active:        true,
  }
}

fn loft() -> Room {
  Room {
    id:            2,
    name:          "Loft".into(),
    category:      "double".into(),
    max_occupancy: 2,
    base_price:    Decimal::from(900),
    active:        true,
  }
}

async fn store() -> SqliteStore {
  let s = SqliteStore::open_in_memory().await.expect("in-memory store");
  s.provision_room(suite()).await.unwrap();
  s.provision_room(loft()).await.unwrap();
  s
}

fn guest() -> GuestInfo {
  GuestInfo {
    name:  "Grace Hopper".into(),
    email: "grace@example.com".into(),
    phone: Some("+45 1234 5678".into()),
  }
}

fn booking(room_id: i64, check_in: NaiveDate, check_out: NaiveDate, guests: u32) -> NewBooking {
  NewBooking::new(room_id, check_in, check_out, guests, guest())
}

fn core(err: Error) -> CoreError { err.into() }

// ─── Rooms ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn provisioning_is_insert_or_ignore() {
  let s = store().await;

  let mut changed = suite();
  changed.name = "Renamed".into();
  let stored = s.provision_room(changed).await.unwrap();
  assert_eq!(stored.name, "Garden Suite");

  assert_eq!(s.list_rooms(false).await.unwrap().len(), 2);
}

#[tokio::test]
async fn deactivated_rooms_are_hidden_and_unpriceable() {
  let s = store().await;
  s.update_room(2, RoomPatch { active: Some(false), ..Default::default() })
    .await
    .unwrap();

  let active = s.list_rooms(false).await.unwrap();
  assert_eq!(active.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
  assert_eq!(s.list_rooms(true).await.unwrap().len(), 2);

  let err = s.price_for_stay(2, d(2026, 7, 1), d(2026, 7, 2)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::RoomNotFound(2)));
}

#[tokio::test]
async fn update_unknown_room_fails() {
  let s = store().await;
  let err = s.update_room(99, RoomPatch::default()).await.unwrap_err();
  assert!(matches!(core(err), CoreError::RoomNotFound(99)));
}

// ─── Availability ────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_availability_rejects_inverted_range() {
  let s = store().await;
  let err = s
    .get_availability(None, d(2026, 7, 4), d(2026, 7, 4))
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::InvalidRange(_)));
}

#[tokio::test]
async fn get_availability_is_ordered_and_half_open() {
  let s = store().await;
  s.set_availability(AvailabilityUpdate::new(2, d(2026, 7, 2), false)).await.unwrap();
  s.set_availability(AvailabilityUpdate::new(1, d(2026, 7, 1), true)).await.unwrap();
  s.set_availability(AvailabilityUpdate::new(1, d(2026, 7, 2), false)).await.unwrap();
  s.set_availability(AvailabilityUpdate::new(1, d(2026, 7, 3), false)).await.unwrap();

  let all = s.get_availability(None, d(2026, 7, 1), d(2026, 7, 3)).await.unwrap();
  let keys: Vec<_> = all.iter().map(|a| (a.date, a.room_id)).collect();
  assert_eq!(keys, vec![(d(2026, 7, 1), 1), (d(2026, 7, 2), 1), (d(2026, 7, 2), 2)]);

  let one = s.get_availability(Some(2), d(2026, 7, 1), d(2026, 7, 10)).await.unwrap();
  assert_eq!(one.len(), 1);
}

#[tokio::test]
async fn set_availability_twice_keeps_one_row_and_one_log_entry() {
  let s = store().await;
  let update = AvailabilityUpdate::new(1, d(2026, 7, 2), true).with_price(Decimal::from(1500));

  let first = s.set_availability(update.clone()).await.unwrap();
  let second = s.set_availability(update).await.unwrap();
  assert_eq!(first, second);

  let rows = s.get_availability(Some(1), d(2026, 7, 2), d(2026, 7, 3)).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].price, Some(Decimal::from(1500)));

  let log = s.entries(None).await.unwrap();
  let updates = log
    .iter()
    .filter(|e| e.action == SyncAction::AvailabilityUpdated)
    .count();
  assert_eq!(updates, 1);
}

#[tokio::test]
async fn set_availability_keeps_min_stay_unless_given() {
  let s = store().await;
  let mut update = AvailabilityUpdate::new(1, d(2026, 7, 2), true);
  update.min_stay = Some(3);
  s.set_availability(update).await.unwrap();

  let stored = s
    .set_availability(AvailabilityUpdate::new(1, d(2026, 7, 2), true))
    .await
    .unwrap();
  assert_eq!(stored.min_stay, 3);
}

#[tokio::test]
async fn set_availability_for_unknown_room_fails() {
  let s = store().await;
  let err = s
    .set_availability(AvailabilityUpdate::new(42, d(2026, 7, 2), true))
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::RoomNotFound(42)));
}

#[tokio::test]
async fn price_for_stay_sums_overrides_and_base() {
  let s = store().await;
  s.set_availability(AvailabilityUpdate::new(1, d(2026, 7, 2), true).with_price(Decimal::from(1500)))
    .await
    .unwrap();

  let total = s.price_for_stay(1, d(2026, 7, 1), d(2026, 7, 4)).await.unwrap();
  assert_eq!(total, Decimal::from(3900));
}

#[tokio::test]
async fn price_for_unknown_room_fails() {
  let s = store().await;
  let err = s.price_for_stay(7, d(2026, 7, 1), d(2026, 7, 4)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::RoomNotFound(7)));
}

#[tokio::test]
async fn check_availability_excludes_rooms_too_small() {
  let s = store().await;
  let query = AvailabilityQuery {
    check_in:  d(2026, 7, 1),
    check_out: d(2026, 7, 4),
    guests:    5,
    room_id:   Some(1),
  };
  assert!(s.check_availability(&query).await.unwrap().is_empty());

  let fits = AvailabilityQuery { guests: 3, room_id: None, ..query };
  let rooms = s.check_availability(&fits).await.unwrap();
  assert_eq!(rooms.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
}

#[tokio::test]
async fn check_availability_respects_closed_nights_and_bookings() {
  let s = store().await;
  s.set_availability(AvailabilityUpdate::new(1, d(2026, 7, 3), false)).await.unwrap();
  s.create_booking(booking(2, d(2026, 7, 2), d(2026, 7, 5), 2)).await.unwrap();

  let query = AvailabilityQuery {
    check_in:  d(2026, 7, 1),
    check_out: d(2026, 7, 4),
    guests:    1,
    room_id:   None,
  };
  assert!(s.check_availability(&query).await.unwrap().is_empty());

  // Checking out on the closed night is fine: it is not slept in.
  let before = AvailabilityQuery { check_out: d(2026, 7, 3), ..query };
  let rooms = s.check_availability(&before).await.unwrap();
  assert_eq!(rooms.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
}

#[tokio::test]
async fn check_availability_enforces_minimum_stay() {
  let s = store().await;
  let mut update = AvailabilityUpdate::new(1, d(2026, 7, 10), true);
  update.min_stay = Some(3);
  s.set_availability(update).await.unwrap();

  let short = AvailabilityQuery {
    check_in:  d(2026, 7, 10),
    check_out: d(2026, 7, 12),
    guests:    2,
    room_id:   Some(1),
  };
  assert!(s.check_availability(&short).await.unwrap().is_empty());

  let long = AvailabilityQuery { check_out: d(2026, 7, 13), ..short };
  assert_eq!(s.check_availability(&long).await.unwrap().len(), 1);
}

// ─── Bookings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_booking_prices_and_logs() {
  let s = store().await;
  s.set_availability(AvailabilityUpdate::new(1, d(2026, 7, 2), true).with_price(Decimal::from(1500)))
    .await
    .unwrap();

  let created = s
    .create_booking(booking(1, d(2026, 7, 1), d(2026, 7, 4), 2))
    .await
    .unwrap();
  assert_eq!(created.total_price, Decimal::from(3900));
  assert_eq!(created.status, BookingStatus::Pending);
  assert_eq!(created.payment_status, PaymentStatus::Unpaid);
  assert_eq!(created.source, "website");

  let fetched = s.get_booking(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);

  let log = s.entries(Some(created.id)).await.unwrap();
  assert_eq!(log.len(), 1);
  assert_eq!(log[0].action, SyncAction::BookingCreated);
}

#[tokio::test]
async fn create_booking_failure_kinds() {
  let s = store().await;

  let err = s.create_booking(booking(1, d(2026, 7, 4), d(2026, 7, 1), 2)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::InvalidRange(_)));

  let err = s.create_booking(booking(1, d(2026, 7, 1), d(2026, 7, 4), 0)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::InvalidRange(_)));

  let err = s.create_booking(booking(9, d(2026, 7, 1), d(2026, 7, 4), 2)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::RoomNotFound(9)));

  let err = s.create_booking(booking(2, d(2026, 7, 1), d(2026, 7, 4), 3)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::CapacityExceeded { max: 2, requested: 3, .. }));

  s.create_booking(booking(2, d(2026, 7, 1), d(2026, 7, 4), 2)).await.unwrap();
  let err = s.create_booking(booking(2, d(2026, 7, 3), d(2026, 7, 6), 1)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::RoomUnavailable(2)));

  // Only the successful booking was written or logged.
  assert_eq!(s.list_bookings(None).await.unwrap().len(), 1);
  let created = s
    .entries(None)
    .await
    .unwrap()
    .into_iter()
    .filter(|e| e.action == SyncAction::BookingCreated)
    .count();
  assert_eq!(created, 1);
}

#[tokio::test]
async fn cancelled_booking_releases_its_nights() {
  let s = store().await;
  let first = s.create_booking(booking(2, d(2026, 8, 1), d(2026, 8, 3), 2)).await.unwrap();
  s.transition_status(first.id, BookingStatus::Cancelled).await.unwrap();

  s.create_booking(booking(2, d(2026, 8, 1), d(2026, 8, 3), 2))
    .await
    .expect("cancelled booking no longer holds the room");
}

#[tokio::test]
async fn concurrent_overlapping_bookings_exactly_one_wins() {
  let s = store().await;

  let attempts: Vec<_> = (0..8)
    .map(|_| {
      let s = s.clone();
      tokio::spawn(async move {
        s.create_booking(booking(1, d(2026, 9, 10), d(2026, 9, 14), 2)).await
      })
    })
    .collect();

  let mut won = 0;
  let mut unavailable = 0;
  for attempt in attempts {
    match attempt.await.unwrap() {
      Ok(_) => won += 1,
      Err(e) => {
        assert!(matches!(core(e), CoreError::RoomUnavailable(1)));
        unavailable += 1;
      }
    }
  }
  assert_eq!(won, 1);
  assert_eq!(unavailable, 7);
}

#[tokio::test]
async fn transition_status_walks_the_machine() {
  let s = store().await;
  let b = s.create_booking(booking(1, d(2026, 7, 1), d(2026, 7, 2), 1)).await.unwrap();

  let confirmed = s.transition_status(b.id, BookingStatus::Confirmed).await.unwrap();
  assert_eq!(confirmed.status, BookingStatus::Confirmed);

  // Unpaid bookings cannot be completed.
  let err = s.transition_status(b.id, BookingStatus::Completed).await.unwrap_err();
  assert!(matches!(core(err), CoreError::InvalidTransition { .. }));

  let changes = s
    .update_booking(b.id, BookingPatch {
      payment_status: Some(PaymentStatus::Paid),
      payment_ref: Some("pi_3Nabc".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(changes, 1);

  let done = s.transition_status(b.id, BookingStatus::Completed).await.unwrap();
  assert_eq!(done.status, BookingStatus::Completed);
  assert_eq!(done.payment_ref.as_deref(), Some("pi_3Nabc"));
}

#[tokio::test]
async fn cancelled_booking_rejects_every_transition() {
  let s = store().await;
  let b = s.create_booking(booking(1, d(2026, 7, 1), d(2026, 7, 2), 1)).await.unwrap();
  s.transition_status(b.id, BookingStatus::Cancelled).await.unwrap();

  for next in [
    BookingStatus::Pending,
    BookingStatus::Confirmed,
    BookingStatus::Completed,
    BookingStatus::Cancelled,
  ] {
    let err = s.transition_status(b.id, next).await.unwrap_err();
    assert!(matches!(core(err), CoreError::InvalidTransition { .. }));
  }

  let stored = s.get_booking(b.id).await.unwrap().unwrap();
  assert_eq!(stored.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn update_booking_unknown_id_is_not_found() {
  let s = store().await;
  let id = Uuid::new_v4();
  let err = s.update_booking(id, BookingPatch::default()).await.unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound(missing) if missing == id));
}

#[tokio::test]
async fn invalid_update_leaves_booking_untouched() {
  let s = store().await;
  let b = s.create_booking(booking(1, d(2026, 7, 1), d(2026, 7, 2), 1)).await.unwrap();

  let err = s
    .update_booking(b.id, BookingPatch {
      status: Some(BookingStatus::Completed),
      payment_ref: Some("pi_x".into()),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::InvalidTransition { .. }));

  let stored = s.get_booking(b.id).await.unwrap().unwrap();
  assert_eq!(stored, b);
}

mod properties {
  use proptest::prelude::*;

  use super::*;

  proptest! {
    #![proptest_config(ProptestConfig { cases: 32, ..ProptestConfig::default() })]

    /// Whatever sequence of requests arrives, the bookings that hold a room
    /// never share a night.
    #[test]
    fn holding_bookings_never_overlap(
      requests in prop::collection::vec((1i64..=2, 0u64..30, 1u32..6, any::<bool>()), 1..25)
    ) {
      let rt = tokio::runtime::Runtime::new().unwrap();
      rt.block_on(async {
        let s = store().await;
        let origin = d(2026, 10, 1);

        for (room_id, offset, nights, cancel) in requests {
          let check_in = origin + Days::new(offset);
          let check_out = check_in + Days::new(u64::from(nights));
          if let Ok(b) = s.create_booking(booking(room_id, check_in, check_out, 1)).await
            && cancel
          {
            s.transition_status(b.id, BookingStatus::Cancelled).await.unwrap();
          }
        }

        let holding: Vec<_> = s
          .list_bookings(None)
          .await
          .unwrap()
          .into_iter()
          .filter(|b| b.status.holds_inventory())
          .collect();
        for (i, a) in holding.iter().enumerate() {
          for b in &holding[i + 1..] {
            if a.room_id == b.room_id {
              assert!(
                !a.stay().unwrap().overlaps(&b.stay().unwrap()),
                "{a:?} overlaps {b:?}"
              );
            }
          }
        }
      });
    }
  }
}

// ─── Competitor prices ───────────────────────────────────────────────────────

fn observation(checkin: NaiveDate, price: i64) -> PriceObservation {
  PriceObservation {
    source:            "Harbour Inn".into(),
    room_mapping:      "suite".into(),
    price:             Decimal::from(price),
    currency:          "DKK".into(),
    original_price:    Decimal::from(price),
    original_currency: "DKK".into(),
    search_checkin:    checkin,
    search_checkout:   checkin + Days::new(2),
    captured_at:       Utc::now(),
    method:            AcquisitionMethod::DirectScrape,
  }
}

#[tokio::test]
async fn saving_the_same_cell_overwrites() {
  let s = store().await;
  s.save(observation(d(2026, 7, 1), 1000)).await.unwrap();
  let mut again = observation(d(2026, 7, 1), 1100);
  again.method = AcquisitionMethod::ApiFallback;
  s.save(again).await.unwrap();
  s.save(observation(d(2026, 7, 8), 950)).await.unwrap();

  let rows = s.latest_for("Harbour Inn", d(2026, 7, 1), d(2026, 8, 1)).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].price, Decimal::from(1100));
  assert_eq!(rows[0].method, AcquisitionMethod::ApiFallback);
  assert_eq!(rows[1].search_checkin, d(2026, 7, 8));

  assert!(s.latest_for("Other", d(2026, 7, 1), d(2026, 8, 1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn purge_all_reports_removed_rows() {
  let s = store().await;
  s.save(observation(d(2026, 7, 1), 1000)).await.unwrap();
  s.save(observation(d(2026, 7, 8), 1000)).await.unwrap();

  assert_eq!(s.purge_all().await.unwrap(), 2);
  assert_eq!(s.purge_all().await.unwrap(), 0);
}

#[tokio::test]
async fn competitors_upsert_by_name() {
  let s = store().await;
  let mut harbour = CompetitorConfig {
    name:         "Harbour Inn".into(),
    url_template: "https://www.booking.com/hotel/dk/harbour.html".into(),
    room_mapping: "suite".into(),
    enabled:      true,
  };
  s.upsert_competitor(harbour.clone()).await.unwrap();
  s.upsert_competitor(CompetitorConfig {
    name:         "Beach Loft".into(),
    url_template: "https://www.airbnb.com/rooms/1".into(),
    room_mapping: "double".into(),
    enabled:      true,
  })
  .await
  .unwrap();

  harbour.enabled = false;
  s.upsert_competitor(harbour).await.unwrap();

  assert_eq!(s.list_competitors(false).await.unwrap().len(), 2);
  let enabled = s.list_competitors(true).await.unwrap();
  assert_eq!(enabled.len(), 1);
  assert_eq!(enabled[0].name, "Beach Loft");
}
