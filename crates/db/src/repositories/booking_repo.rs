//! Repository for the `bookings` table.
//!
//! Every state change is a compare-and-set `UPDATE` guarded on the statuses
//! the transition table allows, so two concurrent writers can never both
//! apply a move. When the guard matches no row the booking is re-read to
//! report why (`NotFound` or `InvalidTransition`).

use chrono::Duration;
use parkify_core::admission::{
    check_admission, spot_lock_key, user_lock_key, AdmissionSnapshot, Occupancy,
};
use parkify_core::booking::{open_status_ids, BookingAction, BookingError, BookingStatus, CancelReason};
use parkify_core::otp::{generate_otp, otp_matches};
use parkify_core::pricing::{resolve_unit_price, PricingPolicy};
use parkify_core::settlement::{settle, SettlementPolicy};
use parkify_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::booking::{
    Booking, BookingListQuery, Completion, ExpiryCursor, NewBooking, OwnerBooking,
};
use crate::models::wallet::SettlementCredit;
use crate::LifecycleError;

use super::{clamp_limit, clamp_offset, SpotRepo, UserRepo, VerificationRepo, WalletRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, spot_id, owner_id, user_id, vehicle_type, unit_price, status_id, cancel_reason, otp, \
    start_time, expires_at, end_time, total_amount, owner_share, commission, \
    payment_reference, created_at, updated_at";

/// Partial unique index enforcing one open booking per user.
const OPEN_PER_USER_CONSTRAINT: &str = "uq_bookings_open_per_user";

pub struct BookingRepo;

impl BookingRepo {
    /// Find a booking by ID.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Booking>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// True if the user has a pending, confirmed or active booking.
    pub async fn has_open_booking<'e, E>(executor: E, user_id: DbId) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE user_id = $1 AND status_id = ANY($2))",
        )
        .bind(user_id)
        .bind(open_status_ids())
        .fetch_one(executor)
        .await
    }

    /// Admit a new `pending` booking.
    ///
    /// Holds transaction-scoped advisory locks on the (spot, vehicle type)
    /// pair and on the user while counting and inserting, so concurrent
    /// requests for the same key are serialized across every process
    /// sharing the database. Locks are always taken spot first, then user.
    pub async fn admit(
        pool: &PgPool,
        request: &NewBooking,
        pricing: &PricingPolicy,
        now: Timestamp,
    ) -> Result<Booking, LifecycleError> {
        let mut tx = pool.begin().await?;

        let spot = SpotRepo::find_active(&mut *tx, request.spot_id)
            .await?
            .ok_or(BookingError::SpotNotFound(request.spot_id))?;

        advisory_lock(&mut *tx, spot_lock_key(spot.id, request.vehicle_type)).await?;
        advisory_lock(&mut *tx, user_lock_key(request.user_id)).await?;

        let admitted = SpotRepo::admitted_count(&mut *tx, spot.id, request.vehicle_type).await?;
        let snapshot = AdmissionSnapshot {
            spot_id: spot.id,
            user_id: request.user_id,
            occupancy: Occupancy {
                vehicle_type: request.vehicle_type,
                admitted,
                capacity: spot.slots().capacity_for(request.vehicle_type),
            },
            user_has_open_booking: Self::has_open_booking(&mut *tx, request.user_id).await?,
        };
        if let Err(e) = check_admission(&snapshot) {
            tracing::info!(
                spot_id = spot.id,
                user_id = request.user_id,
                vehicle_type = %request.vehicle_type,
                code = e.code(),
                "Booking rejected",
            );
            return Err(e.into());
        }

        let tier = VerificationRepo::active_tier(&mut *tx, spot.owner_id, now).await?;
        let quote = resolve_unit_price(
            request.requested_price,
            &spot.rates(),
            request.vehicle_type,
            tier,
            pricing,
        )?;

        let query = format!(
            "INSERT INTO bookings (spot_id, owner_id, user_id, vehicle_type, unit_price, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(spot.id)
            .bind(spot.owner_id)
            .bind(request.user_id)
            .bind(request.vehicle_type.as_str())
            .bind(quote.unit_price)
            .bind(BookingStatus::Pending.id())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_insert_error(e, request.user_id))?;

        tx.commit().await?;

        tracing::info!(
            booking_id = booking.id,
            spot_id = spot.id,
            user_id = request.user_id,
            vehicle_type = %request.vehicle_type,
            unit_price = quote.unit_price,
            price_source = ?quote.source,
            boost_percent = quote.boost_percent,
            "Booking admitted",
        );
        Ok(booking)
    }

    /// Owner accepts a `pending` booking; issues a fresh check-in OTP.
    pub async fn confirm(pool: &PgPool, id: DbId) -> Result<Booking, LifecycleError> {
        let query = format!(
            "UPDATE bookings SET status_id = $2, otp = $3, updated_at = NOW() \
             WHERE id = $1 AND status_id = ANY($4) \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(BookingStatus::Confirmed.id())
            .bind(generate_otp())
            .bind(BookingAction::Confirm.source_status_ids())
            .fetch_optional(pool)
            .await?;

        match updated {
            Some(booking) => {
                tracing::info!(booking_id = id, "Booking confirmed");
                Ok(booking)
            }
            None => Err(Self::explain_rejection(pool, id, BookingAction::Confirm).await),
        }
    }

    /// Owner rejects a `pending` or `confirmed` booking.
    pub async fn decline(pool: &PgPool, id: DbId) -> Result<Booking, LifecycleError> {
        Self::cancel(pool, id, CancelReason::OwnerDeclined).await
    }

    /// Move a booking to `cancelled` with the given reason. The OTP is
    /// cleared and no settlement is produced.
    pub async fn cancel(
        pool: &PgPool,
        id: DbId,
        reason: CancelReason,
    ) -> Result<Booking, LifecycleError> {
        let action = match reason {
            CancelReason::OwnerDeclined => BookingAction::Decline,
            CancelReason::DriverCancelled | CancelReason::AdminCancelled => BookingAction::Cancel,
        };
        let query = format!(
            "UPDATE bookings \
             SET status_id = $2, cancel_reason = $3, otp = NULL, updated_at = NOW() \
             WHERE id = $1 AND status_id = ANY($4) \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(BookingStatus::Cancelled.id())
            .bind(reason.as_str())
            .bind(action.source_status_ids())
            .fetch_optional(pool)
            .await?;

        match updated {
            Some(booking) => {
                tracing::info!(booking_id = id, reason = reason.as_str(), "Booking cancelled");
                Ok(booking)
            }
            None => Err(Self::explain_rejection(pool, id, action).await),
        }
    }

    /// Check the driver in: `confirmed` to `active` when `otp` matches.
    ///
    /// A wrong code leaves the booking untouched. On success the session
    /// starts at `now`, the safety-net deadline is `now + max_session`, and
    /// the OTP is cleared so it cannot be replayed.
    pub async fn activate(
        pool: &PgPool,
        id: DbId,
        otp: &str,
        now: Timestamp,
        max_session: Duration,
    ) -> Result<Booking, LifecycleError> {
        let booking = Self::find_by_id(pool, id)
            .await?
            .ok_or(BookingError::NotFound(id))?;
        booking.status()?.apply(id, BookingAction::Activate)?;
        if !otp_matches(booking.otp.as_deref(), otp) {
            tracing::info!(booking_id = id, "Check-in rejected: wrong OTP");
            return Err(BookingError::WrongOtp { booking_id: id }.into());
        }

        let expires_at = now + max_session;
        let query = format!(
            "UPDATE bookings \
             SET status_id = $2, start_time = $3, expires_at = $4, otp = NULL, updated_at = NOW() \
             WHERE id = $1 AND status_id = ANY($5) AND otp = $6 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(BookingStatus::Active.id())
            .bind(now)
            .bind(expires_at)
            .bind(BookingAction::Activate.source_status_ids())
            .bind(otp)
            .fetch_optional(pool)
            .await?;

        match updated {
            Some(booking) => {
                tracing::info!(booking_id = id, %expires_at, "Booking activated");
                Ok(booking)
            }
            None => Err(Self::explain_rejection(pool, id, BookingAction::Activate).await),
        }
    }

    /// Complete an `active` booking and settle it.
    ///
    /// The booking row is locked for the whole transaction, so explicit
    /// completion and the expiry sweeper cannot both settle it. Billing
    /// stops at `completed_at` or `expires_at`, whichever is earlier. The
    /// status change, wallet increment and ledger entry commit together.
    ///
    /// Calling this on an already `completed` booking returns the stored
    /// settlement with `newly_completed = false` and credits nothing.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        completed_at: Timestamp,
        policy: &SettlementPolicy,
        payment_reference: Option<&str>,
    ) -> Result<Completion, LifecycleError> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE");
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(BookingError::NotFound(id))?;
        let status = booking.status()?;

        if status == BookingStatus::Completed {
            let settlement = booking.settlement().ok_or(LifecycleError::Inconsistent {
                booking_id: id,
                detail: "completed without a stored settlement",
            })?;
            return Ok(Completion {
                owner_id: booking.owner_id,
                booking: booking.into(),
                settlement,
                newly_completed: false,
            });
        }
        status.apply(id, BookingAction::Complete)?;

        let start = booking.start_time.ok_or(LifecycleError::Inconsistent {
            booking_id: id,
            detail: "active without a start time",
        })?;
        let billed_until = booking
            .expires_at
            .map_or(completed_at, |deadline| completed_at.min(deadline));
        let settlement = settle(booking.unit_price, start, billed_until, policy)?;

        let query = format!(
            "UPDATE bookings \
             SET status_id = $2, end_time = $3, total_amount = $4, owner_share = $5, \
                 commission = $6, payment_reference = $7, updated_at = NOW() \
             WHERE id = $1 AND status_id = ANY($8) \
             RETURNING {COLUMNS}"
        );
        let completed = sqlx::query_as::<_, Booking>(&query)
            .bind(id)
            .bind(BookingStatus::Completed.id())
            .bind(billed_until)
            .bind(settlement.total_amount)
            .bind(settlement.owner_share)
            .bind(settlement.commission)
            .bind(payment_reference)
            .bind(BookingAction::Complete.source_status_ids())
            .fetch_one(&mut *tx)
            .await?;

        let credit = SettlementCredit {
            owner_id: booking.owner_id,
            booking_id: id,
            driver_id: booking.user_id,
            driver_name: UserRepo::display_name(&mut *tx, booking.user_id).await?,
            total_payment: settlement.total_amount,
            provider_share: settlement.owner_share,
            commission: settlement.commission,
            parking_duration_mins: settlement.elapsed_minutes,
            payment_reference: payment_reference.map(str::to_string),
        };
        let entry = WalletRepo::credit_settlement(&mut *tx, &credit).await?;

        tx.commit().await?;

        tracing::info!(
            booking_id = id,
            owner_id = booking.owner_id,
            elapsed_minutes = settlement.elapsed_minutes,
            total = settlement.total_amount,
            owner_share = settlement.owner_share,
            commission = settlement.commission,
            balance_after = entry.balance_after,
            "Booking completed",
        );
        Ok(Completion {
            owner_id: booking.owner_id,
            booking: completed.into(),
            settlement,
            newly_completed: true,
        })
    }

    /// `active` bookings whose deadline is at or before `now`, ordered by
    /// `(expires_at, id)`.
    ///
    /// Pass the last key of the previous page as `after` to continue past
    /// rows that were returned but could not be completed.
    pub async fn find_expired_active(
        pool: &PgPool,
        now: Timestamp,
        after: Option<ExpiryCursor>,
        limit: i64,
    ) -> Result<Vec<ExpiryCursor>, sqlx::Error> {
        let rows: Vec<(Timestamp, DbId)> = sqlx::query_as(
            "SELECT expires_at, id FROM bookings \
             WHERE status_id = $1 AND expires_at <= $2 \
               AND ($3::TIMESTAMPTZ IS NULL OR (expires_at, id) > ($3, $4::BIGINT)) \
             ORDER BY expires_at ASC, id ASC \
             LIMIT $5",
        )
        .bind(BookingStatus::Active.id())
        .bind(now)
        .bind(after.map(|c| c.expires_at))
        .bind(after.map(|c| c.booking_id))
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(expires_at, booking_id)| ExpiryCursor {
                expires_at,
                booking_id,
            })
            .collect())
    }

    /// Bookings at any of the owner's spots, newest first, with the driver's
    /// display name.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: DbId,
        params: &BookingListQuery,
    ) -> Result<Vec<OwnerBooking>, sqlx::Error> {
        sqlx::query_as::<_, OwnerBooking>(
            "SELECT b.*, s.name AS spot_name, COALESCE(u.name, 'Unknown') AS driver_name \
             FROM bookings b \
             JOIN parking_spots s ON s.id = b.spot_id \
             LEFT JOIN users u ON u.id = b.user_id \
             WHERE s.owner_id = $1 AND ($2::SMALLINT IS NULL OR b.status_id = $2) \
             ORDER BY b.created_at DESC, b.id DESC \
             LIMIT $3 OFFSET $4",
        )
        .bind(owner_id)
        .bind(params.status_id)
        .bind(clamp_limit(params.limit))
        .bind(clamp_offset(params.offset))
        .fetch_all(pool)
        .await
    }

    /// The user's most recent open booking, if any.
    pub async fn find_current_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bookings \
             WHERE user_id = $1 AND status_id = ANY($2) \
             ORDER BY created_at DESC, id DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(user_id)
            .bind(open_status_ids())
            .fetch_optional(pool)
            .await
    }

    /// Work out why a guarded update matched no row.
    async fn explain_rejection(pool: &PgPool, id: DbId, action: BookingAction) -> LifecycleError {
        match Self::find_by_id(pool, id).await {
            Ok(None) => BookingError::NotFound(id).into(),
            Ok(Some(booking)) => match booking.status() {
                Ok(from) => BookingError::InvalidTransition {
                    booking_id: id,
                    from,
                    action,
                }
                .into(),
                Err(e) => e,
            },
            Err(e) => e.into(),
        }
    }
}

/// Take a transaction-scoped advisory lock, released on commit or rollback.
async fn advisory_lock(conn: &mut PgConnection, key: i64) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(key)
        .execute(conn)
        .await?;
    Ok(())
}

/// Report a hit on the one-open-booking index as the domain rejection.
fn map_insert_error(err: sqlx::Error, user_id: DbId) -> LifecycleError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.constraint() == Some(OPEN_PER_USER_CONSTRAINT) {
            return BookingError::UserAlreadyBooked { user_id }.into();
        }
    }
    err.into()
}
