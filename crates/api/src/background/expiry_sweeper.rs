//! Periodic completion of sessions that ran past their deadline.
//!
//! Drivers who never press "complete" would otherwise hold a slot forever.
//! Each tick settles `active` bookings whose `expires_at` has passed through
//! the same completion path as an explicit request, so a booking completed
//! by both is still settled once.

use std::sync::Arc;

use chrono::Utc;
use parkify_core::types::Timestamp;
use parkify_db::repositories::BookingRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::config::BookingPolicy;

/// Result of one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Bookings this sweep settled.
    pub completed: usize,
    /// Bookings already settled by someone else in the meantime.
    pub already_completed: usize,
    /// Bookings that failed and will be retried next tick.
    pub failed: usize,
}

/// Settle overdue `active` bookings until the policy's batch size is used
/// up or none remain.
///
/// The scan pages through the queue in `(expires_at, id)` order, so a
/// booking that keeps failing is skipped instead of holding back the ones
/// behind it. Failures are logged and counted but do not use up the batch;
/// only a scan can fail the sweep as a whole.
pub async fn sweep_once(
    pool: &PgPool,
    policy: &BookingPolicy,
    now: Timestamp,
) -> Result<SweepOutcome, sqlx::Error> {
    let budget = usize::try_from(policy.sweep_batch_size).unwrap_or(usize::MAX);
    let mut outcome = SweepOutcome::default();
    let mut cursor = None;

    while outcome.completed < budget {
        let page =
            BookingRepo::find_expired_active(pool, now, cursor, policy.sweep_batch_size).await?;
        let Some(&last) = page.last() else {
            break;
        };
        let exhausted = page.len() < budget;

        for due in page {
            if outcome.completed == budget {
                break;
            }
            let booking_id = due.booking_id;
            match BookingRepo::complete(pool, booking_id, now, &policy.settlement, None).await {
                Ok(completion) if completion.newly_completed => {
                    tracing::info!(
                        booking_id,
                        total = completion.settlement.total_amount,
                        "Expiry sweeper: session settled",
                    );
                    outcome.completed += 1;
                }
                Ok(_) => outcome.already_completed += 1,
                Err(e) => {
                    tracing::error!(booking_id, error = %e, "Expiry sweeper: completion failed");
                    outcome.failed += 1;
                }
            }
        }

        if exhausted {
            break;
        }
        cursor = Some(last);
    }

    Ok(outcome)
}

/// Run the expiry sweep loop until `cancel` is triggered.
pub async fn run(pool: PgPool, policy: Arc<BookingPolicy>, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = policy.sweep_interval.as_secs(),
        max_session_hours = policy.max_session.num_hours(),
        "Expiry sweeper started"
    );

    let mut interval = tokio::time::interval(policy.sweep_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Expiry sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep_once(&pool, &policy, Utc::now()).await {
                    Ok(outcome) if outcome == SweepOutcome::default() => {
                        tracing::debug!("Expiry sweeper: nothing due");
                    }
                    Ok(outcome) => {
                        tracing::info!(
                            completed = outcome.completed,
                            already_completed = outcome.already_completed,
                            failed = outcome.failed,
                            "Expiry sweeper: sweep finished"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Expiry sweeper: scan failed");
                    }
                }
            }
        }
    }
}
