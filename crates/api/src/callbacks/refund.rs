//! Credit refund for failed generation jobs.
//!
//! Refunds are derived from the spend they reverse: the amount is the
//! absolute value of the most recent spend referencing the failed task.
//! The in-memory delivery guard already filters most duplicates; the
//! durable `has_refund_for_reference` check below is what keeps a
//! redelivery after a process restart from double-crediting.

use songforge_core::credits;
use songforge_core::types::DbId;
use songforge_db::models::credit::{CreateCreditTransaction, CreditTransaction};
use songforge_db::repositories::CreditRepo;
use songforge_db::DbPool;

/// Refund the credits spent on a failed job, at most once per task.
///
/// Returns the appended ledger row, or `None` when the task was already
/// refunded. When no spend row exists (the debit predates the ledger, or
/// the request side never recorded it), a default-cost refund is issued
/// against the best-known user id.
pub async fn refund_for_failed_job(
    pool: &DbPool,
    task_id: &str,
    job_user_id: Option<DbId>,
) -> Result<Option<CreditTransaction>, sqlx::Error> {
    if CreditRepo::has_refund_for_reference(pool, task_id, credits::REFERENCE_GENERATION).await? {
        tracing::info!(task_id, "Refund already issued for this task, skipping");
        return Ok(None);
    }

    let spend =
        CreditRepo::latest_spend_for_reference(pool, task_id, credits::REFERENCE_GENERATION)
            .await?;

    let (user_id, amount) = match &spend {
        Some(spend) => (spend.user_id, spend.amount.abs()),
        None => {
            let user_id = job_user_id.unwrap_or(credits::ANONYMOUS_USER_ID);
            tracing::warn!(
                task_id,
                user_id,
                "No spend on record for failed task, refunding the default cost"
            );
            (user_id, credits::DEFAULT_GENERATION_COST)
        }
    };

    let tx = CreditRepo::insert(
        pool,
        &CreateCreditTransaction {
            user_id,
            amount,
            tx_type: credits::TX_REFUND.to_string(),
            reference_id: Some(task_id.to_string()),
            reference_type: Some(credits::REFERENCE_GENERATION.to_string()),
            description: Some(format!("Refund for failed generation {task_id}")),
        },
    )
    .await?;

    tracing::info!(task_id, user_id, amount, "Issued refund for failed generation");
    Ok(Some(tx))
}
