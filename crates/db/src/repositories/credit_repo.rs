//! Repository for the append-only `credit_transactions` ledger.

use sqlx::PgPool;
use songforge_core::types::DbId;

use crate::models::credit::{CreateCreditTransaction, CreditTransaction};

const COLUMNS: &str = "id, user_id, amount, tx_type, balance_after, reference_id, \
                       reference_type, description, created_at";

/// Provides access to the credit ledger.
pub struct CreditRepo;

impl CreditRepo {
    /// Append a transaction, deriving `balance_after` from the user's most
    /// recent row inside the same statement.
    pub async fn insert(
        pool: &PgPool,
        input: &CreateCreditTransaction,
    ) -> Result<CreditTransaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO credit_transactions \
                (user_id, amount, tx_type, balance_after, reference_id, reference_type, description) \
             VALUES ($1, $2, $3, \
                COALESCE((SELECT balance_after FROM credit_transactions \
                          WHERE user_id = $1 ORDER BY id DESC LIMIT 1), 0) + $2, \
                $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CreditTransaction>(&query)
            .bind(input.user_id)
            .bind(input.amount)
            .bind(&input.tx_type)
            .bind(&input.reference_id)
            .bind(&input.reference_type)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Most recent spend transaction referencing a generation task id.
    pub async fn latest_spend_for_reference(
        pool: &PgPool,
        reference_id: &str,
        reference_type: &str,
    ) -> Result<Option<CreditTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM credit_transactions \
             WHERE reference_id = $1 AND reference_type = $2 AND tx_type = 'spend' \
             ORDER BY id DESC LIMIT 1"
        );
        sqlx::query_as::<_, CreditTransaction>(&query)
            .bind(reference_id)
            .bind(reference_type)
            .fetch_optional(pool)
            .await
    }

    /// Whether a refund already references this task id.
    ///
    /// The in-memory idempotency guard does not survive restarts; this
    /// check keeps redelivered failure callbacks from double-refunding.
    pub async fn has_refund_for_reference(
        pool: &PgPool,
        reference_id: &str,
        reference_type: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM credit_transactions \
             WHERE reference_id = $1 AND reference_type = $2 AND tx_type = 'refund'",
        )
        .bind(reference_id)
        .bind(reference_type)
        .fetch_one(pool)
        .await?;
        Ok(row.0 > 0)
    }

    /// Current balance for a user: `balance_after` of their latest row.
    pub async fn balance_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (Option<i64>,) = sqlx::query_as(
            "SELECT (SELECT balance_after FROM credit_transactions \
                     WHERE user_id = $1 ORDER BY id DESC LIMIT 1)",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0.unwrap_or(0))
    }
}
