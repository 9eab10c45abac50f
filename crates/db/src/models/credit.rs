//! Credit transaction entity model and DTO.
//!
//! The ledger is append-only; `balance_after` is computed inside the insert
//! from the user's most recent row, never updated afterwards.

use serde::{Deserialize, Serialize};
use songforge_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `credit_transactions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CreditTransaction {
    pub id: DbId,
    pub user_id: DbId,
    /// Signed amount: negative for spends, positive for refunds and bonuses.
    pub amount: i64,
    pub tx_type: String,
    pub balance_after: i64,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for appending a transaction to the ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCreditTransaction {
    pub user_id: DbId,
    pub amount: i64,
    pub tx_type: String,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
    pub description: Option<String>,
}
