//! Client feature repository — the wide per-client row behind RFM scoring

use crate::DbResult;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// Date substituted for an activity stream a client never touched.
/// A `last_activity_date` equal to this value means "no activity at all".
pub const ACTIVITY_SENTINEL: &str = "1900-01-01";

/// Raw feature row, one per distinct client
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientFeatureRecord {
    pub client_id: String,
    /// Latest of trades/exchange/transfers, or [`ACTIVITY_SENTINEL`]
    pub last_activity_date: String,
    pub total_frequency: i64,
    pub balance: Option<f64>,
    pub sum_ins: Option<f64>,
    pub total_commission: Option<f64>,
    pub total_trades: Option<i64>,
}

// Each source is aggregated to client granularity in its own CTE so that
// trades and transfers never fan out against each other.
const FEATURE_ROWS_SQL: &str = r#"
WITH clients AS (
  SELECT DISTINCT client_id FROM accounts
),
commission_by_login AS (
  SELECT login, SUM(comission) AS total_commission
  FROM commissions
  GROUP BY login
),
commission_by_client AS (
  SELECT a.client_id, SUM(cl.total_commission) AS total_commission
  FROM accounts a
  JOIN commission_by_login cl ON cl.login = a.login
  GROUP BY a.client_id
),
trades_by_client AS (
  SELECT a.client_id,
         SUM(t.cnt_trades) AS total_trades,
         MAX(t.date_last_activity) AS last_trade
  FROM accounts a
  JOIN trades t ON t.login = a.login
  GROUP BY a.client_id
),
exchange_by_client AS (
  SELECT client_id, MAX(date_last_conv) AS last_conv
  FROM exchange
  GROUP BY client_id
),
inouts_by_client AS (
  SELECT client_id,
         SUM(cnt_inouts) AS total_inouts,
         SUM(sum_ins) AS sum_ins,
         MAX(date_last_inouts) AS last_inouts
  FROM inouts
  GROUP BY client_id
),
balance_by_client AS (
  SELECT client_id, SUM(balance) AS balance
  FROM balance
  GROUP BY client_id
)
SELECT
  c.client_id AS client_id,
  MAX(
    COALESCE(tr.last_trade, ?1),
    COALESCE(ex.last_conv, ?1),
    COALESCE(io.last_inouts, ?1)
  ) AS last_activity_date,
  CAST(COALESCE(tr.total_trades, 0) + COALESCE(io.total_inouts, 0) AS INTEGER) AS total_frequency,
  CAST(b.balance AS REAL) AS balance,
  CAST(io.sum_ins AS REAL) AS sum_ins,
  CAST(co.total_commission AS REAL) AS total_commission,
  CAST(tr.total_trades AS INTEGER) AS total_trades
FROM clients c
LEFT JOIN trades_by_client tr ON tr.client_id = c.client_id
LEFT JOIN exchange_by_client ex ON ex.client_id = c.client_id
LEFT JOIN inouts_by_client io ON io.client_id = c.client_id
LEFT JOIN balance_by_client b ON b.client_id = c.client_id
LEFT JOIN commission_by_client co ON co.client_id = c.client_id
ORDER BY c.client_id
"#;

/// Repository for the per-client feature query
pub struct FeatureRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FeatureRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// One row for every client in the account registry, activity or not
    pub async fn get_client_features(&self) -> DbResult<Vec<ClientFeatureRecord>> {
        let records = sqlx::query_as::<_, ClientFeatureRecord>(FEATURE_ROWS_SQL)
            .bind(ACTIVITY_SENTINEL)
            .fetch_all(self.pool)
            .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ledger::{account, LedgerRepository};
    use crate::Database;

    #[tokio::test]
    async fn test_features_aggregate_logins_to_client() {
        let db = Database::in_memory().await.unwrap();
        let ledger = LedgerRepository::new(db.pool());
        ledger.insert_account(&account("c1", "l1", "web")).await.unwrap();
        ledger.insert_account(&account("c1", "l2", "web")).await.unwrap();
        ledger.insert_commission("l1", Some(10.0), Some("2024-01-01")).await.unwrap();
        ledger.insert_commission("l1", Some(5.0), Some("2024-02-01")).await.unwrap();
        ledger.insert_commission("l2", Some(2.5), Some("2024-02-01")).await.unwrap();
        ledger.insert_trades("l1", Some(3), Some("2024-03-01")).await.unwrap();
        ledger.insert_trades("l2", Some(4), Some("2024-03-15")).await.unwrap();
        ledger.insert_inouts("c1", Some(2), Some(1000.0), Some("2024-02-20")).await.unwrap();
        ledger.insert_inouts("c1", Some(1), Some(500.0), Some("2024-01-20")).await.unwrap();
        ledger.insert_exchange("c1", Some("2024-03-10")).await.unwrap();
        ledger.insert_balance("c1", Some(750.0)).await.unwrap();

        let rows = FeatureRepository::new(db.pool())
            .get_client_features()
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.client_id, "c1");
        assert_eq!(row.last_activity_date, "2024-03-15");
        assert_eq!(row.total_trades, Some(7));
        // 7 trades + 3 transfers, no fan-out between the two sources
        assert_eq!(row.total_frequency, 10);
        assert_eq!(row.sum_ins, Some(1500.0));
        assert_eq!(row.total_commission, Some(17.5));
        assert_eq!(row.balance, Some(750.0));
    }

    #[tokio::test]
    async fn test_features_keep_inactive_clients() {
        let db = Database::in_memory().await.unwrap();
        let ledger = LedgerRepository::new(db.pool());
        ledger.insert_account(&account("a", "la", "web")).await.unwrap();
        ledger.insert_account(&account("b", "lb", "partner")).await.unwrap();
        ledger.insert_exchange("a", Some("2024-05-01")).await.unwrap();

        let rows = FeatureRepository::new(db.pool())
            .get_client_features()
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].last_activity_date, "2024-05-01");
        let inactive = &rows[1];
        assert_eq!(inactive.client_id, "b");
        assert_eq!(inactive.last_activity_date, ACTIVITY_SENTINEL);
        assert_eq!(inactive.total_frequency, 0);
        assert_eq!(inactive.total_trades, None);
        assert_eq!(inactive.sum_ins, None);
        assert_eq!(inactive.total_commission, None);
        assert_eq!(inactive.balance, None);
    }
}
