//! Channel repository — acquisition-channel aggregation queries

use crate::DbResult;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// Number of accounts opened through a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ChannelUserCount {
    pub channel: Option<String>,
    pub user_count: i64,
}

/// Commission earned through a channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ChannelCommission {
    pub channel: Option<String>,
    pub total_commission: Option<f64>,
}

/// First and last activity seen for one login
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoginActivitySpan {
    pub channel: Option<String>,
    pub login: String,
    pub first_activity: Option<String>,
    pub last_activity: Option<String>,
}

/// Repository for channel attribution queries
pub struct ChannelRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChannelRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Accounts per channel, largest channel first
    pub async fn get_user_counts(&self) -> DbResult<Vec<ChannelUserCount>> {
        let records = sqlx::query_as::<_, ChannelUserCount>(
            r#"SELECT channel, COUNT(*) AS user_count
               FROM accounts
               GROUP BY channel
               ORDER BY user_count DESC, channel"#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// Commission per channel (joined on login), highest total first
    pub async fn get_commission_sums(&self) -> DbResult<Vec<ChannelCommission>> {
        let records = sqlx::query_as::<_, ChannelCommission>(
            r#"SELECT a.channel AS channel,
                      CAST(SUM(c.comission) AS REAL) AS total_commission
               FROM accounts a
               JOIN commissions c ON a.login = c.login
               GROUP BY a.channel
               ORDER BY total_commission DESC, a.channel"#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// Earliest and latest activity per login across all four activity sources.
    /// Logins without any activity come back with both dates `NULL`.
    pub async fn get_login_activity_spans(&self) -> DbResult<Vec<LoginActivitySpan>> {
        let records = sqlx::query_as::<_, LoginActivitySpan>(
            r#"
            WITH activity AS (
              SELECT a.login, c.date_trunc AS activity_date
              FROM accounts a JOIN commissions c ON c.login = a.login
              UNION ALL
              SELECT a.login, t.date_last_activity
              FROM accounts a JOIN trades t ON t.login = a.login
              UNION ALL
              SELECT a.login, e.date_last_conv
              FROM accounts a JOIN exchange e ON e.client_id = a.client_id
              UNION ALL
              SELECT a.login, i.date_last_inouts
              FROM accounts a JOIN inouts i ON i.client_id = a.client_id
            )
            SELECT a.channel AS channel,
                   a.login AS login,
                   MIN(act.activity_date) AS first_activity,
                   MAX(act.activity_date) AS last_activity
            FROM accounts a
            LEFT JOIN activity act ON act.login = a.login
            GROUP BY a.channel, a.login
            ORDER BY a.channel, a.login
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }
}
