//! Ledger repository — write side of the brokerage ledger
//!
//! The production ledger is filled by the back-office loader. These inserts
//! build test fixtures and are only compiled for tests or with the
//! `test-fixtures` feature.

use crate::DbResult;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// One login in the account registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub client_id: String,
    pub login: String,
    pub channel: Option<String>,
}

/// Repository for inserting ledger rows
pub struct LedgerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LedgerRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_account(&self, account: &AccountRecord) -> DbResult<()> {
        sqlx::query("INSERT INTO accounts (client_id, login, channel) VALUES (?1, ?2, ?3)")
            .bind(&account.client_id)
            .bind(&account.login)
            .bind(&account.channel)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_commission(
        &self,
        login: &str,
        commission: Option<f64>,
        date: Option<&str>,
    ) -> DbResult<()> {
        sqlx::query("INSERT INTO commissions (login, comission, date_trunc) VALUES (?1, ?2, ?3)")
            .bind(login)
            .bind(commission)
            .bind(date)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_trades(
        &self,
        login: &str,
        cnt_trades: Option<i64>,
        date_last_activity: Option<&str>,
    ) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO trades (login, cnt_trades, date_last_activity) VALUES (?1, ?2, ?3)",
        )
        .bind(login)
        .bind(cnt_trades)
        .bind(date_last_activity)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_exchange(&self, client_id: &str, date_last_conv: Option<&str>) -> DbResult<()> {
        sqlx::query("INSERT INTO exchange (client_id, date_last_conv) VALUES (?1, ?2)")
            .bind(client_id)
            .bind(date_last_conv)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    pub async fn insert_inouts(
        &self,
        client_id: &str,
        cnt_inouts: Option<i64>,
        sum_ins: Option<f64>,
        date_last_inouts: Option<&str>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"INSERT INTO inouts (client_id, cnt_inouts, sum_ins, date_last_inouts)
               VALUES (?1, ?2, ?3, ?4)"#,
        )
        .bind(client_id)
        .bind(cnt_inouts)
        .bind(sum_ins)
        .bind(date_last_inouts)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_balance(&self, client_id: &str, balance: Option<f64>) -> DbResult<()> {
        sqlx::query("INSERT INTO balance (client_id, balance) VALUES (?1, ?2)")
            .bind(client_id)
            .bind(balance)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

/// Shorthand for building an [`AccountRecord`]
pub fn account(client_id: &str, login: &str, channel: &str) -> AccountRecord {
    AccountRecord {
        client_id: client_id.to_string(),
        login: login.to_string(),
        channel: Some(channel.to_string()),
    }
}
