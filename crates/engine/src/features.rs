//! Feature Loader — one typed feature row per client

use chrono::NaiveDate;
use persistence::repository::features::{ClientFeatureRecord, FeatureRepository, ACTIVITY_SENTINEL};
use persistence::{DbResult, SqlitePool};
use tracing::{debug, warn};

use crate::types::ClientFeatureRow;

/// Load feature rows for every client in the account registry
pub async fn load_feature_rows(pool: &SqlitePool) -> DbResult<Vec<ClientFeatureRow>> {
    let records = FeatureRepository::new(pool).get_client_features().await?;
    let rows: Vec<ClientFeatureRow> = records.into_iter().map(ClientFeatureRow::from).collect();

    let inactive = rows.iter().filter(|r| r.last_activity_date.is_none()).count();
    debug!(clients = rows.len(), inactive, "Loaded client feature rows");

    Ok(rows)
}

/// Parse a ledger date (`YYYY-MM-DD`, optionally followed by a time part)
pub fn parse_ledger_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

impl From<ClientFeatureRecord> for ClientFeatureRow {
    fn from(record: ClientFeatureRecord) -> Self {
        let last_activity_date = if record.last_activity_date == ACTIVITY_SENTINEL {
            None
        } else {
            let parsed = parse_ledger_date(&record.last_activity_date);
            if parsed.is_none() {
                warn!(
                    client_id = %record.client_id,
                    raw = %record.last_activity_date,
                    "Unparseable activity date, treating client as inactive"
                );
            }
            parsed
        };

        Self {
            client_id: record.client_id,
            last_activity_date,
            total_frequency: record.total_frequency,
            balance: record.balance,
            sum_ins: record.sum_ins,
            total_commission: record.total_commission,
            total_trades: record.total_trades,
        }
    }
}
