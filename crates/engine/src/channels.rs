//! Channel Aggregator — acquisition-channel reports behind a TTL cache
//!
//! Three report kinds, picked by the `type` query parameter:
//! - `user_count`:     accounts per channel (also the fallback for unknown values)
//! - `commission_sum`: commission per channel, highest first
//! - `lifetime`:       mean per-login activity span in days, per channel

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use persistence::repository::channels::{ChannelRepository, LoginActivitySpan};
use persistence::{DbResult, SqlitePool};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::TtlCache;
use crate::features::parse_ledger_date;
use crate::types::ChannelRecord;

/// Report selected by the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    UserCount,
    CommissionSum,
    Lifetime,
}

impl ReportKind {
    /// Parse the `type` parameter; anything unrecognized means `user_count`
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some("commission_sum") => Self::CommissionSum,
            Some("lifetime") => Self::Lifetime,
            _ => Self::UserCount,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserCount => "user_count",
            Self::CommissionSum => "commission_sum",
            Self::Lifetime => "lifetime",
        }
    }

    pub fn cache_key(&self) -> String {
        format!("channels_data_{}", self.as_str())
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs channel reports against the ledger, memoizing each kind for `ttl`
pub struct ChannelAggregator {
    pool: SqlitePool,
    cache: TtlCache<Vec<ChannelRecord>>,
}

impl ChannelAggregator {
    pub fn new(pool: SqlitePool, ttl: Duration) -> Self {
        Self {
            pool,
            cache: TtlCache::new(ttl),
        }
    }

    /// Cached report. Failures are returned to the caller and never cached.
    pub async fn report(&self, kind: ReportKind) -> DbResult<Vec<ChannelRecord>> {
        let key = kind.cache_key();
        if let Some(records) = self.cache.get(&key) {
            debug!(report = %kind, "Channel report served from cache");
            return Ok(records);
        }

        let records = self.compute(kind).await?;
        info!(
            report = %kind,
            rows = records.len(),
            ttl_secs = self.cache.ttl().as_secs(),
            "Channel report computed"
        );
        self.cache.insert(key, records.clone());
        Ok(records)
    }

    /// Run the report against the ledger, bypassing the cache
    pub async fn compute(&self, kind: ReportKind) -> DbResult<Vec<ChannelRecord>> {
        let repo = ChannelRepository::new(&self.pool);
        let records = match kind {
            ReportKind::UserCount => repo
                .get_user_counts()
                .await?
                .into_iter()
                .map(|r| ChannelRecord::UserCount {
                    channel: r.channel,
                    user_count: r.user_count,
                })
                .collect(),
            ReportKind::CommissionSum => repo
                .get_commission_sums()
                .await?
                .into_iter()
                .map(|r| ChannelRecord::CommissionSum {
                    channel: r.channel,
                    total_commission: r.total_commission.unwrap_or(0.0),
                })
                .collect(),
            ReportKind::Lifetime => average_lifetimes(&repo.get_login_activity_spans().await?),
        };

        Ok(records)
    }
}

/// Lifetime of one login in whole days, floored at zero.
/// `None` when the login has no parseable activity.
pub fn login_lifetime_days(span: &LoginActivitySpan) -> Option<i64> {
    let first = parse_ledger_date(span.first_activity.as_deref()?)?;
    let last = parse_ledger_date(span.last_activity.as_deref()?)?;
    Some((last - first).num_days().max(0))
}

/// Mean lifetime per channel, ordered by channel. Logins without a channel are
/// skipped. Logins without activity are left out of the mean; a channel with
/// none active reports `None`.
pub fn average_lifetimes(spans: &[LoginActivitySpan]) -> Vec<ChannelRecord> {
    let mut per_channel: BTreeMap<&str, (i64, u32)> = BTreeMap::new();

    for span in spans {
        let Some(channel) = span.channel.as_deref() else {
            continue;
        };
        let entry = per_channel.entry(channel).or_insert((0, 0));
        if let Some(days) = login_lifetime_days(span) {
            entry.0 += days;
            entry.1 += 1;
        }
    }

    per_channel
        .into_iter()
        .map(|(channel, (total_days, logins))| ChannelRecord::Lifetime {
            channel: Some(channel.to_string()),
            avg_lifetime_days: (logins > 0).then(|| total_days as f64 / f64::from(logins)),
        })
        .collect()
}
