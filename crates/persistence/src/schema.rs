//! Ledger schema definitions
//!
//! The ledger is owned by the back-office loader; these statements only make
//! sure a fresh database has the shape the aggregation queries expect.

/// SQL to create all ledger tables
/// NOTE: dates are ISO-8601 TEXT (`YYYY-MM-DD`, optionally with a time suffix)
pub const CREATE_TABLES: &str = r#"
-- Account registry: one row per login, several logins per client
CREATE TABLE IF NOT EXISTS accounts (
    client_id TEXT NOT NULL,
    login TEXT NOT NULL,
    channel TEXT
);

-- Commission ledger, one row per login per period
CREATE TABLE IF NOT EXISTS commissions (
    login TEXT NOT NULL,
    comission REAL,
    date_trunc TEXT
);

-- Trading activity per login
CREATE TABLE IF NOT EXISTS trades (
    login TEXT NOT NULL,
    cnt_trades INTEGER,
    date_last_activity TEXT
);

-- Currency conversions per client
CREATE TABLE IF NOT EXISTS exchange (
    client_id TEXT NOT NULL,
    date_last_conv TEXT
);

-- Deposits and withdrawals per client
CREATE TABLE IF NOT EXISTS inouts (
    client_id TEXT NOT NULL,
    cnt_inouts INTEGER,
    sum_ins REAL,
    date_last_inouts TEXT
);

-- Balance snapshot per client
CREATE TABLE IF NOT EXISTS balance (
    client_id TEXT NOT NULL,
    balance REAL
);

-- ========== INDEXES ==========

CREATE INDEX IF NOT EXISTS idx_accounts_client ON accounts(client_id);
CREATE INDEX IF NOT EXISTS idx_accounts_login ON accounts(login);
CREATE INDEX IF NOT EXISTS idx_commissions_login ON commissions(login);
CREATE INDEX IF NOT EXISTS idx_trades_login ON trades(login);
CREATE INDEX IF NOT EXISTS idx_exchange_client ON exchange(client_id);
CREATE INDEX IF NOT EXISTS idx_inouts_client ON inouts(client_id);
CREATE INDEX IF NOT EXISTS idx_balance_client ON balance(client_id)
"#;
