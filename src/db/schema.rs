//! PostgreSQL schema
//!
//! Statuses are stored as TEXT using the lifecycle wire names. The item table
//! carries `status = 'sold' <=> quantity = 0` as a CHECK constraint so that a
//! bug in the decrement path cannot persist an inconsistent row.

use sqlx::PgPool;

/// Create all tables and indexes (idempotent)
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Initializing marketplace schema...");

    for (name, ddl) in STATEMENTS {
        sqlx::query(ddl).execute(pool).await.map_err(|e| {
            tracing::error!(statement = name, error = %e, "Schema statement failed");
            e
        })?;
    }

    tracing::info!("Marketplace schema initialized successfully");
    Ok(())
}

const STATEMENTS: &[(&str, &str)] = &[
    ("groups_tb", CREATE_GROUPS_TABLE),
    ("users_tb", CREATE_USERS_TABLE),
    ("items_tb", CREATE_ITEMS_TABLE),
    ("services_tb", CREATE_SERVICES_TABLE),
    ("transaction_requests_tb", CREATE_TRANSACTION_REQUESTS_TABLE),
    ("requested_items_tb", CREATE_REQUESTED_ITEMS_TABLE),
    ("service_requests_tb", CREATE_SERVICE_REQUESTS_TABLE),
    ("idx_items_status_created", CREATE_ITEMS_STATUS_INDEX),
    ("idx_services_status_created", CREATE_SERVICES_STATUS_INDEX),
    ("idx_requests_buyer", CREATE_REQUESTS_BUYER_INDEX),
    ("idx_requests_seller", CREATE_REQUESTS_SELLER_INDEX),
];

const CREATE_GROUPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS groups_tb (
    group_id    BIGSERIAL PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users_tb (
    user_id          BIGSERIAL PRIMARY KEY,
    name             TEXT NOT NULL,
    email            TEXT NOT NULL UNIQUE,
    contact_details  TEXT NOT NULL DEFAULT '',
    role             TEXT NOT NULL DEFAULT 'user',
    group_id         BIGINT REFERENCES groups_tb(group_id),
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS items_tb (
    item_id      BIGSERIAL PRIMARY KEY,
    owner_id     BIGINT NOT NULL REFERENCES users_tb(user_id),
    group_id     BIGINT NOT NULL REFERENCES groups_tb(group_id),
    title        TEXT NOT NULL,
    description  TEXT NOT NULL,
    price        NUMERIC(12, 2) NOT NULL CHECK (price >= 0),
    image        TEXT,
    item_type    TEXT NOT NULL CHECK (item_type IN ('sell', 'exchange')),
    status       TEXT NOT NULL DEFAULT 'pending'
                 CHECK (status IN ('pending', 'approved', 'rejected', 'sold')),
    quantity     INTEGER NOT NULL DEFAULT 1 CHECK (quantity >= 0),
    created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT items_sold_iff_empty CHECK ((status = 'sold') = (quantity = 0))
)
"#;

const CREATE_SERVICES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS services_tb (
    service_id   BIGSERIAL PRIMARY KEY,
    owner_id     BIGINT NOT NULL REFERENCES users_tb(user_id),
    group_id     BIGINT NOT NULL REFERENCES groups_tb(group_id),
    title        TEXT NOT NULL,
    description  TEXT NOT NULL,
    price        NUMERIC(12, 2) NOT NULL CHECK (price >= 0),
    image        TEXT,
    category     TEXT NOT NULL,
    status       TEXT NOT NULL DEFAULT 'pending'
                 CHECK (status IN ('pending', 'approved', 'rejected')),
    created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_TRANSACTION_REQUESTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transaction_requests_tb (
    request_id       BIGSERIAL PRIMARY KEY,
    buyer_id         BIGINT NOT NULL REFERENCES users_tb(user_id),
    seller_id        BIGINT NOT NULL REFERENCES users_tb(user_id),
    item_id          BIGINT NOT NULL REFERENCES items_tb(item_id),
    offered_item_id  BIGINT REFERENCES items_tb(item_id),
    request_type     TEXT NOT NULL CHECK (request_type IN ('buy', 'exchange')),
    quantity         INTEGER NOT NULL DEFAULT 1 CHECK (quantity >= 1),
    status           TEXT NOT NULL DEFAULT 'pending'
                     CHECK (status IN ('pending', 'approved', 'rejected')),
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT requests_distinct_parties CHECK (buyer_id <> seller_id)
)
"#;

const CREATE_REQUESTED_ITEMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS requested_items_tb (
    requested_item_id  BIGSERIAL PRIMARY KEY,
    requester_id       BIGINT NOT NULL REFERENCES users_tb(user_id),
    group_id           BIGINT NOT NULL REFERENCES groups_tb(group_id),
    title              TEXT NOT NULL,
    description        TEXT NOT NULL,
    max_price          NUMERIC(12, 2) NOT NULL DEFAULT 0 CHECK (max_price >= 0),
    status             TEXT NOT NULL DEFAULT 'open'
                       CHECK (status IN ('open', 'fulfilled', 'closed')),
    created_at         TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at         TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_SERVICE_REQUESTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS service_requests_tb (
    service_request_id  BIGSERIAL PRIMARY KEY,
    requester_id        BIGINT NOT NULL REFERENCES users_tb(user_id),
    group_id            BIGINT NOT NULL REFERENCES groups_tb(group_id),
    title               TEXT NOT NULL,
    description         TEXT NOT NULL,
    budget              NUMERIC(12, 2) NOT NULL CHECK (budget >= 0),
    category            TEXT NOT NULL,
    status              TEXT NOT NULL DEFAULT 'open'
                        CHECK (status IN ('open', 'in-progress', 'completed', 'cancelled')),
    provider_id         BIGINT REFERENCES users_tb(user_id),
    accepted_at         TIMESTAMPTZ,
    completed_at        TIMESTAMPTZ,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

// Sweep candidate scans: WHERE status = 'pending' AND created_at < $cutoff
const CREATE_ITEMS_STATUS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_items_status_created ON items_tb (status, created_at)";

const CREATE_SERVICES_STATUS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_services_status_created ON services_tb (status, created_at)";

const CREATE_REQUESTS_BUYER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_requests_buyer ON transaction_requests_tb (buyer_id)";

const CREATE_REQUESTS_SELLER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_requests_seller ON transaction_requests_tb (seller_id)";
