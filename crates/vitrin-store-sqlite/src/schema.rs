//! SQL schema for the Vitrin SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS categories (
    category_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT,
    created_at  TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS products (
    product_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    price       REAL NOT NULL    CHECK (price >= 0),
    image       TEXT NOT NULL,
    category_id TEXT NOT NULL    REFERENCES categories(category_id),
    stock       INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
    rating      REAL NOT NULL    DEFAULT 0 CHECK (rating BETWEEN 0 AND 5),
    num_reviews INTEGER NOT NULL DEFAULT 0 CHECK (num_reviews >= 0),
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS campaigns (
    campaign_id TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    subtitle    TEXT,
    cta_text    TEXT NOT NULL,
    cta_url     TEXT NOT NULL,
    image       TEXT,
    active      INTEGER NOT NULL DEFAULT 0,
    priority    INTEGER NOT NULL DEFAULT 0,
    starts_at   TEXT,            -- NULL = unbounded on that side
    ends_at     TEXT,            -- NULL = unbounded on that side
    created_at  TEXT NOT NULL
);

-- Deliberately no foreign key on product_id: a deal may outlive its
-- product, and reads drop such deals instead of failing.
CREATE TABLE IF NOT EXISTS deals (
    deal_id          TEXT PRIMARY KEY,
    product_id       TEXT NOT NULL,
    discount_percent INTEGER NOT NULL CHECK (discount_percent BETWEEN 0 AND 100),
    starts_at        TEXT NOT NULL,
    ends_at          TEXT NOT NULL,
    limited_stock    INTEGER,
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS brands (
    brand_id   TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    logo       TEXT,
    website    TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS testimonials (
    testimonial_id TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    text           TEXT NOT NULL,
    rating         REAL NOT NULL DEFAULT 5 CHECK (rating BETWEEN 0 AND 5),
    image          TEXT,
    product_id     TEXT,
    created_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,   -- stored lowercase
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    is_admin      INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,          -- hex SHA-256 of the bearer token
    user_id    TEXT NOT NULL REFERENCES users(user_id),
    expires_at TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Full-text shadow table over product name/description, kept in sync by
-- triggers. The primary tier of product search; LIKE is the fallback.
CREATE VIRTUAL TABLE IF NOT EXISTS products_fts USING fts5(
    name, description,
    content = 'products',
    content_rowid = 'rowid'
);

CREATE TRIGGER IF NOT EXISTS products_fts_insert AFTER INSERT ON products BEGIN
    INSERT INTO products_fts (rowid, name, description)
    VALUES (new.rowid, new.name, new.description);
END;

CREATE TRIGGER IF NOT EXISTS products_fts_delete AFTER DELETE ON products BEGIN
    INSERT INTO products_fts (products_fts, rowid, name, description)
    VALUES ('delete', old.rowid, old.name, old.description);
END;

CREATE TRIGGER IF NOT EXISTS products_fts_update AFTER UPDATE ON products BEGIN
    INSERT INTO products_fts (products_fts, rowid, name, description)
    VALUES ('delete', old.rowid, old.name, old.description);
    INSERT INTO products_fts (rowid, name, description)
    VALUES (new.rowid, new.name, new.description);
END;

CREATE INDEX IF NOT EXISTS products_category_idx ON products(category_id);
CREATE INDEX IF NOT EXISTS products_created_idx  ON products(created_at);
CREATE INDEX IF NOT EXISTS products_reviews_idx  ON products(num_reviews, rating);
CREATE INDEX IF NOT EXISTS deals_window_idx      ON deals(starts_at, ends_at);
CREATE INDEX IF NOT EXISTS sessions_user_idx     ON sessions(user_id);

PRAGMA user_version = 1;
";
