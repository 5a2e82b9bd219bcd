//! SQL DDL for initializing the hotline database.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT on every table
/// - timestamps stored as RFC3339 TEXT
/// - booleans stored as INTEGER 0/1
/// - `hotlines.slug` UNIQUE; the separate slug index is kept anyway to
///   mirror the declared index set
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS numbers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    number TEXT NOT NULL,
    country TEXT NOT NULL DEFAULT 'US',
    features TEXT NOT NULL -- opaque text, format owned by NumberFeatures
);

CREATE INDEX IF NOT EXISTS idx_numbers_number ON numbers(number);

CREATE TABLE IF NOT EXISTS hotlines (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    -- Number assignment. The number text is stored destructured next to the
    -- foreign key so inbound-call lookups skip a join: the two columns are
    -- only ever written together, inside one transaction.
    primary_number TEXT NULL,
    primary_number_id INTEGER NULL REFERENCES numbers(id),
    country TEXT NOT NULL DEFAULT 'US',
    voice_greeting TEXT NULL
);

CREATE INDEX IF NOT EXISTS idx_hotlines_slug ON hotlines(slug);
CREATE INDEX IF NOT EXISTS idx_hotlines_primary_number ON hotlines(primary_number);

CREATE TABLE IF NOT EXISTS hotline_members (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    hotline_id INTEGER NOT NULL REFERENCES hotlines(id),
    name TEXT NOT NULL,
    number TEXT NOT NULL,
    verified INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_members_hotline_verified ON hotline_members(hotline_id, verified);
CREATE INDEX IF NOT EXISTS idx_members_number_verified ON hotline_members(number, verified);

CREATE TABLE IF NOT EXISTS hotline_admins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    hotline_id INTEGER NOT NULL REFERENCES hotlines(id),
    user_id TEXT NULL,
    user_name TEXT NULL,
    user_email TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_admins_user_id ON hotline_admins(user_id);

CREATE TABLE IF NOT EXISTS audit_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL, -- RFC3339
    kind INTEGER NOT NULL,
    description TEXT NULL,
    hotline_id INTEGER NULL REFERENCES hotlines(id),
    user TEXT NULL,
    metadata TEXT NULL, -- opaque serialized blob
    reporter_number TEXT NULL
);

CREATE INDEX IF NOT EXISTS idx_audit_hotline_timestamp ON audit_log(hotline_id, timestamp);

CREATE TABLE IF NOT EXISTS block_list (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL, -- RFC3339
    hotline_id INTEGER NOT NULL REFERENCES hotlines(id),
    number TEXT NOT NULL,
    blocked_by TEXT NULL
);
"#;
