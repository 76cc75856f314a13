//! SQL schema for the sbtb SQLite store.
//!
//! Executed once at connection startup. Natural keys are UNIQUE columns so
//! every write can be expressed as `INSERT … ON CONFLICT … DO UPDATE`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS fight_organizations (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE
                CHECK (name IN ('UFC', 'WBO', 'WBC', 'IBF', 'WBA')),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    deleted_at  TEXT
);

CREATE TABLE IF NOT EXISTS weight_classes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,   -- lower-case
    pounds      INTEGER,
    kilos       INTEGER,
    upper_limit INTEGER,                -- NULL for the open class
    lower_limit INTEGER,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    deleted_at  TEXT
);

CREATE TABLE IF NOT EXISTS fighters (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,   -- trimmed, lower-case
    nickname    TEXT,
    age         INTEGER,
    wins        INTEGER,
    losses      INTEGER,
    draws       INTEGER,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    deleted_at  TEXT
);

-- Two fighters cannot hold the same position in the same org + weight class.
CREATE TABLE IF NOT EXISTS ranks (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    rank            REAL    NOT NULL,   -- 0.5 = interim champion
    fighter_id      INTEGER NOT NULL REFERENCES fighters(id),
    weight_class_id INTEGER NOT NULL REFERENCES weight_classes(id),
    organization_id INTEGER NOT NULL REFERENCES fight_organizations(id),
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL,
    deleted_at      TEXT,
    UNIQUE (rank, weight_class_id, organization_id)
);

CREATE TABLE IF NOT EXISTS fight_cards (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    event_name  TEXT NOT NULL UNIQUE,   -- '<a> vs <b>'
    location    TEXT NOT NULL,
    event_date  TEXT NOT NULL,          -- RFC 3339 UTC
    network     TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    deleted_at  TEXT
);

-- Rewritten wholesale on every fight-card run.
CREATE TABLE IF NOT EXISTS fight_card_fighters (
    fight_card_id INTEGER NOT NULL REFERENCES fight_cards(id),
    fighter_id    INTEGER NOT NULL REFERENCES fighters(id),
    position      INTEGER NOT NULL,
    PRIMARY KEY (fight_card_id, fighter_id)
);

CREATE INDEX IF NOT EXISTS ranks_fighter_idx     ON ranks(fighter_id);
CREATE INDEX IF NOT EXISTS fight_cards_date_idx  ON fight_cards(event_date);
CREATE INDEX IF NOT EXISTS card_fighters_fighter ON fight_card_fighters(fighter_id);

PRAGMA user_version = 1;
";
