/// Schema for named response caches and worker version slots.
pub const CACHE_SCHEMA: &str = r#"
-- One row per named cache (a deployed worker version)
CREATE TABLE IF NOT EXISTS caches (
    name TEXT PRIMARY KEY,
    created_seq INTEGER NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Stored responses, keyed by request identity hash
CREATE TABLE IF NOT EXISTS cache_entries (
    cache_name TEXT NOT NULL,
    request_hash TEXT NOT NULL,
    method TEXT NOT NULL,
    url TEXT NOT NULL,
    status INTEGER NOT NULL,
    headers TEXT NOT NULL,
    body BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (cache_name, request_hash),
    FOREIGN KEY (cache_name) REFERENCES caches(name) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_cache_entries_name ON cache_entries(cache_name);

-- Which version is active and which is waiting to activate
CREATE TABLE IF NOT EXISTS worker_slots (
    slot TEXT PRIMARY KEY,
    version TEXT NOT NULL
);
"#;

/// Schema for the local task store.
pub const TASK_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    status TEXT NOT NULL,
    position INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_position ON tasks(position);
"#;
