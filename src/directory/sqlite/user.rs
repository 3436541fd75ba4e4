use anyhow::{Context, Result};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::types::record::UserRecord;

const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    identity_provider_key TEXT,
    ipv4_allow_list TEXT NOT NULL,
    config TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_user_name ON user(name);
"#;

/// Columns as stored, list and block fields are JSON text.
struct UserRow {
    name: String,
    identity_provider_key: Option<String>,
    ipv4_allow_list: String,
    config: String,
}

pub fn create_user_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLES)?;
    Ok(())
}

pub fn put_user(tx: &Transaction, user: &UserRecord) -> Result<()> {
    let allow_list = serde_json::to_string(&user.ipv4_allow_list)?;
    let config = serde_json::to_string(&user.config)?;
    let provider = user.identity_provider_key.as_deref();

    // Update in place so the record keeps its position in `query_users`.
    let sql = "UPDATE user SET ipv4_allow_list = ?, config = ? WHERE name = ? AND identity_provider_key IS ?";
    debug!("Directory put_user: {sql}, {}, {provider:?}", user.user);
    let updated = tx.execute(sql, params![allow_list, config, user.user, provider])?;
    if updated > 0 {
        return Ok(());
    }

    tx.execute(
        "INSERT INTO user (name, identity_provider_key, ipv4_allow_list, config) VALUES (?, ?, ?, ?)",
        params![user.user, provider, allow_list, config],
    )?;
    Ok(())
}

pub fn get_user(tx: &Transaction, name: &str, provider: &str) -> Result<Option<UserRecord>> {
    let sql = "SELECT name, identity_provider_key, ipv4_allow_list, config FROM user WHERE name = ? AND identity_provider_key = ?";
    debug!("Directory get_user: {sql}, {name}, {provider}");
    let mut stmt = tx.prepare(sql)?;
    let row = stmt
        .query_row(params![name, provider], read_row)
        .optional()?;
    match row {
        Some(row) => Ok(Some(convert_row(row)?)),
        None => Ok(None),
    }
}

pub fn query_users(tx: &Transaction, name: &str) -> Result<Vec<UserRecord>> {
    let sql = "SELECT name, identity_provider_key, ipv4_allow_list, config FROM user WHERE name = ? ORDER BY id";
    debug!("Directory query_users: {sql}, {name}");
    let mut stmt = tx.prepare(sql)?;
    let rows = stmt.query_map(params![name], read_row)?;

    let mut users = Vec::new();
    for row in rows {
        users.push(convert_row(row?)?);
    }
    Ok(users)
}

pub fn delete_user(tx: &Transaction, name: &str, provider: Option<&str>) -> Result<bool> {
    let sql = "DELETE FROM user WHERE name = ? AND identity_provider_key IS ?";
    debug!("Directory delete_user: {sql}, {name}, {provider:?}");
    let count = tx.execute(sql, params![name, provider])?;
    Ok(count > 0)
}

fn read_row(row: &Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        name: row.get(0)?,
        identity_provider_key: row.get(1)?,
        ipv4_allow_list: row.get(2)?,
        config: row.get(3)?,
    })
}

fn convert_row(row: UserRow) -> Result<UserRecord> {
    let ipv4_allow_list = serde_json::from_str(&row.ipv4_allow_list)
        .with_context(|| format!("decode ipv4_allow_list of user '{}'", row.name))?;
    let config = serde_json::from_str(&row.config)
        .with_context(|| format!("decode config of user '{}'", row.name))?;
    Ok(UserRecord {
        user: row.name,
        identity_provider_key: row.identity_provider_key,
        ipv4_allow_list,
        config,
    })
}
