use anyhow::{Context, Result};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::types::record::IdentityProviderRecord;

const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS identity_provider (
    provider TEXT PRIMARY KEY NOT NULL,
    disabled INTEGER NOT NULL,
    ipv4_allow_list TEXT NOT NULL,
    module TEXT,
    module_config TEXT NOT NULL,
    config TEXT NOT NULL
);
"#;

struct ProviderRow {
    provider: String,
    disabled: bool,
    ipv4_allow_list: String,
    module: Option<String>,
    module_config: String,
    config: String,
}

pub fn create_provider_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLES)?;
    Ok(())
}

pub fn put_provider(tx: &Transaction, provider: &IdentityProviderRecord) -> Result<()> {
    let sql = r#"
    INSERT INTO identity_provider (provider, disabled, ipv4_allow_list, module, module_config, config)
    VALUES (?, ?, ?, ?, ?, ?)
    ON CONFLICT(provider) DO UPDATE SET
        disabled = excluded.disabled,
        ipv4_allow_list = excluded.ipv4_allow_list,
        module = excluded.module,
        module_config = excluded.module_config,
        config = excluded.config
    "#;
    debug!("Directory put_provider: {}", provider.provider);
    tx.execute(
        sql,
        params![
            provider.provider,
            provider.disabled,
            serde_json::to_string(&provider.ipv4_allow_list)?,
            provider.module,
            serde_json::to_string(&provider.module_config)?,
            serde_json::to_string(&provider.config)?,
        ],
    )?;
    Ok(())
}

pub fn get_provider(tx: &Transaction, key: &str) -> Result<Option<IdentityProviderRecord>> {
    let sql = "SELECT provider, disabled, ipv4_allow_list, module, module_config, config FROM identity_provider WHERE provider = ?";
    debug!("Directory get_provider: {sql}, {key}");
    let mut stmt = tx.prepare(sql)?;
    let row = stmt.query_row(params![key], read_row).optional()?;
    match row {
        Some(row) => Ok(Some(convert_row(row)?)),
        None => Ok(None),
    }
}

pub fn list_providers(tx: &Transaction) -> Result<Vec<IdentityProviderRecord>> {
    let sql = "SELECT provider, disabled, ipv4_allow_list, module, module_config, config FROM identity_provider ORDER BY provider";
    debug!("Directory list_providers: {sql}");
    let mut stmt = tx.prepare(sql)?;
    let rows = stmt.query_map([], read_row)?;

    let mut providers = Vec::new();
    for row in rows {
        providers.push(convert_row(row?)?);
    }
    Ok(providers)
}

pub fn delete_provider(tx: &Transaction, key: &str) -> Result<bool> {
    let sql = "DELETE FROM identity_provider WHERE provider = ?";
    debug!("Directory delete_provider: {sql}, {key}");
    let count = tx.execute(sql, params![key])?;
    Ok(count > 0)
}

fn read_row(row: &Row) -> rusqlite::Result<ProviderRow> {
    Ok(ProviderRow {
        provider: row.get(0)?,
        disabled: row.get(1)?,
        ipv4_allow_list: row.get(2)?,
        module: row.get(3)?,
        module_config: row.get(4)?,
        config: row.get(5)?,
    })
}

fn convert_row(row: ProviderRow) -> Result<IdentityProviderRecord> {
    let ipv4_allow_list = serde_json::from_str(&row.ipv4_allow_list)
        .with_context(|| format!("decode ipv4_allow_list of provider '{}'", row.provider))?;
    let module_config = serde_json::from_str(&row.module_config)
        .with_context(|| format!("decode module_config of provider '{}'", row.provider))?;
    let config = serde_json::from_str(&row.config)
        .with_context(|| format!("decode config of provider '{}'", row.provider))?;
    Ok(IdentityProviderRecord {
        provider: row.provider,
        disabled: row.disabled,
        ipv4_allow_list,
        module: row.module,
        module_config,
        config,
    })
}
