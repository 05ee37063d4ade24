//! JSON export/import of the whole local store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cpd_core::errors::{CpdError, CpdResult, StorageError};
use cpd_core::model::{Asset, Subscription};

use crate::connection::Database;
use crate::queries::{asset_ops, subscription_ops};
use crate::to_storage_err;

const BACKUP_VERSION: u32 = 1;

/// Versioned backup envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct Backup {
    pub version: u32,
    pub export_date: DateTime<Utc>,
    pub assets: Vec<Asset>,
    pub subscriptions: Vec<Subscription>,
}

/// Export every asset and subscription as a pretty-printed JSON string.
pub fn export_data(db: &Database) -> CpdResult<String> {
    let backup = Backup {
        version: BACKUP_VERSION,
        export_date: Utc::now(),
        assets: db.all_assets()?,
        subscriptions: db.all_subscriptions()?,
    };
    Ok(serde_json::to_string_pretty(&backup)?)
}

/// Replace the store's contents with a previously exported backup.
/// Clear and reload run in one transaction: a malformed record leaves
/// the existing data untouched.
pub fn import_data(db: &Database, json: &str) -> CpdResult<()> {
    let backup: Backup = serde_json::from_str(json).map_err(|e| {
        CpdError::StorageError(StorageError::ImportRejected {
            reason: format!("malformed backup: {e}"),
        })
    })?;
    if backup.version != BACKUP_VERSION {
        return Err(CpdError::StorageError(StorageError::ImportRejected {
            reason: format!("unsupported backup version: {}", backup.version),
        }));
    }

    db.with_conn(|conn| {
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| to_storage_err(e.to_string()))?;
        asset_ops::replace_all(&tx, &backup.assets)?;
        subscription_ops::replace_all(&tx, &backup.subscriptions)?;
        tx.commit().map_err(|e| to_storage_err(e.to_string()))?;
        tracing::info!(
            assets = backup.assets.len(),
            subscriptions = backup.subscriptions.len(),
            "imported backup"
        );
        Ok(())
    })
}
