use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ichef::ledger::error::{Result, SyncError};
use crate::ichef::ledger::merge::{AliasMap, KeyColumns};

/// Prefix of the table id shipped in the sample configuration.
const PLACEHOLDER_PREFIX: &str = "REPLACE_WITH";

/// Sync configuration, loaded once at startup and passed by reference.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    pub sheets: SheetsConfig,
    /// Extra column aliases on top of the built-in export renames.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one workbook per table id.
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("tables"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub downloads: PathBuf,
    pub archive: PathBuf,
    pub rewards: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            downloads: PathBuf::from("downloads"),
            archive: PathBuf::from("downloads/processed"),
            rewards: PathBuf::from("reward_cards"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SheetsConfig {
    pub orders: Option<TableConfig>,
    pub product_sales: Option<TableConfig>,
    pub product_master: Option<TableConfig>,
    pub reward_cards: Option<TableConfig>,
    pub reward_points: Option<TableConfig>,
}

/// Location of one synced table.
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    #[serde(default)]
    pub id: String,
    pub sheet_name: String,
    #[serde(default)]
    pub columns: ColumnsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnsConfig {
    /// Master-table column holding the entity name.
    pub name: Option<String>,
    /// Identifier half of the dedup key; defaults to the invoice number.
    pub identifier: Option<String>,
    /// Timestamp half of the dedup key; defaults to the checkout time.
    pub timestamp: Option<String>,
}

/// Keys of the tables the sync run writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKey {
    Orders,
    ProductSales,
    ProductMaster,
    RewardCards,
    RewardPoints,
}

impl TableKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKey::Orders => "orders",
            TableKey::ProductSales => "product_sales",
            TableKey::ProductMaster => "product_master",
            TableKey::RewardCards => "reward_cards",
            TableKey::RewardPoints => "reward_points",
        }
    }
}

impl std::fmt::Display for TableKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TableConfig {
    /// Whether the id is unset or still the sample placeholder.
    pub fn is_placeholder(&self) -> bool {
        let id = self.id.trim();
        id.is_empty() || id.starts_with(PLACEHOLDER_PREFIX)
    }

    /// Dedup key columns, with unset halves taken from the defaults.
    pub fn key_columns(&self) -> KeyColumns {
        let defaults = KeyColumns::default();
        KeyColumns {
            identifier: self.columns.identifier.clone().unwrap_or(defaults.identifier),
            timestamp: self.columns.timestamp.clone().unwrap_or(defaults.timestamp),
        }
    }
}

impl SyncConfig {
    /// Loads the JSON configuration at `path`; relative paths inside it are
    /// resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SyncError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_json(&source, base_dir)
    }

    pub fn from_json(source: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut config: SyncConfig = serde_json::from_str(source)?;
        config.base_dir = base_dir.into();
        Ok(config)
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn store_root(&self) -> PathBuf {
        self.resolve(&self.store.root)
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.resolve(&self.paths.downloads)
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.resolve(&self.paths.archive)
    }

    pub fn rewards_dir(&self) -> PathBuf {
        self.resolve(&self.paths.rewards)
    }

    /// Configured table for `key`, or `ConfigurationMissing` when the entry
    /// is absent or its id is a placeholder.
    pub fn table(&self, key: TableKey) -> Result<&TableConfig> {
        let entry = match key {
            TableKey::Orders => self.sheets.orders.as_ref(),
            TableKey::ProductSales => self.sheets.product_sales.as_ref(),
            TableKey::ProductMaster => self.sheets.product_master.as_ref(),
            TableKey::RewardCards => self.sheets.reward_cards.as_ref(),
            TableKey::RewardPoints => self.sheets.reward_points.as_ref(),
        };
        entry
            .filter(|table| !table.is_placeholder())
            .ok_or_else(|| SyncError::ConfigurationMissing(key.to_string()))
    }

    /// Built-in export aliases plus the configured extras.
    pub fn alias_map(&self) -> AliasMap {
        let mut aliases = AliasMap::pos_defaults();
        aliases.extend(
            self.aliases
                .iter()
                .map(|(left, right)| (left.as_str(), right.as_str())),
        );
        aliases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "store": { "root": "tables" },
        "sheets": {
            "orders": { "id": "REPLACE_WITH_ORDER_SHEET_ID_HERE", "sheet_name": "工作表1" },
            "product_master": {
                "id": "master",
                "sheet_name": "商品主檔",
                "columns": { "name": "原始名稱" }
            }
        },
        "aliases": { "舊欄位": "新欄位" }
    }"#;

    #[test]
    fn placeholder_and_absent_tables_are_missing() {
        let config = SyncConfig::from_json(SAMPLE, "/srv/sync").expect("config parsed");
        assert!(matches!(
            config.table(TableKey::Orders),
            Err(SyncError::ConfigurationMissing(name)) if name == "orders"
        ));
        assert!(config.table(TableKey::RewardCards).is_err());

        let master = config.table(TableKey::ProductMaster).expect("master configured");
        assert_eq!(master.columns.name.as_deref(), Some("原始名稱"));
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let config = SyncConfig::from_json(SAMPLE, "/srv/sync").expect("config parsed");
        assert_eq!(config.store_root(), PathBuf::from("/srv/sync/tables"));
        assert_eq!(
            config.archive_dir(),
            PathBuf::from("/srv/sync/downloads/processed")
        );
    }

    #[test]
    fn key_columns_fall_back_per_half() {
        let source = r#"{
            "sheets": {
                "product_sales": {
                    "id": "sales",
                    "sheet_name": "商品銷售",
                    "columns": { "identifier": "品項編號" }
                },
                "orders": { "id": "orders", "sheet_name": "工作表1" }
            }
        }"#;
        let config = SyncConfig::from_json(source, "/").expect("config parsed");

        let sales = config.table(TableKey::ProductSales).expect("sales configured");
        assert_eq!(sales.key_columns().identifier, "品項編號");
        assert_eq!(sales.key_columns().timestamp, "結帳時間");

        let orders = config.table(TableKey::Orders).expect("orders configured");
        assert_eq!(orders.key_columns(), KeyColumns::default());
    }

    #[test]
    fn configured_aliases_extend_defaults() {
        let config = SyncConfig::from_json(SAMPLE, "/").expect("config parsed");
        let aliases = config.alias_map();
        assert_eq!(aliases.get("新欄位"), Some("舊欄位"));
        assert_eq!(aliases.get("發票金額"), Some("結帳金額"));
    }
}
