//! Archetype store
//!
//! Tables are parsed into rows at load time; records are assembled on first
//! lookup and memoized per `(category, id)`.

use crate::header::ColumnKey;
use hwimpact_core::{
    ArchetypeRecord, ArchetypeRepository, ArchetypeValue, ComponentCategory, EngineConfig,
    LoadError,
};
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Id that stands for the configured fallback of a category
pub const DEFAULT_ID: &str = "default";

/// Cells of one row, aligned with the table's columns
type Row = Vec<Option<ArchetypeValue>>;

#[derive(Debug, Default)]
struct Table {
    columns: Vec<Option<ColumnKey>>,
    rows: BTreeMap<String, Row>,
}

impl Table {
    fn parse<R: Read>(origin: &str, reader: R) -> Result<Table, LoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| LoadError::Csv(format!("{}: {}", origin, e)))?
            .clone();
        let Some(id_index) = headers.iter().position(|h| h == "id") else {
            warn!(origin, "Archetype table has no 'id' column, loading it empty");
            return Ok(Table::default());
        };

        let columns: Vec<Option<ColumnKey>> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i == id_index {
                    return None;
                }
                let key = ColumnKey::parse(h);
                if key.is_none() {
                    warn!(origin, header = h, "Skipping unreadable archetype column");
                }
                key
            })
            .collect();

        let mut rows = BTreeMap::new();
        for (line, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| LoadError::Csv(format!("{}: {}", origin, e)))?;
            let id = record.get(id_index).unwrap_or("").to_string();
            if id.is_empty() {
                warn!(origin, line = line + 2, "Skipping archetype row without id");
                continue;
            }
            let cells = (0..columns.len())
                .map(|i| record.get(i).and_then(ArchetypeValue::parse))
                .collect();
            if rows.insert(id.clone(), cells).is_some() {
                warn!(origin, id = %id, "Duplicate archetype id, keeping the last row");
            }
        }

        Ok(Table { columns, rows })
    }

    fn record(&self, id: &str) -> Option<ArchetypeRecord> {
        let row = self.rows.get(id)?;
        let mut record = ArchetypeRecord::new(id);
        for (key, cell) in self.columns.iter().zip(row.iter()) {
            let Some(key) = key else { continue };
            match cell {
                Some(value) => record.set(&key.section, &key.attribute, key.bound, value.clone()),
                None => record.declare(&key.section, &key.attribute),
            }
        }
        Some(record)
    }
}

/// Read-only archetype tables keyed by category
#[derive(Debug, Default)]
pub struct ArchetypeStore {
    tables: HashMap<ComponentCategory, Table>,
    fallbacks: HashMap<ComponentCategory, String>,
    cache: RwLock<HashMap<(ComponentCategory, String), Option<ArchetypeRecord>>>,
}

impl ArchetypeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `<category>.csv` present in `dir`
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, LoadError> {
        let dir = dir.as_ref();
        let mut store = Self::new();
        for category in ComponentCategory::ALL {
            let path = dir.join(format!("{}.csv", category.as_str()));
            if !path.exists() {
                debug!(category = %category, "No archetype table");
                continue;
            }
            let file = std::fs::File::open(&path)
                .map_err(|e| LoadError::io(path.display().to_string(), e))?;
            store = store.with_table(category, file)?;
        }
        Ok(store)
    }

    /// Add (or replace) the table of `category`
    pub fn with_table<R: Read>(mut self, category: ComponentCategory, reader: R) -> Result<Self, LoadError> {
        let table = Table::parse(category.as_str(), reader)?;
        info!(category = %category, archetypes = table.rows.len(), "Loaded archetype table");
        self.tables.insert(category, table);
        self.clear_cache();
        Ok(self)
    }

    /// Map `"default"` to `id` for `category`
    pub fn with_fallback(mut self, category: ComponentCategory, id: impl Into<String>) -> Self {
        self.fallbacks.insert(category, id.into());
        self
    }

    /// Take every fallback id declared in `config`
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        for category in ComponentCategory::ALL {
            if let Some(id) = config.fallback_archetype(category) {
                self.fallbacks.insert(category, id.to_string());
            }
        }
        self
    }

    /// Archetype ids of a category, sorted
    pub fn ids(&self, category: ComponentCategory) -> Vec<String> {
        self.tables
            .get(&category)
            .map(|t| t.rows.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of memoized lookups, hits and misses alike
    pub fn cached(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn resolve_id<'a>(&'a self, category: ComponentCategory, id: &'a str) -> &'a str {
        if id == DEFAULT_ID {
            if let Some(fallback) = self.fallbacks.get(&category) {
                return fallback;
            }
        }
        id
    }
}

impl ArchetypeRepository for ArchetypeStore {
    fn lookup(&self, category: ComponentCategory, archetype_id: &str) -> Option<ArchetypeRecord> {
        let id = self.resolve_id(category, archetype_id);
        let key = (category, id.to_string());

        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return hit.clone();
        }

        let record = self.tables.get(&category).and_then(|t| t.record(id));
        if record.is_none() {
            debug!(category = %category, id, "Archetype not found");
        }
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert_with(|| record.clone());
        record
    }
}
