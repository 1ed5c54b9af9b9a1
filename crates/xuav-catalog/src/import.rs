use crate::rows::{db_err, object_to_params};
use crate::schema::{Table, ARMAMENTS, INDEX_SQL, TABLES, UAVS, UAV_ARMAMENTS};
use crate::Catalog;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::path::Path;
use tracing::{info, warn};
use xuav_core::{Result, XuavError};

/// Rows written per table by an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogImportSummary {
    pub uavs: usize,
    pub armaments: usize,
    pub uav_armaments: usize,
    pub skipped: usize,
}

impl Catalog {
    /// Create the catalog tables and indexes if they do not exist yet.
    pub fn init_schema(&self) -> Result<()> {
        let conn = self.write_connection()?;
        let mut ddl = String::new();
        for table in TABLES {
            ddl.push_str(&table.create_sql());
            ddl.push_str(";\n");
        }
        ddl.push_str(INDEX_SQL);
        conn.execute_batch(&ddl)
            .map_err(db_err("creating catalog schema"))?;
        info!("Catalog schema ready at {}", self.path().display());
        Ok(())
    }

    pub fn import_file(&self, path: &Path) -> Result<CatalogImportSummary> {
        let raw = std::fs::read_to_string(path)?;
        let document: JsonValue = serde_json::from_str(&raw)?;
        self.import_document(&document)
    }

    /// Upsert `{uavs, armaments, uav_armaments}` from a JSON document.
    ///
    /// Rows without their key columns are skipped. Everything else is written
    /// in one transaction.
    pub fn import_document(&self, document: &JsonValue) -> Result<CatalogImportSummary> {
        let document = document.as_object().ok_or_else(|| {
            XuavError::InvalidInput("catalog import expects a JSON object".into())
        })?;

        let mut conn = self.write_connection()?;
        let tx = conn.transaction().map_err(db_err("starting import"))?;
        let now = Utc::now().to_rfc3339();
        let mut summary = CatalogImportSummary::default();

        for table in [UAVS, ARMAMENTS, UAV_ARMAMENTS] {
            let Some(rows) = document.get(table.name).and_then(JsonValue::as_array) else {
                continue;
            };
            let sql = table.upsert_sql();
            let mut stmt = tx.prepare(&sql).map_err(db_err("preparing upsert"))?;

            let mut written = 0;
            for row in rows {
                let Some(object) = row.as_object() else {
                    warn!("Skipping non-object row in {}", table.name);
                    summary.skipped += 1;
                    continue;
                };
                if !has_key(&table, object) {
                    warn!("Skipping {} row without {:?}", table.name, table.conflict_key);
                    summary.skipped += 1;
                    continue;
                }
                let object = stamped(&table, object, &now);
                let values = object_to_params(&table, &object)?;
                stmt.execute(rusqlite::params_from_iter(values))
                    .map_err(db_err("writing row"))?;
                written += 1;
            }

            match table.name {
                "uavs" => summary.uavs = written,
                "armaments" => summary.armaments = written,
                _ => summary.uav_armaments = written,
            }
        }

        tx.commit().map_err(db_err("committing import"))?;
        info!(
            "Imported {} UAVs, {} armaments, {} compatibility rows",
            summary.uavs, summary.armaments, summary.uav_armaments
        );
        Ok(summary)
    }
}

fn has_key(table: &Table, object: &Map<String, JsonValue>) -> bool {
    table
        .conflict_key
        .iter()
        .all(|k| matches!(object.get(*k), Some(JsonValue::String(s)) if !s.trim().is_empty()))
}

fn stamped(table: &Table, object: &Map<String, JsonValue>, now: &str) -> Map<String, JsonValue> {
    let mut object = object.clone();
    if table.column("created_at").is_some() && object.get("created_at").map_or(true, JsonValue::is_null) {
        object.insert("created_at".into(), JsonValue::String(now.to_string()));
    }
    if table.column("updated_at").is_some() {
        object.insert("updated_at".into(), JsonValue::String(now.to_string()));
    }
    object
}
