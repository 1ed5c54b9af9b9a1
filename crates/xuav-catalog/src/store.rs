use crate::rows::{db_err, query_as, query_strings};
use crate::schema::{ARMAMENTS, UAVS, UAV_ARMAMENTS};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;
use xuav_core::{
    Armament, ArmamentCarrier, ArmamentIntegration, ArmamentSearch, CatalogStats, CountryCount,
    Result, StatusCount, TypeCount, Uav, UavSearch, XuavError,
};

/// Read access to the relational UAV catalog.
///
/// Every call opens its own read-only connection, so a `Catalog` is cheap to
/// clone and safe to share across blocking tasks.
#[derive(Debug, Clone)]
pub struct Catalog {
    path: PathBuf,
}

impl Catalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn read_connection(&self) -> Result<Connection> {
        if !self.path.exists() {
            return Err(XuavError::Database(format!(
                "catalog database not found at {}",
                self.path.display()
            )));
        }
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(db_err("opening catalog"))
    }

    pub(crate) fn write_connection(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Connection::open(&self.path).map_err(db_err("opening catalog for writing"))
    }

    // -------- UAVs --------

    pub fn get_all_uavs(&self) -> Result<Vec<Uav>> {
        let conn = self.read_connection()?;
        query_as(&conn, &UAVS, "SELECT * FROM uavs ORDER BY designation", [])
    }

    pub fn get_uav_by_designation(&self, designation: &str) -> Result<Option<Uav>> {
        let conn = self.read_connection()?;
        let mut rows: Vec<Uav> = query_as(
            &conn,
            &UAVS,
            "SELECT * FROM uavs WHERE designation = ?1",
            params![designation],
        )?;
        Ok(rows.pop())
    }

    pub fn compare_uavs(&self, designations: &[String]) -> Result<Vec<Uav>> {
        if designations.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; designations.len()].join(", ");
        let sql = format!(
            "SELECT * FROM uavs WHERE designation IN ({}) ORDER BY designation",
            placeholders
        );
        let conn = self.read_connection()?;
        query_as(&conn, &UAVS, &sql, params_from_iter(designations.iter()))
    }

    pub fn search_uavs(&self, filters: &UavSearch) -> Result<Vec<Uav>> {
        let mut sql = String::from("SELECT * FROM uavs WHERE 1=1");
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(country) = &filters.country {
            sql.push_str(" AND country_of_origin = ?");
            values.push(SqlValue::Text(country.clone()));
        }
        if let Some(uav_type) = &filters.uav_type {
            sql.push_str(" AND \"type\" LIKE ?");
            values.push(SqlValue::Text(format!("%{}%", uav_type)));
        }
        if let Some(status) = &filters.status {
            sql.push_str(" AND operational_status = ?");
            values.push(SqlValue::Text(status.clone()));
        }
        if let Some(nato_class) = &filters.nato_class {
            sql.push_str(" AND nato_class = ?");
            values.push(SqlValue::Text(nato_class.clone()));
        }
        sql.push_str(" ORDER BY designation");

        debug!("search_uavs: {} filter(s)", values.len());
        let conn = self.read_connection()?;
        query_as(&conn, &UAVS, &sql, params_from_iter(values))
    }

    pub fn get_countries(&self) -> Result<Vec<String>> {
        let conn = self.read_connection()?;
        query_strings(
            &conn,
            "SELECT DISTINCT country_of_origin FROM uavs \
             WHERE country_of_origin IS NOT NULL ORDER BY country_of_origin",
            [],
        )
    }

    pub fn get_types(&self) -> Result<Vec<String>> {
        let conn = self.read_connection()?;
        query_strings(
            &conn,
            "SELECT DISTINCT \"type\" FROM uavs WHERE \"type\" IS NOT NULL ORDER BY \"type\"",
            [],
        )
    }

    pub fn count_uavs(&self) -> Result<i64> {
        let conn = self.read_connection()?;
        conn.query_row("SELECT COUNT(*) FROM uavs", [], |row| row.get(0))
            .map_err(db_err("counting uavs"))
    }

    pub fn get_stats(&self) -> Result<CatalogStats> {
        let conn = self.read_connection()?;
        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM uavs", [], |row| row.get(0))
            .map_err(db_err("counting uavs"))?;

        let by_country = grouped(
            &conn,
            "SELECT country_of_origin, COUNT(*) AS count FROM uavs \
             GROUP BY country_of_origin ORDER BY count DESC, country_of_origin",
        )?
        .into_iter()
        .map(|(country, count)| CountryCount { country, count })
        .collect();

        let by_type = grouped(
            &conn,
            "SELECT \"type\", COUNT(*) AS count FROM uavs WHERE \"type\" IS NOT NULL \
             GROUP BY \"type\" ORDER BY count DESC, \"type\"",
        )?
        .into_iter()
        .filter_map(|(uav_type, count)| uav_type.map(|uav_type| TypeCount { uav_type, count }))
        .collect();

        let by_status = grouped(
            &conn,
            "SELECT operational_status, COUNT(*) AS count FROM uavs \
             WHERE operational_status IS NOT NULL \
             GROUP BY operational_status ORDER BY count DESC, operational_status",
        )?
        .into_iter()
        .filter_map(|(status, count)| status.map(|status| StatusCount { status, count }))
        .collect();

        Ok(CatalogStats {
            total,
            by_country,
            by_type,
            by_status,
        })
    }

    // -------- Armaments --------

    pub fn get_all_armaments(&self) -> Result<Vec<Armament>> {
        let conn = self.read_connection()?;
        query_as(
            &conn,
            &ARMAMENTS,
            "SELECT * FROM armaments ORDER BY weapon_type, designation",
            [],
        )
    }

    pub fn get_armament_by_designation(&self, designation: &str) -> Result<Option<Armament>> {
        let conn = self.read_connection()?;
        let mut rows: Vec<Armament> = query_as(
            &conn,
            &ARMAMENTS,
            "SELECT * FROM armaments WHERE designation = ?1",
            params![designation],
        )?;
        Ok(rows.pop())
    }

    pub fn search_armaments(&self, filters: &ArmamentSearch) -> Result<Vec<Armament>> {
        let mut sql = String::from("SELECT * FROM armaments WHERE 1=1");
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(weapon_type) = &filters.weapon_type {
            sql.push_str(" AND weapon_type = ?");
            values.push(SqlValue::Text(weapon_type.clone()));
        }
        if let Some(weapon_class) = &filters.weapon_class {
            sql.push_str(" AND weapon_class LIKE ?");
            values.push(SqlValue::Text(format!("%{}%", weapon_class)));
        }
        if let Some(country) = &filters.country {
            sql.push_str(" AND country_of_origin = ?");
            values.push(SqlValue::Text(country.clone()));
        }
        if let Some(guidance_type) = &filters.guidance_type {
            sql.push_str(" AND guidance_type LIKE ?");
            values.push(SqlValue::Text(format!("%{}%", guidance_type)));
        }
        sql.push_str(" ORDER BY designation");

        let conn = self.read_connection()?;
        query_as(&conn, &ARMAMENTS, &sql, params_from_iter(values))
    }

    pub fn get_armaments_for_uav(&self, uav_designation: &str) -> Result<Vec<ArmamentIntegration>> {
        let conn = self.read_connection()?;
        query_as(
            &conn,
            &ARMAMENTS,
            "SELECT a.*, ua.max_quantity, ua.hardpoint_positions, ua.integration_status, \
                    ua.notes AS integration_notes \
             FROM armaments a \
             JOIN uav_armaments ua ON a.designation = ua.armament_designation \
             WHERE ua.uav_designation = ?1 \
             ORDER BY a.weapon_type, a.designation",
            params![uav_designation],
        )
    }

    pub fn get_uavs_for_armament(&self, armament_designation: &str) -> Result<Vec<ArmamentCarrier>> {
        let conn = self.read_connection()?;
        query_as(
            &conn,
            &UAV_ARMAMENTS,
            "SELECT u.designation, u.name, u.\"type\", u.country_of_origin, \
                    ua.max_quantity, ua.hardpoint_positions, ua.integration_status \
             FROM uavs u \
             JOIN uav_armaments ua ON u.designation = ua.uav_designation \
             WHERE ua.armament_designation = ?1 \
             ORDER BY u.designation",
            params![armament_designation],
        )
    }

    pub fn get_weapon_types(&self) -> Result<Vec<String>> {
        let conn = self.read_connection()?;
        query_strings(
            &conn,
            "SELECT DISTINCT weapon_type FROM armaments \
             WHERE weapon_type IS NOT NULL ORDER BY weapon_type",
            [],
        )
    }

    pub fn get_weapon_classes(&self) -> Result<Vec<String>> {
        let conn = self.read_connection()?;
        query_strings(
            &conn,
            "SELECT DISTINCT weapon_class FROM armaments \
             WHERE weapon_class IS NOT NULL ORDER BY weapon_class",
            [],
        )
    }
}

fn grouped(conn: &Connection, sql: &str) -> Result<Vec<(Option<String>, i64)>> {
    let mut stmt = conn.prepare(sql).map_err(db_err("preparing stats query"))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(db_err("running stats query"))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(db_err("reading stats row"))?;
    Ok(rows)
}
