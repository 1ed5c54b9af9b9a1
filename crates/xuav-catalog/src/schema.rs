//! Table layout of the relational catalog.
//!
//! Each table is described once as a column list; DDL, upserts and row
//! decoding are all derived from it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
    /// Stored as 0/1
    Bool,
    /// List or map stored as JSON text
    Json,
    /// ISO-8601 date stored as text
    Date,
    /// RFC 3339 timestamp stored as text
    Timestamp,
}

impl ColumnKind {
    fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Integer | ColumnKind::Bool => "INTEGER",
            ColumnKind::Real => "REAL",
            ColumnKind::Text | ColumnKind::Json | ColumnKind::Date | ColumnKind::Timestamp => {
                "TEXT"
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn col(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

use ColumnKind::*;

/// Columns of `uavs`, excluding the `id` rowid.
pub const UAV_COLUMNS: &[Column] = &[
    col("designation", Text),
    col("name", Text),
    col("manufacturer", Text),
    col("country_of_origin", Text),
    col("nato_class", Text),
    col("type", Text),
    col("operational_status", Text),
    col("initial_operating_capability", Date),
    col("total_units_produced", Integer),
    col("wingspan_meters", Real),
    col("wingspan_feet", Real),
    col("length_meters", Real),
    col("length_feet", Real),
    col("height_meters", Real),
    col("height_feet", Real),
    col("empty_weight_kg", Real),
    col("empty_weight_lbs", Real),
    col("max_takeoff_weight_kg", Real),
    col("max_takeoff_weight_lbs", Real),
    col("payload_capacity_kg", Real),
    col("payload_capacity_lbs", Real),
    col("fuel_capacity_kg", Real),
    col("fuel_capacity_gallons", Real),
    col("airframe_type", Text),
    col("engine_type", Text),
    col("engine_manufacturer", Text),
    col("engine_model", Text),
    col("thrust_hp", Integer),
    col("thrust_lbs", Integer),
    col("number_of_engines", Integer),
    col("propeller_configuration", Text),
    col("cruise_speed_kmh", Real),
    col("cruise_speed_mph", Real),
    col("cruise_speed_knots", Real),
    col("max_speed_kmh", Real),
    col("max_speed_mph", Real),
    col("max_speed_mach", Real),
    col("service_ceiling_meters", Real),
    col("service_ceiling_feet", Real),
    col("range_km", Real),
    col("range_miles", Real),
    col("range_nm", Real),
    col("endurance_hours", Real),
    col("combat_radius_km", Real),
    col("combat_radius_nm", Real),
    col("primary_function", Text),
    col("mission_types", Json),
    col("armament", Json),
    col("max_weapons_load_kg", Real),
    col("max_weapons_load_lbs", Real),
    col("hardpoints", Integer),
    col("internal_weapons_bays", Bool),
    col("sensor_suite", Json),
    col("radar_type", Text),
    col("communications", Text),
    col("datalink_type", Text),
    col("stealth_features", Text),
    col("autonomy_level", Text),
    col("operators", Json),
    col("export_countries", Json),
    col("crew_size_remote", Integer),
    col("ground_control_station", Text),
    col("launch_method", Text),
    col("recovery_method", Text),
    col("unit_cost_usd", Real),
    col("program_cost_usd", Real),
    col("fiscal_year", Integer),
    col("imagery_urls", Json),
    col("silhouette_url", Text),
    col("model_urls", Json),
    col("scale_factor", Integer),
    col("notable_features", Json),
    col("combat_history", Text),
    col("variants", Json),
    col("notes", Text),
    col("created_at", Timestamp),
    col("updated_at", Timestamp),
];

pub const ARMAMENT_COLUMNS: &[Column] = &[
    col("designation", Text),
    col("name", Text),
    col("weapon_type", Text),
    col("weapon_class", Text),
    col("manufacturer", Text),
    col("country_of_origin", Text),
    col("guidance_type", Text),
    col("weight_kg", Real),
    col("length_m", Real),
    col("diameter_mm", Real),
    col("warhead_kg", Real),
    col("range_km", Real),
    col("speed_mach", Real),
    col("operational_status", Text),
    col("launch_platform_types", Json),
    col("notes", Text),
];

pub const UAV_ARMAMENT_COLUMNS: &[Column] = &[
    col("uav_designation", Text),
    col("armament_designation", Text),
    col("max_quantity", Integer),
    col("hardpoint_positions", Text),
    col("integration_status", Text),
    col("notes", Text),
];

/// A catalog table: its columns and the columns that identify a row.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub conflict_key: &'static [&'static str],
    pub has_rowid: bool,
}

pub const UAVS: Table = Table {
    name: "uavs",
    columns: UAV_COLUMNS,
    conflict_key: &["designation"],
    has_rowid: true,
};

pub const ARMAMENTS: Table = Table {
    name: "armaments",
    columns: ARMAMENT_COLUMNS,
    conflict_key: &["designation"],
    has_rowid: true,
};

pub const UAV_ARMAMENTS: Table = Table {
    name: "uav_armaments",
    columns: UAV_ARMAMENT_COLUMNS,
    conflict_key: &["uav_designation", "armament_designation"],
    has_rowid: false,
};

pub const TABLES: [Table; 3] = [UAVS, ARMAMENTS, UAV_ARMAMENTS];

impl Table {
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn create_sql(&self) -> String {
        let mut defs = Vec::with_capacity(self.columns.len() + 2);
        if self.has_rowid {
            defs.push("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT".to_string());
        }
        for column in self.columns {
            let not_null = if self.conflict_key.contains(&column.name) {
                " NOT NULL"
            } else {
                ""
            };
            defs.push(format!(
                "\"{}\" {}{}",
                column.name,
                column.kind.sql_type(),
                not_null
            ));
        }
        defs.push(format!("UNIQUE ({})", quoted(self.conflict_key)));
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            self.name,
            defs.join(",\n    ")
        )
    }

    /// `INSERT ... ON CONFLICT DO UPDATE` over every column, bound positionally.
    pub fn upsert_sql(&self) -> String {
        let names: Vec<&str> = self.columns.iter().map(|c| c.name).collect();
        let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
        let updates: Vec<String> = names
            .iter()
            .filter(|n| !self.conflict_key.contains(n) && **n != "created_at")
            .map(|n| format!("\"{0}\" = excluded.\"{0}\"", n))
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {}",
            self.name,
            quoted(&names),
            placeholders.join(", "),
            quoted(self.conflict_key),
            updates.join(", ")
        )
    }
}

fn quoted(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| format!("\"{}\"", n))
        .collect::<Vec<_>>()
        .join(", ")
}

pub const INDEX_SQL: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_uavs_country ON uavs (country_of_origin);
    CREATE INDEX IF NOT EXISTS idx_uavs_type ON uavs ("type");
    CREATE INDEX IF NOT EXISTS idx_uavs_status ON uavs (operational_status);
    CREATE INDEX IF NOT EXISTS idx_armaments_type ON armaments (weapon_type);
    CREATE INDEX IF NOT EXISTS idx_uav_armaments_armament ON uav_armaments (armament_designation);
"#;
