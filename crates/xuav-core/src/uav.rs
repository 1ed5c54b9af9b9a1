//! Records of the flat relational catalog.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};

/// A complete UAV record with all specifications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "designation": "MQ-9",
    "name": "Reaper",
    "manufacturer": "General Atomics Aeronautical Systems, Inc.",
    "country_of_origin": "United States",
    "type": "MALE UCAV",
    "wingspan_meters": 20.1,
    "endurance_hours": 27.0
}))]
pub struct Uav {
    #[serde(default)]
    pub id: i64,

    // Identification & classification
    /// Official model designation
    pub designation: String,
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub country_of_origin: Option<String>,
    pub nato_class: Option<String>,
    /// MALE, HALE, UCAV, ...
    #[serde(rename = "type")]
    pub uav_type: Option<String>,
    pub operational_status: Option<String>,
    pub initial_operating_capability: Option<NaiveDate>,
    pub total_units_produced: Option<i64>,

    // Physical characteristics
    pub wingspan_meters: Option<f64>,
    pub wingspan_feet: Option<f64>,
    pub length_meters: Option<f64>,
    pub length_feet: Option<f64>,
    pub height_meters: Option<f64>,
    pub height_feet: Option<f64>,
    pub empty_weight_kg: Option<f64>,
    pub empty_weight_lbs: Option<f64>,
    pub max_takeoff_weight_kg: Option<f64>,
    pub max_takeoff_weight_lbs: Option<f64>,
    pub payload_capacity_kg: Option<f64>,
    pub payload_capacity_lbs: Option<f64>,
    pub fuel_capacity_kg: Option<f64>,
    pub fuel_capacity_gallons: Option<f64>,
    pub airframe_type: Option<String>,

    // Propulsion
    pub engine_type: Option<String>,
    pub engine_manufacturer: Option<String>,
    pub engine_model: Option<String>,
    pub thrust_hp: Option<i64>,
    pub thrust_lbs: Option<i64>,
    pub number_of_engines: Option<i64>,
    pub propeller_configuration: Option<String>,

    // Performance
    pub cruise_speed_kmh: Option<f64>,
    pub cruise_speed_mph: Option<f64>,
    pub cruise_speed_knots: Option<f64>,
    pub max_speed_kmh: Option<f64>,
    pub max_speed_mph: Option<f64>,
    pub max_speed_mach: Option<f64>,
    pub service_ceiling_meters: Option<f64>,
    pub service_ceiling_feet: Option<f64>,
    pub range_km: Option<f64>,
    pub range_miles: Option<f64>,
    pub range_nm: Option<f64>,
    pub endurance_hours: Option<f64>,
    pub combat_radius_km: Option<f64>,
    pub combat_radius_nm: Option<f64>,

    // Mission capabilities
    pub primary_function: Option<String>,
    pub mission_types: Option<Vec<String>>,
    pub armament: Option<Vec<String>>,
    pub max_weapons_load_kg: Option<f64>,
    pub max_weapons_load_lbs: Option<f64>,
    pub hardpoints: Option<i64>,
    pub internal_weapons_bays: Option<bool>,

    // Sensors & avionics
    pub sensor_suite: Option<Vec<String>>,
    pub radar_type: Option<String>,
    pub communications: Option<String>,
    pub datalink_type: Option<String>,
    pub stealth_features: Option<String>,
    pub autonomy_level: Option<String>,

    // Operational details
    pub operators: Option<Vec<String>>,
    pub export_countries: Option<Vec<String>>,
    pub crew_size_remote: Option<i64>,
    pub ground_control_station: Option<String>,
    pub launch_method: Option<String>,
    pub recovery_method: Option<String>,

    // Economic
    pub unit_cost_usd: Option<f64>,
    pub program_cost_usd: Option<f64>,
    pub fiscal_year: Option<i64>,

    // Visual assets
    pub imagery_urls: Option<HashMap<String, String>>,
    pub silhouette_url: Option<String>,
    pub model_urls: Option<HashMap<String, String>>,
    pub scale_factor: Option<i64>,

    // Additional information
    pub notable_features: Option<Vec<String>>,
    pub combat_history: Option<String>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub variants: Option<Vec<serde_json::Value>>,
    pub notes: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Armament {
    #[serde(default)]
    pub id: i64,
    pub designation: String,
    pub name: Option<String>,
    /// Air-to-surface missile, guided bomb, ...
    pub weapon_type: Option<String>,
    pub weapon_class: Option<String>,
    pub manufacturer: Option<String>,
    pub country_of_origin: Option<String>,
    pub guidance_type: Option<String>,
    pub weight_kg: Option<f64>,
    pub length_m: Option<f64>,
    pub diameter_mm: Option<f64>,
    pub warhead_kg: Option<f64>,
    pub range_km: Option<f64>,
    pub speed_mach: Option<f64>,
    pub operational_status: Option<String>,
    pub launch_platform_types: Option<Vec<String>>,
    pub notes: Option<String>,
}

/// Row of the `uav_armaments` compatibility table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UavArmament {
    pub uav_designation: String,
    pub armament_designation: String,
    pub max_quantity: Option<i64>,
    pub hardpoint_positions: Option<String>,
    pub integration_status: Option<String>,
    pub notes: Option<String>,
}

/// An armament as carried by one UAV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ArmamentIntegration {
    #[serde(flatten)]
    pub armament: Armament,
    pub max_quantity: Option<i64>,
    pub hardpoint_positions: Option<String>,
    pub integration_status: Option<String>,
    pub integration_notes: Option<String>,
}

/// A UAV able to carry a given armament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ArmamentCarrier {
    pub designation: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub uav_type: Option<String>,
    pub country_of_origin: Option<String>,
    pub max_quantity: Option<i64>,
    pub hardpoint_positions: Option<String>,
    pub integration_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CountryCount {
    pub country: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub uav_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogStats {
    pub total: i64,
    pub by_country: Vec<CountryCount>,
    pub by_type: Vec<TypeCount>,
    pub by_status: Vec<StatusCount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UavSearch {
    pub country: Option<String>,
    #[serde(rename = "type")]
    pub uav_type: Option<String>,
    pub status: Option<String>,
    pub nato_class: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArmamentSearch {
    pub weapon_type: Option<String>,
    pub weapon_class: Option<String>,
    pub country: Option<String>,
    pub guidance_type: Option<String>,
}
