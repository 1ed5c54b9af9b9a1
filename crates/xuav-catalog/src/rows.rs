//! Conversion between SQLite rows and JSON objects.

use crate::schema::{ColumnKind, Table};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, Params};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value as JsonValue};
use tracing::warn;
use xuav_core::{Result, XuavError};

pub(crate) fn db_err(context: &'static str) -> impl FnOnce(rusqlite::Error) -> XuavError {
    move |e| XuavError::Database(format!("{}: {}", context, e))
}

/// Run a query and decode every row into `T`.
///
/// Columns belonging to `table` are decoded by their declared kind; any
/// other column (joined or aliased) is taken as SQLite returns it.
pub(crate) fn query_as<T, P>(conn: &Connection, table: &Table, sql: &str, params: P) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: Params,
{
    let mut stmt = conn.prepare(sql).map_err(db_err("preparing query"))?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(params).map_err(db_err("running query"))?;

    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(db_err("reading row"))? {
        let mut object = Map::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let value = row.get_ref(i).map_err(db_err("reading column"))?;
            let kind = table.column(name).map(|c| c.kind);
            object.insert(name.clone(), column_to_json(name, value, kind));
        }
        out.push(serde_json::from_value(JsonValue::Object(object))?);
    }
    Ok(out)
}

/// Single-column string query (DISTINCT value lists).
pub(crate) fn query_strings<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql).map_err(db_err("preparing query"))?;
    let values = stmt
        .query_map(params, |row| row.get::<_, String>(0))
        .map_err(db_err("running query"))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(db_err("reading row"))?;
    Ok(values)
}

fn column_to_json(name: &str, value: ValueRef<'_>, kind: Option<ColumnKind>) -> JsonValue {
    match (value, kind) {
        (ValueRef::Null, _) => JsonValue::Null,
        (ValueRef::Integer(i), Some(ColumnKind::Bool)) => JsonValue::Bool(i != 0),
        (ValueRef::Integer(i), Some(ColumnKind::Real)) => float(i as f64),
        (ValueRef::Integer(i), _) => JsonValue::Number(i.into()),
        (ValueRef::Real(f), _) => float(f),
        (ValueRef::Text(bytes), Some(ColumnKind::Json)) => {
            let text = String::from_utf8_lossy(bytes);
            serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!("Column {} holds malformed JSON ({}); reading as null", name, e);
                JsonValue::Null
            })
        }
        (ValueRef::Text(bytes), _) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
        (ValueRef::Blob(_), _) => JsonValue::Null,
    }
}

fn float(f: f64) -> JsonValue {
    Number::from_f64(f).map(JsonValue::Number).unwrap_or(JsonValue::Null)
}

/// Bind values for `table.upsert_sql()`, in column order.
pub(crate) fn object_to_params(table: &Table, object: &Map<String, JsonValue>) -> Result<Vec<SqlValue>> {
    table
        .columns
        .iter()
        .map(|column| {
            let value = object.get(column.name).unwrap_or(&JsonValue::Null);
            json_to_column(column.name, value, column.kind)
        })
        .collect()
}

fn json_to_column(name: &str, value: &JsonValue, kind: ColumnKind) -> Result<SqlValue> {
    let invalid = || {
        XuavError::InvalidInput(format!(
            "column {} expects {:?}, got {}",
            name, kind, value
        ))
    };

    Ok(match (kind, value) {
        (_, JsonValue::Null) => SqlValue::Null,
        (ColumnKind::Json, v) => SqlValue::Text(serde_json::to_string(v)?),
        (ColumnKind::Bool, JsonValue::Bool(b)) => SqlValue::Integer(*b as i64),
        (ColumnKind::Bool, JsonValue::Number(n)) => {
            SqlValue::Integer((n.as_f64().unwrap_or(0.0) != 0.0) as i64)
        }
        (ColumnKind::Integer, JsonValue::Number(n)) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Integer(n.as_f64().ok_or_else(invalid)?.round() as i64),
        },
        (ColumnKind::Real, JsonValue::Number(n)) => SqlValue::Real(n.as_f64().ok_or_else(invalid)?),
        (ColumnKind::Integer, JsonValue::String(s)) => {
            SqlValue::Integer(s.trim().parse().map_err(|_| invalid())?)
        }
        (ColumnKind::Real, JsonValue::String(s)) => {
            SqlValue::Real(s.trim().parse().map_err(|_| invalid())?)
        }
        (ColumnKind::Text | ColumnKind::Date | ColumnKind::Timestamp, JsonValue::String(s)) => {
            SqlValue::Text(s.clone())
        }
        (ColumnKind::Text, JsonValue::Number(n)) => SqlValue::Text(n.to_string()),
        _ => return Err(invalid()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::UAVS;
    use serde_json::json;

    #[test]
    fn json_columns_are_serialized_as_text() {
        let object = json!({
            "designation": "MQ-9",
            "mission_types": ["ISR", "Strike"],
            "internal_weapons_bays": false,
            "hardpoints": 7,
            "endurance_hours": 27
        });
        let params = object_to_params(&UAVS, object.as_object().unwrap()).unwrap();
        let idx = |name: &str| UAVS.columns.iter().position(|c| c.name == name).unwrap();

        assert_eq!(params[idx("designation")], SqlValue::Text("MQ-9".into()));
        assert_eq!(
            params[idx("mission_types")],
            SqlValue::Text("[\"ISR\",\"Strike\"]".into())
        );
        assert_eq!(params[idx("internal_weapons_bays")], SqlValue::Integer(0));
        assert_eq!(params[idx("hardpoints")], SqlValue::Integer(7));
        assert_eq!(params[idx("endurance_hours")], SqlValue::Real(27.0));
        assert_eq!(params[idx("notes")], SqlValue::Null);
    }

    #[test]
    fn mismatched_value_is_rejected() {
        let object = json!({ "designation": "X", "hardpoints": ["a"] });
        let err = object_to_params(&UAVS, object.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, XuavError::InvalidInput(_)));
    }

    #[test]
    fn malformed_json_column_reads_as_null() {
        let value = column_to_json(
            "operators",
            ValueRef::Text(b"[not json"),
            Some(ColumnKind::Json),
        );
        assert_eq!(value, JsonValue::Null);
    }
}
