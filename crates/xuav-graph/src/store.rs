use crate::schema::{self, EDGE_DEFINITIONS};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use surrealdb::{engine::any::Any, opt::auth::Root, Response, Surreal};
use tracing::{debug, info};
use xuav_core::{GraphConfig, Result, XuavError};

/// Reserved document fields that never reach the store.
const RESERVED_FIELDS: &[&str] = &["_key", "_id", "_rev", "id"];

/// One directed edge between two vertices, addressed by collection and key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from_collection: String,
    pub from_key: String,
    pub to_collection: String,
    pub to_key: String,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: i64,
}

/// Handle to the platform graph held in SurrealDB.
///
/// Vertices live in one table per collection with a deterministic record id
/// built from their key; edges live in one table per edge collection and carry
/// both endpoints as plain fields so traversals stay simple selects.
#[derive(Clone)]
pub struct GraphStore {
    db: Arc<Surreal<Any>>,
    config: GraphConfig,
}

impl GraphStore {
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        info!("Connecting to graph store at {}", config.connection);

        let db: Surreal<Any> = Surreal::init();
        db.connect(config.connection.as_str())
            .await
            .map_err(|e| XuavError::Graph(format!("Failed to connect: {}", e)))?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            db.signin(Root {
                username: username.as_str(),
                password: password.expose_secret(),
            })
            .await
            .map_err(|e| XuavError::Graph(format!("Authentication failed: {}", e)))?;
        }

        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await
            .map_err(|e| {
                XuavError::Graph(format!("Failed to select namespace/database: {}", e))
            })?;

        info!(
            "Graph store ready (ns={}, db={})",
            config.namespace, config.database
        );
        Ok(Self {
            db: Arc::new(db),
            config: config.clone(),
        })
    }

    /// Fresh in-memory store with the schema applied.
    pub async fn in_memory() -> Result<Self> {
        let store = Self::connect(&GraphConfig::in_memory()).await?;
        schema::init_schema(&store).await?;
        Ok(store)
    }

    pub fn db(&self) -> Arc<Surreal<Any>> {
        Arc::clone(&self.db)
    }

    pub fn graph_name(&self) -> &str {
        &self.config.graph_name
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub(crate) async fn execute(&self, sql: &str) -> Result<()> {
        let response = self
            .db
            .query(sql)
            .await
            .map_err(|e| XuavError::Graph(format!("Query failed: {}", e)))?;
        checked(response, "Statement failed").map(|_| ())
    }

    /// Insert or replace a vertex document under `key`.
    pub async fn upsert_vertex(&self, collection: &str, key: &str, doc: JsonValue) -> Result<()> {
        schema::require_vertex_collection(collection)?;
        let content = vertex_document(key, doc)?;
        debug!("UPSERT {}:{}", collection, key);

        let response = self
            .db
            .query("UPSERT type::thing($tb, $key) CONTENT $doc RETURN NONE")
            .bind(("tb", collection.to_string()))
            .bind(("key", key.to_string()))
            .bind(("doc", content))
            .await
            .map_err(|e| XuavError::Graph(format!("Failed to upsert {}: {}", collection, e)))?;
        checked(response, "Upsert rejected").map(|_| ())
    }

    pub async fn vertex_exists(&self, collection: &str, key: &str) -> Result<bool> {
        let keys: Vec<String> = self
            .select(
                "SELECT VALUE key FROM type::table($tb) WHERE key = $key",
                collection,
                vec![("key", JsonValue::String(key.to_string()))],
            )
            .await?;
        Ok(!keys.is_empty())
    }

    /// Key of some vertex whose `field` equals `value`.
    pub async fn key_where(&self, collection: &str, field: &str, value: &str) -> Result<Option<String>> {
        let sql = format!(
            "SELECT VALUE key FROM type::table($tb) WHERE {} = $value LIMIT 1",
            order_field(field)?
        );
        let keys: Vec<String> = self
            .select(&sql, collection, vec![("value", JsonValue::String(value.to_string()))])
            .await?;
        Ok(keys.into_iter().next())
    }

    pub async fn get<T: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<Option<T>> {
        let mut rows: Vec<T> = self
            .select(
                "SELECT * OMIT id FROM type::table($tb) WHERE key = $key",
                collection,
                vec![("key", JsonValue::String(key.to_string()))],
            )
            .await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Fetch several vertices, returned in key order. Unknown keys are dropped.
    pub async fn get_many<T>(&self, collection: &str, keys: &[String]) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<JsonValue> = self
            .select(
                "SELECT * OMIT id FROM type::table($tb) WHERE key IN $keys ORDER BY key",
                collection,
                vec![("keys", JsonValue::from(keys.to_vec()))],
            )
            .await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(XuavError::from))
            .collect()
    }

    /// Every vertex of a collection, ordered by `order_by`.
    pub async fn all<T: DeserializeOwned>(&self, collection: &str, order_by: &str) -> Result<Vec<T>> {
        let sql = format!(
            "SELECT * OMIT id FROM type::table($tb) ORDER BY {}",
            order_field(order_by)?
        );
        self.select(&sql, collection, Vec::new()).await
    }

    pub async fn page<T: DeserializeOwned>(
        &self,
        collection: &str,
        order_by: &str,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<T>> {
        let sql = format!(
            "SELECT * OMIT id FROM type::table($tb) ORDER BY {} LIMIT {} START {}",
            order_field(order_by)?,
            limit,
            skip
        );
        self.select(&sql, collection, Vec::new()).await
    }

    pub async fn count(&self, collection: &str) -> Result<usize> {
        let rows: Vec<CountRow> = self
            .select(
                "SELECT count() AS total FROM type::table($tb) GROUP ALL",
                collection,
                Vec::new(),
            )
            .await?;
        Ok(rows.first().map_or(0, |r| r.total.max(0) as usize))
    }

    /// Link two existing vertices through `edge`.
    pub async fn relate(
        &self,
        edge: &str,
        from: (&str, &str),
        to: (&str, &str),
    ) -> Result<()> {
        let definition = schema::edge_definition(edge)
            .ok_or_else(|| XuavError::InvalidInput(format!("unknown edge collection: {}", edge)))?;
        definition.check(from.0, to.0)?;

        for (collection, key) in [from, to] {
            if !self.vertex_exists(collection, key).await? {
                return Err(XuavError::NotFound(format!("{}/{}", collection, key)));
            }
        }

        let record = EdgeRecord {
            from_collection: from.0.to_string(),
            from_key: from.1.to_string(),
            to_collection: to.0.to_string(),
            to_key: to.1.to_string(),
        };
        let id = format!("{}:{}->{}:{}", from.0, from.1, to.0, to.1);
        debug!("RELATE {} {}", edge, id);

        let response = self
            .db
            .query("UPSERT type::thing($tb, $id) CONTENT $doc RETURN NONE")
            .bind(("tb", edge.to_string()))
            .bind(("id", id))
            .bind(("doc", record))
            .await
            .map_err(|e| XuavError::Graph(format!("Failed to relate via {}: {}", edge, e)))?;
        checked(response, "Relate rejected").map(|_| ())
    }

    /// Keys reached by following `edge` forward from `from`, in key order.
    pub async fn outbound(
        &self,
        edge: &str,
        from: (&str, &str),
        to_collection: &str,
    ) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self
            .select(
                "SELECT VALUE to_key FROM type::table($tb) \
                 WHERE from_collection = $c AND from_key = $k AND to_collection = $other",
                edge,
                vec![
                    ("c", JsonValue::String(from.0.to_string())),
                    ("k", JsonValue::String(from.1.to_string())),
                    ("other", JsonValue::String(to_collection.to_string())),
                ],
            )
            .await?;
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    /// Keys that reach `to` through `edge`, in key order.
    pub async fn inbound(
        &self,
        edge: &str,
        to: (&str, &str),
        from_collection: &str,
    ) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self
            .select(
                "SELECT VALUE from_key FROM type::table($tb) \
                 WHERE to_collection = $c AND to_key = $k AND from_collection = $other",
                edge,
                vec![
                    ("c", JsonValue::String(to.0.to_string())),
                    ("k", JsonValue::String(to.1.to_string())),
                    ("other", JsonValue::String(from_collection.to_string())),
                ],
            )
            .await?;
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    pub async fn edges(&self, edge: &str) -> Result<Vec<EdgeRecord>> {
        self.select(
            "SELECT from_collection, from_key, to_collection, to_key FROM type::table($tb) \
             ORDER BY from_collection, from_key, to_collection, to_key",
            edge,
            Vec::new(),
        )
        .await
    }

    /// Edges of every edge collection with `(collection, key)` at either end.
    pub async fn edges_touching(&self, collection: &str, key: &str) -> Result<Vec<(String, EdgeRecord)>> {
        let mut touching = Vec::new();
        for definition in EDGE_DEFINITIONS {
            if !definition.from.contains(&collection) && !definition.to.contains(&collection) {
                continue;
            }
            let rows: Vec<EdgeRecord> = self
                .select(
                    "SELECT from_collection, from_key, to_collection, to_key FROM type::table($tb) \
                     WHERE (from_collection = $c AND from_key = $k) \
                     OR (to_collection = $c AND to_key = $k)",
                    definition.name,
                    vec![
                        ("c", JsonValue::String(collection.to_string())),
                        ("k", JsonValue::String(key.to_string())),
                    ],
                )
                .await?;
            touching.extend(rows.into_iter().map(|r| (definition.name.to_string(), r)));
        }
        Ok(touching)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        sql: &str,
        table: &str,
        binds: Vec<(&'static str, JsonValue)>,
    ) -> Result<Vec<T>> {
        debug!("{} [{}]", sql, table);
        let mut query = self.db.query(sql).bind(("tb", table.to_string()));
        for bind in binds {
            query = query.bind(bind);
        }
        let response = query
            .await
            .map_err(|e| XuavError::Graph(format!("Query on {} failed: {}", table, e)))?;
        let mut response = checked(response, "Query rejected")?;
        response
            .take(0)
            .map_err(|e| XuavError::Graph(format!("Failed to decode {} rows: {}", table, e)))
    }
}

fn checked(response: Response, context: &str) -> Result<Response> {
    response
        .check()
        .map_err(|e| XuavError::Graph(format!("{}: {}", context, e)))
}

fn order_field(field: &str) -> Result<&str> {
    if !field.is_empty() && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(field)
    } else {
        Err(XuavError::InvalidInput(format!("invalid order field: {}", field)))
    }
}

/// Strip reserved fields and stamp `key` onto a vertex document.
pub(crate) fn vertex_document(key: &str, doc: JsonValue) -> Result<JsonValue> {
    let mut map: Map<String, JsonValue> = match doc {
        JsonValue::Object(map) => map,
        JsonValue::Null => Map::new(),
        other => {
            return Err(XuavError::InvalidInput(format!(
                "vertex document must be an object, got {}",
                other
            )))
        }
    };
    for field in RESERVED_FIELDS {
        map.remove(*field);
    }
    map.insert("key".to_string(), JsonValue::String(key.to_string()));
    Ok(JsonValue::Object(map))
}
