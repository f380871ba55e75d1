//! Table-scoped persistence operations.
//!
//! [`DataStore`] is a thin mapping over the data REST endpoints: objects
//! are schemaless JSON, the service assigns `objectId` on first save, and
//! queries are expressed as URL query-string pairs.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;
use tracing::instrument;

use cirrus_core::ids::ObjectId;

use crate::client::RestClient;
use crate::errors::RestResult;

/// Query options for [`DataStore::find`].
#[derive(Clone, Debug, Default)]
pub struct DataQuery {
    /// `where` clause, e.g. `age > 21`.
    pub where_clause: Option<String>,
    /// Properties to return; empty means all.
    pub properties: Vec<String>,
    /// Sort expressions, e.g. `created desc`.
    pub sort_by: Vec<String>,
    /// Page size.
    pub page_size: Option<u32>,
    /// Offset into the result set.
    pub offset: Option<u32>,
}

impl DataQuery {
    /// Render as a URL query string (without the leading `?`), or `None`
    /// when no option is set.
    #[must_use]
    pub fn to_query_string(&self) -> Option<String> {
        let mut pairs: Vec<String> = Vec::new();
        if let Some(where_clause) = &self.where_clause {
            pairs.push(format!("where={}", encode_query(where_clause)));
        }
        if !self.properties.is_empty() {
            pairs.push(format!("props={}", encode_query(&self.properties.join(","))));
        }
        if !self.sort_by.is_empty() {
            pairs.push(format!("sortBy={}", encode_query(&self.sort_by.join(","))));
        }
        if let Some(page_size) = self.page_size {
            pairs.push(format!("pageSize={page_size}"));
        }
        if let Some(offset) = self.offset {
            pairs.push(format!("offset={offset}"));
        }
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("&"))
        }
    }
}

fn encode_query(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// Persistence operations for one table.
#[derive(Clone)]
pub struct DataStore {
    rest: RestClient,
    table: String,
}

impl DataStore {
    /// Bind a store to a table name.
    pub fn new(rest: RestClient, table: impl Into<String>) -> Self {
        Self {
            rest,
            table: table.into(),
        }
    }

    /// Table this store is bound to.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Save an object.
    ///
    /// An object without an `objectId` is created (POST) and the returned
    /// object carries the server-assigned ID; an object with an `objectId`
    /// is updated in place (PUT).
    #[instrument(skip_all, fields(table = %self.table))]
    pub async fn save(&self, object: &Value) -> RestResult<Value> {
        let urls = self.rest.urls();
        match object.get("objectId").and_then(Value::as_str) {
            Some(id) => {
                let object_id = ObjectId::from(id);
                let url = urls.table_object(&self.table, &object_id);
                self.rest.put_json(&url, object).await
            }
            None => {
                let url = urls.table(&self.table);
                self.rest.post_json(&url, object).await
            }
        }
    }

    /// Fetch one object by ID.
    pub async fn find_by_id(&self, object_id: &ObjectId) -> RestResult<Value> {
        let url = self.rest.urls().table_object(&self.table, object_id);
        self.rest.get_json(&url).await
    }

    /// Delete one object by ID.
    pub async fn remove(&self, object_id: &ObjectId) -> RestResult<()> {
        let url = self.rest.urls().table_object(&self.table, object_id);
        self.rest.delete(&url).await
    }

    /// Fetch objects matching a query.
    pub async fn find(&self, query: &DataQuery) -> RestResult<Vec<Value>> {
        let mut url = self.rest.urls().table(&self.table);
        if let Some(qs) = query.to_query_string() {
            url = format!("{url}?{qs}");
        }
        self.rest.get_json(&url).await
    }

    /// Fetch the first object in the table.
    pub async fn find_first(&self) -> RestResult<Value> {
        let url = format!("{}/first", self.rest.urls().table(&self.table));
        self.rest.get_json(&url).await
    }

    /// Fetch the last object in the table.
    pub async fn find_last(&self) -> RestResult<Value> {
        let url = format!("{}/last", self.rest.urls().table(&self.table));
        self.rest.get_json(&url).await
    }

    /// Count objects, optionally restricted by a `where` clause.
    pub async fn count(&self, where_clause: Option<&str>) -> RestResult<u64> {
        let mut url = self.rest.urls().table_count(&self.table);
        if let Some(where_clause) = where_clause {
            url = format!("{url}?where={}", encode_query(where_clause));
        }
        self.rest.get_json(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::CirrusConfig;
    use crate::errors::RestError;

    async fn store(server: &MockServer, table: &str) -> DataStore {
        let mut config = CirrusConfig::new("app-1", "key-1");
        config.base_url = server.uri();
        let rest = RestClient::new(Arc::new(config)).unwrap();
        DataStore::new(rest, table)
    }

    // ── DataQuery ───────────────────────────────────────────────────

    #[test]
    fn empty_query_renders_nothing() {
        assert!(DataQuery::default().to_query_string().is_none());
    }

    #[test]
    fn full_query_renders_all_pairs() {
        let query = DataQuery {
            where_clause: Some("counter > 35".into()),
            properties: vec!["counter".into(), "name".into()],
            sort_by: vec!["counter desc".into()],
            page_size: Some(50),
            offset: Some(95),
        };
        assert_eq!(
            query.to_query_string().unwrap(),
            "where=counter%20%3E%2035&props=counter%2Cname&sortBy=counter%20desc&pageSize=50&offset=95"
        );
    }

    // ── save ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn save_without_object_id_creates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/app-1/key-1/data/Foo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "objectId": "obj-1", "firstName": "First", "lastName": "Last"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let saved = store(&server, "Foo")
            .await
            .save(&json!({"firstName": "First", "lastName": "Last"}))
            .await
            .unwrap();
        assert_eq!(saved["objectId"], "obj-1");
        assert_eq!(saved["firstName"], "First");
    }

    #[tokio::test]
    async fn save_with_object_id_updates() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/app-1/key-1/data/Foo/obj-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "objectId": "obj-1", "firstName": "Ron"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let updated = store(&server, "Foo")
            .await
            .save(&json!({"objectId": "obj-1", "firstName": "Ron"}))
            .await
            .unwrap();
        assert_eq!(updated["firstName"], "Ron");
    }

    // ── find / remove / count ───────────────────────────────────────

    #[tokio::test]
    async fn find_with_where_clause() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app-1/key-1/data/Users"))
            .and(query_param("where", "name='John Lennon'"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"objectId": "u-1"}])),
            )
            .mount(&server)
            .await;

        let query = DataQuery {
            where_clause: Some("name='John Lennon'".into()),
            ..DataQuery::default()
        };
        let found = store(&server, "Users").await.find(&query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["objectId"], "u-1");
    }

    #[tokio::test]
    async fn find_by_missing_id_maps_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app-1/key-1/data/Foo/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "code": 1000,
                "message": "Entity with name gone cannot be found"
            })))
            .mount(&server)
            .await;

        let err = store(&server, "Foo")
            .await
            .find_by_id(&ObjectId::from("gone"))
            .await
            .unwrap_err();
        assert_matches!(
            err,
            RestError::Api { status: 404, message, .. }
                if message.contains("cannot be found")
        );
    }

    #[tokio::test]
    async fn remove_deletes_object() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/app-1/key-1/data/Foo/obj-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(1_693_000_000)))
            .expect(1)
            .mount(&server)
            .await;

        store(&server, "Foo")
            .await
            .remove(&ObjectId::from("obj-1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn count_with_where_clause() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app-1/key-1/data/TableWithPagination/count"))
            .and(query_param("where", "counter > 35"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(65)))
            .mount(&server)
            .await;

        let count = store(&server, "TableWithPagination")
            .await
            .count(Some("counter > 35"))
            .await
            .unwrap();
        assert_eq!(count, 65);
    }

    #[tokio::test]
    async fn find_first_hits_first_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app-1/key-1/data/Foo/first"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"objectId": "obj-first"})),
            )
            .mount(&server)
            .await;

        let first = store(&server, "Foo").await.find_first().await.unwrap();
        assert_eq!(first["objectId"], "obj-first");
    }
}
