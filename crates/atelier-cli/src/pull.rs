//! Inbound pull-sync job
//!
//! Imports project pages from the remote database into the local store.
//! The status tracker only knows this through the `PullSync` trigger
//! contract; the import itself lives here.

use atelier_core::remote::{format_database_id, RemoteTransport};
use atelier_core::{PullSummary, PullSync, SqliteStore, SyncError};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

/// Pulls every page of a remote project database into the local store
pub struct DatabasePull<'a, T: RemoteTransport> {
    remote: T,
    database_id: String,
    store: &'a SqliteStore,
}

impl<'a, T: RemoteTransport> DatabasePull<'a, T> {
    pub fn new(remote: T, database_id: impl Into<String>, store: &'a SqliteStore) -> Self {
        Self {
            remote,
            database_id: database_id.into(),
            store,
        }
    }
}

impl<T: RemoteTransport> PullSync for DatabasePull<'_, T> {
    async fn pull(&self) -> Result<PullSummary, SyncError> {
        let path = format!(
            "/databases/{}/query",
            format_database_id(&self.database_id)
        );

        let mut imported = 0;
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({});
            if let Some(ref c) = cursor {
                body["start_cursor"] = json!(c);
            }

            let response = self
                .remote
                .call(Method::POST, &path, Some(body))
                .await?
                .ok_or_else(|| {
                    SyncError::Remote("query response was not valid JSON".to_string())
                })?;

            if let Some(results) = response.get("results").and_then(Value::as_array) {
                for page in results {
                    let Some(id) = page.get("id").and_then(Value::as_str) else {
                        continue;
                    };
                    let Some(title) = page_title(page) else {
                        debug!("skipping page {} with no title", id);
                        continue;
                    };
                    self.store.upsert_remote_project(id, &title)?;
                    imported += 1;
                }
            }

            let has_more = response
                .get("has_more")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if !has_more {
                break;
            }
            cursor = response
                .get("next_cursor")
                .and_then(Value::as_str)
                .map(str::to_string);
            if cursor.is_none() {
                break;
            }
        }

        Ok(PullSummary { imported })
    }
}

/// Extract a page's title: the first title-typed property, concatenated
fn page_title(page: &Value) -> Option<String> {
    let properties = page.get("properties")?.as_object()?;
    let title_prop = properties
        .values()
        .find(|p| p.get("type").and_then(Value::as_str) == Some("title"))?;

    let text: String = title_prop
        .get("title")?
        .as_array()?
        .iter()
        .filter_map(|part| part.get("plain_text").and_then(Value::as_str))
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted transport for exercising the pull loop
    struct StubTransport {
        responses: Mutex<VecDeque<Value>>,
        requests: Mutex<Vec<(Method, String, Option<Value>)>>,
    }

    impl StubTransport {
        fn new(responses: Vec<Value>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl RemoteTransport for StubTransport {
        async fn call(
            &self,
            method: Method,
            path: &str,
            body: Option<Value>,
        ) -> Result<Option<Value>, SyncError> {
            self.requests
                .lock()
                .unwrap()
                .push((method, path.to_string(), body));
            Ok(self.responses.lock().unwrap().pop_front())
        }
    }

    fn page(id: &str, title: &str) -> Value {
        json!({
            "id": id,
            "properties": {
                "Name": {
                    "type": "title",
                    "title": [{"plain_text": title}]
                }
            }
        })
    }

    #[tokio::test]
    async fn test_pull_imports_pages() {
        let store = SqliteStore::open_in_memory().unwrap();
        let stub = StubTransport::new(vec![json!({
            "results": [page("p1", "Spring Campaign"), page("p2", "Autumn Reel")],
            "has_more": false
        })]);

        let pull = DatabasePull::new(&stub, "db-1", &store);
        let summary = pull.pull().await.unwrap();

        assert_eq!(summary.imported, 2);
        let projects = store.list_projects().unwrap();
        assert_eq!(projects.len(), 2);
        assert!(projects.iter().all(|p| p.notion_id.is_some()));
    }

    #[tokio::test]
    async fn test_pull_follows_pagination() {
        let store = SqliteStore::open_in_memory().unwrap();
        let stub = StubTransport::new(vec![
            json!({
                "results": [page("p1", "One")],
                "has_more": true,
                "next_cursor": "cur-2"
            }),
            json!({
                "results": [page("p2", "Two")],
                "has_more": false
            }),
        ]);

        let pull = DatabasePull::new(&stub, "db-1", &store);
        let summary = pull.pull().await.unwrap();
        assert_eq!(summary.imported, 2);

        let requests = stub.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].2.as_ref().unwrap()["start_cursor"], "cur-2");
    }

    #[tokio::test]
    async fn test_pull_canonicalizes_database_path() {
        let store = SqliteStore::open_in_memory().unwrap();
        let stub = StubTransport::new(vec![json!({"results": [], "has_more": false})]);

        let pull = DatabasePull::new(&stub, "abcdefabcdefabcdefabcdefabcdef12", &store);
        pull.pull().await.unwrap();

        let requests = stub.requests.lock().unwrap();
        assert_eq!(
            requests[0].1,
            "/databases/abcdefab-cdef-abcd-efab-cdefabcdef12/query"
        );
    }

    #[tokio::test]
    async fn test_pull_skips_untitled_pages() {
        let store = SqliteStore::open_in_memory().unwrap();
        let stub = StubTransport::new(vec![json!({
            "results": [
                page("p1", "Titled"),
                json!({"id": "p2", "properties": {}})
            ],
            "has_more": false
        })]);

        let pull = DatabasePull::new(&stub, "db-1", &store);
        let summary = pull.pull().await.unwrap();
        assert_eq!(summary.imported, 1);
    }

    #[tokio::test]
    async fn test_pull_refreshes_existing_linkage() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert_remote_project("p1", "Old title").unwrap();

        let stub = StubTransport::new(vec![json!({
            "results": [page("p1", "New title")],
            "has_more": false
        })]);

        let pull = DatabasePull::new(&stub, "db-1", &store);
        pull.pull().await.unwrap();

        let projects = store.list_projects().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].title, "New title");
    }
}
