use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::export::{ExportPayload, RecordId};

pub const CREATE_PATH: &str = "/WaterInfolist";
pub const DOCUMENT_PATH: &str = "/getpdfoutput";

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Status and text body of a remote response, whatever the status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteReply {
    pub status: u16,
    pub body: String,
}

impl RemoteReply {
    pub fn ok(body: impl Into<String>) -> Self {
        RemoteReply {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// The external service that stores a table and renders it as a document.
#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn create_record(&self, payload: &ExportPayload) -> Result<RemoteReply, RemoteError>;

    async fn fetch_document_link(&self, id: &RecordId) -> Result<RemoteReply, RemoteError>;
}

pub struct HttpDocumentService {
    client: Client,
    base_url: String,
}

impl HttpDocumentService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpDocumentService { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read_reply(url: &str, response: reqwest::Response) -> Result<RemoteReply, RemoteError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|source| RemoteError::Transport {
            url: url.to_string(),
            source,
        })?;
        debug!(%url, status, "remote replied");
        Ok(RemoteReply { status, body })
    }
}

#[async_trait]
impl DocumentService for HttpDocumentService {
    async fn create_record(&self, payload: &ExportPayload) -> Result<RemoteReply, RemoteError> {
        let url = format!("{}{}", self.base_url, CREATE_PATH);
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|source| RemoteError::Transport {
                url: url.clone(),
                source,
            })?;
        Self::read_reply(&url, response).await
    }

    async fn fetch_document_link(&self, id: &RecordId) -> Result<RemoteReply, RemoteError> {
        let url = format!("{}{}", self.base_url, DOCUMENT_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[("id", id.as_str())])
            .send()
            .await
            .map_err(|source| RemoteError::Transport {
                url: url.clone(),
                source,
            })?;
        Self::read_reply(&url, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Query, State},
        http::StatusCode,
        routing::{get, post},
    };
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    #[derive(Clone, Default)]
    struct Seen {
        posted: Arc<Mutex<Vec<serde_json::Value>>>,
        queried: Arc<Mutex<Vec<HashMap<String, String>>>>,
    }

    async fn spawn_mock(seen: Seen) -> String {
        let app = Router::new()
            .route(
                CREATE_PATH,
                post(|State(seen): State<Seen>, Json(body): Json<serde_json::Value>| async move {
                    seen.posted.lock().unwrap().push(body);
                    "Record Created : 42"
                }),
            )
            .route(
                DOCUMENT_PATH,
                get(
                    |State(seen): State<Seen>, Query(q): Query<HashMap<String, String>>| async move {
                        seen.queried.lock().unwrap().push(q);
                        (StatusCode::OK, "https://files.example/doc-42.pdf")
                    },
                ),
            )
            .with_state(seen);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn posts_payload_and_fetches_link_over_http() {
        let seen = Seen::default();
        let base = spawn_mock(seen.clone()).await;
        let service = HttpDocumentService::new(base);

        let rows = crate::generator::generate_table();
        let payload = ExportPayload::from_rows(&rows);
        let created = service.create_record(&payload).await.unwrap();
        assert!(created.is_ok());
        assert_eq!(created.body, "Record Created : 42");

        let posted = seen.posted.lock().unwrap().clone();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0]["doc"][0]["rowdata"][0]["id"], "1");

        let link = service.fetch_document_link(&RecordId::from("42")).await.unwrap();
        assert_eq!(link.body, "https://files.example/doc-42.pdf");
        let queried = seen.queried.lock().unwrap().clone();
        assert_eq!(queried.len(), 1);
        assert_eq!(queried[0].get("id").map(String::as_str), Some("42"));
    }

    #[tokio::test]
    async fn non_200_status_is_a_reply_not_an_error() {
        let app = Router::new().route(
            CREATE_PATH,
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let service = HttpDocumentService::new(format!("http://{addr}"));
        let reply = service
            .create_record(&ExportPayload::from_rows(&[]))
            .await
            .unwrap();
        assert_eq!(reply.status, 500);
        assert!(!reply.is_ok());
    }

    #[tokio::test]
    async fn connection_failure_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let service = HttpDocumentService::new(format!("http://{addr}"));
        let err = service.fetch_document_link(&RecordId::from("1")).await.unwrap_err();
        assert!(matches!(err, RemoteError::Transport { .. }));
    }
}
