//! Store service client over HTTP

use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::client::HttpConnector;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Client, Method, Request, StatusCode};
use saldo_core::{CoreError, CoreResult, NewTransaction, Transaction, TransactionPatch};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// API reference type
pub type ApiRef = Arc<dyn TransactionApi>;

/// The calls the client makes against the store service
#[async_trait]
pub trait TransactionApi: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<Transaction>>;
    async fn create(&self, new: &NewTransaction) -> CoreResult<Transaction>;
    async fn update(&self, id: &str, patch: &TransactionPatch) -> CoreResult<Transaction>;
    async fn delete(&self, id: &str) -> CoreResult<()>;
    async fn delete_all(&self) -> CoreResult<()>;
}

/// hyper-backed client for the `/api/transactions` surface
#[derive(Debug, Clone)]
pub struct HttpStoreClient {
    client: Client<HttpConnector>,
    base_url: String,
}

impl HttpStoreClient {
    pub fn new(server_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: server_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, id: Option<&str>) -> String {
        match id {
            Some(id) => format!("{}/api/transactions/{}", self.base_url, id),
            None => format!("{}/api/transactions", self.base_url),
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: String,
        body: Option<Vec<u8>>,
        id: Option<&str>,
    ) -> CoreResult<Bytes> {
        let mut builder = Request::builder().method(method.clone()).uri(&uri);
        let body = match body {
            Some(bytes) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(bytes)
            }
            None => Body::empty(),
        };
        let request = builder.body(body).map_err(|e| CoreError::InvalidFormat {
            message: format!("invalid request to {}: {}", uri, e),
        })?;

        log::debug!("{} {}", method, uri);
        let response = self.client.request(request).await.map_err(|e| CoreError::NetworkFailure {
            message: format!("{} {} failed: {}", method, uri, e),
            status: None,
        })?;

        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body())
            .await
            .map_err(|e| CoreError::NetworkFailure {
                message: format!("reading response from {} failed: {}", uri, e),
                status: Some(status.as_u16()),
            })?;

        if status.is_success() {
            return Ok(bytes);
        }

        match (status, id) {
            (StatusCode::NOT_FOUND, Some(id)) => Err(CoreError::TransactionNotFound { id: id.to_string() }),
            _ => Err(CoreError::NetworkFailure {
                message: error_message(&bytes).unwrap_or_else(|| format!("{} {} returned {}", method, uri, status)),
                status: Some(status.as_u16()),
            }),
        }
    }
}

/// The `message` field of a structured error body, if there is one
fn error_message(bytes: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(bytes).ok()?;
    value.get("message")?.as_str().map(str::to_string)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> CoreResult<T> {
    serde_json::from_slice(bytes).map_err(|e| CoreError::InvalidFormat {
        message: format!("unexpected response body: {}", e),
    })
}

fn encode<T: serde::Serialize>(value: &T) -> CoreResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CoreError::InvalidFormat {
        message: e.to_string(),
    })
}

#[async_trait]
impl TransactionApi for HttpStoreClient {
    async fn list(&self) -> CoreResult<Vec<Transaction>> {
        let bytes = self.send(Method::GET, self.url(None), None, None).await?;
        decode(&bytes)
    }

    async fn create(&self, new: &NewTransaction) -> CoreResult<Transaction> {
        let bytes = self
            .send(Method::POST, self.url(None), Some(encode(new)?), None)
            .await?;
        decode(&bytes)
    }

    async fn update(&self, id: &str, patch: &TransactionPatch) -> CoreResult<Transaction> {
        let bytes = self
            .send(Method::PUT, self.url(Some(id)), Some(encode(patch)?), Some(id))
            .await?;
        decode(&bytes)
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        self.send(Method::DELETE, self.url(Some(id)), None, Some(id)).await?;
        Ok(())
    }

    async fn delete_all(&self) -> CoreResult<()> {
        self.send(Method::DELETE, self.url(None), None, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use rust_decimal::Decimal;
    use saldo_core::TransactionType;

    fn new_tx(kind: TransactionType, amount: i64) -> NewTransaction {
        NewTransaction {
            date: "15/1/2024".to_string(),
            date_iso: "2024-01-15".to_string(),
            kind,
            amount: Decimal::from(amount),
            description: "Salary".to_string(),
        }
    }

    #[test]
    fn test_url_building() {
        let client = HttpStoreClient::new("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.url(None), "http://localhost:3000/api/transactions");
        assert_eq!(client.url(Some("abc")), "http://localhost:3000/api/transactions/abc");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(br#"{"code":"BAD_REQUEST","message":"Bad request: x"}"#),
            Some("Bad request: x".to_string())
        );
        assert_eq!(error_message(b"not json"), None);
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let client = HttpStoreClient::new(&spawn_server().await);

        let created = client.create(&new_tx(TransactionType::Income, 100000)).await.unwrap();
        let listed = client.list().await.unwrap();
        assert_eq!(listed, vec![created.clone()]);

        let patch = TransactionPatch {
            amount: Some(Decimal::from(90000)),
            ..Default::default()
        };
        let updated = client.update(&created.id, &patch).await.unwrap();
        assert_eq!(updated.amount, Decimal::from(90000));
        assert_eq!(updated.description, "Salary");

        client.delete(&created.id).await.unwrap();
        client.delete("unknown").await.unwrap();
        assert!(client.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let client = HttpStoreClient::new(&spawn_server().await);
        let err = client
            .update("missing", &TransactionPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::TransactionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_bad_request_is_network_failure_with_status() {
        let client = HttpStoreClient::new(&spawn_server().await);
        let mut bad = new_tx(TransactionType::Expense, 5);
        bad.date_iso = "tomorrow".to_string();

        match client.create(&bad).await.unwrap_err() {
            CoreError::NetworkFailure { status, message } => {
                assert_eq!(status, Some(400));
                assert!(message.contains("dateISO"));
            }
            other => panic!("expected network failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let client = HttpStoreClient::new(&crate::test_support::unreachable_url().await);
        let err = client.list().await.unwrap_err();
        assert!(matches!(err, CoreError::NetworkFailure { status: None, .. }));
    }
}
