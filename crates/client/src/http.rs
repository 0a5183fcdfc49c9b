//! HTTP implementation of the remote backend.
//!
//! Speaks the PostgREST dialect: one path per table, filters as query
//! parameters (`?id=eq.42`).

use async_trait::async_trait;
use brickerp_offline::{BackendError, Record, RemoteBackend, Table};
use reqwest::{Method, RequestBuilder};

use crate::config::{join_url, ClientConfig};

/// REST client for the remote database.
#[derive(Debug, Clone)]
pub struct RestBackend {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl RestBackend {
    pub fn new(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn table_url(&self, table: &Table) -> String {
        join_url(&self.api_url, &format!("rest/v1/{table}"))
    }

    fn request(&self, method: Method, table: &Table) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, self.table_url(table))
            .header("Prefer", "return=minimal");

        if let Some(key) = &self.api_key {
            req = req.header("apikey", key).bearer_auth(key);
        }
        req
    }

    async fn send(req: RequestBuilder) -> Result<(), BackendError> {
        let resp = req
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

fn id_filter(id: &str) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

#[async_trait]
impl RemoteBackend for RestBackend {
    async fn insert(&self, table: &Table, record: &Record) -> Result<(), BackendError> {
        Self::send(self.request(Method::POST, table).json(record)).await
    }

    async fn update(&self, table: &Table, id: &str, changes: &Record) -> Result<(), BackendError> {
        Self::send(
            self.request(Method::PATCH, table)
                .query(&id_filter(id))
                .json(changes),
        )
        .await
    }

    async fn delete(&self, table: &Table, id: &str) -> Result<(), BackendError> {
        Self::send(self.request(Method::DELETE, table).query(&id_filter(id))).await
    }
}
