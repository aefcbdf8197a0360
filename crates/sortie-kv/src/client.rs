//! REST pipeline client for the external key-value store.
//!
//! The store exposes a single `POST /pipeline` endpoint taking a JSON array
//! of command arrays (`[["GET", key], ["SET", key, value, "EX", "300"]]`)
//! and returning one `{result}` or `{error}` object per command, in order.
//! Bearer-token authenticated.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::error::KvError;

/// Client for the pipelined key-value store.
///
/// Use [`KvClient::new`] for production or point `base_url` at a mock server
/// in tests.
#[derive(Clone)]
pub struct KvClient {
    client: Client,
    base_url: Url,
    token: String,
}

#[derive(Debug, Deserialize)]
struct PipelineItem {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl KvClient {
    /// Creates a new client for the store at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`KvError::Shape`] if `base_url` does not parse.
    pub fn new(base_url: &str, token: &str, timeout_secs: u64) -> Result<Self, KvError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(2))
            .user_agent("sortie/0.1 (venue-recommendations)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| KvError::Shape(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            base_url,
            token: token.to_owned(),
        })
    }

    /// Executes a batch of commands in one round trip and returns their
    /// results in command order.
    ///
    /// # Errors
    ///
    /// - [`KvError::Http`] on transport failure or non-2xx status.
    /// - [`KvError::Api`] if any command's entry carries an error.
    /// - [`KvError::Shape`] if the body is not a pipeline response.
    pub async fn pipeline(&self, commands: &[Vec<String>]) -> Result<Vec<Value>, KvError> {
        let url = self
            .base_url
            .join("pipeline")
            .map_err(|e| KvError::Shape(format!("pipeline URL: {e}")))?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(commands)
            .send()
            .await?
            .error_for_status()?;

        let items: Vec<PipelineItem> = response.json().await?;
        if items.len() != commands.len() {
            return Err(KvError::Shape(format!(
                "pipeline returned {} entries for {} commands",
                items.len(),
                commands.len()
            )));
        }

        items
            .into_iter()
            .map(|item| match item.error {
                Some(message) => Err(KvError::Api(message)),
                None => Ok(item.result),
            })
            .collect()
    }

    /// Fetches a string value, `None` when the key is absent.
    ///
    /// # Errors
    ///
    /// Propagates any [`KvError`] from [`Self::pipeline`].
    pub async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let results = self
            .pipeline(&[vec!["GET".to_owned(), key.to_owned()]])
            .await?;
        match results.into_iter().next() {
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Null) | None => Ok(None),
            Some(other) => Err(KvError::Shape(format!("GET returned {other}"))),
        }
    }

    /// Stores a string value with a relative expiry.
    ///
    /// # Errors
    ///
    /// Propagates any [`KvError`] from [`Self::pipeline`].
    pub async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), KvError> {
        self.pipeline(&[vec![
            "SET".to_owned(),
            key.to_owned(),
            value.to_owned(),
            "EX".to_owned(),
            ttl_secs.to_string(),
        ]])
        .await?;
        Ok(())
    }

    /// Runs a server-side script against a single key in one round trip.
    ///
    /// # Errors
    ///
    /// Propagates any [`KvError`] from [`Self::pipeline`].
    pub async fn eval(&self, script: &str, key: &str, args: &[String]) -> Result<Value, KvError> {
        let mut command = vec![
            "EVAL".to_owned(),
            script.to_owned(),
            "1".to_owned(),
            key.to_owned(),
        ];
        command.extend(args.iter().cloned());
        let mut results = self.pipeline(&[command]).await?;
        results
            .pop()
            .ok_or_else(|| KvError::Shape("EVAL returned no result".to_owned()))
    }

    /// Liveness probe.
    ///
    /// # Errors
    ///
    /// Propagates any [`KvError`] from [`Self::pipeline`].
    pub async fn ping(&self) -> Result<(), KvError> {
        self.pipeline(&[vec!["PING".to_owned()]]).await?;
        Ok(())
    }
}
