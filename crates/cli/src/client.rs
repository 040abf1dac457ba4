//! Clients for the regression service
//!
//! The protocol is chosen once at startup; commands only see the
//! [`RegressionClient`] trait.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use slr_lib::proto::{self, RegressionClient as GrpcStub};
use slr_lib::{Instance, Model, ModelValue, TrainingResults, UsageStats};
use tonic::transport::{Channel, Endpoint};
use url::Url;

/// Wire protocol used to reach the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Grpc,
}

impl Protocol {
    pub fn default_server(&self) -> &'static str {
        match self {
            Protocol::Http => "http://localhost:8080",
            Protocol::Grpc => "http://localhost:50051",
        }
    }
}

/// Operations the CLI can request from the server
#[async_trait]
pub trait RegressionClient: Send + Sync {
    async fn train(&self, instances: &[Instance], store: bool) -> Result<TrainingResults>;
    async fn apply(&self, model: &str, argument: f64) -> Result<ModelValue>;
    async fn stats(&self) -> Result<UsageStats>;
}

/// Build the client for `protocol`; no connection is made until first use
pub fn connect(protocol: Protocol, server: &str) -> Result<Box<dyn RegressionClient>> {
    Ok(match protocol {
        Protocol::Http => Box::new(HttpClient::new(server)?),
        Protocol::Grpc => Box::new(GrpcClient::new(server)?),
    })
}

/// Prefix a bare `host:port` with `http://`
fn with_scheme(server: &str) -> String {
    if server.contains("://") {
        server.to_string()
    } else {
        format!("http://{}", server)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// JSON-over-HTTP client
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(&with_scheme(base_url)).context("Invalid server URL")?;

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).context("Invalid path")
    }

    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            anyhow::bail!("server error ({}): {}", status, message);
        }

        response.json().await.context("Failed to parse response")
    }
}

#[async_trait]
impl RegressionClient for HttpClient {
    async fn train(&self, instances: &[Instance], store: bool) -> Result<TrainingResults> {
        let mut url = self.url("train")?;
        if store {
            url.query_pairs_mut().append_pair("store", "1");
        }
        let rows: Vec<Vec<f64>> = instances.iter().map(Instance::to_row).collect();

        let response = self
            .client
            .post(url)
            .json(&rows)
            .send()
            .await
            .context("error processing /train")?;

        Self::read(response).await
    }

    async fn apply(&self, model: &str, argument: f64) -> Result<ModelValue> {
        let mut url = self.url("apply")?;
        url.query_pairs_mut()
            .append_pair("model", model)
            .append_pair("arg", &argument.to_string());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("error processing /apply")?;

        Self::read(response).await
    }

    async fn stats(&self) -> Result<UsageStats> {
        let response = self
            .client
            .get(self.url("stats")?)
            .send()
            .await
            .context("error processing /stats")?;

        Self::read(response).await
    }
}

/// gRPC client over a lazily connected channel
pub struct GrpcClient {
    stub: GrpcStub<Channel>,
}

impl GrpcClient {
    pub fn new(server: &str) -> Result<Self> {
        let channel = Endpoint::from_shared(with_scheme(server))
            .context("Invalid server URL")?
            .connect_lazy();

        Ok(Self {
            stub: GrpcStub::new(channel),
        })
    }
}

fn status_error(operation: &str, status: tonic::Status) -> anyhow::Error {
    anyhow!(
        "error processing {} request ({:?}): {}",
        operation,
        status.code(),
        status.message()
    )
}

fn parse_time(field: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .with_context(|| format!("invalid {} in response: {:?}", field, value))
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn training_results(results: proto::TrainingResults) -> Result<TrainingResults> {
    let model = results
        .model
        .map(Model::from)
        .ok_or_else(|| anyhow!("training response carries no model"))?;
    let creation_time = match non_empty(results.creation_time) {
        Some(t) => Some(parse_time("creation_time", &t)?),
        None => None,
    };

    Ok(TrainingResults {
        model,
        sum_squared_errors: results.sum_squared_errors,
        name: non_empty(results.name),
        creation_time,
        error: non_empty(results.error),
    })
}

fn model_value(value: proto::ModelValue) -> Result<ModelValue> {
    let model = value
        .model
        .map(Model::from)
        .ok_or_else(|| anyhow!("calculation response carries no model"))?;

    Ok(ModelValue {
        value: value.value,
        argument: value.argument,
        model,
        from_cache: value.from_cache,
        calculation_time: parse_time("calculation_time", &value.calculation_time)?,
    })
}

#[async_trait]
impl RegressionClient for GrpcClient {
    async fn train(&self, instances: &[Instance], store: bool) -> Result<TrainingResults> {
        let request = proto::TrainingRequest {
            data: Some(proto::Pool {
                instances: instances.iter().map(proto::Instance::from).collect(),
            }),
            store_model: store,
        };

        let response = self
            .stub
            .clone()
            .train(request)
            .await
            .map_err(|s| status_error("training", s))?;

        training_results(response.into_inner())
    }

    async fn apply(&self, model: &str, argument: f64) -> Result<ModelValue> {
        let request = proto::CalculateRequest {
            argument,
            model_name: model.to_string(),
        };

        let response = self
            .stub
            .clone()
            .calculate(request)
            .await
            .map_err(|s| status_error("calculation", s))?;

        model_value(response.into_inner())
    }

    async fn stats(&self) -> Result<UsageStats> {
        let response = self
            .stub
            .clone()
            .stats(proto::StatsRequest {})
            .await
            .map_err(|s| status_error("stats", s))?;

        Ok(response.into_inner().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn test_with_scheme() {
        assert_eq!(with_scheme("localhost:8080"), "http://localhost:8080");
        assert_eq!(with_scheme("https://slr.example"), "https://slr.example");
    }

    #[test]
    fn test_default_servers() {
        assert_eq!(Protocol::Http.default_server(), "http://localhost:8080");
        assert_eq!(Protocol::Grpc.default_server(), "http://localhost:50051");
    }

    #[tokio::test]
    async fn test_http_train_posts_rows() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/train")
            .match_query(Matcher::UrlEncoded("store".into(), "1".into()))
            .match_body(Matcher::Json(serde_json::json!([[1.0, 2.0], [2.0, 4.0, 0.5]])))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"model":{"coefficient":2.0,"intercept":0.0,"name":"abc"},
                    "sum_squared_errors":0.0,"name":"abc",
                    "creation_time":"2024-03-01T12:00:00Z"}"#,
            )
            .create_async()
            .await;

        let client = HttpClient::new(&server.url()).unwrap();
        let instances = vec![Instance::new(1.0, 2.0), Instance::weighted(2.0, 4.0, 0.5)];
        let results = client.train(&instances, true).await.unwrap();

        mock.assert_async().await;
        assert_eq!(results.name.as_deref(), Some("abc"));
        assert_eq!(results.model.coefficient, 2.0);
        assert!(results.creation_time.is_some());
    }

    #[tokio::test]
    async fn test_http_apply_sends_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/apply")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("model".into(), "abc".into()),
                Matcher::UrlEncoded("arg".into(), "1.5".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"value":4.0,"argument":1.5,
                    "model":{"coefficient":2.0,"intercept":1.0,"name":"abc"},
                    "from_cache":true,"calculation_time":"2024-03-01T12:00:00Z"}"#,
            )
            .create_async()
            .await;

        let client = HttpClient::new(&server.url()).unwrap();
        let value = client.apply("abc", 1.5).await.unwrap();

        mock.assert_async().await;
        assert_eq!(value.value, 4.0);
        assert!(value.from_cache);
    }

    #[tokio::test]
    async fn test_http_error_body_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/apply")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"model abc not found"}"#)
            .create_async()
            .await;

        let client = HttpClient::new(&server.url()).unwrap();
        let err = client.apply("abc", 1.0).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("model abc not found"));
    }

    #[tokio::test]
    async fn test_http_stats() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stats")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"total_requests":5,"succeeded_requests":4,"total_instances":30}"#)
            .create_async()
            .await;

        let client = HttpClient::new(&server.url()).unwrap();
        let stats = client.stats().await.unwrap();
        assert_eq!(stats.total_requests, 5);
        assert_eq!(stats.total_instances, 30);
    }

    #[test]
    fn test_grpc_training_results_conversion() {
        let results = training_results(proto::TrainingResults {
            model: Some(proto::SimpleRegressionModel {
                coefficient: 1.0,
                intercept: 2.0,
                name: String::new(),
            }),
            sum_squared_errors: 0.25,
            name: String::new(),
            creation_time: String::new(),
            error: "storage error: disk full".to_string(),
        })
        .unwrap();

        assert!(results.name.is_none());
        assert!(results.creation_time.is_none());
        assert_eq!(results.error.as_deref(), Some("storage error: disk full"));

        let missing_model = proto::TrainingResults::default();
        assert!(training_results(missing_model).is_err());
    }

    #[test]
    fn test_grpc_model_value_requires_valid_time() {
        let value = proto::ModelValue {
            value: 3.0,
            argument: 1.0,
            model: Some(proto::SimpleRegressionModel::default()),
            from_cache: false,
            calculation_time: "not a time".to_string(),
        };
        assert!(model_value(value).is_err());
    }
}
