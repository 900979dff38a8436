use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::ClientError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionInput {
    pub company: String,
    pub model: String,
    pub year: i32,
    pub fuel_type: String,
    pub kilometers: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub predicted_price: f64,

    #[serde(default)]
    pub warning: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Everything the form needs from the server.
#[async_trait]
pub trait CarApi: Send + Sync {
    async fn companies(&self) -> Result<Vec<String>, ClientError>;

    async fn models(&self, company: &str) -> Result<Vec<String>, ClientError>;

    async fn years(&self) -> Result<Vec<i32>, ClientError>;

    async fn fuel_types(&self) -> Result<Vec<String>, ClientError>;

    async fn predict(&self, input: &PredictionInput) -> Result<Prediction, ClientError>;
}

pub struct HttpApi {
    http: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let res = self.http.get(self.url(path)).send().await?;

        decode(res).await
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();

    if status.is_success() {
        return Ok(res.json().await?);
    }

    let message = match res.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    };

    Err(ClientError::Server { status, message })
}

#[async_trait]
impl CarApi for HttpApi {
    async fn companies(&self) -> Result<Vec<String>, ClientError> {
        self.get_json("companies").await
    }

    async fn models(&self, company: &str) -> Result<Vec<String>, ClientError> {
        self.get_json(&format!("models/{}", urlencoding::encode(company)))
            .await
    }

    async fn years(&self) -> Result<Vec<i32>, ClientError> {
        self.get_json("years").await
    }

    async fn fuel_types(&self) -> Result<Vec<String>, ClientError> {
        self.get_json("fuel-types").await
    }

    async fn predict(&self, input: &PredictionInput) -> Result<Prediction, ClientError> {
        let res = self.http.post(self.url("predict")).json(input).send().await?;

        decode(res).await
    }
}
