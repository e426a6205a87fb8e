use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientPayload {
    pub full_name: String,
    pub ssn: String,
    pub date_of_birth: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordCreated {
    pub message: String,
    pub record_id: u64,
}

/// Status and JSON body of a call, successful or not.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub request_id: Option<String>,
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// Decode a 201 body; `None` for any other outcome.
    pub fn created(&self) -> Option<RecordCreated> {
        if self.status != StatusCode::CREATED {
            return None;
        }
        serde_json::from_value(self.body.clone()).ok()
    }

    /// The `error` field of a rejection body.
    pub fn error(&self) -> Option<&str> {
        self.body.get("error").and_then(|v| v.as_str())
    }
}

pub struct IntakeClient {
    client: Client,
    base_url: String,
}

impl IntakeClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Submit a client record, optionally as a bearer-token caller.
    pub async fn create_record(
        &self,
        token: Option<&str>,
        payload: &ClientPayload,
    ) -> Result<ApiResponse, Box<dyn std::error::Error>> {
        let mut req = self
            .client
            .post(format!("{}/clients", self.base_url))
            .json(payload);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        read(req.send().await?).await
    }

    pub async fn health(&self) -> Result<ApiResponse, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        read(resp).await
    }
}

async fn read(resp: reqwest::Response) -> Result<ApiResponse, Box<dyn std::error::Error>> {
    let status = resp.status();
    let request_id = resp
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let text = resp.text().await?;

    let body = if text.is_empty() {
        serde_json::Value::Null
    } else {
        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) => serde_json::Value::String(text),
        }
    };

    Ok(ApiResponse {
        status,
        request_id,
        body,
    })
}
