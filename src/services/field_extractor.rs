//! Turns a dictated nursing transcript into structured chart fields using
//! the Cohere chat API in JSON mode.

use crate::config::Settings;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

const TEMPERATURE: f64 = 0.3;

/// Failures of the extraction endpoint. These render as `{"error": ...}`,
/// unlike [`crate::error::ApiError`].
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Transcript is required.")]
    MissingTranscript,

    #[error("Cohere API key not set.")]
    NotConfigured,

    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Failed to reach Cohere API")]
    Transport(#[from] reqwest::Error),
}

impl ExtractionError {
    pub fn status(&self) -> StatusCode {
        match self {
            ExtractionError::MissingTranscript => StatusCode::BAD_REQUEST,
            ExtractionError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ExtractionError::Upstream { status, .. } => *status,
            ExtractionError::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ExtractionError {
    fn into_response(self) -> Response {
        match &self {
            ExtractionError::Transport(e) => {
                tracing::error!(error = %e, "Cohere request failed");
            }
            ExtractionError::Upstream { status, message } => {
                tracing::warn!(status = %status, error = %message, "Cohere returned an error");
            }
            _ => {}
        }

        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub struct FieldExtractor {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl FieldExtractor {
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(settings.http_timeout_seconds))
            .build()?;

        Ok(Self::with_client(
            client,
            settings.cohere_api_url.clone(),
            settings.cohere_api_key.clone(),
        ))
    }

    pub fn with_client(client: reqwest::Client, api_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            api_url,
            api_key,
        }
    }

    /// Ask the model for the chart fields found in `transcript` and return
    /// its JSON response unchanged.
    pub async fn extract(&self, transcript: &str) -> Result<Value, ExtractionError> {
        if transcript.trim().is_empty() {
            return Err(ExtractionError::MissingTranscript);
        }

        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ExtractionError::NotConfigured)?;

        tracing::debug!(transcript_len = transcript.len(), "Requesting field extraction");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&request_body(transcript))
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Cohere API error")
                .to_string();
            let status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            return Err(ExtractionError::Upstream { status, message });
        }

        Ok(body)
    }
}

pub fn request_body(transcript: &str) -> Value {
    json!({
        "message": prompt(transcript),
        "response_format": {
            "type": "json_object",
            "schema": response_schema(),
        },
        "temperature": TEMPERATURE,
    })
}

fn prompt(transcript: &str) -> String {
    format!(
        r#"Build a JSON object from the nurse's transcript below, extracting these fields.

Vital Signs:
  - temperature: object with "value" (string) and "unit" (string, "C" or "F")
  - bloodPressure: object with "systolic" (string), "diastolic" (string) and "unit" ("mmHg")
  - heartRate: pulse in bpm, as a string
  - respiratoryRate: breaths per minute, as a string
  - oxygenSaturation: oxygen saturation percentage, as a string

Subjective:
  - chiefComplaint: the patient's main complaint
  - symptomHistory: onset, duration and progression of symptoms
  - painLevel: pain on a 0 to 10 scale, as a string

Objective:
  - generalAppearance: overall appearance of the patient
  - cardiovascular: cardiovascular exam findings
  - respiratory: respiratory exam findings
  - neurological: neurological exam findings
  - skin: skin exam findings
  - additionalExam: any other exam findings

Assessment & Plan:
  - assessment: summary of the nurse's clinical assessment
  - plan: management or treatment plan

Use an empty string for any field the transcript does not mention.

Transcript:
<transcript>
{transcript}
</transcript>"#
    )
}

fn string_fields(names: &[&str]) -> Value {
    let properties: serde_json::Map<String, Value> = names
        .iter()
        .map(|name| (name.to_string(), json!({ "type": "string" })))
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": names,
    })
}

fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "vitalSigns": {
                "type": "object",
                "properties": {
                    "temperature": string_fields(&["value", "unit"]),
                    "bloodPressure": {
                        "type": "object",
                        "properties": {
                            "systolic": { "type": "string" },
                            "diastolic": { "type": "string" },
                            "unit": { "type": "string", "default": "mmHg" }
                        },
                        "required": ["systolic", "diastolic", "unit"]
                    },
                    "heartRate": { "type": "string" },
                    "respiratoryRate": { "type": "string" },
                    "oxygenSaturation": { "type": "string" }
                },
                "required": ["temperature", "bloodPressure", "heartRate", "respiratoryRate", "oxygenSaturation"]
            },
            "subjective": string_fields(&["chiefComplaint", "symptomHistory", "painLevel"]),
            "objective": string_fields(&[
                "generalAppearance",
                "cardiovascular",
                "respiratory",
                "neurological",
                "skin",
                "additionalExam"
            ]),
            "assessment": { "type": "string" },
            "plan": { "type": "string" }
        },
        "required": ["vitalSigns", "subjective", "objective", "assessment", "plan"]
    })
}
