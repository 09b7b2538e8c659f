//! Response envelopes
//!
//! Every response is carried with a success-class transport status; the
//! logical outcome lives in the body. A success envelope holds
//! `status` + `data`, a failure envelope holds `statusHTTP` + `statusAPI`.

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::error::FilterError;
use crate::projection::ProjectedRecord;

pub const STATUS_OK: u16 = 1000;
pub const STATUS_NOT_FOUND: u16 = 1001;

/// Standard message for a transport status code
pub fn http_status_message(code: u16) -> &'static str {
    match code {
        200 => "ok",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Request",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Server Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

/// `{code, message}` pair used in every envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBody {
    pub code: u16,
    pub message: String,
}

impl StatusBody {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn http_ok() -> Self {
        Self::new(200, http_status_message(200))
    }
}

/// The outer JSON shape of every response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseEnvelope<T = ProjectedRecord> {
    Success {
        status: StatusBody,
        data: Vec<T>,
    },
    Failure {
        #[serde(rename = "statusHTTP")]
        status_http: StatusBody,
        #[serde(rename = "statusAPI")]
        status_api: StatusBody,
    },
}

impl<T> ResponseEnvelope<T> {
    /// 1000 "ok" with rows, 1001 "Record not found" without
    pub fn success(data: Vec<T>) -> Self {
        let status = if data.is_empty() {
            StatusBody::new(STATUS_NOT_FOUND, "Record not found")
        } else {
            StatusBody::new(STATUS_OK, "ok")
        };
        Self::Success { status, data }
    }

    pub fn failure(error: &FilterError) -> Self {
        Self::Failure {
            status_http: StatusBody::http_ok(),
            status_api: StatusBody::new(error.code(), error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// `status.code` for a success, `statusAPI.code` for a failure
    pub fn code(&self) -> u16 {
        match self {
            Self::Success { status, .. } => status.code,
            Self::Failure { status_api, .. } => status_api.code,
        }
    }
}

impl<T: Serialize> ResponseEnvelope<T> {
    /// Render with four-space indentation.
    pub fn to_json(&self) -> Result<String, FilterError> {
        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut serializer)
            .map_err(|e| FilterError::Serialization(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| FilterError::Serialization(e.to_string()))
    }

    /// Render, falling back to a 9011 failure envelope if rendering fails.
    pub fn into_json(self) -> String {
        match self.to_json() {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(code = err.code(), error = %err, "Envelope serialization failed");
                ResponseEnvelope::<()>::failure(&err)
                    .to_json()
                    .unwrap_or_else(|_| fallback_failure(&err))
            }
        }
    }
}

fn fallback_failure(err: &FilterError) -> String {
    serde_json::json!({
        "statusHTTP": {"code": 200, "message": http_status_message(200)},
        "statusAPI": {"code": err.code(), "message": err.to_string()},
    })
    .to_string()
}
