//! Parsed API responses
//!
//! Every upstream reply has the same envelope:
//!
//! ```xml
//! <ApiResponse Status="OK|ERROR">
//!   <Errors><Error Number="2019166">Domain not found</Error></Errors>
//!   <Warnings />
//!   <RequestedCommand>namecheap.domains.dns.gethosts</RequestedCommand>
//!   <CommandResponse Type="...">...</CommandResponse>
//! </ApiResponse>
//! ```
//!
//! [`ApiResponse::parse`] represents application-level failure as data.
//! Only a body that is not a well-formed `ApiResponse` document is an error.

use serde::Serialize;
use serde_json::Value;

use super::de::value_to_string;
use super::xml::{self, TEXT_KEY};
use crate::error::{ApiErrorEntry, Error, Result};

const ROOT_ELEMENT: &str = "ApiResponse";
const STATUS_OK: &str = "OK";

/// Normalized upstream response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    /// `Status="OK"` on the root element
    pub success: bool,
    /// Upstream errors, in document order
    pub errors: Vec<ApiErrorEntry>,
    /// Non-fatal upstream warnings
    pub warnings: Vec<String>,
    /// Echo of the command the upstream executed
    pub command: Option<String>,
    /// Normalized `CommandResponse` element; present only on success
    pub data: Option<Value>,
}

impl ApiResponse {
    /// Parse and normalize a response body
    pub fn parse(body: &str) -> Result<Self> {
        let (root_name, root) = xml::parse_document(body)?;
        if root_name != ROOT_ELEMENT {
            return Err(Error::parse(format!(
                "expected <{ROOT_ELEMENT}> root element, got <{root_name}>"
            )));
        }

        let success = root
            .get("@_Status")
            .and_then(value_to_string)
            .is_some_and(|status| status == STATUS_OK);

        let errors = root
            .get("Errors")
            .and_then(|errors| errors.get("Error"))
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(error_entry).collect())
            .unwrap_or_default();

        let warnings = root
            .get("Warnings")
            .and_then(|warnings| warnings.get("Warning"))
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(value_to_string).collect())
            .unwrap_or_default();

        let command = root
            .get("RequestedCommand")
            .and_then(value_to_string)
            .filter(|c| !c.is_empty());

        let data = if success {
            root.get("CommandResponse").cloned()
        } else {
            None
        };

        Ok(Self {
            success,
            errors,
            warnings,
            command,
            data,
        })
    }

    /// Return the command payload, or the upstream failure as an error.
    ///
    /// Warnings are logged and do not prevent returning data.
    pub fn into_data(self) -> Result<Value> {
        let command = self.command.as_deref().unwrap_or("<unknown command>");

        if !self.success {
            tracing::debug!("{} failed with {} upstream error(s)", command, self.errors.len());
            return Err(Error::api(self.errors));
        }

        for warning in &self.warnings {
            tracing::warn!("Upstream warning for {}: {}", command, warning);
        }

        match self.data {
            Some(data) => Ok(data),
            None => Err(Error::Other(format!(
                "{command} succeeded but the response carried no CommandResponse"
            ))),
        }
    }
}

fn error_entry(value: &Value) -> ApiErrorEntry {
    match value {
        Value::Object(map) => ApiErrorEntry {
            code: map
                .get("@_Number")
                .and_then(value_to_string)
                .unwrap_or_default(),
            message: map
                .get(TEXT_KEY)
                .and_then(value_to_string)
                .unwrap_or_default(),
        },
        other => ApiErrorEntry {
            code: String::new(),
            message: value_to_string(other).unwrap_or_default(),
        },
    }
}
