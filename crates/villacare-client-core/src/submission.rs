use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Contact,
    Review,
}

impl FormKind {
    pub const ALL: [Self; 2] = [Self::Contact, Self::Review];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Review => "review",
        }
    }
}

/// Field values read from a form at submit time, in document order.
///
/// Repeated names are kept, matching multipart form semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
}

impl FormPayload {
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormPayload {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// One multipart POST to a form endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub kind: FormKind,
    pub endpoint: String,
    pub csrf_header_name: String,
    /// `None` when the CSRF cookie is absent; the header is then omitted.
    pub csrf_token: Option<String>,
    pub payload: FormPayload,
}

/// Backend reply body: `{ "success": bool, "message"?: str, "errors"?: {...} }`.
///
/// A body without `success` decodes as a failed submission.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("failed to build request: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request failed with status {0}")]
    Status(u16),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted,
    Rejected,
}

impl SubmissionOutcome {
    /// Validation failures and transport failures are deliberately not told
    /// apart; both surface as `Rejected`.
    #[must_use]
    pub fn from_result(result: &Result<SubmitResponse, SubmitError>) -> Self {
        match result {
            Ok(response) if response.success => Self::Accepted,
            _ => Self::Rejected,
        }
    }
}

/// Sends form submissions to the backend.
#[async_trait(?Send)]
pub trait FormTransport {
    async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse, SubmitError>;
}

/// Interprets a raw HTTP reply. Anything outside 2xx is a failure regardless
/// of body; a 2xx body must be a JSON object.
pub fn decode_submit_response(status: u16, body: &str) -> Result<SubmitResponse, SubmitError> {
    if !(200..=299).contains(&status) {
        return Err(SubmitError::Status(status));
    }
    serde_json::from_str(body).map_err(|error| SubmitError::Decode(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_keeps_order_and_duplicates() {
        let mut payload = FormPayload::default();
        payload.push("name", "Ana");
        payload.push("service", "pool");
        payload.push("service", "garden");

        assert_eq!(payload.len(), 3);
        assert_eq!(payload.get("service"), Some("pool"));
        assert_eq!(payload.get("missing"), None);
        assert_eq!(payload.fields()[2], ("service".to_string(), "garden".to_string()));
    }

    #[test]
    fn decodes_success_and_failure_bodies() {
        let ok = decode_submit_response(200, r#"{"success": true, "message": "Thank you!"}"#)
            .expect("success body");
        assert!(ok.success);
        assert_eq!(ok.message.as_deref(), Some("Thank you!"));

        let rejected = decode_submit_response(
            200,
            r#"{"success": false, "errors": {"email": ["Enter a valid email address."]}}"#,
        )
        .expect("failure body");
        assert!(!rejected.success);
        assert!(rejected.errors.is_some());
    }

    #[test]
    fn missing_success_flag_is_a_failure() {
        let response = decode_submit_response(200, "{}").expect("empty object decodes");
        assert_eq!(
            SubmissionOutcome::from_result(&Ok(response)),
            SubmissionOutcome::Rejected
        );
    }

    #[test]
    fn non_2xx_and_non_json_are_errors() {
        assert_eq!(
            decode_submit_response(403, r#"{"success": true}"#),
            Err(SubmitError::Status(403))
        );
        assert!(matches!(
            decode_submit_response(200, "<html>Server Error</html>"),
            Err(SubmitError::Decode(_))
        ));
    }

    #[test]
    fn outcome_collapses_every_failure() {
        let accepted = Ok(SubmitResponse {
            success: true,
            ..SubmitResponse::default()
        });
        assert_eq!(
            SubmissionOutcome::from_result(&accepted),
            SubmissionOutcome::Accepted
        );
        assert_eq!(
            SubmissionOutcome::from_result(&Err(SubmitError::Network("offline".to_string()))),
            SubmissionOutcome::Rejected
        );
        assert_eq!(
            SubmissionOutcome::from_result(&Ok(SubmitResponse::default())),
            SubmissionOutcome::Rejected
        );
    }
}
