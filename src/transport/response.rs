use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};

/// A completed HTTP exchange: the status plus the raw body, decoded on demand.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl ApiResponse {
    pub(crate) fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            ClientError::decode(format!("{} (status {})", e, self.status.as_u16()))
        })
    }

    /// The server's `detail` message, if the body carries one.
    ///
    /// `detail` is normally a string; request-validation failures send a list
    /// of `{msg: ...}` objects instead, which are joined with `"; "`.
    pub fn detail(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_slice(&self.body).ok()?;
        match value.get("detail")? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => {
                let msgs: Vec<&str> = items
                    .iter()
                    .filter_map(|i| i.get("msg").and_then(serde_json::Value::as_str))
                    .collect();
                (!msgs.is_empty()).then(|| msgs.join("; "))
            }
            _ => None,
        }
    }

    /// Pass a 2xx response through; turn anything else into a [`ClientError`].
    ///
    /// `lookup` is the entity/id being addressed, so a 404 becomes `NotFound`.
    pub fn error_for_status(
        self,
        fallback: &str,
        lookup: Option<(&'static str, u64)>,
    ) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(ClientError::from_status(
            self.status,
            self.detail(),
            fallback,
            lookup,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse::new(
            StatusCode::from_u16(status).unwrap(),
            body.as_bytes().to_vec(),
        )
    }

    #[test]
    fn string_detail_is_extracted() {
        let r = response(400, r#"{"detail": "Project name already exists"}"#);
        assert_eq!(r.detail().as_deref(), Some("Project name already exists"));
    }

    #[test]
    fn validation_list_detail_is_joined() {
        let body = serde_json::json!({
            "detail": [{"loc": ["body", "name"], "msg": "field required"}, {"msg": "too short"}]
        });
        let r = response(422, &body.to_string());
        assert_eq!(r.detail().as_deref(), Some("field required; too short"));
    }

    #[test]
    fn non_json_body_has_no_detail() {
        let r = response(500, "<html>oops</html>");
        assert_eq!(r.detail(), None);
        let err = r.error_for_status("Failed to load", None).unwrap_err();
        assert_eq!(
            err,
            ClientError::Server {
                status: 500,
                message: "Failed to load".to_owned()
            }
        );
    }

    #[test]
    fn success_passes_through() {
        let r = response(200, r#"{"id": 1}"#);
        let ok = r.error_for_status("x", None).unwrap();
        let v: serde_json::Value = ok.json().unwrap();
        assert_eq!(v["id"], 1);
    }
}
