//! In-page request boundary.
//!
//! Every network call made on behalf of a session runs inside the browser
//! page so that the page's cookies, origin and TLS fingerprint apply. Nothing
//! is captured across the host/page boundary: a call is one fixed script
//! applied to one JSON-serialized [`PageRequest`], and the script answers with
//! a JSON object that deserializes into [`PageReply`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP method of an in-page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

/// Body of an in-page request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RequestBody {
    /// Sent verbatim with `Content-Type: application/json`.
    Json { text: String },
    /// Encoded with `URLSearchParams`, preserving field order.
    Form { fields: Vec<(String, String)> },
}

/// A single serializable request executed by the in-page script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub url: String,
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
}

impl PageRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, payload: &Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            url: url.into(),
            method: Method::Post,
            headers,
            body: Some(RequestBody::Json {
                text: payload.to_string(),
            }),
        }
    }

    pub fn post_form<K, V>(url: impl Into<String>, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut headers = BTreeMap::new();
        headers.insert(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        Self {
            url: url.into(),
            method: Method::Post,
            headers,
            body: Some(RequestBody::Form {
                fields: fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            }),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Form field value by name, if this is a form post.
    pub fn form_field(&self, name: &str) -> Option<&str> {
        match &self.body {
            Some(RequestBody::Form { fields }) => fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Parsed JSON body, if this is a JSON post.
    pub fn json_body(&self) -> Option<Value> {
        match &self.body {
            Some(RequestBody::Json { text }) => serde_json::from_str(text).ok(),
            _ => None,
        }
    }
}

/// Raw answer of the in-page script.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PageReply {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub error: Option<String>,
}

/// Successful in-page response.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    pub status: u16,
    /// Parsed JSON body, `Null` when the body was empty or not JSON.
    pub body: Value,
}

impl PageResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl PageReply {
    /// Split into a response or the in-page fetch failure message.
    pub fn into_response(self) -> Result<PageResponse, String> {
        match self.error {
            Some(message) => Err(message),
            None => Ok(PageResponse::new(self.status, self.body)),
        }
    }
}

const REQUEST_SCRIPT: &str = r#"async (req) => {
  try {
    const init = { method: req.method, headers: req.headers, credentials: "include" };
    if (req.body && req.body.kind === "json") {
      init.body = req.body.text;
    } else if (req.body && req.body.kind === "form") {
      init.body = new URLSearchParams(req.body.fields).toString();
    }
    const res = await fetch(req.url, init);
    const text = await res.text();
    let body = null;
    if (text) {
      try { body = JSON.parse(text); } catch (_) { body = null; }
    }
    return { status: res.status, body };
  } catch (err) {
    return { status: 0, body: null, error: String((err && err.message) || err) };
  }
}"#;

/// Render the expression that performs `request` when evaluated in a page.
///
/// JSON is a subset of JavaScript expression syntax, so the serialized
/// request is embedded as a literal argument.
pub fn render_request(request: &PageRequest) -> serde_json::Result<String> {
    let args = serde_json::to_string(request)?;
    Ok(format!("({})({})", REQUEST_SCRIPT, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_fields_keep_order() {
        let req = PageRequest::post_form(
            "https://example.test/api/auth/callback/credentials",
            [("message", "m"), ("redirect", "false"), ("signature", "0xsig")],
        );
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["method"], "POST");
        assert_eq!(value["body"]["kind"], "form");
        assert_eq!(
            value["body"]["fields"],
            json!([["message", "m"], ["redirect", "false"], ["signature", "0xsig"]])
        );
        assert_eq!(req.form_field("redirect"), Some("false"));
        assert_eq!(req.form_field("csrfToken"), None);
    }

    #[test]
    fn test_json_post_with_header() {
        let payload = json!({"operationName": "Op", "variables": {}});
        let req = PageRequest::post_json("https://gql.test", &payload).header("Authorization", "Bearer t");
        assert_eq!(req.headers["Authorization"], "Bearer t");
        assert_eq!(req.headers["Content-Type"], "application/json");
        assert_eq!(req.json_body(), Some(payload));
    }

    #[test]
    fn test_render_embeds_arguments_as_literal() {
        let req = PageRequest::get("https://example.test/api/auth/csrf?q=\"quoted\"</script>");
        let script = render_request(&req).unwrap();
        assert!(script.starts_with("(async (req) =>"));
        assert!(script.ends_with(&format!("({})", serde_json::to_string(&req).unwrap())));
        assert!(!script.contains("\"body\":"));
    }

    #[test]
    fn test_reply_conversion() {
        let reply: PageReply =
            serde_json::from_value(json!({"status": 200, "body": {"csrfToken": "abc"}})).unwrap();
        let resp = reply.into_response().unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.body["csrfToken"], "abc");

        let reply: PageReply =
            serde_json::from_value(json!({"status": 0, "body": null, "error": "Failed to fetch"})).unwrap();
        assert_eq!(reply.into_response().unwrap_err(), "Failed to fetch");
    }
}
