//! Response envelope and its JSON / XML encodings.
//!
//! Every endpoint answers with the same envelope:
//!
//! ```json
//! {
//!     "status": "success",
//!     "message": "Ordine creato",
//!     "data": { "id": 1, "utente_id": 1, "email": "a@x.com", ... },
//!     "id": 1
//! }
//! ```
//!
//! The XML form is rooted at `<response>`; each record in `data` becomes a
//! `<utente>` or `<ordine>` element with one child per field.

// `write!` into a `String` never fails, hence the `let _ =` below.
use std::fmt::Write as _;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::error::ApiError;

/// Encoding selected by the `format` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Xml,
}

impl Format {
    /// Case-insensitive; anything other than `json` or `xml` falls back to
    /// JSON.
    #[must_use]
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.trim().eq_ignore_ascii_case("xml") => Self::Xml,
            _ => Self::Json,
        }
    }

    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json; charset=utf-8",
            Self::Xml => "application/xml; charset=utf-8",
        }
    }
}

/// The two exposed resources. Only affects XML element names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Users,
    Orders,
}

impl Resource {
    /// Element name of one record in XML `data`.
    #[must_use]
    pub const fn record_tag(self) -> &'static str {
        match self {
            Self::Users => "utente",
            Self::Orders => "ordine",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl Status {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// The uniform response wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Envelope {
    #[must_use]
    pub const fn success() -> Self {
        Self {
            status: Status::Success,
            message: None,
            data: None,
            count: None,
            id: None,
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
            ..Self::success()
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Single record in `data`.
    ///
    /// # Errors
    ///
    /// Fails only if `record`'s `Serialize` impl fails.
    pub fn with_record<T: Serialize>(mut self, record: &T) -> Result<Self, serde_json::Error> {
        self.data = Some(serde_json::to_value(record)?);
        Ok(self)
    }

    /// Record list in `data`, with its length in `count`.
    ///
    /// # Errors
    ///
    /// Fails only if a record's `Serialize` impl fails.
    pub fn with_records<T: Serialize>(mut self, records: &[T]) -> Result<Self, serde_json::Error> {
        self.data = Some(serde_json::to_value(records)?);
        self.count = Some(records.len());
        Ok(self)
    }

    #[must_use]
    pub const fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn with_error_detail(mut self, detail: impl Into<String>) -> Self {
        self.error = Some(detail.into());
        self
    }
}

/// A successful handler outcome: status code plus envelope.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub envelope: Envelope,
}

impl Reply {
    #[must_use]
    pub const fn ok(envelope: Envelope) -> Self {
        Self {
            status: StatusCode::OK,
            envelope,
        }
    }

    #[must_use]
    pub const fn created(envelope: Envelope) -> Self {
        Self {
            status: StatusCode::CREATED,
            envelope,
        }
    }
}

/// Turn a handler outcome into an HTTP response in the requested format.
#[must_use]
pub fn respond(
    format: Format,
    resource: Resource,
    expose_detail: bool,
    result: Result<Reply, ApiError>,
) -> Response {
    let (status, envelope) = match result {
        Ok(reply) => (reply.status, reply.envelope),
        Err(err) => {
            err.report();
            (err.status(), err.to_envelope(expose_detail))
        }
    };
    render(format, resource, status, &envelope)
}

#[must_use]
pub fn render(format: Format, resource: Resource, status: StatusCode, envelope: &Envelope) -> Response {
    let body = match format {
        Format::Json => match render_json(envelope) {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(error = %err, "Failed to encode JSON response");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        },
        Format::Xml => render_xml(envelope, resource.record_tag()).into_bytes(),
    };
    (status, [(header::CONTENT_TYPE, format.content_type())], body).into_response()
}

/// Pretty JSON with four-space indentation. Non-ASCII text is written
/// verbatim.
///
/// # Errors
///
/// Propagates serializer errors.
pub fn render_json(envelope: &Envelope) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::with_capacity(256);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    envelope.serialize(&mut serializer)?;
    Ok(buf)
}

/// XML document rooted at `<response>`; records in `data` are wrapped in
/// `record_tag` elements.
#[must_use]
pub fn render_xml(envelope: &Envelope, record_tag: &str) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<response>");
    write_text(&mut out, "status", envelope.status.as_str());
    if let Some(message) = &envelope.message {
        write_text(&mut out, "message", message);
    }
    if let Some(data) = &envelope.data {
        out.push_str("<data>");
        match data {
            Value::Array(records) => {
                for record in records {
                    write_value(&mut out, record_tag, record);
                }
            }
            Value::Object(_) => write_value(&mut out, record_tag, data),
            scalar => out.push_str(&escape(&scalar_text(scalar))),
        }
        out.push_str("</data>");
    }
    if let Some(count) = envelope.count {
        write_text(&mut out, "count", &count.to_string());
    }
    if let Some(id) = envelope.id {
        write_text(&mut out, "id", &id.to_string());
    }
    if let Some(error) = &envelope.error {
        write_text(&mut out, "error", error);
    }
    out.push_str("</response>\n");
    out
}

fn write_value(out: &mut String, name: &str, value: &Value) {
    let name = element_name(name);
    match value {
        Value::Object(fields) => {
            let _ = write!(out, "<{name}>");
            for (key, field) in fields {
                write_value(out, key, field);
            }
            let _ = write!(out, "</{name}>");
        }
        Value::Array(items) => {
            let _ = write!(out, "<{name}>");
            for item in items {
                write_value(out, "item", item);
            }
            let _ = write!(out, "</{name}>");
        }
        scalar => write_text(out, name, &scalar_text(scalar)),
    }
}

fn write_text(out: &mut String, name: &str, text: &str) {
    if text.is_empty() {
        let _ = write!(out, "<{name}/>");
    } else {
        let _ = write!(out, "<{name}>{}</{name}>", escape(text));
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Keys that are not valid XML names (numeric, empty, spaces...) become
/// `item`.
fn element_name(key: &str) -> &str {
    let mut chars = key.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid_start && valid_rest { key } else { "item" }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            c => escaped.push(c),
        }
    }
    escaped
}
