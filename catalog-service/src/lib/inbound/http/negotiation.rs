//! Response encoding selection and the JSON/XML renderers.
//!
//! Precedence, first match wins:
//! 1. `format=xml` query parameter
//! 2. `format=json` query parameter
//! 3. an `Accept` header mentioning `application/xml`
//! 4. JSON
//!
//! Unrecognised `format` values are ignored. XML output is a root element wrapping one
//! `<item>` per record with one child element per field; null fields become empty
//! elements.

use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::extract::Query;
use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Writer;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const APPLICATION_XML: &str = "application/xml";

const ITEM_ELEMENT: &str = "item";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    Xml,
}

impl ResponseFormat {
    /// Pick the response encoding from the `format` override and the `Accept` header.
    pub fn negotiate(format: Option<&str>, accept: Option<&str>) -> Self {
        match format.map(|f| f.trim().to_ascii_lowercase()).as_deref() {
            Some("xml") => return ResponseFormat::Xml,
            Some("json") => return ResponseFormat::Json,
            _ => {}
        }

        let wants_xml = accept.is_some_and(|accept| {
            accept
                .split(',')
                .any(|media| media.trim().to_ascii_lowercase().starts_with(APPLICATION_XML))
        });

        if wants_xml {
            ResponseFormat::Xml
        } else {
            ResponseFormat::Json
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FormatQuery {
    format: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for ResponseFormat
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A query string that fails to decode carries no override.
        let query = Query::<FormatQuery>::try_from_uri(&parts.uri)
            .map(|Query(query)| query)
            .unwrap_or_default();
        let accept = parts
            .headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok());

        Ok(ResponseFormat::negotiate(query.format.as_deref(), accept))
    }
}

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("Failed to convert record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record is not a field mapping")]
    NotARecord,

    #[error("Failed to write XML: {0}")]
    Xml(String),
}

/// Render records as `<root><item><field>value</field>...</item>...</root>`.
///
/// # Arguments
/// * `root` - Name of the root element, e.g. `books`
/// * `records` - Uniform JSON objects; field order is preserved
///
/// # Errors
/// * `NotARecord` - A record is not a JSON object
/// * `Xml` - The writer failed
pub fn to_xml(root: &str, records: &[Value]) -> Result<String, SerializationError> {
    let mut writer = Writer::new(Vec::new());

    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    write(&mut writer, Event::Start(BytesStart::new(root)))?;

    for record in records {
        let fields = record.as_object().ok_or(SerializationError::NotARecord)?;

        write(&mut writer, Event::Start(BytesStart::new(ITEM_ELEMENT)))?;
        for (name, value) in fields {
            match scalar_text(value) {
                None => write(&mut writer, Event::Empty(BytesStart::new(name.as_str())))?,
                Some(text) => {
                    write(&mut writer, Event::Start(BytesStart::new(name.as_str())))?;
                    write(&mut writer, Event::Text(BytesText::new(&text)))?;
                    write(&mut writer, Event::End(BytesEnd::new(name.as_str())))?;
                }
            }
        }
        write(&mut writer, Event::End(BytesEnd::new(ITEM_ELEMENT)))?;
    }

    write(&mut writer, Event::End(BytesEnd::new(root)))?;

    String::from_utf8(writer.into_inner()).map_err(|e| SerializationError::Xml(e.to_string()))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), SerializationError> {
    writer
        .write_event(event)
        .map_err(|e| SerializationError::Xml(e.to_string()))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

/// A response body already encoded in the negotiated format.
#[derive(Debug, Clone, PartialEq)]
pub enum Negotiated {
    Json(StatusCode, Value),
    Xml(StatusCode, String),
}

impl Negotiated {
    /// Encode a collection: a JSON array, or a root wrapping one `<item>` per record.
    pub fn collection<T: Serialize>(
        format: ResponseFormat,
        root: &str,
        records: &[T],
    ) -> Result<Self, SerializationError> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        match format {
            ResponseFormat::Json => Ok(Negotiated::Json(StatusCode::OK, Value::Array(values))),
            ResponseFormat::Xml => Ok(Negotiated::Xml(StatusCode::OK, to_xml(root, &values)?)),
        }
    }

    /// Encode a single record: a JSON object, or a root wrapping exactly one `<item>`.
    pub fn record<T: Serialize>(
        format: ResponseFormat,
        root: &str,
        record: &T,
    ) -> Result<Self, SerializationError> {
        let value = serde_json::to_value(record)?;

        match format {
            ResponseFormat::Json => Ok(Negotiated::Json(StatusCode::OK, value)),
            ResponseFormat::Xml => Ok(Negotiated::Xml(
                StatusCode::OK,
                to_xml(root, std::slice::from_ref(&value))?,
            )),
        }
    }
}

impl IntoResponse for Negotiated {
    fn into_response(self) -> Response {
        match self {
            Negotiated::Json(status, value) => (status, Json(value)).into_response(),
            Negotiated::Xml(status, body) => (
                status,
                [(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_XML))],
                body,
            )
                .into_response(),
        }
    }
}
