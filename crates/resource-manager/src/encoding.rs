//! Content negotiation and body encoding.
//!
//! An [`Encoder`] marshals and unmarshals the generic string-keyed mapping
//! used by the dispatcher. A [`Negotiator`] holds the configured encoders and
//! picks one per request.
//!
//! # Selection
//!
//! 1. `Content-Type`, when present, must name a supported media type.
//! 2. Otherwise the first supported entry of `Accept` wins; `*/*` selects
//!    the default encoder.
//! 3. A request with neither header gets the default (first) encoder.
//!
//! Parameters such as `charset` are ignored.

use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderMap, header};
use mime::Mime;
use serde_json::Value;

use crate::error::{EncodingError, NegotiationError};
use crate::resource::Values;

/// A serialization strategy for request and response bodies.
pub trait Encoder: fmt::Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns true if this encoder handles the given media type.
    fn accepts(&self, media_type: &Mime) -> bool;

    /// Value of the `Content-Type` header for responses.
    fn response_content_type(&self) -> &'static str;

    /// Serializes a mapping.
    fn marshal(&self, values: &Values) -> Result<Vec<u8>, EncodingError>;

    /// Parses a document whose root must be a string-keyed mapping.
    fn unmarshal(&self, bytes: &[u8]) -> Result<Values, EncodingError>;
}

/// JSON bodies (`application/json` and `+json` types).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn name(&self) -> &'static str {
        "json"
    }

    fn accepts(&self, media_type: &Mime) -> bool {
        media_type.type_() == mime::APPLICATION
            && (media_type.subtype() == mime::JSON || media_type.suffix() == Some(mime::JSON))
    }

    fn response_content_type(&self) -> &'static str {
        "application/json"
    }

    fn marshal(&self, values: &Values) -> Result<Vec<u8>, EncodingError> {
        Ok(serde_json::to_vec(values)?)
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<Values, EncodingError> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(values) => Ok(values),
            _ => Err(EncodingError::NotAMapping),
        }
    }
}

/// YAML bodies (`text/yaml`, `application/yaml`, `application/x-yaml`).
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlEncoder;

impl Encoder for YamlEncoder {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn accepts(&self, media_type: &Mime) -> bool {
        let type_ok = media_type.type_() == mime::TEXT || media_type.type_() == mime::APPLICATION;
        let subtype = media_type.subtype().as_str();
        let yaml = subtype == "yaml"
            || subtype == "x-yaml"
            || media_type.suffix().is_some_and(|s| s.as_str() == "yaml");
        type_ok && yaml
    }

    fn response_content_type(&self) -> &'static str {
        "text/yaml"
    }

    fn marshal(&self, values: &Values) -> Result<Vec<u8>, EncodingError> {
        Ok(serde_yaml::to_string(values)?.into_bytes())
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<Values, EncodingError> {
        match serde_yaml::from_slice::<Value>(bytes)? {
            Value::Object(values) => Ok(values),
            _ => Err(EncodingError::NotAMapping),
        }
    }
}

/// Ordered set of encoders; the first one is the default.
#[derive(Debug, Clone)]
pub struct Negotiator {
    encoders: Vec<Arc<dyn Encoder>>,
}

impl Default for Negotiator {
    fn default() -> Self {
        Self {
            encoders: vec![Arc::new(JsonEncoder), Arc::new(YamlEncoder)],
        }
    }
}

impl Negotiator {
    /// Creates a negotiator over the given encoders, in preference order.
    pub fn new(encoders: Vec<Arc<dyn Encoder>>) -> Self {
        Self { encoders }
    }

    /// Returns the configured encoders.
    pub fn encoders(&self) -> &[Arc<dyn Encoder>] {
        &self.encoders
    }

    /// Returns true if no encoder is configured.
    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    /// Picks the encoder for a request from its headers.
    pub fn select_from_request(
        &self,
        headers: &HeaderMap,
    ) -> Result<Arc<dyn Encoder>, NegotiationError> {
        if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
            let content_type = content_type.to_str().map_err(|_| {
                NegotiationError::InvalidMediaType(
                    String::from_utf8_lossy(content_type.as_bytes()).into_owned(),
                )
            })?;
            return self.select(content_type);
        }

        if let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) {
            return self.select_accept(accept);
        }

        self.default_encoder(None)
    }

    /// Picks the encoder for a single media type.
    pub fn select(&self, media_type: &str) -> Result<Arc<dyn Encoder>, NegotiationError> {
        let parsed: Mime = media_type
            .trim()
            .parse()
            .map_err(|_| NegotiationError::InvalidMediaType(media_type.to_string()))?;

        self.encoders
            .iter()
            .find(|e| e.accepts(&parsed))
            .cloned()
            .ok_or_else(|| NegotiationError::Unsupported(media_type.to_string()))
    }

    /// Picks the encoder for an `Accept` header (quality values are not ranked).
    fn select_accept(&self, accept: &str) -> Result<Arc<dyn Encoder>, NegotiationError> {
        for entry in accept.split(',') {
            let Ok(parsed) = entry.trim().parse::<Mime>() else {
                continue;
            };

            if parsed.type_() == mime::STAR {
                return self.default_encoder(Some(accept));
            }

            if parsed.subtype() == mime::STAR {
                let prefix = format!("{}/", parsed.type_());
                if let Some(encoder) = self
                    .encoders
                    .iter()
                    .find(|e| e.response_content_type().starts_with(&prefix))
                {
                    return Ok(Arc::clone(encoder));
                }
                continue;
            }

            if let Some(encoder) = self.encoders.iter().find(|e| e.accepts(&parsed)) {
                return Ok(Arc::clone(encoder));
            }
        }

        Err(NegotiationError::Unsupported(accept.to_string()))
    }

    fn default_encoder(&self, hint: Option<&str>) -> Result<Arc<dyn Encoder>, NegotiationError> {
        self.encoders
            .first()
            .cloned()
            .ok_or_else(|| NegotiationError::Unsupported(hint.unwrap_or_default().to_string()))
    }
}
