//! Request and response descriptors.
//!
//! An [`ApiRequest`] is a plain value describing one HTTP call: method,
//! path relative to the API base URL, query pairs, body, and an optional
//! bearer token. Keeping it a value (instead of a live client builder)
//! lets the session pipeline clone it and resend it after a token refresh.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::TransportError;

/// Default file name for an image part when the caller didn't give one.
pub const DEFAULT_IMAGE_NAME: &str = "photo.jpg";

/// Default content type for an image part when the caller didn't give one.
pub const DEFAULT_IMAGE_TYPE: &str = "image/jpeg";

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// The HTTP methods the marketplace API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// One part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    /// A plain text field.
    Text { name: String, value: String },

    /// A file field (profile picture, product photo).
    File {
        name: String,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    /// Creates a text field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the form field name of this part.
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }

    /// Reads a file from disk into a file part.
    ///
    /// `file_name` and `content_type` fall back to `photo.jpg` and
    /// `image/jpeg`, which is what the backend expects from camera-roll
    /// pictures that carry no metadata.
    ///
    /// # Errors
    /// Returns [`TransportError::InvalidRequest`] if the file can't be read.
    pub async fn read_file(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        file_name: Option<String>,
        content_type: Option<String>,
    ) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            TransportError::InvalidRequest(format!(
                "cannot read {}: {e}",
                path.display()
            ))
        })?;
        Ok(Self::File {
            name: name.into(),
            file_name: file_name
                .unwrap_or_else(|| DEFAULT_IMAGE_NAME.to_string()),
            content_type: content_type
                .unwrap_or_else(|| DEFAULT_IMAGE_TYPE.to_string()),
            bytes,
        })
    }
}

/// An image chosen by the user (camera roll, file dialog), not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub path: PathBuf,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl ImageAsset {
    /// An asset with no metadata; defaults apply when it is uploaded.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_name: None,
            content_type: None,
        }
    }

    /// Reads the asset into a file part named `field`.
    pub async fn into_part(
        self,
        field: impl Into<String>,
    ) -> Result<FormPart, TransportError> {
        FormPart::read_file(field, &self.path, self.file_name, self.content_type)
            .await
    }
}

/// The body of a request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    /// No body (GET, DELETE).
    #[default]
    Empty,
    /// A JSON document.
    Json(serde_json::Value),
    /// A `multipart/form-data` form.
    Multipart(Vec<FormPart>),
}

// ---------------------------------------------------------------------------
// ApiRequest
// ---------------------------------------------------------------------------

/// Describes a single outbound API call.
///
/// Built with the constructor for the method plus chained setters:
///
/// ```rust
/// use souk_transport::{ApiRequest, Method};
///
/// let req = ApiRequest::get("/products")
///     .query("page", "1")
///     .query("limit", "10");
/// assert_eq!(req.method, Method::Get);
/// assert_eq!(req.query.len(), 2);
/// assert!(req.bearer.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/user/profile`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Bearer credential for the `Authorization` header, if any.
    pub bearer: Option<String>,
}

impl ApiRequest {
    /// Creates a request with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Appends a query pair.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Sets a JSON body from any serializable value.
    ///
    /// # Errors
    /// Returns [`TransportError::InvalidRequest`] if the value can't be
    /// represented as JSON (e.g. a map with non-string keys).
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, TransportError> {
        let value = serde_json::to_value(body)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Sets a multipart body.
    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    /// Attaches a bearer token.
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

// ---------------------------------------------------------------------------
// ApiResponse
// ---------------------------------------------------------------------------

/// What the server sent back: a status code and the raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// HTTP 401: the credential was missing, expired, or rejected.
    pub const UNAUTHORIZED: u16 = 401;

    /// Creates a response from a status and a body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `true` for HTTP 401.
    pub fn is_unauthorized(&self) -> bool {
        self.status == Self::UNAUTHORIZED
    }
}
