//! HTTP transport implementation using `reqwest`.

use reqwest::multipart::{Form, Part};

use crate::{
    ApiRequest, ApiResponse, FormPart, HttpTransport, Method, RequestBody,
    TransportConfig, TransportError,
};

/// A `reqwest`-based [`HttpTransport`] bound to one API base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Builds a transport from the given config.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        tracing::info!(%base_url, "HTTP transport ready");
        Ok(Self { client, base_url })
    }

    /// Resolves a request path against the base URL. Absolute URLs pass
    /// through untouched.
    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: &ApiRequest,
    ) -> Result<ApiResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, self.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        let response = builder.send().await.map_err(map_send_error)?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status,
            "response received"
        );

        Ok(ApiResponse::new(status, body.to_vec()))
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                let file = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(content_type)
                    .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
                form.part(name.clone(), file)
            }
        };
    }
    Ok(form)
}

fn map_send_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_builder() {
        TransportError::InvalidRequest(e.to_string())
    } else {
        // Connect failures, resets, TLS errors: the server never answered.
        TransportError::Unreachable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> ReqwestTransport {
        ReqwestTransport::new(TransportConfig {
            base_url: base.to_string(),
            ..TransportConfig::default()
        })
        .expect("client should build")
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let t = transport("https://api.example.com/api/");
        assert_eq!(
            t.url("/user/profile"),
            "https://api.example.com/api/user/profile"
        );
    }

    #[test]
    fn test_url_keeps_absolute_paths() {
        let t = transport("https://api.example.com/api");
        assert_eq!(
            t.url("https://other.example.com/x"),
            "https://other.example.com/x"
        );
    }

    #[test]
    fn test_build_form_rejects_bad_mime() {
        let parts = vec![FormPart::File {
            name: "images".into(),
            file_name: "a.jpg".into(),
            content_type: "not a mime".into(),
            bytes: vec![1, 2, 3],
        }];
        assert!(matches!(
            build_form(&parts),
            Err(TransportError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_send_to_closed_port_is_unreachable() {
        // Port 9 (discard) on localhost is closed on any sane test box.
        let t = transport("http://127.0.0.1:9");
        let result = t.send(&ApiRequest::get("/products")).await;
        let err = result.expect_err("nothing listens there");
        assert!(err.is_network(), "got {err:?}");
    }
}
