//! HTTP type conversions between hyper and the host request shape.
//!
//! Converts between the external HTTP types (hyper/http) and the host
//! request/response objects the bridge consumes and produces.

use bytes::Bytes;
use http::{HeaderName, HeaderValue, Response, StatusCode};
use http_body_util::Full;
use serde_json::Value;

use portico_core::types::{HostBody, HostRequest, HostResponse};

/// Build a host request object from a received HTTP request.
pub fn host_request_from_parts(parts: &http::request::Parts, body: Bytes) -> HostRequest {
    let mut headers = serde_json::Map::new();
    for (name, value) in &parts.headers {
        headers.insert(
            name.as_str().to_string(),
            Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
        );
    }

    HostRequest {
        method: Some(parts.method.as_str().to_string()),
        path: Some(parts.uri.path().to_string()),
        url: None,
        query: None,
        query_string: parts.uri.query().map(str::to_string),
        headers: Some(headers),
        body: if body.is_empty() {
            None
        } else {
            Some(HostBody::Binary(body.to_vec()))
        },
    }
}

/// Convert the bridge's response triple into a hyper response.
///
/// Header pairs the http types reject are skipped rather than failing
/// the whole response.
pub fn hyper_response_from(resp: &HostResponse) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(status_from_u16(resp.status_code));
    if let Some(header_map) = builder.headers_mut() {
        for (name, value) in &resp.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_bytes(value.as_bytes()),
            ) {
                header_map.append(name, value);
            }
        }
    }
    builder
        .body(Full::new(Bytes::from(resp.body.clone())))
        .unwrap_or_else(|_| {
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Full::new(Bytes::from_static(b"response build failed")))
                .expect("static fallback response")
        })
}

/// Convert a status code from u16, falling back to 500 for codes the
/// http types reject.
pub fn status_from_u16(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;
    use portico_bridge::normalize;

    fn parts_for(req: Request<()>) -> http::request::Parts {
        req.into_parts().0
    }

    #[test]
    fn request_conversion_preserves_method_and_path() {
        let req = Request::builder()
            .method("POST")
            .uri("http://localhost/contact?src=footer")
            .header("host", "localhost")
            .body(())
            .unwrap();
        let host_req = host_request_from_parts(&parts_for(req), Bytes::new());
        assert_eq!(host_req.method.as_deref(), Some("POST"));
        assert_eq!(host_req.path.as_deref(), Some("/contact"));
        assert_eq!(host_req.query_string.as_deref(), Some("src=footer"));
        assert!(host_req.body.is_none());
    }

    #[test]
    fn request_conversion_carries_headers_and_body() {
        let req = Request::builder()
            .uri("/submit")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(())
            .unwrap();
        let host_req =
            host_request_from_parts(&parts_for(req), Bytes::from_static(b"name=ada"));

        let canonical = normalize(&host_req);
        assert_eq!(
            canonical.headers.get("content-type"),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(canonical.body, Bytes::from_static(b"name=ada"));
    }

    #[test]
    fn response_conversion_preserves_status_headers_body() {
        let resp = HostResponse {
            status_code: 404,
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: "missing".to_string(),
        };
        let converted = hyper_response_from(&resp);
        assert_eq!(converted.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            converted.headers().get("content-type").unwrap(),
            "text/plain"
        );
    }

    #[test]
    fn response_conversion_skips_invalid_headers() {
        let resp = HostResponse {
            status_code: 200,
            headers: vec![
                ("bad\nname".to_string(), "x".to_string()),
                ("X-Ok".to_string(), "yes".to_string()),
            ],
            body: String::new(),
        };
        let converted = hyper_response_from(&resp);
        assert_eq!(converted.headers().len(), 1);
        assert_eq!(converted.headers().get("x-ok").unwrap(), "yes");
    }

    #[test]
    fn status_from_invalid_code() {
        assert_eq!(status_from_u16(200), StatusCode::OK);
        assert_eq!(status_from_u16(9999), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
