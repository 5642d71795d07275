//! Conversions between hyper messages and redirect descriptors

use anyhow::Result;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE, HOST, SET_COOKIE};
use hyper::{body::Bytes, Request, Response, StatusCode};
use redirect_core::{RedirectError, RequestDescriptor, ResponseDescriptor};
use tracing::warn;

/// Extract the request descriptor from an inbound request
///
/// Uses the `Host` header, falling back to the URI authority for
/// absolute-form requests.
pub fn request_descriptor<B>(req: &Request<B>) -> Result<RequestDescriptor, RedirectError> {
    let host = match req.headers().get(HOST) {
        Some(value) => value.to_str().map_err(|_| RedirectError::MissingHost)?,
        None => req.uri().authority().map(|a| a.as_str()).ok_or(RedirectError::MissingHost)?,
    };
    RequestDescriptor::from_host(host)
}

/// Encode a response descriptor as a hyper response
///
/// A descriptor that cannot be encoded (e.g. a location that is not a valid
/// header value) is answered with the upstream error response instead.
pub fn into_response(descriptor: ResponseDescriptor) -> Response<Full<Bytes>> {
    match build_response(&descriptor) {
        Ok(response) => response,
        Err(e) => {
            warn!("Unable to encode {} response: {}", descriptor.status_code, e);
            upstream_error_response()
        }
    }
}

fn build_response(descriptor: &ResponseDescriptor) -> Result<Response<Full<Bytes>>> {
    let mut builder = Response::builder().status(descriptor.status_code);

    for (name, value) in &descriptor.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    for cookie in &descriptor.cookies {
        builder = builder.header(SET_COOKIE, cookie.as_str());
    }

    let body = match &descriptor.body {
        Some(body) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Bytes::from(body.clone())
        }
        None => Bytes::new(),
    };

    Ok(builder.body(Full::new(body))?)
}

fn upstream_error_response() -> Response<Full<Bytes>> {
    let descriptor = RedirectError::UpstreamUnavailable.into_response();
    let body = descriptor.body.unwrap_or_default();

    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::LOCATION;

    #[test]
    fn test_descriptor_from_host_header() {
        let req = Request::builder()
            .uri("/some/path?q=1")
            .header(HOST, "Redirect.Example.com:8080")
            .body(())
            .unwrap();
        let descriptor = request_descriptor(&req).unwrap();
        assert_eq!(descriptor.host(), "redirect.example.com");
    }

    #[test]
    fn test_descriptor_from_absolute_uri() {
        let req = Request::builder()
            .uri("http://a.example.com/path")
            .body(())
            .unwrap();
        let descriptor = request_descriptor(&req).unwrap();
        assert_eq!(descriptor.host(), "a.example.com");
    }

    #[test]
    fn test_descriptor_without_host() {
        let req = Request::builder().uri("/").body(()).unwrap();
        assert_eq!(request_descriptor(&req), Err(RedirectError::MissingHost));

        let req = Request::builder()
            .uri("/")
            .header(HOST, "")
            .body(())
            .unwrap();
        assert_eq!(request_descriptor(&req), Err(RedirectError::MissingHost));
    }

    #[test]
    fn test_redirect_into_response() {
        let response = into_response(ResponseDescriptor::redirect("https://example.com/"));
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "https://example.com/");
        assert!(response.headers().get(CONTENT_TYPE).is_none());
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn test_error_into_response() {
        let descriptor = ResponseDescriptor::error(404, "No destination for a.example.com");
        let response = into_response(descriptor);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert!(response.headers().get(LOCATION).is_none());
    }

    #[test]
    fn test_cookies_become_set_cookie_headers() {
        let mut descriptor = ResponseDescriptor::redirect("https://example.com/");
        descriptor.cookies = vec!["a=1".to_string(), "b=2".to_string()];
        let response = into_response(descriptor);
        let cookies: Vec<_> = response.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_unencodable_location_falls_back_to_upstream_error() {
        let response = into_response(ResponseDescriptor::redirect("https://example.com/\nbad"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(LOCATION).is_none());
    }
}
