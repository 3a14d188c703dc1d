//! Writes a [`WebResponse`] to the wire through axum's response types.
//!
//! Dispatch is an exhaustive match over the variants, so a new variant will
//! not compile until it gets an encoding here.

use axum::{
    body::Body,
    http::{
        HeaderMap, HeaderName, HeaderValue,
        header::CONTENT_TYPE,
    },
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::http::response::{HeaderValues, WebResponse};

const TEXT_PLAIN_UTF_8: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON_UTF_8: &str = "application/json; charset=utf-8";

impl IntoResponse for WebResponse {
    fn into_response(self) -> Response {
        encode(self).unwrap_or_else(IntoResponse::into_response)
    }
}

fn encode(resp: WebResponse) -> Result<Response, AppError> {
    let status = resp.status_code();
    let headers = header_map(&resp.headers())?;

    let (content_type, body) = match resp {
        WebResponse::Text(r) => (TEXT_PLAIN_UTF_8, Body::from(r.body().to_owned())),
        WebResponse::Json(r) => (APPLICATION_JSON_UTF_8, Body::from(r.body().to_json()?)),
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;

    // An explicit content-type header from the handler takes precedence.
    if !headers.contains_key(CONTENT_TYPE) {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response.headers_mut().extend(headers);

    Ok(response)
}

fn header_map(values: &HeaderValues) -> Result<HeaderMap, AppError> {
    let mut map = HeaderMap::new();
    for (name, list) in values {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| AppError::InvalidHeader(name.clone()))?;
        for value in list {
            let header_value =
                HeaderValue::from_str(value).map_err(|_| AppError::InvalidHeader(name.clone()))?;
            map.append(header_name.clone(), header_value);
        }
    }
    Ok(map)
}
