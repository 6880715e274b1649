use crate::error::{AppError, Result};
use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

// Command routes change the actuator's state, so browsers may only reach
// them from pages this server rendered. Clients that send neither
// `Origin` nor `Sec-Fetch-Site` (curl, scripts) are let through.
pub async fn require_same_origin(request: Request, next: Next) -> Result<Response> {
    if is_cross_site(request.headers()) {
        warn!(
            uri = %request.uri(),
            origin = header_str(request.headers(), header::ORIGIN.as_str()).unwrap_or("-"),
            "Rejected cross-site command request"
        );
        return Err(AppError::CrossOrigin);
    }
    Ok(next.run(request).await)
}

pub fn is_cross_site(headers: &HeaderMap) -> bool {
    if header_str(headers, "sec-fetch-site") == Some("cross-site") {
        return true;
    }

    let Some(origin) = header_str(headers, header::ORIGIN.as_str()) else {
        return false;
    };

    // "null" and other opaque origins have no host to compare
    match (origin_host(origin), header_str(headers, header::HOST.as_str())) {
        (Some(origin_host), Some(host)) => !origin_host.eq_ignore_ascii_case(host),
        _ => true,
    }
}

fn origin_host(origin: &str) -> Option<&str> {
    origin
        .split_once("://")
        .map(|(_, authority)| authority.trim_end_matches('/'))
        .filter(|authority| !authority.is_empty())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}
