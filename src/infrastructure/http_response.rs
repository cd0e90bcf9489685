// HTTP response utilities for JSON and HTML bodies with optional Brotli
use async_compression::tokio::bufread::BrotliEncoder;
use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Response, StatusCode, header},
};
use bytes::Bytes;
use serde::Serialize;
use tokio::io::AsyncReadExt;

/// Whether the client listed `br` in `Accept-Encoding`.
pub fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|encoding| {
            let mut parts = encoding.trim().split(';');
            let name = parts.next().unwrap_or("").trim();
            let disabled = parts.any(|p| p.trim().replace(' ', "") == "q=0");
            name.eq_ignore_ascii_case("br") && !disabled
        })
}

async fn brotli(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = BrotliEncoder::new(data);
    let mut compressed = Vec::new();
    encoder.read_to_end(&mut compressed).await?;
    Ok(compressed)
}

fn build(body: Vec<u8>, content_type: &'static str, encoding: Option<&'static str>) -> Result<Response<Body>, StatusCode> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, HeaderValue::from(body.len()));

    if let Some(encoding) = encoding {
        builder = builder
            .header(header::CONTENT_ENCODING, encoding)
            .header(header::VARY, "accept-encoding");
    }

    builder.body(Body::from(Bytes::from(body))).map_err(|e| {
        tracing::error!(error = %e, "failed to build response");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Serialize to JSON and optionally compress with Brotli
pub async fn json_response<T: Serialize>(data: &T, compress: bool) -> Result<Response<Body>, StatusCode> {
    let json = serde_json::to_vec(data).map_err(|e| {
        tracing::error!(error = %e, "JSON serialization error");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    if !compress {
        return build(json, "application/json", None);
    }

    let compressed = brotli(&json).await.map_err(|e| {
        tracing::error!(error = %e, "Brotli compression error");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    tracing::debug!(raw = json.len(), compressed = compressed.len(), "compressed JSON body");
    build(compressed, "application/json", Some("br"))
}

pub fn html_response(markup: String) -> Result<Response<Body>, StatusCode> {
    build(markup.into_bytes(), "text/html; charset=utf-8", None)
}
