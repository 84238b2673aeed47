// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded HTTP/1.1 client for talking to drone endpoints.
//!
//! Drones expose a two-route contract (`GET /health`, `POST
//! /instructions`) on a plain TCP address, so a hand-rolled HTTP/1.1
//! exchange over [`TcpStream`] with an explicit deadline is all the
//! client the engine needs.

use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Errors from a bounded HTTP exchange.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request to {0} timed out")]
    Timeout(String),
    #[error("connect to {0} failed: {1}")]
    Connect(String, String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Parsed status and body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// `GET {path}` against `addr` with a hard deadline.
pub async fn get(addr: &str, path: &str, timeout: Duration) -> Result<HttpResponse, HttpError> {
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, addr
    );
    timed_request(addr, &request, timeout).await
}

/// `POST {path}` with a JSON body against `addr` with a hard deadline.
pub async fn post_json(
    addr: &str,
    path: &str,
    body: &str,
    timeout: Duration,
) -> Result<HttpResponse, HttpError> {
    let request = format!(
        "POST {} HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        path,
        addr,
        body.len(),
        body
    );
    timed_request(addr, &request, timeout).await
}

async fn timed_request(
    addr: &str,
    request: &str,
    timeout: Duration,
) -> Result<HttpResponse, HttpError> {
    tokio::time::timeout(timeout, send_request(addr, request))
        .await
        .map_err(|_| HttpError::Timeout(addr.to_string()))?
}

async fn send_request(addr: &str, request: &str) -> Result<HttpResponse, HttpError> {
    let mut stream = TcpStream::connect(addr)
        .await
        .map_err(|e| HttpError::Connect(addr.to_string(), e.to_string()))?;
    stream.write_all(request.as_bytes()).await?;

    let mut reader = BufReader::new(&mut stream);
    read_response(&mut reader).await
}

/// Read a status line, headers, and body from `reader`.
///
/// Honors `Content-Length` when present; otherwise reads to EOF
/// (the client always sends `Connection: close`).
pub(crate) async fn read_response<R>(reader: &mut R) -> Result<HttpResponse, HttpError>
where
    R: AsyncBufReadExt + Unpin,
{
    let mut status_line = String::new();
    reader.read_line(&mut status_line).await?;
    let status = parse_status_line(&status_line)?;

    let mut content_length: Option<usize> = None;
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 || line.trim().is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().ok();
            }
        }
    }

    let body = match content_length {
        Some(len) => {
            let mut buf = vec![0u8; len];
            reader.read_exact(&mut buf).await?;
            String::from_utf8_lossy(&buf).into_owned()
        }
        None => {
            let mut buf = String::new();
            reader.read_to_string(&mut buf).await?;
            buf
        }
    };

    Ok(HttpResponse { status, body })
}

fn parse_status_line(line: &str) -> Result<u16, HttpError> {
    // "HTTP/1.1 200 OK"
    line.split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| HttpError::Malformed(format!("bad status line: {:?}", line.trim_end())))
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
