//! One-shot listener for the OAuth2 redirect.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info};

const REPLY_BODY: &str = "You may now close this window.";

/// Wait for a single redirect on `port`, hand its `code` to `exchange` on a
/// worker thread, answer the browser, then return the exchange result.
pub fn receive_code<T, F>(port: u16, exchange: F) -> Result<T>
where
    F: FnOnce(String) -> T + Send + 'static,
    T: Send + 'static,
{
    let listener = TcpListener::bind(("127.0.0.1", port))
        .with_context(|| format!("cannot listen on port {port}"))?;
    info!(port, "waiting for the authorization redirect");

    let (mut stream, peer) = listener.accept().context("accepting redirect")?;
    debug!(%peer, "redirect received");

    let mut request_line = String::new();
    BufReader::new(&stream)
        .read_line(&mut request_line)
        .context("reading redirect request")?;
    let code = code_from_request_line(&request_line)?;

    let worker = thread::spawn(move || exchange(code));

    let reply = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        REPLY_BODY.len(),
        REPLY_BODY
    );
    stream
        .write_all(reply.as_bytes())
        .context("answering the browser")?;
    drop(stream);

    worker
        .join()
        .map_err(|_| anyhow!("token exchange thread panicked"))
}

/// Pull `code` out of `GET /path?code=...&state=... HTTP/1.1`.
fn code_from_request_line(line: &str) -> Result<String> {
    let target = line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow!("malformed redirect request: {line:?}"))?;
    let url = reqwest::Url::parse(&format!("http://localhost{target}"))
        .with_context(|| format!("malformed redirect target {target:?}"))?;

    if let Some((_, err)) = url.query_pairs().find(|(k, _)| k == "error") {
        bail!("authorization denied: {err}");
    }
    url.query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.into_owned())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| anyhow!("redirect carried no authorization code"))
}
