//! Development server: static files from the output tree over HTTP.
//!
//! The `serve` task binds the listener up front (so bind failures surface in
//! the task run) and then answers requests from a background thread, letting
//! `start` continue into the watch dispatcher.

mod mime;

use std::net::{IpAddr, SocketAddr};
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use tiny_http::{Header, Response, Server, StatusCode};

use crate::config::SiteConfig;
use crate::core::is_shutdown;
use crate::log;

/// How many consecutive ports to try when the configured one is taken.
const BIND_ATTEMPTS: u16 = 10;

/// Bind the server and spawn the request loop in the background.
pub fn spawn(config: SiteConfig) -> Result<()> {
    let (server, addr) = bind_with_retry(config.serve.interface, config.serve.port)?;
    log!("serve"; "http://{addr}");

    std::thread::spawn(move || run_request_loop(&server, &config));
    Ok(())
}

/// Bind, walking up from the configured port if it is already in use.
fn bind_with_retry(interface: IpAddr, port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_err = None;
    for offset in 0..BIND_ATTEMPTS {
        let Some(candidate) = port.checked_add(offset) else {
            break;
        };
        let addr = SocketAddr::new(interface, candidate);
        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {port} busy, using {candidate}");
                }
                return Ok((server, addr));
            }
            Err(err) => last_err = Some(err),
        }
    }
    Err(anyhow::anyhow!(
        "failed to bind {interface} (ports {port}..{}): {:?}",
        port.saturating_add(BIND_ATTEMPTS),
        last_err
    ))
}

fn run_request_loop(server: &Server, config: &SiteConfig) {
    for request in server.incoming_requests() {
        if is_shutdown() {
            break;
        }
        let path = resolve(request.url(), config.output_dir());
        let result = match path {
            Some(path) if path.is_file() => respond_file(request, &path),
            _ => respond_not_found(request),
        };
        if let Err(err) = result {
            log!("serve"; "request error: {err:#}");
        }
    }
}

/// Map a request URL onto a file inside the output tree.
///
/// Rejects traversal outside the root; directories resolve to their
/// `index.html`.
fn resolve(url: &str, root: &Path) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let relative = path.trim_start_matches('/');

    let candidate = root.join(relative);
    if candidate
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return None;
    }

    if candidate.is_dir() {
        Some(candidate.join("index.html"))
    } else {
        Some(candidate)
    }
}

fn respond_file(request: tiny_http::Request, path: &Path) -> Result<()> {
    let content_type = mime::from_path(path);
    let body = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    let response = Response::from_data(body)
        .with_header(Header::from_bytes("Content-Type", content_type).unwrap());
    request.respond(response)?;
    Ok(())
}

fn respond_not_found(request: tiny_http::Request) -> Result<()> {
    let response = Response::from_string("404 Not Found")
        .with_status_code(StatusCode(404))
        .with_header(Header::from_bytes("Content-Type", mime::types::PLAIN).unwrap());
    request.respond(response)?;
    Ok(())
}
