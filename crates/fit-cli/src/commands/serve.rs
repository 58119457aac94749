//! Share-link HTTP server.
//!
//! tiny_http accepts connections on a blocking thread; each request is handed
//! to the runtime over a channel and answered by an async handler.

use std::sync::Arc;

use anyhow::anyhow;
use fit_core::ids::is_public_id;
use fit_db::service::FitService;
use serde_json::{Value, json};
use tiny_http::{Header, Method, Request, Response, Server};
use tokio::sync::mpsc;

use crate::cli::root_commands::ServeArgs;
use crate::commands::share::decoded_view;
use crate::context::AppContext;

const REQUEST_QUEUE: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Health,
    /// `/share?data=<token>`; `None` when the parameter is absent.
    Share { token: Option<String> },
    /// `/s/<public_id>`
    Public(String),
    NotFound,
}

/// Public link for a saved assessment.
pub fn public_link(base_url: &str, public_id: &str) -> String {
    format!("{}/s/{public_id}", base_url.trim_end_matches('/'))
}

/// Handle `stackfit serve`. Runs until Ctrl-C.
pub async fn handle(args: &ServeArgs, ctx: &mut AppContext) -> anyhow::Result<()> {
    let bind = args
        .bind
        .clone()
        .unwrap_or_else(|| ctx.config.server.bind.clone());
    let server = Arc::new(
        Server::http(bind.as_str()).map_err(|e| anyhow!("failed to bind {bind}: {e}"))?,
    );
    tracing::info!(%bind, "serving share links");

    let (tx, mut rx) = mpsc::channel::<Request>(REQUEST_QUEUE);
    let acceptor = {
        let server = Arc::clone(&server);
        tokio::task::spawn_blocking(move || {
            for request in server.incoming_requests() {
                if tx.blocking_send(request).is_err() {
                    break;
                }
            }
        })
    };

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            received = rx.recv() => {
                let Some(request) = received else { break };
                let service = ctx.service.detached_handle();
                tokio::spawn(async move {
                    let (status, body) =
                        respond(request.method(), request.url(), &service).await;
                    reply(request, status, &body);
                });
            }
            signal = &mut shutdown => {
                if let Err(error) = signal {
                    tracing::warn!(%error, "failed to listen for Ctrl-C");
                }
                tracing::info!("shutting down share server");
                break;
            }
        }
    }

    server.unblock();
    drop(rx);
    if let Err(error) = acceptor.await {
        tracing::warn!(%error, "accept loop ended abnormally");
    }
    Ok(())
}

/// Map a request path (with query) to a route.
pub fn parse_route(url: &str) -> Route {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    match path {
        "/health" => Route::Health,
        "/share" => Route::Share {
            token: query_param(query, "data"),
        },
        _ => match path.strip_prefix("/s/") {
            Some(id) if !id.is_empty() && !id.contains('/') => Route::Public(id.to_string()),
            _ => Route::NotFound,
        },
    }
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .and_then(|(_, v)| urlencoding::decode(v).ok())
        .map(std::borrow::Cow::into_owned)
        .filter(|v| !v.is_empty())
}

fn not_found() -> (u16, Value) {
    (404, json!({ "error": "not_found" }))
}

/// Produce the status and JSON body for a request.
pub async fn respond(method: &Method, url: &str, service: &FitService) -> (u16, Value) {
    if *method != Method::Get {
        return (405, json!({ "error": "method_not_allowed" }));
    }

    match parse_route(url) {
        Route::Health => (200, json!({ "status": "ok" })),
        Route::Share { token } => match token.as_deref().and_then(decoded_view) {
            Some(view) => match serde_json::to_value(view) {
                Ok(body) => (200, body),
                Err(error) => internal_error(&error),
            },
            None => not_found(),
        },
        Route::Public(id) if is_public_id(&id) => {
            match service.get_assessment_by_public_id(&id).await {
                Ok(Some(shared)) => match serde_json::to_value(shared) {
                    Ok(body) => (200, body),
                    Err(error) => internal_error(&error),
                },
                Ok(None) => not_found(),
                Err(error) => internal_error(&error),
            }
        }
        Route::Public(_) | Route::NotFound => not_found(),
    }
}

fn internal_error(error: &dyn std::fmt::Display) -> (u16, Value) {
    tracing::error!(%error, "request failed");
    (500, json!({ "error": "internal" }))
}

fn reply(request: Request, status: u16, body: &Value) {
    let mut response = Response::from_string(body.to_string()).with_status_code(status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response.add_header(header);
    }
    if let Err(error) = request.respond(response) {
        tracing::warn!(%error, "failed to send response");
    }
}
