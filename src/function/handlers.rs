use super::error::FunctionError;
use super::protocol::*;
use super::service::{FunctionOutcome, FunctionService};
use super::task::ExecutionHandle;
use super::types::{ExecutionMode, FunctionEvent};
use crate::cluster::local::LocalCluster;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json, http::StatusCode};
use futures_util::stream::{self, Stream};
use std::convert::Infallible;
use std::sync::Arc;

pub async fn handle_execute_function(
    Extension(service): Extension<Arc<FunctionService>>,
    Json(req): Json<ExecuteFunctionRequest>,
) -> Response {
    let prepared = match &req.region {
        Some(region) => service.prepare_on_region(region, &req.name, req.options.as_ref()),
        None => service.prepare(&req.name, req.options.as_ref()),
    };
    let prepared = match prepared {
        Ok(prepared) => prepared,
        Err(e) => return error_response(&e),
    };

    let outcome = match prepared.mode() {
        ExecutionMode::Streaming => service.run(prepared),
        // Synchronous mode blocks the calling thread, so keep it off the async workers
        ExecutionMode::Synchronous => {
            match tokio::task::spawn_blocking(move || service.run(prepared)).await {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    tracing::error!("Execute request worker failed: {}", join_error);
                    Err(FunctionError::Internal(join_error.to_string()))
                }
            }
        }
    };

    match outcome {
        Ok(FunctionOutcome::Value(result)) => (
            StatusCode::OK,
            Json(ExecuteFunctionResponse {
                result: Some(result),
                error: None,
            }),
        )
            .into_response(),
        Ok(FunctionOutcome::Stream(handle)) => {
            tracing::debug!("Streaming execution {} over SSE", handle.id());
            Sse::new(event_stream(handle))
                .keep_alive(KeepAlive::default())
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

pub async fn handle_list_functions(
    Extension(cluster): Extension<Arc<LocalCluster>>,
) -> (StatusCode, Json<ListFunctionsResponse>) {
    (
        StatusCode::OK,
        Json(ListFunctionsResponse {
            functions: cluster.list_functions(),
        }),
    )
}

fn error_response(error: &FunctionError) -> Response {
    let status = if error.is_pre_dispatch() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    tracing::debug!("Execute request rejected ({}): {}", status, error);

    (
        status,
        Json(ExecuteFunctionResponse {
            result: None,
            error: Some(error.to_error_value()),
        }),
    )
        .into_response()
}

fn event_stream(handle: ExecutionHandle) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(handle, |mut handle| async move {
        let event = handle.next_event().await?;
        Some((Ok(sse_event(&event)), handle))
    })
}

/// Maps one function event onto an SSE frame named after the event.
pub fn sse_event(event: &FunctionEvent) -> Event {
    match event {
        FunctionEvent::Data(value) => Event::default().event("data").data(value.to_string()),
        FunctionEvent::Error(error) => Event::default()
            .event("error")
            .data(serde_json::to_string(error).unwrap_or_else(|_| error.to_string())),
        FunctionEvent::End => Event::default().event("end").data(""),
    }
}
