//! HTTP surface for a browser renderer: chat over JSON, page state and
//! session activity over SSE.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::{BroadcastStream, WatchStream};
use tracing::{error, info, warn};

use crate::contact::ContactMessage;
use crate::portfolio::Portfolio;
use crate::protocol::{ErrorBody, SendMessageRequest, SendMessageResponse, StateSnapshot};
use crate::session::{Message, SessionError};
use crate::tools::{ToolDefinition, list_tools};

pub struct ServerConfig {
    pub listen: String,
}

type ServerResult<T> = Result<T, Box<dyn Error + Send + Sync>>;
type AppState = Arc<Portfolio>;

pub async fn run(portfolio: Portfolio, config: ServerConfig) -> ServerResult<()> {
    let app = router(Arc::new(portfolio));

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!(listen = %config.listen, "Portfolio server listening");
    println!("portfolio server listening on http://{}", config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/tools", get(get_tools))
        .route("/messages", get(get_messages).post(send_message))
        .route("/state", get(get_state))
        .route("/state/stream", get(stream_state))
        .route("/events", get(stream_events))
        .route("/overlay/close", post(close_overlay))
        .route("/outbox", get(get_outbox))
        .with_state(state)
}

async fn get_tools() -> Json<&'static [ToolDefinition]> {
    Json(list_tools())
}

async fn get_messages(State(state): State<AppState>) -> Json<Vec<Message>> {
    Json(state.session().messages())
}

async fn send_message(
    State(state): State<AppState>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, (StatusCode, Json<ErrorBody>)> {
    // The exchange outlives the request if the client goes away.
    let session = Arc::clone(state.session());
    let exchange =
        tokio::spawn(async move { session.send_user_message(&payload.content).await });

    match exchange.await {
        Ok(Ok(reply)) => Ok(Json(SendMessageResponse { reply })),
        Ok(Err(e)) => {
            warn!(error = %e, "Rejected message");
            Err(error_response(&e))
        }
        Err(e) => {
            error!(error = %e, "Exchange task failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "exchange failed".to_string(),
                }),
            ))
        }
    }
}

fn error_response(error: &SessionError) -> (StatusCode, Json<ErrorBody>) {
    let status = match error {
        SessionError::Busy => StatusCode::CONFLICT,
        SessionError::EmptyMessage => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
        }),
    )
}

async fn get_outbox(State(state): State<AppState>) -> Json<Vec<ContactMessage>> {
    Json(state.outbox())
}

async fn get_state(State(state): State<AppState>) -> Json<StateSnapshot> {
    Json(state.store().get_state().into())
}

async fn close_overlay(State(state): State<AppState>) -> StatusCode {
    if state.store().close_overlay() {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn stream_state(State(state): State<AppState>) -> impl IntoResponse {
    let stream = WatchStream::new(state.store().subscribe())
        .map(|ui| json_event(&StateSnapshot::from(ui)));
    sse(stream)
}

async fn stream_events(State(state): State<AppState>) -> impl IntoResponse {
    // Lagged receivers skip what they missed.
    let stream = BroadcastStream::new(state.session().subscribe())
        .filter_map(|item| async move { item.ok().map(|event| json_event(&event)) });
    sse(stream)
}

fn json_event(value: &impl serde::Serialize) -> Result<Event, Infallible> {
    let data = serde_json::to_string(value).unwrap_or_default();
    Ok(Event::default().data(data))
}

fn sse(
    stream: impl Stream<Item = Result<Event, Infallible>> + Send + 'static,
) -> impl IntoResponse {
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
