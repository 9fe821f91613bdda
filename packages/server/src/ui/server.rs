//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{EventRouter, GetSessionDetailUseCase, GetSessionsUseCase};

use super::{
    handler::{get_session_detail, get_sessions, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Chess match server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(event_router, get_sessions_usecase, get_session_detail_usecase);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// EventRouter（WebSocket イベントの振り分け）
    event_router: Arc<EventRouter>,
    /// GetSessionsUseCase（セッション一覧取得のユースケース）
    get_sessions_usecase: Arc<GetSessionsUseCase>,
    /// GetSessionDetailUseCase（セッション詳細取得のユースケース）
    get_session_detail_usecase: Arc<GetSessionDetailUseCase>,
}

impl Server {
    pub fn new(
        event_router: Arc<EventRouter>,
        get_sessions_usecase: Arc<GetSessionsUseCase>,
        get_session_detail_usecase: Arc<GetSessionDetailUseCase>,
    ) -> Self {
        Self {
            event_router,
            get_sessions_usecase,
            get_session_detail_usecase,
        }
    }

    /// Build the axum router with all endpoints
    pub fn into_router(self) -> Router {
        let app_state = Arc::new(AppState {
            event_router: self.event_router,
            get_sessions_usecase: self.get_sessions_usecase,
            get_session_detail_usecase: self.get_session_detail_usecase,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/sessions", get(get_sessions))
            .route("/api/sessions/{session_key}", get(get_session_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Run the match server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chess match server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
