//! HTTP surface of PMOFrame
//!
//! One route does the work: `GET /next` returns the picture currently served
//! by the flip cache. The handler performs no I/O — the cache absorbs all
//! Dropbox latency — so the route is infallible once the server is up.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use pmopicsource::Flipper;
use serde_json::json;
use std::net::SocketAddr;
use tokio::{signal, task::JoinHandle};
use tracing::{error, info};

/// HTTP server serving the rotating picture
pub struct Server {
    name: String,
    http_port: u16,
    router: Router,
    join_handle: Option<JoinHandle<()>>,
}

impl Server {
    /// Build the server and its routes around a primed flip cache
    pub fn new(name: impl Into<String>, http_port: u16, flipper: Flipper) -> Self {
        let name = name.into();

        let info_name = name.clone();
        let info_handler = move || {
            let name = info_name.clone();
            async move {
                axum::Json(json!({
                    "name": name,
                    "version": env!("CARGO_PKG_VERSION"),
                }))
            }
        };

        let router = Router::new()
            .route("/next", get(next_picture))
            .with_state(flipper)
            .route("/info", get(info_handler));

        Self {
            name,
            http_port,
            router,
            join_handle: None,
        }
    }

    /// The assembled router, for tests
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Start the HTTP server and arm Ctrl+C handling
    pub async fn start(&mut self) -> std::io::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Server {} listening on http://{}", self.name, addr);

        let router = self.router.clone();
        let server_task = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, router.into_make_service()).await {
                error!("HTTP server error: {err}");
            }
        });

        let shutdown_task = tokio::spawn(async move {
            signal::ctrl_c().await.expect("failed to listen for ctrl_c");
            info!("Ctrl+C reçu, arrêt gracieux");
        });

        self.join_handle = Some(tokio::spawn(async move {
            tokio::select! {
                _ = server_task => {},
                _ = shutdown_task => {},
            }
        }));

        Ok(())
    }

    /// Wait for the server to stop
    pub async fn wait(&mut self) {
        if let Some(h) = self.join_handle.take() {
            let _ = h.await;
        }
    }
}

/// One call per inbound request; the bytes come straight from the cache
async fn next_picture(State(flipper): State<Flipper>) -> impl IntoResponse {
    let picture = flipper.next();
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        picture,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use bytes::Bytes;
    use pmopicsource::{PictureSource, Result};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct StaticSource;

    #[async_trait]
    impl PictureSource for StaticSource {
        async fn next_picture(&self) -> Result<Bytes> {
            Ok(Bytes::from_static(b"jpeg-bytes"))
        }
    }

    async fn test_server() -> Server {
        let flipper = Flipper::new(Arc::new(StaticSource), Duration::from_secs(9))
            .await
            .unwrap();
        Server::new("PMOFrame-test", 0, flipper)
    }

    #[tokio::test]
    async fn test_next_route_serves_the_current_picture() {
        let server = test_server().await;

        let response = server
            .router()
            .oneshot(Request::builder().uri("/next").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/octet-stream"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"jpeg-bytes");
    }

    #[tokio::test]
    async fn test_info_route_reports_name_and_version() {
        let server = test_server().await;

        let response = server
            .router()
            .oneshot(Request::builder().uri("/info").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let info: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(info["name"], "PMOFrame-test");
        assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
    }
}
