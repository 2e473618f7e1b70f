#![allow(dead_code)]

use component_catalog::api::{self, AppState};
use component_catalog::storage::ComponentStorage;
use component_catalog::user_storage::UserStorage;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    format!("http://{}", addr)
}

pub async fn spawn_app(state: Arc<AppState>) -> String {
    serve(api::router(state)).await
}

/// A fresh catalog holding only the sample components.
pub async fn spawn_seeded() -> String {
    spawn_app(AppState::new(ComponentStorage::with_samples(), UserStorage::new())).await
}
