//! Test helper utilities: in-process stubs for the ML inference service.

#![allow(dead_code)]

use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

/// Bind a stub inference service on an ephemeral port and serve it in the
/// background. Returns the base URL to inject into an `InferenceClient`.
pub async fn spawn_inference_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr = listener.local_addr().expect("Failed to read stub address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub server error");
    });

    format!("http://{addr}")
}

/// A stub that answers every `/analyze/{kind}` call with the given JSON
/// body and a healthy `/health`.
pub fn inference_stub(body: serde_json::Value) -> Router {
    Router::new()
        .route(
            "/analyze/{kind}",
            post(move |mut multipart: Multipart| {
                let body = body.clone();
                async move {
                    drain(&mut multipart).await;
                    Json(body)
                }
            }),
        )
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "healthy"})) }),
        )
}

/// A stub whose `/analyze/{kind}` fails with the given status and a
/// plain-text error detail, and whose `/health` reports unavailable.
pub fn failing_inference_stub(status: u16, detail: &'static str) -> Router {
    let status = StatusCode::from_u16(status).expect("valid status code");
    Router::new()
        .route(
            "/analyze/{kind}",
            post(move |mut multipart: Multipart| async move {
                drain(&mut multipart).await;
                (status, detail)
            }),
        )
        .route("/health", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
}

/// Reads the uploaded multipart body to completion so the client side
/// finishes streaming before the stub responds.
async fn drain(multipart: &mut Multipart) {
    while let Ok(Some(field)) = multipart.next_field().await {
        let _ = field.bytes().await;
    }
}

/// Canned `/analyze/image` payload: one car detection with a relative
/// cropped-image URL.
pub fn image_detection_body() -> serde_json::Value {
    serde_json::json!({
        "job_id": "1",
        "status": "completed",
        "detections": [{
            "object_id": "obj_0",
            "object_type": "car",
            "confidence": 0.92,
            "bounding_box": {"x": 0.0, "y": 0.0, "width": 10.0, "height": 10.0},
            "cropped_image_url": "/results/1_obj_0.jpg",
            "description": "A red car",
            "attributes": {"color": "red"}
        }],
        "counts": {"car": 1}
    })
}

/// Canned `/analyze/video` payload: two person detections sampled at
/// frames 0 and 30.
pub fn video_detection_body() -> serde_json::Value {
    serde_json::json!({
        "job_id": "2",
        "status": "completed",
        "detections": [
            {
                "object_id": "obj_0",
                "object_type": "person",
                "confidence": 0.81,
                "bounding_box": {"x": 5.0, "y": 5.0, "width": 20.0, "height": 40.0},
                "frame_number": 0
            },
            {
                "object_id": "obj_1",
                "object_type": "person",
                "confidence": 0.78,
                "bounding_box": {"x": 7.0, "y": 6.0, "width": 21.0, "height": 39.0},
                "frame_number": 30
            }
        ],
        "counts": {"person": 2},
        "total_frames": 300,
        "processed_frames": 10
    })
}
