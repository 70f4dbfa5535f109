use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use dermwoe_core::logic::explain::fixtures::{demo_model, demo_png_bytes};

use super::{create_router, AppState};
use crate::config::Config;
use crate::error::INVALID_FILE_FORMAT;

const BOUNDARY: &str = "dermwoe-test-boundary";

enum Part<'a> {
    Text(&'a str, &'a str),
    File { content_type: &'a str, data: &'a [u8] },
}

fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", name, value).as_bytes(),
                );
            }
            Part::File { content_type, data } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"lesion\"\r\nContent-Type: {}\r\n\r\n",
                        content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn app() -> Router {
    create_router(AppState {
        model: Arc::new(demo_model()),
        config: Config::default(),
    })
}

async fn post_predict(uri: &str, parts: &[Part<'_>]) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_predict_png() {
    let png = demo_png_bytes();
    let (status, json) = post_predict(
        "/predict/",
        &[
            Part::File { content_type: "image/png", data: &png },
            Part::Text("container_width", "224"),
            Part::Text("container_height", "224"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["recommendation"], "Melanoma");

    let hypotheses = json["hypotheses"].as_array().unwrap();
    assert_eq!(hypotheses.len(), 7);
    assert_eq!(hypotheses[4]["hypothesis_name"], "Melanoma (MEL)");
    assert_eq!(hypotheses[4]["probability"], 0.96);

    let features = json["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["area_coordinates"]["width"], 224.0);
    assert_eq!(features[1]["area_coordinates"]["width"], 64.0);
}

#[tokio::test]
async fn test_predict_without_trailing_slash() {
    let png = demo_png_bytes();
    let (status, json) = post_predict(
        "/predict",
        &[
            Part::Text("container_width", "512"),
            Part::Text("container_height", "512"),
            Part::File { content_type: "image/png", data: &png },
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["features"][0]["area_coordinates"]["height"], 512.0);
}

#[tokio::test]
async fn test_rejects_non_image_upload() {
    let (status, json) = post_predict(
        "/predict/",
        &[
            Part::File { content_type: "text/plain", data: b"hello" },
            Part::Text("container_width", "224"),
            Part::Text("container_height", "224"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], INVALID_FILE_FORMAT);
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_rejects_undecodable_image() {
    let (status, json) = post_predict(
        "/predict/",
        &[
            Part::File { content_type: "image/png", data: b"definitely not a png" },
            Part::Text("container_width", "224"),
            Part::Text("container_height", "224"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("could not decode image"));
}

#[tokio::test]
async fn test_missing_container_width() {
    let png = demo_png_bytes();
    let (status, json) = post_predict(
        "/predict/",
        &[
            Part::File { content_type: "image/png", data: &png },
            Part::Text("container_height", "224"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "field required: container_width");
}

#[tokio::test]
async fn test_missing_file() {
    let (status, _) = post_predict(
        "/predict/",
        &[
            Part::Text("container_width", "224"),
            Part::Text("container_height", "224"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_invalid_dimensions() {
    let png = demo_png_bytes();
    for width in ["0", "-10", "abc"] {
        let (status, _) = post_predict(
            "/predict/",
            &[
                Part::File { content_type: "image/png", data: &png },
                Part::Text("container_width", width),
                Part::Text("container_height", "224"),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "width {}", width);
    }
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["model"]["model_loaded"], true);
    assert_eq!(json["model"]["backbone"], "fixed");
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://localhost:4200")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:4200"
    );
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}
