//! Integration tests for the nearest-segment query.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_json, BROKEN_VIDEO, SAMPLE_VIDEO, SHORT_VIDEO};
use serde_json::{json, Value};

fn uris(json: &Value) -> Vec<&str> {
    json["segments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["uri"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn returns_four_nearest_sorted_by_start() {
    let test = common::build_test_app().await;
    let id = test.video_id(SHORT_VIDEO).await;

    let response = post_json(
        test.app(),
        "/api/segments/closest",
        json!({ "videoId": id, "timestamp": 5.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(uris(&json), vec!["c1.ts", "c2.ts", "c3.ts", "c4.ts"]);

    let starts: Vec<f64> = json["segments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["start"].as_f64().unwrap())
        .collect();
    assert_eq!(starts, vec![2.0, 4.0, 6.0, 8.0]);
}

#[tokio::test]
async fn segment_fields_carry_reconstructed_timing() {
    let test = common::build_test_app().await;
    let id = test.video_id(SAMPLE_VIDEO).await;

    let response = post_json(
        test.app(),
        "/api/segments/closest",
        json!({ "videoId": id, "timestamp": 8.0, "count": 1 }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(
        json["segments"][0],
        json!({ "uri": "seg2.ts", "start": 8.0, "end": 12.0, "duration": 4.0 })
    );
}

#[tokio::test]
async fn count_larger_than_playlist_returns_everything() {
    let test = common::build_test_app().await;
    let id = test.video_id(SAMPLE_VIDEO).await;

    let response = post_json(
        test.app(),
        "/api/segments/closest",
        json!({ "videoId": id, "timestamp": 100.0, "count": 10 }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(uris(&json), vec!["seg0.ts", "seg1.ts", "seg2.ts"]);
}

#[tokio::test]
async fn out_of_range_count_is_rejected() {
    let test = common::build_test_app().await;
    let id = test.video_id(SAMPLE_VIDEO).await;

    for count in [0, 21] {
        let response = post_json(
            test.app(),
            "/api/segments/closest",
            json!({ "videoId": id, "timestamp": 1.0, "count": count }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "count {count}");
    }
}

#[tokio::test]
async fn missing_timestamp_is_a_validation_error() {
    let test = common::build_test_app().await;
    let id = test.video_id(SAMPLE_VIDEO).await;

    let response = post_json(test.app(), "/api/segments/closest", json!({ "videoId": id })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn unknown_video_returns_404() {
    let test = common::build_test_app().await;
    let response = post_json(
        test.app(),
        "/api/segments/closest",
        json!({ "videoId": 999999, "timestamp": 1.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn corrupt_playlist_returns_parse_error() {
    let test = common::build_test_app().await;
    let id = test.video_id(BROKEN_VIDEO).await;
    let response = post_json(
        test.app(),
        "/api/segments/closest",
        json!({ "videoId": id, "timestamp": 1.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
