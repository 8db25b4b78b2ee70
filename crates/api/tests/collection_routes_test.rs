/// HTTP tests for the Synchronization API routes against the in-memory repository
use actix_web::{
    http::{header, StatusCode},
    test,
    web::Data,
    App,
};
use cinehub_api::{configure, AppState, InMemoryCollectionRepository, JwtVerifier};
use serde_json::{json, Value};
use std::sync::Arc;

const SECRET: &[u8] = b"routes-test-secret-with-32-bytes-min";

fn token(owner: &str) -> String {
    JwtVerifier::new(SECRET, None).issue(owner).unwrap()
}

fn bearer(owner: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token(owner)))
}

macro_rules! app {
    () => {
        test::init_service(App::new().configure(configure(
            Data::new(AppState::new(Arc::new(InMemoryCollectionRepository::new()))),
            Data::new(JwtVerifier::new(SECRET, None)),
        )))
        .await
    };
}

fn movie(id: i64) -> Value {
    json!({
        "id": id,
        "mediaType": "movie",
        "title": format!("Movie {}", id),
        "posterPath": "/poster.jpg"
    })
}

#[actix_web::test]
async fn test_requires_bearer_token() {
    let app = app!();

    let req = test::TestRequest::get().uri("/api/v1/watchlist").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/favorite-actors")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let forged = JwtVerifier::new(b"some-other-secret-that-is-32-bytes-long", None)
        .issue("alice")
        .unwrap();
    let req = test::TestRequest::get()
        .uri("/api/v1/favorites")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", forged)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_watchlist_add_list_remove() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/watchlist")
        .insert_header(bearer("alice"))
        .set_json(movie(5))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["item"]["id"], 5);
    assert_eq!(body["item"]["mediaType"], "movie");
    assert!(body["item"]["addedAt"].is_string());

    let req = test::TestRequest::get()
        .uri("/api/v1/watchlist")
        .insert_header(bearer("alice"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::delete()
        .uri("/api/v1/watchlist/movie/5")
        .insert_header(bearer("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri("/api/v1/watchlist/movie/5")
        .insert_header(bearer("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_duplicate_add_conflicts() {
    let app = app!();

    for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
        let req = test::TestRequest::post()
            .uri("/api/v1/favorites")
            .insert_header(bearer("alice"))
            .set_json(movie(9))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }
}

#[actix_web::test]
async fn test_invalid_bodies_rejected() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/watchlist")
        .insert_header(bearer("alice"))
        .set_json(json!({ "id": 0, "mediaType": "movie", "title": "Zero" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/watchlist")
        .insert_header(bearer("alice"))
        .set_json(json!({ "id": 3, "mediaType": "podcast", "title": "Nope" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");

    let req = test::TestRequest::delete()
        .uri("/api/v1/watchlist/podcast/3")
        .insert_header(bearer("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_collections_are_scoped_by_owner() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/watchlist")
        .insert_header(bearer("alice"))
        .set_json(movie(1))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/watchlist")
        .insert_header(bearer("bob"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["items"].as_array().unwrap().is_empty());

    let req = test::TestRequest::delete()
        .uri("/api/v1/watchlist/movie/1")
        .insert_header(bearer("bob"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_favorite_actor_routes() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/favorite-actors")
        .insert_header(bearer("alice"))
        .set_json(json!({ "actor_id": 287, "name": "Brad Pitt", "profile_path": null }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["item"]["actor_id"], 287);
    assert!(body["item"]["id"].is_string());

    let req = test::TestRequest::get()
        .uri("/api/v1/favorite-actors")
        .insert_header(bearer("alice"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["items"][0]["name"], "Brad Pitt");

    let req = test::TestRequest::delete()
        .uri("/api/v1/favorite-actors/287")
        .insert_header(bearer("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri("/api/v1/favorite-actors/287")
        .insert_header(bearer("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_unknown_collection_is_not_found() {
    let app = app!();

    let req = test::TestRequest::get()
        .uri("/api/v1/ratings")
        .insert_header(bearer("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_watch_history_routes() {
    let app = app!();

    for (id, position) in [(5, 120), (6, 0), (5, 900)] {
        let req = test::TestRequest::post()
            .uri("/api/v1/history")
            .insert_header(bearer("alice"))
            .set_json(json!({
                "id": id,
                "mediaType": "movie",
                "title": format!("Movie {}", id),
                "resumePositionSeconds": position
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/history")
        .insert_header(bearer("alice"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], 5);
    assert_eq!(items[0]["resumePositionSeconds"], 900);

    let req = test::TestRequest::get()
        .uri("/api/v1/history")
        .insert_header(bearer("bob"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["items"].as_array().unwrap().is_empty());

    let req = test::TestRequest::delete()
        .uri("/api/v1/history/movie/6")
        .insert_header(bearer("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri("/api/v1/history")
        .insert_header(bearer("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri("/api/v1/history/movie/5")
        .insert_header(bearer("alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_watch_history_rejects_negative_position() {
    let app = app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/history")
        .insert_header(bearer("alice"))
        .set_json(json!({
            "id": 5,
            "mediaType": "movie",
            "title": "Heat",
            "resumePositionSeconds": -10
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/api/v1/history").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
