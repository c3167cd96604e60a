mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{send, test_app};

#[tokio::test]
async fn planet_favorite_lifecycle() {
    let (app, _db) = test_app().await;

    let (status, body) = send(&app, Method::POST, "/favorite/planet/5?user_id=1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "planet_id": 5, "planet_name": "Hoth" }));

    let (status, body) = send(&app, Method::POST, "/favorite/planet/5?user_id=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Favorite already exists!");
    assert_eq!(body["code"], "conflict");

    let (status, body) = send(&app, Method::DELETE, "/favorite/planet/5?user_id=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Favorite deleted!" }));

    let (status, body) = send(&app, Method::DELETE, "/favorite/planet/5?user_id=1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Favorite not found!");
}

#[tokio::test]
async fn people_favorite_lifecycle() {
    let (app, _db) = test_app().await;

    let (status, body) = send(&app, Method::POST, "/favorite/people/2?user_id=1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "people_id": 2, "people_name": "Yoda" }));

    let (status, _) = send(&app, Method::POST, "/favorite/people/2?user_id=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, "/favorite/people/2?user_id=1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::DELETE, "/favorite/people/2?user_id=1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn added_favorite_is_listed_exactly_once() {
    let (app, _db) = test_app().await;

    send(&app, Method::POST, "/favorite/planet/6?user_id=1").await;
    send(&app, Method::POST, "/favorite/planet/6?user_id=1").await;
    send(&app, Method::POST, "/favorite/people/1?user_id=1").await;

    let (status, body) = send(&app, Method::GET, "/users/favorites?user_id=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "favorites_planets": [{ "planet_id": 6, "planet_name": "Dagobah" }],
            "favorites_people": [{ "people_id": 1, "people_name": "Luke Skywalker" }],
        })
    );
}

#[tokio::test]
async fn favorites_do_not_leak_across_users() {
    let (app, _db) = test_app().await;

    send(&app, Method::POST, "/favorite/planet/5?user_id=1").await;
    send(&app, Method::POST, "/favorite/planet/6?user_id=2").await;
    send(&app, Method::POST, "/favorite/people/2?user_id=2").await;

    let (_, body) = send(&app, Method::GET, "/users/favorites?user_id=1").await;
    assert_eq!(body["favorites_planets"], json!([{ "planet_id": 5, "planet_name": "Hoth" }]));
    assert_eq!(body["favorites_people"], json!([]));

    let (_, body) = send(&app, Method::GET, "/users/favorites?user_id=2").await;
    assert_eq!(body["favorites_planets"], json!([{ "planet_id": 6, "planet_name": "Dagobah" }]));
    assert_eq!(body["favorites_people"], json!([{ "people_id": 2, "people_name": "Yoda" }]));

    // Removing user 2's favorite leaves user 1 untouched
    let (status, _) = send(&app, Method::DELETE, "/favorite/planet/5?user_id=2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_without_favorites_gets_empty_lists() {
    let (app, _db) = test_app().await;

    let (status, body) = send(&app, Method::GET, "/users/favorites?user_id=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "favorites_planets": [], "favorites_people": [] }));
}

#[tokio::test]
async fn missing_user_id_is_rejected_everywhere() {
    let (app, _db) = test_app().await;

    let requests = [
        (Method::GET, "/users/favorites"),
        (Method::GET, "/users/favorites?user_id="),
        (Method::POST, "/favorite/planet/5"),
        (Method::POST, "/favorite/people/1?user_id=%20"),
        (Method::DELETE, "/favorite/planet/5"),
        (Method::DELETE, "/favorite/people/1?other=1"),
    ];

    for (method, uri) in requests {
        let (status, body) = send(&app, method.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(body["error"], "User ID is required!", "{method} {uri}");
        assert_eq!(body["code"], "missing_parameter");
    }
}

#[tokio::test]
async fn non_numeric_user_id_is_rejected() {
    let (app, _db) = test_app().await;

    let (status, body) = send(&app, Method::POST, "/favorite/planet/5?user_id=luke").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User ID must be an integer");
}

#[tokio::test]
async fn favorite_for_unknown_item_is_a_client_error() {
    let (app, _db) = test_app().await;

    let (status, body) = send(&app, Method::POST, "/favorite/planet/404?user_id=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Referenced resource does not exist");

    let (status, _) = send(&app, Method::POST, "/favorite/people/1?user_id=999").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_catalog_kind_is_not_found() {
    let (app, _db) = test_app().await;

    let (status, body) = send(&app, Method::POST, "/favorite/starship/1?user_id=1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn favorite_of_deleted_planet_lists_null_name() {
    let (app, db) = test_app().await;

    send(&app, Method::POST, "/favorite/planet/6?user_id=1").await;

    sqlx::query("PRAGMA foreign_keys = OFF").execute(&db).await.unwrap();
    sqlx::query("DELETE FROM planets WHERE id = 6").execute(&db).await.unwrap();
    sqlx::query("PRAGMA foreign_keys = ON").execute(&db).await.unwrap();

    let (status, body) = send(&app, Method::GET, "/users/favorites?user_id=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["favorites_planets"],
        json!([{ "planet_id": 6, "planet_name": null }])
    );
}

#[tokio::test]
async fn unparseable_item_id_is_a_not_found_envelope() {
    let (app, _db) = test_app().await;

    for method in [Method::POST, Method::DELETE] {
        let (status, body) = send(&app, method.clone(), "/favorite/planet/abc?user_id=1").await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(body["code"], "not_found", "{method}");
    }
}

#[tokio::test]
async fn repeated_user_id_uses_the_first_value() {
    let (app, _db) = test_app().await;

    send(&app, Method::POST, "/favorite/planet/5?user_id=1").await;

    let (status, body) = send(&app, Method::GET, "/users/favorites?user_id=1&user_id=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["favorites_planets"], json!([{ "planet_id": 5, "planet_name": "Hoth" }]));

    let (status, body) = send(&app, Method::GET, "/users/favorites?user_id=2&user_id=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["favorites_planets"], json!([]));
}
