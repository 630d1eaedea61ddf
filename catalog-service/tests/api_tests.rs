mod common;

use common::TestApp;
use reqwest::header;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

#[tokio::test]
async fn test_register_login_and_browse_scenario() {
    let app = TestApp::spawn().await;

    let response = app.register("alice", "pw123").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], "alice");

    let response = app.login("alice", "pw123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(app.jwt_handler.verify(&token), Ok("alice".to_string()));

    let author_id = app.create_author(&token, "Frank", "Herbert").await;
    app.create_book(
        &token,
        json!({
            "title": "Dune",
            "author_id": author_id,
            "genre": "Science Fiction",
            "publish_year": 1965,
            "available_copies": 4
        }),
    )
    .await;

    let response = app
        .get_authenticated("/books", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let books: Value = response.json().await.expect("Failed to parse response");
    let books = books.as_array().expect("expected a JSON array");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "Dune");
    assert_eq!(books[0]["author"], "Frank Herbert");
    assert_eq!(books[0]["publish_year"], 1965);

    let response = app
        .get_authenticated("/books?format=xml", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/xml"
    );
    let xml = response.text().await.unwrap();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<books><item><book_id>1</book_id><title>Dune</title>"));
    assert_eq!(xml.matches("<item>").count(), 1);

    let response = app.login("alice", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .stateless_client()
        .get(app.url("/books"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = TestApp::spawn().await;

    app.register("nicola", "pass_word!").await;
    let response = app.register("nicola", "other_pass").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_concurrent_duplicate_registration_has_one_winner() {
    let app = TestApp::spawn().await;

    let (first, second) = tokio::join!(
        app.register("racer", "pass_word!"),
        app.register("racer", "pass_word?")
    );

    let mut statuses = vec![first.status(), second.status()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn test_register_missing_fields() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/register")
        .json(&json!({ "username": "alice" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post("/register")
        .json(&json!({ "password": "pw123" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].as_str().unwrap().contains("Username is required"));
}

#[tokio::test]
async fn test_register_invalid_username() {
    let app = TestApp::spawn().await;

    let response = app.register("n", "pass_word").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("minimum 3 characters"));
}

#[tokio::test]
async fn test_login_unknown_user_matches_wrong_password() {
    let app = TestApp::spawn().await;
    app.register("alice", "pw123").await;

    let wrong_password = app.login("alice", "nope").await;
    let unknown_user = app.login("mallory", "pw123").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let wrong_password: Value = wrong_password.json().await.unwrap();
    let unknown_user: Value = unknown_user.json().await.unwrap();
    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn test_session_cookie_authenticates_without_header() {
    let app = TestApp::spawn().await;
    app.register("alice", "pw123").await;

    let response = app.login("alice", "pw123").await;
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set the session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("session_token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=7200"));

    // The cookie store now carries the session; no Authorization header is sent.
    let response = app
        .get("/books")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_bearer_header_takes_priority_over_session() {
    let app = TestApp::spawn().await;
    app.register("alice", "pw123").await;
    app.login("alice", "pw123").await;

    // A valid session cookie does not rescue an invalid bearer token.
    let response = app
        .get("/books")
        .bearer_auth("not.a.token")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rejected_tokens_share_one_response() {
    let app = TestApp::spawn().await;
    let token = app.authenticated_user("alice").await;

    let foreign = auth::JwtHandler::new(b"another-secret-key-that-is-also-32-bytes-long")
        .issue("alice")
        .unwrap();

    let mut tampered = token.clone().into_bytes();
    let payload_start = token.find('.').unwrap() + 1;
    tampered[payload_start + 2] = if tampered[payload_start + 2] == b'A' {
        b'B'
    } else {
        b'A'
    };
    let tampered = String::from_utf8(tampered).unwrap();

    let expired = app
        .jwt_handler
        .issue_at("alice", chrono::Utc::now() - chrono::Duration::hours(3))
        .unwrap();

    let mut bodies = Vec::new();
    for candidate in [foreign, tampered, expired, "garbage".to_string()] {
        let response = app
            .get_authenticated("/books", &candidate)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        bodies.push(response.json::<Value>().await.unwrap());
    }

    assert!(bodies.iter().all(|body| body == &bodies[0]));
    assert_eq!(bodies[0]["error"], "Invalid or missing token");
}

#[tokio::test]
async fn test_accept_header_negotiates_xml() {
    let app = TestApp::spawn().await;
    let token = app.authenticated_user("alice").await;
    app.create_author(&token, "Toni", "Morrison").await;

    let response = app
        .get_authenticated("/authors", &token)
        .header(header::ACCEPT, "application/xml")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/xml");
    let xml = response.text().await.unwrap();
    assert!(xml.contains(
        "<authors><item><author_id>1</author_id><first_name>Toni</first_name>\
         <last_name>Morrison</last_name></item></authors>"
    ));

    // The explicit override beats the header.
    let response = app
        .get_authenticated("/authors?format=json", &token)
        .header(header::ACCEPT, "application/xml")
        .send()
        .await
        .expect("Failed to execute request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body[0]["last_name"], "Morrison");
}

#[tokio::test]
async fn test_book_crud_lifecycle() {
    let app = TestApp::spawn().await;
    let token = app.authenticated_user("librarian").await;
    let author_id = app.create_author(&token, "Octavia", "Butler").await;

    let book_id = app
        .create_book(
            &token,
            json!({ "title": "Kindred", "author_id": author_id, "available_copies": 2 }),
        )
        .await;

    let response = app
        .get_authenticated(&format!("/books/{book_id}"), &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let book: Value = response.json().await.unwrap();
    assert_eq!(book["title"], "Kindred");
    assert_eq!(book["genre"], Value::Null);
    assert!(book["date_added"].is_string());

    let response = app
        .get_authenticated(&format!("/books/{book_id}?format=xml"), &token)
        .send()
        .await
        .expect("Failed to execute request");
    let xml = response.text().await.unwrap();
    assert_eq!(xml.matches("<item>").count(), 1);
    assert!(xml.contains("<genre/>"));

    let response = app
        .put_authenticated(&format!("/books/{book_id}"), &token)
        .json(&json!({ "genre": "Fiction", "available_copies": 0 }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let book: Value = app
        .get_authenticated(&format!("/books/{book_id}"), &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["genre"], "Fiction");
    assert_eq!(book["available_copies"], 0);
    assert_eq!(book["title"], "Kindred");

    let response = app
        .delete_authenticated(&format!("/books/{book_id}"), &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .get_authenticated(&format!("/books/{book_id}"), &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting again is not an error.
    let response = app
        .delete_authenticated(&format!("/books/{book_id}"), &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_book_validation_errors() {
    let app = TestApp::spawn().await;
    let token = app.authenticated_user("librarian").await;
    let author_id = app.create_author(&token, "Italo", "Calvino").await;

    let cases = [
        json!({ "author_id": author_id }),
        json!({ "title": "   ", "author_id": author_id }),
        json!({ "title": "Orphan", "author_id": 999 }),
        json!({ "title": "Negative", "author_id": author_id, "available_copies": -1 }),
        json!({ "title": "No author" }),
        json!({ "title": "Long genre", "author_id": author_id, "genre": "g".repeat(101) }),
    ];
    for case in cases {
        let response = app
            .post_authenticated("/books", &token)
            .json(&case)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {case}");
    }

    let book_id = app
        .create_book(&token, json!({ "title": "Invisible Cities", "author_id": author_id }))
        .await;

    let response = app
        .put_authenticated(&format!("/books/{book_id}"), &token)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .put_authenticated(&format!("/books/{book_id}"), &token)
        .json(&json!({ "genre": "g".repeat(101) }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].as_str().unwrap().contains("Genre too long"));

    let response = app
        .put_authenticated("/books/4242", &token)
        .json(&json!({ "publish_year": 1972 }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .get_authenticated("/books/not-a-number", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_title_and_genre() {
    let app = TestApp::spawn().await;
    let token = app.authenticated_user("reader").await;
    let author_id = app.create_author(&token, "Ursula", "Le Guin").await;
    for (title, genre) in [
        ("The Dispossessed", "Science Fiction"),
        ("A Wizard of Earthsea", "Fantasy"),
        ("The Lathe of Heaven", "science fiction"),
    ] {
        app.create_book(
            &token,
            json!({ "title": title, "author_id": author_id, "genre": genre }),
        )
        .await;
    }

    let response = app
        .get_authenticated("/search?q=FICTION", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let results: Value = response.json().await.unwrap();
    let titles: Vec<&str> = results
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["The Dispossessed", "The Lathe of Heaven"]);

    let response = app
        .get_authenticated("/search?q=wizard&format=xml", &token)
        .send()
        .await
        .expect("Failed to execute request");
    let xml = response.text().await.unwrap();
    assert_eq!(xml.matches("<item>").count(), 1);
    assert!(xml.contains("<title>A Wizard of Earthsea</title>"));
}

#[tokio::test]
async fn test_search_requires_term() {
    let app = TestApp::spawn().await;
    let token = app.authenticated_user("reader").await;

    for path in ["/search", "/search?q=", "/search?q=%20%20"] {
        let response = app
            .get_authenticated(path, &token)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "path: {path}");
        let body: Value = response.json().await.unwrap();
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("Search term must not be empty"));
    }
}
