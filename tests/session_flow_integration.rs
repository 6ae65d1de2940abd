mod common;

use common::{build_app, test_config};
use mockito::Matcher;
use serde_json::json;
use sessiontron::models::{Credentials, Session};
use sessiontron::navigation::Route;
use sessiontron::shell::{execute, Command};
use sessiontron::signal::SignalBus;
use sessiontron::startup::App;

#[tokio::test]
async fn test_startup_without_refresh_cookie_lands_on_login() {
    let mut server = mockito::Server::new_async().await;
    let refresh = server
        .mock("GET", "/refresh")
        .with_status(403)
        .expect(1)
        .create_async()
        .await;

    let bus = SignalBus::new();
    let app = App::build(test_config(&server.url(), true), &bus).unwrap();
    let location = app.start("/").await;

    refresh.assert_async().await;
    assert_eq!(location.route, Route::CustomerLogin);
    assert_eq!(app.store().session(), Session::anonymous());
    // A failed startup refresh is not a logout: nothing is signalled.
    assert_eq!(bus.get_item("logout"), None);
    assert_eq!(app.router().history().len(), 1);
}

#[tokio::test]
async fn test_startup_refresh_restores_session() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/refresh")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"accessToken":"restoredToken"}"#)
        .create_async()
        .await;

    let bus = SignalBus::new();
    let app = App::build(test_config(&server.url(), true), &bus).unwrap();
    let location = app.start("/").await;

    assert_eq!(location.route, Route::Dashboard);
    assert!(app.store().session().is_logged_in);
    assert_eq!(app.session().access_token().as_deref(), Some("restoredToken"));
}

#[tokio::test]
async fn test_login_then_dashboard_then_logout() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth")
        .match_body(Matcher::Json(json!({"user": "tester", "pwd": "12345"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"accessToken":"testToken"}"#)
        .create_async()
        .await;

    let bus = SignalBus::new();
    let app = build_app(&server.url(), &bus);

    let output = execute(&app, &Command::Open { path: "/".into() }).await;
    assert!(output.contains("CustomerLogin"));

    let login = Command::Login {
        username: "tester".into(),
        password: "12345".into(),
    };
    let output = execute(&app, &login).await;
    assert!(output.contains("signed in as tester"));
    assert_eq!(app.router().current_route(), Some(Route::Dashboard));
    assert_eq!(
        app.store().session(),
        Session::authenticated("tester", "testToken")
    );

    execute(&app, &Command::Logout).await;
    assert_eq!(app.router().current_route(), Some(Route::CustomerLogin));
    assert_eq!(app.store().session(), Session::anonymous());
    assert_eq!(bus.get_item("logout"), None);
}

#[tokio::test]
async fn test_refresh_cookie_from_login_is_sent_on_refresh() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("set-cookie", "refreshToken=cookieValue; Path=/; HttpOnly")
        .with_body(r#"{"accessToken":"testToken"}"#)
        .create_async()
        .await;
    let refresh = server
        .mock("GET", "/refresh")
        .match_header("cookie", Matcher::Regex("refreshToken=cookieValue".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"accessToken":"newToken"}"#)
        .expect(1)
        .create_async()
        .await;

    let bus = SignalBus::new();
    let app = build_app(&server.url(), &bus);

    assert!(app.store().login(&Credentials::new("tester", "12345")).await);
    assert!(app.store().refresh_token().await);

    refresh.assert_async().await;
    assert_eq!(app.store().session(), Session::authenticated("tester", "newToken"));
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_retried() {
    let mut server = mockito::Server::new_async().await;
    let expired = server
        .mock("GET", "/employees")
        .match_header("authorization", "Bearer testToken")
        .with_status(403)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("GET", "/refresh")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"accessToken":"newToken"}"#)
        .expect(1)
        .create_async()
        .await;
    let retried = server
        .mock("GET", "/employees")
        .match_header("authorization", "Bearer newToken")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id":7,"firstname":"Grace","lastname":"Hopper"}]"#)
        .expect(1)
        .create_async()
        .await;

    let bus = SignalBus::new();
    let app = build_app(&server.url(), &bus);
    app.session().sign_in("tester", "testToken");
    app.router().navigate("/");

    let output = execute(&app, &Command::Employees).await;

    expired.assert_async().await;
    refresh.assert_async().await;
    retried.assert_async().await;
    assert!(output.contains("Grace Hopper"), "{}", output);
    assert_eq!(app.router().current_route(), Some(Route::Dashboard));
    assert_eq!(app.store().session(), Session::authenticated("tester", "newToken"));
}

#[tokio::test]
async fn test_failed_refresh_forces_logout() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/employees")
        .with_status(403)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/refresh")
        .with_status(403)
        .expect(1)
        .create_async()
        .await;

    let bus = SignalBus::new();
    let app = build_app(&server.url(), &bus);
    app.session().sign_in("tester", "testToken");
    app.router().navigate("/");

    assert_eq!(app.store().get_employees().await, None);

    assert_eq!(app.store().session(), Session::anonymous());
    assert_eq!(app.router().current_route(), Some(Route::CustomerLogin));
}

#[tokio::test]
async fn test_unrelated_failure_still_ends_session() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/employees")
        .with_status(500)
        .create_async()
        .await;
    let refresh = server
        .mock("GET", "/refresh")
        .expect(0)
        .create_async()
        .await;

    let bus = SignalBus::new();
    let app = build_app(&server.url(), &bus);
    app.session().sign_in("tester", "testToken");

    assert_eq!(app.store().get_employees().await, None);

    refresh.assert_async().await;
    assert_eq!(app.store().session(), Session::anonymous());
    assert_eq!(app.router().current_route(), Some(Route::CustomerLogin));
}
