//! End-to-end tests of the command pipeline against a local HTTP server.
//!
//! Each test installs a service into a temporary home, runs one or more
//! invocations through `commands::execute`, and checks what reached the
//! server, what was printed, and what was recorded in history.

use super::{env, install_autoscale};
use mockito::Matcher;
use restcli::body::AddressError;
use restcli::commands::{execute, CommandError, CommandOptions};
use restcli::executor::RequestError;
use restcli::history::format_history_entry;
use restcli::services::Home;
use serde_json::json;
use std::collections::HashMap;

async fn run(
    options: &CommandOptions,
    home: &Home,
    vars: &HashMap<String, String>,
) -> (Result<(), CommandError>, String) {
    let mut out = Vec::new();
    let result = execute(options, home, |name| vars.get(name).cloned(), &mut out).await;
    (result, String::from_utf8(out).expect("output is UTF-8"))
}

fn service_vars(server: &mockito::Server) -> HashMap<String, String> {
    let prefix = format!("{}/v1.0/123/", server.url());
    env(&[("AS_URI_PREFIX", prefix.as_str()), ("RS_AUTH_TOKEN", "tok")])
}

fn autoscale(resource: &str) -> CommandOptions {
    CommandOptions {
        service: Some("autoscale".to_string()),
        resource: Some(resource.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_template_with_aliases_is_sent_and_recorded() {
    let (_temp_dir, home) = install_autoscale();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1.0/123/groups")
        .match_header("x-auth-token", "tok")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "groupConfiguration": {"name": "prod", "cooldown": 60, "minEntities": 2},
            "launchConfiguration": {
                "type": "launch_server",
                "args": {"server": {"name": "api", "flavorRef": "2"}}
            },
            "scalingPolicies": [{"name": "Scale up", "change": 1, "cooldown": 30}]
        })))
        .with_status(201)
        .with_body(r#"{"group":{"id":"abc"}}"#)
        .create_async()
        .await;

    let mut options = autoscale("groups");
    options.method = Some("post".to_string());
    options.template = Some("default".to_string());
    options.replacements = vec![
        "name=prod".to_string(),
        "min=2".to_string(),
        "server=api".to_string(),
        "scalingPolicies[0].cooldown=30".to_string(),
    ];

    let (result, printed) = run(&options, &home, &service_vars(&server)).await;
    result.unwrap();
    mock.assert_async().await;
    assert_eq!(printed, "{\n    \"group\": {\n        \"id\": \"abc\"\n    }\n}\n");

    let history = home.open_service("autoscale").unwrap().history;
    assert_eq!(history.last(), 1);
    let entry = history.get(1).unwrap();
    assert_eq!(entry.method, "POST");
    assert_eq!(entry.resource, "groups");
    let body = entry.body.unwrap();
    assert!(body.contains("\"name\": \"prod\""));
    assert!(body.starts_with("{\n    \"groupConfiguration\""));
}

#[tokio::test]
async fn test_replay_applies_new_replacements() {
    let (_temp_dir, home) = install_autoscale();
    let history = home.open_service("autoscale").unwrap().history;
    history
        .store(
            "POST",
            "groups",
            Some("{\n    \"groupConfiguration\": {\n        \"name\": \"prod\"\n    }\n}"),
        )
        .unwrap();

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1.0/123/groups")
        .match_body(Matcher::Json(json!({"groupConfiguration": {"name": "staging"}})))
        .with_status(201)
        .create_async()
        .await;

    let options = CommandOptions {
        service: Some("autoscale".to_string()),
        last: 1,
        replacements: vec!["name=staging".to_string()],
        ..Default::default()
    };
    let (result, printed) = run(&options, &home, &service_vars(&server)).await;
    result.unwrap();
    mock.assert_async().await;
    assert_eq!(printed, "");

    assert_eq!(history.last(), 2);
    assert!(history.get(1).unwrap().body.unwrap().contains("staging"));
    assert!(history.get(2).unwrap().body.unwrap().contains("prod"));
}

#[tokio::test]
async fn test_output_extraction() {
    let (_temp_dir, home) = install_autoscale();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1.0/123/groups/abc")
        .with_status(200)
        .with_body(r#"{"group": {"state": {"active": [{"id": "s1"}, {"id": "s2"}]}}}"#)
        .expect(2)
        .create_async()
        .await;
    let vars = service_vars(&server);

    let mut options = autoscale("groups/abc");
    options.output = Some("group.state.active[1].id".to_string());
    let (result, printed) = run(&options, &home, &vars).await;
    result.unwrap();
    assert_eq!(printed, "\"s2\"\n");

    options.output = Some("group.state.active[5].id".to_string());
    let (result, _) = run(&options, &home, &vars).await;
    assert!(matches!(
        result,
        Err(CommandError::Address(AddressError::NotFound { .. }))
    ));
}

#[tokio::test]
async fn test_error_status_is_reported_and_recorded() {
    let (_temp_dir, home) = install_autoscale();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/v1.0/123/groups/nope")
        .with_status(404)
        .with_body(r#"{"message":"Group not found"}"#)
        .create_async()
        .await;

    let mut options = autoscale("groups/nope");
    options.method = Some("DELETE".to_string());
    let (result, printed) = run(&options, &home, &service_vars(&server)).await;

    match result {
        Err(CommandError::Request(RequestError::ResponseError { status, body })) => {
            assert_eq!(status, 404);
            assert_eq!(body, "{\n    \"message\": \"Group not found\"\n}");
        }
        other => panic!("expected a response error, got {:?}", other),
    }
    assert_eq!(printed, "");
    assert_eq!(home.open_service("autoscale").unwrap().history.last(), 1);
}

#[tokio::test]
async fn test_get_before_put_uses_current_representation() {
    let (_temp_dir, home) = install_autoscale();
    let mut server = mockito::Server::new_async().await;
    let get = server
        .mock("GET", "/v1.0/123/groups/abc/config")
        .with_status(200)
        .with_body(r#"{"name": "g", "cooldown": 60, "minEntities": 1}"#)
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/v1.0/123/groups/abc/config")
        .match_body(Matcher::Json(
            json!({"name": "g", "cooldown": 60, "minEntities": 3}),
        ))
        .with_status(204)
        .create_async()
        .await;

    let mut options = autoscale("groups/abc/config");
    options.method = Some("PUT".to_string());
    options.get = true;
    options.replacements = vec!["min=3".to_string()];

    let (result, _) = run(&options, &home, &service_vars(&server)).await;
    result.unwrap();
    get.assert_async().await;
    put.assert_async().await;
}

#[tokio::test]
async fn test_failed_get_before_put_sends_nothing() {
    let (_temp_dir, home) = install_autoscale();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/v1.0/123/groups/abc/config")
        .with_status(500)
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/v1.0/123/groups/abc/config")
        .expect(0)
        .create_async()
        .await;

    let mut options = autoscale("groups/abc/config");
    options.method = Some("PUT".to_string());
    options.get = true;

    let (result, _) = run(&options, &home, &service_vars(&server)).await;
    assert!(matches!(
        result,
        Err(CommandError::Request(RequestError::ResponseError { status: 500, .. }))
    ));
    put.assert_async().await;
    assert_eq!(home.open_service("autoscale").unwrap().history.last(), 0);
}

#[tokio::test]
async fn test_header_overrides_and_basic_auth() {
    let (_temp_dir, home) = install_autoscale();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1.0/123/groups")
        .match_header("x-auth-token", "override")
        .match_header("authorization", "Basic dXNlcjpwYXNz")
        .match_header("accept", "text/plain")
        .with_status(200)
        .create_async()
        .await;

    let mut options = autoscale("groups");
    options.headers = vec![
        "x-auth-token: override".to_string(),
        "Accept:text/plain".to_string(),
    ];
    options.user = Some("user:pass".to_string());

    let (result, _) = run(&options, &home, &service_vars(&server)).await;
    result.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unset_header_variable_is_omitted() {
    let (_temp_dir, home) = install_autoscale();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/v1.0/123/groups")
        .match_header("x-auth-token", Matcher::Missing)
        .with_status(200)
        .create_async()
        .await;

    let prefix = format!("{}/v1.0/123", server.url());
    let vars = env(&[("AS_URI_PREFIX", prefix.as_str())]);
    let (result, _) = run(&autoscale("groups"), &home, &vars).await;
    result.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_uriprefix_override() {
    let (_temp_dir, home) = install_autoscale();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/other/groups")
        .with_status(200)
        .create_async()
        .await;

    let mut options = autoscale("groups");
    options.uriprefix = Some(format!("{}/other/", server.url()));
    let (result, _) = run(&options, &home, &env(&[])).await;
    result.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_generic_requests_use_generic_history() {
    let (_temp_dir, home) = install_autoscale();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/status")
        .with_status(200)
        .with_body("OK")
        .expect(2)
        .create_async()
        .await;

    let uri = format!("{}/status", server.url());
    let options = CommandOptions {
        resource: Some(uri.clone()),
        ..Default::default()
    };
    let vars = env(&[]);

    let (result, printed) = run(&options, &home, &vars).await;
    result.unwrap();
    assert_eq!(printed, "OK\n");

    // identical request is not recorded twice
    let (result, _) = run(&options, &home, &vars).await;
    result.unwrap();

    let history = home.generic_history().unwrap();
    assert_eq!(history.last(), 1);
    assert_eq!(home.open_service("autoscale").unwrap().history.last(), 0);

    let listing = CommandOptions {
        history: true,
        ..Default::default()
    };
    let (result, printed) = run(&listing, &home, &vars).await;
    result.unwrap();
    assert_eq!(printed, format!("1     GET       {}\n", uri));
    assert_eq!(
        printed.trim_end(),
        format_history_entry(&history.get(1).unwrap())
    );
}

#[tokio::test]
async fn test_network_error_is_not_recorded() {
    let (_temp_dir, home) = install_autoscale();
    let vars = env(&[("AS_URI_PREFIX", "http://127.0.0.1:1/v1.0/123/")]);

    let (result, _) = run(&autoscale("groups"), &home, &vars).await;
    assert!(matches!(
        result,
        Err(CommandError::Request(RequestError::NetworkError(_)))
    ));
    assert_eq!(home.open_service("autoscale").unwrap().history.last(), 0);
}

#[tokio::test]
async fn test_print_then_send() {
    let (_temp_dir, home) = install_autoscale();
    let mut server = mockito::Server::new_async().await;
    server
        .mock("PATCH", "/v1.0/123/groups/abc")
        .with_status(200)
        .create_async()
        .await;

    let mut options = autoscale("groups/abc");
    options.method = Some("patch".to_string());
    options.data = Some(r#"{"a": 1}"#.to_string());
    options.print = true;

    let (result, printed) = run(&options, &home, &service_vars(&server)).await;
    result.unwrap();
    assert_eq!(
        printed,
        format!("PATCH {}/v1.0/123/groups/abc\n{{\"a\": 1}}\n", server.url())
    );
    assert_eq!(home.open_service("autoscale").unwrap().history.last(), 1);
}
