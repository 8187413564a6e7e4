//! Drives the real client against a local mock of the ClickUp API.

use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::json;

use clickup_tracker::{ClickUpClient, ClickUpError, TokenDecryptor};

/// Strips the "enc:" envelope the fake host wraps tokens in. Lets the
/// tests prove the Authorization header carries the decrypted form.
struct TestCipher;

impl TokenDecryptor for TestCipher {
    fn decrypt(&self, encrypted: &str) -> Result<String, ClickUpError> {
        encrypted
            .strip_prefix("enc:")
            .map(str::to_string)
            .ok_or_else(|| ClickUpError::Credential("token is not encrypted".to_string()))
    }
}

fn client(server: &MockServer, team_id: &str, space_id: &str) -> ClickUpClient {
    ClickUpClient::with_base_url(
        &server.base_url(),
        "enc:pk_123",
        team_id,
        space_id,
        Arc::new(TestCipher),
    )
    .expect("client should be created")
}

fn task_record(id: &str, name: &str, status: &str, assignees: &[(&str, &str)]) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "status": {"status": status, "color": "#d3d3d3", "orderindex": 0, "type": "open"},
        "orderindex": "1.0",
        "date_created": "1700000000000",
        "creator": {"id": "1", "username": "creator", "email": "creator@example.com"},
        "assignees": assignees
            .iter()
            .map(|(id, name)| json!({"id": id, "username": name, "email": format!("{name}@example.com")}))
            .collect::<Vec<_>>(),
    })
}

#[tokio::test]
async fn get_task_sends_the_decrypted_token_and_maps_the_record() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/task/9hz")
            .header("authorization", "pk_123")
            .query_param("custom_task_ids", "false")
            .query_param("team_id", "team1")
            .query_param("include_subtasks", "false");
        then.status(200)
            .json_body(task_record("9hz", "Fix crash", "in progress", &[("183", "maria")]));
    });

    let task = client(&server, "team1", "sp1")
        .get_task("9hz", false, false)
        .await
        .expect("task fetch should succeed");

    mock.assert();
    assert_eq!(task.id, "9hz");
    assert_eq!(task.title, "Fix crash");
    assert_eq!(task.owner, "maria");
    assert_eq!(task.status, "in progress");
    assert!(task.can_be_linked);
}

#[tokio::test]
async fn get_task_rejects_an_empty_id_before_any_io() {
    let server = MockServer::start();

    let err = client(&server, "team1", "sp1")
        .get_task("", false, false)
        .await
        .unwrap_err();

    assert!(matches!(err, ClickUpError::InvalidArgument(_)));
}

#[tokio::test]
async fn get_task_propagates_http_status_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/task/9hz");
        then.status(401).body("Token invalid");
    });

    let err = client(&server, "team1", "sp1")
        .get_task("9hz", false, false)
        .await
        .unwrap_err();

    match err {
        ClickUpError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Token invalid");
        }
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn get_task_treats_an_empty_body_as_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/task/gone");
        then.status(200).body("");
    });

    let err = client(&server, "team1", "sp1")
        .get_task("gone", false, false)
        .await
        .unwrap_err();

    assert!(matches!(err, ClickUpError::TaskNotFound(id) if id == "gone"));
}

#[tokio::test]
async fn get_task_surfaces_malformed_bodies() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/task/9hz");
        then.status(200).json_body(json!({"id": "9hz"}));
    });

    let err = client(&server, "team1", "sp1")
        .get_task("9hz", false, false)
        .await
        .unwrap_err();

    assert!(matches!(err, ClickUpError::Json(_)));
}

#[tokio::test]
async fn get_tasks_accumulates_pages_and_filters_to_requested_ids() {
    let server = MockServer::start();
    let first_page = server.mock(|when, then| {
        when.method(GET)
            .path("/team/team1/task")
            .query_param("page", "0")
            .query_param("space_ids[]", "sp1");
        then.status(200).json_body(json!({
            "tasks": [
                task_record("a1", "First", "open", &[]),
                task_record("a2", "Second", "open", &[]),
            ],
            "last_page": false,
        }));
    });
    let last_page = server.mock(|when, then| {
        when.method(GET)
            .path("/team/team1/task")
            .query_param("page", "1")
            .query_param("space_ids[]", "sp1");
        then.status(200).json_body(json!({
            "tasks": [task_record("a3", "Third", "open", &[])],
            "last_page": true,
        }));
    });

    let requested = vec!["a1".to_string(), "a3".to_string(), "zz".to_string()];
    let tasks = client(&server, "team1", "sp1")
        .get_tasks(&requested)
        .await
        .expect("listing should succeed");

    first_page.assert();
    last_page.assert();
    // Three records accumulated across both pages, two survive the id filter.
    let ids: Vec<&str> = tasks.iter().map(|task| task.id.as_str()).collect();
    assert_eq!(ids, vec!["a1", "a3"]);
    assert!(tasks.iter().all(|task| requested.contains(&task.id)));
}

#[tokio::test]
async fn get_tasks_stops_exactly_when_the_last_page_flag_appears() {
    let server = MockServer::start();
    for page in 0..3 {
        let last = page == 2;
        server.mock(|when, then| {
            when.method(GET)
                .path("/team/team1/task")
                .query_param("page", page.to_string());
            then.status(200).json_body(json!({
                "tasks": [task_record(&format!("t{page}"), "Task", "open", &[])],
                "last_page": last,
            }));
        });
    }

    let requested: Vec<String> = (0..3).map(|page| format!("t{page}")).collect();
    let tasks = client(&server, "team1", "sp1")
        .get_tasks(&requested)
        .await
        .expect("listing should succeed");

    assert_eq!(tasks.len(), 3);
}

#[tokio::test]
async fn get_pending_tasks_filters_by_status_and_keeps_every_record() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/team/team1/task")
            .query_param("page", "0")
            .query_param("statuses[]", "open")
            .query_param("statuses[]", "in progress")
            .query_param("include_closed", "false")
            .query_param("space_ids[]", "sp1");
        then.status(200).json_body(json!({
            "tasks": [
                task_record("p1", "Open one", "open", &[("183", "maria")]),
                task_record("p2", "Busy one", "in progress", &[]),
            ],
            "last_page": true,
        }));
    });

    let tasks = client(&server, "team1", "sp1")
        .get_pending_tasks("")
        .await
        .expect("pending fetch should succeed");

    mock.assert();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].owner, "maria");
    assert_eq!(tasks[1].owner, "");
}

#[tokio::test]
async fn get_pending_tasks_narrows_to_the_assignee() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/team/team1/task")
            .query_param("assignees[]", "183");
        then.status(200).json_body(json!({
            "tasks": [task_record("p1", "Mine", "open", &[("183", "maria")])],
            "last_page": true,
        }));
    });

    let tasks = client(&server, "team1", "sp1")
        .get_pending_tasks("183")
        .await
        .expect("pending fetch should succeed");

    mock.assert();
    assert_eq!(tasks.len(), 1);
}

#[tokio::test]
async fn pending_task_pagination_propagates_page_failures() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/team/team1/task")
            .query_param("page", "0");
        then.status(200)
            .json_body(json!({"tasks": [], "last_page": false}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/team/team1/task")
            .query_param("page", "1");
        then.status(502).body("Bad gateway");
    });

    let err = client(&server, "team1", "sp1")
        .get_pending_tasks("")
        .await
        .unwrap_err();

    assert!(matches!(err, ClickUpError::Api { status: 502, .. }));
}

#[tokio::test]
async fn get_authorized_user_parses_the_user_envelope() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/user").header("authorization", "pk_123");
        then.status(200).json_body(json!({
            "user": {"id": "183", "username": "maria", "email": "maria@example.com"}
        }));
    });

    let user = client(&server, "team1", "sp1")
        .get_authorized_user()
        .await
        .expect("user fetch should succeed")
        .expect("a user should be present");

    mock.assert();
    assert_eq!(user.id, "183");
    assert_eq!(user.email, "maria@example.com");
}

#[tokio::test]
async fn get_authorized_user_without_a_user_key_is_none() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/user");
        then.status(200).json_body(json!({}));
    });

    let user = client(&server, "team1", "sp1")
        .get_authorized_user()
        .await
        .expect("a missing user key is not an error");

    assert!(user.is_none());
}

#[tokio::test]
async fn test_connection_probes_the_user_endpoint_without_a_space() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/user");
        then.status(200).json_body(json!({"user": null}));
    });

    let ok = client(&server, "team1", "")
        .test_connection()
        .await
        .expect("probe should succeed");

    mock.assert();
    assert!(ok);
}

#[tokio::test]
async fn test_connection_probes_the_configured_space() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/space/sp1");
        then.status(200).json_body(json!({"id": "sp1", "name": "Engineering"}));
    });

    let ok = client(&server, "team1", "sp1")
        .test_connection()
        .await
        .expect("probe should succeed");

    mock.assert();
    assert!(ok);
}

#[tokio::test]
async fn test_connection_surfaces_failures_instead_of_returning_false() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/space/sp1");
        then.status(500).body("Internal error");
    });

    let err = client(&server, "team1", "sp1")
        .test_connection()
        .await
        .unwrap_err();

    assert!(matches!(err, ClickUpError::Api { status: 500, .. }));
}

#[tokio::test]
async fn mark_task_as_open_puts_the_status_change() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path("/task/9hz")
            .header("authorization", "pk_123")
            .json_body(json!({
                "status": "in progress",
                "assignees": {"add": [183]},
            }));
        then.status(200).json_body(json!({"id": "9hz"}));
    });

    client(&server, "team1", "sp1")
        .mark_task_as_open("9hz", "183")
        .await
        .expect("update should succeed");

    mock.assert();
}

#[tokio::test]
async fn mark_task_as_open_rejects_a_non_numeric_assignee_before_io() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT).path("/task/9hz");
        then.status(200).json_body(json!({}));
    });

    let err = client(&server, "team1", "sp1")
        .mark_task_as_open("9hz", "maria@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, ClickUpError::InvalidArgument(_)));
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn an_undecryptable_token_fails_before_any_io() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/user");
        then.status(200).json_body(json!({}));
    });

    let undecryptable = ClickUpClient::with_base_url(
        &server.base_url(),
        "pk_not_wrapped",
        "team1",
        "sp1",
        Arc::new(TestCipher),
    )
    .expect("client should be created");

    let err = undecryptable.get_authorized_user().await.unwrap_err();

    assert!(matches!(err, ClickUpError::Credential(_)));
    assert_eq!(mock.hits(), 0);
}
