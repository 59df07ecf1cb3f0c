use std::collections::HashMap;

use axum::http::StatusCode;
use closure_core::config::Settings;
use http_body_util::BodyExt;
use mockito::Matcher;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn settings(vars: &[(&str, &str)]) -> Settings {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Settings::from_lookup(move |key: &str| vars.get(key).cloned())
}

fn jira_vars(base_url: &str) -> Vec<(&str, &str)> {
    vec![
        ("JIRA_BASE_URL", base_url),
        ("JIRA_EMAIL", "qa@example.com"),
        ("JIRA_API_TOKEN", "token"),
        ("JIRA_PROJECT_KEY", "APP"),
    ]
}

const SMTP_VARS: &[(&str, &str)] = &[
    ("SMTP_HOST", "localhost"),
    ("SMTP_PORT", "2525"),
    ("SMTP_USER", "qa@example.com"),
    ("SMTP_PASS", "secret"),
];

fn jira_app(base_url: &str) -> axum::Router {
    closure_server::build_router(settings(&jira_vars(base_url)))
}

/// Send a GET request via `oneshot` and return (status, parsed JSON body).
async fn get(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Send a POST request with a JSON body via `oneshot` and return (status, parsed JSON body).
async fn post_json(
    app: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn full_app(base_url: &str) -> axum::Router {
    let mut vars = jira_vars(base_url);
    vars.extend_from_slice(SMTP_VARS);
    closure_server::build_router(settings(&vars))
}

/// POST a raw body with the given content type and return (status, parsed JSON body).
async fn post_raw(
    app: axum::Router,
    uri: &str,
    content_type: &str,
    body: &'static str,
) -> (StatusCode, serde_json::Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", content_type)
        .body(axum::body::Body::from(body))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn mock_search(server: &mut mockito::ServerGuard, body: serde_json::Value) -> mockito::Mock {
    server
        .mock("GET", "/rest/api/3/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_configured_services() {
    let app = closure_server::build_router(settings(SMTP_VARS));
    let (status, json) = get(app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["jira"], false);
    assert_eq!(json["smtp"], true);
}

#[tokio::test]
async fn tracker_endpoint_without_config_is_500() {
    let app = closure_server::build_router(settings(&[]));
    let (status, json) = get(app, "/api/jira/labels").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let msg = json["error"].as_str().unwrap();
    assert!(msg.contains("environment variables"), "{msg}");
    assert!(msg.contains("JIRA_API_TOKEN"), "{msg}");
}

#[tokio::test]
async fn mail_endpoints_without_smtp_are_500_before_validation() {
    for uri in [
        "/api/inform-dev",
        "/api/jira/inform-dev",
        "/api/email-product-team",
        "/api/closure-email/send",
    ] {
        let app = closure_server::build_router(settings(&[]));
        let (status, json) = post_json(app, uri, serde_json::json!({})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        let msg = json["error"].as_str().unwrap();
        assert!(msg.contains("SMTP_HOST"), "{uri}: {msg}");
    }
}

#[tokio::test]
async fn inform_dev_without_smtp_never_calls_out() {
    let mut server = mockito::Server::new_async().await;
    let lookup = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let app = jira_app(&server.url());
    let (status, _) = post_json(
        app,
        "/api/jira/inform-dev",
        serde_json::json!({ "issues": ["APP-1"] }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    lookup.assert_async().await;
}

#[tokio::test]
async fn product_team_needs_recipient() {
    let app = closure_server::build_router(settings(SMTP_VARS));
    let (status, json) = post_json(
        app,
        "/api/email-product-team",
        serde_json::json!({ "bugs": [{ "url": "https://x/browse/APP-1", "summary": "Crash" }] }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("PRODUCT_TEAM_TO"));
}

#[tokio::test]
async fn malformed_body_without_smtp_is_still_500() {
    let app = closure_server::build_router(settings(&[]));
    let (status, json) = post_json(
        app,
        "/api/inform-dev",
        serde_json::json!({ "tickets": "nope" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("SMTP_HOST"));
}

#[tokio::test]
async fn unparseable_body_without_tracker_is_500() {
    let app = closure_server::build_router(settings(&[]));
    let (status, json) =
        post_raw(app, "/api/jira/filter-tickets", "application/json", "{not json").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("JIRA_BASE_URL"));
}

#[tokio::test]
async fn non_address_smtp_login_is_a_config_error() {
    let app = closure_server::build_router(settings(&[
        ("SMTP_HOST", "localhost"),
        ("SMTP_PORT", "2525"),
        ("SMTP_USER", "apikey"),
        ("SMTP_PASS", "secret"),
    ]));
    let (status, json) = post_json(
        app,
        "/api/closure-email/send",
        serde_json::json!({
            "releaseStatus": "Good to go LIVE",
            "releaseVersion": "4.2.0",
            "devs": ["ann@example.com"],
            "testedArea": "POS",
            "foundBugs": []
        }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let msg = json["error"].as_str().unwrap();
    assert!(msg.contains("SMTP_USER (not a valid sender address)"), "{msg}");
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn wrong_typed_tickets_are_400() {
    let mut server = mockito::Server::new_async().await;
    let untouched = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let (status, json) = post_json(
        full_app(&server.url()),
        "/api/inform-dev",
        serde_json::json!({ "tickets": "nope" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing or invalid tickets array");
    untouched.assert_async().await;
}

#[tokio::test]
async fn wrong_typed_label_is_400() {
    let server = mockito::Server::new_async().await;
    let (status, json) = post_json(
        jira_app(&server.url()),
        "/api/jira/filter-tickets",
        serde_json::json!({ "label": 138, "component": "POS" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing required fields");
}

#[tokio::test]
async fn unparseable_body_is_400_json() {
    let server = mockito::Server::new_async().await;
    let (status, json) = post_raw(
        jira_app(&server.url()),
        "/api/summary",
        "application/json",
        "{not json",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing label or component");

    let (status, json) = post_raw(
        closure_server::build_router(settings(&[])),
        "/api/closure-email/preview",
        "text/plain",
        "hello",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing required fields");
}

#[tokio::test]
async fn inform_by_key_rejects_empty_issue_list() {
    let mut server = mockito::Server::new_async().await;
    let lookup = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let (status, json) = post_json(
        full_app(&server.url()),
        "/api/jira/inform-dev",
        serde_json::json!({ "issues": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing or invalid issues array");
    lookup.assert_async().await;
}

#[tokio::test]
async fn closure_send_requires_fields() {
    let app = closure_server::build_router(settings(SMTP_VARS));
    let (status, json) = post_json(
        app,
        "/api/closure-email/send",
        serde_json::json!({
            "releaseStatus": "Good to go LIVE",
            "releaseVersion": "4.2.0",
            "devs": [],
            "testedArea": "POS",
            "foundBugs": []
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing required fields");
}

#[tokio::test]
async fn product_team_rejects_empty_bug_list() {
    let mut vars = SMTP_VARS.to_vec();
    vars.push(("PRODUCT_TEAM_TO", "product@example.com"));
    let app = closure_server::build_router(settings(&vars));
    let (status, json) =
        post_json(app, "/api/email-product-team", serde_json::json!({ "bugs": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing or invalid bugs array");
}

#[tokio::test]
async fn filter_tickets_requires_label_and_component() {
    let server = mockito::Server::new_async().await;
    let (status, json) = post_json(
        jira_app(&server.url()),
        "/api/jira/filter-tickets",
        serde_json::json!({ "label": "S12" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing required fields");
}

#[tokio::test]
async fn previous_bugs_rejects_bad_label() {
    let server = mockito::Server::new_async().await;
    let (status, json) = post_json(
        jira_app(&server.url()),
        "/api/jira/previous-bugs",
        serde_json::json!({ "currentLabel": "Sabc", "component": "POS" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Sabc"));
}

// ---------------------------------------------------------------------------
// Tracker-backed endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn labels_are_filtered_and_sorted() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/api/3/label")
        .with_status(200)
        .with_body(r#"{"values":["s9-release","misc","s138-release","s12-release"]}"#)
        .create_async()
        .await;
    let (status, json) = get(jira_app(&server.url()), "/api/jira/labels").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["labels"],
        serde_json::json!(["s138-release", "s12-release", "s9-release"])
    );
}

#[tokio::test]
async fn filter_tickets_uses_release_label() {
    let mut server = mockito::Server::new_async().await;
    let search = server
        .mock("GET", "/rest/api/3/search")
        .match_query(Matcher::UrlEncoded(
            "jql".into(),
            "project = APP AND status = \"Open\" AND labels = \"s12-release\" AND component = \"POS\"".into(),
        ))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "total": 1,
                "issues": [{
                    "key": "APP-7",
                    "fields": {
                        "summary": "Tips rounding",
                        "status": { "name": "Open" },
                        "assignee": { "displayName": "Ann", "emailAddress": "ann@example.com" },
                        "labels": ["s12-release"],
                        "components": [{ "id": "1", "name": "POS" }],
                        "fixVersions": []
                    }
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let url = server.url();
    let (status, json) = post_json(
        jira_app(&url),
        "/api/jira/filter-tickets",
        serde_json::json!({ "label": "S12", "component": "POS" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    search.assert_async().await;
    assert_eq!(json["totalCount"], 1);
    let ticket = &json["tickets"][0];
    assert_eq!(ticket["key"], "APP-7");
    assert_eq!(ticket["assignee"], "Ann");
    assert_eq!(ticket["assigneeEmail"], "ann@example.com");
    assert_eq!(ticket["url"], format!("{url}/browse/APP-7"));
}

#[tokio::test]
async fn components_come_from_the_project() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/api/3/project/APP/components")
        .with_status(200)
        .with_body(r#"[{"id":"1","name":"POS"},{"id":"2","name":"Payments"}]"#)
        .create_async()
        .await;
    let (status, json) = get(jira_app(&server.url()), "/api/jira/components").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["components"][0]["name"], "POS");
    assert_eq!(json["components"][1]["id"], "2");
}

#[tokio::test]
async fn init_data_keeps_first_seen_labels() {
    let mut server = mockito::Server::new_async().await;
    let _search = server
        .mock("GET", "/rest/api/3/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("jql".into(), "project = APP".into()),
            Matcher::UrlEncoded("maxResults".into(), "50".into()),
        ]))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "total": 2,
                "issues": [
                    { "key": "APP-1", "fields": { "labels": ["S12", "s12-release"] } },
                    { "key": "APP-2", "fields": { "labels": ["S11", "S12"] } }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _components = server
        .mock("GET", "/rest/api/3/project/APP/components")
        .with_status(200)
        .with_body(r#"[{"id":"1","name":"POS"}]"#)
        .create_async()
        .await;

    let (status, json) = get(jira_app(&server.url()), "/api/init-data").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["labels"], serde_json::json!(["S12", "s12-release", "S11"]));
    assert_eq!(json["components"][0]["name"], "POS");
}

#[tokio::test]
async fn dev_released_keeps_only_unversioned_tickets() {
    let mut server = mockito::Server::new_async().await;
    let search = server
        .mock("GET", "/rest/api/3/search")
        .match_query(Matcher::UrlEncoded(
            "jql".into(),
            "project = APP AND labels = \"S12\" AND component = \"POS\" AND status = \"Dev Released\" AND fixVersion is EMPTY".into(),
        ))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "total": 2,
                "issues": [
                    {
                        "key": "APP-3",
                        "fields": {
                            "summary": "Gift cards",
                            "status": { "name": "Dev Released" },
                            "assignee": { "displayName": "Bo", "emailAddress": "bo@example.com" },
                            "fixVersions": null
                        }
                    },
                    {
                        "key": "APP-4",
                        "fields": {
                            "summary": "Already versioned",
                            "status": { "name": "Dev Released" },
                            "fixVersions": [{ "name": "4.1.0" }]
                        }
                    }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let url = server.url();
    let (status, json) = post_json(
        jira_app(&url),
        "/api/filter-dev-released-tickets",
        serde_json::json!({ "label": "S12", "component": "POS" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    search.assert_async().await;
    let tickets = json["tickets"].as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["key"], "APP-3");
    assert_eq!(tickets[0]["assigneeEmail"], "bo@example.com");
    assert_eq!(tickets[0]["url"], format!("{url}/browse/APP-3"));
}

#[tokio::test]
async fn release_version_missing_returns_raw_issues() {
    let mut server = mockito::Server::new_async().await;
    let search = server
        .mock("GET", "/rest/api/3/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "jql".into(),
                "project = APP AND status = \"Dev Released\" AND labels = \"S12\" AND component = \"POS\" AND (\"Release Version\" is EMPTY OR \"Release Version\" = \"\")".into(),
            ),
            Matcher::Regex("customfield_10034".into()),
        ]))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "total": 1,
                "issues": [{
                    "key": "APP-8",
                    "fields": {
                        "summary": "No release field",
                        "status": { "name": "Dev Released" },
                        "customfield_10034": { "value": "Minor" }
                    }
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let (status, json) = post_json(
        jira_app(&server.url()),
        "/api/jira/release-version-missing",
        serde_json::json!({ "label": "S12", "component": "POS" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    search.assert_async().await;
    let issue = &json["issues"][0];
    assert_eq!(issue["key"], "APP-8");
    assert_eq!(issue["fields"]["summary"], "No release field");
    assert_eq!(issue["fields"]["customfield_10034"]["value"], "Minor");
}

#[tokio::test]
async fn previous_bugs_summary_splits_by_exact_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/api/3/search")
        .match_query(Matcher::UrlEncoded(
            "jql".into(),
            "project = APP AND labels = \"S137\" AND component = \"POS\"".into(),
        ))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "total": 4,
                "issues": [
                    { "key": "APP-1", "fields": { "summary": "Crash", "status": { "name": "Prioritized Bugs" } } },
                    { "key": "APP-2", "fields": { "summary": "Glitch", "status": { "name": "Redevelopment Bugs" } } },
                    { "key": "APP-3", "fields": { "summary": "Tips", "status": { "name": "Dev Released" } } },
                    { "key": "APP-4", "fields": { "summary": "Other", "status": { "name": "dev released" } } }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let url = server.url();
    let (status, json) = post_json(
        jira_app(&url),
        "/api/previous-bugs-summary",
        serde_json::json!({ "label": "s138", "component": "POS" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["previousLabel"], "S137");
    assert_eq!(json["prioritized"][0]["title"], "Crash");
    assert_eq!(json["redevelopment"][0]["key"], "APP-2");
    let released = json["devReleased"].as_array().unwrap();
    assert_eq!(released.len(), 1);
    assert_eq!(released[0]["url"], format!("{url}/browse/APP-3"));
}

#[tokio::test]
async fn status_counts_report_every_bucket() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_search(
        &mut server,
        serde_json::json!({
            "total": 3,
            "issues": [
                { "key": "A-1", "fields": { "status": { "name": "Open" } } },
                { "key": "A-2", "fields": { "status": { "name": "Open" } } },
                { "key": "A-3", "fields": { "status": { "name": "Done" } } }
            ]
        }),
    )
    .await;

    let (status, json) = post_json(
        jira_app(&server.url()),
        "/api/summary",
        serde_json::json!({ "label": "S12", "component": "POS" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["counts"],
        serde_json::json!({
            "Open": 2,
            "In Progress": 0,
            "In Development": 0,
            "In QA": 0,
            "QA Completed": 0,
            "Reported Bugs": 0
        })
    );
}

#[tokio::test]
async fn tested_area_digests_components_and_keywords() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_search(
        &mut server,
        serde_json::json!({
            "total": 2,
            "issues": [
                { "key": "A-1", "fields": { "summary": "Refund flow", "components": [{ "name": "POS" }] } },
                { "key": "A-2", "fields": { "summary": "Refund receipts", "components": [{ "name": "Payments" }] } }
            ]
        }),
    )
    .await;

    let (status, json) = post_json(
        jira_app(&server.url()),
        "/api/jira/tested-area",
        serde_json::json!({ "label": "S12", "component": "POS" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["testedArea"],
        "Tested components: POS, Payments. Key areas: refund, flow, receipts"
    );
}

#[tokio::test]
async fn debug_sample_collects_sorted_sets() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/api/3/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("jql".into(), "project = APP ORDER BY created DESC".into()),
            Matcher::UrlEncoded("maxResults".into(), "10".into()),
        ]))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "total": 42,
                "issues": [
                    { "key": "A-2", "fields": { "summary": "B", "status": { "name": "Open" }, "labels": ["S12"], "components": [{ "name": "POS" }] } },
                    { "key": "A-1", "fields": { "summary": "A", "status": { "name": "Dev Released" }, "labels": ["S11", "S12"] } }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let (status, json) = get(jira_app(&server.url()), "/api/jira/debug").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalIssues"], 42);
    assert_eq!(json["sampleIssues"], 2);
    assert_eq!(json["statuses"], serde_json::json!(["Dev Released", "Open"]));
    assert_eq!(json["labels"], serde_json::json!(["S11", "S12"]));
    assert_eq!(json["components"], serde_json::json!(["POS"]));
    assert_eq!(json["sampleTickets"][0]["key"], "A-2");
}

#[tokio::test]
async fn previous_bugs_triage_previous_label() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/api/3/search")
        .match_query(Matcher::Regex("S137".into()))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "total": 2,
                "issues": [
                    {
                        "key": "APP-1",
                        "fields": {
                            "summary": "Crash on refund",
                            "status": { "name": "Dev Released" },
                            "priority": { "name": "High" },
                            "labels": ["S137"]
                        }
                    },
                    {
                        "key": "APP-2",
                        "fields": {
                            "summary": "Layout glitch",
                            "status": { "name": "Open" },
                            "priority": { "name": "Low" },
                            "labels": ["S137", "redevelopment"]
                        }
                    }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let (status, json) = post_json(
        jira_app(&server.url()),
        "/api/jira/previous-bugs",
        serde_json::json!({ "currentLabel": "S138", "component": "POS" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["previousLabel"], "S137");
    assert_eq!(json["prioritized"][0]["key"], "APP-1");
    assert_eq!(json["devReleased"][0]["key"], "APP-1");
    assert_eq!(json["redevelopment"][0]["key"], "APP-2");
    assert_eq!(json["redevelopment"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn found_bugs_read_severity_and_legacy() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_search(
        &mut server,
        serde_json::json!({
            "total": 1,
            "issues": [{
                "key": "APP-9",
                "fields": {
                    "summary": "Receipt misprints",
                    "status": { "name": "In QA" },
                    "priority": { "name": "Medium" },
                    "labels": ["legacy-issue"],
                    "customfield_10034": { "value": "Major" }
                }
            }]
        }),
    )
    .await;

    let (status, json) = post_json(
        jira_app(&server.url()),
        "/api/jira/found-bugs",
        serde_json::json!({ "label": "S12" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let bug = &json["bugs"][0];
    assert_eq!(bug["title"], "Receipt misprints");
    assert_eq!(bug["severity"], "Major");
    assert_eq!(bug["legacy"], true);
    assert_eq!(bug["priority"], "Medium");
}

#[tokio::test]
async fn summary_buckets_statuses() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_search(
        &mut server,
        serde_json::json!({
            "total": 3,
            "issues": [
                { "key": "A-1", "fields": { "status": { "name": "In Progress" }, "issuetype": { "name": "Story" } } },
                { "key": "A-2", "fields": { "status": { "name": "QA Completed" }, "issuetype": { "name": "Bug" } } },
                { "key": "A-3", "fields": { "status": { "name": "In QA" }, "issuetype": { "name": "Bug" } } }
            ]
        }),
    )
    .await;

    let (status, json) = post_json(
        jira_app(&server.url()),
        "/api/jira/summary",
        serde_json::json!({ "label": "S12", "component": "POS" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 3);
    assert_eq!(json["summary"]["inProgress"], 1);
    assert_eq!(json["summary"]["qaCompleted"], 1);
    assert_eq!(json["summary"]["inQA"], 1);
    assert_eq!(json["summary"]["reportedBugs"], 2);
}

#[tokio::test]
async fn tracker_failure_surfaces_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/api/3/search")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body("Unauthorized")
        .create_async()
        .await;

    let (status, json) = post_json(
        jira_app(&server.url()),
        "/api/summary",
        serde_json::json!({ "label": "S12", "component": "POS" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let msg = json["error"].as_str().unwrap();
    assert!(msg.contains("401"), "{msg}");
}

#[tokio::test]
async fn submit_returns_issue_key() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/rest/api/3/issue")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "fields": { "summary": "Release 4.2.0 - S12 - POS" }
        })))
        .with_status(201)
        .with_body(r#"{"id":"100","key":"APP-500"}"#)
        .create_async()
        .await;

    let (status, json) = post_json(
        jira_app(&server.url()),
        "/api/jira/submit",
        serde_json::json!({ "releaseVersion": "4.2.0", "label": "S12", "component": "POS" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["issueKey"], "APP-500");
}

#[tokio::test]
async fn test_jql_reports_paging() {
    let mut server = mockito::Server::new_async().await;
    let _mock = mock_search(
        &mut server,
        serde_json::json!({ "total": 0, "maxResults": 100, "startAt": 0, "issues": [] }),
    )
    .await;

    let (status, json) = post_json(
        jira_app(&server.url()),
        "/api/jira/test-jql",
        serde_json::json!({ "label": "S12", "component": "POS" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["formattedLabel"], "s12-release");
    assert_eq!(json["maxResults"], 100);
    assert!(json["sampleIssue"].is_null());
}

// ---------------------------------------------------------------------------
// Composition without upstream services
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_closure_email_needs_no_config() {
    let app = closure_server::build_router(settings(&[]));
    let (status, json) = post_json(
        app,
        "/api/generate-closure-email",
        serde_json::json!({
            "releaseStatus": "Not ready",
            "releaseVersion": "4.2.0",
            "devEmails": ["ann@example.com"],
            "foundBugs": [{ "title": "Crash", "status": "Open", "legacy": true }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let html = json["html"].as_str().unwrap();
    assert!(html.contains("<td>Crash</td>"));
    assert!(html.contains("<td>Yes</td>"));
}

#[tokio::test]
async fn preview_omits_bugs_when_going_live() {
    let app = closure_server::build_router(settings(&[]));
    let (status, json) = post_json(
        app,
        "/api/closure-email/preview",
        serde_json::json!({
            "releaseStatus": "Good to go LIVE",
            "releaseVersion": "4.2.0",
            "testedAreas": "POS checkout",
            "bugs": [{ "title": "Crash" }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let text = json["text"].as_str().unwrap();
    assert!(!text.contains("FOUND BUGS"));
    assert!(text.contains("RELEASE STATUS: Good to go LIVE"));
}
