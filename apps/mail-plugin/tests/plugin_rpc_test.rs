//! # プラグイン RPC 統合テスト
//!
//! ルーター全体に `oneshot` でリクエストを送り、
//! モックの送信・ステップ報告と組み合わせた RPC の振る舞いを検証する。

use std::sync::Arc;

use axum::{Router, body::Body};
use chrono::{TimeZone, Utc};
use http::{Request, StatusCode, header};
use mailflow_domain::{MailError, clock::FixedClock, execution::StepStatus};
use mailflow_infra::mock::{MockMailSender, MockStepReporter};
use mailflow_mail_plugin::{
    build_router,
    handler::PluginState,
    plugin_info,
    usecase::MailActionUseCase,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

const EXECUTION_ID: &str = "01947c6e-1a2b-7c3d-8e4f-5a6b7c8d9e0f";
const STEP_ID: &str = "01947c6e-1a2b-7c3d-8e4f-000000000001";

fn app(sender: &MockMailSender, reporter: &MockStepReporter) -> Router {
    let usecase = MailActionUseCase::new(
        Arc::new(sender.clone()),
        Arc::new(reporter.clone()),
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
        )),
    );
    build_router(Arc::new(PluginState {
        usecase,
        info: plugin_info::rpc_plugin_info(),
    }))
}

fn execute_task_body() -> Value {
    json!({
        "config": {
            "execution_api": { "url": "http://runner.local:8080", "api_key": "runner-key" }
        },
        "execution": { "id": EXECUTION_ID },
        "step": {
            "id": STEP_ID,
            "action": {
                "params": [
                    { "key": "From", "value": "alerts@example.com" },
                    { "key": "Password", "value": "s3cret" },
                    { "key": "To", "value": "ops@example.com, dev@example.com" },
                    { "key": "SmtpHost", "value": "smtp.example.com" },
                    { "key": "SmtpPort", "value": "587" },
                    { "key": "Message", "value": "Subject: Alert\n\nCPU high" }
                ]
            }
        }
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_checkはhealthyを返す() {
    let response = app(&MockMailSender::new(), &MockStepReporter::new())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn infoはプラグイン情報を返す() {
    let response = app(&MockMailSender::new(), &MockStepReporter::new())
        .oneshot(
            Request::builder()
                .uri("/plugin/info")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["name"], "Mail");
    assert_eq!(body["data"]["type"], "action");
    assert_eq!(body["data"]["version"], "1.1.1");
    assert_eq!(body["data"]["actions"]["category"], "Utility");
    assert_eq!(body["data"]["actions"]["params"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn execute_taskは送信成功でsuccess_trueを返す() {
    let sender = MockMailSender::new();
    let reporter = MockStepReporter::new();

    let response = app(&sender, &reporter)
        .oneshot(post_json("/plugin/execute-task", &execute_task_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "data": { "success": true } }));

    let sent = sender.sent_mails();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].server_address(), "smtp.example.com:587");

    let updates = reporter.updates();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].api.api_key, "runner-key");
    assert_eq!(updates[0].execution_id.to_string(), EXECUTION_ID);
    assert_eq!(updates[0].update.id.to_string(), STEP_ID);
    assert_eq!(updates[0].update.status, StepStatus::Running);
    assert_eq!(updates[1].update.status, StepStatus::Success);
    assert_eq!(updates[1].update.messages, vec![
        "Email sent to ops@example.com, dev@example.com".to_string()
    ]);
}

#[tokio::test]
async fn execute_taskは送信失敗でsuccess_falseを返しエラーにしない() {
    let sender = MockMailSender::new();
    sender.fail_with(MailError::Transport("535 authentication failed".to_string()));
    let reporter = MockStepReporter::new();

    let response = app(&sender, &reporter)
        .oneshot(post_json("/plugin/execute-task", &execute_task_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "data": { "success": false } }));

    let updates = reporter.updates();
    assert_eq!(updates[1].update.status, StepStatus::Error);
    assert_eq!(updates[1].update.messages, vec![
        "Failed to send email: 535 authentication failed".to_string()
    ]);
}

#[tokio::test]
async fn execute_taskはステップ更新失敗で502を返す() {
    let sender = MockMailSender::new();
    let reporter = MockStepReporter::new();
    reporter.fail_on_call(1);

    let response = app(&sender, &reporter)
        .oneshot(post_json("/plugin/execute-task", &execute_task_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["type"], "https://mailflow.example.com/errors/bad-gateway");
    assert_eq!(body["status"], 502);
    assert!(sender.sent_mails().is_empty());
}

#[tokio::test]
async fn execute_taskは不正なボディで400を返す() {
    let response = app(&MockMailSender::new(), &MockStepReporter::new())
        .oneshot(post_json("/plugin/execute-task", &json!({ "config": {} })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["title"], "Bad Request");
}

#[tokio::test]
async fn handle_alertは常に501を返す() {
    let body = json!({
        "config": {
            "execution_api": { "url": "http://runner.local:8080", "api_key": "runner-key" }
        },
        "payload": { "alert": "disk" }
    });

    let response = app(&MockMailSender::new(), &MockStepReporter::new())
        .oneshot(post_json("/plugin/handle-alert", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    let body = json_body(response).await;
    assert_eq!(body["detail"], "not implemented");
    assert_eq!(body["status"], 501);
}
