//! # 実行ステップ
//!
//! ホストが管理する実行（Execution）とステップ（ExecutionStep）の型、
//! およびプラグインからホストへ送るステップ更新を定義する。
//!
//! ## 状態遷移
//!
//! ```text
//! running ──┬──→ success
//!           └──→ error
//! ```
//!
//! プラグインは 1 回の実行で `running` を 1 回、続けて `success` か `error` の
//! どちらかを 1 回だけ報告する。
//!
//! ## ワイヤー形式
//!
//! RPC 型ホストは [`StepUpdate`]（`status` フィールド）を、
//! リンク型ホストは [`FlagStepUpdate`]（`running` / `finished` / `error` フラグ）を受け付ける。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::ActionParam;

define_uuid_id! {
    /// 実行 ID
    ///
    /// ホストが発行するワークフロー実行の識別子。
    pub struct ExecutionId;
}

define_uuid_id! {
    /// 実行ステップ ID
    pub struct StepId;
}

define_uuid_id! {
    /// アクション ID
    ///
    /// フロー定義上のアクションの識別子。リンク型ホストのステップ更新に含める。
    pub struct ActionId;
}

/// ステップの状態
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StepStatus {
    /// 実行中
    Running,
    /// 正常終了
    Success,
    /// 異常終了
    Error,
}

/// ステップ更新（status 形式）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepUpdate {
    pub id:          StepId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id:   Option<ActionId>,
    pub messages:    Vec<String>,
    pub status:      StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at:  Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl StepUpdate {
    /// 実行開始を表す更新を作成する
    pub fn running(
        id: StepId,
        action_id: Option<ActionId>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            action_id,
            messages: vec![message.into()],
            status: StepStatus::Running,
            started_at: Some(now),
            finished_at: None,
        }
    }

    /// 実行終了（success / error）を表す更新を作成する
    pub fn finished(
        id: StepId,
        action_id: Option<ActionId>,
        status: StepStatus,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        debug_assert_ne!(status, StepStatus::Running);
        Self {
            id,
            action_id,
            messages: vec![message.into()],
            status,
            started_at: None,
            finished_at: Some(now),
        }
    }
}

/// ステップ更新（フラグ形式）
///
/// リンク型ホストが受け付ける形式。[`StepUpdate`] から変換して作る。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagStepUpdate {
    pub id:              StepId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id:       Option<ActionId>,
    pub action_messages: Vec<String>,
    pub pending:         bool,
    pub running:         bool,
    pub finished:        bool,
    pub error:           bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at:      Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at:     Option<DateTime<Utc>>,
}

impl From<&StepUpdate> for FlagStepUpdate {
    fn from(update: &StepUpdate) -> Self {
        let (running, finished, error) = match update.status {
            StepStatus::Running => (true, false, false),
            StepStatus::Success => (false, true, false),
            StepStatus::Error => (false, true, true),
        };

        Self {
            id: update.id.clone(),
            action_id: update.action_id.clone(),
            action_messages: update.messages.clone(),
            pending: false,
            running,
            finished,
            error,
            started_at: update.started_at,
            finished_at: update.finished_at,
        }
    }
}

/// ステップメッセージの文面
pub mod step_message {
    use std::fmt::Display;

    /// SMTP サーバーへの認証開始
    pub fn authenticating(server_address: &str) -> String {
        format!("Authenticate on SMTP Server: {server_address}")
    }

    /// メール送信失敗
    pub fn send_failed(error: impl Display) -> String {
        format!("Failed to send email: {error}")
    }

    /// メール送信成功
    pub fn sent(recipients: &str) -> String {
        format!("Email sent to {recipients}")
    }
}

/// 実行ステップ API の接続先
///
/// ステップ更新の送信先 URL と認証キー。
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionApi {
    pub url:     String,
    pub api_key: String,
}

impl std::fmt::Debug for ExecutionApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionApi")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// ホストがリクエストごとに渡す設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub execution_api: ExecutionApi,
}

/// 実行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution {
    pub id: ExecutionId,
}

/// ステップに紐づくアクション
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepAction {
    #[serde(default)]
    pub id:     Option<ActionId>,
    #[serde(default)]
    pub params: Vec<ActionParam>,
}

/// 実行ステップ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub id:     StepId,
    pub action: StepAction,
}

/// タスク実行リクエスト（RPC `ExecuteTask`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteTaskRequest {
    pub config:    RunnerConfig,
    pub execution: Execution,
    pub step:      ExecutionStep,
}

/// アラート処理リクエスト（RPC `HandleAlert`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertHandlerRequest {
    pub config:  RunnerConfig,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// RPC のレスポンス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PluginResponse {
    pub success: bool,
}

impl PluginResponse {
    pub fn success() -> Self {
        Self { success: true }
    }

    pub fn failure() -> Self {
        Self { success: false }
    }
}
