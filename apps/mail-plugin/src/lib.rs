//! # Mailflow メールプラグイン
//!
//! ワークフロー実行ホストから呼ばれ、アクションパラメータに従って SMTP でメールを送信し、
//! ステップの進捗をホストの実行ステップ API に報告するアクションプラグイン。
//!
//! ## ホスト形態
//!
//! - **RPC 型**: ホストが子プロセスとして起動し、HTTP/JSON の RPC で呼び出す（[`build_router`]）
//! - **リンク型**: ホストのプロセス内に登録する（[`linked::EmailPlugin`]）
//!
//! どちらも [`usecase::MailActionUseCase`] を共有する。
//!
//! ## RPC エンドポイント
//!
//! | メソッド | パス | 内容 |
//! |---------|------|------|
//! | GET | `/health` | ヘルスチェック |
//! | GET | `/plugin/info` | プラグイン情報 |
//! | POST | `/plugin/execute-task` | メールアクションの実行 |
//! | POST | `/plugin/handle-alert` | アラート処理（未実装） |

pub mod config;
pub mod error;
pub mod handler;
pub mod handshake;
pub mod linked;
pub mod plugin_info;
pub mod usecase;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use config::{ExecutionApiClientConfig, MailBackend, MailConfig};
use handler::{PluginState, execute_task, get_info, handle_alert, health_check};
use mailflow_domain::clock::SystemClock;
use mailflow_infra::{
    InfraError,
    mail::{MailSender, NoopMailSender, SmtpMailSender},
    step_reporter::{HttpStepReporter, StepWireFormat},
};
use tower_http::trace::TraceLayer;
use usecase::MailActionUseCase;

/// RPC ルーターを構築する
pub fn build_router(state: Arc<PluginState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/plugin/info", get(get_info))
        .route("/plugin/execute-task", post(execute_task))
        .route("/plugin/handle-alert", post(handle_alert))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// 設定から本番用の依存コンポーネントを組み立ててユースケースを作る
///
/// RPC 型は [`StepWireFormat::Status`]、リンク型は [`StepWireFormat::Flags`] を渡す。
pub fn build_usecase(
    mail: &MailConfig,
    execution_api: &ExecutionApiClientConfig,
    format: StepWireFormat,
) -> Result<MailActionUseCase, InfraError> {
    let sender: Arc<dyn MailSender> = match mail.backend {
        MailBackend::Smtp => Arc::new(SmtpMailSender::new(mail.smtp)),
        MailBackend::Noop => Arc::new(NoopMailSender),
    };
    let reporter = HttpStepReporter::new(format, execution_api.timeout)?;

    Ok(MailActionUseCase::new(
        sender,
        Arc::new(reporter),
        Arc::new(SystemClock),
    ))
}
