//! # プラグイン RPC ハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /plugin/info` - プラグイン情報
//! - `POST /plugin/execute-task` - メールアクションの実行
//! - `POST /plugin/handle-alert` - アラート処理（未実装、常に 501）
//!
//! `execute-task` はメール送信の失敗を `{"success": false}` として 200 で返す。
//! ホストへのステップ更新に失敗した場合のみ 502 を返す。

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use mailflow_domain::{
    execution::{AlertHandlerRequest, ExecuteTaskRequest, PluginResponse},
    plugin::PluginInfo,
};
use mailflow_shared::ApiResponse;

use crate::{
    error::PluginError,
    usecase::{MailActionUseCase, MailOutcome, StepTarget},
};

/// プラグインハンドラーの State
pub struct PluginState {
    pub usecase: MailActionUseCase,
    pub info:    PluginInfo,
}

/// プラグイン情報を返す
pub async fn get_info(State(state): State<Arc<PluginState>>) -> Json<ApiResponse<PluginInfo>> {
    Json(ApiResponse::new(state.info.clone()))
}

/// メールアクションを実行する
pub async fn execute_task(
    State(state): State<Arc<PluginState>>,
    payload: Result<Json<ExecuteTaskRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PluginResponse>>, PluginError> {
    let Json(request) = payload.map_err(|e| PluginError::BadRequest(e.body_text()))?;

    let target = StepTarget::from(&request);
    let response = match state.usecase.run(&target, &request.step.action.params).await? {
        MailOutcome::Sent => PluginResponse::success(),
        MailOutcome::SendFailed(_) => PluginResponse::failure(),
    };

    Ok(Json(ApiResponse::new(response)))
}

/// アラート処理（未実装）
pub async fn handle_alert(
    payload: Result<Json<AlertHandlerRequest>, JsonRejection>,
) -> PluginError {
    if let Ok(Json(request)) = payload {
        tracing::debug!(runner = %request.config.execution_api.url, "HandleAlert は未実装");
    }
    PluginError::NotImplemented
}
