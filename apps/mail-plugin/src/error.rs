//! # プラグイン RPC エラー定義
//!
//! RPC ハンドラで発生するエラーと、HTTP レスポンス（RFC 9457 Problem Details）への変換を定義する。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mailflow_infra::InfraError;
use mailflow_shared::ErrorResponse;
use thiserror::Error;

use crate::usecase::MailActionError;

/// RPC で発生するエラー
#[derive(Debug, Error)]
pub enum PluginError {
    /// 未実装の RPC
    #[error("not implemented")]
    NotImplemented,

    /// リクエストボディが不正
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// ホストへのステップ更新に失敗
    #[error("ステップの更新に失敗しました: {0}")]
    StepUpdate(#[source] InfraError),
}

impl From<MailActionError> for PluginError {
    fn from(err: MailActionError) -> Self {
        match err {
            MailActionError::StepUpdate(e) => Self::StepUpdate(e),
        }
    }
}

impl IntoResponse for PluginError {
    fn into_response(self) -> Response {
        let body = match &self {
            PluginError::NotImplemented => ErrorResponse::not_implemented("not implemented"),
            PluginError::BadRequest(msg) => ErrorResponse::bad_request(msg.clone()),
            PluginError::StepUpdate(e) => {
                tracing::error!(error = %e, "ステップ更新エラー");
                ErrorResponse::bad_gateway(self.to_string())
            }
        };

        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}
