//! # 実行ステップ API クライアント
//!
//! ホストの実行ステップ API にステップの進捗（running / success / error）を報告する。
//!
//! ## エンドポイント
//!
//! - `PUT {url}/api/v1/executions/{execution_id}/steps/{step_id}` - ステップ更新
//!
//! 認証は `Authorization` ヘッダーに API キーをそのまま載せる。
//! ボディの形式はホストの形態に合わせて [`StepWireFormat`] で選ぶ。

use std::time::Duration;

use async_trait::async_trait;
use mailflow_domain::execution::{ExecutionApi, ExecutionId, FlagStepUpdate, StepUpdate};

use crate::error::InfraError;

/// ステップ更新の報告トレイト
///
/// テスト時にモックを使用できるようトレイトで定義。
#[async_trait]
pub trait StepReporter: Send + Sync {
    /// ステップの状態を更新する
    ///
    /// # 引数
    ///
    /// - `api`: 実行ステップ API の接続先
    /// - `execution_id`: 対象の実行 ID
    /// - `update`: 更新内容
    async fn update_step(
        &self,
        api: &ExecutionApi,
        execution_id: &ExecutionId,
        update: &StepUpdate,
    ) -> Result<(), InfraError>;
}

/// ステップ更新ボディの形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepWireFormat {
    /// `status` フィールド形式（RPC 型ホスト）
    #[default]
    Status,
    /// `running` / `finished` / `error` フラグ形式（リンク型ホスト）
    Flags,
}

/// HTTP による実行ステップ API クライアント
#[derive(Clone)]
pub struct HttpStepReporter {
    client: reqwest::Client,
    format: StepWireFormat,
}

impl HttpStepReporter {
    /// 新しいクライアントを作成する
    ///
    /// # 引数
    ///
    /// - `format`: ボディの形式
    /// - `timeout`: リクエスト全体のタイムアウト
    pub fn new(format: StepWireFormat, timeout: Duration) -> Result<Self, InfraError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, format })
    }

    fn step_url(api: &ExecutionApi, execution_id: &ExecutionId, update: &StepUpdate) -> String {
        format!(
            "{}/api/v1/executions/{}/steps/{}",
            api.url.trim_end_matches('/'),
            execution_id,
            update.id
        )
    }
}

#[async_trait]
impl StepReporter for HttpStepReporter {
    #[tracing::instrument(
        skip_all,
        fields(execution_id = %execution_id, step_id = %update.id, status = %update.status)
    )]
    async fn update_step(
        &self,
        api: &ExecutionApi,
        execution_id: &ExecutionId,
        update: &StepUpdate,
    ) -> Result<(), InfraError> {
        let url = Self::step_url(api, execution_id, update);

        let body = match self.format {
            StepWireFormat::Status => serde_json::to_vec(update)?,
            StepWireFormat::Flags => serde_json::to_vec(&FlagStepUpdate::from(update))?,
        };

        let response = self
            .client
            .put(&url)
            .header(reqwest::header::AUTHORIZATION, &api.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                tracing::debug!("ステップを更新しました");
                Ok(())
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(InfraError::unexpected_status(status.as_u16(), body))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mailflow_domain::execution::StepId;

    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpStepReporter>();
    }

    #[test]
    fn step_urlは末尾スラッシュを除去して組み立てる() {
        let api = ExecutionApi {
            url:     "http://runner.local:8080/".to_string(),
            api_key: "key".to_string(),
        };
        let execution_id = ExecutionId::new();
        let update = StepUpdate::running(StepId::new(), None, "m", chrono::Utc::now());

        let url = HttpStepReporter::step_url(&api, &execution_id, &update);

        assert_eq!(
            url,
            format!(
                "http://runner.local:8080/api/v1/executions/{}/steps/{}",
                execution_id, update.id
            )
        );
    }
}
