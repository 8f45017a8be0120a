//! # メールアクション
//!
//! 1 ステップ分のメール送信を実行し、進捗をホストへ報告する。
//!
//! ## フロー
//!
//! ```text
//! running 報告 ──失敗──→ StepUpdate エラー（メールは送らない）
//!     │
//!     ▼
//! メール送信 ──失敗──→ error 報告 ──→ SendFailed
//!     │
//!     ▼
//! success 報告 ──→ Sent
//! ```
//!
//! 送信失敗はホストへ報告済みの「業務上の失敗」であり、呼び出し元へはエラーではなく
//! [`MailOutcome::SendFailed`] として返す。ステップ更新の失敗だけが [`MailActionError`] になる。

use std::sync::Arc;

use mailflow_domain::{
    MailError,
    action::{ActionParam, MailSettings},
    clock::Clock,
    execution::{
        ActionId,
        ExecuteTaskRequest,
        ExecutionApi,
        ExecutionId,
        StepId,
        StepStatus,
        StepUpdate,
        step_message,
    },
};
use mailflow_infra::{InfraError, mail::MailSender, step_reporter::StepReporter};
use mailflow_shared::{
    event_log::{error as error_log, event},
    log_business_event,
};
use thiserror::Error;

/// メールアクションの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailOutcome {
    /// 送信し、success を報告した
    Sent,
    /// 送信に失敗し、error を報告した
    SendFailed(MailError),
}

/// メールアクションのエラー
#[derive(Debug, Error)]
pub enum MailActionError {
    /// ホストへのステップ更新に失敗した
    #[error("ステップの更新に失敗しました: {0}")]
    StepUpdate(#[from] InfraError),
}

/// 報告先のステップ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTarget {
    pub api:          ExecutionApi,
    pub execution_id: ExecutionId,
    pub step_id:      StepId,
    pub action_id:    Option<ActionId>,
}

impl From<&ExecuteTaskRequest> for StepTarget {
    fn from(request: &ExecuteTaskRequest) -> Self {
        Self {
            api:          request.config.execution_api.clone(),
            execution_id: request.execution.id.clone(),
            step_id:      request.step.id.clone(),
            action_id:    request.step.action.id.clone(),
        }
    }
}

/// メールアクションのユースケース
pub struct MailActionUseCase {
    sender:   Arc<dyn MailSender>,
    reporter: Arc<dyn StepReporter>,
    clock:    Arc<dyn Clock>,
}

impl MailActionUseCase {
    pub fn new(
        sender: Arc<dyn MailSender>,
        reporter: Arc<dyn StepReporter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sender,
            reporter,
            clock,
        }
    }

    /// メールを送信し、ステップの進捗を報告する
    #[tracing::instrument(
        skip_all,
        fields(execution_id = %target.execution_id, step_id = %target.step_id)
    )]
    pub async fn run(
        &self,
        target: &StepTarget,
        params: &[ActionParam],
    ) -> Result<MailOutcome, MailActionError> {
        let settings = MailSettings::from_params(params);
        tracing::debug!(?settings, "メールアクションを開始");

        self.report(
            target,
            StepUpdate::running(
                target.step_id.clone(),
                target.action_id.clone(),
                step_message::authenticating(&settings.server_address()),
                self.clock.now(),
            ),
        )
        .await?;

        match self.sender.send_mail(&settings).await {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::MAIL,
                    event.action = event::action::MAIL_SENT,
                    event.entity_type = event::entity_type::EXECUTION_STEP,
                    event.entity_id = %target.step_id,
                    event.result = event::result::SUCCESS,
                    mail.server = %settings.server_address(),
                    mail.recipients = %settings.recipients_display(),
                    "メール送信成功"
                );
                self.report(
                    target,
                    StepUpdate::finished(
                        target.step_id.clone(),
                        target.action_id.clone(),
                        StepStatus::Success,
                        step_message::sent(&settings.recipients_display()),
                        self.clock.now(),
                    ),
                )
                .await?;
                Ok(MailOutcome::Sent)
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::MAIL,
                    event.action = event::action::MAIL_FAILED,
                    event.entity_type = event::entity_type::EXECUTION_STEP,
                    event.entity_id = %target.step_id,
                    event.result = event::result::FAILURE,
                    mail.server = %settings.server_address(),
                    error.category = error_log::category::EXTERNAL_SERVICE,
                    error.kind = error_log::kind::SMTP,
                    error = %e,
                    "メール送信失敗"
                );
                self.report(
                    target,
                    StepUpdate::finished(
                        target.step_id.clone(),
                        target.action_id.clone(),
                        StepStatus::Error,
                        step_message::send_failed(&e),
                        self.clock.now(),
                    ),
                )
                .await?;
                Ok(MailOutcome::SendFailed(e))
            }
        }
    }

    async fn report(&self, target: &StepTarget, update: StepUpdate) -> Result<(), InfraError> {
        let status = update.status;
        self.reporter
            .update_step(&target.api, &target.execution_id, &update)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error.category = error_log::category::EXTERNAL_SERVICE,
                    error.kind = error_log::kind::STEP_UPDATE,
                    %status,
                    error = %e,
                    "ステップの更新に失敗"
                );
            })?;

        tracing::debug!(
            event.category = event::category::EXECUTION,
            event.action = event::action::STEP_UPDATED,
            %status,
            "ステップを更新"
        );
        Ok(())
    }
}
