//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! mailflow-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mailflow_domain::{
    MailError,
    action::MailSettings,
    execution::{ExecutionApi, ExecutionId, StepUpdate},
};

use crate::{error::InfraError, mail::MailSender, step_reporter::StepReporter};

// ===== MockMailSender =====

/// 送信内容を記録するメール送信モック
///
/// [`fail_with`](MockMailSender::fail_with) を呼ぶと以降の送信はすべて失敗する。
#[derive(Clone, Default)]
pub struct MockMailSender {
    sent:    Arc<Mutex<Vec<MailSettings>>>,
    failure: Arc<Mutex<Option<MailError>>>,
}

impl MockMailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以降の送信を指定したエラーで失敗させる
    pub fn fail_with(&self, error: MailError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    /// 送信を試みた設定の一覧
    pub fn sent_mails(&self) -> Vec<MailSettings> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSender for MockMailSender {
    async fn send_mail(&self, settings: &MailSettings) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(settings.clone());
        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

// ===== MockStepReporter =====

/// 記録されたステップ更新
#[derive(Debug, Clone)]
pub struct RecordedStepUpdate {
    pub api:          ExecutionApi,
    pub execution_id: ExecutionId,
    pub update:       StepUpdate,
}

/// ステップ更新を記録するモック
///
/// [`fail_on_call`](MockStepReporter::fail_on_call) で n 回目（1 始まり）の呼び出しを失敗させられる。
/// 失敗した呼び出しは記録しない。
#[derive(Clone, Default)]
pub struct MockStepReporter {
    updates:      Arc<Mutex<Vec<RecordedStepUpdate>>>,
    calls:        Arc<Mutex<usize>>,
    fail_on_call: Arc<Mutex<Option<usize>>>,
}

impl MockStepReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// n 回目の呼び出しを失敗させる
    pub fn fail_on_call(&self, n: usize) {
        *self.fail_on_call.lock().unwrap() = Some(n);
    }

    /// 成功した更新の一覧
    pub fn updates(&self) -> Vec<RecordedStepUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl StepReporter for MockStepReporter {
    async fn update_step(
        &self,
        api: &ExecutionApi,
        execution_id: &ExecutionId,
        update: &StepUpdate,
    ) -> Result<(), InfraError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };

        if *self.fail_on_call.lock().unwrap() == Some(call) {
            return Err(InfraError::unexpected_status(503, "mock failure"));
        }

        self.updates.lock().unwrap().push(RecordedStepUpdate {
            api:          api.clone(),
            execution_id: execution_id.clone(),
            update:       update.clone(),
        });
        Ok(())
    }
}
