//! # リンク型プラグイン
//!
//! ホストのプロセス内に直接登録して使う形態。
//! ホストは起動時に [`ActionPluginRegistry`] へプラグインを登録し、
//! ステップごとにアクション ID でプラグインを引いて [`ActionPlugin::execute`] を呼ぶ。
//!
//! ステップ更新はフラグ形式（[`mailflow_domain::execution::FlagStepUpdate`]）で送る。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use mailflow_domain::{
    execution::ExecutionApi,
    plugin::{ActionContext, ActionOutcome, ActionPlugin, LinkedActionDetails, PluginManifest},
};

use crate::{
    plugin_info,
    usecase::{MailActionUseCase, MailOutcome, StepTarget},
};

/// メール送信アクション（リンク型）
pub struct EmailPlugin {
    usecase:       MailActionUseCase,
    execution_api: ExecutionApi,
}

impl EmailPlugin {
    /// # 引数
    ///
    /// - `usecase`: フラグ形式の `StepReporter` で組み立てたユースケース
    /// - `execution_api`: ホストの実行ステップ API
    pub fn new(usecase: MailActionUseCase, execution_api: ExecutionApi) -> Self {
        Self {
            usecase,
            execution_api,
        }
    }
}

#[async_trait]
impl ActionPlugin for EmailPlugin {
    fn manifest(&self) -> PluginManifest {
        plugin_info::linked_manifest()
    }

    fn details(&self) -> LinkedActionDetails {
        plugin_info::linked_details()
    }

    async fn execute(&self, ctx: ActionContext) -> ActionOutcome {
        let target = StepTarget {
            api:          self.execution_api.clone(),
            execution_id: ctx.execution.id,
            step_id:      ctx.step.id,
            action_id:    ctx.action.id,
        };

        match self.usecase.run(&target, &ctx.action.params).await {
            Ok(MailOutcome::Sent) => ActionOutcome::finished(),
            Ok(MailOutcome::SendFailed(_)) => ActionOutcome::failed(),
            Err(e) => {
                tracing::error!(error = %e, "メールアクションの実行に失敗");
                ActionOutcome::failed()
            }
        }
    }
}

/// リンク型プラグインのレジストリ
///
/// アクション ID（[`LinkedActionDetails::id`]）をキーに保持する。
#[derive(Default)]
pub struct ActionPluginRegistry {
    plugins: HashMap<String, Arc<dyn ActionPlugin>>,
}

impl ActionPluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// プラグインを登録する（同じアクション ID は上書き）
    pub fn register(&mut self, plugin: Arc<dyn ActionPlugin>) {
        let manifest = plugin.manifest();
        let details = plugin.details();
        tracing::info!(
            plugin = %manifest.name,
            version = %manifest.version,
            action = %details.id,
            "プラグインを登録"
        );
        self.plugins.insert(details.id, plugin);
    }

    /// アクション ID でプラグインを取得する
    pub fn get(&self, action_id: &str) -> Option<Arc<dyn ActionPlugin>> {
        self.plugins.get(action_id).cloned()
    }

    /// 登録済みアクションの詳細一覧（ID 順）
    pub fn list(&self) -> Vec<LinkedActionDetails> {
        let mut details: Vec<_> = self.plugins.values().map(|p| p.details()).collect();
        details.sort_by(|a, b| a.id.cmp(&b.id));
        details
    }
}
