//! # プラグイン記述子
//!
//! ホストがプラグインを発見・表示するためのメタデータと、
//! リンク型（インプロセス登録）プラグインのインターフェースを定義する。
//!
//! ## 2 つのホスト形態
//!
//! | 形態 | メタデータ | 実行 |
//! |------|-----------|------|
//! | RPC 型 | [`PluginInfo`] | `ExecuteTask` RPC（[`crate::execution::ExecuteTaskRequest`]） |
//! | リンク型 | [`PluginManifest`] + [`LinkedActionDetails`] | [`ActionPlugin::execute`] |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::execution::{Execution, ExecutionStep, StepAction};

/// プラグイン種別
pub mod plugin_type {
    pub const ACTION: &str = "action";
}

/// パラメータ入力欄の種別
pub mod param_type {
    pub const TEXT: &str = "text";
    pub const PASSWORD: &str = "password";
    pub const NUMBER: &str = "number";
    pub const TEXTAREA: &str = "textarea";
}

/// アクションパラメータの定義
///
/// ホストの UI がフォームを描画するために使う。
/// `default` はホストによって文字列または数値を期待するため JSON 値で持つ。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDefinition {
    pub key:         String,
    #[serde(rename = "type")]
    pub param_type:  String,
    pub default:     Value,
    pub required:    bool,
    pub description: String,
}

/// アクションの定義（RPC 型）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name:        String,
    pub description: String,
    pub plugin:      String,
    pub icon:        String,
    pub category:    String,
    pub params:      Vec<ParamDefinition>,
}

/// プラグイン情報（RPC `Info`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name:        String,
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub version:     String,
    pub author:      String,
    pub actions:     ActionDefinition,
    #[serde(default)]
    pub endpoints:   Map<String, Value>,
}

/// プラグインマニフェスト（リンク型 `Init`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    pub name:        String,
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub version:     String,
    pub creator:     String,
}

/// アクション詳細（リンク型 `Details`）
///
/// `params` はホストがそのまま保存する JSON 配列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedActionDetails {
    pub id:          String,
    pub name:        String,
    pub description: String,
    pub icon:        String,
    #[serde(rename = "type")]
    pub action_type: String,
    pub category:    String,
    pub params:      Value,
}

/// リンク型プラグインの実行コンテキスト
///
/// ホストが実行中のフロー・ペイロード・ステップ一覧ごと渡してくる。
/// メールアクションが参照するのは `execution`・`step`・`action` のみ。
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub execution: Execution,
    pub flow:      Value,
    pub payload:   Value,
    pub steps:     Vec<ExecutionStep>,
    pub step:      ExecutionStep,
    pub action:    StepAction,
}

/// リンク型プラグインの実行結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOutcome {
    pub data:             Option<Map<String, Value>>,
    pub finished:         bool,
    pub canceled:         bool,
    pub no_pattern_match: bool,
    pub failed:           bool,
}

impl ActionOutcome {
    /// 正常終了
    pub fn finished() -> Self {
        Self {
            finished: true,
            ..Self::default()
        }
    }

    /// 失敗
    pub fn failed() -> Self {
        Self {
            failed: true,
            ..Self::default()
        }
    }
}

/// リンク型プラグインのインターフェース
///
/// ホストのプロセス内に登録され、ステップごとに `execute` が呼ばれる。
/// 失敗はエラーではなく [`ActionOutcome::failed`] で返す。
#[async_trait]
pub trait ActionPlugin: Send + Sync {
    /// プラグインのマニフェストを返す
    fn manifest(&self) -> PluginManifest;

    /// 提供するアクションの詳細を返す
    fn details(&self) -> LinkedActionDetails;

    /// アクションを実行する
    async fn execute(&self, ctx: ActionContext) -> ActionOutcome;
}
