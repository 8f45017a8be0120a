//! # プラグインメタデータ
//!
//! ホストがプラグインの発見・フォーム描画に使う記述子を組み立てる。
//! パラメータ表は両ホスト形態で共通で、`SmtpPort` のデフォルト値の型だけが異なる
//! （RPC 型は文字列 `"587"`、リンク型は数値 `587`）。

use mailflow_domain::{
    action::param_key,
    plugin::{
        ActionDefinition,
        LinkedActionDetails,
        ParamDefinition,
        PluginInfo,
        PluginManifest,
        param_type,
        plugin_type,
    },
};
use serde_json::{Map, Value, json};

const AUTHOR: &str = "JustNZ";
const ICON: &str = "solar:mailbox-linear";
const CATEGORY: &str = "Utility";

fn param(
    key: &str,
    param_type: &str,
    default: Value,
    required: bool,
    description: &str,
) -> ParamDefinition {
    ParamDefinition {
        key:         key.to_string(),
        param_type:  param_type.to_string(),
        default,
        required,
        description: description.to_string(),
    }
}

/// メールアクションのパラメータ表
fn mail_params(smtp_port_default: Value) -> Vec<ParamDefinition> {
    vec![
        param(
            param_key::FROM,
            param_type::TEXT,
            json!("from@mail.com"),
            true,
            "Sender email address",
        ),
        param(
            param_key::PASSWORD,
            param_type::PASSWORD,
            json!("***"),
            false,
            "Sender email password",
        ),
        param(
            param_key::TO,
            param_type::TEXT,
            json!("to@mail.com"),
            false,
            "Recipient email address. Multiple emails can be separated by comma",
        ),
        param(
            param_key::SMTP_HOST,
            param_type::TEXT,
            json!("smtp.mail.com"),
            true,
            "SMTP server host",
        ),
        param(
            param_key::SMTP_PORT,
            param_type::NUMBER,
            smtp_port_default,
            true,
            "SMTP server port",
        ),
        param(
            param_key::MESSAGE,
            param_type::TEXTAREA,
            json!("Email message"),
            true,
            "Email message",
        ),
    ]
}

/// RPC 型ホスト向けのプラグイン情報
pub fn rpc_plugin_info() -> PluginInfo {
    PluginInfo {
        name:        "Mail".to_string(),
        plugin_type: plugin_type::ACTION.to_string(),
        version:     "1.1.1".to_string(),
        author:      AUTHOR.to_string(),
        actions:     ActionDefinition {
            name:        "Mail".to_string(),
            description: "Send an email".to_string(),
            plugin:      "mail".to_string(),
            icon:        ICON.to_string(),
            category:    CATEGORY.to_string(),
            params:      mail_params(json!("587")),
        },
        endpoints:   Map::new(),
    }
}

/// リンク型ホスト向けのマニフェスト
pub fn linked_manifest() -> PluginManifest {
    PluginManifest {
        name:        "Email".to_string(),
        plugin_type: plugin_type::ACTION.to_string(),
        version:     "1.0.1".to_string(),
        creator:     AUTHOR.to_string(),
    }
}

/// リンク型ホスト向けのアクション詳細
pub fn linked_details() -> LinkedActionDetails {
    LinkedActionDetails {
        id:          "mail".to_string(),
        name:        "Mail".to_string(),
        description: "Sends an email".to_string(),
        icon:        ICON.to_string(),
        action_type: "mail".to_string(),
        category:    CATEGORY.to_string(),
        params:      serde_json::to_value(mail_params(json!(587))).unwrap_or(Value::Null),
    }
}
