//! # アクションパラメータ
//!
//! ワークフローのステップに設定されたキー/値パラメータと、
//! そこから組み立てるメール送信設定を定義する。
//!
//! ## パラメータ一覧
//!
//! | キー | 内容 |
//! |------|------|
//! | `From` | 送信元メールアドレス（SMTP 認証ユーザーを兼ねる） |
//! | `Password` | SMTP 認証パスワード |
//! | `To` | 宛先。カンマ区切りで複数指定可 |
//! | `SmtpHost` | SMTP サーバーのホスト名 |
//! | `SmtpPort` | SMTP サーバーのポート番号 |
//! | `Message` | 送信するメッセージ本体（ヘッダーを含めてもよい） |
//!
//! キーは大文字小文字を区別して完全一致で照合する。未知のキーは無視する。

use std::fmt;

use serde::{Deserialize, Serialize};

/// パラメータキー
pub mod param_key {
    pub const FROM: &str = "From";
    pub const PASSWORD: &str = "Password";
    pub const TO: &str = "To";
    pub const SMTP_HOST: &str = "SmtpHost";
    pub const SMTP_PORT: &str = "SmtpPort";
    pub const MESSAGE: &str = "Message";
}

/// ステップのアクションに設定された 1 件のパラメータ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParam {
    pub key:   String,
    pub value: String,
}

impl ActionParam {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key:   key.into(),
            value: value.into(),
        }
    }
}

/// メール送信設定
///
/// [`MailSettings::from_params`] でアクションパラメータから組み立てる。
/// 解析は失敗しない。欠けたキーは空文字列（ポートは 0）になり、
/// 送信時のエラーとしてステップに報告される。
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MailSettings {
    pub from:      String,
    pub password:  String,
    pub to:        Vec<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub message:   String,
}

impl MailSettings {
    /// アクションパラメータからメール送信設定を組み立てる
    ///
    /// 同じキーが複数ある場合は後のものが優先される。
    /// `To` はカンマで分割し、前後の空白を除去して空要素を捨てる。
    /// `SmtpPort` が数値として解釈できない場合（前後の空白を含む場合も）は 0 とする。
    pub fn from_params(params: &[ActionParam]) -> Self {
        let mut settings = Self::default();

        for param in params {
            match param.key.as_str() {
                param_key::FROM => settings.from = param.value.clone(),
                param_key::PASSWORD => settings.password = param.value.clone(),
                param_key::TO => settings.to = split_recipients(&param.value),
                param_key::SMTP_HOST => settings.smtp_host = param.value.clone(),
                param_key::SMTP_PORT => settings.smtp_port = param.value.parse().unwrap_or(0),
                param_key::MESSAGE => settings.message = param.value.clone(),
                _ => {}
            }
        }

        settings
    }

    /// `host:port` 形式の接続先
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.smtp_host, self.smtp_port)
    }

    /// ステップメッセージ用の宛先一覧（`", "` 区切り）
    pub fn recipients_display(&self) -> String {
        self.to.join(", ")
    }

    /// SMTP 認証を行うかどうか
    ///
    /// パスワードが空の場合は認証なしで送信する。
    pub fn has_credentials(&self) -> bool {
        !self.password.is_empty()
    }
}

// パスワードをログに出さない
impl fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailSettings")
            .field("from", &self.from)
            .field("password", &"[REDACTED]")
            .field("to", &self.to)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("message_len", &self.message.len())
            .finish()
    }
}

fn split_recipients(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn full_params() -> Vec<ActionParam> {
        vec![
            ActionParam::new("From", "alerts@example.com"),
            ActionParam::new("Password", "s3cret"),
            ActionParam::new("To", "ops@example.com,dev@example.com"),
            ActionParam::new("SmtpHost", "smtp.example.com"),
            ActionParam::new("SmtpPort", "587"),
            ActionParam::new("Message", "Subject: Alert\r\n\r\nDisk full"),
        ]
    }

    #[test]
    fn 全パラメータを読み取る() {
        let settings = MailSettings::from_params(&full_params());

        assert_eq!(
            settings,
            MailSettings {
                from:      "alerts@example.com".to_string(),
                password:  "s3cret".to_string(),
                to:        vec!["ops@example.com".to_string(), "dev@example.com".to_string()],
                smtp_host: "smtp.example.com".to_string(),
                smtp_port: 587,
                message:   "Subject: Alert\r\n\r\nDisk full".to_string(),
            }
        );
    }

    #[test]
    fn パラメータが空の場合はデフォルト値になる() {
        let settings = MailSettings::from_params(&[]);

        assert_eq!(settings, MailSettings::default());
        assert_eq!(settings.server_address(), ":0");
        assert!(!settings.has_credentials());
    }

    #[test]
    fn 未知のキーと大文字小文字違いのキーは無視する() {
        let params = vec![
            ActionParam::new("from", "lower@example.com"),
            ActionParam::new("Subject", "ignored"),
            ActionParam::new("From", "real@example.com"),
        ];

        let settings = MailSettings::from_params(&params);

        assert_eq!(settings.from, "real@example.com");
    }

    #[test]
    fn 同じキーは後のものが優先される() {
        let params = vec![
            ActionParam::new("SmtpHost", "first.example.com"),
            ActionParam::new("SmtpHost", "second.example.com"),
        ];

        let settings = MailSettings::from_params(&params);

        assert_eq!(settings.smtp_host, "second.example.com");
    }

    #[rstest]
    #[case("587", 587)]
    #[case(" 25 ", 0)]
    #[case("25 ", 0)]
    #[case("465", 465)]
    #[case("abc", 0)]
    #[case("", 0)]
    #[case("70000", 0)]
    #[case("-1", 0)]
    fn smtp_portの解釈(#[case] input: &str, #[case] expected: u16) {
        let settings = MailSettings::from_params(&[ActionParam::new("SmtpPort", input)]);
        assert_eq!(settings.smtp_port, expected);
    }

    #[rstest]
    #[case("a@example.com", vec!["a@example.com"])]
    #[case("a@example.com, b@example.com", vec!["a@example.com", "b@example.com"])]
    #[case("a@example.com,,b@example.com,", vec!["a@example.com", "b@example.com"])]
    #[case("", vec![])]
    #[case(" , ", vec![])]
    fn toはカンマで分割される(#[case] input: &str, #[case] expected: Vec<&str>) {
        let settings = MailSettings::from_params(&[ActionParam::new("To", input)]);
        assert_eq!(settings.to, expected);
    }

    #[test]
    fn server_addressはホストとポートを連結する() {
        let settings = MailSettings::from_params(&full_params());
        assert_eq!(settings.server_address(), "smtp.example.com:587");
    }

    #[test]
    fn recipients_displayはカンマとスペースで連結する() {
        let settings = MailSettings::from_params(&full_params());
        assert_eq!(settings.recipients_display(), "ops@example.com, dev@example.com");
    }

    #[test]
    fn debug出力にパスワードを含めない() {
        let settings = MailSettings::from_params(&full_params());
        let debug = format!("{settings:?}");

        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
