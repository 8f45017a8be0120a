//! Noop メール送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! ホスト側の結合確認や送信を止めたい環境で使用する。

use async_trait::async_trait;
use mailflow_domain::{MailError, action::MailSettings};

use super::MailSender;

/// Noop メール送信（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NoopMailSender;

#[async_trait]
impl MailSender for NoopMailSender {
    async fn send_mail(&self, settings: &MailSettings) -> Result<(), MailError> {
        tracing::info!(
            server = %settings.server_address(),
            from = %settings.from,
            to = %settings.recipients_display(),
            "Noop: メール送信をスキップ"
        );
        Ok(())
    }
}
