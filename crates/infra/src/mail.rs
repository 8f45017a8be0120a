//! # メール送信
//!
//! SMTP によるメール送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `MailSender` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（lettre）、Noop（ログ出力のみ）
//! - **環境変数切替**: `MAIL_BACKEND` でランタイム選択
//! - **接続先はリクエストごと**: SMTP ホスト・認証情報はステップのパラメータで渡されるため、
//!   トランスポートは送信のたびに組み立てる

mod noop;
mod smtp;

use async_trait::async_trait;
use mailflow_domain::{MailError, action::MailSettings};
pub use noop::NoopMailSender;
pub use smtp::{SmtpMailSender, SmtpTlsMode, SmtpTransportOptions};

/// メール送信トレイト
#[async_trait]
pub trait MailSender: Send + Sync {
    /// `settings` の SMTP サーバーに接続し、`settings.message` を送信する
    async fn send_mail(&self, settings: &MailSettings) -> Result<(), MailError>;
}
