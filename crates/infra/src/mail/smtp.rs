//! SMTP メール送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//!
//! `Message` パラメータはヘッダーを含む完成済みのメッセージとして扱い、
//! 加工せずに DATA として送る（改行コードのみ CRLF に正規化する）。
//! エンベロープの送信元は `From`、宛先は `To` から組み立てる。
//!
//! 認証情報は暗号化された接続か、ループバックのホストにしか送らない。
//! `opportunistic` では STARTTLS 必須に切り替え、`none` では接続前に失敗させる。

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    Address,
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    address::Envelope,
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        client::{Tls, TlsParameters},
    },
};
use mailflow_domain::{MailError, action::MailSettings};

use super::MailSender;

/// SMTP 接続の TLS モード
///
/// `SMTP_TLS_MODE` 環境変数で指定する。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum SmtpTlsMode {
    /// サーバーが STARTTLS を提示した場合のみ TLS に切り替える
    #[default]
    Opportunistic,
    /// STARTTLS 必須（提示されなければ送信失敗）
    Required,
    /// 接続直後から TLS（SMTPS、通常ポート 465）
    Wrapper,
    /// TLS を使用しない
    None,
}

/// SMTP トランスポートの共通設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmtpTransportOptions {
    pub tls_mode: SmtpTlsMode,
    pub timeout:  Duration,
}

impl Default for SmtpTransportOptions {
    fn default() -> Self {
        Self {
            tls_mode: SmtpTlsMode::default(),
            timeout:  Duration::from_secs(30),
        }
    }
}

/// 平文の接続でも認証してよいホスト
const PLAINTEXT_AUTH_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

/// SMTP メール送信
///
/// 接続先はリクエストごとに異なるため、`send_mail` のたびに
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` を組み立てる。
#[derive(Debug, Clone, Default)]
pub struct SmtpMailSender {
    options: SmtpTransportOptions,
}

impl SmtpMailSender {
    pub fn new(options: SmtpTransportOptions) -> Self {
        Self { options }
    }

    /// 認証情報の有無と接続先から実際に使う TLS モードを決める
    fn effective_tls_mode(&self, settings: &MailSettings) -> Result<SmtpTlsMode, MailError> {
        let mode = self.options.tls_mode;
        if !settings.has_credentials()
            || PLAINTEXT_AUTH_HOSTS.contains(&settings.smtp_host.as_str())
        {
            return Ok(mode);
        }

        match mode {
            SmtpTlsMode::Opportunistic => {
                tracing::debug!(
                    server = %settings.server_address(),
                    "認証情報があるため STARTTLS を必須にする"
                );
                Ok(SmtpTlsMode::Required)
            }
            SmtpTlsMode::None => Err(MailError::Transport(
                "unencrypted connection".to_string(),
            )),
            SmtpTlsMode::Required | SmtpTlsMode::Wrapper => Ok(mode),
        }
    }

    fn build_transport(
        &self,
        settings: &MailSettings,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let tls = match self.effective_tls_mode(settings)? {
            SmtpTlsMode::None => Tls::None,
            mode => {
                let params = TlsParameters::new(settings.smtp_host.clone())
                    .map_err(|e| MailError::Transport(e.to_string()))?;
                match mode {
                    SmtpTlsMode::Required => Tls::Required(params),
                    SmtpTlsMode::Wrapper => Tls::Wrapper(params),
                    _ => Tls::Opportunistic(params),
                }
            }
        };

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(settings.smtp_host.as_str())
                .port(settings.smtp_port)
                .tls(tls)
                .timeout(Some(self.options.timeout));

        if settings.has_credentials() {
            builder = builder
                .credentials(Credentials::new(
                    settings.from.clone(),
                    settings.password.clone(),
                ))
                .authentication(vec![Mechanism::Plain, Mechanism::Login]);
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl MailSender for SmtpMailSender {
    async fn send_mail(&self, settings: &MailSettings) -> Result<(), MailError> {
        let envelope = build_envelope(settings)?;
        let transport = self.build_transport(settings)?;
        let body = normalize_line_endings(&settings.message);

        transport
            .send_raw(&envelope, &body)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::debug!(
            server = %settings.server_address(),
            recipients = settings.to.len(),
            "SMTP 送信完了"
        );

        Ok(())
    }
}

/// 送信元と宛先から SMTP エンベロープを組み立てる
fn build_envelope(settings: &MailSettings) -> Result<Envelope, MailError> {
    let from = parse_address(&settings.from)?;

    if settings.to.is_empty() {
        return Err(MailError::NoRecipients);
    }

    let recipients = settings
        .to
        .iter()
        .map(|to| parse_address(to))
        .collect::<Result<Vec<_>, _>>()?;

    Envelope::new(Some(from), recipients).map_err(|e| MailError::Transport(e.to_string()))
}

fn parse_address(value: &str) -> Result<Address, MailError> {
    value
        .parse::<Address>()
        .map_err(|e| MailError::InvalidAddress(format!("'{value}': {e}")))
}

/// 単独の LF / CR を CRLF に揃える
fn normalize_line_endings(message: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + 16);
    let mut chars = message.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.extend_from_slice(b"\r\n");
            }
            '\n' => out.extend_from_slice(b"\r\n"),
            other => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    out
}
