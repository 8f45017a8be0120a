//! # プラグイン設定
//!
//! 環境変数からプラグインプロセスの設定を読み込む。
//!
//! ## 環境変数
//!
//! | 変数名 | デフォルト | 説明 |
//! |--------|-----------|------|
//! | `PLUGIN_MAGIC_COOKIE` | なし | ホストが設定するマジッククッキー |
//! | `PLUGIN_PROTOCOL_VERSIONS` | なし | ホストが対応するプロトコルバージョン（カンマ区切り） |
//! | `PLUGIN_MIN_PORT` / `PLUGIN_MAX_PORT` | なし | 待ち受けポートの範囲 |
//! | `MAIL_BACKEND` | `smtp` | `smtp` \| `noop` |
//! | `SMTP_TLS_MODE` | `opportunistic` | `opportunistic` \| `required` \| `wrapper` \| `none` |
//! | `SMTP_TIMEOUT_SECS` | `30` | SMTP 接続・送信のタイムアウト（秒） |
//! | `EXECUTION_API_TIMEOUT_SECS` | `10` | 実行ステップ API のタイムアウト（秒） |

use std::{env, str::FromStr, time::Duration};

use mailflow_infra::mail::{SmtpTlsMode, SmtpTransportOptions};
use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 値の形式が不正
    #[error("{key} の値が不正です: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    /// ポート範囲の下限が上限を超えている
    #[error("PLUGIN_MIN_PORT ({min}) が PLUGIN_MAX_PORT ({max}) を超えています")]
    InvalidPortRange { min: u16, max: u16 },
}

/// プラグインプロセスの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    pub handshake:     HandshakeConfig,
    pub mail:          MailConfig,
    pub execution_api: ExecutionApiClientConfig,
}

/// ホストとのハンドシェイク設定
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HandshakeConfig {
    /// `PLUGIN_MAGIC_COOKIE` の値
    pub magic_cookie:      Option<String>,
    /// `PLUGIN_PROTOCOL_VERSIONS` の値（未解釈）
    pub protocol_versions: Option<String>,
    /// 待ち受けポート範囲（未設定ならエフェメラルポート）
    pub port_range:        Option<PortRange>,
}

/// 待ち受けポート範囲（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub min: u16,
    pub max: u16,
}

/// メール送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum MailBackend {
    #[default]
    Smtp,
    Noop,
}

/// メール送信設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailConfig {
    pub backend: MailBackend,
    pub smtp:    SmtpTransportOptions,
}

/// 実行ステップ API クライアントの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionApiClientConfig {
    pub timeout: Duration,
}

impl PluginConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// テストではプロセス環境変数を書き換えずにここへ値を渡す。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port_range = match (
            parse_optional::<u16>(&lookup, "PLUGIN_MIN_PORT")?,
            parse_optional::<u16>(&lookup, "PLUGIN_MAX_PORT")?,
        ) {
            (Some(min), Some(max)) if min > max => {
                return Err(ConfigError::InvalidPortRange { min, max });
            }
            (Some(min), Some(max)) => Some(PortRange { min, max }),
            _ => None,
        };

        Ok(Self {
            handshake:     HandshakeConfig {
                magic_cookie:      lookup("PLUGIN_MAGIC_COOKIE"),
                protocol_versions: lookup("PLUGIN_PROTOCOL_VERSIONS"),
                port_range,
            },
            mail:          MailConfig {
                backend: parse_optional(&lookup, "MAIL_BACKEND")?.unwrap_or_default(),
                smtp:    SmtpTransportOptions {
                    tls_mode: parse_optional::<SmtpTlsMode>(&lookup, "SMTP_TLS_MODE")?
                        .unwrap_or_default(),
                    timeout:  Duration::from_secs(
                        parse_optional(&lookup, "SMTP_TIMEOUT_SECS")?.unwrap_or(30),
                    ),
                },
            },
            execution_api: ExecutionApiClientConfig {
                timeout: Duration::from_secs(
                    parse_optional(&lookup, "EXECUTION_API_TIMEOUT_SECS")?.unwrap_or(10),
                ),
            },
        })
    }
}

/// 値が設定されていればパースする（空文字は未設定扱い）
fn parse_optional<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<PluginConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PluginConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn 未設定の場合はデフォルト値を使う() {
        let config = load(&[]).unwrap();

        assert_eq!(config.handshake, HandshakeConfig::default());
        assert_eq!(config.mail.backend, MailBackend::Smtp);
        assert_eq!(config.mail.smtp.tls_mode, SmtpTlsMode::Opportunistic);
        assert_eq!(config.mail.smtp.timeout, Duration::from_secs(30));
        assert_eq!(config.execution_api.timeout, Duration::from_secs(10));
    }

    #[test]
    fn 全項目を読み込める() {
        let config = load(&[
            ("PLUGIN_MAGIC_COOKIE", "hello"),
            ("PLUGIN_PROTOCOL_VERSIONS", "1"),
            ("PLUGIN_MIN_PORT", "10000"),
            ("PLUGIN_MAX_PORT", "10010"),
            ("MAIL_BACKEND", "noop"),
            ("SMTP_TLS_MODE", "wrapper"),
            ("SMTP_TIMEOUT_SECS", "5"),
            ("EXECUTION_API_TIMEOUT_SECS", "3"),
        ])
        .unwrap();

        assert_eq!(config.handshake.magic_cookie.as_deref(), Some("hello"));
        assert_eq!(config.handshake.protocol_versions.as_deref(), Some("1"));
        assert_eq!(
            config.handshake.port_range,
            Some(PortRange {
                min: 10000,
                max: 10010,
            })
        );
        assert_eq!(config.mail.backend, MailBackend::Noop);
        assert_eq!(config.mail.smtp.tls_mode, SmtpTlsMode::Wrapper);
        assert_eq!(config.mail.smtp.timeout, Duration::from_secs(5));
        assert_eq!(config.execution_api.timeout, Duration::from_secs(3));
    }

    #[test]
    fn ポート範囲は両端が揃った場合のみ有効() {
        let config = load(&[("PLUGIN_MIN_PORT", "10000")]).unwrap();
        assert_eq!(config.handshake.port_range, None);
    }

    #[test]
    fn 下限が上限を超えるポート範囲はエラー() {
        let err = load(&[("PLUGIN_MIN_PORT", "20000"), ("PLUGIN_MAX_PORT", "10000")]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidPortRange {
                min: 20000,
                max: 10000,
            }
        );
    }

    #[rstest]
    #[case("SMTP_TIMEOUT_SECS", "thirty")]
    #[case("EXECUTION_API_TIMEOUT_SECS", "-1")]
    #[case("PLUGIN_MIN_PORT", "70000")]
    #[case("MAIL_BACKEND", "ses")]
    #[case("SMTP_TLS_MODE", "starttls")]
    fn 不正な値はinvalid_valueになる(#[case] key: &'static str, #[case] value: &str) {
        let err = load(&[(key, value)]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key,
                value: value.to_string(),
            }
        );
    }

    #[test]
    fn 空文字は未設定として扱う() {
        let config = load(&[("SMTP_TIMEOUT_SECS", ""), ("MAIL_BACKEND", " ")]).unwrap();
        assert_eq!(config.mail.smtp.timeout, Duration::from_secs(30));
        assert_eq!(config.mail.backend, MailBackend::Smtp);
    }
}
