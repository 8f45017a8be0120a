//! # メール送信エラー
//!
//! SMTP 送信で発生し得る失敗を表現する。
//! `Display` の文字列がそのままステップメッセージ
//! （`Failed to send email: ...`）に埋め込まれる。

use thiserror::Error;

/// メール送信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailError {
    /// 送信元・宛先のメールアドレスが不正
    #[error("invalid address {0}")]
    InvalidAddress(String),

    /// 宛先が 1 件も指定されていない
    #[error("no recipients given")]
    NoRecipients,

    /// SMTP サーバーとの通信・認証・送信に失敗
    #[error("{0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transportエラーはメッセージをそのまま表示する() {
        let err = MailError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn invalid_addressは不正な値を含めて表示する() {
        let err = MailError::InvalidAddress("'not-an-address'".to_string());
        assert_eq!(err.to_string(), "invalid address 'not-an-address'");
    }
}
