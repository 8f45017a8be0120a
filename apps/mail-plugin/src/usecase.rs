//! # ユースケース層
//!
//! メールアクションの実行フローを実装する。RPC 型・リンク型の両方から利用する。

pub mod mail_action;

pub use mail_action::{MailActionError, MailActionUseCase, MailOutcome, StepTarget};
