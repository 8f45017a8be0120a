//! # Mailflow インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **メール送信**: SMTP サーバーへの接続・認証・送信
//! - **実行ステップ API**: ホストへのステップ進捗の報告
//!
//! ## 依存関係
//!
//! ```text
//! mail-plugin → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`mail`] - メール送信（SMTP / Noop）
//! - [`step_reporter`] - 実行ステップ API クライアント
//! - [`error`] - インフラ層エラー定義
//! - `mock` - テスト用モック（`test-utils` feature）

pub mod error;
pub mod mail;
pub mod step_reporter;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::{InfraError, InfraErrorKind};
