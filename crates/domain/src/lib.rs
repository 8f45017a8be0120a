//! # Mailflow ドメイン層
//!
//! メールアクションプラグインのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **純粋なモデル**: SMTP 接続や HTTP 通信などの副作用を一切持たない
//! - **ホストとの契約を型で表現**: 実行リクエスト、ステップ更新、プラグイン記述子
//! - **パラメータ解析は全域関数**: 不正な入力でも失敗せず、送信時のエラーとして報告する
//!
//! ## 依存関係の方向
//!
//! ```text
//! mail-plugin → infra → domain
//!      ↘          ↓
//!         shared
//! ```
//!
//! ## モジュール構成
//!
//! - [`action`] - アクションパラメータとメール送信設定
//! - [`execution`] - 実行ステップの状態とホストからのリクエスト
//! - [`plugin`] - プラグイン記述子とリンク型プラグインのインターフェース
//! - [`mail`] - メール送信エラー
//! - [`clock`] - 時刻プロバイダ
//!
//! ## 使用例
//!
//! ```rust
//! use mailflow_domain::action::{ActionParam, MailSettings};
//!
//! let params = vec![
//!     ActionParam::new("SmtpHost", "smtp.example.com"),
//!     ActionParam::new("SmtpPort", "587"),
//! ];
//! let settings = MailSettings::from_params(&params);
//! assert_eq!(settings.server_address(), "smtp.example.com:587");
//! ```

#[macro_use]
mod macros;

pub mod action;
pub mod clock;
pub mod execution;
pub mod mail;
pub mod plugin;

pub use mail::MailError;
