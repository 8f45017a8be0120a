//! # RPC ハンドラ
//!
//! ホストからの RPC（HTTP/JSON）を受け付けるハンドラ群。

pub mod health;
pub mod plugin;

pub use health::health_check;
pub use plugin::{PluginState, execute_task, get_info, handle_alert};
