//! # ログ出力の初期化
//!
//! プラグインプロセスの標準出力はハンドシェイク行専用のため、
//! ログはすべて標準エラー出力に書く。ホストは標準エラー出力をプラグインログとして取り込む。
//!
//! | 環境変数 | 内容 |
//! |----------|------|
//! | `LOG_FORMAT` | `json` \| `pretty`（デフォルト: `pretty`） |
//! | `RUST_LOG` | フィルタ（デフォルト: [`DEFAULT_FILTER`]） |

use std::str::FromStr;

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_FILTER: &str = "info,mailflow=debug";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 イベント 1 行の JSON（ホストが構造化ログとして取り込む）
    Json,
    /// 人間向けのテキスト
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("unknown LOG_FORMAT={other:?}")),
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub log_format:     LogFormat,
    /// `RUST_LOG` が未設定のときに使うフィルタ
    pub default_filter: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_format:     LogFormat::default(),
            default_filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl TracingConfig {
    /// `LOG_FORMAT` の値から設定を作る
    ///
    /// 解釈できない値は警告を出して `pretty` にする。
    /// トレーシング初期化前なので警告は `eprintln!` で出す。
    pub fn from_log_format(value: Option<&str>) -> Self {
        let log_format = match value.map(LogFormat::from_str) {
            None => LogFormat::default(),
            Some(Ok(format)) => format,
            Some(Err(e)) => {
                eprintln!("WARNING: {e}, falling back to pretty");
                LogFormat::Pretty
            }
        };
        Self {
            log_format,
            ..Self::default()
        }
    }

    /// 環境変数 `LOG_FORMAT` から設定を作る
    pub fn from_env() -> Self {
        Self::from_log_format(std::env::var("LOG_FORMAT").ok().as_deref())
    }
}

/// トレーシングを初期化する
///
/// `tracing_error::ErrorLayer` も登録し、インフラ層エラーの `SpanTrace` を取得できるようにする。
/// サービス名は呼び出し側のルートスパン（`info_span!("app", service = "...")`）で付与する。
#[cfg(feature = "observability")]
pub fn init_tracing(config: &TracingConfig) {
    use tracing_subscriber::{EnvFilter, Layer as _, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let output = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_ansi(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .with(tracing_error::ErrorLayer::default())
        .init();
}
