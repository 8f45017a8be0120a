//! # メールプラグイン（RPC 型）
//!
//! ホストから子プロセスとして起動されるエントリーポイント。
//!
//! ## 起動手順
//!
//! 1. `.env` とトレーシングを初期化する（ログは標準エラー出力）
//! 2. マジッククッキーを検証する（直接実行された場合は案内を出して終了コード 1）
//! 3. プロトコルバージョンを決め、`127.0.0.1` で待ち受けを開始する
//! 4. 標準出力にハンドシェイク行を書き出し、RPC を提供する
//!
//! Ctrl-C / SIGTERM で graceful shutdown する。
//!
//! ## 起動方法
//!
//! ```bash
//! # ホスト経由（通常）
//! PLUGIN_MAGIC_COOKIE=hello ./mail-plugin
//!
//! # 送信せずに結合確認する
//! PLUGIN_MAGIC_COOKIE=hello MAIL_BACKEND=noop LOG_FORMAT=json ./mail-plugin
//! ```

use std::{future::IntoFuture, io, sync::Arc};

use anyhow::Context as _;
use mailflow_infra::step_reporter::StepWireFormat;
use mailflow_mail_plugin::{
    build_router,
    build_usecase,
    config::PluginConfig,
    handler::PluginState,
    handshake,
    plugin_info,
};
use mailflow_shared::observability::{TracingConfig, init_tracing};
use tracing::Instrument as _;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    init_tracing(&TracingConfig::from_env());

    let config = PluginConfig::from_env().context("設定の読み込みに失敗しました")?;

    if handshake::verify_magic_cookie(config.handshake.magic_cookie.as_deref()).is_err() {
        eprintln!("{}", handshake::DIRECT_EXECUTION_NOTICE);
        std::process::exit(1);
    }

    let app_version = handshake::negotiate_protocol(config.handshake.protocol_versions.as_deref())
        .context("プロトコルバージョンのネゴシエーションに失敗しました")?;

    let usecase = build_usecase(&config.mail, &config.execution_api, StepWireFormat::Status)
        .context("依存コンポーネントの初期化に失敗しました")?;
    let state = Arc::new(PluginState {
        usecase,
        info: plugin_info::rpc_plugin_info(),
    });
    let app = build_router(state);

    let listener = handshake::bind_listener(config.handshake.port_range).await?;
    let addr = listener.local_addr()?;

    let span = tracing::info_span!(
        "app",
        service = "mail-plugin",
        %addr,
        mail_backend = %config.mail.backend
    );
    span.in_scope(|| {
        tracing::info!(
            smtp_tls_mode = %config.mail.smtp.tls_mode,
            "メールプラグインが起動しました"
        );
    });

    handshake::write_handshake(&mut io::stdout().lock(), app_version, addr)?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future()
        .instrument(span.clone())
        .await?;

    span.in_scope(|| tracing::info!("メールプラグインを停止しました"));
    Ok(())
}

/// Ctrl-C または SIGTERM を待つ
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl-C ハンドラの登録に失敗");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM ハンドラの登録に失敗");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("シャットダウンシグナルを受信しました");
}
