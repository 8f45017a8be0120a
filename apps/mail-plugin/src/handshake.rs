//! # ホストとのハンドシェイク
//!
//! プラグインプロセスはホストから起動され、以下の手順で接続情報を伝える:
//!
//! 1. `PLUGIN_MAGIC_COOKIE` を検証する（直接実行された場合は案内を出して終了）
//! 2. `PLUGIN_PROTOCOL_VERSIONS` にアプリケーションプロトコル `1` が含まれるか確認する
//! 3. `127.0.0.1` 上で待ち受けを開始する
//! 4. 標準出力に 1 行だけハンドシェイク行を書き出す
//!
//! ```text
//! 1|1|tcp|127.0.0.1:54321|http
//! ^ ^ ^   ^               ^
//! | | |   |               └ RPC プロトコル
//! | | |   └ 待ち受けアドレス
//! | | └ ネットワーク種別
//! | └ アプリケーションプロトコルバージョン
//! └ コアプロトコルバージョン
//! ```
//!
//! 標準出力はハンドシェイク専用のため、ログはすべて標準エラー出力に書く。

use std::{
    io::{self, Write},
    net::{Ipv4Addr, SocketAddr},
};

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::PortRange;

/// コアプロトコルバージョン
pub const CORE_PROTOCOL_VERSION: u32 = 1;

/// アプリケーションプロトコルバージョン
pub const APP_PROTOCOL_VERSION: u32 = 1;

/// マジッククッキーの環境変数名
pub const MAGIC_COOKIE_KEY: &str = "PLUGIN_MAGIC_COOKIE";

/// マジッククッキーの期待値
pub const MAGIC_COOKIE_VALUE: &str = "hello";

/// 直接実行された場合に標準エラー出力へ書く案内
pub const DIRECT_EXECUTION_NOTICE: &str = "This binary is a plugin. These are not meant to be \
                                           executed directly.\nPlease execute the program that \
                                           consumes these plugins, which will\nload any plugins \
                                           automatically";

/// ハンドシェイクエラー
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// マジッククッキーが一致しない（ホスト以外から起動された）
    #[error("{MAGIC_COOKIE_KEY} が一致しません")]
    MagicCookieMismatch,

    /// ホストが対応するプロトコルバージョンに 1 が含まれない
    #[error("対応するプロトコルバージョンがありません: {0:?}")]
    UnsupportedProtocol(String),

    /// ポート範囲に空きがない
    #[error("{min}-{max} に空きポートがありません")]
    NoFreePort { min: u16, max: u16 },

    /// 待ち受け・出力の I/O エラー
    #[error("I/O エラー: {0}")]
    Io(#[from] io::Error),
}

/// マジッククッキーを検証する
pub fn verify_magic_cookie(cookie: Option<&str>) -> Result<(), HandshakeError> {
    match cookie {
        Some(MAGIC_COOKIE_VALUE) => Ok(()),
        _ => Err(HandshakeError::MagicCookieMismatch),
    }
}

/// 使用するアプリケーションプロトコルバージョンを決める
///
/// `PLUGIN_PROTOCOL_VERSIONS` が未設定ならホストは古い形式とみなし、そのまま `1` を使う。
/// 解釈できない要素は無視する。
pub fn negotiate_protocol(host_versions: Option<&str>) -> Result<u32, HandshakeError> {
    let Some(raw) = host_versions.filter(|v| !v.trim().is_empty()) else {
        return Ok(APP_PROTOCOL_VERSION);
    };

    let supported = raw
        .split(',')
        .filter_map(|v| v.trim().parse::<u32>().ok())
        .any(|v| v == APP_PROTOCOL_VERSION);

    if supported {
        Ok(APP_PROTOCOL_VERSION)
    } else {
        Err(HandshakeError::UnsupportedProtocol(raw.to_string()))
    }
}

/// `127.0.0.1` 上で待ち受けを開始する
///
/// ポート範囲が指定されていれば最初に bind できたポートを使い、
/// 未指定ならエフェメラルポートを使う。
pub async fn bind_listener(port_range: Option<PortRange>) -> Result<TcpListener, HandshakeError> {
    let Some(PortRange { min, max }) = port_range else {
        return Ok(TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?);
    };

    for port in min..=max {
        match TcpListener::bind((Ipv4Addr::LOCALHOST, port)).await {
            Ok(listener) => return Ok(listener),
            Err(e) => tracing::debug!(port, error = %e, "ポートを使用できません"),
        }
    }

    Err(HandshakeError::NoFreePort { min, max })
}

/// ハンドシェイク行を組み立てる
pub fn handshake_line(app_version: u32, addr: SocketAddr) -> String {
    format!("{CORE_PROTOCOL_VERSION}|{app_version}|tcp|{addr}|http")
}

/// ハンドシェイク行を書き出してフラッシュする
pub fn write_handshake(
    out: &mut impl Write,
    app_version: u32,
    addr: SocketAddr,
) -> Result<(), HandshakeError> {
    writeln!(out, "{}", handshake_line(app_version, addr))?;
    out.flush()?;
    Ok(())
}
