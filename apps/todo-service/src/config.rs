//! # Todo Service 設定
//!
//! 環境変数から設定を読み込む。`.env` は `main` で dotenvy により事前に読み込まれる。
//!
//! 読み込みは参照関数 `Fn(&str) -> Option<String>` 経由で行い、テストでは
//! プロセスの環境変数に触れずに任意の値を与えられる。

use std::{env, fmt};

use thiserror::Error;
use todo_shared::observability::LogFormat;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 値が不正
    #[error("{key} の値が不正です: {value:?} ({reason})")]
    Invalid {
        key:    &'static str,
        value:  String,
        reason: String,
    },
}

/// データベース接続設定
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host:     String,
    pub port:     u16,
    pub username: String,
    pub password: String,
    pub dbname:   String,
}

impl DatabaseConfig {
    /// 接続 URL を組み立てる
    ///
    /// ユーザー名とパスワードはパーセントエンコードする。TLS は使わない。
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode=disable",
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password),
            self.host,
            self.port,
            self.dbname,
        )
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("dbname", &self.dbname)
            .finish()
    }
}

/// Todo Service の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// バインドアドレス（`host:port`）
    pub listen_address: String,
    /// データベース接続設定
    pub database:       DatabaseConfig,
    /// `RUST_LOG` 未設定時のログレベル
    pub log_level:      String,
    /// ログ出力形式
    pub log_format:     LogFormat,
}

const DEFAULT_LISTEN_ADDRESS: &str = ":8000";
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_LOG_LEVEL: &str = "info";

impl AppConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 参照関数から設定を読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let listen_address = normalize_listen_address(
            get("TODO_LISTEN_ADDRESS").unwrap_or_else(|| DEFAULT_LISTEN_ADDRESS.to_string()),
        )?;

        let port = match get("TODO_DB_PORT") {
            Some(value) => value.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    key: "TODO_DB_PORT",
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => DEFAULT_DB_PORT,
        };

        let database = DatabaseConfig {
            host: get("TODO_DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
            port,
            username: require("TODO_DB_USERNAME")?,
            password: require("TODO_DB_PASSWORD")?,
            dbname: require("TODO_DB_DBNAME")?,
        };

        Ok(Self {
            listen_address,
            database,
            log_level: get("TODO_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_format: get("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        })
    }
}

/// `:8000` のようにホストを省略したアドレスを全インターフェースに展開する
fn normalize_listen_address(value: String) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        key:    "TODO_LISTEN_ADDRESS",
        value:  value.clone(),
        reason: reason.to_string(),
    };

    let Some((host, port)) = value.rsplit_once(':') else {
        return Err(invalid("host:port 形式である必要があります"));
    };
    if port.parse::<u16>().is_err() {
        return Err(invalid("ポート番号が不正です"));
    }

    if host.is_empty() {
        Ok(format!("0.0.0.0:{port}"))
    } else {
        Ok(value.clone())
    }
}
