//! # トレーシング初期化
//!
//! `LOG_FORMAT` に応じて JSON 1 行ログか開発用の整形ログを選び、
//! グローバル subscriber を登録する。

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 1 イベント 1 行の JSON
    Json,
    /// 色付きの複数行表示
    #[default]
    Pretty,
}

impl LogFormat {
    /// `"json"` / `"pretty"` 以外は警告を出して `Pretty` として扱う
    ///
    /// 設定読み込みは subscriber 登録より前に行われるため、警告は stderr に直接書く。
    pub fn parse(value: &str) -> Self {
        match value {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            unknown => {
                eprintln!("LOG_FORMAT={unknown:?} は未対応のため pretty で出力します");
                Self::Pretty
            }
        }
    }
}

/// [`init_tracing`] の入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub service_name:   String,
    pub log_format:     LogFormat,
    /// `RUST_LOG` が無いときの EnvFilter ディレクティブ（例: `"info"`）
    pub default_filter: String,
}

impl TracingConfig {
    pub fn new(
        service_name: impl Into<String>,
        log_format: LogFormat,
        default_filter: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
            default_filter: default_filter.into(),
        }
    }
}

#[cfg(feature = "observability")]
fn format_layer<S>(format: LogFormat) -> Box<dyn tracing_subscriber::Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    use tracing_subscriber::Layer as _;

    match format {
        // スパンはリスト化せず、現在のリクエストスパンのみ行に埋め込む
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    }
}

/// グローバル subscriber を登録する（プロセスで 1 回だけ呼ぶ）
///
/// フィルタは `RUST_LOG` があればそれを、無ければ `default_filter` を使う。
/// `ErrorLayer` も併せて登録し、`InfraError` が生成時の SpanTrace を取れるようにする。
#[cfg(feature = "observability")]
pub fn init_tracing(config: TracingConfig) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(format_layer(config.log_format))
        .with(tracing_error::ErrorLayer::default())
        .init();

    tracing::info!(
        service = %config.service_name,
        log_format = ?config.log_format,
        "トレーシングを初期化しました"
    );
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("pretty", LogFormat::Pretty)]
    #[case("JSON", LogFormat::Pretty)]
    #[case("text", LogFormat::Pretty)]
    #[case("", LogFormat::Pretty)]
    fn test_log_formatのパース(#[case] input: &str, #[case] expected: LogFormat) {
        assert_eq!(LogFormat::parse(input), expected);
    }

    #[test]
    fn test_log_formatの既定値はpretty() {
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }
}
