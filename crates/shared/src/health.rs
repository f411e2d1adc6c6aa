//! # ヘルスチェックのレスポンス型
//!
//! `/health` は常に [`HealthResponse`]、`/health/ready` は依存先ごとの結果を
//! 集約した [`ReadinessResponse`] を返す。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `{"status": "healthy", "version": "x.y.z"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status:  String,
    pub version: String,
}

impl HealthResponse {
    pub fn healthy(version: impl Into<String>) -> Self {
        Self {
            status:  "healthy".to_string(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStatus {
    Ready,
    NotReady,
}

/// 依存先名（`"database"` など）ごとの結果と、その集約
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: ReadinessStatus,
    pub checks: BTreeMap<String, CheckStatus>,
}

impl ReadinessResponse {
    /// どれか 1 つでも `Error` なら `NotReady`
    pub fn from_checks<'a>(checks: impl IntoIterator<Item = (&'a str, CheckStatus)>) -> Self {
        let checks: BTreeMap<String, CheckStatus> = checks
            .into_iter()
            .map(|(name, status)| (name.to_string(), status))
            .collect();
        let status = if checks.values().any(|s| *s == CheckStatus::Error) {
            ReadinessStatus::NotReady
        } else {
            ReadinessStatus::Ready
        };
        Self { status, checks }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ReadinessStatus::Ready
    }
}
