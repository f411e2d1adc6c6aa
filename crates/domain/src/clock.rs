//! # Clock（時刻プロバイダ）
//!
//! `created_at` / `updated_at` の採番に使う現在時刻の抽象化。
//! ユースケース層はこのトレイト経由で時刻を取得し、テストでは固定時刻を注入する。

use chrono::{DateTime, SubsecRound, Utc};

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// システム時刻を返す実装
///
/// PostgreSQL の `TIMESTAMPTZ` はマイクロ秒精度のため、
/// 書き込んだ値と読み戻した値が一致するようマイクロ秒に切り捨てる。
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }
}

/// 固定時刻を返すテスト用実装
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
