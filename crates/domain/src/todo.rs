//! # Todo
//!
//! サービスが管理する唯一のエンティティ。
//!
//! ## 設計方針
//!
//! - **ID はストアが採番**: アプリケーションは ID を生成しない。
//!   挿入前の状態を [`NewTodo`]、ID 確定後の状態を [`Todo`] として型で区別する
//! - **不変フィールド**: `id` と `created_at` は作成後に変更されない
//! - **更新は値の差し替え**: `with_content` / `mark_completed` は新しい値を返す
//!
//! ## ライフサイクル
//!
//! ```text
//! NewTodo ──insert──▶ Todo ──update / mark_done──▶ Todo ──delete──▶ (消滅)
//! ```

use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Todo ID（ストアが採番する整数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct TodoId(i64);

impl TodoId {
    /// DB から取得した値から ID を作成する
    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl FromStr for TodoId {
    type Err = DomainError;

    /// パスセグメントなどの文字列から ID をパースする
    ///
    /// 10 進整数として解釈できない場合は `DomainError::Validation` を返す。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self).map_err(|e| {
            DomainError::Validation(format!("Todo ID は整数である必要があります: {s:?} ({e})"))
        })
    }
}

/// 挿入前の Todo
///
/// `completed` は常に `false`、`created_at` と `updated_at` は同じ時刻で初期化される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    title:       String,
    description: String,
    completed:   bool,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

impl NewTodo {
    pub fn new(title: impl Into<String>, description: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// ストアが採番した ID を付与して [`Todo`] に変換する
    pub fn into_todo(self, id: TodoId) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
            completed: self.completed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DB の行から [`Todo`] を復元するためのレコード
pub struct TodoRecord {
    pub id:          TodoId,
    pub title:       String,
    pub description: String,
    pub completed:   bool,
    pub created_at:  DateTime<Utc>,
    pub updated_at:  DateTime<Utc>,
}

/// 永続化済みの Todo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    id:          TodoId,
    title:       String,
    description: String,
    completed:   bool,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

impl Todo {
    /// DB から取得した値で復元する
    pub fn from_db(record: TodoRecord) -> Self {
        Self {
            id:          record.id,
            title:       record.title,
            description: record.description,
            completed:   record.completed,
            created_at:  record.created_at,
            updated_at:  record.updated_at,
        }
    }

    pub fn id(&self) -> TodoId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// タイトルと説明を差し替える（`id` と `created_at` は維持）
    pub fn with_content(self, update: &TodoContentUpdate) -> Self {
        Self {
            title: update.title.clone(),
            description: update.description.clone(),
            updated_at: update.updated_at,
            ..self
        }
    }

    /// 完了状態にする
    pub fn mark_completed(self, now: DateTime<Utc>) -> Self {
        Self {
            completed: true,
            updated_at: now,
            ..self
        }
    }
}

/// タイトル・説明の更新内容
///
/// 対象の存在確認は行わない。該当行がなければ更新件数 0 で成功扱いとなる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoContentUpdate {
    pub id:          TodoId,
    pub title:       String,
    pub description: String,
    pub updated_at:  DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_new_todoは未完了かつ作成日時と更新日時が一致する() {
        let sut = NewTodo::new("牛乳を買う", "2%", fixed_now());

        assert!(!sut.completed());
        assert_eq!(sut.created_at(), fixed_now());
        assert_eq!(sut.updated_at(), fixed_now());
    }

    #[test]
    fn test_into_todoでストア採番のidが付与される() {
        let sut = NewTodo::new("牛乳を買う", "2%", fixed_now()).into_todo(TodoId::from_i64(7));

        assert_eq!(sut.id(), TodoId::from_i64(7));
        assert_eq!(sut.title(), "牛乳を買う");
        assert_eq!(sut.description(), "2%");
    }

    #[test]
    fn test_with_contentはidと作成日時を維持する() {
        let todo = NewTodo::new("牛乳を買う", "2%", fixed_now()).into_todo(TodoId::from_i64(1));
        let later = fixed_now() + Duration::minutes(5);
        let update = TodoContentUpdate {
            id:          TodoId::from_i64(1),
            title:       "牛乳を買う".to_string(),
            description: "成分無調整".to_string(),
            updated_at:  later,
        };

        let sut = todo.with_content(&update);

        assert_eq!(sut.id(), TodoId::from_i64(1));
        assert_eq!(sut.description(), "成分無調整");
        assert_eq!(sut.created_at(), fixed_now());
        assert_eq!(sut.updated_at(), later);
    }

    #[test]
    fn test_mark_completedで完了状態になり更新日時が進む() {
        let todo = NewTodo::new("掃除", "", fixed_now()).into_todo(TodoId::from_i64(3));
        let later = fixed_now() + Duration::seconds(1);

        let sut = todo.mark_completed(later);

        assert!(sut.completed());
        assert_eq!(sut.title(), "掃除");
        assert_eq!(sut.created_at(), fixed_now());
        assert_eq!(sut.updated_at(), later);
    }

    #[rstest]
    #[case("1", 1)]
    #[case("42", 42)]
    #[case("-5", -5)]
    fn test_todo_idは整数文字列をパースできる(#[case] input: &str, #[case] expected: i64) {
        assert_eq!(input.parse::<TodoId>(), Ok(TodoId::from_i64(expected)));
    }

    #[rstest]
    #[case("abc")]
    #[case("")]
    #[case("1.5")]
    #[case("99999999999999999999")]
    fn test_todo_idは整数以外をバリデーションエラーにする(#[case] input: &str) {
        let err = input.parse::<TodoId>().unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_todo_idのdisplayは整数のみを出力する() {
        assert_eq!(TodoId::from_i64(12).to_string(), "12");
    }
}
