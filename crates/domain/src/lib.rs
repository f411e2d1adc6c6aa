//! # Todo ドメイン層
//!
//! Todo サービスのドメインモデルを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! todo-service → todo-infra → todo-domain
//! ```
//!
//! ドメイン層はインフラ層（DB、HTTP）に一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`todo`] - Todo エンティティと識別子
//! - [`clock`] - 時刻プロバイダ
//! - [`error`] - ドメイン層エラー
//!
//! ## 使用例
//!
//! ```rust
//! use todo_domain::{clock::{Clock, SystemClock}, todo::NewTodo};
//!
//! let now = SystemClock.now();
//! let new_todo = NewTodo::new("牛乳を買う", "低脂肪", now);
//!
//! assert!(!new_todo.completed());
//! assert_eq!(new_todo.created_at(), new_todo.updated_at());
//! ```

pub mod clock;
pub mod error;
pub mod todo;

pub use error::DomainError;
