//! # ユースケース層
//!
//! ハンドラとリポジトリの間に位置し、時刻の採番などアプリケーション固有の
//! 処理を担う。

pub mod todo;

pub use todo::{CreateTodoInput, TodoUseCaseImpl, UpdateTodoInput};
