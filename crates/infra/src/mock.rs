//! # テスト用モックリポジトリ
//!
//! ユースケース・ハンドラテストで使用するインメモリモックリポジトリ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! todo-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{
    Arc,
    Mutex,
    atomic::{AtomicBool, AtomicI64, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use todo_domain::todo::{NewTodo, Todo, TodoContentUpdate, TodoId};

use crate::{error::InfraError, repository::TodoRepository};

// ===== MockTodoRepository =====

/// インメモリの TodoRepository
///
/// ID は 1 から順に採番する。`fail_with_unexpected` を呼ぶと、以降の全操作が
/// `InfraError` を返す（ストア障害の再現用）。
#[derive(Clone)]
pub struct MockTodoRepository {
    todos:   Arc<Mutex<Vec<Todo>>>,
    next_id: Arc<AtomicI64>,
    failing: Arc<AtomicBool>,
}

impl Default for MockTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTodoRepository {
    pub fn new() -> Self {
        Self {
            todos:   Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 採番済みの Todo を直接追加する
    pub fn add_todo(&self, todo: Todo) {
        let id = todo.id().as_i64();
        self.next_id.fetch_max(id + 1, Ordering::SeqCst);
        self.todos.lock().unwrap().push(todo);
    }

    /// 保持している Todo を ID 昇順で返す
    pub fn todos(&self) -> Vec<Todo> {
        let mut todos = self.todos.lock().unwrap().clone();
        todos.sort_by_key(Todo::id);
        todos
    }

    /// 以降の全操作を失敗させる
    pub fn fail_with_unexpected(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check_failure(&self) -> Result<(), InfraError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(InfraError::unexpected("モックリポジトリの障害"));
        }
        Ok(())
    }

    /// 条件に一致する Todo を置き換え、件数を返す
    fn replace(&self, id: &TodoId, f: impl Fn(Todo) -> Todo) -> u64 {
        let mut todos = self.todos.lock().unwrap();
        match todos.iter().position(|t| t.id() == *id) {
            Some(pos) => {
                let current = todos[pos].clone();
                todos[pos] = f(current);
                1
            }
            None => 0,
        }
    }
}

#[async_trait]
impl TodoRepository for MockTodoRepository {
    async fn insert(&self, todo: &NewTodo) -> Result<Todo, InfraError> {
        self.check_failure()?;
        let id = TodoId::from_i64(self.next_id.fetch_add(1, Ordering::SeqCst));
        let todo = todo.clone().into_todo(id);
        self.todos.lock().unwrap().push(todo.clone());
        Ok(todo)
    }

    async fn find_all(&self) -> Result<Vec<Todo>, InfraError> {
        self.check_failure()?;
        Ok(self.todos())
    }

    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, InfraError> {
        self.check_failure()?;
        Ok(self
            .todos
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id() == *id)
            .cloned())
    }

    async fn update(&self, update: &TodoContentUpdate) -> Result<u64, InfraError> {
        self.check_failure()?;
        Ok(self.replace(&update.id, |t| t.with_content(update)))
    }

    async fn delete(&self, id: &TodoId) -> Result<u64, InfraError> {
        self.check_failure()?;
        let mut todos = self.todos.lock().unwrap();
        let before = todos.len();
        todos.retain(|t| t.id() != *id);
        Ok((before - todos.len()) as u64)
    }

    async fn mark_done(&self, id: &TodoId, updated_at: DateTime<Utc>) -> Result<u64, InfraError> {
        self.check_failure()?;
        Ok(self.replace(id, |t| t.mark_completed(updated_at)))
    }
}
