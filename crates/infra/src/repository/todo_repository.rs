//! # TodoRepository
//!
//! Todo の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **ID はストア採番**: `insert` は `RETURNING id` で確定した ID を含む [`Todo`] を返す
//! - **存在確認をしない更新系**: `update` / `delete` / `mark_done` は影響行数を返し、
//!   0 件でもエラーにしない
//! - **実行時クエリ**: `sqlx::query_as` + [`sqlx::FromRow`] でマッピングし、
//!   ビルド時にデータベースを必要としない

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use todo_domain::todo::{NewTodo, Todo, TodoContentUpdate, TodoId, TodoRecord};

use crate::error::InfraError;

/// Todo リポジトリトレイト
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Todo を挿入し、採番された ID を含む [`Todo`] を返す
    async fn insert(&self, todo: &NewTodo) -> Result<Todo, InfraError>;

    /// すべての Todo を ID 昇順で取得する
    async fn find_all(&self) -> Result<Vec<Todo>, InfraError>;

    /// ID で Todo を検索する
    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, InfraError>;

    /// タイトル・説明・更新日時を更新し、影響行数を返す
    async fn update(&self, update: &TodoContentUpdate) -> Result<u64, InfraError>;

    /// Todo を削除し、影響行数を返す
    async fn delete(&self, id: &TodoId) -> Result<u64, InfraError>;

    /// Todo を完了状態にし、影響行数を返す
    async fn mark_done(&self, id: &TodoId, updated_at: DateTime<Utc>) -> Result<u64, InfraError>;
}

/// PostgreSQL 実装の TodoRepository
#[derive(Debug, Clone)]
pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `todos` テーブルの行
#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id:          i64,
    title:       String,
    description: String,
    completed:   bool,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo::from_db(TodoRecord {
            id:          TodoId::from_i64(row.id),
            title:       row.title,
            description: row.description,
            completed:   row.completed,
            created_at:  row.created_at,
            updated_at:  row.updated_at,
        })
    }
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(&self, todo: &NewTodo) -> Result<Todo, InfraError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO todos (title, description, completed, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(todo.title())
        .bind(todo.description())
        .bind(todo.completed())
        .bind(todo.created_at())
        .bind(todo.updated_at())
        .fetch_one(&self.pool)
        .await?;

        Ok(todo.clone().into_todo(TodoId::from_i64(id)))
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Todo>, InfraError> {
        let rows = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, title, description, completed, created_at, updated_at
            FROM todos
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Todo::from).collect())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, InfraError> {
        let row = sqlx::query_as::<_, TodoRow>(
            r#"
            SELECT id, title, description, completed, created_at, updated_at
            FROM todos
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Todo::from))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %update.id))]
    async fn update(&self, update: &TodoContentUpdate) -> Result<u64, InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE todos
            SET title = $1, description = $2, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.updated_at)
        .bind(update.id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn delete(&self, id: &TodoId) -> Result<u64, InfraError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn mark_done(&self, id: &TodoId, updated_at: DateTime<Utc>) -> Result<u64, InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE todos
            SET completed = TRUE, updated_at = $1
            WHERE id = $2
            "#,
        )
        .bind(updated_at)
        .bind(id.as_i64())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
