//! # Todo ハンドラ
//!
//! Todo の CRUD API を提供する。
//!
//! ## エンドポイント
//!
//! - `GET /todos` - 一覧
//! - `POST /todos` - 作成
//! - `GET /todos/{id}` - 詳細
//! - `PUT /todos/{id}` - タイトル・説明の更新
//! - `DELETE /todos/{id}` - 削除
//! - `PUT /todos/{id}/done` - 完了にする
//!
//! リクエストボディは `Bytes` で受け取り `serde_json` でデコードする。
//! Content-Type に関わらず、デコードできないボディは 400 になる。

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use todo_domain::todo::{Todo, TodoId};

use crate::{
    error::CoreError,
    usecase::{CreateTodoInput, TodoUseCaseImpl, UpdateTodoInput},
};

/// Todo API の共有状態
pub struct TodoState {
    pub usecase: TodoUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// Todo 作成・更新リクエスト
///
/// 欠けたフィールドと `null` は空文字列として扱う。
#[derive(Debug, Default, Deserialize)]
pub struct TodoRequest {
    #[serde(default)]
    pub title:       Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Todo DTO
#[derive(Debug, Serialize)]
pub struct TodoDto {
    pub id:          i64,
    pub title:       String,
    pub description: String,
    pub completed:   bool,
    pub created_at:  String,
    pub updated_at:  String,
}

impl From<Todo> for TodoDto {
    fn from(todo: Todo) -> Self {
        Self {
            id:          todo.id().as_i64(),
            title:       todo.title().to_string(),
            description: todo.description().to_string(),
            completed:   todo.completed(),
            created_at:  todo.created_at().to_rfc3339(),
            updated_at:  todo.updated_at().to_rfc3339(),
        }
    }
}

/// JSON オブジェクトのボディだけを受け付ける
///
/// 構造体の derive は配列も受け付けてしまうため、先に `Map` としてデコードする。
/// ボディ全体が `null` の場合は空オブジェクトとして扱う。
fn decode_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, CoreError> {
    let invalid = |e: serde_json::Error| {
        CoreError::BadRequest(format!("リクエストボディが不正です: {e}"))
    };
    let object: Option<Map<String, Value>> = serde_json::from_slice(body).map_err(invalid)?;
    serde_json::from_value(Value::Object(object.unwrap_or_default())).map_err(invalid)
}

// --- ハンドラ ---

/// GET /todos
///
/// 0 件の場合は空配列を返す。
#[tracing::instrument(skip_all)]
pub async fn list_todos(
    State(state): State<Arc<TodoState>>,
) -> Result<impl IntoResponse, CoreError> {
    let todos = state.usecase.get_all_todos().await?;
    let items: Vec<TodoDto> = todos.into_iter().map(TodoDto::from).collect();
    Ok((StatusCode::OK, Json(items)))
}

/// POST /todos
///
/// 成功時は 201 と空ボディ。`Location` ヘッダに作成した Todo のパスを返す。
#[tracing::instrument(skip_all)]
pub async fn create_todo(
    State(state): State<Arc<TodoState>>,
    body: Bytes,
) -> Result<impl IntoResponse, CoreError> {
    let req: TodoRequest = decode_body(&body)?;

    let todo = state
        .usecase
        .create_todo(CreateTodoInput {
            title:       req.title.unwrap_or_default(),
            description: req.description.unwrap_or_default(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/todos/{}", todo.id()))],
    ))
}

/// GET /todos/{id}
///
/// ## エラー
///
/// - `400 Bad Request`: ID が整数でない
/// - `404 Not Found`: Todo が見つからない
#[tracing::instrument(skip_all, fields(%id))]
pub async fn get_todo(
    State(state): State<Arc<TodoState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CoreError> {
    let id: TodoId = id.parse()?;
    let todo = state.usecase.get_todo_by_id(&id).await?;
    Ok((StatusCode::OK, Json(TodoDto::from(todo))))
}

/// PUT /todos/{id}
///
/// ボディの ID は無視し、パスの ID を使う。対象が存在しなくても 200。
#[tracing::instrument(skip_all, fields(%id))]
pub async fn update_todo(
    State(state): State<Arc<TodoState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, CoreError> {
    let id: TodoId = id.parse()?;
    let req: TodoRequest = decode_body(&body)?;

    state
        .usecase
        .update_todo(UpdateTodoInput {
            id,
            title: req.title.unwrap_or_default(),
            description: req.description.unwrap_or_default(),
        })
        .await?;

    Ok(StatusCode::OK)
}

/// DELETE /todos/{id}
///
/// 対象が存在しなくても 200（冪等）。
#[tracing::instrument(skip_all, fields(%id))]
pub async fn delete_todo(
    State(state): State<Arc<TodoState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CoreError> {
    let id: TodoId = id.parse()?;
    state.usecase.delete_todo(&id).await?;
    Ok(StatusCode::OK)
}

/// PUT /todos/{id}/done
#[tracing::instrument(skip_all, fields(%id))]
pub async fn mark_todo_done(
    State(state): State<Arc<TodoState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CoreError> {
    let id: TodoId = id.parse()?;
    state.usecase.mark_todo_done(&id).await?;
    Ok(StatusCode::OK)
}
