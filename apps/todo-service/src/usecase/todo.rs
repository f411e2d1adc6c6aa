//! Todo ユースケース

use std::sync::Arc;

use todo_domain::{
    DomainError,
    clock::Clock,
    todo::{NewTodo, Todo, TodoContentUpdate, TodoId},
};
use todo_infra::repository::TodoRepository;

use crate::error::CoreError;

/// Todo 作成の入力
#[derive(Debug, Clone)]
pub struct CreateTodoInput {
    pub title:       String,
    pub description: String,
}

/// Todo 更新の入力
#[derive(Debug, Clone)]
pub struct UpdateTodoInput {
    pub id:          TodoId,
    pub title:       String,
    pub description: String,
}

/// Todo ユースケース
pub struct TodoUseCaseImpl {
    todo_repository: Arc<dyn TodoRepository>,
    clock:           Arc<dyn Clock>,
}

impl TodoUseCaseImpl {
    pub fn new(todo_repository: Arc<dyn TodoRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            todo_repository,
            clock,
        }
    }

    /// Todo を作成する
    ///
    /// 未完了状態で、`created_at` と `updated_at` を同じ現在時刻にして挿入する。
    /// ID はストアが採番する。
    pub async fn create_todo(&self, input: CreateTodoInput) -> Result<Todo, CoreError> {
        let new_todo = NewTodo::new(input.title, input.description, self.clock.now());
        let todo = self.todo_repository.insert(&new_todo).await?;
        tracing::debug!(todo_id = %todo.id(), "Todo を作成しました");
        Ok(todo)
    }

    /// すべての Todo を取得する
    pub async fn get_all_todos(&self) -> Result<Vec<Todo>, CoreError> {
        Ok(self.todo_repository.find_all().await?)
    }

    /// ID で Todo を取得する
    ///
    /// 該当がなければ `CoreError::NotFound`。
    pub async fn get_todo_by_id(&self, id: &TodoId) -> Result<Todo, CoreError> {
        self.todo_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound {
                    entity_type: "Todo",
                    id:          id.to_string(),
                }
                .into()
            })
    }

    /// タイトルと説明を更新する
    ///
    /// 対象が存在しなくてもエラーにしない。
    pub async fn update_todo(&self, input: UpdateTodoInput) -> Result<(), CoreError> {
        let update = TodoContentUpdate {
            id:          input.id,
            title:       input.title,
            description: input.description,
            updated_at:  self.clock.now(),
        };
        let affected = self.todo_repository.update(&update).await?;
        if affected == 0 {
            tracing::debug!(todo_id = %update.id, "更新対象の Todo が存在しません");
        }
        Ok(())
    }

    /// Todo を削除する
    ///
    /// 対象が存在しなくても成功する（冪等）。
    pub async fn delete_todo(&self, id: &TodoId) -> Result<(), CoreError> {
        let affected = self.todo_repository.delete(id).await?;
        if affected == 0 {
            tracing::debug!(todo_id = %id, "削除対象の Todo が存在しません");
        }
        Ok(())
    }

    /// Todo を完了状態にする
    pub async fn mark_todo_done(&self, id: &TodoId) -> Result<(), CoreError> {
        let affected = self.todo_repository.mark_done(id, self.clock.now()).await?;
        if affected == 0 {
            tracing::debug!(todo_id = %id, "完了対象の Todo が存在しません");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use pretty_assertions::assert_eq;
    use todo_domain::clock::FixedClock;
    use todo_infra::mock::MockTodoRepository;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn sut_with(repo: &MockTodoRepository, now: DateTime<Utc>) -> TodoUseCaseImpl {
        TodoUseCaseImpl::new(Arc::new(repo.clone()), Arc::new(FixedClock::new(now)))
    }

    fn create_input(title: &str, description: &str) -> CreateTodoInput {
        CreateTodoInput {
            title:       title.to_string(),
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_todoは未完了で作成日時と更新日時が一致するtodoを返す() {
        let repo = MockTodoRepository::new();
        let sut = sut_with(&repo, fixed_now());

        let todo = sut.create_todo(create_input("牛乳を買う", "2%")).await.unwrap();

        assert_eq!(todo.id(), TodoId::from_i64(1));
        assert!(!todo.completed());
        assert_eq!(todo.created_at(), fixed_now());
        assert_eq!(todo.updated_at(), fixed_now());
        assert_eq!(repo.todos(), vec![todo]);
    }

    #[tokio::test]
    async fn test_create_todoは空のタイトルも受け付ける() {
        let repo = MockTodoRepository::new();
        let sut = sut_with(&repo, fixed_now());

        let todo = sut.create_todo(create_input("", "")).await.unwrap();

        assert_eq!(todo.title(), "");
    }

    #[tokio::test]
    async fn test_get_all_todosは空のとき空のvecを返す() {
        let repo = MockTodoRepository::new();
        let sut = sut_with(&repo, fixed_now());

        let todos = sut.get_all_todos().await.unwrap();

        assert!(todos.is_empty());
    }

    #[tokio::test]
    async fn test_get_todo_by_idで作成したtodoが取得できる() {
        let repo = MockTodoRepository::new();
        let sut = sut_with(&repo, fixed_now());
        let created = sut.create_todo(create_input("牛乳を買う", "2%")).await.unwrap();

        let found = sut.get_todo_by_id(&created.id()).await.unwrap();

        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn test_get_todo_by_idで存在しないidはnot_found() {
        let repo = MockTodoRepository::new();
        let sut = sut_with(&repo, fixed_now());

        let result = sut.get_todo_by_id(&TodoId::from_i64(42)).await;

        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_todoは更新日時を進めidと作成日時を維持する() {
        let repo = MockTodoRepository::new();
        let created = sut_with(&repo, fixed_now())
            .create_todo(create_input("牛乳を買う", "2%"))
            .await
            .unwrap();
        let later = fixed_now() + Duration::minutes(3);

        sut_with(&repo, later)
            .update_todo(UpdateTodoInput {
                id:          created.id(),
                title:       "牛乳を買う".to_string(),
                description: "成分無調整".to_string(),
            })
            .await
            .unwrap();

        let updated = repo.todos().remove(0);
        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.description(), "成分無調整");
        assert_eq!(updated.created_at(), fixed_now());
        assert_eq!(updated.updated_at(), later);
    }

    #[tokio::test]
    async fn test_update_todoは存在しないidでも成功する() {
        let repo = MockTodoRepository::new();
        let sut = sut_with(&repo, fixed_now());

        let result = sut
            .update_todo(UpdateTodoInput {
                id:          TodoId::from_i64(99),
                title:       "x".to_string(),
                description: "y".to_string(),
            })
            .await;

        assert!(result.is_ok());
        assert!(repo.todos().is_empty());
    }

    #[tokio::test]
    async fn test_delete_todoは冪等() {
        let repo = MockTodoRepository::new();
        let sut = sut_with(&repo, fixed_now());
        let created = sut.create_todo(create_input("掃除", "")).await.unwrap();

        sut.delete_todo(&created.id()).await.unwrap();
        sut.delete_todo(&created.id()).await.unwrap();

        assert!(repo.todos().is_empty());
    }

    #[tokio::test]
    async fn test_mark_todo_doneで完了状態になり他のフィールドは維持される() {
        let repo = MockTodoRepository::new();
        let created = sut_with(&repo, fixed_now())
            .create_todo(create_input("掃除", "風呂"))
            .await
            .unwrap();
        let later = fixed_now() + Duration::seconds(10);

        sut_with(&repo, later).mark_todo_done(&created.id()).await.unwrap();

        let done = repo.todos().remove(0);
        assert!(done.completed());
        assert_eq!(done.title(), "掃除");
        assert_eq!(done.description(), "風呂");
        assert_eq!(done.created_at(), fixed_now());
        assert_eq!(done.updated_at(), later);
    }

    #[tokio::test]
    async fn test_リポジトリ障害はdatabaseエラーとして伝播する() {
        let repo = MockTodoRepository::new();
        repo.fail_with_unexpected();
        let sut = sut_with(&repo, fixed_now());

        let result = sut.get_all_todos().await;

        assert!(matches!(result, Err(CoreError::Database(_))));
    }
}
