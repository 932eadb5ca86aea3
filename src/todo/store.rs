//! In-memory to-do store.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const MAX_ID: i64 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub completed: bool,
}

/// Changes applied by [`TodoStore::update`]; `None` leaves a field as is.
#[derive(Debug, Default)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct TodoStore {
    todos: Arc<RwLock<BTreeMap<i64, Todo>>>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with a few sample todos.
    pub fn seeded() -> Self {
        let todos = [
            (3903902, "Wash dishes", false),
            (9903912, "Learn F#", false),
            (3782199, "Tend to garden", true),
        ]
        .into_iter()
        .map(|(id, title, completed)| {
            (
                id,
                Todo {
                    id,
                    title: title.to_string(),
                    completed,
                },
            )
        })
        .collect();

        Self {
            todos: Arc::new(RwLock::new(todos)),
        }
    }

    pub async fn insert(&self, title: String) -> Todo {
        let mut todos = self.todos.write().await;

        let mut id = fastrand::i64(0..MAX_ID);
        while todos.contains_key(&id) {
            id = fastrand::i64(0..MAX_ID);
        }

        let todo = Todo {
            id,
            title,
            completed: false,
        };
        todos.insert(id, todo.clone());
        todo
    }

    pub async fn list(&self) -> Vec<Todo> {
        self.todos.read().await.values().cloned().collect()
    }

    pub async fn find(&self, id: i64) -> Option<Todo> {
        self.todos.read().await.get(&id).cloned()
    }

    pub async fn update(&self, id: i64, patch: TodoPatch) -> Option<Todo> {
        let mut todos = self.todos.write().await;
        let todo = todos.get_mut(&id)?;

        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }

        Some(todo.clone())
    }

    pub async fn delete(&self, id: i64) -> Option<Todo> {
        self.todos.write().await.remove(&id)
    }
}
