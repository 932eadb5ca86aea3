//! HTTP routes of the to-do demo.

use flecha::{int, json, no_body, BodyIssue, DomainError, PathSpec, Route, Router, Segment};
use serde::Deserialize;

use super::store::{Todo, TodoPatch, TodoStore};

#[derive(Debug, Deserialize)]
pub struct NewTodo {
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

fn blank_title(title: &str) -> Result<(), Vec<BodyIssue>> {
    if title.trim().is_empty() {
        Err(vec![BodyIssue::field("title", "must not be blank")])
    } else {
        Ok(())
    }
}

/// Every route of the demo, in registration order.
pub fn router(store: TodoStore) -> Result<Router, flecha::PathSpecError> {
    let todos = PathSpec::build(["todos"])?;
    let todo = PathSpec::build([Segment::from("todos"), int("todoId").into()])?;

    let create = {
        let store = store.clone();
        Route::post(
            todos.clone(),
            json::<NewTodo>().check(|body| blank_title(&body.title)),
            move |req| {
                let store = store.clone();
                async move { Ok::<_, DomainError>(store.insert(req.body.title).await) }
            },
        )
    };

    let get = {
        let store = store.clone();
        Route::get(todo.clone(), move |req| {
            let store = store.clone();
            async move {
                let id = todo_id(&req.path_params)?;
                store.find(id).await.ok_or_else(DomainError::not_found)
            }
        })
    };

    let update = {
        let store = store.clone();
        Route::put(
            todo.clone(),
            json::<TodoChanges>().check(|body| match &body.title {
                Some(title) => blank_title(title),
                None => Ok(()),
            }),
            move |req| {
                let store = store.clone();
                async move {
                    let id = todo_id(&req.path_params)?;
                    let patch = TodoPatch {
                        title: req.body.title,
                        completed: req.body.completed,
                    };
                    store.update(id, patch).await.ok_or_else(DomainError::not_found)
                }
            },
        )
    };

    let delete = {
        let store = store.clone();
        Route::delete(todo, move |req| {
            let store = store.clone();
            async move {
                let id = todo_id(&req.path_params)?;
                store.delete(id).await.ok_or_else(DomainError::not_found)
            }
        })
    };

    let list = {
        let store = store.clone();
        Route::get(todos, move |_req| {
            let store = store.clone();
            async move { Ok::<Vec<Todo>, DomainError>(store.list().await) }
        })
    };

    let empty_body = Route::post(PathSpec::build(["empty-body"])?, no_body(), |_req| async {
        Ok::<_, DomainError>(())
    });

    Ok(Router::new()
        .with_route(create)
        .with_route(get)
        .with_route(update)
        .with_route(delete)
        .with_route(list)
        .with_route(empty_body))
}

fn todo_id(params: &flecha::ParsedParams) -> Result<i64, DomainError> {
    params
        .int("todoId")
        .ok_or_else(|| DomainError::other("todoId missing from parsed path"))
}
