mod common;

use std::collections::HashMap;

use common::TestEnvironment;
use pretty_assertions::assert_eq;
use todo_desk::pages::TodosView;
use todo_desk::pagination::{PageQuery, PageSize, SortOrder};
use todo_desk::{QueryCache, Revision, TodoClient, TodosPage};

fn page(env: &TestEnvironment, revision: Revision) -> TodosPage<TodoClient> {
    TodosPage::new(QueryCache::new(env.client.clone()), revision)
}

fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test_log::test(tokio::test)]
async fn test_next_page_request() {
    let (env, user_id) = TestEnvironment::logged_in().await;
    env.api.seed_todos(user_id, 15);
    let mut todos = page(&env, Revision::new());

    let state = todos.load().await;
    let first = state.data.unwrap();
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.data[0].title, "Seeded todo 15");
    assert_eq!(first.meta.pagination.page_count, 2);

    assert!(todos.next());
    let second = todos.load().await.data.unwrap();
    assert_eq!(second.data.len(), 5);

    let requests = env.api.requests_to("GET", "/api/todos");
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[1].query,
        query(&[
            ("pagination[pageSize]", "10"),
            ("pagination[page]", "2"),
            ("sort", "createdAt:DESC"),
        ])
    );
    assert_eq!(requests[1].bearer.as_deref(), Some(env.token().as_str()));
}

#[tokio::test]
async fn test_last_page_refuses_next() {
    let (env, user_id) = TestEnvironment::logged_in().await;
    env.api.seed_todos(user_id, 15);
    let mut todos = page(&env, Revision::new());

    todos.load().await;
    assert!(todos.next());
    todos.load().await;

    assert!(!todos.next());
    assert_eq!(todos.query().page(), 2);
    match todos.view() {
        TodosView::List { paginator, .. } => {
            assert!(paginator.can_prev());
            assert!(!paginator.can_next());
            assert_eq!(paginator.to_string(), "Page 2 of 2 (15 records)");
        }
        other => panic!("expected list, got {:?}", other),
    }
}

#[tokio::test]
async fn test_first_page_refuses_prev() {
    let (env, _) = TestEnvironment::logged_in().await;
    let mut todos = page(&env, Revision::new());

    todos.load().await;

    assert!(!todos.prev());
    assert_eq!(todos.query().page(), 1);
}

#[tokio::test]
async fn test_oldest_first_sort() {
    let (env, user_id) = TestEnvironment::logged_in().await;
    env.api.seed_todos(user_id, 3);
    let mut todos = page(&env, Revision::new())
        .with_query(PageQuery::new(1, PageSize::Fifty, SortOrder::Asc));

    let data = todos.load().await.data.unwrap().data;

    let titles: Vec<_> = data.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Seeded todo 1", "Seeded todo 2", "Seeded todo 3"]);
    let requests = env.api.requests_to("GET", "/api/todos");
    assert_eq!(
        requests[0].query.get("sort").map(String::as_str),
        Some("createdAt:ASC")
    );
    assert_eq!(
        requests[0].query.get("pagination[pageSize]").map(String::as_str),
        Some("50")
    );
}

#[tokio::test]
async fn test_empty_collection_view() {
    let (env, _) = TestEnvironment::logged_in().await;
    let mut todos = page(&env, Revision::new());

    todos.load().await;

    let view = todos.view();
    assert!(matches!(&view, TodosView::List { titles, .. } if titles.is_empty()));
    assert!(view.to_string().starts_with("No todos found"));
}

#[tokio::test]
async fn test_revisiting_page_refetches() {
    let (env, user_id) = TestEnvironment::logged_in().await;
    env.api.seed_todos(user_id, 15);
    let mut todos = page(&env, Revision::new());

    todos.load().await;
    todos.next();
    todos.load().await;
    todos.prev();
    let state = todos.load().await;

    assert_eq!(state.data.unwrap().meta.pagination.page, 1);
    assert_eq!(env.api.requests_to("GET", "/api/todos").len(), 3);
}

#[tokio::test]
async fn test_revision_bump_refetches_same_page() {
    let (env, user_id) = TestEnvironment::logged_in().await;
    env.api.seed_todos(user_id, 2);
    let revision = Revision::new();
    let mut todos = page(&env, revision.clone());

    todos.load().await;
    env.api.seed_todos(user_id, 1);
    revision.bump();
    let state = todos.load().await;

    assert_eq!(state.data.unwrap().meta.pagination.total, 3);
    assert_eq!(todos.query().revision(), 1);
    assert_eq!(env.api.requests_to("GET", "/api/todos").len(), 2);
}

#[tokio::test]
async fn test_rejected_token_shows_error() {
    let (env, _) = TestEnvironment::logged_in().await;
    env.api.revoke_tokens();
    let mut todos = page(&env, Revision::new());

    let state = todos.load().await;

    let error = state.error.expect("load should fail");
    assert_eq!(error.status, Some(401));
    assert!(matches!(todos.view(), TodosView::Error { .. }));
    assert!(!env.client.is_authenticated());
}

#[tokio::test]
async fn test_direct_list_matches_cached_page() {
    let (env, user_id) = TestEnvironment::logged_in().await;
    env.api.seed_todos(user_id, 12);
    let query = PageQuery::new(2, PageSize::Ten, SortOrder::Desc);
    let mut todos = page(&env, Revision::new()).with_query(query.clone());

    let direct = env.client.list_todos(&query).await.unwrap();
    let cached = todos.load().await.data.unwrap();

    assert_eq!(direct, cached);
    assert_eq!(direct.data.len(), 2);
    assert_eq!(direct.meta.pagination.page, 2);
    let requests = env.api.requests_to("GET", "/api/todos");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].query, requests[1].query);
}
