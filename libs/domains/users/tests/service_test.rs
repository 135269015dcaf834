//! Service behaviour against the in-memory repository
//!
//! These tests exercise the full create/read/update/delete/list cycle
//! without any external infrastructure, including concurrent access.

use domain_users::*;
use futures::future::join_all;
use std::collections::HashSet;
use test_utils::TestDataBuilder;
use test_utils::assertions::{assert_strictly_ascending, assert_uuid_eq};
use uuid::Uuid;

fn service() -> UserService<InMemoryUserRepository> {
    UserService::new(InMemoryUserRepository::new())
}

fn input(builder: &TestDataBuilder, prefix: &str) -> CreateUser {
    CreateUser {
        username: builder.username(prefix),
        email: builder.email(prefix),
        password: builder.password(),
    }
}

#[tokio::test]
async fn test_create_then_get_returns_same_user() {
    let service = service();
    let builder = TestDataBuilder::from_test_name("create_then_get");

    let created = service.create_user(input(&builder, "alice")).await.unwrap();
    let fetched = service.get_user(created.id).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(created.password, builder.password());
    assert_eq!(created.created_at, created.updated_at);
}

#[tokio::test]
async fn test_invalid_create_leaves_store_empty() {
    let service = service();

    let err = service
        .create_user(CreateUser {
            username: "ab".to_string(),
            email: "ab@example.test".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, UserError::Validation(_)));
    assert!(service.list_users(1, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_changes_only_supplied_fields() {
    let service = service();
    let builder = TestDataBuilder::from_test_name("update_partial");
    let created = service.create_user(input(&builder, "carol")).await.unwrap();

    let updated = service
        .update_user(
            created.id,
            UpdateUser {
                email: "carol.new@example.test".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_uuid_eq(updated.id, created.id, "id is immutable");
    assert_eq!(updated.username, created.username);
    assert_eq!(updated.email, "carol.new@example.test");
    assert_eq!(updated.password, created.password);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    assert_eq!(service.get_user(created.id).await.unwrap(), updated);
}

#[tokio::test]
async fn test_empty_update_only_refreshes_timestamp() {
    let service = service();
    let builder = TestDataBuilder::from_test_name("update_empty");
    let created = service.create_user(input(&builder, "dave")).await.unwrap();

    let first = service
        .update_user(created.id, UpdateUser::default())
        .await
        .unwrap();
    let second = service
        .update_user(created.id, UpdateUser::default())
        .await
        .unwrap();

    assert_eq!(second.username, created.username);
    assert_eq!(second.email, created.email);
    assert!(first.updated_at > created.updated_at);
    assert!(second.updated_at > first.updated_at);
}

#[tokio::test]
async fn test_update_rejects_out_of_range_username() {
    let service = service();
    let builder = TestDataBuilder::from_test_name("update_bad_username");
    let created = service.create_user(input(&builder, "erin")).await.unwrap();

    let err = service
        .update_user(
            created.id,
            UpdateUser {
                username: "x".repeat(21),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, UserError::Validation(_)));
    assert_eq!(service.get_user(created.id).await.unwrap(), created);
}

#[tokio::test]
async fn test_unknown_id_is_not_found_everywhere() {
    let service = service();
    let id = Uuid::now_v7();

    assert!(matches!(service.get_user(id).await, Err(UserError::NotFound(got)) if got == id));
    assert!(matches!(
        service.update_user(id, UpdateUser::default()).await,
        Err(UserError::NotFound(_))
    ));
    assert!(matches!(service.delete_user(id).await, Err(UserError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let service = service();
    let builder = TestDataBuilder::from_test_name("delete_then_get");
    let created = service.create_user(input(&builder, "frank")).await.unwrap();

    service.delete_user(created.id).await.unwrap();

    assert!(matches!(service.get_user(created.id).await, Err(UserError::NotFound(_))));
    assert!(matches!(service.delete_user(created.id).await, Err(UserError::NotFound(_))));
}

#[tokio::test]
async fn test_update_after_delete_does_not_resurrect() {
    let repo = InMemoryUserRepository::new();
    let service = UserService::new(repo.clone());
    let builder = TestDataBuilder::from_test_name("update_after_delete");
    let created = service.create_user(input(&builder, "gina")).await.unwrap();

    // Load, then lose the race against a delete before writing back.
    let mut stale = repo.find_by_id(created.id).await.unwrap();
    service.delete_user(created.id).await.unwrap();
    stale.touch();

    assert!(matches!(repo.update(&stale).await, Err(UserError::NotFound(_))));
    assert!(matches!(repo.find_by_id(created.id).await, Err(UserError::NotFound(_))));
}

#[tokio::test]
async fn test_pagination_covers_population_without_overlap() {
    let service = service();
    let builder = TestDataBuilder::from_test_name("pagination");

    for i in 0..25 {
        service
            .create_user(input(&builder, &format!("user{i}")))
            .await
            .unwrap();
    }

    let page1 = service.list_users(1, 10).await.unwrap();
    let page2 = service.list_users(2, 10).await.unwrap();
    let page3 = service.list_users(3, 10).await.unwrap();
    let page4 = service.list_users(4, 10).await.unwrap();

    assert_eq!(page1.len(), 10);
    assert_eq!(page2.len(), 10);
    assert_eq!(page3.len(), 5);
    assert!(page4.is_empty());

    let ids: Vec<Uuid> = [page1, page2, page3]
        .into_iter()
        .flatten()
        .map(|u| u.id)
        .collect();
    assert_eq!(ids.len(), 25);
    assert_strictly_ascending(&ids, "pages concatenate in id order");

    // Listing twice gives the same order.
    let again: Vec<Uuid> = service
        .list_users(1, 25)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    assert_eq!(again, ids);
}

#[tokio::test]
async fn test_list_rejects_invalid_pagination() {
    let service = service();

    for (page, page_size) in [(0, 10), (-1, 10), (1, 0), (1, -5)] {
        assert!(
            matches!(
                service.list_users(page, page_size).await,
                Err(UserError::InvalidArgument(_))
            ),
            "page={page} page_size={page_size}"
        );
    }
}

#[tokio::test]
async fn test_concurrent_creates_are_all_stored() {
    let service = service();
    let builder = TestDataBuilder::from_test_name("concurrent_creates");

    let tasks = (0..50).map(|i| {
        let service = service.clone();
        let input = input(&builder, &format!("c{i}"));
        tokio::spawn(async move { service.create_user(input).await })
    });

    let ids: HashSet<Uuid> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap().id)
        .collect();

    assert_eq!(ids.len(), 50);
    assert_eq!(service.list_users(1, 100).await.unwrap().len(), 50);
}

#[tokio::test]
async fn test_concurrent_updates_and_reads() {
    let service = service();
    let builder = TestDataBuilder::from_test_name("concurrent_updates");
    let created = service.create_user(input(&builder, "hank")).await.unwrap();

    let writers = (0..20).map(|i| {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .update_user(
                    created.id,
                    UpdateUser {
                        email: format!("hank{i}@example.test"),
                        ..Default::default()
                    },
                )
                .await
                .map(|_| ())
        })
    });
    let readers = (0..20).map(|_| {
        let service = service.clone();
        tokio::spawn(async move { service.get_user(created.id).await.map(|_| ()) })
    });

    for joined in join_all(writers.chain(readers)).await {
        joined.unwrap().unwrap();
    }

    let last = service.get_user(created.id).await.unwrap();
    assert!(last.email.starts_with("hank"));
    assert!(last.updated_at > created.updated_at);
}
