//! PostgreSQL repository tests
//!
//! Each test starts its own container through `TestDatabase`, so they need a
//! running Docker daemon: `cargo test -p domain_users -- --ignored`.

use domain_users::*;
use test_utils::assertions::assert_strictly_ascending;
use test_utils::{TestDataBuilder, TestDatabase};
use uuid::Uuid;

fn input(builder: &TestDataBuilder, prefix: &str) -> CreateUser {
    CreateUser {
        username: builder.username(prefix),
        email: builder.email(prefix),
        password: builder.password(),
    }
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_create_and_get_roundtrip() {
    let db = TestDatabase::new().await;
    let service = UserService::new(PgUserRepository::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("pg_roundtrip");

    let created = service.create_user(input(&builder, "alice")).await.unwrap();
    let fetched = service.get_user(created.id).await.unwrap();

    // Microsecond timestamps survive TIMESTAMPTZ unchanged
    assert_eq!(fetched, created);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_save_twice_is_upsert() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_upsert");

    let mut user = User::new(input(&builder, "bob")).unwrap();
    repo.save(&user).await.unwrap();

    user.username = "bob_renamed".to_string();
    user.touch();
    repo.save(&user).await.unwrap();

    assert_eq!(repo.find_by_id(user.id).await.unwrap(), user);
    assert_eq!(repo.find_all(1, 10).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_update_persists_and_requires_existing_row() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.connection());
    let service = UserService::new(repo.clone());
    let builder = TestDataBuilder::from_test_name("pg_update");

    let created = service.create_user(input(&builder, "carol")).await.unwrap();
    let updated = service
        .update_user(
            created.id,
            UpdateUser {
                email: builder.email("carol2"),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(repo.find_by_id(created.id).await.unwrap(), updated);
    assert_eq!(updated.username, created.username);
    assert!(updated.updated_at > created.updated_at);

    let ghost = User::new(input(&builder, "ghost")).unwrap();
    assert!(matches!(repo.update(&ghost).await, Err(UserError::NotFound(_))));
    assert!(matches!(repo.find_by_id(ghost.id).await, Err(UserError::NotFound(_))));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_delete() {
    let db = TestDatabase::new().await;
    let service = UserService::new(PgUserRepository::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("pg_delete");

    let created = service.create_user(input(&builder, "dave")).await.unwrap();
    service.delete_user(created.id).await.unwrap();

    assert!(matches!(service.get_user(created.id).await, Err(UserError::NotFound(_))));
    assert!(matches!(service.delete_user(created.id).await, Err(UserError::NotFound(_))));
    assert!(matches!(
        service.delete_user(Uuid::now_v7()).await,
        Err(UserError::NotFound(_))
    ));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_pagination_orders_by_id() {
    let db = TestDatabase::new().await;
    db.truncate_users().await;
    let service = UserService::new(PgUserRepository::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("pg_pagination");

    for i in 0..25 {
        service
            .create_user(input(&builder, &format!("user{i}")))
            .await
            .unwrap();
    }

    let mut ids = Vec::new();
    for page in 1..=3 {
        ids.extend(service.list_users(page, 10).await.unwrap().into_iter().map(|u| u.id));
    }

    assert_eq!(ids.len(), 25);
    assert_strictly_ascending(&ids, "postgres pages in id order");
    assert!(service.list_users(4, 10).await.unwrap().is_empty());
    assert!(matches!(
        service.list_users(0, 10).await,
        Err(UserError::InvalidArgument(_))
    ));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_duplicate_email_is_storage_error() {
    let db = TestDatabase::new().await;
    let service = UserService::new(PgUserRepository::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("pg_duplicate_email");

    service.create_user(input(&builder, "erin")).await.unwrap();

    let duplicate = CreateUser {
        username: builder.username("other"),
        ..input(&builder, "erin")
    };
    let err = service.create_user(duplicate).await.unwrap_err();
    assert!(matches!(err, UserError::Storage(_)));
}
