//! Shared test utilities for the workspace
//!
//! - `TestDatabase`: PostgreSQL container with the real migrations applied (feature: "postgres")
//! - `TestDataBuilder`: deterministic test data
//! - `assertions`: assertion helpers
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_postgres_test");
//!
//!     let username = builder.username("alice");
//!     let email = builder.email("alice");
//! }
//! ```

use uuid::Uuid;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Deterministic test data derived from a seed.
///
/// Generated usernames stay within the 3-20 character range and emails are
/// unique per seed, so parallel tests sharing a database do not collide.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from a hash of the test name.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_user");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// A UUID that is stable for the seed but never issued by the service.
    pub fn user_id(&self) -> Uuid {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    /// Username of at most 20 characters, e.g. `alice_4821`.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let name = TestDataBuilder::new(123_456).username("alice");
    /// assert_eq!(name, "alice_3456");
    /// ```
    pub fn username(&self, prefix: &str) -> String {
        let prefix: String = prefix.chars().take(15).collect();
        format!("{}_{:04}", prefix, self.seed % 10_000)
    }

    /// Email unique to the seed and prefix, e.g. `alice-123456@example.test`.
    pub fn email(&self, prefix: &str) -> String {
        format!("{}-{}@example.test", prefix, self.seed)
    }

    pub fn password(&self) -> String {
        format!("pw-{}", self.seed)
    }
}

/// Test assertion helpers
pub mod assertions {
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    /// Assert `ids` are strictly ascending, i.e. sorted without duplicates.
    pub fn assert_strictly_ascending(ids: &[Uuid], context: &str) {
        for pair in ids.windows(2) {
            assert!(
                pair[0] < pair[1],
                "{}: {} is not before {}",
                context,
                pair[0],
                pair[1]
            );
        }
    }
}
