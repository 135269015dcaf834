//! Apply or roll back the users schema by hand, outside of API start-up.
//!
//! ```text
//! DATABASE_URL=postgresql://localhost/users cargo run -p migration -- up
//! DATABASE_URL=postgresql://localhost/users cargo run -p migration -- status
//! ```

use migration::Migrator;
use sea_orm_migration::cli;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
