//! Storage infrastructure - connection pooling, migrations and the in-memory store

mod in_memory;
pub mod migrations;
mod postgres;

#[cfg(test)]
pub use in_memory::Faults;
pub(crate) use in_memory::user_still_owns;
pub use in_memory::{InMemoryDatabase, InMemoryState, InMemoryTransaction};
pub use migrations::{run_schema_migrations, schema_migrations, Migration, PostgresMigrator};
pub use postgres::{connect_pool, PostgresConfig};
