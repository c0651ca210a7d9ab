pub mod hashmap_reset_request_store;
pub mod hashmap_user_store;
pub mod password_hash;
pub mod postgres_reset_request_store;
pub mod postgres_user_store;

pub use hashmap_reset_request_store::HashMapResetRequestStore;
pub use hashmap_user_store::HashMapUserStore;
pub use postgres_reset_request_store::PostgresResetRequestStore;
pub use postgres_user_store::PostgresUserStore;
