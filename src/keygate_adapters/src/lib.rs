pub mod config;
pub mod email;
pub mod persistence;

pub use email::{MockEmailSender, PostmarkEmailSender, SentEmail, SentEmailKind};
pub use persistence::{
    HashMapResetRequestStore, HashMapUserStore, PostgresResetRequestStore, PostgresUserStore,
};
