//! NumberPlay Persistence - Credential storage, database and encryption layer

pub mod encryption;
pub mod session;
pub mod sqlite;

pub use encryption::derive_machine_key;
pub use encryption::TokenEncryptor;
pub use session::{
    CredentialStore, MemoryCredentialStore, SessionContext, SqliteCredentialStore,
    ACCESS_TOKEN_KEY,
};
pub use sqlite::Database;
