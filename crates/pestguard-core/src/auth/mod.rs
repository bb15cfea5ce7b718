mod accounts;
mod credentials;

pub use accounts::{AccountFile, Accounts};
pub use credentials::{CredentialStore, DefaultAccount};
