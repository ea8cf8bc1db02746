//! Credentials module
//!
//! Supplies object-store secrets through the `SecretProvider` trait.
//! Credentials are acquired for the duration of a client build and then
//! dropped; nothing is written to the process environment.

mod provider;
mod types;

pub use provider::{
    EnvSecretProvider, FileSecretProvider, NoSecrets, SecretProvider, StaticSecretProvider,
};
pub use types::{AwsCredentials, CredentialsFile, SecretString};
