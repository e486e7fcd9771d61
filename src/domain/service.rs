#[cfg(test)]
use mockall::automock;

/// Credential hashing as an opaque capability. Verification must not leak
/// whether the hash or the password was at fault.
#[cfg_attr(test, automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> anyhow::Result<String>;

    fn verify(&self, password: &str, hash: &str) -> bool;
}
