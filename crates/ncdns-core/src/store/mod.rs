// # Credential Store Implementations
//
// Implementations of the CredentialStore trait for different persistence
// strategies.

pub mod file;
pub mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;
