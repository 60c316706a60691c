//! Hook point for document encryption.
//!
//! Key derivation and cipher selection live with the host; the object model
//! only threads an opaque credential through serialization and hands it the
//! owning object's identifier, which standard security handlers mix into
//! their per-object keys.

/// Opaque per-document credentials consulted when reading or emitting
/// encrypted stream payloads and strings.
pub trait CryptInfo {
    /// Encrypts `data` belonging to the indirect object `(id, generation)`.
    fn encrypt(&self, id: u32, generation: u16, data: &[u8]) -> Vec<u8>;

    /// Decrypts `data` belonging to the indirect object `(id, generation)`.
    fn decrypt(&self, id: u32, generation: u16, data: &[u8]) -> Vec<u8>;
}
