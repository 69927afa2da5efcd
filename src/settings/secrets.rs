//! Secret storage flags.

use bitflags::bitflags;

bitflags! {
    /// How a secret property is stored.
    ///
    /// Anything other than `NONE` means the secret is not persisted by
    /// the keyfile writer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SecretFlags: u32 {
        /// The system persists the secret.
        const NONE = 0x00000000;
        /// A user secret agent owns the secret.
        const AGENT_OWNED = 0x00000001;
        /// The secret is queried from the user each time.
        const NOT_SAVED = 0x00000002;
        /// The secret is not required for the connection to work.
        const NOT_REQUIRED = 0x00000004;
    }
}
