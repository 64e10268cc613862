//! Raw engine handles and ownership tags.

use std::fmt;

/// Opaque identifier of an engine-side resource.
///
/// Zero is reserved: it marks a failed allocation or a released resource and
/// is never wrapped by a live context or object.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RawHandle(u64);

impl RawHandle {
    pub const NULL: RawHandle = RawHandle(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Replace the handle with `NULL`, returning the previous value.
    pub fn take(&mut self) -> RawHandle {
        std::mem::replace(self, RawHandle::NULL)
    }
}

impl fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawHandle({:#x})", self.0)
    }
}

impl From<u64> for RawHandle {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Whether a wrapper is responsible for releasing its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Released by the wrapper when it is closed.
    Owned,
    /// Someone else releases it; closing only clears local state.
    Borrowed,
}

impl Ownership {
    pub fn is_owned(self) -> bool {
        matches!(self, Ownership::Owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_leaves_null() {
        let mut h = RawHandle::new(7);
        assert!(!h.is_null());
        assert_eq!(h.take(), RawHandle::new(7));
        assert!(h.is_null());
        assert_eq!(h, RawHandle::default());
    }
}
