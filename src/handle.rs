//! Opaque handle wrappers exposed to C.

use crate::context::Context;
use crate::set::Set;

/// Opaque handle to a context.
///
/// Closing (`islcore_context_close`) leaves the handle valid so that later
/// calls fail with a closed-context error; `islcore_context_free` releases it.
pub struct IslContextHandle {
    inner: Context,
}

impl IslContextHandle {
    /// Create a new handle wrapping a context.
    pub fn new(context: Context) -> Box<Self> {
        Box::new(Self { inner: context })
    }

    /// Get a reference to the inner context.
    pub fn as_ref(&self) -> &Context {
        &self.inner
    }

    /// Convert a raw pointer to a reference.
    ///
    /// # Safety
    ///
    /// The pointer must be NULL or a live handle from `islcore_context_create`.
    pub unsafe fn from_ptr<'a>(ptr: *const IslContextHandle) -> Option<&'a Self> {
        unsafe { ptr.as_ref() }
    }
}

/// Opaque handle to a set.
///
/// Closing (`islcore_set_close`) leaves the handle valid; `islcore_set_free`
/// releases it.
pub struct IslSetHandle {
    inner: Set,
}

impl IslSetHandle {
    /// Create a new handle wrapping a set.
    pub fn new(set: Set) -> Box<Self> {
        Box::new(Self { inner: set })
    }

    /// Get a reference to the inner set.
    pub fn as_ref(&self) -> &Set {
        &self.inner
    }

    /// Convert a raw pointer to a reference.
    ///
    /// # Safety
    ///
    /// The pointer must be NULL or a live handle returned by one of the set
    /// constructors.
    pub unsafe fn from_ptr<'a>(ptr: *const IslSetHandle) -> Option<&'a Self> {
        unsafe { ptr.as_ref() }
    }
}
