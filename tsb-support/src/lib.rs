//! Runtime support types referenced by generated foreign-linkage code
//!
//! The foreign-linkage and wrapper artifacts render boundary types against
//! the names in this crate: the opaque object handle, the string/array
//! length-pointer pairs, and the marker types for composite values that are
//! never expanded inline. The host-side glue owns the other end of each of
//! these representations.

use std::fmt;

/// Opaque reference into the host's live-object registry.
///
/// Handle 0 is never a live object and doubles as the null handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct JsHandle(pub u32);

impl JsHandle {
    pub const NULL: JsHandle = JsHandle(0);

    pub fn from_raw(raw: u32) -> Self {
        JsHandle(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for JsHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handle#{}", self.0)
    }
}

/// UTF-8 string crossing the boundary as a length + pointer pair
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct JsString {
    pub len: u32,
    pub ptr: *const u8,
}

impl JsString {
    pub const EMPTY: JsString = JsString {
        len: 0,
        ptr: std::ptr::null(),
    };
}

impl Default for JsString {
    fn default() -> Self {
        JsString::EMPTY
    }
}

/// Array crossing the boundary as a length + element-buffer offset pair
#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
pub struct JsArray {
    pub len: u32,
    pub offset: u32,
}

/// Optional value: presence flag stored past the base value's storage
#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
pub struct JsOptional<T> {
    pub value: T,
    pub present: bool,
}

impl<T> JsOptional<T> {
    pub fn some(value: T) -> Self {
        Self {
            value,
            present: true,
        }
    }

    pub fn into_option(self) -> Option<T> {
        self.present.then_some(self.value)
    }
}

impl<T: Default> JsOptional<T> {
    pub fn none() -> Self {
        Self {
            value: T::default(),
            present: false,
        }
    }
}

impl<T> From<Option<T>> for JsOptional<T>
where
    T: Default,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(value) => JsOptional::some(value),
            None => JsOptional::none(),
        }
    }
}

/// Marker for a union value parked in a boundary slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct JsUnion(pub u32);

/// Marker for an intersection value parked in a boundary slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct JsIntersection(pub u32);

/// Marker for a mapped-type value parked in a boundary slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct JsMapped(pub u32);

/// Dynamically typed host value, carried as a registry handle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct JsAny(pub u32);

/// Arbitrary-precision host integer, truncated to 64 bits at the boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct JsBigInt(pub i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        assert!(JsHandle::NULL.is_null());
        assert!(!JsHandle::from_raw(1).is_null());
        assert_eq!(JsHandle::default(), JsHandle::NULL);
    }

    #[test]
    fn test_optional_round_trip() {
        let some = JsOptional::from(Some(4.0_f64));
        assert!(some.present);
        assert_eq!(some.into_option(), Some(4.0));

        let none: JsOptional<f64> = None.into();
        assert_eq!(none.into_option(), None);
    }
}
