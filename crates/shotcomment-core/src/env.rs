//! Environment variable access behind a trait, so configuration can be
//! assembled from the real process environment or from a test double.
//!
//! # Examples
//!
//! ```
//! use shotcomment_core::env::{ReadEnv, SystemEnv};
//!
//! fn upload_target<E: ReadEnv>(env: &E) -> String {
//!     env.var("INPUT_UPLOAD_TO")
//!         .unwrap_or_else(|_| "github_branch".to_string())
//! }
//!
//! let target = upload_target(&SystemEnv);
//! ```

#[cfg(any(test, feature = "test-support"))]
use std::cell::RefCell;
#[cfg(any(test, feature = "test-support"))]
use std::collections::HashMap;
use std::env::{self, VarError};

use crate::error::{CoreError, CoreResult};

pub trait ReadEnv {
    fn var(&self, key: &str) -> Result<String, VarError>;
}

/// Zero-sized type, delegates to `std::env`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    #[inline]
    fn var(&self, key: &str) -> Result<String, VarError> {
        env::var(key)
    }
}

/// Read a variable that must be present
pub fn required<E: ReadEnv + ?Sized>(env: &E, key: &str) -> CoreResult<String> {
    match env.var(key) {
        Ok(value) => Ok(value),
        Err(VarError::NotPresent) => Err(CoreError::MissingConfig(key.to_string())),
        Err(VarError::NotUnicode(_)) => Err(CoreError::InvalidEnv(key.to_string())),
    }
}

/// Read a variable that may be absent
///
/// An unset variable is `Ok(None)`. A set but empty variable is returned
/// as-is so validation can reject it.
pub fn optional<E: ReadEnv + ?Sized>(env: &E, key: &str) -> CoreResult<Option<String>> {
    match env.var(key) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(CoreError::InvalidEnv(key.to_string())),
    }
}

/// Won't touch the global process environment.
///
/// Uses `RefCell` for interior mutability, so all methods take `&self`.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct InMemoryEnv {
    vars: RefCell<HashMap<String, String>>,
}

#[cfg(any(test, feature = "test-support"))]
impl InMemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.borrow_mut().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.vars.borrow_mut().remove(key);
    }
}

#[cfg(any(test, feature = "test-support"))]
impl<K, V> FromIterator<(K, V)> for InMemoryEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let env = Self::new();
        for (key, value) in iter {
            env.set(key, value);
        }
        env
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ReadEnv for InMemoryEnv {
    fn var(&self, key: &str) -> Result<String, VarError> {
        self.vars
            .borrow()
            .get(key)
            .cloned()
            .ok_or(VarError::NotPresent)
    }
}
