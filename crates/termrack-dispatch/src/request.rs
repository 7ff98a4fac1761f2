//! The request carried through a middleware chain.
//!
//! A [`Request`] is created once per invocation and handed by `&mut` to every
//! node in the chain. Besides the raw argument vector it carries a
//! string-keyed [`Data`] side channel, which lets middleware pass derived
//! values (parsed flags, timers, user scope) to handlers further down, or
//! lets handlers report back to middleware higher up.
//!
//! # Example
//!
//! ```rust
//! use termrack_dispatch::Request;
//!
//! let mut request = Request::new(["--verbose", "list"]);
//! request.data.insert("verbose", true);
//!
//! assert_eq!(request.first(), Some("--verbose"));
//! assert_eq!(request.data.get::<bool>("verbose"), Some(&true));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// String-keyed container of opaque values.
///
/// Values are stored as `Box<dyn Any>` and retrieved by key plus the expected
/// type. A lookup with the wrong type behaves like a missing key.
///
/// # Warning: Clone Behavior
///
/// Cloning a `Data` produces an empty map, because boxed `Any` values cannot
/// be cloned generically. Wrap shared values in `Rc<T>` if several requests
/// need them.
#[derive(Default)]
pub struct Data {
    map: HashMap<String, Box<dyn Any>>,
}

impl Data {
    /// Creates a new empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value under `key`.
    ///
    /// Returns the previous value if one of the same type was stored there.
    pub fn insert<T: 'static>(&mut self, key: impl Into<String>, val: T) -> Option<T> {
        self.map
            .insert(key.into(), Box::new(val))
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    /// Gets a reference to the value under `key`, if it has type `T`.
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.map.get(key).and_then(|boxed| boxed.downcast_ref())
    }

    /// Gets a mutable reference to the value under `key`, if it has type `T`.
    pub fn get_mut<T: 'static>(&mut self, key: &str) -> Option<&mut T> {
        self.map.get_mut(key).and_then(|boxed| boxed.downcast_mut())
    }

    /// Gets a required reference to the value under `key`.
    ///
    /// Returns an error naming the key and type if it is missing.
    pub fn get_required<T: 'static>(&self, key: &str) -> Result<&T, anyhow::Error> {
        self.get::<T>(key).ok_or_else(|| {
            anyhow::anyhow!(
                "Request data missing: key '{}' of type {} not found",
                key,
                std::any::type_name::<T>()
            )
        })
    }

    /// Removes the value under `key`, returning it if it had type `T`.
    ///
    /// A value of another type is removed as well but not returned.
    pub fn remove<T: 'static>(&mut self, key: &str) -> Option<T> {
        self.map
            .remove(key)
            .and_then(|boxed| boxed.downcast().ok().map(|b| *b))
    }

    /// Returns `true` if any value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Returns the stored keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Removes all values.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Data").field("keys", &keys).finish()
    }
}

impl Clone for Data {
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// A console request: the argument vector plus the data side channel.
#[derive(Debug, Default, Clone)]
pub struct Request {
    /// Program arguments, without the program name.
    pub arguments: Vec<String>,

    /// Values shared between the nodes of one invocation.
    pub data: Data,
}

impl Request {
    /// Creates a request for the given arguments with empty data.
    pub fn new<I, S>(arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            arguments: arguments.into_iter().map(Into::into).collect(),
            data: Data::new(),
        }
    }

    /// Creates a request from the current process arguments, skipping the
    /// program name.
    pub fn from_env() -> Self {
        Self::new(std::env::args().skip(1))
    }

    /// Returns the first argument, if any.
    pub fn first(&self) -> Option<&str> {
        self.arguments.first().map(String::as_str)
    }

    /// Returns `true` if any argument equals one of `flags`.
    ///
    /// This is the ad-hoc flag check middleware typically uses, e.g.
    /// `request.has_flag(&["-v", "--version"])`.
    pub fn has_flag(&self, flags: &[&str]) -> bool {
        self.arguments.iter().any(|arg| flags.contains(&arg.as_str()))
    }
}
