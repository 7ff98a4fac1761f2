//! Ordered, name-addressable handler collections.
//!
//! [`NamedList`] keeps entries in insertion order and looks them up by their
//! resolved name. Names are not required to be unique: lookups return the
//! first match, so later duplicates are shadowed rather than rejected.
//!
//! Prefix matching resolves abbreviated command names the way a user types
//! them:
//!
//! ```rust
//! use std::rc::Rc;
//! use termrack_dispatch::{CommandList, Descriptor, Metadata, Request, Response};
//!
//! fn noop(_: &mut Request) -> Response { Response::new() }
//!
//! let commands: CommandList = ["foo", "foot", "bar"]
//!     .into_iter()
//!     .map(|name| Rc::new(Descriptor::command(noop).with_metadata(Metadata::new().name(name))))
//!     .collect();
//!
//! // An exact match wins outright.
//! assert_eq!(commands.match_prefix("foo").names(), ["foo"]);
//! // Otherwise every entry sharing the prefix, sorted by name.
//! assert_eq!(commands.match_prefix("fo").names(), ["foo", "foot"]);
//! assert!(commands.match_prefix("baz").is_empty());
//! ```

use std::rc::Rc;

use crate::descriptor::Descriptor;
use crate::middleware::MiddlewareDescriptor;

/// Anything with a resolved name.
pub trait Named {
    /// The name used for lookups.
    fn name(&self) -> String;
}

impl Named for Descriptor {
    fn name(&self) -> String {
        Descriptor::name(self)
    }
}

impl Named for MiddlewareDescriptor {
    fn name(&self) -> String {
        MiddlewareDescriptor::name(self)
    }
}

impl<T: Named + ?Sized> Named for Rc<T> {
    fn name(&self) -> String {
        (**self).name()
    }
}

/// An ordered collection of named entries.
#[derive(Debug, Clone)]
pub struct NamedList<T> {
    items: Vec<T>,
}

/// Middleware in execution order (once sorted).
pub type MiddlewareList = NamedList<Rc<MiddlewareDescriptor>>;

/// Terminal handlers of kind `Command`.
pub type CommandList = NamedList<Rc<Descriptor>>;

/// Terminal handlers of kind `Application`.
pub type ApplicationList = NamedList<Rc<Descriptor>>;

impl<T> Default for NamedList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> NamedList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Inserts an entry at `index`, shifting later entries back.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, item: T) {
        self.items.insert(index, item);
    }

    /// Removes and returns the entry at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// The first entry.
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// The last entry.
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Iterates entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Entries as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Named> NamedList<T> {
    /// Index of the first entry named exactly `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|item| item.name() == name)
    }

    /// The first entry named exactly `name`.
    pub fn by_name(&self, name: &str) -> Option<&T> {
        self.items.iter().find(|item| item.name() == name)
    }

    /// Resolved names, in list order.
    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(Named::name).collect()
    }
}

impl<T: Named + Clone> NamedList<T> {
    /// Every entry whose name starts with `prefix`, sorted by name.
    ///
    /// The sort is stable, so entries sharing a name keep list order.
    pub fn starting_with(&self, prefix: &str) -> NamedList<T> {
        let mut matches: Vec<(String, T)> = self
            .items
            .iter()
            .filter_map(|item| {
                let name = item.name();
                name.starts_with(prefix).then(|| (name, item.clone()))
            })
            .collect();
        matches.sort_by(|a, b| a.0.cmp(&b.0));
        matches.into_iter().map(|(_, item)| item).collect()
    }

    /// Resolves a possibly abbreviated name.
    ///
    /// An exact match is returned alone, even when other names share it as
    /// a prefix. Otherwise this is [`starting_with`](Self::starting_with).
    pub fn match_prefix(&self, prefix: &str) -> NamedList<T> {
        match self.by_name(prefix) {
            Some(exact) => std::iter::once(exact.clone()).collect(),
            None => self.starting_with(prefix),
        }
    }
}

impl<T> FromIterator<T> for NamedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for NamedList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T> From<Vec<T>> for NamedList<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> IntoIterator for NamedList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a NamedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl MiddlewareList {
    /// Index of exactly `middleware` (same allocation).
    pub(crate) fn index_of(&self, middleware: &Rc<MiddlewareDescriptor>) -> Option<usize> {
        self.items.iter().position(|mw| Rc::ptr_eq(mw, middleware))
    }

    /// Removes exactly `middleware` (same allocation). Returns true if it was
    /// present.
    pub fn remove_middleware(&mut self, middleware: &Rc<MiddlewareDescriptor>) -> bool {
        match self.index_of(middleware) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Moves `middleware` to the front, adding it if absent.
    pub fn move_to_top(&mut self, middleware: &Rc<MiddlewareDescriptor>) {
        self.remove_middleware(middleware);
        self.items.insert(0, middleware.clone());
    }

    /// Moves `middleware` to the back, adding it if absent.
    pub fn move_to_bottom(&mut self, middleware: &Rc<MiddlewareDescriptor>) {
        self.remove_middleware(middleware);
        self.items.push(middleware.clone());
    }

    /// Moves `middleware` directly in front of the entry named `target`.
    ///
    /// The node is removed before the target is looked up. If no entry is
    /// named `target`, the node stays removed and `false` is returned.
    pub fn move_before(&mut self, middleware: &Rc<MiddlewareDescriptor>, target: &str) -> bool {
        self.remove_middleware(middleware);
        match self.position(target) {
            Some(index) => {
                self.items.insert(index, middleware.clone());
                true
            }
            None => false,
        }
    }

    /// Moves `middleware` directly behind the entry named `target`.
    ///
    /// Same removal rule as [`move_before`](Self::move_before).
    pub fn move_after(&mut self, middleware: &Rc<MiddlewareDescriptor>, target: &str) -> bool {
        self.remove_middleware(middleware);
        match self.position(target) {
            Some(index) => {
                self.items.insert(index + 1, middleware.clone());
                true
            }
            None => false,
        }
    }
}
