//! Per-argument value storage.
//!
//! Every registered argument owns exactly one [`ValueBinding`]. A binding
//! either keeps its values internally or writes through a [`Store`] that the
//! caller created and still holds. Writes to a store are checked: if the
//! caller is holding a borrow of it while parsing, the write is refused
//! rather than aliased.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Caller-owned storage slot an argument can be bound to.
///
/// Cloning a `Store` clones the handle, not the value: the parser and the
/// caller observe the same slot.
///
/// # Examples
///
/// ```
/// use argparse_core::{ArgParser, Store};
///
/// let count = Store::new(0);
/// let mut parser = ArgParser::new("demo");
/// parser.add_int_argument("--count", "how many").store_value(count.clone());
///
/// assert!(parser.parse(["demo", "--count=3"]));
/// assert_eq!(count.get(), 3);
/// ```
#[derive(Default)]
pub struct Store<T>(Rc<RefCell<T>>);

impl<T> Store<T> {
    /// Creates a slot holding `value`.
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Runs `f` with a shared borrow of the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow())
    }

    /// Replaces the current value.
    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().clone()
    }

    /// Moves the value out, leaving `T::default()` behind.
    pub fn take(&self) -> T
    where
        T: Default,
    {
        self.0.take()
    }

    pub(crate) fn try_write<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, BorrowConflict> {
        let mut guard = self.0.try_borrow_mut().map_err(|_| BorrowConflict)?;
        Ok(f(&mut guard))
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(value) => f.debug_tuple("Store").field(&*value).finish(),
            Err(_) => f.write_str("Store(<borrowed>)"),
        }
    }
}

/// The caller held a borrow of a [`Store`] while the parser tried to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BorrowConflict;

/// Internally owned values.
#[derive(Debug, Clone, PartialEq)]
pub enum Values<T> {
    Single(T),
    Multi(Vec<T>),
}

/// Caller-owned values.
#[derive(Debug, Clone)]
pub enum ExternalSlot<T> {
    Single(Store<T>),
    Multi(Store<Vec<T>>),
}

/// Where an argument's values live.
#[derive(Debug, Clone)]
pub enum ValueBinding<T> {
    Owned(Values<T>),
    External(ExternalSlot<T>),
}

impl<T: Clone + Default> Default for ValueBinding<T> {
    fn default() -> Self {
        Self::Owned(Values::Single(T::default()))
    }
}

impl<T: Clone + Default> ValueBinding<T> {
    /// Whether writes append instead of overwrite.
    pub fn is_sequence(&self) -> bool {
        matches!(
            self,
            Self::Owned(Values::Multi(_)) | Self::External(ExternalSlot::Multi(_))
        )
    }

    /// Switches an owned scalar to an owned sequence; external slots keep
    /// the shape the caller chose.
    pub(crate) fn make_sequence(&mut self) {
        if let Self::Owned(Values::Single(_)) = self {
            *self = Self::Owned(Values::Multi(Vec::new()));
        }
    }

    /// Overwrites a scalar or appends to a sequence.
    pub(crate) fn assign(&mut self, value: T) -> Result<(), BorrowConflict> {
        match self {
            Self::Owned(Values::Single(slot)) => *slot = value,
            Self::Owned(Values::Multi(items)) => items.push(value),
            Self::External(ExternalSlot::Single(store)) => store.try_write(|slot| *slot = value)?,
            Self::External(ExternalSlot::Multi(store)) => {
                store.try_write(|items| items.push(value))?
            }
        }
        Ok(())
    }

    /// Empties a sequence; scalars are left alone.
    pub(crate) fn clear(&mut self) -> Result<(), BorrowConflict> {
        match self {
            Self::Owned(Values::Multi(items)) => items.clear(),
            Self::External(ExternalSlot::Multi(store)) => store.try_write(Vec::clear)?,
            Self::Owned(Values::Single(_)) | Self::External(ExternalSlot::Single(_)) => {}
        }
        Ok(())
    }

    /// The scalar value, or the last element of a sequence.
    pub fn single(&self) -> Option<T> {
        match self {
            Self::Owned(Values::Single(value)) => Some(value.clone()),
            Self::Owned(Values::Multi(items)) => items.last().cloned(),
            Self::External(ExternalSlot::Single(store)) => Some(store.get()),
            Self::External(ExternalSlot::Multi(store)) => store.with(|items| items.last().cloned()),
        }
    }

    /// Every stored value in supplied order.
    pub fn all(&self) -> Vec<T> {
        match self {
            Self::Owned(Values::Single(value)) => vec![value.clone()],
            Self::Owned(Values::Multi(items)) => items.clone(),
            Self::External(ExternalSlot::Single(store)) => vec![store.get()],
            Self::External(ExternalSlot::Multi(store)) => store.get(),
        }
    }
}
