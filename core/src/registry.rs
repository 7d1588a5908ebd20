//! Per-type argument registries.
//!
//! A parser keeps one [`TypeRegistry`] per value category (flags, integers,
//! strings). Each registry owns its specs together with their bindings,
//! defaults, and supply counts, and tracks which of its arguments is the
//! current positional target.

use tracing::{debug, warn};

use crate::binding::{ExternalSlot, Store, ValueBinding};
use crate::error::{ParseError, Result};
use crate::spec::{ArgumentSpec, SpecId};
use crate::value::{ArgKind, ArgValue};

#[derive(Debug, Clone)]
struct Entry<T> {
    spec: ArgumentSpec,
    binding: ValueBinding<T>,
    default: Option<T>,
    supplied: usize,
}

/// A registered argument that is not satisfied after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Shortfall {
    /// Never supplied and no default.
    Missing(String),
    /// Supplied fewer times than its multi-value minimum.
    TooFew { name: String, min: usize, got: usize },
}

/// Arguments of one value type.
///
/// # Examples
///
/// ```
/// use argparse_core::TypeRegistry;
///
/// let mut ints = TypeRegistry::<i32>::new();
/// let id = ints.register(Some("-c"), "--count", "How many");
/// assert_eq!(ints.lookup("-c"), Some(id));
/// assert!(!ints.is_satisfied(id));
///
/// ints.consume(id, "5").unwrap();
/// assert!(ints.is_satisfied(id));
/// assert_eq!(ints.value(id), Some(5));
/// ```
#[derive(Debug, Clone)]
pub struct TypeRegistry<T> {
    entries: Vec<Entry<T>>,
    positional: Option<usize>,
}

impl<T: ArgValue> Default for TypeRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ArgValue> TypeRegistry<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            positional: None,
        }
    }

    /// Registers an argument and returns its handle.
    ///
    /// Name collisions are not rejected here; the owning parser checks all
    /// registries together before every parse.
    pub fn register(
        &mut self,
        short_key: Option<&str>,
        canonical_name: &str,
        description: &str,
    ) -> SpecId {
        let mut spec = ArgumentSpec::new(T::KIND, short_key, canonical_name, description);
        let mut default = None;
        if T::KIND == ArgKind::Flag {
            // An absent flag reads false.
            spec.has_default = true;
            default = Some(T::default());
        }
        self.entries.push(Entry {
            spec,
            binding: ValueBinding::default(),
            default,
            supplied: 0,
        });
        SpecId {
            kind: T::KIND,
            index: self.entries.len() - 1,
        }
    }

    /// Makes repeated occurrences accumulate, requiring at least `min_count`
    /// supplied values.
    pub fn mark_multi(&mut self, id: SpecId, min_count: usize) {
        let entry = self.entry_mut(id);
        entry.spec.is_multi = true;
        entry.spec.min_count = min_count;
        entry.binding.make_sequence();
        self.materialize_default(id);
    }

    /// Makes `id` the target for unmatched bare tokens.
    ///
    /// Only one positional target per registry is active; a later call
    /// replaces the earlier one.
    pub fn mark_positional(&mut self, id: SpecId) {
        if let Some(previous) = self.positional.filter(|&index| index != id.index) {
            warn!(
                previous = %self.entries[previous].spec.canonical_name,
                current = %self.entries[id.index].spec.canonical_name,
                "positional target redefined, latest registration wins"
            );
            self.entries[previous].spec.is_positional = false;
        }
        self.entry_mut(id).spec.is_positional = true;
        self.positional = Some(id.index);
    }

    /// Sets the fallback value and writes it into the binding immediately.
    pub fn set_default(&mut self, id: SpecId, value: T) {
        let entry = self.entry_mut(id);
        entry.spec.has_default = true;
        entry.spec.explicit_default = true;
        entry.default = Some(value);
        self.materialize_default(id);
    }

    /// Binds a caller-owned scalar slot.
    pub fn bind_single(&mut self, id: SpecId, store: Store<T>) {
        self.entry_mut(id).binding = ValueBinding::External(ExternalSlot::Single(store));
        self.materialize_default(id);
    }

    /// Binds a caller-owned sequence slot.
    pub fn bind_multi(&mut self, id: SpecId, store: Store<Vec<T>>) {
        self.entry_mut(id).binding = ValueBinding::External(ExternalSlot::Multi(store));
        self.materialize_default(id);
    }

    /// Replaces the help description.
    pub fn set_description(&mut self, id: SpecId, text: &str) {
        self.entry_mut(id).spec.description = text.to_string();
    }

    /// Finds an argument by canonical name or short key.
    pub fn lookup(&self, key: &str) -> Option<SpecId> {
        self.entries
            .iter()
            .position(|entry| entry.spec.matches(key))
            .map(|index| SpecId { kind: T::KIND, index })
    }

    /// Finds an argument by canonical name only.
    pub fn find_canonical(&self, name: &str) -> Option<SpecId> {
        self.entries
            .iter()
            .position(|entry| entry.spec.canonical_name == name)
            .map(|index| SpecId { kind: T::KIND, index })
    }

    /// The active positional target, if any.
    pub fn positional(&self) -> Option<SpecId> {
        self.positional.map(|index| SpecId { kind: T::KIND, index })
    }

    /// Coerces `raw` and stores it.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NotANumber`] or [`ParseError::OutOfRange`] when
    /// coercion fails, and [`ParseError::StorageBusy`] when the bound store is
    /// borrowed.
    pub fn consume(&mut self, id: SpecId, raw: &str) -> Result<()> {
        let name = &self.entries[id.index].spec.canonical_name;
        let value = T::coerce(raw).map_err(|err| ParseError::coercion(name, raw, err))?;
        self.assign(id, value)
    }

    /// Stores an already typed value: appends for multi-value arguments,
    /// overwrites otherwise.
    pub fn assign(&mut self, id: SpecId, value: T) -> Result<()> {
        let entry = self.entry_mut(id);
        debug!(argument = %entry.spec.canonical_name, value = ?value, "assigning value");
        if entry.spec.is_multi && entry.supplied == 0 && entry.default.is_some() {
            // Drop the materialized default before the first real value.
            entry
                .binding
                .clear()
                .map_err(|_| ParseError::StorageBusy(entry.spec.canonical_name.clone()))?;
        }
        entry
            .binding
            .assign(value)
            .map_err(|_| ParseError::StorageBusy(entry.spec.canonical_name.clone()))?;
        entry.supplied += 1;
        Ok(())
    }

    /// True if a value was supplied or a default exists (multi-value
    /// arguments must also reach their minimum).
    pub fn is_satisfied(&self, id: SpecId) -> bool {
        self.shortfall(&self.entries[id.index]).is_none()
    }

    /// Number of values supplied during the current parse.
    pub fn supplied(&self, id: SpecId) -> usize {
        self.entries[id.index].supplied
    }

    /// The spec behind `id`.
    pub fn spec(&self, id: SpecId) -> &ArgumentSpec {
        &self.entries[id.index].spec
    }

    /// All specs in registration order.
    pub fn specs(&self) -> impl Iterator<Item = &ArgumentSpec> {
        self.entries.iter().map(|entry| &entry.spec)
    }

    /// The configured default, if any.
    pub fn default_value(&self, id: SpecId) -> Option<&T> {
        self.entries[id.index].default.as_ref()
    }

    /// Current scalar value (last value for multi-value arguments).
    pub fn value(&self, id: SpecId) -> Option<T> {
        let entry = &self.entries[id.index];
        if entry.supplied == 0 && entry.default.is_none() {
            return None;
        }
        entry.binding.single()
    }

    /// Every current value in supplied order.
    pub fn values(&self, id: SpecId) -> Vec<T> {
        let entry = &self.entries[id.index];
        if entry.supplied == 0 && entry.default.is_none() && !entry.binding.is_sequence() {
            return Vec::new();
        }
        entry.binding.all()
    }

    /// Forgets what the previous parse supplied and re-applies defaults.
    pub(crate) fn reset(&mut self) {
        for index in 0..self.entries.len() {
            let entry = &mut self.entries[index];
            if entry.supplied == 0 {
                continue;
            }
            entry.supplied = 0;
            if entry.binding.clear().is_err() {
                warn!(
                    argument = %entry.spec.canonical_name,
                    "bound storage busy, previous values kept"
                );
            }
            self.materialize_default(SpecId { kind: T::KIND, index });
        }
    }

    pub(crate) fn shortfalls(&self) -> Vec<Shortfall> {
        self.entries
            .iter()
            .filter_map(|entry| self.shortfall(entry))
            .collect()
    }

    fn shortfall(&self, entry: &Entry<T>) -> Option<Shortfall> {
        let spec = &entry.spec;
        if entry.supplied == 0 {
            let empty_ok = spec.is_multi && spec.min_count == 0;
            return (!spec.has_default && !empty_ok)
                .then(|| Shortfall::Missing(spec.canonical_name.clone()));
        }
        (spec.is_multi && entry.supplied < spec.min_count).then(|| Shortfall::TooFew {
            name: spec.canonical_name.clone(),
            min: spec.min_count,
            got: entry.supplied,
        })
    }

    fn materialize_default(&mut self, id: SpecId) {
        let entry = self.entry_mut(id);
        if entry.supplied > 0 {
            return;
        }
        let Some(default) = entry.default.clone() else {
            return;
        };
        let written = entry.binding.clear().and_then(|()| entry.binding.assign(default));
        if written.is_err() {
            warn!(argument = %entry.spec.canonical_name, "bound storage busy, default not written");
        }
    }

    fn entry_mut(&mut self, id: SpecId) -> &mut Entry<T> {
        debug_assert_eq!(id.kind, T::KIND, "handle used with the wrong registry");
        &mut self.entries[id.index]
    }
}

/// The three per-type registries of one parser.
///
/// Name lookups go through [`Registries::lookup`], which applies the fixed
/// category priority: flags, then strings, then integers.
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub flags: TypeRegistry<bool>,
    pub ints: TypeRegistry<i32>,
    pub strings: TypeRegistry<String>,
}

impl Registries {
    /// Resolves a key against flags, strings, then integers.
    pub fn lookup(&self, key: &str) -> Option<SpecId> {
        self.flags
            .lookup(key)
            .or_else(|| self.strings.lookup(key))
            .or_else(|| self.ints.lookup(key))
    }

    /// The spec behind `id`, whichever registry holds it.
    pub fn spec(&self, id: SpecId) -> &ArgumentSpec {
        match id.kind {
            ArgKind::Flag => self.flags.spec(id),
            ArgKind::Int => self.ints.spec(id),
            ArgKind::String => self.strings.spec(id),
        }
    }

    /// Stores a raw token for `id`; flags ignore the text and record presence.
    pub fn consume(&mut self, id: SpecId, raw: &str) -> Result<()> {
        match id.kind {
            ArgKind::Flag => self.flags.assign(id, true),
            ArgKind::Int => self.ints.consume(id, raw),
            ArgKind::String => self.strings.consume(id, raw),
        }
    }

    /// Every spec, grouped by registry.
    pub fn specs(&self) -> impl Iterator<Item = &ArgumentSpec> {
        self.flags
            .specs()
            .chain(self.strings.specs())
            .chain(self.ints.specs())
    }

    /// Explicit default of `id` rendered for display.
    pub fn rendered_default(&self, id: SpecId) -> Option<String> {
        if !self.spec(id).explicit_default {
            return None;
        }
        match id.kind {
            ArgKind::Flag => self.flags.default_value(id).map(|value| value.render()),
            ArgKind::Int => self.ints.default_value(id).map(|value| value.render()),
            ArgKind::String => self.strings.default_value(id).map(|value| value.render()),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.flags.reset();
        self.ints.reset();
        self.strings.reset();
    }

    pub(crate) fn shortfalls(&self) -> Vec<Shortfall> {
        let mut all = self.flags.shortfalls();
        all.extend(self.strings.shortfalls());
        all.extend(self.ints.shortfalls());
        all
    }
}

/// Value types that have a registry inside [`Registries`].
pub trait Registered: ArgValue {
    fn registry(registries: &Registries) -> &TypeRegistry<Self>;
    fn registry_mut(registries: &mut Registries) -> &mut TypeRegistry<Self>;
}

impl Registered for bool {
    fn registry(registries: &Registries) -> &TypeRegistry<Self> {
        &registries.flags
    }

    fn registry_mut(registries: &mut Registries) -> &mut TypeRegistry<Self> {
        &mut registries.flags
    }
}

impl Registered for i32 {
    fn registry(registries: &Registries) -> &TypeRegistry<Self> {
        &registries.ints
    }

    fn registry_mut(registries: &mut Registries) -> &mut TypeRegistry<Self> {
        &mut registries.ints
    }
}

impl Registered for String {
    fn registry(registries: &Registries) -> &TypeRegistry<Self> {
        &registries.strings
    }

    fn registry_mut(registries: &mut Registries) -> &mut TypeRegistry<Self> {
        &mut registries.strings
    }
}

/// Value types that take a value token and may be multi-valued or
/// positional. Flags are presence-only and do not qualify.
pub trait ValueArg: Registered {}

impl ValueArg for i32 {}

impl ValueArg for String {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_both_names() {
        let mut strings = TypeRegistry::<String>::new();
        let id = strings.register(Some("-p"), "--param1", "");
        assert_eq!(strings.lookup("--param1"), Some(id));
        assert_eq!(strings.lookup("-p"), Some(id));
        assert_eq!(strings.lookup("--param2"), None);
        assert_eq!(strings.find_canonical("-p"), None);
    }

    #[test]
    fn test_default_is_materialized_eagerly() {
        let mut ints = TypeRegistry::<i32>::new();
        let id = ints.register(None, "--param1", "");
        ints.set_default(id, 5);
        assert_eq!(ints.value(id), Some(5));
        assert!(ints.is_satisfied(id));
        assert_eq!(ints.supplied(id), 0);
    }

    #[test]
    fn test_default_written_to_later_bound_store() {
        let mut ints = TypeRegistry::<i32>::new();
        let store = Store::new(0);
        let id = ints.register(None, "--n", "");
        ints.set_default(id, 7);
        ints.bind_single(id, store.clone());
        assert_eq!(store.get(), 7);
    }

    #[test]
    fn test_multi_default_replaced_by_first_value() {
        let mut ints = TypeRegistry::<i32>::new();
        let id = ints.register(None, "--n", "");
        ints.set_default(id, 1);
        ints.mark_multi(id, 0);
        assert_eq!(ints.values(id), vec![1]);

        ints.consume(id, "4").unwrap();
        ints.consume(id, "5").unwrap();
        assert_eq!(ints.values(id), vec![4, 5]);
    }

    #[test]
    fn test_scalar_overwrites() {
        let mut strings = TypeRegistry::<String>::new();
        let id = strings.register(None, "--s", "");
        strings.consume(id, "a").unwrap();
        strings.consume(id, "b").unwrap();
        assert_eq!(strings.value(id).as_deref(), Some("b"));
        assert_eq!(strings.supplied(id), 2);
    }

    #[test]
    fn test_consume_reports_coercion_kind() {
        let mut ints = TypeRegistry::<i32>::new();
        let id = ints.register(None, "--n", "");
        assert!(matches!(ints.consume(id, "x"), Err(ParseError::NotANumber { .. })));
        assert!(matches!(
            ints.consume(id, "4294967296"),
            Err(ParseError::OutOfRange { .. })
        ));
        assert_eq!(ints.supplied(id), 0);
    }

    #[test]
    fn test_flags_default_to_false() {
        let mut flags = TypeRegistry::<bool>::new();
        let id = flags.register(Some("-v"), "--verbose", "");
        assert!(flags.is_satisfied(id));
        assert_eq!(flags.value(id), Some(false));
        assert!(!flags.spec(id).explicit_default);
    }

    #[test]
    fn test_positional_redefinition_latest_wins() {
        let mut ints = TypeRegistry::<i32>::new();
        let first = ints.register(None, "--a", "");
        let second = ints.register(None, "--b", "");
        ints.mark_positional(first);
        ints.mark_positional(second);
        assert_eq!(ints.positional(), Some(second));
        assert!(!ints.spec(first).is_positional);
        assert!(ints.spec(second).is_positional);
    }

    #[test]
    fn test_shortfalls() {
        let mut ints = TypeRegistry::<i32>::new();
        let required = ints.register(None, "--req", "");
        let many = ints.register(None, "--many", "");
        let optional_many = ints.register(None, "--any", "");
        ints.mark_multi(many, 3);
        ints.mark_multi(optional_many, 0);
        ints.consume(many, "1").unwrap();

        assert!(!ints.is_satisfied(required));
        assert!(ints.is_satisfied(optional_many));
        assert_eq!(
            ints.shortfalls(),
            vec![
                Shortfall::Missing("--req".to_string()),
                Shortfall::TooFew {
                    name: "--many".to_string(),
                    min: 3,
                    got: 1
                },
            ]
        );
    }

    #[test]
    fn test_registries_lookup_priority() {
        let mut registries = Registries::default();
        let int_id = registries.ints.register(Some("-x"), "--int", "");
        let string_id = registries.strings.register(Some("-x"), "--string", "");
        assert_eq!(registries.lookup("-x"), Some(string_id));

        let flag_id = registries.flags.register(Some("-x"), "--flag", "");
        assert_eq!(registries.lookup("-x"), Some(flag_id));
        assert_eq!(registries.lookup("--int"), Some(int_id));
    }

    #[test]
    fn test_rendered_default_only_when_explicit() {
        let mut registries = Registries::default();
        let flag = registries.flags.register(None, "--quiet", "");
        let named = registries.strings.register(None, "--name", "");
        assert_eq!(registries.rendered_default(flag), None);

        registries.flags.set_default(flag, true);
        registries.strings.set_default(named, "bob".to_string());
        assert_eq!(registries.rendered_default(flag).as_deref(), Some("true"));
        assert_eq!(registries.rendered_default(named).as_deref(), Some("bob"));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut strings = TypeRegistry::<String>::new();
        let id = strings.register(None, "--s", "");
        strings.set_default(id, "d".to_string());
        strings.consume(id, "x").unwrap();
        strings.reset();
        assert_eq!(strings.supplied(id), 0);
        assert_eq!(strings.value(id).as_deref(), Some("d"));
    }
}
