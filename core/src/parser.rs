//! The [`ArgParser`] façade: registration, parsing, and typed getters.

use std::marker::PhantomData;

use tracing::debug;

use crate::binding::Store;
use crate::error::{ParseError, Result};
use crate::help;
use crate::registry::{Registered, Registries, ValueArg};
use crate::resolver::{self, HELP_LONG, HELP_SHORT, Resolution};
use crate::spec::{ArgumentSpec, SpecId, normalize_long};
use crate::validate::{check_coincidence, check_completeness};

const DEFAULT_HELP_TEXT: &str = "Display this help and exit";

/// Successful result of [`ArgParser::try_parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Every token was routed and every argument is satisfied.
    Parsed,
    /// `-h`/`--help` was supplied; parsing stopped there.
    HelpRequested,
}

/// Declarative command-line parser.
///
/// Arguments are registered through the `add_*` methods, each of which
/// returns an [`ArgBuilder`] scoped to that one argument. After
/// [`parse`](Self::parse) the typed getters read the results.
///
/// # Examples
///
/// ```
/// use argparse_core::{ArgParser, Store};
///
/// let values = Store::new(Vec::new());
/// let mut parser = ArgParser::new("Program");
/// parser
///     .add_int_argument("--N", "numbers")
///     .multi_value(1)
///     .positional()
///     .store_values(values.clone());
/// parser.add_flag_with_short("-s", "--sum", "add args");
///
/// assert!(parser.parse(["app", "1", "2", "3", "--sum"]));
/// assert!(parser.get_flag("--sum"));
/// assert_eq!(values.get(), vec![1, 2, 3]);
/// ```
#[derive(Debug)]
pub struct ArgParser {
    program_name: String,
    description: Option<String>,
    help_id: SpecId,
    help_requested: bool,
    last_error: Option<ParseError>,
    order: Vec<SpecId>,
    registries: Registries,
}

impl ArgParser {
    /// Creates a parser with only the built-in help flag registered.
    pub fn new(program_name: impl Into<String>) -> Self {
        let mut registries = Registries::default();
        let help_id = registries
            .flags
            .register(Some(HELP_SHORT), HELP_LONG, DEFAULT_HELP_TEXT);
        Self {
            program_name: program_name.into(),
            description: None,
            help_id,
            help_requested: false,
            last_error: None,
            order: Vec::new(),
            registries,
        }
    }

    /// Name shown on the first line of the help text.
    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    /// Program description set by [`add_help`](Self::add_help).
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Sets the program description shown in help.
    ///
    /// `-h`/`--help` is always recognized; this only documents the program.
    pub fn add_help(&mut self, description: &str) -> &mut Self {
        self.description = Some(description.to_string());
        self
    }

    /// Registers a presence-only flag.
    pub fn add_flag(&mut self, name: &str, description: &str) -> ArgBuilder<'_, bool> {
        self.register(None, name, description)
    }

    /// Registers a presence-only flag with a short key.
    pub fn add_flag_with_short(
        &mut self,
        short: &str,
        name: &str,
        description: &str,
    ) -> ArgBuilder<'_, bool> {
        self.register(Some(short), name, description)
    }

    /// Registers an integer argument.
    pub fn add_int_argument(&mut self, name: &str, description: &str) -> ArgBuilder<'_, i32> {
        self.register(None, name, description)
    }

    /// Registers an integer argument with a short key.
    pub fn add_int_argument_with_short(
        &mut self,
        short: &str,
        name: &str,
        description: &str,
    ) -> ArgBuilder<'_, i32> {
        self.register(Some(short), name, description)
    }

    /// Registers a string argument.
    pub fn add_string_argument(&mut self, name: &str, description: &str) -> ArgBuilder<'_, String> {
        self.register(None, name, description)
    }

    /// Registers a string argument with a short key.
    pub fn add_string_argument_with_short(
        &mut self,
        short: &str,
        name: &str,
        description: &str,
    ) -> ArgBuilder<'_, String> {
        self.register(Some(short), name, description)
    }

    fn register<T: Registered>(
        &mut self,
        short: Option<&str>,
        name: &str,
        description: &str,
    ) -> ArgBuilder<'_, T> {
        let id = T::registry_mut(&mut self.registries).register(short, name, description);
        debug!(
            argument = %self.registries.spec(id).canonical_name,
            kind = ?id.kind(),
            "registered"
        );
        self.order.push(id);
        ArgBuilder {
            parser: self,
            id,
            _marker: PhantomData,
        }
    }

    /// Parses `tokens` (index 0 is the program name).
    ///
    /// Returns `false` on any failure after writing `error: <message>` to
    /// stderr; the error stays available through
    /// [`last_error`](Self::last_error). A help request counts as success.
    pub fn parse<I, S>(&mut self, tokens: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match self.try_parse(tokens) {
            Ok(_) => true,
            Err(err) => {
                debug!(program = %self.program_name, error = %err, "parse failed");
                eprintln!("error: {err}");
                false
            }
        }
    }

    /// Parses `tokens` and reports the failure as a value.
    ///
    /// Order: name-coincidence check (even for an empty invocation), token
    /// resolution, completeness check.
    ///
    /// # Errors
    ///
    /// Any [`ParseError`]; values already written before the failure are not
    /// meaningful.
    pub fn try_parse<I, S>(&mut self, tokens: I) -> Result<ParseOutcome>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens: Vec<S> = tokens.into_iter().collect();
        self.help_requested = false;
        self.last_error = None;

        let result = self.run(&tokens);
        if let Err(err) = &result {
            self.last_error = Some(err.clone());
        }
        result
    }

    fn run<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<ParseOutcome> {
        check_coincidence(&self.registries)?;
        self.registries.reset();

        match resolver::resolve(&mut self.registries, tokens)? {
            Resolution::HelpRequested => {
                self.help_requested = true;
                self.registries.flags.assign(self.help_id, true)?;
                Ok(ParseOutcome::HelpRequested)
            }
            Resolution::Exhausted => {
                check_completeness(&self.registries, HELP_LONG)?;
                debug!(program = %self.program_name, tokens = tokens.len(), "parsed");
                Ok(ParseOutcome::Parsed)
            }
        }
    }

    /// Whether help was requested during the most recent parse.
    pub fn help(&self) -> bool {
        self.help_requested
    }

    /// Error of the most recent failed parse.
    pub fn last_error(&self) -> Option<&ParseError> {
        self.last_error.as_ref()
    }

    /// Rendered help text.
    pub fn help_description(&self) -> String {
        help::render(self)
    }

    /// User-registered arguments in registration order (help excluded).
    pub fn arguments(&self) -> impl Iterator<Item = (SpecId, &ArgumentSpec)> {
        self.order.iter().map(|&id| (id, self.registries.spec(id)))
    }

    /// Spec of the built-in help flag.
    pub fn help_spec(&self) -> &ArgumentSpec {
        self.registries.spec(self.help_id)
    }

    /// The underlying registries.
    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Value of a flag.
    ///
    /// # Panics
    ///
    /// Panics if no flag named `name` was registered.
    pub fn get_flag(&self, name: &str) -> bool {
        let id = self.expect_id::<bool>(name);
        self.registries.flags.value(id).unwrap_or_default()
    }

    /// Value of an integer argument (the last one for multi-value arguments).
    ///
    /// # Panics
    ///
    /// Panics if no integer argument named `name` was registered.
    pub fn get_int_value(&self, name: &str) -> i32 {
        let id = self.expect_id::<i32>(name);
        self.registries.ints.value(id).unwrap_or_default()
    }

    /// Value of a string argument (the last one for multi-value arguments).
    ///
    /// # Panics
    ///
    /// Panics if no string argument named `name` was registered.
    pub fn get_string_value(&self, name: &str) -> String {
        let id = self.expect_id::<String>(name);
        self.registries.strings.value(id).unwrap_or_default()
    }

    /// Every value of an integer argument, in supplied order.
    ///
    /// # Panics
    ///
    /// Panics if no integer argument named `name` was registered.
    pub fn get_int_values(&self, name: &str) -> Vec<i32> {
        let id = self.expect_id::<i32>(name);
        self.registries.ints.values(id)
    }

    /// Every value of a string argument, in supplied order.
    ///
    /// # Panics
    ///
    /// Panics if no string argument named `name` was registered.
    pub fn get_string_values(&self, name: &str) -> Vec<String> {
        let id = self.expect_id::<String>(name);
        self.registries.strings.values(id)
    }

    fn expect_id<T: Registered>(&self, name: &str) -> SpecId {
        let canonical = normalize_long(name);
        match T::registry(&self.registries).find_canonical(&canonical) {
            Some(id) => id,
            None => panic!(
                "argument {canonical} is not registered (expected {} argument)",
                T::KIND
            ),
        }
    }
}

/// Configures the argument most recently added to an [`ArgParser`].
///
/// Each builder is tied to exactly one argument; chained calls cannot leak
/// onto a different registration.
#[derive(Debug)]
pub struct ArgBuilder<'p, T> {
    parser: &'p mut ArgParser,
    id: SpecId,
    _marker: PhantomData<T>,
}

impl<T: Registered> ArgBuilder<'_, T> {
    /// Handle of the argument being configured.
    pub fn id(&self) -> SpecId {
        self.id
    }

    /// Sets the value used when the argument is not supplied.
    pub fn default(self, value: impl Into<T>) -> Self {
        T::registry_mut(&mut self.parser.registries).set_default(self.id, value.into());
        self
    }

    /// Writes the value into caller-owned storage.
    ///
    /// For a multi-value argument the store holds the latest value.
    pub fn store_value(self, store: Store<T>) -> Self {
        T::registry_mut(&mut self.parser.registries).bind_single(self.id, store);
        self
    }

    /// Replaces the description.
    pub fn description(self, text: &str) -> Self {
        T::registry_mut(&mut self.parser.registries).set_description(self.id, text);
        self
    }
}

impl<T: ValueArg> ArgBuilder<'_, T> {
    /// Accumulates repeated occurrences, requiring at least `min_count` of
    /// them when the argument is supplied at all.
    pub fn multi_value(self, min_count: usize) -> Self {
        T::registry_mut(&mut self.parser.registries).mark_multi(self.id, min_count);
        self
    }

    /// Makes this argument the sink for unmatched bare tokens of its type.
    ///
    /// A later positional registration of the same type replaces this one.
    pub fn positional(self) -> Self {
        T::registry_mut(&mut self.parser.registries).mark_positional(self.id);
        self
    }

    /// Collects every value into caller-owned storage.
    ///
    /// Marks the argument multi-value (minimum 0) if it is not already.
    pub fn store_values(self, store: Store<Vec<T>>) -> Self {
        let registry = T::registry_mut(&mut self.parser.registries);
        if !registry.spec(self.id).is_multi {
            registry.mark_multi(self.id, 0);
        }
        registry.bind_multi(self.id, store);
        self
    }
}
