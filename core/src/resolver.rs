//! Token resolution.
//!
//! Walks the token vector once (index 0, the program name, is skipped) and
//! routes each token through, in order:
//!
//! 1. help short-circuit (`-h` / `--help`),
//! 2. named lookup (`--name`, `--name=value`, `-x`, `-x value`),
//! 3. positional fallback (integer target for numeric tokens, then string
//!    target),
//! 4. short-flag clusters (`-abc`, where only the last character may take a
//!    value),
//!
//! and fails with [`ParseError::UnknownArgument`] if none of them applies.

use tracing::{debug, trace};

use crate::error::{ParseError, Result};
use crate::registry::Registries;
use crate::spec::SpecId;
use crate::value::{ArgKind, looks_like_int};

/// Long form of the built-in help flag.
pub const HELP_LONG: &str = "--help";
/// Short form of the built-in help flag.
pub const HELP_SHORT: &str = "-h";

/// How a resolution pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Every token was routed.
    Exhausted,
    /// `-h`/`--help` was seen; remaining tokens were not looked at.
    HelpRequested,
}

/// Read position over the tokens of one parse.
#[derive(Debug)]
pub(crate) struct Cursor<'t, S> {
    tokens: &'t [S],
    index: usize,
}

impl<'t, S: AsRef<str>> Cursor<'t, S> {
    pub(crate) fn new(tokens: &'t [S]) -> Self {
        // Index 0 is the program name.
        Self { tokens, index: 1 }
    }

    /// Returns the next token and advances past it.
    pub(crate) fn advance(&mut self) -> Option<&'t str> {
        let token = self.tokens.get(self.index)?.as_ref();
        self.index += 1;
        Some(token)
    }
}

/// Position of a character inside a short-flag cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterState {
    /// Must name a registered flag.
    Flag,
    /// The last character: dispatched like a standalone `-x` token.
    Trailing,
}

/// Splits a cluster such as `-abc` into `(-a, Flag)`, `(-b, Flag)`,
/// `(-c, Trailing)`.
///
/// # Examples
///
/// ```
/// use argparse_core::{ClusterState, ShortCluster};
///
/// let steps: Vec<_> = ShortCluster::new("-ac").unwrap().collect();
/// assert_eq!(
///     steps,
///     vec![
///         ("-a".to_string(), ClusterState::Flag),
///         ("-c".to_string(), ClusterState::Trailing),
///     ]
/// );
/// assert!(ShortCluster::new("-a").is_none());
/// assert!(ShortCluster::new("--all").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ShortCluster<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> ShortCluster<'a> {
    /// Accepts a single dash followed by at least two characters.
    pub fn new(key: &'a str) -> Option<Self> {
        let body = key.strip_prefix('-')?;
        if body.starts_with('-') || body.chars().count() < 2 {
            return None;
        }
        Some(Self {
            chars: body.chars().peekable(),
        })
    }
}

impl Iterator for ShortCluster<'_> {
    type Item = (String, ClusterState);

    fn next(&mut self) -> Option<Self::Item> {
        let ch = self.chars.next()?;
        let state = if self.chars.peek().is_some() {
            ClusterState::Flag
        } else {
            ClusterState::Trailing
        };
        Some((format!("-{ch}"), state))
    }
}

/// Routes every token after the program name into `registries`.
///
/// # Errors
///
/// Stops at the first token that cannot be routed or whose value fails
/// coercion.
pub fn resolve<S: AsRef<str>>(registries: &mut Registries, tokens: &[S]) -> Result<Resolution> {
    let mut cursor = Cursor::new(tokens);

    while let Some(token) = cursor.advance() {
        if token == HELP_LONG || token == HELP_SHORT {
            debug!("help requested");
            return Ok(Resolution::HelpRequested);
        }

        let (key, inline) = split_inline(token);
        if dispatch_named(registries, key, inline, &mut cursor)? {
            continue;
        }
        if route_positional(registries, token)? {
            continue;
        }
        if resolve_cluster(registries, token, &mut cursor)? {
            continue;
        }

        return Err(ParseError::UnknownArgument(token.to_string()));
    }

    Ok(Resolution::Exhausted)
}

/// Splits on the first `=` into a candidate key and an inline value.
pub(crate) fn split_inline(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((key, value)) => (key, Some(value)),
        None => (token, None),
    }
}

/// Handles a token whose key names a registered argument.
///
/// Returns `Ok(false)` when `key` matches nothing.
fn dispatch_named<S: AsRef<str>>(
    registries: &mut Registries,
    key: &str,
    inline: Option<&str>,
    cursor: &mut Cursor<'_, S>,
) -> Result<bool> {
    let Some(id) = registries.lookup(key) else {
        return Ok(false);
    };
    let name = registries.spec(id).canonical_name.clone();

    if id.kind() == ArgKind::Flag {
        if inline.is_some() {
            return Err(ParseError::FlagTakesNoValue(name));
        }
        trace!(argument = %name, "flag present");
        registries.consume(id, "")?;
        return Ok(true);
    }

    let raw = match inline {
        Some(value) => value,
        None => match cursor.advance() {
            Some(next) => next,
            None if registries.spec(id).has_default => {
                debug!(argument = %name, "no value follows, keeping default");
                return Ok(true);
            }
            None => return Err(ParseError::MissingValue(name)),
        },
    };

    trace!(argument = %name, value = raw, "named value");
    registries.consume(id, raw)?;
    Ok(true)
}

/// Feeds an unmatched token to a positional target.
///
/// Numeric tokens prefer the integer target even when a string target also
/// exists. Returns `Ok(false)` when no target accepts the token.
fn route_positional(registries: &mut Registries, token: &str) -> Result<bool> {
    let target: Option<SpecId> = if looks_like_int(token) {
        registries
            .ints
            .positional()
            .or_else(|| registries.strings.positional())
    } else {
        registries.strings.positional()
    };

    let Some(id) = target else {
        return Ok(false);
    };
    trace!(argument = %registries.spec(id).canonical_name, value = token, "positional value");
    registries.consume(id, token)?;
    Ok(true)
}

/// Expands `-abc` into flags `-a`, `-b` and a trailing `-c`.
///
/// Returns `Ok(false)` when the token is not cluster-shaped. An inline value
/// (`-ac=5`) goes to the trailing character. `h` anywhere in a cluster makes
/// the whole token unknown.
fn resolve_cluster<S: AsRef<str>>(
    registries: &mut Registries,
    token: &str,
    cursor: &mut Cursor<'_, S>,
) -> Result<bool> {
    let (key, inline) = split_inline(token);
    let Some(cluster) = ShortCluster::new(key) else {
        return Ok(false);
    };

    let mut flags = Vec::new();
    for (short, state) in cluster {
        // Help is only recognized as a standalone token.
        if short == HELP_SHORT {
            return Err(ParseError::UnknownArgument(token.to_string()));
        }
        match state {
            ClusterState::Flag => {
                let id = registries
                    .flags
                    .lookup(&short)
                    .ok_or_else(|| ParseError::UnknownArgument(token.to_string()))?;
                flags.push(id);
            }
            ClusterState::Trailing => {
                if !dispatch_named(registries, &short, inline, cursor)? {
                    return Err(ParseError::UnknownArgument(token.to_string()));
                }
            }
        }
    }

    for id in flags {
        registries.flags.assign(id, true)?;
    }
    debug!(token, "short-flag cluster resolved");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Store;

    fn tokens(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    #[test]
    fn test_cursor_skips_program_name() {
        let all = tokens("app a b");
        let mut cursor = Cursor::new(&all);
        assert_eq!(cursor.advance(), Some("a"));
        assert_eq!(cursor.advance(), Some("b"));
        assert_eq!(cursor.advance(), None);
    }

    #[test]
    fn test_split_inline_uses_first_equals() {
        assert_eq!(split_inline("--a=b=c"), ("--a", Some("b=c")));
        assert_eq!(split_inline("--a="), ("--a", Some("")));
        assert_eq!(split_inline("--a"), ("--a", None));
    }

    #[test]
    fn test_cluster_states() {
        let steps: Vec<_> = ShortCluster::new("-xyz").unwrap().map(|(_, s)| s).collect();
        assert_eq!(
            steps,
            vec![ClusterState::Flag, ClusterState::Flag, ClusterState::Trailing]
        );
        assert!(ShortCluster::new("abc").is_none());
        assert!(ShortCluster::new("-").is_none());
    }

    #[test]
    fn test_help_stops_resolution() {
        let mut registries = Registries::default();
        let outcome = resolve(&mut registries, &tokens("app --help --unknown")).unwrap();
        assert_eq!(outcome, Resolution::HelpRequested);
    }

    #[test]
    fn test_named_value_from_next_token() {
        let mut registries = Registries::default();
        let id = registries.strings.register(Some("-p"), "--param1", "");
        resolve(&mut registries, &tokens("app -p value1")).unwrap();
        assert_eq!(registries.strings.value(id).as_deref(), Some("value1"));
    }

    #[test]
    fn test_trailing_name_without_value_keeps_default() {
        let mut registries = Registries::default();
        let id = registries.ints.register(None, "--n", "");
        registries.ints.set_default(id, 3);
        resolve(&mut registries, &tokens("app --n")).unwrap();
        assert_eq!(registries.ints.value(id), Some(3));
    }

    #[test]
    fn test_trailing_name_without_value_or_default_fails() {
        let mut registries = Registries::default();
        registries.ints.register(None, "--n", "");
        assert_eq!(
            resolve(&mut registries, &tokens("app --n")),
            Err(ParseError::MissingValue("--n".to_string()))
        );
    }

    #[test]
    fn test_flag_rejects_inline_value() {
        let mut registries = Registries::default();
        registries.flags.register(None, "--quiet", "");
        assert_eq!(
            resolve(&mut registries, &tokens("app --quiet=yes")),
            Err(ParseError::FlagTakesNoValue("--quiet".to_string()))
        );
    }

    #[test]
    fn test_numeric_token_prefers_int_positional() {
        let mut registries = Registries::default();
        let words = registries.strings.register(None, "--words", "");
        let numbers = registries.ints.register(None, "--numbers", "");
        registries.strings.mark_multi(words, 0);
        registries.strings.mark_positional(words);
        registries.ints.mark_multi(numbers, 0);
        registries.ints.mark_positional(numbers);

        resolve(&mut registries, &tokens("app 1 two 3")).unwrap();
        assert_eq!(registries.ints.values(numbers), vec![1, 3]);
        assert_eq!(registries.strings.values(words), vec!["two".to_string()]);
    }

    #[test]
    fn test_numeric_token_falls_back_to_string_positional() {
        let mut registries = Registries::default();
        let words = registries.strings.register(None, "--words", "");
        registries.strings.mark_multi(words, 0);
        registries.strings.mark_positional(words);

        resolve(&mut registries, &tokens("app 1 a")).unwrap();
        assert_eq!(
            registries.strings.values(words),
            vec!["1".to_string(), "a".to_string()]
        );
    }

    #[test]
    fn test_cluster_with_trailing_int_from_next_token() {
        let mut registries = Registries::default();
        let a = registries.flags.register(Some("-a"), "--flag1", "");
        let store = Store::new(0);
        let c = registries.ints.register(Some("-c"), "--param", "");
        registries.ints.bind_single(c, store.clone());

        resolve(&mut registries, &tokens("app -ac 5")).unwrap();
        assert_eq!(registries.flags.value(a), Some(true));
        assert_eq!(store.get(), 5);
    }

    #[test]
    fn test_cluster_with_inline_trailing_value() {
        let mut registries = Registries::default();
        registries.flags.register(Some("-a"), "--all", "");
        let c = registries.strings.register(Some("-c"), "--color", "");

        resolve(&mut registries, &tokens("app -ac=red")).unwrap();
        assert_eq!(registries.strings.value(c).as_deref(), Some("red"));
    }

    #[test]
    fn test_help_key_rejected_inside_cluster() {
        let mut registries = Registries::default();
        let help = registries.flags.register(Some(HELP_SHORT), HELP_LONG, "");
        registries.flags.register(Some("-a"), "--all", "");

        for line in ["app -ah", "app -ha"] {
            let token = line.split_whitespace().nth(1).unwrap().to_string();
            assert_eq!(
                resolve(&mut registries, &tokens(line)),
                Err(ParseError::UnknownArgument(token))
            );
        }
        assert_eq!(registries.flags.supplied(help), 0);
    }

    #[test]
    fn test_cluster_of_flags_only() {
        let mut registries = Registries::default();
        let a = registries.flags.register(Some("-a"), "--a", "");
        let b = registries.flags.register(Some("-b"), "--b", "");

        resolve(&mut registries, &tokens("app -ba")).unwrap();
        assert_eq!(registries.flags.value(a), Some(true));
        assert_eq!(registries.flags.value(b), Some(true));
    }

    #[test]
    fn test_cluster_with_non_flag_in_middle_is_unknown() {
        let mut registries = Registries::default();
        let a = registries.flags.register(Some("-a"), "--a", "");
        registries.ints.register(Some("-c"), "--c", "");
        registries.flags.register(Some("-b"), "--b", "");

        assert_eq!(
            resolve(&mut registries, &tokens("app -acb 1")),
            Err(ParseError::UnknownArgument("-acb".to_string()))
        );
        assert_eq!(registries.flags.value(a), Some(false));
    }

    #[test]
    fn test_unknown_token() {
        let mut registries = Registries::default();
        registries.strings.register(None, "--unused-arg", "");
        assert_eq!(
            resolve(&mut registries, &tokens("app --exist? no")),
            Err(ParseError::UnknownArgument("--exist?".to_string()))
        );
    }
}
