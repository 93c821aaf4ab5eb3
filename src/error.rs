//! Error types for the dependency injection container.

use thiserror::Error;

/// Dependency injection errors
///
/// Represents the failure conditions that can occur while loading modules
/// into an injector or resolving named values from it. Every error is
/// raised synchronously at the point of detection and propagates unchanged
/// to the caller; nothing is retried or recovered internally.
///
/// Construction-time errors ([`MissingModule`](DiError::MissingModule),
/// [`ModuleCycle`](DiError::ModuleCycle),
/// [`UndecoratableProvider`](DiError::UndecoratableProvider)) prevent the
/// injector from ever becoming usable. Resolution-time errors affect only
/// the name or callable being resolved and leave the injector intact for
/// unrelated calls.
///
/// # Examples
///
/// ```rust
/// use modwire::{DiError, Injector};
///
/// let injector = Injector::new(Vec::new()).unwrap();
/// match injector.get("not-declared") {
///     Err(DiError::MissingProvider(name)) => assert_eq!(name, "not-declared"),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiError {
    /// A module declares a dependency on a module that is neither in the
    /// load nor already resolved by an ancestor injector
    #[error("module \"{0}\" could not be found")]
    MissingModule(String),
    /// The module dependency graph contains a cycle; no load order exists
    #[error("cycle in the module graph; no load order exists")]
    ModuleCycle,
    /// No provider registered under the name anywhere in the injector chain
    #[error("no provider for \"{0}\"")]
    MissingProvider(String),
    /// A provider resolution re-entered itself, directly or indirectly
    #[error("circular dependency while resolving \"{0}\"")]
    CircularDependency(String),
    /// An annotation entry is not a usable service name
    #[error("invalid injection token {0:?}; expected a non-empty service name")]
    InvalidToken(String),
    /// A callable asked for an argument name outside its own annotation
    #[error("argument \"{0}\" is not in this callable's dependency list")]
    MissingArgument(String),
    /// A resolved value could not be downcast to the requested type
    #[error("type mismatch for \"{name}\": value is not a {expected}")]
    TypeMismatch {
        /// The name the value was resolved under
        name: String,
        /// The type the caller asked for
        expected: &'static str,
    },
    /// A decorator targets a name with no provider registered for it yet
    #[error("cannot decorate \"{0}\": no provider registered for it")]
    UndecoratableProvider(String),
}

/// Result type for DI operations
///
/// A convenience alias for `Result<T, DiError>` used throughout modwire.
pub type DiResult<T> = Result<T, DiError>;
