//! Value erasure and dependency annotation for injectable callables.
//!
//! The container stores every resolved value type-erased as a [`Value`].
//! Callables declare what they need through an [`InjectFn`]: an explicit,
//! ordered list of dependency names paired with the function to call.
//! Parameter names cannot be introspected in Rust, so the explicit list is
//! the annotation. It lives inside the callable value, which makes
//! annotation lookups inherently cached and idempotent.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};

/// A resolved value as stored and passed around by the container.
///
/// Providers produce `Value`s; consumers downcast them back to concrete
/// types, either through [`Injector::get_as`](crate::Injector::get_as) or
/// [`ResolvedArgs::get`].
pub type Value = Arc<dyn Any + Send + Sync>;

/// Wraps a typed value into the container's erased [`Value`] form.
///
/// # Examples
///
/// ```rust
/// use modwire::{to_value, Value};
///
/// let v: Value = to_value(42u32);
/// assert_eq!(*v.downcast::<u32>().unwrap(), 42);
/// ```
pub fn to_value<T: Send + Sync + 'static>(value: T) -> Value {
    Arc::new(value)
}

pub(crate) fn downcast<T: Send + Sync + 'static>(name: &str, value: &Value) -> DiResult<Arc<T>> {
    value.clone().downcast::<T>().map_err(|_| DiError::TypeMismatch {
        name: name.to_string(),
        expected: std::any::type_name::<T>(),
    })
}

type CallFn = Arc<dyn Fn(&ResolvedArgs<'_>) -> DiResult<Value> + Send + Sync>;

/// An injectable callable: an ordered dependency-name annotation plus the
/// function to invoke with those dependencies resolved.
///
/// This is the only annotation mechanism the container supports. The names
/// are resolved in order (locals first, then the provider registry) and the
/// callable reads them back by name through [`ResolvedArgs`].
///
/// # Examples
///
/// ```rust
/// use modwire::{InjectFn, Injector, Module};
/// use std::sync::Arc;
///
/// let module = Module::new("math")
///     .constant("a", 2u32)
///     .constant("b", 40u32);
/// let injector = Injector::new(vec![module]).unwrap();
///
/// let add = InjectFn::new(&["a", "b"], |args| {
///     let a: Arc<u32> = args.get("a")?;
///     let b: Arc<u32> = args.get("b")?;
///     Ok(*a + *b)
/// });
/// let sum = injector.invoke(&add).unwrap();
/// assert_eq!(*sum.downcast::<u32>().unwrap(), 42);
/// ```
#[derive(Clone)]
pub struct InjectFn {
    deps: Vec<String>,
    call: CallFn,
}

impl InjectFn {
    /// Builds an injectable callable returning a typed value, which is
    /// wrapped into a [`Value`] automatically.
    pub fn new<T, F>(deps: &[&str], f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolvedArgs<'_>) -> DiResult<T> + Send + Sync + 'static,
    {
        Self {
            deps: deps.iter().map(|s| s.to_string()).collect(),
            call: Arc::new(move |args| f(args).map(to_value)),
        }
    }

    /// Builds an injectable callable returning an already-erased [`Value`].
    ///
    /// Decorators that pass their delegate through unchanged need this form;
    /// wrapping the delegate again with [`InjectFn::new`] would bury it one
    /// level deeper than the caller expects.
    pub fn raw<F>(deps: &[&str], f: F) -> Self
    where
        F: Fn(&ResolvedArgs<'_>) -> DiResult<Value> + Send + Sync + 'static,
    {
        Self {
            deps: deps.iter().map(|s| s.to_string()).collect(),
            call: Arc::new(f),
        }
    }

    /// The ordered dependency names this callable requires.
    pub fn deps(&self) -> &[String] {
        &self.deps
    }

    pub(crate) fn call(&self, args: &ResolvedArgs<'_>) -> DiResult<Value> {
        (self.call)(args)
    }
}

impl fmt::Debug for InjectFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectFn").field("deps", &self.deps).finish_non_exhaustive()
    }
}

/// The arguments resolved for one invocation, positional in annotation
/// order and readable by name.
pub struct ResolvedArgs<'a> {
    names: &'a [String],
    values: Vec<Value>,
}

impl<'a> ResolvedArgs<'a> {
    pub(crate) fn new(names: &'a [String], values: Vec<Value>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    /// The erased value bound to `name` for this call.
    ///
    /// Fails with [`DiError::MissingArgument`] if `name` is not part of the
    /// callable's annotation.
    pub fn value(&self, name: &str) -> DiResult<&Value> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.values[i])
            .ok_or_else(|| DiError::MissingArgument(name.to_string()))
    }

    /// Typed view of the value bound to `name`.
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        let value = self.value(name)?;
        downcast::<T>(name, value)
    }

    /// Number of arguments supplied to this call.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the call received no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Call-scoped overrides for [`invoke`](crate::Injector::invoke_with) and
/// [`instantiate`](crate::Injector::instantiate_with).
///
/// A name owned by the locals is supplied directly instead of being
/// resolved through the provider registry, even when a same-named provider
/// exists.
///
/// # Examples
///
/// ```rust
/// use modwire::{InjectFn, Injector, Locals, Module};
/// use std::sync::Arc;
///
/// let injector = Injector::new(vec![Module::new("m").constant("port", 80u16)]).unwrap();
/// let read = InjectFn::new(&["port"], |args| args.get::<u16>("port").map(|p| *p));
///
/// let locals = Locals::new().with("port", 8080u16);
/// let port = injector.invoke_with(&read, &locals).unwrap();
/// assert_eq!(*port.downcast::<u16>().unwrap(), 8080);
/// ```
#[derive(Default, Clone)]
pub struct Locals {
    values: HashMap<String, Value>,
}

impl Locals {
    /// Creates an empty locals map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a typed local value, consuming and returning the map.
    pub fn with<T: Send + Sync + 'static>(self, name: impl Into<String>, value: T) -> Self {
        self.with_value(name, to_value(value))
    }

    /// Adds an already-erased local value.
    pub fn with_value(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Whether the locals own `name` directly.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }
}

impl fmt::Debug for Locals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locals")
            .field("names", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}
