//! Declarative module descriptors.
//!
//! A [`Module`] is inert data: a name, the names of the modules it depends
//! on, an ordered list of provider registrations, and an ordered list of
//! run blocks. It performs no validation and no resolution; everything is
//! deferred to [`Injector`](crate::Injector) construction time, which
//! consumes the descriptors.

use std::fmt;

use crate::annotate::{to_value, InjectFn, Value};

/// The kind of a provider registration, for introspection and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// A fixed value returned as-is
    Constant,
    /// A callable invoked with injection; its return value is the service
    Factory,
    /// A constructor callable invoked with injection to build the service
    Type,
    /// A wrapper composed around an existing provider for the same name
    Decorator,
}

/// A single provider registration carried by a module.
#[derive(Clone)]
pub(crate) enum Registration {
    Constant(Value),
    Factory(InjectFn),
    Type(InjectFn),
    Decorator(InjectFn),
}

impl Registration {
    pub(crate) fn kind(&self) -> ProviderKind {
        match self {
            Registration::Constant(_) => ProviderKind::Constant,
            Registration::Factory(_) => ProviderKind::Factory,
            Registration::Type(_) => ProviderKind::Type,
            Registration::Decorator(_) => ProviderKind::Decorator,
        }
    }
}

/// A declarative unit of registration for an [`Injector`](crate::Injector).
///
/// Registration methods append in declaration order and return the module
/// for fluent chaining. Later `constant`/`ctor`/`factory` registrations for
/// a name overwrite the provider; `decorator` registrations accumulate,
/// each wrapping whatever is registered for the name so far.
///
/// # Examples
///
/// ```rust
/// use modwire::{InjectFn, Module};
/// use std::sync::Arc;
///
/// struct Greeter {
///     greeting: Arc<String>,
/// }
///
/// let module = Module::new("greetings")
///     .constant("greeting", "hello".to_string())
///     .ctor("greeter", InjectFn::new(&["greeting"], |args| {
///         Ok(Greeter { greeting: args.get("greeting")? })
///     }))
///     .run(InjectFn::new(&["greeting"], |args| {
///         let greeting: Arc<String> = args.get("greeting")?;
///         assert_eq!(&*greeting, "hello");
///         Ok(())
///     }));
/// assert_eq!(module.name(), "greetings");
/// ```
pub struct Module {
    name: String,
    dependencies: Vec<String>,
    providers: Vec<(String, Registration)>,
    run_blocks: Vec<InjectFn>,
}

impl Module {
    /// Creates a module with no dependencies.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            providers: Vec::new(),
            run_blocks: Vec::new(),
        }
    }

    /// Creates a module that requires the named modules to be loaded first.
    pub fn with_dependencies<N, D>(name: N, dependencies: D) -> Self
    where
        N: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            name: name.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            providers: Vec::new(),
            run_blocks: Vec::new(),
        }
    }

    /// Registers a constant value under `name`.
    pub fn constant<T: Send + Sync + 'static>(mut self, name: impl Into<String>, value: T) -> Self {
        self.providers.push((name.into(), Registration::Constant(to_value(value))));
        self
    }

    /// Registers a constructor under `name`; the injector instantiates it
    /// with its dependencies supplied.
    pub fn ctor(mut self, name: impl Into<String>, ctor: InjectFn) -> Self {
        self.providers.push((name.into(), Registration::Type(ctor)));
        self
    }

    /// Registers a factory under `name`; the injector invokes it with its
    /// dependencies supplied and uses the return value as the service.
    pub fn factory(mut self, name: impl Into<String>, factory: InjectFn) -> Self {
        self.providers.push((name.into(), Registration::Factory(factory)));
        self
    }

    /// Registers a decorator for `name`.
    ///
    /// The decorator is invoked whenever the named service is first
    /// resolved, with the pre-decoration value bound to
    /// [`DELEGATE_NAME`](crate::DELEGATE_NAME); its return value becomes the
    /// resolved service.
    pub fn decorator(mut self, name: impl Into<String>, decorator: InjectFn) -> Self {
        self.providers.push((name.into(), Registration::Decorator(decorator)));
        self
    }

    /// Registers a run block, executed once with dependencies injected
    /// after every module in the load has registered its providers.
    pub fn run(mut self, block: InjectFn) -> Self {
        self.run_blocks.push(block);
        self
    }

    /// The module's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The names of the modules this module depends on.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// The registrations carried by this module, in declaration order.
    pub fn providers(&self) -> impl Iterator<Item = (&str, ProviderKind)> + '_ {
        self.providers.iter().map(|(name, reg)| (name.as_str(), reg.kind()))
    }

    pub(crate) fn into_parts(self) -> (String, Vec<(String, Registration)>, Vec<InjectFn>) {
        (self.name, self.providers, self.run_blocks)
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .field("providers", &self.providers.len())
            .field("run_blocks", &self.run_blocks.len())
            .finish()
    }
}
