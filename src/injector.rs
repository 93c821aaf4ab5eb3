//! The injector resolution engine.
//!
//! An [`Injector`] consumes a set of [`Module`] descriptors: it sorts them
//! topologically, registers their providers in order, executes their run
//! blocks, and then resolves named values lazily with memoization, cycle
//! detection, and delegation to an optional parent injector.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::annotate::{downcast, to_value, InjectFn, Locals, ResolvedArgs, Value};
use crate::error::{DiError, DiResult};
use crate::module::{Module, ProviderKind, Registration};
use crate::observer::{DiObserver, Observers};
use crate::sort::sort;

/// Reserved name under which every injector resolves itself.
pub const INJECTOR_NAME: &str = "$injector";

/// Reserved name bound to the pre-decoration value inside decorator
/// callables.
pub const DELEGATE_NAME: &str = "$delegate";

type ResolveFn = Arc<dyn Fn(&Injector, Option<&Locals>) -> DiResult<Value> + Send + Sync>;

/// A registered recipe for producing a named value on demand.
///
/// Decorators are not separate entries; each decorator registration wraps
/// the prior resolver for its name, so a fully-built entry already carries
/// its whole decoration chain.
#[derive(Clone)]
struct ProviderEntry {
    resolve: ResolveFn,
    kind: ProviderKind,
    decorated: bool,
}

impl ProviderEntry {
    fn constant(value: Value) -> Self {
        Self {
            resolve: Arc::new(move |_: &Injector, _: Option<&Locals>| Ok(value.clone())),
            kind: ProviderKind::Constant,
            decorated: false,
        }
    }

    fn factory(factory: InjectFn) -> Self {
        Self {
            resolve: Arc::new(move |injector: &Injector, locals: Option<&Locals>| {
                injector.invoke_opt(&factory, locals)
            }),
            kind: ProviderKind::Factory,
            decorated: false,
        }
    }

    fn ctor(ctor: InjectFn) -> Self {
        Self {
            resolve: Arc::new(move |injector: &Injector, locals: Option<&Locals>| {
                injector.instantiate_opt(&ctor, locals)
            }),
            kind: ProviderKind::Type,
            decorated: false,
        }
    }

    /// Wraps this entry's resolver with one decorator stage.
    ///
    /// The stage resolves the delegate, then invokes the decorator with
    /// [`DELEGATE_NAME`] bound to the running value (merged over any
    /// caller-supplied locals); the decorator's return value becomes the
    /// running value for the next stage or the final result.
    fn decorate(self, decorator: InjectFn) -> Self {
        let inner = self.resolve;
        let resolve: ResolveFn = Arc::new(move |injector: &Injector, locals: Option<&Locals>| {
            let delegate = inner(injector, locals)?;
            let merged = locals
                .cloned()
                .unwrap_or_default()
                .with_value(DELEGATE_NAME, delegate);
            injector.invoke_opt(&decorator, Some(&merged))
        });
        Self {
            resolve,
            kind: self.kind,
            decorated: true,
        }
    }
}

struct InjectorCore {
    parent: Option<Injector>,
    module_names: Vec<String>,
    providers: HashMap<String, ProviderEntry>,
    instances: Mutex<HashMap<String, Value>>,
    resolving: Mutex<Vec<String>>,
    observers: Observers,
}

/// The dependency injection container.
///
/// An injector is a cheaply cloneable handle over shared state; clones
/// resolve against the same caches. Construction is fail-fast: a missing
/// module, a module cycle, a decorator with no target, or a failing run
/// block abort it entirely, so an injector value is always fully loaded.
///
/// Resolution with [`get`](Injector::get) is lazy and memoized: a
/// provider's resolver runs at most once per name per injector, and the
/// cached value is returned for every later lookup. Names not registered
/// locally are delegated to the parent injector, innermost registration
/// winning on collisions.
///
/// # Examples
///
/// ```rust
/// use modwire::{InjectFn, Injector, Module};
/// use std::sync::Arc;
///
/// struct Database {
///     url: Arc<String>,
/// }
///
/// let module = Module::new("app")
///     .constant("db_url", "postgres://localhost".to_string())
///     .factory("database", InjectFn::new(&["db_url"], |args| {
///         Ok(Database { url: args.get("db_url")? })
///     }));
///
/// let injector = Injector::new(vec![module]).unwrap();
/// let database: Arc<Database> = injector.get_as("database").unwrap();
/// assert_eq!(&*database.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct Injector {
    core: Arc<InjectorCore>,
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("modules", &self.core.module_names)
            .field("providers", &self.core.providers.keys().collect::<Vec<_>>())
            .field("has_parent", &self.core.parent.is_some())
            .finish_non_exhaustive()
    }
}

impl Injector {
    /// Builds a root injector from the given modules.
    pub fn new(modules: Vec<Module>) -> DiResult<Self> {
        Self::build(modules, None, Vec::new())
    }

    /// Builds a child injector chained to `parent`.
    ///
    /// The child shares the parent (it never mutates it); modules may
    /// depend on modules already loaded anywhere in the ancestor chain,
    /// and unresolved names delegate to the parent at lookup time.
    pub fn with_parent(modules: Vec<Module>, parent: &Injector) -> DiResult<Self> {
        Self::build(modules, Some(parent.clone()), Vec::new())
    }

    /// Builds an injector with diagnostic observers attached.
    pub fn with_observers(
        modules: Vec<Module>,
        parent: Option<&Injector>,
        observers: Vec<Arc<dyn DiObserver>>,
    ) -> DiResult<Self> {
        Self::build(modules, parent.cloned(), observers)
    }

    fn build(
        modules: Vec<Module>,
        parent: Option<Injector>,
        observers: Vec<Arc<dyn DiObserver>>,
    ) -> DiResult<Self> {
        let resolved = match &parent {
            Some(parent) => parent.resolved_module_names(),
            None => HashSet::new(),
        };
        let sorted = sort(modules, &resolved)?;

        // Phase one: register every provider of every module, in module
        // order, declaration order within a module. Run blocks are only
        // queued here; none executes until registration is complete.
        let mut providers: HashMap<String, ProviderEntry> = HashMap::new();
        let mut module_names = Vec::with_capacity(sorted.len());
        let mut run_queue: Vec<(String, InjectFn)> = Vec::new();

        for module in sorted {
            let (name, registrations, run_blocks) = module.into_parts();
            for (key, registration) in registrations {
                match registration {
                    Registration::Constant(value) => {
                        providers.insert(key, ProviderEntry::constant(value));
                    }
                    Registration::Factory(factory) => {
                        providers.insert(key, ProviderEntry::factory(factory));
                    }
                    Registration::Type(ctor) => {
                        providers.insert(key, ProviderEntry::ctor(ctor));
                    }
                    Registration::Decorator(decorator) => {
                        // A decorator must target a provider registered so
                        // far: locally by an earlier registration, or by an
                        // ancestor (whose entry is copied here and wrapped,
                        // leaving the ancestor untouched).
                        let base = match providers.remove(&key) {
                            Some(entry) => entry,
                            None => match parent.as_ref().and_then(|p| p.find_entry(&key)) {
                                Some(entry) => entry,
                                None => return Err(DiError::UndecoratableProvider(key)),
                            },
                        };
                        providers.insert(key, base.decorate(decorator));
                    }
                }
            }
            for block in run_blocks {
                run_queue.push((name.clone(), block));
            }
            module_names.push(name);
        }

        let injector = Injector {
            core: Arc::new(InjectorCore {
                parent,
                module_names,
                providers,
                instances: Mutex::new(HashMap::new()),
                resolving: Mutex::new(Vec::new()),
                observers: Observers::new(observers),
            }),
        };

        // Phase two: execute the queued run blocks, in module-sorted order.
        for (module, block) in &run_queue {
            injector.core.observers.run_block_invoked(module);
            injector.invoke(block)?;
        }

        Ok(injector)
    }

    /// Resolves the value registered under `name`.
    ///
    /// Already-resolved names return the cached value without re-running
    /// the provider. Names not registered locally delegate to the parent
    /// chain; falling off the root yields
    /// [`DiError::MissingProvider`]. [`INJECTOR_NAME`] always resolves to
    /// this injector itself.
    pub fn get(&self, name: &str) -> DiResult<Value> {
        if name == INJECTOR_NAME {
            return Ok(to_value(self.clone()));
        }
        if let Some(value) = self.core.instances.lock().unwrap().get(name) {
            return Ok(value.clone());
        }
        if let Some(entry) = self.core.providers.get(name) {
            self.core.observers.resolution_started(name);
            let result = self.resolve_entry(name, entry);
            match &result {
                Ok(_) => self.core.observers.resolution_succeeded(name),
                Err(error) => self.core.observers.resolution_failed(name, error),
            }
            return result;
        }
        match &self.core.parent {
            Some(parent) => parent.get(name),
            None => Err(DiError::MissingProvider(name.to_string())),
        }
    }

    fn resolve_entry(&self, name: &str, entry: &ProviderEntry) -> DiResult<Value> {
        let _guard = StackGuard::push(&self.core.resolving, name)?;
        let value = (entry.resolve)(self, None)?;
        self.core
            .instances
            .lock()
            .unwrap()
            .insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Resolves `name` and downcasts the value to `T`.
    pub fn get_as<T: Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        let value = self.get(name)?;
        downcast::<T>(name, &value)
    }

    /// The ordered dependency names a callable requires.
    pub fn annotate<'f>(&self, f: &'f InjectFn) -> &'f [String] {
        f.deps()
    }

    /// Invokes `f` with its dependencies resolved from this injector.
    pub fn invoke(&self, f: &InjectFn) -> DiResult<Value> {
        self.invoke_opt(f, None)
    }

    /// Invokes `f`, reading any dependency owned by `locals` from there
    /// instead of the provider registry.
    pub fn invoke_with(&self, f: &InjectFn, locals: &Locals) -> DiResult<Value> {
        self.invoke_opt(f, Some(locals))
    }

    fn invoke_opt(&self, f: &InjectFn, locals: Option<&Locals>) -> DiResult<Value> {
        // Validate every token before resolving anything.
        for name in f.deps() {
            if name.is_empty() {
                return Err(DiError::InvalidToken(name.clone()));
            }
        }
        let mut values = Vec::with_capacity(f.deps().len());
        for name in f.deps() {
            let value = match locals.and_then(|l| l.get(name)) {
                Some(local) => local.clone(),
                None => self.get(name)?,
            };
            values.push(value);
        }
        f.call(&ResolvedArgs::new(f.deps(), values))
    }

    /// Instantiates a constructor callable with dependencies supplied.
    pub fn instantiate(&self, ctor: &InjectFn) -> DiResult<Value> {
        self.instantiate_opt(ctor, None)
    }

    /// Instantiates a constructor callable with `locals` taking precedence
    /// over registered providers.
    pub fn instantiate_with(&self, ctor: &InjectFn, locals: &Locals) -> DiResult<Value> {
        self.instantiate_opt(ctor, Some(locals))
    }

    fn instantiate_opt(&self, ctor: &InjectFn, locals: Option<&Locals>) -> DiResult<Value> {
        // Constructing a value and invoking its constructor are the same
        // operation here; the distinct entry point keeps constructor-style
        // registrations and lookups symmetrical.
        self.invoke_opt(ctor, locals)
    }

    /// Runs the named provider's resolver directly, bypassing the instance
    /// cache: every call produces a fresh value, unlike [`get`](Self::get).
    pub fn instantiate_named(&self, name: &str) -> DiResult<Value> {
        self.instantiate_named_opt(name, None)
    }

    /// Like [`instantiate_named`](Self::instantiate_named), with `locals`
    /// taking precedence over registered providers.
    pub fn instantiate_named_with(&self, name: &str, locals: &Locals) -> DiResult<Value> {
        self.instantiate_named_opt(name, Some(locals))
    }

    fn instantiate_named_opt(&self, name: &str, locals: Option<&Locals>) -> DiResult<Value> {
        if let Some(entry) = self.core.providers.get(name) {
            return (entry.resolve)(self, locals);
        }
        // Each entry runs against the injector that owns it.
        match &self.core.parent {
            Some(parent) => parent.instantiate_named_opt(name, locals),
            None => Err(DiError::MissingProvider(name.to_string())),
        }
    }

    /// The parent injector, if any.
    pub fn parent(&self) -> Option<&Injector> {
        self.core.parent.as_ref()
    }

    /// The names of this injector's own modules, in load order.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.core.module_names.iter().map(String::as_str)
    }

    /// Whether two handles refer to the same injector.
    pub fn ptr_eq(&self, other: &Injector) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    fn find_entry(&self, name: &str) -> Option<ProviderEntry> {
        match self.core.providers.get(name) {
            Some(entry) => Some(entry.clone()),
            None => self.core.parent.as_ref().and_then(|p| p.find_entry(name)),
        }
    }

    fn resolved_module_names(&self) -> HashSet<String> {
        let mut names = match &self.core.parent {
            Some(parent) => parent.resolved_module_names(),
            None => HashSet::new(),
        };
        names.extend(self.core.module_names.iter().cloned());
        names
    }

    /// Dumps the provider registry by name and kind.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Injector Debug ===\n");
        let mut names: Vec<&String> = self.core.providers.keys().collect();
        names.sort();
        for name in names {
            let entry = &self.core.providers[name];
            s.push_str(&format!(
                "  {}: {:?}{}\n",
                name,
                entry.kind,
                if entry.decorated { " (decorated)" } else { "" }
            ));
        }
        s
    }
}

/// Guard for the transient resolution stack.
///
/// Pushes `name` on creation, failing if it is already in flight, and pops
/// on drop, so the stack returns to empty however the enclosing resolution
/// exits.
struct StackGuard<'a> {
    stack: &'a Mutex<Vec<String>>,
}

impl<'a> StackGuard<'a> {
    fn push(stack: &'a Mutex<Vec<String>>, name: &str) -> DiResult<Self> {
        let mut resolving = stack.lock().unwrap();
        if resolving.iter().any(|n| n == name) {
            return Err(DiError::CircularDependency(name.to_string()));
        }
        resolving.push(name.to_string());
        Ok(Self { stack })
    }
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.stack.lock().unwrap().pop();
    }
}
