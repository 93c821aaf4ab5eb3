//! # modwire
//!
//! Module-based, name-keyed dependency injection: declarative modules
//! describe named providers (constants, factories, constructor types,
//! decorators) and inter-module dependencies; the injector builds a
//! deterministic load order, resolves named values lazily with
//! memoization, detects dependency cycles, and chains to a parent injector
//! for hierarchical overrides.
//!
//! ## Features
//!
//! - **Declarative modules**: fluent descriptors consumed at construction
//! - **Deterministic load order**: topological sort with cycle detection
//! - **Lazy singletons**: a provider runs at most once per injector
//! - **Decorators**: wrap or replace a provider's value via `$delegate`
//! - **Hierarchies**: child injectors shadow and extend their parent
//! - **Fail-fast errors**: every failure is a typed [`DiError`], raised at
//!   the point of detection
//!
//! ## Quick Start
//!
//! ```rust
//! use modwire::{InjectFn, Injector, Module};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: Arc<String>,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let module = Module::new("app")
//!     .constant("db_url", "postgres://localhost".to_string())
//!     .factory("database", InjectFn::new(&["db_url"], |args| {
//!         Ok(Database { url: args.get("db_url")? })
//!     }))
//!     .factory("users", InjectFn::new(&["database"], |args| {
//!         Ok(UserService { db: args.get("database")? })
//!     }));
//!
//! let injector = Injector::new(vec![module]).unwrap();
//! let users: Arc<UserService> = injector.get_as("users").unwrap();
//! assert_eq!(&*users.db.url, "postgres://localhost");
//! ```
//!
//! ## Module hierarchies
//!
//! ```rust
//! use modwire::{Injector, Module};
//! use std::sync::Arc;
//!
//! let parent = Injector::new(vec![
//!     Module::new("base").constant("greeting", "hello".to_string()),
//! ]).unwrap();
//!
//! let child = Injector::with_parent(vec![
//!     Module::new("override").constant("greeting", "hi".to_string()),
//! ], &parent).unwrap();
//!
//! let from_child: Arc<String> = child.get_as("greeting").unwrap();
//! let from_parent: Arc<String> = parent.get_as("greeting").unwrap();
//! assert_eq!(&*from_child, "hi");
//! assert_eq!(&*from_parent, "hello");
//! ```
//!
//! ## Decorators
//!
//! ```rust
//! use modwire::{InjectFn, Injector, Module, DELEGATE_NAME};
//! use std::sync::Arc;
//!
//! let module = Module::new("m")
//!     .constant("greeting", "hello".to_string())
//!     .decorator("greeting", InjectFn::new(&[DELEGATE_NAME], |args| {
//!         let base: Arc<String> = args.get(DELEGATE_NAME)?;
//!         Ok(format!("{}, world", base))
//!     }));
//!
//! let injector = Injector::new(vec![module]).unwrap();
//! let greeting: Arc<String> = injector.get_as("greeting").unwrap();
//! assert_eq!(&*greeting, "hello, world");
//! ```

// Module declarations
pub mod annotate;
pub mod error;
pub mod injector;
pub mod module;
pub mod observer;

// Internal modules
mod sort;

// Re-export core types
pub use annotate::{to_value, InjectFn, Locals, ResolvedArgs, Value};
pub use error::{DiError, DiResult};
pub use injector::{Injector, DELEGATE_NAME, INJECTOR_NAME};
pub use module::{Module, ProviderKind};
pub use observer::{DiObserver, LoggingObserver};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_constant_resolution() {
        let injector = Injector::new(vec![Module::new("m").constant("answer", 42usize)]).unwrap();

        let a: Arc<usize> = injector.get_as("answer").unwrap();
        let b: Arc<usize> = injector.get_as("answer").unwrap();

        assert_eq!(*a, 42);
        assert!(Arc::ptr_eq(&a, &b)); // Same instance
    }

    #[test]
    fn test_factory_runs_once() {
        let counter = Arc::new(Mutex::new(0));
        let counter_clone = counter.clone();

        let module = Module::new("m").factory(
            "service",
            InjectFn::new(&[], move |_| {
                let mut c = counter_clone.lock().unwrap();
                *c += 1;
                Ok(format!("instance-{}", *c))
            }),
        );

        let injector = Injector::new(vec![module]).unwrap();
        let a: Arc<String> = injector.get_as("service").unwrap();
        let b: Arc<String> = injector.get_as("service").unwrap();

        assert_eq!(a.as_str(), "instance-1");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*counter.lock().unwrap(), 1);
    }

    #[test]
    fn test_injector_self_registration() {
        let injector = Injector::new(Vec::new()).unwrap();
        let this: Arc<Injector> = injector.get_as(INJECTOR_NAME).unwrap();
        assert!(this.ptr_eq(&injector));
    }
}
