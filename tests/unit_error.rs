/// Unit tests for DiError display text and the std::error::Error impl
use modwire::DiError;
use std::error::Error;

#[test]
fn test_error_display_missing_module() {
    let error = DiError::MissingModule("mod-b".to_string());
    assert_eq!(format!("{}", error), "module \"mod-b\" could not be found");
}

#[test]
fn test_error_display_module_cycle() {
    let error = DiError::ModuleCycle;
    assert_eq!(format!("{}", error), "cycle in the module graph; no load order exists");
}

#[test]
fn test_error_display_missing_provider() {
    let error = DiError::MissingProvider("emitter".to_string());
    assert_eq!(format!("{}", error), "no provider for \"emitter\"");
}

#[test]
fn test_error_display_circular_dependency() {
    let error = DiError::CircularDependency("emitter".to_string());
    assert_eq!(
        format!("{}", error),
        "circular dependency while resolving \"emitter\""
    );
}

#[test]
fn test_error_display_invalid_token() {
    let error = DiError::InvalidToken(String::new());
    assert_eq!(
        format!("{}", error),
        "invalid injection token \"\"; expected a non-empty service name"
    );
}

#[test]
fn test_error_display_missing_argument() {
    let error = DiError::MissingArgument("bus".to_string());
    assert_eq!(
        format!("{}", error),
        "argument \"bus\" is not in this callable's dependency list"
    );
}

#[test]
fn test_error_display_type_mismatch() {
    let error = DiError::TypeMismatch {
        name: "port".to_string(),
        expected: "u16",
    };
    assert_eq!(format!("{}", error), "type mismatch for \"port\": value is not a u16");
}

#[test]
fn test_error_display_undecoratable_provider() {
    let error = DiError::UndecoratableProvider("ghost".to_string());
    assert_eq!(
        format!("{}", error),
        "cannot decorate \"ghost\": no provider registered for it"
    );
}

#[test]
fn test_errors_implement_std_error() {
    let error: Box<dyn Error> = Box::new(DiError::ModuleCycle);
    assert!(error.source().is_none());
}

#[test]
fn test_errors_are_comparable() {
    assert_eq!(
        DiError::MissingProvider("a".to_string()),
        DiError::MissingProvider("a".to_string())
    );
    assert_ne!(
        DiError::MissingProvider("a".to_string()),
        DiError::CircularDependency("a".to_string())
    );
}
