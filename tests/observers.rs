/// Tests for diagnostic observer hooks.
use modwire::{DiError, DiObserver, InjectFn, Injector, Module};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl DiObserver for Recorder {
    fn resolution_started(&self, name: &str) {
        self.push(format!("start:{name}"));
    }

    fn resolution_succeeded(&self, name: &str) {
        self.push(format!("ok:{name}"));
    }

    fn resolution_failed(&self, name: &str, error: &DiError) {
        self.push(format!("err:{name}:{error}"));
    }

    fn run_block_invoked(&self, module: &str) {
        self.push(format!("run:{module}"));
    }
}

#[test]
fn test_observer_sees_run_blocks_and_resolutions() {
    let recorder = Arc::new(Recorder::default());
    let module = Module::new("app")
        .constant("answer", 42u32)
        .run(InjectFn::new(&["answer"], |_| Ok(())));

    let observers = vec![recorder.clone() as Arc<dyn DiObserver>];
    let injector = Injector::with_observers(vec![module], None, observers).unwrap();

    assert_eq!(recorder.events(), ["run:app", "start:answer", "ok:answer"]);

    // Cache hits are silent.
    injector.get("answer").unwrap();
    assert_eq!(recorder.events().len(), 3);
}

#[test]
fn test_observer_sees_failures() {
    let recorder = Arc::new(Recorder::default());
    let module = Module::new("app").factory("broken", InjectFn::new(&["absent"], |_| Ok(())));

    let observers = vec![recorder.clone() as Arc<dyn DiObserver>];
    let injector = Injector::with_observers(vec![module], None, observers).unwrap();
    let _ = injector.get("broken");

    let events = recorder.events();
    assert_eq!(events[0], "start:broken");
    assert!(events[1].starts_with("err:broken:"));
}
