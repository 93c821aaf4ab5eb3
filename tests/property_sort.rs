/// Property-based tests for module load ordering
///
/// These verify that for any acyclic module set, in any input order, every
/// module's run block executes after those of all its dependencies.
use modwire::{InjectFn, Injector, Module};
use proptest::prelude::*;
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

fn recording(name: String, deps: Vec<String>, log: &Log) -> Module {
    let log = log.clone();
    let tag = name.clone();
    Module::with_dependencies(name, deps).run(InjectFn::new(&[], move |_| {
        log.lock().unwrap().push(tag.clone());
        Ok(())
    }))
}

/// Random DAGs: module `i` may depend only on modules with smaller
/// indices (bit `j` of `masks[i]`), which keeps the graph acyclic by
/// construction; `order` is a random permutation of the input sequence.
fn masks_and_order() -> impl Strategy<Value = (Vec<u8>, Vec<usize>)> {
    (1usize..8).prop_flat_map(|n| {
        (
            prop::collection::vec(any::<u8>(), n),
            Just((0..n).collect::<Vec<usize>>()).prop_shuffle(),
        )
    })
}

fn dep_indices(masks: &[u8], i: usize) -> Vec<usize> {
    (0..i).filter(|&j| masks[i] & (1 << j) != 0).collect()
}

proptest! {
    #[test]
    fn modules_always_load_after_their_dependencies(
        (masks, order) in masks_and_order()
    ) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let modules = order
            .iter()
            .map(|&i| {
                let deps = dep_indices(&masks, i)
                    .into_iter()
                    .map(|j| format!("m{j}"))
                    .collect();
                recording(format!("m{i}"), deps, &log)
            })
            .collect();

        Injector::new(modules).unwrap();

        let seen = log.lock().unwrap().clone();
        prop_assert_eq!(seen.len(), masks.len());
        for (position, name) in seen.iter().enumerate() {
            let i: usize = name[1..].parse().unwrap();
            for j in dep_indices(&masks, i) {
                let dep_position = seen
                    .iter()
                    .position(|n| n == &format!("m{j}"))
                    .expect("dependency must have loaded");
                prop_assert!(
                    dep_position < position,
                    "m{} loaded at {} before its dependency m{} at {}",
                    i, position, j, dep_position
                );
            }
        }
    }

    #[test]
    fn a_chain_loads_in_chain_order_under_any_permutation(
        order in Just((0..6usize).collect::<Vec<usize>>()).prop_shuffle()
    ) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let modules = order
            .iter()
            .map(|&i| {
                let deps = if i == 0 { Vec::new() } else { vec![format!("m{}", i - 1)] };
                recording(format!("m{i}"), deps, &log)
            })
            .collect();

        Injector::new(modules).unwrap();

        let expected: Vec<String> = (0..6).map(|i| format!("m{i}")).collect();
        prop_assert_eq!(log.lock().unwrap().clone(), expected);
    }
}
