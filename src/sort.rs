//! Topological ordering of module descriptors.

use std::collections::{HashMap, HashSet};

use crate::error::{DiError, DiResult};
use crate::module::Module;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Resolving,
    Resolved,
}

/// Orders `modules` so that every module appears after all of its direct
/// and transitive dependencies.
///
/// Names in `resolved` are assumed satisfied by an ancestor injector and
/// are not re-validated. Ties between independent modules preserve the
/// input order of the DFS kickoff, then dependency-list order within each
/// module. When a name repeats within one load, the last occurrence wins
/// and earlier ones are dropped.
pub(crate) fn sort(modules: Vec<Module>, resolved: &HashSet<String>) -> DiResult<Vec<Module>> {
    let mut marks: HashMap<String, Mark> =
        resolved.iter().map(|name| (name.clone(), Mark::Resolved)).collect();

    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, module) in modules.iter().enumerate() {
        index.insert(module.name(), i);
    }

    let mut order = Vec::with_capacity(modules.len());
    for module in &modules {
        if !marks.contains_key(module.name()) {
            visit(index[module.name()], &modules, &index, &mut marks, &mut order)?;
        }
    }

    let mut slots: Vec<Option<Module>> = modules.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
}

fn visit(
    idx: usize,
    modules: &[Module],
    index: &HashMap<&str, usize>,
    marks: &mut HashMap<String, Mark>,
    order: &mut Vec<usize>,
) -> DiResult<()> {
    let module = &modules[idx];
    marks.insert(module.name().to_string(), Mark::Resolving);

    for dep in module.dependencies() {
        match marks.get(dep.as_str()) {
            Some(Mark::Resolving) => return Err(DiError::ModuleCycle),
            Some(Mark::Resolved) => {}
            None => {
                let next = *index
                    .get(dep.as_str())
                    .ok_or_else(|| DiError::MissingModule(dep.clone()))?;
                visit(next, modules, index, marks, order)?;
            }
        }
    }

    marks.insert(module.name().to_string(), Mark::Resolved);
    order.push(idx);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(modules: &[Module]) -> Vec<&str> {
        modules.iter().map(|m| m.name()).collect()
    }

    #[test]
    fn sorts_a_linear_chain_from_any_input_order() {
        for input in [["a", "b", "c"], ["c", "b", "a"], ["a", "c", "b"]] {
            let modules = input
                .iter()
                .map(|&name| match name {
                    "a" => Module::new("a"),
                    "b" => Module::with_dependencies("b", ["a"]),
                    _ => Module::with_dependencies("c", ["b"]),
                })
                .collect();
            let sorted = sort(modules, &HashSet::new()).unwrap();
            assert_eq!(names(&sorted), ["a", "b", "c"]);
        }
    }

    #[test]
    fn rejects_a_cycle() {
        let modules = vec![
            Module::with_dependencies("b", ["c"]),
            Module::with_dependencies("c", ["b"]),
        ];
        assert_eq!(sort(modules, &HashSet::new()).unwrap_err(), DiError::ModuleCycle);
    }

    #[test]
    fn rejects_a_self_cycle() {
        let modules = vec![Module::with_dependencies("a", ["a"])];
        assert_eq!(sort(modules, &HashSet::new()).unwrap_err(), DiError::ModuleCycle);
    }

    #[test]
    fn names_the_missing_dependency() {
        let modules = vec![Module::with_dependencies("d", ["missing"])];
        assert_eq!(
            sort(modules, &HashSet::new()).unwrap_err(),
            DiError::MissingModule("missing".to_string())
        );
    }

    #[test]
    fn parent_resolved_names_are_not_revalidated() {
        let resolved: HashSet<String> = ["base".to_string()].into();
        let modules = vec![Module::with_dependencies("app", ["base"])];
        let sorted = sort(modules, &resolved).unwrap();
        assert_eq!(names(&sorted), ["app"]);
    }

    #[test]
    fn last_occurrence_wins_for_duplicate_names() {
        let modules = vec![
            Module::new("dup"),
            Module::with_dependencies("other", ["dup"]),
            Module::with_dependencies("dup", ["other"]),
        ];
        // The surviving "dup" depends on "other", which closes a cycle.
        assert_eq!(sort(modules, &HashSet::new()).unwrap_err(), DiError::ModuleCycle);
    }
}
