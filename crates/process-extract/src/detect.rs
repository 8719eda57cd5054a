//! Container inspection: nested-subprocess detection and child counting

use crate::model::ProcessModel;

/// Whether any direct child of `container_id` is itself a container
///
/// Only direct children are inspected. An unknown id yields `false`.
pub fn has_nested(model: &ProcessModel, container_id: &str) -> bool {
    let Some(idx) = model.index_of(container_id) else {
        return false;
    };
    model.children(idx).any(|child| child.is_container())
}

/// Number of direct children of `container_id`, labels excluded
///
/// Flows count as elements. An unknown id yields zero.
pub fn count_elements(model: &ProcessModel, container_id: &str) -> usize {
    let Some(idx) = model.index_of(container_id) else {
        return 0;
    };
    model.children(idx).filter(|child| !child.is_label()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementDef;

    fn model() -> ProcessModel {
        ProcessModel::from_definitions(vec![
            ElementDef::sub_process("flat", "Flat").with_children(vec![
                ElementDef::task("a", "A"),
                ElementDef::label("a_label"),
                ElementDef::task("b", "B"),
                ElementDef::flow("f", "a", "b"),
            ]),
            ElementDef::sub_process("outer", "Outer").with_children(vec![
                ElementDef::new("inner", "bpmn:subprocess")
                    .with_children(vec![ElementDef::sub_process("deep", "Deep")]),
            ]),
            ElementDef::sub_process("grand", "Grand").with_children(vec![ElementDef::task("x", "X")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_detects_direct_child_container_case_insensitive() {
        let model = model();
        assert!(has_nested(&model, "outer"));
        assert!(!has_nested(&model, "flat"));
    }

    #[test]
    fn test_only_direct_children_count() {
        let model = model();
        assert!(has_nested(&model, "inner"));
        assert!(!has_nested(&model, "deep"));
        assert!(!has_nested(&model, "grand"));
    }

    #[test]
    fn test_unknown_container() {
        let model = model();
        assert!(!has_nested(&model, "nope"));
        assert_eq!(count_elements(&model, "nope"), 0);
    }

    #[test]
    fn test_detection_is_repeatable() {
        let model = model();
        assert_eq!(has_nested(&model, "outer"), has_nested(&model, "outer"));
    }

    #[test]
    fn test_count_excludes_labels() {
        let model = model();
        assert_eq!(count_elements(&model, "flat"), 3);
        assert_eq!(count_elements(&model, "outer"), 1);
    }
}
