// Every mutating operation checks its preconditions before touching the
// tree, so a returned `Err` always leaves it as it was.

use crate::kind::StepType;
use crate::param::Params;
use crate::platform::Platform;
use crate::step::TestStep;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("step '{0}' not found")]
    UnknownStep(String),
    #[error("step '{id}' of kind '{kind}' cannot contain child steps")]
    NotFlowControl { id: String, kind: StepType },
    #[error("leaf step '{id}' of kind '{kind}' declares child steps")]
    LeafWithChildren { id: String, kind: StepType },
    #[error("cannot move step '{id}' into its own subtree")]
    CycleDetected { id: String },
    #[error("index {index} is out of bounds for {len} sibling steps")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("step id '{0}' already exists in the tree")]
    DuplicateId(String),
    #[error("step '{id}' of kind '{kind}' is not available on platform '{platform}'")]
    UnsupportedKind {
        id: String,
        kind: StepType,
        platform: Platform,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepPath(Vec<usize>);

impl StepPath {
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indexes = self.0.clone();
        indexes.push(index);
        Self(indexes)
    }

    pub fn indexes(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn field(&self, rest: &str) -> String {
        format!("{self}.{rest}")
    }
}

impl fmt::Display for StepPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, index) in self.0.iter().enumerate() {
            if depth == 0 {
                write!(f, "steps[{index}]")?;
            } else {
                write!(f, ".children[{index}]")?;
            }
        }
        Ok(())
    }
}

pub struct Walk<'a> {
    stack: Vec<(StepPath, &'a TestStep)>,
}

impl<'a> Walk<'a> {
    fn new(roots: &'a [TestStep]) -> Self {
        let stack = roots
            .iter()
            .enumerate()
            .rev()
            .map(|(index, step)| (StepPath::root(index), step))
            .collect();
        Self { stack }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (StepPath, &'a TestStep);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, step) = self.stack.pop()?;
        for (index, child) in step.children.iter().enumerate().rev() {
            self.stack.push((path.child(index), child));
        }
        Some((path, step))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepTree {
    steps: Vec<TestStep>,
}

impl From<Vec<TestStep>> for StepTree {
    fn from(steps: Vec<TestStep>) -> Self {
        Self { steps }
    }
}

impl StepTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[TestStep] {
        &self.steps
    }

    pub fn into_inner(self) -> Vec<TestStep> {
        self.steps
    }

    pub fn iter(&self) -> Walk<'_> {
        Walk::new(&self.steps)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.iter().map(|(_, step)| step.id.as_str()).collect()
    }

    pub fn find(&self, id: &str) -> Option<&TestStep> {
        self.iter().map(|(_, step)| step).find(|step| step.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut TestStep> {
        find_in_mut(&mut self.steps, id)
    }

    pub fn path_of(&self, id: &str) -> Option<StepPath> {
        self.iter()
            .find(|(_, step)| step.id == id)
            .map(|(path, _)| path)
    }

    pub fn insert(
        &mut self,
        parent: Option<&str>,
        index: usize,
        step: TestStep,
    ) -> Result<(), TreeError> {
        if let Some(leaf) = step.find_leaf_with_children() {
            return rejected(TreeError::LeafWithChildren {
                id: leaf.id.clone(),
                kind: leaf.kind,
            });
        }

        let existing: HashSet<&str> = self.ids().into_iter().collect();
        let mut incoming = HashSet::new();
        for id in step.subtree_ids() {
            if existing.contains(id) || !incoming.insert(id) {
                return rejected(TreeError::DuplicateId(id.to_string()));
            }
        }

        let len = self.container(parent)?.len();
        if index > len {
            return rejected(TreeError::IndexOutOfBounds { index, len });
        }

        tracing::debug!(step = %step.id, kind = %step.kind, parent = ?parent, index, "step inserted");
        self.container_mut(parent)?.insert(index, step);
        Ok(())
    }

    pub fn push(&mut self, parent: Option<&str>, step: TestStep) -> Result<(), TreeError> {
        let len = self.container(parent)?.len();
        self.insert(parent, len, step)
    }

    pub fn remove(&mut self, id: &str) -> Result<TestStep, TreeError> {
        match take_from(&mut self.steps, id) {
            Some(removed) => {
                tracing::debug!(step = %id, nodes = removed.subtree_ids().len(), "step removed");
                Ok(removed)
            }
            None => rejected(TreeError::UnknownStep(id.to_string())),
        }
    }

    // Re-parents and/or reorders a node. `index` is the position in the
    // destination list once the node has been taken out of its old place.
    pub fn move_node(
        &mut self,
        id: &str,
        new_parent: Option<&str>,
        index: usize,
    ) -> Result<(), TreeError> {
        let Some(node) = self.find(id) else {
            return rejected(TreeError::UnknownStep(id.to_string()));
        };
        if let Some(parent) = new_parent {
            if node.contains(parent) {
                return rejected(TreeError::CycleDetected { id: id.to_string() });
            }
        }

        let destination = self.container(new_parent)?;
        let mut len = destination.len();
        if destination.iter().any(|sibling| sibling.id == id) {
            len -= 1;
        }
        if index > len {
            return rejected(TreeError::IndexOutOfBounds { index, len });
        }

        let Some(node) = take_from(&mut self.steps, id) else {
            return rejected(TreeError::UnknownStep(id.to_string()));
        };
        tracing::debug!(step = %id, parent = ?new_parent, index, "step moved");
        self.container_mut(new_parent)?.insert(index, node);
        Ok(())
    }

    pub fn duplicate(&mut self, id: &str) -> Result<String, TreeError> {
        let Some(siblings) = siblings_of_mut(&mut self.steps, id) else {
            return rejected(TreeError::UnknownStep(id.to_string()));
        };
        let Some(position) = siblings.iter().position(|step| step.id == id) else {
            return rejected(TreeError::UnknownStep(id.to_string()));
        };

        let mut copy = siblings[position].clone();
        copy.refresh_ids();
        let copy_id = copy.id.clone();
        siblings.insert(position + 1, copy);
        tracing::debug!(step = %id, copy = %copy_id, "step duplicated");
        Ok(copy_id)
    }

    pub fn update_params(&mut self, id: &str, params: Params) -> Result<(), TreeError> {
        match self.find_mut(id) {
            Some(step) => {
                step.params = params;
                Ok(())
            }
            None => rejected(TreeError::UnknownStep(id.to_string())),
        }
    }

    fn container(&self, parent: Option<&str>) -> Result<&Vec<TestStep>, TreeError> {
        match parent {
            None => Ok(&self.steps),
            Some(parent_id) => {
                let Some(parent) = self.find(parent_id) else {
                    return rejected(TreeError::UnknownStep(parent_id.to_string()));
                };
                if !parent.is_flow_control() {
                    return rejected(TreeError::NotFlowControl {
                        id: parent.id.clone(),
                        kind: parent.kind,
                    });
                }
                Ok(&parent.children)
            }
        }
    }

    fn container_mut(&mut self, parent: Option<&str>) -> Result<&mut Vec<TestStep>, TreeError> {
        match parent {
            None => Ok(&mut self.steps),
            Some(parent_id) => match find_in_mut(&mut self.steps, parent_id) {
                Some(parent) if parent.is_flow_control() => Ok(&mut parent.children),
                Some(parent) => Err(TreeError::NotFlowControl {
                    id: parent.id.clone(),
                    kind: parent.kind,
                }),
                None => Err(TreeError::UnknownStep(parent_id.to_string())),
            },
        }
    }
}

pub(crate) fn rejected<T>(err: TreeError) -> Result<T, TreeError> {
    tracing::warn!(error = %err, "tree operation rejected");
    Err(err)
}

fn find_in_mut<'a>(steps: &'a mut [TestStep], id: &str) -> Option<&'a mut TestStep> {
    for step in steps.iter_mut() {
        if step.id == id {
            return Some(step);
        }
        if let Some(found) = find_in_mut(&mut step.children, id) {
            return Some(found);
        }
    }
    None
}

fn siblings_of_mut<'a>(steps: &'a mut Vec<TestStep>, id: &str) -> Option<&'a mut Vec<TestStep>> {
    if steps.iter().any(|step| step.id == id) {
        return Some(steps);
    }
    steps
        .iter_mut()
        .find(|step| step.contains(id))
        .and_then(|step| siblings_of_mut(&mut step.children, id))
}

fn take_from(steps: &mut Vec<TestStep>, id: &str) -> Option<TestStep> {
    if let Some(position) = steps.iter().position(|step| step.id == id) {
        return Some(steps.remove(position));
    }
    steps
        .iter_mut()
        .find_map(|step| take_from(&mut step.children, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(id: &str) -> TestStep {
        TestStep::bare(id, StepType::Click)
    }

    // roots: [a, loop(b, if(c)), d]
    fn sample() -> StepTree {
        StepTree::from(vec![
            leaf("a"),
            TestStep::bare("loop", StepType::Loop).with_children(vec![
                leaf("b"),
                TestStep::bare("if", StepType::If).with_children(vec![leaf("c")]),
            ]),
            leaf("d"),
        ])
    }

    #[test]
    fn walk_is_depth_first_with_paths() {
        let tree = sample();
        assert_eq!(tree.ids(), vec!["a", "loop", "b", "if", "c", "d"]);
        assert_eq!(tree.len(), 6);
        let path = tree.path_of("c").expect("c is present");
        assert_eq!(path.to_string(), "steps[1].children[1].children[0]");
        assert_eq!(path.field("params.url"), "steps[1].children[1].children[0].params.url");
        assert_eq!(path.depth(), 3);
    }

    #[test]
    fn find_reaches_nested_nodes() {
        let mut tree = sample();
        assert_eq!(tree.find("c").map(|step| step.kind), Some(StepType::Click));
        assert!(tree.find("zzz").is_none());
        tree.find_mut("c").expect("c").name = "renamed".to_string();
        assert_eq!(tree.find("c").unwrap().name, "renamed");
    }

    #[test]
    fn insert_into_flow_control_and_roots() {
        let mut tree = sample();
        tree.insert(Some("if"), 0, leaf("e")).expect("insert under if");
        tree.insert(None, 3, leaf("f")).expect("insert at end of roots");
        assert_eq!(tree.ids(), vec!["a", "loop", "b", "if", "e", "c", "d", "f"]);
    }

    #[test]
    fn empty_flow_control_is_structurally_insertable() {
        let mut tree = StepTree::new();
        tree.push(None, TestStep::bare("l", StepType::Loop)).expect("empty loop");
        tree.push(Some("l"), leaf("x")).expect("fill later");
        assert_eq!(tree.ids(), vec!["l", "x"]);
    }

    #[test]
    fn insert_rejections_leave_tree_unchanged() {
        let mut tree = sample();
        let before = tree.clone();

        assert_eq!(
            tree.insert(Some("a"), 0, leaf("x")),
            Err(TreeError::NotFlowControl {
                id: "a".to_string(),
                kind: StepType::Click
            })
        );
        assert_eq!(
            tree.insert(Some("nope"), 0, leaf("x")),
            Err(TreeError::UnknownStep("nope".to_string()))
        );
        assert_eq!(
            tree.insert(None, 4, leaf("x")),
            Err(TreeError::IndexOutOfBounds { index: 4, len: 3 })
        );
        assert_eq!(
            tree.insert(None, 0, leaf("c")),
            Err(TreeError::DuplicateId("c".to_string()))
        );
        let bad_leaf = leaf("x").with_children(vec![leaf("y")]);
        assert_eq!(
            tree.insert(None, 0, bad_leaf),
            Err(TreeError::LeafWithChildren {
                id: "x".to_string(),
                kind: StepType::Click
            })
        );
        let self_colliding = TestStep::bare("r", StepType::Retry).with_children(vec![leaf("r")]);
        assert_eq!(
            tree.insert(None, 0, self_colliding),
            Err(TreeError::DuplicateId("r".to_string()))
        );

        assert_eq!(tree, before);
    }

    #[test]
    fn remove_takes_whole_subtree() {
        let mut tree = sample();
        let removed = tree.remove("loop").expect("remove loop");
        assert_eq!(removed.subtree_ids(), vec!["loop", "b", "if", "c"]);
        assert_eq!(tree.ids(), vec!["a", "d"]);
        assert_eq!(tree.remove("loop"), Err(TreeError::UnknownStep("loop".to_string())));
    }

    #[test]
    fn move_reorders_and_reparents() {
        let mut tree = sample();
        tree.move_node("d", None, 0).expect("reorder roots");
        assert_eq!(tree.ids(), vec!["d", "a", "loop", "b", "if", "c"]);

        tree.move_node("a", Some("if"), 1).expect("reparent");
        assert_eq!(tree.ids(), vec!["d", "loop", "b", "if", "c", "a"]);

        tree.move_node("if", None, 2).expect("lift subtree");
        assert_eq!(tree.ids(), vec!["d", "loop", "b", "if", "c", "a"]);
        assert_eq!(tree.path_of("if").unwrap().to_string(), "steps[2]");
    }

    #[test]
    fn move_into_own_subtree_is_rejected() {
        let mut tree = sample();
        let before = tree.clone();
        assert_eq!(
            tree.move_node("loop", Some("if"), 0),
            Err(TreeError::CycleDetected { id: "loop".to_string() })
        );
        assert_eq!(
            tree.move_node("loop", Some("loop"), 0),
            Err(TreeError::CycleDetected { id: "loop".to_string() })
        );
        assert_eq!(
            tree.move_node("a", None, 3),
            Err(TreeError::IndexOutOfBounds { index: 3, len: 2 })
        );
        assert_eq!(
            tree.move_node("a", Some("d"), 0),
            Err(TreeError::NotFlowControl {
                id: "d".to_string(),
                kind: StepType::Click
            })
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn duplicate_inserts_fresh_copy_after_original() {
        let mut tree = sample();
        let copy_id = tree.duplicate("if").expect("duplicate if");
        let loop_step = tree.find("loop").unwrap();
        assert_eq!(loop_step.children.len(), 3);
        assert_eq!(loop_step.children[2].id, copy_id);
        assert_ne!(loop_step.children[2].children[0].id, "c");

        let ids = tree.ids();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(tree.duplicate("ghost").is_err());
    }

    #[test]
    fn update_params_replaces_bag() {
        let mut tree = sample();
        let mut params = Params::new();
        params.insert("locator".to_string(), json!({"type": "id", "value": "ok"}));
        tree.update_params("c", params.clone()).expect("update");
        assert_eq!(tree.find("c").unwrap().params, params);
        assert!(tree.update_params("ghost", Params::new()).is_err());
    }

    #[test]
    fn tree_serializes_as_plain_list() {
        let tree = StepTree::from(vec![leaf("a")]);
        let value = serde_json::to_value(&tree).unwrap();
        assert!(value.is_array());
        let back: StepTree = serde_json::from_value(value).unwrap();
        assert_eq!(back, tree);
    }
}
