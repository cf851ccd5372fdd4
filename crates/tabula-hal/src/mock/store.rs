//! Mock description store with atomic change-set commits.

use super::{SharedState, lock};
use crate::error::{HalError, Result};
use crate::traits::DescriptionStore;
use crate::types::{ChangeSet, PropertyOp};
use tracing::debug;

/// Description store view of a [`MockBoard`](super::MockBoard).
///
/// Commits stage every operation against a copy of the node first, so a
/// rejected change set leaves the description untouched.
#[derive(Debug)]
pub struct MockStore {
    state: SharedState,
}

impl MockStore {
    pub(super) fn new(state: SharedState) -> Self {
        Self { state }
    }
}

impl DescriptionStore for MockStore {
    fn node_exists(&self, node: &str) -> bool {
        lock(&self.state).nodes.contains_key(node)
    }

    fn has_property(&self, node: &str, key: &str) -> bool {
        lock(&self.state)
            .nodes
            .get(node)
            .is_some_and(|props| props.contains_key(key))
    }

    async fn commit(&mut self, changeset: ChangeSet) -> Result<()> {
        let mut st = lock(&self.state);
        if st.fail_next_commit {
            st.fail_next_commit = false;
            return Err(HalError::other("injected commit failure"));
        }

        let node = changeset.node().to_string();
        let Some(props) = st.nodes.get(&node) else {
            return Err(HalError::not_found(format!("description node '{node}'")));
        };

        let mut staged = props.clone();
        for op in changeset.ops() {
            match op {
                PropertyOp::Add { key, value } => {
                    if staged.contains_key(key) {
                        return Err(HalError::other(format!(
                            "cannot add '{key}': property already exists"
                        )));
                    }
                    staged.insert(key.clone(), value.clone());
                }
                PropertyOp::Update { key, value } => {
                    if !staged.contains_key(key) {
                        return Err(HalError::other(format!(
                            "cannot update '{key}': no such property"
                        )));
                    }
                    staged.insert(key.clone(), value.clone());
                }
                PropertyOp::Remove { key } => {
                    if staged.remove(key).is_none() {
                        return Err(HalError::other(format!(
                            "cannot remove '{key}': no such property"
                        )));
                    }
                }
            }
        }

        let ops = changeset.len();
        st.nodes.insert(node.clone(), staged);
        st.commits += 1;
        debug!(node, ops, "committed description change set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::MockBoard;
    use super::*;
    use crate::types::PropertyValue;

    #[tokio::test]
    async fn test_commit_applies_all_ops() {
        let board = MockBoard::new();
        let mut store = board.store();

        let mut cs = ChangeSet::begin("touchscreen");
        cs.add_property("reg", PropertyValue::U32(0x40));
        cs.update_property("status", PropertyValue::str("okay"));
        cs.remove_property("vddio-supply");
        store.commit(cs).await.unwrap();

        let props = board.node_properties("touchscreen").unwrap();
        assert_eq!(props.get("reg"), Some(&PropertyValue::U32(0x40)));
        assert_eq!(props.get("status"), Some(&PropertyValue::str("okay")));
        assert!(!props.contains_key("vddio-supply"));
        assert_eq!(board.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_commit_changes_nothing() {
        let board = MockBoard::new();
        let mut store = board.store();
        let before = board.node_properties("touchscreen").unwrap();

        // The update is valid, the remove is not; neither may land.
        let mut cs = ChangeSet::begin("touchscreen");
        cs.update_property("status", PropertyValue::str("okay"));
        cs.remove_property("no-such-property");
        assert!(store.commit(cs).await.is_err());

        assert_eq!(board.node_properties("touchscreen").unwrap(), before);
        assert_eq!(board.commit_count(), 0);
    }

    #[tokio::test]
    async fn test_injected_commit_failure_is_one_shot() {
        let board = MockBoard::new();
        board.fail_next_commit();
        let mut store = board.store();

        let mut cs = ChangeSet::begin("touchscreen");
        cs.update_property("status", PropertyValue::str("okay"));
        assert!(store.commit(cs.clone()).await.is_err());
        assert_eq!(board.commit_count(), 0);

        store.commit(cs).await.unwrap();
        assert_eq!(board.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_add_existing_property_rejected() {
        let board = MockBoard::new();
        let mut store = board.store();

        let mut cs = ChangeSet::begin("touchscreen");
        cs.add_property("status", PropertyValue::str("okay"));
        assert!(store.commit(cs).await.is_err());
    }

    #[tokio::test]
    async fn test_commit_unknown_node_rejected() {
        let board = MockBoard::new();
        let mut store = board.store();

        let cs = ChangeSet::begin("accelerometer");
        assert!(store.commit(cs).await.is_err());
    }
}
