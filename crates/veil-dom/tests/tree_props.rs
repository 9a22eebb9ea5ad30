#![forbid(unsafe_code)]

//! Property tests: arbitrary append/detach sequences keep the tree
//! well-formed, and listener bookkeeping stays exact.

use proptest::prelude::*;
use veil_dom::{Document, DomError, EventKind, ListenerOwner, NodeId};

const EXTRA_NODES: usize = 8;

#[derive(Debug, Clone, Copy)]
enum TreeOp {
    Append { parent: usize, child: usize },
    Detach(usize),
}

fn tree_op() -> impl Strategy<Value = TreeOp> {
    let node = 0..EXTRA_NODES + 2;
    prop_oneof![
        3 => (node.clone(), node.clone()).prop_map(|(parent, child)| TreeOp::Append { parent, child }),
        1 => node.prop_map(TreeOp::Detach),
    ]
}

fn assert_well_formed(doc: &Document, nodes: &[NodeId]) -> Result<(), TestCaseError> {
    let root = doc.document_element();
    prop_assert_eq!(doc.parent(root).unwrap(), None);

    for &node in nodes {
        // Parent and child links agree.
        if let Some(parent) = doc.parent(node).unwrap() {
            let siblings = doc.children(parent).unwrap();
            prop_assert_eq!(siblings.iter().filter(|&&c| c == node).count(), 1);
        }
        for child in doc.children(node).unwrap() {
            prop_assert_eq!(doc.parent(child).unwrap(), Some(node));
            // No cycles: a child never contains its parent.
            prop_assert!(!doc.contains(child, node).unwrap());
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn tree_stays_well_formed(ops in proptest::collection::vec(tree_op(), 0..48)) {
        let doc = Document::default();
        let mut nodes = vec![doc.document_element(), doc.body()];
        nodes.extend((0..EXTRA_NODES).map(|_| doc.create_element("div")));

        for op in ops {
            match op {
                TreeOp::Append { parent, child } => {
                    let (parent, child) = (nodes[parent], nodes[child]);
                    match doc.append_child(parent, child) {
                        Ok(()) => prop_assert_eq!(doc.parent(child).unwrap(), Some(parent)),
                        Err(DomError::HierarchyRequest { .. }) => {
                            prop_assert!(
                                child == doc.document_element()
                                    || doc.contains(child, parent).unwrap()
                            );
                        }
                        Err(other) => prop_assert!(false, "unexpected error {other}"),
                    }
                }
                TreeOp::Detach(node) => {
                    let node = nodes[node];
                    let was_attached = doc.parent(node).unwrap().is_some();
                    prop_assert_eq!(doc.detach(node).unwrap(), was_attached);
                }
            }
            assert_well_formed(&doc, &nodes)?;
        }
    }

    #[test]
    fn off_all_removes_exactly_the_owners_listeners(
        counts in proptest::collection::vec(0usize..5, 1..6),
    ) {
        let doc = Document::default();
        let owners: Vec<ListenerOwner> = counts.iter().map(|_| ListenerOwner::next()).collect();
        for (owner, &count) in owners.iter().zip(&counts) {
            for i in 0..count {
                let kind = if i % 2 == 0 { EventKind::Click } else { EventKind::KeyUp };
                doc.on(doc.body(), kind, *owner, |_, _| {}).unwrap();
            }
        }

        prop_assert_eq!(doc.off_all(owners[0]), counts[0]);
        prop_assert_eq!(doc.listener_count(owners[0]), 0);
        for (owner, &count) in owners.iter().zip(&counts).skip(1) {
            prop_assert_eq!(doc.listener_count(*owner), count);
        }
    }
}
