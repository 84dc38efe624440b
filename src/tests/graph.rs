use crate::prelude::*;

fn push_int(i: i32) -> Instruction {
    Instruction::Push(Constant::Integer(i))
}

#[test]
fn test_block_api_rejects_terminators() {
    let mut graph = InsnGraph::new();
    let b = graph.block();
    assert!(matches!(
        graph.append(b, Instruction::Jump(JumpCondition::Always)),
        Err(Error::IllegalInstruction(_))
    ));
    assert!(matches!(
        graph.append(b, Instruction::Return(None)),
        Err(Error::IllegalInstruction(_))
    ));
    assert!(matches!(
        graph.append(b, Instruction::Throw),
        Err(Error::IllegalInstruction(_))
    ));
    // The failed appends left the block unchanged.
    assert!(graph.get(b).unwrap().instructions().is_empty());

    // The explicit override is reserved for deserialization paths that
    // reconstruct instructions and edges in lock-step.
    graph
        .get_mut(b)
        .unwrap()
        .append_unchecked(Instruction::Jump(JumpCondition::Always));
    assert_eq!(graph.get(b).unwrap().instructions().len(), 1);
}

#[test]
fn test_jump_installs_instruction_and_edge() {
    let mut graph = InsnGraph::new();
    let a = graph.block();
    let b = graph.block();
    graph.append(a, push_int(1)).unwrap();
    graph.jump(a, b).unwrap();

    assert_eq!(
        graph.get(a).unwrap().last(),
        Some(&Instruction::Jump(JumpCondition::Always))
    );
    let edges: Vec<_> = graph.edges_from(a).collect();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].to, b);
    assert_eq!(edges[0].kind, EdgeKind::Jump);
    graph.check().unwrap();
}

#[test]
fn test_branch_installs_both_edges() {
    let mut graph = InsnGraph::new();
    let a = graph.block();
    let t = graph.block();
    let f = graph.block();
    graph
        .branch(a, JumpCondition::IntegerEqualsZero, t, f)
        .unwrap();

    let kinds: Vec<_> = graph.edges_from(a).map(|e| e.kind.clone()).collect();
    assert!(kinds.contains(&EdgeKind::ConditionalTrue));
    assert!(kinds.contains(&EdgeKind::ConditionalFalse));
    graph.check().unwrap();

    // `Always` is not a condition.
    let b = graph.block();
    assert!(graph
        .branch(b, JumpCondition::Always, t, f)
        .is_err());
}

#[test]
fn test_switch_edges_carry_case_values() {
    let mut graph = InsnGraph::new();
    let a = graph.block();
    let d = graph.block();
    let one = graph.block();
    let two = graph.block();
    graph.switch(a, d, [(1, one), (2, two)]).unwrap();

    let kinds: Vec<_> = graph.edges_from(a).map(|e| e.kind.clone()).collect();
    assert_eq!(kinds.len(), 3);
    assert!(kinds.contains(&EdgeKind::Switch(None)));
    assert!(kinds.contains(&EdgeKind::Switch(Some(1))));
    assert!(kinds.contains(&EdgeKind::Switch(Some(2))));
    graph.check().unwrap();
}

#[test]
fn test_return_block_is_unique_and_empty() {
    let mut graph = InsnGraph::new();
    let a = graph.block();
    let b = graph.block();
    graph.return_(a, Some(LocalType::Int)).unwrap();
    graph.return_(b, None).unwrap();

    let ret = graph.return_block();
    assert_eq!(
        graph.edges_into(ret).count(),
        2,
        "both returns lead into one return block"
    );
    assert!(graph.get(ret).unwrap().instructions().is_empty());
    assert!(graph.get(ret).unwrap().is_terminal());
    assert!(matches!(
        graph.append(ret, push_int(0)),
        Err(Error::IllegalInstruction(_))
    ));
    graph.check().unwrap();
}

#[test]
fn test_throw_leads_to_rethrow_block() {
    let mut graph = InsnGraph::new();
    let a = graph.block();
    graph.throw_(a).unwrap();
    let rethrow = graph.rethrow_block();
    assert_eq!(graph.get(a).unwrap().last(), Some(&Instruction::Throw));
    assert_eq!(graph.successors(a).collect::<Vec<_>>(), vec![rethrow]);
    graph.check().unwrap();
}

#[test]
fn test_terminated_blocks_cannot_be_extended() {
    let mut graph = InsnGraph::new();
    let a = graph.block();
    let b = graph.block();
    graph.jump(a, b).unwrap();
    assert!(matches!(
        graph.return_(a, None),
        Err(Error::IllegalInstruction(_))
    ));
    assert!(matches!(
        graph.fallthrough(a, b),
        Err(Error::IllegalInstruction(_))
    ));
    // A single block cannot carry two terminators or two control edges.
    assert_eq!(graph.edges_from(a).count(), 1);
}

#[test]
fn test_exception_edges_are_orthogonal() {
    let mut graph = InsnGraph::new();
    let a = graph.block();
    let b = graph.block();
    let handler = graph.block();
    let cleanup = graph.block();
    graph.jump(a, b).unwrap();

    // Exception edges attach regardless of how the block terminates, and
    // their priorities follow insertion order.
    graph
        .catch(a, handler, Some("java/io/IOException".to_owned()))
        .unwrap();
    graph.catch(a, cleanup, None).unwrap();

    let exceptional: Vec<_> = graph
        .edges_from(a)
        .filter(|e| e.kind.is_exception())
        .collect();
    assert_eq!(exceptional.len(), 2);
    assert_eq!(
        exceptional[0].kind,
        EdgeKind::Exception {
            priority: 0,
            class: Some("java/io/IOException".to_owned())
        }
    );
    assert_eq!(
        exceptional[1].kind,
        EdgeKind::Exception {
            priority: 1,
            class: None
        }
    );
    graph.check().unwrap();
}

#[test]
fn test_block_equality_is_structural() {
    let mut graph = InsnGraph::new();
    let a = graph.block();
    graph.append(a, push_int(7)).unwrap();

    let original = graph.get(a).unwrap().clone();
    let copy = original.duplicate(None);
    // Structurally equal, yet a distinct identity once adopted.
    assert_eq!(copy, original);
    let adopted = graph.adopt(copy);
    assert_ne!(adopted, a);
    assert_eq!(graph.get(adopted).unwrap(), graph.get(a).unwrap());

    // A relabel breaks structural equality; the instructions still match.
    let relabeled = original.duplicate(Some(99));
    assert_ne!(relabeled, original);
    assert_eq!(relabeled.instructions(), original.instructions());
}

#[test]
fn test_block_equality_ignores_kind_and_inline() {
    let mut graph = InsnGraph::new();
    let a = graph.block();
    graph.append(a, push_int(7)).unwrap();

    // The inline hint takes no part in comparisons.
    let mut copy = graph.get(a).unwrap().duplicate(None);
    copy.inline = true;
    assert_eq!(&copy, graph.get(a).unwrap());

    // Neither does the kind: an empty normal block relabeled to match the
    // return marker compares equal to it.
    let empty = graph.block();
    let ret = graph.return_block();
    let ret_label = graph.get(ret).unwrap().label;
    graph.get_mut(empty).unwrap().label = ret_label;
    assert_ne!(
        graph.get(empty).unwrap().kind(),
        graph.get(ret).unwrap().kind()
    );
    assert_eq!(graph.get(empty).unwrap(), graph.get(ret).unwrap());
}

#[test]
fn test_inline_flag() {
    let mut graph = InsnGraph::new();
    let a = graph.block();
    assert!(!graph.get(a).unwrap().inline);
    graph.get_mut(a).unwrap().inline = true;
    assert!(graph.get(a).unwrap().inline);
}

#[test]
fn test_entry_is_unique_and_first() {
    let graph = InsnGraph::new();
    assert_eq!(graph.len(), 1);
    let (id, block) = graph.blocks().next().unwrap();
    assert_eq!(id, graph.entry());
    assert_eq!(block.kind(), BlockKind::Entry);
}
