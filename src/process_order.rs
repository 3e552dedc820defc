//! Signal process-order planner
//!
//! Computes, per graph, the order in which signal objects run each block so
//! that every upstream buffer is filled before its consumers read it. The
//! walk is anchored at the graph's leaves — objects with no outgoing
//! connections, plus the logical leaves whose connections leave the graph
//! (`send`, `send~`, `throw~`, outlet bridges) — and climbs upstream
//! depth-first, appending each object after its sources. Logical roots
//! (`receive`, `receive~`, `catch~`, inlet bridges) contribute themselves
//! without walking incoming edges, which may originate outside the graph.
//!
//! A revisit of an in-progress object is a signal cycle: it is reported
//! through the error sink and the offending edge is dropped from the plan.

use crate::graph::{GraphId, Mark, NodeKind, ObjectId, Patch};

fn is_logical_leaf(label: &str) -> bool {
    matches!(label, "send" | "send~" | "throw~" | "outlet" | "outlet~")
}

fn is_logical_root(label: &str) -> bool {
    matches!(label, "receive" | "receive~" | "catch~" | "inlet" | "inlet~")
}

fn processes_audio(patch: &Patch, id: ObjectId) -> bool {
    matches!(
        patch.slots[id].node,
        NodeKind::Audio(_) | NodeKind::Graph(_)
    )
}

fn has_outgoing(patch: &Patch, id: ObjectId) -> bool {
    patch.slots[id]
        .outlets
        .iter()
        .any(|outlet| !outlet.outgoing.is_empty())
}

/// Plan every graph of the patch. Graphs plan independently; a nested graph
/// appears as a single node in its parent's list and runs its own list when
/// its turn comes.
pub(crate) fn plan_all(patch: &mut Patch) {
    for graph in 0..patch.graphs.len() {
        plan_graph(patch, graph);
    }
}

/// Recompute one graph's signal execution list.
pub(crate) fn plan_graph(patch: &mut Patch, graph: GraphId) {
    for k in 0..patch.graphs[graph].children.len() {
        let id = patch.graphs[graph].children[k];
        patch.slots[id].mark = Mark::Clean;
    }

    let mut leaves = Vec::new();
    for k in 0..patch.graphs[graph].children.len() {
        let id = patch.graphs[graph].children[k];
        if is_logical_leaf(&patch.slots[id].label) || !has_outgoing(patch, id) {
            leaves.push(id);
        }
    }

    let mut order = Vec::new();
    for leaf in leaves {
        visit(patch, graph, leaf, &mut order);
    }

    let list: Vec<ObjectId> = order
        .into_iter()
        .filter(|&id| processes_audio(patch, id))
        .collect();
    patch.graphs[graph].dsp_order = list;
}

fn visit(patch: &mut Patch, graph: GraphId, id: ObjectId, order: &mut Vec<ObjectId>) {
    match patch.slots[id].mark {
        Mark::Done => return,
        Mark::InProgress => {
            patch.print.print_err(&format!(
                "signal loop through \"{}\"; the loop edge is dropped from the process order",
                patch.slots[id].label
            ));
            return;
        }
        Mark::Clean => {}
    }
    patch.slots[id].mark = Mark::InProgress;

    if !is_logical_root(&patch.slots[id].label) {
        for inlet in 0..patch.slots[id].inlets.len() {
            let mut k = 0;
            loop {
                let Some(&(upstream, _)) = patch.slots[id].inlets[inlet].incoming.get(k) else {
                    break;
                };
                // implicit rendezvous wiring can cross graphs; stay inside
                if patch.slots[upstream].graph == graph {
                    visit(patch, graph, upstream, order);
                }
                k += 1;
            }
        }
    }

    patch.slots[id].mark = Mark::Done;
    order.push(id);
}
