//! Query plans: trimmed spanning trees over the domain graph.

use std::fmt;

use crate::domain::{Edge, InternalEntityType, JoinKind};

/// One entity of a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanNode {
    pub entity: InternalEntityType,
    pub parent: Option<usize>,
    /// Edge followed from the parent; `None` for the root.
    pub edge: Option<Edge>,
    pub children: Vec<usize>,
}

/// Rooted tree of the entities a query joins.
///
/// Nodes are stored in breadth-first order, so every parent precedes its
/// children. Each entity appears at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    nodes: Vec<PlanNode>,
    reversed: bool,
}

impl QueryPlan {
    /// Single-node plan.
    pub fn new(root: InternalEntityType) -> Self {
        Self {
            nodes: vec![PlanNode {
                entity: root,
                parent: None,
                edge: None,
                children: Vec::new(),
            }],
            reversed: false,
        }
    }

    /// Attach `edge.dest` under the node at `parent`, returning its index.
    pub(crate) fn attach(&mut self, parent: usize, edge: Edge) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(PlanNode {
            entity: edge.dest,
            parent: Some(parent),
            edge: Some(edge),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(idx);
        idx
    }

    /// Keep only the nodes for which `keep` holds, preserving order.
    ///
    /// Callers guarantee that kept nodes have kept parents.
    pub(crate) fn retain(&self, keep: &[bool]) -> QueryPlan {
        let mut remap = vec![None; self.nodes.len()];
        let mut nodes: Vec<PlanNode> = Vec::new();

        for (idx, node) in self.nodes.iter().enumerate() {
            if !keep[idx] {
                continue;
            }
            let parent = node.parent.and_then(|p| remap[p]);
            let new_idx = nodes.len();
            remap[idx] = Some(new_idx);
            if let Some(p) = parent {
                nodes[p].children.push(new_idx);
            }
            nodes.push(PlanNode {
                entity: node.entity,
                parent,
                edge: node.edge,
                children: Vec::new(),
            });
        }

        QueryPlan {
            nodes,
            reversed: self.reversed,
        }
    }

    pub(crate) fn mark_reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    pub fn root(&self) -> InternalEntityType {
        self.nodes[0].entity
    }

    /// Whether the plan was re-rooted at the measured entity.
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn nodes(&self) -> &[PlanNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Entities in breadth-first order.
    pub fn entities(&self) -> impl Iterator<Item = InternalEntityType> + '_ {
        self.nodes.iter().map(|n| n.entity)
    }

    pub fn contains(&self, entity: InternalEntityType) -> bool {
        self.nodes.iter().any(|n| n.entity == entity)
    }

    /// Plan edges, parent to child, in breadth-first order.
    pub fn traverse(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.nodes.iter().filter_map(|n| n.edge.as_ref())
    }

    pub fn has_where_edge(&self) -> bool {
        self.traverse().any(|e| e.join_kind == JoinKind::Where)
    }

    /// Entity joined through `entity`'s parent edge.
    pub fn parent_of(&self, entity: InternalEntityType) -> Option<InternalEntityType> {
        let node = self.nodes.iter().find(|n| n.entity == entity)?;
        node.parent.map(|p| self.nodes[p].entity)
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, idx: usize, depth: usize) -> fmt::Result {
        let node = &self.nodes[idx];
        let marker = match node.edge.map(|e| e.join_kind) {
            None => String::new(),
            Some(JoinKind::Natural) => " (natural)".into(),
            Some(JoinKind::Where) => " (where)".into(),
        };
        writeln!(f, "{}{}{}", "  ".repeat(depth), node.entity, marker)?;
        for &child in &node.children {
            self.write_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for QueryPlan {
    /// Indented tree, one entity per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reversed {
            writeln!(f, "reversed plan")?;
        }
        self.write_node(f, 0, 0)
    }
}
