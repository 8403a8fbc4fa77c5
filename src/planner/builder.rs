//! Spanning-tree construction and trimming.

use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::{debug, warn};

use super::plan::QueryPlan;
use crate::domain::{DomainSchema, InternalEntityType};
use crate::error::{ChartError, ChartResult};
use crate::query::{JoinStyle, QueryDefinition};

/// Turns a definition into the minimal tree of joins reaching its targets.
///
/// Holds no state between calls; each build starts from fresh visited and
/// queue structures.
pub struct QueryPlanBuilder<'a> {
    schema: &'a DomainSchema,
}

impl<'a> QueryPlanBuilder<'a> {
    pub fn new(schema: &'a DomainSchema) -> Self {
        Self { schema }
    }

    /// Plan `definition`, re-rooting at the measured entity when a left join
    /// would otherwise have to cross a where-emulated edge.
    ///
    /// The conflict is checked on the trimmed plan, so where edges on
    /// branches no target needs never force a re-root.
    pub fn build(&self, definition: &QueryDefinition) -> ChartResult<QueryPlan> {
        let root = definition.root_entity()?;
        let targets = definition.target_entities()?;
        let plan = self.build_from(root, &targets)?;

        if definition.join_style != JoinStyle::Left || !plan.has_where_edge() {
            return Ok(plan);
        }

        let measured = definition.measured_entity()?;
        warn!(
            root = %root,
            measured = %measured,
            "left join over a where edge, re-rooting plan"
        );
        let reversed = self.build_from(measured, &targets)?.mark_reversed();
        if reversed.has_where_edge() {
            return Err(ChartError::plan(format!(
                "left join from {measured} still crosses a where-only relation"
            )));
        }
        Ok(reversed)
    }

    /// Breadth-first spanning tree from `root`, trimmed down to `targets`.
    pub fn build_from(
        &self,
        root: InternalEntityType,
        targets: &BTreeSet<InternalEntityType>,
    ) -> ChartResult<QueryPlan> {
        let full = self.span(root);

        for target in targets {
            if !full.contains(*target) {
                return Err(ChartError::plan(format!(
                    "{target} cannot be reached from {root}"
                )));
            }
        }

        let trimmed = trim(&full, targets);
        debug!(
            root = %root,
            spanned = full.len(),
            kept = trimmed.len(),
            "built query plan"
        );
        Ok(trimmed)
    }

    fn span(&self, root: InternalEntityType) -> QueryPlan {
        let mut plan = QueryPlan::new(root);
        let mut visited = HashSet::from([root]);
        let mut queue = VecDeque::from([0usize]);

        while let Some(current) = queue.pop_front() {
            let entity = plan.nodes()[current].entity;
            for edge in self.schema.outgoing(entity) {
                // Already reached by a shorter or earlier path: no diamonds.
                if !visited.insert(edge.dest) {
                    continue;
                }
                let child = plan.attach(current, edge);
                queue.push_back(child);
            }
        }

        plan
    }
}

/// Drop non-target leaves until every leaf is the root or a target.
fn trim(plan: &QueryPlan, targets: &BTreeSet<InternalEntityType>) -> QueryPlan {
    let nodes = plan.nodes();
    let mut keep = vec![true; nodes.len()];
    let mut live_children: Vec<usize> = nodes.iter().map(|n| n.children.len()).collect();

    let mut queue: VecDeque<usize> = (1..nodes.len())
        .filter(|&idx| live_children[idx] == 0)
        .collect();

    while let Some(idx) = queue.pop_front() {
        let node = &nodes[idx];
        if targets.contains(&node.entity) {
            continue;
        }
        keep[idx] = false;
        if let Some(parent) = node.parent {
            live_children[parent] -= 1;
            if parent != 0 && live_children[parent] == 0 {
                queue.push_back(parent);
            }
        }
    }

    plan.retain(&keep)
}
