use crate::model::{AggregateView, Model};
use keystone_schema::node::AggregateId;
use std::collections::VecDeque;

///
/// Walk
///
/// Every root in declaration order, then the owned aggregates of each root
/// in pre-order. Referenced roots are therefore yielded before any owned
/// aggregate that points at them.
///

pub struct Walk<'a> {
    model: &'a Model,
    pending: VecDeque<AggregateId>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(model: &'a Model) -> Self {
        let schema = model.schema();
        let pending = schema
            .roots()
            .iter()
            .copied()
            .chain(schema.roots().iter().flat_map(|&root| schema.descendants(root)))
            .collect();

        Self { model, pending }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = AggregateView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.pending.pop_front()?;

        Some(self.model.view(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.pending.len(), Some(self.pending.len()))
    }
}

impl ExactSizeIterator for Walk<'_> {}

///
/// Visitor
///
/// Tree-order traversal: each root is entered, its owned aggregates are
/// visited depth-first in declaration order, then the root is exited.
///

pub trait Visitor {
    fn enter(&mut self, view: &AggregateView<'_>);

    fn exit(&mut self, _view: &AggregateView<'_>) {}
}

impl Model {
    pub fn accept(&self, visitor: &mut impl Visitor) {
        for &root in self.roots() {
            self.visit(root, visitor);
        }
    }

    fn visit(&self, id: AggregateId, visitor: &mut impl Visitor) {
        let view = self.view(id);

        visitor.enter(&view);
        for child in self.schema().owned(id) {
            self.visit(child, visitor);
        }
        visitor.exit(&view);
    }
}
