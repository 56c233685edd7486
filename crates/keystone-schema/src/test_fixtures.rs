use crate::{
    build::SchemaBuilder,
    node::{AggregateId, Schema},
    source::NodeRecord,
    types::Primitive,
};

/// Invoice (root) → lines (children) → product (key reference) → Product (root).
/// Product is declared after the reference to it.
pub(crate) fn invoice_records() -> Vec<NodeRecord> {
    vec![
        NodeRecord::root(1, "Invoice"),
        NodeRecord::value(2, 1, "id", Primitive::Text).key(),
        NodeRecord::value(3, 1, "issued_on", Primitive::Date).required(),
        NodeRecord::children(4, 1, "lines"),
        NodeRecord::value(5, 4, "line_no", Primitive::Int).key(),
        NodeRecord::reference(6, 4, "product", "Product").key(),
        NodeRecord::value(7, 4, "quantity", Primitive::Decimal),
        NodeRecord::child(8, 1, "shipping"),
        NodeRecord::value(9, 8, "address", Primitive::Text),
        NodeRecord::root(10, "Product"),
        NodeRecord::value(11, 10, "sku", Primitive::Text).key(),
        NodeRecord::value(12, 10, "title", Primitive::Text).display(),
    ]
}

pub(crate) fn build(records: Vec<NodeRecord>) -> Schema {
    SchemaBuilder::default()
        .build(records)
        .expect("fixture schema must build")
}

pub(crate) fn id(schema: &Schema, route: &str) -> AggregateId {
    schema
        .find(route)
        .unwrap_or_else(|| panic!("no aggregate at route '{route}'"))
}
