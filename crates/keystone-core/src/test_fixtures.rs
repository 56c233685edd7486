use keystone_schema::prelude::*;

/// Invoice (root) → lines (children) → product (key reference) → Product (root),
/// plus a one-to-one shipping child and a Payment root keyed by a variation.
pub(crate) fn invoice_records() -> Vec<NodeRecord> {
    vec![
        NodeRecord::root(1, "Invoice"),
        NodeRecord::value(2, 1, "id", Primitive::Text).key(),
        NodeRecord::value(3, 1, "issued_on", Primitive::Date).required(),
        NodeRecord::children(4, 1, "lines"),
        NodeRecord::value(5, 4, "line_no", Primitive::Int).key(),
        NodeRecord::reference(6, 4, "product", "Product").key().display(),
        NodeRecord::value(7, 4, "quantity", Primitive::Decimal),
        NodeRecord::child(8, 1, "shipping"),
        NodeRecord::value(9, 8, "address", Primitive::Text).display(),
        NodeRecord::root(10, "Product"),
        NodeRecord::value(11, 10, "sku", Primitive::Text).key(),
        NodeRecord::value(12, 10, "title", Primitive::Text).display(),
        NodeRecord::children(13, 10, "tags"),
        NodeRecord::value(14, 13, "tag", Primitive::Text).key(),
        NodeRecord::root(20, "Payment"),
        NodeRecord::variation(21, 20, "method").key(),
        NodeRecord::branch(22, 21, "card", "card"),
        NodeRecord::value(23, 22, "last4", Primitive::Text),
        NodeRecord::reference(24, 22, "issuer", "Product"),
        NodeRecord::branch(25, 21, "cash", "cash"),
        NodeRecord::value(26, 25, "till", Primitive::Int),
    ]
}

pub(crate) fn build(records: Vec<NodeRecord>) -> Schema {
    SchemaBuilder::default()
        .build(records)
        .expect("fixture schema must build")
}

pub(crate) fn invoice_schema() -> Schema {
    build(invoice_records())
}

pub(crate) fn id(schema: &Schema, route: &str) -> AggregateId {
    schema
        .find(route)
        .unwrap_or_else(|| panic!("no aggregate at route '{route}'"))
}

pub(crate) fn member(schema: &Schema, route: &str, name: &str) -> MemberId {
    let aggregate = id(schema, route);

    schema
        .find_member(aggregate, name)
        .unwrap_or_else(|| panic!("no member '{name}' on '{route}'"))
        .id
}
