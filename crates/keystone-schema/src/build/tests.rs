use super::*;
use crate::{
    node::MemberKind,
    source::{NodeRecord, options},
    test_fixtures::{build, id, invoice_records},
    types::Primitive,
};

fn build_err(records: Vec<NodeRecord>) -> ErrorTree {
    match SchemaBuilder::default().build(records) {
        Ok(_) => panic!("schema should have been rejected"),
        Err(BuildError::Validation(errs)) => errs,
    }
}

fn payment_records(branches: &[(&str, &str)]) -> Vec<NodeRecord> {
    let mut records = vec![
        NodeRecord::root(1, "Order"),
        NodeRecord::value(2, 1, "order_no", Primitive::Int).key(),
        NodeRecord::variation(3, 1, "payment"),
    ];
    for (i, (name, value)) in (10..).zip(branches) {
        records.push(NodeRecord::branch(i, 3, name, value));
    }

    records
}

#[test]
fn builds_roots_in_declaration_order() {
    let schema = build(invoice_records());

    let roots: Vec<_> = schema
        .roots()
        .iter()
        .map(|r| schema.aggregate(*r).physical_name.as_str())
        .collect();

    assert_eq!(roots, ["Invoice", "Product"]);
}

#[test]
fn binds_forward_reference_across_roots() {
    let schema = build(invoice_records());
    let lines = id(&schema, "Invoice/lines");
    let product = id(&schema, "Product");

    let member = schema.find_member(lines, "product").unwrap();
    let reference = member.as_reference().unwrap();

    assert_eq!(reference.target, product);
    assert!(reference.is_key);
    assert_eq!(schema.referrers(product), &[member.id]);
}

#[test]
fn assigns_roles_and_owner_edges() {
    let schema = build(invoice_records());
    let invoice = id(&schema, "Invoice");
    let lines = id(&schema, "Invoice/lines");
    let shipping = id(&schema, "Invoice/shipping");

    assert_eq!(schema.aggregate(invoice).role, Role::Root);
    assert_eq!(schema.aggregate(lines).role, Role::Children);
    assert_eq!(schema.aggregate(shipping).role, Role::Child);

    let edge = schema.aggregate(lines).owner.unwrap();
    assert_eq!(edge.parent, invoice);
    assert_eq!(schema.member(edge.member).name, "lines");
    assert!(matches!(
        schema.member(edge.member).kind,
        MemberKind::Children { child } if child == lines
    ));
}

#[test]
fn members_keep_declaration_order() {
    let schema = build(invoice_records());
    let invoice = id(&schema, "Invoice");

    let names: Vec<_> = schema.members(invoice).map(|m| m.name.as_str()).collect();

    assert_eq!(names, ["id", "issued_on", "lines", "shipping"]);
}

#[test]
fn key_members_are_required() {
    let schema = build(invoice_records());
    let invoice = id(&schema, "Invoice");

    let MemberKind::Value(value) = &schema.find_member(invoice, "id").unwrap().kind else {
        panic!("id should be a value member");
    };

    assert!(value.is_key);
    assert!(value.is_required);
}

#[test]
fn db_name_defaults_to_snake_case() {
    let schema = build(vec![
        NodeRecord::root(1, "LineItem"),
        NodeRecord::value(2, 1, "lineNo", Primitive::Int).key(),
        NodeRecord::value(3, 1, "note", Primitive::Text).with_option(options::DB_NAME, "memo"),
    ]);
    let root = id(&schema, "LineItem");

    assert_eq!(schema.aggregate(root).db_name, "line_item");

    let names: Vec<_> = schema
        .members(root)
        .map(|m| match &m.kind {
            MemberKind::Value(v) => v.db_name.clone(),
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(names, ["line_no", "memo"]);
}

#[test]
fn resolves_non_root_reference_targets() {
    let mut records = invoice_records();
    records.push(NodeRecord::root(20, "Return"));
    records.push(NodeRecord::value(21, 20, "return_no", Primitive::Int).key());
    records.push(NodeRecord::reference(22, 20, "line", "ref-to:Invoice/lines"));

    let schema = build(records);
    let ret = id(&schema, "Return");
    let line = schema.find_member(ret, "line").unwrap();

    assert_eq!(
        line.as_reference().unwrap().target,
        id(&schema, "Invoice/lines")
    );
}

#[test]
fn rejects_unseen_parent_without_reporting_descendants() {
    let errs = build_err(vec![
        NodeRecord::root(1, "Invoice"),
        NodeRecord::value(2, 1, "id", Primitive::Text).key(),
        NodeRecord::children(3, 99, "lines"),
        NodeRecord::value(4, 3, "line_no", Primitive::Int).key(),
    ]);

    assert_eq!(errs.len(), 1);
    assert!(matches!(
        errs.iter().next().unwrap(),
        SchemaError::MalformedSchema { route, .. } if route == "lines"
    ));
}

#[test]
fn rejects_child_declared_before_parent() {
    let errs = build_err(vec![
        NodeRecord::value(2, 1, "id", Primitive::Text).key(),
        NodeRecord::root(1, "Invoice"),
    ]);

    assert!(
        errs.iter()
            .any(|e| matches!(e, SchemaError::MalformedSchema { .. }))
    );
}

#[test]
fn rejects_duplicate_node_ids() {
    let errs = build_err(vec![
        NodeRecord::root(1, "Invoice"),
        NodeRecord::value(1, 1, "id", Primitive::Text).key(),
    ]);

    assert!(matches!(
        errs.iter().next().unwrap(),
        SchemaError::MalformedSchema { message, .. } if message.contains("more than once")
    ));
}

#[test]
fn rejects_duplicate_member_names_with_route() {
    let errs = build_err(vec![
        NodeRecord::root(1, "Invoice"),
        NodeRecord::value(2, 1, "id", Primitive::Text).key(),
        NodeRecord::value(3, 1, "id", Primitive::Int),
    ]);

    assert_eq!(
        errs.into_vec(),
        vec![SchemaError::DuplicateName {
            route: "Invoice/id".to_string(),
            name: "id".to_string(),
        }]
    );
}

#[test]
fn rejects_duplicate_root_names() {
    let errs = build_err(vec![
        NodeRecord::root(1, "Invoice"),
        NodeRecord::value(2, 1, "id", Primitive::Text).key(),
        NodeRecord::root(3, "Invoice"),
        NodeRecord::value(4, 3, "id", Primitive::Text).key(),
    ]);

    assert!(matches!(
        errs.iter().next().unwrap(),
        SchemaError::DuplicateName { name, .. } if name == "Invoice"
    ));
}

#[test]
fn rejects_unresolved_reference_target() {
    let errs = build_err(vec![
        NodeRecord::root(1, "Invoice"),
        NodeRecord::value(2, 1, "id", Primitive::Text).key(),
        NodeRecord::reference(3, 1, "customer", "Customer"),
    ]);

    assert_eq!(
        errs.into_vec(),
        vec![SchemaError::UnresolvedReferenceTarget {
            route: "Invoice/customer".to_string(),
            target: "Customer".to_string(),
        }]
    );
}

#[test]
fn accepts_variation_with_two_branches() {
    let schema = build(payment_records(&[("card", "CARD"), ("cash", "CASH")]));
    let order = id(&schema, "Order");

    let MemberKind::Variation(variation) = &schema.find_member(order, "payment").unwrap().kind
    else {
        panic!("payment should be a variation");
    };

    assert_eq!(variation.discriminator, "payment");
    assert_eq!(variation.branches.len(), 2);
    assert_eq!(variation.branch("CASH"), Some(id(&schema, "Order/payment/cash")));
    assert_eq!(
        schema.aggregate(id(&schema, "Order/payment/card")).role,
        Role::VariationBranch {
            discriminator: "CARD".to_string()
        }
    );
}

#[test]
fn rejects_variation_with_one_branch_naming_the_member() {
    let errs = build_err(payment_records(&[("card", "CARD")]));

    let err = errs.iter().next().unwrap();
    assert!(matches!(err, SchemaError::SchemaViolation { route, .. } if route == "Order/payment"));
    assert!(err.to_string().contains("'payment'"));
}

#[test]
fn rejects_variation_without_branches() {
    let errs = build_err(payment_records(&[]));

    assert!(
        errs.iter()
            .any(|e| e.to_string().contains("at least 2 are required"))
    );
}

#[test]
fn rejects_concrete_member_with_branches() {
    let errs = build_err(vec![
        NodeRecord::root(1, "Order"),
        NodeRecord::value(2, 1, "order_no", Primitive::Int).key(),
        NodeRecord::value(3, 1, "payment", Primitive::Text),
        NodeRecord::branch(4, 3, "card", "CARD"),
        NodeRecord::branch(5, 3, "cash", "CASH"),
    ]);

    assert!(matches!(
        errs.iter().next().unwrap(),
        SchemaError::SchemaViolation { message, .. } if message.contains("not declared as a variation")
    ));
}

#[test]
fn rejects_duplicate_discriminator_values() {
    let errs = build_err(payment_records(&[("card", "X"), ("cash", "X"), ("bank", "Y")]));

    assert!(
        errs.iter()
            .any(|e| e.to_string().contains("discriminator value 'X'"))
    );
}

#[test]
fn rejects_root_and_children_without_keys() {
    let errs = build_err(vec![
        NodeRecord::root(1, "Invoice"),
        NodeRecord::value(2, 1, "memo", Primitive::Text),
        NodeRecord::children(3, 1, "lines"),
        NodeRecord::value(4, 3, "quantity", Primitive::Int),
    ]);

    let routes: Vec<_> = errs.iter().map(SchemaError::route).collect();
    assert_eq!(routes, ["Invoice", "Invoice/lines"]);
}

#[test]
fn child_without_keys_is_accepted() {
    let schema = build(invoice_records());
    let shipping = id(&schema, "Invoice/shipping");

    assert!(schema.members(shipping).all(|m| !m.is_key()));
}

#[test]
fn key_reference_satisfies_key_requirement() {
    let schema = build(vec![
        NodeRecord::root(1, "Product"),
        NodeRecord::value(2, 1, "sku", Primitive::Text).key(),
        NodeRecord::root(3, "Stock"),
        NodeRecord::reference(4, 3, "product", "Product").key(),
    ]);

    assert_eq!(schema.roots().len(), 2);
}

#[test]
fn rejects_float_keys_and_bad_options() {
    let errs = build_err(vec![
        NodeRecord::root(1, "Reading"),
        NodeRecord::value(2, 1, "value", Primitive::Float64).key(),
        NodeRecord::value(3, 1, "at", Primitive::Timestamp).with_option(options::IS_KEY, "yes"),
        NodeRecord::value(4, 1, "sensor", Primitive::Text)
            .key()
            .with_option(options::SCALAR_TYPE, "Blob"),
    ]);

    let messages: Vec<_> = errs.iter().map(ToString::to_string).collect();
    assert!(messages.iter().any(|m| m.contains("cannot be a key")));
    assert!(messages.iter().any(|m| m.contains("must be 'true' or 'false'")));
    assert!(messages.iter().any(|m| m.contains("unknown scalar type 'Blob'")));
}

#[test]
fn rejects_reserved_and_invalid_names() {
    let errs = build_err(vec![
        NodeRecord::root(1, "Invoice"),
        NodeRecord::value(2, 1, "id", Primitive::Text).key(),
        NodeRecord::value(3, 1, "self", Primitive::Text),
        NodeRecord::value(4, 1, "due-date", Primitive::Date),
    ]);

    let routes: Vec<_> = errs.iter().map(SchemaError::route).collect();
    assert_eq!(routes, ["Invoice/self", "Invoice/due-date"]);
}

#[test]
fn rejects_reference_named_like_the_parent_hop() {
    let errs = build_err(vec![
        NodeRecord::root(1, "Org"),
        NodeRecord::value(2, 1, "id", Primitive::Text).key(),
        NodeRecord::children(3, 1, "teams"),
        NodeRecord::value(4, 3, "seq", Primitive::Int).key(),
        NodeRecord::reference(5, 3, "parent", "Other").key(),
        NodeRecord::root(6, "Other"),
        NodeRecord::value(7, 6, "id", Primitive::Text).key(),
    ]);

    let errs = errs.into_vec();
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].route(), "Org/teams/parent");
    assert!(errs[0].to_string().contains("cannot be named 'parent'"));
}

#[test]
fn collects_errors_from_every_pass() {
    let errs = build_err(vec![
        NodeRecord::root(1, "Invoice"),
        NodeRecord::value(2, 1, "memo", Primitive::Text),
        NodeRecord::reference(3, 1, "customer", "Customer"),
        NodeRecord::value(4, 77, "orphan", Primitive::Text),
    ]);

    assert!(
        errs.iter()
            .any(|e| matches!(e, SchemaError::MalformedSchema { .. }))
    );
    assert!(
        errs.iter()
            .any(|e| matches!(e, SchemaError::SchemaViolation { .. }))
    );
    assert!(
        errs.iter()
            .any(|e| matches!(e, SchemaError::UnresolvedReferenceTarget { .. }))
    );
}

#[test]
fn rejects_nodes_under_value_members() {
    let errs = build_err(vec![
        NodeRecord::root(1, "Invoice"),
        NodeRecord::value(2, 1, "id", Primitive::Text).key(),
        NodeRecord::value(3, 2, "nested", Primitive::Text),
    ]);

    assert!(matches!(
        errs.iter().next().unwrap(),
        SchemaError::MalformedSchema { route, .. } if route == "Invoice/id"
    ));
}
