use super::*;
use crate::{
    instance::KeyValue,
    key::KeyError,
    test_fixtures::{build, id, invoice_schema, member},
};

fn model() -> Model {
    Model::new(invoice_schema(), &GeneratorConfig::default()).unwrap()
}

const fn assert_send_sync<T: Send + Sync>() {}
const _: () = assert_send_sync::<Model>();

#[test]
fn walk_yields_roots_first_then_owned_aggregates() {
    let model = model();

    let routes: Vec<_> = model.walk().map(|v| v.aggregate.route.clone()).collect();
    assert_eq!(
        routes,
        [
            "Invoice",
            "Product",
            "Payment",
            "Invoice/lines",
            "Invoice/shipping",
            "Product/tags",
            "Payment/method/card",
            "Payment/method/cash",
        ]
    );
    assert_eq!(model.walk().len(), model.schema().len());
}

#[test]
fn views_carry_depth_key_and_resolved_members() {
    let model = model();
    let lines = id(model.schema(), "Invoice/lines");
    let product = id(model.schema(), "Product");

    let view = model.walk().find(|v| v.id() == lines).unwrap();
    assert_eq!(view.depth, 1);
    assert_eq!(view.effective_key.len(), 3);
    assert_eq!(
        view.members.iter().map(ResolvedMember::name).collect::<Vec<_>>(),
        ["line_no", "product", "quantity"]
    );

    let ResolvedMember::Reference {
        reference,
        target_key,
        ..
    } = view.members[1]
    else {
        panic!("product should resolve to a reference");
    };
    assert_eq!(reference.target, product);
    assert_eq!(target_key, model.key_shape(product));
    assert_eq!(view.root_path().unwrap().to_string(), "lines[]");
}

#[test]
fn full_path_is_relative_to_the_given_entry() {
    let model = model();
    let payment = id(model.schema(), "Payment");
    let tags = id(model.schema(), "Product/tags");

    let view = model.view(tags);
    assert_eq!(view.full_path(payment).unwrap().to_string(), "method.card.issuer->tags[]");
    assert!(view.full_path(id(model.schema(), "Invoice/shipping")).is_err());
}

#[test]
fn decode_key_uses_the_aggregate_shape() {
    let model = model();
    let lines = id(model.schema(), "Invoice/lines");

    let key = model
        .decode_key(lines, r#"[{"text":"INV-1"},{"int":2},{"text":"SKU-9"}]"#)
        .unwrap();
    assert_eq!(key.values()[1], KeyValue::Int(2));
    assert_eq!(
        model.encode_key(&key),
        r#"[{"text":"INV-1"},{"int":2},{"text":"SKU-9"}]"#
    );
    assert!(model.decode_key(id(model.schema(), "Invoice"), &model.encode_key(&key)).is_err());
}

#[test]
fn referrers_list_inverse_references() {
    let model = model();
    let product = id(model.schema(), "Product");

    assert_eq!(
        model.referrers(product),
        [
            member(model.schema(), "Invoice/lines", "product"),
            member(model.schema(), "Payment/method/card", "issuer"),
        ]
    );
}

#[test]
fn display_slots_are_precomputed() {
    let model = model();
    let invoice = id(model.schema(), "Invoice");

    // Invoice declares no display member, so its key stands in
    assert_eq!(model.display_slots(invoice).len(), 1);
    assert_eq!(model.display_slots(invoice)[0].name, "id");
}

#[derive(Default)]
struct Recorder {
    events: Vec<String>,
}

impl Visitor for Recorder {
    fn enter(&mut self, view: &AggregateView<'_>) {
        self.events.push(format!("+{}", view.aggregate.physical_name));
    }

    fn exit(&mut self, view: &AggregateView<'_>) {
        self.events.push(format!("-{}", view.aggregate.physical_name));
    }
}

#[test]
fn visitor_nests_owned_aggregates_inside_their_root() {
    let model = model();
    let mut recorder = Recorder::default();

    model.accept(&mut recorder);

    assert_eq!(
        recorder.events[..8],
        ["+Invoice", "+lines", "-lines", "+shipping", "-shipping", "-Invoice", "+Product", "+tags"]
    );
    assert_eq!(recorder.events.len(), model.schema().len() * 2);
}

#[test]
fn construction_fails_with_every_key_error() {
    let schema = build(vec![
        NodeRecord::root(1, "A"),
        NodeRecord::reference(2, 1, "b", "B").key(),
        NodeRecord::root(3, "B"),
        NodeRecord::reference(4, 3, "a", "A").key(),
    ]);

    let err = Model::new(schema, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(
        err.key_errors(),
        [KeyError::CyclicKeyDependency { .. }]
    ));
    assert!(err.to_string().contains("A -> B -> A"));
}
