//! Filter evaluation E2E tests

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;

use triplex_dsl::{CompareOp, ParseValueError, RawFilterNode, TypedValue, ValueType};
use triplex_filter::*;

/// Map-backed resolver that records every lookup.
#[derive(Default)]
struct RecordingResolver {
    props: HashMap<(String, String), Vec<u8>>,
    calls: RefCell<Vec<(String, String)>>,
}

impl RecordingResolver {
    fn with(mut self, entity: &str, property: &str, value: &str) -> Self {
        self.props
            .insert((entity.to_string(), property.to_string()), value.as_bytes().to_vec());
        self
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }

    fn was_asked(&self, entity: &str, property: &str) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|(e, p)| e == entity && p == property)
    }
}

impl PropertyResolver for RecordingResolver {
    fn get_property(&self, entity_id: &str, property: &str) -> Option<Cow<'_, [u8]>> {
        self.calls
            .borrow_mut()
            .push((entity_id.to_string(), property.to_string()));
        self.props
            .get(&(entity_id.to_string(), property.to_string()))
            .map(|v| Cow::Borrowed(v.as_slice()))
    }
}

fn knows() -> Triplet {
    Triplet::new("person:1", "knows", "person:2")
}

fn aliases() -> AliasBinding {
    AliasBinding::new("a", "r", "b")
}

fn eval_one(filter: RawFilterNode, stored: &str) -> Result<bool, EvalError> {
    let tree = build(&filter).unwrap();
    let resolver = RecordingResolver::default().with("person:1", "p", stored);
    tree.evaluate(&knows(), &aliases(), &resolver)
}

// ============================================================================
// Operators per discriminant
// ============================================================================

#[test]
fn test_int32_operators() {
    let p = |op, v: i32| RawFilterNode::predicate("a", "p", op, v);
    assert_eq!(eval_one(p(CompareOp::Gt, 30), "35"), Ok(true));
    assert_eq!(eval_one(p(CompareOp::Gt, 35), "35"), Ok(false));
    assert_eq!(eval_one(p(CompareOp::Ge, 35), "35"), Ok(true));
    assert_eq!(eval_one(p(CompareOp::Lt, 35), "35"), Ok(false));
    assert_eq!(eval_one(p(CompareOp::Le, 35), "35"), Ok(true));
    assert_eq!(eval_one(p(CompareOp::Eq, 35), "35"), Ok(true));
    assert_eq!(eval_one(p(CompareOp::Eq, -35), "35"), Ok(false));
}

#[test]
fn test_string_operators_are_bytewise() {
    let p = |op, v: &str| RawFilterNode::predicate("a", "p", op, v);
    assert_eq!(eval_one(p(CompareOp::Lt, "abd"), "abc"), Ok(true));
    assert_eq!(eval_one(p(CompareOp::Gt, "abd"), "abc"), Ok(false));
    assert_eq!(eval_one(p(CompareOp::Eq, "abc"), "abc"), Ok(true));
    // Uppercase sorts before lowercase in byte order.
    assert_eq!(eval_one(p(CompareOp::Lt, "a"), "Z"), Ok(true));
    assert_eq!(eval_one(p(CompareOp::Lt, "abc"), "ab"), Ok(true));
}

#[test]
fn test_int64_and_uint_operators() {
    let big = RawFilterNode::predicate("a", "p", CompareOp::Gt, 4_000_000_000i64);
    assert_eq!(eval_one(big, "9000000000"), Ok(true));

    let uint = RawFilterNode::predicate("a", "p", CompareOp::Ge, 4_000_000_000u32);
    assert_eq!(eval_one(uint.clone(), "4294967295"), Ok(true));
    assert_eq!(eval_one(uint, "7"), Ok(false));
}

#[test]
fn test_bool_compares_as_integers() {
    let gt_false = RawFilterNode::predicate("a", "p", CompareOp::Gt, false);
    assert_eq!(eval_one(gt_false.clone(), "true"), Ok(true));
    assert_eq!(eval_one(gt_false, "false"), Ok(false));

    let eq_true = RawFilterNode::predicate("a", "p", CompareOp::Eq, true);
    assert_eq!(eval_one(eq_true, "1"), Ok(true));
}

#[test]
fn test_float_and_double_operators() {
    let f = RawFilterNode::predicate("a", "p", CompareOp::Lt, 1.5f32);
    assert_eq!(eval_one(f, "1.25"), Ok(true));

    let d = RawFilterNode::predicate("a", "p", CompareOp::Ge, 0.1f64);
    assert_eq!(eval_one(d.clone(), "0.1"), Ok(true));
    assert_eq!(eval_one(d, "-0.5"), Ok(false));
}

#[test]
fn test_nan_never_matches() {
    for op in [CompareOp::Eq, CompareOp::Gt, CompareOp::Ge, CompareOp::Lt, CompareOp::Le] {
        let filter = RawFilterNode::predicate("a", "p", op, 1.0f64);
        assert_eq!(eval_one(filter, "NaN"), Ok(false), "{op}");

        let nan_literal = RawFilterNode::predicate("a", "p", op, f64::NAN);
        assert_eq!(eval_one(nan_literal, "1.0"), Ok(false), "{op}");
    }
}

// ============================================================================
// Missing vs malformed
// ============================================================================

#[test]
fn test_missing_property_is_false() {
    let tree = build(&RawFilterNode::predicate("a", "age", CompareOp::Gt, 30)).unwrap();
    let resolver = RecordingResolver::default();
    assert_eq!(tree.evaluate(&knows(), &aliases(), &resolver), Ok(false));
    assert_eq!(
        resolver.calls(),
        vec![("person:1".to_string(), "age".to_string())]
    );
}

#[test]
fn test_malformed_property_is_error() {
    let tree = build(&RawFilterNode::predicate("a", "age", CompareOp::Gt, 30)).unwrap();
    let resolver = RecordingResolver::default().with("person:1", "age", "thirty-five");
    let err = tree.evaluate(&knows(), &aliases(), &resolver).unwrap_err();
    assert_eq!(
        err,
        EvalError::InvalidPropertyValue {
            entity: "person:1".to_string(),
            property: "age".to_string(),
            source: ParseValueError::Invalid {
                expected: ValueType::Int32,
                text: "thirty-five".to_string(),
            },
        }
    );
    assert!(err.to_string().contains("not a valid int32"));
}

#[test]
fn test_non_utf8_property_is_error() {
    let tree = build(&RawFilterNode::predicate("b", "name", CompareOp::Eq, "Bob")).unwrap();
    let store = HashPropertyStore::new();
    store.hset("person:2", "name", vec![0x42, 0xff, 0xfe]);
    assert_eq!(
        tree.evaluate(&knows(), &aliases(), &store),
        Err(EvalError::InvalidPropertyValue {
            entity: "person:2".to_string(),
            property: "name".to_string(),
            source: ParseValueError::InvalidUtf8 {
                expected: ValueType::String,
            },
        })
    );
}

#[test]
fn test_unbound_and_predicate_aliases_are_false_without_lookup() {
    let resolver = RecordingResolver::default().with("knows", "since", "2001");

    let on_edge = build(&RawFilterNode::predicate("r", "since", CompareOp::Gt, 2000)).unwrap();
    assert_eq!(on_edge.evaluate(&knows(), &aliases(), &resolver), Ok(false));

    let unbound = build(&RawFilterNode::predicate("zzz", "since", CompareOp::Gt, 2000)).unwrap();
    assert_eq!(unbound.evaluate(&knows(), &aliases(), &resolver), Ok(false));

    assert!(resolver.calls().is_empty());
}

#[test]
fn test_ne_is_unknown_operator() {
    let filter = RawFilterNode::predicate("a", "p", CompareOp::Ne, 1);
    assert_eq!(eval_one(filter.clone(), "2"), Err(EvalError::UnknownOperator(CompareOp::Ne)));

    // Missing properties are decided before the operator is consulted.
    let tree = build(&filter).unwrap();
    assert_eq!(
        tree.evaluate(&knows(), &aliases(), &RecordingResolver::default()),
        Ok(false)
    );
}

// ============================================================================
// Short circuit
// ============================================================================

#[test]
fn test_and_short_circuits_on_false_left() {
    let filter = RawFilterNode::and(
        RawFilterNode::predicate("a", "age", CompareOp::Gt, 30),
        RawFilterNode::predicate("b", "age", CompareOp::Lt, 25),
    );
    let tree = build(&filter).unwrap();
    let resolver = RecordingResolver::default()
        .with("person:1", "age", "25")
        .with("person:2", "age", "20");

    assert_eq!(tree.evaluate(&knows(), &aliases(), &resolver), Ok(false));
    assert!(resolver.was_asked("person:1", "age"));
    assert!(!resolver.was_asked("person:2", "age"));
    assert_eq!(resolver.calls().len(), 1);
}

#[test]
fn test_or_short_circuits_on_true_left() {
    let filter = RawFilterNode::or(
        RawFilterNode::predicate("a", "age", CompareOp::Gt, 30),
        RawFilterNode::predicate("b", "age", CompareOp::Lt, 25),
    );
    let tree = build(&filter).unwrap();
    let resolver = RecordingResolver::default()
        .with("person:1", "age", "35")
        .with("person:2", "age", "99");

    assert_eq!(tree.evaluate(&knows(), &aliases(), &resolver), Ok(true));
    assert_eq!(resolver.calls().len(), 1);
    assert!(!resolver.was_asked("person:2", "age"));
}

#[test]
fn test_or_evaluates_right_when_left_false() {
    let filter = RawFilterNode::or(
        RawFilterNode::predicate("a", "age", CompareOp::Gt, 30),
        RawFilterNode::predicate("b", "age", CompareOp::Lt, 25),
    );
    let tree = build(&filter).unwrap();
    let resolver = RecordingResolver::default()
        .with("person:1", "age", "20")
        .with("person:2", "age", "20");

    assert_eq!(tree.evaluate(&knows(), &aliases(), &resolver), Ok(true));
    assert_eq!(resolver.calls().len(), 2);
}

#[test]
fn test_short_circuit_does_not_hide_left_errors() {
    let filter = RawFilterNode::or(
        RawFilterNode::predicate("a", "age", CompareOp::Gt, 30),
        RawFilterNode::predicate("b", "age", CompareOp::Lt, 25),
    );
    let tree = build(&filter).unwrap();
    let resolver = RecordingResolver::default()
        .with("person:1", "age", "old")
        .with("person:2", "age", "20");

    assert!(matches!(
        tree.evaluate(&knows(), &aliases(), &resolver),
        Err(EvalError::InvalidPropertyValue { .. })
    ));
    assert!(!resolver.was_asked("person:2", "age"));
}

#[test]
fn test_skipped_subtree_errors_are_not_reported() {
    // The malformed right side is never evaluated.
    let filter = RawFilterNode::and(
        RawFilterNode::predicate("a", "age", CompareOp::Gt, 30),
        RawFilterNode::predicate("b", "age", CompareOp::Lt, 25),
    );
    let tree = build(&filter).unwrap();
    let resolver = RecordingResolver::default()
        .with("person:1", "age", "10")
        .with("person:2", "age", "not-a-number");
    assert_eq!(tree.evaluate(&knows(), &aliases(), &resolver), Ok(false));
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn test_knows_scenario() {
    let filter = RawFilterNode::and(
        RawFilterNode::predicate("a", "age", CompareOp::Gt, 30),
        RawFilterNode::predicate("b", "age", CompareOp::Lt, 25),
    );
    let tree = build(&filter).unwrap();

    let store = HashPropertyStore::new();
    store.hset("person:1", "age", "35");
    store.hset("person:2", "age", "20");
    assert_eq!(tree.evaluate(&knows(), &aliases(), &store), Ok(true));

    let resolver = RecordingResolver::default()
        .with("person:1", "age", "25")
        .with("person:2", "age", "20");
    assert_eq!(evaluate(&tree, &knows(), &aliases(), &resolver), Ok(false));
    assert!(!resolver.was_asked("person:2", "age"));
}

#[test]
fn test_tree_is_reusable_after_error() {
    let tree = build(&RawFilterNode::predicate("a", "age", CompareOp::Ge, 18)).unwrap();
    let store = HashPropertyStore::new();
    store.hset("person:1", "age", "??");
    store.hset("person:3", "age", "40");

    assert!(tree.evaluate(&knows(), &aliases(), &store).is_err());
    let next = Triplet::new("person:3", "knows", "person:2");
    assert_eq!(tree.evaluate(&next, &aliases(), &store), Ok(true));
}

#[test]
fn test_concurrent_evaluation_shares_tree() {
    let filter = RawFilterNode::predicate("a", "score", CompareOp::Ge, TypedValue::Int64(50));
    let tree = build(&filter).unwrap();
    let store = HashPropertyStore::new();
    for i in 0..100 {
        store.hset(format!("n:{i}"), "score", i.to_string());
    }

    let matched: usize = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let tree = &tree;
                let store = &store;
                s.spawn(move || {
                    (0..100)
                        .filter(|i| i % 4 == worker)
                        .filter(|i| {
                            let t = Triplet::new(format!("n:{i}"), "r", "x");
                            tree.evaluate(&t, &aliases(), store).unwrap()
                        })
                        .count()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });
    assert_eq!(matched, 50);
}
