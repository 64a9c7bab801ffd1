//! Accumulator state algebra: order-independence, identity, associativity,
//! and the lifecycle contract.

use fracture_agg::function::AggregateFunction;
use fracture_agg::state::AccumulatorState;
use fracture_core::schema::DataType;
use fracture_core::types::Scalar;

fn max_over(f: &AggregateFunction, values: &[i64]) -> Box<dyn AccumulatorState> {
    let mut state = f.new_state();
    for v in values {
        state.input(&Scalar::I64(*v)).unwrap();
    }
    state
}

fn permutations(values: &[i64]) -> Vec<Vec<i64>> {
    if values.len() <= 1 {
        return vec![values.to_vec()];
    }
    let mut out = Vec::new();
    for (i, &head) in values.iter().enumerate() {
        let mut rest = values.to_vec();
        rest.remove(i);
        for mut tail in permutations(&rest) {
            let mut p = vec![head];
            p.append(&mut tail);
            out.push(p);
        }
    }
    out
}

#[test]
fn max_output_is_order_independent() {
    for f in [
        AggregateFunction::max(DataType::Int64).unwrap(),
        AggregateFunction::max_alternative(DataType::Int64).unwrap(),
    ] {
        for perm in permutations(&[3, 7, 2, 9]) {
            let mut state = max_over(&f, &perm);
            assert_eq!(state.output(), Scalar::I64(9), "permutation {perm:?}");
        }
    }
}

#[test]
fn null_state_is_combine_identity_on_both_sides() {
    let f = AggregateFunction::max_alternative(DataType::Int64).unwrap();

    let mut with_rows = max_over(&f, &[5]);
    let empty = f.new_state();
    with_rows.combine(empty.as_ref()).unwrap();
    assert_eq!(with_rows.output(), Scalar::I64(5));

    let mut empty = f.new_state();
    let with_rows = max_over(&f, &[5]);
    empty.combine(with_rows.as_ref()).unwrap();
    assert_eq!(empty.output(), Scalar::I64(5));
}

#[test]
fn combine_is_associative() {
    let f = AggregateFunction::max_alternative(DataType::Int64).unwrap();

    // (a ⊕ b) ⊕ c
    let mut left = max_over(&f, &[3]);
    let b = max_over(&f, &[9]);
    left.combine(b.as_ref()).unwrap();
    let c = max_over(&f, &[2]);
    left.combine(c.as_ref()).unwrap();

    // a ⊕ (b ⊕ c)
    let mut right = max_over(&f, &[3]);
    let mut bc = max_over(&f, &[9]);
    let c = max_over(&f, &[2]);
    bc.combine(c.as_ref()).unwrap();
    right.combine(bc.as_ref()).unwrap();

    assert_eq!(left.output(), right.output());
}

#[test]
fn output_with_no_rows_is_null() {
    for f in [
        AggregateFunction::max(DataType::Int64).unwrap(),
        AggregateFunction::max_alternative(DataType::Int64).unwrap(),
    ] {
        let mut state = f.new_state();
        assert_eq!(state.output(), Scalar::Null);
    }
}

#[test]
fn null_inputs_are_skipped_but_observed() {
    let f = AggregateFunction::max_alternative(DataType::Int64).unwrap();
    let mut state = f.new_state();
    state.input(&Scalar::Null).unwrap();
    state.input(&Scalar::I64(4)).unwrap();
    state.input(&Scalar::Null).unwrap();
    assert_eq!(state.output(), Scalar::I64(4));
}

#[test]
fn reset_allows_reuse_across_groups() {
    let f = AggregateFunction::max_alternative(DataType::Int64).unwrap();
    let mut state = f.new_state();
    state.input(&Scalar::I64(11)).unwrap();
    assert_eq!(state.output(), Scalar::I64(11));

    state.reset();
    state.input(&Scalar::I64(2)).unwrap();
    assert_eq!(state.output(), Scalar::I64(2));
}

#[test]
#[should_panic(expected = "after finalization")]
fn input_after_output_is_fatal() {
    let f = AggregateFunction::max_alternative(DataType::Int64).unwrap();
    let mut state = f.new_state();
    state.output();
    let _ = state.input(&Scalar::I64(1));
}

#[test]
fn combining_mismatched_representations_is_invariant_error() {
    let boxed = AggregateFunction::max(DataType::Int64).unwrap();
    let native = AggregateFunction::max_alternative(DataType::Int64).unwrap();
    let mut a = boxed.new_state();
    let b = native.new_state();
    let err = a.combine(b.as_ref()).unwrap_err();
    assert!(matches!(err, fracture_core::error::Error::Invariant(_)));
}
