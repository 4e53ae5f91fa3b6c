//! Unit tests for the trampoline driver

use core_types::{numbers, Value, VmResult};
use std::sync::Arc;
use trampoline::{depth, stack_cons, Continuation, FnContinuation, Stack, Trampoline};

/// Takes n, yields n - 1, and schedules itself again while the result is
/// still positive. Starting from N it finishes after exactly N calls.
#[derive(Debug)]
struct Countdown;

impl Continuation for Countdown {
    fn call_continuation(&self, value: Value, stack: Stack) -> VmResult<(Value, Stack)> {
        let next = value.int_val()? - 1;
        if next > 0 {
            Ok((Value::Int(next), stack_cons(stack, Arc::new(Countdown))))
        } else {
            Ok((Value::Int(next), stack))
        }
    }
}

/// Takes n; for n > 0 schedules "add n" below a recursive call on n - 1
#[derive(Debug)]
struct Sum;

impl Continuation for Sum {
    fn call_continuation(&self, value: Value, stack: Stack) -> VmResult<(Value, Stack)> {
        let n = value.int_val()?;
        if n == 0 {
            return Ok((Value::Int(0), stack));
        }
        let add: Arc<dyn Continuation> = Arc::new(FnContinuation::new("add", move |acc, rest| {
            Ok((numbers::add(&acc, &Value::Int(n))?, rest))
        }));
        Ok((Value::Int(n - 1), stack_cons(stack_cons(stack, add), Arc::new(Sum))))
    }
}

#[cfg(test)]
mod trampoline_tests {
    use super::*;

    #[test]
    fn test_countdown_takes_exactly_n_steps() {
        for n in [1_i64, 2, 10, 1_000] {
            let mut t = Trampoline::new();
            let result = t.run(Value::Int(n), Arc::new(Countdown)).unwrap();
            assert_eq!(result, Value::Int(0));
            assert_eq!(t.steps(), n as u64);
        }
    }

    #[test]
    fn test_deep_sum_does_not_grow_host_stack() {
        let mut t = Trampoline::new();
        let result = t.run(Value::Int(100_000), Arc::new(Sum)).unwrap();
        assert_eq!(result, Value::Int(5_000_050_000));
        // one Sum call per n from 100000 down to 0, one add per n above 0
        assert_eq!(t.steps(), 200_001);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let mut first = Trampoline::new();
        let mut second = Trampoline::new();
        let a = first.run(Value::Int(500), Arc::new(Sum)).unwrap();
        let b = second.run(Value::Int(500), Arc::new(Sum)).unwrap();
        assert_eq!(a, b);
        assert_eq!(first, second);
    }

    #[test]
    fn test_shared_tail_runs_independently() {
        let double: Arc<dyn Continuation> = Arc::new(FnContinuation::new("double", |v, s| {
            Ok((numbers::add(&v, &v)?, s))
        }));
        let inc: Arc<dyn Continuation> = Arc::new(FnContinuation::new("inc", |v, s| {
            Ok((numbers::add(&v, &Value::Int(1))?, s))
        }));

        let tail = stack_cons(None, double);
        let left = stack_cons(tail.clone(), inc.clone());
        let right = stack_cons(stack_cons(tail.clone(), inc.clone()), inc);
        assert_eq!(depth(&left), 2);
        assert_eq!(depth(&right), 3);

        let mut t = Trampoline::new();
        assert_eq!(t.run_with_stack(Value::Int(1), left).unwrap(), Value::Int(4));
        assert_eq!(t.run_with_stack(Value::Int(1), right).unwrap(), Value::Int(6));
        assert_eq!(t.steps(), 5);
        assert_eq!(depth(&tail), 1);
    }

    #[test]
    fn test_type_mismatch_propagates() {
        let err = Trampoline::new()
            .run(Value::from("ten"), Arc::new(Countdown))
            .unwrap_err();
        assert_eq!(err.kind(), core_types::ErrorKind::TypeMismatch);
    }
}
