//! Expansions run against the mock engine in `support`, reached as `::propcheck`.
extern crate self as propcheck;

mod support;
pub use support::*;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use propform_macros::{
    always, collect, ensure, feature, forall, implies, lazy, let_gen, let_shrink, once_only,
    prop, result_record, setup, shrink, sized, sometimes, such_that, such_that_maybe, timeout,
    trap_exit, when_fail,
};

fn explode(really: bool) -> bool {
    if really {
        panic!("boom");
    }
    true
}

#[test]
fn forall_checks_every_sample() {
    assert!(check(forall!(x <- int(), do: x + 0 == x)));
    assert!(!check(forall!(x <- int(), do: x > 0)));
}

#[test]
fn let_clauses_see_earlier_bindings() {
    let pairs = let_gen!([x <- range(0, 5), y <- range(x, x + 5)], do: (x, y));
    for seed in 0..50 {
        let (x, y) = pairs.sample(seed);
        assert!((0..5).contains(&x));
        assert!(x <= y && y < x + 5, "{x} {y}");
    }
}

#[test]
fn lazy_body_is_deferred() {
    let calls = Rc::new(Cell::new(0));
    let counted = calls.clone();
    let deferred = lazy!(do: {
        counted.set(counted.get() + 1);
        just(3)
    });
    assert_eq!(calls.get(), 0);
    assert_eq!(deferred.force().sample(0), 3);
    assert_eq!(calls.get(), 1);
}

#[test]
fn ensure_evaluates_operands_once() {
    let evaluations = Rc::new(Cell::new(0));
    let next = {
        let evaluations = evaluations.clone();
        move || {
            evaluations.set(evaluations.get() + 1);
            evaluations.get()
        }
    };
    let property = ensure!(next() == 1);
    assert_eq!(evaluations.get(), 1);
    assert_eq!(run_all(property, 5), vec![Outcome::Pass; 5]);
    assert_eq!(evaluations.get(), 1);
}

#[test]
fn ensure_operators() {
    assert_eq!(run_once(ensure!(1 + 1 == 3)), Outcome::Fail);
    assert_eq!(run_once(ensure!(2 <= 3)), Outcome::Pass);
    assert_eq!(run_once(ensure!(2 === 2)), Outcome::Pass);
    assert_eq!(run_once(ensure!(2 !== 2)), Outcome::Fail);
    assert_eq!(run_once(ensure!("property" =~ "pert")), Outcome::Pass);
    assert_eq!(run_once(ensure!(4 in [1, 2, 3])), Outcome::Fail);
    assert_eq!(run_once(prop!(3 in vec![1, 2, 3])), Outcome::Pass);
}

#[test]
fn when_fail_sees_the_result_record() {
    let seen = Rc::new(RefCell::new(None));
    let sink = seen.clone();
    let property = when_fail!(*sink.borrow_mut() = result_record!(), do: 1 + 1 == 3);
    assert_eq!(run_once(property), Outcome::Fail);
    assert_eq!(*seen.borrow(), Some(Outcome::Fail));
}

#[test]
fn when_fail_action_skipped_on_success() {
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    assert!(check(when_fail!(flag.set(true), do: true)));
    assert!(!fired.get());
}

#[test]
fn setup_runs_teardown() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let fixture_log = log.clone();
    let outcome = run_with_setup(setup!(
        entry = fixture_log.clone(),
        do: true,
        after: entry.borrow_mut().push("teardown")
    ));
    assert_eq!(outcome, Outcome::Pass);
    assert_eq!(*log.borrow(), ["teardown"]);
}

#[test]
fn setup_without_after_has_no_op_teardown() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let fixture_log = log.clone();
    let outcome = run_with_setup(setup!(
        entry = {
            fixture_log.borrow_mut().push("setup");
            1
        },
        do: true
    ));
    assert_eq!(outcome, Outcome::Pass);
    assert_eq!(*log.borrow(), ["setup"]);
}

#[test]
fn setup_without_binding() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let fixture_log = log.clone();
    let outcome = run_with_setup(setup!(fixture_log.borrow_mut().push("reset"), do: false));
    assert_eq!(outcome, Outcome::Fail);
    assert_eq!(*log.borrow(), ["reset"]);
}

#[test]
fn collect_runs_outermost_first() {
    take_log();
    assert!(check(forall!(x <- range(0, 3), do: collect!(small: x < 2, value: x, do: x >= 0))));
    let log = take_log();
    assert_eq!(log.len(), 200);
    for pair in log.chunks(2) {
        assert!(pair[0].starts_with("small="), "{pair:?}");
        assert!(pair[1].starts_with("value="), "{pair:?}");
    }
}

#[test]
fn feature_labels_and_records_the_term() {
    take_log();
    assert!(check(forall!(x <- range(0, 4), do: feature!(x % 2, do: x >= 0))));
    let log = take_log();
    assert!(log.iter().any(|entry| entry == "x % 2=0"), "{log:?}");
    assert!(log.iter().any(|entry| entry == "feature 1"), "{log:?}");
}

#[test]
fn such_that_filters_values() {
    let positive = such_that!(x <- int(), when: x > 0);
    assert!((0..50).all(|seed| positive.sample(seed) > 0));

    let impossible = such_that_maybe!(x <- int(), when: x > 100);
    assert_eq!(impossible.sample(7), None);
}

#[test]
fn sized_binds_the_size() {
    let sizes = sized!(n, do: just(n));
    assert_eq!(sizes.sample(13), 3);
}

#[test]
fn shrink_alternatives_are_deferred() {
    let asked = Rc::new(Cell::new(0));
    let counted = asked.clone();
    let generator = shrink!(int(), to: [
        {
            counted.set(counted.get() + 1);
            just(0)
        },
        just(1),
    ]);
    assert_eq!(asked.get(), 0);
    let alternatives = generator.alternatives();
    assert_eq!(alternatives.len(), 2);
    assert_eq!(asked.get(), 1);
    assert_eq!(alternatives[1].sample(7), 1);
}

#[test]
fn let_shrink_binds_each_list_element() {
    let pairs = let_shrink!([a, b] <- [range(0, 5), range(10, 15)], do: (a, b));
    for seed in 0..20 {
        let (a, b) = pairs.sample(seed);
        assert!((0..5).contains(&a));
        assert!((10..15).contains(&b));
    }
}

#[test]
fn implies_discards_cases() {
    take_log();
    let outcomes = run_all(forall!(x <- int(), do: implies!(x > 0, do: x.abs() == x)), 42);
    assert!(outcomes.contains(&Outcome::Discard));
    assert!(outcomes.contains(&Outcome::Pass));
    assert!(!outcomes.contains(&Outcome::Fail));
    assert!(take_log().iter().all(|entry| entry == "discarded: x > 0"));
}

#[test]
fn modifiers() {
    assert_eq!(run_once(always!(3, do: true)), Outcome::Pass);
    assert_eq!(run_once(trap_exit!(do: explode(true))), Outcome::Fail);
    assert_eq!(run_once(trap_exit!(do: explode(false))), Outcome::Pass);
    assert_eq!(run_once(timeout!(1_000, do: true)), Outcome::Pass);

    let tries = Rc::new(Cell::new(0));
    let counter = tries.clone();
    let flaky = sometimes!(5, do: {
        counter.set(counter.get() + 1);
        counter.get() >= 3
    });
    assert_eq!(run_once(flaky), Outcome::Pass);
    assert_eq!(tries.get(), 3);
}

#[test]
fn once_only_runs_a_single_case() {
    let runs = Rc::new(Cell::new(0));
    let counter = runs.clone();
    assert!(check(once_only!(do: {
        counter.set(counter.get() + 1);
        true
    })));
    assert_eq!(runs.get(), 1);
}

#[test]
fn prop_dispatches_by_shape() {
    assert!(check(prop!(x <- int(), do: x == x)));
    assert!(check(prop!(forall x <- int(), do: x * 2 == x + x)));
    let sums = prop!([x <- int(), y <- int()], do: x + y);
    assert!((0..30).all(|seed| (-20..=20).contains(&sums.sample(seed))));
    assert_eq!(run_once(prop!("abc" =~ "b")), Outcome::Pass);
}
