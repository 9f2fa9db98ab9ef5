//! A tiny in-process property engine the macro expansions are run against.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::time::{Duration, Instant};

const MAX_TRIES: u64 = 100;

thread_local! {
    static LOG: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    static RESULT: Cell<Option<Outcome>> = const { Cell::new(None) };
}

fn log(entry: String) {
    LOG.with(|log| log.borrow_mut().push(entry));
}

/// Everything collected or discarded since the last call.
pub fn take_log() -> Vec<String> {
    LOG.with(|log| log.take())
}

fn mix(seed: u64) -> u64 {
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
        >> 11
}

pub struct Gen<T> {
    sample: Rc<dyn Fn(u64) -> T>,
    shrinks: Option<Rc<dyn Fn() -> Vec<Gen<T>>>>,
}

impl<T> Clone for Gen<T> {
    fn clone(&self) -> Self {
        Gen {
            sample: self.sample.clone(),
            shrinks: self.shrinks.clone(),
        }
    }
}

impl<T> Gen<T> {
    pub fn sample(&self, seed: u64) -> T {
        (self.sample)(seed)
    }

    pub fn alternatives(&self) -> Vec<Gen<T>> {
        self.shrinks.as_ref().map(|shrinks| shrinks()).unwrap_or_default()
    }
}

pub fn from_fn<T>(sample: impl Fn(u64) -> T + 'static) -> Gen<T> {
    Gen {
        sample: Rc::new(sample),
        shrinks: None,
    }
}

/// Integers in `-10..=10`; consecutive seeds walk through every value.
pub fn int() -> Gen<i64> {
    from_fn(|seed| (seed % 21) as i64 - 10)
}

/// Integers in `lo..hi`.
pub fn range(lo: i64, hi: i64) -> Gen<i64> {
    from_fn(move |seed| lo + (seed % (hi - lo) as u64) as i64)
}

pub fn just<T: Clone + 'static>(value: T) -> Gen<T> {
    from_fn(move |_| value.clone())
}

/// Anything that can stand where a generator is expected.
pub trait Resolve: 'static {
    type Output: 'static;
    fn resolve(&self, seed: u64) -> Self::Output;
}

impl<T: 'static> Resolve for Gen<T> {
    type Output = T;
    fn resolve(&self, seed: u64) -> T {
        self.sample(seed)
    }
}

macro_rules! plain_values {
    ($($ty:ty),*) => {
        $(impl Resolve for $ty {
            type Output = $ty;
            fn resolve(&self, _: u64) -> $ty {
                self.clone()
            }
        })*
    };
}

plain_values!(i32, i64, u64, usize, bool, String, &'static str);

impl<A: Resolve, B: Resolve> Resolve for (A, B) {
    type Output = (A::Output, B::Output);
    fn resolve(&self, seed: u64) -> Self::Output {
        (self.0.resolve(seed), self.1.resolve(mix(seed)))
    }
}

impl<F, R> Resolve for Lazy<F>
where
    F: Fn() -> R + 'static,
    R: Resolve,
{
    type Output = R::Output;
    fn resolve(&self, seed: u64) -> R::Output {
        self.force().resolve(seed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail,
    Discard,
}

pub struct Prop {
    test: Rc<dyn Fn(u64) -> Outcome>,
    once: bool,
}

impl Prop {
    fn new(test: impl Fn(u64) -> Outcome + 'static) -> Self {
        Prop {
            test: Rc::new(test),
            once: false,
        }
    }

    pub fn run(&self, seed: u64) -> Outcome {
        (self.test)(seed)
    }
}

pub trait IntoProp {
    fn into_prop(self) -> Prop;
}

impl IntoProp for Prop {
    fn into_prop(self) -> Prop {
        self
    }
}

impl IntoProp for bool {
    fn into_prop(self) -> Prop {
        let outcome = if self { Outcome::Pass } else { Outcome::Fail };
        Prop::new(move |_| outcome)
    }
}

impl<F, P> IntoProp for Lazy<F>
where
    F: Fn() -> P + 'static,
    P: IntoProp,
{
    fn into_prop(self) -> Prop {
        Prop::new(move |seed| self.force().into_prop().run(seed))
    }
}

pub fn run_all(prop: impl IntoProp, runs: u64) -> Vec<Outcome> {
    let prop = prop.into_prop();
    let runs = if prop.once { 1 } else { runs };
    (0..runs).map(|seed| prop.run(seed)).collect()
}

pub fn run_once(prop: impl IntoProp) -> Outcome {
    prop.into_prop().run(0)
}

/// No failure over a hundred seeds.
pub fn check(prop: impl IntoProp) -> bool {
    !run_all(prop, 100).contains(&Outcome::Fail)
}

/// Runs a `setup` pair: setup, property, then the teardown it returned.
pub fn run_with_setup<S, T, P>(fixture: (S, P)) -> Outcome
where
    S: Fn() -> T,
    T: FnOnce(),
    P: IntoProp,
{
    let (setup, property) = fixture;
    let teardown = setup();
    let outcome = run_once(property);
    teardown();
    outcome
}

pub fn forall<G, F, P>(generator: G, body: F) -> Prop
where
    G: Resolve,
    F: Fn(G::Output) -> P + 'static,
    P: IntoProp,
{
    Prop::new(move |seed| body(generator.resolve(seed)).into_prop().run(mix(seed)))
}

pub fn bind<G, F, R>(generator: G, body: F) -> Gen<R::Output>
where
    G: Resolve,
    F: Fn(G::Output) -> R + 'static,
    R: Resolve,
{
    from_fn(move |seed| body(generator.resolve(seed)).resolve(mix(seed)))
}

pub fn suchthat<G, F>(generator: G, predicate: F, location: (&'static str, u32, u32)) -> Gen<G::Output>
where
    G: Resolve,
    G::Output: Clone,
    F: Fn(G::Output) -> bool + 'static,
{
    from_fn(move |seed| {
        for attempt in 0..MAX_TRIES {
            let value = generator.resolve(seed.wrapping_add(attempt));
            if predicate(value.clone()) {
                return value;
            }
        }
        panic!(
            "{}:{}:{}: no value satisfied the predicate",
            location.0, location.1, location.2
        )
    })
}

pub fn suchthatmaybe<G, F>(generator: G, predicate: F) -> Gen<Option<G::Output>>
where
    G: Resolve,
    G::Output: Clone,
    F: Fn(G::Output) -> bool + 'static,
{
    from_fn(move |seed| {
        (0..MAX_TRIES)
            .map(|attempt| generator.resolve(seed.wrapping_add(attempt)))
            .find(|value| predicate(value.clone()))
    })
}

pub fn sized<F, R>(body: F) -> Gen<R::Output>
where
    F: Fn(usize) -> R + 'static,
    R: Resolve,
{
    from_fn(move |seed| body((seed % 10) as usize).resolve(seed))
}

pub fn shrinkwith<T, F>(generator: Gen<T>, alternatives: F) -> Gen<T>
where
    T: 'static,
    F: Fn() -> Vec<Gen<T>> + 'static,
{
    Gen {
        sample: generator.sample,
        shrinks: Some(Rc::new(alternatives)),
    }
}

pub fn letshrink<T, F, R, const N: usize>(generators: [Gen<T>; N], body: F) -> Gen<R::Output>
where
    T: 'static,
    F: Fn([T; N]) -> R + 'static,
    R: Resolve,
{
    from_fn(move |seed| {
        let values = std::array::from_fn(|i| generators[i].sample(mix(seed.wrapping_add(i as u64))));
        body(values).resolve(seed)
    })
}

pub struct Lazy<F> {
    thunk: F,
}

impl<F: Fn() -> R, R> Lazy<F> {
    pub fn force(&self) -> R {
        (self.thunk)()
    }
}

pub fn lazy<F>(thunk: F) -> Lazy<F> {
    Lazy { thunk }
}

/// The outcome that triggered the running `whenfail` action.
pub fn result_record() -> Option<Outcome> {
    RESULT.with(Cell::get)
}

pub fn whenfail<A, F, P>(action: A, body: F) -> Prop
where
    A: Fn() + 'static,
    F: Fn() -> P + 'static,
    P: IntoProp,
{
    Prop::new(move |seed| {
        let outcome = body().into_prop().run(seed);
        if outcome == Outcome::Fail {
            RESULT.with(|result| result.set(Some(outcome)));
            action();
            RESULT.with(|result| result.set(None));
        }
        outcome
    })
}

pub fn implies<F, P>(condition: bool, label: &'static str, body: F) -> Prop
where
    F: Fn() -> P + 'static,
    P: IntoProp,
{
    Prop::new(move |seed| {
        if condition {
            body().into_prop().run(seed)
        } else {
            log(format!("discarded: {label}"));
            Outcome::Discard
        }
    })
}

pub fn trapexit<F, P>(body: F) -> Prop
where
    F: Fn() -> P + 'static,
    P: IntoProp,
{
    Prop::new(move |seed| {
        catch_unwind(AssertUnwindSafe(|| body().into_prop().run(seed))).unwrap_or(Outcome::Fail)
    })
}

pub fn timeout_property<F, P>(limit_ms: u64, body: F) -> Prop
where
    F: Fn() -> P + 'static,
    P: IntoProp,
{
    Prop::new(move |seed| {
        let started = Instant::now();
        let outcome = body().into_prop().run(seed);
        if started.elapsed() > Duration::from_millis(limit_ms) {
            Outcome::Fail
        } else {
            outcome
        }
    })
}

pub fn always<F, P>(times: usize, body: F) -> Prop
where
    F: Fn() -> P + 'static,
    P: IntoProp,
{
    Prop::new(move |seed| {
        let passed = (0..times as u64).all(|i| body().into_prop().run(seed + i) == Outcome::Pass);
        if passed { Outcome::Pass } else { Outcome::Fail }
    })
}

pub fn sometimes<F, P>(times: usize, body: F) -> Prop
where
    F: Fn() -> P + 'static,
    P: IntoProp,
{
    Prop::new(move |seed| {
        let passed = (0..times as u64).any(|i| body().into_prop().run(seed + i) == Outcome::Pass);
        if passed { Outcome::Pass } else { Outcome::Fail }
    })
}

pub fn onceonly<F, P>(body: F) -> Prop
where
    F: Fn() -> P + 'static,
    P: IntoProp,
{
    let mut prop = Prop::new(move |seed| body().into_prop().run(seed));
    prop.once = true;
    prop
}

/// Names a collected term, or checks the observed distribution.
pub trait Labeler<K> {
    fn title(&self) -> String;

    fn check(&self, observed: &[(K, usize)]) {
        let _ = observed;
    }
}

impl<K> Labeler<K> for &'static str {
    fn title(&self) -> String {
        self.to_string()
    }
}

impl<K, F: Fn(&[(K, usize)])> Labeler<K> for F {
    fn title(&self) -> String {
        "coverage".to_string()
    }

    fn check(&self, observed: &[(K, usize)]) {
        self(observed)
    }
}

pub fn collect<L, K, P>(labeler: L, term: K, body: P) -> Prop
where
    L: Labeler<K> + 'static,
    K: Debug + Clone + 'static,
    P: IntoProp,
{
    let body = body.into_prop();
    Prop::new(move |seed| {
        log(format!("{}={:?}", labeler.title(), term));
        labeler.check(&[(term.clone(), 1)]);
        body.run(seed)
    })
}

pub fn features<F, P>(features: Vec<F>, body: P) -> Prop
where
    F: Debug + 'static,
    P: IntoProp,
{
    let body = body.into_prop();
    Prop::new(move |seed| {
        for feature in &features {
            log(format!("feature {feature:?}"));
        }
        body.run(seed)
    })
}
