//! Two-continuation computation engine
//!
//! A [`Computation`] describes an effect that, run against a
//! [`ComputeContext`], ends on the success channel with a value or on the
//! failure channel with an error value. Computations are plain data: `bind`
//! and `bind_error` only record continuations, and nothing executes until
//! [`Computation::run`] drives the tree.
//!
//! The driver is a trampoline. Continuations are kept on a heap-allocated
//! frame stack, and [`defer`] nodes are the "continue with function + args"
//! markers that let a step hand back the next computation instead of calling
//! into it. Native stack usage per step is therefore constant no matter how
//! deep the evaluated program nests expressions or recurses.
//!
//! ```
//! use std::rc::Rc;
//! use esrun::compute::{ComputeContext, fail, succeed};
//! use esrun::platform::FixedTimeProvider;
//!
//! let mut ctx: ComputeContext<(), i64> = ComputeContext::new((), Rc::new(FixedTimeProvider::new(0.0)));
//! let program = succeed::<(), i64, String>(20)
//!     .bind(|x: i64| if x > 10 { fail(format!("{x} is too big")) } else { succeed(x) })
//!     .bind_error(|_| succeed(10))
//!     .bind(|x| succeed(x * 2));
//! assert_eq!(program.run(&mut ctx), Ok(20));
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::platform::TimeProvider;

// ═══════════════════════════════════════════════════════════════════════════════
// Context
// ═══════════════════════════════════════════════════════════════════════════════

/// Key of a slot in the context's value store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey(u64);

/// State threaded through every step of a computation.
///
/// The context is mutated in place; scoped changes must be undone on every
/// exit path, which is what [`between`] is for.
pub struct ComputeContext<U, V> {
    values: FxHashMap<SlotKey, V>,
    next_slot: u64,
    pub user_data: U,
    now: f64,
    clock: Rc<dyn TimeProvider>,
}

impl<U, V> ComputeContext<U, V> {
    pub fn new(user_data: U, clock: Rc<dyn TimeProvider>) -> Self {
        let now = clock.now_millis();
        Self {
            values: FxHashMap::default(),
            next_slot: 0,
            user_data,
            now,
            clock,
        }
    }

    /// Keep the logical clock at or above `floor` (e.g. the end time of a
    /// previous run on the same realm).
    pub fn with_clock_floor(mut self, floor: f64) -> Self {
        if floor > self.now {
            self.now = floor;
        }
        self
    }

    /// Current logical time in milliseconds
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Resample the host clock; the logical clock never moves backwards.
    pub fn advance_clock(&mut self) {
        let sampled = self.clock.now_millis();
        if sampled > self.now {
            self.now = sampled;
        }
    }

    pub fn alloc_slot(&mut self, value: V) -> SlotKey {
        let key = SlotKey(self.next_slot);
        self.next_slot += 1;
        self.values.insert(key, value);
        key
    }

    pub fn slot(&self, key: SlotKey) -> Option<&V> {
        self.values.get(&key)
    }

    pub fn slot_mut(&mut self, key: SlotKey) -> Option<&mut V> {
        self.values.get_mut(&key)
    }

    pub fn set_slot(&mut self, key: SlotKey, value: V) {
        self.values.insert(key, value);
    }

    pub fn release_slot(&mut self, key: SlotKey) -> Option<V> {
        self.values.remove(&key)
    }

    pub fn live_slots(&self) -> usize {
        self.values.len()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Computations
// ═══════════════════════════════════════════════════════════════════════════════

type OnSuccess<U, V, E> = Box<dyn FnOnce(V) -> Computation<U, V, E>>;
type OnFailure<U, V, E> = Box<dyn FnOnce(E) -> Computation<U, V, E>>;
type Resume<U, V, E> = Box<dyn FnOnce(&mut ComputeContext<U, V>) -> Computation<U, V, E>>;

/// A pending effect over a [`ComputeContext`]
#[must_use = "computations do nothing until run"]
pub struct Computation<U, V, E>(Step<U, V, E>);

enum Step<U, V, E> {
    Succeed(V),
    Fail(E),
    Bind(Box<Computation<U, V, E>>, OnSuccess<U, V, E>),
    BindError(Box<Computation<U, V, E>>, OnFailure<U, V, E>),
    Defer(Resume<U, V, E>),
}

enum Frame<U, V, E> {
    Success(OnSuccess<U, V, E>),
    Failure(OnFailure<U, V, E>),
}

impl<U, V, E> fmt::Debug for Computation<U, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.0 {
            Step::Succeed(_) => "Succeed",
            Step::Fail(_) => "Fail",
            Step::Bind(..) => "Bind",
            Step::BindError(..) => "BindError",
            Step::Defer(_) => "Defer",
        };
        write!(f, "Computation::{kind}")
    }
}

/// Values a [`branch`] can decide on
pub trait Decide {
    fn decide(&self) -> bool;
}

impl Decide for bool {
    fn decide(&self) -> bool {
        *self
    }
}

pub fn succeed<U, V, E>(value: V) -> Computation<U, V, E> {
    Computation(Step::Succeed(value))
}

pub fn fail<U, V, E>(error: E) -> Computation<U, V, E> {
    Computation(Step::Fail(error))
}

pub fn from_result<U, V, E>(result: Result<V, E>) -> Computation<U, V, E> {
    match result {
        Ok(value) => succeed(value),
        Err(error) => fail(error),
    }
}

/// Build the next computation when the driver reaches this point, with
/// access to the context.
pub fn defer<U, V, E, F>(f: F) -> Computation<U, V, E>
where
    F: FnOnce(&mut ComputeContext<U, V>) -> Computation<U, V, E> + 'static,
{
    Computation(Step::Defer(Box::new(f)))
}

/// Build the next computation when the driver reaches this point.
pub fn lazy<U, V, E, F>(f: F) -> Computation<U, V, E>
where
    F: FnOnce() -> Computation<U, V, E> + 'static,
{
    defer(move |_| f())
}

/// Run a synchronous step against the context.
pub fn effect<U, V, E, F>(f: F) -> Computation<U, V, E>
where
    F: FnOnce(&mut ComputeContext<U, V>) -> Result<V, E> + 'static,
{
    defer(move |ctx| from_result(f(ctx)))
}

impl<U: 'static, V: 'static, E: 'static> Computation<U, V, E> {
    /// Continue with `f` on success; failures skip `f`.
    pub fn bind<F>(self, f: F) -> Self
    where
        F: FnOnce(V) -> Self + 'static,
    {
        Computation(Step::Bind(Box::new(self), Box::new(f)))
    }

    /// Continue with `f` on failure; successes skip `f`.
    pub fn bind_error<F>(self, f: F) -> Self
    where
        F: FnOnce(E) -> Self + 'static,
    {
        Computation(Step::BindError(Box::new(self), Box::new(f)))
    }

    /// Run `next` after `self` succeeds, discarding `self`'s value.
    pub fn then(self, next: Self) -> Self {
        self.bind(move |_| next)
    }

    pub fn map<F>(self, f: F) -> Self
    where
        F: FnOnce(V) -> V + 'static,
    {
        self.bind(move |value| succeed(f(value)))
    }

    /// Drive the computation to a terminal value or error.
    pub fn run(self, ctx: &mut ComputeContext<U, V>) -> Result<V, E> {
        let mut frames: Vec<Frame<U, V, E>> = Vec::new();
        let mut current = self;
        loop {
            current = match current.0 {
                Step::Succeed(value) => match unwind_to_success(&mut frames) {
                    Some(next) => {
                        ctx.advance_clock();
                        next(value)
                    }
                    None => return Ok(value),
                },
                Step::Fail(error) => match unwind_to_failure(&mut frames) {
                    Some(next) => next(error),
                    None => return Err(error),
                },
                Step::Bind(inner, next) => {
                    frames.push(Frame::Success(next));
                    *inner
                }
                Step::BindError(inner, next) => {
                    frames.push(Frame::Failure(next));
                    *inner
                }
                Step::Defer(resume) => resume(ctx),
            };
        }
    }
}

fn unwind_to_success<U, V, E>(frames: &mut Vec<Frame<U, V, E>>) -> Option<OnSuccess<U, V, E>> {
    while let Some(frame) = frames.pop() {
        if let Frame::Success(next) = frame {
            return Some(next);
        }
    }
    None
}

fn unwind_to_failure<U, V, E>(frames: &mut Vec<Frame<U, V, E>>) -> Option<OnFailure<U, V, E>> {
    while let Some(frame) = frames.pop() {
        if let Frame::Failure(next) = frame {
            return Some(next);
        }
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════════
// Combinators
// ═══════════════════════════════════════════════════════════════════════════════

pub fn bind<U: 'static, V: 'static, E: 'static, F>(
    p: Computation<U, V, E>,
    f: F,
) -> Computation<U, V, E>
where
    F: FnOnce(V) -> Computation<U, V, E> + 'static,
{
    p.bind(f)
}

pub fn bind_error<U: 'static, V: 'static, E: 'static, F>(
    p: Computation<U, V, E>,
    f: F,
) -> Computation<U, V, E>
where
    F: FnOnce(E) -> Computation<U, V, E> + 'static,
{
    p.bind_error(f)
}

/// Run `items` in order; the result is the last item's value, or `empty`
/// when there are none.
pub fn sequence<U: 'static, V: 'static, E: 'static>(
    items: Vec<Computation<U, V, E>>,
    empty: V,
) -> Computation<U, V, E> {
    fn step<U: 'static, V: 'static, E: 'static>(
        mut pending: std::vec::IntoIter<Computation<U, V, E>>,
        last: V,
    ) -> Computation<U, V, E> {
        match pending.next() {
            None => succeed(last),
            Some(item) => item.bind(move |value| step(pending, value)),
        }
    }
    step(items.into_iter(), empty)
}

/// Run `items` in order and collect every value, in order.
pub fn enumeration<U: 'static, V: From<Vec<V>> + 'static, E: 'static>(
    items: Vec<Computation<U, V, E>>,
) -> Computation<U, V, E> {
    fn step<U: 'static, V: From<Vec<V>> + 'static, E: 'static>(
        mut pending: std::vec::IntoIter<Computation<U, V, E>>,
        mut done: Vec<V>,
    ) -> Computation<U, V, E> {
        match pending.next() {
            None => succeed(V::from(done)),
            Some(item) => item.bind(move |value| {
                done.push(value);
                step(pending, done)
            }),
        }
    }
    let capacity = items.len();
    step(items.into_iter(), Vec::with_capacity(capacity))
}

/// Run `test`, then `consequent` or `alternate` depending on its value.
pub fn branch<U: 'static, V: Decide + 'static, E: 'static>(
    test: Computation<U, V, E>,
    consequent: Computation<U, V, E>,
    alternate: Computation<U, V, E>,
) -> Computation<U, V, E> {
    test.bind(move |value| {
        if value.decide() {
            consequent
        } else {
            alternate
        }
    })
}

/// Scoped resource: run `open`, then `body`, then `close`. `close` runs
/// whether `body` succeeds or fails, and `body`'s outcome is kept unless
/// `close` itself fails.
pub fn between<U: 'static, V: 'static, E: 'static>(
    open: Computation<U, V, E>,
    close: Computation<U, V, E>,
    body: Computation<U, V, E>,
) -> Computation<U, V, E> {
    let on_success = Rc::new(Cell::new(Some(close)));
    let on_failure = Rc::clone(&on_success);
    open.then(
        body.bind_error(move |error| match on_failure.take() {
            Some(close) => close.then(fail(error)),
            None => fail(error),
        })
        .bind(move |value| match on_success.take() {
            Some(close) => close.then(succeed(value)),
            None => succeed(value),
        }),
    )
}
