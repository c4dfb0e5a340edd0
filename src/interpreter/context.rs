//! Execution contexts (ES5 10.3)
//!
//! The running context is the engine's user data. Entering code swaps in a
//! new context and parks the caller on a stack; every scoped change is made
//! through [`between`] so it is undone on both exit channels.

use std::cell::RefCell;
use std::rc::Rc;

use crate::compute::{between, effect};
use crate::value::{JsObjectRef, JsValue};

use super::environment::EnvRef;
use super::{Context, Datum, ErrorKind, Eval, Realm};

/// What kind of code a context runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Global,
    Eval,
    Function,
}

pub struct ExecutionContext {
    pub kind: CodeKind,
    pub strict: bool,
    pub lexical_env: EnvRef,
    pub variable_env: EnvRef,
    pub this_binding: JsValue,
    pub global: JsObjectRef,
    pub realm: Rc<Realm>,
    /// Suspended callers, innermost last
    pub stack: Vec<ExecutionContext>,
    /// Call and construct hooks in progress, native ones included
    pub calls: usize,
}

/// Context for global code; `this` is the global object.
pub fn create_global_context(realm: &Rc<Realm>, env: EnvRef, global: JsObjectRef) -> ExecutionContext {
    ExecutionContext {
        kind: CodeKind::Global,
        strict: realm.settings.strict,
        lexical_env: env.clone(),
        variable_env: env,
        this_binding: JsValue::Object(global.clone()),
        global,
        realm: Rc::clone(realm),
        stack: Vec::new(),
        calls: 0,
    }
}

impl ExecutionContext {
    /// Fresh context for function or eval code sharing this context's realm
    /// and global object.
    pub fn nested(
        &self,
        kind: CodeKind,
        strict: bool,
        lexical_env: EnvRef,
        variable_env: EnvRef,
        this_binding: JsValue,
    ) -> ExecutionContext {
        ExecutionContext {
            kind,
            strict,
            lexical_env,
            variable_env,
            this_binding,
            global: self.global.clone(),
            realm: Rc::clone(&self.realm),
            stack: Vec::new(),
            calls: self.calls,
        }
    }

    /// Number of suspended callers
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Make `next` the running context
    pub fn enter(&mut self, next: ExecutionContext) {
        let stack = std::mem::take(&mut self.stack);
        let calls = self.calls;
        let caller = std::mem::replace(self, next);
        self.stack = stack;
        self.calls = calls;
        self.stack.push(caller);
    }

    /// Resume the innermost suspended caller
    pub fn leave(&mut self) {
        match self.stack.pop() {
            Some(mut caller) => {
                caller.stack = std::mem::take(&mut self.stack);
                caller.calls = self.calls;
                *self = caller;
            }
            None => tracing::error!("leaving the outermost execution context"),
        }
    }
}

fn done() -> Result<Datum, JsValue> {
    Ok(Datum::Value(JsValue::Undefined))
}

/// Run `body` in `next`, then resume the caller
pub fn with_context(next: ExecutionContext, body: Eval) -> Eval {
    between(
        effect(move |ctx: &mut Context| {
            ctx.user_data.enter(next);
            done()
        }),
        effect(|ctx: &mut Context| {
            ctx.user_data.leave();
            done()
        }),
        body,
    )
}

/// Run `body` as one more hook invocation. Past `Settings::max_call_depth`
/// this fails with a RangeError instead.
pub fn with_call_frame(body: Eval) -> Eval {
    between(
        effect(|ctx: &mut Context| {
            let ec = &mut ctx.user_data;
            if ec.calls >= ec.realm.settings.max_call_depth {
                tracing::warn!(depth = ec.calls, "maximum call depth exceeded");
                return Err(ec.realm.create_error(ErrorKind::RangeError, "Maximum call stack size exceeded"));
            }
            ec.calls += 1;
            done()
        }),
        effect(|ctx: &mut Context| {
            ctx.user_data.calls = ctx.user_data.calls.saturating_sub(1);
            done()
        }),
        body,
    )
}

/// Scoped swap of one field of the running context
fn scoped<T, F>(replacement: T, field: F, body: Eval) -> Eval
where
    T: 'static,
    F: Fn(&mut ExecutionContext) -> &mut T + Copy + 'static,
{
    let saved: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
    let restore = Rc::clone(&saved);
    between(
        effect(move |ctx: &mut Context| {
            let previous = std::mem::replace(field(&mut ctx.user_data), replacement);
            *saved.borrow_mut() = Some(previous);
            done()
        }),
        effect(move |ctx: &mut Context| {
            if let Some(previous) = restore.borrow_mut().take() {
                *field(&mut ctx.user_data) = previous;
            }
            done()
        }),
        body,
    )
}

/// Run `body` with `this` bound to `this_value`
pub fn with_this_binding(this_value: JsValue, body: Eval) -> Eval {
    scoped(this_value, |ec: &mut ExecutionContext| &mut ec.this_binding, body)
}

/// Run `body` with `env` as the lexical environment (catch clauses, `with`)
pub fn with_lexical_environment(env: EnvRef, body: Eval) -> Eval {
    scoped(env, |ec: &mut ExecutionContext| &mut ec.lexical_env, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{ComputeContext, defer, fail};
    use crate::interpreter::{Settings, value};
    use crate::platform::{FixedTimeProvider, NoOpConsoleProvider};

    fn context() -> Context {
        let realm = Realm::new(Settings::default(), Rc::new(NoOpConsoleProvider));
        let ec = create_global_context(&realm, realm.global_env.clone(), realm.global.clone());
        ComputeContext::new(ec, Rc::new(FixedTimeProvider::new(0.0)))
    }

    fn current_this() -> Eval {
        defer(|ctx: &mut Context| value(ctx.user_data.this_binding.clone()))
    }

    #[test]
    fn test_this_binding_restored_after_success() {
        let mut ctx = context();
        let result = with_this_binding(JsValue::Number(7.0), current_this()).run(&mut ctx);
        assert!(matches!(result, Ok(Datum::Value(JsValue::Number(n))) if n == 7.0));
        assert!(ctx.user_data.this_binding.is_object());
    }

    #[test]
    fn test_this_binding_restored_after_failure() {
        let mut ctx = context();
        let result = with_this_binding(JsValue::Null, fail(JsValue::from("boom"))).run(&mut ctx);
        assert!(result.is_err());
        assert!(ctx.user_data.this_binding.is_object());
    }

    #[test]
    fn test_enter_and_leave_nest() {
        let mut ctx = context();
        let inner = ctx.user_data.nested(
            CodeKind::Function,
            true,
            EnvRef::new_declarative(None),
            EnvRef::new_declarative(None),
            JsValue::Undefined,
        );
        let body = defer(|ctx: &mut Context| {
            assert_eq!(ctx.user_data.kind, CodeKind::Function);
            assert_eq!(ctx.user_data.depth(), 1);
            fail(JsValue::Null)
        });
        assert!(with_context(inner, body).run(&mut ctx).is_err());
        assert_eq!(ctx.user_data.kind, CodeKind::Global);
        assert_eq!(ctx.user_data.depth(), 0);
    }

    #[test]
    fn test_call_frames_are_counted_and_released() {
        let mut ctx = context();
        let body = defer(|ctx: &mut Context| {
            assert_eq!(ctx.user_data.calls, 2);
            fail(JsValue::Null)
        });
        let nested = with_call_frame(with_call_frame(body));
        assert!(nested.run(&mut ctx).is_err());
        assert_eq!(ctx.user_data.calls, 0);
    }

    #[test]
    fn test_call_frame_bound_is_a_range_error() {
        let realm = Realm::new(
            Settings {
                max_call_depth: 3,
                ..Settings::default()
            },
            Rc::new(NoOpConsoleProvider),
        );
        let ec = create_global_context(&realm, realm.global_env.clone(), realm.global.clone());
        let mut ctx = ComputeContext::new(ec, Rc::new(FixedTimeProvider::new(0.0)));
        let mut body = value(JsValue::Undefined);
        for _ in 0..4 {
            body = with_call_frame(body);
        }
        let Err(JsValue::Object(error)) = body.run(&mut ctx) else {
            panic!("expected a thrown error object");
        };
        assert_eq!(error.class(), crate::value::ClassTag::Error);
        assert_eq!(ctx.user_data.calls, 0);
    }
}
