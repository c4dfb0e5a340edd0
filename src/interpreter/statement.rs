//! Statement evaluation (ES5 12)
//!
//! Statements evaluate to a [`Completion`]. A hosted exception raised while
//! evaluating an expression is caught at the innermost enclosing statement and
//! turned into a `Throw` completion, which then travels like any other abrupt
//! completion. Loops and lists continue by returning the next step from a
//! bind, so iteration never grows the native stack.

use std::rc::Rc;

use crate::ast::{
    DoWhileStatement, Expression, ForInLeft, ForInStatement, ForInit, ForStatement, IfStatement,
    LabeledStatement, Statement, StatementList, SwitchCase, SwitchStatement, TryStatement,
    VariableDeclaration, VariableDeclarator, WhileStatement, WithStatement,
};
use crate::compute::{SlotKey, between, defer, effect, lazy, sequence, succeed};
use crate::value::{CheapClone, JsObjectRef, JsString, JsValue};

use super::context::with_lexical_environment;
use super::conversion::to_object;
use super::environment::EnvRef;
use super::expression::{self, evaluate, evaluate_value};
use super::reference::{self, Reference};
use super::{
    Completion, CompletionKind, Context, Datum, Eval, EvalExt, completion, object, or_reject,
    with_realm,
};

/// Evaluate one statement to a completion
pub fn evaluate_statement(stmt: &Rc<Statement>) -> Eval {
    let stmt = Rc::clone(stmt);
    lazy(move || statement(&stmt)).bind_error(|thrown| completion(Completion::throw(thrown)))
}

/// Evaluate statements in order, stopping at the first abrupt completion.
/// The result carries the last non-empty value produced.
pub fn statement_list(list: StatementList) -> Eval {
    list_from(list, 0, None)
}

fn list_from(list: StatementList, index: usize, last: Option<JsValue>) -> Eval {
    let Some(stmt) = list.get(index).cloned() else {
        return completion(Completion::normal(last));
    };
    evaluate_statement(&stmt).and_completion(move |c| {
        if c.is_abrupt() {
            return completion(c.or_value(last));
        }
        let last = c.value.or(last);
        list_from(list, index + 1, last)
    })
}

/// Statement list whose uncaught failures become a `Throw` completion
fn guarded(list: StatementList) -> Eval {
    statement_list(list).bind_error(|thrown| completion(Completion::throw(thrown)))
}

fn empty() -> Eval {
    completion(Completion::empty())
}

fn statement(stmt: &Statement) -> Eval {
    match stmt {
        Statement::Empty(_) | Statement::Debugger(_) | Statement::Function(_) => empty(),
        Statement::Expression(expr) => {
            evaluate_value(&expr.expression).and_value(|v| completion(Completion::normal(Some(v))))
        }
        Statement::Variable(decl) => variable_declaration(decl).then(empty()),
        Statement::Block(block) => statement_list(block.body.clone()),
        Statement::If(stmt) => if_statement(stmt),
        Statement::While(stmt) => while_statement(stmt),
        Statement::DoWhile(stmt) => do_while_statement(stmt),
        Statement::For(stmt) => for_statement(stmt),
        Statement::ForIn(stmt) => for_in_statement(stmt),
        Statement::Switch(stmt) => switch_statement(stmt),
        Statement::Try(stmt) => try_statement(stmt),
        Statement::Throw(stmt) => {
            evaluate_value(&stmt.argument).and_value(|v| completion(Completion::throw(v)))
        }
        Statement::Return(stmt) => match &stmt.argument {
            Some(argument) => {
                evaluate_value(argument).and_value(|v| completion(Completion::return_value(v)))
            }
            None => completion(Completion::return_value(JsValue::Undefined)),
        },
        Statement::Break(stmt) => completion(Completion::jump(CompletionKind::Break, stmt.label.clone())),
        Statement::Continue(stmt) => {
            completion(Completion::jump(CompletionKind::Continue, stmt.label.clone()))
        }
        Statement::Labeled(stmt) => labeled_statement(stmt),
        Statement::With(stmt) => with_statement(stmt),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Declarations and simple statements
// ═══════════════════════════════════════════════════════════════════════════════

fn variable_declaration(decl: &VariableDeclaration) -> Eval {
    sequence(
        decl.declarations.iter().map(variable_declarator).collect(),
        Datum::Value(JsValue::Undefined),
    )
}

/// `name = init` for a declarator with an initialiser; the binding itself
/// was created by hoisting.
fn variable_declarator(declarator: &VariableDeclarator) -> Eval {
    let Some(init) = declarator.init.clone() else {
        return succeed(Datum::Value(JsValue::Undefined));
    };
    expression::identifier(declarator.id.name.cheap_clone()).bind(move |target| {
        evaluate_value(&init).and_value(move |v| reference::put_value(target, v))
    })
}

fn if_statement(stmt: &IfStatement) -> Eval {
    let consequent = Rc::clone(&stmt.consequent);
    let alternate = stmt.alternate.clone();
    evaluate_value(&stmt.test).and_value(move |test| {
        if test.to_boolean() {
            evaluate_statement(&consequent)
        } else {
            match alternate {
                Some(alternate) => evaluate_statement(&alternate),
                None => empty(),
            }
        }
    })
}

fn labeled_statement(stmt: &LabeledStatement) -> Eval {
    let label = stmt.label.cheap_clone();
    evaluate_statement(&stmt.body).and_completion(move |c| {
        if c.kind == CompletionKind::Break && c.target.as_ref() == Some(&label) {
            completion(Completion::normal(c.value))
        } else {
            completion(c)
        }
    })
}

fn with_statement(stmt: &WithStatement) -> Eval {
    let body = Rc::clone(&stmt.body);
    evaluate_value(&stmt.object).and_value(move |target| {
        with_realm(move |realm| {
            or_reject(to_object(realm, &target), move |obj| {
                defer(move |ctx: &mut Context| {
                    let outer = ctx.user_data.lexical_env.cheap_clone();
                    let env = EnvRef::new_object(obj, Some(outer), true);
                    with_lexical_environment(env, evaluate_statement(&body))
                })
            })
        })
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Loops
// ═══════════════════════════════════════════════════════════════════════════════

/// What a loop does after one run of its body
enum LoopStep {
    /// Run the next iteration carrying this value
    Next(Option<JsValue>),
    /// Leave the loop with this completion
    Exit(Completion),
}

fn loop_body_result(c: Completion, labels: &[JsString], last: Option<JsValue>) -> LoopStep {
    let last = c.value.clone().or(last);
    match c.kind {
        CompletionKind::Normal => LoopStep::Next(last),
        CompletionKind::Continue if c.targets(labels) => LoopStep::Next(last),
        CompletionKind::Break if c.targets(labels) => LoopStep::Exit(Completion::normal(last)),
        _ => LoopStep::Exit(c.or_value(last)),
    }
}

struct WhileLoop {
    test: Rc<Expression>,
    body: Rc<Statement>,
    labels: Rc<[JsString]>,
}

fn while_statement(stmt: &WhileStatement) -> Eval {
    let state = Rc::new(WhileLoop {
        test: Rc::clone(&stmt.test),
        body: Rc::clone(&stmt.body),
        labels: Rc::clone(&stmt.labels),
    });
    while_iteration(state, None)
}

fn while_iteration(state: Rc<WhileLoop>, last: Option<JsValue>) -> Eval {
    evaluate_value(&state.test).and_value(move |test| {
        if !test.to_boolean() {
            return completion(Completion::normal(last));
        }
        evaluate_statement(&state.body).and_completion(move |c| {
            match loop_body_result(c, &state.labels, last) {
                LoopStep::Next(last) => while_iteration(state, last),
                LoopStep::Exit(c) => completion(c),
            }
        })
    })
}

fn do_while_statement(stmt: &DoWhileStatement) -> Eval {
    let state = Rc::new(WhileLoop {
        test: Rc::clone(&stmt.test),
        body: Rc::clone(&stmt.body),
        labels: Rc::clone(&stmt.labels),
    });
    do_while_iteration(state, None)
}

fn do_while_iteration(state: Rc<WhileLoop>, last: Option<JsValue>) -> Eval {
    evaluate_statement(&state.body).and_completion(move |c| {
        match loop_body_result(c, &state.labels, last) {
            LoopStep::Next(last) => evaluate_value(&state.test).and_value(move |test| {
                if test.to_boolean() {
                    do_while_iteration(state, last)
                } else {
                    completion(Completion::normal(last))
                }
            }),
            LoopStep::Exit(c) => completion(c),
        }
    })
}

struct ForLoop {
    test: Option<Rc<Expression>>,
    update: Option<Rc<Expression>>,
    body: Rc<Statement>,
    labels: Rc<[JsString]>,
}

fn for_statement(stmt: &ForStatement) -> Eval {
    let init = match &stmt.init {
        Some(ForInit::Variable(decl)) => variable_declaration(decl),
        Some(ForInit::Expression(expr)) => evaluate_value(expr),
        None => succeed(Datum::Value(JsValue::Undefined)),
    };
    let state = Rc::new(ForLoop {
        test: stmt.test.clone(),
        update: stmt.update.clone(),
        body: Rc::clone(&stmt.body),
        labels: Rc::clone(&stmt.labels),
    });
    init.then(for_iteration(state, None))
}

fn for_iteration(state: Rc<ForLoop>, last: Option<JsValue>) -> Eval {
    let test = match &state.test {
        Some(test) => evaluate_value(test),
        None => succeed(Datum::Value(JsValue::Boolean(true))),
    };
    test.and_value(move |test| {
        if !test.to_boolean() {
            return completion(Completion::normal(last));
        }
        evaluate_statement(&state.body).and_completion(move |c| {
            match loop_body_result(c, &state.labels, last) {
                LoopStep::Next(last) => {
                    let update = match &state.update {
                        Some(update) => evaluate_value(update),
                        None => succeed(Datum::Value(JsValue::Undefined)),
                    };
                    update.then(lazy(move || for_iteration(state, last)))
                }
                LoopStep::Exit(c) => completion(c),
            }
        })
    })
}

/// Assignment target of a for-in loop
enum ForInTarget {
    Name(JsString),
    Expression(Rc<Expression>),
}

struct ForInLoop {
    target: ForInTarget,
    object: JsObjectRef,
    /// Remaining keys, next key last
    keys: SlotKey,
    body: Rc<Statement>,
    labels: Rc<[JsString]>,
}

fn release(slot: SlotKey) -> Eval {
    effect(move |ctx: &mut Context| {
        ctx.release_slot(slot);
        Ok(Datum::Value(JsValue::Undefined))
    })
}

fn for_in_statement(stmt: &ForInStatement) -> Eval {
    let (init, target) = match &stmt.left {
        ForInLeft::Variable(declarator) => (
            variable_declarator(declarator),
            ForInTarget::Name(declarator.id.name.cheap_clone()),
        ),
        ForInLeft::Expression(expr) => (
            succeed(Datum::Value(JsValue::Undefined)),
            ForInTarget::Expression(Rc::clone(expr)),
        ),
    };
    let body = Rc::clone(&stmt.body);
    let labels = Rc::clone(&stmt.labels);
    let right = Rc::clone(&stmt.right);

    init.then(evaluate_value(&right)).and_value(move |subject| {
        if subject.is_nullish() {
            return empty();
        }
        with_realm(move |realm| {
            or_reject(to_object(realm, &subject), move |obj| {
                let keys: Vec<Datum> = object::enumerable_keys(&obj)
                    .into_iter()
                    .rev()
                    .map(|key| Datum::Value(JsValue::String(key)))
                    .collect();
                defer(move |ctx: &mut Context| {
                    let slot = ctx.alloc_slot(Datum::List(keys));
                    let state = Rc::new(ForInLoop {
                        target,
                        object: obj,
                        keys: slot,
                        body,
                        labels,
                    });
                    between(
                        succeed(Datum::Value(JsValue::Undefined)),
                        release(slot),
                        for_in_iteration(state, None),
                    )
                })
            })
        })
    })
}

fn for_in_iteration(state: Rc<ForInLoop>, last: Option<JsValue>) -> Eval {
    defer(move |ctx: &mut Context| {
        let next = match ctx.slot_mut(state.keys) {
            Some(Datum::List(keys)) => keys.pop(),
            _ => None,
        };
        let Some(Datum::Value(JsValue::String(key))) = next else {
            return completion(Completion::normal(last));
        };
        // Keys deleted by an earlier iteration are skipped
        if !object::has_property(&state.object, &key) {
            return for_in_iteration(state, last);
        }
        let target = match &state.target {
            ForInTarget::Name(name) => expression::identifier(name.cheap_clone()),
            ForInTarget::Expression(expr) => evaluate(expr),
        };
        target
            .bind(move |target| reference::put_value(target, JsValue::String(key)))
            .then(lazy(move || {
                evaluate_statement(&state.body).and_completion(move |c| {
                    match loop_body_result(c, &state.labels, last) {
                        LoopStep::Next(last) => for_in_iteration(state, last),
                        LoopStep::Exit(c) => completion(c),
                    }
                })
            }))
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// switch
// ═══════════════════════════════════════════════════════════════════════════════

fn switch_statement(stmt: &SwitchStatement) -> Eval {
    let cases = Rc::clone(&stmt.cases);
    evaluate_value(&stmt.discriminant).and_value(move |discriminant| {
        defer(move |ctx: &mut Context| {
            let slot = ctx.alloc_slot(Datum::Value(discriminant));
            let body = find_case(cases, slot, 0).and_completion(|c| {
                if c.kind == CompletionKind::Break && c.target.is_none() {
                    completion(Completion::normal(c.value))
                } else {
                    completion(c)
                }
            });
            between(succeed(Datum::Value(JsValue::Undefined)), release(slot), body)
        })
    })
}

/// Test `case` clauses in source order against the discriminant held in
/// `slot`; fall back to `default` when none matches.
fn find_case(cases: Rc<[SwitchCase]>, slot: SlotKey, index: usize) -> Eval {
    let Some(case) = cases.get(index) else {
        return match cases.iter().position(|case| case.test.is_none()) {
            Some(default) => run_clauses(cases, default, None),
            None => empty(),
        };
    };
    let Some(test) = case.test.clone() else {
        return find_case(cases, slot, index + 1);
    };
    evaluate_value(&test).and_value(move |candidate| {
        reference::get_value(Reference::Internal { slot }).and_value(move |discriminant| {
            if discriminant.strict_equals(&candidate) {
                run_clauses(cases, index, None)
            } else {
                find_case(cases, slot, index + 1)
            }
        })
    })
}

/// Run the consequents of `cases[index..]`, falling through
fn run_clauses(cases: Rc<[SwitchCase]>, index: usize, last: Option<JsValue>) -> Eval {
    let Some(case) = cases.get(index) else {
        return completion(Completion::normal(last));
    };
    statement_list(case.consequent.clone()).and_completion(move |c| {
        if c.is_abrupt() {
            return completion(c.or_value(last));
        }
        let last = c.value.or(last);
        run_clauses(cases, index + 1, last)
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// try
// ═══════════════════════════════════════════════════════════════════════════════

fn try_statement(stmt: &TryStatement) -> Eval {
    let handler = stmt
        .handler
        .as_ref()
        .map(|clause| (clause.param.cheap_clone(), clause.body.clone()));
    let finalizer = stmt.finalizer.clone();

    let attempt = guarded(stmt.block.clone()).and_completion(move |c| match handler {
        Some((param, body)) if c.kind == CompletionKind::Throw => {
            catch_clause(param, body, c.value_or_undefined())
        }
        _ => completion(c),
    });

    match finalizer {
        None => attempt,
        Some(finalizer) => attempt.and_completion(move |c| {
            guarded(finalizer).and_completion(move |f| {
                if f.is_abrupt() { completion(f) } else { completion(c) }
            })
        }),
    }
}

fn catch_clause(param: JsString, body: StatementList, thrown: JsValue) -> Eval {
    defer(move |ctx: &mut Context| {
        let outer = ctx.user_data.lexical_env.cheap_clone();
        let env = EnvRef::new_declarative(Some(outer));
        env.declare(param, thrown);
        with_lexical_environment(env, guarded(body))
    })
}
