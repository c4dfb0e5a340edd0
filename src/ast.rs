//! Abstract Syntax Tree types for ECMAScript 5 scripts
//!
//! Child nodes are reference counted so the evaluator can hold on to the
//! parts it still has to run without borrowing from the tree.

use std::rc::Rc;

use crate::lexer::Span;
use crate::value::JsString;

/// A list of statements (program, function or block body)
pub type StatementList = Rc<[Rc<Statement>]>;

/// A complete script
#[derive(Debug)]
pub struct Program {
    pub body: StatementList,
    pub strict: bool,
    pub declarations: Rc<Declarations>,
}

/// Names hoisted to the top of a program or function body
#[derive(Debug, Default)]
pub struct Declarations {
    /// Function declarations in source order
    pub functions: Vec<Rc<FunctionLiteral>>,
    /// `var` names in first-occurrence order, without duplicates
    pub vars: Vec<JsString>,
}

/// Shared by function declarations and function expressions
#[derive(Debug)]
pub struct FunctionLiteral {
    pub id: Option<Identifier>,
    pub params: Rc<[JsString]>,
    pub body: StatementList,
    pub strict: bool,
    pub declarations: Rc<Declarations>,
    /// Source text, reported by `Function.prototype.toString`
    pub source: Rc<str>,
    pub span: Span,
}

// ============ STATEMENTS ============

#[derive(Debug)]
pub enum Statement {
    Empty(Span),
    Expression(ExpressionStatement),
    Variable(VariableDeclaration),
    /// Function declarations are instantiated by hoisting; evaluating one is a no-op.
    Function(Rc<FunctionLiteral>),
    Block(BlockStatement),
    If(IfStatement),
    For(ForStatement),
    ForIn(ForInStatement),
    While(WhileStatement),
    DoWhile(DoWhileStatement),
    Switch(SwitchStatement),
    Try(TryStatement),
    Throw(ThrowStatement),
    Return(ReturnStatement),
    Break(BreakStatement),
    Continue(ContinueStatement),
    Labeled(LabeledStatement),
    With(WithStatement),
    Debugger(Span),
}

#[derive(Debug)]
pub struct ExpressionStatement {
    pub expression: Rc<Expression>,
    pub span: Span,
}

#[derive(Debug)]
pub struct VariableDeclaration {
    pub declarations: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug)]
pub struct VariableDeclarator {
    pub id: Identifier,
    pub init: Option<Rc<Expression>>,
    pub span: Span,
}

#[derive(Debug)]
pub struct BlockStatement {
    pub body: StatementList,
    pub span: Span,
}

#[derive(Debug)]
pub struct IfStatement {
    pub test: Rc<Expression>,
    pub consequent: Rc<Statement>,
    pub alternate: Option<Rc<Statement>>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ForStatement {
    pub init: Option<ForInit>,
    pub test: Option<Rc<Expression>>,
    pub update: Option<Rc<Expression>>,
    pub body: Rc<Statement>,
    pub labels: Rc<[JsString]>,
    pub span: Span,
}

#[derive(Debug)]
pub enum ForInit {
    Variable(VariableDeclaration),
    Expression(Rc<Expression>),
}

#[derive(Debug)]
pub struct ForInStatement {
    pub left: ForInLeft,
    pub right: Rc<Expression>,
    pub body: Rc<Statement>,
    pub labels: Rc<[JsString]>,
    pub span: Span,
}

#[derive(Debug)]
pub enum ForInLeft {
    /// `for (var x in o)`, with an optional (ignored-after-init) initialiser
    Variable(VariableDeclarator),
    /// `for (lhs in o)`
    Expression(Rc<Expression>),
}

#[derive(Debug)]
pub struct WhileStatement {
    pub test: Rc<Expression>,
    pub body: Rc<Statement>,
    pub labels: Rc<[JsString]>,
    pub span: Span,
}

#[derive(Debug)]
pub struct DoWhileStatement {
    pub body: Rc<Statement>,
    pub test: Rc<Expression>,
    pub labels: Rc<[JsString]>,
    pub span: Span,
}

#[derive(Debug)]
pub struct SwitchStatement {
    pub discriminant: Rc<Expression>,
    pub cases: Rc<[SwitchCase]>,
    pub span: Span,
}

#[derive(Debug)]
pub struct SwitchCase {
    /// `None` for the `default` clause
    pub test: Option<Rc<Expression>>,
    pub consequent: StatementList,
    pub span: Span,
}

#[derive(Debug)]
pub struct TryStatement {
    pub block: StatementList,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<StatementList>,
    pub span: Span,
}

#[derive(Debug)]
pub struct CatchClause {
    pub param: JsString,
    pub body: StatementList,
    pub span: Span,
}

#[derive(Debug)]
pub struct ThrowStatement {
    pub argument: Rc<Expression>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ReturnStatement {
    pub argument: Option<Rc<Expression>>,
    pub span: Span,
}

#[derive(Debug)]
pub struct BreakStatement {
    pub label: Option<JsString>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ContinueStatement {
    pub label: Option<JsString>,
    pub span: Span,
}

#[derive(Debug)]
pub struct LabeledStatement {
    pub label: JsString,
    pub body: Rc<Statement>,
    pub span: Span,
}

#[derive(Debug)]
pub struct WithStatement {
    pub object: Rc<Expression>,
    pub body: Rc<Statement>,
    pub span: Span,
}

// ============ EXPRESSIONS ============

#[derive(Debug)]
pub enum Expression {
    Literal(Literal),
    Array(ArrayExpression),
    Object(ObjectExpression),
    Function(Rc<FunctionLiteral>),
    Identifier(Identifier),
    This(Span),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    Logical(LogicalExpression),
    Conditional(ConditionalExpression),
    Assignment(AssignmentExpression),
    Update(UpdateExpression),
    Sequence(SequenceExpression),
    Member(MemberExpression),
    Call(CallExpression),
    New(NewExpression),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal(l) => l.span,
            Expression::Array(a) => a.span,
            Expression::Object(o) => o.span,
            Expression::Function(f) => f.span,
            Expression::Identifier(i) => i.span,
            Expression::This(s) => *s,
            Expression::Unary(u) => u.span,
            Expression::Binary(b) => b.span,
            Expression::Logical(l) => l.span,
            Expression::Conditional(c) => c.span,
            Expression::Assignment(a) => a.span,
            Expression::Update(u) => u.span,
            Expression::Sequence(s) => s.span,
            Expression::Member(m) => m.span,
            Expression::Call(c) => c.span,
            Expression::New(n) => n.span,
        }
    }

    /// Move every uniquely owned child out of the node so it can be dropped
    /// from a worklist instead of recursively.
    fn detach_children(&mut self, out: &mut Vec<Rc<Expression>>) {
        match self {
            Expression::Literal(_)
            | Expression::Function(_)
            | Expression::Identifier(_)
            | Expression::This(_) => {}
            Expression::Array(a) => out.extend(a.elements.drain(..).flatten()),
            Expression::Object(o) => out.extend(o.properties.drain(..).map(|p| p.value)),
            Expression::Unary(u) => out.push(take_child(&mut u.argument)),
            Expression::Binary(b) => {
                out.push(take_child(&mut b.left));
                out.push(take_child(&mut b.right));
            }
            Expression::Logical(l) => {
                out.push(take_child(&mut l.left));
                out.push(take_child(&mut l.right));
            }
            Expression::Conditional(c) => {
                out.push(take_child(&mut c.test));
                out.push(take_child(&mut c.consequent));
                out.push(take_child(&mut c.alternate));
            }
            Expression::Assignment(a) => {
                out.push(take_child(&mut a.left));
                out.push(take_child(&mut a.right));
            }
            Expression::Update(u) => out.push(take_child(&mut u.argument)),
            Expression::Sequence(s) => out.append(&mut s.expressions),
            Expression::Member(m) => {
                out.push(take_child(&mut m.object));
                if let MemberProperty::Computed(key) = &mut m.property {
                    out.push(take_child(key));
                }
            }
            Expression::Call(c) => {
                out.push(take_child(&mut c.callee));
                out.append(&mut c.arguments);
            }
            Expression::New(n) => {
                out.push(take_child(&mut n.callee));
                out.append(&mut n.arguments);
            }
        }
    }
}

thread_local! {
    static HOLE: Rc<Expression> = Rc::new(Expression::This(Span::default()));
}

fn take_child(slot: &mut Rc<Expression>) -> Rc<Expression> {
    let hole = HOLE.with(Rc::clone);
    std::mem::replace(slot, hole)
}

// Long operator chains (`1 + 1 + ... + 1`) nest one node per operator;
// tear them down iteratively.
impl Drop for Expression {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(child) = pending.pop() {
            if let Ok(mut expr) = Rc::try_unwrap(child) {
                expr.detach_children(&mut pending);
            }
        }
    }
}

#[derive(Debug)]
pub struct Literal {
    pub value: LiteralValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub name: JsString,
    pub span: Span,
}

#[derive(Debug)]
pub struct ArrayExpression {
    /// `None` marks a hole (`[1, , 3]`)
    pub elements: Vec<Option<Rc<Expression>>>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ObjectExpression {
    pub properties: Vec<Property>,
    pub span: Span,
}

#[derive(Debug)]
pub struct Property {
    pub key: JsString,
    /// For getters and setters this is the accessor function expression
    pub value: Rc<Expression>,
    pub kind: PropertyKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

#[derive(Debug)]
pub struct UnaryExpression {
    pub operator: UnaryOp,
    pub argument: Rc<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,  // -
    Plus,   // +
    Not,    // !
    BitNot, // ~
    Typeof, // typeof
    Void,   // void
    Delete, // delete
}

#[derive(Debug)]
pub struct BinaryExpression {
    pub operator: BinaryOp,
    pub left: Rc<Expression>,
    pub right: Rc<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Mod, // %
    // Comparison
    Eq,          // ==
    NotEq,       // !=
    StrictEq,    // ===
    StrictNotEq, // !==
    Lt,          // <
    LtEq,        // <=
    Gt,          // >
    GtEq,        // >=
    // Bitwise
    BitAnd,  // &
    BitOr,   // |
    BitXor,  // ^
    LShift,  // <<
    RShift,  // >>
    URShift, // >>>
    // Other
    In,         // in
    Instanceof, // instanceof
}

#[derive(Debug)]
pub struct LogicalExpression {
    pub operator: LogicalOp,
    pub left: Rc<Expression>,
    pub right: Rc<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And, // &&
    Or,  // ||
}

#[derive(Debug)]
pub struct ConditionalExpression {
    pub test: Rc<Expression>,
    pub consequent: Rc<Expression>,
    pub alternate: Rc<Expression>,
    pub span: Span,
}

#[derive(Debug)]
pub struct AssignmentExpression {
    pub operator: AssignmentOp,
    /// An identifier or member expression
    pub left: Rc<Expression>,
    pub right: Rc<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOp {
    Assign,        // =
    AddAssign,     // +=
    SubAssign,     // -=
    MulAssign,     // *=
    DivAssign,     // /=
    ModAssign,     // %=
    BitAndAssign,  // &=
    BitOrAssign,   // |=
    BitXorAssign,  // ^=
    LShiftAssign,  // <<=
    RShiftAssign,  // >>=
    URShiftAssign, // >>>=
}

impl AssignmentOp {
    /// The binary operator a compound assignment applies
    pub fn binary_op(self) -> Option<BinaryOp> {
        match self {
            AssignmentOp::Assign => None,
            AssignmentOp::AddAssign => Some(BinaryOp::Add),
            AssignmentOp::SubAssign => Some(BinaryOp::Sub),
            AssignmentOp::MulAssign => Some(BinaryOp::Mul),
            AssignmentOp::DivAssign => Some(BinaryOp::Div),
            AssignmentOp::ModAssign => Some(BinaryOp::Mod),
            AssignmentOp::BitAndAssign => Some(BinaryOp::BitAnd),
            AssignmentOp::BitOrAssign => Some(BinaryOp::BitOr),
            AssignmentOp::BitXorAssign => Some(BinaryOp::BitXor),
            AssignmentOp::LShiftAssign => Some(BinaryOp::LShift),
            AssignmentOp::RShiftAssign => Some(BinaryOp::RShift),
            AssignmentOp::URShiftAssign => Some(BinaryOp::URShift),
        }
    }
}

#[derive(Debug)]
pub struct UpdateExpression {
    pub operator: UpdateOp,
    pub argument: Rc<Expression>,
    pub prefix: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment, // ++
    Decrement, // --
}

#[derive(Debug)]
pub struct SequenceExpression {
    pub expressions: Vec<Rc<Expression>>,
    pub span: Span,
}

#[derive(Debug)]
pub struct MemberExpression {
    pub object: Rc<Expression>,
    pub property: MemberProperty,
    pub span: Span,
}

#[derive(Debug)]
pub enum MemberProperty {
    /// `o.name`
    Identifier(Identifier),
    /// `o[expr]`
    Computed(Rc<Expression>),
}

#[derive(Debug)]
pub struct CallExpression {
    pub callee: Rc<Expression>,
    pub arguments: Vec<Rc<Expression>>,
    pub span: Span,
}

#[derive(Debug)]
pub struct NewExpression {
    pub callee: Rc<Expression>,
    pub arguments: Vec<Rc<Expression>>,
    pub span: Span,
}
