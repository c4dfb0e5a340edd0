//! Parser for ECMAScript 5 scripts
//!
//! Uses recursive descent for statements and precedence climbing for binary
//! expressions. Hoisted declarations are collected while parsing each
//! function body, so the evaluator never has to walk the tree for them.

use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::ast::*;
use crate::error::JsError;
use crate::lexer::{Lexer, Span, Token, TokenKind};
use crate::string_dict::StringDict;
use crate::value::{CheapClone, JsString, number_to_string};

/// Nesting bound for statements and expressions; deeper input is rejected
/// instead of exhausting the native stack.
const MAX_NESTING: usize = 200;

/// Words that cannot name a binding in strict code
const STRICT_RESERVED: &[&str] = &[
    "implements",
    "interface",
    "let",
    "package",
    "private",
    "protected",
    "public",
    "static",
    "yield",
];

/// Per function body bookkeeping: hoisted names and jump targets
#[derive(Default)]
struct FunctionScope {
    functions: Vec<Rc<FunctionLiteral>>,
    vars: Vec<JsString>,
    seen_vars: FxHashSet<JsString>,
    /// Enclosing labels; the flag marks labels of iteration statements
    labels: Vec<(JsString, bool)>,
    breakable: usize,
    iteration: usize,
    in_function: bool,
}

impl FunctionScope {
    fn function() -> Self {
        Self {
            in_function: true,
            ..Self::default()
        }
    }

    fn declare_var(&mut self, name: &JsString) {
        if self.seen_vars.insert(name.cheap_clone()) {
            self.vars.push(name.cheap_clone());
        }
    }

    fn finish(self) -> Rc<Declarations> {
        Rc::new(Declarations {
            functions: self.functions,
            vars: self.vars,
        })
    }
}

/// Parser for ECMAScript 5 source code
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    strict: bool,
    /// Set while parsing the head of a `for` statement, where `in` starts a for-in
    no_in: bool,
    depth: usize,
    scope: FunctionScope,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, string_dict: &'a mut StringDict) -> Self {
        let mut lexer = Lexer::new(source, string_dict);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            previous: Token::eof(0, 1, 1),
            strict: false,
            no_in: false,
            depth: 0,
            scope: FunctionScope::default(),
        }
    }

    /// Start in strict mode (strict direct eval, `Settings::strict`)
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Treat `return` as legal at the top level
    pub fn in_function(mut self, in_function: bool) -> Self {
        self.scope.in_function = in_function;
        self
    }

    #[inline]
    fn intern(&mut self, s: &str) -> JsString {
        self.lexer.string_dict().get_or_insert(s)
    }

    /// Parse a complete program
    pub fn parse_program(&mut self) -> Result<Program, JsError> {
        let body = self.parse_source_elements()?;
        if !self.is_at_end() {
            return Err(self.unexpected_token("end of input"));
        }
        let scope = std::mem::take(&mut self.scope);
        Ok(Program {
            body: body.into(),
            strict: self.strict,
            declarations: scope.finish(),
        })
    }

    /// Statements up to `}` or end of input, honouring a leading
    /// `"use strict"` directive.
    fn parse_source_elements(&mut self) -> Result<Vec<Rc<Statement>>, JsError> {
        let mut body = Vec::new();
        let mut prologue = true;

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let statement = self.parse_statement()?;
            if prologue {
                match directive(&statement) {
                    Some(text) if text.as_str() == "use strict" => self.strict = true,
                    Some(_) => {}
                    None => prologue = false,
                }
            }
            body.push(Rc::new(statement));
        }

        Ok(body)
    }

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, JsError>) -> Result<T, JsError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error("Maximum nesting depth exceeded"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ============ STATEMENTS ============

    fn parse_statement(&mut self) -> Result<Statement, JsError> {
        self.nested(Self::parse_statement_inner)
    }

    fn parse_statement_inner(&mut self) -> Result<Statement, JsError> {
        if self.check_identifier() && self.peek_is(&TokenKind::Colon) {
            return self.parse_labeled_statement();
        }

        match &self.current.kind {
            TokenKind::Var => {
                let declaration = self.parse_variable_declaration()?;
                self.expect_semicolon()?;
                Ok(Statement::Variable(declaration))
            }
            TokenKind::Function => {
                let function = self.parse_function(true)?;
                self.scope.functions.push(Rc::clone(&function));
                Ok(Statement::Function(function))
            }
            TokenKind::If => self.parse_if_statement(),
            TokenKind::For => self.parse_for_statement(Vec::new()),
            TokenKind::While => self.parse_while_statement(Vec::new()),
            TokenKind::Do => self.parse_do_while_statement(Vec::new()),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Break => self.parse_break_statement(),
            TokenKind::Continue => self.parse_continue_statement(),
            TokenKind::Throw => self.parse_throw_statement(),
            TokenKind::With => self.parse_with_statement(),
            TokenKind::LBrace => Ok(Statement::Block(self.parse_block_statement()?)),
            TokenKind::Semicolon => {
                let span = self.current.span;
                self.advance();
                Ok(Statement::Empty(span))
            }
            TokenKind::Debugger => {
                let span = self.current.span;
                self.advance();
                self.expect_semicolon()?;
                Ok(Statement::Debugger(span))
            }
            _ => {
                let start = self.current.span;
                let expression = Rc::new(self.parse_expression()?);
                self.expect_semicolon()?;
                let span = self.span_from(start);
                Ok(Statement::Expression(ExpressionStatement { expression, span }))
            }
        }
    }

    fn parse_variable_declaration(&mut self) -> Result<VariableDeclaration, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Var)?;

        let mut declarations = vec![self.parse_variable_declarator()?];
        while self.match_token(&TokenKind::Comma) {
            declarations.push(self.parse_variable_declarator()?);
        }

        let span = self.span_from(start);
        Ok(VariableDeclaration { declarations, span })
    }

    fn parse_variable_declarator(&mut self) -> Result<VariableDeclarator, JsError> {
        let start = self.current.span;
        let id = self.parse_binding_identifier()?;
        self.scope.declare_var(&id.name);

        let init = if self.match_token(&TokenKind::Eq) {
            Some(Rc::new(self.parse_assignment_expression()?))
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(VariableDeclarator { id, init, span })
    }

    fn parse_block_statement(&mut self) -> Result<BlockStatement, JsError> {
        let start = self.current.span;
        let body = self.parse_block_body()?;
        let span = self.span_from(start);
        Ok(BlockStatement { body, span })
    }

    fn parse_block_body(&mut self) -> Result<StatementList, JsError> {
        self.require_token(&TokenKind::LBrace)?;

        let mut body = vec![];
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            body.push(Rc::new(self.parse_statement()?));
        }

        self.require_token(&TokenKind::RBrace)?;
        Ok(body.into())
    }

    fn parse_if_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::If)?;
        self.require_token(&TokenKind::LParen)?;
        let test = Rc::new(self.parse_expression()?);
        self.require_token(&TokenKind::RParen)?;

        let consequent = Rc::new(self.parse_statement()?);
        let alternate = if self.match_token(&TokenKind::Else) {
            Some(Rc::new(self.parse_statement()?))
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(Statement::If(IfStatement {
            test,
            consequent,
            alternate,
            span,
        }))
    }

    /// Body of a loop, with `break`/`continue` legal inside
    fn parse_loop_body(&mut self) -> Result<Rc<Statement>, JsError> {
        self.scope.breakable += 1;
        self.scope.iteration += 1;
        let body = self.parse_statement();
        self.scope.breakable -= 1;
        self.scope.iteration -= 1;
        body.map(Rc::new)
    }

    fn parse_for_statement(&mut self, labels: Vec<JsString>) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::For)?;
        self.require_token(&TokenKind::LParen)?;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if self.check(&TokenKind::Var) {
            let declaration = self.without_in(Self::parse_variable_declaration)?;
            if self.check(&TokenKind::In) && declaration.declarations.len() == 1 {
                let Some(declarator) = declaration.declarations.into_iter().next() else {
                    return Err(self.error("Invalid for-in declaration"));
                };
                return self.parse_for_in_rest(start, ForInLeft::Variable(declarator), labels);
            }
            Some(ForInit::Variable(declaration))
        } else {
            let expression = Rc::new(self.without_in(Self::parse_expression)?);
            if self.check(&TokenKind::In) {
                return self.parse_for_in_rest(start, ForInLeft::Expression(expression), labels);
            }
            Some(ForInit::Expression(expression))
        };

        self.require_token(&TokenKind::Semicolon)?;
        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(Rc::new(self.parse_expression()?))
        };
        self.require_token(&TokenKind::Semicolon)?;
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(Rc::new(self.parse_expression()?))
        };
        self.require_token(&TokenKind::RParen)?;

        let body = self.parse_loop_body()?;
        let span = self.span_from(start);
        Ok(Statement::For(ForStatement {
            init,
            test,
            update,
            body,
            labels: labels.into(),
            span,
        }))
    }

    fn parse_for_in_rest(
        &mut self,
        start: Span,
        left: ForInLeft,
        labels: Vec<JsString>,
    ) -> Result<Statement, JsError> {
        self.require_token(&TokenKind::In)?;
        let right = Rc::new(self.parse_expression()?);
        self.require_token(&TokenKind::RParen)?;

        let body = self.parse_loop_body()?;
        let span = self.span_from(start);
        Ok(Statement::ForIn(ForInStatement {
            left,
            right,
            body,
            labels: labels.into(),
            span,
        }))
    }

    fn parse_while_statement(&mut self, labels: Vec<JsString>) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::While)?;
        self.require_token(&TokenKind::LParen)?;
        let test = Rc::new(self.parse_expression()?);
        self.require_token(&TokenKind::RParen)?;
        let body = self.parse_loop_body()?;

        let span = self.span_from(start);
        Ok(Statement::While(WhileStatement {
            test,
            body,
            labels: labels.into(),
            span,
        }))
    }

    fn parse_do_while_statement(&mut self, labels: Vec<JsString>) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Do)?;
        let body = self.parse_loop_body()?;
        self.require_token(&TokenKind::While)?;
        self.require_token(&TokenKind::LParen)?;
        let test = Rc::new(self.parse_expression()?);
        self.require_token(&TokenKind::RParen)?;
        // The semicolon after do-while is always optional
        self.match_token(&TokenKind::Semicolon);

        let span = self.span_from(start);
        Ok(Statement::DoWhile(DoWhileStatement {
            body,
            test,
            labels: labels.into(),
            span,
        }))
    }

    fn parse_switch_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Switch)?;
        self.require_token(&TokenKind::LParen)?;
        let discriminant = Rc::new(self.parse_expression()?);
        self.require_token(&TokenKind::RParen)?;
        self.require_token(&TokenKind::LBrace)?;

        self.scope.breakable += 1;
        let cases = self.parse_switch_cases();
        self.scope.breakable -= 1;
        let cases = cases?;

        self.require_token(&TokenKind::RBrace)?;

        let span = self.span_from(start);
        Ok(Statement::Switch(SwitchStatement {
            discriminant,
            cases: cases.into(),
            span,
        }))
    }

    fn parse_switch_cases(&mut self) -> Result<Vec<SwitchCase>, JsError> {
        let mut cases = vec![];
        let mut seen_default = false;

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let case_start = self.current.span;
            let test = if self.match_token(&TokenKind::Case) {
                Some(Rc::new(self.parse_expression()?))
            } else {
                self.require_token(&TokenKind::Default)?;
                if seen_default {
                    return Err(self.error("More than one default clause in switch statement"));
                }
                seen_default = true;
                None
            };

            self.require_token(&TokenKind::Colon)?;

            let mut consequent = vec![];
            while !self.check(&TokenKind::Case)
                && !self.check(&TokenKind::Default)
                && !self.check(&TokenKind::RBrace)
                && !self.is_at_end()
            {
                consequent.push(Rc::new(self.parse_statement()?));
            }

            let span = self.span_from(case_start);
            cases.push(SwitchCase {
                test,
                consequent: consequent.into(),
                span,
            });
        }

        Ok(cases)
    }

    fn parse_try_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Try)?;
        let block = self.parse_block_body()?;

        let handler = if self.check(&TokenKind::Catch) {
            let catch_start = self.current.span;
            self.advance();
            self.require_token(&TokenKind::LParen)?;
            let param = self.parse_binding_identifier()?.name;
            self.require_token(&TokenKind::RParen)?;
            let body = self.parse_block_body()?;
            let span = self.span_from(catch_start);
            Some(CatchClause { param, body, span })
        } else {
            None
        };

        let finalizer = if self.match_token(&TokenKind::Finally) {
            Some(self.parse_block_body()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(self.error("Missing catch or finally after try"));
        }

        let span = self.span_from(start);
        Ok(Statement::Try(TryStatement {
            block,
            handler,
            finalizer,
            span,
        }))
    }

    fn parse_return_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        if !self.scope.in_function {
            return Err(self.error("Illegal return statement"));
        }
        self.require_token(&TokenKind::Return)?;

        let argument = if self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.is_at_end()
            || self.lexer.had_newline_before()
        {
            None
        } else {
            Some(Rc::new(self.parse_expression()?))
        };

        self.expect_semicolon()?;

        let span = self.span_from(start);
        Ok(Statement::Return(ReturnStatement { argument, span }))
    }

    /// Optional label after `break`/`continue` (no line break allowed before it)
    fn parse_jump_label(&mut self) -> Result<Option<JsString>, JsError> {
        if self.check_identifier() && !self.lexer.had_newline_before() {
            Ok(Some(self.parse_identifier()?.name))
        } else {
            Ok(None)
        }
    }

    fn parse_break_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Break)?;

        let label = self.parse_jump_label()?;
        match &label {
            Some(name) if !self.scope.labels.iter().any(|(l, _)| l == name) => {
                return Err(self.error(&format!("Undefined label '{name}'")));
            }
            None if self.scope.breakable == 0 => {
                return Err(self.error("Illegal break statement"));
            }
            _ => {}
        }

        self.expect_semicolon()?;

        let span = self.span_from(start);
        Ok(Statement::Break(BreakStatement { label, span }))
    }

    fn parse_continue_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Continue)?;

        if self.scope.iteration == 0 {
            return Err(self.error("Illegal continue statement"));
        }
        let label = self.parse_jump_label()?;
        if let Some(name) = &label
            && !self.scope.labels.iter().any(|(l, is_loop)| l == name && *is_loop)
        {
            return Err(self.error(&format!("Undefined loop label '{name}'")));
        }

        self.expect_semicolon()?;

        let span = self.span_from(start);
        Ok(Statement::Continue(ContinueStatement { label, span }))
    }

    fn parse_throw_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Throw)?;

        if self.lexer.had_newline_before() {
            return Err(self.error("Illegal newline after throw"));
        }

        let argument = Rc::new(self.parse_expression()?);
        self.expect_semicolon()?;

        let span = self.span_from(start);
        Ok(Statement::Throw(ThrowStatement { argument, span }))
    }

    fn parse_with_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        if self.strict {
            return Err(self.error("Strict mode code may not include a with statement"));
        }
        self.require_token(&TokenKind::With)?;
        self.require_token(&TokenKind::LParen)?;
        let object = Rc::new(self.parse_expression()?);
        self.require_token(&TokenKind::RParen)?;
        let body = Rc::new(self.parse_statement()?);

        let span = self.span_from(start);
        Ok(Statement::With(WithStatement { object, body, span }))
    }

    /// `a: b: statement`. Consecutive labels all apply to the statement they
    /// prefix, so a loop under several labels answers `continue` to any of them.
    fn parse_labeled_statement(&mut self) -> Result<Statement, JsError> {
        let mut labels: Vec<(JsString, Span)> = Vec::new();
        while self.check_identifier() && self.peek_is(&TokenKind::Colon) {
            let start = self.current.span;
            let label = self.parse_identifier()?.name;
            if self.scope.labels.iter().any(|(l, _)| *l == label)
                || labels.iter().any(|(l, _)| *l == label)
            {
                return Err(self.error(&format!("Label '{label}' has already been declared")));
            }
            self.require_token(&TokenKind::Colon)?;
            labels.push((label, start));
        }

        let is_loop = matches!(
            self.current.kind,
            TokenKind::For | TokenKind::While | TokenKind::Do
        );
        let depth = self.scope.labels.len();
        self.scope
            .labels
            .extend(labels.iter().map(|(l, _)| (l.cheap_clone(), is_loop)));

        let names: Vec<JsString> = labels.iter().map(|(l, _)| l.cheap_clone()).collect();
        let body = match self.current.kind {
            TokenKind::For => self.parse_for_statement(names),
            TokenKind::While => self.parse_while_statement(names),
            TokenKind::Do => self.parse_do_while_statement(names),
            _ => self.parse_statement(),
        };
        self.scope.labels.truncate(depth);
        let mut statement = body?;

        for (label, start) in labels.into_iter().rev() {
            let span = self.span_from(start);
            statement = Statement::Labeled(LabeledStatement {
                label,
                body: Rc::new(statement),
                span,
            });
        }
        Ok(statement)
    }

    // ============ FUNCTIONS ============

    /// `function name?(params) { body }`
    fn parse_function(&mut self, declaration: bool) -> Result<Rc<FunctionLiteral>, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Function)?;

        let id = if self.check_identifier() {
            Some(self.parse_identifier()?)
        } else if declaration {
            return Err(self.unexpected_token("function name"));
        } else {
            None
        };

        self.parse_function_rest(start, id)
    }

    fn parse_function_rest(
        &mut self,
        start: Span,
        id: Option<Identifier>,
    ) -> Result<Rc<FunctionLiteral>, JsError> {
        self.require_token(&TokenKind::LParen)?;
        let mut params: Vec<Identifier> = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.parse_identifier()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.require_token(&TokenKind::RParen)?;
        self.require_token(&TokenKind::LBrace)?;

        let outer_scope = std::mem::replace(&mut self.scope, FunctionScope::function());
        let outer_strict = self.strict;
        let outer_no_in = std::mem::replace(&mut self.no_in, false);

        let body = self.parse_source_elements();
        let strict = self.strict;
        let scope = std::mem::replace(&mut self.scope, outer_scope);
        self.strict = outer_strict;
        self.no_in = outer_no_in;

        let body = body?;
        self.require_token(&TokenKind::RBrace)?;

        if strict {
            self.check_strict_parameters(id.as_ref(), &params)?;
        }

        let span = self.span_from(start);
        let source: Rc<str> = Rc::from(self.lexer.source().get(span.start..span.end).unwrap_or(""));
        Ok(Rc::new(FunctionLiteral {
            id,
            params: params.into_iter().map(|p| p.name).collect(),
            body: body.into(),
            strict,
            declarations: scope.finish(),
            source,
            span,
        }))
    }

    fn check_strict_parameters(
        &self,
        id: Option<&Identifier>,
        params: &[Identifier],
    ) -> Result<(), JsError> {
        if let Some(id) = id {
            self.validate_strict_binding(id)?;
        }
        let mut seen = FxHashSet::default();
        for param in params {
            self.validate_strict_binding(param)?;
            if !seen.insert(param.name.as_str()) {
                return Err(JsError::syntax_error(
                    format!("Duplicate parameter name '{}' not allowed in strict mode", param.name),
                    param.span.line,
                    param.span.column,
                ));
            }
        }
        Ok(())
    }

    fn validate_strict_binding(&self, id: &Identifier) -> Result<(), JsError> {
        let name = id.name.as_str();
        if name == "eval" || name == "arguments" || STRICT_RESERVED.contains(&name) {
            return Err(JsError::syntax_error(
                format!("Unexpected '{name}' as a binding name in strict mode"),
                id.span.line,
                id.span.column,
            ));
        }
        Ok(())
    }

    // ============ EXPRESSIONS ============

    fn parse_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let expr = self.parse_assignment_expression()?;

        if !self.check(&TokenKind::Comma) {
            return Ok(expr);
        }

        let mut expressions = vec![Rc::new(expr)];
        while self.match_token(&TokenKind::Comma) {
            expressions.push(Rc::new(self.parse_assignment_expression()?));
        }
        let span = self.span_from(start);
        Ok(Expression::Sequence(SequenceExpression { expressions, span }))
    }

    /// Parse with `in` treated as the for-in separator, not an operator
    fn without_in<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, JsError>) -> Result<T, JsError> {
        let saved = std::mem::replace(&mut self.no_in, true);
        let result = parse(self);
        self.no_in = saved;
        result
    }

    /// Parse a bracketed sub-expression, where `in` is an operator again
    fn with_in<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, JsError>) -> Result<T, JsError> {
        let saved = std::mem::replace(&mut self.no_in, false);
        let result = parse(self);
        self.no_in = saved;
        result
    }

    fn parse_assignment_expression(&mut self) -> Result<Expression, JsError> {
        self.nested(Self::parse_assignment_expression_inner)
    }

    fn parse_assignment_expression_inner(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let expr = self.parse_conditional_expression()?;

        if let Some(operator) = self.current_assignment_op() {
            self.check_strict_target(&expr)?;
            self.advance();
            let right = Rc::new(self.parse_assignment_expression()?);
            let span = self.span_from(start);
            return Ok(Expression::Assignment(AssignmentExpression {
                operator,
                left: Rc::new(expr),
                right,
                span,
            }));
        }

        Ok(expr)
    }

    /// `eval` and `arguments` cannot be assigned in strict code
    fn check_strict_target(&self, target: &Expression) -> Result<(), JsError> {
        if let Expression::Identifier(id) = target
            && self.strict
            && (id.name.as_str() == "eval" || id.name.as_str() == "arguments")
        {
            return Err(JsError::syntax_error(
                format!("Unexpected '{}' as assignment target in strict mode", id.name),
                id.span.line,
                id.span.column,
            ));
        }
        Ok(())
    }

    fn parse_conditional_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let test = self.parse_binary_expression(0)?;

        if self.match_token(&TokenKind::Question) {
            let consequent = Rc::new(self.with_in(Self::parse_assignment_expression)?);
            self.require_token(&TokenKind::Colon)?;
            let alternate = Rc::new(self.parse_assignment_expression()?);
            let span = self.span_from(start);
            return Ok(Expression::Conditional(ConditionalExpression {
                test: Rc::new(test),
                consequent,
                alternate,
                span,
            }));
        }

        Ok(test)
    }

    /// Precedence climbing over binary and logical operators. Operators of
    /// equal precedence are folded in the loop, so long left-associative
    /// chains do not deepen the native stack.
    fn parse_binary_expression(&mut self, min_prec: u8) -> Result<Expression, JsError> {
        let start = self.current.span;
        let mut left = self.parse_unary_expression()?;

        while let Some((op, prec)) = self.current_binary_op() {
            if prec < min_prec {
                break;
            }
            self.advance();

            let right = Rc::new(self.parse_binary_expression(prec + 1)?);
            let left_node = Rc::new(left);
            let span = self.span_from(start);
            left = match op {
                Operator::Logical(operator) => Expression::Logical(LogicalExpression {
                    operator,
                    left: left_node,
                    right,
                    span,
                }),
                Operator::Binary(operator) => Expression::Binary(BinaryExpression {
                    operator,
                    left: left_node,
                    right,
                    span,
                }),
            };
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;

        if let Some(operator) = self.current_unary_op() {
            self.advance();
            let argument = Rc::new(self.nested(Self::parse_unary_expression)?);

            if operator == UnaryOp::Delete
                && self.strict
                && let Expression::Identifier(id) = argument.as_ref()
            {
                return Err(JsError::syntax_error(
                    format!("Delete of an unqualified identifier '{}' in strict mode", id.name),
                    id.span.line,
                    id.span.column,
                ));
            }

            let span = self.span_from(start);
            return Ok(Expression::Unary(UnaryExpression {
                operator,
                argument,
                span,
            }));
        }

        if let Some(operator) = self.current_update_op() {
            self.advance();
            let argument = self.nested(Self::parse_unary_expression)?;
            self.check_strict_target(&argument)?;
            let span = self.span_from(start);
            return Ok(Expression::Update(UpdateExpression {
                operator,
                argument: Rc::new(argument),
                prefix: true,
                span,
            }));
        }

        self.parse_postfix_expression()
    }

    fn parse_postfix_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let expr = self.parse_left_hand_side_expression()?;

        if !self.lexer.had_newline_before()
            && let Some(operator) = self.current_update_op()
        {
            self.check_strict_target(&expr)?;
            self.advance();
            let span = self.span_from(start);
            return Ok(Expression::Update(UpdateExpression {
                operator,
                argument: Rc::new(expr),
                prefix: false,
                span,
            }));
        }

        Ok(expr)
    }

    fn parse_left_hand_side_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };

        loop {
            expr = match self.current.kind {
                TokenKind::Dot | TokenKind::LBracket => self.parse_member_suffix(start, expr)?,
                TokenKind::LParen => {
                    let arguments = self.parse_arguments()?;
                    let span = self.span_from(start);
                    Expression::Call(CallExpression {
                        callee: Rc::new(expr),
                        arguments,
                        span,
                    })
                }
                _ => return Ok(expr),
            };
        }
    }

    /// `new callee(args)`; the argument list is optional
    fn parse_new_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::New)?;

        let mut callee = if self.check(&TokenKind::New) {
            self.nested(Self::parse_new_expression)?
        } else {
            self.parse_primary_expression()?
        };
        while matches!(self.current.kind, TokenKind::Dot | TokenKind::LBracket) {
            callee = self.parse_member_suffix(start, callee)?;
        }

        let arguments = if self.check(&TokenKind::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };

        let span = self.span_from(start);
        Ok(Expression::New(NewExpression {
            callee: Rc::new(callee),
            arguments,
            span,
        }))
    }

    /// `.name` or `[expr]` applied to `object`
    fn parse_member_suffix(&mut self, start: Span, object: Expression) -> Result<Expression, JsError> {
        let property = if self.match_token(&TokenKind::Dot) {
            MemberProperty::Identifier(self.parse_identifier_name()?)
        } else {
            self.require_token(&TokenKind::LBracket)?;
            let key = self.with_in(Self::parse_expression)?;
            self.require_token(&TokenKind::RBracket)?;
            MemberProperty::Computed(Rc::new(key))
        };

        let span = self.span_from(start);
        Ok(Expression::Member(MemberExpression {
            object: Rc::new(object),
            property,
            span,
        }))
    }

    fn parse_arguments(&mut self) -> Result<Vec<Rc<Expression>>, JsError> {
        self.require_token(&TokenKind::LParen)?;
        let mut arguments = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                arguments.push(Rc::new(self.with_in(Self::parse_assignment_expression)?));
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.require_token(&TokenKind::RParen)?;
        Ok(arguments)
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;

        let literal = match &self.current.kind {
            TokenKind::Number(n) => Some(LiteralValue::Number(*n)),
            TokenKind::String(s) => Some(LiteralValue::String(s.cheap_clone())),
            TokenKind::True => Some(LiteralValue::Boolean(true)),
            TokenKind::False => Some(LiteralValue::Boolean(false)),
            TokenKind::Null => Some(LiteralValue::Null),
            _ => None,
        };
        if let Some(value) = literal {
            self.advance();
            return Ok(Expression::Literal(Literal { value, span: start }));
        }

        match &self.current.kind {
            TokenKind::Identifier(_) => Ok(Expression::Identifier(self.parse_identifier()?)),
            TokenKind::This => {
                self.advance();
                Ok(Expression::This(start))
            }
            TokenKind::Function => Ok(Expression::Function(self.parse_function(false)?)),
            TokenKind::LParen => {
                self.advance();
                let expr = self.with_in(Self::parse_expression)?;
                self.require_token(&TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => self.with_in(Self::parse_array_literal),
            TokenKind::LBrace => self.with_in(Self::parse_object_literal),
            TokenKind::Slash | TokenKind::SlashEq => {
                Err(self.error("Regular expression literals are not supported"))
            }
            TokenKind::Invalid(message) => Err(self.error(message)),
            _ => Err(self.unexpected_token("expression")),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBracket)?;

        let mut elements = Vec::new();
        loop {
            if self.match_token(&TokenKind::RBracket) {
                break;
            }
            if self.match_token(&TokenKind::Comma) {
                elements.push(None);
                continue;
            }
            elements.push(Some(Rc::new(self.parse_assignment_expression()?)));
            if !self.check(&TokenKind::RBracket) {
                self.require_token(&TokenKind::Comma)?;
            }
        }

        let span = self.span_from(start);
        Ok(Expression::Array(ArrayExpression { elements, span }))
    }

    fn parse_object_literal(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;

        let mut properties = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            properties.push(self.parse_property()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.require_token(&TokenKind::RBrace)?;

        let span = self.span_from(start);
        Ok(Expression::Object(ObjectExpression { properties, span }))
    }

    fn parse_property(&mut self) -> Result<Property, JsError> {
        let start = self.current.span;

        let accessor = match &self.current.kind {
            TokenKind::Identifier(name) if name.as_str() == "get" => Some(PropertyKind::Get),
            TokenKind::Identifier(name) if name.as_str() == "set" => Some(PropertyKind::Set),
            _ => None,
        };

        let key = self.parse_property_name()?;
        if let Some(kind) = accessor
            && !self.check(&TokenKind::Colon)
        {
            let key = self.parse_property_name()?;
            let function = self.parse_function_rest(start, None)?;
            let expected = if kind == PropertyKind::Get { 0 } else { 1 };
            if function.params.len() != expected {
                return Err(JsError::syntax_error(
                    if kind == PropertyKind::Get {
                        "Getter must not have any formal parameters"
                    } else {
                        "Setter must have exactly one formal parameter"
                    },
                    start.line,
                    start.column,
                ));
            }
            let span = self.span_from(start);
            return Ok(Property {
                key,
                value: Rc::new(Expression::Function(function)),
                kind,
                span,
            });
        }

        self.require_token(&TokenKind::Colon)?;
        let value = Rc::new(self.parse_assignment_expression()?);
        let span = self.span_from(start);
        Ok(Property {
            key,
            value,
            kind: PropertyKind::Init,
            span,
        })
    }

    /// Identifier name, string or number used as an object literal key
    fn parse_property_name(&mut self) -> Result<JsString, JsError> {
        let key = match &self.current.kind {
            TokenKind::String(s) => s.cheap_clone(),
            TokenKind::Number(n) => {
                let text = number_to_string(*n);
                self.intern(&text)
            }
            _ => return Ok(self.parse_identifier_name()?.name),
        };
        self.advance();
        Ok(key)
    }

    // ============ TOKENS ============

    fn parse_identifier(&mut self) -> Result<Identifier, JsError> {
        let span = self.current.span;
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.cheap_clone();
                self.advance();
                Ok(Identifier { name, span })
            }
            TokenKind::Reserved(word) => {
                Err(self.error(&format!("Unexpected reserved word '{word}'")))
            }
            TokenKind::Invalid(message) => Err(self.error(message)),
            _ => Err(self.unexpected_token("identifier")),
        }
    }

    fn parse_binding_identifier(&mut self) -> Result<Identifier, JsError> {
        let id = self.parse_identifier()?;
        if self.strict {
            self.validate_strict_binding(&id)?;
        }
        Ok(id)
    }

    /// Any identifier name, including keywords (`o.default`, `{ if: 1 }`)
    fn parse_identifier_name(&mut self) -> Result<Identifier, JsError> {
        let span = self.current.span;
        let name = match &self.current.kind {
            TokenKind::Identifier(name) | TokenKind::Reserved(name) => name.cheap_clone(),
            kind => match kind.keyword_name() {
                Some(word) => self.intern(word),
                None => return Err(self.unexpected_token("property name")),
            },
        };
        self.advance();
        Ok(Identifier { name, span })
    }

    fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.lexer.next_token());
    }

    fn require_token(&mut self, kind: &TokenKind) -> Result<(), JsError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected_token(&describe(kind)))
        }
    }

    fn expect_semicolon(&mut self) -> Result<(), JsError> {
        if self.match_token(&TokenKind::Semicolon) {
            return Ok(());
        }

        // ASI: accept if at end, before }, or after newline
        if self.is_at_end() || self.check(&TokenKind::RBrace) || self.lexer.had_newline_before() {
            return Ok(());
        }

        Err(self.unexpected_token("';'"))
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    /// Check if the next token (after current) is of the given kind
    fn peek_is(&mut self, kind: &TokenKind) -> bool {
        let checkpoint = self.lexer.checkpoint();
        let next = self.lexer.next_token();
        self.lexer.restore(checkpoint);
        std::mem::discriminant(&next.kind) == std::mem::discriminant(kind)
    }

    fn check_identifier(&self) -> bool {
        matches!(self.current.kind, TokenKind::Identifier(_))
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.current.kind == TokenKind::Eof
    }

    fn span_from(&self, start: Span) -> Span {
        Span::new(
            start.start,
            self.previous.span.end,
            start.line,
            start.column,
        )
    }

    fn error(&self, message: &str) -> JsError {
        JsError::syntax_error(message, self.current.span.line, self.current.span.column)
    }

    fn unexpected_token(&self, expected: &str) -> JsError {
        let found = match &self.current.kind {
            TokenKind::Invalid(message) => return self.error(message),
            TokenKind::Eof => "end of input".to_string(),
            kind => describe(kind),
        };
        JsError::syntax_error(
            format!("Unexpected {found}, expected {expected}"),
            self.current.span.line,
            self.current.span.column,
        )
    }

    fn current_binary_op(&self) -> Option<(Operator, u8)> {
        let op = match &self.current.kind {
            TokenKind::PipePipe => (Operator::Logical(LogicalOp::Or), 1),
            TokenKind::AmpAmp => (Operator::Logical(LogicalOp::And), 2),
            TokenKind::Pipe => (Operator::Binary(BinaryOp::BitOr), 3),
            TokenKind::Caret => (Operator::Binary(BinaryOp::BitXor), 4),
            TokenKind::Amp => (Operator::Binary(BinaryOp::BitAnd), 5),
            TokenKind::EqEq => (Operator::Binary(BinaryOp::Eq), 6),
            TokenKind::BangEq => (Operator::Binary(BinaryOp::NotEq), 6),
            TokenKind::EqEqEq => (Operator::Binary(BinaryOp::StrictEq), 6),
            TokenKind::BangEqEq => (Operator::Binary(BinaryOp::StrictNotEq), 6),
            TokenKind::Lt => (Operator::Binary(BinaryOp::Lt), 7),
            TokenKind::LtEq => (Operator::Binary(BinaryOp::LtEq), 7),
            TokenKind::Gt => (Operator::Binary(BinaryOp::Gt), 7),
            TokenKind::GtEq => (Operator::Binary(BinaryOp::GtEq), 7),
            TokenKind::Instanceof => (Operator::Binary(BinaryOp::Instanceof), 7),
            TokenKind::In if !self.no_in => (Operator::Binary(BinaryOp::In), 7),
            TokenKind::LtLt => (Operator::Binary(BinaryOp::LShift), 8),
            TokenKind::GtGt => (Operator::Binary(BinaryOp::RShift), 8),
            TokenKind::GtGtGt => (Operator::Binary(BinaryOp::URShift), 8),
            TokenKind::Plus => (Operator::Binary(BinaryOp::Add), 9),
            TokenKind::Minus => (Operator::Binary(BinaryOp::Sub), 9),
            TokenKind::Star => (Operator::Binary(BinaryOp::Mul), 10),
            TokenKind::Slash => (Operator::Binary(BinaryOp::Div), 10),
            TokenKind::Percent => (Operator::Binary(BinaryOp::Mod), 10),
            _ => return None,
        };
        Some(op)
    }

    fn current_unary_op(&self) -> Option<UnaryOp> {
        match &self.current.kind {
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        }
    }

    fn current_update_op(&self) -> Option<UpdateOp> {
        match &self.current.kind {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        }
    }

    fn current_assignment_op(&self) -> Option<AssignmentOp> {
        match &self.current.kind {
            TokenKind::Eq => Some(AssignmentOp::Assign),
            TokenKind::PlusEq => Some(AssignmentOp::AddAssign),
            TokenKind::MinusEq => Some(AssignmentOp::SubAssign),
            TokenKind::StarEq => Some(AssignmentOp::MulAssign),
            TokenKind::SlashEq => Some(AssignmentOp::DivAssign),
            TokenKind::PercentEq => Some(AssignmentOp::ModAssign),
            TokenKind::AmpEq => Some(AssignmentOp::BitAndAssign),
            TokenKind::PipeEq => Some(AssignmentOp::BitOrAssign),
            TokenKind::CaretEq => Some(AssignmentOp::BitXorAssign),
            TokenKind::LtLtEq => Some(AssignmentOp::LShiftAssign),
            TokenKind::GtGtEq => Some(AssignmentOp::RShiftAssign),
            TokenKind::GtGtGtEq => Some(AssignmentOp::URShiftAssign),
            _ => None,
        }
    }
}

#[derive(Clone, Copy)]
enum Operator {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

/// The string of a directive prologue entry (`"use strict";`)
fn directive(statement: &Statement) -> Option<&JsString> {
    match statement {
        Statement::Expression(ExpressionStatement { expression, .. }) => match expression.as_ref() {
            Expression::Literal(Literal {
                value: LiteralValue::String(text),
                ..
            }) => Some(text),
            _ => None,
        },
        _ => None,
    }
}

fn describe(kind: &TokenKind) -> String {
    let text = match kind {
        TokenKind::Number(n) => return format!("number {}", number_to_string(*n)),
        TokenKind::String(s) => return format!("string {s:?}"),
        TokenKind::Identifier(name) | TokenKind::Reserved(name) => {
            return format!("identifier '{name}'");
        }
        TokenKind::Invalid(message) => return message.clone(),
        TokenKind::Eof => "end of input",
        TokenKind::Plus => "'+'",
        TokenKind::Minus => "'-'",
        TokenKind::Star => "'*'",
        TokenKind::Slash => "'/'",
        TokenKind::Percent => "'%'",
        TokenKind::PlusPlus => "'++'",
        TokenKind::MinusMinus => "'--'",
        TokenKind::Eq => "'='",
        TokenKind::Lt => "'<'",
        TokenKind::Gt => "'>'",
        TokenKind::Bang => "'!'",
        TokenKind::Question => "'?'",
        TokenKind::LParen => "'('",
        TokenKind::RParen => "')'",
        TokenKind::LBrace => "'{'",
        TokenKind::RBrace => "'}'",
        TokenKind::LBracket => "'['",
        TokenKind::RBracket => "']'",
        TokenKind::Dot => "'.'",
        TokenKind::Comma => "','",
        TokenKind::Colon => "':'",
        TokenKind::Semicolon => "';'",
        other => match other.keyword_name() {
            Some(word) => return format!("'{word}'"),
            None => return format!("{other:?}"),
        },
    };
    text.to_string()
}
