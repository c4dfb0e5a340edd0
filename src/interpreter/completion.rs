//! Completion records
//!
//! Every statement evaluates to a [`Completion`]. Anything other than
//! `Normal` travels unchanged through statement lists until a loop, label,
//! `try` or function boundary absorbs it.

use crate::value::{CheapClone, JsString, JsValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Normal,
    Break,
    Continue,
    Return,
    Throw,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub kind: CompletionKind,
    /// `None` is the empty value
    pub value: Option<JsValue>,
    /// Label of a `break`/`continue`
    pub target: Option<JsString>,
}

impl Completion {
    pub fn normal(value: Option<JsValue>) -> Self {
        Self {
            kind: CompletionKind::Normal,
            value,
            target: None,
        }
    }

    pub fn empty() -> Self {
        Self::normal(None)
    }

    pub fn throw(value: JsValue) -> Self {
        Self {
            kind: CompletionKind::Throw,
            value: Some(value),
            target: None,
        }
    }

    pub fn return_value(value: JsValue) -> Self {
        Self {
            kind: CompletionKind::Return,
            value: Some(value),
            target: None,
        }
    }

    pub fn jump(kind: CompletionKind, target: Option<JsString>) -> Self {
        Self {
            kind,
            value: None,
            target,
        }
    }

    pub fn is_abrupt(&self) -> bool {
        self.kind != CompletionKind::Normal
    }

    /// Fill an empty value with `fallback` (statement list value rule)
    pub fn or_value(mut self, fallback: Option<JsValue>) -> Self {
        if self.value.is_none() {
            self.value = fallback;
        }
        self
    }

    /// `break`/`continue` aimed at a statement carrying `labels` (or unlabeled)
    pub fn targets(&self, labels: &[JsString]) -> bool {
        match &self.target {
            None => true,
            Some(target) => labels.iter().any(|l| l == target),
        }
    }

    pub fn value_or_undefined(&self) -> JsValue {
        self.value.as_ref().map(CheapClone::cheap_clone).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abrupt_keeps_own_value() {
        let c = Completion::return_value(JsValue::Number(1.0)).or_value(Some(JsValue::Number(2.0)));
        assert_eq!(c.value, Some(JsValue::Number(1.0)));
        let c = Completion::jump(CompletionKind::Break, None).or_value(Some(JsValue::Number(2.0)));
        assert_eq!(c.value, Some(JsValue::Number(2.0)));
        assert!(c.is_abrupt());
    }

    #[test]
    fn test_targets() {
        let labels = [JsString::from("outer")];
        assert!(Completion::jump(CompletionKind::Break, None).targets(&labels));
        assert!(Completion::jump(CompletionKind::Break, Some("outer".into())).targets(&labels));
        assert!(!Completion::jump(CompletionKind::Continue, Some("x".into())).targets(&labels));
    }
}
