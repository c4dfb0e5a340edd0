//! `console.*` routed through a host provider

use std::cell::RefCell;
use std::rc::Rc;

use esrun::platform::{ConsoleLevel, ConsoleProvider, FixedTimeProvider};
use esrun::{Runtime, Settings};

#[derive(Default)]
struct Capture {
    lines: RefCell<Vec<(ConsoleLevel, String)>>,
}

impl ConsoleProvider for Capture {
    fn write(&self, level: ConsoleLevel, message: &str) {
        self.lines.borrow_mut().push((level, message.to_string()));
    }
}

fn run(source: &str) -> Vec<(ConsoleLevel, String)> {
    let capture = Rc::new(Capture::default());
    let provider: Rc<dyn ConsoleProvider> = capture.clone();
    let mut runtime = Runtime::with_providers(Settings::default(), Rc::new(FixedTimeProvider::new(0.0)), provider);
    runtime.eval_value(source).unwrap();
    capture.lines.take()
}

#[test]
fn test_log_joins_arguments() {
    let lines = run("console.log('a', 1, true, null, undefined)");
    assert_eq!(lines, vec![(ConsoleLevel::Log, "a 1 true null undefined".to_string())]);
}

#[test]
fn test_levels() {
    let lines = run("console.info('i'); console.warn('w'); console.error('e'); console.debug('d');");
    let levels: Vec<ConsoleLevel> = lines.iter().map(|(level, _)| *level).collect();
    assert_eq!(
        levels,
        vec![ConsoleLevel::Info, ConsoleLevel::Warn, ConsoleLevel::Error, ConsoleLevel::Log]
    );
}

#[test]
fn test_objects_use_to_string() {
    let lines = run("console.log({ toString: function () { return 'custom'; } }, [1, 2])");
    assert_eq!(lines, vec![(ConsoleLevel::Log, "custom 1,2".to_string())]);
}

#[test]
fn test_output_order_follows_evaluation() {
    let lines = run("for (var i = 0; i < 3; i++) console.log(i);");
    let messages: Vec<&str> = lines.iter().map(|(_, m)| m.as_str()).collect();
    assert_eq!(messages, vec!["0", "1", "2"]);
}

#[test]
fn test_console_returns_undefined() {
    let lines = run("console.log(typeof console.log('x'))");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines.get(1).map(|(_, m)| m.as_str()), Some("undefined"));
}
