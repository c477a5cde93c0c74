use std::{cell::RefCell, io, io::Write, rc::Rc};

use lispy::runtime::Interpreter;
use pretty_assertions::assert_eq;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn with_prelude() -> Interpreter {
    let interpreter = Interpreter::new();
    assert_eq!(interpreter.load_prelude().to_string(), "()");
    interpreter
}

fn render(interpreter: &Interpreter, source: &str) -> String {
    interpreter.eval_line(source).to_string()
}

#[test]
fn prelude_loads_without_errors() {
    let output = SharedBuffer::default();
    let interpreter = Interpreter::new().with_output(output.clone());
    assert_eq!(interpreter.load_prelude().to_string(), "()");
    assert!(output.0.borrow().is_empty(), "prelude reported errors");
    assert_eq!(render(&interpreter, "nil"), "{}");
    assert_eq!(render(&interpreter, "true"), "1");
}

#[test]
fn fun_defines_named_functions() {
    let lispy = with_prelude();
    assert_eq!(render(&lispy, "fun {add-together x y} {+ x y}"), "()");
    assert_eq!(render(&lispy, "add-together 1 2"), "3");
}

#[test]
fn list_helpers() {
    let lispy = with_prelude();
    assert_eq!(render(&lispy, "len {1 2 3}"), "3");
    assert_eq!(render(&lispy, "len nil"), "0");
    assert_eq!(render(&lispy, "nth 1 {5 6 7}"), "6");
    assert_eq!(render(&lispy, "last {5 6 7}"), "7");
    assert_eq!(render(&lispy, "fst {5 6 7}"), "5");
    assert_eq!(render(&lispy, "snd {5 6 7}"), "6");
    assert_eq!(render(&lispy, "trd {5 6 7}"), "7");
    assert_eq!(render(&lispy, "take 2 {1 2 3}"), "{1 2}");
    assert_eq!(render(&lispy, "drop 2 {1 2 3}"), "{3}");
    assert_eq!(render(&lispy, "split 1 {1 2 3}"), "{{1} {2 3}}");
    assert_eq!(render(&lispy, "elem 2 {1 2 3}"), "1");
    assert_eq!(render(&lispy, "elem 9 {1 2 3}"), "0");
    assert_eq!(render(&lispy, "reverse {1 2 3}"), "{3 2 1}");
}

#[test]
fn higher_order_helpers() {
    let lispy = with_prelude();
    assert_eq!(render(&lispy, "map (\\ {x} {* x 2}) {1 2 3}"), "{2 4 6}");
    assert_eq!(render(&lispy, "map - {5 6 7}"), "{-5 -6 -7}");
    assert_eq!(render(&lispy, "filter (\\ {x} {> x 1}) {1 2 3}"), "{2 3}");
    assert_eq!(render(&lispy, "foldl + 0 {1 2 3}"), "6");
    assert_eq!(render(&lispy, "sum {1 2 3 4}"), "10");
    assert_eq!(render(&lispy, "product {1 2 3 4}"), "24");
    assert_eq!(render(&lispy, "flip - 1 10"), "9");
    assert_eq!(
        render(&lispy, "comp (\\ {x} {* x 2}) (\\ {x} {+ x 1}) 3"),
        "8"
    );
}

#[test]
fn curry_and_uncurry() {
    let lispy = with_prelude();
    assert_eq!(render(&lispy, "curry + {5 6 7}"), "18");
    assert_eq!(render(&lispy, "unpack * {2 3}"), "6");
    assert_eq!(render(&lispy, "uncurry head 5 6 7"), "{5}");
}

#[test]
fn logic_helpers() {
    let lispy = with_prelude();
    assert_eq!(render(&lispy, "not 0"), "1");
    assert_eq!(render(&lispy, "and 1 0"), "0");
    assert_eq!(render(&lispy, "or 0 1"), "1");
}

#[test]
fn let_opens_a_scope() {
    let lispy = with_prelude();
    assert_eq!(render(&lispy, "let {do (= {x} 100) (x)}"), "100");
    assert_eq!(render(&lispy, "x"), "Error: Unbound symbol 'x'");
}

#[test]
fn select_and_case() {
    let lispy = with_prelude();
    render(
        &lispy,
        "fun {suffix i} {select {(== i 1) \"st\"} {(== i 2) \"nd\"} {otherwise \"th\"}}",
    );
    assert_eq!(render(&lispy, "suffix 1"), "\"st\"");
    assert_eq!(render(&lispy, "suffix 2"), "\"nd\"");
    assert_eq!(render(&lispy, "suffix 5"), "\"th\"");
    assert_eq!(render(&lispy, "case 2 {1 \"one\"} {2 \"two\"}"), "\"two\"");
    assert_eq!(render(&lispy, "case 3 {1 \"one\"}"), "Error: No Case Found");
}

#[test]
fn recursive_fibonacci() {
    let lispy = with_prelude();
    assert_eq!(render(&lispy, "fib 10"), "55");
}
