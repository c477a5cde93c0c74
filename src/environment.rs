use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use indexmap::IndexMap;

use crate::{diagnostics::Diagnostic, value::Value};

pub type EnvironmentRef = Rc<RefCell<Environment>>;

/// One frame of bindings.
///
/// A frame never owns its parent: the link is weak and only ever points at a
/// frame further up the call stack (or the root), so frames cannot form
/// cycles through the values they hold.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    parent: Option<Weak<RefCell<Environment>>>,
    bindings: IndexMap<String, Value>,
}

impl Environment {
    /// A root frame with no parent.
    pub fn new() -> EnvironmentRef {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Turns an owned frame into a live one whose parent is `parent`.
    pub fn attach(mut frame: Environment, parent: &EnvironmentRef) -> EnvironmentRef {
        frame.parent = Some(Rc::downgrade(parent));
        Rc::new(RefCell::new(frame))
    }

    /// Binds `name` in this frame, replacing any existing binding here.
    pub fn put(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    fn parent(&self) -> Option<EnvironmentRef> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Looks `name` up from `env` outward and returns a copy of the binding,
    /// or an unbound-symbol error.
    pub fn get(env: &EnvironmentRef, name: &str) -> Value {
        if let Some(value) = env.borrow().bindings.get(name) {
            return value.clone();
        }
        let parent = env.borrow().parent();
        match parent {
            Some(parent) => Environment::get(&parent, name),
            None => Value::error(Diagnostic::unbound(name)),
        }
    }

    /// The outermost frame reachable from `env`.
    pub fn root(env: &EnvironmentRef) -> EnvironmentRef {
        let mut current = Rc::clone(env);
        loop {
            let parent = current.borrow().parent();
            match parent {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    /// Binds `name` in the outermost frame reachable from `env`.
    pub fn def(env: &EnvironmentRef, name: impl Into<String>, value: Value) {
        Environment::root(env).borrow_mut().put(name, value);
    }
}
