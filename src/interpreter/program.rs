use std::collections::HashSet;
use std::rc::Rc;

use crate::ast::{Class, MethodDecl, Program};
use crate::builtins::console_class;

use super::InterpreterError;

/// Immutable view of every class a program can reach: user classes in
/// source order followed by the built-in console class.
#[derive(Debug)]
pub struct ProgramContext {
    classes: Vec<Rc<Class>>,
}

impl ProgramContext {
    pub fn new(program: &Program) -> Result<Self, InterpreterError> {
        let mut seen = HashSet::new();
        let mut classes = Vec::with_capacity(program.classes.len() + 1);
        for class in program.classes.iter().cloned().chain([console_class()]) {
            if !seen.insert(class.name.clone()) {
                return Err(InterpreterError::DuplicateClass { name: class.name });
            }
            classes.push(Rc::new(class));
        }
        Ok(Self { classes })
    }

    pub fn find_class(&self, name: &str) -> Option<&Rc<Class>> {
        self.classes.iter().find(|class| class.name == name)
    }

    /// First shared, non-private `start()` with no parameters, in class order.
    pub fn entry_point(&self) -> Option<(&Rc<Class>, &MethodDecl)> {
        self.classes.iter().find_map(|class| {
            class
                .methods
                .iter()
                .find(|method| {
                    method.name == "start"
                        && method.is_shared
                        && !method.is_private
                        && method.params.is_empty()
                })
                .map(|method| (class, method))
        })
    }

    pub fn classes(&self) -> &[Rc<Class>] {
        &self.classes
    }
}
