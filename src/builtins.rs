use crate::ast::{Class, MethodBody, MethodDecl};

/// Name under which the console class is registered.
pub const CONSOLE_CLASS: &str = "console";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinMethod {
    /// `console.write(...)`: renders every argument and appends one output line.
    ConsoleWrite,
}

impl BuiltinMethod {
    pub fn name(self) -> &'static str {
        match self {
            Self::ConsoleWrite => "write",
        }
    }
}

/// Built-in `console` class with its shared, variadic `write` method.
pub fn console_class() -> Class {
    let mut class = Class::new(CONSOLE_CLASS);
    class.methods.push(MethodDecl {
        name: BuiltinMethod::ConsoleWrite.name().to_string(),
        is_shared: true,
        is_private: false,
        is_variadic: true,
        params: Vec::new(),
        returns: Vec::new(),
        locals: Vec::new(),
        body: MethodBody::Builtin(BuiltinMethod::ConsoleWrite),
    });
    class
}
