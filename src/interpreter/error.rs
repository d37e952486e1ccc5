use thiserror::Error;

/// Typed errors produced by the tree-walking interpreter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InterpreterError {
    #[error("No entry point: expected a shared, non-private method 'start()' with no parameters")]
    NoEntryPoint,
    #[error("Duplicate class definition '{name}'")]
    DuplicateClass { name: String },
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("Undefined class '{name}'")]
    UndefinedClass { name: String },
    #[error("Unknown method '{method}' for class {class}")]
    MethodNotFound { method: String, class: String },
    #[error("Method '{method}' expected {expected} arguments, got {found}")]
    ParameterCountMismatch {
        method: String,
        expected: usize,
        found: usize,
    },
    #[error("No overload of method '{method}' accepts the given argument types")]
    ArgumentTypeMismatch { method: String },
    #[error("No constructor of class {class} accepts {found} arguments")]
    ConstructorNotFound { class: String, found: usize },
    #[error("Method '{method}' finished without a value for return variable '{name}'")]
    MissingReturnVariable { method: String, name: String },
    #[error("Method '{method}' returns {expected} values, but {found} targets were given")]
    ReturnCountMismatch {
        method: String,
        expected: usize,
        found: usize,
    },
    #[error("Operation '{operation}' is not supported between {left} and {right}")]
    TypeMismatch {
        operation: String,
        left: String,
        right: String,
    },
    #[error("Condition must be a boolean, got {type_name}")]
    ConditionNotBoolean { type_name: String },
    #[error("Variable '{name}' holds {type_name}, not an object")]
    NotAnObject { name: String, type_name: String },
    #[error("Cannot loop over {type_name}: expected an iterator object or a boolean condition")]
    NotIterable { type_name: String },
    #[error("Iterator {class} broke the getNext protocol: {reason}")]
    InvalidIterator { class: String, reason: String },
    #[error("Method '{method}' has no return value to use in an expression")]
    MissingReturnValue { method: String },
}
