use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::Class;

/// Shared, mutable handle to a class instance.
pub type ObjectRef = Rc<RefCell<Instance>>;

#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    pub members: HashMap<String, Value>,
}

impl Instance {
    pub fn new_ref(class: Rc<Class>, members: HashMap<String, Value>) -> ObjectRef {
        Rc::new(RefCell::new(Self { class, members }))
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    String(String),
    Character(char),
    Object(ObjectRef),
    /// Placeholder for a variable of class type; `None` until assigned.
    Reference(Option<Box<Value>>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Boolean(left), Value::Boolean(right)) => left == right,
            (Value::Number(left), Value::Number(right)) => left == right,
            (Value::String(left), Value::String(right)) => left == right,
            (Value::Character(left), Value::Character(right)) => left == right,
            (Value::Object(left), Value::Object(right)) => Rc::ptr_eq(left, right),
            (Value::Reference(left), Value::Reference(right)) => left == right,
            _ => false,
        }
    }
}

impl Value {
    /// Default value for a declared type: scalars get their zero value,
    /// anything else an unbound reference.
    pub fn instantiate(type_name: &str) -> Self {
        match type_name.to_lowercase().as_str() {
            "number" => Value::Number(0.0),
            "string" => Value::String(String::new()),
            "boolean" => Value::Boolean(false),
            "char" | "character" => Value::Character(' '),
            _ => Value::Reference(None),
        }
    }

    /// Follows bound references to the value they hold.
    pub fn resolved(&self) -> &Value {
        match self {
            Value::Reference(Some(target)) => target.resolved(),
            other => other,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self.resolved() {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Whether a value may be bound to a parameter of the declared type.
    pub fn type_accepts(type_name: &str, value: &Value) -> bool {
        match value {
            Value::Reference(Some(target)) => Value::type_accepts(type_name, target),
            Value::Reference(None) => !is_scalar_type(type_name),
            Value::Number(_) => !is_non_numeric_scalar(type_name),
            Value::String(_) => {
                matches!(type_name, "String" | "string") || !is_scalar_type(type_name)
            }
            Value::Boolean(_) => type_name == "boolean" || !is_scalar_type(type_name),
            Value::Character(_) => {
                matches!(type_name, "char" | "character") || !is_scalar_type(type_name)
            }
            Value::Object(_) => !is_scalar_type(type_name),
        }
    }

    pub fn to_output(&self) -> String {
        match self {
            Value::Boolean(value) => value.to_string(),
            Value::Number(value) => value.to_string(),
            Value::String(value) => value.clone(),
            Value::Character(value) => value.to_string(),
            Value::Object(object) => format!("<{} object>", object.borrow().class.name),
            Value::Reference(Some(target)) => target.to_output(),
            Value::Reference(None) => "null".to_string(),
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Value::Boolean(_) => "boolean".to_string(),
            Value::Number(_) => "number".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Character(_) => "char".to_string(),
            Value::Object(object) => object.borrow().class.name.clone(),
            Value::Reference(Some(target)) => target.type_name(),
            Value::Reference(None) => "null".to_string(),
        }
    }
}

fn is_scalar_type(type_name: &str) -> bool {
    matches!(
        type_name,
        "int" | "number" | "String" | "string" | "boolean" | "char" | "character"
    )
}

fn is_non_numeric_scalar(type_name: &str) -> bool {
    is_scalar_type(type_name) && !matches!(type_name, "int" | "number")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instantiates_defaults_by_lowercased_type() {
        assert_eq!(Value::instantiate("number"), Value::Number(0.0));
        assert_eq!(Value::instantiate("String"), Value::String(String::new()));
        assert_eq!(Value::instantiate("boolean"), Value::Boolean(false));
        assert_eq!(Value::instantiate("char"), Value::Character(' '));
        assert_eq!(Value::instantiate("character"), Value::Character(' '));
        assert_eq!(Value::instantiate("Counter"), Value::Reference(None));
    }

    #[test]
    fn renders_output() {
        assert_eq!(Value::Number(5.0).to_output(), "5");
        assert_eq!(Value::Number(2.5).to_output(), "2.5");
        assert_eq!(Value::Boolean(true).to_output(), "true");
        assert_eq!(Value::Character('z').to_output(), "z");
        assert_eq!(Value::Reference(None).to_output(), "null");
        assert_eq!(
            Value::Reference(Some(Box::new(Value::String("x".to_string())))).to_output(),
            "x"
        );
    }

    #[test]
    fn checks_declared_types() {
        assert!(Value::type_accepts("int", &Value::Number(1.0)));
        assert!(Value::type_accepts("number", &Value::Number(1.0)));
        assert!(!Value::type_accepts("String", &Value::Number(1.0)));
        assert!(Value::type_accepts("String", &Value::String("a".to_string())));
        assert!(!Value::type_accepts("boolean", &Value::String("a".to_string())));
        assert!(Value::type_accepts("boolean", &Value::Boolean(false)));
        assert!(Value::type_accepts("character", &Value::Character('c')));
        assert!(!Value::type_accepts("character", &Value::Number(1.0)));
        assert!(Value::type_accepts("Anything", &Value::Boolean(false)));
        assert!(Value::type_accepts(
            "number",
            &Value::Reference(Some(Box::new(Value::Number(3.0))))
        ));
        assert!(!Value::type_accepts("number", &Value::Reference(None)));
        assert!(Value::type_accepts("Counter", &Value::Reference(None)));
    }
}
