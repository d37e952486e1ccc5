use crate::builtins::BuiltinMethod;

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub classes: Vec<Class>,
    pub interfaces: Vec<Interface>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Class {
    pub name: String,
    pub interfaces: Vec<String>,
    pub members: Vec<Member>,
    pub constructors: Vec<Constructor>,
    pub methods: Vec<MethodDecl>,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interfaces: Vec::new(),
            members: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// The `getNext() : boolean, <value>` method that makes a class drive
    /// iterator loops, if it declares one.
    pub fn iterator_method(&self) -> Option<&MethodDecl> {
        self.methods.iter().find(|method| {
            method.name == "getNext"
                && method.params.is_empty()
                && method.returns.len() == 2
                && method.returns[0].type_name == "boolean"
        })
    }

    pub fn is_iterable(&self) -> bool {
        self.iterator_method().is_some()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct VariableDecl {
    pub type_name: String,
    pub name: String,
}

impl VariableDecl {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
        }
    }
}

/// Member field; accessor/mutator are `Some` when declared, even with an empty body.
#[derive(Debug, PartialEq, Clone)]
pub struct Member {
    pub declaration: VariableDecl,
    pub accessor: Option<Vec<Statement>>,
    pub mutator: Option<Vec<Statement>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHeader {
    pub name: String,
    pub params: Vec<VariableDecl>,
    pub returns: Vec<VariableDecl>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub is_shared: bool,
    pub is_private: bool,
    pub is_variadic: bool,
    pub params: Vec<VariableDecl>,
    pub returns: Vec<VariableDecl>,
    pub locals: Vec<VariableDecl>,
    pub body: MethodBody,
}

#[derive(Debug, PartialEq, Clone)]
pub enum MethodBody {
    Statements(Vec<Statement>),
    Builtin(BuiltinMethod),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Constructor {
    pub params: Vec<VariableDecl>,
    pub locals: Vec<VariableDecl>,
    pub body: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Interface {
    pub name: String,
    pub methods: Vec<MethodHeader>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Assign {
        target: String,
        value: Expression,
    },
    Call(MethodCallStatement),
    Loop {
        variable: Option<String>,
        source: Expression,
        body: Vec<Statement>,
    },
    If {
        condition: Expression,
        then_body: Vec<Statement>,
        else_body: Option<Vec<Statement>>,
    },
}

/// `a, b = obj.method(x)`: a call whose return values land in `targets` in order.
#[derive(Debug, PartialEq, Clone)]
pub struct MethodCallStatement {
    pub targets: Vec<String>,
    pub call: MethodCall,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodCall {
    pub object: Option<String>,
    pub method: String,
    pub args: Vec<Expression>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Boolean(bool),
    Number(f64),
    String(String),
    Character(char),
    BooleanOp {
        left: Box<Expression>,
        op: BooleanOperator,
        right: Box<Expression>,
    },
    Compare {
        left: Box<Expression>,
        op: CompareOperator,
        right: Box<Expression>,
    },
    Math {
        left: Box<Expression>,
        op: MathOperator,
        right: Box<Expression>,
    },
    Call(MethodCall),
    Variable(String),
    New {
        class: String,
        args: Vec<Expression>,
    },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BooleanOperator {
    And,
    Or,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CompareOperator {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum MathOperator {
    Add,
    Sub,
    Mul,
    Div,
}
