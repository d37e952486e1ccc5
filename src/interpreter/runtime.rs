use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::ast::{
    BooleanOperator, Class, CompareOperator, Constructor, Expression, MathOperator, MethodBody,
    MethodCall, MethodDecl, Statement, VariableDecl,
};
use crate::builtins::BuiltinMethod;

use super::program::ProgramContext;
use super::value::{Instance, ObjectRef, Value};
use super::{InterpreterConfig, InterpreterError};

type RuntimeResult<T> = std::result::Result<T, InterpreterError>;

/// Per-invocation scope: the class whose code is running, the current object
/// (absent for shared calls) and the call's locals.
struct Frame {
    class: Rc<Class>,
    this: Option<ObjectRef>,
    locals: HashMap<String, Value>,
    /// Declared return variables. They enter `locals` on first assignment.
    returns: Vec<String>,
}

impl Frame {
    fn new(class: Rc<Class>, this: Option<ObjectRef>) -> Self {
        Self {
            class,
            this,
            locals: HashMap::new(),
            returns: Vec::new(),
        }
    }

    /// Binds parameters positionally, then fills in declared locals that
    /// parameters did not already provide.
    fn bind(&mut self, params: &[VariableDecl], args: Vec<Value>, locals: &[VariableDecl]) {
        for (param, value) in params.iter().zip(args) {
            self.locals.insert(param.name.clone(), value);
        }
        for declaration in locals {
            self.locals
                .entry(declaration.name.clone())
                .or_insert_with(|| Value::instantiate(&declaration.type_name));
        }
    }

    /// Reads check locals before the current object's members.
    fn load(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.locals.get(name) {
            return Some(value.clone());
        }
        let this = self.this.as_ref()?;
        this.borrow().members.get(name).cloned()
    }

    /// Writes into a member of the current object, handing the value back
    /// when there is no such member.
    fn store_member(&self, name: &str, value: Value) -> Result<(), Value> {
        if let Some(this) = &self.this {
            let mut object = this.borrow_mut();
            if let Some(slot) = object.members.get_mut(name) {
                *slot = value;
                return Ok(());
            }
        }
        Err(value)
    }

    /// Writes check the current object's members before locals and return
    /// variables.
    fn store(&mut self, name: &str, value: Value) -> RuntimeResult<()> {
        let Err(value) = self.store_member(name, value) else {
            return Ok(());
        };
        if self.locals.contains_key(name) || self.returns.iter().any(|ret| ret == name) {
            self.locals.insert(name.to_string(), value);
            return Ok(());
        }
        Err(InterpreterError::UndefinedVariable {
            name: name.to_string(),
        })
    }

    fn store_or_declare(&mut self, name: &str, value: Value) {
        if let Err(value) = self.store_member(name, value) {
            self.locals.insert(name.to_string(), value);
        }
    }
}

/// Which methods of a class a call site may reach.
#[derive(Clone, Copy)]
enum Receiver {
    /// Unqualified call from inside the class.
    Own,
    /// `variable.method`, where the variable holds an object.
    Instance,
    /// `ClassName.method`.
    Shared,
}

impl Receiver {
    fn admits(self, method: &MethodDecl) -> bool {
        match self {
            Receiver::Own => true,
            Receiver::Instance => !method.is_private,
            Receiver::Shared => method.is_shared && !method.is_private,
        }
    }
}

/// Runtime executor for statements and expressions.
pub(super) struct InterpreterRuntime<'a> {
    pub(super) program: &'a ProgramContext,
    pub(super) config: &'a InterpreterConfig,
    pub(super) output: Vec<String>,
}

impl<'a> InterpreterRuntime<'a> {
    pub(super) fn run_entry_point(&mut self) -> RuntimeResult<()> {
        let program = self.program;
        let (class, method) = program
            .entry_point()
            .ok_or(InterpreterError::NoEntryPoint)?;
        debug!(class = %class.name, "running entry point");
        self.invoke(class, method, None, Vec::new())?;
        Ok(())
    }

    fn exec_block(&mut self, body: &[Statement], frame: &mut Frame) -> RuntimeResult<()> {
        for statement in body {
            self.exec_statement(statement, frame)?;
        }
        Ok(())
    }

    fn exec_statement(&mut self, statement: &Statement, frame: &mut Frame) -> RuntimeResult<()> {
        match statement {
            Statement::Assign { target, value } => {
                trace!(variable = %target, "assignment");
                let value = self.eval_expression(value, frame)?;
                frame.store(target, value)
            }
            Statement::Call(statement) => {
                trace!(method = %statement.call.method, "call statement");
                let returns = self.eval_call(&statement.call, frame)?;
                if statement.targets.len() > returns.len() {
                    return Err(InterpreterError::ReturnCountMismatch {
                        method: statement.call.method.clone(),
                        expected: returns.len(),
                        found: statement.targets.len(),
                    });
                }
                for (target, value) in statement.targets.iter().zip(returns) {
                    frame.store(target, value)?;
                }
                Ok(())
            }
            Statement::Loop {
                variable,
                source,
                body,
            } => {
                trace!("loop");
                let value = self.eval_expression(source, frame)?;
                match value.resolved() {
                    Value::Object(object) => {
                        let object = object.clone();
                        self.exec_iterator_loop(object, variable.as_deref(), body, frame)
                    }
                    Value::Boolean(_) => self.exec_conditional_loop(
                        value.clone(),
                        variable.as_deref(),
                        source,
                        body,
                        frame,
                    ),
                    other => Err(InterpreterError::NotIterable {
                        type_name: other.type_name(),
                    }),
                }
            }
            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                trace!("if");
                if expect_condition(&self.eval_expression(condition, frame)?)? {
                    self.exec_block(then_body, frame)
                } else if let Some(else_body) = else_body {
                    self.exec_block(else_body, frame)
                } else {
                    Ok(())
                }
            }
        }
    }

    fn exec_iterator_loop(
        &mut self,
        object: ObjectRef,
        variable: Option<&str>,
        body: &[Statement],
        frame: &mut Frame,
    ) -> RuntimeResult<()> {
        let class = object.borrow().class.clone();
        let get_next = class
            .iterator_method()
            .ok_or_else(|| InterpreterError::NotIterable {
                type_name: class.name.clone(),
            })?;
        debug!(class = %class.name, "starting iterator loop");

        loop {
            let returns = self.invoke(&class, get_next, Some(object.clone()), Vec::new())?;
            let [flag, item]: [Value; 2] =
                returns
                    .try_into()
                    .map_err(|returns: Vec<Value>| InterpreterError::InvalidIterator {
                        class: class.name.clone(),
                        reason: format!("getNext returned {} values, expected 2", returns.len()),
                    })?;
            let has_next = match flag.resolved() {
                Value::Boolean(has_next) => *has_next,
                other => {
                    return Err(InterpreterError::InvalidIterator {
                        class: class.name.clone(),
                        reason: format!("expected a boolean flag, got {}", other.type_name()),
                    });
                }
            };
            if !has_next {
                return Ok(());
            }
            if let Some(variable) = variable {
                frame.store_or_declare(variable, item);
            }
            self.exec_block(body, frame)?;
        }
    }

    fn exec_conditional_loop(
        &mut self,
        first: Value,
        variable: Option<&str>,
        condition: &Expression,
        body: &[Statement],
        frame: &mut Frame,
    ) -> RuntimeResult<()> {
        let mut current = first;
        loop {
            if !expect_condition(&current)? {
                return Ok(());
            }
            // Only passing conditions reach the variable.
            if let Some(variable) = variable {
                frame.store_or_declare(variable, current.clone());
            }
            self.exec_block(body, frame)?;
            current = self.eval_expression(condition, frame)?;
        }
    }

    fn eval_expression(&mut self, expr: &Expression, frame: &mut Frame) -> RuntimeResult<Value> {
        match expr {
            Expression::Boolean(value) => Ok(Value::Boolean(*value)),
            Expression::Number(value) => Ok(Value::Number(*value)),
            Expression::String(value) => Ok(Value::String(value.clone())),
            Expression::Character(value) => Ok(Value::Character(*value)),
            Expression::BooleanOp { left, op, right } => {
                // Both sides always run, even when the left decides the result.
                let left = self.eval_expression(left, frame)?;
                let right = self.eval_expression(right, frame)?;
                match (left.resolved(), right.resolved()) {
                    (Value::Boolean(left), Value::Boolean(right)) => Ok(Value::Boolean(match op {
                        BooleanOperator::And => *left && *right,
                        BooleanOperator::Or => *left || *right,
                    })),
                    (left, right) => Err(type_mismatch(boolean_symbol(*op), left, right)),
                }
            }
            Expression::Compare { left, op, right } => {
                let left = self.eval_expression(left, frame)?;
                let right = self.eval_expression(right, frame)?;
                let (Value::Number(left), Value::Number(right)) = (left.resolved(), right.resolved())
                else {
                    return Err(type_mismatch(
                        compare_symbol(*op),
                        left.resolved(),
                        right.resolved(),
                    ));
                };
                Ok(Value::Boolean(match op {
                    CompareOperator::Eq => left == right,
                    CompareOperator::Ne => left != right,
                    CompareOperator::Lt => left < right,
                    CompareOperator::Gt => left > right,
                    CompareOperator::Le => left <= right,
                    CompareOperator::Ge => left >= right,
                }))
            }
            Expression::Math { left, op, right } => {
                let left = self.eval_expression(left, frame)?;
                let right = self.eval_expression(right, frame)?;
                eval_math(*op, left.resolved(), right.resolved())
            }
            Expression::Call(call) => {
                let returns = self.eval_call(call, frame)?;
                returns
                    .into_iter()
                    .next()
                    .ok_or_else(|| InterpreterError::MissingReturnValue {
                        method: call.method.clone(),
                    })
            }
            Expression::Variable(name) => {
                frame
                    .load(name)
                    .ok_or_else(|| InterpreterError::UndefinedVariable { name: name.clone() })
            }
            Expression::New { class, args } => self.construct(class, args, frame),
        }
    }

    fn eval_arguments(
        &mut self,
        args: &[Expression],
        frame: &mut Frame,
    ) -> RuntimeResult<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expression(arg, frame)?);
        }
        Ok(values)
    }

    fn eval_call(&mut self, call: &MethodCall, frame: &mut Frame) -> RuntimeResult<Vec<Value>> {
        let args = self.eval_arguments(&call.args, frame)?;
        let (class, this, receiver) = self.resolve_receiver(call.object.as_deref(), frame)?;
        let method = find_method(&class, &call.method, call.args.len(), &args, receiver)?;
        self.invoke(&class, method, this, args)
    }

    fn resolve_receiver(
        &self,
        object: Option<&str>,
        frame: &Frame,
    ) -> RuntimeResult<(Rc<Class>, Option<ObjectRef>, Receiver)> {
        let Some(name) = object else {
            return Ok((frame.class.clone(), frame.this.clone(), Receiver::Own));
        };
        if let Some(value) = frame.load(name) {
            let Some(object) = value.as_object() else {
                return Err(InterpreterError::NotAnObject {
                    name: name.to_string(),
                    type_name: value.type_name(),
                });
            };
            let class = object.borrow().class.clone();
            return Ok((class, Some(object.clone()), Receiver::Instance));
        }
        match self.program.find_class(name) {
            Some(class) => Ok((class.clone(), None, Receiver::Shared)),
            None => Err(InterpreterError::UndefinedVariable {
                name: name.to_string(),
            }),
        }
    }

    fn invoke(
        &mut self,
        class: &Rc<Class>,
        method: &MethodDecl,
        this: Option<ObjectRef>,
        args: Vec<Value>,
    ) -> RuntimeResult<Vec<Value>> {
        debug!(class = %class.name, method = %method.name, args = args.len(), "invoking method");
        let body = match &method.body {
            MethodBody::Builtin(builtin) => return Ok(self.call_builtin(*builtin, &args)),
            MethodBody::Statements(body) => body,
        };
        if method.params.len() != args.len() {
            return Err(InterpreterError::ParameterCountMismatch {
                method: method.name.clone(),
                expected: method.params.len(),
                found: args.len(),
            });
        }

        let mut frame = Frame::new(class.clone(), this);
        frame.bind(&method.params, args, &method.locals);
        frame.returns = method
            .returns
            .iter()
            .map(|declaration| declaration.name.clone())
            .collect();
        self.exec_block(body, &mut frame)?;

        method
            .returns
            .iter()
            .map(|declaration| {
                frame.locals.get(&declaration.name).cloned().ok_or_else(|| {
                    InterpreterError::MissingReturnVariable {
                        method: method.name.clone(),
                        name: declaration.name.clone(),
                    }
                })
            })
            .collect()
    }

    fn call_builtin(&mut self, builtin: BuiltinMethod, args: &[Value]) -> Vec<Value> {
        match builtin {
            BuiltinMethod::ConsoleWrite => {
                let line = args
                    .iter()
                    .map(Value::to_output)
                    .collect::<Vec<_>>()
                    .join(" ");
                trace!(line = %line, "console write");
                self.output.push(line);
                Vec::new()
            }
        }
    }

    fn construct(
        &mut self,
        class_name: &str,
        arg_exprs: &[Expression],
        frame: &mut Frame,
    ) -> RuntimeResult<Value> {
        let class = self
            .program
            .find_class(class_name)
            .cloned()
            .ok_or_else(|| InterpreterError::UndefinedClass {
                name: class_name.to_string(),
            })?;

        // Members take a same-named local or member value when one is in scope.
        let mut members = HashMap::with_capacity(class.members.len());
        for member in &class.members {
            let declaration = &member.declaration;
            let value = frame
                .load(&declaration.name)
                .unwrap_or_else(|| Value::instantiate(&declaration.type_name));
            members.insert(declaration.name.clone(), value);
        }
        let object = Instance::new_ref(class.clone(), members);
        let args = self.eval_arguments(arg_exprs, frame)?;

        if !class.constructors.is_empty() {
            let constructor = class
                .constructors
                .iter()
                .find(|constructor| constructor_matches(constructor, &args))
                .or_else(|| {
                    class
                        .constructors
                        .iter()
                        .find(|constructor| constructor.params.len() == args.len())
                })
                .ok_or_else(|| InterpreterError::ConstructorNotFound {
                    class: class.name.clone(),
                    found: args.len(),
                })?;
            debug!(class = %class.name, args = args.len(), "running constructor");
            let mut constructor_frame = Frame::new(class.clone(), Some(object.clone()));
            constructor_frame.bind(&constructor.params, args.clone(), &constructor.locals);
            self.exec_block(&constructor.body, &mut constructor_frame)?;
        }

        if self.config.construction_method_call
            && let Some(method) = class.methods.iter().find(|method| {
                matches!(method.body, MethodBody::Statements(_)) && method.params.len() == args.len()
            })
        {
            debug!(class = %class.name, method = %method.name, "construction also invokes method");
            self.invoke(&class, method, Some(object.clone()), args)?;
        }

        Ok(Value::Object(object))
    }
}

fn find_method<'c>(
    class: &'c Class,
    name: &str,
    arg_count: usize,
    args: &[Value],
    receiver: Receiver,
) -> RuntimeResult<&'c MethodDecl> {
    let candidates: Vec<&MethodDecl> = class
        .methods
        .iter()
        .filter(|method| method.name == name && receiver.admits(method))
        .collect();
    let Some(first) = candidates.first() else {
        return Err(InterpreterError::MethodNotFound {
            method: name.to_string(),
            class: class.name.clone(),
        });
    };
    if let Some(method) = candidates
        .iter()
        .copied()
        .find(|method| does_match(method, arg_count, args))
    {
        return Ok(method);
    }
    if candidates.iter().all(|method| method.params.len() != args.len()) {
        return Err(InterpreterError::ParameterCountMismatch {
            method: name.to_string(),
            expected: first.params.len(),
            found: args.len(),
        });
    }
    Err(InterpreterError::ArgumentTypeMismatch {
        method: name.to_string(),
    })
}

fn does_match(method: &MethodDecl, arg_count: usize, args: &[Value]) -> bool {
    if method.is_variadic {
        return true;
    }
    method.params.len() == arg_count
        && method.params.len() == args.len()
        && params_accept(&method.params, args)
}

fn constructor_matches(constructor: &Constructor, args: &[Value]) -> bool {
    constructor.params.len() == args.len() && params_accept(&constructor.params, args)
}

fn params_accept(params: &[VariableDecl], args: &[Value]) -> bool {
    params
        .iter()
        .zip(args)
        .all(|(param, value)| Value::type_accepts(&param.type_name, value))
}

fn expect_condition(value: &Value) -> RuntimeResult<bool> {
    match value.resolved() {
        Value::Boolean(value) => Ok(*value),
        other => Err(InterpreterError::ConditionNotBoolean {
            type_name: other.type_name(),
        }),
    }
}

fn eval_math(op: MathOperator, left: &Value, right: &Value) -> RuntimeResult<Value> {
    match (op, left, right) {
        (_, Value::Number(left), Value::Number(right)) => Ok(Value::Number(match op {
            MathOperator::Add => left + right,
            MathOperator::Sub => left - right,
            MathOperator::Mul => left * right,
            MathOperator::Div => left / right,
        })),
        (MathOperator::Add, Value::String(_), _) | (MathOperator::Add, _, Value::String(_)) => {
            Ok(Value::String(format!(
                "{}{}",
                left.to_output(),
                right.to_output()
            )))
        }
        _ => Err(type_mismatch(math_symbol(op), left, right)),
    }
}

fn type_mismatch(operation: &str, left: &Value, right: &Value) -> InterpreterError {
    InterpreterError::TypeMismatch {
        operation: operation.to_string(),
        left: left.type_name(),
        right: right.type_name(),
    }
}

fn boolean_symbol(op: BooleanOperator) -> &'static str {
    match op {
        BooleanOperator::And => "and",
        BooleanOperator::Or => "or",
    }
}

fn compare_symbol(op: CompareOperator) -> &'static str {
    match op {
        CompareOperator::Eq => "==",
        CompareOperator::Ne => "!=",
        CompareOperator::Lt => "<",
        CompareOperator::Gt => ">",
        CompareOperator::Le => "<=",
        CompareOperator::Ge => ">=",
    }
}

fn math_symbol(op: MathOperator) -> &'static str {
    match op {
        MathOperator::Add => "+",
        MathOperator::Sub => "-",
        MathOperator::Mul => "*",
        MathOperator::Div => "/",
    }
}
