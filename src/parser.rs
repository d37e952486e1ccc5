use tracing::debug;

use crate::ast::{
    BooleanOperator, Class, CompareOperator, Constructor, Expression, Interface, MathOperator,
    Member, MethodBody, MethodCall, MethodCallStatement, MethodDecl, MethodHeader, Program,
    Statement, VariableDecl,
};
use crate::token::{Token, TokenKind};

mod error;
mod token_manager;

pub use error::{ParseError, ParseResult};
pub use token_manager::TokenManager;

/// Type names that let `x number` be read as a `name type` declaration.
const SCALAR_TYPES: [&str; 7] = [
    "number",
    "int",
    "string",
    "String",
    "boolean",
    "char",
    "character",
];

pub struct Parser {
    tokens: TokenManager,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: TokenManager::new(tokens),
        }
    }

    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut program = Program::default();
        loop {
            self.skip_newlines();
            if self.tokens.match_and_remove(TokenKind::Class).is_some() {
                program.classes.push(self.parse_class()?);
            } else if self.tokens.match_and_remove(TokenKind::Interface).is_some() {
                program.interfaces.push(self.parse_interface()?);
            } else {
                break;
            }
        }

        while self.tokens.match_and_remove(TokenKind::Dedent).is_some()
            || self.tokens.match_and_remove(TokenKind::Newline).is_some()
        {}
        if !self.tokens.done() {
            return Err(self.error("class or interface"));
        }
        Ok(program)
    }

    fn parse_class(&mut self) -> ParseResult<Class> {
        let name = self.expect_word("class name")?;
        let mut class = Class::new(name);
        if self.tokens.match_and_remove(TokenKind::Implements).is_some() {
            loop {
                class.interfaces.push(self.expect_word("interface name")?);
                if self.tokens.match_and_remove(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect_line_end()?;
        if self.tokens.match_and_remove(TokenKind::Indent).is_none() {
            return Ok(class);
        }

        loop {
            self.skip_newlines();
            if self.tokens.done() || self.tokens.match_and_remove(TokenKind::Dedent).is_some() {
                break;
            }
            match self.tokens.peek_kind(0) {
                Some(TokenKind::Construct) => {
                    self.tokens.match_and_remove(TokenKind::Construct);
                    class.constructors.push(self.parse_constructor()?);
                }
                Some(TokenKind::Shared | TokenKind::Private) => {
                    class.methods.push(self.parse_method()?);
                }
                Some(TokenKind::Word)
                    if self
                        .tokens
                        .next_two_tokens_match(TokenKind::Word, TokenKind::LParen) =>
                {
                    class.methods.push(self.parse_method()?);
                }
                Some(TokenKind::Word)
                    if self
                        .tokens
                        .next_two_tokens_match(TokenKind::Word, TokenKind::Word) =>
                {
                    class.members.push(self.parse_member()?);
                }
                _ => return Err(self.error("member, method or constructor")),
            }
        }
        Ok(class)
    }

    fn parse_member(&mut self) -> ParseResult<Member> {
        let declaration = self.parse_variable_decl()?;
        self.expect_line_end()?;
        let mut member = Member {
            declaration,
            accessor: None,
            mutator: None,
        };
        if self.tokens.match_and_remove(TokenKind::Indent).is_none() {
            return Ok(member);
        }

        loop {
            self.skip_newlines();
            if self.tokens.done() || self.tokens.match_and_remove(TokenKind::Dedent).is_some() {
                break;
            }
            if self.tokens.match_and_remove(TokenKind::Accessor).is_some() {
                self.expect(TokenKind::Colon, "':'")?;
                member.accessor = Some(self.parse_section_body()?);
            } else if self.tokens.match_and_remove(TokenKind::Mutator).is_some() {
                self.expect(TokenKind::Colon, "':'")?;
                member.mutator = Some(self.parse_section_body()?);
            } else {
                return Err(self.error("accessor or mutator"));
            }
        }
        Ok(member)
    }

    fn parse_section_body(&mut self) -> ParseResult<Vec<Statement>> {
        self.expect_line_end()?;
        if self.tokens.peek_kind(0) == Some(TokenKind::Indent) {
            self.parse_block()
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_method(&mut self) -> ParseResult<MethodDecl> {
        let mut is_shared = false;
        let mut is_private = false;
        loop {
            if self.tokens.match_and_remove(TokenKind::Shared).is_some() {
                is_shared = true;
            } else if self.tokens.match_and_remove(TokenKind::Private).is_some() {
                is_private = true;
            } else {
                break;
            }
        }

        let name = self.expect_word("method name")?;
        let params = self.parse_parameters()?;
        let returns = self.parse_returns()?;
        self.expect_line_end()?;
        let (locals, body) = if self.tokens.match_and_remove(TokenKind::Indent).is_some() {
            self.parse_body()?
        } else {
            (Vec::new(), Vec::new())
        };

        Ok(MethodDecl {
            name,
            is_shared,
            is_private,
            is_variadic: false,
            params,
            returns,
            locals,
            body: MethodBody::Statements(body),
        })
    }

    fn parse_constructor(&mut self) -> ParseResult<Constructor> {
        let params = self.parse_parameters()?;
        self.expect_line_end()?;
        self.expect(TokenKind::Indent, "indented constructor body")?;
        let (locals, body) = self.parse_body()?;
        Ok(Constructor {
            params,
            locals,
            body,
        })
    }

    fn parse_interface(&mut self) -> ParseResult<Interface> {
        let name = self.expect_word("interface name")?;
        self.expect_line_end()?;
        self.expect(TokenKind::Indent, "indented interface body")?;

        let mut methods = Vec::new();
        loop {
            self.skip_newlines();
            if self.tokens.done() || self.tokens.match_and_remove(TokenKind::Dedent).is_some() {
                break;
            }
            let name = self.expect_word("method name")?;
            let params = self.parse_parameters()?;
            let returns = self.parse_returns()?;
            self.expect_line_end()?;
            methods.push(MethodHeader {
                name,
                params,
                returns,
            });
        }
        Ok(Interface { name, methods })
    }

    /// Body of a method or constructor after its INDENT: local declarations
    /// (`WORD WORD`) interleaved with statements.
    fn parse_body(&mut self) -> ParseResult<(Vec<VariableDecl>, Vec<Statement>)> {
        let mut locals = Vec::new();
        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            if self.tokens.done() || self.tokens.match_and_remove(TokenKind::Dedent).is_some() {
                break;
            }
            if self
                .tokens
                .next_two_tokens_match(TokenKind::Word, TokenKind::Word)
            {
                locals.push(self.parse_variable_decl()?);
                self.expect_line_end()?;
            } else {
                body.push(self.parse_statement()?);
            }
        }
        Ok((locals, body))
    }

    fn parse_block(&mut self) -> ParseResult<Vec<Statement>> {
        self.expect(TokenKind::Indent, "indented block")?;
        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            if self.tokens.done() || self.tokens.match_and_remove(TokenKind::Dedent).is_some() {
                break;
            }
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    fn parse_parameters(&mut self) -> ParseResult<Vec<VariableDecl>> {
        self.expect(TokenKind::LParen, "'('")?;
        if self.tokens.match_and_remove(TokenKind::RParen).is_some() {
            return Ok(Vec::new());
        }
        let params = self.parse_declarations()?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(params)
    }

    fn parse_returns(&mut self) -> ParseResult<Vec<VariableDecl>> {
        if self.tokens.match_and_remove(TokenKind::Colon).is_some() {
            self.parse_declarations()
        } else {
            Ok(Vec::new())
        }
    }

    fn parse_declarations(&mut self) -> ParseResult<Vec<VariableDecl>> {
        let mut declarations = Vec::new();
        loop {
            declarations.push(self.parse_variable_decl()?);
            if self.tokens.match_and_remove(TokenKind::Comma).is_none() {
                return Ok(declarations);
            }
        }
    }

    fn parse_variable_decl(&mut self) -> ParseResult<VariableDecl> {
        let first = self.expect_word("type name")?;
        let second = self.expect_word("variable name")?;
        if is_scalar_type(&second) && !is_scalar_type(&first) {
            Ok(VariableDecl::new(second, first))
        } else {
            Ok(VariableDecl::new(first, second))
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.tokens.peek_kind(0) {
            Some(TokenKind::Loop) => {
                self.tokens.match_and_remove(TokenKind::Loop);
                self.parse_loop()
            }
            Some(TokenKind::If) => {
                self.tokens.match_and_remove(TokenKind::If);
                self.parse_if()
            }
            Some(TokenKind::Word) => match self.tokens.peek_kind(1) {
                // `x = foo(...)` assigns a call's returns; anything else after `=` is an expression.
                Some(TokenKind::Assign)
                    if self.tokens.peek_kind(2) == Some(TokenKind::Word)
                        && self.tokens.peek_kind(3) == Some(TokenKind::LParen) =>
                {
                    self.parse_call_statement()
                }
                Some(TokenKind::Assign) => self.parse_assignment(),
                Some(TokenKind::Comma | TokenKind::Dot | TokenKind::LParen) => {
                    self.parse_call_statement()
                }
                _ => Err(self.error("statement")),
            },
            _ => Err(self.error("statement")),
        }
    }

    fn parse_assignment(&mut self) -> ParseResult<Statement> {
        let target = self.expect_word("variable name")?;
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.parse_expression()?;
        self.expect_line_end()?;
        Ok(Statement::Assign { target, value })
    }

    fn parse_call_statement(&mut self) -> ParseResult<Statement> {
        let mut targets = Vec::new();
        while self
            .tokens
            .next_two_tokens_match(TokenKind::Word, TokenKind::Comma)
        {
            targets.push(self.expect_word("variable name")?);
            self.tokens.match_and_remove(TokenKind::Comma);
        }
        if self
            .tokens
            .next_two_tokens_match(TokenKind::Word, TokenKind::Assign)
        {
            targets.push(self.expect_word("variable name")?);
            self.tokens.match_and_remove(TokenKind::Assign);
        } else if !targets.is_empty() {
            return Err(self.error("variable name followed by '='"));
        }

        let call = self.parse_method_call()?;
        self.expect_line_end()?;
        Ok(Statement::Call(MethodCallStatement { targets, call }))
    }

    fn parse_method_call(&mut self) -> ParseResult<MethodCall> {
        let object = if self
            .tokens
            .next_two_tokens_match(TokenKind::Word, TokenKind::Dot)
        {
            let object = self.expect_word("object name")?;
            self.tokens.match_and_remove(TokenKind::Dot);
            Some(object)
        } else {
            None
        };
        let method = self.expect_word("method name")?;
        let args = if object.is_some() && self.tokens.peek_kind(0) != Some(TokenKind::LParen) {
            Vec::new()
        } else {
            self.parse_arguments()?
        };
        Ok(MethodCall {
            object,
            method,
            args,
        })
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if self.tokens.match_and_remove(TokenKind::RParen).is_some() {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if self.tokens.match_and_remove(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        let condition = self.parse_expression()?;
        self.expect_line_end()?;
        let then_body = self.parse_block()?;
        let else_body = if self.tokens.match_and_remove(TokenKind::Else).is_some() {
            if self.tokens.match_and_remove(TokenKind::If).is_some() {
                Some(vec![self.parse_if()?])
            } else {
                self.expect_line_end()?;
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Statement::If {
            condition,
            then_body,
            else_body,
        })
    }

    fn parse_loop(&mut self) -> ParseResult<Statement> {
        let variable = if self
            .tokens
            .next_two_tokens_match(TokenKind::Word, TokenKind::Assign)
        {
            let variable = self.expect_word("loop variable")?;
            self.tokens.match_and_remove(TokenKind::Assign);
            Some(variable)
        } else {
            None
        };
        let source = self.parse_expression()?;
        self.expect_line_end()?;
        let body = self.parse_block()?;
        Ok(Statement::Loop {
            variable,
            source,
            body,
        })
    }

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_comparison()?;
        loop {
            let op = if self.tokens.match_and_remove(TokenKind::And).is_some() {
                BooleanOperator::And
            } else if self.tokens.match_and_remove(TokenKind::Or).is_some() {
                BooleanOperator::Or
            } else {
                break;
            };
            let right = self.parse_comparison()?;
            expr = Expression::BooleanOp {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        let left = self.parse_math(false)?;
        let op = match self.tokens.peek_kind(0) {
            Some(TokenKind::Equal) => CompareOperator::Eq,
            Some(TokenKind::NotEqual) => CompareOperator::Ne,
            Some(TokenKind::LessThan) => CompareOperator::Lt,
            Some(TokenKind::GreaterThan) => CompareOperator::Gt,
            Some(TokenKind::LessThanEqual) => CompareOperator::Le,
            Some(TokenKind::GreaterThanEqual) => CompareOperator::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_math(false)?;
        Ok(Expression::Compare {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    /// Flat left-to-right chain: `2 + 3 * 4` is `(2 + 3) * 4`.
    fn parse_math(&mut self, in_group: bool) -> ParseResult<Expression> {
        let mut expr = self.parse_operand(in_group)?;
        loop {
            let op = match self.tokens.peek_kind(0) {
                Some(TokenKind::Plus) => MathOperator::Add,
                Some(TokenKind::Minus) => MathOperator::Sub,
                Some(TokenKind::Times) => MathOperator::Mul,
                Some(TokenKind::Divide) => MathOperator::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_operand(in_group)?;
            expr = Expression::Math {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_operand(&mut self, in_group: bool) -> ParseResult<Expression> {
        match self.tokens.peek_kind(0) {
            Some(TokenKind::Number) => {
                let token = self.advance_token()?;
                Ok(Expression::Number(self.number_value(&token)?))
            }
            Some(TokenKind::Minus) if self.tokens.peek_kind(1) == Some(TokenKind::Number) => {
                self.advance();
                let token = self.advance_token()?;
                Ok(Expression::Number(-self.number_value(&token)?))
            }
            Some(TokenKind::QuotedString) => {
                let token = self.advance_token()?;
                Ok(Expression::String(token.text.unwrap_or_default()))
            }
            Some(TokenKind::QuotedCharacter) => {
                let token = self.advance_token()?;
                let value = token.text().chars().next().unwrap_or(' ');
                Ok(Expression::Character(value))
            }
            Some(TokenKind::True) => {
                self.advance();
                Ok(Expression::Boolean(true))
            }
            Some(TokenKind::False) => {
                self.advance();
                Ok(Expression::Boolean(false))
            }
            Some(TokenKind::New) => {
                self.advance();
                let class = self.expect_word("class name")?;
                let args = self.parse_arguments()?;
                Ok(Expression::New { class, args })
            }
            Some(TokenKind::LParen) => {
                if in_group {
                    return Err(ParseError::new(
                        "Nested parentheses are not supported",
                        self.tokens.current_line(),
                        self.tokens.current_column(),
                    ));
                }
                self.advance();
                let expr = self.parse_math(true)?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            Some(TokenKind::Word)
                if self
                    .tokens
                    .next_two_tokens_match(TokenKind::Word, TokenKind::Dot)
                    || self
                        .tokens
                        .next_two_tokens_match(TokenKind::Word, TokenKind::LParen) =>
            {
                Ok(Expression::Call(self.parse_method_call()?))
            }
            Some(TokenKind::Word) => Ok(Expression::Variable(self.expect_word("variable name")?)),
            _ => Err(self.error("expression")),
        }
    }

    fn number_value(&self, token: &Token) -> ParseResult<f64> {
        token.text().parse::<f64>().map_err(|_| {
            ParseError::new(
                format!("Expected number, got {token}"),
                token.span.line,
                token.span.column,
            )
        })
    }

    fn skip_newlines(&mut self) {
        while self.tokens.match_and_remove(TokenKind::Newline).is_some() {}
    }

    /// A statement or declaration ends at NEWLINE(s), or just before a
    /// DEDENT or the end of input.
    fn expect_line_end(&mut self) -> ParseResult<()> {
        if self.tokens.match_and_remove(TokenKind::Newline).is_some() {
            self.skip_newlines();
            return Ok(());
        }
        if self.tokens.done() || self.tokens.peek_kind(0) == Some(TokenKind::Dedent) {
            return Ok(());
        }
        Err(self.error("end of line"))
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        self.tokens
            .match_and_remove(kind)
            .ok_or_else(|| self.error(expected))
    }

    fn expect_word(&mut self, expected: &str) -> ParseResult<String> {
        let token = self.expect(TokenKind::Word, expected)?;
        Ok(token.text.unwrap_or_default())
    }

    fn advance(&mut self) {
        self.tokens.next_token();
    }

    fn advance_token(&mut self) -> ParseResult<Token> {
        self.tokens
            .next_token()
            .ok_or_else(|| self.error("token"))
    }

    fn error(&self, expected: &str) -> ParseError {
        let got = match self.tokens.peek(0) {
            Some(token) => token.to_string(),
            None => "end of input".to_string(),
        };
        ParseError::new(
            format!("Expected {expected}, got {got}"),
            self.tokens.current_line(),
            self.tokens.current_column(),
        )
    }
}

fn is_scalar_type(name: &str) -> bool {
    SCALAR_TYPES.contains(&name)
}

pub fn parse_tokens(tokens: Vec<Token>) -> ParseResult<Program> {
    let program = Parser::new(tokens).parse_program()?;
    debug!(
        classes = program.classes.len(),
        interfaces = program.interfaces.len(),
        "parsed program"
    );
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use indoc::indoc;

    fn parse(input: &str) -> ParseResult<Program> {
        parse_tokens(tokenize(input).expect("tokenize should succeed"))
    }

    fn parse_ok(input: &str) -> Program {
        parse(input).expect("parse failed")
    }

    /// Statements of the first method of the first class.
    fn body_of(program: &Program) -> &[Statement] {
        match &program.classes[0].methods[0].body {
            MethodBody::Statements(body) => body,
            MethodBody::Builtin(_) => panic!("expected statement body"),
        }
    }

    fn start_body(statements: &str) -> Program {
        let mut input = String::from("class Main\n    shared start()\n");
        for line in statements.lines() {
            input.push_str("        ");
            input.push_str(line);
            input.push('\n');
        }
        parse_ok(&input)
    }

    fn number(value: f64) -> Expression {
        Expression::Number(value)
    }

    fn variable(name: &str) -> Expression {
        Expression::Variable(name.to_string())
    }

    fn math(left: Expression, op: MathOperator, right: Expression) -> Expression {
        Expression::Math {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    #[test]
    fn parses_member_declared_name_first() {
        let program = parse_ok("class C\n\tx number\n");
        assert_eq!(program.classes.len(), 1);
        let class = &program.classes[0];
        assert_eq!(class.name, "C");
        assert_eq!(class.members.len(), 1);
        assert_eq!(class.members[0].declaration, VariableDecl::new("number", "x"));
        assert!(class.methods.is_empty());
    }

    #[test]
    fn parses_member_declared_type_first() {
        let program = parse_ok("class C\n    number x\n    Counter c\n");
        let members = &program.classes[0].members;
        assert_eq!(members[0].declaration, VariableDecl::new("number", "x"));
        assert_eq!(members[1].declaration, VariableDecl::new("Counter", "c"));
    }

    #[test]
    fn parses_simple_program() {
        let input = indoc! {r#"
            class Main
                shared start()
                    console.write("hello", 4)
        "#};
        let program = parse_ok(input);

        let expected = Program {
            classes: vec![Class {
                name: "Main".to_string(),
                interfaces: vec![],
                members: vec![],
                constructors: vec![],
                methods: vec![MethodDecl {
                    name: "start".to_string(),
                    is_shared: true,
                    is_private: false,
                    is_variadic: false,
                    params: vec![],
                    returns: vec![],
                    locals: vec![],
                    body: MethodBody::Statements(vec![Statement::Call(MethodCallStatement {
                        targets: vec![],
                        call: MethodCall {
                            object: Some("console".to_string()),
                            method: "write".to_string(),
                            args: vec![Expression::String("hello".to_string()), number(4.0)],
                        },
                    })]),
                }],
            }],
            interfaces: vec![],
        };
        assert_eq!(program, expected);
    }

    #[test]
    fn parses_class_with_constructor_locals_and_modifiers() {
        let input = indoc! {"
            class Counter implements Countable, Printable
                number count
                construct(number start)
                    count = start
                private shared helper(number a, string b) : number total, boolean ok
                    number scratch
                    total = a
                next()
                    count = count + 1
        "};
        let program = parse_ok(input);
        let class = &program.classes[0];
        assert_eq!(class.interfaces, vec!["Countable", "Printable"]);
        assert_eq!(class.members.len(), 1);
        assert_eq!(class.constructors.len(), 1);
        assert_eq!(
            class.constructors[0].params,
            vec![VariableDecl::new("number", "start")]
        );

        let helper = &class.methods[0];
        assert!(helper.is_shared);
        assert!(helper.is_private);
        assert_eq!(helper.params.len(), 2);
        assert_eq!(
            helper.returns,
            vec![
                VariableDecl::new("number", "total"),
                VariableDecl::new("boolean", "ok")
            ]
        );
        assert_eq!(helper.locals, vec![VariableDecl::new("number", "scratch")]);

        let next = &class.methods[1];
        assert_eq!(next.name, "next");
        assert!(!next.is_shared && !next.is_private);
    }

    #[test]
    fn parses_member_accessor_and_mutator_sections() {
        let input = indoc! {"
            class Box
                number value
                    accessor:
                        value = value
                    mutator:
                number other
        "};
        let program = parse_ok(input);
        let members = &program.classes[0].members;
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].accessor.as_ref().map(Vec::len), Some(1));
        assert_eq!(members[0].mutator, Some(vec![]));
        assert_eq!(members[1].accessor, None);
    }

    #[test]
    fn parses_interface_headers() {
        let input = indoc! {"
            interface Shape
                area() : number a
                scale(number factor)
            class Square implements Shape
        "};
        let program = parse_ok(input);
        assert_eq!(program.interfaces.len(), 1);
        let shape = &program.interfaces[0];
        assert_eq!(shape.name, "Shape");
        assert_eq!(shape.methods.len(), 2);
        assert_eq!(shape.methods[0].returns, vec![VariableDecl::new("number", "a")]);
        assert_eq!(shape.methods[1].params, vec![VariableDecl::new("number", "factor")]);
        assert_eq!(program.classes[0].interfaces, vec!["Shape"]);
    }

    #[test]
    fn disambiguates_assignment_and_call_statements() {
        let program = start_body(indoc! {"
            x = y + 1
            x = compute(2)
            a, b = pair.split()
            worker.run
            reset()
        "});
        let body = body_of(&program);

        assert_eq!(
            body[0],
            Statement::Assign {
                target: "x".to_string(),
                value: math(variable("y"), MathOperator::Add, number(1.0)),
            }
        );
        assert_eq!(
            body[1],
            Statement::Call(MethodCallStatement {
                targets: vec!["x".to_string()],
                call: MethodCall {
                    object: None,
                    method: "compute".to_string(),
                    args: vec![number(2.0)],
                },
            })
        );
        assert_eq!(
            body[2],
            Statement::Call(MethodCallStatement {
                targets: vec!["a".to_string(), "b".to_string()],
                call: MethodCall {
                    object: Some("pair".to_string()),
                    method: "split".to_string(),
                    args: vec![],
                },
            })
        );
        assert_eq!(
            body[3],
            Statement::Call(MethodCallStatement {
                targets: vec![],
                call: MethodCall {
                    object: Some("worker".to_string()),
                    method: "run".to_string(),
                    args: vec![],
                },
            })
        );
        assert!(matches!(&body[4], Statement::Call(statement) if statement.call.method == "reset"));
    }

    #[test]
    fn math_is_flat_left_to_right() {
        let program = start_body("x = 2 + 3 * 4 - -1\n");
        let Statement::Assign { value, .. } = &body_of(&program)[0] else {
            panic!("expected assignment");
        };
        let expected = math(
            math(
                math(number(2.0), MathOperator::Add, number(3.0)),
                MathOperator::Mul,
                number(4.0),
            ),
            MathOperator::Sub,
            number(-1.0),
        );
        assert_eq!(*value, expected);
    }

    #[test]
    fn parenthesized_group_binds_first() {
        let program = start_body("x = 2 * (3 + 4)\n");
        let Statement::Assign { value, .. } = &body_of(&program)[0] else {
            panic!("expected assignment");
        };
        assert_eq!(
            *value,
            math(
                number(2.0),
                MathOperator::Mul,
                math(number(3.0), MathOperator::Add, number(4.0))
            )
        );
    }

    #[test]
    fn rejects_nested_parentheses() {
        let input = "class Main\n    shared start()\n        x = ((1 + 2) * 3)\n";
        let err = parse(input).expect_err("expected parse failure");
        assert!(err.message.contains("Nested parentheses"));
        assert_eq!((err.line, err.column), (3, 13));
    }

    #[test]
    fn parses_comparisons_and_boolean_chains() {
        let program = start_body("ok = a > 3 and b != c or done\n");
        let Statement::Assign { value, .. } = &body_of(&program)[0] else {
            panic!("expected assignment");
        };
        let Expression::BooleanOp { left, op, right } = value else {
            panic!("expected boolean operation");
        };
        assert_eq!(*op, BooleanOperator::Or);
        assert_eq!(**right, variable("done"));
        let Expression::BooleanOp { left, op, right } = left.as_ref() else {
            panic!("expected nested boolean operation");
        };
        assert_eq!(*op, BooleanOperator::And);
        assert_eq!(
            **left,
            Expression::Compare {
                left: Box::new(variable("a")),
                op: CompareOperator::Gt,
                right: Box::new(number(3.0)),
            }
        );
        assert!(matches!(
            right.as_ref(),
            Expression::Compare {
                op: CompareOperator::Ne,
                ..
            }
        ));
    }

    #[test]
    fn parses_literal_operands() {
        let program = start_body("console.write(\"s\", 'c', true, false, .5, new Thing(1), obj.size)\n");
        let Statement::Call(statement) = &body_of(&program)[0] else {
            panic!("expected call");
        };
        assert_eq!(
            statement.call.args,
            vec![
                Expression::String("s".to_string()),
                Expression::Character('c'),
                Expression::Boolean(true),
                Expression::Boolean(false),
                number(0.5),
                Expression::New {
                    class: "Thing".to_string(),
                    args: vec![number(1.0)],
                },
                Expression::Call(MethodCall {
                    object: Some("obj".to_string()),
                    method: "size".to_string(),
                    args: vec![],
                }),
            ]
        );
    }

    #[test]
    fn parses_loop_forms() {
        let program = start_body(indoc! {"
            loop item = items
                total = total + item
            loop count < 3
                count = count + 1
        "});
        let body = body_of(&program);
        assert!(matches!(
            &body[0],
            Statement::Loop { variable: Some(name), source: Expression::Variable(source), body }
                if name == "item" && source == "items" && body.len() == 1
        ));
        assert!(matches!(
            &body[1],
            Statement::Loop { variable: None, source: Expression::Compare { .. }, .. }
        ));
    }

    #[test]
    fn recognizes_iterable_classes() {
        let program = parse_ok(indoc! {"
            class Range
                getNext() : boolean more, number value
                    more = false
            class Pair
                getNext() : number left, number right
                    left = 1
        "});
        assert!(program.classes[0].is_iterable());
        assert!(!program.classes[1].is_iterable());
    }

    #[test]
    fn parses_if_else_if_chain() {
        let program = start_body(indoc! {"
            if a == 1
                b = 1
            else if a == 2
                b = 2
            else
                b = 3
            c = b
        "});
        let body = body_of(&program);
        assert_eq!(body.len(), 2);
        let Statement::If {
            then_body,
            else_body: Some(else_body),
            ..
        } = &body[0]
        else {
            panic!("expected if with else");
        };
        assert_eq!(then_body.len(), 1);
        assert!(matches!(
            else_body.as_slice(),
            [Statement::If { else_body: Some(last), .. }] if last.len() == 1
        ));
    }

    #[test]
    fn reports_expected_token_with_position() {
        let input = "class Main\n    shared start(\n";
        let err = parse(input).expect_err("expected parse failure");
        assert_eq!(err.message, "Expected type name, got newline");
        assert_eq!((err.line, err.column), (2, 17));
        assert!(err.to_string().ends_with("at line 2, column 17"));
    }

    #[test]
    fn rejects_trailing_statements_outside_classes() {
        let err = parse("class Main\nx = 1\n").expect_err("expected parse failure");
        assert_eq!(err.message, "Expected class or interface, got word 'x'");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn reports_end_of_input() {
        let err = parse("class Main\n    shared start()\n        x =").expect_err("expected parse failure");
        assert_eq!(err.message, "Expected expression, got dedent");

        let err = parse("class").expect_err("expected parse failure");
        assert_eq!(err.message, "Expected class name, got end of input");
        assert_eq!((err.line, err.column), (1, 0));
    }

    #[test]
    fn accepts_missing_trailing_newline_and_blank_lines() {
        let input = "\n\nclass Main\n\n    shared start()\n\n        x = 1\n\n        y = 2";
        let program = parse_ok(input);
        assert_eq!(body_of(&program).len(), 2);
    }
}
