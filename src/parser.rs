use log::trace;

use crate::error::{ErrorSink, SyntaxError};
use crate::expr::{Expr, LiteralValue};
use crate::scanner::{Token, TokenType};
use crate::stmt::Stmt;

type StmtResult = Result<Stmt, SyntaxError>;
type ExprResult = Result<Expr, SyntaxError>;

/// Parse the token stream into statements, reporting every syntax error to the
/// sink. Statements that fail to parse are dropped after recovery, so the
/// returned list holds only well-formed trees.
pub fn parse(tokens: &[Token], sink: &mut ErrorSink) -> Vec<Stmt> {
    trace!("parsing {} tokens", tokens.len());

    let mut cursor = TokenCursor::new(tokens);
    let mut statements = Vec::new();

    while !cursor.at_end() {
        if let Some(statement) = declaration(&mut cursor, sink) {
            statements.push(statement);
        }
    }

    statements
}

// Error recovery boundary: a failed declaration is reported, the cursor is
// resynchronized to the next statement, and None stands in for the statement.
fn declaration(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> Option<Stmt> {
    let result = if cursor.advance_if_match(&TokenType::Fun).is_some() {
        function_declaration(cursor, sink)
    } else if cursor.advance_if_match(&TokenType::Var).is_some() {
        var_declaration(cursor, sink)
    } else {
        statement(cursor, sink)
    };

    match result {
        Ok(statement) => Some(statement),
        Err(error) => {
            sink.syntax_error(&error);
            synchronize(cursor);
            None
        }
    }
}

fn function_declaration(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> StmtResult {
    let name = consume_identifier(cursor, "Expect function name.")?;

    // parse the parameter list
    consume(cursor, &TokenType::LeftParen, "Expect '(' after function name.")?;
    let mut params = Vec::new();
    if cursor.peek().token_type != TokenType::RightParen {
        loop {
            if params.len() >= 255 {
                sink.syntax_error(&SyntaxError::at_token(
                    cursor.peek(),
                    "Can't have more than 255 parameters.",
                ));
            }
            params.push(consume_identifier(cursor, "Expect parameter name.")?);

            // keep grabbing the next parameter as long as the following token is a comma
            if cursor.advance_if_match(&TokenType::Comma).is_none() {
                break;
            }
        }
    }
    consume(cursor, &TokenType::RightParen, "Expect ')' after parameters.")?;

    // parse the function body
    consume(cursor, &TokenType::LeftBrace, "Expect '{' before function body.")?;
    let body = block(cursor, sink)?;

    Ok(Stmt::Function { name, params, body })
}

fn var_declaration(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> StmtResult {
    let name = consume_identifier(cursor, "Expect variable name.")?;

    let initializer = if cursor.advance_if_match(&TokenType::Equal).is_some() {
        Some(expression(cursor, sink)?)
    } else {
        None
    };

    consume(
        cursor,
        &TokenType::Semicolon,
        "Expected ';' after variable declaration.",
    )?;

    Ok(Stmt::Var { name, initializer })
}

fn statement(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> StmtResult {
    if let Some(token) = cursor.advance_if_any_match(&[
        TokenType::For,
        TokenType::If,
        TokenType::Print,
        TokenType::While,
        TokenType::LeftBrace,
    ]) {
        match token.token_type {
            TokenType::For => for_statement(cursor, sink),
            TokenType::If => if_statement(cursor, sink),
            TokenType::Print => print_statement(cursor, sink),
            TokenType::While => while_statement(cursor, sink),
            TokenType::LeftBrace => block_statement(cursor, sink),
            // unhandled case here indicates a mismatch with the dispatch list above
            _ => Err(SyntaxError::at_token(
                &token,
                "Unexpected token type when parsing statement.",
            )),
        }
    } else {
        expression_statement(cursor, sink)
    }
}

fn for_statement(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> StmtResult {
    consume(cursor, &TokenType::LeftParen, "Expect '(' after 'for'.")?;

    let initializer = if cursor.advance_if_match(&TokenType::Semicolon).is_some() {
        None
    } else if cursor.advance_if_match(&TokenType::Var).is_some() {
        Some(var_declaration(cursor, sink)?)
    } else {
        Some(expression_statement(cursor, sink)?)
    };

    let condition = if cursor.peek().token_type != TokenType::Semicolon {
        Some(expression(cursor, sink)?)
    } else {
        None
    };
    consume(cursor, &TokenType::Semicolon, "Expect ';' after loop condition.")?;

    let increment = if cursor.peek().token_type != TokenType::RightParen {
        Some(expression(cursor, sink)?)
    } else {
        None
    };
    consume(cursor, &TokenType::RightParen, "Expect ')' after for clauses.")?;

    let mut body = statement(cursor, sink)?;

    // rewrite the loop clauses into equivalent while-statement form
    if let Some(increment) = increment {
        body = Stmt::Block {
            statements: vec![
                body,
                Stmt::Expression {
                    expression: increment,
                },
            ],
        };
    }

    // empty condition defaults to true (infinite looping)
    let condition = condition.unwrap_or(Expr::Literal {
        value: LiteralValue::Boolean(true),
    });
    body = Stmt::While {
        condition,
        body: Box::new(body),
    };

    if let Some(initializer) = initializer {
        body = Stmt::Block {
            statements: vec![initializer, body],
        };
    }

    Ok(body)
}

fn if_statement(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> StmtResult {
    consume(cursor, &TokenType::LeftParen, "Expect '(' after 'if'.")?;
    let condition = expression(cursor, sink)?;
    consume(cursor, &TokenType::RightParen, "Expect ')' after if condition.")?;

    let then_branch = Box::new(statement(cursor, sink)?);
    let else_branch = if cursor.advance_if_match(&TokenType::Else).is_some() {
        Some(Box::new(statement(cursor, sink)?))
    } else {
        None
    };

    Ok(Stmt::If {
        condition,
        then_branch,
        else_branch,
    })
}

fn print_statement(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> StmtResult {
    let expression = expression(cursor, sink)?;
    consume(cursor, &TokenType::Semicolon, "Expected ; after value.")?;
    Ok(Stmt::Print { expression })
}

fn while_statement(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> StmtResult {
    consume(cursor, &TokenType::LeftParen, "Expected '(' after while.")?;
    let condition = expression(cursor, sink)?;
    consume(cursor, &TokenType::RightParen, "Expect ')' after condition.")?;

    let body = Box::new(statement(cursor, sink)?);
    Ok(Stmt::While { condition, body })
}

fn expression_statement(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> StmtResult {
    let expression = expression(cursor, sink)?;
    consume(cursor, &TokenType::Semicolon, "Expected ; after expression.")?;
    Ok(Stmt::Expression { expression })
}

fn block_statement(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> StmtResult {
    Ok(Stmt::Block {
        statements: block(cursor, sink)?,
    })
}

fn block(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> Result<Vec<Stmt>, SyntaxError> {
    let mut statements = Vec::new();
    while cursor.peek().token_type != TokenType::RightBrace && !cursor.at_end() {
        if let Some(statement) = declaration(cursor, sink) {
            statements.push(statement);
        }
    }
    consume(cursor, &TokenType::RightBrace, "Expect '}' after block.")?;
    Ok(statements)
}

fn expression(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> ExprResult {
    assignment(cursor, sink)
}

fn assignment(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> ExprResult {
    let expr = or(cursor, sink)?;

    if let Some(equal) = cursor.advance_if_match(&TokenType::Equal) {
        let value = assignment(cursor, sink)?;

        return match expr {
            Expr::Variable { name } => Ok(Expr::Assign {
                name,
                value: Box::new(value),
            }),
            // recoverable: report against the '=' and yield the right-hand side
            _ => {
                sink.syntax_error(&SyntaxError::at_token(&equal, "Invalid assignment target."));
                Ok(value)
            }
        };
    }

    Ok(expr)
}

fn or(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> ExprResult {
    logical_expression(cursor, sink, and, &TokenType::Or)
}

fn and(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> ExprResult {
    logical_expression(cursor, sink, equality, &TokenType::And)
}

fn logical_expression(
    cursor: &mut TokenCursor,
    sink: &mut ErrorSink,
    higher_precedence: fn(&mut TokenCursor, &mut ErrorSink) -> ExprResult,
    token_type: &TokenType,
) -> ExprResult {
    let mut expr = higher_precedence(cursor, sink)?;

    while let Some(operator) = cursor.advance_if_match(token_type) {
        let right = higher_precedence(cursor, sink)?;
        expr = Expr::Logical {
            left: Box::new(expr),
            operator,
            right: Box::new(right),
        };
    }

    Ok(expr)
}

fn equality(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> ExprResult {
    binary_left_associative(
        cursor,
        sink,
        comparison,
        &[TokenType::BangEqual, TokenType::EqualEqual],
    )
}

fn comparison(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> ExprResult {
    binary_left_associative(
        cursor,
        sink,
        term,
        &[
            TokenType::Greater,
            TokenType::GreaterEqual,
            TokenType::Less,
            TokenType::LessEqual,
        ],
    )
}

fn term(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> ExprResult {
    binary_left_associative(cursor, sink, factor, &[TokenType::Minus, TokenType::Plus])
}

fn factor(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> ExprResult {
    binary_left_associative(cursor, sink, unary, &[TokenType::Slash, TokenType::Star])
}

// Parse a binary left associative expression as long as the current token matches one of the given types
fn binary_left_associative(
    cursor: &mut TokenCursor,
    sink: &mut ErrorSink,
    higher_precedence: fn(&mut TokenCursor, &mut ErrorSink) -> ExprResult,
    types: &[TokenType],
) -> ExprResult {
    let mut expr = higher_precedence(cursor, sink)?;

    while let Some(operator) = cursor.advance_if_any_match(types) {
        let right = higher_precedence(cursor, sink)?;
        expr = Expr::Binary {
            left: Box::new(expr),
            operator,
            right: Box::new(right),
        };
    }

    Ok(expr)
}

fn unary(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> ExprResult {
    if let Some(operator) = cursor.advance_if_any_match(&[TokenType::Bang, TokenType::Minus]) {
        let right = unary(cursor, sink)?;
        return Ok(Expr::Unary {
            operator,
            right: Box::new(right),
        });
    }

    call(cursor, sink)
}

fn call(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> ExprResult {
    let mut expr = primary(cursor, sink)?;

    // each '(' turns the expression parsed so far into a callee
    while cursor.advance_if_match(&TokenType::LeftParen).is_some() {
        expr = finish_call(cursor, sink, expr)?;
    }

    Ok(expr)
}

fn finish_call(cursor: &mut TokenCursor, sink: &mut ErrorSink, callee: Expr) -> ExprResult {
    let mut arguments = Vec::new();

    if cursor.peek().token_type != TokenType::RightParen {
        loop {
            if arguments.len() >= 255 {
                sink.syntax_error(&SyntaxError::at_token(
                    cursor.peek(),
                    "Can't have more than 255 arguments.",
                ));
            }
            arguments.push(expression(cursor, sink)?);

            // keep grabbing the next argument as long as the following token is a comma
            if cursor.advance_if_match(&TokenType::Comma).is_none() {
                break;
            }
        }
    }

    let paren = consume(cursor, &TokenType::RightParen, "Expect ')' after arguments.")?;

    Ok(Expr::Call {
        callee: Box::new(callee),
        paren,
        arguments,
    })
}

fn primary(cursor: &mut TokenCursor, sink: &mut ErrorSink) -> ExprResult {
    let current = cursor.peek();

    match current.token_type {
        TokenType::False
        | TokenType::True
        | TokenType::Nil
        | TokenType::Number(_)
        | TokenType::String(_) => {
            let literal = Expr::Literal {
                value: LiteralValue::from(current),
            };
            cursor.advance();
            Ok(literal)
        }
        TokenType::Identifier(_) => {
            let name = current.clone();
            cursor.advance();
            Ok(Expr::Variable { name })
        }
        TokenType::LeftParen => {
            cursor.advance();
            let expr = expression(cursor, sink)?;
            consume(cursor, &TokenType::RightParen, "Expect ')' after expression.")?;
            Ok(Expr::Grouping {
                expression: Box::new(expr),
            })
        }
        _ => Err(SyntaxError::at_token(current, "Expect expression.")),
    }
}

fn consume(
    cursor: &mut TokenCursor,
    token_type: &TokenType,
    message: &str,
) -> Result<Token, SyntaxError> {
    cursor
        .advance_if_match(token_type)
        .ok_or_else(|| SyntaxError::at_token(cursor.peek(), message))
}

fn consume_identifier(cursor: &mut TokenCursor, message: &str) -> Result<Token, SyntaxError> {
    if matches!(cursor.peek().token_type, TokenType::Identifier(_)) {
        let name = cursor.peek().clone();
        cursor.advance();
        Ok(name)
    } else {
        Err(SyntaxError::at_token(cursor.peek(), message))
    }
}

// Discard tokens until just past a ';' or just before a token that can begin a
// statement, leaving the cursor at a plausible declaration boundary.
fn synchronize(cursor: &mut TokenCursor) {
    cursor.advance();

    while !cursor.at_end() {
        if cursor.previous().token_type == TokenType::Semicolon {
            return;
        }

        match cursor.peek().token_type {
            TokenType::Class
            | TokenType::Fun
            | TokenType::Var
            | TokenType::For
            | TokenType::If
            | TokenType::While
            | TokenType::Print
            | TokenType::Return => return,
            _ => cursor.advance(),
        }
    }
}

struct TokenCursor<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> TokenCursor<'a> {
    fn new(tokens: &'a [Token]) -> TokenCursor<'a> {
        TokenCursor { tokens, index: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.index]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.index - 1]
    }

    // never steps past the end-of-file token
    fn advance(&mut self) {
        if !self.at_end() {
            self.index += 1;
        }
    }

    fn at_end(&self) -> bool {
        matches!(self.tokens[self.index].token_type, TokenType::Eof)
    }

    fn advance_if_match(&mut self, token_type: &TokenType) -> Option<Token> {
        let token = self.peek();
        if token.token_type == *token_type {
            let cloned = token.clone();
            self.advance();
            Some(cloned)
        } else {
            None
        }
    }

    // TokenType also wraps literal values which affect equality comparisons,
    // so this is only used with non-literal token types
    fn advance_if_any_match(&mut self, types: &[TokenType]) -> Option<Token> {
        let token = self.peek();
        if types.contains(&token.token_type) {
            let cloned = token.clone();
            self.advance();
            Some(cloned)
        } else {
            None
        }
    }
}
