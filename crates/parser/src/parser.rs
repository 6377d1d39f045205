//! Recursive-descent parser.
//!
//! Every `parse_*` operation starts with the current token on the first
//! token of its production and leaves it on the first token after it.
//!
//! Errors never abort the compilation unit: an unexpected token is recorded
//! as a diagnostic, the offending production yields a `BadExpr` sentinel, and
//! the parser unwinds to the innermost expected closing delimiter (tracked on
//! an explicit stack) or the next statement boundary, then resumes.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::ast::*;
use crate::diag::Diagnostic;
use crate::token::{PosRange, Position, Token, TokenKind};
use crate::tokenizer::Tokenizer;

/// Parses a compilation unit. Always returns a (possibly partial) tree
/// together with every accumulated diagnostic, in source order. A well-formed
/// input produces an empty diagnostics sequence.
pub fn parse(src: &str) -> (SourceFile, Vec<Diagnostic>) {
    let mut parser = Parser::new(src);
    let file = parser.parse_file();
    let mut diags = parser.diags;
    diags.sort_by_key(|d| d.range.from.offset);
    debug!(
        decls = file.decls.len(),
        diagnostics = diags.len(),
        "parsed compilation unit"
    );
    (file, diags)
}

/// Marker for "a diagnostic was recorded; unwind to a recovery point".
struct Recovered;

type PResult<T> = Result<T, Recovered>;

struct Parser {
    tokenizer: Tokenizer,
    diags: Vec<Diagnostic>,
    /// Expected closing delimiters, innermost last.
    closers: SmallVec<[TokenKind; 8]>,
    /// End position of the most recently consumed token.
    prev_end: Position,
}

impl Parser {
    fn new(src: &str) -> Self {
        let mut parser = Self {
            tokenizer: Tokenizer::new(src),
            diags: Vec::new(),
            closers: SmallVec::new(),
            prev_end: Position::default(),
        };
        parser.bump();
        parser
    }

    // -------------------------------------------------------------------------
    // Token plumbing
    // -------------------------------------------------------------------------

    #[inline]
    fn current(&self) -> &Token {
        self.tokenizer.current()
    }

    #[inline]
    fn kind(&self) -> TokenKind {
        self.current().kind
    }

    fn bump(&mut self) {
        self.prev_end = self.current().range.to;
        if let Err(err) = self.tokenizer.advance() {
            self.diags.push(Diagnostic::from(err));
        }
    }

    #[inline]
    fn end_range(&self, from: Position) -> PosRange {
        PosRange::new(from, self.prev_end)
    }

    fn report_unexpected(&mut self, want: &[TokenKind]) {
        // An `Illegal` token already carries its own lexical diagnostic.
        if self.kind() != TokenKind::Illegal {
            let have = self.current().clone();
            self.diags.push(Diagnostic::unexpected(have, want));
        }
    }

    fn unexpected<T>(&mut self, want: &[TokenKind]) -> PResult<T> {
        self.report_unexpected(want);
        Err(Recovered)
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.kind() == kind {
            let token = self.current().clone();
            self.bump();
            Ok(token)
        } else {
            self.unexpected(&[kind])
        }
    }

    fn expect_ident(&mut self) -> PResult<Ident> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(Ident { token })
    }

    fn expect_open(&mut self, open: TokenKind, close: TokenKind) -> PResult<Token> {
        let token = self.expect(open)?;
        self.closers.push(close);
        Ok(token)
    }

    fn expect_close(&mut self, close: TokenKind) -> PResult<Token> {
        if self.kind() == close {
            self.closers.pop();
            let token = self.current().clone();
            self.bump();
            Ok(token)
        } else {
            self.unexpected(&[close])
        }
    }

    /// A statement terminator: a semicolon (consumed), or a closing brace or
    /// end of input (left in place).
    fn expect_terminator(&mut self) -> PResult<()> {
        match self.kind() {
            TokenKind::Semicolon => {
                self.bump();
                Ok(())
            }
            TokenKind::RBrace | TokenKind::Eof => Ok(()),
            _ => self.unexpected(&[TokenKind::Semicolon]),
        }
    }

    /// Unwinds the delimiter stack to `depth`, then skips tokens until the
    /// next statement boundary: a semicolon (consumed), the innermost
    /// expected closer (consumed and popped), or end of input.
    fn sync(&mut self, depth: usize) {
        self.closers.truncate(depth);
        let target = self.closers.last().copied();
        loop {
            let kind = self.kind();
            if kind == TokenKind::Eof {
                return;
            }
            if kind == TokenKind::Semicolon {
                self.bump();
                return;
            }
            if Some(kind) == target {
                self.closers.pop();
                self.bump();
                return;
            }
            trace!(skipped = %self.current(), "error recovery");
            self.bump();
        }
    }

    fn bad_stmt(&self) -> Stmt {
        Stmt::Expr(Expr::Bad(BadExpr {
            range: self.current().range,
        }))
    }

    // -------------------------------------------------------------------------
    // Compilation unit
    // -------------------------------------------------------------------------

    fn parse_file(&mut self) -> SourceFile {
        let from = self.current().range.from;
        let mut decls = Vec::new();
        loop {
            match self.kind() {
                TokenKind::Eof => break,
                TokenKind::Semicolon => self.bump(), // empty statement
                _ => match self.parse_top_decl() {
                    Ok(decl) => decls.push(decl),
                    Err(Recovered) => {
                        decls.push(self.bad_stmt());
                        self.sync(0);
                    }
                },
            }
        }
        SourceFile {
            range: PosRange::new(from, self.current().range.to),
            decls,
        }
    }

    fn parse_top_decl(&mut self) -> PResult<Stmt> {
        let stmt = match self.kind() {
            TokenKind::Import => Stmt::Import(self.parse_import_decl()?),
            TokenKind::Fun => Stmt::Func(self.parse_func_decl()?),
            TokenKind::Var => Stmt::Gen(self.parse_var_decl()?),
            TokenKind::Val => Stmt::Val(self.parse_val_decl()?),
            _ => {
                return self.unexpected(&[
                    TokenKind::Import,
                    TokenKind::Fun,
                    TokenKind::Var,
                    TokenKind::Val,
                ])
            }
        };
        self.expect_terminator()?;
        Ok(stmt)
    }

    /// `import Ident? String` or `import String as Ident`. The `as` form
    /// uses a contextual identifier, not a keyword.
    fn parse_import_decl(&mut self) -> PResult<ImportDecl> {
        let from = self.current().range.from;
        self.bump(); // `import`

        let mut alias = None;
        if self.kind() == TokenKind::Ident {
            alias = Some(self.expect_ident()?);
        }
        let canonical_name = LiteralValue {
            token: self.expect(TokenKind::Str)?,
        };
        if alias.is_none() && self.kind() == TokenKind::Ident && self.current().literal == "as" {
            self.bump();
            alias = Some(self.expect_ident()?);
        }

        Ok(ImportDecl {
            range: self.end_range(from),
            canonical_name,
            alias,
        })
    }

    /// `var IdentList Type`.
    fn parse_var_decl(&mut self) -> PResult<GenDecl> {
        let from = self.current().range.from;
        self.bump(); // `var`
        let idents = self.parse_ident_list()?;
        let typ = self.parse_type()?;
        Ok(GenDecl {
            range: self.end_range(from),
            idents,
            typ,
        })
    }

    /// `val Ident = Expr`.
    fn parse_val_decl(&mut self) -> PResult<ValDecl> {
        let from = self.current().range.from;
        self.bump(); // `val`
        let name = self.expect_ident()?;
        self.expect(TokenKind::Assign)?;
        let value = self.parse_expr()?;
        Ok(ValDecl {
            range: self.end_range(from),
            name,
            value,
        })
    }

    /// `fun Ident? FuncType Block?`.
    fn parse_func_decl(&mut self) -> PResult<FuncDecl> {
        let from = self.current().range.from;
        self.bump(); // `fun`

        let name = if self.kind() == TokenKind::Ident {
            Some(self.expect_ident()?)
        } else {
            None
        };
        let typ = self.parse_func_type()?;
        let body = if self.kind() == TokenKind::LBrace {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(FuncDecl {
            range: self.end_range(from),
            typ,
            name,
            body,
        })
    }

    // -------------------------------------------------------------------------
    // Types
    // -------------------------------------------------------------------------

    fn parse_type(&mut self) -> PResult<Type> {
        match self.kind() {
            TokenKind::Struct => Ok(Type::Struct(self.parse_struct_type()?)),
            TokenKind::Trait => Ok(Type::Trait(self.parse_trait_type()?)),
            TokenKind::Ident => Ok(Type::Alias(TypeAlias {
                ident: self.expect_ident()?,
            })),
            TokenKind::LParen => Ok(Type::Func(self.parse_func_type()?)),
            TokenKind::Fun => {
                self.bump();
                Ok(Type::Func(self.parse_func_type()?))
            }
            _ => self.unexpected(&[
                TokenKind::Struct,
                TokenKind::Trait,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::Fun,
            ]),
        }
    }

    fn parse_type_list(&mut self, terminator: TokenKind) -> PResult<Vec<Type>> {
        let mut types = Vec::new();
        if self.kind() == terminator {
            return Ok(types);
        }
        loop {
            types.push(self.parse_type()?);
            if self.kind() == TokenKind::Comma {
                self.bump();
                if self.kind() == terminator {
                    break; // trailing comma
                }
            } else {
                break;
            }
        }
        Ok(types)
    }

    /// `struct { FieldDecl* }`. A field is an identifier list followed by a
    /// type, or a lone identifier (an embedded field, stored as a `GenDecl`
    /// with no identifiers and an alias type). Fields end at a semicolon.
    fn parse_struct_type(&mut self) -> PResult<StructType> {
        let from = self.current().range.from;
        self.bump(); // `struct`
        self.expect_open(TokenKind::LBrace, TokenKind::RBrace)?;

        let mut fields = Vec::new();
        while self.kind() == TokenKind::Ident {
            let field_from = self.current().range.from;
            let idents = self.parse_ident_list()?;

            if matches!(self.kind(), TokenKind::Semicolon | TokenKind::RBrace) {
                if idents.len() != 1 {
                    return self.unexpected(&[
                        TokenKind::Struct,
                        TokenKind::Trait,
                        TokenKind::Ident,
                    ]);
                }
                let ident = idents.into_iter().next().expect("one identifier");
                fields.push(GenDecl {
                    range: ident.pos_range(),
                    idents: Vec::new(),
                    typ: Type::Alias(TypeAlias { ident }),
                });
            } else {
                let typ = self.parse_type()?;
                fields.push(GenDecl {
                    range: self.end_range(field_from),
                    idents,
                    typ,
                });
            }

            if self.kind() == TokenKind::Semicolon {
                self.bump();
            }
        }

        self.expect_close(TokenKind::RBrace)?;
        Ok(StructType {
            range: self.end_range(from),
            fields,
        })
    }

    /// Only the `trait { }` shell is accepted for now.
    fn parse_trait_type(&mut self) -> PResult<TraitType> {
        let from = self.current().range.from;
        self.bump(); // `trait`
        self.expect_open(TokenKind::LBrace, TokenKind::RBrace)?;
        self.expect_close(TokenKind::RBrace)?;
        Ok(TraitType {
            range: self.end_range(from),
        })
    }

    /// `( GenDeclList? )` followed by a result clause: `( TypeList )`, a
    /// curried `fun FuncType`, or nothing.
    fn parse_func_type(&mut self) -> PResult<FuncType> {
        let from = self.current().range.from;
        self.expect_open(TokenKind::LParen, TokenKind::RParen)?;
        let params = if self.kind() == TokenKind::RParen {
            Vec::new()
        } else {
            self.parse_gen_decl_list(TokenKind::RParen)?
        };
        self.expect_close(TokenKind::RParen)?;

        let results = match self.kind() {
            TokenKind::LParen => {
                self.expect_open(TokenKind::LParen, TokenKind::RParen)?;
                let types = self.parse_type_list(TokenKind::RParen)?;
                self.expect_close(TokenKind::RParen)?;
                types
            }
            TokenKind::Fun => {
                self.bump();
                vec![Type::Func(self.parse_func_type()?)]
            }
            _ => Vec::new(),
        };

        Ok(FuncType {
            range: self.end_range(from),
            params,
            results,
        })
    }

    fn parse_gen_decl(&mut self) -> PResult<GenDecl> {
        let from = self.current().range.from;
        let idents = self.parse_ident_list()?;
        let typ = self.parse_type()?;
        Ok(GenDecl {
            range: self.end_range(from),
            idents,
            typ,
        })
    }

    fn parse_gen_decl_list(&mut self, terminator: TokenKind) -> PResult<Vec<GenDecl>> {
        let mut decls = Vec::new();
        loop {
            decls.push(self.parse_gen_decl()?);
            if self.kind() == TokenKind::Comma {
                self.bump();
                if self.kind() == terminator {
                    break; // trailing comma
                }
            } else {
                break;
            }
        }
        Ok(decls)
    }

    /// `Ident (, Ident)*`; a comma before a non-identifier ends the list.
    fn parse_ident_list(&mut self) -> PResult<Vec<Ident>> {
        let mut idents = vec![self.expect_ident()?];
        while self.kind() == TokenKind::Comma {
            self.bump();
            if self.kind() != TokenKind::Ident {
                break;
            }
            idents.push(self.expect_ident()?);
        }
        Ok(idents)
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    /// Binary layer: left-associative chaining with uniform precedence over
    /// the recognized binary operator set.
    fn parse_expr(&mut self) -> PResult<Expr> {
        let left = self.parse_short_expr()?;
        self.parse_binary_rest(left)
    }

    fn parse_binary_rest(&mut self, mut left: Expr) -> PResult<Expr> {
        while self.kind().is_binary_operator() {
            let operator = self.current().clone();
            self.bump();
            let right = self.parse_short_expr()?;
            let range = left.pos_range().span_to(right.pos_range());
            left = Expr::Binary(BinaryExpr {
                range,
                operator,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    /// Prefix-unary layer wrapping an operand and its suffix chain.
    fn parse_short_expr(&mut self) -> PResult<Expr> {
        if self.kind().is_prefix_operator() {
            let operator = self.current().clone();
            self.bump();
            let expr = self.parse_short_expr()?;
            let range = operator.range.span_to(expr.pos_range());
            return Ok(Expr::Unary(UnaryExpr {
                range,
                operator,
                expr: Box::new(expr),
            }));
        }
        let operand = self.parse_operand()?;
        self.parse_suffix_chain(operand)
    }

    /// A literal, an identifier, a function literal, or a parenthesized
    /// expression.
    fn parse_operand(&mut self) -> PResult<Expr> {
        match self.kind() {
            TokenKind::Ident => Ok(Expr::Ident(self.expect_ident()?)),
            kind if kind.is_literal() => {
                let token = self.current().clone();
                self.bump();
                Ok(Expr::Literal(LiteralValue { token }))
            }
            TokenKind::Fun => Ok(Expr::Func(Box::new(self.parse_func_decl()?))),
            TokenKind::LParen => {
                self.expect_open(TokenKind::LParen, TokenKind::RParen)?;
                let expr = self.parse_expr()?;
                self.expect_close(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => self.unexpected(&[
                TokenKind::Ident,
                TokenKind::Int,
                TokenKind::Char,
                TokenKind::Str,
                TokenKind::Fun,
                TokenKind::LParen,
            ]),
        }
    }

    /// Extends an expression while the current token can continue it:
    /// member select, index, call, or a postfix unary operator.
    fn parse_suffix_chain(&mut self, mut expr: Expr) -> PResult<Expr> {
        loop {
            match self.kind() {
                TokenKind::Dot => {
                    self.bump();
                    let member = self.expect_ident()?;
                    let range = expr.pos_range().span_to(member.pos_range());
                    expr = Expr::Member(MemberSelectExpr {
                        range,
                        expr: Box::new(expr),
                        member,
                    });
                }
                TokenKind::LBrack => {
                    let from = expr.pos_range().from;
                    self.expect_open(TokenKind::LBrack, TokenKind::RBrack)?;
                    let index = self.parse_expr()?;
                    self.expect_close(TokenKind::RBrack)?;
                    expr = Expr::Index(IndexExpr {
                        range: self.end_range(from),
                        expr: Box::new(expr),
                        index: Box::new(index),
                    });
                }
                TokenKind::LParen => {
                    let from = expr.pos_range().from;
                    self.expect_open(TokenKind::LParen, TokenKind::RParen)?;
                    let args = self.parse_expr_list(TokenKind::RParen)?;
                    self.expect_close(TokenKind::RParen)?;
                    expr = Expr::Call(CallExpr {
                        range: self.end_range(from),
                        callee: Box::new(expr),
                        args,
                    });
                }
                kind if kind.is_postfix_operator() => {
                    let operator = self.current().clone();
                    self.bump();
                    let range = expr.pos_range().span_to(operator.range);
                    expr = Expr::Unary(UnaryExpr {
                        range,
                        operator,
                        expr: Box::new(expr),
                    });
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Comma-separated expressions up to `terminator`; trailing comma
    /// permitted; may be empty.
    fn parse_expr_list(&mut self, terminator: TokenKind) -> PResult<Vec<Expr>> {
        let mut exprs = Vec::new();
        if self.kind() == terminator {
            return Ok(exprs);
        }
        loop {
            exprs.push(self.parse_expr()?);
            if self.kind() == TokenKind::Comma {
                self.bump();
                if self.kind() == terminator {
                    break; // trailing comma
                }
            } else {
                break;
            }
        }
        Ok(exprs)
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    /// `{ Stmt* }`. Statement errors recover inside the block: the bad
    /// region is skipped up to the next statement boundary and a sentinel
    /// statement takes its place.
    fn parse_block(&mut self) -> PResult<StmtBlockExpr> {
        let from = self.current().range.from;
        self.expect_open(TokenKind::LBrace, TokenKind::RBrace)?;
        let depth = self.closers.len();

        let mut stmts = Vec::new();
        loop {
            match self.kind() {
                TokenKind::RBrace => {
                    self.closers.pop();
                    self.bump();
                    break;
                }
                TokenKind::Eof => {
                    self.report_unexpected(&[TokenKind::RBrace]);
                    self.closers.pop();
                    break;
                }
                TokenKind::Semicolon => self.bump(), // empty statement
                _ => match self.parse_stmt() {
                    Ok(stmt) => stmts.push(stmt),
                    Err(Recovered) => {
                        stmts.push(self.bad_stmt());
                        self.sync(depth);
                        if self.closers.len() < depth {
                            // recovery consumed our closing brace
                            break;
                        }
                    }
                },
            }
        }

        Ok(StmtBlockExpr {
            range: self.end_range(from),
            typ: None,
            stmts,
        })
    }

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        let stmt = match self.kind() {
            TokenKind::Return => Stmt::Return(self.parse_return_stmt()?),
            TokenKind::Var => Stmt::Gen(self.parse_var_decl()?),
            TokenKind::Val => Stmt::Val(self.parse_val_decl()?),
            TokenKind::Break => {
                let token = self.current().clone();
                self.bump();
                Stmt::Break(BreakStmt { range: token.range })
            }
            TokenKind::Continue => {
                let token = self.current().clone();
                self.bump();
                Stmt::Continue(ContinueStmt { range: token.range })
            }
            TokenKind::For => self.parse_for_stmt()?,
            TokenKind::If => Stmt::Expr(Expr::Branch(Box::new(self.parse_branch_expr()?))),
            TokenKind::LBrace => Stmt::Expr(Expr::Block(self.parse_block()?)),
            _ => {
                let expr = self.parse_expr()?;
                if self.kind() == TokenKind::Assign {
                    self.bump();
                    let right = self.parse_expr()?;
                    let range = expr.pos_range().span_to(right.pos_range());
                    Stmt::Assign(AssignStmt {
                        range,
                        left: expr,
                        right,
                    })
                } else {
                    Stmt::Expr(expr)
                }
            }
        };
        self.expect_terminator()?;
        Ok(stmt)
    }

    /// `return ExprList?`.
    fn parse_return_stmt(&mut self) -> PResult<ReturnStmt> {
        let from = self.current().range.from;
        self.bump(); // `return`

        let mut exprs = Vec::new();
        if !matches!(
            self.kind(),
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        ) {
            loop {
                exprs.push(self.parse_expr()?);
                if self.kind() == TokenKind::Comma {
                    self.bump();
                    if matches!(
                        self.kind(),
                        TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
                    ) {
                        break; // trailing comma
                    }
                } else {
                    break;
                }
            }
        }

        Ok(ReturnStmt {
            range: self.end_range(from),
            exprs,
        })
    }

    /// `if Expr Block (else Block)?`.
    fn parse_branch_expr(&mut self) -> PResult<BranchExpr> {
        let from = self.current().range.from;
        self.bump(); // `if`
        let cond = self.parse_expr()?;
        let branch = self.parse_block()?;
        let else_branch = if self.kind() == TokenKind::Else {
            self.bump();
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(BranchExpr {
            range: self.end_range(from),
            cond,
            branch,
            else_branch,
        })
    }

    /// The three `for` forms: `for { }`, `for IdentList range Expr { }`, and
    /// `for Expr { }`. A lone leading identifier that is not followed by
    /// `range` re-enters the expression grammar as the loop guard.
    fn parse_for_stmt(&mut self) -> PResult<Stmt> {
        let from = self.current().range.from;
        self.bump(); // `for`

        match self.kind() {
            TokenKind::LBrace => {
                let body = self.parse_block()?;
                Ok(Stmt::EndlessFor(Box::new(EndlessForStmt {
                    range: self.end_range(from),
                    body,
                })))
            }
            TokenKind::Ident => {
                let mut idents = self.parse_ident_list()?;
                if self.kind() == TokenKind::Range {
                    self.bump();
                    let iterable = self.parse_expr()?;
                    let body = self.parse_block()?;
                    return Ok(Stmt::Foreach(Box::new(ForeachStmt {
                        range: self.end_range(from),
                        idents,
                        iterable,
                        body,
                    })));
                }
                if idents.len() != 1 {
                    return self.unexpected(&[TokenKind::Range]);
                }
                let base = Expr::Ident(idents.pop().expect("one identifier"));
                let chained = self.parse_suffix_chain(base)?;
                let cond = self.parse_binary_rest(chained)?;
                let body = self.parse_block()?;
                Ok(Stmt::Loop(Box::new(LoopStmt {
                    range: self.end_range(from),
                    cond,
                    body,
                })))
            }
            _ => {
                let cond = self.parse_expr()?;
                let body = self.parse_block()?;
                Ok(Stmt::Loop(Box::new(LoopStmt {
                    range: self.end_range(from),
                    cond,
                    body,
                })))
            }
        }
    }
}
