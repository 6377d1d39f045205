//! Canonical pretty printer.
//!
//! Produces reparseable text for well-formed trees: explicit semicolons
//! between statements and struct fields, and parentheses around composite
//! operands so the printed form reproduces the original grouping under the
//! uniform-precedence grammar. Sentinel nodes print as placeholders and are
//! outside the round-trip contract.

use crate::ast::*;

pub struct Printer {
    out: String,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self { out: String::new() }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn print(&mut self, s: &str) {
        self.out.push_str(s);
    }

    pub fn file(&mut self, file: &SourceFile) {
        for decl in &file.decls {
            self.stmt(decl);
            self.print(";\n");
        }
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    pub fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Import(s) => self.import_decl(s),
            Stmt::Gen(s) => {
                self.print("var ");
                self.gen_decl(s);
            }
            Stmt::Val(s) => {
                self.print("val ");
                self.print(s.name.name());
                self.print(" = ");
                self.expr(&s.value);
            }
            Stmt::Func(s) => self.func_decl(s),
            Stmt::Return(s) => {
                self.print("return");
                for (i, expr) in s.exprs.iter().enumerate() {
                    self.print(if i == 0 { " " } else { ", " });
                    self.expr(expr);
                }
            }
            Stmt::Assign(s) => {
                self.expr(&s.left);
                self.print(" = ");
                self.expr(&s.right);
            }
            Stmt::Break(_) => self.print("break"),
            Stmt::Continue(_) => self.print("continue"),
            Stmt::Loop(s) => {
                self.print("for ");
                self.expr(&s.cond);
                self.print(" ");
                self.block(&s.body);
            }
            Stmt::Foreach(s) => {
                self.print("for ");
                self.ident_list(&s.idents);
                self.print(" range ");
                self.expr(&s.iterable);
                self.print(" ");
                self.block(&s.body);
            }
            Stmt::EndlessFor(s) => {
                self.print("for ");
                self.block(&s.body);
            }
            Stmt::Expr(e) => self.expr(e),
        }
    }

    fn import_decl(&mut self, decl: &ImportDecl) {
        self.print("import ");
        if let Some(alias) = &decl.alias {
            self.print(alias.name());
            self.print(" ");
        }
        self.print(&decl.canonical_name.token.literal);
    }

    fn func_decl(&mut self, decl: &FuncDecl) {
        self.print("fun ");
        if let Some(name) = &decl.name {
            self.print(name.name());
        }
        self.func_type(&decl.typ);
        if let Some(body) = &decl.body {
            self.print(" ");
            self.block(body);
        }
    }

    fn gen_decl(&mut self, decl: &GenDecl) {
        if decl.idents.is_empty() {
            // embedded field: type only
            self.typ(&decl.typ);
            return;
        }
        self.ident_list(&decl.idents);
        self.print(" ");
        self.typ(&decl.typ);
    }

    fn ident_list(&mut self, idents: &[Ident]) {
        for (i, ident) in idents.iter().enumerate() {
            if i > 0 {
                self.print(", ");
            }
            self.print(ident.name());
        }
    }

    pub fn block(&mut self, block: &StmtBlockExpr) {
        if block.stmts.is_empty() {
            self.print("{ }");
            return;
        }
        self.print("{");
        for stmt in &block.stmts {
            self.print(" ");
            self.stmt(stmt);
            self.print(";");
        }
        self.print(" }");
    }

    // -------------------------------------------------------------------------
    // Types
    // -------------------------------------------------------------------------

    pub fn typ(&mut self, typ: &Type) {
        match typ {
            Type::Alias(t) => self.print(t.ident.name()),
            Type::Struct(t) => self.struct_type(t),
            Type::Trait(_) => self.print("trait { }"),
            Type::Func(t) => self.func_type(t),
        }
    }

    fn struct_type(&mut self, typ: &StructType) {
        if typ.fields.is_empty() {
            self.print("struct { }");
            return;
        }
        self.print("struct {");
        for field in &typ.fields {
            self.print(" ");
            self.gen_decl(field);
            self.print(";");
        }
        self.print(" }");
    }

    fn func_type(&mut self, typ: &FuncType) {
        self.print("(");
        for (i, param) in typ.params.iter().enumerate() {
            if i > 0 {
                self.print(", ");
            }
            self.gen_decl(param);
        }
        self.print(")");

        // A single function-typed result round-trips through the curried
        // spelling; anything else is a parenthesized type list.
        match typ.results.as_slice() {
            [] => {}
            [Type::Func(result)] => {
                self.print(" fun ");
                self.func_type(result);
            }
            results => {
                self.print(" (");
                for (i, result) in results.iter().enumerate() {
                    if i > 0 {
                        self.print(", ");
                    }
                    self.typ(result);
                }
                self.print(")");
            }
        }
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    pub fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Bad(_) => self.print("<bad>"),
            Expr::Literal(e) => self.print(&e.token.literal),
            Expr::Ident(e) => self.print(e.name()),
            Expr::Unary(e) => {
                if e.is_prefix() {
                    self.print(&e.operator.literal);
                    self.operand(&e.expr);
                } else {
                    self.operand(&e.expr);
                    self.print(&e.operator.literal);
                }
            }
            Expr::Binary(e) => {
                // Left nesting is the natural left-associative reading; a
                // binary right operand needs parentheses to keep grouping.
                if matches!(*e.left, Expr::Binary(_) | Expr::Unary(_)) || is_primary(&e.left) {
                    self.expr(&e.left);
                } else {
                    self.parenthesized(&e.left);
                }
                self.print(" ");
                self.print(&e.operator.literal);
                self.print(" ");
                if matches!(*e.right, Expr::Unary(_)) || is_primary(&e.right) {
                    self.expr(&e.right);
                } else {
                    self.parenthesized(&e.right);
                }
            }
            Expr::Ellipsis(e) => {
                self.operand(&e.array);
                self.print("...");
            }
            Expr::Call(e) => {
                self.operand(&e.callee);
                self.print("(");
                for (i, arg) in e.args.iter().enumerate() {
                    if i > 0 {
                        self.print(", ");
                    }
                    self.expr(arg);
                }
                self.print(")");
            }
            Expr::Index(e) => {
                self.operand(&e.expr);
                self.print("[");
                self.expr(&e.index);
                self.print("]");
            }
            Expr::Member(e) => {
                self.operand(&e.expr);
                self.print(".");
                self.print(e.member.name());
            }
            Expr::Cast(_) => self.print("<cast>"),
            Expr::Branch(e) => {
                self.print("if ");
                self.expr(&e.cond);
                self.print(" ");
                self.block(&e.branch);
                if let Some(else_branch) = &e.else_branch {
                    self.print(" else ");
                    self.block(else_branch);
                }
            }
            Expr::Match(e) => {
                self.print("switch ");
                self.expr(&e.subject);
                for pattern in &e.patterns {
                    self.print(" ");
                    self.block(pattern);
                }
            }
            Expr::Block(e) => self.block(e),
            Expr::Func(e) => self.func_decl(e),
        }
    }

    /// Prints an operand of a unary, call, index or member expression,
    /// parenthesizing anything that is not primary.
    fn operand(&mut self, expr: &Expr) {
        if is_primary(expr) {
            self.expr(expr);
        } else {
            self.parenthesized(expr);
        }
    }

    fn parenthesized(&mut self, expr: &Expr) {
        self.print("(");
        self.expr(expr);
        self.print(")");
    }
}

fn is_primary(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Literal(_) | Expr::Ident(_) | Expr::Call(_) | Expr::Index(_) | Expr::Member(_)
    )
}

/// Canonical text of a compilation unit.
pub fn file_to_string(file: &SourceFile) -> String {
    let mut printer = Printer::new();
    printer.file(file);
    printer.finish()
}

/// Canonical text of a single expression.
pub fn expr_to_string(expr: &Expr) -> String {
    let mut printer = Printer::new();
    printer.expr(expr);
    printer.finish()
}

/// Canonical text of a single type.
pub fn type_to_string(typ: &Type) -> String {
    let mut printer = Printer::new();
    printer.typ(typ);
    printer.finish()
}
