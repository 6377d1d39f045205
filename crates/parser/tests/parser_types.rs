//! Type grammar: struct bodies, embedded fields, function types.

use cee_parser::ast::*;

fn parse_ok(src: &str) -> SourceFile {
    let (file, diags) = cee_parser::parse(src);
    assert!(diags.is_empty(), "unexpected diagnostics: {diags:#?}");
    file
}

fn var_type(src: &str) -> Type {
    let file = parse_ok(src);
    assert_eq!(file.decls.len(), 1);
    match file.decls.into_iter().next().unwrap() {
        Stmt::Gen(decl) => decl.typ,
        other => panic!("want var declaration, got {other:?}"),
    }
}

fn func_type(src: &str) -> FuncType {
    let file = parse_ok(src);
    match file.decls.into_iter().next().unwrap() {
        Stmt::Func(decl) => decl.typ,
        other => panic!("want fun declaration, got {other:?}"),
    }
}

fn names(idents: &[Ident]) -> Vec<&str> {
    idents.iter().map(|i| i.name()).collect()
}

fn alias_name(typ: &Type) -> &str {
    match typ {
        Type::Alias(alias) => alias.ident.name(),
        other => panic!("want type alias, got {other:?}"),
    }
}

#[test]
fn struct_with_grouped_plain_and_embedded_fields() {
    let typ = var_type(
        "var combined struct {\n  fieldA, fieldB TypeAlias\n  fieldC TypeAlias\n  Combination\n}\n",
    );
    let Type::Struct(st) = typ else {
        panic!("want struct type")
    };
    assert_eq!(st.fields.len(), 3);

    assert_eq!(names(&st.fields[0].idents), vec!["fieldA", "fieldB"]);
    assert_eq!(alias_name(&st.fields[0].typ), "TypeAlias");

    assert_eq!(names(&st.fields[1].idents), vec!["fieldC"]);
    assert_eq!(alias_name(&st.fields[1].typ), "TypeAlias");

    // The embedded field has no identifiers and an alias type.
    assert!(st.fields[2].idents.is_empty());
    assert_eq!(alias_name(&st.fields[2].typ), "Combination");
}

#[test]
fn struct_fields_with_explicit_semicolons() {
    let typ = var_type("var s struct { a int; b int; Emb; }\n");
    let Type::Struct(st) = typ else {
        panic!("want struct type")
    };
    assert_eq!(st.fields.len(), 3);
    assert!(st.fields[2].idents.is_empty());
}

#[test]
fn empty_struct() {
    let typ = var_type("var s struct {}\n");
    let Type::Struct(st) = typ else {
        panic!("want struct type")
    };
    assert!(st.fields.is_empty());
}

#[test]
fn nested_struct_fields() {
    let typ = var_type(
        "var s struct {\n  Combination\n  fieldA struct {\n    fieldAA, fieldAB int\n  }\n  fieldB int\n}\n",
    );
    let Type::Struct(st) = typ else {
        panic!("want struct type")
    };
    assert_eq!(st.fields.len(), 3);
    let Type::Struct(inner) = &st.fields[1].typ else {
        panic!("want nested struct")
    };
    assert_eq!(inner.fields.len(), 1);
    assert_eq!(names(&inner.fields[0].idents), vec!["fieldAA", "fieldAB"]);
}

#[test]
fn func_type_params_and_results() {
    let typ = func_type("fun F(paramA, paramB int, paramC int) (int, int, struct {})");
    assert_eq!(typ.params.len(), 2);
    assert_eq!(names(&typ.params[0].idents), vec!["paramA", "paramB"]);
    assert_eq!(names(&typ.params[1].idents), vec!["paramC"]);

    assert_eq!(typ.results.len(), 3);
    assert_eq!(alias_name(&typ.results[0]), "int");
    assert_eq!(alias_name(&typ.results[1]), "int");
    let Type::Struct(st) = &typ.results[2] else {
        panic!("want struct result")
    };
    assert!(st.fields.is_empty());
}

#[test]
fn func_type_empty_params_and_results() {
    let typ = func_type("fun f() ()");
    assert!(typ.params.is_empty());
    assert!(typ.results.is_empty());

    let typ = func_type("fun f()");
    assert!(typ.params.is_empty());
    assert!(typ.results.is_empty());
}

#[test]
fn func_type_trailing_commas() {
    let typ = func_type("fun f(a, b int,) (int,)");
    assert_eq!(typ.params.len(), 1);
    assert_eq!(typ.results.len(), 1);
}

#[test]
fn curried_result_clause() {
    let typ = func_type("fun adder(x int) fun (y int) (int)");
    assert_eq!(typ.params.len(), 1);
    assert_eq!(typ.results.len(), 1);
    let Type::Func(inner) = &typ.results[0] else {
        panic!("want function-typed result")
    };
    assert_eq!(names(&inner.params[0].idents), vec!["y"]);
    assert_eq!(inner.results.len(), 1);
}

#[test]
fn func_type_in_type_position() {
    let typ = var_type("var handler (n int) (int)\n");
    let Type::Func(ft) = typ else {
        panic!("want function type")
    };
    assert_eq!(names(&ft.params[0].idents), vec!["n"]);
    assert_eq!(ft.results.len(), 1);
}

#[test]
fn trait_shell() {
    let typ = var_type("var t trait { }\n");
    assert!(matches!(typ, Type::Trait(_)));
}

#[test]
fn legacy_interface_spelling() {
    let typ = var_type("var t interface { }\n");
    assert!(matches!(typ, Type::Trait(_)));
}

#[test]
fn canonical_struct_text() {
    use cee_parser::print::type_to_string;

    let typ = var_type("var s struct {\n  fieldA, fieldB TypeAlias\n  Combination\n}\n");
    assert_eq!(
        type_to_string(&typ),
        "struct { fieldA, fieldB TypeAlias; Combination; }"
    );

    let typ = var_type("var f (n int) (int)\n");
    assert_eq!(type_to_string(&typ), "(n int) (int)");
}

#[test]
fn node_ranges_nest() {
    let file = parse_ok("var s struct { a int; }\n");
    let Stmt::Gen(decl) = &file.decls[0] else {
        panic!()
    };
    assert!(file.range.contains(&decl.range));
    assert!(decl.range.contains(&decl.typ.pos_range()));
    let Type::Struct(st) = &decl.typ else { panic!() };
    for field in &st.fields {
        assert!(st.range.contains(&field.range));
        assert!(field.range.contains(&field.typ.pos_range()));
    }
}
