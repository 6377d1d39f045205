//! Token classification and spelling tables.

use cee_parser::TokenKind;

#[test]
fn classes_are_disjoint() {
    let samples = [
        TokenKind::Illegal,
        TokenKind::Ident,
        TokenKind::Int,
        TokenKind::Float,
        TokenKind::Char,
        TokenKind::Str,
        TokenKind::Add,
        TokenKind::AndNotAssign,
        TokenKind::Ellipsis,
        TokenKind::Break,
        TokenKind::Val,
        TokenKind::LParen,
        TokenKind::Newline,
        TokenKind::Eof,
    ];
    for kind in samples {
        let classes = [
            kind.is_literal(),
            kind.is_operator(),
            kind.is_keyword(),
            kind.is_delimiter(),
        ];
        assert!(
            classes.iter().filter(|&&c| c).count() <= 1,
            "{kind:?} is in more than one class"
        );
    }

    assert!(TokenKind::Int.is_literal());
    assert!(TokenKind::Shl.is_operator());
    assert!(TokenKind::Val.is_keyword());
    assert!(TokenKind::Newline.is_delimiter());
    assert!(!TokenKind::Ident.is_keyword());
    assert!(!TokenKind::Eof.is_delimiter());
}

#[test]
fn operator_lookup_round_trips_through_spelling() {
    let spellings = [
        "+", "-", "*", "/", "%", "&", "|", "^", "<<", ">>", "&^", ".", "&&", "||", "==", "!=",
        "<=", ">=", "<", ">", "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=",
        "&^=", "!", "~", "...", "++", "--",
    ];
    for s in spellings {
        let kind = TokenKind::lookup_operator(s).unwrap_or_else(|| panic!("no operator for {s}"));
        assert!(kind.is_operator(), "{s} -> {kind:?}");
        assert_eq!(kind.spelling(), s);
    }
    assert!(TokenKind::lookup_operator(":=").is_none());
    assert!(TokenKind::lookup_operator("<-").is_none());
    assert!(TokenKind::lookup_operator("@").is_none());
}

#[test]
fn keyword_lookup_round_trips_through_spelling() {
    let spellings = [
        "break",
        "case",
        "chan",
        "const",
        "continue",
        "default",
        "defer",
        "else",
        "fallthrough",
        "for",
        "fun",
        "go",
        "goto",
        "if",
        "import",
        "trait",
        "map",
        "package",
        "range",
        "return",
        "switch",
        "select",
        "struct",
        "type",
        "var",
        "val",
    ];
    for s in spellings {
        let kind = TokenKind::lookup_keyword(s).unwrap_or_else(|| panic!("no keyword for {s}"));
        assert!(kind.is_keyword(), "{s} -> {kind:?}");
        assert_eq!(kind.spelling(), s);
    }
    // Legacy spelling promotes to the canonical kind.
    assert_eq!(TokenKind::lookup_keyword("interface"), Some(TokenKind::Trait));
    assert!(TokenKind::lookup_keyword("func").is_none());
    assert!(TokenKind::lookup_keyword("ident").is_none());
}

#[test]
fn delimiter_lookup() {
    for (ch, kind) in [
        ('{', TokenKind::LBrace),
        ('}', TokenKind::RBrace),
        ('[', TokenKind::LBrack),
        (']', TokenKind::RBrack),
        ('(', TokenKind::LParen),
        (')', TokenKind::RParen),
        (',', TokenKind::Comma),
        (';', TokenKind::Semicolon),
        (':', TokenKind::Colon),
        ('\n', TokenKind::Newline),
    ] {
        assert_eq!(TokenKind::delimiter(ch), Some(kind));
        assert!(kind.is_delimiter());
    }
    assert_eq!(TokenKind::delimiter('.'), None);
    assert_eq!(TokenKind::delimiter('"'), None);
}

#[test]
fn insertion_trigger_set() {
    let triggers = [
        TokenKind::Ident,
        TokenKind::Int,
        TokenKind::Float,
        TokenKind::Imag,
        TokenKind::Char,
        TokenKind::Str,
        TokenKind::RBrace,
        TokenKind::RBrack,
        TokenKind::RParen,
        TokenKind::Break,
        TokenKind::Continue,
        TokenKind::Return,
        TokenKind::Inc,
        TokenKind::Dec,
    ];
    for kind in triggers {
        assert!(kind.can_insert_semicolon(), "{kind:?}");
    }
    for kind in [
        TokenKind::Illegal,
        TokenKind::Add,
        TokenKind::Assign,
        TokenKind::LBrace,
        TokenKind::Comma,
        TokenKind::If,
        TokenKind::Fun,
        TokenKind::Semicolon,
        TokenKind::Eof,
    ] {
        assert!(!kind.can_insert_semicolon(), "{kind:?}");
    }
}

#[test]
fn expression_operator_subsets() {
    for kind in [
        TokenKind::Mul,
        TokenKind::Quo,
        TokenKind::Rem,
        TokenKind::Add,
        TokenKind::Sub,
        TokenKind::Shl,
        TokenKind::Shr,
        TokenKind::And,
        TokenKind::Or,
        TokenKind::Xor,
        TokenKind::LAnd,
        TokenKind::LOr,
        TokenKind::Eql,
        TokenKind::Neq,
        TokenKind::Lss,
        TokenKind::Leq,
        TokenKind::Gtr,
        TokenKind::Geq,
    ] {
        assert!(kind.is_binary_operator(), "{kind:?}");
    }
    assert!(!TokenKind::Assign.is_binary_operator());
    assert!(!TokenKind::AddAssign.is_binary_operator());
    assert!(!TokenKind::Dot.is_binary_operator());

    assert!(TokenKind::Not.is_prefix_operator());
    assert!(TokenKind::Tilde.is_prefix_operator());
    assert!(TokenKind::Inc.is_prefix_operator());
    assert!(!TokenKind::Quo.is_prefix_operator());

    assert!(TokenKind::Inc.is_postfix_operator());
    assert!(TokenKind::Dec.is_postfix_operator());
    assert!(!TokenKind::Not.is_postfix_operator());
}
