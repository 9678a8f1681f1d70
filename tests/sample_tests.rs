use std::fs;
use std::path::Path;

use ctree::ast::{NodeKind, SourceLocation};
use ctree::parser::{parse, Lexer};
use ctree::passes::{
    collect_declarations, extract_expressions, find_unsafe_calls, histogram, unparse,
    FinderConfig, Role, TypeClass,
};
use pretty_assertions::assert_eq;

fn sample() -> String {
    let path = Path::new("demos/sample.c");
    fs::read_to_string(path).expect("Failed to read sample file")
}

#[test]
fn test_sample_unsafe_calls() {
    let unit = parse(&sample()).expect("Parsing failed");
    let findings = find_unsafe_calls(&unit, FinderConfig::default());

    let found: Vec<_> = findings
        .iter()
        .map(|f| (f.callee.as_str(), f.location))
        .collect();
    assert_eq!(
        found,
        vec![
            ("gets", SourceLocation::new(39, 9)),
            ("strcpy", SourceLocation::new(42, 9)),
        ]
    );
}

#[test]
fn test_sample_declarations() {
    let unit = parse(&sample()).expect("Parsing failed");
    let declarations = collect_declarations(&unit);

    let find = |name: &str| {
        declarations
            .iter()
            .find(|d| d.name == name)
            .unwrap_or_else(|| panic!("{name} not declared"))
    };

    assert_eq!((find("entry_t").role, find("entry_t").class), (Role::Typedef, TypeClass::Aggregate));
    assert_eq!(find("visit_fn").class, TypeClass::Function);
    assert_eq!(find("length").role, Role::Member);
    assert_eq!(find("table").class, TypeClass::Array);
    assert_eq!(find("visit").class, TypeClass::Named);
    assert_eq!(find("data").class, TypeClass::Pointer);
    assert_eq!(find("ECHO").role, Role::Enumerator);
    assert_eq!((find("m").role, find("m").class), (Role::Local, TypeClass::Enum));

    let functions: Vec<_> = declarations
        .iter()
        .filter(|d| d.role == Role::Function)
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(functions, vec!["visit_all", "print_entry", "main"]);
}

#[test]
fn test_sample_shape() {
    let unit = parse(&sample()).expect("Parsing failed");
    let kinds = histogram(&unit);

    assert_eq!(kinds.count(NodeKind::ExternalDeclaration), 8);
    assert_eq!(kinds.count(NodeKind::FunctionDeclaration), 3);
    assert_eq!(kinds.count(NodeKind::TypeDeclaration), 2);
    assert_eq!(kinds.count(NodeKind::LabeledStatement), 3);
    assert_eq!(kinds.count(NodeKind::IterationStatement), 2);

    let in_main = extract_expressions(&unit)
        .into_iter()
        .filter(|e| e.scope.function.as_deref() == Some("main"))
        .count();
    assert_eq!(in_main, 14);
}

#[test]
fn test_sample_prints_back() {
    let source = sample();
    let unit = parse(&source).expect("Parsing failed");
    let printed = unparse(&unit);

    let lex = |text: &str| {
        Lexer::new(text)
            .tokenize()
            .expect("Lexing failed")
            .into_iter()
            .map(|t| t.text().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(lex(&printed), lex(&source));
    assert_eq!(parse(&printed).map(|u| histogram(&u)), Ok(histogram(&unit)));
}
