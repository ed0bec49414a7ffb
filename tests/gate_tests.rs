//! End-to-end behavior of the validation entry point.

use exprgate::errors::ErrorKind;
use exprgate::{check, ErrorCategory, Gate, GrammarTable, LiteralTypeSet, NodeKind};

// ============================================================================
// ADMISSION
// ============================================================================

#[test]
fn plain_arithmetic_is_admitted() {
    assert!(check("1 + 1").is_ok());
    assert!(check("(price - discount) * quantity").is_ok());
    assert!(check("2 ** 10 % 7").is_ok());
}

#[test]
fn calls_subscripts_and_attributes_are_admitted() {
    assert!(check("f(x)").is_ok());
    assert!(check("stats['item_scraped_count'] > 100").is_ok());
    assert!(check("response.meta.get('depth', 0)").is_ok());
    assert!(check("items[1:10:2]").is_ok());
    assert!(check("f(a, b, key=value, **extra)").is_ok());
}

#[test]
fn containers_and_comprehensions_are_admitted() {
    assert!(check("[1, 2, 3]").is_ok());
    assert!(check("{'a': 1, 'b': 2}").is_ok());
    assert!(check("{1, 2, 3}").is_ok());
    assert!(check("(1, 2)").is_ok());
    assert!(check("[i for i in range(10) if i % 2 == 0]").is_ok());
    assert!(check("{k: v for k, v in pairs}").is_ok());
    assert!(check("sum(x * x for x in xs)").is_ok());
}

#[test]
fn boolean_and_comparison_chains_are_admitted() {
    assert!(check("a and b or not c").is_ok());
    assert!(check("0 <= x < 10").is_ok());
    assert!(check("key in mapping and value is not None").is_ok());
    assert!(check("x if cond else y").is_ok());
}

#[test]
fn admitted_literals() {
    assert!(check("'text'").is_ok());
    assert!(check("3.14").is_ok());
    assert!(check("2j").is_ok());
    assert!(check("True").is_ok());
    assert!(check("None").is_ok());
}

// ============================================================================
// FAIL-CLOSED REJECTION
// ============================================================================

#[test]
fn lambda_is_rejected_by_default() {
    let err = check("lambda x: x + 1").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::DisallowedConstruct {
            kind: NodeKind::Lambda
        }
    ));
    assert_eq!(err.category(), ErrorCategory::Policy);
}

#[test]
fn starred_unpacking_is_rejected_by_default() {
    let err = check("f(*args)").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::DisallowedConstruct {
            kind: NodeKind::Starred
        }
    ));
}

#[test]
fn bytes_literal_is_rejected_by_default() {
    let err = check("b'abc'").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DisallowedLiteral { .. }));
    assert_eq!(err.category(), ErrorCategory::Policy);
}

#[test]
fn ellipsis_literal_is_rejected_by_default() {
    assert!(check("...").is_err());
}

#[test]
fn removing_a_kind_from_the_table_flips_the_verdict() {
    let text = "[i for i in range(10) if i % 2 == 0]";
    assert!(check(text).is_ok());

    let gate = Gate::new().with_grammar(GrammarTable::default_policy().forbid(NodeKind::Mod));
    let err = gate.check(text).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::DisallowedConstruct {
            kind: NodeKind::Mod
        }
    ));
}

#[test]
fn empty_table_rejects_even_a_bare_name() {
    let gate = Gate::new().with_grammar(GrammarTable::empty());
    assert!(gate.check("x").is_err());
}

#[test]
fn literal_set_is_independent_of_the_grammar_table() {
    let gate = Gate::new().with_literals(LiteralTypeSet::empty());
    assert!(gate.check("1").is_err());
    assert!(gate.check("x").is_ok());
}

// ============================================================================
// SHAPE BOUNDARIES
// ============================================================================

#[test]
fn empty_and_whitespace_input_is_rejected() {
    for text in ["", "   ", "\t", "\n\n", "# just a comment"] {
        let err = check(text).unwrap_err();
        assert!(
            matches!(err.kind, ErrorKind::EmptyExpression),
            "input {:?} should be empty, got {:?}",
            text,
            err.kind
        );
    }
}

#[test]
fn multiple_statements_are_rejected() {
    let err = check("1 + 1; 2 + 2").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::MultiStatementExpression { count: 2 }
    ));

    let err = check("1\n2\n3").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::MultiStatementExpression { count: 3 }
    ));
}

#[test]
fn statements_are_rejected_with_their_kind_named() {
    let cases = [
        ("x = 1", "assignment"),
        ("x += 1", "augmented assignment"),
        ("import os", "import"),
        ("from os import path", "from-import"),
        ("del x", "del"),
        ("pass", "pass"),
        ("return 1", "return"),
        ("raise x", "raise"),
        ("assert x", "assert"),
        ("global x", "global"),
    ];
    for (text, name) in cases {
        let err = check(text).unwrap_err();
        match err.kind {
            ErrorKind::NotAnExpression { statement } => {
                assert_eq!(statement, name, "for input {:?}", text)
            }
            other => panic!("input {:?}: expected NotAnExpression, got {:?}", text, other),
        }
    }
}

#[test]
fn equality_is_an_expression_but_assignment_is_not() {
    assert!(check("x == 1").is_ok());
    assert!(matches!(
        check("x = 1").unwrap_err().kind,
        ErrorKind::NotAnExpression { .. }
    ));
}

// ============================================================================
// SYNTAX AND RESOURCE BOUNDARIES
// ============================================================================

#[test]
fn malformed_input_is_a_syntax_error() {
    for text in ["1 +", "(1, 2", "f(", "a ..", "1 ** ** 2", "'unterminated"] {
        let err = check(text).unwrap_err();
        assert_eq!(
            err.category(),
            ErrorCategory::Syntax,
            "input {:?} gave {:?}",
            text,
            err.kind
        );
    }
}

#[test]
fn deep_bracket_nesting_is_a_resource_error_not_a_crash() {
    let text = format!("{}1{}", "(".repeat(150), ")".repeat(150));
    let err = check(&text).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ExpressionTooDeep { .. }));
    assert_eq!(err.category(), ErrorCategory::Resource);
}

#[test]
fn deep_bracketless_nesting_hits_the_validator_limit() {
    let text = format!("{}x", "not ".repeat(150));
    let err = check(&text).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ExpressionTooDeep { .. }));
}

#[test]
fn long_conditional_chain_is_a_resource_error_not_a_crash() {
    let text = format!("{}1", "1 if 1 else ".repeat(100_000));
    let err = check(&text).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ExpressionTooDeep { .. }));
    assert_eq!(err.category(), ErrorCategory::Resource);
}

#[test]
fn long_lambda_chain_is_a_resource_error_not_a_crash() {
    let text = format!("{}1", "lambda: ".repeat(100_000));
    let err = check(&text).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ExpressionTooDeep { .. }));
}

#[test]
fn long_power_chain_is_a_resource_error_not_a_crash() {
    let text = format!("2{}", " ** 2".repeat(100_000));
    let err = check(&text).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ExpressionTooDeep { .. }));
}

#[test]
fn brackets_after_a_triple_quoted_string_still_count() {
    // The embedded odd quote count must not hide the brackets from the
    // depth guard.
    let text = format!("'''a'b''' + {}1{}", "(".repeat(150), ")".repeat(150));
    let err = check(&text).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ExpressionTooDeep { .. }));

    assert!(check("'''a'b''' + 'c'").is_ok());
}

#[test]
fn nesting_within_the_limit_is_fine() {
    let text = format!("{}1{}", "(".repeat(50), ")".repeat(50));
    assert!(check(&text).is_ok());
}

#[test]
fn depth_limit_is_configurable() {
    let gate = Gate::new().with_max_depth(4);
    assert!(gate.check("((1))").is_ok());
    assert!(gate.check("(((((1)))))").is_err());
}

// ============================================================================
// STABILITY
// ============================================================================

#[test]
fn checking_is_idempotent() {
    for text in ["1 + 1", "lambda x: x", "x = 1", "b'abc'", ""] {
        let first = check(text).map_err(|e| e.kind);
        let second = check(text).map_err(|e| e.kind);
        assert_eq!(first, second, "verdict for {:?} changed between calls", text);
    }
}

#[test]
fn error_codes_name_the_failure() {
    let err = check("lambda x: x").unwrap_err();
    assert_eq!(
        err.diagnostic_info.error_code,
        "exprgate::policy::disallowed_construct"
    );

    let err = check("1 +").unwrap_err();
    assert_eq!(err.diagnostic_info.error_code, "exprgate::syntax::syntax");
}
