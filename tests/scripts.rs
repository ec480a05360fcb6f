//! Whole-program tests through the public interpreter API.

use walox::diag::{DiagnosticKind, LexError, ParseError};
use walox::interpreter::{Interpreter, LoxError};
use walox::RuntimeError;

/// Runs `src` in a fresh interpreter and returns the outcome together with everything printed.
fn run(src: &str) -> (Result<(), LoxError>, String) {
    let mut out: Vec<u8> = Vec::new();
    let result = {
        let mut interp = Interpreter::new(&mut out);
        interp.run(src)
    };
    let printed = String::from_utf8(out).expect("output is not UTF-8");
    (result, printed)
}

fn output_of(src: &str) -> String {
    match run(src) {
        (Ok(()), printed) => printed,
        (Err(e), _) => panic!("script failed: {}", e),
    }
}

#[test]
fn precedence_and_associativity() {
    assert_eq!(output_of("print 2 + 3 * 4;"), "14\n");
    assert_eq!(output_of("print 10 - 2 - 3;"), "5\n");
    assert_eq!(output_of("print 1 + 2 == 3 and 4 > 3;"), "true\n");
}

#[test]
fn numeric_zero_is_truthy() {
    assert_eq!(output_of("if (0) print 1; else print 2;"), "1\n");
    assert_eq!(output_of("if (\"\") print \"empty\";"), "empty\n");
}

#[test]
fn block_scoping_shadows_without_mutating() {
    assert_eq!(
        output_of("var a = 1; { var a = 2; print a; } print a;"),
        "2\n1\n"
    );
}

#[test]
fn redeclaration_is_a_runtime_error() {
    let (result, printed) = run("var a = 1;\nprint a;\nvar a = 2;\nprint a;");
    match result {
        Err(LoxError::Runtime(RuntimeError::DuplicateBinding { name, line: 3 })) if name == "a" => {
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(printed, "1\n");
}

#[test]
fn redeclaration_in_inner_block_is_allowed() {
    assert_eq!(output_of("var a = 1; { var a = a + 1; print a; }"), "2\n");
}

#[test]
fn division_by_zero_prints_nothing() {
    let (result, printed) = run("print 1 / 0;");
    match result {
        Err(LoxError::Runtime(RuntimeError::DivisionByZero { line: 1 })) => (),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(printed, "");
}

#[test]
fn short_circuit_skips_side_effects() {
    let src = r#"
        var called = false;
        false and (called = true);
        print called;
        nil or (called = "right side");
        print called;
    "#;
    assert_eq!(output_of(src), "false\nright side\n");
}

#[test]
fn strings_and_numbers_do_not_mix() {
    let (result, _) = run("\"a\" + 1;");
    match result {
        Err(LoxError::Runtime(RuntimeError::OperandsMustBeNumbersOrStrings { line: 1 })) => (),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(output_of("print 1 == \"1\";"), "false\n");
}

#[test]
fn lexical_errors_are_all_reported_and_block_evaluation() {
    let (result, printed) = run("print 1;\nvar s = \"ok\" @;\nprint #;");
    let diags = match result {
        Err(LoxError::Static(diags)) => diags,
        other => panic!("unexpected outcome: {:?}", other),
    };
    let kinds: Vec<_> = diags.iter().map(|d| (d.line, d.kind.clone())).collect();
    assert_eq!(
        kinds,
        vec![
            (2, DiagnosticKind::Lexical(LexError::UnexpectedChar('@'))),
            (3, DiagnosticKind::Lexical(LexError::UnexpectedChar('#'))),
        ]
    );
    assert_eq!(printed, "");
}

#[test]
fn syntax_errors_are_all_reported_and_block_evaluation() {
    let (result, printed) = run("print 1;\nvar = 2;\nprint 3\nprint 4;");
    let diags = match result {
        Err(LoxError::Static(diags)) => diags,
        other => panic!("unexpected outcome: {:?}", other),
    };
    let kinds: Vec<_> = diags.iter().map(|d| (d.line, d.kind.clone())).collect();
    assert_eq!(
        kinds,
        vec![
            (2, DiagnosticKind::Syntax(ParseError::ExpectedVariableName)),
            (
                4,
                DiagnosticKind::Syntax(ParseError::ExpectedToken {
                    expected: walox::TokenKind::Semicolon,
                    context: "after value",
                })
            ),
        ]
    );
    assert_eq!(
        diags.to_string(),
        "syntax error: line 2 at '=': expected variable name\n\
         syntax error: line 4 at 'print': expected ';' after value"
    );
    assert_eq!(printed, "");
}

#[test]
fn runtime_error_stops_at_failing_statement() {
    let (result, printed) = run("print \"a\";\n{\n  var x = 1;\n  print x + nil;\n}\nprint \"b\";");
    match result {
        Err(LoxError::Runtime(RuntimeError::OperandsMustBeNumbersOrStrings { line: 4 })) => (),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(printed, "a\n");
}

#[test]
fn loops() {
    let src = r#"
        var a = 0;
        var b = 1;
        for (var i = 0; i < 8; i = i + 1) {
            var tmp = a;
            a = b;
            b = tmp + b;
        }
        print a;

        var n = 3;
        while (n > 0) {
            print n;
            n = n - 1;
        }
    "#;
    assert_eq!(output_of(src), "21\n3\n2\n1\n");
}

#[test]
fn fractional_numbers() {
    assert_eq!(output_of("print 1 / 4; print 3.0; print -0.5 * 2;"), "0.25\n3\n-1\n");
}

#[test]
fn negative_zero_prints_as_zero() {
    assert_eq!(output_of("print -0;\nprint 0 * -1;\nprint -0 == 0;"), "0\n0\ntrue\n");
}

#[test]
fn clock_is_predefined() {
    assert_eq!(
        output_of("var start = clock(); print clock() - start >= 0;"),
        "true\n"
    );
}

#[test]
fn identical_source_parses_identically() {
    let mut out: Vec<u8> = Vec::new();
    let interp = Interpreter::new(&mut out);
    let src = "var x = 1; while (x < 10) { x = x * 2; } if (x == 16 or !x) print x;";
    let first = interp.parse(src).expect("parse failed");
    let second = interp.parse(src).expect("parse failed");
    assert_eq!(first, second);
}
