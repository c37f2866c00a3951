use linnet::error::ErrorSink;
use linnet::Interpreter;

// run linnet code using a fresh interpreter and return a string containing the program output
fn run(code: &str) -> String {
    let mut output = Vec::new();
    let mut diagnostics = Vec::new();

    let (had_error, had_runtime_error) = {
        let mut interpreter = Interpreter::new(&mut output);
        let mut sink = ErrorSink::new(&mut diagnostics);
        linnet::run(code, &mut interpreter, &mut sink);
        (sink.had_error, sink.had_runtime_error)
    };

    assert!(
        !had_error && !had_runtime_error,
        "unexpected error: {}",
        String::from_utf8_lossy(&diagnostics)
    );

    String::from_utf8(output).expect("program output should be valid utf8")
}

#[test]
fn print_arithmetic() {
    assert_eq!(run("print 1 + 2;"), "3\n");
    assert_eq!(run("print 2 * 3 + 4;"), "10\n");
    assert_eq!(run("print 2 + 3 * 4;"), "14\n");
    assert_eq!(run("print (2 + 3) * 4;"), "20\n");
    assert_eq!(run("print 10 / 4;"), "2.5\n");
    assert_eq!(run("print -3 + 1;"), "-2\n");
}

#[test]
fn number_formatting() {
    // whole numbers print without a fractional suffix
    assert_eq!(run("print 4 / 2;"), "2\n");
    assert_eq!(run("print 10.0;"), "10\n");
    assert_eq!(run("print 0.5 + 0.25;"), "0.75\n");
}

#[test]
fn division_follows_ieee() {
    assert_eq!(run("print 1 / 0;"), "Infinity\n");
    assert_eq!(run("print -1 / 0;"), "-Infinity\n");
    assert_eq!(run("print 0 / 0;"), "NaN\n");
}

#[test]
fn deeply_nested_grouping() {
    assert_eq!(run("print ((((1))));"), "1\n");
}

#[test]
fn empty_program_produces_no_output() {
    assert_eq!(run(""), "");
}

#[test]
fn string_concatenation() {
    assert_eq!(run("print \"a\" + \"b\";"), "ab\n");
}

#[test]
fn variable_declaration_and_update() {
    let code = "\
        var a = 1;\n\
        var b = 2;\n\
        print a + b;\n\
        a = a + 10;\n\
        print a;";

    assert_eq!(run(code), "3\n11\n");
}

#[test]
fn uninitialized_variable_defaults_to_nil() {
    assert_eq!(run("var a; print a;"), "nil\n");
}

#[test]
fn assignment_yields_the_assigned_value() {
    assert_eq!(run("var a = 1; print a = 2;"), "2\n");
}

#[test]
fn redefining_a_global_overwrites() {
    assert_eq!(run("var a = 1; var a = 2; print a;"), "2\n");
}

#[test]
fn variable_scoping() {
    let code = "\
        var a = \"global a\";\n\
        var b = \"global b\";\n\
        var c = \"global c\";\n\
        {\n\
            var a = \"outer a\";\n\
            var b = \"outer b\";\n\
            {\n\
                var a = \"inner a\";\n\
                print a;\n\
                print b;\n\
                print c;\n\
            }\n\
            print a;\n\
            print b;\n\
            print c;\n\
        }\n\
        print a;\n\
        print b;\n\
        print c;";

    let expected = "\
        inner a\n\
        outer b\n\
        global c\n\
        outer a\n\
        outer b\n\
        global c\n\
        global a\n\
        global b\n\
        global c\n";

    assert_eq!(run(code), expected);
}

#[test]
fn assignment_in_nested_block_updates_outer_binding() {
    assert_eq!(run("var a = 2; { a = a + 1; } print a;"), "3\n");
}

#[test]
fn if_statement_true() {
    let code = "\
        var a = \"do it\";\n\
        if (a == \"do it\") {\n\
            print \"condition was true\";\n\
        }";

    assert_eq!(run(code), "condition was true\n");
}

#[test]
fn if_statement_false() {
    let code = "\
        var a = true;\n\
        if (!a) {\n\
            print \"condition was true\";\n\
        }";

    assert!(run(code).is_empty());
}

#[test]
fn if_else_statement() {
    let code = "\
        var a = \"cond2\";\n\
        if (a == \"cond1\") {\n\
            print \"if condition was true\";\n\
        } else if (a == \"cond2\") {\n\
            print \"else condition was true\";\n\
        }";

    assert_eq!(run(code), "else condition was true\n");
}

#[test]
fn truthiness() {
    // only nil and false are falsey
    assert_eq!(run("print !nil;"), "true\n");
    assert_eq!(run("print !false;"), "true\n");
    assert_eq!(run("print !0;"), "false\n");
    assert_eq!(run("print !\"\";"), "false\n");
    assert_eq!(run("print !true;"), "false\n");
}

#[test]
fn logical_operators_short_circuit() {
    let code = "\
        var a = true;\n\
        var b = false;\n\
        if (a or b) {\n\
            print \"condition was true\";\n\
        }\n\
        if (a and b) {\n\
            print \"never printed\";\n\
        }";

    assert_eq!(run(code), "condition was true\n");
}

#[test]
fn logical_operators_yield_operands_unchanged() {
    assert_eq!(run("print \"hi\" or 2;"), "hi\n");
    assert_eq!(run("print nil or \"fallback\";"), "fallback\n");
    assert_eq!(run("print nil and missing;"), "nil\n");
    assert_eq!(run("print 1 and 2;"), "2\n");
}

#[test]
fn equality_across_value_kinds() {
    assert_eq!(run("print \"a\" == \"a\";"), "true\n");
    assert_eq!(run("print \"a\" == \"b\";"), "false\n");
    assert_eq!(run("print 1 == 1;"), "true\n");
    assert_eq!(run("print 1 != 2;"), "true\n");
    assert_eq!(run("print nil == nil;"), "true\n");
    assert_eq!(run("print nil == \"a\";"), "false\n");
    assert_eq!(run("print 1 == \"1\";"), "false\n");
    assert_eq!(run("print true == true;"), "true\n");
}

#[test]
fn nan_is_not_equal_to_itself() {
    assert_eq!(run("print (0 / 0) == (0 / 0);"), "false\n");
}

#[test]
fn function_values_compare_by_identity() {
    let code = "\
        fun noop() {}\n\
        var alias = noop;\n\
        print alias == noop;\n\
        print clock == clock;";

    assert_eq!(run(code), "true\ntrue\n");
}

#[test]
fn while_loop() {
    let code = "\
        var i = 0;\n\
        while (i < 3) {\n\
            print i;\n\
            i = i + 1;\n\
        }";

    assert_eq!(run(code), "0\n1\n2\n");
}

#[test]
fn for_loop() {
    let code = "\
        for (var a = 0; a < 5; a = a + 1) { print a; }
        for (var a = 14; a >= 10; ) { print a; a = a - 1; }
        var a = 20;
        for (; a < 25;) { print a; a = a + 1; }";

    assert_eq!(
        run(code),
        "0\n1\n2\n3\n4\n14\n13\n12\n11\n10\n20\n21\n22\n23\n24\n"
    );
}

#[test]
fn for_loop_single_statement_body() {
    assert_eq!(run("for (var i = 0; i < 3; i = i + 1) print i;"), "0\n1\n2\n");
}

#[test]
fn function_declaration_and_call() {
    let code = "\
        fun add(a, b) {\n\
            print a + b;\n\
        }\n\
        add(2, 3);\n\
        print add;";

    assert_eq!(run(code), "5\n<fn add>\n");
}

#[test]
fn function_call_produces_nil() {
    let code = "\
        fun say(n) {\n\
            print n;\n\
        }\n\
        print say(1);";

    assert_eq!(run(code), "1\nnil\n");
}

#[test]
fn native_function_stringification() {
    assert_eq!(run("print clock;"), "<native fn>\n");
}

#[test]
fn clock_returns_a_number() {
    // seconds since the epoch, comfortably positive on any sane host
    assert_eq!(run("print clock() > 0;"), "true\n");
    assert_eq!(run("print clock() <= clock();"), "true\n");
}

#[test]
fn first_class_functions() {
    let code = "\
        fun say(n) {\n\
            print n;\n\
        }\n\
        var sayAlias = say;\n\
        sayAlias(\"test string\");";

    assert_eq!(run(code), "test string\n");
}

#[test]
fn function_sees_globals_defined_after_declaration() {
    let code = "\
        fun show() {\n\
            print message;\n\
        }\n\
        var message = \"hi\";\n\
        show();";

    assert_eq!(run(code), "hi\n");
}

#[test]
fn parameters_shadow_globals() {
    let code = "\
        var n = \"global\";\n\
        fun echo(n) {\n\
            print n;\n\
        }\n\
        echo(\"local\");\n\
        print n;";

    assert_eq!(run(code), "local\nglobal\n");
}

#[test]
fn recursion_without_return() {
    let code = "\
        fun countdown(n) {\n\
            if (n > 0) {\n\
                print n;\n\
                countdown(n - 1);\n\
            }\n\
        }\n\
        countdown(3);";

    assert_eq!(run(code), "3\n2\n1\n");
}

#[test]
fn pure_expression_is_repeatable() {
    assert_eq!(run("print 2 * 3 + 1; print 2 * 3 + 1;"), "7\n7\n");
}

#[test]
fn output_is_deterministic_across_runs() {
    let code = "var a = 1; { var a = 2; print a; } print a; print \"x\" + \"y\";";
    assert_eq!(run(code), run(code));
}

#[test]
fn comments_are_ignored() {
    let code = "\
        // leading comment\n\
        print 1; // trailing comment\n\
        // print 2;\n";

    assert_eq!(run(code), "1\n");
}

#[test]
fn strings_may_span_lines() {
    assert_eq!(run("print \"a\nb\";"), "a\nb\n");
}
