use std::{cell::RefCell, path::Path, rc::Rc};

use commentpp::{
    error::{ErrorKind, EvaluationError, ExpressionError, PreprocessError, StructureError},
    expression::value::Value,
    preprocess_text,
    preprocessor::{
        config::Config,
        directive::Directive,
        extension::{ActionContext, PreprocessorExtension},
        pipeline::Preprocessor,
        state::{BlockStack, PreprocessingState},
    },
};

fn assert_output(src: &str, expected: &str) {
    match preprocess_text(src) {
        Ok(output) => assert_eq!(output, expected, "Source:\n{src}"),
        Err(e) => panic!("Source failed:\n{src}\nError: {e}"),
    }
}

fn failure(src: &str) -> PreprocessError {
    match preprocess_text(src) {
        Ok(output) => panic!("Source succeeded with {output:?} but was expected to fail:\n{src}"),
        Err(e) => e,
    }
}

fn structure_error(src: &str) -> StructureError {
    match failure(src).kind {
        ErrorKind::Structure(error) => error,
        other => panic!("Expected a structure error, got {other}"),
    }
}

#[test]
fn keeps_true_branch_and_drops_else() {
    assert_output("//#if 2>1\nkept\n//#else\ndropped\n//#endif\n", "kept\n");
    assert_output("//#if 2<1\nkept\n//#else\ndropped\n//#endif\n", "dropped\n");
}

#[test]
fn nested_blocks_need_every_ancestor() {
    let src = "//#if true\na\n//#if false\nb\n//#else\nc\n//#endif\n//#endif\n\
               //#if false\n//#if true\nd\n//#endif\n//#else\ne\n//#endif\n";
    assert_output(src, "a\nc\ne\n");
}

#[test]
fn at_most_one_branch_is_taken() {
    let src = "//#if false\nw\n//#elif true\nx\n//#elif true\ny\n//#else\nz\n//#endif\n";
    assert_output(src, "x\n");
}

#[test]
fn conditions_in_inactive_blocks_are_not_evaluated() {
    assert_output("//#if false\n//#if undefined_name\nx\n//#elif 1 / 0\ny\n//#endif\n//#endif\nz\n",
                  "z\n");
    assert_output("//#if true\nx\n//#elif undefined_name\ny\n//#endif\n", "x\n");
}

#[test]
fn misplaced_branches_are_errors() {
    assert!(matches!(structure_error("//#if true\n//#else\n//#elif true\n//#endif\n"),
                     StructureError::AfterElse { .. }));
    assert!(matches!(structure_error("//#if true\n//#else\n//#else\n//#endif\n"),
                     StructureError::AfterElse { .. }));
    assert!(matches!(structure_error("//#else\n"), StructureError::WithoutIf { .. }));
    assert!(matches!(structure_error("//#elif true\n"), StructureError::WithoutIf { .. }));
    assert!(matches!(structure_error("//#endif\n"), StructureError::WithoutIf { .. }));
}

#[test]
fn unclosed_block_names_its_opening_line() {
    let error = failure("text\n//#ifdef x\nmore\n");
    assert_eq!(error.line, Some(2));
    assert!(matches!(error.kind,
                     ErrorKind::Structure(StructureError::UnclosedBlock { line: 2, .. })));
}

#[test]
fn conditions_must_be_boolean() {
    let error = failure("//#if 1\n//#endif\n");
    assert!(matches!(error.kind, ErrorKind::Expression(ExpressionError::Type(_))));
}

#[test]
fn directive_arguments_are_validated() {
    assert!(matches!(structure_error("//#if true\n//#endif now\n"),
                     StructureError::UnexpectedArgument { .. }));
    assert!(matches!(structure_error("//#postfix\n"), StructureError::InvalidSwitch { .. }));
    assert!(matches!(structure_error("//#postfix*\n"), StructureError::InvalidSwitch { .. }));
    assert!(matches!(structure_error("//#if\n//#endif\n"), StructureError::MissingArgument { .. }));
}

#[test]
fn unknown_directives_are_errors_everywhere() {
    assert!(matches!(structure_error("//#frobnicate\n"), StructureError::UnknownDirective { .. }));
    assert!(matches!(structure_error("//#if false\n//#frobnicate\n//#endif\n"),
                     StructureError::UnknownDirective { .. }));
}

#[test]
fn prefix_and_postfix_sections() {
    let src = "//#postfix+\nlast\n//#postfix-\nfirst\n//#prefix+\nhead\n//#prefix-\nsecond\n";
    assert_output(src, "head\nfirst\nsecond\nlast\n");
}

#[test]
fn postfix_mode_may_stay_open() {
    assert_output("//#postfix+\nend\n//#postfix-\n//#postfix+\ntail\n", "end\ntail\n");
}

#[test]
fn local_variables_and_macros() {
    assert_output("//#local name=\"World\"\nHello, /*$name$*/! /*$ strlen(name) * 2 $*/\n",
                  "Hello, World! 10\n");
    assert_output("unterminated /*$ 1 + 1\n", "unterminated /*$ 1 + 1\n");
}

#[test]
fn uncommented_lines() {
    assert_output("    //$int x = /*$1+1$*/;\n    //$$raw /*$x$*/\n", "    int x = 2;\n    raw /*$x$*/\n");
}

#[test]
fn define_undef_and_ifdef() {
    let src = "//#define feature\n//#ifdef feature\nyes\n//#endif\n\
               //#undef feature\n//#ifndef feature\nno\n//#endif\n";
    assert_output(src, "yes\nno\n");
}

#[test]
fn globals_are_defined_before_the_line_pass() {
    assert_output("//#if mode == 2\nfast\n//#endif\n//#global mode=2\n", "fast\n");
}

#[test]
fn global_blocks_guard_global_definitions() {
    let src = "//#_if false\n//#global x=1\n//#_else\n//#global y=2\n//#_endif\n\
               //#ifdef x\nx\n//#endif\n//#ifdef y\ny\n//#endif\n";
    assert_output(src, "y\n");

    let error = failure("//#_if true\n//#global x=1\n");
    assert!(matches!(error.kind,
                     ErrorKind::Structure(StructureError::UnclosedBlock { line: 1, .. })));
}

#[test]
fn exclusion_empties_the_text() {
    assert_output("//#excludeif true\ntext\n", "");
    assert_output("//#excludeif false\ntext\n", "text\n");
}

#[test]
fn exit_keeps_what_was_emitted() {
    assert_output("a\n//#exit\nb\n//#if true\n", "a\n");
    assert_output("a\n//#exitif 1 > 0\nb\n", "a\n");
    assert_output("a\n//#exitif 1 < 0\nb\n", "a\nb\n");
}

#[test]
fn echo_and_warning_produce_no_output() {
    assert_output("//#echo building /*$1 + 1$*/\n//#warning careful\ntext\n", "text\n");
}

#[test]
fn error_directive_stops_with_message() {
    match failure("//#error broken /*$1+1$*/\n").kind {
        ErrorKind::Expression(ExpressionError::Evaluation(EvaluationError::UserError { message })) => {
            assert_eq!(message, "broken 2");
        },
        other => panic!("Unexpected error {other}"),
    }
}

#[test]
fn special_variables() {
    assert_output("/*$__line__$*/ /*$__filename__$*/\n\n/*$__line__ + 1$*/\n", "1 input.txt\n\n4\n");
}

#[test]
fn errors_point_at_the_expression() {
    let error = failure("ok\n//#if 1 + * 2\n//#endif\n");
    assert_eq!(error.line, Some(2));
    assert_eq!(error.column, Some(11));
    assert_eq!(error.fragment.as_deref(), Some("//#if 1 + * 2"));
    assert!(error.to_string().contains("input.txt:2:11"), "{error}");
}

#[test]
fn assignment_errors_point_at_the_expression() {
    for (src, column) in [("//#local value = 1 + * 2
", 22),
                          ("//#define flag 1 + * 2
", 20),
                          ("//#global value = 1 + * 2
", 23)]
    {
        let error = failure(src);
        assert!(matches!(error.kind, ErrorKind::Expression(ExpressionError::Parse(_))),
                "{src}: {error}");
        assert_eq!(error.line, Some(1), "{src}");
        assert_eq!(error.column, Some(column), "{src}");
    }
}

#[test]
fn end_of_line_handling() {
    let mut preprocessor = Preprocessor::new(Config::default());
    assert_eq!(preprocessor.preprocess(Path::new("a.txt"), "a\r\nb").unwrap(), "a\nb\n");

    let config = Config { care_for_last_eol: true,
                          ..Config::default() };
    let mut preprocessor = Preprocessor::new(config);
    let path = Path::new("a.txt");
    assert_eq!(preprocessor.preprocess(path, "a\r\nb").unwrap(), "a\nb");
    assert_eq!(preprocessor.preprocess(path, "a\nb\r\n").unwrap(), "a\nb\r\n");
    assert_eq!(preprocessor.preprocess(path, "").unwrap(), "");
}

#[test]
fn custom_directive_prefix() {
    let config = Config { directive_prefix: "#".to_string(),
                          ..Config::default() };
    let mut preprocessor = Preprocessor::new(config);
    let output = preprocessor.preprocess(Path::new("a.txt"), "#if false\nx\n#endif\ny\n//#if\n")
                             .unwrap();
    assert_eq!(output, "y\n//#if\n");
}

#[test]
fn variable_api() {
    let mut preprocessor = Preprocessor::new(Config::default());
    preprocessor.set_global_variable("Limit", Value::Int(3));
    let output = preprocessor.preprocess(Path::new("a.txt"), "//#define answer limit * 14\n/*$ANSWER$*/\n")
                             .unwrap();

    assert_eq!(output, "42\n");
    assert_eq!(preprocessor.get_global_variable("answer"), Some(&Value::Int(42)));
}

#[test]
fn locals_do_not_leak_between_files() {
    let mut preprocessor = Preprocessor::new(Config::default());
    preprocessor.preprocess(Path::new("a.txt"), "//#local x=1\n").unwrap();

    let error = preprocessor.preprocess(Path::new("b.txt"), "/*$x$*/\n").unwrap_err();
    assert!(matches!(error.kind,
                     ErrorKind::Expression(ExpressionError::Evaluation(EvaluationError::UnknownVariable { .. }))));
}

type Calls = Rc<RefCell<Vec<(usize, Vec<Value>)>>>;

struct Recorder {
    calls:  Calls,
    result: bool,
}

impl PreprocessorExtension for Recorder {
    fn process_action(&mut self, context: &ActionContext, args: &[Value]) -> bool {
        self.calls.borrow_mut().push((context.line, args.to_vec()));
        self.result
    }
}

fn recording_preprocessor(result: bool) -> (Preprocessor, Calls) {
    let calls = Calls::default();
    let extension = Recorder { calls: Rc::clone(&calls),
                               result };
    (Preprocessor::new(Config::default()).with_extension(Box::new(extension)), calls)
}

#[test]
fn actions_reach_the_extension_in_order() {
    let (mut preprocessor, calls) = recording_preprocessor(true);
    let src = "text\n//#action 1, \"two\", 1 < 2\n//#if false\n//#action 3\n//#endif\n";
    let output = preprocessor.preprocess(Path::new("a.txt"), src).unwrap();

    assert_eq!(output, "text\n");
    assert_eq!(*calls.borrow(),
               vec![(2, vec![Value::Int(1), Value::Str("two".into()), Value::Bool(true)])]);
}

#[test]
fn actions_without_extension_are_ignored() {
    assert_output("//#action undefined_name, 1 / 0\ntext\n", "text\n");
}

#[test]
fn failing_extension_stops_the_run() {
    let (mut preprocessor, calls) = recording_preprocessor(false);
    let error = preprocessor.preprocess(Path::new("a.txt"), "//#action 7\n").unwrap_err();

    assert_eq!(calls.borrow().len(), 1);
    assert!(matches!(error.kind,
                     ErrorKind::Expression(ExpressionError::Evaluation(EvaluationError::ExtensionFailed { .. }))));
}

#[test]
fn one_failing_action_argument_aborts_the_directive() {
    let (mut preprocessor, calls) = recording_preprocessor(true);
    assert!(preprocessor.preprocess(Path::new("a.txt"), "//#action 1, missing\n").is_err());
    assert!(calls.borrow().is_empty());
}

#[test]
fn local_variable_api() {
    let mut state = PreprocessingState::new();
    state.set_local_variable("Count", Value::Int(2));

    assert_eq!(state.get_local_variable("count"), Some(&Value::Int(2)));
    assert_eq!(state.remove_local_variable("COUNT"), Some(Value::Int(2)));
    assert_eq!(state.get_local_variable("count"), None);
}

#[test]
fn block_stack_selects_one_branch() {
    let mut blocks = BlockStack::default();
    blocks.open(Some(false), Directive::If, 1);
    assert!(!blocks.is_active());

    assert!(blocks.elif_needs_condition(Directive::Elif).unwrap());
    blocks.elif(Some(true), Directive::Elif).unwrap();
    assert!(blocks.is_active());

    assert!(!blocks.elif_needs_condition(Directive::Elif).unwrap());
    blocks.otherwise(Directive::Else).unwrap();
    assert!(!blocks.is_active());

    blocks.close(Directive::EndIf).unwrap();
    assert_eq!(blocks.depth(), 0);
    assert!(blocks.is_active());
}
