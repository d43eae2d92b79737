use std::io::Write;
use tforth::lang::number::Number;
use tforth::runtime::data_structures::builtin::Builtin;
use tforth::runtime::error::Result;
use tforth::runtime::interpreter::forth_interpreter::ForthInterpreter;
use tforth::runtime::interpreter::{
    InterpreterStack, ParseState, TokenParsing, WordManagement,
};

/// A fresh capturing session with BASE seeded, as the driver would set one up.
fn session() -> ForthInterpreter {
    let mut interp = ForthInterpreter::with_captured_output();

    interp.seed_base();
    interp
}

/// Parse one line and return the captured program output.
fn eval_output(source: &str) -> String {
    let mut interp = session();

    interp
        .parse_line(source)
        .unwrap_or_else(|error| panic!("{:?} failed: {}", source, error));

    interp.captured_output().to_string()
}

/// Parse several lines in one session, as the REPL would, and return the output.
fn eval_lines(sources: &[&str]) -> Result<String> {
    let mut interp = session();

    for source in sources {
        interp.parse_line(source)?;
    }

    Ok(interp.captured_output().to_string())
}

// --- The end-to-end scenarios ---

#[test]
fn scenario_addition() {
    assert_eq!(eval_output("2 3 + ."), "5 ");
}

#[test]
fn scenario_hex_printing() {
    // The literal is read while BASE is still ten; the print happens in sixteen.
    assert_eq!(eval_output("255 16 BASE ! ."), "FF ");
}

#[test]
fn literals_after_a_base_change_read_in_the_new_base() {
    assert_eq!(eval_output("16 BASE ! 255 ."), "255 ");
    assert_eq!(eval_output("16 BASE ! FF DECIMAL ."), "255 ");
}

#[test]
fn scenario_square_procedure() {
    assert_eq!(eval_output(": SQR DUP * ; 5 SQR ."), "25 ");
}

#[test]
fn scenario_variable_store_fetch() {
    assert_eq!(eval_output("VARIABLE X 42 X ! X @ ."), "42 ");
}

#[test]
fn scenario_countdown() {
    assert_eq!(
        eval_output(": COUNTDOWN 0 10 DO I . -1 +LOOP ; COUNTDOWN"),
        "10 9 8 7 6 5 4 3 2 1 "
    );
}

#[test]
fn scenario_choose() {
    assert_eq!(
        eval_output(": CHOOSE IF .\" yes\" ELSE .\" no\" THEN ; 1 CHOOSE"),
        "yes"
    );

    assert_eq!(
        eval_output(": CHOOSE IF .\" yes\" ELSE .\" no\" THEN ; 0 CHOOSE"),
        "no"
    );
}

#[test]
fn scenario_string_equality() {
    assert_eq!(
        eval_output("3 STRING YES$ YES$ PUT$ yes$  YES$ YES$ $= ."),
        "TRUE "
    );
}

// --- Procedures and defining words ---

#[test]
fn procedures_nest_and_expand() {
    assert_eq!(
        eval_output(": DOUBLE 2 * ; : QUAD DOUBLE DOUBLE ; 3 QUAD ."),
        "12 "
    );
}

#[test]
fn constants_resolve_to_their_value() {
    assert_eq!(eval_output("7 CONSTANT SEVEN SEVEN SEVEN * ."), "49 ");
}

#[test]
fn create_comma_allot_build_arrays() {
    assert_eq!(
        eval_output("CREATE NUMS 10 , 20 , 30 ,  NUMS 2 + @ . NUMS @ ."),
        "30 10 "
    );
}

#[test]
fn does_attaches_an_action_body() {
    assert_eq!(
        eval_output(": CONST CREATE , DOES> @ ; 42 CONST ANSWER ANSWER ."),
        "42 "
    );
}

#[test]
fn does_action_runs_on_every_push() {
    assert_eq!(
        eval_output(": COUNTER CREATE , DOES> @ 1+ ; 5 COUNTER FIVE FIVE . FIVE ."),
        "6 6 "
    );
}

#[test]
fn forget_reveals_shadowed_definitions() {
    let output = eval_lines(&[
        "VARIABLE X 10 X !",
        "VARIABLE X 20 X !",
        "X @ .",
        "FORGET X",
        "X @ .",
    ])
    .unwrap();

    assert_eq!(output, "20 10 ");
}

#[test]
fn forget_drops_procedures_too() {
    let output = eval_lines(&[
        ": GREET 1 . ;",
        ": GREET 2 . ;",
        "GREET FORGET GREET GREET",
    ])
    .unwrap();

    assert_eq!(output, "2 1 ");
}

#[test]
fn names_are_case_folded() {
    assert_eq!(eval_output("variable x 9 x ! X @ ."), "9 ");
}

// --- Control structures ---

#[test]
fn do_loop_counts_up() {
    assert_eq!(eval_output("6 1 DO I . LOOP"), "1 2 3 4 5 ");
}

#[test]
fn do_loop_with_equal_bounds_never_runs() {
    assert_eq!(eval_output("3 3 DO I . LOOP"), "");
}

#[test]
fn plus_loop_steps_past_the_bound() {
    assert_eq!(eval_output("10 0 DO I . 3 +LOOP"), "0 3 6 9 ");
}

#[test]
fn plus_loop_descends() {
    assert_eq!(eval_output("0 6 DO I . -2 +LOOP"), "6 4 2 ");
}

#[test]
fn nested_loops_expose_i_and_j() {
    assert_eq!(
        eval_output(": NEST 3 0 DO 2 0 DO J . I . LOOP LOOP ; NEST"),
        "0 0 0 1 1 0 1 1 2 0 2 1 "
    );
}

#[test]
fn leave_exits_only_the_innermost_loop() {
    assert_eq!(
        eval_output(": L 4 0 DO 10 0 DO I . LEAVE LOOP LOOP ; L"),
        "0 0 0 0 "
    );
}

#[test]
fn begin_until_repeats_until_true() {
    assert_eq!(
        eval_output(": CNT 0 BEGIN 1 + DUP . DUP 5 = UNTIL ; CNT DROP"),
        "1 2 3 4 5 "
    );
}

#[test]
fn begin_while_repeat_exits_on_true() {
    assert_eq!(
        eval_output(": W 0 BEGIN DUP 3 = WHILE DUP . 1 + REPEAT ; W DROP"),
        "0 1 2 "
    );
}

#[test]
fn leave_exits_begin_loops() {
    assert_eq!(eval_output(": B BEGIN 1 . LEAVE 0 UNTIL ; B"), "1 ");
}

#[test]
fn if_inside_a_loop_leaves_cleanly() {
    assert_eq!(
        eval_output(": F 10 0 DO I . I 2 = IF LEAVE THEN LOOP ; F"),
        "0 1 2 "
    );
}

#[test]
fn compile_state_is_restored_after_a_failed_reader() {
    let mut interp = session();

    assert!(interp.parse_line("5 0 DO I .").is_err());
    assert_eq!(interp.parse_state(), ParseState::Interp);

    // The session still parses normally afterwards.
    interp.parse_line("1 2 + .").unwrap();
    assert_eq!(interp.captured_output(), "3 ");
}

// --- Variables, refs and memory ---

#[test]
fn refs_offset_with_plus_and_minus() {
    assert_eq!(
        eval_output("VARIABLE A 3 ALLOT  7 A 2 + !  A 3 + 1 - @ ."),
        "7 "
    );
}

#[test]
fn duplicated_refs_have_independent_cursors() {
    // Write through an advanced copy; the original still reads cell one.
    assert_eq!(
        eval_output("VARIABLE A 3 ALLOT  A 1 +  DUP 1+  5 SWAP !  @ ."),
        "0 "
    );
}

#[test]
fn plus_store_accumulates() {
    assert_eq!(eval_output("VARIABLE N 5 N !  3 N +!  N @ ."), "8 ");
}

#[test]
fn question_fetches_and_prints() {
    assert_eq!(eval_output("VARIABLE N 12 N !  N ?"), "12 ");
}

#[test]
fn move_copies_cells() {
    assert_eq!(
        eval_output("VARIABLE SRC 2 ALLOT VARIABLE DST 2 ALLOT 7 SRC ! SRC DST 3 MOVE DST @ ."),
        "7 "
    );
}

#[test]
fn fill_replicates_a_token() {
    assert_eq!(eval_output("VARIABLE BUF 4 ALLOT BUF 5 9 FILL BUF 4 + @ ."), "9 ");
}

#[test]
fn out_of_range_access_fails_but_the_ref_survives() {
    let mut interp = session();

    let error = interp.parse_line("VARIABLE A  A 5 + @").unwrap_err();

    assert_eq!(error.to_string(), "invalid variable");

    // The same offset arithmetic walked back in range works.
    interp.parse_line("A 5 + 5 - @ .").unwrap();
    assert_eq!(interp.captured_output(), "0 ");
}

#[test]
fn ref_comparison_orders_by_offset() {
    let mut interp = session();

    interp.parse_line("VARIABLE A 3 ALLOT").unwrap();
    interp.parse_line("A 1 +").unwrap();
    interp.parse_line("A 2 +").unwrap();

    let refs = interp.stack().to_vec();
    let cmp = tforth::runtime::data_structures::token::Token::cmp(&refs[1], &refs[0]).unwrap();

    assert_eq!(cmp, 1);
}

// --- Words, strings and output ---

#[test]
fn word_reads_delimited_text_as_a_counted_array() {
    assert_eq!(eval_output("32 WORD hello COUNT TYPE"), "hello");
}

#[test]
fn here_pushes_the_word_buffer() {
    assert_eq!(eval_output("32 WORD hi DROP HERE COUNT TYPE"), "hi");
}

#[test]
fn trailing_trims_whitespace_cells() {
    assert_eq!(
        eval_output("VARIABLE S 3 ALLOT 65 S 1 + ! 32 S 2 + ! 32 S 3 + !  S 1 + 3 -TRAILING . DROP"),
        "1 "
    );
}

#[test]
fn emit_prints_characters() {
    assert_eq!(eval_output("65 EMIT 66 EMIT"), "AB");
}

#[test]
fn pstack_prints_without_consuming() {
    let mut interp = session();

    interp.parse_line("1 2 3 PSTACK").unwrap();

    assert_eq!(interp.captured_output(), "1 2 3");
    assert_eq!(interp.stack().len(), 3);
}

#[test]
fn print_string_outputs_text() {
    assert_eq!(eval_output("9 STRING GREET$ GREET$ PUT$ hello GREET$ $."), "hello");
}

#[test]
fn string_comparison_detects_differences() {
    assert_eq!(
        eval_output("3 STRING A$ A$ PUT$ abc 3 STRING B$ B$ PUT$ abd A$ B$ $= ."),
        "FALSE "
    );
}

#[test]
fn comments_are_skipped_everywhere() {
    assert_eq!(eval_output("( just a comment) 5 ."), "5 ");
    assert_eq!(eval_output(": C ( n -- n*n ) DUP * ; 3 C ."), "9 ");
}

// --- ABORT / QUIT ---

#[test]
fn abort_clears_every_stack_and_ends_the_line() {
    let mut interp = session();

    interp.parse_line("1 2 3 ABORT 99 .").unwrap();

    assert!(interp.stack().is_empty());
    assert!(interp.ret_stack().is_empty());
    assert_eq!(interp.captured_output(), "");
}

#[test]
fn quit_keeps_the_data_stack() {
    let mut interp = session();

    interp.parse_line("1 2 QUIT 99 .").unwrap();

    assert_eq!(interp.stack().len(), 2);
    assert_eq!(interp.captured_output(), "");
}

#[test]
fn the_stack_persists_between_lines() {
    let output = eval_lines(&["1 2", "+", "."]).unwrap();

    assert_eq!(output, "3 ");
}

#[test]
fn a_failing_line_keeps_the_stack_at_the_failure_point() {
    let mut interp = session();

    assert!(interp.parse_line("1 2 XYZZY 3").is_err());
    assert_eq!(interp.stack().len(), 2);

    // The rest of the failed line is abandoned.
    interp.parse_line("DEPTH .").unwrap();
    assert_eq!(interp.captured_output(), "2 ");
}

// --- Files and LOAD ---

fn write_temp_source(name: &str, text: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(name);
    let mut file = std::fs::File::create(&path).unwrap();

    file.write_all(text.as_bytes()).unwrap();
    path
}

#[test]
fn parse_file_prints_ok_at_the_end() {
    let path = write_temp_source("tforth_simple.fth", "3 4 + .\n");

    let mut interp = session();

    interp.parse_file(path.to_str().unwrap()).unwrap();
    assert_eq!(interp.captured_output(), "7 ok\n");
}

#[test]
fn load_resumes_the_outer_file() {
    let inner = write_temp_source("tforth_inner.fth", "2 .\n");
    let outer = write_temp_source(
        "tforth_outer.fth",
        &format!("1 . LOAD {} 3 .\n", inner.display()),
    );

    let mut interp = session();

    interp.parse_file(outer.to_str().unwrap()).unwrap();
    assert_eq!(interp.captured_output(), "1 2 ok\n3 ok\n");
}

#[test]
fn multi_line_definitions_work_in_files() {
    let path = write_temp_source(
        "tforth_multiline.fth",
        ": TRIPLE\n  3 *\n;\n7 TRIPLE .\n",
    );

    let mut interp = session();

    interp.parse_file(path.to_str().unwrap()).unwrap();
    assert_eq!(interp.captured_output(), "21 ok\n");
}

#[test]
fn missing_files_report_an_open_failure() {
    let mut interp = session();

    let error = interp.parse_file("/nonexistent/nowhere.fth").unwrap_err();

    assert_eq!(
        error.to_string(),
        "Failed to open '/nonexistent/nowhere.fth'"
    );
}

// --- Embedded builtins ---

#[test]
fn host_applications_can_register_words() {
    let mut interp = session();

    interp.add_builtin(Builtin::user(
        "DOUBLE",
        |interp: &mut dyn tforth::runtime::interpreter::Interpreter| {
            let n = interp.pop_number()?;

            interp.push_number(Number::plus(n, n));
            Ok(())
        },
    ));

    interp.parse_line("21 DOUBLE .").unwrap();
    assert_eq!(interp.captured_output(), "42 ");
}
