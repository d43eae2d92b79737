use test_case::test_case;
use tforth::lang::number::to_base_string;
use tforth::runtime::data_structures::token::Token;
use tforth::runtime::error::Result;
use tforth::runtime::interpreter::forth_interpreter::ForthInterpreter;
use tforth::runtime::interpreter::{InterpreterStack, TokenParsing};

/// Evaluate one line of source against a pre-loaded stack and return the resulting stack as
/// integers, booleans mapping to 1 and 0.
fn eval_and_stack(source: &str, init_stack: &[i32]) -> Result<Vec<i32>> {
    let mut interp = ForthInterpreter::with_captured_output();

    interp.seed_base();

    for &value in init_stack {
        interp.push_integer(value);
    }

    interp.parse_line(source)?;

    Ok(interp.stack().iter().map(token_int).collect())
}

fn token_int(token: &Token) -> i32 {
    match token {
        Token::Number(number) => number.integer(),
        Token::Boolean(value) => *value as i32,
        _ => panic!("expected a numeric token on the stack"),
    }
}

/// Evaluate one line expected to fail and return its error message.
fn eval_error(source: &str, init_stack: &[i32]) -> String {
    let mut interp = ForthInterpreter::with_captured_output();

    interp.seed_base();

    for &value in init_stack {
        interp.push_integer(value);
    }

    match interp.parse_line(source) {
        Ok(()) => panic!("expected an error from {:?}", source),
        Err(error) => error.to_string(),
    }
}

// --- Literals ---

#[test_case("0", &[], &[0]; "zero")]
#[test_case("42", &[], &[42]; "number")]
#[test_case("-7", &[], &[-7]; "negative number")]
#[test_case("+5", &[], &[5]; "explicit positive")]
#[test_case("2147483647", &[], &[i32::MAX]; "int max")]
#[test_case("-2147483648", &[], &[i32::MIN]; "int min")]
// --- Arithmetic ---
#[test_case("+", &[2, 2], &[4]; "simple add")]
#[test_case("-", &[5, 2], &[3]; "simple sub")]
#[test_case("*", &[3, 4], &[12]; "simple mul")]
#[test_case("/", &[12, 3], &[4]; "simple div")]
#[test_case("/", &[-7, 2], &[-3]; "div truncates toward zero")]
#[test_case("MOD", &[13, 5], &[3]; "simple mod")]
#[test_case("/MOD", &[13, 5], &[3, 2]; "div mod pushes mod then quotient")]
#[test_case("*/", &[10, 20, 4], &[50]; "mul div scales")]
#[test_case("1+", &[41], &[42]; "add one")]
#[test_case("2+", &[40], &[42]; "add two")]
#[test_case("MAX", &[3, 9], &[9]; "max")]
#[test_case("MIN", &[3, 9], &[3]; "min")]
#[test_case("ABS", &[-42], &[42]; "abs negative")]
#[test_case("ABS", &[9], &[9]; "abs positive")]
#[test_case("NEGATE", &[9], &[-9]; "negate")]
#[test_case("AND", &[6, 3], &[2]; "bitwise and")]
#[test_case("OR", &[6, 3], &[7]; "bitwise or")]
#[test_case("XOR", &[6, 3], &[5]; "bitwise xor")]
#[test_case("NOT", &[0], &[-1]; "bitwise not")]
// --- Comparison ---
#[test_case("<", &[3, 4], &[1]; "less true")]
#[test_case("<", &[4, 3], &[0]; "less false")]
#[test_case("=", &[5, 5], &[1]; "equal true")]
#[test_case("=", &[5, 6], &[0]; "equal false")]
#[test_case(">", &[4, 3], &[1]; "greater true")]
#[test_case("U<", &[1, -1], &[1]; "unsigned less wraps")]
#[test_case("U<", &[-1, 1], &[0]; "unsigned less on big value")]
#[test_case("1 1 = 2 2 = AND", &[], &[1]; "boolean and stays logical")]
#[test_case("1 1 = 1 2 = OR", &[], &[1]; "boolean or stays logical")]
#[test_case("1 2 = NOT", &[], &[1]; "boolean not inverts")]
// --- Stack words ---
#[test_case("DUP", &[42], &[42, 42]; "dup")]
#[test_case("DROP", &[1, 2], &[1]; "drop")]
#[test_case("SWAP", &[1, 2], &[2, 1]; "swap")]
#[test_case("OVER", &[1, 2], &[1, 2, 1]; "over")]
#[test_case("ROT", &[1, 2, 3], &[2, 3, 1]; "rot")]
#[test_case("2 PICK", &[10, 20], &[10, 20, 10]; "pick second")]
#[test_case("1 PICK", &[10, 20], &[10, 20, 20]; "pick top")]
#[test_case("3 ROLL", &[1, 2, 3], &[2, 3, 1]; "roll third")]
#[test_case("?DUP", &[5], &[5, 5]; "qdup non zero")]
#[test_case("?DUP", &[0], &[0]; "qdup zero stays single")]
#[test_case("DEPTH", &[1, 2, 3], &[1, 2, 3, 3]; "depth")]
#[test_case(">R 99 R>", &[7], &[99, 7]; "return stack round trip")]
#[test_case(">R E@ R>", &[7], &[7, 7]; "return stack copy")]
fn stack_result(source: &str, init_stack: &[i32], expected: &[i32]) {
    let result = eval_and_stack(source, init_stack).unwrap();

    assert_eq!(result, expected);
}

// --- Error surface ---

#[test_case("DROP", &[], "STACK EMPTY"; "drop on empty")]
#[test_case("+", &[], "STACK UNDERFLOW"; "add on empty")]
#[test_case("+", &[1], "STACK UNDERFLOW"; "add on one value")]
#[test_case("SWAP", &[1], "STACK EMPTY"; "swap needs two")]
#[test_case("OVER", &[1], "STACK UNDERFLOW"; "over needs two")]
#[test_case("ROT", &[1, 2], "STACK UNDERFLOW"; "rot needs three")]
#[test_case("/", &[1, 0], "Division by zero"; "div by zero")]
#[test_case("MOD", &[1, 0], "Division by zero"; "mod by zero")]
#[test_case("*/", &[1, 2, 0], "Division by zero"; "scale by zero")]
#[test_case("0 PICK", &[1], "Invalid index"; "pick zero index")]
#[test_case("5 PICK", &[1], "Stack too small"; "pick too deep")]
#[test_case("4 ROLL", &[1, 2], "Stack too small"; "roll too deep")]
#[test_case("XYZZY", &[], "XYZZY ?"; "unknown word")]
#[test_case("1 1 = 1 +", &[], "must be number"; "boolean is not a number")]
#[test_case("5 @", &[], "Not a variable"; "fetch from number")]
#[test_case("1 5 !", &[], "Not a variable"; "store into number")]
#[test_case(",", &[], "STACK EMPTY"; "comma on empty stack")]
#[test_case("5 ,", &[], "No current variable"; "comma without create")]
#[test_case("5 ALLOT", &[], "No current variable"; "allot without create")]
#[test_case("I", &[], "Not in DO"; "loop index outside loop")]
#[test_case("J", &[], "Not in double nested DO"; "outer index outside loops")]
#[test_case("LEAVE", &[], "Leave not inside do"; "leave outside loop")]
#[test_case("5 0 DO I .", &[], "Unterminated DO"; "unterminated do")]
#[test_case("1 IF 2", &[], "Unterminated IF"; "unterminated if")]
#[test_case("BEGIN 1", &[], "Unterminated BEGIN"; "unterminated begin")]
#[test_case("BEGIN 1 REPEAT", &[], "Missing WHILE"; "repeat without while")]
#[test_case(": FOO", &[], "Missing word"; "definition without body")]
#[test_case("FORGET NOPE", &[], "Unknown word"; "forget unknown name")]
#[test_case("2147483648", &[], "Overflow"; "integer literal overflow")]
fn error_message(source: &str, init_stack: &[i32], expected: &str) {
    assert_eq!(eval_error(source, init_stack), expected);
}

// --- Push/pop balance ---

#[test_case("+", 2, 1; "binary op balance")]
#[test_case("/MOD", 2, 2; "div mod balance")]
#[test_case("*/", 3, 1; "scale balance")]
fn pop_push_balance(source: &str, pops: usize, pushes: usize) {
    let before = [9, 8, 7, 6];
    let result = eval_and_stack(source, &before).unwrap();

    assert_eq!(result.len(), before.len() - pops + pushes);
}

// --- Reals ---

#[test]
fn real_arithmetic_promotes() {
    let mut interp = ForthInterpreter::with_captured_output();

    interp.seed_base();
    interp.parse_line("1.5 2.5 +").unwrap();

    match &interp.stack()[0] {
        Token::Number(number) => {
            assert!(number.is_real());
            assert_eq!(number.real(), 4.0);
        }

        _ => panic!("expected a number"),
    }
}

#[test]
fn real_literals_with_exponents() {
    let mut interp = ForthInterpreter::with_captured_output();

    interp.seed_base();
    interp.parse_line("-1.5e2").unwrap();

    match &interp.stack()[0] {
        Token::Number(number) => assert_eq!(number.real(), -150.0),
        _ => panic!("expected a number"),
    }
}

// --- Base handling ---

#[test]
fn literals_parse_in_the_current_base() {
    let result = eval_and_stack("16 BASE ! FF DECIMAL", &[]).unwrap();

    assert_eq!(result, vec![255]);
}

#[test]
fn base_is_clamped_on_read() {
    // Base 40 would reject every digit; clamped to 36, Z is 35.
    let result = eval_and_stack("40 BASE ! Z DECIMAL", &[]).unwrap();

    assert_eq!(result, vec![35]);
}

#[test]
fn number_parsing_round_trips_across_bases() {
    for value in [0, 1, -1, 7, 255, -255, 4096, 99999, i32::MAX, i32::MIN + 1] {
        for base in [2, 3, 8, 10, 16, 29, 36] {
            let mut interp = ForthInterpreter::with_captured_output();

            interp.seed_base();
            interp.parse_line(&format!("{} BASE !", base)).unwrap();

            let literal = to_base_string(base, value);

            interp.parse_line(&literal).unwrap();

            let stack = interp.stack();

            assert_eq!(stack.len(), 1, "base {} literal {}", base, literal);
            assert_eq!(token_int(&stack[0]), value, "base {} literal {}", base, literal);
        }
    }
}

#[test]
fn well_formed_lines_leave_no_error() {
    let sources = ["1 2 +", "DUP DROP", ": NOOP ;", "( comment only)"];

    for source in sources {
        let mut interp = ForthInterpreter::with_captured_output();

        interp.seed_base();
        interp.push_integer(1);

        assert!(interp.parse_line(source).is_ok(), "source {:?}", source);
    }
}
