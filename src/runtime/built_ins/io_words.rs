use crate::{
    lang::number::Number,
    runtime::{
        data_structures::{
            builtin::{Builtin, Handler},
            token::Token,
            variable::{VariablePtr, VarRef},
        },
        error::{self, script_error_str},
        interpreter::{Interpreter, InterpreterIo, InterpreterStack, TokenParsing, WordManagement},
    },
};
use std::io::{stdin, Read};

/// Print the popped number as a character.
///
/// Signature: `n -- `
fn word_emit(interp: &mut dyn Interpreter) -> error::Result<()> {
    let number = interp.pop_number()?;
    let character = (number.integer() as u8) as char;

    interp.output(&character.to_string());
    Ok(())
}

/// The compile-time reader for `."`: capture raw characters up to the closing quote.
pub fn read_quoted_text(interp: &mut dyn Interpreter, text: &mut String) -> error::Result<()> {
    if !interp.fill_buffer() {
        return script_error_str("Missing char");
    }

    let line = interp.line_mut();

    text.push(line.get_char());

    while line.is_valid() && !line.is_char('"') {
        text.push(line.get_char());
    }

    if line.is_valid() && line.is_char('"') {
        line.skip_char();
    }

    Ok(())
}

/// Print n cells of the ref as characters, skipping any cell that is not a number.
///
/// Signature: `ref n -- `
fn word_type(interp: &mut dyn Interpreter) -> error::Result<()> {
    let count = interp.pop_number()?;
    let var_ref = interp.pop_var_ref()?;

    let mut text = String::new();

    for offset in 0..count.integer() {
        if let Some(Token::Number(number)) = var_ref.cell(offset) {
            text.push((number.integer() as u8) as char);
        }
    }

    interp.output(&text);
    Ok(())
}

/// Advance the ref by one cell and push the first cell's value: the counted-array
/// unpacking idiom.
///
/// Signature: `ref -- ref+1 count`
fn word_count(interp: &mut dyn Interpreter) -> error::Result<()> {
    let var_ref = interp.pop_var_ref()?;

    let count = match var_ref.cell(0) {
        Some(value) => value,
        None => return script_error_str("invalid variable"),
    };

    interp.push(Token::VarRef(var_ref.indexed(1)));
    interp.push(count);

    Ok(())
}

/// Shrink the count to exclude trailing whitespace cells.
///
/// Signature: `ref n -- ref n'`
fn word_trailing(interp: &mut dyn Interpreter) -> error::Result<()> {
    let count = interp.pop_number()?;
    let token = interp.pop()?;

    let var_ref = match VarRef::from_token(&token) {
        Some(var_ref) => var_ref,
        None => return script_error_str("must be ref variable"),
    };

    let mut last = count.integer() - 1;

    while last >= 0 {
        match var_ref.cell(last) {
            Some(Token::Number(number)) => {
                if !((number.integer() as u8) as char).is_whitespace() {
                    break;
                }
            }

            _ => break,
        }

        last -= 1;
    }

    interp.push(token);
    interp.push_integer(last + 1);

    Ok(())
}

/// Read one character from the terminal without waiting for a newline, and push its code.
///
/// Signature: ` -- n`
fn word_key(interp: &mut dyn Interpreter) -> error::Result<()> {
    let character = read_raw_char()?;

    interp.push_integer(character as i32);
    Ok(())
}

/// Read a single byte from stdin with the terminal in raw mode, restoring the previous
/// terminal settings before returning.
#[cfg(unix)]
fn read_raw_char() -> error::Result<u8> {
    use libc::{tcgetattr, tcsetattr, termios, ECHO, ICANON, STDIN_FILENO, TCSANOW};
    use std::mem::zeroed;

    unsafe {
        let mut saved: termios = zeroed();

        if tcgetattr(STDIN_FILENO, &mut saved) == -1 {
            return script_error_str("Failed to read terminal settings");
        }

        let mut raw = saved;

        raw.c_lflag &= !(ICANON | ECHO);

        if tcsetattr(STDIN_FILENO, TCSANOW, &raw) == -1 {
            return script_error_str("Failed to set terminal settings");
        }

        let mut buffer = [0u8; 1];
        let result = stdin().read(&mut buffer);

        tcsetattr(STDIN_FILENO, TCSANOW, &saved);

        match result {
            Ok(1) => Ok(buffer[0]),
            _ => script_error_str("Failed to read from stdin"),
        }
    }
}

#[cfg(not(unix))]
fn read_raw_char() -> error::Result<u8> {
    let mut buffer = [0u8; 1];

    match stdin().read(&mut buffer) {
        Ok(1) => Ok(buffer[0]),
        _ => script_error_str("Failed to read from stdin"),
    }
}

/// Read up to n characters from stdin into the ref's cells, stopping at a newline.
///
/// Signature: `ref n -- `
fn word_expect(interp: &mut dyn Interpreter) -> error::Result<()> {
    let count = interp.pop_number()?;
    let var_ref = interp.pop_var_ref()?;

    let mut input = stdin().lock();

    for offset in 0..count.integer() {
        let mut buffer = [0u8; 1];

        match input.read(&mut buffer) {
            Ok(1) => {}
            _ => break,
        }

        if buffer[0] == b'\n' {
            break;
        }

        if !var_ref.set_cell(offset, Token::Number(Number::Integer(buffer[0] as i32))) {
            return script_error_str("invalid variable");
        }
    }

    Ok(())
}

/// Read a line of up to 80 characters from stdin and splice it into the current parse line
/// at the cursor, so the characters just read become the next tokens.
///
/// Signature: ` -- `
fn word_query(interp: &mut dyn Interpreter) -> error::Result<()> {
    let mut input = stdin().lock();
    let mut text = String::new();

    for _ in 0..80 {
        let mut buffer = [0u8; 1];

        match input.read(&mut buffer) {
            Ok(1) => {}
            _ => break,
        }

        if !text.is_empty() && buffer[0] == b'\n' {
            break;
        }

        text.push(buffer[0] as char);
    }

    interp.line_mut().insert(&text);
    Ok(())
}

/// Read characters up to (and consuming) the popped delimiter and store them as a
/// length-prefixed cell array in the shared WORD variable, which is pushed.
///
/// Signature: `c -- word-var`
fn word_word(interp: &mut dyn Interpreter) -> error::Result<()> {
    let delimiter = interp.pop_number()?;
    let delimiter = (delimiter.integer() as u8) as char;

    if !interp.fill_buffer() {
        return script_error_str("Missing char");
    }

    let line = interp.line_mut();
    let mut text = String::new();

    text.push(line.get_char());

    while line.is_valid() && !line.is_char(delimiter) {
        text.push(line.get_char());
    }

    if line.is_valid() && line.is_char(delimiter) {
        line.get_char();
    }

    interp.trace_text(&format!("Word: '{}'", text));

    let word_var = interp.word_variable();

    store_counted_string(&word_var, &text)?;
    interp.push(Token::Variable(word_var));

    Ok(())
}

/// Store text into a variable as a count cell followed by one cell per character, extending
/// the variable as needed.
pub fn store_counted_string(var: &VariablePtr, text: &str) -> error::Result<()> {
    let length = text.len() as i32;

    {
        let mut var = var.borrow_mut();
        let missing = length + 1 - var.length();

        if missing > 0 {
            var.allot(missing);
        }

        if !var.set_cell(0, Token::Number(Number::Integer(length))) {
            return script_error_str("invalid variable");
        }

        for (offset, character) in text.chars().enumerate() {
            if !var.set_cell(
                offset as i32 + 1,
                Token::Number(Number::Integer(character as i32)),
            ) {
                return script_error_str("invalid variable");
            }
        }
    }

    Ok(())
}

/// Register the input/output words.
pub fn register_io_words(interp: &mut dyn Interpreter) {
    interp.add_builtin(Builtin::word("EMIT", word_emit));
    interp.add_builtin(Builtin::new(".\"", Handler::Emit(String::new())));
    interp.add_builtin(Builtin::word("TYPE", word_type));
    interp.add_builtin(Builtin::word("COUNT", word_count));
    interp.add_builtin(Builtin::word("-TRAILING", word_trailing));
    interp.add_builtin(Builtin::word("KEY", word_key));
    interp.add_builtin(Builtin::word("EXPECT", word_expect));
    interp.add_builtin(Builtin::word("QUERY", word_query));
    interp.add_builtin(Builtin::word("WORD", word_word));
}
