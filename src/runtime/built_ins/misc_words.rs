use crate::{
    lang::line::Word,
    runtime::{
        data_structures::{
            builtin::{Builtin, Handler},
            token::Token,
        },
        error::{self, script_error_str, ForthError},
        interpreter::{Interpreter, InterpreterIo, InterpreterStack, TokenParsing, WordManagement},
    },
};

/// The compile-time reader for `(`: capture raw characters up to the closing parenthesis.
/// The resulting token is null, so compiled bodies never contain it.
pub fn read_comment_text(interp: &mut dyn Interpreter, text: &mut String) -> error::Result<()> {
    if !interp.fill_buffer() {
        return script_error_str("Missing char");
    }

    let line = interp.line_mut();

    text.push(line.get_char());

    while line.is_valid() && !line.is_char(')') {
        text.push(line.get_char());
    }

    if line.is_valid() && line.is_char(')') {
        line.skip_char();
    }

    Ok(())
}

/// The compile-time reader for LOAD: capture one word as the filename.
pub fn read_load_filename(interp: &mut dyn Interpreter, filename: &mut String) -> error::Result<()> {
    if !interp.fill_buffer() {
        return script_error_str("Missing char");
    }

    let mut word = Word::new();

    if !interp.read_word(&mut word) {
        return script_error_str("Missing word");
    }

    *filename = word.value().to_string();
    Ok(())
}

/// Push the shared WORD buffer variable.
///
/// Signature: ` -- word-var`
fn word_here(interp: &mut dyn Interpreter) -> error::Result<()> {
    let word_var = interp.word_variable();

    interp.push(Token::Variable(word_var));
    Ok(())
}

/// Clear every stack and unwind to the nearest source driver.
///
/// Signature: `... -- `
fn word_abort(interp: &mut dyn Interpreter) -> error::Result<()> {
    interp.clear_ret_stack();
    interp.clear_exec_stack();
    interp.clear_stack();

    Err(ForthError::Abort)
}

/// Clear the return and execution stacks and unwind to the nearest source driver, keeping
/// the data stack.
///
/// Signature: ` -- `
fn word_quit(interp: &mut dyn Interpreter) -> error::Result<()> {
    interp.clear_ret_stack();
    interp.clear_exec_stack();

    Err(ForthError::Quit)
}

/// Turn the debug trace on or off from program text.
///
/// Signature: `flag -- `
fn word_debug(interp: &mut dyn Interpreter) -> error::Result<()> {
    let flag = interp.pop_number()?;

    interp.set_debug(flag.integer() != 0);
    Ok(())
}

/// Register the comment, buffer, unwind and trace words.
pub fn register_misc_words(interp: &mut dyn Interpreter) {
    interp.add_builtin(Builtin::new("(", Handler::Remark(String::new())));
    interp.add_builtin(Builtin::new("LOAD", Handler::Load(String::new())));
    interp.add_builtin(Builtin::word("HERE", word_here));
    interp.add_builtin(Builtin::word("ABORT", word_abort));
    interp.add_builtin(Builtin::word("QUIT", word_quit));
    interp.add_builtin(Builtin::word("DEBUG", word_debug));
}
