use crate::{
    lang::{line::Word, number::Number},
    runtime::{
        data_structures::{
            builtin::{Builtin, Handler},
            token::{append_block_token, Token},
        },
        error::{self, script_error_str},
        interpreter::{
            with_compile_state, Interpreter, InterpreterStack, TokenParsing, WordManagement,
        },
    },
};

/// `:` name ... `;` — compile tokens up to the terminating semicolon into a new procedure.
///
/// Signature: ` -- `
fn word_define(interp: &mut dyn Interpreter) -> error::Result<()> {
    with_compile_state(interp, |interp| {
        let mut name = Word::new();

        if !interp.read_word(&mut name) {
            return script_error_str("Missing word");
        }

        let mut tokens = Vec::new();
        let mut word = Word::new();

        loop {
            if !interp.read_word(&mut word) {
                return script_error_str("Missing word");
            }

            if word.is(";") {
                break;
            }

            let token = interp.parse_word(&word)?;

            append_block_token(&mut tokens, token);
        }

        interp.define_procedure(name.value(), tokens);
        Ok(())
    })
}

/// VARIABLE name — define a variable with a single zero cell and make it current.
///
/// Signature: ` -- `
fn word_variable(interp: &mut dyn Interpreter) -> error::Result<()> {
    let mut name = Word::new();

    if !interp.read_word(&mut name) {
        return script_error_str("Missing word");
    }

    let var = interp.define_variable_with(name.value(), Token::Number(Number::Integer(0)));

    interp.set_current_variable(var);
    Ok(())
}

/// CONSTANT name — pop the top token and define a constant variable holding it.  The name
/// resolves to the stored value from then on.
///
/// Signature: `value -- `
fn word_constant(interp: &mut dyn Interpreter) -> error::Result<()> {
    let value = interp.pop()?;

    let mut name = Word::new();

    if !interp.read_word(&mut name) {
        return script_error_str("Missing word");
    }

    let var = interp.define_variable_with(name.value(), value);

    var.borrow_mut().set_constant(true);
    Ok(())
}

/// CREATE name — define an empty variable and make it current, ready for `,` and ALLOT.
///
/// Signature: ` -- `
fn word_create(interp: &mut dyn Interpreter) -> error::Result<()> {
    let mut name = Word::new();

    if !interp.read_word(&mut name) {
        return script_error_str("Missing word");
    }

    let var = interp.define_variable(name.value());

    interp.set_current_variable(var);
    Ok(())
}

/// `,` — append the popped token to the current variable's cells.
///
/// Signature: `value -- `
fn word_comma(interp: &mut dyn Interpreter) -> error::Result<()> {
    let value = interp.pop()?;

    let var = match interp.current_variable() {
        Some(var) => var,
        None => return script_error_str("No current variable"),
    };

    var.borrow_mut().add_cell(value);
    Ok(())
}

/// ALLOT — extend the current variable with n zero cells.
///
/// Signature: `n -- `
fn word_allot(interp: &mut dyn Interpreter) -> error::Result<()> {
    let count = interp.pop_number()?;

    let var = match interp.current_variable() {
        Some(var) => var,
        None => return script_error_str("No current variable"),
    };

    var.borrow_mut().allot(count.integer());
    Ok(())
}

/// The compile-time reader for DOES>: accumulate tokens up to, but not consuming, the next
/// semicolon.  The semicolon is left for the enclosing definition to terminate on.
pub fn read_does_body(interp: &mut dyn Interpreter, tokens: &mut Vec<Token>) -> error::Result<()> {
    with_compile_state(interp, |interp| {
        let mut word = Word::new();

        loop {
            if !interp.fill_buffer() {
                return script_error_str("Missing char");
            }

            let saved = interp.line_mut().pos();

            if !interp.read_word(&mut word) {
                return script_error_str("Missing word");
            }

            if word.is(";") {
                interp.line_mut().set_pos(saved);
                break;
            }

            let token = interp.parse_word(&word)?;

            append_block_token(tokens, token);
        }

        Ok(())
    })
}

/// Running DOES> attaches the compiled body to the current variable as its action: from
/// then on pushing that variable by name runs the action immediately after the push.
pub fn execute_does(interp: &mut dyn Interpreter, tokens: &[Token]) -> error::Result<()> {
    let var = match interp.current_variable() {
        Some(var) => var,
        None => return script_error_str("No current variable"),
    };

    var.borrow_mut().set_action(tokens.to_vec());
    Ok(())
}

/// FORGET name — remove the newest definition of the name, variable first then procedure,
/// revealing any shadowed one.
///
/// Signature: ` -- `
fn word_forget(interp: &mut dyn Interpreter) -> error::Result<()> {
    let mut name = Word::new();

    if !interp.read_word(&mut name) {
        return script_error_str("Missing word");
    }

    if interp.lookup_variable(name.value()).is_some() {
        interp.forget_variable(name.value());
        Ok(())
    } else if interp.lookup_procedure(name.value()).is_some() {
        interp.forget_procedure(name.value());
        Ok(())
    } else {
        script_error_str("Unknown word")
    }
}

/// Register the defining words.
pub fn register_defining_words(interp: &mut dyn Interpreter) {
    interp.add_builtin(Builtin::word(":", word_define));
    interp.add_builtin(Builtin::word("VARIABLE", word_variable));
    interp.add_builtin(Builtin::word("CONSTANT", word_constant));
    interp.add_builtin(Builtin::word("CREATE", word_create));
    interp.add_builtin(Builtin::word(",", word_comma));
    interp.add_builtin(Builtin::word("ALLOT", word_allot));
    interp.add_builtin(Builtin::new("DOES>", Handler::Does(Vec::new())));
    interp.add_builtin(Builtin::word("FORGET", word_forget));
}
