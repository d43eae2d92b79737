use crate::{
    lang::number::Number,
    runtime::{
        data_structures::{builtin::Builtin, token::Token},
        error::{self, script_error_str},
        interpreter::{Interpreter, InterpreterIo, InterpreterStack, WordManagement},
    },
};

/// Reset the numeric base to ten, defining BASE first if something forgot it.
///
/// Signature: ` -- `
fn word_decimal(interp: &mut dyn Interpreter) -> error::Result<()> {
    let var = match interp.lookup_variable("BASE") {
        Some(var) => var,
        None => interp.define_variable_with("BASE", Token::Number(Number::Integer(10))),
    };

    if !var.borrow_mut().set_integer(10) {
        return script_error_str("invalid variable");
    }

    Ok(())
}

/// Pop and print the top token followed by a space.  Constants print their stored value;
/// integers render in the current BASE.
///
/// Signature: `value -- `
fn word_print(interp: &mut dyn Interpreter) -> error::Result<()> {
    let token = interp.pop()?;

    let resolved = match &token {
        Token::Variable(var) if var.borrow().is_constant() => match var.borrow().value() {
            Some(value) => value,
            None => return script_error_str("invalid variable"),
        },

        _ => token,
    };

    let text = interp.token_text(&resolved);

    interp.output(&text);
    interp.output(" ");

    Ok(())
}

/// Print the whole data stack, bottom first, without consuming it.
///
/// Signature: ` -- `
fn word_print_stack(interp: &mut dyn Interpreter) -> error::Result<()> {
    let mut text = String::new();

    for (position, token) in interp.stack().iter().enumerate() {
        if position > 0 {
            text.push(' ');
        }

        text.push_str(&interp.token_text(token));
    }

    interp.output(&text);
    Ok(())
}

/// Register the number printing words.
pub fn register_number_words(interp: &mut dyn Interpreter) {
    interp.add_builtin(Builtin::word("DECIMAL", word_decimal));
    interp.add_builtin(Builtin::word(".", word_print));
    interp.add_builtin(Builtin::word("PSTACK", word_print_stack));
}
