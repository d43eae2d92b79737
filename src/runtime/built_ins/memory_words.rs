use crate::{
    lang::number::Number,
    runtime::{
        data_structures::{
            builtin::Builtin,
            token::{token_to_number, Token},
            variable::VarRef,
        },
        error::{self, script_error_str},
        interpreter::{Interpreter, InterpreterIo, InterpreterStack, WordManagement},
    },
};

/// Fetch the current cell of the popped ref.
///
/// Signature: `ref -- value`
fn word_fetch(interp: &mut dyn Interpreter) -> error::Result<()> {
    let token = interp.pop()?;

    let var_ref = match VarRef::from_token(&token) {
        Some(var_ref) => var_ref,
        None => return script_error_str("Not a variable"),
    };

    match var_ref.value() {
        Some(value) => {
            interp.push(value);
            Ok(())
        }

        None => script_error_str("invalid variable"),
    }
}

/// Store the second token on the stack into the ref on top.
///
/// Signature: `value ref -- `
fn word_store(interp: &mut dyn Interpreter) -> error::Result<()> {
    if interp.stack().len() < 2 {
        return script_error_str("STACK UNDERFLOW");
    }

    let target = interp.pop()?;
    let value = interp.pop()?;

    let var_ref = match VarRef::from_token(&target) {
        Some(var_ref) => var_ref,
        None => return script_error_str("Not a variable"),
    };

    if !var_ref.set_value(value) {
        return script_error_str("invalid variable");
    }

    Ok(())
}

/// Fetch the current cell of the popped ref and print it.
///
/// Signature: `ref -- `
fn word_print_fetch(interp: &mut dyn Interpreter) -> error::Result<()> {
    let var_ref = interp.pop_var_ref()?;

    match var_ref.value() {
        Some(value) => {
            let text = interp.token_text(&value);

            interp.output(&text);
            interp.output(" ");
            Ok(())
        }

        None => script_error_str("invalid variable"),
    }
}

/// Add a number into a variable's current cell.
///
/// Signature: `n var -- `
fn word_add_store(interp: &mut dyn Interpreter) -> error::Result<()> {
    let var = interp.pop_variable()?;
    let number = interp.pop_number()?;

    let current = match var.borrow().value() {
        Some(value) => value,
        None => return script_error_str("invalid variable"),
    };

    if !current.is_number() {
        return script_error_str("var must be number");
    }

    let current = token_to_number(&current)?;

    var.borrow_mut()
        .set_value(Token::Number(Number::plus(current, number)));

    Ok(())
}

/// Copy n cells from the source ref to the destination ref.
///
/// Signature: `src dst n -- `
fn word_move(interp: &mut dyn Interpreter) -> error::Result<()> {
    let count = interp.pop_number()?;
    let dst = interp.pop_var_ref()?;
    let src = interp.pop_var_ref()?;

    for offset in 0..count.integer() {
        let value = match src.cell(offset) {
            Some(value) => value,
            None => return script_error_str("invalid variable"),
        };

        if !dst.set_cell(offset, value) {
            return script_error_str("invalid variable");
        }
    }

    Ok(())
}

/// Fill n cells of the ref with copies of the given token.
///
/// Signature: `ref n value -- `
fn word_fill(interp: &mut dyn Interpreter) -> error::Result<()> {
    let value = interp.pop()?;
    let count = interp.pop_number()?;
    let var_ref = interp.pop_var_ref()?;

    for offset in 0..count.integer() {
        if !var_ref.set_cell(offset, value.clone()) {
            return script_error_str("invalid variable");
        }
    }

    Ok(())
}

/// Register the memory words.
pub fn register_memory_words(interp: &mut dyn Interpreter) {
    interp.add_builtin(Builtin::word("@", word_fetch));
    interp.add_builtin(Builtin::word("!", word_store));
    interp.add_builtin(Builtin::word("?", word_print_fetch));
    interp.add_builtin(Builtin::word("+!", word_add_store));
    interp.add_builtin(Builtin::word("MOVE", word_move));
    interp.add_builtin(Builtin::word("FILL", word_fill));
}
