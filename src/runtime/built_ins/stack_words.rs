use crate::runtime::{
    data_structures::builtin::Builtin,
    error::{self, script_error_str},
    interpreter::{Interpreter, InterpreterStack, WordManagement},
};

/// Duplicate the top token on the data stack.  A duplicated ref gets its own cursor.
///
/// Signature: `value -- value value`
fn word_dup(interp: &mut dyn Interpreter) -> error::Result<()> {
    let token = interp.peek()?;

    interp.push(token);
    Ok(())
}

/// Discard the top token on the data stack.
///
/// Signature: `value -- `
fn word_drop(interp: &mut dyn Interpreter) -> error::Result<()> {
    let _ = interp.pop()?;

    Ok(())
}

/// Swap the top 2 tokens on the data stack.
///
/// Signature: `a b -- b a`
fn word_swap(interp: &mut dyn Interpreter) -> error::Result<()> {
    if interp.stack().len() < 2 {
        return script_error_str("STACK EMPTY");
    }

    let b = interp.pop()?;
    let a = interp.pop()?;

    interp.push(b);
    interp.push(a);

    Ok(())
}

/// Copy the second token over the top one.
///
/// Signature: `a b -- a b a`
fn word_over(interp: &mut dyn Interpreter) -> error::Result<()> {
    if interp.stack().len() < 2 {
        return script_error_str("STACK UNDERFLOW");
    }

    let token = interp.stack()[interp.stack().len() - 2].clone();

    interp.push(token);
    Ok(())
}

/// Rotate the third token to the top.
///
/// Signature: `a b c -- b c a`
fn word_rot(interp: &mut dyn Interpreter) -> error::Result<()> {
    if interp.stack().len() < 3 {
        return script_error_str("STACK UNDERFLOW");
    }

    let c = interp.pop()?;
    let b = interp.pop()?;
    let a = interp.pop()?;

    interp.push(b);
    interp.push(c);
    interp.push(a);

    Ok(())
}

/// Copy the nth token from the top, counting from 1.
///
/// Signature: `n -- copied-value`
fn word_pick(interp: &mut dyn Interpreter) -> error::Result<()> {
    let count = interp.pop_number()?;

    if !count.is_integer() {
        return script_error_str("Must be integer");
    }

    let token = interp.peek_at(count.integer())?;

    interp.push(token);
    Ok(())
}

/// Remove the nth token from the top, counting from 1, and push it.
///
/// Signature: `n -- rolled-value`
fn word_roll(interp: &mut dyn Interpreter) -> error::Result<()> {
    let count = interp.pop_number()?;

    if !count.is_integer() {
        return script_error_str("Must be integer");
    }

    let token = interp.pop_at(count.integer())?;

    interp.push(token);
    Ok(())
}

/// Duplicate the top number only when it is non-zero; zero stays single.
///
/// Signature: `n -- n n | 0`
fn word_qdup(interp: &mut dyn Interpreter) -> error::Result<()> {
    let number = interp.pop_number()?;

    interp.push_number(number);

    if number.integer() != 0 {
        interp.push_number(number);
    }

    Ok(())
}

/// Push the depth of the data stack before this word ran.
///
/// Signature: ` -- depth`
fn word_depth(interp: &mut dyn Interpreter) -> error::Result<()> {
    interp.push_integer(interp.stack().len() as i32);

    Ok(())
}

/// Move the top of the data stack to the return stack.
///
/// Signature: `value -- `
fn word_to_ret(interp: &mut dyn Interpreter) -> error::Result<()> {
    let token = interp.pop()?;

    interp.ret_push(token);
    Ok(())
}

/// Move the top of the return stack to the data stack.
///
/// Signature: ` -- value`
fn word_from_ret(interp: &mut dyn Interpreter) -> error::Result<()> {
    let token = interp.ret_pop()?;

    interp.push(token);
    Ok(())
}

/// Copy the top of the return stack to the data stack.
///
/// Signature: ` -- value`
fn word_copy_ret(interp: &mut dyn Interpreter) -> error::Result<()> {
    match interp.ret_stack().last().cloned() {
        Some(token) => {
            interp.push(token);
            Ok(())
        }

        None => script_error_str("STACK EMPTY"),
    }
}

/// Register the stack manipulation words.
pub fn register_stack_words(interp: &mut dyn Interpreter) {
    interp.add_builtin(Builtin::word("DUP", word_dup));
    interp.add_builtin(Builtin::word("DROP", word_drop));
    interp.add_builtin(Builtin::word("SWAP", word_swap));
    interp.add_builtin(Builtin::word("OVER", word_over));
    interp.add_builtin(Builtin::word("ROT", word_rot));
    interp.add_builtin(Builtin::word("PICK", word_pick));
    interp.add_builtin(Builtin::word("ROLL", word_roll));
    interp.add_builtin(Builtin::word("?DUP", word_qdup));
    interp.add_builtin(Builtin::word("DEPTH", word_depth));
    interp.add_builtin(Builtin::word(">R", word_to_ret));
    interp.add_builtin(Builtin::word("R>", word_from_ret));
    interp.add_builtin(Builtin::word("E@", word_copy_ret));
}
