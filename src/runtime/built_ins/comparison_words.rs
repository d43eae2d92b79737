use crate::{
    lang::number::Number,
    runtime::{
        data_structures::builtin::Builtin,
        error,
        interpreter::{Interpreter, InterpreterStack, WordManagement},
    },
};

/// Pop two Numbers and compare them, oldest first.
fn cmp_op(interp: &mut dyn Interpreter) -> error::Result<i32> {
    let b = interp.pop_number()?;
    let a = interp.pop_number()?;

    Ok(Number::cmp(&a, &b))
}

/// Signature: `a b -- flag`
fn word_less(interp: &mut dyn Interpreter) -> error::Result<()> {
    let cmp = cmp_op(interp)?;

    interp.push_boolean(cmp < 0);
    Ok(())
}

/// Signature: `a b -- flag`
fn word_equal(interp: &mut dyn Interpreter) -> error::Result<()> {
    let cmp = cmp_op(interp)?;

    interp.push_boolean(cmp == 0);
    Ok(())
}

/// Signature: `a b -- flag`
fn word_greater(interp: &mut dyn Interpreter) -> error::Result<()> {
    let cmp = cmp_op(interp)?;

    interp.push_boolean(cmp > 0);
    Ok(())
}

/// Compare treating both integers as unsigned 32-bit values.
///
/// Signature: `a b -- flag`
fn word_u_less(interp: &mut dyn Interpreter) -> error::Result<()> {
    let b = interp.pop_number()?;
    let a = interp.pop_number()?;

    interp.push_boolean((a.integer() as u32) < (b.integer() as u32));
    Ok(())
}

/// Invert a boolean logically, or an integer bitwise.
///
/// Signature: `value -- inverted`
fn word_not(interp: &mut dyn Interpreter) -> error::Result<()> {
    let value = interp.pop_bool_or_number()?;

    interp.push_number(value.not());
    Ok(())
}

/// Register the comparison words.
pub fn register_comparison_words(interp: &mut dyn Interpreter) {
    interp.add_builtin(Builtin::word("<", word_less));
    interp.add_builtin(Builtin::word("=", word_equal));
    interp.add_builtin(Builtin::word(">", word_greater));
    interp.add_builtin(Builtin::word("U<", word_u_less));
    interp.add_builtin(Builtin::word("NOT", word_not));
}
