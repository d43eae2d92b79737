use crate::{
    lang::number::Number,
    runtime::{
        data_structures::{
            builtin::Builtin,
            token::{token_to_number, Token},
            variable::VarRef,
        },
        error::{self, script_error_str},
        interpreter::{Interpreter, InterpreterStack, WordManagement},
    },
};

/// Pop two Numbers, oldest first.
fn pop_numbers(interp: &mut dyn Interpreter) -> error::Result<(Number, Number)> {
    let b = interp.pop_number()?;
    let a = interp.pop_number()?;

    Ok((a, b))
}

/// Pop two Numbers also accepting booleans, oldest first.
fn pop_bool_or_numbers(interp: &mut dyn Interpreter) -> error::Result<(Number, Number)> {
    let b = interp.pop_bool_or_number()?;
    let a = interp.pop_bool_or_number()?;

    Ok((a, b))
}

/// A zero divisor is forbidden; report it before dividing.
fn check_divisor(divisor: &Number) -> error::Result<()> {
    let is_zero = if divisor.is_real() {
        divisor.real() == 0.0
    } else {
        divisor.integer() == 0
    };

    if is_zero {
        script_error_str("Division by zero")
    } else {
        Ok(())
    }
}

/// Addition, overloaded for refs: a variable token plus an integer offsets the cursor
/// instead of adding numbers.
///
/// Signature: `a b -- a+b` or `ref n -- ref'`
fn word_plus(interp: &mut dyn Interpreter) -> error::Result<()> {
    let depth = interp.stack().len();

    if depth < 2 {
        return script_error_str("STACK UNDERFLOW");
    }

    if interp.stack()[depth - 2].is_var_ref() {
        let offset = pop_integer_operand(interp)?;
        let var_ref = interp.pop_var_ref()?;

        interp.push(Token::VarRef(var_ref.indexed(offset)));
    } else if interp.stack()[depth - 1].is_var_ref() {
        let var_ref = interp.pop_var_ref()?;
        let offset = pop_integer_operand(interp)?;

        interp.push(Token::VarRef(var_ref.indexed(offset)));
    } else {
        let (a, b) = pop_numbers(interp)?;

        interp.push_number(Number::plus(a, b));
    }

    Ok(())
}

/// Subtraction, with the same ref overloading as addition; the offset is negated.
///
/// Signature: `a b -- a-b` or `ref n -- ref'`
fn word_minus(interp: &mut dyn Interpreter) -> error::Result<()> {
    let depth = interp.stack().len();

    if depth < 2 {
        return script_error_str("STACK UNDERFLOW");
    }

    if interp.stack()[depth - 2].is_var_ref() {
        let offset = pop_integer_operand(interp)?;
        let var_ref = interp.pop_var_ref()?;

        interp.push(Token::VarRef(var_ref.indexed(-offset)));
    } else if interp.stack()[depth - 1].is_var_ref() {
        let var_ref = interp.pop_var_ref()?;
        let offset = pop_integer_operand(interp)?;

        interp.push(Token::VarRef(var_ref.indexed(-offset)));
    } else {
        let (a, b) = pop_numbers(interp)?;

        interp.push_number(Number::minus(a, b));
    }

    Ok(())
}

/// The numeric operand paired with a ref must be an integer.
fn pop_integer_operand(interp: &mut dyn Interpreter) -> error::Result<i32> {
    let number = interp.pop_number()?;

    if !number.is_integer() {
        return script_error_str("Must be integer");
    }

    Ok(number.integer())
}

/// Signature: `a b -- a*b`
fn word_times(interp: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_numbers(interp)?;

    interp.push_number(Number::times(a, b));
    Ok(())
}

/// Signature: `a b -- a/b`
fn word_divide(interp: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_numbers(interp)?;

    check_divisor(&b)?;
    interp.push_number(Number::divide(a, b));
    Ok(())
}

/// Signature: `a b -- a%b`
fn word_mod(interp: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_numbers(interp)?;

    check_divisor(&b)?;
    interp.push_number(Number::modulo(a, b));
    Ok(())
}

/// Remainder then quotient.
///
/// Signature: `a b -- a%b a/b`
fn word_div_mod(interp: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_numbers(interp)?;

    check_divisor(&b)?;
    interp.push_number(Number::modulo(a, b));
    interp.push_number(Number::divide(a, b));
    Ok(())
}

/// Scale: multiply then divide.
///
/// Signature: `a b c -- a*b/c`
fn word_mul_div(interp: &mut dyn Interpreter) -> error::Result<()> {
    let c = interp.pop_number()?;
    let b = interp.pop_number()?;
    let a = interp.pop_number()?;

    check_divisor(&c)?;
    interp.push_number(Number::divide(Number::times(a, b), c));
    Ok(())
}

/// Add a small constant, or offset a ref's cursor.
fn plus_constant(interp: &mut dyn Interpreter, step: i32) -> error::Result<()> {
    let token = interp.pop()?;

    match VarRef::from_token(&token) {
        Some(var_ref) => interp.push(Token::VarRef(var_ref.indexed(step))),

        None => {
            let number = token_to_number(&token)?;

            interp.push_number(Number::plus(number, Number::Integer(step)));
        }
    }

    Ok(())
}

/// Signature: `a -- a+1` or `ref -- ref'`
fn word_plus_one(interp: &mut dyn Interpreter) -> error::Result<()> {
    plus_constant(interp, 1)
}

/// Signature: `a -- a+2` or `ref -- ref'`
fn word_plus_two(interp: &mut dyn Interpreter) -> error::Result<()> {
    plus_constant(interp, 2)
}

/// Signature: `a b -- max`
fn word_max(interp: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_numbers(interp)?;

    interp.push_number(Number::max(a, b));
    Ok(())
}

/// Signature: `a b -- min`
fn word_min(interp: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_numbers(interp)?;

    interp.push_number(Number::min(a, b));
    Ok(())
}

/// Signature: `a -- |a|`
fn word_abs(interp: &mut dyn Interpreter) -> error::Result<()> {
    let number = interp.pop_number()?;

    interp.push_number(number.abs());
    Ok(())
}

/// Signature: `a -- -a`
fn word_negate(interp: &mut dyn Interpreter) -> error::Result<()> {
    let number = interp.pop_number()?;

    interp.push_number(number.neg());
    Ok(())
}

/// Signature: `a b -- a&b`
fn word_and(interp: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_bool_or_numbers(interp)?;

    interp.push_number(Number::and(a, b));
    Ok(())
}

/// Signature: `a b -- a|b`
fn word_or(interp: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_bool_or_numbers(interp)?;

    interp.push_number(Number::or(a, b));
    Ok(())
}

/// Signature: `a b -- a^b`
fn word_xor(interp: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_bool_or_numbers(interp)?;

    interp.push_number(Number::xor(a, b));
    Ok(())
}

/// Register the arithmetic and logical words.
pub fn register_arithmetic_words(interp: &mut dyn Interpreter) {
    interp.add_builtin(Builtin::word("+", word_plus));
    interp.add_builtin(Builtin::word("-", word_minus));
    interp.add_builtin(Builtin::word("*", word_times));
    interp.add_builtin(Builtin::word("/", word_divide));
    interp.add_builtin(Builtin::word("MOD", word_mod));
    interp.add_builtin(Builtin::word("/MOD", word_div_mod));
    interp.add_builtin(Builtin::word("1+", word_plus_one));
    interp.add_builtin(Builtin::word("2+", word_plus_two));
    interp.add_builtin(Builtin::word("*/", word_mul_div));
    interp.add_builtin(Builtin::word("MAX", word_max));
    interp.add_builtin(Builtin::word("MIN", word_min));
    interp.add_builtin(Builtin::word("ABS", word_abs));
    interp.add_builtin(Builtin::word("NEGATE", word_negate));
    interp.add_builtin(Builtin::word("AND", word_and));
    interp.add_builtin(Builtin::word("OR", word_or));
    interp.add_builtin(Builtin::word("XOR", word_xor));
}
