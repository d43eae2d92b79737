use crate::{
    lang::line::Word,
    runtime::{
        built_ins::io_words::store_counted_string,
        data_structures::{builtin::Builtin, token::Token, variable::VarRef},
        error::{self, script_error_str},
        interpreter::{
            Interpreter, InterpreterIo, InterpreterStack, TokenParsing, WordManagement,
        },
    },
};

/// Counted strings share the WORD buffer layout: cell zero holds the length and the
/// following cells hold one character code each.

/// `n STRING name` — define a string variable with room for a count cell plus n characters,
/// and make it current.
///
/// Signature: `n -- `
fn word_string(interp: &mut dyn Interpreter) -> error::Result<()> {
    let capacity = interp.pop_number()?;

    if !capacity.is_integer() {
        return script_error_str("Must be integer");
    }

    let mut name = Word::new();

    if !interp.read_word(&mut name) {
        return script_error_str("Missing word");
    }

    let var = interp.define_variable(name.value());

    var.borrow_mut().allot(capacity.integer() + 1);
    interp.set_current_variable(var);

    Ok(())
}

/// `ref PUT$ text` — read one raw word from the input and store it into the ref as a
/// counted string, growing the variable when the text is longer than its capacity.
///
/// Signature: `ref -- `
fn word_put_string(interp: &mut dyn Interpreter) -> error::Result<()> {
    let var_ref = interp.pop_var_ref()?;

    let mut text = Word::new();

    if !interp.read_word(&mut text) {
        return script_error_str("Missing word");
    }

    store_counted_string(var_ref.var(), text.value())
}

/// Compare two counted strings for equality.
///
/// Signature: `ref1 ref2 -- flag`
fn word_string_equal(interp: &mut dyn Interpreter) -> error::Result<()> {
    let b = interp.pop_var_ref()?;
    let a = interp.pop_var_ref()?;

    let count_of = |var_ref: &VarRef| match var_ref.cell(0) {
        Some(Token::Number(number)) => Ok(number.integer()),
        _ => script_error_str("invalid variable"),
    };

    let a_count = count_of(&a)?;
    let b_count = count_of(&b)?;

    if a_count != b_count {
        interp.push_boolean(false);
        return Ok(());
    }

    for offset in 1..=a_count {
        let (left, right) = (a.cell(offset), b.cell(offset));

        let same = match (left, right) {
            (Some(Token::Number(left)), Some(Token::Number(right))) => {
                left.integer() == right.integer()
            }

            _ => false,
        };

        if !same {
            interp.push_boolean(false);
            return Ok(());
        }
    }

    interp.push_boolean(true);
    Ok(())
}

/// Print a counted string's characters.
///
/// Signature: `ref -- `
fn word_string_print(interp: &mut dyn Interpreter) -> error::Result<()> {
    let var_ref = interp.pop_var_ref()?;

    let count = match var_ref.cell(0) {
        Some(Token::Number(number)) => number.integer(),
        _ => return script_error_str("invalid variable"),
    };

    let mut text = String::new();

    for offset in 1..=count {
        if let Some(Token::Number(number)) = var_ref.cell(offset) {
            text.push((number.integer() as u8) as char);
        }
    }

    interp.output(&text);
    Ok(())
}

/// Register the counted string words.
pub fn register_string_words(interp: &mut dyn Interpreter) {
    interp.add_builtin(Builtin::word("STRING", word_string));
    interp.add_builtin(Builtin::word("PUT$", word_put_string));
    interp.add_builtin(Builtin::word("$=", word_string_equal));
    interp.add_builtin(Builtin::word("$.", word_string_print));
}
