use crate::{
    lang::{line::Word, number::Number},
    runtime::{
        data_structures::{
            builtin::{BeginBlock, Builtin, DoBlock, Handler, IfBlock},
            token::{append_block_token, Token},
        },
        error::{self, script_error_str},
        interpreter::{
            with_compile_state, Interpreter, InterpreterStack, TokenParsing, WordManagement,
        },
    },
};

/// Compile the body of a DO loop: accumulate tokens until LOOP or +LOOP, the latter marking
/// the loop as taking its step from the data stack.
pub fn read_do_body(interp: &mut dyn Interpreter, block: &mut DoBlock) -> error::Result<()> {
    with_compile_state(interp, |interp| {
        let mut word = Word::new();

        loop {
            if !interp.read_word(&mut word) {
                return script_error_str("Unterminated DO");
            }

            if word.is("LOOP") {
                break;
            }

            if word.is("+LOOP") {
                block.counted_step = true;
                break;
            }

            let token = interp.parse_word(&word)?;

            append_block_token(&mut block.tokens, token);
        }

        Ok(())
    })
}

/// Run a DO loop.  The start token (popped from the top) and the end token go onto the
/// return stack, start below end, and the counter advances in its slot so I and J observe
/// it.  Direction is fixed at entry: up when end > start.  The leave flag is shared with the
/// clone of this block on the execution stack.
pub fn execute_do(interp: &mut dyn Interpreter, block: &DoBlock) -> error::Result<()> {
    let start = interp.pop()?;
    let end = interp.pop()?;

    interp.ret_push(start);
    interp.ret_push(end);

    let counter_slot = interp.ret_stack().len() - 2;
    let result = run_do_loop(interp, block, counter_slot);

    if result.is_ok() {
        interp.ret_pop()?;
        interp.ret_pop()?;
    }

    result
}

fn run_do_loop(
    interp: &mut dyn Interpreter,
    block: &DoBlock,
    counter_slot: usize,
) -> error::Result<()> {
    block.leave.set(false);

    let crossed = |interp: &mut dyn Interpreter, up: bool| -> error::Result<bool> {
        let ret = interp.ret_stack();
        let cmp = Token::cmp(&ret[counter_slot + 1], &ret[counter_slot])?;

        Ok(if up { cmp <= 0 } else { cmp >= 0 })
    };

    let up = {
        let ret = interp.ret_stack();
        Token::cmp(&ret[counter_slot + 1], &ret[counter_slot])? > 0
    };

    let mut step = Number::Integer(1);

    loop {
        if crossed(interp, up)? {
            break;
        }

        for token in &block.tokens {
            interp.exec_token(token)?;

            if block.leave.get() {
                break;
            }
        }

        if block.leave.get() {
            break;
        }

        if block.counted_step {
            step = interp.pop_number()?;
        }

        interp.ret_stack_mut()[counter_slot].inc(&step)?;
    }

    Ok(())
}

/// Compile the bodies of an IF: tokens until ELSE go to the true body, the rest until THEN
/// to the else body.
pub fn read_if_body(interp: &mut dyn Interpreter, block: &mut IfBlock) -> error::Result<()> {
    with_compile_state(interp, |interp| {
        let mut word = Word::new();
        let mut in_else = false;

        loop {
            if !interp.read_word(&mut word) {
                return script_error_str("Unterminated IF");
            }

            if word.is("ELSE") {
                in_else = true;
                continue;
            }

            if word.is("THEN") {
                break;
            }

            let token = interp.parse_word(&word)?;

            if in_else {
                append_block_token(&mut block.else_tokens, token);
            } else {
                append_block_token(&mut block.true_tokens, token);
            }
        }

        Ok(())
    })
}

/// Run an IF: pop the flag and execute the matching body.
pub fn execute_if(interp: &mut dyn Interpreter, block: &IfBlock) -> error::Result<()> {
    let flag = interp.pop_boolean()?;

    let body = if flag {
        &block.true_tokens
    } else {
        &block.else_tokens
    };

    for token in body {
        interp.exec_token(token)?;
    }

    Ok(())
}

/// Compile the bodies of a BEGIN.  UNTIL closes the until form; WHILE snapshots what has
/// accumulated as the pre-while body and REPEAT closes the while form.
pub fn read_begin_body(interp: &mut dyn Interpreter, block: &mut BeginBlock) -> error::Result<()> {
    with_compile_state(interp, |interp| {
        let mut word = Word::new();

        block.is_until = false;
        block.is_while = false;

        loop {
            if !interp.read_word(&mut word) {
                return script_error_str("Unterminated BEGIN");
            }

            if word.is("UNTIL") {
                block.is_until = true;
                break;
            }

            if word.is("REPEAT") {
                if !block.is_while {
                    return script_error_str("Missing WHILE");
                }

                break;
            }

            if word.is("WHILE") {
                block.is_while = true;
                block.while_tokens = std::mem::take(&mut block.tokens);
                continue;
            }

            let token = interp.parse_word(&word)?;

            append_block_token(&mut block.tokens, token);
        }

        Ok(())
    })
}

/// Run a BEGIN loop.  The until form runs the body then exits when the popped flag is true.
/// The while form runs the pre-while body, exits when the popped flag is true, otherwise
/// runs the post-while body and goes again.
pub fn execute_begin(interp: &mut dyn Interpreter, block: &BeginBlock) -> error::Result<()> {
    block.leave.set(false);

    let run_body = |interp: &mut dyn Interpreter, body: &[Token]| -> error::Result<()> {
        for token in body {
            interp.exec_token(token)?;

            if block.leave.get() {
                break;
            }
        }

        Ok(())
    };

    if block.is_until {
        loop {
            run_body(interp, &block.tokens)?;

            if block.leave.get() || interp.pop_boolean()? {
                break;
            }
        }
    } else {
        loop {
            run_body(interp, &block.while_tokens)?;

            if block.leave.get() || interp.pop_boolean()? {
                break;
            }

            run_body(interp, &block.tokens)?;

            if block.leave.get() {
                break;
            }
        }
    }

    Ok(())
}

/// Push the innermost loop counter.
///
/// Signature: ` -- counter`
fn word_i(interp: &mut dyn Interpreter) -> error::Result<()> {
    let depth = interp.ret_stack().len();

    if depth < 2 {
        return script_error_str("Not in DO");
    }

    let counter = interp.ret_stack()[depth - 2].clone();

    interp.push(counter);
    Ok(())
}

/// Push the next outer loop counter.
///
/// Signature: ` -- counter`
fn word_j(interp: &mut dyn Interpreter) -> error::Result<()> {
    let depth = interp.ret_stack().len();

    if depth < 4 {
        return script_error_str("Not in double nested DO");
    }

    let counter = interp.ret_stack()[depth - 4].clone();

    interp.push(counter);
    Ok(())
}

/// Signal the nearest enclosing DO or BEGIN on the execution stack to stop after the
/// current token.
///
/// Signature: ` -- `
fn word_leave(interp: &mut dyn Interpreter) -> error::Result<()> {
    for token in interp.exec_stack().iter().rev() {
        if let Token::Builtin(builtin) = token {
            match builtin.handler() {
                Handler::Do(block) => {
                    block.leave.set(true);
                    return Ok(());
                }

                Handler::Cycle(block) => {
                    block.leave.set(true);
                    return Ok(());
                }

                _ => {}
            }
        }
    }

    script_error_str("Leave not inside do")
}

/// Register the control structure words.
pub fn register_control_words(interp: &mut dyn Interpreter) {
    interp.add_builtin(Builtin::new("DO", Handler::Do(DoBlock::default())));
    interp.add_builtin(Builtin::no_op("LOOP"));
    interp.add_builtin(Builtin::no_op("+LOOP"));
    interp.add_builtin(Builtin::word("I", word_i));
    interp.add_builtin(Builtin::word("J", word_j));
    interp.add_builtin(Builtin::word("LEAVE", word_leave));
    interp.add_builtin(Builtin::new("IF", Handler::Branch(IfBlock::default())));
    interp.add_builtin(Builtin::no_op("ELSE"));
    interp.add_builtin(Builtin::no_op("THEN"));
    interp.add_builtin(Builtin::new("BEGIN", Handler::Cycle(BeginBlock::default())));
    interp.add_builtin(Builtin::no_op("UNTIL"));
    interp.add_builtin(Builtin::no_op("WHILE"));
    interp.add_builtin(Builtin::no_op("REPEAT"));
}
