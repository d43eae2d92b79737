use crate::{
    lang::number::Number,
    runtime::{
        data_structures::{
            builtin::Builtin,
            procedure::ProcedurePtr,
            variable::{VariablePtr, VarRef},
        },
        error::{self, script_error_str},
    },
};

/// The polymorphic value carried on the data, return and execution stacks.
///
/// Clone is the copying operation the stack words use: value variants copy outright,
/// Variable and Procedure tokens share their dictionary-owned entity, and a VarRef copy gets
/// an independent cursor over shared cells.  That last case is why DUP, OVER and PICK never
/// alias: writing through one copy of a ref does not move the other.
#[derive(Clone)]
pub enum Token {
    /// A boolean flag, as pushed by the comparison words.
    Boolean(bool),

    /// A numeric value.
    Number(Number),

    /// A named primitive, possibly carrying a compiled body.
    Builtin(Builtin),

    /// A named variable from the dictionary.
    Variable(VariablePtr),

    /// A cursor into a variable's cells.
    VarRef(VarRef),

    /// A named procedure from the dictionary.
    Procedure(ProcedurePtr),
}

impl Token {
    pub fn is_boolean(&self) -> bool {
        matches!(self, Token::Boolean(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Token::Number(_))
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Token::Builtin(_))
    }

    pub fn is_procedure(&self) -> bool {
        matches!(self, Token::Procedure(_))
    }

    /// Is this either kind of variable token?
    pub fn is_var_base(&self) -> bool {
        matches!(self, Token::Variable(_) | Token::VarRef(_))
    }

    /// Is this exactly a dictionary variable?
    pub fn is_variable(&self) -> bool {
        matches!(self, Token::Variable(_))
    }

    /// Does this token read and write cells?  Any variable token that is not a constant
    /// qualifies, so a bare variable name works wherever a ref does.
    pub fn is_var_ref(&self) -> bool {
        match self {
            Token::Variable(var) => !var.borrow().is_constant(),
            Token::VarRef(_) => true,
            _ => false,
        }
    }

    /// Executable tokens run when parsed; the rest are pushed.
    pub fn is_executable(&self) -> bool {
        matches!(self, Token::Builtin(_) | Token::Procedure(_))
    }

    /// Block tokens sit on the execution stack while they run, which is how LEAVE finds the
    /// enclosing loop.
    pub fn is_block(&self) -> bool {
        match self {
            Token::Builtin(builtin) => builtin.is_block(),
            _ => false,
        }
    }

    /// Null tokens are placeholders that compile readers skip.
    pub fn is_null(&self) -> bool {
        match self {
            Token::Builtin(builtin) => builtin.is_null(),
            _ => false,
        }
    }

    /// The synthetic address of a variable token.
    fn addr(&self) -> Option<i64> {
        match self {
            Token::Variable(var) => Some(var.borrow().addr()),
            Token::VarRef(var_ref) => Some(var_ref.addr()),
            _ => None,
        }
    }

    /// Three way comparison.  Numbers compare numerically, variable tokens compare by
    /// synthetic address; anything else is not comparable.
    pub fn cmp(a: &Token, b: &Token) -> error::Result<i32> {
        match (a, b) {
            (Token::Number(a), Token::Number(b)) => Ok(Number::cmp(a, b)),

            _ => {
                if let (Some(a), Some(b)) = (a.addr(), b.addr()) {
                    Ok(match a.cmp(&b) {
                        std::cmp::Ordering::Greater => 1,
                        std::cmp::Ordering::Less => -1,
                        std::cmp::Ordering::Equal => 0,
                    })
                } else {
                    script_error_str("cmp not supported")
                }
            }
        }
    }

    /// Advance a loop counter in place: numbers add the step, variable tokens move their
    /// cursor by the step's integer value.
    pub fn inc(&mut self, step: &Number) -> error::Result<()> {
        match self {
            Token::Number(number) => {
                number.inc(step);
                Ok(())
            }

            Token::Variable(var) => {
                let mut var = var.borrow_mut();
                let index = var.index();

                var.set_index(index + step.integer());
                Ok(())
            }

            Token::VarRef(var_ref) => {
                var_ref.set_index(var_ref.index() + step.integer());
                Ok(())
            }

            _ => script_error_str("inc not supported"),
        }
    }
}

/// Interpret a token as a Number, resolving a constant variable to its stored value first.
/// Booleans do not qualify; the words that accept them use the bool-or-number pop instead.
pub fn token_to_number(token: &Token) -> error::Result<Number> {
    let resolved = match token {
        Token::Variable(var) if var.borrow().is_constant() => var.borrow().value(),
        _ => Some(token.clone()),
    };

    match resolved {
        Some(Token::Number(number)) => Ok(number),
        _ => script_error_str("must be number"),
    }
}

/// Render a token as source-like text using the given integer base.  Constants display their
/// stored value, variables display as `$NAME`, refs as `$NAME[index]`, and procedures and
/// compiled builtins reconstruct their definition.
pub fn token_text(token: &Token, base: i32) -> String {
    match token {
        Token::Boolean(value) => if *value { "TRUE" } else { "FALSE" }.to_string(),

        Token::Number(number) => number.to_text(base),

        Token::Builtin(builtin) => builtin.to_text(base),

        Token::Variable(var) => {
            let constant_value = {
                let var = var.borrow();

                if var.is_constant() { var.value() } else { None }
            };

            match constant_value {
                Some(value) => token_text(&value, base),
                None => format!("${}", var.borrow().name()),
            }
        }

        Token::VarRef(var_ref) => format!("${}[{}]", var_ref.name(), var_ref.index()),

        Token::Procedure(procedure) => {
            let mut text = format!(": {} ", procedure.name());

            for token in procedure.tokens() {
                text.push_str(&token_text(token, base));
                text.push(' ');
            }

            text.push(';');
            text
        }
    }
}

/// Append a token to a body under construction.  Procedures are expanded inline and null
/// tokens are skipped.
pub fn append_block_token(tokens: &mut Vec<Token>, token: Token) {
    if let Token::Procedure(procedure) = &token {
        for inner in procedure.tokens() {
            tokens.push(inner.clone());
        }
    } else if !token.is_null() {
        tokens.push(token);
    }
}
