use crate::runtime::data_structures::token::Token;
use std::rc::Rc;

/// Procedures are owned by the dictionary and shared by every token that names them.
pub type ProcedurePtr = Rc<Procedure>;

/// A user-defined named sequence of tokens, created by `:` ... `;`.  Executing a procedure
/// executes its tokens in order against the current stacks.
pub struct Procedure {
    name: String,
    tokens: Vec<Token>,
}

impl Procedure {
    pub fn new(name: &str, tokens: Vec<Token>) -> ProcedurePtr {
        Rc::new(Procedure {
            name: name.to_string(),
            tokens,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}
