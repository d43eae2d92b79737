use crate::runtime::{
    built_ins::{control_words, defining_words, io_words, misc_words},
    data_structures::token::{token_text, Token},
    error,
    interpreter::{Interpreter, InterpreterIo, TokenParsing, UserFn, WordFn},
};
use std::{cell::Cell, rc::Rc};

/// The compiled body of a DO ... LOOP / DO ... +LOOP.  The leave flag is shared between the
/// stored instance and its clone on the execution stack so LEAVE can signal the running
/// loop.
#[derive(Clone, Default)]
pub struct DoBlock {
    pub tokens: Vec<Token>,
    pub counted_step: bool,
    pub leave: Rc<Cell<bool>>,
}

/// The compiled bodies of an IF ... ELSE ... THEN.
#[derive(Clone, Default)]
pub struct IfBlock {
    pub true_tokens: Vec<Token>,
    pub else_tokens: Vec<Token>,
}

/// The compiled bodies of a BEGIN ... UNTIL or BEGIN ... WHILE ... REPEAT.  In the while
/// form `while_tokens` holds the part before WHILE and `tokens` the part after it.
#[derive(Clone, Default)]
pub struct BeginBlock {
    pub tokens: Vec<Token>,
    pub while_tokens: Vec<Token>,
    pub is_until: bool,
    pub is_while: bool,
    pub leave: Rc<Cell<bool>>,
}

/// How a builtin executes, and the compiled state it carries if its occurrence in the source
/// was followed by a modifier read at compile time.
#[derive(Clone)]
pub enum Handler {
    /// A plain native primitive.
    Word(WordFn),

    /// A primitive registered by the embedding application.
    User(Rc<UserFn>),

    /// A keyword that only terminates a compile reader: LOOP, +LOOP, ELSE, THEN, UNTIL,
    /// WHILE, REPEAT.  Executing one is a no-op.
    NoOp,

    /// DO with its compiled body.
    Do(DoBlock),

    /// IF with its compiled bodies.
    Branch(IfBlock),

    /// BEGIN with its compiled bodies.
    Cycle(BeginBlock),

    /// DOES> with the action body to attach to the current variable.
    Does(Vec<Token>),

    /// `."` with its captured text.
    Emit(String),

    /// `(` with its captured text.  Null: never appended to compiled bodies.
    Remark(String),

    /// LOAD with its captured filename.
    Load(String),
}

/// A named primitive.  The shared dictionary holds one template per name; words that carry a
/// modifier are cloned per source occurrence and the clone's body is filled in by the
/// compile-time reader before the token is used.
#[derive(Clone)]
pub struct Builtin {
    name: String,
    handler: Handler,
}

impl Builtin {
    pub fn new(name: &str, handler: Handler) -> Builtin {
        Builtin {
            name: name.to_string(),
            handler,
        }
    }

    /// A plain native word.
    pub fn word(name: &str, word_fn: WordFn) -> Builtin {
        Builtin::new(name, Handler::Word(word_fn))
    }

    /// A reader-terminating keyword that executes as a no-op.
    pub fn no_op(name: &str) -> Builtin {
        Builtin::new(name, Handler::NoOp)
    }

    /// An embedded primitive supplied by the host application.
    pub fn user<F>(name: &str, user_fn: F) -> Builtin
    where
        F: Fn(&mut dyn Interpreter) -> error::Result<()> + 'static,
    {
        Builtin::new(name, Handler::User(Rc::new(user_fn)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Does this word read compiled state at parse time?
    pub fn has_modifier(&self) -> bool {
        !matches!(self.handler, Handler::Word(_) | Handler::User(_) | Handler::NoOp)
    }

    /// Block words sit on the execution stack while they run.
    pub fn is_block(&self) -> bool {
        matches!(
            self.handler,
            Handler::Do(_) | Handler::Branch(_) | Handler::Cycle(_)
        )
    }

    /// Null words are dropped when compiling bodies.
    pub fn is_null(&self) -> bool {
        matches!(self.handler, Handler::Remark(_))
    }

    /// Run the compile-time reader for this occurrence, consuming source text up to the
    /// word's terminator and storing the result in the handler.
    pub fn read_modifier(&mut self, interp: &mut dyn Interpreter) -> error::Result<()> {
        match &mut self.handler {
            Handler::Do(block) => control_words::read_do_body(interp, block),
            Handler::Branch(block) => control_words::read_if_body(interp, block),
            Handler::Cycle(block) => control_words::read_begin_body(interp, block),
            Handler::Does(tokens) => defining_words::read_does_body(interp, tokens),
            Handler::Emit(text) => io_words::read_quoted_text(interp, text),
            Handler::Remark(text) => misc_words::read_comment_text(interp, text),
            Handler::Load(filename) => misc_words::read_load_filename(interp, filename),
            _ => Ok(()),
        }
    }

    /// Execute this word against the interpreter.
    pub fn exec(&self, interp: &mut dyn Interpreter) -> error::Result<()> {
        match &self.handler {
            Handler::Word(word_fn) => word_fn(interp),
            Handler::User(user_fn) => (**user_fn)(interp),
            Handler::NoOp => Ok(()),
            Handler::Do(block) => control_words::execute_do(interp, block),
            Handler::Branch(block) => control_words::execute_if(interp, block),
            Handler::Cycle(block) => control_words::execute_begin(interp, block),
            Handler::Does(tokens) => defining_words::execute_does(interp, tokens),
            Handler::Emit(text) => {
                interp.output(text);
                Ok(())
            }
            Handler::Remark(_) => Ok(()),
            Handler::Load(filename) => interp.parse_file(filename),
        }
    }

    /// Render the word as source-like text, reconstructing compiled bodies.
    pub fn to_text(&self, base: i32) -> String {
        fn body_text(tokens: &[Token], base: i32) -> String {
            let mut text = String::new();

            for token in tokens {
                text.push_str(&token_text(token, base));
                text.push(' ');
            }

            text
        }

        match &self.handler {
            Handler::Word(_) | Handler::User(_) | Handler::NoOp => self.name.clone(),

            Handler::Do(block) => format!(
                "DO {}{}",
                body_text(&block.tokens, base),
                if block.counted_step { "+LOOP" } else { "LOOP" }
            ),

            Handler::Branch(block) => {
                let mut text = format!("IF {}", body_text(&block.true_tokens, base));

                if !block.else_tokens.is_empty() {
                    text.push_str(&format!("ELSE {}", body_text(&block.else_tokens, base)));
                }

                text.push_str("THEN");
                text
            }

            Handler::Cycle(block) => {
                if block.is_until {
                    format!("BEGIN {}UNTIL", body_text(&block.tokens, base))
                } else {
                    format!(
                        "BEGIN {}WHILE {}REPEAT",
                        body_text(&block.while_tokens, base),
                        body_text(&block.tokens, base)
                    )
                }
            }

            Handler::Does(tokens) => format!("DOES> {}", body_text(tokens, base)),

            Handler::Emit(text) => format!(".\" {}\"", text),

            Handler::Remark(text) => format!("( {})", text),

            Handler::Load(filename) => format!("LOAD \"{}\"", filename),
        }
    }
}
