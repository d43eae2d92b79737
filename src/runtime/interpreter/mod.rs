use crate::{
    lang::{
        line::{Line, Word},
        number::Number,
    },
    runtime::{
        data_structures::{
            builtin::Builtin,
            procedure::ProcedurePtr,
            token::Token,
            variable::{VariablePtr, VarRef},
        },
        error,
    },
};

pub mod forth_interpreter;

/// A plain native word: a free function executed against the interpreter.
pub type WordFn = fn(&mut dyn Interpreter) -> error::Result<()>;

/// An embedded primitive registered by the host application.  A closure so the host can
/// capture its own state; exactly one instance is registered per name.
pub type UserFn = dyn Fn(&mut dyn Interpreter) -> error::Result<()>;

/// The parse state the reader is in.  Interp executes each resolved token; Compile appends
/// it to a body under construction.  Compile is entered transiently by the control-structure
/// and defining words, so the states form a stack and nesting is well-defined.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParseState {
    Interp,
    Compile,
}

/// Where program output goes: the process stdout, or an in-memory buffer that tests can
/// inspect.
pub enum OutputSink {
    Stdout,
    Captured(String),
}

/// Trait for managing the interpreter's data, return and execution stacks.  Intended to be
/// called by words, both native and embedded.
pub trait InterpreterStack {
    /// The whole data stack, bottom first.
    fn stack(&self) -> &Vec<Token>;

    /// Push a token onto the data stack.
    fn push(&mut self, token: Token);

    /// Convenience pushes for the common value kinds.
    fn push_boolean(&mut self, value: bool);
    fn push_integer(&mut self, value: i32);
    fn push_number(&mut self, value: Number);

    /// Look at the top of the data stack.  Fails with "STACK EMPTY".
    fn peek(&mut self) -> error::Result<Token>;

    /// Look at the nth token from the top, 1-indexed.  Fails with "Invalid index" for n < 1
    /// and "Stack too small" past the bottom.
    fn peek_at(&mut self, index: i32) -> error::Result<Token>;

    /// Pop the top of the data stack.  Fails with "STACK EMPTY".
    fn pop(&mut self) -> error::Result<Token>;

    /// Remove and return the nth token from the top, 1-indexed.
    fn pop_at(&mut self, index: i32) -> error::Result<Token>;

    /// Pop a flag: booleans directly, numbers as non-zero tests.
    fn pop_boolean(&mut self) -> error::Result<bool>;

    /// Pop a Number, resolving a constant variable to its stored value.
    fn pop_number(&mut self) -> error::Result<Number>;

    /// Pop a Number, also accepting booleans.  Used by the logical words.
    fn pop_bool_or_number(&mut self) -> error::Result<Number>;

    /// Pop a readable/writable variable cursor.  Accepts a non-constant variable or a ref.
    fn pop_var_ref(&mut self) -> error::Result<VarRef>;

    /// Pop exactly a dictionary variable.
    fn pop_variable(&mut self) -> error::Result<VariablePtr>;

    fn clear_stack(&mut self);

    /// The return stack, used for temporary parking and loop counters.
    fn ret_stack(&self) -> &Vec<Token>;
    fn ret_stack_mut(&mut self) -> &mut Vec<Token>;
    fn ret_push(&mut self, token: Token);
    fn ret_pop(&mut self) -> error::Result<Token>;
    fn clear_ret_stack(&mut self);

    /// The execution stack of currently-active block tokens, scanned by LEAVE.
    fn exec_stack(&self) -> &Vec<Token>;
    fn exec_stack_mut(&mut self) -> &mut Vec<Token>;
    fn clear_exec_stack(&mut self);
}

/// Trait for driving the source readers: the fill-buffer protocol, word extraction, word to
/// token resolution, and execution.
pub trait TokenParsing {
    /// Make sure the current line has something to read: reuse it when non-blank, else pull
    /// the next line from the active file, else pop a pending line.  False when every source
    /// is drained.
    fn fill_buffer(&mut self) -> bool;

    /// Read one whitespace-delimited word.  False only when the source is exhausted.
    fn read_word(&mut self, word: &mut Word) -> bool;

    /// Resolve a word to a token: variable, then procedure, then builtin (cloning and
    /// reading the modifier when it carries one), then number literal, then the unknown-word
    /// error.
    fn parse_word(&mut self, word: &Word) -> error::Result<Token>;

    /// Execute one resolved token: run executables (pushing block tokens onto the execution
    /// stack around their run), push everything else.  Pushing a variable makes it current
    /// and runs its DOES> action body.
    fn exec_token(&mut self, token: &Token) -> error::Result<()>;

    /// Parse a whole file as a source, printing `ok` at its end.  The previously active
    /// source is restored afterwards on every path.
    fn parse_file(&mut self, path: &str) -> error::Result<()>;

    /// Parse one line of source, as the REPL and the profile loader do.
    fn parse_line(&mut self, text: &str) -> error::Result<()>;

    /// Direct access to the current line, for the character-oriented readers and QUERY.
    fn line_mut(&mut self) -> &mut Line;

    /// The parse state stack.  Readers push Compile on entry and pop on every exit.
    fn push_parse_state(&mut self, state: ParseState);
    fn pop_parse_state(&mut self);
    fn parse_state(&self) -> ParseState;
}

/// Trait for the dictionaries and the session-held definitions.
pub trait WordManagement {
    /// Define a new, empty variable.
    fn define_variable(&mut self, name: &str) -> VariablePtr;

    /// Define a new variable holding the given single cell.
    fn define_variable_with(&mut self, name: &str, value: Token) -> VariablePtr;

    fn lookup_variable(&self, name: &str) -> Option<VariablePtr>;
    fn forget_variable(&mut self, name: &str) -> bool;

    fn define_procedure(&mut self, name: &str, tokens: Vec<Token>) -> ProcedurePtr;
    fn lookup_procedure(&self, name: &str) -> Option<ProcedurePtr>;
    fn forget_procedure(&mut self, name: &str) -> bool;

    /// Register a primitive.  Host applications use this to embed their own words before
    /// parsing begins.
    fn add_builtin(&mut self, builtin: Builtin);

    /// Find a primitive template by name, populating the table on first use.
    fn lookup_builtin(&mut self, name: &str) -> Option<Builtin>;

    /// The variable CREATE / `,` / ALLOT / DOES> operate on.
    fn current_variable(&self) -> Option<VariablePtr>;
    fn set_current_variable(&mut self, var: VariablePtr);

    /// The shared buffer variable WORD stores into and HERE pushes.
    fn word_variable(&mut self) -> VariablePtr;

    /// The current numeric base: the BASE variable's value clamped to [2, 36], or 10 when
    /// BASE is unset or the ignore-base guard is held.
    fn base(&self) -> i32;
}

/// Trait for program output and the debug trace.
pub trait InterpreterIo {
    /// Write program output to the session's sink.
    fn output(&mut self, text: &str);

    fn is_debug(&self) -> bool;
    fn set_debug(&mut self, debug: bool);

    /// Emit one debug trace line for a token, tagged with the operation.  Rendered in
    /// decimal regardless of BASE.
    fn trace(&mut self, tag: &str, token: &Token);

    /// Emit one free-form debug trace line.
    fn trace_text(&mut self, text: &str);

    /// Render a token using the session's current base.
    fn token_text(&self, token: &Token) -> String;
}

/// Core interpreter trait, bringing the facets together.  Words are written against
/// `&mut dyn Interpreter`, which is also the seam host applications embed through.
pub trait Interpreter: InterpreterStack + TokenParsing + WordManagement + InterpreterIo {}

/// Run a reader body in Compile state, restoring the predecessor state on every exit path
/// including failure.
pub fn with_compile_state<T, F>(interp: &mut dyn Interpreter, action: F) -> error::Result<T>
where
    F: FnOnce(&mut dyn Interpreter) -> error::Result<T>,
{
    interp.push_parse_state(ParseState::Compile);

    let result = action(interp);

    interp.pop_parse_state();
    result
}
