use crate::{
    lang::{
        line::{read_word_from, Line, Word},
        number::{read_number, Number},
    },
    runtime::{
        built_ins::register_builtins,
        data_structures::{
            builtin::Builtin,
            dictionary::Dictionary,
            procedure::ProcedurePtr,
            token::{token_text, token_to_number, Token},
            variable::{Variable, VariablePtr, VarRef},
        },
        error::{self, script_error, script_error_str},
        interpreter::{
            Interpreter, InterpreterIo, InterpreterStack, OutputSink, ParseState, TokenParsing,
            WordManagement,
        },
    },
};
use std::{
    collections::HashMap,
    env,
    fs::File,
    io::{stdout, BufRead, BufReader, Write},
    mem,
    path::Path,
};

/// The interpreter session.  Owns every piece of state the language engine mutates: the
/// three stacks, the dictionaries, the builtin table, the current-variable pointer, the
/// active source and pending lines, the parse state stack and the debug flags.  All
/// operations take the session by mutable reference; nothing lives in globals.
pub struct ForthInterpreter {
    /// The data stack of tokens pushed by programs.
    data: Vec<Token>,

    /// The return stack: temporary parking and loop counters.
    ret: Vec<Token>,

    /// The execution stack of currently-active block tokens, scanned by LEAVE.
    exec: Vec<Token>,

    /// The variable and procedure dictionaries.
    dictionary: Dictionary,

    /// The builtin templates, keyed by upper-cased name.  Populated once, lazily.
    builtins: HashMap<String, Builtin>,

    /// Whether the core builtin table has been populated.  A separate flag, since a host
    /// may register its own builtins before the first lookup happens.
    builtins_ready: bool,

    /// The variable CREATE / `,` / ALLOT / DOES> operate on.
    current_var: Option<VariablePtr>,

    /// The shared buffer variable WORD stores into, created on first use.
    word_var: Option<VariablePtr>,

    /// The active parse state plus the stack of suspended ones.
    parse_state: ParseState,
    parse_states: Vec<ParseState>,

    /// The line being parsed.
    line: Line,

    /// Queued lines, popped newest-first when no file is active.
    pending: Vec<Line>,

    /// The active source file, if parsing one.
    active_file: Option<BufReader<File>>,

    debug: bool,

    /// While set, number rendering pins base 10.  Held during debug tracing so printing
    /// BASE-dependent values cannot recurse into reading BASE.
    ignore_base: bool,

    output: OutputSink,
}

impl ForthInterpreter {
    pub fn new() -> ForthInterpreter {
        ForthInterpreter {
            data: Vec::with_capacity(32),
            ret: Vec::new(),
            exec: Vec::new(),
            dictionary: Dictionary::new(),
            builtins: HashMap::new(),
            builtins_ready: false,
            current_var: None,
            word_var: None,
            parse_state: ParseState::Interp,
            parse_states: Vec::new(),
            line: Line::default(),
            pending: Vec::new(),
            active_file: None,
            debug: false,
            ignore_base: false,
            output: OutputSink::Stdout,
        }
    }

    /// A session whose program output is collected in memory instead of written to stdout.
    pub fn with_captured_output() -> ForthInterpreter {
        let mut interpreter = ForthInterpreter::new();

        interpreter.output = OutputSink::Captured(String::new());
        interpreter
    }

    /// Everything the session has printed so far, when capturing.
    pub fn captured_output(&self) -> &str {
        match &self.output {
            OutputSink::Captured(text) => text,
            OutputSink::Stdout => "",
        }
    }

    /// Define BASE with its starting value of 10.  Done at startup, before any source is
    /// parsed.
    pub fn seed_base(&mut self) {
        self.define_variable_with("BASE", Token::Number(Number::Integer(10)));
    }

    /// Parse `$HOME/.CForth` line by line if it exists.  Errors in the profile are silently
    /// ignored.
    pub fn load_profile(&mut self) {
        let Ok(home) = env::var("HOME") else {
            return;
        };

        let Ok(file) = File::open(Path::new(&home).join(".CForth")) else {
            return;
        };

        for line in BufReader::new(file).lines() {
            let Ok(text) = line else {
                break;
            };

            let _ = self.parse_line(&text);
        }
    }

    /// The main loop over one source: fill the buffer, read a word, resolve it, execute it.
    fn parse_tokens(&mut self) -> error::Result<()> {
        loop {
            if !self.fill_buffer() {
                break;
            }

            let mut word = Word::new();

            if !self.read_word(&mut word) {
                break;
            }

            let token = self.parse_word(&word)?;

            self.exec_token(&token)?;
        }

        Ok(())
    }

    /// Pull the next line from the active file.
    fn read_source_line(&mut self) -> Option<Line> {
        let reader = self.active_file.as_mut()?;
        let mut text = String::new();

        match reader.read_line(&mut text) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(Line::new(&text)),
        }
    }

    /// With -debug, dump whatever is on the data stack after a source finishes.
    fn trace_stack_dump(&mut self) {
        if !self.debug || self.data.is_empty() {
            return;
        }

        let mut text = String::new();

        for token in &self.data {
            text.push_str(&token_text(token, 10));
            text.push(' ');
        }

        eprintln!("{}", text);
    }
}

impl Default for ForthInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl InterpreterStack for ForthInterpreter {
    fn stack(&self) -> &Vec<Token> {
        &self.data
    }

    fn push(&mut self, token: Token) {
        self.trace("Push", &token);
        self.data.push(token);
    }

    fn push_boolean(&mut self, value: bool) {
        self.push(Token::Boolean(value));
    }

    fn push_integer(&mut self, value: i32) {
        self.push(Token::Number(Number::Integer(value)));
    }

    fn push_number(&mut self, value: Number) {
        self.push(Token::Number(value));
    }

    fn peek(&mut self) -> error::Result<Token> {
        match self.data.last().cloned() {
            Some(token) => {
                self.trace("Peek", &token);
                Ok(token)
            }

            None => script_error_str("STACK EMPTY"),
        }
    }

    fn peek_at(&mut self, index: i32) -> error::Result<Token> {
        if index <= 0 {
            return script_error_str("Invalid index");
        }

        if index as usize > self.data.len() {
            return script_error_str("Stack too small");
        }

        let token = self.data[self.data.len() - index as usize].clone();

        self.trace("Peek", &token);
        Ok(token)
    }

    fn pop(&mut self) -> error::Result<Token> {
        match self.data.pop() {
            Some(token) => {
                self.trace("Pop", &token);
                Ok(token)
            }

            None => script_error_str("STACK EMPTY"),
        }
    }

    fn pop_at(&mut self, index: i32) -> error::Result<Token> {
        if index <= 0 {
            return script_error_str("Invalid index");
        }

        if index as usize > self.data.len() {
            return script_error_str("Stack too small");
        }

        let position = self.data.len() - index as usize;
        let token = self.data.remove(position);

        self.trace("Pop", &token);
        Ok(token)
    }

    fn pop_boolean(&mut self) -> error::Result<bool> {
        let token = self.pop()?;

        match token {
            Token::Number(number) => Ok(number.integer() != 0),
            Token::Boolean(value) => Ok(value),
            _ => script_error_str("must be integer or boolean"),
        }
    }

    fn pop_number(&mut self) -> error::Result<Number> {
        let token = self.pop()?;

        token_to_number(&token)
    }

    fn pop_bool_or_number(&mut self) -> error::Result<Number> {
        let token = self.pop()?;

        let resolved = match &token {
            Token::Variable(var) if var.borrow().is_constant() => var.borrow().value(),
            _ => Some(token.clone()),
        };

        match resolved {
            Some(Token::Number(number)) => Ok(number),
            Some(Token::Boolean(value)) => Ok(Number::Boolean(value)),
            _ => script_error_str("must be integer or boolean"),
        }
    }

    fn pop_var_ref(&mut self) -> error::Result<VarRef> {
        let token = self.pop()?;

        match VarRef::from_token(&token) {
            Some(var_ref) => Ok(var_ref),
            None => script_error_str("must be ref variable"),
        }
    }

    fn pop_variable(&mut self) -> error::Result<VariablePtr> {
        let token = self.pop()?;

        match token {
            Token::Variable(var) => Ok(var),
            _ => script_error_str("must be variable"),
        }
    }

    fn clear_stack(&mut self) {
        self.data.clear();
    }

    fn ret_stack(&self) -> &Vec<Token> {
        &self.ret
    }

    fn ret_stack_mut(&mut self) -> &mut Vec<Token> {
        &mut self.ret
    }

    fn ret_push(&mut self, token: Token) {
        self.ret.push(token);
    }

    fn ret_pop(&mut self) -> error::Result<Token> {
        match self.ret.pop() {
            Some(token) => Ok(token),
            None => script_error_str("STACK EMPTY"),
        }
    }

    fn clear_ret_stack(&mut self) {
        self.ret.clear();
    }

    fn exec_stack(&self) -> &Vec<Token> {
        &self.exec
    }

    fn exec_stack_mut(&mut self) -> &mut Vec<Token> {
        &mut self.exec
    }

    fn clear_exec_stack(&mut self) {
        self.exec.clear();
    }
}

impl TokenParsing for ForthInterpreter {
    fn fill_buffer(&mut self) -> bool {
        if self.line.is_valid() {
            self.line.skip_space();
        }

        if self.active_file.is_some() {
            while !self.line.is_valid() {
                match self.read_source_line() {
                    Some(line) => {
                        self.line = line;
                        self.line.skip_space();
                    }

                    None => return false,
                }
            }
        } else {
            while !self.line.is_valid() {
                match self.pending.pop() {
                    Some(line) => {
                        self.line = line;
                        self.line.skip_space();
                    }

                    None => return false,
                }
            }
        }

        true
    }

    fn read_word(&mut self, word: &mut Word) -> bool {
        word.reset();

        if !self.fill_buffer() {
            return false;
        }

        read_word_from(&mut self.line, word)
    }

    fn parse_word(&mut self, word: &Word) -> error::Result<Token> {
        let name = word.value();

        if let Some(var) = self.lookup_variable(name) {
            let is_constant = var.borrow().is_constant();

            if is_constant {
                return match var.borrow().value() {
                    Some(value) => Ok(value),
                    None => script_error_str("invalid variable"),
                };
            }

            return Ok(Token::Variable(var));
        }

        if let Some(procedure) = self.lookup_procedure(name) {
            return Ok(Token::Procedure(procedure));
        }

        if let Some(mut builtin) = self.lookup_builtin(name) {
            if builtin.has_modifier() {
                builtin.read_modifier(self)?;
            }

            return Ok(Token::Builtin(builtin));
        }

        let mut literal = Line::new(name);

        if let Some(number) = read_number(&mut literal, self.base())? {
            return Ok(Token::Number(number));
        }

        script_error(format!("{} ?", name))
    }

    fn exec_token(&mut self, token: &Token) -> error::Result<()> {
        match token {
            Token::Builtin(builtin) => {
                self.trace("Exec", token);

                if builtin.is_block() {
                    self.exec.push(token.clone());

                    let result = builtin.exec(self);

                    let _ = self.exec.pop();
                    result
                } else {
                    builtin.exec(self)
                }
            }

            Token::Procedure(procedure) => {
                self.trace("Exec", token);

                let procedure = procedure.clone();

                for inner in procedure.tokens() {
                    self.exec_token(inner)?;
                }

                Ok(())
            }

            _ => {
                self.push(token.clone());

                if let Token::Variable(var) = token {
                    self.current_var = Some(var.clone());

                    let action = var.borrow().action().to_vec();

                    for inner in &action {
                        self.exec_token(inner)?;
                    }
                }

                Ok(())
            }
        }
    }

    fn parse_file(&mut self, path: &str) -> error::Result<()> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(_) => return script_error(format!("Failed to open '{}'", path)),
        };

        // Swap the new source in and the old one out, so a LOAD inside a file resumes the
        // outer file afterwards.
        let saved_file = self.active_file.replace(BufReader::new(file));
        let saved_line = mem::take(&mut self.line);

        let result = match self.parse_tokens() {
            Err(error) if error.is_unwind() => Ok(()),
            other => other,
        };

        if result.is_ok() {
            self.trace_stack_dump();
            self.output("ok\n");
        }

        self.active_file = saved_file;
        self.line = saved_line;

        result
    }

    fn parse_line(&mut self, text: &str) -> error::Result<()> {
        self.pending.push(Line::new(text));

        match self.parse_tokens() {
            Ok(()) => {
                self.trace_stack_dump();
                Ok(())
            }

            // A line that errors or unwinds is abandoned whole.
            Err(error) => {
                self.line.clear();

                if error.is_unwind() {
                    Ok(())
                } else {
                    Err(error)
                }
            }
        }
    }

    fn line_mut(&mut self) -> &mut Line {
        &mut self.line
    }

    fn push_parse_state(&mut self, state: ParseState) {
        self.parse_states.push(self.parse_state);
        self.parse_state = state;
    }

    fn pop_parse_state(&mut self) {
        self.parse_state = self.parse_states.pop().unwrap_or(ParseState::Interp);
    }

    fn parse_state(&self) -> ParseState {
        self.parse_state
    }
}

impl WordManagement for ForthInterpreter {
    fn define_variable(&mut self, name: &str) -> VariablePtr {
        let var = self.dictionary.define_variable(name);

        if self.debug {
            self.trace_text(&format!("Define Var: {}", name));
        }

        var
    }

    fn define_variable_with(&mut self, name: &str, value: Token) -> VariablePtr {
        let var = self.define_variable(name);

        var.borrow_mut().add_cell(value);
        var
    }

    fn lookup_variable(&self, name: &str) -> Option<VariablePtr> {
        self.dictionary.lookup_variable(name)
    }

    fn forget_variable(&mut self, name: &str) -> bool {
        let removed = self.dictionary.forget_variable(name);

        if removed && self.debug {
            self.trace_text(&format!("Forget Var: {}", name));
        }

        removed
    }

    fn define_procedure(&mut self, name: &str, tokens: Vec<Token>) -> ProcedurePtr {
        let procedure = self.dictionary.define_procedure(name, tokens);

        if self.debug {
            self.trace("Define Procedure", &Token::Procedure(procedure.clone()));
        }

        procedure
    }

    fn lookup_procedure(&self, name: &str) -> Option<ProcedurePtr> {
        self.dictionary.lookup_procedure(name)
    }

    fn forget_procedure(&mut self, name: &str) -> bool {
        let removed = self.dictionary.forget_procedure(name);

        if removed && self.debug {
            self.trace_text(&format!("Forget Procedure: {}", name));
        }

        removed
    }

    fn add_builtin(&mut self, builtin: Builtin) {
        self.builtins
            .insert(builtin.name().to_uppercase(), builtin);
    }

    fn lookup_builtin(&mut self, name: &str) -> Option<Builtin> {
        if !self.builtins_ready {
            self.builtins_ready = true;
            register_builtins(self);
        }

        self.builtins.get(&name.to_uppercase()).cloned()
    }

    fn current_variable(&self) -> Option<VariablePtr> {
        self.current_var.clone()
    }

    fn set_current_variable(&mut self, var: VariablePtr) {
        self.current_var = Some(var);
    }

    fn word_variable(&mut self) -> VariablePtr {
        match &self.word_var {
            Some(var) => var.clone(),

            None => {
                let id = self.dictionary.allocate_variable_id();
                let var = Variable::new("WORD", id);

                self.word_var = Some(var.clone());
                var
            }
        }
    }

    fn base(&self) -> i32 {
        if self.ignore_base {
            return 10;
        }

        let Some(var) = self.lookup_variable("BASE") else {
            return 10;
        };

        let Some(base) = var.borrow().get_integer() else {
            return 10;
        };

        base.clamp(2, 36)
    }
}

impl InterpreterIo for ForthInterpreter {
    fn output(&mut self, text: &str) {
        match &mut self.output {
            OutputSink::Stdout => {
                print!("{}", text);
                let _ = stdout().flush();
            }

            OutputSink::Captured(buffer) => buffer.push_str(text),
        }
    }

    fn is_debug(&self) -> bool {
        self.debug
    }

    fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    fn trace(&mut self, tag: &str, token: &Token) {
        if !self.debug {
            return;
        }

        self.ignore_base = true;
        let text = self.token_text(token);
        self.ignore_base = false;

        eprintln!("{}: {}", tag, text);
    }

    fn trace_text(&mut self, text: &str) {
        if self.debug {
            eprintln!("{}", text);
        }
    }

    fn token_text(&self, token: &Token) -> String {
        token_text(token, self.base())
    }
}

impl Interpreter for ForthInterpreter {}
