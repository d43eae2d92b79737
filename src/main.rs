use getopts::Options;
use rustyline::{error::ReadlineError, DefaultEditor};
use std::{env, process};
use tforth::runtime::interpreter::{
    forth_interpreter::ForthInterpreter, InterpreterIo, TokenParsing,
};

fn print_usage(program: &str, opts: &Options) {
    let brief = format!("Usage: {} [-debug] [-no_init] [-h|-help] [files...]", program);

    eprint!("{}", opts.usage(&brief));
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();

    // Single-dash long flags, the way the engine has always been invoked.
    opts.long_only(true);
    opts.optflag("", "debug", "trace pushes, pops, peeks, execs, defines and forgets");
    opts.optflag("", "no_init", "do not read the startup profile");
    opts.optflag("h", "help", "print this help");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,

        Err(failure) => {
            eprintln!("{}", failure);
            print_usage(&program, &opts);
            process::exit(1);
        }
    };

    if matches.opt_present("h") {
        print_usage(&program, &opts);
        process::exit(1);
    }

    let mut interpreter = ForthInterpreter::new();

    interpreter.set_debug(matches.opt_present("debug"));
    interpreter.seed_base();

    if !matches.opt_present("no_init") {
        interpreter.load_profile();
    }

    if !matches.free.is_empty() {
        for file in &matches.free {
            if let Err(error) = interpreter.parse_file(file) {
                eprintln!("{}", error);
            }
        }
    } else {
        repl(&mut interpreter);
    }
}

/// Read one line at a time, parse it, and answer with `ok` or the error message.  The data
/// stack persists from line to line; `bye` or end of input ends the session.
fn repl(interpreter: &mut ForthInterpreter) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,

        Err(error) => {
            eprintln!("{}", error);
            process::exit(1);
        }
    };

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if line == "bye" {
                    break;
                }

                let _ = editor.add_history_entry(&line);

                match interpreter.parse_line(&line) {
                    Ok(()) => println!("ok"),
                    Err(error) => eprintln!("{}", error),
                }
            }

            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,

            Err(error) => {
                eprintln!("{}", error);
                break;
            }
        }
    }
}
