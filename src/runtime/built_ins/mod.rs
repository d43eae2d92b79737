/// Words that manipulate the data and return stacks.
pub mod stack_words;

/// The comparison words.
pub mod comparison_words;

/// The arithmetic and logical words.
pub mod arithmetic_words;

/// Words that read and write variable cells.
pub mod memory_words;

/// The control structure words and their compile-time readers.
pub mod control_words;

/// Words that perform I/O operations.
pub mod io_words;

/// Words for printing numbers and controlling the base.
pub mod number_words;

/// The defining words that build variables and procedures.
pub mod defining_words;

/// The counted string words.
pub mod string_words;

/// Comments, LOAD, the WORD buffer and the non-local exits.
pub mod misc_words;

use crate::runtime::interpreter::Interpreter;

/// Called to register all of the core words of the language.  Host applications can add
/// their own words afterwards with `add_builtin` before any source is parsed.
pub fn register_builtins(interp: &mut dyn Interpreter) {
    stack_words::register_stack_words(interp);
    comparison_words::register_comparison_words(interp);
    arithmetic_words::register_arithmetic_words(interp);
    memory_words::register_memory_words(interp);
    control_words::register_control_words(interp);
    io_words::register_io_words(interp);
    number_words::register_number_words(interp);
    defining_words::register_defining_words(interp);
    string_words::register_string_words(interp);
    misc_words::register_misc_words(interp);
}
