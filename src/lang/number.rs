use crate::{
    lang::line::Line,
    runtime::error::{self, script_error_str},
};
use std::{
    cmp::Ordering,
    fmt::{self, Debug, Display, Formatter},
};

/// The digits used to read and print integers in bases 2 through 36.
const BASE_DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A numeric value as carried on the data stack.  Exactly one of a boolean, a 32-bit signed
/// integer or a double precision real.
///
/// Arithmetic promotes to Real when either operand is Real and otherwise stays on integers;
/// booleans participate in arithmetic as 0/1.  The logical operations are the exception:
/// two booleans combine logically while any other pairing coerces to integer bitwise.
#[derive(Clone, Copy)]
pub enum Number {
    Boolean(bool),
    Integer(i32),
    Real(f64),
}

impl Number {
    pub fn is_boolean(&self) -> bool {
        matches!(self, Number::Boolean(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Number::Real(_))
    }

    /// The value as a boolean, where any non-zero number counts as true.
    pub fn boolean(&self) -> bool {
        match self {
            Number::Boolean(value) => *value,
            Number::Integer(value) => *value != 0,
            Number::Real(value) => *value != 0.0,
        }
    }

    /// The value truncated to an integer.
    pub fn integer(&self) -> i32 {
        match self {
            Number::Boolean(value) => *value as i32,
            Number::Integer(value) => *value,
            Number::Real(value) => *value as i32,
        }
    }

    /// The value widened to a real.
    pub fn real(&self) -> f64 {
        match self {
            Number::Boolean(value) => *value as i32 as f64,
            Number::Integer(value) => *value as f64,
            Number::Real(value) => *value,
        }
    }

    pub fn plus(a: Number, b: Number) -> Number {
        if a.is_real() || b.is_real() {
            Number::Real(a.real() + b.real())
        } else {
            Number::Integer(a.integer().wrapping_add(b.integer()))
        }
    }

    pub fn minus(a: Number, b: Number) -> Number {
        if a.is_real() || b.is_real() {
            Number::Real(a.real() - b.real())
        } else {
            Number::Integer(a.integer().wrapping_sub(b.integer()))
        }
    }

    pub fn times(a: Number, b: Number) -> Number {
        if a.is_real() || b.is_real() {
            Number::Real(a.real() * b.real())
        } else {
            Number::Integer(a.integer().wrapping_mul(b.integer()))
        }
    }

    /// Divide, real when either side is real.  The divisor must have been checked for zero
    /// by the caller.
    pub fn divide(a: Number, b: Number) -> Number {
        if a.is_real() || b.is_real() {
            Number::Real(a.real() / b.real())
        } else {
            Number::Integer(a.integer().wrapping_div(b.integer()))
        }
    }

    /// Remainder of the truncated division.  The divisor must have been checked for zero by
    /// the caller.
    pub fn modulo(a: Number, b: Number) -> Number {
        if a.is_real() || b.is_real() {
            let factor = (a.real() / b.real()) as i32;
            Number::Real(a.real() - b.real() * factor as f64)
        } else {
            Number::Integer(a.integer().wrapping_rem(b.integer()))
        }
    }

    pub fn min(a: Number, b: Number) -> Number {
        if Number::cmp(&a, &b) <= 0 { a } else { b }
    }

    pub fn max(a: Number, b: Number) -> Number {
        if Number::cmp(&a, &b) >= 0 { a } else { b }
    }

    /// Logical AND for two booleans, bitwise AND on integers otherwise.
    pub fn and(a: Number, b: Number) -> Number {
        if a.is_boolean() && b.is_boolean() {
            Number::Boolean(a.boolean() && b.boolean())
        } else {
            Number::Integer(a.integer() & b.integer())
        }
    }

    /// Logical OR for two booleans, bitwise OR on integers otherwise.
    pub fn or(a: Number, b: Number) -> Number {
        if a.is_boolean() && b.is_boolean() {
            Number::Boolean(a.boolean() || b.boolean())
        } else {
            Number::Integer(a.integer() | b.integer())
        }
    }

    /// Logical XOR for two booleans, bitwise XOR on integers otherwise.
    pub fn xor(a: Number, b: Number) -> Number {
        if a.is_boolean() && b.is_boolean() {
            Number::Boolean(a.boolean() != b.boolean())
        } else {
            Number::Integer(a.integer() ^ b.integer())
        }
    }

    /// Logical inversion on a boolean, bitwise inversion otherwise.
    pub fn not(&self) -> Number {
        match self {
            Number::Boolean(value) => Number::Boolean(!value),
            _ => Number::Integer(!self.integer()),
        }
    }

    pub fn abs(&self) -> Number {
        match self {
            Number::Real(value) => Number::Real(value.abs()),
            _ => Number::Integer(self.integer().wrapping_abs()),
        }
    }

    pub fn neg(&self) -> Number {
        match self {
            Number::Real(value) => Number::Real(-value),
            _ => Number::Integer(self.integer().wrapping_neg()),
        }
    }

    /// Three way comparison, on integers when neither side is real.
    pub fn cmp(a: &Number, b: &Number) -> i32 {
        if !a.is_real() && !b.is_real() {
            match a.integer().cmp(&b.integer()) {
                Ordering::Greater => 1,
                Ordering::Less => -1,
                Ordering::Equal => 0,
            }
        } else {
            let (a, b) = (a.real(), b.real());

            if a > b {
                1
            } else if a < b {
                -1
            } else {
                0
            }
        }
    }

    /// Advance by the given step, staying integer when both sides are integers.  Used for
    /// loop counters.
    pub fn inc(&mut self, step: &Number) {
        if !self.is_real() && !step.is_real() {
            *self = Number::Integer(self.integer().wrapping_add(step.integer()));
        } else {
            *self = Number::Real(self.real() + step.real());
        }
    }

    /// Render the number using the given integer base.  Booleans and reals ignore the base.
    pub fn to_text(&self, base: i32) -> String {
        match self {
            Number::Boolean(value) => if *value { "TRUE" } else { "FALSE" }.to_string(),
            Number::Integer(value) if base != 10 => to_base_string(base, *value),
            Number::Integer(value) => value.to_string(),
            Number::Real(value) => value.to_string(),
        }
    }
}

/// Print the number in decimal.  Printing in the session's current BASE goes through
/// `to_text` instead.
impl Display for Number {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.to_text(10))
    }
}

/// Print the value plus a variant marker for debugging.
impl Debug for Number {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Number::Boolean(value) => write!(f, "{} b", value),
            Number::Integer(value) => write!(f, "{} i", value),
            Number::Real(value) => write!(f, "{} r", value),
        }
    }
}

/// Numeric equality with the same promotion rules as the arithmetic.
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        Number::cmp(self, other) == 0
    }
}

/// The digit value of a character in the given base, or None when it is not a digit of that
/// base.  Lower case letters are accepted.
pub fn is_base_digit(next: char, base: i32) -> Option<i32> {
    if !(2..=BASE_DIGITS.len() as i32).contains(&base) {
        return None;
    }

    let upper = next.to_ascii_uppercase();
    let found = BASE_DIGITS.iter().position(|digit| *digit as char == upper)?;

    if (found as i32) < base {
        Some(found as i32)
    } else {
        None
    }
}

/// Convert digit text to an unsigned magnitude in the given base.  Each accumulation step is
/// checked by round-tripping so that overflow is caught rather than wrapped; the signed
/// range check belongs to the caller, which knows the sign.
pub fn to_base_integer(text: &str, base: i32) -> error::Result<i64> {
    if !(2..=BASE_DIGITS.len() as i32).contains(&base) {
        return script_error_str("Invalid Base");
    }

    let mut integer: i64 = 0;

    for next in text.chars() {
        let value = match is_base_digit(next, base) {
            Some(value) => value as i64,
            None => return script_error_str("Invalid Char"),
        };

        let accumulated = (base as i64).wrapping_mul(integer).wrapping_add(value);

        if (accumulated - value) / base as i64 != integer {
            return script_error_str("Overflow");
        }

        integer = accumulated;
    }

    Ok(integer)
}

/// Render an integer in the given base using the digits 0-9A-Z.
pub fn to_base_string(base: i32, integer: i32) -> String {
    if !(2..=BASE_DIGITS.len() as i32).contains(&base) {
        return String::new();
    }

    // Widen before negating so that i32::MIN renders correctly.
    let mut rest = (integer as i64).abs();
    let base = base as i64;
    let mut digits = Vec::new();

    loop {
        digits.push(BASE_DIGITS[(rest % base) as usize]);
        rest /= base;

        if rest == 0 {
            break;
        }
    }

    let mut text = String::new();

    if integer < 0 {
        text.push('-');
    }

    for digit in digits.iter().rev() {
        text.push(*digit as char);
    }

    text
}

/// Attempt to read a numeric literal from the line under the given base: an optional sign,
/// one or more base digits, an optional decimal point plus fraction (forcing a real), and an
/// optional exponent when `E`/`e` is followed by another digit (also forcing a real).  The
/// literal must end at whitespace or the end of the line.
///
/// On any failure the cursor is restored so the word can fall through to the next resolver,
/// and Ok(None) is returned; hard failures such as integer overflow surface as errors.
pub fn read_number(line: &mut Line, base: i32) -> error::Result<Option<Number>> {
    let saved = line.pos();

    let mut text = String::new();
    let mut sign = 1;

    if line.is_valid() && line.is_one_of("+-") {
        sign = if line.get_char() == '-' { -1 } else { 1 };
    }

    if !line.is_valid() || !line.is_base_digit(base) {
        line.set_pos(saved);
        return Ok(None);
    }

    while line.is_valid() && line.is_base_digit(base) {
        text.push(line.get_char());
    }

    let mut real = false;

    if line.is_valid() && line.is_char('.') {
        real = true;
        text.push(line.get_char());

        while line.is_valid() && line.is_base_digit(base) {
            text.push(line.get_char());
        }
    }

    if line.is_valid() && line.is_one_of("Ee") {
        let next = line.look_next_char(1);

        if is_base_digit(next, base).is_some() {
            real = true;
            text.push(line.get_char());

            while line.is_valid() && line.is_base_digit(base) {
                text.push(line.get_char());
            }
        }
    }

    if line.is_valid() && !line.is_space() {
        line.set_pos(saved);
        return Ok(None);
    }

    if !real {
        let integer = match to_base_integer(&text, base) {
            Ok(integer) => integer,
            Err(error) => {
                line.set_pos(saved);
                return Err(error);
            }
        };

        let signed = sign as i64 * integer;

        if signed > i32::MAX as i64 || signed < i32::MIN as i64 {
            line.set_pos(saved);
            return script_error_str("Overflow");
        }

        Ok(Some(Number::Integer(signed as i32)))
    } else {
        match text.parse::<f64>() {
            Ok(value) => Ok(Some(Number::Real(sign as f64 * value))),
            Err(_) => {
                line.set_pos(saved);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_to_real() {
        assert!(Number::plus(Number::Integer(1), Number::Real(0.5)).is_real());
        assert!(Number::plus(Number::Integer(1), Number::Integer(2)).is_integer());
    }

    #[test]
    fn boolean_logic_stays_boolean() {
        let result = Number::and(Number::Boolean(true), Number::Boolean(false));

        assert!(result.is_boolean());
        assert!(!result.boolean());

        let mixed = Number::and(Number::Boolean(true), Number::Integer(6));
        assert!(mixed.is_integer());
    }

    #[test]
    fn not_per_variant() {
        assert!(!Number::Boolean(true).not().boolean());
        assert_eq!(Number::Integer(0).not().integer(), -1);
    }

    #[test]
    fn base_digits_reject_out_of_range() {
        assert_eq!(is_base_digit('F', 16), Some(15));
        assert_eq!(is_base_digit('f', 16), Some(15));
        assert_eq!(is_base_digit('F', 10), None);
        assert_eq!(is_base_digit('2', 2), None);
    }

    #[test]
    fn base_string_round_trips() {
        for value in [0, 1, -1, 255, -255, 123456, i32::MAX, i32::MIN] {
            for base in [2, 8, 10, 16, 36] {
                let text = to_base_string(base, value);
                let sign = if text.starts_with('-') { -1 } else { 1 };
                let digits = text.trim_start_matches('-');

                let parsed = to_base_integer(digits, base).unwrap();
                assert_eq!(sign as i64 * parsed, value as i64, "base {} text {}", base, text);
            }
        }
    }

    #[test]
    fn overflow_is_reported() {
        assert!(to_base_integer("FFFFFFFFFFFFFFFFFF", 16).is_err());

        let mut line = Line::new("2147483648");
        assert!(read_number(&mut line, 10).is_err());

        let mut line = Line::new("-2147483648");
        let parsed = read_number(&mut line, 10).unwrap().unwrap();
        assert_eq!(parsed.integer(), i32::MIN);
    }

    #[test]
    fn literal_reader_restores_cursor_on_failure() {
        let mut line = Line::new("12abc");
        let result = read_number(&mut line, 10).unwrap();

        assert!(result.is_none());
        assert_eq!(line.pos(), 0);
    }

    #[test]
    fn literal_reader_reads_reals_and_exponents() {
        let mut line = Line::new("-1.5e2");
        let result = read_number(&mut line, 10).unwrap().unwrap();

        assert!(result.is_real());
        assert_eq!(result.real(), -150.0);
    }

    #[test]
    fn literal_reader_honours_base() {
        let mut line = Line::new("FF");
        let result = read_number(&mut line, 16).unwrap().unwrap();

        assert_eq!(result.integer(), 255);

        let mut line = Line::new("FF");
        assert!(read_number(&mut line, 10).unwrap().is_none());
    }
}
