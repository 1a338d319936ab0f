use irss_types::{CommandKind, VariableList};

use super::parse_int;
use crate::error::ExecuteError;

/// Integer arithmetic on the inputs, written to the output variable.
pub(super) fn execute_maths(
    kind: CommandKind,
    params: &[String],
    vars: &mut VariableList,
) -> Result<(), ExecuteError> {
    let result = match kind {
        CommandKind::MathsAbsolute => parse_int(&params[0]).wrapping_abs(),
        CommandKind::MathsSquareRoot => truncate((parse_int(&params[0]) as f64).sqrt()),
        _ => {
            let (a, b) = (parse_int(&params[0]), parse_int(&params[1]));
            binary(kind, a, b)?
        }
    };

    // Output slot is the last parameter for every maths kind.
    let output = &params[params.len() - 1];
    vars.set(output, result.to_string());
    Ok(())
}

fn binary(kind: CommandKind, a: i32, b: i32) -> Result<i32, ExecuteError> {
    match kind {
        CommandKind::MathsAdd => Ok(a.wrapping_add(b)),
        CommandKind::MathsSubtract => Ok(a.wrapping_sub(b)),
        CommandKind::MathsMultiply => Ok(a.wrapping_mul(b)),
        CommandKind::MathsDivide | CommandKind::MathsModulo if b == 0 => {
            Err(ExecuteError::DivideByZero { kind })
        }
        CommandKind::MathsDivide => Ok(a.wrapping_div(b)),
        CommandKind::MathsModulo => Ok(a.wrapping_rem(b)),
        CommandKind::MathsPower => Ok(truncate((a as f64).powf(b as f64))),
        other => unreachable!("{} is not a binary maths operation", other),
    }
}

/// f64 → i32 toward zero; NaN becomes 0 and out-of-range values saturate.
fn truncate(value: f64) -> i32 {
    value.trunc() as i32
}
