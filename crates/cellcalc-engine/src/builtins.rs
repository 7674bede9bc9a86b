//! Built-in spreadsheet functions and their metadata.
//!
//! Conventions:
//! - Spreadsheet-facing built-in names are ALL CAPS and matched exactly
//!   (`SUM`, `AVG`; `sum` is not recognized).
//! - Parameters are cell identifiers, ranges (`A1:B5`), literals (`4`) or
//!   nested calls without operators (`SUM(A1,A2)`). A cell formula is split
//!   on operators before calls are parsed, so `SUM(A1*2)` is malformed.
//! - If you add a new built-in, add it to `BUILTINS`.

use crate::engine::{CellRange, CellRef, EvalError, RecursionStack, Resolver};

type BuiltinFn = fn(&Resolver, &[String], &mut RecursionStack) -> Result<f64, EvalError>;

pub struct Builtin {
    pub name: &'static str,
    pub description: &'static str,
    eval: BuiltinFn,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "SUM",
        description: "Sum of the given cells, ranges and values",
        eval: sum,
    },
    Builtin {
        name: "AVG",
        description: "Average of the given cells, ranges and values",
        eval: avg,
    },
];

pub fn lookup_builtin(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

/// A function token split into its name and raw parameter strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    pub parameters: Vec<String>,
}

/// Parse `SUM(E1:E4, 7)` into `{ name: "SUM", parameters: ["E1:E4", "7"] }`.
pub fn parse_function_call(token: &str) -> Result<FunctionCall, EvalError> {
    let open = token.find('(');
    let Some(open) = open.filter(|_| token.ends_with(')')) else {
        return Err(EvalError::MalformedFunctionCall(token.to_string()));
    };
    let inner = &token[open + 1..token.len() - 1];
    Ok(FunctionCall {
        name: token[..open].to_string(),
        parameters: split_parameters(inner),
    })
}

/// Split a parameter list on commas that are outside parentheses and
/// double-quoted text. Parameters are trimmed; an empty list has none.
pub fn split_parameters(inner: &str) -> Vec<String> {
    if inner.trim().is_empty() {
        return Vec::new();
    }

    let mut params = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth = depth.saturating_sub(1),
            ',' if !in_string && depth == 0 => {
                params.push(inner[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    params.push(inner[start..].trim().to_string());
    params
}

/// A parameter after range expansion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeParameter {
    Single(String),
    Cells(Vec<CellRef>),
}

/// Expand `B4:C5` into its cells; anything without a `:` comes back unchanged.
pub fn expand_range_parameter(param: &str, limit: usize) -> Result<RangeParameter, EvalError> {
    if !param.contains(':') {
        return Ok(RangeParameter::Single(param.to_string()));
    }
    let range = CellRange::parse(param)?;
    Ok(RangeParameter::Cells(range.cells(limit)?))
}

/// Value of a single (non-range) parameter.
fn resolve_parameter(
    resolver: &Resolver,
    param: &str,
    stack: &mut RecursionStack,
) -> Result<f64, EvalError> {
    if param.is_empty() {
        return Ok(0.0);
    }
    match CellRef::from_str(param) {
        Some(cell) => Ok(resolver.resolve_ref(&cell, stack)?.as_number()),
        None => resolver.resolve_formula(param, stack),
    }
}

/// Sum and number of contributing cells over all parameters.
fn accumulate(
    resolver: &Resolver,
    parameters: &[String],
    stack: &mut RecursionStack,
) -> Result<(f64, usize), EvalError> {
    let limit = resolver.config().max_range_cells;
    let mut total = 0.0;
    let mut count = 0;
    for param in parameters {
        match expand_range_parameter(param, limit)? {
            RangeParameter::Cells(cells) => {
                for cell in &cells {
                    total += resolver.resolve_ref(cell, stack)?.as_number();
                }
                count += cells.len();
            }
            RangeParameter::Single(param) => {
                total += resolve_parameter(resolver, &param, stack)?;
                count += 1;
            }
        }
    }
    Ok((total, count))
}

pub fn sum(
    resolver: &Resolver,
    parameters: &[String],
    stack: &mut RecursionStack,
) -> Result<f64, EvalError> {
    accumulate(resolver, parameters, stack).map(|(total, _)| total)
}

/// Average over contributing cells; no cells gives 0.
pub fn avg(
    resolver: &Resolver,
    parameters: &[String],
    stack: &mut RecursionStack,
) -> Result<f64, EvalError> {
    let (total, count) = accumulate(resolver, parameters, stack)?;
    if count == 0 {
        return Ok(0.0);
    }
    Ok(total / count as f64)
}

/// Run a parsed call. Returns `Ok(None)` when the name is not a built-in.
pub fn call_function(
    resolver: &Resolver,
    call: &FunctionCall,
    stack: &mut RecursionStack,
) -> Result<Option<f64>, EvalError> {
    let Some(builtin) = lookup_builtin(&call.name) else {
        log::debug!("function not recognized: {}", call.name);
        return Ok(None);
    };
    (builtin.eval)(resolver, &call.parameters, stack).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineConfig, Sheet};

    fn params(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn sheet(pairs: &[(&str, &str)]) -> Sheet {
        Sheet::from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!(lookup_builtin("SUM").is_some());
        assert!(lookup_builtin("AVG").is_some());
        assert!(lookup_builtin("sum").is_none());
        assert!(lookup_builtin("AVERAGE").is_none());
    }

    #[test]
    fn test_every_builtin_is_described() {
        for builtin in BUILTINS {
            assert!(!builtin.description.is_empty(), "{}", builtin.name);
            assert!(lookup_builtin(builtin.name).is_some());
        }
    }

    #[test]
    fn test_operator_inside_call_is_malformed_in_cell() {
        let sheet = sheet(&[("A1", "2"), ("B1", "=SUM(A1*2)")]);
        let err = Resolver::new(&sheet).resolve("B1").unwrap_err();
        assert_eq!(
            err.root_cause(),
            &EvalError::MalformedFunctionCall("SUM(A1".to_string())
        );
    }

    #[test]
    fn test_parse_function_call() {
        let call = parse_function_call("SUM(E1:E4, 7)").unwrap();
        assert_eq!(call.name, "SUM");
        assert_eq!(call.parameters, params(&["E1:E4", "7"]));

        let call = parse_function_call("AVG()").unwrap();
        assert!(call.parameters.is_empty());

        assert_eq!(
            parse_function_call("SUM(A1"),
            Err(EvalError::MalformedFunctionCall("SUM(A1".to_string()))
        );
        assert!(matches!(
            parse_function_call("SUM"),
            Err(EvalError::MalformedFunctionCall(_))
        ));
    }

    #[test]
    fn test_split_parameters_respects_nesting_and_quotes() {
        assert_eq!(
            split_parameters("SUM(A1,A2), A3"),
            params(&["SUM(A1,A2)", "A3"])
        );
        assert_eq!(split_parameters("\"a,b\",C1"), params(&["\"a,b\"", "C1"]));
        assert_eq!(split_parameters("A1,,A2"), params(&["A1", "", "A2"]));
    }

    #[test]
    fn test_expand_range_parameter() {
        assert_eq!(
            expand_range_parameter("C4", 200),
            Ok(RangeParameter::Single("C4".to_string()))
        );
        let RangeParameter::Cells(cells) = expand_range_parameter("B4:C5", 200).unwrap() else {
            panic!("expected cells");
        };
        let names: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["B4", "B5", "C4", "C5"]);

        assert!(matches!(
            expand_range_parameter("A1:J21", 200),
            Err(EvalError::RangeTooLarge { cells: 210, .. })
        ));
    }

    #[test]
    fn test_sum_cells() {
        let sheet = sheet(&[("A1", "3"), ("A2", "=2+2")]);
        let resolver = Resolver::new(&sheet);
        let mut stack = RecursionStack::new();
        assert_eq!(sum(&resolver, &params(&["A1", "A2"]), &mut stack), Ok(7.0));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_sum_mixes_ranges_literals_and_nested_calls() {
        let sheet = sheet(&[("A1", "1"), ("A2", "2"), ("B1", "3"), ("B2", "4"), ("C1", "10")]);
        let resolver = Resolver::new(&sheet);
        let mut stack = RecursionStack::new();
        assert_eq!(
            sum(&resolver, &params(&["A1:B2", "C1", "5", "SUM(A1,A2)"]), &mut stack),
            Ok(28.0)
        );
    }

    #[test]
    fn test_avg_counts_range_cells_individually() {
        let sheet = sheet(&[("A1", "2"), ("A2", "4"), ("B1", "6")]);
        let resolver = Resolver::new(&sheet);
        let mut stack = RecursionStack::new();
        // A1:A3 contributes three cells (A3 is empty), B1 one more.
        assert_eq!(avg(&resolver, &params(&["A1:A3", "B1"]), &mut stack), Ok(3.0));
    }

    #[test]
    fn test_avg_of_nothing_is_zero() {
        let sheet = Sheet::new();
        let resolver = Resolver::new(&sheet);
        let mut stack = RecursionStack::new();
        assert_eq!(avg(&resolver, &[], &mut stack), Ok(0.0));
    }

    #[test]
    fn test_empty_text_counts_as_zero() {
        let sheet = sheet(&[("A1", ""), ("A2", "5")]);
        let resolver = Resolver::new(&sheet);
        let mut stack = RecursionStack::new();
        assert_eq!(sum(&resolver, &params(&["A1", "A2"]), &mut stack), Ok(5.0));
    }

    #[test]
    fn test_range_cap_follows_config() {
        let sheet = Sheet::new();
        let config = EngineConfig {
            max_range_cells: 4,
            ..EngineConfig::default()
        };
        let resolver = Resolver::with_config(&sheet, config);
        let mut stack = RecursionStack::new();
        assert_eq!(sum(&resolver, &params(&["A1:B2"]), &mut stack), Ok(0.0));
        assert!(matches!(
            sum(&resolver, &params(&["A1:B3"]), &mut stack),
            Err(EvalError::RangeTooLarge { cells: 6, limit: 4, .. })
        ));
    }

    #[test]
    fn test_call_function_unknown_is_not_an_error() {
        let sheet = Sheet::new();
        let resolver = Resolver::new(&sheet);
        let mut stack = RecursionStack::new();
        let call = parse_function_call("MEDIAN(A1:A3)").unwrap();
        assert_eq!(call_function(&resolver, &call, &mut stack), Ok(None));
    }
}
