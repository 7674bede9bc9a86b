//! cellcalc_engine - Spreadsheet formula engine (addressing, evaluation, SUM/AVG).

pub mod builtins;
pub mod engine;

#[cfg(test)]
mod tests {
    use crate::builtins::{avg, sum};
    use crate::engine::*;

    fn sheet(pairs: &[(&str, &str)]) -> Sheet {
        Sheet::from_pairs(pairs.iter().copied()).unwrap()
    }

    fn shown(sheet: &Sheet, id: &str) -> String {
        Resolver::new(sheet).display_value(id)
    }

    #[test]
    fn test_from_str_single_letter_columns() {
        let a1 = CellRef::from_str("A1").unwrap();
        assert_eq!((a1.col, a1.row), (0, 0));

        let z1 = CellRef::from_str("Z1").unwrap();
        assert_eq!(z1.col, 25);
    }

    #[test]
    fn test_from_str_multi_letter_columns() {
        assert_eq!(CellRef::from_str("AA1").unwrap().col, 26);
        assert_eq!(CellRef::from_str("AZ1").unwrap().col, 51);
        assert_eq!(CellRef::from_str("BA1").unwrap().col, 52);
        assert_eq!(CellRef::from_str("AA27").unwrap().to_string(), "AA27");
    }

    #[test]
    fn test_from_str_invalid_inputs() {
        assert!(CellRef::from_str("").is_none());
        assert!(CellRef::from_str("123").is_none());
        assert!(CellRef::from_str("ABC").is_none());
        assert!(CellRef::from_str("A0").is_none());
        assert!(CellRef::from_str("1A").is_none());
        assert!(CellRef::from_str("A 1").is_none());
    }

    #[test]
    fn test_evaluate_matches_standard_precedence() {
        assert_eq!(evaluate("2^3^2"), Ok(512.0));
        assert_eq!(evaluate("1+2*3-4/2"), Ok(5.0));
        assert_eq!(evaluate("(1+2)*(3-4)/2"), Ok(-1.5));
    }

    #[test]
    fn test_division_by_zero_is_not_infinity() {
        assert_eq!(
            evaluate("5/0"),
            Err(ExprError::Arithmetic(ArithmeticError::DivisionByZero))
        );
    }

    #[test]
    fn test_absent_and_empty_cells() {
        let sheet = sheet(&[("A2", "")]);
        assert_eq!(resolve_cell(&sheet, "A1"), Ok(Value::Number(0.0)));
        assert_eq!(resolve_cell(&sheet, "A2"), Ok(Value::Text(String::new())));
    }

    #[test]
    fn test_range_to_cell_list_order_and_cap() {
        let cells = range_to_cell_list("A1", "B2", DEFAULT_MAX_RANGE_CELLS).unwrap();
        let names: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["A1", "A2", "B1", "B2"]);

        assert!(matches!(
            range_to_cell_list("A1", "A201", DEFAULT_MAX_RANGE_CELLS),
            Err(EvalError::RangeTooLarge { cells: 201, .. })
        ));
    }

    #[test]
    fn test_sum_and_avg_entry_points() {
        let sheet = sheet(&[("A1", "3"), ("A2", "=2+2")]);
        let resolver = Resolver::new(&sheet);
        let mut stack = RecursionStack::new();
        let params = vec!["A1".to_string(), "A2".to_string()];
        assert_eq!(sum(&resolver, &params, &mut stack), Ok(7.0));
        assert_eq!(avg(&resolver, &params, &mut stack), Ok(3.5));
        assert_eq!(avg(&resolver, &[], &mut stack), Ok(0.0));
    }

    #[test]
    fn test_formulas_with_functions() {
        let sheet = sheet(&[
            ("A1", "1"),
            ("A2", "2"),
            ("A3", "3"),
            ("B1", "=SUM(A1:A3)"),
            ("B2", "=AVG(A1:A3)*10"),
            ("B3", "=SUM(A1:A3)+AVG(A1,A3)"),
            ("B4", "=(SUM(A1,A2))*2"),
            ("B5", "=sum(A1:A3)"),
            ("B6", "=SUM(A1:Z100)"),
            ("B7", "=SUM(A1:A3"),
        ]);
        assert_eq!(shown(&sheet, "B1"), "6");
        assert_eq!(shown(&sheet, "B2"), "20");
        assert_eq!(shown(&sheet, "B3"), "8");
        assert_eq!(shown(&sheet, "B4"), "6");
        assert_eq!(
            shown(&sheet, "B5"),
            "#ERROR: B5: function not recognized: sum"
        );
        assert_eq!(
            shown(&sheet, "B6"),
            "#ERROR: B6: SUM: range A1:Z100 spans 2600 cells (maximum 200)"
        );
        assert_eq!(
            shown(&sheet, "B7"),
            "#ERROR: B7: not a valid function call: SUM(A1:A3"
        );
    }

    #[test]
    fn test_depth_limit_is_twenty_nested_cells() {
        let build = |len: usize| {
            let sheet = Sheet::new();
            for i in 1..len {
                sheet.insert(&format!("C{}", i), &format!("=C{}+1", i + 1)).unwrap();
            }
            sheet.insert(&format!("C{}", len), "0").unwrap();
            sheet
        };

        assert_eq!(resolve_cell(&build(20), "C1"), Ok(Value::Number(19.0)));

        let err = resolve_cell(&build(21), "C1").unwrap_err();
        assert!(matches!(err.root_cause(), EvalError::DepthExceeded { .. }));
    }

    #[test]
    fn test_errors_do_not_leak_into_siblings() {
        let sheet = sheet(&[("A1", "=1/0"), ("A2", "=3*3")]);
        let resolver = Resolver::new(&sheet);
        assert!(resolver.resolve("A1").is_err());
        assert_eq!(resolver.resolve("A2"), Ok(Value::Number(9.0)));
    }
}
