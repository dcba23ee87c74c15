//! Formula evaluation services.
//!
//! This module is the engine boundary: it turns one raw cell into a computed
//! [`Value`] and a whole grid into its computed counterpart. Failures never
//! escape a cell. A reference that cannot be resolved becomes `0`, a formula
//! that cannot be evaluated becomes `ERR`, and every other cell of the pass
//! computes normally.

use super::errors::EvalResult;
use super::functions::FunctionRegistry;
use super::models::{ComputedGrid, Grid, Value};
use super::parser::{ExpressionEvaluator, Parser};
use super::resolver::resolve_references;

/// Evaluates formulas against a source grid.
///
/// A compute pass is a pure function of the source grid: references always
/// resolve against the raw cell text, never against computed results, so
/// evaluation order cannot matter and repeated passes are identical.
///
/// # Examples
///
/// ```
/// use gridcalc::domain::{FormulaEvaluator, Grid};
///
/// let mut grid = Grid::default();
/// grid.set(0, 0, "2".to_string());
///
/// let evaluator = FormulaEvaluator::new();
/// assert_eq!(evaluator.evaluate_cell("=A1+3", &grid).to_string(), "5");
/// assert_eq!(evaluator.evaluate_cell("hello", &grid).to_string(), "hello");
/// assert_eq!(evaluator.evaluate_cell("=SUM(", &grid).to_string(), "ERR");
/// ```
pub struct FormulaEvaluator {
    registry: FunctionRegistry,
}

impl FormulaEvaluator {
    pub fn new() -> Self {
        Self {
            registry: FunctionRegistry::new(),
        }
    }

    /// Builds an evaluator around a custom function registry.
    pub fn with_registry(registry: FunctionRegistry) -> Self {
        Self { registry }
    }

    /// Computes the display value of one raw cell.
    ///
    /// Non-formula text copies through unchanged. A formula is stripped of
    /// its leading `=`, has its cell references resolved against `grid`, and
    /// is then parsed and evaluated; any failure yields [`Value::Error`].
    pub fn evaluate_cell(&self, raw: &str, grid: &Grid) -> Value {
        match raw.strip_prefix('=') {
            Some(body) => {
                let resolved = resolve_references(body, grid);
                match self.parse_and_evaluate(&resolved) {
                    Ok(value) => value,
                    Err(_) => Value::Error,
                }
            }
            None => Value::Text(raw.to_string()),
        }
    }

    /// Runs one compute pass over the whole grid.
    ///
    /// The result has exactly the shape of the source grid. Every formula
    /// resolves against the original source cells, so no formula can observe
    /// another formula's computed value.
    ///
    /// # Examples
    ///
    /// ```
    /// use gridcalc::domain::{FormulaEvaluator, Grid};
    ///
    /// let mut grid = Grid::default();
    /// grid.set(0, 0, "10".to_string());
    /// grid.set(1, 0, "20".to_string());
    /// grid.set(0, 1, "=AVERAGE(A1, A2)".to_string());
    ///
    /// let computed = FormulaEvaluator::new().evaluate_grid(&grid);
    /// assert_eq!(computed.display(0, 1), "15");
    /// ```
    pub fn evaluate_grid(&self, grid: &Grid) -> ComputedGrid {
        ComputedGrid {
            columns: grid.columns.clone(),
            rows: grid
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| self.evaluate_cell(cell, grid))
                        .collect()
                })
                .collect(),
        }
    }

    fn parse_and_evaluate(&self, body: &str) -> EvalResult<Value> {
        let mut parser = Parser::new(body)?;
        let ast = parser.parse()?;
        ExpressionEvaluator::new(&self.registry).evaluate(&ast)
    }
}

impl Default for FormulaEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Column A holds 2, 4, 6; everything else starts empty.
    fn sample_grid() -> Grid {
        let mut grid = Grid::with_size(3, 4);
        grid.set(0, 0, "2".to_string());
        grid.set(1, 0, "4".to_string());
        grid.set(2, 0, "6".to_string());
        grid
    }

    fn eval(raw: &str, grid: &Grid) -> String {
        FormulaEvaluator::new().evaluate_cell(raw, grid).to_string()
    }

    #[test]
    fn test_literals_copy_through_unchanged() {
        let grid = sample_grid();
        assert_eq!(eval("hello", &grid), "hello");
        assert_eq!(eval("42", &grid), "42");
        assert_eq!(eval("", &grid), "");
        // Numeric-looking text is still text until a formula references it
        assert_eq!(
            FormulaEvaluator::new().evaluate_cell("42", &grid),
            Value::Text("42".to_string())
        );
    }

    #[test]
    fn test_basic_formulas() {
        let grid = sample_grid();
        assert_eq!(eval("=2+3*4", &grid), "14");
        assert_eq!(eval("=A1+A2", &grid), "6");
        assert_eq!(eval("=1/3", &grid), "0.3333333333333333");
    }

    #[test]
    fn test_aggregate_functions_over_references() {
        let grid = sample_grid();
        assert_eq!(eval("=SUM(A1,A2,A3)", &grid), "12");
        assert_eq!(eval("=AVERAGE(A1,A2,A3)", &grid), "4");
        assert_eq!(eval("=MIN(A1,A2,A3)", &grid), "2");
        assert_eq!(eval("=MAX(A1,A2,A3)", &grid), "6");
    }

    #[test]
    fn test_out_of_range_reference_acts_as_zero() {
        let grid = sample_grid();
        assert_eq!(eval("=A99+1", &grid), "1");
        assert_eq!(eval("=Z1+1", &grid), "1");
    }

    #[test]
    fn test_text_cell_reference_acts_as_zero() {
        let mut grid = sample_grid();
        grid.set(0, 1, "hello".to_string());
        // The bad reference degrades at the resolution stage; evaluation
        // itself succeeds.
        assert_eq!(eval("=B1+1", &grid), "1");
    }

    #[test]
    fn test_formulas_never_observe_computed_cells() {
        let mut grid = sample_grid();
        grid.set(0, 1, "=2+2".to_string());
        // B1's raw text is "=2+2", which is not numeric, so a reference to it
        // resolves to 0 rather than to the computed 4.
        assert_eq!(eval("=B1+1", &grid), "1");
    }

    #[test]
    fn test_conditionals_with_text_branches() {
        let grid = sample_grid();
        assert_eq!(eval("=IF(1>0, \"yes\", \"no\")", &grid), "yes");
        assert_eq!(eval("=IF(0>1, \"yes\", \"no\")", &grid), "no");
        assert_eq!(eval("=IF(A1>5, A1*2, 0)", &grid), "0");
    }

    #[test]
    fn test_round_normalizes_integers() {
        let grid = sample_grid();
        assert_eq!(eval("=ROUND(3.14159, 2)", &grid), "3.14");
        assert_eq!(eval("=ROUND(2, 0)", &grid), "2");
    }

    #[test]
    fn test_average_of_nothing_is_zero() {
        let grid = sample_grid();
        assert_eq!(eval("=AVERAGE()", &grid), "0");
    }

    #[test]
    fn test_comparison_results_render_as_booleans() {
        let grid = sample_grid();
        assert_eq!(eval("=A1>1", &grid), "TRUE");
        assert_eq!(eval("=A1>100", &grid), "FALSE");
    }

    #[test]
    fn test_errors_stay_in_their_cell() {
        let grid = sample_grid();
        assert_eq!(eval("=SUM(", &grid), "ERR");
        assert_eq!(eval("=1/0", &grid), "ERR");
        assert_eq!(eval("=10%0", &grid), "ERR");
        assert_eq!(eval("=NOSUCH(1)", &grid), "ERR");
        assert_eq!(eval("=\"a\"+1", &grid), "ERR");
    }

    #[test]
    fn test_function_names_match_whole_and_case_sensitive() {
        let grid = sample_grid();
        // CHECKSUM shares a suffix with SUM but is its own (unknown) name
        assert_eq!(eval("=CHECKSUM(A1,A2)", &grid), "ERR");
        assert_eq!(eval("=sum(A1,A2)", &grid), "ERR");
        assert_eq!(eval("=SUM(A1,A2)", &grid), "6");
    }

    #[test]
    fn test_ranges_are_not_part_of_the_grammar() {
        let grid = sample_grid();
        assert_eq!(eval("=SUM(A1:A3)", &grid), "ERR");
    }

    #[test]
    fn test_reference_substitution_is_textual() {
        let grid = sample_grid();
        // The resolver rewrites references even inside quoted text
        assert_eq!(eval("=CONCAT(\"A1=\", A1)", &grid), "2=2");
        assert_eq!(eval("=LEN(\"A1\")", &grid), "1");
    }

    #[test]
    fn test_grid_pass_preserves_shape() {
        let mut grid = sample_grid();
        grid.set(0, 3, "=SUM(A1,A2,A3)".to_string());
        grid.set(1, 3, "=AVERAGE(A1,A2,A3)".to_string());
        grid.set(2, 3, "label".to_string());

        let computed = FormulaEvaluator::new().evaluate_grid(&grid);
        assert_eq!(computed.columns, grid.columns);
        assert_eq!(computed.row_count(), grid.row_count());
        assert_eq!(computed.display(0, 3), "12");
        assert_eq!(computed.display(1, 3), "4");
        assert_eq!(computed.display(2, 3), "label");
        assert_eq!(computed.display(0, 0), "2");
        assert_eq!(computed.display(0, 1), "");
    }

    #[test]
    fn test_one_bad_formula_does_not_blank_the_pass() {
        let mut grid = sample_grid();
        grid.set(0, 1, "=SUM(".to_string());
        grid.set(0, 2, "=A1*10".to_string());

        let computed = FormulaEvaluator::new().evaluate_grid(&grid);
        assert_eq!(computed.display(0, 1), "ERR");
        assert_eq!(computed.display(0, 2), "20");
    }

    #[test]
    fn test_grid_pass_is_deterministic() {
        let mut grid = sample_grid();
        grid.set(0, 1, "=A1+A2".to_string());
        grid.set(1, 1, "=IF(A1>1, \"big\", \"small\")".to_string());
        grid.set(2, 1, "=1/0".to_string());

        let evaluator = FormulaEvaluator::new();
        let first = evaluator.evaluate_grid(&grid);
        let second = evaluator.evaluate_grid(&grid);
        assert_eq!(first, second);
    }

    #[test]
    fn test_custom_registry() {
        use crate::domain::functions::FunctionRegistry;
        use crate::domain::Value;

        let mut registry = FunctionRegistry::new();
        registry.register("ANSWER", |_| Ok(Value::Number(42.0)));

        let evaluator = FormulaEvaluator::with_registry(registry);
        let grid = Grid::default();
        assert_eq!(evaluator.evaluate_cell("=ANSWER()", &grid).to_string(), "42");
    }
}
