//! Clause representation shared by the builder.

/// How a predicate combines with everything accumulated before it.
///
/// The conjunction of the very first predicate never reaches the rendered
/// statement since there is nothing before it to combine with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    Or,
    And,
}

/// Sort direction for `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// One accumulated WHERE predicate.
#[derive(Debug, Clone)]
pub(crate) struct WherePredicate {
    pub conjunction: Conjunction,
    pub expr: String,
}

impl WherePredicate {
    /// Assembles predicate text from the three-string convention: no `op`
    /// means `lvalue` is a complete boolean expression; `op` without
    /// `rvalue` means `op` is the right-hand literal of an implicit
    /// equality; otherwise the caller supplied the operator. Nonsensical
    /// combinations are not detected and render as-is.
    pub fn assemble(
        conjunction: Conjunction,
        lvalue: &str,
        op: Option<&str>,
        rvalue: Option<&str>,
    ) -> Self {
        let expr = match (op, rvalue) {
            (None, _) => lvalue.to_string(),
            (Some(op), None) => format!("{lvalue}={op}"),
            (Some(op), Some(rvalue)) => format!("{lvalue}{op}{rvalue}"),
        };
        Self { conjunction, expr }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_complete_expression() {
        let pred = WherePredicate::assemble(Conjunction::Or, "active = 1", None, None);
        assert_eq!(pred.expr, "active = 1");
    }

    #[test]
    fn assemble_implicit_equality() {
        let pred = WherePredicate::assemble(Conjunction::Or, "id", Some("10"), None);
        assert_eq!(pred.expr, "id=10");
    }

    #[test]
    fn assemble_explicit_operator() {
        let pred = WherePredicate::assemble(Conjunction::And, "age", Some(">"), Some("18"));
        assert_eq!(pred.expr, "age>18");
    }

    #[test]
    fn assemble_ignores_rvalue_without_op() {
        // Documented misuse: a lone rvalue is dropped, lvalue wins.
        let pred = WherePredicate::assemble(Conjunction::Or, "id", None, Some("10"));
        assert_eq!(pred.expr, "id");
    }
}
