//! Join clause fragments.

/// Join flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Cross,
    Inner,
    LeftOuter,
}

/// One table join clause. Immutable once constructed; rendering order in the
/// final statement is insertion order on the builder.
///
/// Inner and left-outer joins carry an equality condition; cross joins carry
/// none. Constructing an equality join with an empty operand, or any join
/// with an empty table name, is a contract violation and panics.
#[derive(Debug, Clone)]
pub struct Join {
    kind: JoinKind,
    table: String,
    alias: Option<String>,
    left: String,
    right: String,
}

impl Join {
    fn new(
        kind: JoinKind,
        table: String,
        alias: Option<String>,
        left: String,
        right: String,
    ) -> Self {
        assert!(!table.is_empty(), "join table name must not be empty");
        if kind != JoinKind::Cross {
            assert!(
                !left.is_empty() && !right.is_empty(),
                "equality joins require both operands"
            );
        }
        Self {
            kind,
            table,
            alias,
            left,
            right,
        }
    }

    /// `CROSS JOIN <table>`
    pub fn cross(table: impl Into<String>) -> Self {
        Self::new(JoinKind::Cross, table.into(), None, String::new(), String::new())
    }

    /// `CROSS JOIN <table> AS '<alias>'`
    pub fn cross_as(table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::new(
            JoinKind::Cross,
            table.into(),
            Some(alias.into()),
            String::new(),
            String::new(),
        )
    }

    /// `JOIN <table> ON <left> = <right>`
    pub fn inner(
        table: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self::new(JoinKind::Inner, table.into(), None, left.into(), right.into())
    }

    /// `JOIN <table> AS '<alias>' ON <left> = <right>`
    pub fn inner_as(
        table: impl Into<String>,
        alias: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self::new(
            JoinKind::Inner,
            table.into(),
            Some(alias.into()),
            left.into(),
            right.into(),
        )
    }

    /// `LEFT OUTER JOIN <table> ON <left> = <right>`
    pub fn left_outer(
        table: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self::new(
            JoinKind::LeftOuter,
            table.into(),
            None,
            left.into(),
            right.into(),
        )
    }

    /// `LEFT OUTER JOIN <table> AS '<alias>' ON <left> = <right>`
    pub fn left_outer_as(
        table: impl Into<String>,
        alias: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self::new(
            JoinKind::LeftOuter,
            table.into(),
            Some(alias.into()),
            left.into(),
            right.into(),
        )
    }

    /// Renders this fragment as statement text.
    pub fn to_sql(&self) -> String {
        let table = match &self.alias {
            Some(alias) => format!("{} AS '{}'", self.table, alias),
            None => self.table.clone(),
        };
        match self.kind {
            JoinKind::Cross => format!("CROSS JOIN {table}"),
            JoinKind::Inner => format!("JOIN {table} ON {} = {}", self.left, self.right),
            JoinKind::LeftOuter => {
                format!("LEFT OUTER JOIN {table} ON {} = {}", self.left, self.right)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_join_with_alias() {
        let join = Join::inner_as("Accounts", "Konta", "id", "account_id");
        assert_eq!(join.to_sql(), "JOIN Accounts AS 'Konta' ON id = account_id");
    }

    #[test]
    fn inner_join_without_alias() {
        let join = Join::inner("Accounts", "id", "account_id");
        assert_eq!(join.to_sql(), "JOIN Accounts ON id = account_id");
    }

    #[test]
    fn cross_join_with_alias() {
        let join = Join::cross_as("Accounts", "Konta");
        assert_eq!(join.to_sql(), "CROSS JOIN Accounts AS 'Konta'");
    }

    #[test]
    fn cross_join_bare() {
        let join = Join::cross("Accounts");
        assert_eq!(join.to_sql(), "CROSS JOIN Accounts");
    }

    #[test]
    fn left_outer_join() {
        let join = Join::left_outer("Accounts", "id", "account_id");
        assert_eq!(join.to_sql(), "LEFT OUTER JOIN Accounts ON id = account_id");
    }

    #[test]
    #[should_panic(expected = "table name")]
    fn empty_table_panics() {
        Join::cross("");
    }

    #[test]
    #[should_panic(expected = "both operands")]
    fn inner_join_empty_operand_panics() {
        Join::inner("Accounts", "id", "");
    }
}
