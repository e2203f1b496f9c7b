//! The fluent SELECT builder.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use crate::{
    connection::{count_query, Session},
    error::Result,
    query::{
        clause::{Conjunction, Order, WherePredicate},
        join::Join,
    },
};

/// Names (or aliases) of the columns produced by the last read.
pub type ColsInfo = Vec<String>;
/// One retrieved record, keyed by column name.
pub type Row = BTreeMap<String, String>;
/// Retrieved records in storage-engine return order.
pub type Rows = Vec<Row>;

/// A fluent builder for one SELECT statement against a bound table.
///
/// Configuration calls append or overwrite clause state and return the
/// builder for chaining; [`SelectQuery::get`] renders the accumulated state
/// into a statement, executes it, and returns the rows as textual maps.
/// When no columns were selected explicitly, the column list is reflected
/// from the table schema.
///
/// The column, join, and where sequences are FIFO queues consumed by the
/// render pass. A second `get` on the same builder without re-populating
/// them degrades to the default clause set; [`SelectQuery::clear`] resets
/// clause state (but not the table binding, session, or joins) for the next
/// request.
///
/// # Example
///
/// ```
/// use tablescan::{Order, SelectQuery};
///
/// # fn main() -> tablescan::Result<()> {
/// let mut query = SelectQuery::factory("users", ":memory:")?;
/// query
///     .session()
///     .execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
///
/// let rows = query
///     .column("name")
///     .or_where("id", Some(">"), Some("0"))
///     .order_by("id", Order::Asc)
///     .get(None)?;
/// assert!(rows.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct SelectQuery {
    table: String,
    session: Session,
    cols_list: ColsInfo,
    cols_types: Vec<String>,
    table_data: Rows,
    columns: VecDeque<(String, String)>,
    joins: VecDeque<Join>,
    wheres: VecDeque<WherePredicate>,
    distinct: bool,
    group_by: Option<String>,
    order_by: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
}

impl SelectQuery {
    /// Factory entry point: binds a table (possibly empty, resolvable later
    /// per call) and opens a session against the named database.
    pub fn factory(table: impl Into<String>, db_name: &str) -> Result<Self> {
        Ok(Self::from_session(table, Session::open(db_name)?))
    }

    /// Builds on an already open session.
    pub fn from_session(table: impl Into<String>, session: Session) -> Self {
        Self {
            table: table.into(),
            session,
            cols_list: Vec::new(),
            cols_types: Vec::new(),
            table_data: Vec::new(),
            columns: VecDeque::new(),
            joins: VecDeque::new(),
            wheres: VecDeque::new(),
            distinct: false,
            group_by: None,
            order_by: None,
            limit: None,
            offset: None,
        }
    }

    /// The session this builder owns.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Sets the `DISTINCT` flag.
    pub fn distinct(&mut self, distinct: bool) -> &mut Self {
        self.distinct = distinct;
        self
    }

    /// Appends one WHERE predicate with an explicit conjunction.
    ///
    /// The three-string convention: `op` absent renders `lvalue` verbatim;
    /// `rvalue` absent renders `lvalue + "=" + op` (implicit equality with
    /// `op` as the right-hand literal); otherwise `lvalue + op + rvalue`.
    /// The combination is never validated.
    pub fn filter(
        &mut self,
        conjunction: Conjunction,
        lvalue: &str,
        op: Option<&str>,
        rvalue: Option<&str>,
    ) -> &mut Self {
        self.wheres
            .push_back(WherePredicate::assemble(conjunction, lvalue, op, rvalue));
        self
    }

    /// Appends an OR predicate; see [`SelectQuery::filter`].
    pub fn or_where(&mut self, lvalue: &str, op: Option<&str>, rvalue: Option<&str>) -> &mut Self {
        self.filter(Conjunction::Or, lvalue, op, rvalue)
    }

    /// Appends an AND predicate; see [`SelectQuery::filter`].
    pub fn and_where(&mut self, lvalue: &str, op: Option<&str>, rvalue: Option<&str>) -> &mut Self {
        self.filter(Conjunction::And, lvalue, op, rvalue)
    }

    /// Sets the grouping column; last call wins.
    pub fn group_by(&mut self, column: impl Into<String>) -> &mut Self {
        self.group_by = Some(column.into());
        self
    }

    /// Sets the sort column and direction; last call wins.
    pub fn order_by(&mut self, column: &str, direction: Order) -> &mut Self {
        let suffix = match direction {
            Order::Asc => " ASC",
            Order::Desc => " DESC",
        };
        self.order_by = Some(format!("{column}{suffix}"));
        self
    }

    /// Sets the row limit. A limit of `"0"` is a contract violation and
    /// panics.
    pub fn limit(&mut self, limit: impl Into<String>) -> &mut Self {
        let limit = limit.into();
        assert!(limit != "0", "a LIMIT of 0 can never return rows");
        self.limit = Some(limit);
        self
    }

    /// Sets limit and offset together; the `"0"` limit precondition applies.
    pub fn limit_offset(
        &mut self,
        limit: impl Into<String>,
        offset: impl Into<String>,
    ) -> &mut Self {
        self.limit(limit);
        self.offset(offset)
    }

    /// Sets the row offset.
    pub fn offset(&mut self, offset: impl Into<String>) -> &mut Self {
        self.offset = Some(offset.into());
        self
    }

    /// Appends one bare column expression.
    pub fn column(&mut self, expr: impl Into<String>) -> &mut Self {
        self.columns.push_back((expr.into(), String::new()));
        self
    }

    /// Appends one column expression with an alias.
    pub fn column_as(&mut self, expr: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.columns.push_back((expr.into(), alias.into()));
        self
    }

    /// Appends bare column expressions, in iteration order.
    pub fn columns<I, S>(&mut self, exprs: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for expr in exprs {
            self.columns.push_back((expr.into(), String::new()));
        }
        self
    }

    /// Appends `(expression, alias)` pairs, in iteration order. An empty
    /// alias means none.
    pub fn columns_as<I, S, A>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, A)>,
        S: Into<String>,
        A: Into<String>,
    {
        for (expr, alias) in pairs {
            self.columns.push_back((expr.into(), alias.into()));
        }
        self
    }

    /// Appends one join fragment.
    pub fn join(&mut self, join: Join) -> &mut Self {
        self.joins.push_back(join);
        self
    }

    /// Resets clause state for the next request. The table binding, session,
    /// accumulated joins, and the process-wide query counter survive.
    pub fn clear(&mut self) -> &mut Self {
        self.cols_list.clear();
        self.cols_types.clear();
        self.wheres.clear();
        self.distinct = false;
        self.group_by = None;
        self.order_by = None;
        self.limit = None;
        self.offset = None;
        self.columns.clear();
        self
    }

    /// Returns the effective column list and caches it.
    ///
    /// With an explicit column selection, the display name per entry is the
    /// alias if present, else the expression, in insertion order; the
    /// selection itself stays queued for the render pass. Without one, the
    /// effective table (argument, else the bound table; both empty is a
    /// contract violation and panics) is reflected against the store and
    /// the ordered column names (with their parallel type names) are
    /// cached.
    pub fn get_columns(&mut self, table_name: Option<&str>) -> Result<ColsInfo> {
        if !self.columns.is_empty() {
            self.cols_list = self
                .columns
                .iter()
                .map(|(expr, alias)| {
                    if alias.is_empty() {
                        expr.clone()
                    } else {
                        alias.clone()
                    }
                })
                .collect();
            return Ok(self.cols_list.clone());
        }

        let table = self.resolve_table(table_name);
        self.cols_list.clear();
        self.cols_types.clear();
        for (name, ty) in self.session.table_info(&table)? {
            self.cols_list.push(name);
            self.cols_types.push(ty);
        }
        Ok(self.cols_list.clone())
    }

    /// Materializes the accumulated state: renders the statement, executes
    /// it, and returns one textual map per row, keyed by the cached column
    /// name at each cell's ordinal. Increments the process-wide query
    /// counter by exactly one, row count notwithstanding.
    pub fn get(&mut self, table_name: Option<&str>) -> Result<Rows> {
        let table = self.resolve_table(table_name);
        self.get_columns(Some(&table))?;
        let sql = self.build_sql(&table);
        debug!(statement = %sql, "executing select");

        let raw = self.session.query_text(&sql)?;
        self.table_data.clear();
        for cells in raw {
            let mut row = Row::new();
            for (idx, name) in self.cols_list.iter().enumerate() {
                row.insert(name.clone(), cells.get(idx).cloned().unwrap_or_default());
            }
            self.table_data.push(row);
        }
        count_query();
        Ok(self.table_data.clone())
    }

    /// Column names cached by the last read.
    pub fn last_columns(&self) -> &[String] {
        &self.cols_list
    }

    /// Column type names cached by the last schema reflection.
    pub fn last_column_types(&self) -> &[String] {
        &self.cols_types
    }

    /// Rows cached by the last read.
    pub fn last_rows(&self) -> &Rows {
        &self.table_data
    }

    fn resolve_table(&self, table_name: Option<&str>) -> String {
        let table = match table_name {
            Some(name) if !name.is_empty() => name,
            _ => self.table.as_str(),
        };
        assert!(!table.is_empty(), "no table bound and none supplied");
        table.to_string()
    }

    /// Renders the accumulated state into one statement. Drains the column,
    /// join, and where queues.
    pub(crate) fn build_sql(&mut self, table_name: &str) -> String {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.columns_sql());
        sql.push_str(" FROM `");
        sql.push_str(table_name);
        sql.push_str("` ");
        sql.push_str(&self.joins_sql());
        sql.push_str(&self.where_sql());
        if let Some(group_by) = &self.group_by {
            sql.push_str(" GROUP BY ");
            sql.push_str(group_by);
        }
        if let Some(order_by) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        if let Some(limit) = &self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(limit);
        }
        if let Some(offset) = &self.offset {
            sql.push_str(" OFFSET ");
            sql.push_str(offset);
        }
        sql.push(';');
        sql
    }

    fn columns_sql(&mut self) -> String {
        if self.columns.is_empty() {
            return "*".to_string();
        }
        let mut parts = Vec::with_capacity(self.columns.len());
        while let Some((expr, alias)) = self.columns.pop_front() {
            if alias.is_empty() {
                parts.push(expr);
            } else {
                parts.push(format!("{expr} AS '{alias}'"));
            }
        }
        parts.join(", ")
    }

    fn joins_sql(&mut self) -> String {
        let mut sql = String::new();
        while let Some(join) = self.joins.pop_front() {
            sql.push_str(&join.to_sql());
            sql.push(' ');
        }
        sql
    }

    fn where_sql(&mut self) -> String {
        let mut conditions = String::new();
        while let Some(pred) = self.wheres.pop_front() {
            if !conditions.is_empty() {
                conditions.push_str(match pred.conjunction {
                    Conjunction::Or => " OR ",
                    Conjunction::And => " AND ",
                });
            }
            conditions.push_str(&pred.expr);
        }
        if conditions.is_empty() {
            conditions
        } else {
            format!(" WHERE {conditions}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> SelectQuery {
        SelectQuery::factory("T", ":memory:").unwrap()
    }

    #[test]
    fn default_statement() {
        assert_eq!(builder().build_sql("T"), "SELECT * FROM `T` ;");
    }

    #[test]
    fn column_selection_and_aliases() {
        let mut query = builder();
        query.column("a").column_as("b", "bee");
        assert_eq!(query.build_sql("T"), "SELECT a, b AS 'bee' FROM `T` ;");
    }

    #[test]
    fn duplicate_columns_are_preserved() {
        let mut query = builder();
        query.columns(["a", "a"]);
        assert_eq!(query.build_sql("T"), "SELECT a, a FROM `T` ;");
    }

    #[test]
    fn distinct_flag() {
        let mut query = builder();
        query.distinct(true);
        assert_eq!(query.build_sql("T"), "SELECT DISTINCT * FROM `T` ;");
    }

    #[test]
    fn where_arity_and_conjunctions() {
        let mut query = builder();
        query
            .or_where("active = 1", None, None)
            .and_where("age", Some(">"), Some("18"))
            .or_where("id", Some("10"), None);
        assert_eq!(
            query.build_sql("T"),
            "SELECT * FROM `T`  WHERE active = 1 AND age>18 OR id=10;"
        );
    }

    #[test]
    fn first_predicate_conjunction_is_ignored() {
        let mut query = builder();
        query.and_where("x", Some("1"), None);
        assert_eq!(query.build_sql("T"), "SELECT * FROM `T`  WHERE x=1;");
    }

    #[test]
    fn grouping_ordering_pagination() {
        let mut query = builder();
        query
            .group_by("dept")
            .order_by("name", Order::Desc)
            .limit_offset("10", "20");
        assert_eq!(
            query.build_sql("T"),
            "SELECT * FROM `T`  GROUP BY dept ORDER BY name DESC LIMIT 10 OFFSET 20;"
        );
    }

    #[test]
    fn order_by_ascending() {
        let mut query = builder();
        query.order_by("name", Order::Asc);
        assert_eq!(
            query.build_sql("T"),
            "SELECT * FROM `T`  ORDER BY name ASC;"
        );
    }

    #[test]
    fn group_by_last_call_wins() {
        let mut query = builder();
        query.group_by("a").group_by("b");
        assert_eq!(query.build_sql("T"), "SELECT * FROM `T`  GROUP BY b;");
    }

    #[test]
    fn joins_render_in_insertion_order() {
        let mut query = builder();
        query
            .join(Join::inner("Accounts", "id", "account_id"))
            .join(Join::cross("Logs"));
        assert_eq!(
            query.build_sql("T"),
            "SELECT * FROM `T` JOIN Accounts ON id = account_id CROSS JOIN Logs ;"
        );
    }

    #[test]
    #[should_panic(expected = "LIMIT of 0")]
    fn zero_limit_panics() {
        builder().limit("0");
    }

    #[test]
    #[should_panic(expected = "LIMIT of 0")]
    fn zero_limit_with_offset_panics() {
        builder().limit_offset("0", "5");
    }

    #[test]
    #[should_panic(expected = "no table bound")]
    fn unresolved_table_panics() {
        SelectQuery::factory("", ":memory:").unwrap().get(None).unwrap();
    }

    #[test]
    fn clear_spares_table_and_joins() {
        let mut query = builder();
        query
            .distinct(true)
            .column("x")
            .or_where("x", Some("1"), None)
            .group_by("x")
            .order_by("x", Order::Asc)
            .limit_offset("5", "1")
            .join(Join::inner("Accounts", "id", "account_id"))
            .clear();
        assert_eq!(
            query.build_sql("T"),
            "SELECT * FROM `T` JOIN Accounts ON id = account_id ;"
        );
    }

    #[test]
    fn derived_column_list_prefers_aliases() {
        let mut query = builder();
        query.columns_as([("a", ""), ("b", "bee")]);
        assert_eq!(query.get_columns(None).unwrap(), ["a", "bee"]);
        // The selection itself stays queued for the render pass.
        assert_eq!(query.build_sql("T"), "SELECT a, b AS 'bee' FROM `T` ;");
    }

    #[test]
    fn second_render_degrades_to_defaults() {
        let mut query = builder();
        query
            .column("a")
            .or_where("x", Some("1"), None)
            .join(Join::cross("Logs"));
        query.build_sql("T");
        assert_eq!(query.build_sql("T"), "SELECT * FROM `T` ;");
    }
}
