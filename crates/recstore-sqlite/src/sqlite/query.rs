//! Parameterized SQL fragment builder.
//!
//! Predicate, order, and pagination fragments are built independently and
//! concatenated per call. Every caller-supplied value is bound as a numbered
//! parameter; only column names from a table's whitelist are interpolated.

use std::fmt::Write;

use rusqlite::types::Value;

/// Accumulates `WHERE` predicates and their bound parameters.
#[derive(Debug, Default)]
pub struct SqlBuilder {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl SqlBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("?{}", self.params.len())
    }

    /// `column = value`.
    pub fn eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        let placeholder = self.bind(value.into());
        self.clauses.push(format!("{column} = {placeholder}"));
        self
    }

    /// `column = value` when `value` is set and non-empty.
    pub fn eq_opt(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            let _ = self.eq(column, value.to_string());
        }
        self
    }

    /// `column IN (values...)`; skipped when `values` is empty.
    pub fn is_in(&mut self, column: &str, values: &[String]) -> &mut Self {
        if values.is_empty() {
            return self;
        }
        let placeholders: Vec<String> = values
            .iter()
            .map(|v| self.bind(Value::Text(v.clone())))
            .collect();
        self.clauses
            .push(format!("{column} IN ({})", placeholders.join(", ")));
        self
    }

    /// `column < value` when `value` is set.
    pub fn lt(&mut self, column: &str, value: Option<i64>) -> &mut Self {
        if let Some(value) = value {
            let placeholder = self.bind(Value::Integer(value));
            self.clauses.push(format!("{column} < {placeholder}"));
        }
        self
    }

    /// `column > value` when `value` is set.
    pub fn gt(&mut self, column: &str, value: Option<i64>) -> &mut Self {
        if let Some(value) = value {
            let placeholder = self.bind(Value::Integer(value));
            self.clauses.push(format!("{column} > {placeholder}"));
        }
        self
    }

    /// ` WHERE a AND b ...`, or empty when no predicates were added.
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    /// ` LIMIT ?n OFFSET ?m`. A negative value suppresses its clause;
    /// an offset without a limit is emitted as `LIMIT -1 OFFSET ?m`.
    pub fn page_clause(&mut self, limit: i64, offset: i64) -> String {
        let mut sql = String::new();
        match (limit >= 0, offset >= 0) {
            (true, true) => {
                let l = self.bind(Value::Integer(limit));
                let o = self.bind(Value::Integer(offset));
                let _ = write!(sql, " LIMIT {l} OFFSET {o}");
            }
            (true, false) => {
                let l = self.bind(Value::Integer(limit));
                let _ = write!(sql, " LIMIT {l}");
            }
            (false, true) => {
                let o = self.bind(Value::Integer(offset));
                let _ = write!(sql, " LIMIT -1 OFFSET {o}");
            }
            (false, false) => {}
        }
        sql
    }

    /// Bound parameters in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// ` ORDER BY column ASC|DESC`, or empty. `column` must already be validated.
pub fn order_clause(column: Option<&str>, ascending: bool) -> String {
    match column {
        Some(column) if !column.is_empty() => {
            format!(" ORDER BY {column} {}", if ascending { "ASC" } else { "DESC" })
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_has_no_where() {
        let b = SqlBuilder::new();
        assert_eq!(b.where_clause(), "");
        assert!(b.params().is_empty());
    }

    #[test]
    fn predicates_join_with_and() {
        let mut b = SqlBuilder::new();
        let _ = b
            .eq_opt("tenant_uuid", Some("t1"))
            .eq_opt("data_type", None)
            .is_in("domain", &["a".into(), "b".into()])
            .lt("created_at", Some(10))
            .gt("created_at", Some(1));
        assert_eq!(
            b.where_clause(),
            " WHERE tenant_uuid = ?1 AND domain IN (?2, ?3) AND created_at < ?4 AND created_at > ?5"
        );
        assert_eq!(b.params().len(), 5);
        assert_eq!(b.params()[0], Value::Text("t1".into()));
    }

    #[test]
    fn empty_string_filter_is_skipped() {
        let mut b = SqlBuilder::new();
        let _ = b.eq_opt("tenant_uuid", Some("")).eq_opt("domain", Some("d"));
        assert_eq!(b.where_clause(), " WHERE domain = ?1");
        assert_eq!(b.params().len(), 1);
    }

    #[test]
    fn empty_in_list_is_skipped() {
        let mut b = SqlBuilder::new();
        let _ = b.is_in("domain", &[]);
        assert_eq!(b.where_clause(), "");
    }

    #[test]
    fn hostile_values_are_bound_not_inlined() {
        let mut b = SqlBuilder::new();
        let _ = b.eq_opt("tenant_uuid", Some("x' OR '1'='1"));
        assert_eq!(b.where_clause(), " WHERE tenant_uuid = ?1");
        assert_eq!(b.params()[0], Value::Text("x' OR '1'='1".into()));
    }

    #[test]
    fn page_clause_variants() {
        let mut b = SqlBuilder::new();
        assert_eq!(b.page_clause(100, 0), " LIMIT ?1 OFFSET ?2");
        let mut b = SqlBuilder::new();
        assert_eq!(b.page_clause(5, -1), " LIMIT ?1");
        let mut b = SqlBuilder::new();
        assert_eq!(b.page_clause(-1, 3), " LIMIT -1 OFFSET ?1");
        let mut b = SqlBuilder::new();
        assert_eq!(b.page_clause(-1, -1), "");
        assert!(b.params().is_empty());
    }

    #[test]
    fn page_params_follow_predicates() {
        let mut b = SqlBuilder::new();
        let _ = b.eq("uuid", "u".to_string());
        assert_eq!(b.page_clause(1, 2), " LIMIT ?2 OFFSET ?3");
    }

    #[test]
    fn order_clause_variants() {
        assert_eq!(order_clause(Some("created_at"), true), " ORDER BY created_at ASC");
        assert_eq!(order_clause(Some("version"), false), " ORDER BY version DESC");
        assert_eq!(order_clause(None, true), "");
        assert_eq!(order_clause(Some(""), true), "");
    }
}
