use crate::{Value, separated_by};
use std::{collections::HashMap, fmt::Write};

/// Kind of a statement fragment, [`Builder`] keeps at most one per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseType {
    Insert,
    Values,
    Select,
    Limit,
    Where,
    OrderBy,
    Update,
    Delete,
    Count,
    Set,
    From,
}

/// Statement fragment with the parameters its placeholders consume, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub kind: ClauseType,
    pub sql: String,
    pub params: Vec<Value>,
}

impl Clause {
    pub fn new(kind: ClauseType, sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            kind,
            sql: sql.into(),
            params,
        }
    }
}

/// Assembles a statement out of clauses, in the order asked by the caller.
#[derive(Default, Debug)]
pub struct Builder {
    clauses: HashMap<ClauseType, Clause>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the fragment, replacing any previous fragment of the same kind.
    pub fn set(&mut self, kind: ClauseType, sql: impl Into<String>, params: Vec<Value>) -> &mut Self {
        self.clauses.insert(kind, Clause::new(kind, sql, params));
        self
    }

    pub fn push(&mut self, clause: Clause) -> &mut Self {
        self.clauses.insert(clause.kind, clause);
        self
    }

    /// Joins the fragments with a space and concatenates their parameters,
    /// kinds never set are skipped.
    pub fn build(&self, order: &[ClauseType]) -> (String, Vec<Value>) {
        let mut sql = String::with_capacity(128);
        let mut params = Vec::new();
        separated_by(
            &mut sql,
            order.iter().filter_map(|k| self.clauses.get(k)),
            |out, clause| {
                out.push_str(&clause.sql);
                params.extend(clause.params.iter().cloned());
            },
            " ",
        );
        (sql, params)
    }
}

fn placeholders(out: &mut String, count: usize) {
    out.push('(');
    separated_by(out, 0..count, |out, _| out.push('?'), ", ");
    out.push(')');
}

/// `INSERT INTO table (a, b)`, pair it with [`values_of`].
pub fn insert_into(table: &str, columns: &[&str]) -> Clause {
    Clause::new(
        ClauseType::Insert,
        format!("INSERT INTO {} ({})", table, columns.join(", ")),
        Vec::new(),
    )
}

/// `VALUES (?, ?), (?, ?)` with one tuple per row, parameters row by row.
pub fn values_of(rows: Vec<Vec<Value>>) -> Clause {
    let mut sql = String::from("VALUES ");
    let mut params = Vec::with_capacity(rows.iter().map(Vec::len).sum());
    separated_by(
        &mut sql,
        rows,
        |out, row| {
            placeholders(out, row.len());
            params.extend(row);
        },
        ", ",
    );
    Clause::new(ClauseType::Values, sql, params)
}

/// `SELECT a, b FROM table` followed by `tail` when not empty.
pub fn select_from(table: &str, columns: &[&str], tail: &str) -> Clause {
    let mut sql = format!("SELECT {} FROM {}", columns.join(", "), table);
    if !tail.is_empty() {
        let _ = write!(sql, " {tail}");
    }
    Clause::new(ClauseType::Select, sql, Vec::new())
}

pub fn count_from(table: &str) -> Clause {
    Clause::new(
        ClauseType::Count,
        format!("SELECT COUNT(*) FROM {table}"),
        Vec::new(),
    )
}

pub fn where_clause(predicate: &str, params: Vec<Value>) -> Clause {
    Clause::new(ClauseType::Where, format!("WHERE {predicate}"), params)
}

pub fn limit(count: u64) -> Clause {
    Clause::new(ClauseType::Limit, "LIMIT ?", vec![Value::UInt64(Some(count))])
}

pub fn order_by(column: &str, descending: bool) -> Clause {
    Clause::new(
        ClauseType::OrderBy,
        format!(
            "ORDER BY {} {}",
            column,
            if descending { "DESC" } else { "ASC" }
        ),
        Vec::new(),
    )
}

/// `UPDATE table SET a = ?, b = ?` with the assigned values as parameters.
pub fn update_set(table: &str, assignments: Vec<(&str, Value)>) -> Clause {
    let mut sql = format!("UPDATE {table} SET ");
    let mut params = Vec::with_capacity(assignments.len());
    separated_by(
        &mut sql,
        assignments,
        |out, (column, value)| {
            let _ = write!(out, "{column} = ?");
            params.push(value);
        },
        ", ",
    );
    Clause::new(ClauseType::Update, sql, params)
}

pub fn delete_from(table: &str) -> Clause {
    Clause::new(ClauseType::Delete, format!("DELETE FROM {table}"), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_in_caller_order() {
        let mut builder = Builder::new();
        builder
            .push(where_clause("age > ?", vec![Value::Int32(Some(18))]))
            .push(select_from("user", &["name", "age"], ""))
            .push(limit(3));
        let (sql, params) = builder.build(&[ClauseType::Select, ClauseType::Where, ClauseType::Limit]);
        assert_eq!(sql, "SELECT name, age FROM user WHERE age > ? LIMIT ?");
        assert_eq!(
            params,
            vec![Value::Int32(Some(18)), Value::UInt64(Some(3))]
        );
    }

    #[test]
    fn build_skips_missing() {
        let mut builder = Builder::new();
        builder.push(delete_from("user"));
        let (sql, params) = builder.build(&[ClauseType::Delete, ClauseType::Where]);
        assert_eq!(sql, "DELETE FROM user");
        assert!(params.is_empty());
        let (sql, _) = Builder::new().build(&[ClauseType::Select]);
        assert_eq!(sql, "");
    }

    #[test]
    fn set_overwrites() {
        let mut builder = Builder::new();
        builder.set(ClauseType::Where, "WHERE a = ?", vec![Value::Int32(Some(1))]);
        builder.set(ClauseType::Where, "WHERE b = ?", vec![Value::Int32(Some(2))]);
        let (sql, params) = builder.build(&[ClauseType::Where]);
        assert_eq!(sql, "WHERE b = ?");
        assert_eq!(params, vec![Value::Int32(Some(2))]);
    }

    #[test]
    fn insert_multiple_rows() {
        let mut builder = Builder::new();
        builder.push(insert_into("user", &["Name", "Age"])).push(values_of(vec![
            vec![Value::from("Tom"), Value::Int32(Some(18))],
            vec![Value::from("Sam"), Value::Int32(Some(25))],
        ]));
        let (sql, params) = builder.build(&[ClauseType::Insert, ClauseType::Values]);
        assert_eq!(
            sql,
            "INSERT INTO user (Name, Age) VALUES (?, ?), (?, ?)"
        );
        assert_eq!(params.len(), 4);
        assert_eq!(params[2], Value::from("Sam"));
        assert_eq!(params[3], Value::Int32(Some(25)));
    }

    #[test]
    fn update_with_where() {
        let mut builder = Builder::new();
        builder
            .push(update_set(
                "user",
                vec![("Name", Value::from("Tom")), ("Age", Value::Int32(Some(30)))],
            ))
            .push(where_clause("Name = ?", vec![Value::from("Tom")]));
        let (sql, params) = builder.build(&[ClauseType::Update, ClauseType::Where]);
        assert_eq!(sql, "UPDATE user SET Name = ?, Age = ? WHERE Name = ?");
        assert_eq!(
            params,
            vec![
                Value::from("Tom"),
                Value::Int32(Some(30)),
                Value::from("Tom")
            ]
        );
    }

    #[test]
    fn order_and_count() {
        assert_eq!(order_by("Age", true).sql, "ORDER BY Age DESC");
        assert_eq!(order_by("Age", false).sql, "ORDER BY Age ASC");
        assert_eq!(count_from("user").sql, "SELECT COUNT(*) FROM user");
        assert_eq!(
            select_from("user", &["Name"], "WHERE 1").sql,
            "SELECT Name FROM user WHERE 1"
        );
    }
}
