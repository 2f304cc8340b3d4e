use crate::error::SQLError;

/// A dynamically-typed SQL parameter value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// A row returned from a SQL query — column name to value.
#[derive(Debug, Clone)]
pub struct Row {
    pub columns: Vec<(String, Value)>,
}

impl Row {
    /// Get a column value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get a text column value by name.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get an integer column value by name.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    /// Get a real column value by name.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(Value::Real(f)) => Some(*f),
            _ => None,
        }
    }
}

/// One statement inside a transactional batch.
///
/// `must_affect` marks statements used as serialized check-then-write guards:
/// a guarded UPDATE carries its precondition in the WHERE clause, and a zero
/// row count means the precondition no longer holds. The store rolls the
/// whole batch back in that case.
#[derive(Debug, Clone)]
pub struct TxStatement {
    pub sql: String,
    pub params: Vec<Value>,
    pub must_affect: bool,
}

impl TxStatement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self { sql: sql.into(), params, must_affect: false }
    }

    /// Require the statement to affect at least one row, else abort.
    pub fn guarded(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self { sql: sql.into(), params, must_affect: true }
    }
}

/// SQLStore provides a SQL execution interface backed by an embedded database.
pub trait SQLStore: Send + Sync {
    /// Execute a query and return rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError>;

    /// Execute a statement (INSERT/UPDATE/DELETE) and return affected row count.
    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError>;

    /// Execute a batch of statements in a single transaction, all-or-nothing.
    ///
    /// Returns the per-statement affected row counts. If any statement fails,
    /// or a `must_affect` statement touches zero rows, nothing is applied and
    /// the error carries the offending statement's context.
    fn exec_tx(&self, stmts: &[TxStatement]) -> Result<Vec<u64>, SQLError>;
}
