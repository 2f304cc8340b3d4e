use thiserror::Error;

#[derive(Error, Debug)]
pub enum SQLError {
    #[error("query error: {0}")]
    Query(String),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("connection error: {0}")]
    Connection(String),

    /// A `must_affect` statement inside [`exec_tx`](crate::SQLStore::exec_tx)
    /// touched zero rows; the whole transaction was rolled back.
    #[error("transaction aborted: {0}")]
    TxAborted(String),
}
