use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unreadable input: {0}")]
    UnreadableInput(String),
    #[error(
        "Could not detect amount columns (looked for Amount, Balance, Credit, Deposit, \
         Debit, Withdrawal or Spent) in: {}",
        .columns.join(", ")
    )]
    MissingAmountColumns { columns: Vec<String> },
    #[error("Invalid rules: {0}")]
    InvalidRules(String),
}

impl From<csv::Error> for ImportError {
    fn from(e: csv::Error) -> Self {
        ImportError::UnreadableInput(e.to_string())
    }
}
