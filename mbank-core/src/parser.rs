//! Parser protocol driven by the host: split the source into rows, then turn
//! each row into at most one statement line.

use crate::statement::{Statement, TransactionRecord};

pub trait StatementParser {
    type Row;
    type Error;
    /// Owned row sequence; must not borrow the parser.
    type Rows: Iterator<Item = Result<Self::Row, Self::Error>>;

    /// Open the source and return its rows in file order.
    fn split_records(&mut self) -> Result<Self::Rows, Self::Error>;

    /// Process one row. Rows that are not transactions return `Ok(None)`.
    fn parse_record(&mut self, row: Self::Row) -> Result<Option<TransactionRecord>, Self::Error>;

    /// Assemble the statement from the collected lines.
    fn finish(self, transactions: Vec<TransactionRecord>) -> Statement;

    /// Run the whole protocol. Any error aborts the parse.
    fn parse(mut self) -> Result<Statement, Self::Error>
    where
        Self: Sized,
    {
        let mut lines = Vec::new();
        for row in self.split_records()? {
            if let Some(line) = self.parse_record(row?)? {
                lines.push(line);
            }
        }
        Ok(self.finish(lines))
    }
}
