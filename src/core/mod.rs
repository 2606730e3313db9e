mod flatten;
mod record;
mod report;
mod test;

pub use flatten::FlattenedRecord;
pub use record::{Record, RecordType, Suggestion, Warning, FIELD_COUNT};
pub use report::Report;
pub use test::Test;
