pub mod common;
pub mod config_record;
pub mod file_set;
pub mod unit;

pub use common::{FileClass, RelativePath};
pub use config_record::{ConfigRecord, ConfigRecordBuilder, HasName, NoName, RecordView};
pub use file_set::{FileEntry, FileSet, Payload};
pub use unit::{Phase, Stage, UnitInfo, UnitMetadata};
