pub mod command;
pub mod framer;
pub mod parser;

pub use command::DeviceCommand;
pub use framer::LineFramer;
pub use parser::{parse_record, LaserEvent, ParsedRecord, Sample};
