//! Lightweight XML tree used as the on-disk representation of DAO data.

pub mod convert;
pub mod node;
pub mod reader;
pub mod writer;

pub use convert::{
    MicroTypeConverter, date_time_attribute, format_date_time, parse_bool, parse_date_time, required_attribute,
};
pub use node::{MicroDocument, MicroElement, MicroNode};
pub use reader::MicroReader;
pub use writer::MicroWriter;
