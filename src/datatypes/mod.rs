mod command_id;
mod command_status;
mod data_coding;
mod tlv;

pub use command_id::CommandId;
pub use command_status::CommandStatus;
pub use data_coding::DataCoding;
pub use tlv::{tags, Tlv};
