//! The transform log and its positional rules.

mod position;
mod transform_log;

pub use position::Operation;
pub use transform_log::TransformLog;
