mod calibration;
mod catalog;
mod entry;
mod reference;

pub use calibration::*;
pub use catalog::*;
pub use entry::*;
pub use reference::*;
