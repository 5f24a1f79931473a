pub mod logging;
pub mod paths;
pub mod response;
pub mod sequence;
