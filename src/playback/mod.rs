pub mod device;
pub mod driver;
pub mod exchange;
