pub mod device;
pub mod laptop;
