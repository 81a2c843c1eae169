pub mod can;
pub mod interfaces;
pub mod structs;
pub mod toyota;
