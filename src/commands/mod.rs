pub mod batch;
pub mod generate;
pub mod regen;
pub mod status;
