pub mod app;
pub mod batch;
pub mod grab;
