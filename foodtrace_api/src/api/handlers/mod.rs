pub mod batches;
pub mod districts;
pub mod status;
