//! Code indexing: the index-service port and the coordinator that drives
//! indexing of the selection and the chat query loop.

pub mod coordinator;
pub mod provider;
