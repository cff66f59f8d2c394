//! Authentication: the identity-provider ports and the session establisher
//! that drives the OAuth code exchange, identity lookup and repository
//! discovery.

pub mod establisher;
pub mod provider;
