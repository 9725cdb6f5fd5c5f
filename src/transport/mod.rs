// Authenticated HTTP gateway to the tracker service.

mod client;
mod response;

pub use client::TransportClient;
pub use response::ApiResponse;
