pub mod handlers;
pub mod middleware;
pub mod negotiation;
pub mod router;
