// ============================================================================
// Workforce Server Library
// ============================================================================
//
// Shared building blocks for the HR platform services:
// - secrets / auth: candidate-secret resolution and bearer-token verification
// - middleware: request logging, authentication, the role gate
// - clients: REST clients for the identity and profile services
// - admin: the aggregation service composing both into one employee resource
// - gateway: the prefix router fronting the platform
//
// ============================================================================

pub mod admin;
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod gateway;
pub mod health;
pub mod metrics;
pub mod middleware;
pub mod secrets;
