// ============================================================================
// Missive Types - Core Data Types
// ============================================================================
//
// Plain data structures shared by the stores, the services and the HTTP
// layer. Nothing in here performs I/O.
//
// Contents:
// - Users, permissions and e-mail normalisation
// - Messages, the status lifecycle and its transition rules
// - Field validation shared by every store implementation
//
// ============================================================================

pub mod message;
pub mod user;
pub mod validation;

pub use message::*;
pub use user::*;
pub use validation::*;
