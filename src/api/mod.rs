//! HTTP API module for the entitlement engine.
//!
//! This module exposes the engine operations as REST endpoints for the
//! payroll UI.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{ACTOR_HEADER, create_router};
pub use request::{
    CashoutRequest, CashoutRuleRequest, EntitlementRequest, EntitlementsRequest,
    LeaveCheckRequest, OvertimeRuleRequest, OvertimeSyncRequest,
};
pub use response::{ApiError, ApiErrorResponse, BatchResponse, HealthResponse, LeaveCheckResponse};
pub use state::AppState;
