use axum::{Json, extract::State};
use serde::Serialize;
use shared::order::PaymentMethod;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::payment::PaymentRequest;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Serialize)]
pub struct ValidatedPayment {
    pub method: PaymentMethod,
    pub label: &'static str,
}

/// POST /api/payment/validate
pub async fn validate(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Json(req): Json<PaymentRequest>,
) -> AppResult<Json<ApiResponse<ValidatedPayment>>> {
    let method = state.payments.validate(&req)?;
    Ok(ok(ValidatedPayment {
        method,
        label: method.label(),
    }))
}
