async fn simulate_inline(
    State(state): State<AppState>,
    payload: Result<Json<InlineSimulationRequest>, JsonRejection>,
) -> Result<Json<SimulationResult>, HttpApiError> {
    let Json(request) = payload.map_err(HttpApiError::invalid_body)?;

    let outcome = {
        let api = state.api.lock().await;
        api.simulate(&request.items, &request.request)
    };

    log_simulation_outcome(None, request.items.len(), &outcome);
    Ok(Json(outcome?))
}

async fn simulate_for_user(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<SimulationRequest>, JsonRejection>,
) -> Result<Json<SimulationResult>, HttpApiError> {
    let Json(request) = payload.map_err(HttpApiError::invalid_body)?;

    let outcome = {
        let api = state.api.lock().await;
        api.simulate_for_user(&user_id, &request)
    };

    let candidates = outcome.as_ref().map_or(0, |result| {
        result.purchased_count() + result.unpurchased.len()
    });
    log_simulation_outcome(Some(&user_id), candidates, &outcome);
    Ok(Json(outcome?))
}

fn log_simulation_outcome(
    user_id: Option<&str>,
    candidates: usize,
    outcome: &Result<SimulationResult, ApiError>,
) {
    let user_id = user_id.unwrap_or("-");
    match outcome {
        Ok(result) => tracing::info!(
            user_id,
            candidates,
            total_months = result.total_months,
            total_spent = result.total_spent,
            unpurchased = result.unpurchased.len(),
            "simulation completed"
        ),
        Err(error) => tracing::warn!(
            user_id,
            error_code = ?error.error_code,
            message = %error.message,
            "simulation rejected"
        ),
    }
}
