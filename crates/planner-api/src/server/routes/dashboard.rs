#[derive(Debug, Deserialize, Default)]
struct TopItemsQuery {
    limit: Option<usize>,
}

async fn get_top_items(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    query: Result<Query<TopItemsQuery>, QueryRejection>,
) -> Result<Json<TopItemsResponse>, HttpApiError> {
    let Query(query) = query.map_err(HttpApiError::invalid_query)?;

    let response = {
        let api = state.api.lock().await;
        api.top_items_for_user(&user_id, query.limit)?
    };

    tracing::debug!(
        user_id = %user_id,
        returned = response.items.len(),
        "top items ranked"
    );
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    schema_version: String,
    status: &'static str,
    store_attached: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_attached = state.api.lock().await.has_store();

    Json(HealthResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        status: "ok",
        store_attached,
    })
}
