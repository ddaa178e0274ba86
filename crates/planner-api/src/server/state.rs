#[derive(Clone)]
struct AppState {
    api: Arc<Mutex<PlannerApi>>,
}

impl AppState {
    fn new(api: PlannerApi) -> Self {
        Self {
            api: Arc::new(Mutex::new(api)),
        }
    }
}
