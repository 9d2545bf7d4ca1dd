use criterion::Criterion;
use std::time::Duration;

// Shared criterion settings so every benchmark file reports the same way.
pub fn get_criterion() -> Criterion {
    Criterion::default()
        .sample_size(100)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}
