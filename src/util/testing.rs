use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::Department;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "deptree=trace");
        }
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    // config crate logs every source it probes
    let noisy_modules = ["config::"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Reference company used throughout the tests:
///
/// ```text
/// 1 Engineering
/// ├── 2 Backend
/// │   └── 4 Payments
/// └── 3 Frontend (inactive)
/// 5 Sales
/// ```
pub fn sample_departments() -> Vec<Department> {
    vec![
        Department::new("1", "Engineering")
            .with_description("Builds the product")
            .with_manager("u1", "Ada")
            .with_users(3),
        Department::new("2", "Backend").with_parent("1").with_users(5),
        Department::new("3", "Frontend")
            .with_parent("1")
            .with_users(2)
            .inactive(),
        Department::new("4", "Payments")
            .with_parent("2")
            .with_description("Billing and invoicing")
            .with_manager("u4", "Grace")
            .with_users(4),
        Department::new("5", "Sales").with_users(7),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
        init_test_setup();
    }

    #[test]
    fn given_sample_then_two_roots() {
        let roots = sample_departments()
            .into_iter()
            .filter(|d| d.is_root())
            .count();
        assert_eq!(roots, 2);
    }
}
