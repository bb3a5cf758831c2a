use hookvm_core::vm::config::{STEP_LIMIT_ENV, TRACE_ENV};
use hookvm_core::RunOptions;

// Only test in this binary, so mutating the process environment is not racy.
#[test]
fn run_options_read_from_environment() {
    unsafe {
        std::env::remove_var(TRACE_ENV);
        std::env::remove_var(STEP_LIMIT_ENV);
    }
    assert_eq!(RunOptions::from_env(), RunOptions::default());

    unsafe {
        std::env::set_var(TRACE_ENV, "true");
        std::env::set_var(STEP_LIMIT_ENV, " 64 ");
    }
    assert_eq!(RunOptions::from_env(), RunOptions { trace: true, step_limit: Some(64) });

    unsafe {
        std::env::set_var(TRACE_ENV, "0");
        std::env::set_var(STEP_LIMIT_ENV, "lots");
    }
    assert_eq!(RunOptions::from_env(), RunOptions::default());
}
