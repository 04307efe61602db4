use super::*;
use serial_test::serial;

#[test]
fn task_env_vars_includes_all_five_keys() {
    let vars = task_env_vars("t1", "n", "archive/x.md", "surface", "/vault");
    let keys: Vec<_> = vars.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        keys,
        vec![TASK_ID_VAR, TASK_TARGET_VAR, TASK_SOURCE_VAR, TASK_PHASE_VAR, VAULT_ROOT_VAR]
    );
}

#[test]
#[serial]
fn current_heartbeat_depth_defaults_to_zero() {
    std::env::remove_var(HEARTBEAT_DEPTH_VAR);
    assert_eq!(current_heartbeat_depth(), 0);
}

#[test]
#[serial]
fn current_heartbeat_depth_parses_set_value() {
    std::env::set_var(HEARTBEAT_DEPTH_VAR, "2");
    assert_eq!(current_heartbeat_depth(), 2);
    std::env::remove_var(HEARTBEAT_DEPTH_VAR);
}
