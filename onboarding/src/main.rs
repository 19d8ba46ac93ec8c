use std::path::PathBuf;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Usage: --config=<path> (defaults to ./onboarding.toml, then the user config dir).
    let config_path = args
        .iter()
        .find_map(|a| a.strip_prefix("--config="))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);

    // Non-interactive flow proof mode against canned responses.
    // Writes `flow_smoke_transcript.log` under `Onboarding_Log/` and exits 0/1.
    if args.iter().any(|a| a == "--flow-smoke") {
        benchmark_onboarding::run_flow_smoke(config_path);
        return;
    }

    // Signup flow: basic info, then organization info for new organizations.
    if args.iter().any(|a| a == "--signup") {
        benchmark_onboarding::run_signup(config_path);
        return;
    }

    benchmark_onboarding::run_console(config_path);
}
