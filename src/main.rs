use curly::context::Environment;
use curly::core;
use curly::status::ExitStatus;

/// Entry point
///
/// Returns ExitStatus directly, which implements std::process::Termination.
fn main() -> ExitStatus {
    let args: Vec<String> = std::env::args().collect();
    let env = Environment::init();
    core::run(args, env)
}
