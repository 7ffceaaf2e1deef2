use std::process::ExitCode;

fn main() -> ExitCode {
    match hostlink::run_host() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("hostlinkd: {error}");
            ExitCode::FAILURE
        }
    }
}
