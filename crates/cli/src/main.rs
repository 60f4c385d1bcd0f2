use std::process::ExitCode;

fn main() -> ExitCode {
    agribazaar_cli::run()
}
