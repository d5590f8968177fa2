use std::process::ExitCode;

fn main() -> ExitCode {
    sprint_report_lib::run()
}
