use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(err) = step_chart::app::run() {
        eprintln!("step-chart: {err}");
        return ExitCode::from(err.exit_code());
    }
    ExitCode::SUCCESS
}
