use farm_loss::error::PipelineError;

fn main() {
    if let Err(err) = farm_loss::run() {
        eprintln!("error: {err:#}");
        let fatal = err
            .downcast_ref::<PipelineError>()
            .is_some_and(PipelineError::is_fatal);
        std::process::exit(if fatal { 2 } else { 1 });
    }
}
