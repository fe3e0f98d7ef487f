fn main() {
    example::init_tracing();
    if let Err(err) = example::run() {
        tracing::error!("walkthrough failed: {err}");
        std::process::exit(1);
    }
}
