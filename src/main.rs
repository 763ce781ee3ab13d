fn main() {
    if let Err(err) = wirelay::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
