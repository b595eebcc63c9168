fn main() {
    if let Err(err) = loremap::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
