fn main() {
    if let Err(e) = benchgrid::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
