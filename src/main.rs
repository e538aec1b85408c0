fn main() {
    if let Err(err) = crew_recon::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
