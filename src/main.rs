fn main() {
    if let Err(error) = image5d::run_cli() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
