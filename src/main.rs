fn main() {
    if let Err(err) = anchor_line::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
