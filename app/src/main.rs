fn main() {
    if let Err(err) = apx_demo::run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
