fn main() {
    if let Err(err) = parcel_reshape::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
