fn main() {
    if let Err(err) = halo_entry::run() {
        log::error!("{err:#}");
        eprintln!("halo-entry: {err:#}");
        std::process::exit(1);
    }
}
