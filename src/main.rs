fn main() {
    if let Err(err) = lynisreport::cli::run() {
        lynisreport::ui::eprintln_error(&err);
        std::process::exit(lynisreport::exit::exit_code(&err));
    }
}
