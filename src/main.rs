fn main() {
    if let Err(err) = upset_thread_lib::run() {
        eprintln!("upset-thread: {err}");
        std::process::exit(1);
    }
}
