//! Paneltone command-line interface.
//!
//! Commands:
//! - `paneltone analyze <PATH>...`: classify wallpapers
//! - `paneltone watch [PATH]`: re-classify a wallpaper whenever it changes
//! - `paneltone config`, `paneltone schema`, `paneltone completions`

fn main() {
    if let Err(err) = paneltone_lib::cli::run() {
        eprintln!("paneltone: {err}");
        std::process::exit(1);
    }
}
