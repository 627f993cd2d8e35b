mod app;
mod catalog;
mod config;
mod playback;
mod progress;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
