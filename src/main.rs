mod config;
mod engine;
mod logging;
mod playback;
mod runtime;
mod seek;
mod ticker;
mod timefmt;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
