mod gui;

use hashutil::{config, logging};
use iced::{window, Size};

fn main() -> iced::Result {
    if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {e:#}");
    }

    let cfg = config::load_or_init().unwrap_or_else(|e| {
        tracing::warn!("using default config: {e:#}");
        config::AppConfig::default()
    });

    iced::application(
        "HashUtil",
        gui::HashUtilApp::update,
        gui::HashUtilApp::view,
    )
    .window(window::Settings {
        size: Size::new(960.0, 560.0),
        resizable: true,
        ..window::Settings::default()
    })
    .run_with(move || gui::HashUtilApp::new(cfg))
}
