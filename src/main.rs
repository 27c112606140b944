mod app;
mod canvas;
mod config;
mod constants;
mod engine;
mod error;
mod fps;
mod frame;
mod logging;
mod profile;
mod stars;

fn main() {
    console_error_panic_hook::set_once();
    logging::init();
    leptos::mount::mount_to_body(app::App);
}
