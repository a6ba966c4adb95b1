//! Entry point: installs the page components once the bundle loads.

fn main() {
    // Set the panic hook to log detailed errors to the console
    console_error_panic_hook::set_once();

    if let Err(e) = timetable_portal::start() {
        log::error!("page setup failed: {}", e);
    }
}
