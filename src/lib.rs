//! Browser bundle for the timetable portal landing page.
//!
//! [`start`] installs every page component once, against the DOM as it
//! exists at that moment. Elements added later are not picked up.

use log::info;

pub mod config;
pub mod dom;
pub mod error;
pub mod generate;
pub mod logger;
pub mod message;
pub mod reveal;
pub mod slideshow;
pub mod triggers;
pub mod upload;

use config::SiteConfig;
use error::SiteError;

/// Install the reveal, slideshow, upload triggers, generate button and
/// upload forms, in that order.
pub fn start() -> Result<(), SiteError> {
    logger::init(config::LOG_LEVEL);
    let document = gloo_utils::document();
    let config = SiteConfig::from_document(&document);
    logger::init(config.log_level);

    reveal::install(&document, &config)?;
    slideshow::install(&document, &config)?;
    triggers::bind_all(&document, &config.upload_bindings);
    generate::bind(&document, &config)?;
    let forms = upload::bind_all(&document, &config)?;

    info!("page ready ({} upload form(s))", forms);
    Ok(())
}
