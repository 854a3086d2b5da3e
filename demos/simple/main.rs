use std::time::Duration;

use ackee_tracker::{Beacon, StaticEnvironment, Transport};

pub fn main() -> ackee_tracker::Result<()> {
    env_logger::init();

    let server_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:3000".to_owned());
    let html = format!(
        r#"<script async src="{server_url}/tracker.js" data-ackee="{server_url}" data-userId="demo-user" data-domainId="demo-domain"></script>"#
    );

    let environment = StaticEnvironment {
        location_href: "https://example.com/".to_owned(),
        title: "Example Domain".to_owned(),
        language: "en-US".to_owned(),
        user_agent: "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0"
            .to_owned(),
        screen_width: 1920,
        screen_height: 1080,
        screen_color_depth: 24,
        client_width: Some(1280),
        client_height: Some(720),
        outer_width: 1280,
        outer_height: 800,
        ..Default::default()
    };

    // Errors are fatal: `main` returns them and the process exits unsuccessfully.
    let response = Beacon::new(&html, environment)
        .transport(Transport::new().timeout(Duration::from_secs(10)))
        .run()?;

    println!("Response: {}", response);

    Ok(())
}
