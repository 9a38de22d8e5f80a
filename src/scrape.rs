use core::time::Duration;

use reqwest::Client;

pub mod puppeteer;

pub const USER_AGENT: &str = "Mozilla/5.0";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub fn basic() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}
