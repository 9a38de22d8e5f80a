use std::{ffi::OsStr, sync::Arc, time::Duration};

use headless_chrome::{Browser, LaunchOptions, Tab, browser::tab::NoElementFound};
use tokio::{task::spawn_blocking, time::sleep};

pub fn puppeteer(headless: bool, proxy: Option<String>) -> anyhow::Result<Browser> {
    Browser::new(LaunchOptions {
        args: vec![OsStr::new("--disable-blink-features=AutomationControlled")],
        headless,
        proxy_server: proxy.as_deref(),
        ..LaunchOptions::default()
    })
}

#[allow(clippy::significant_drop_tightening)]
pub fn first_tab(browser: &Browser) -> anyhow::Result<Arc<Tab>> {
    let tab = browser.new_tab()?;

    {
        let tabs_guard = browser
            .get_tabs()
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        for remain in &*tabs_guard {
            if !Arc::ptr_eq(&tab, remain) {
                remain.close(true)?;
            }
        }
    }

    Ok(tab)
}

pub async fn navigate_to(tab: &Arc<Tab>, url: &str) -> anyhow::Result<()> {
    let tab = Arc::clone(tab);
    let url = url.to_owned();

    spawn_blocking(move || tab.navigate_to(&url).map(|_| ())).await?
}

/// Polls until `selector` is present in the page. Never gives up on its own;
/// callers bound it with `tokio::time::timeout`.
pub async fn wait_for(tab: &Arc<Tab>, selector: &'static str) -> anyhow::Result<()> {
    const PERIOD: Duration = Duration::from_millis(1832 / 4);

    loop {
        let arc_tab = Arc::clone(tab);
        let result = spawn_blocking(move || match arc_tab.find_element(selector) {
            Ok(_) => Ok(true),
            Err(err) if err.is::<NoElementFound>() => Ok(false),
            Err(err) => Err(err),
        })
        .await??;

        if result {
            break Ok(());
        }

        sleep(PERIOD).await;
    }
}

pub async fn content(tab: &Arc<Tab>) -> anyhow::Result<String> {
    let tab = Arc::clone(tab);

    spawn_blocking(move || tab.get_content()).await?
}
