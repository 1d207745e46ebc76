use anyhow::Result;

use crate::commands::{CommandReport, load_environment};
use crate::summary::audit;
use crate::summary::extract::{self, ProxyFetcher};

pub fn run(url: &str) -> Result<CommandReport> {
    let (paths, cfg) = load_environment()?;
    let mut report = CommandReport::new("extract");

    let fetcher = ProxyFetcher::new(&cfg.extract)?;
    let page = match extract::extract(url, &fetcher) {
        Ok(page) => page,
        Err(err) => {
            audit::record_error(&paths, "extract", &err);
            return Err(err.into());
        }
    };
    audit::record_ok(&paths, "extract", page.url.as_str());

    report.detail(format!("url={}", page.url));
    report.detail(format!("selector={}", page.selector.unwrap_or("body")));
    if let Some(title) = &page.title {
        report.detail(format!("title={title}"));
    }
    report.detail(format!("chars={}", page.text.chars().count()));
    report.output(page.text.clone());
    report.data(&page)?;
    Ok(report)
}
