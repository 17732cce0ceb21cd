//! Progress bar over planned hosts

use declarative::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

/// Reports planning progress on stderr; silent when hidden
pub struct HostProgress {
    bar: Option<ProgressBar>,
    hidden: bool,
}

impl HostProgress {
    pub fn new(hidden: bool) -> Self {
        Self { bar: None, hidden }
    }
}

impl ProgressCallback for HostProgress {
    fn on_start(&mut self, hosts: usize) {
        if self.hidden {
            return;
        }
        let bar = ProgressBar::new(hosts as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} hosts {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        self.bar = Some(bar);
    }

    fn on_host_complete(&mut self, host: &str, changed: bool) {
        if let Some(bar) = &self.bar {
            bar.set_message(if changed {
                format!("{host} needs changes")
            } else {
                host.to_string()
            });
            bar.inc(1);
        }
    }

    fn on_finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
