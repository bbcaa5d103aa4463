//! Progress reporting for long index and extraction runs
//!
//! With the `progress` feature the helpers return indicatif bars; without it
//! they return a stand-in whose methods do nothing, so callers never need
//! their own `cfg` checks.

use std::time::Duration;

#[cfg(feature = "progress")]
pub use indicatif::ProgressBar;

#[cfg(not(feature = "progress"))]
pub use self::noop::ProgressBar;

/// Ticking spinner showing `message`, or `None` when `silent`
pub fn spinner(message: &'static str, silent: bool) -> Option<ProgressBar> {
    if silent {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    style_spinner(&spinner);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    Some(spinner)
}

/// Bar counting `len` items of `unit`, or `None` when `silent`
pub fn counter(len: usize, unit: &str, silent: bool) -> Option<ProgressBar> {
    if silent {
        return None;
    }
    let bar = ProgressBar::new(len as u64);
    style_counter(&bar, unit);
    Some(bar)
}

#[cfg(feature = "progress")]
fn style_spinner(spinner: &ProgressBar) {
    if let Ok(style) = indicatif::ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
}

#[cfg(feature = "progress")]
fn style_counter(bar: &ProgressBar, unit: &str) {
    let template =
        format!("{{spinner:.green}} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {unit} ({{eta}})");
    if let Ok(style) = indicatif::ProgressStyle::default_bar().template(&template) {
        bar.set_style(style.progress_chars("█▓▒░  "));
    }
}

#[cfg(not(feature = "progress"))]
fn style_spinner(_spinner: &ProgressBar) {}

#[cfg(not(feature = "progress"))]
fn style_counter(_bar: &ProgressBar, _unit: &str) {}

#[cfg(not(feature = "progress"))]
mod noop {
    use std::borrow::Cow;
    use std::time::Duration;

    #[derive(Clone)]
    pub struct ProgressBar;

    impl ProgressBar {
        pub fn new(_len: u64) -> Self {
            ProgressBar
        }

        pub fn new_spinner() -> Self {
            ProgressBar
        }

        pub fn set_message(&self, _msg: impl Into<Cow<'static, str>>) {}
        pub fn enable_steady_tick(&self, _interval: Duration) {}
        pub fn inc(&self, _delta: u64) {}
        pub fn finish_and_clear(&self) {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_returns_none() {
        assert!(spinner("working", true).is_none());
        assert!(counter(10, "items", true).is_none());
    }

    #[test]
    fn test_counter_accepts_increments() {
        let bar = counter(3, "items", false).unwrap();
        bar.inc(1);
        bar.finish_and_clear();
    }
}
