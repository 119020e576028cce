use indicatif::ProgressStyle;

pub const PROGRESS_TEMPLATE: &str = "[{elapsed_precise} / {eta_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}";

/// Bar style for spans tracked by the `IndicatifLayer`. Falls back to the
/// default bar if the template is rejected.
pub fn progress_style() -> ProgressStyle {
    match ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
        Ok(style) => style.progress_chars("##-"),
        Err(_) => ProgressStyle::default_bar()
    }
}
