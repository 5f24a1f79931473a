use std::{future::Future, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use services::services::export::{ExportError, ExportFormat, Tabular, render};

/// Run `task` behind a spinner on stderr. Disabled spinners are a no-op.
pub async fn with_spinner<F, T>(enabled: bool, message: &str, task: F) -> T
where
    F: Future<Output = T>,
{
    if !enabled {
        return task.await;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = task.await;
    spinner.finish_and_clear();
    result
}

pub fn print_table(table: &dyn Tabular, format: ExportFormat) -> Result<(), ExportError> {
    let rendered = render(table, format)?;
    print!("{}", rendered);
    if format == ExportFormat::Json {
        println!();
    }
    Ok(())
}

/// Aligned `label: value` lines for detail views
pub fn print_details(rows: &[(String, String)]) {
    let width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    for (label, value) in rows {
        println!("{:<width$}  {}", format!("{}:", label), value, width = width + 1);
    }
}
