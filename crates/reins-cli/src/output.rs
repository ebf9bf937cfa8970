use reins_agent::RunReport;
use reins_core::InvocationOutcome;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Human-readable run summary: the step table, then the answer.
pub fn print_report(report: &RunReport) {
    print_table(
        &["step", "action", "outcome"],
        report
            .history
            .iter()
            .map(|inv| {
                let outcome = match &inv.outcome {
                    InvocationOutcome::Success { observation } => truncate(observation, 60),
                    InvocationOutcome::Failure { error } => format!("FAILED: {}", truncate(error, 52)),
                };
                vec![inv.step.to_string(), inv.action.to_string(), outcome]
            })
            .collect(),
    );
    println!();
    println!(
        "finalized in {} step(s), {} rejection(s), {} ms",
        report.steps_consumed, report.rejections, report.duration_ms
    );
    println!();
    println!("{}", report.answer);
}

fn truncate(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max).collect();
    format!("{cut}…")
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    // Calculate column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  "));

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  "));
    }
}
