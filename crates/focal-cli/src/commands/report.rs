/// Report command handler
use anyhow::Result;
use tabled::{Table, Tabled};

use focal_core::analytics::{format_hms, Report};
use focal_core::ipc::{IpcRequest, IpcResponse};

use super::helpers;

#[derive(Tabled)]
struct AppRow {
    #[tabled(rename = "Application")]
    app: String,
    #[tabled(rename = "Time")]
    time: String,
}

pub async fn handle_report() -> Result<()> {
    let client = helpers::client()?;
    match client.send_command(IpcRequest::Report).await {
        Ok(IpcResponse::Report(Some(report))) => print_report(&report),
        Ok(IpcResponse::Report(None)) => {
            println!("No samples recorded yet - start a session first.");
        }
        Ok(other) => anyhow::bail!("unexpected IPC response: {other:?}"),
        Err(_) => println!("No session is running."),
    }
    Ok(())
}

fn print_report(report: &Report) {
    println!("\nSession Report");
    println!(
        "Total time:      {}",
        format_hms(report.total_secs)
    );
    println!(
        "Productive time: {} ({:.1}%)",
        format_hms(report.productive_secs),
        report.productive_pct
    );
    println!(
        "Distracted time: {} ({:.1}%)",
        format_hms(report.distracted_secs),
        report.distracted_pct
    );

    if report.top_apps.is_empty() {
        println!("\nNo application usage recorded.");
        return;
    }

    let rows: Vec<AppRow> = report
        .top_apps
        .iter()
        .map(|usage| AppRow {
            app: usage.app.clone(),
            time: format_hms(usage.seconds),
        })
        .collect();

    println!("\nMost used applications:");
    println!("{}", Table::new(rows));
}
