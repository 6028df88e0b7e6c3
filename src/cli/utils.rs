use serde_json::json;

use crate::backup::BackupRecord;
use crate::cli::OutputFormat;
use crate::gateway::Envelope;

/// Print an action result. An error envelope also fails the process.
pub fn output_envelope(output_format: &OutputFormat, envelope: &Envelope) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(envelope)?);
        }
        OutputFormat::Text if envelope.is_success() => {
            println!("✓ {}", envelope.message);
            if let Some(file) = envelope.payload.get("file").and_then(|f| f.as_str()) {
                println!("  {}", file);
            }
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", envelope.message);
            if let Some(detail) = envelope.payload.get("error").and_then(|e| e.as_str()) {
                eprintln!("  {}", detail);
            }
            for (field, message) in envelope.errors.iter().flatten() {
                eprintln!("  {}: {}", field, message);
            }
        }
    }

    if envelope.is_success() {
        Ok(())
    } else {
        anyhow::bail!("{} action failed", envelope.context)
    }
}

/// Print the backup listing
pub fn output_records(output_format: &OutputFormat, records: &[BackupRecord]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "backups": records }))?);
        }
        OutputFormat::Text if records.is_empty() => {
            println!("No backups found");
        }
        OutputFormat::Text => {
            println!("{:<50} {:>12}  {}", "FILE", "SIZE", "CREATED");
            for record in records {
                println!(
                    "{:<50} {:>12}  {}",
                    record.filename,
                    human_size(record.size_bytes),
                    record.created_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
    }
    Ok(())
}

pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sizes() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(5 * 1024 * 1024 + 1), "5.0 MB");
    }
}
