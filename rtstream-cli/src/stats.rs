//! Statistics display and formatting

use rtstream_protocol::StatsSnapshot;

/// Format bytes in human-readable form
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a data rate in human-readable form
pub fn format_rate(bytes_per_sec: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    if bytes_per_sec >= MB {
        format!("{:.2} MB/s", bytes_per_sec / MB)
    } else if bytes_per_sec >= KB {
        format!("{:.2} KB/s", bytes_per_sec / KB)
    } else {
        format!("{:.0} B/s", bytes_per_sec)
    }
}

/// One-line reception summary for continuous updates
pub fn format_compact_stats(snapshot: &StatsSnapshot) -> String {
    format!(
        "received: {} | bytes: {} | lost: {} ({:.2}%) | rate: {}",
        snapshot.packets_received,
        format_bytes(snapshot.total_bytes),
        snapshot.lost_packets,
        snapshot.fraction_lost * 100.0,
        format_rate(snapshot.data_rate_bps),
    )
}

/// Multi-line reception summary, shown on request
pub fn display_stats(snapshot: &StatsSnapshot) {
    println!("Total Bytes Received: {}", snapshot.total_bytes);
    println!("Packet Lost Rate: {:.4}", snapshot.fraction_lost);
    println!("Data Rate: {}", format_rate(snapshot.data_rate_bps));
}
