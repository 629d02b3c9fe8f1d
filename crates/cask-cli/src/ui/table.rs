//! Column-aligned tables for `cask list` and `cask livecheck`.

use cask_core::host::InstallRecord;
use cask_core::livecheck::DiscoveredVersion;
use comfy_table::presets::NOTHING;
use comfy_table::{Cell, Color, ContentArrangement, Table};

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(|h| Cell::new(h).fg(Color::DarkGrey)));
    table
}

fn install_date(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .unwrap_or_default()
        .format("%Y-%m-%d")
        .to_string()
}

/// Installed casks, one row per record.
pub fn installed(records: &[InstallRecord]) -> Table {
    let mut table = table(&["name", "version", "arch", "installed"]);
    for rec in records {
        table.add_row(vec![
            Cell::new(&rec.name).fg(Color::Cyan),
            Cell::new(&rec.version),
            Cell::new(&rec.arch).fg(Color::DarkGrey),
            Cell::new(install_date(rec.installed_at)).fg(Color::DarkGrey),
        ]);
    }
    table
}

/// Versions found by a livecheck, in listing order.
pub fn discovered(entries: &[DiscoveredVersion], latest: Option<&str>) -> Table {
    let mut table = table(&["version", "status"]);
    for entry in entries {
        let (status, color) = if entry.draft {
            ("draft", Color::DarkGrey)
        } else if !entry.candidate {
            ("filtered", Color::DarkGrey)
        } else if latest == Some(entry.version.as_str()) {
            ("latest", Color::Green)
        } else {
            ("", Color::Reset)
        };
        table.add_row(vec![
            Cell::new(&entry.version),
            Cell::new(status).fg(color),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use cask_core::types::{PackageName, Version};

    #[test]
    fn installed_table_lists_every_record() {
        let records = vec![InstallRecord {
            name: PackageName::new("opencloud"),
            version: Version::from("1.0.0-rc.1"),
            arch: "arm".to_string(),
            sha256: "00".repeat(32),
            installed_at: 0,
        }];
        let rendered = installed(&records).to_string();
        assert!(rendered.contains("opencloud"));
        assert!(rendered.contains("1.0.0-rc.1"));
        assert!(rendered.contains("1970-01-01"));
    }

    #[test]
    fn discovered_table_marks_latest_and_drafts() {
        let entries = vec![
            DiscoveredVersion {
                version: Version::from("1.1.0"),
                draft: false,
                candidate: true,
            },
            DiscoveredVersion {
                version: Version::from("2.0.0"),
                draft: true,
                candidate: false,
            },
        ];
        let rendered = discovered(&entries, Some("1.1.0")).to_string();
        assert!(rendered.contains("latest"));
        assert!(rendered.contains("draft"));
    }
}
