// SPDX-FileCopyrightText: 2026 Kibitz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kibitz groups` command implementation.

use std::fmt::Write as _;

use kibitz_config::KibitzConfig;
use kibitz_core::{GroupInfo, KibitzError};
use kibitz_groupme::GroupMePlatform;

/// One line per group; the configured group is marked with `*`.
pub fn format_groups(groups: &[GroupInfo], current: Option<&str>) -> String {
    if groups.is_empty() {
        return "no groups found for this account\n".to_string();
    }
    let id_width = groups.iter().map(|g| g.id.len()).max().unwrap_or(0);
    let mut out = String::new();
    for group in groups {
        let marker = if current == Some(group.id.as_str()) { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {:<id_width$}  {} ({} members)",
            group.id, group.name, group.member_count
        );
    }
    out
}

pub async fn run_groups(config: &KibitzConfig) -> Result<(), KibitzError> {
    let platform = GroupMePlatform::new(&config.groupme)?;
    let groups = platform.list_groups().await?;
    print!("{}", format_groups(&groups, config.groupme.group_id.as_deref()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: &str, name: &str, members: usize) -> GroupInfo {
        GroupInfo {
            id: id.into(),
            name: name.into(),
            member_count: members,
        }
    }

    #[test]
    fn marks_configured_group() {
        let groups = vec![group("1", "Family", 4), group("22", "Work", 10)];
        let out = format_groups(&groups, Some("22"));
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "  1   Family (4 members)");
        assert_eq!(lines[1], "* 22  Work (10 members)");
    }

    #[test]
    fn empty_account() {
        assert!(format_groups(&[], None).contains("no groups"));
    }
}
