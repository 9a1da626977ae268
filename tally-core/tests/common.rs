#![allow(dead_code)]

use tally_core::{AliasDirectory, parse_summary, plan_ingest};
use tally_types::{Alias, MemberName, ResultRow};

/// Summaries as posted by the results bot over one week
pub const CAPTURED_SUMMARIES: [&str; 6] = [
    "Your group is on a 1 day streak! 🔥 Here are yesterday's results:
👑 4/6: @jiunee
5/6: @jiawen @ploopy
6/6: @Zahir Hassan",
    "Your group is on a 2 day streak! 🔥 Here are yesterday's results:
👑 3/6: @anika
4/6: @jiawen
5/6: @bonsen @zahir
X/6: @jiunee",
    "Your group is on a 3 day streak! 🔥 Here are yesterday's results:
👑 3/6: @anika
4/6: @jiawen
6/6: @jiunee",
    "Your group is on a 4 day streak! 🔥 Here are yesterday's results:
👑 3/6: @jiawen @bonnie
4/6: @anika
5/6: @jiunee",
    "Your group is on a 5 day streak! 🔥 Here are yesterday's results:
👑 3/6: @bonsen @anika @jiunee @jiawen",
    "Your group is on a 6 day streak! 🔥 Here are yesterday's results:
👑 2/6: @jiawen
3/6: @anika @bonsen
5/6: @jiunee",
];

/// Creates an alias directory covering every handle in the captured summaries
pub fn create_test_directory() -> AliasDirectory {
    let aliases = [
        ("@jiunee", "1001"),
        ("@jiawen", "1002"),
        ("@ploopy", "1003"),
        ("@zahir hassan", "1004"),
        ("@anika", "1005"),
    ]
    .into_iter()
    .map(|(handle, user_id)| Alias {
        handle: handle.to_string(),
        user_id: user_id.to_string(),
    });

    let members = [("1006", "Bonsen"), ("1007", "Bonnie")]
        .into_iter()
        .map(|(user_id, display_name)| MemberName {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
        });

    AliasDirectory::build(aliases, members)
}

/// Date for the n-th captured summary
pub fn day(index: usize) -> String {
    format!("2024-06-{:02}", index + 1)
}

/// Parses and resolves every captured summary, as an in-memory store would
/// hold them after upserting
pub fn ingest_captured(directory: &AliasDirectory) -> Vec<ResultRow> {
    let mut stored: Vec<ResultRow> = Vec::new();

    for (index, raw) in CAPTURED_SUMMARIES.iter().enumerate() {
        let message = parse_summary(raw).expect("captured summary parses");
        let plan = plan_ingest(&message, raw, &day(index), directory);
        for row in plan.rows {
            upsert(&mut stored, row);
        }
    }

    stored
}

/// Latest write wins per (user, date)
pub fn upsert(stored: &mut Vec<ResultRow>, row: ResultRow) {
    match stored
        .iter_mut()
        .find(|existing| existing.user_id == row.user_id && existing.date_iso == row.date_iso)
    {
        Some(existing) => *existing = row,
        None => stored.push(row),
    }
}
