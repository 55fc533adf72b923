#![allow(dead_code)]

use grit::areas::database::Database;
use grit::artifacts::objects::commit::Author;
use grit::artifacts::objects::object_id::ObjectId;
use grit::artifacts::objects::object_type::ObjectType;

/// Deterministic author so commit ids are stable across runs.
pub fn fixed_author() -> Author {
    let timestamp = chrono::DateTime::parse_from_rfc3339("2024-03-01T12:30:00+02:00")
        .expect("valid fixture timestamp");
    Author::new_with_timestamp(
        "Ada Lovelace".to_string(),
        "ada@example.com".to_string(),
        timestamp,
    )
}

/// Count the objects physically present in the database, by kind:
/// `(blobs, trees, commits)`.
pub fn object_census(database: &Database) -> anyhow::Result<(usize, usize, usize)> {
    let mut blobs = 0;
    let mut trees = 0;
    let mut commits = 0;

    for oid in list_object_ids(database)? {
        match database.object_type(&oid)? {
            ObjectType::Blob => blobs += 1,
            ObjectType::Tree => trees += 1,
            ObjectType::Commit => commits += 1,
        }
    }

    Ok((blobs, trees, commits))
}

/// Every object id present under the two-level objects directory.
pub fn list_object_ids(database: &Database) -> anyhow::Result<Vec<ObjectId>> {
    let mut ids = Vec::new();

    for fanout in std::fs::read_dir(database.objects_path())? {
        let fanout = fanout?;
        if !fanout.file_type()?.is_dir() {
            continue;
        }
        let prefix = fanout.file_name().to_string_lossy().to_string();

        for object_file in std::fs::read_dir(fanout.path())? {
            let rest = object_file?.file_name().to_string_lossy().to_string();
            ids.push(ObjectId::try_parse(format!("{prefix}{rest}"))?);
        }
    }

    Ok(ids)
}
