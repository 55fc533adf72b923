//! Commit object
//!
//! A commit pins a tree (the directory snapshot), the commit it grew out
//! of, who wrote it and when, and the message.
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>          (absent for the root commit)
//! author <name> <email> <timestamp> <zone-offset>
//! committer <name> <email> <timestamp> <zone-offset>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::io::{BufRead, Write};

/// Author or committer identity with its clock reading.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    /// Identity stamped with the current local time.
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// Identity from `GIT_AUTHOR_NAME`, `GIT_AUTHOR_EMAIL` and (optionally)
    /// `GIT_AUTHOR_DATE`; the clock is read once when the date is unset.
    pub fn load_from_env() -> Result<Self> {
        let name = std::env::var("GIT_AUTHOR_NAME").map_err(|_| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "GIT_AUTHOR_NAME not set",
            ))
        })?;
        let email = std::env::var("GIT_AUTHOR_EMAIL").map_err(|_| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "GIT_AUTHOR_EMAIL not set",
            ))
        })?;
        let timestamp = std::env::var("GIT_AUTHOR_DATE").ok().and_then(|date| {
            chrono::DateTime::parse_from_rfc2822(&date)
                .or_else(|_| chrono::DateTime::parse_from_str(&date, "%Y-%m-%d %H:%M:%S %z"))
                .ok()
        });

        match timestamp {
            Some(timestamp) => Ok(Author::new_with_timestamp(name, email, timestamp)),
            None => Ok(Author::new(name, email)),
        }
    }

    /// The serialized form: `name <email> <unix-seconds> <zone-offset>`.
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    pub fn timestamp(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        let malformed =
            || Error::CorruptObject(format!("invalid author line {value:?}"));

        // split from the right: zone offset, timestamp, then "name <email>"
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(malformed());
        }

        let zone = parts[0];
        let seconds = parts[1];
        let name_email = parts[2];

        let email_start = name_email.find('<').ok_or_else(malformed)?;
        let email_end = name_email.find('>').ok_or_else(malformed)?;
        let name = name_email[..email_start].trim().to_string();
        let email = name_email[email_start + 1..email_end].to_string();

        let timestamp =
            chrono::DateTime::parse_from_str(&format!("{seconds} {zone}"), "%s %z")
                .map_err(|_| malformed())?;

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

/// Snapshot metadata referencing a tree and, unless this is the root
/// commit, the commit it was built on.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    parent: Option<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    /// The author is also recorded as the committer, sharing one clock
    /// reading.
    pub fn new(
        parent: Option<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        message: String,
    ) -> Self {
        Commit {
            parent,
            tree_oid,
            committer: author.clone(),
            author,
            message,
        }
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Packable for Commit {
    fn serialize(&self) -> Result<Bytes> {
        let mut lines = vec![format!("tree {}", self.tree_oid.as_ref())];
        if let Some(parent) = &self.parent {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.to_string());

        let mut content_bytes = Vec::new();
        content_bytes.write_all(lines.join("\n").as_bytes())?;
        content_bytes.push(b'\n');

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> Result<Self> {
        let content = reader
            .bytes()
            .collect::<std::result::Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)
            .map_err(|_| Error::CorruptObject("commit body is not valid UTF-8".to_string()))?;

        let mut lines = content.lines();
        let missing = |what: &str| Error::CorruptObject(format!("missing {what} line"));

        let tree_oid = lines
            .next()
            .and_then(|line| line.strip_prefix("tree "))
            .ok_or_else(|| missing("tree"))?;
        let tree_oid = ObjectId::try_parse(tree_oid.to_string())?;

        let mut next_line = lines.next().ok_or_else(|| missing("author"))?;
        let parent = match next_line.strip_prefix("parent ") {
            Some(parent) => {
                next_line = lines.next().ok_or_else(|| missing("author"))?;
                Some(ObjectId::try_parse(parent.to_string())?)
            }
            None => None,
        };

        let author = next_line
            .strip_prefix("author ")
            .ok_or_else(|| missing("author"))?;
        let author = Author::try_from(author)?;

        let committer = lines
            .next()
            .and_then(|line| line.strip_prefix("committer "))
            .ok_or_else(|| missing("committer"))?;
        let _committer = Author::try_from(committer)?;

        // the blank separator line
        lines.next();

        let message = lines.collect::<Vec<&str>>().join("\n");
        Ok(Self::new(parent, tree_oid, author, message))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
