mod common;

use assert_fs::TempDir;
use assert_fs::fixture::{FileWriteStr, PathChild};
use grit::areas::repository::Repository;
use grit::errors::Error;
use pretty_assertions::assert_eq;
use std::path::Path;

#[test]
fn first_commit_is_a_root_commit() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    dir.child("readme.md").write_str("hello")?;

    let mut repository = Repository::init(dir.path())?;
    repository.add(&[Path::new("readme.md")])?;
    let summary = repository.commit(common::fixed_author(), "first")?;

    assert!(summary.is_root);
    assert_eq!(summary.branch.as_ref(), "main");

    let commit = repository
        .database()
        .parse_object_as_commit(&summary.oid)?
        .expect("commit object");
    assert_eq!(commit.parent(), None);
    assert_eq!(commit.message(), "first");
    assert_eq!(commit.author(), &common::fixed_author());
    Ok(())
}

#[test]
fn committing_twice_chains_the_parents() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    dir.child("file.txt").write_str("one")?;

    let mut repository = Repository::init(dir.path())?;
    repository.add(&[Path::new("file.txt")])?;
    let first = repository.commit(common::fixed_author(), "first")?;

    dir.child("file.txt").write_str("two")?;
    repository.add(&[Path::new("file.txt")])?;
    let second = repository.commit(common::fixed_author(), "second")?;

    assert!(!second.is_root);

    let commit = repository
        .database()
        .parse_object_as_commit(&second.oid)?
        .expect("second commit");
    assert_eq!(commit.parent(), Some(&first.oid));

    // the branch ref now holds the second commit
    let tip = repository.refs().tip_of(&second.branch)?;
    assert_eq!(tip, Some(second.oid.clone()));

    // HEAD itself still points at the branch, not a commit
    let head = std::fs::read_to_string(dir.path().join(".git/HEAD"))?;
    assert_eq!(head, "ref: refs/heads/main\n");
    Ok(())
}

#[test]
fn commit_without_a_symbolic_head_fails() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    dir.child("file.txt").write_str("content")?;

    let mut repository = Repository::init(dir.path())?;
    repository.add(&[Path::new("file.txt")])?;
    std::fs::remove_file(dir.path().join(".git/HEAD"))?;

    assert!(matches!(
        repository.commit(common::fixed_author(), "doomed"),
        Err(Error::NoBranchHead)
    ));
    Ok(())
}

#[test]
fn identical_snapshots_share_their_tree() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    dir.child("stable.txt").write_str("unchanged")?;

    let mut repository = Repository::init(dir.path())?;
    repository.add(&[Path::new("stable.txt")])?;
    let first = repository.commit(common::fixed_author(), "first")?;
    let second = repository.commit(common::fixed_author(), "amend-like")?;

    let first_commit = repository
        .database()
        .parse_object_as_commit(&first.oid)?
        .expect("first commit");
    let second_commit = repository
        .database()
        .parse_object_as_commit(&second.oid)?
        .expect("second commit");

    // same staged content, same tree; the commits differ by parentage
    assert_eq!(first_commit.tree_oid(), second_commit.tree_oid());
    assert_ne!(first.oid, second.oid);
    Ok(())
}

#[test]
fn open_rejects_a_directory_without_the_marker() -> anyhow::Result<()> {
    let dir = TempDir::new()?;

    assert!(matches!(
        Repository::open(dir.path()),
        Err(Error::NotARepository(_))
    ));

    Repository::init(dir.path())?;
    assert!(Repository::open(dir.path()).is_ok());
    Ok(())
}

#[test]
fn init_refuses_an_existing_repository() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    Repository::init(dir.path())?;

    assert!(Repository::init(dir.path()).is_err());
    Ok(())
}
