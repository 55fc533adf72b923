use assert_fs::TempDir;
use grit::areas::refs::Refs;
use grit::artifacts::branch::branch_name::BranchName;
use grit::artifacts::objects::object_id::ObjectId;
use grit::errors::Error;
use pretty_assertions::assert_eq;

const TIP: &str = "d670460b4b4aece5915caf5c68d12f560a9fe3e4";
const PACKED_TIP: &str = "0123456789abcdef0123456789abcdef01234567";

fn refs_in(dir: &TempDir) -> Refs {
    Refs::new(dir.path().to_path_buf().into_boxed_path())
}

fn branch(name: &str) -> BranchName {
    BranchName::try_parse(name.to_string()).unwrap()
}

fn oid(hex: &str) -> ObjectId {
    ObjectId::try_parse(hex.to_string()).unwrap()
}

#[test]
fn head_branch_reads_the_symbolic_form() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let refs = refs_in(&dir);

    refs.init_head(&branch("main"))?;
    assert_eq!(refs.head_branch()?, branch("main"));
    Ok(())
}

#[test]
fn missing_head_is_detached_or_missing() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let refs = refs_in(&dir);

    assert!(matches!(
        refs.head_branch(),
        Err(Error::DetachedOrMissingHead)
    ));
    Ok(())
}

#[test]
fn a_raw_digest_in_head_is_detached() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let refs = refs_in(&dir);

    std::fs::write(dir.path().join("HEAD"), format!("{TIP}\n"))?;
    assert!(matches!(
        refs.head_branch(),
        Err(Error::DetachedOrMissingHead)
    ));
    Ok(())
}

#[test]
fn a_brand_new_branch_has_no_tip() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let refs = refs_in(&dir);

    assert_eq!(refs.tip_of(&branch("main"))?, None);
    Ok(())
}

#[test]
fn set_tip_round_trips_through_the_ref_file() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let refs = refs_in(&dir);

    refs.set_tip(&branch("main"), &oid(TIP))?;
    assert_eq!(refs.tip_of(&branch("main"))?, Some(oid(TIP)));

    let on_disk = std::fs::read_to_string(dir.path().join("refs/heads/main"))?;
    assert_eq!(on_disk.trim(), TIP);
    Ok(())
}

#[test]
fn hierarchical_branch_names_create_their_directories() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let refs = refs_in(&dir);

    let feature = branch("feature/login/oauth");
    refs.set_tip(&feature, &oid(TIP))?;

    assert!(dir.path().join("refs/heads/feature/login").is_dir());
    assert_eq!(refs.tip_of(&feature)?, Some(oid(TIP)));
    Ok(())
}

#[test]
fn packed_refs_serve_as_a_fallback() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let refs = refs_in(&dir);

    std::fs::write(
        dir.path().join("packed-refs"),
        format!(
            "# pack-refs with: peeled fully-peeled sorted\n\
             {PACKED_TIP} refs/heads/archived\n\
             ^{TIP}\n\
             {TIP} refs/heads/main\n"
        ),
    )?;

    assert_eq!(refs.tip_of(&branch("main"))?, Some(oid(TIP)));
    assert_eq!(refs.tip_of(&branch("archived"))?, Some(oid(PACKED_TIP)));
    assert_eq!(refs.tip_of(&branch("absent"))?, None);
    Ok(())
}

#[test]
fn a_direct_ref_file_wins_over_packed_refs() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let refs = refs_in(&dir);

    std::fs::write(
        dir.path().join("packed-refs"),
        format!("{PACKED_TIP} refs/heads/main\n"),
    )?;
    refs.set_tip(&branch("main"), &oid(TIP))?;

    assert_eq!(refs.tip_of(&branch("main"))?, Some(oid(TIP)));
    Ok(())
}
