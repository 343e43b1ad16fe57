use std::io::Read;
use tabconv::io::archive::base_name;
use tabconv::testing::*;
use tabconv::{ConvertError, TarArchive};

#[test]
fn lists_csv_members_sorted_and_skips_directories() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("mixed.tar.gz");
    build_tar_entries(
        &path,
        &[
            TarEntry::File("zeta.csv", b"a\n1\n"),
            TarEntry::Dir("sub/"),
            TarEntry::File("sub/beta.CSV", b"a\n2\n"),
            TarEntry::File("notes.txt", b"hello"),
            TarEntry::Dir("folder.csv/"),
            TarEntry::File("alpha.csv", b"a\n3\n"),
        ],
        true,
    )?;

    let archive = TarArchive::open(&path)?;
    assert_eq!(archive.members()?.len(), 6);
    assert_eq!(archive.csv_members()?, ["alpha.csv", "sub/beta.CSV", "zeta.csv"]);
    Ok(())
}

#[test]
fn plain_tar_is_supported() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("plain.tar");
    build_tar(&path, &[("a.csv", b"x\n1\n")])?;

    let archive = TarArchive::open(&path)?;
    assert_eq!(archive.csv_members()?, ["a.csv"]);
    Ok(())
}

#[test]
fn gzip_is_detected_without_extension() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("mislabeled.bin");
    build_tar_gz(&path, &[("a.csv", b"x\n1\n")])?;

    let archive = TarArchive::open(&path)?;
    let body = archive.with_member("a.csv", |r| {
        let mut s = String::new();
        r.read_to_string(&mut s)?;
        Ok(s)
    })?;
    assert_eq!(body, "x\n1\n");
    Ok(())
}

#[test]
fn unknown_member_is_reported() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("a.tar.gz");
    build_tar_gz(&path, &[("a.csv", b"x\n1\n")])?;

    let archive = TarArchive::open(&path)?;
    let err = archive.with_member("b.csv", |_| Ok(())).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConvertError>(),
        Some(ConvertError::MemberNotFound(name)) if name == "b.csv"
    ));
    Ok(())
}

#[test]
fn missing_archive_is_input_not_found() {
    let Err(err) = TarArchive::open("/definitely/not/here.tar.gz") else {
        panic!("expected failure");
    };
    assert!(matches!(
        err.downcast_ref::<ConvertError>(),
        Some(ConvertError::InputNotFound(_))
    ));
}

#[test]
fn base_names() {
    assert_eq!(base_name("a.csv"), "a.csv");
    assert_eq!(base_name("dir/sub/a.csv"), "a.csv");
    assert_eq!(base_name("dir\\a.csv"), "a.csv");
    assert_eq!(base_name("dir/"), "dir");
}

#[test]
fn overlong_fixture_names_are_refused() {
    let tmp = tempfile::tempdir().unwrap();
    let name = format!("{}.csv", "x".repeat(120));
    assert!(build_tar(tmp.path().join("a.tar"), &[(name.as_str(), b"a\n")]).is_err());
}
