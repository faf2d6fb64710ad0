//! Turn a group directory into a destination path and a go/skip decision.

use std::path::{Path, PathBuf};

use fg_core::config::LayoutConfig;
use fg_core::Descriptor;

/// Where one group's output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// The descriptor the names were taken from.
    pub descriptor: PathBuf,
    /// `<output_root>/<group dir>/<stem>.mp4`.
    pub destination: PathBuf,
    /// Output file stem, used in progress lines.
    pub name: String,
}

/// Outcome of resolving a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Destination is free; mux it.
    Proceed(Target),
    /// Destination exists; skip without invoking ffmpeg.
    AlreadyExists(Target),
    /// The directory no longer holds a descriptor.
    NoDescriptor,
}

/// Resolve `group_dir` against `output_root`.
///
/// When the directory holds several descriptors, the first by file name is
/// used and the rest are ignored. Has no side effects.
///
/// # Errors
///
/// Listing the directory or reading/parsing the chosen descriptor failed.
pub fn resolve_group(
    group_dir: &Path,
    output_root: &Path,
    layout: &LayoutConfig,
) -> fg_core::Result<Resolution> {
    let Some(descriptor_path) = first_descriptor(group_dir, layout)? else {
        return Ok(Resolution::NoDescriptor);
    };

    let descriptor = Descriptor::load(&descriptor_path)?;
    let name = descriptor.file_stem();
    let destination = output_root
        .join(descriptor.group_dir_name())
        .join(format!("{name}.mp4"));

    let target = Target {
        descriptor: descriptor_path,
        destination,
        name,
    };

    if target.destination.exists() {
        Ok(Resolution::AlreadyExists(target))
    } else {
        Ok(Resolution::Proceed(target))
    }
}

fn first_descriptor(dir: &Path, layout: &LayoutConfig) -> fg_core::Result<Option<PathBuf>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file() && layout.is_descriptor(&path) {
            found.push(path);
        }
    }
    Ok(found.into_iter().min_by(|a, b| a.file_name().cmp(&b.file_name())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Fixture {
        _tmp: tempfile::TempDir,
        group: PathBuf,
        out: PathBuf,
    }

    fn fixture(descriptor: &str) -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let group = tmp.path().join("g");
        fs::create_dir_all(&group).unwrap();
        fs::write(group.join("entry.json"), descriptor).unwrap();
        let out = tmp.path().join("processed_videos");
        Fixture {
            _tmp: tmp,
            group,
            out,
        }
    }

    #[test]
    fn proceeds_with_destination() {
        let f = fixture(r#"{"groupTitle":"Show","title":"Ep1"}"#);
        let res = resolve_group(&f.group, &f.out, &LayoutConfig::default()).unwrap();
        match res {
            Resolution::Proceed(t) => {
                assert_eq!(t.destination, f.out.join("Show").join("Ep1.mp4"));
                assert_eq!(t.name, "Ep1");
                assert_eq!(t.descriptor, f.group.join("entry.json"));
            }
            other => panic!("unexpected resolution: {other:?}"),
        }
    }

    #[test]
    fn part_prefix_in_destination() {
        let f = fixture(r#"{"groupTitle":"Show","title":"Ep2","p":2}"#);
        let res = resolve_group(&f.group, &f.out, &LayoutConfig::default()).unwrap();
        let Resolution::Proceed(t) = res else {
            panic!("expected Proceed");
        };
        assert_eq!(t.destination, f.out.join("Show").join("[2]Ep2.mp4"));
    }

    #[test]
    fn existing_output_is_already_exists() {
        let f = fixture(r#"{"groupTitle":"Show","title":"Ep1"}"#);
        fs::create_dir_all(f.out.join("Show")).unwrap();
        fs::write(f.out.join("Show").join("Ep1.mp4"), b"done").unwrap();

        let res = resolve_group(&f.group, &f.out, &LayoutConfig::default()).unwrap();
        assert!(matches!(res, Resolution::AlreadyExists(_)));
    }

    #[test]
    fn first_descriptor_by_name_wins() {
        let f = fixture(r#"{"groupTitle":"Later","title":"B"}"#);
        fs::write(f.group.join("a.json"), r#"{"groupTitle":"First","title":"A"}"#).unwrap();

        let res = resolve_group(&f.group, &f.out, &LayoutConfig::default()).unwrap();
        let Resolution::Proceed(t) = res else {
            panic!("expected Proceed");
        };
        assert_eq!(t.destination, f.out.join("First").join("A.mp4"));
    }

    #[test]
    fn missing_descriptor() {
        let f = fixture("{}");
        fs::remove_file(f.group.join("entry.json")).unwrap();

        let res = resolve_group(&f.group, &f.out, &LayoutConfig::default()).unwrap();
        assert_eq!(res, Resolution::NoDescriptor);
    }

    #[test]
    fn unparsable_descriptor_is_error() {
        let f = fixture("{ broken");
        let err = resolve_group(&f.group, &f.out, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(err, fg_core::Error::Json { .. }));
    }

    #[test]
    fn does_not_create_directories() {
        let f = fixture(r#"{"groupTitle":"Show","title":"Ep1"}"#);
        resolve_group(&f.group, &f.out, &LayoutConfig::default()).unwrap();
        assert!(!f.out.exists());
    }
}
