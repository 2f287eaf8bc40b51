//! Selection of the "own" frame of a memory-error stack trace.
//!
//! A memory error carries a stack, innermost frame first, that usually starts
//! in the allocator or libc. The violation is attributed to the project frame
//! nearest the bottom of the scan: frames are walked top-to-bottom and the
//! last one that belongs to the project wins.

use crate::path::comparable_path;
use crate::record::Frame;
use std::path::Path;

/// Pick the last frame whose path lies under `base_dir`. Frames and base are
/// compared canonically when they exist on disk.
pub fn select_own_frame<'a>(frames: &'a [Frame], base_dir: &Path) -> Option<&'a Frame> {
    let base = comparable_path(base_dir);
    select_own_frame_by(frames, |path| comparable_path(path).starts_with(&base))
}

/// Same as [`select_own_frame`] with a caller-supplied ownership test.
///
/// Only frames with an absolute source path and a line number are
/// candidates; frames without debug info can never be attributed.
pub fn select_own_frame_by<'a, F>(frames: &'a [Frame], is_own: F) -> Option<&'a Frame>
where
    F: Fn(&Path) -> bool,
{
    let mut selected = None;
    for frame in frames {
        let (Some(path), Some(_)) = (frame.path.as_deref(), frame.line) else {
            continue;
        };
        if path.is_absolute() && is_own(path) {
            selected = Some(frame);
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_project_frame_wins() {
        let frames = vec![
            Frame::located("/lib/x.c", 1),
            Frame::located("/proj/y.c", 2),
            Frame::located("/proj/z.c", 3),
        ];
        let frame = select_own_frame(&frames, Path::new("/proj")).unwrap();
        assert_eq!(frame.path.as_deref(), Some(Path::new("/proj/z.c")));
    }

    #[test]
    fn no_project_frame_selects_nothing() {
        let frames = vec![
            Frame::located("/usr/lib/libc.so", 10),
            Frame::located("/proj-extra/a.c", 11),
        ];
        assert!(select_own_frame(&frames, Path::new("/proj")).is_none());
    }

    #[test]
    fn frames_without_debug_info_are_skipped() {
        let frames = vec![
            Frame::located("/proj/a.c", 4),
            Frame {
                function: Some("main".to_string()),
                object: Some("/proj/bin/app".to_string()),
                ..Default::default()
            },
            Frame {
                path: Some("/proj/b.c".into()),
                line: None,
                ..Default::default()
            },
        ];
        let frame = select_own_frame(&frames, Path::new("/proj")).unwrap();
        assert_eq!(frame.line, Some(4));
    }

    #[cfg(unix)]
    #[test]
    fn frame_reached_through_symlink_is_own() {
        let project = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        std::fs::write(project.path().join("y.c"), "").unwrap();
        let link = elsewhere.path().join("src");
        std::os::unix::fs::symlink(project.path(), &link).unwrap();

        let frames = vec![
            Frame::located("/usr/lib/libc.so.6", 1),
            Frame::located(link.join("y.c"), 7),
        ];
        let frame = select_own_frame(&frames, project.path()).unwrap();
        assert_eq!(frame.line, Some(7));
    }

    #[test]
    fn relative_frame_paths_never_qualify() {
        let frames = vec![Frame::located("src/a.c", 4)];
        assert!(select_own_frame_by(&frames, |_| true).is_none());
    }
}
