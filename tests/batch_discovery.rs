use assert_fs::prelude::*;
use assert_fs::TempDir;
use std::path::{Path, PathBuf};

use vidsub::config::Config;
use vidsub::workflow::find_videos;

// Only test in this binary: it changes the process working directory.
#[test]
fn batch_from_current_dir_skips_default_workspace_and_output() {
    let temp = TempDir::new().unwrap();
    temp.child("talk.mp4").touch().unwrap();
    temp.child(".vidsub/workspace/talk.mp4").touch().unwrap();
    temp.child(".vidsub/output/talk/translated_talk.mp4").touch().unwrap();

    std::env::set_current_dir(temp.path()).unwrap();

    let config = Config::default();
    let videos = find_videos(
        Path::new("."),
        &[config.workspace.dir.as_path(), config.workspace.output_dir.as_path()],
    );
    assert_eq!(videos, vec![PathBuf::from("./talk.mp4")]);
}
