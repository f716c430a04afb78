use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use commentpp::{
    error::{ErrorKind, StructureError},
    preprocessor::{
        config::Config,
        pipeline::{Preprocessor, RunSummary},
    },
};
use tempfile::TempDir;
use walkdir::WalkDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn config(source: &Path, destination: &Path) -> Config {
    Config { source_directories: vec![source.to_path_buf()],
             destination: destination.to_path_buf(),
             ..Config::default() }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap_or_else(|e| panic!("Failed to create {parent:?}: {e}"));
    }
    fs::write(&path, content).unwrap_or_else(|e| panic!("Failed to write {path:?}: {e}"));
}

fn read(root: &Path, relative: &str) -> String {
    let path = root.join(relative);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"))
}

fn files_below(root: &Path) -> BTreeSet<String> {
    WalkDir::new(root).into_iter()
                      .filter_map(Result::ok)
                      .filter(|e| e.file_type().is_file())
                      .map(|e| {
                          e.path()
                           .strip_prefix(root)
                           .unwrap_or_else(|_| e.path())
                           .to_string_lossy()
                           .replace('\\', "/")
                      })
                      .collect()
}

#[test]
fn fixture_project() {
    let destination = TempDir::new().unwrap();
    let mut preprocessor = Preprocessor::new(config(&fixture("project"), destination.path()));

    let summary = preprocessor.run().unwrap_or_else(|e| panic!("Run failed: {e}"));

    assert_eq!(summary,
               RunSummary { processed: 3,
                            excluded:  2,
                            copied:    1, });
    assert_eq!(files_below(destination.path()),
               ["src/Main.java", "src/Settings.java", "src/notes.md", "src/parts/footer.txt"].into_iter()
                                                                                          .map(String::from)
                                                                                          .collect());
    assert_eq!(read(destination.path(), "src/Main.java"),
               "package demo;\nclass Main { String v = \"3\"; }\n// footer 3\n");
    assert_eq!(read(destination.path(), "src/parts/footer.txt"), "// footer 3\n");
    assert_eq!(read(destination.path(), "src/Settings.java"), "class Settings {}\n");
    assert_eq!(read(destination.path(), "src/notes.md"), "# Notes\n//#if nothing\n");
}

#[test]
fn exclusion_sees_globals_defined_later() {
    let source = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    write(source.path(), "a.txt", "//#excludeif flag\nA\n");
    write(source.path(), "z.txt", "//#global flag = strlen(\"abc\") == 3\nZ\n");

    let summary = Preprocessor::new(config(source.path(), destination.path())).run()
                                                                             .unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(files_below(destination.path()),
               BTreeSet::from(["z.txt".to_string()]));
}

#[test]
fn failing_file_writes_nothing() {
    let source = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    write(source.path(), "a.txt", "fine\n");
    write(source.path(), "b.txt", "//#if true\nbroken\n");

    let error = Preprocessor::new(config(source.path(), destination.path())).run()
                                                                           .unwrap_err();

    assert!(matches!(error.kind,
                     ErrorKind::Structure(StructureError::UnclosedBlock { .. })));
    assert_eq!(error.file.as_deref(), Some(source.path().join("b.txt").as_path()));
    assert!(destination.path().join("a.txt").exists());
    assert!(!destination.path().join("b.txt").exists());
}

#[test]
fn include_cycle_is_an_error() {
    let source = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    write(source.path(), "a.txt", "//#include \"b.txt\"\n");
    write(source.path(), "b.txt", "b\n//#include \"a.txt\"\n");

    let error = Preprocessor::new(config(source.path(), destination.path())).run()
                                                                           .unwrap_err();

    assert!(matches!(error.kind,
                     ErrorKind::Structure(StructureError::IncludeCycle { .. })));
    assert_eq!(error.line, Some(2));
    assert_eq!(error.include_stack.len(), 1);
    assert_eq!(error.include_stack[0].line, 1);
    assert!(error.to_string().contains("included from"), "{error}");
}

#[test]
fn included_file_must_close_its_blocks() {
    let source = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    write(source.path(), "main.txt", "//#if true\n//#include \"part.inc\"\n//#endif\n");
    write(source.path(), "part.inc", "//#if true\n");

    let error = Preprocessor::new(config(source.path(), destination.path())).run()
                                                                           .unwrap_err();

    assert!(matches!(error.kind,
                     ErrorKind::Structure(StructureError::UnclosedBlock { line: 1, .. })));
    assert_eq!(error.file.as_deref(), Some(source.path().join("part.inc").as_path()));
}

#[test]
fn included_text_shares_locals() {
    let source = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    write(source.path(), "main.txt", "//#local who=\"inner\"\nbefore\n//#include \"part.inc\"\nafter\n");
    write(source.path(), "part.inc", "hello /*$who$*/ from /*$__filename__$*/:/*$__line__$*/\n");

    Preprocessor::new(config(source.path(), destination.path())).run()
                                                                .unwrap();

    assert_eq!(read(destination.path(), "main.txt"),
               "before\nhello inner from part.inc:1\nafter\n");
    assert_eq!(read(destination.path(), "part.inc"),
               "hello /*$who$*/ from /*$__filename__$*/:/*$__line__$*/\n");
}

#[test]
fn configuration_files_and_definitions() {
    let source = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let settings = TempDir::new().unwrap();
    write(settings.path(), "build.cfg", "# levels\nlevel = 2\n\nlabel = \"L\" + level\n");
    write(source.path(), "a.txt", "//#if level == 2\n/*$label$*/ /*$name$*/\n//#endif\n");

    let config = Config { config_files: vec![settings.path().join("build.cfg")],
                          ..config(source.path(), destination.path()) };
    let mut preprocessor = Preprocessor::new(config);
    preprocessor.define("Name=\"cli\"").unwrap();
    preprocessor.run().unwrap();

    assert_eq!(read(destination.path(), "a.txt"), "L2 cli\n");
}

#[test]
fn invalid_configuration_line() {
    let source = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    let settings = TempDir::new().unwrap();
    write(settings.path(), "build.cfg", "level = 2\nnonsense\n");

    let config = Config { config_files: vec![settings.path().join("build.cfg")],
                          ..config(source.path(), destination.path()) };
    let error = Preprocessor::new(config).run().unwrap_err();

    assert!(matches!(error.kind, ErrorKind::Config { .. }));
    assert_eq!(error.line, Some(2));
    assert!(Preprocessor::new(Config::default()).define("1x=2").is_err());
}

#[test]
fn clear_destination_removes_stale_files() {
    let source = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    write(source.path(), "a.txt", "A\n");
    write(destination.path(), "stale.txt", "old\n");

    let config = Config { clear_destination: true,
                          ..config(source.path(), destination.path()) };
    Preprocessor::new(config).run().unwrap();

    assert_eq!(files_below(destination.path()),
               BTreeSet::from(["a.txt".to_string()]));
}

#[test]
fn disabled_output_writes_nothing() {
    let source = TempDir::new().unwrap();
    let parent = TempDir::new().unwrap();
    let destination = parent.path().join("out");
    write(source.path(), "a.txt", "A\n");
    write(source.path(), "b.bin", "B");

    let config = Config { disable_output: true,
                          ..config(source.path(), &destination) };
    let summary = Preprocessor::new(config).run().unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.copied, 1);
    assert!(!destination.exists());
}

#[test]
fn destination_inside_source_is_skipped() {
    let source = TempDir::new().unwrap();
    let destination = source.path().join("out");
    write(source.path(), "a.txt", "A\n");

    for _ in 0..2 {
        let summary = Preprocessor::new(config(source.path(), &destination)).run()
                                                                            .unwrap();
        assert_eq!(summary.processed, 1);
    }
    assert!(!destination.join("out").exists());
}
