// tests/load.rs

mod common;

use chrono::{TimeZone, Utc};
use common::Fixture;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use subete::{Error, History, HistoryError, HistoryProvider, Repo, TestStatus};

fn two_languages() -> Fixture {
    let fixture = Fixture::new();
    fixture
        .file("archive/p/python/hello_world.py", "print('Hello, World!')\n")
        .file("archive/p/python/testinfo.yml", "projects:\n  - Hello World\n")
        .file("archive/p/python/README.md", "# Python\n")
        .file("archive/c/c/hello-world.c", "int main() { return 0; }\n");
    fixture
}

fn load(fixture: &Fixture) -> Repo {
    Repo::builder().source_dir(fixture.path()).load().unwrap()
}

#[test]
fn test_two_language_archive() {
    let fixture = two_languages();
    let repo = load(&fixture);

    assert_eq!(repo.total_languages(), 2);
    assert_eq!(repo.total_programs(), 2);
    assert_eq!(repo.total_tests(), 1);
    assert!(!repo.is_managed_clone());

    let names: Vec<&str> = repo.languages().map(|l| l.name()).collect();
    assert_eq!(names, ["C", "Python"]);

    let python = repo.language("Python").unwrap().program("Hello World").unwrap();
    assert!(python.is_tested());
    assert_eq!(python.test_status(), &TestStatus::Tested);

    let c = repo.program("C", "Hello World").unwrap();
    assert!(!c.is_tested());
    assert_eq!(c.test_status(), &TestStatus::NoData);

    let project = repo.project("hello-world").unwrap();
    assert_eq!(project.name(), "Hello World");
    assert_eq!(project.total_programs(), 2);
    assert_eq!(project.program_in("c").unwrap().extension(), ".c");
    assert_eq!(project.program_in("Python").unwrap(), python);
}

#[test]
fn test_unknown_names_are_not_found() {
    let fixture = two_languages();
    let repo = load(&fixture);

    assert!(matches!(repo.language("Cobol"), Err(Error::LanguageNotFound(_))));
    assert!(matches!(repo.project("Quine"), Err(Error::ProjectNotFound(_))));
    assert!(matches!(
        repo.program("Python", "Fizz Buzz"),
        Err(Error::ProjectNotFound(_))
    ));
    // Exact key first, then a case-insensitive fallback
    assert_eq!(repo.language("python").unwrap().name(), "Python");
}

#[test]
fn test_unresolvable_files_are_excluded() {
    let fixture = two_languages();
    fixture
        .file("archive/p/python/Makefile", "all:\n")
        .file("archive/p/python/setup.cfg.py", "\n")
        .file("archive/p/python/.hidden.py", "\n")
        .file("archive/p/python/notes.md", "\n");
    let repo = load(&fixture);

    let python = repo.language("Python").unwrap();
    assert_eq!(python.total_programs(), 1);
    let files: Vec<&str> = python.programs().map(|p| p.file_name()).collect();
    assert_eq!(files, ["hello_world.py"]);
    for project in repo.projects() {
        assert!(project.programs().all(|p| p.file_name() != "setup.cfg.py"));
    }
}

#[test]
fn test_compound_extension() {
    let fixture = Fixture::new();
    fixture.file("archive/t/ti-basic/source.8xp.txt", "Disp \"HI\"\n");
    let repo = load(&fixture);

    let program = repo.program("Ti Basic", "Source").unwrap();
    assert_eq!(program.extension(), ".8xp.txt");
    assert_eq!(program.project_name(), "Source");
}

#[test]
fn test_image_programs() {
    let fixture = Fixture::new();
    fixture.file("archive/p/piet/hello-world.png", "\u{89}PNG");
    let repo = load(&fixture);

    let program = repo.program("Piet", "Hello World").unwrap();
    assert!(program.is_image());
    assert_eq!(program.image_type(), Some(image::ImageFormat::Png));
}

#[test]
fn test_missing_programs_from_catalog_file() {
    let fixture = two_languages();
    fixture.file(
        ".glotter.yml",
        "projects:\n  helloworld:\n    words: [hello, world]\n  quine:\n    words: [quine]\n  baklava:\n    words: [baklava]\n",
    );
    let repo = load(&fixture);

    assert_eq!(repo.total_approved_projects(), 3);
    for language in repo.languages() {
        assert_eq!(language.missing_programs(), ["Baklava", "Quine"]);
        for program in language.programs() {
            assert!(!language.missing_programs().iter().any(|m| m == program.project_name()));
        }
    }
    // Catalog projects exist even without programs
    assert_eq!(repo.project("Quine").unwrap().total_programs(), 0);
}

#[test]
fn test_explicit_project_list_overrides_catalog() {
    let fixture = two_languages();
    fixture.file("archive/p/python/fizz_buzz.py", "\n");
    let repo = Repo::builder()
        .source_dir(fixture.path())
        .projects(["Hello World", "Zeckendorf"])
        .load()
        .unwrap();

    let python = repo.language("Python").unwrap();
    assert_eq!(python.missing_programs(), ["Zeckendorf"]);
    // Not in the master list
    assert!(python.program("Fizz Buzz").is_err());
}

#[test]
fn test_random_program_is_reproducible() {
    let fixture = two_languages();
    fixture
        .file("archive/p/python/quine.py", "\n")
        .file("archive/r/rust/fizz_buzz.rs", "fn main() {}\n");
    let repo = load(&fixture);

    let picks = |seed: u64| -> Vec<PathBuf> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..25)
            .map(|_| repo.random_program(&mut rng).unwrap().path().to_path_buf())
            .collect()
    };
    assert_eq!(picks(7), picks(7));

    let known: Vec<&Path> = repo.languages().flat_map(|l| l.programs()).map(|p| p.path()).collect();
    let mut rng = StdRng::from_entropy();
    for _ in 0..50 {
        let program = repo.random_program(&mut rng).unwrap();
        assert!(known.contains(&program.path()));
        let language = repo.random_language(&mut rng).unwrap();
        assert!(repo.language(language.name()).is_ok());
    }
}

#[test]
fn test_git_history_metadata() {
    let mut fixture = two_languages();
    fixture.git_init();
    fixture.commit("Alice", 1_600_000_000);
    fixture.file("archive/p/python/hello_world.py", "print('Hello, World')\n");
    fixture.commit("Bob", 1_700_000_000);

    let repo = load(&fixture);
    let python = repo.program("Python", "Hello World").unwrap();
    assert_eq!(python.authors().iter().collect::<Vec<_>>(), ["Alice", "Bob"]);
    assert_eq!(python.created().unwrap().timestamp(), 1_600_000_000);
    assert_eq!(python.modified().unwrap().timestamp(), 1_700_000_000);

    let c = repo.program("C", "Hello World").unwrap();
    assert_eq!(c.authors().iter().collect::<Vec<_>>(), ["Alice"]);
    assert_eq!(c.created(), c.modified());
}

#[test]
fn test_history_survives_deleted_archive() {
    let mut fixture = two_languages();
    fixture.git_init();
    fixture.commit("Alice", 1_600_000_000);

    let repo = load(&fixture);
    fixture.delete();

    let program = repo.program("Python", "Hello World").unwrap();
    assert!(program.authors().is_empty());
    assert_eq!(program.created(), None);
    assert_eq!(program.modified(), None);
}

#[derive(Debug)]
struct FailingFor(&'static str);

impl HistoryProvider for FailingFor {
    fn history(&self, path: &Path) -> Result<History, HistoryError> {
        if path.ends_with(self.0) {
            return Err(HistoryError::OutsideRepository {
                path: path.to_path_buf(),
            });
        }
        let mut history = History::default();
        history.authors.insert("Alice".to_string());
        history.created = Utc.timestamp_opt(1_600_000_000, 0).single();
        history.modified = history.created;
        Ok(history)
    }
}

#[test]
fn test_one_failed_lookup_leaves_others_intact() {
    let fixture = two_languages();
    fixture.file("archive/p/python/quine.py", "\n");
    let repo = Repo::builder()
        .source_dir(fixture.path())
        .history_provider(Arc::new(FailingFor("quine.py")))
        .load()
        .unwrap();

    let python = repo.language("Python").unwrap();
    assert_eq!(python.total_programs(), 2);

    let quine = python.program("Quine").unwrap();
    assert!(quine.authors().is_empty());
    assert!(quine.created().is_none());

    let hello = python.program("Hello World").unwrap();
    assert!(hello.authors().contains("Alice"));
    assert!(hello.created().is_some());
}

#[test]
fn test_untestable_language() {
    let fixture = Fixture::new();
    fixture
        .file("archive/m/mathematica/hello-world.nb", "Print[\"Hello\"]\n")
        .file("archive/m/mathematica/testinfo.yml", "untestable: proprietary runtime\n");
    let repo = load(&fixture);

    let program = repo.program("Mathematica", "Hello World").unwrap();
    assert_eq!(
        program.test_status(),
        &TestStatus::Untestable {
            reason: Some("proprietary runtime".to_string())
        }
    );
    assert!(repo.language("Mathematica").unwrap().testinfo().is_untestable());
}

#[test]
fn test_malformed_testinfo_does_not_abort_load() {
    let fixture = two_languages();
    fixture.file("archive/c/c/testinfo.yml", "folder: [broken\n");
    let repo = load(&fixture);

    assert_eq!(repo.total_languages(), 2);
    assert_eq!(repo.program("C", "Hello World").unwrap().test_status(), &TestStatus::NoData);
}

#[test]
fn test_project_documentation() {
    let fixture = two_languages();
    let docs = Fixture::new();
    docs.file("sources/projects/hello-world/description.md", "# Hello World\n")
        .file("sources/projects/hello-world/requirements.md", "Print Hello, World!\n")
        .file("sources/projects/hello_world/description.md", "# Duplicate\n")
        .file("sources/projects/baklava/description.md", "# Baklava\n");

    let repo = Repo::builder()
        .source_dir(fixture.path())
        .docs_dir(docs.path())
        .load()
        .unwrap();

    let project = repo.project("Hello World").unwrap();
    let article = project.docs().unwrap();
    assert_eq!(article.article().unwrap(), "# Hello World\n");
    assert_eq!(article.requirements(), Some("Print Hello, World!\n"));
    assert!(article.authors().is_empty());

    // Without a catalog file the documented projects are the approved ones
    assert_eq!(repo.total_approved_projects(), 2);
    let baklava = repo.project("Baklava").unwrap();
    assert_eq!(baklava.total_programs(), 0);
    assert_eq!(baklava.docs().unwrap().article().unwrap(), "# Baklava\n");
    assert_eq!(repo.language("Python").unwrap().missing_programs(), ["Baklava"]);
}

#[test]
fn test_documented_projects_do_not_exclude_programs() {
    let fixture = Fixture::new();
    fixture.file("archive/f/foo/whatever.foo", "hello\n");
    let docs = Fixture::new();
    docs.file("sources/projects/bad/something.md", "hello\n");

    let repo = Repo::builder()
        .source_dir(fixture.path())
        .docs_dir(docs.path())
        .load()
        .unwrap();

    assert_eq!(repo.total_approved_projects(), 1);
    assert_eq!(repo.total_languages(), 1);
    assert_eq!(repo.total_programs(), 1);
    assert_eq!(repo.total_tests(), 0);
    assert!(repo.program("Foo", "Whatever").is_ok());
    assert!(repo.project("Bad").unwrap().docs().is_none());
}

#[test]
fn test_duplicate_language_folders() {
    let fixture = Fixture::new();
    fixture
        .file("archive/x/c++/fizz_buzz.cpp", "int main() {}\n")
        .file("archive/c/c-plus-plus/hello_world.cpp", "int main() {}\n");

    for _ in 0..3 {
        let repo = load(&fixture);
        assert_eq!(repo.total_languages(), 1);

        let cpp = repo.language("C++").unwrap();
        assert!(cpp.path().ends_with("c/c-plus-plus"));
        assert!(cpp.program("Hello World").is_ok());

        // Programs of the skipped folder belong to no project either
        assert!(repo.project("Fizz Buzz").is_err());
        let in_projects: usize = repo.projects().map(|p| p.total_programs()).sum();
        assert_eq!(in_projects, repo.total_programs());
        for project in repo.projects() {
            for program in project.programs() {
                let language = repo.language(program.language_name()).unwrap();
                assert_eq!(language.program(program.project_name()).unwrap(), program);
            }
        }
    }
}

#[test]
fn test_language_helpers() {
    let fixture = two_languages();
    fixture.file("archive/c/c-plus-plus/hello_world.cpp", "int main() {}\n");
    let repo = load(&fixture);

    assert_eq!(repo.language("c-plus-plus").unwrap().name(), "C++");
    assert_eq!(repo.languages_by_letter('c').len(), 2);
    assert_eq!(repo.sorted_language_letters(), ['c', 'p']);

    let python = repo.language("Python").unwrap();
    assert_eq!(python.readme().unwrap().as_deref(), Some("# Python\n"));
    assert_eq!(python.total_line_count(), 1);
}

#[test]
fn test_invalid_source_dir() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(matches!(
        Repo::load(Some(missing.as_path())),
        Err(Error::InvalidRepo { .. })
    ));
    // Exists, but has no archive folder
    assert!(matches!(
        Repo::load(Some(dir.path())),
        Err(Error::InvalidRepo { .. })
    ));
}

#[test]
fn test_clone_failure() {
    let dir = tempfile::tempdir().unwrap();
    let remote = dir.path().join("no-such-remote");
    let result = Repo::builder()
        .remote(remote.to_string_lossy())
        .load();
    assert!(matches!(result, Err(Error::RepoClone { .. })));
}

#[test]
fn test_clone_from_local_remote() {
    let mut upstream = two_languages();
    upstream.git_init();
    upstream.commit("Alice", 1_600_000_000);

    let repo = Repo::builder()
        .remote(upstream.path().to_string_lossy())
        .load()
        .unwrap();
    assert!(repo.is_managed_clone());
    assert_eq!(repo.total_programs(), 2);
    assert_eq!(
        repo.program("Python", "Hello World").unwrap().authors().iter().collect::<Vec<_>>(),
        ["Alice"]
    );

    let root = repo.root().to_path_buf();
    drop(repo);
    assert!(!root.exists());
}
