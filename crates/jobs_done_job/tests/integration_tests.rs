use std::path::PathBuf;

use indexmap::IndexMap;
use jobs_done_job::{
    JobsDoneError, Repository, ResolveError, ResolvedJob, Value, resolve, resolve_str,
};
use jobs_done_yaml::{ValueKind, load_document_file};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn test_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test-data")
}

fn space(branch: &str) -> Repository {
    Repository::new("https://space.git", branch)
}

fn jobs(source: &str) -> Vec<ResolvedJob> {
    resolve_str(source, &space("milky_way")).unwrap()
}

fn resolve_error(source: &str) -> ResolveError {
    match resolve_str(source, &space("milky_way")).unwrap_err() {
        JobsDoneError::Resolve(err) => err,
        other => panic!("expected a resolve error, got {other}"),
    }
}

fn list(items: &[&str]) -> Value {
    Value::from(items.to_vec())
}

/// `moon-europa:planet-mercury` style description of a row, axes sorted
fn row_key(job: &ResolvedJob) -> String {
    let mut axes: Vec<_> = job.matrix_row().iter().collect();
    axes.sort();
    axes.iter()
        .map(|(axis, value)| format!("{axis}-{value}"))
        .collect::<Vec<_>>()
        .join(":")
}

fn row_keys(jobs: &[ResolvedJob]) -> Vec<String> {
    let mut keys: Vec<_> = jobs.iter().map(row_key).collect();
    keys.sort();
    keys
}

fn find<'a>(jobs: &'a [ResolvedJob], axis: &str, value: &str) -> &'a ResolvedJob {
    jobs.iter()
        .find(|job| job.matrix_row().get(axis).map(String::as_str) == Some(value))
        .unwrap()
}

const PLANETS_AND_MOONS: &str = r#"
matrix:
  planet:
  - mercury
  - venus

  moon:
  - europa
  - ganymede
"#;

#[test]
fn test_full_document() {
    let jobs = jobs(
        r#"
junit_patterns:
- "junit*.xml"

boosttest_patterns:
- "cpptest*.xml"

display_name: "[{branch}] {planet}-{moon} {name}"

label_expression: "planet-{planet}&&moon-{moon}"

parameters:
- choice:
    name: "PARAM"
    choices:
    - "choice_1"
    - "choice_2"
    description: "Description"

build_batch_commands:
- "command on planet {planet} (repository '{name}' on '{branch}')"

matrix:
  planet:
  - mercury
  - venus

  moon:
  - europa
"#,
    );
    assert_eq!(jobs.len(), 2);

    let expected_matrix = IndexMap::from([
        ("planet".to_string(), vec!["mercury".to_string(), "venus".to_string()]),
        ("moon".to_string(), vec!["europa".to_string()]),
    ]);
    let parameters = Value::List(vec![Value::Map(IndexMap::from([(
        "choice".to_string(),
        Value::Map(IndexMap::from([
            ("name".to_string(), Value::from("PARAM")),
            ("choices".to_string(), list(&["choice_1", "choice_2"])),
            ("description".to_string(), Value::from("Description")),
        ])),
    )]))]);
    for job in &jobs {
        assert_eq!(job.matrix(), &expected_matrix);
        assert_eq!(job.option("junit_patterns"), Some(&list(&["junit*.xml"])));
        assert_eq!(job.option("boosttest_patterns"), Some(&list(&["cpptest*.xml"])));
        assert_eq!(job.option("parameters"), Some(&parameters));
    }

    let mercury = find(&jobs, "planet", "mercury");
    assert_eq!(
        mercury.matrix_row(),
        &IndexMap::from([
            ("planet".to_string(), "mercury".to_string()),
            ("moon".to_string(), "europa".to_string()),
        ])
    );
    assert_eq!(
        mercury.option("build_batch_commands"),
        Some(&list(&["command on planet mercury (repository 'space' on 'milky_way')"]))
    );
    assert_eq!(
        mercury.option("display_name"),
        Some(&Value::from("[milky_way] mercury-europa space"))
    );
    assert_eq!(
        mercury.option("label_expression"),
        Some(&Value::from("planet-mercury&&moon-europa"))
    );

    let venus = find(&jobs, "planet", "venus");
    assert_eq!(
        venus.option("display_name"),
        Some(&Value::from("[milky_way] venus-europa space"))
    );
}

#[test]
fn test_no_matrix_gives_one_job() {
    let jobs = jobs("build_shell_commands:\n- make\n");
    assert_eq!(jobs.len(), 1);
    assert!(jobs[0].matrix_row().is_empty());
    assert!(jobs[0].matrix().is_empty());
}

#[test]
fn test_empty_document_gives_one_empty_job() {
    let jobs = jobs("");
    assert_eq!(jobs.len(), 1);
    assert!(jobs[0].options().is_empty());
}

#[rstest]
#[case::nothing_excluded("", &[
    "moon-europa:planet-mercury",
    "moon-europa:planet-venus",
    "moon-ganymede:planet-mercury",
    "moon-ganymede:planet-venus",
])]
#[case::one_axis_value("planet-venus:exclude: yes\n", &[
    "moon-europa:planet-mercury",
    "moon-ganymede:planet-mercury",
])]
#[case::chained("planet-venus:moon-europa:exclude: yes\n", &[
    "moon-europa:planet-mercury",
    "moon-ganymede:planet-mercury",
    "moon-ganymede:planet-venus",
])]
#[case::everything("exclude: yes\n", &[])]
#[case::everything_but_one("exclude: yes\nplanet-venus:moon-io|europa:exclude: no\n", &[
    "moon-europa:planet-venus",
])]
fn test_exclude(#[case] extra: &str, #[case] expected: &[&str]) {
    let jobs = jobs(&format!("{PLANETS_AND_MOONS}\n{extra}"));
    assert_eq!(row_keys(&jobs), expected);
}

#[test]
fn test_branch_flags() {
    let source = r#"
branch-master:build_shell_commands:
- "master.sh"

branch-milky_way:build_batch_commands:
- "milky_way.bat"

branch-with-hyphens-in-name:build_batch_commands:
- "crazy.bat"
"#;
    let job = &resolve_str(source, &space("milky_way")).unwrap()[0];
    assert_eq!(job.option("build_shell_commands"), None);
    assert_eq!(job.option("build_batch_commands"), Some(&list(&["milky_way.bat"])));

    let job = &resolve_str(source, &space("master")).unwrap()[0];
    assert_eq!(job.option("build_shell_commands"), Some(&list(&["master.sh"])));
    assert_eq!(job.option("build_batch_commands"), None);

    let job = &resolve_str(source, &space("with-hyphens-in-name")).unwrap()[0];
    assert_eq!(job.option("build_batch_commands"), Some(&list(&["crazy.bat"])));
}

#[test]
fn test_matrix_and_flags() {
    let jobs = jobs(
        r#"
platform-windows:junit_patterns:
- "junit*.xml"

platform-linux:build_shell_commands:
- "{platform} command"

platform-windows:build_batch_commands:
- "{platform} command"

matrix:
    platform:
    - linux
    - windows
"#,
    );
    assert_eq!(jobs.len(), 2);

    let linux = find(&jobs, "platform", "linux");
    assert_eq!(linux.option("junit_patterns"), None);
    assert_eq!(linux.option("build_batch_commands"), None);
    assert_eq!(linux.option("build_shell_commands"), Some(&list(&["linux command"])));

    let windows = find(&jobs, "platform", "windows");
    assert_eq!(windows.option("junit_patterns"), Some(&list(&["junit*.xml"])));
    assert_eq!(windows.option("build_batch_commands"), Some(&list(&["windows command"])));
    assert_eq!(windows.option("build_shell_commands"), None);
}

#[test]
fn test_matrix_and_regex_flags() {
    let jobs = jobs(
        r#"
platform-win.*:junit_patterns:
- "junit*.xml"

platform-(?!windows):build_shell_commands:
- "{platform} command"

matrix:
    platform:
    - linux
    - windows
"#,
    );
    let linux = find(&jobs, "platform", "linux");
    assert_eq!(linux.option("junit_patterns"), None);
    assert_eq!(linux.option("build_shell_commands"), Some(&list(&["linux command"])));

    let windows = find(&jobs, "platform", "windows");
    assert_eq!(windows.option("junit_patterns"), Some(&list(&["junit*.xml"])));
    assert_eq!(windows.option("build_shell_commands"), None);
}

#[test]
fn test_negative_look_ahead_guards_the_value() {
    let jobs = jobs(
        r#"
planet-(?!mars):junit_patterns:
- "{planet}/*.xml"

matrix:
    planet:
    - earth
    - mars
"#,
    );
    let earth = find(&jobs, "planet", "earth");
    assert_eq!(earth.option("junit_patterns"), Some(&list(&["earth/*.xml"])));
    assert_eq!(find(&jobs, "planet", "mars").option("junit_patterns"), None);
}

#[test]
fn test_alias_groups() {
    let jobs = jobs(
        r#"
platform-windows:junit_patterns:
- "junit*.xml"

platform-redhat64:build_shell_commands:
- "linux command: {platform}"

platform-win32:build_batch_commands:
- "windows command: {platform}"

matrix:
    platform:
    - win32,windows
    - redhat64,linux
"#,
    );
    assert_eq!(jobs.len(), 2);

    let windows = find(&jobs, "platform", "windows");
    assert_eq!(windows.option("junit_patterns"), Some(&list(&["junit*.xml"])));
    assert_eq!(
        windows.option("build_batch_commands"),
        Some(&list(&["windows command: windows"]))
    );
    assert_eq!(windows.option("build_shell_commands"), None);

    let linux = find(&jobs, "platform", "linux");
    assert_eq!(linux.option("junit_patterns"), None);
    assert_eq!(
        linux.option("build_shell_commands"),
        Some(&list(&["linux command: linux"]))
    );
}

#[test]
fn test_alias_groups_sharing_a_canonical_value_are_merged() {
    let jobs = jobs("matrix:\n  platform:\n  - win32,windows\n  - win64,windows\n  - linux\n");
    assert_eq!(row_keys(&jobs), vec!["platform-linux", "platform-windows"]);
    assert_eq!(jobs[0].matrix()["platform"], vec!["windows", "linux"]);
}

#[test]
fn test_conditions_in_nested_mappings() {
    let jobs = jobs(
        r#"
git:
  platform-windows:shallow: true
  platform-linux:shallow: false

additional_repositories:
- git:
      url: "https://{platform}.example.com/extra.git"
      platform-windows:shallow: true
      platform-linux:shallow: false

matrix:
    platform:
    - linux
    - windows
"#,
    );

    for (platform, shallow) in [("linux", "false"), ("windows", "true")] {
        let job = find(&jobs, "platform", platform);
        let git = Value::Map(IndexMap::from([("shallow".to_string(), Value::from(shallow))]));
        assert_eq!(job.option("git"), Some(&git));

        let extra = Value::List(vec![Value::Map(IndexMap::from([(
            "git".to_string(),
            Value::Map(IndexMap::from([
                (
                    "url".to_string(),
                    Value::from(format!("https://{platform}.example.com/extra.git")),
                ),
                ("shallow".to_string(), Value::from(shallow)),
            ])),
        )]))]);
        assert_eq!(job.option("additional_repositories"), Some(&extra));
    }
}

#[rstest]
#[case::no_match("- feature-.*\n", 0)]
#[case::exact("- milky_way\n", 3)]
#[case::several("- master\n- milky_.*\n", 3)]
#[case::with_placeholder("- \"{name}\"\n- \"milky_{planet}\"\n", 0)]
fn test_branch_patterns(#[case] patterns: &str, #[case] expected: usize) {
    let jobs = jobs(&format!(
        "matrix:\n  planet:\n  - mars\n  - earth\n  - venus\nbranch_patterns:\n{patterns}"
    ));
    assert_eq!(jobs.len(), expected);
}

#[test]
fn test_branch_patterns_per_row() {
    let jobs = jobs(
        r#"
matrix:
  planet:
  - mars
  - earth
  - venus

planet-earth:branch_patterns:
- milky_way
planet-mars:branch_patterns:
- master
planet-venus:branch_patterns:
- milky_.*
"#,
    );
    assert_eq!(row_keys(&jobs), vec!["planet-earth", "planet-venus"]);
}

#[test]
fn test_branch_patterns_on_other_branch() {
    let jobs = resolve_str("branch_patterns:\n- master\n", &space("milky_way")).unwrap();
    assert!(jobs.is_empty());
    let jobs = resolve_str("branch_patterns:\n- master\n", &space("master")).unwrap();
    assert_eq!(jobs.len(), 1);
}

#[test]
fn test_variables() {
    let jobs = jobs(
        r#"
planets:
- mercury
- venus

moons:
- europa

build_batch_commands:
- "visit {planets} and {moons}"
"#,
    );
    let job = &jobs[0];
    assert_eq!(job.option("planets"), None);
    assert_eq!(job.variables()["planets"], list(&["mercury", "venus"]));
    assert_eq!(
        job.option("build_batch_commands"),
        Some(&list(&["visit mercury,venus and europa"]))
    );
}

#[rstest]
#[case("bad_option: value\n", "bad_option")]
#[case("moon: europa\n", "moon")]
#[case("planet-earth:moon: europa\nmatrix:\n  planet: [earth]\n", "moon")]
fn test_unknown_option(#[case] source: &str, #[case] option: &str) {
    let err = resolve_error(source);
    assert!(
        matches!(err, ResolveError::UnknownOption { option: ref found, .. } if found == option),
        "{err}"
    );
}

#[test]
fn test_type_checking() {
    jobs("build_batch_commands:\n- \"list item 1\"\n");

    let err = resolve_error("build_batch_commands: \"string item\"\n");
    match err {
        ResolveError::TypeMismatch {
            option,
            accepted,
            actual,
            ..
        } => {
            assert_eq!(option, "build_batch_commands");
            assert_eq!(accepted, vec![ValueKind::List]);
            assert_eq!(actual, ValueKind::Scalar);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_string_conversion() {
    let jobs = jobs("junit_patterns:\n- 1\ntimeout: 30\n");
    assert_eq!(jobs[0].option("junit_patterns"), Some(&list(&["1"])));
    assert_eq!(jobs[0].option("timeout"), Some(&Value::from("30")));
}

#[rstest]
#[case::top_level("planet-pluto:junit_patterns:\n- \"*.xml\"\n", "planet-pluto:junit_patterns")]
#[case::nested("git:\n    planet-pluto:shallow: true\n", "planet-pluto:shallow")]
#[case::inside_list(
    "additional_repositories:\n- git:\n    planet-pluto:shallow: true\n",
    "planet-pluto:shallow"
)]
#[case::undeclared_axis("moon-europa:junit_patterns:\n- \"*.xml\"\n", "moon-europa:junit_patterns")]
fn test_unmatchable_condition(#[case] extra: &str, #[case] key: &str) {
    let err = resolve_error(&format!("matrix:\n    planet:\n    - earth\n{extra}"));
    assert!(
        matches!(err, ResolveError::UnmatchableCondition { key: ref found, .. } if found == key),
        "{err}"
    );
}

#[test]
fn test_ignore_unmatchable() {
    let jobs = jobs(
        r#"
planet-pluto:junit_patterns:
- "*.xml"

git:
    planet-pluto:shallow: true
    url: "https://space.git"

matrix:
    planet:
    - earth

ignore_unmatchable: true
"#,
    );
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].option("junit_patterns"), None);
    assert_eq!(
        jobs[0].option("git"),
        Some(&Value::Map(IndexMap::from([(
            "url".to_string(),
            Value::from("https://space.git")
        )])))
    );
}

#[test]
fn test_missing_substitution() {
    let err = resolve_error("display_name: \"{planet} build\"\n");
    match err {
        ResolveError::MissingSubstitution {
            placeholder,
            option,
        } => {
            assert_eq!(placeholder, "planet");
            assert_eq!(option, "display_name");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_escaped_braces() {
    let jobs = jobs("build_shell_commands:\n- \"echo ${{HOME}} on {branch}\"\n");
    assert_eq!(
        jobs[0].option("build_shell_commands"),
        Some(&list(&["echo ${HOME} on milky_way"]))
    );
}

#[test]
fn test_strip_file() {
    let jobs = jobs("junit_patterns:\n    - 1\n\t");
    assert_eq!(jobs.len(), 1);
}

#[test]
fn test_job_names() {
    let repository = space("milky_way");
    let jobs = resolve_str(PLANETS_AND_MOONS, &repository).unwrap();
    let names: Vec<_> = jobs.iter().map(|job| job.job_name(&repository)).collect();
    insta::assert_snapshot!(names.join("\n"), @r"
    space-milky_way-europa-mercury
    space-milky_way-ganymede-mercury
    space-milky_way-europa-venus
    space-milky_way-ganymede-venus
    ");
    for name in names {
        assert!(name.starts_with(&ResolvedJob::job_group(&repository)));
    }
}

#[test]
fn test_job_names_must_be_unique() {
    let err = resolve_error(
        r#"
matrix:
  a: [x-y, x]
  b: [z, y-z]
"#,
    );
    assert!(matches!(
        err,
        ResolveError::DuplicateJobName { ref name, ref first, ref second }
            if name == "space-milky_way-x-y-z" && first == "a=x-y, b=z" && second == "a=x, b=y-z"
    ));
}

#[test]
fn test_from_file() {
    let document = load_document_file(&test_data_dir().join("space.jobs_done.yaml")).unwrap();
    let jobs = resolve(&document, &space("milky_way")).unwrap();
    assert_eq!(row_keys(&jobs), vec!["planet-earth", "planet-mercury"]);

    let earth = find(&jobs, "planet", "earth");
    assert_eq!(
        earth.option("build_shell_commands"),
        Some(&list(&["./build.sh earth", "./test.sh"]))
    );
    assert_eq!(earth.option("junit_patterns"), Some(&list(&["earth/*.xml"])));
}
