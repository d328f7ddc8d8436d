//! Integration tests for jdkmatrix

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Binary with a config path that does not exist, so defaults apply
    fn jdkmatrix(home: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("jdkmatrix");
        cmd.env("JDKMATRIX_CONFIG", home.join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        jdkmatrix(home.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("JDK version"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        jdkmatrix(home.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("jdkmatrix"));
    }

    #[test]
    fn run_requires_two_directories() {
        let home = TempDir::new().unwrap();
        jdkmatrix(home.path()).args(["run", "dataset"]).assert().code(2);
    }

    #[test]
    fn run_with_missing_dataset_fails() {
        let home = TempDir::new().unwrap();
        let results = home.path().join("results");
        jdkmatrix(home.path())
            .arg("run")
            .arg(home.path().join("missing"))
            .arg(&results)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Dataset directory not found"));
        assert!(!results.exists());
    }

    #[test]
    fn invalid_config_is_reported() {
        let home = TempDir::new().unwrap();
        fs::write(home.path().join("config.toml"), "[matrix]\nmin_jdk = 11\nmax_jdk = 8\n").unwrap();
        jdkmatrix(home.path())
            .args(["config", "show"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn config_show() {
        let home = TempDir::new().unwrap();
        jdkmatrix(home.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[matrix]"))
            .stdout(predicate::str::contains("on_missing_tool = \"skip\""));
    }

    #[test]
    fn config_path() {
        let home = TempDir::new().unwrap();
        jdkmatrix(home.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    fn classify_fixture(root: &Path) {
        fs::write(
            root.join("results.csv"),
            "name,commit,tool,wrapper,java6,java7\n\
             a/maven,c1,Maven,,1,0\n\
             b/gradle,c2,Gradle,gradlew,124,1\n",
        )
        .unwrap();
        fs::create_dir_all(root.join("a_maven")).unwrap();
        fs::write(
            root.join("a_maven").join("06.fail"),
            "[INFO] Building a 1.0\n[ERROR] Failed to execute goal org.apache.maven.plugins:maven-compiler-plugin:3.1:compile\n",
        )
        .unwrap();
        fs::create_dir_all(root.join("b_gradle")).unwrap();
        fs::write(root.join("b_gradle").join("07.fail"), "> Task :compileJava FAILED\n").unwrap();
    }

    #[test]
    fn classify_writes_reports() {
        let home = TempDir::new().unwrap();
        let results = home.path().join("results");
        fs::create_dir_all(&results).unwrap();
        classify_fixture(&results);

        jdkmatrix(home.path())
            .arg("classify")
            .arg(&results)
            .assert()
            .success()
            .stdout(predicate::str::contains("compilation"))
            .stdout(predicate::str::contains("Total"));

        let types = fs::read_to_string(results.join("error-types.csv")).unwrap();
        assert_eq!(
            types,
            "name,jdk,tool,type,category\n\
             a/maven,6,Maven,maven-compiler-plugin,compilation\n\
             b/gradle,6,Gradle,Timeout,other/unknown\n\
             b/gradle,7,Gradle,:compileJava,other/unknown\n"
        );
        assert!(results.join("failure-categories.csv").is_file());
    }

    #[test]
    fn classify_json_uses_category_table() {
        let home = TempDir::new().unwrap();
        let results = home.path().join("results");
        fs::create_dir_all(&results).unwrap();
        classify_fixture(&results);
        let table = home.path().join("categories.csv");
        fs::write(&table, "type,category\n:compileJava,compilation\nTimeout,timeout\n").unwrap();
        let output = home.path().join("report");

        let assert = jdkmatrix(home.path())
            .arg("classify")
            .arg(&results)
            .arg("--categories")
            .arg(&table)
            .arg("--output")
            .arg(&output)
            .args(["--format", "json"])
            .assert()
            .success();

        let report: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
        assert_eq!(report["failures"], 3);
        // maven-compiler-plugin is not in the supplied table
        assert_eq!(
            report["breakdown"]["categories"],
            serde_json::json!(["compilation", "timeout", "other/unknown"])
        );
        assert!(output.join("error-types.csv").is_file());
    }

    #[test]
    fn classify_missing_results_fails() {
        let home = TempDir::new().unwrap();
        jdkmatrix(home.path())
            .arg("classify")
            .arg(home.path().join("nope"))
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Results directory not found"));
    }

    #[test]
    fn join_merges_directories() {
        let home = TempDir::new().unwrap();
        for (part, row) in [("part1", "a/one,c,Ant,,0"), ("part2", "b/two,c,Ant,,1")] {
            let dir = home.path().join(part);
            fs::create_dir_all(dir.join(row.split(',').next().unwrap().replacen('/', "_", 1))).unwrap();
            fs::write(dir.join("results.csv"), format!("name,commit,tool,wrapper,java6\n{}\n", row)).unwrap();
        }
        let target = home.path().join("all");

        jdkmatrix(home.path())
            .arg("join")
            .arg(home.path().join("part1"))
            .arg(home.path().join("part2"))
            .arg(&target)
            .assert()
            .success();

        assert_eq!(
            fs::read_to_string(target.join("results.csv")).unwrap(),
            "name,commit,tool,wrapper,java6\na/one,c,Ant,,0\nb/two,c,Ant,,1\n"
        );
        assert!(target.join("a_one").is_dir());
        assert!(target.join("b_two").is_dir());
    }

    fn error_types_report(dir: &Path) -> std::path::PathBuf {
        let report = dir.join("error-types.csv");
        fs::write(
            &report,
            "name,jdk,tool,type,category\n\
             alice/app,7,Gradle,:compileJava,compilation\n\
             bob/lib,6,Maven,Resolve,dependency resolution\n",
        )
        .unwrap();
        fs::create_dir_all(dir.join("alice_app")).unwrap();
        fs::write(dir.join("alice_app").join("07.fail"), "FAILURE: Build failed\n").unwrap();
        report
    }

    #[cfg(unix)]
    #[test]
    fn inspect_opens_sampled_logs() {
        let home = TempDir::new().unwrap();
        let report = error_types_report(home.path());

        jdkmatrix(home.path())
            .arg("inspect")
            .arg(&report)
            .arg(home.path())
            .args([":compileJava", "--open", "cat", "--seed", "3"])
            .assert()
            .success()
            .stdout(predicate::str::contains("alice_app/07.fail"))
            .stdout(predicate::str::contains("FAILURE: Build failed"))
            .stdout(predicate::str::contains("bob_lib").not());
    }

    #[test]
    fn inspect_reports_missing_logs() {
        let home = TempDir::new().unwrap();
        let report = error_types_report(home.path());

        jdkmatrix(home.path())
            .arg("inspect")
            .arg(&report)
            .arg(home.path())
            .arg("Resolve")
            .assert()
            .success()
            .stdout(predicate::str::contains("bob_lib"))
            .stderr(predicate::str::contains("Missing log"));
    }

    #[test]
    fn inspect_unknown_error_type() {
        let home = TempDir::new().unwrap();
        let report = error_types_report(home.path());

        jdkmatrix(home.path())
            .arg("inspect")
            .arg(&report)
            .arg(home.path())
            .arg("resolve")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("No failures of type resolve"));
    }
}

mod matrix_tests {
    use async_trait::async_trait;
    use jdkmatrix::config::{Config, MissingToolPolicy};
    use jdkmatrix::error::{MatrixError, MatrixResult};
    use jdkmatrix::executor::MatrixExecutor;
    use jdkmatrix::ledger::{CsvLedger, Ledger, LEDGER_FILE};
    use jdkmatrix::orchestration::{ContainerConfig, ContainerHandle, ContainerRuntime, Mount};
    use jdkmatrix::project::{list_projects, pending_projects};
    use jdkmatrix::supervisor::{ShutdownSignal, Supervisor};
    use std::collections::HashSet;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Runtime that fails Gradle builds on Java 7 and hangs on demand
    #[derive(Default)]
    struct ScriptedRuntime {
        runs: Mutex<Vec<(PathBuf, String)>>,
        stops: Mutex<Vec<String>>,
        volumes: Mutex<HashSet<String>>,
        hang: bool,
    }

    impl ScriptedRuntime {
        fn runs(&self) -> Vec<(PathBuf, String)> {
            self.runs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContainerRuntime for ScriptedRuntime {
        async fn ensure_ready(&self) -> MatrixResult<()> {
            Ok(())
        }

        async fn run_to_log(&self, config: &ContainerConfig, log_path: &Path) -> MatrixResult<i32> {
            let mut source = PathBuf::new();
            for mount in &config.mounts {
                match mount {
                    Mount::Bind { source: dir, .. } => source = dir.clone(),
                    Mount::Volume { name, .. } => {
                        self.volumes.lock().unwrap().insert(name.clone());
                    }
                }
            }
            self.runs.lock().unwrap().push((source, config.image.clone()));

            if self.hang {
                std::future::pending::<()>().await;
            }

            let code = if config.command == ["gradle"] && config.image.ends_with(":7") { 1 } else { 0 };
            fs::write(log_path, format!("{} on {}\n", config.command[0], config.image)).unwrap();
            Ok(code)
        }

        async fn stop(&self, name: &str, _grace: Duration) -> MatrixResult<()> {
            self.stops.lock().unwrap().push(name.to_string());
            Ok(())
        }

        async fn remove(&self, _name: &str) -> MatrixResult<()> {
            Ok(())
        }

        async fn volume_exists(&self, name: &str) -> MatrixResult<bool> {
            Ok(self.volumes.lock().unwrap().contains(name))
        }

        async fn volume_remove(&self, name: &str) -> MatrixResult<()> {
            self.volumes.lock().unwrap().remove(name);
            Ok(())
        }

        fn runtime_name(&self) -> &str {
            "scripted"
        }
    }

    fn config(policy: MissingToolPolicy) -> Config {
        let mut config = Config::default();
        config.matrix.min_jdk = 6;
        config.matrix.max_jdk = 8;
        config.matrix.on_missing_tool = policy;
        config
    }

    /// Three projects, one of them without any build file
    fn dataset(root: &Path) -> PathBuf {
        let data = root.join("dataset");
        for (dir, file) in [
            ("alice_gradle", Some("build.gradle")),
            ("bob_nothing", None),
            ("carol_maven", Some("pom.xml")),
        ] {
            fs::create_dir_all(data.join(dir)).unwrap();
            if let Some(file) = file {
                fs::write(data.join(dir).join(file), "").unwrap();
            }
        }
        data
    }

    async fn run(
        runtime: Arc<ScriptedRuntime>,
        data: &Path,
        results: &Path,
        policy: MissingToolPolicy,
    ) -> MatrixResult<()> {
        let config = config(policy);
        let mut ledger = CsvLedger::open(results, config.matrix.jdk_range()).await?;
        let completed = ledger.load_completed().await?;
        let projects = pending_projects(data, &completed, config.general.seed).await?;

        let executor = MatrixExecutor::new(runtime, ContainerHandle::new("jdkmatrix-build"), &config);
        executor.run(&projects, results, &mut ledger).await.map(|_| ())
    }

    #[tokio::test]
    async fn skip_policy_records_buildable_projects() {
        let root = TempDir::new().unwrap();
        let data = dataset(root.path());
        let results = root.path().join("results");
        let runtime = Arc::new(ScriptedRuntime::default());

        run(runtime.clone(), &data, &results, MissingToolPolicy::Skip).await.unwrap();

        let rows = CsvLedger::read_rows(&results.join(LEDGER_FILE)).await.unwrap();
        let mut summary: Vec<(String, Vec<i32>)> = rows
            .into_iter()
            .map(|row| (row.name, row.exit_codes.into_values().collect()))
            .collect();
        summary.sort();
        assert_eq!(
            summary,
            vec![
                ("alice/gradle".to_string(), vec![0, 1, 0]),
                ("carol/maven".to_string(), vec![0, 0, 0]),
            ]
        );

        assert!(results.join("alice_gradle").join("07.fail").is_file());
        assert!(results.join("alice_gradle").join("06.pass").is_file());
        assert!(results.join("carol_maven").join("08.pass").is_file());
        assert!(!results.join("bob_nothing").exists());
        assert_eq!(runtime.runs().len(), 6);
        assert!(runtime.volumes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn abort_policy_fails_the_run() {
        let root = TempDir::new().unwrap();
        let data = dataset(root.path());
        let results = root.path().join("results");
        let runtime = Arc::new(ScriptedRuntime::default());

        let err = run(runtime, &data, &results, MissingToolPolicy::Abort).await.unwrap_err();
        assert!(matches!(err, MatrixError::NoBuildTool(ref dir) if dir.ends_with("bob_nothing")));

        // Projects visited before the failing one are committed
        let rows = CsvLedger::read_rows(&results.join(LEDGER_FILE)).await.unwrap();
        assert!(rows.iter().all(|row| row.name != "bob/nothing"));
    }

    #[tokio::test]
    async fn resumption_builds_only_missing_projects() {
        let root = TempDir::new().unwrap();
        let data = dataset(root.path());
        fs::create_dir_all(data.join("dave_ant")).unwrap();
        fs::write(data.join("dave_ant").join("build.xml"), "").unwrap();
        let results = root.path().join("results");
        fs::create_dir_all(&results).unwrap();
        fs::write(
            results.join(LEDGER_FILE),
            "name,commit,tool,wrapper,java6,java7,java8\ncarol/maven,,Maven,,0,0,0\n",
        )
        .unwrap();

        let runtime = Arc::new(ScriptedRuntime::default());
        run(runtime.clone(), &data, &results, MissingToolPolicy::Skip).await.unwrap();

        let built: HashSet<PathBuf> = runtime
            .runs()
            .into_iter()
            .map(|(source, _)| PathBuf::from(source.file_name().unwrap()))
            .collect();
        assert_eq!(built, HashSet::from([PathBuf::from("alice_gradle"), PathBuf::from("dave_ant")]));

        let names: Vec<String> = CsvLedger::read_rows(&results.join(LEDGER_FILE))
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.name)
            .collect();
        assert_eq!(names.len(), 3);
        assert_eq!(names.iter().filter(|n| *n == "carol/maven").count(), 1);

        // A second run finds nothing left to build
        let again = Arc::new(ScriptedRuntime::default());
        run(again.clone(), &data, &results, MissingToolPolicy::Skip).await.unwrap();
        assert!(again.runs().is_empty());
    }

    #[tokio::test]
    async fn visit_order_is_reproducible() {
        let root = TempDir::new().unwrap();
        let data = dataset(root.path());

        let first = list_projects(&data, 42).await.unwrap();
        let second = list_projects(&data, 42).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[tokio::test]
    async fn interrupt_discards_project_in_flight() {
        let root = TempDir::new().unwrap();
        let data = dataset(root.path());
        let results = root.path().join("results");
        let runtime = Arc::new(ScriptedRuntime {
            hang: true,
            ..Default::default()
        });

        let supervisor = Supervisor::new(
            runtime.clone(),
            ContainerHandle::new("jdkmatrix-build"),
            Duration::from_secs(10),
        );
        let shutdown = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            ShutdownSignal::Interrupt
        };

        let err = supervisor
            .supervise_until(run(runtime.clone(), &data, &results, MissingToolPolicy::Skip), shutdown)
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), 130);
        assert_eq!(*runtime.stops.lock().unwrap(), vec!["jdkmatrix-build".to_string()]);
        let rows = CsvLedger::read_rows(&results.join(LEDGER_FILE)).await.unwrap();
        assert!(rows.is_empty());
    }
}
