//! # Integration Tests
//!
//! End-to-end tests across the workspace crates.
//!
//! Covers:
//! - Contract snapshots (level taxonomy, wire keys, TOML/JSON config parity)
//! - Configuration file to destination output
//! - Dispatcher hosted on a caller-provided runtime

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader, LoggingBlueprint};
    use contracts::{Level, LEVEL_CODES, LEVEL_NAMES};

    #[test]
    fn test_level_taxonomy_is_stable() {
        assert_eq!(
            LEVEL_NAMES,
            ["NONE", "FINEST", "FINE", "DEBUG", "TRACE", "INFO", "WARNING", "ERROR", "CRITICAL"]
        );
        assert_eq!(LEVEL_CODES[Level::Warning as usize], "WARN");
        assert_eq!(LEVEL_CODES[Level::Error as usize], "EROR");
        assert!(Level::Finest < Level::Critical);
        assert_eq!(Level::from_name("warning"), Level::None);
    }

    #[test]
    fn test_toml_and_json_configs_are_equivalent() {
        let toml = r#"
[[filters]]
tag = "audit"
type = "file"
level = "WARNING"
format = { name = "json" }
granulars = [{ level = "DEBUG", path = "app::db" }]
[filters.properties]
filename = "/var/log/audit.log"
"#;
        let json = r#"{
  "filters": [{
    "tag": "audit",
    "type": "file",
    "level": "WARNING",
    "format": { "name": "json" },
    "granulars": [{ "level": "DEBUG", "path": "app::db" }],
    "properties": { "filename": "/var/log/audit.log" }
  }]
}"#;

        let from_toml = ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap();
        let from_json = ConfigLoader::load_from_str(json, ConfigFormat::Json).unwrap();
        let as_value = |blueprint: &LoggingBlueprint| -> serde_json::Value {
            serde_json::from_str(&ConfigLoader::to_json(blueprint).unwrap()).unwrap()
        };
        assert_eq!(as_value(&from_toml), as_value(&from_json));
        assert_eq!(from_toml.filters[0].granulars[0].path, "app::db");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write as _;
    use std::net::UdpSocket;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use dispatcher::{Dispatcher, DispatcherConfig, RegistryEntry};
    use observability::DispatchSummary;
    use sawmill::{Extra, Frame, FrameResolver, Level, Logger, PatternFormatter};

    fn resolver_for(function: &'static str) -> Arc<dyn FrameResolver> {
        Arc::new(move |_: usize| {
            Some(Frame {
                file: "src/db/pool.rs".into(),
                line: 88,
                function: function.into(),
            })
        })
    }

    fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("logging.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    /// Config file -> two file destinations -> granular filtering -> drain
    #[test]
    fn test_e2e_config_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let json_log = dir.path().join("json.log");
        let text_log = dir.path().join("nested/text.log");
        let config = write_config(
            dir.path(),
            &format!(
                r#"
[[filters]]
tag = "json"
type = "file"
level = "ERROR"
format = {{ name = "json" }}
[filters.properties]
filename = "{json}"

[[filters.granulars]]
level = "INFO"
path = "app::db::Pool"

[[filters]]
tag = "text"
type = "file"
level = "DEBUG"
[filters.properties]
filename = "{text}"
format = "%L %s %M"

[[filters]]
tag = "off"
type = "console"
enabled = false
"#,
                json = json_log.display(),
                text = text_log.display()
            ),
        );

        let logger = Logger::builder()
            .resolver(resolver_for("app::db::Pool::acquire"))
            .hostname("db-1")
            .build();
        assert_eq!(logger.load_configuration(&config).unwrap(), vec![0, 1]);

        logger.info_ex(Extra::new().with("conn", 4), format_args!("acquired"));
        logger.fine(format_args!("too quiet for both"));
        let err = logger.error(format_args!("pool exhausted"));
        logger.close();

        assert_eq!(err.to_string(), "pool exhausted");

        let json = std::fs::read_to_string(&json_log).unwrap();
        let records: Vec<serde_json::Value> = json
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["message"], "acquired");
        assert_eq!(records[0]["Level"], 5);
        assert_eq!(records[0]["extra"]["conn"], 4);
        assert_eq!(records[0]["MethodPath"], "app::db::Pool");
        assert_eq!(records[0]["PackagePath"], "app::db");
        assert_eq!(records[0]["HostName"], "db-1");
        assert_eq!(records[1]["message"], "pool exhausted");

        let text = std::fs::read_to_string(&text_log).unwrap();
        assert_eq!(
            text,
            "INFO pool.rs:88 acquired\nEROR pool.rs:88 pool exhausted\n"
        );

        let metrics = logger.metrics();
        assert_eq!(metrics.submitted, 3);
        assert_eq!(metrics.dispatched, 3);
        assert_eq!(metrics.delivered, 4);
    }

    #[test]
    fn test_e2e_udp_destination() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let endpoint = receiver.local_addr().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let config = write_config(
            dir.path(),
            &format!(
                r#"
[[filters]]
type = "socket"
level = "WARNING"
format = {{ name = "pattern", pattern = "[%L] %M" }}
[filters.properties]
protocol = "udp"
endpoint = "{endpoint}"
"#
            ),
        );

        let logger = Logger::builder()
            .resolver(resolver_for("app::main"))
            .hostname("h")
            .build();
        logger.load_configuration(&config).unwrap();
        logger.info(format_args!("ignored"));
        let _ = logger.warn(format_args!("over the wire"));
        logger.close();

        let mut buf = [0u8; 256];
        let n = receiver.recv(&mut buf).unwrap();
        assert_eq!(std::str::from_utf8(&buf[..n]).unwrap(), "[WARN] over the wire");
    }

    #[test]
    fn test_e2e_concurrent_producers() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("all.log");
        let config = write_config(
            dir.path(),
            &format!(
                "[[filters]]\ntype = \"file\"\n[filters.properties]\nfilename = \"{}\"\n",
                log.display()
            ),
        );

        let logger = Logger::builder()
            .resolver(resolver_for("app::worker::run"))
            .hostname("h")
            .queue_capacity(4096)
            .build();
        logger.load_configuration(&config).unwrap();

        std::thread::scope(|scope| {
            for worker in 0..4 {
                let logger = &logger;
                scope.spawn(move || {
                    for i in 0..250 {
                        let line = format!("worker {worker} line {i}\n");
                        (&*logger).write_all(line.as_bytes()).unwrap();
                    }
                });
            }
        });
        logger.close();

        let metrics = logger.metrics();
        let written = std::fs::read_to_string(&log).unwrap();
        assert_eq!(metrics.dropped, 0);
        assert_eq!(metrics.submitted, 1000);
        assert_eq!(metrics.dispatched, 1000);
        assert_eq!(written.lines().count(), 1000);
        for worker in 0..4 {
            let prefix = format!("worker {worker} line ");
            let order: Vec<u32> = written
                .lines()
                .filter_map(|line| line.split_once(&prefix))
                .map(|(_, i)| i.parse().unwrap())
                .collect();
            assert_eq!(order, (0..250).collect::<Vec<u32>>(), "worker {worker}");
        }

        let summary = DispatchSummary::from(&metrics);
        assert!(summary.to_string().starts_with("=== Dispatch Summary ==="));
    }

    #[tokio::test]
    async fn test_dispatcher_on_caller_runtime() {
        let (dispatcher, handle) = Dispatcher::new(&DispatcherConfig::default());
        let task = dispatcher.spawn();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.log");
        let file = dispatcher::FileDestination::new(
            "task",
            dispatcher::destinations::FileDestinationConfig { path: path.clone() },
        )
        .unwrap();
        let index = handle
            .add_entry(RegistryEntry::new(file, Level::Info, PatternFormatter::new("%L|%M")))
            .await
            .unwrap();
        assert_eq!(index, 0);

        handle.submit(contracts::LogRecord::new(Level::Debug, "below"));
        handle.submit(contracts::LogRecord::new(Level::Info, "above"));
        handle.close().await;
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();

        assert!(handle.is_closed());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "INFO|above\n");
    }
}
