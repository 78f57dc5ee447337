//! Sequential, fail-fast build driving with a fake bundler.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use memo_bundler::{
    BuildFailure, BuildOptions, BundleDriver, BundleError, Bundler, ConfigLoader, Format,
    FriendlyLogger, LogKind, LogLevel, Logger, MemorySink, ResolveOptions,
};
use tempfile::TempDir;

/// Records every build call and fails for targets named in `fail_on`.
#[derive(Default)]
struct FakeBundler {
    fail_on: Option<String>,
    calls: Mutex<Vec<BuildOptions>>,
}

impl FakeBundler {
    fn failing_on(name: &str) -> Self {
        Self {
            fail_on: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn built_names(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("lock")
            .iter()
            .filter_map(|o| o.name.clone())
            .collect()
    }
}

#[async_trait]
impl Bundler for FakeBundler {
    async fn build(&self, options: &BuildOptions) -> Result<(), BuildFailure> {
        self.calls.lock().expect("lock").push(options.clone());
        if options.name.is_some() && options.name == self.fail_on {
            return Err(BuildFailure::Other("Could not resolve entry module".into()));
        }
        Ok(())
    }
}

fn target(name: &str, preset: &str, sink: &MemorySink) -> BuildOptions {
    let logger: Arc<dyn Logger> = Arc::new(FriendlyLogger::with_sink(
        Some(name),
        LogLevel::Info,
        Arc::new(sink.clone()),
    ));
    BuildOptions {
        name: Some(name.to_string()),
        preset: Some(preset.to_string()),
        custom_logger: Some(logger),
        ..Default::default()
    }
}

#[tokio::test]
async fn targets_build_in_order_with_merged_options() {
    let dir = TempDir::new().expect("tempdir");
    let sink = MemorySink::new();
    let loader = ConfigLoader::from(vec![
        target("a", "node", &sink),
        target("b", "browser", &sink),
    ]);

    let bundler = Arc::new(FakeBundler::default());
    BundleDriver::new(bundler.clone())
        .run(&loader, &ResolveOptions::with_cwd(dir.path()))
        .await
        .expect("build");

    assert_eq!(bundler.built_names(), ["a", "b"]);

    let calls = bundler.calls.lock().expect("lock");
    assert_eq!(calls[0].format, Some(vec![Format::Es, Format::Cjs]));
    assert_eq!(calls[0].cwd.as_deref(), Some(dir.path()));
    assert!(calls.iter().all(|c| c.preset.is_none() && c.show_summary.is_none()));

    let info = sink.messages(LogKind::Info);
    assert_eq!(
        info,
        [
            "Starting Node.js library build, formats: es, cjs",
            "Starting browser library build, formats: es, cjs",
        ]
    );
    let success = sink.messages(LogKind::Success);
    assert_eq!(success.len(), 2);
    assert!(success.iter().all(|m| m.starts_with("Finished in ")));
}

#[tokio::test]
async fn failing_target_stops_the_run() {
    let dir = TempDir::new().expect("tempdir");
    let sink = MemorySink::new();
    let loader = ConfigLoader::from(vec![
        target("first", "node", &sink),
        target("second", "universal", &sink),
        target("third", "browser", &sink),
    ]);

    let bundler = Arc::new(FakeBundler::failing_on("second"));
    let err = BundleDriver::new(bundler.clone())
        .run(&loader, &ResolveOptions::with_cwd(dir.path()))
        .await
        .expect_err("second target fails");

    assert_eq!(bundler.built_names(), ["first", "second"]);
    match err {
        BundleError::Build { target, source } => {
            assert_eq!(target, "universal library");
            assert_eq!(source.to_string(), "Could not resolve entry module");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        sink.messages(LogKind::Error),
        ["Could not resolve entry module"]
    );
    assert_eq!(sink.messages(LogKind::Success).len(), 1);
}

#[tokio::test]
async fn disabled_summary_skips_finish_line() {
    let dir = TempDir::new().expect("tempdir");
    let sink = MemorySink::new();
    let mut options = target("quiet", "node", &sink);
    options.show_summary = Some(false);

    BundleDriver::new(FakeBundler::default())
        .run(&ConfigLoader::from(options), &ResolveOptions::with_cwd(dir.path()))
        .await
        .expect("build");

    assert_eq!(sink.messages(LogKind::Info).len(), 1);
    assert!(sink.messages(LogKind::Success).is_empty());
}

#[tokio::test]
async fn deferred_loader_errors_abort_before_building() {
    let dir = TempDir::new().expect("tempdir");
    let loader = ConfigLoader::from_async_fn(|| async {
        Err(memo_bundler::ConfigError::InvalidValue("config function threw".into()))
    });

    let bundler = Arc::new(FakeBundler::default());
    let err = BundleDriver::new(bundler.clone())
        .run(&loader, &ResolveOptions::with_cwd(dir.path()))
        .await
        .expect_err("loader fails");

    assert!(matches!(err, BundleError::Config(_)));
    assert!(bundler.built_names().is_empty());
}

#[tokio::test]
async fn cli_overrides_reach_every_target() {
    let dir = TempDir::new().expect("tempdir");
    let sink = MemorySink::new();
    let file = ConfigLoader::from(vec![target("a", "node", &sink), target("b", "browser", &sink)]);
    let overrides = BuildOptions {
        format: Some(vec![Format::Cjs]),
        ..Default::default()
    };

    let bundler = Arc::new(FakeBundler::default());
    BundleDriver::new(bundler.clone())
        .run(
            &file.with_overrides(overrides),
            &ResolveOptions::with_cwd(dir.path()),
        )
        .await
        .expect("build");

    let calls = bundler.calls.lock().expect("lock");
    assert!(calls.iter().all(|c| c.format == Some(vec![Format::Cjs])));
    assert!(sink
        .messages(LogKind::Info)
        .iter()
        .all(|m| m.ends_with("formats: cjs")));
}
