//! Builds the initial configuration used by every mutant run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ConfigError;
use super::document::{ConfigDocument, Element};
use super::rules;
use super::version::{Capability, RuntimeVersion};

/// File name of the synthesized configuration inside the output directory.
pub const CONFIG_FILE_NAME: &str = "phpunitConfiguration.initial.infection.xml";

/// Subdirectory of the output directory receiving structured coverage data.
pub const COVERAGE_DIR: &str = "coverage-xml";

/// Inputs for one synthesis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynthesisOptions {
    /// Directory receiving the synthesized file and coverage data.
    pub output_dir: PathBuf,
    /// Directory of the original configuration; relative paths resolve against it.
    pub config_dir: PathBuf,
    /// Target of the machine-readable result log.
    pub result_log_path: PathBuf,
    /// Source directories for a generated coverage whitelist, in order.
    pub source_dirs: Vec<String>,
    /// Skip adding the coverage and result loggers.
    pub skip_coverage: bool,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        let output_dir = std::env::temp_dir().join("mutation-harness");
        let config_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            result_log_path: output_dir.join("junit.xml"),
            output_dir,
            config_dir,
            source_dirs: vec!["src".to_string()],
            skip_coverage: false,
        }
    }
}

impl SynthesisOptions {
    /// Set output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Set the directory relative paths resolve against.
    pub fn with_config_dir(mut self, config_dir: impl Into<PathBuf>) -> Self {
        self.config_dir = config_dir.into();
        self
    }

    /// Set result log target.
    pub fn with_result_log_path(mut self, result_log_path: impl Into<PathBuf>) -> Self {
        self.result_log_path = result_log_path.into();
        self
    }

    /// Set whitelist source directories.
    pub fn with_source_dirs<I, S>(mut self, source_dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_dirs = source_dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether loggers are skipped.
    pub fn with_skip_coverage(mut self, skip_coverage: bool) -> Self {
        self.skip_coverage = skip_coverage;
        self
    }
}

/// Turns a user-authored configuration into the one mutant runs execute with.
///
/// Writes exactly one file per call. Calls sharing an output directory must be
/// serialized by the caller; the last writer wins.
#[derive(Debug, Clone)]
pub struct ConfigSynthesizer {
    options: SynthesisOptions,
}

impl ConfigSynthesizer {
    /// Create a synthesizer.
    pub fn new(options: SynthesisOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &SynthesisOptions {
        &self.options
    }

    /// Where [`Self::synthesize`] writes.
    pub fn output_path(&self) -> PathBuf {
        self.options.output_dir.join(CONFIG_FILE_NAME)
    }

    /// Build the execution-ready document and write it, returning its path.
    pub fn synthesize(
        &self,
        original: &ConfigDocument,
        runtime_version: &str,
    ) -> Result<PathBuf, ConfigError> {
        let document = self.build(original, runtime_version)?;
        let path = self.output_path();
        document.write_to(&path)?;
        info!(path = %path.display(), "wrote initial test configuration");
        Ok(path)
    }

    /// Parse `original_xml` and [`Self::synthesize`] it.
    pub fn synthesize_str(
        &self,
        original_xml: &str,
        runtime_version: &str,
    ) -> Result<PathBuf, ConfigError> {
        let original = ConfigDocument::parse(original_xml)?;
        self.synthesize(&original, runtime_version)
    }

    /// Apply every transformation without touching the filesystem.
    pub fn build(
        &self,
        original: &ConfigDocument,
        runtime_version: &str,
    ) -> Result<ConfigDocument, ConfigError> {
        let mut document = original.clone();
        rules::validate(&document)?;
        let version = RuntimeVersion::parse(runtime_version)?;

        add_coverage_filter_whitelist_if_absent(&mut document, &self.options.source_dirs);
        add_random_order_attributes(&mut document, &version);

        rules::replace_with_absolute_paths(&mut document, &self.options.config_dir);
        rules::set_stop_on_failure(&mut document);
        rules::deactivate_colors(&mut document);
        rules::remove_existing_loggers(&mut document);
        rules::remove_existing_printers(&mut document);

        if self.options.skip_coverage {
            debug!("coverage skipped, no loggers added");
        } else {
            add_logger(
                &mut document,
                "coverage-xml",
                &self.options.output_dir.join(COVERAGE_DIR),
            );
            add_logger(&mut document, "junit", &self.options.result_log_path);
        }

        Ok(document)
    }
}

/// Create `filter/whitelist` listing `source_dirs` unless a `filter` block
/// already exists. Returns whether one was created.
pub fn add_coverage_filter_whitelist_if_absent(
    document: &mut ConfigDocument,
    source_dirs: &[String],
) -> bool {
    let root = document.root_mut();
    if root.child("filter").is_some() {
        debug!("keeping user-defined coverage filter");
        return false;
    }

    let whitelist = source_dirs.iter().fold(Element::new("whitelist"), |list, dir| {
        list.with_child(Element::new("directory").with_text(dir.as_str()))
    });
    root.push_child(Element::new("filter").with_child(whitelist));
    debug!(dirs = source_dirs.len(), "created coverage whitelist");
    true
}

fn add_random_order_attributes(document: &mut ConfigDocument, version: &RuntimeVersion) {
    if !version.supports(Capability::RandomOrder) {
        debug!(%version, "runtime does not support random test order");
        return;
    }

    let root = document.root_mut();
    root.set_attribute("executionOrder", "random");
    root.set_attribute("resolveDependencies", "true");
}

fn add_logger(document: &mut ConfigDocument, log_type: &str, target: &Path) {
    document.root_mut().child_or_insert("logging").push_child(
        Element::new("log")
            .with_attribute("type", log_type)
            .with_attribute("target", target.display().to_string()),
    );
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    const ORIGINAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<phpunit bootstrap="vendor/autoload.php" colors="true" printerClass="Pretty\Printer">
    <testsuites>
        <testsuite name="unit">
            <directory>tests</directory>
        </testsuite>
    </testsuites>
    <logging>
        <log type="coverage-html" target="build/coverage"/>
    </logging>
</phpunit>"#;

    fn options(output_dir: &Path) -> SynthesisOptions {
        SynthesisOptions::default()
            .with_output_dir(output_dir)
            .with_config_dir("/project")
            .with_result_log_path(output_dir.join("junit.xml"))
            .with_source_dirs(["src/A", "src/B"])
    }

    fn original() -> ConfigDocument {
        ConfigDocument::parse(ORIGINAL).expect("fixture should parse")
    }

    fn directory_texts(document: &ConfigDocument) -> Vec<String> {
        document
            .root()
            .child("filter")
            .and_then(|f| f.child("whitelist"))
            .map(|w| w.children().map(Element::text).collect())
            .unwrap_or_default()
    }

    #[test]
    fn builder_overrides_work() {
        let cfg = SynthesisOptions::default()
            .with_output_dir("/tmp/out")
            .with_config_dir("/tmp/project")
            .with_result_log_path("/tmp/out/log.xml")
            .with_source_dirs(vec!["lib".to_string()])
            .with_skip_coverage(true);

        assert_eq!(cfg.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cfg.config_dir, PathBuf::from("/tmp/project"));
        assert_eq!(cfg.result_log_path, PathBuf::from("/tmp/out/log.xml"));
        assert_eq!(cfg.source_dirs, vec!["lib".to_string()]);
        assert!(cfg.skip_coverage);
        assert_eq!(
            ConfigSynthesizer::new(cfg).output_path(),
            PathBuf::from("/tmp/out").join(CONFIG_FILE_NAME)
        );
    }

    #[test]
    fn whitelist_creation_is_idempotent() {
        let mut document = original();
        let dirs = vec!["src/A".to_string(), "src/B".to_string()];

        assert!(add_coverage_filter_whitelist_if_absent(&mut document, &dirs));
        assert!(!add_coverage_filter_whitelist_if_absent(&mut document, &dirs));

        assert_eq!(document.root().count_children("filter"), 1);
        let filter = document.root().child("filter").expect("filter should exist");
        assert_eq!(filter.count_children("whitelist"), 1);
        assert_eq!(directory_texts(&document), dirs);
    }

    #[test]
    fn user_filter_is_left_untouched() {
        let xml = r#"<phpunit>
            <filter><whitelist><directory>app</directory></whitelist></filter>
        </phpunit>"#;
        let mut document = ConfigDocument::parse(xml).expect("fixture should parse");
        let before = document.clone();

        assert!(!add_coverage_filter_whitelist_if_absent(
            &mut document,
            &["src".to_string()]
        ));
        assert_eq!(document, before);
    }

    #[test]
    fn version_gate_controls_execution_order() {
        let tmp = tempdir().expect("tempdir should be created");
        let synthesizer = ConfigSynthesizer::new(options(tmp.path()));

        let old = synthesizer.build(&original(), "7.1.4").expect("build should succeed");
        assert_eq!(old.root().attribute("executionOrder"), None);
        assert_eq!(old.root().attribute("resolveDependencies"), None);

        let new = synthesizer.build(&original(), "7.2").expect("build should succeed");
        assert_eq!(new.root().attribute("executionOrder"), Some("random"));
        assert_eq!(new.root().attribute("resolveDependencies"), Some("true"));

        let newer = synthesizer.build(&new, "9.5.0").expect("rebuild should succeed");
        assert_eq!(newer.root().attribute("executionOrder"), Some("random"));
        assert_eq!(newer.root().attribute("resolveDependencies"), Some("true"));
        assert_eq!(
            newer
                .root()
                .attributes()
                .iter()
                .filter(|(k, _)| k == "executionOrder")
                .count(),
            1
        );
    }

    #[test]
    fn version_gate_below_threshold_keeps_user_attributes() {
        let tmp = tempdir().expect("tempdir should be created");
        let xml = r#"<phpunit executionOrder="defects"/>"#;
        let document = ConfigDocument::parse(xml).expect("fixture should parse");

        let built = ConfigSynthesizer::new(options(tmp.path()))
            .build(&document, "6.5")
            .expect("build should succeed");
        assert_eq!(built.root().attribute("executionOrder"), Some("defects"));
        assert_eq!(built.root().attribute("resolveDependencies"), None);
    }

    #[test]
    fn loggers_replace_user_loggers() {
        let tmp = tempdir().expect("tempdir should be created");
        let built = ConfigSynthesizer::new(options(tmp.path()))
            .build(&original(), "7.0")
            .expect("build should succeed");

        let root = built.root();
        assert_eq!(root.count_children("logging"), 1);
        let logs: Vec<(Option<&str>, Option<&str>)> = root
            .child("logging")
            .expect("logging should exist")
            .children()
            .map(|log| (log.attribute("type"), log.attribute("target")))
            .collect();

        let coverage = tmp.path().join(COVERAGE_DIR).display().to_string();
        let junit = tmp.path().join("junit.xml").display().to_string();
        assert_eq!(
            logs,
            vec![
                (Some("coverage-xml"), Some(coverage.as_str())),
                (Some("junit"), Some(junit.as_str())),
            ]
        );
        assert_eq!(root.attribute("printerClass"), None);
        assert_eq!(root.attribute("colors"), Some("false"));
        assert_eq!(root.attribute("stopOnFailure"), Some("true"));
        assert_eq!(root.attribute("bootstrap"), Some("/project/vendor/autoload.php"));
    }

    #[test]
    fn skip_coverage_adds_no_loggers() {
        let tmp = tempdir().expect("tempdir should be created");
        let built = ConfigSynthesizer::new(options(tmp.path()).with_skip_coverage(true))
            .build(&original(), "7.2")
            .expect("build should succeed");

        assert!(built.root().child("logging").is_none());
        assert_eq!(
            directory_texts(&built),
            vec!["/project/src/A".to_string(), "/project/src/B".to_string()]
        );
    }

    #[test]
    fn invalid_root_fails_before_writing() {
        let tmp = tempdir().expect("tempdir should be created");
        let synthesizer = ConfigSynthesizer::new(options(tmp.path()));

        let result = synthesizer.synthesize_str("<configuration/>", "7.2");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        assert!(!synthesizer.output_path().exists());
    }

    #[test]
    fn bad_version_is_reported() {
        let tmp = tempdir().expect("tempdir should be created");
        let result = ConfigSynthesizer::new(options(tmp.path())).build(&original(), "latest");
        assert!(matches!(result, Err(ConfigError::InvalidVersion(_))));
    }

    #[test]
    fn synthesize_writes_single_file() {
        let tmp = tempdir().expect("tempdir should be created");
        let synthesizer = ConfigSynthesizer::new(options(tmp.path()));

        let path = synthesizer
            .synthesize(&original(), "7.2.0")
            .expect("synthesis should succeed");
        assert_eq!(path, tmp.path().join(CONFIG_FILE_NAME));

        let written = ConfigDocument::load(&path).expect("written file should parse");
        assert_eq!(
            written,
            synthesizer.build(&original(), "7.2.0").expect("build should succeed")
        );

        let entries: Vec<_> = std::fs::read_dir(tmp.path())
            .expect("tempdir should be readable")
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn write_failure_is_io_error() {
        let tmp = tempdir().expect("tempdir should be created");
        let missing = tmp.path().join("does-not-exist");
        let result = ConfigSynthesizer::new(options(&missing)).synthesize(&original(), "7.2");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
