//! ProjectScanner: discover → brand-detect → extract → post-scrub.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use blackbox_core::config::{BlackboxConfig, ConfigOverrides};
use blackbox_core::constants::{UNKNOWN_OBJECT, VERSION};
use blackbox_core::errors::{ConfigError, ExtractError, ScanError};
use blackbox_core::events::{
    BlackboxEventHandler, EventDispatcher, ScanCompleteEvent, ScanErrorEvent, ScanPhase,
    ScanStartedEvent,
};
use blackbox_core::traits::{Cancellable, CancellationToken};
use blackbox_core::types::collections::fx_set_with_capacity;
use blackbox_core::types::ExtractedPattern;
use ignore::WalkBuilder;

use super::classify::classify;
use super::hasher::source_hash;
use super::root::resolve_root;
use super::types::{DiscoveredFile, ScanProgress, ScanResult};
use crate::anonymizer::{BrandScrubber, CompanyDictionary, Stoplists};
use crate::extractors::{common, extractor_for, ExtractionContext, MetadataKind};

const FIELD_SUFFIX: &str = ".field-meta.xml";

/// Scans one project at a time.
///
/// The scanner owns no per-scan state: every call to [`scan`](Self::scan)
/// builds its own brand scrubber, so one scanner can serve many projects.
/// The cancellation token is not reset between scans; call
/// `cancellation().reset()` to reuse a cancelled scanner.
pub struct ProjectScanner {
    config: BlackboxConfig,
    dispatcher: EventDispatcher,
    cancellation: CancellationToken,
    dictionary: Option<Arc<CompanyDictionary>>,
}

impl ProjectScanner {
    pub fn new(config: BlackboxConfig) -> Self {
        Self {
            config,
            dispatcher: EventDispatcher::new(),
            cancellation: CancellationToken::new(),
            dictionary: None,
        }
    }

    /// Scanner configured from the layered config of the project at `project`.
    pub fn for_project(project: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        Ok(Self::new(BlackboxConfig::load(project, overrides)?))
    }

    /// Use `dictionary` instead of the configured dictionary file.
    pub fn with_dictionary(mut self, dictionary: Arc<CompanyDictionary>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn register_handler(&mut self, handler: Arc<dyn BlackboxEventHandler>) {
        self.dispatcher.register(handler);
    }

    pub fn config(&self) -> &BlackboxConfig {
        &self.config
    }

    /// Token checked between files; cancel it from any thread.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Scan the project at `project_path`.
    ///
    /// Never fails as a whole: an unresolvable metadata root, unreadable
    /// files, extractor faults and cancellation all end up in
    /// `progress.errors`, next to whatever patterns were extracted.
    pub fn scan(&self, project_path: &Path) -> ScanResult {
        let source_id = project_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| project_path.display().to_string());
        let source_hash = source_hash(&source_id);
        let mut progress = ScanProgress::default();

        tracing::info!(
            version = VERSION,
            source_id = %source_id,
            path = %project_path.display(),
            "scan started"
        );
        self.dispatcher.emit_scan_started(&ScanStartedEvent {
            root: project_path.to_path_buf(),
            source_id: source_id.clone(),
        });

        let mut patterns = Vec::new();
        let mut brands_detected = 0;
        match resolve_root(project_path) {
            Ok(root) => {
                // ── Discover ──
                let files = self.discover(&root, &mut progress);
                progress.total_files = files.len();
                tracing::info!(root = %root.display(), files = files.len(), "discovery complete");
                self.emit_progress(&progress, ScanPhase::Discover);

                // ── Brand detect ──
                let scrubber = self.configure_scrubber(&root, &files, &mut progress);
                brands_detected = scrubber.term_count();
                self.emit_progress(&progress, ScanPhase::BrandDetect);

                // ── Extract ──
                let ctx = ExtractionContext::new(&scrubber, &source_hash, &root);
                patterns = self.extract_all(project_path, &files, &ctx, &mut progress);
                self.emit_progress(&progress, ScanPhase::Extract);

                // ── Post-scrub ──
                post_scrub(&scrubber, &mut patterns);
                self.emit_progress(&progress, ScanPhase::PostScrub);
            }
            Err(e) => self.record_error(&mut progress, None, e.to_string()),
        }

        tracing::info!(
            source_id = %source_id,
            files = progress.processed_files,
            patterns = patterns.len(),
            errors = progress.errors.len(),
            "scan complete"
        );
        self.dispatcher.emit_scan_complete(&ScanCompleteEvent {
            source_id: source_id.clone(),
            total_files: progress.total_files,
            patterns_found: patterns.len(),
            brands_detected,
            error_count: progress.errors.len(),
        });

        ScanResult {
            source_id,
            source_hash,
            project_path: project_path.to_path_buf(),
            patterns,
            progress,
        }
    }

    /// Classified files under `root`, in name-sorted walk order. Hidden
    /// entries and files above the size limit are skipped.
    fn discover(&self, root: &Path, progress: &mut ScanProgress) -> Vec<DiscoveredFile> {
        let max_file_size = self.config.scan.effective_max_file_size();
        let walker = WalkBuilder::new(root)
            .hidden(true)
            .parents(false)
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let error = ScanError::Io {
                        path: root.to_path_buf(),
                        source: std::io::Error::other(err.to_string()),
                    };
                    self.record_error(progress, None, error.to_string());
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let Some(kind) = classify(path.strip_prefix(root).unwrap_or(path)) else {
                continue;
            };
            let file_size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            if file_size > max_file_size {
                tracing::debug!(path = %path.display(), file_size, "skipping oversized file");
                continue;
            }
            files.push(DiscoveredFile {
                path: path.to_path_buf(),
                kind,
                file_size,
            });
        }
        files
    }

    /// Build this scan's scrubber: configured terms first, then whatever the
    /// project's custom field names reveal.
    fn configure_scrubber(
        &self,
        root: &Path,
        files: &[DiscoveredFile],
        progress: &mut ScanProgress,
    ) -> BrandScrubber {
        let brand = &self.config.brand;
        let stoplists = Stoplists::from_config(brand).unwrap_or_else(|e| {
            self.record_error(progress, None, e.to_string());
            Stoplists::builtin()
        });

        let mut scrubber = BrandScrubber::with_stoplists(stoplists);
        scrubber.add_terms(&brand.custom_terms);

        let field_names: Vec<String> = files
            .iter()
            .filter(|f| f.kind == MetadataKind::Field)
            .map(|f| qualified_field_name(root, &f.path))
            .collect();
        let dictionary = self.dictionary();
        let detected = scrubber.auto_detect_brands(&field_names, &dictionary);

        tracing::info!(
            fields = field_names.len(),
            custom_terms = brand.custom_terms.len(),
            detected = detected.len(),
            "brand detection complete"
        );
        scrubber
    }

    fn dictionary(&self) -> Arc<CompanyDictionary> {
        if let Some(dictionary) = &self.dictionary {
            return Arc::clone(dictionary);
        }
        let brand = &self.config.brand;
        if brand.effective_disable_dictionary() {
            return Arc::new(CompanyDictionary::empty());
        }
        match brand.effective_dictionary_path() {
            Some(path) => CompanyDictionary::shared(&path),
            None => Arc::new(CompanyDictionary::empty()),
        }
    }

    fn extract_all(
        &self,
        project_path: &Path,
        files: &[DiscoveredFile],
        ctx: &ExtractionContext<'_>,
        progress: &mut ScanProgress,
    ) -> Vec<ExtractedPattern> {
        let interval = self.config.scan.effective_progress_interval();
        let mut patterns = Vec::new();

        for file in files {
            if self.cancellation.is_cancelled() {
                self.record_error(progress, None, ScanError::Cancelled.to_string());
                break;
            }

            progress.current_file = file
                .path
                .strip_prefix(project_path)
                .unwrap_or(&file.path)
                .display()
                .to_string();
            progress.processed_files += 1;
            progress.count_kind(file.kind);

            match run_extractor(file, ctx) {
                Ok(found) => {
                    tracing::debug!(
                        file = %progress.current_file,
                        kind = %file.kind,
                        patterns = found.len(),
                        "extracted"
                    );
                    progress.patterns_found += found.len();
                    patterns.extend(found);
                }
                Err(e) => {
                    let message = format!("Error parsing {}: {e}", common::file_name(&file.path));
                    let current = progress.current_file.clone();
                    self.record_error(progress, Some(current), message);
                }
            }

            if progress.processed_files % interval == 0 {
                self.emit_progress(progress, ScanPhase::Extract);
            }
        }
        patterns
    }

    fn record_error(&self, progress: &mut ScanProgress, file: Option<String>, message: String) {
        tracing::warn!(file = file.as_deref().unwrap_or(""), "{message}");
        self.dispatcher.emit_scan_error(&ScanErrorEvent {
            file,
            message: message.clone(),
        });
        progress.errors.push(message);
    }

    fn emit_progress(&self, progress: &ScanProgress, phase: ScanPhase) {
        self.dispatcher.emit_scan_progress(&progress.to_event(phase));
    }
}

/// `Object.Field__c` for fields under `objects/<Object>/`, else the bare
/// field name.
fn qualified_field_name(root: &Path, file: &Path) -> String {
    let field = common::metadata_stem(file, FIELD_SUFFIX);
    match common::object_from_path(file.strip_prefix(root).unwrap_or(file)) {
        object if object == UNKNOWN_OBJECT => field,
        object => format!("{object}.{field}"),
    }
}

/// Run the extractor for `file`, turning a panic into an extractor fault.
fn run_extractor(
    file: &DiscoveredFile,
    ctx: &ExtractionContext<'_>,
) -> Result<Vec<ExtractedPattern>, ExtractError> {
    let extractor = extractor_for(file.kind);
    catch_unwind(AssertUnwindSafe(|| extractor.extract(&file.path, ctx))).unwrap_or_else(|payload| {
        Err(ExtractError::Fault {
            extractor: extractor.name(),
            message: panic_message(payload.as_ref()),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "extractor panicked".to_string()
    }
}

/// Re-apply the fully configured scrubber to the human-facing fields.
/// Field references stay de-duplicated after relabeling.
fn post_scrub(scrubber: &BrandScrubber, patterns: &mut [ExtractedPattern]) {
    if scrubber.is_empty() {
        return;
    }
    for pattern in patterns {
        pattern.name = scrubber.scrub(&pattern.name);
        pattern.description = scrubber.scrub(&pattern.description);
        pattern.source_object = scrubber.scrub(&pattern.source_object);

        let refs = std::mem::take(&mut pattern.field_references);
        let mut seen = fx_set_with_capacity(refs.len());
        pattern.field_references = refs
            .iter()
            .map(|r| scrubber.scrub(r))
            .filter(|r| seen.insert(r.clone()))
            .collect();

        for tag in &mut pattern.tags {
            *tag = scrubber.scrub(tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackbox_core::types::{PatternCategory, PatternType};

    fn pattern(name: &str, refs: &[&str]) -> ExtractedPattern {
        ExtractedPattern {
            pattern_type: PatternType::FieldDefinition,
            category: PatternCategory::DataModel,
            name: name.to_string(),
            description: format!("{name} field."),
            source_object: "Acme_Account__c".to_string(),
            structure: serde_json::json!({}),
            field_references: refs.iter().map(|r| r.to_string()).collect(),
            api_version: String::new(),
            complexity_score: 1,
            tags: vec!["acme_account__c".to_string()],
            source_hash: String::new(),
            source_file: String::new(),
        }
    }

    #[test]
    fn post_scrub_relabels_and_dedups() {
        let mut scrubber = BrandScrubber::new();
        scrubber.add_terms(["Acme"]);
        let mut patterns = vec![pattern("Acme Tier", &["ACME_Tier__c", "Acme_Tier__c", "Name"])];
        post_scrub(&scrubber, &mut patterns);

        let p = &patterns[0];
        assert_eq!(p.name, "Brand_A Tier");
        assert_eq!(p.source_object, "Brand_A_Account__c");
        assert_eq!(p.field_references, vec!["Brand_A_Tier__c", "Name"]);
        assert_eq!(p.tags, vec!["Brand_A_account__c"]);
    }

    #[test]
    fn qualified_names_use_the_object_directory() {
        let root = Path::new("/p/force-app");
        assert_eq!(
            qualified_field_name(root, Path::new("/p/force-app/main/default/objects/Account/fields/Tier__c.field-meta.xml")),
            "Account.Tier__c"
        );
        assert_eq!(
            qualified_field_name(root, Path::new("/p/force-app/loose/Tier__c.field-meta.xml")),
            "Tier__c"
        );
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload = catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom");
    }
}
