//! Line-local pattern matching over package-manager output

use regex::Regex;
use rootstrap_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};

/// Archive suffixes recognised in download lines unless configured otherwise
pub const DEFAULT_ARCHIVE_SUFFIXES: &[&str] = &[".pkg.tar.xz", ".pkg.tar.zst"];

/// Structured interpretation of one raw output line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ClassifiedEvent {
    /// A parenthesized count such as `Packages (57)`
    TotalAnnounced(u64),
    /// `downloading <name><archive-suffix>`
    DownloadStarted(String),
    /// `installing <name>...`
    InstallStarted(String),
    Unrecognized,
}

impl ClassifiedEvent {
    #[must_use]
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Unrecognized)
    }
}

/// Stateless classifier for package-manager console lines.
///
/// The count matcher runs independently of the phase matchers, so a line
/// can yield a `TotalAnnounced` followed by a phase event. Between the two
/// phase matchers download wins: a line that mentions both is a download.
#[derive(Debug, Clone)]
pub struct OutputClassifier {
    total: Regex,
    download: Regex,
    install: Regex,
}

impl OutputClassifier {
    /// Build a classifier recognising the given archive suffixes
    ///
    /// # Errors
    ///
    /// Returns a config error if `suffixes` is empty, or an internal error
    /// if the patterns fail to compile.
    pub fn new<S: AsRef<str>>(suffixes: &[S]) -> Result<Self, Error> {
        if suffixes.is_empty() {
            return Err(ConfigError::Invalid {
                message: "at least one package archive suffix is required".to_string(),
            }
            .into());
        }

        let alternatives = suffixes
            .iter()
            .map(|suffix| regex::escape(suffix.as_ref()))
            .collect::<Vec<_>>()
            .join("|");

        let total = Regex::new(r"\((\d+)\)").map_err(|e| Error::internal(e.to_string()))?;
        let download = Regex::new(&format!(r"downloading\s+(.+?)(?:{alternatives})"))
            .map_err(|e| Error::internal(e.to_string()))?;
        let install =
            Regex::new(r"installing(.*?)\.\.\.").map_err(|e| Error::internal(e.to_string()))?;

        Ok(Self {
            total,
            download,
            install,
        })
    }

    /// Classifier for the archive formats pacman currently produces
    ///
    /// # Errors
    ///
    /// Returns an error only if the built-in patterns fail to compile.
    pub fn with_default_suffixes() -> Result<Self, Error> {
        Self::new(DEFAULT_ARCHIVE_SUFFIXES)
    }

    /// Classify one line.
    ///
    /// Always returns at least one event; a line matching nothing yields a
    /// single `Unrecognized`. When a count and a phase marker share a line
    /// the count comes first.
    #[must_use]
    pub fn classify(&self, line: &str) -> Vec<ClassifiedEvent> {
        let mut events = Vec::with_capacity(2);

        if let Some(total) = self.announced_total(line) {
            events.push(ClassifiedEvent::TotalAnnounced(total));
        }

        if let Some(name) = self.download_target(line) {
            events.push(ClassifiedEvent::DownloadStarted(name));
        } else if let Some(name) = self.install_target(line) {
            events.push(ClassifiedEvent::InstallStarted(name));
        }

        if events.is_empty() {
            events.push(ClassifiedEvent::Unrecognized);
        }
        events
    }

    fn announced_total(&self, line: &str) -> Option<u64> {
        // Counts too large for u64 are noise, not totals.
        self.total
            .captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|digits| digits.as_str().parse().ok())
    }

    fn download_target(&self, line: &str) -> Option<String> {
        self.download
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|name| name.as_str().trim().to_string())
    }

    fn install_target(&self, line: &str) -> Option<String> {
        self.install
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|name| name.as_str().trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> OutputClassifier {
        OutputClassifier::with_default_suffixes().unwrap()
    }

    #[test]
    fn total_only() {
        assert_eq!(
            classifier().classify("Packages (57) base linux"),
            vec![ClassifiedEvent::TotalAnnounced(57)]
        );
    }

    #[test]
    fn download_xz_and_zst() {
        let c = classifier();
        assert_eq!(
            c.classify("downloading foo.pkg.tar.xz"),
            vec![ClassifiedEvent::DownloadStarted("foo".into())]
        );
        assert_eq!(
            c.classify(":: downloading glibc-2.39-1-x86_64.pkg.tar.zst..."),
            vec![ClassifiedEvent::DownloadStarted("glibc-2.39-1-x86_64".into())]
        );
    }

    #[test]
    fn download_without_archive_suffix_is_ignored() {
        assert_eq!(
            classifier().classify("downloading core.db..."),
            vec![ClassifiedEvent::Unrecognized]
        );
    }

    #[test]
    fn install_marker() {
        assert_eq!(
            classifier().classify("installing pkg-a..."),
            vec![ClassifiedEvent::InstallStarted("pkg-a".into())]
        );
    }

    #[test]
    fn install_without_ellipsis_is_ignored() {
        assert_eq!(
            classifier().classify("installing pkg-a"),
            vec![ClassifiedEvent::Unrecognized]
        );
    }

    #[test]
    fn count_and_phase_on_one_line() {
        assert_eq!(
            classifier().classify("(57) downloading bar.pkg.tar.xz"),
            vec![
                ClassifiedEvent::TotalAnnounced(57),
                ClassifiedEvent::DownloadStarted("bar".into())
            ]
        );
        assert_eq!(
            classifier().classify("(3) installing baz..."),
            vec![
                ClassifiedEvent::TotalAnnounced(3),
                ClassifiedEvent::InstallStarted("baz".into())
            ]
        );
    }

    #[test]
    fn download_wins_over_install() {
        assert_eq!(
            classifier().classify("installing... downloading qux.pkg.tar.xz"),
            vec![ClassifiedEvent::DownloadStarted("qux".into())]
        );
    }

    #[test]
    fn first_count_wins() {
        assert_eq!(
            classifier().classify("(4) of (9)"),
            vec![ClassifiedEvent::TotalAnnounced(4)]
        );
    }

    #[test]
    fn progress_fraction_is_not_a_total() {
        assert_eq!(
            classifier().classify("(1/5) checking keys in keyring"),
            vec![ClassifiedEvent::Unrecognized]
        );
    }

    #[test]
    fn oversized_count_is_unrecognized() {
        assert_eq!(
            classifier().classify("(99999999999999999999999)"),
            vec![ClassifiedEvent::Unrecognized]
        );
    }

    #[test]
    fn garbage_is_unrecognized() {
        let c = classifier();
        for line in ["", "\u{fffd}\u{fffd}", "   ", "error: target not found: foo"] {
            assert_eq!(c.classify(line), vec![ClassifiedEvent::Unrecognized]);
        }
    }

    #[test]
    fn custom_suffix_is_escaped() {
        let c = OutputClassifier::new(&[".deb"]).unwrap();
        assert_eq!(
            c.classify("downloading libc6.deb"),
            vec![ClassifiedEvent::DownloadStarted("libc6".into())]
        );
        assert_eq!(
            c.classify("downloading libc6xdeb"),
            vec![ClassifiedEvent::Unrecognized]
        );
    }

    #[test]
    fn empty_suffix_list_is_rejected() {
        let empty: [&str; 0] = [];
        assert!(OutputClassifier::new(&empty).is_err());
    }
}
