//! Keyword sets and pattern lists shared by every detector.
//!
//! A [`Lexicon`] is plain data: it can be loaded from YAML, persisted inside a
//! model artifact and compared for equality. [`CompiledLexicon`] is the
//! read-only form the detectors consume, with every regex compiled once.

use crate::error::{Result, ScamAlertError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

const DEFAULT_SAFE_WORDS: &[&str] = &[
    "selamat", "terima", "kasih", "halo", "hai", "pagi", "siang", "malam", "sore", "kamu",
    "anda", "saya", "aku", "kita", "baik", "oke", "ok", "ya", "tidak", "nanti", "besok",
    "tolong", "maaf", "permisi", "silakan", "mohon",
];

const DEFAULT_STRONG_INDICATORS: &[&str] = &[
    // Lottery and prizes
    "menang", "undian", "hadiah", "pemenang", "terpilih", "winner", "congratulations",
    "selamat anda", "anda menang", "berkat", "rezeki", "gratis", "bonus", "prize", "reward",
    "claim", "klaim",
    // Money and transfers
    "transfer", "kirim dana", "kirim uang", "bayar", "payment", "admin fee", "biaya admin",
    "ongkir", "shipping fee", "ongkos", "processing fee", "biaya proses", "dp",
    "down payment",
    // Urgency and pressure
    "segera", "urgent", "cepat", "sekarang", "immediately", "now", "habis", "terbatas",
    "limited", "expired", "kadaluarsa", "diblokir", "blocked", "suspend", "ditangguhkan",
    // Links and verification
    "klik", "click", "link", "url", "verifikasi", "verify", "konfirmasi", "confirm",
    "aktivasi", "activation", "update",
    // Investment and lending
    "investasi", "profit", "untung", "dijamin", "guaranteed", "modal", "capital", "return",
    "roi", "income", "penghasilan", "pinjaman", "loan", "kredit", "credit", "dana cair",
    "dana cepat", "tanpa jaminan", "tanpa survei", "bunga rendah", "bunga 0",
    // Product scams
    "promo terbatas", "diskon besar", "obat kuat", "forex", "trading", "crypto", "bitcoin",
    "mlm", "arisan", "binary",
    // Prepaid credit
    "isi ulang", "isi pulsa", "pulsa gratis", "paket data", "voucher pulsa",
    "token listrik",
    // PINs and codes
    "pin", "kode unik", "kode otp", "password", "no pin", "kode verifikasi",
    "security code",
    // Operator and brand names
    "telkomsel", "indosat", "xl", "tri", "smartfren", "axis", "bca", "mandiri", "bri", "bni",
    "gopay", "ovo", "dana", "shopee", "tokopedia", "bukalapak", "lazada",
    // Contact requests
    "hubungi", "contact", "whatsapp", "wa 08", "wa:", "call", "sms", "info lengkap",
    "info klik",
    // Fake online invitations
    "undangan", "invitation", "zoom meeting", "google meet", "join meeting", "meeting link",
    "webinar gratis", "seminar online", "klik untuk join", "daftar sekarang",
    "registrasi gratis", "sertifikat gratis", "e-certificate", "limited seat",
    "kursi terbatas", "buruan daftar",
    // Malicious APK and app installs
    "download apk", "install apk", "aplikasi", "apps", "file apk", ".apk", "unduh aplikasi",
    "download apps", "install apps", "update aplikasi", "upgrade apps", "apk terbaru",
    "versi baru", "new version", "update sekarang", "izinkan akses", "allow permission",
    "aktifkan dari sumber tidak dikenal", "unknown sources", "sumber tidak dikenal",
    "download dari link", "unduh dari", "klik download",
];

const DEFAULT_SUSPICIOUS_DOMAIN_PATTERNS: &[&str] = &[
    r"hadiah.*\.com",
    r"undian.*\.com",
    r"bonus.*\.com",
    r"promo.*\.com",
    r"indo.*\d{4}\.com",
    r".*gratis.*\.com",
    r"\d{4,}\.com",
    r".*meeting.*\.com",
    r".*zoom.*\.com",
    r".*webinar.*\.com",
    r".*undangan.*\.com",
    r".*sertifikat.*\.com",
    r".*event.*\d+\.com",
];

const DEFAULT_CRITICAL_PATTERNS: &[&str] = &[
    r"selamat.*menang.*hadiah",
    r"selamat.*dapat.*hadiah",
    r"selamat.*undian",
    r"congratulations.*won",
    r"anda.*pemenang",
    r"you.*winner",
    r"transfer.*biaya",
    r"klik.*link.*klaim",
    r"pin.*\d{5,}",
    r"hadiah.*rp\.?\d+",
    r"hadiah.*\d+.*juta",
    r"menang.*\d+.*juta",
    r"bonus.*\d+.*juta",
    r"undangan.*klik.*link",
    r"meeting.*link.*\w+\.com",
    r"zoom.*meeting.*id.*\d+",
    r"sertifikat.*gratis.*daftar",
    r"webinar.*gratis.*terbatas",
    r"join.*meeting.*sekarang",
];

/// Any scheme prefix, `www.` prefix or a dot followed by a short TLD-like suffix.
const URL_MARKER_PATTERN: &str = r"https?://|www\.|\.[a-z]{2,3}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    #[serde(default)]
    pub safe_words: BTreeSet<String>,
    #[serde(default)]
    pub strong_indicators: Vec<String>,
    #[serde(default)]
    pub critical_patterns: Vec<String>,
    #[serde(default)]
    pub suspicious_domain_patterns: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            safe_words: DEFAULT_SAFE_WORDS.iter().map(|s| s.to_string()).collect(),
            strong_indicators: owned(DEFAULT_STRONG_INDICATORS),
            critical_patterns: owned(DEFAULT_CRITICAL_PATTERNS),
            suspicious_domain_patterns: owned(DEFAULT_SUSPICIOUS_DOMAIN_PATTERNS),
        }
    }
}

impl Lexicon {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let lexicon: Lexicon = serde_yaml::from_str(&content)?;
        Ok(lexicon)
    }

    /// Safe words that also appear as a strong indicator. These are data bugs:
    /// a message cannot sensibly be both innocuous and suspicious for one word.
    pub fn purpose_overlaps(&self) -> Vec<String> {
        self.strong_indicators
            .iter()
            .filter(|indicator| self.safe_words.contains(indicator.to_lowercase().as_str()))
            .cloned()
            .collect()
    }

    pub fn compile(&self) -> Result<CompiledLexicon> {
        for overlap in self.purpose_overlaps() {
            log::warn!("Lexicon entry '{}' is both a safe word and a strong indicator", overlap);
        }

        let critical_patterns = compile_patterns("critical", &self.critical_patterns)?;
        let suspicious_domains = compile_patterns("suspicious domain", &self.suspicious_domain_patterns)?;

        let mut seen = HashSet::new();
        let strong_indicators = self
            .strong_indicators
            .iter()
            .map(|s| s.to_lowercase())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();

        let safe_words = self.safe_words.iter().map(|s| s.to_lowercase()).collect();

        Ok(CompiledLexicon {
            source: self.clone(),
            safe_words,
            strong_indicators,
            critical_patterns,
            suspicious_domains,
            url_marker: Regex::new(URL_MARKER_PATTERN).expect("URL marker pattern is valid"),
        })
    }
}

fn compile_patterns(kind: &'static str, patterns: &[String]) -> Result<Vec<(String, Regex)>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern)
                .map(|re| (pattern.clone(), re))
                .map_err(|source| ScamAlertError::InvalidPattern {
                    kind,
                    pattern: pattern.clone(),
                    source,
                })
        })
        .collect()
}

/// Lexicon with patterns compiled and keywords lower-cased. Immutable once
/// built; share it behind an `Arc`.
#[derive(Debug)]
pub struct CompiledLexicon {
    source: Lexicon,
    pub(crate) safe_words: HashSet<String>,
    pub(crate) strong_indicators: Vec<String>,
    pub(crate) critical_patterns: Vec<(String, Regex)>,
    pub(crate) suspicious_domains: Vec<(String, Regex)>,
    pub(crate) url_marker: Regex,
}

impl CompiledLexicon {
    pub fn source(&self) -> &Lexicon {
        &self.source
    }

    pub fn indicator_count(&self) -> usize {
        self.strong_indicators.len()
    }

    pub fn critical_pattern_count(&self) -> usize {
        self.critical_patterns.len()
    }

    pub fn suspicious_domain_count(&self) -> usize {
        self.suspicious_domains.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lexicon_compiles() {
        let compiled = Lexicon::default().compile().unwrap();
        assert_eq!(compiled.critical_pattern_count(), 19);
        assert_eq!(compiled.suspicious_domain_count(), 13);
        assert!(compiled.indicator_count() > 150);
    }

    #[test]
    fn test_default_lexicon_has_no_purpose_overlap() {
        assert!(Lexicon::default().purpose_overlaps().is_empty());
    }

    #[test]
    fn test_overlap_is_reported_not_rejected() {
        let mut lexicon = Lexicon::default();
        lexicon.strong_indicators.push("Halo".to_string());
        assert_eq!(lexicon.purpose_overlaps(), vec!["Halo".to_string()]);
        assert!(lexicon.compile().is_ok());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let lexicon = Lexicon {
            critical_patterns: vec!["hadiah(".to_string()],
            ..Lexicon::default()
        };
        match lexicon.compile() {
            Err(ScamAlertError::InvalidPattern { kind, pattern, .. }) => {
                assert_eq!(kind, "critical");
                assert_eq!(pattern, "hadiah(");
            }
            other => panic!("Expected invalid pattern error, got {:?}", other),
        }
    }

    #[test]
    fn test_lexicon_yaml_partial_override() {
        let yaml = r#"
safe_words: [halo, pagi]
strong_indicators: [undian, hadiah]
"#;
        let lexicon: Lexicon = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(lexicon.safe_words.len(), 2);
        assert!(lexicon.critical_patterns.is_empty());
        let compiled = lexicon.compile().unwrap();
        assert_eq!(compiled.indicator_count(), 2);
    }
}
