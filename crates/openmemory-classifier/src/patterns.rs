use openmemory_core::memory::Sector;
use regex::Regex;
use std::sync::LazyLock;

/// Ordered regex sets per sector. Order matters for nothing except
/// readability here — scoring sums every match, it doesn't short-circuit.
struct SectorPatterns {
    sector: Sector,
    patterns: &'static [&'static str],
}

const SECTOR_PATTERNS: &[SectorPatterns] = &[
    SectorPatterns {
        sector: Sector::Episodic,
        patterns: &[
            r"(?i)\byesterday\b",
            r"(?i)\blast (week|month|year|summer|winter|night)\b",
            r"(?i)\b(i|we) (went|visited|saw|met|traveled|flew|drove)\b",
            r"(?i)\bon [A-Z][a-z]+day\b",
            r"(?i)\b\d{1,2}(st|nd|rd|th)?\s+(of\s+)?(january|february|march|april|may|june|july|august|september|october|november|december)\b",
            r"(?i)\bremember when\b",
        ],
    },
    SectorPatterns {
        sector: Sector::Semantic,
        patterns: &[
            r"(?i)\bis (a|an|the)\b",
            r"(?i)\bdefin(e|ition|ed)\b",
            r"(?i)\bmeans?\b",
            r"(?i)\bconsists? of\b",
            r"(?i)\bcapital of\b",
            r"(?i)\bfact(s)?\b",
        ],
    },
    SectorPatterns {
        sector: Sector::Procedural,
        patterns: &[
            r"(?i)\bhow to\b",
            r"(?i)\bstep \d+\b",
            r"(?i)\bfirst,?\s.+then\b",
            r"(?i)\brecipe\b",
            r"(?i)\binstructions?\b",
            r"(?i)\b(install|configure|set up|run)\b",
        ],
    },
    SectorPatterns {
        sector: Sector::Emotional,
        patterns: &[
            r"(?i)\bi (feel|felt|am feeling)\b",
            r"(?i)\b(happy|sad|angry|anxious|excited|proud|afraid|grateful|frustrated)\b",
            r"(?i)\bmade me (feel|cry|smile|laugh)\b",
            r"(?i)\blove(d)?\b",
            r"(?i)\bhate(d)?\b",
        ],
    },
    SectorPatterns {
        sector: Sector::Reflective,
        patterns: &[
            r"(?i)\bi (think|believe|realize|realized)\b",
            r"(?i)\bin hindsight\b",
            r"(?i)\blooking back\b",
            r"(?i)\bi (should|shouldn't) have\b",
            r"(?i)\blesson learned\b",
            r"(?i)\bin retrospect\b",
        ],
    },
];

pub(crate) struct CompiledPatterns {
    pub(crate) sector: Sector,
    pub(crate) regexes: Vec<Regex>,
}

pub(crate) static COMPILED: LazyLock<Vec<CompiledPatterns>> = LazyLock::new(|| {
    SECTOR_PATTERNS
        .iter()
        .map(|sp| CompiledPatterns {
            sector: sp.sector,
            regexes: sp.patterns.iter().map(|p| Regex::new(p).expect("static pattern is valid regex")).collect(),
        })
        .collect()
});
