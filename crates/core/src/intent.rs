//! Keyword-based intent classification for incoming health questions.
//!
//! The keyword tables are a best-effort heuristic. They decide which
//! capabilities run for a query, never whether a query is answered.

/// Phrases that signal the user wants a doctor or specialist referral
const DOCTOR_KEYWORDS: &[&str] = &[
    "doctor",
    "specialist",
    "physician",
    "consult",
    "consultation",
    "appointment",
    "cardiologist",
    "neurologist",
    "oncologist",
    "dermatologist",
    "psychiatrist",
    "pediatrician",
    "endocrinologist",
    "gastroenterologist",
    "surgeon",
    "orthopedist",
    "dentist",
];

/// Phrases that signal the user wants studies or papers
const RESEARCH_KEYWORDS: &[&str] = &[
    "research",
    "study",
    "studies",
    "paper",
    "papers",
    "arxiv",
    "clinical trial",
    "evidence",
    "meta-analysis",
    "systematic review",
];

/// Suffix appended to research queries before they hit the search adapter
pub const RESEARCH_QUALIFIER: &str = "research paper";

/// Symptom/organ vocabulary mapped to a specialty fragment.
///
/// Terms match whole words; a trailing `*` marks a stem that only has to
/// start a word (`diabet*` matches "diabetic"). The fragment is matched
/// against `DoctorRecord::specialty` with
/// [`crate::DoctorDirectory::find_doctor`].
const SPECIALTY_HINTS: &[(&[&str], &str)] = &[
    (
        &["cardio*", "heart", "chest pain", "blood pressure", "hypertension", "palpitation*"],
        "cardio",
    ),
    (
        &["endocrin*", "diabet*", "insulin", "thyroid", "hormone*", "blood sugar"],
        "endocrin",
    ),
    (
        &["oncolog*", "cancer*", "tumor*", "tumour*", "chemo*", "lump", "lumps"],
        "oncolog",
    ),
    (
        &["psychiatr*", "mental", "anxiety", "anxious", "depress*", "stress*", "insomnia", "panic"],
        "psychiatr",
    ),
    (&["neurolog*", "migraine*", "seizure*", "stroke", "numbness"], "neurolog"),
    (&["dermatolog*", "skin", "rash", "rashes", "acne", "eczema"], "dermatolog"),
    (&["pediatric*", "child", "children", "baby", "infant*", "toddler*"], "pediatric"),
    (
        &["gastro*", "stomach*", "digest*", "bowel*", "acid reflux", "heartburn"],
        "gastro",
    ),
    (&["orthoped*", "bone", "bones", "joint", "joints", "fracture*", "back pain"], "ortho"),
    (&["dentist*", "dental", "tooth", "teeth", "gum", "gums"], "dent"),
];

/// Which capabilities the dispatcher should run for a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Plan {
    /// Look up the doctor directory
    pub doctor: bool,
    /// Search for studies and papers
    pub research: bool,
}

impl Plan {
    /// Plain web-search augmentation runs only when no other capability was picked.
    pub fn web_search(&self) -> bool {
        !self.doctor && !self.research
    }

    /// Short label used in logs and metrics
    pub fn label(&self) -> &'static str {
        match (self.doctor, self.research) {
            (true, true) => "doctor+research",
            (true, false) => "doctor",
            (false, true) => "research",
            (false, false) => "general",
        }
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// True when the query asks for a doctor, specialist, or consultation.
pub fn needs_doctor_recommendation(query: &str) -> bool {
    contains_any(&query.to_lowercase(), DOCTOR_KEYWORDS)
}

/// True when the query references research, studies, or papers.
pub fn needs_research_lookup(query: &str) -> bool {
    contains_any(&query.to_lowercase(), RESEARCH_KEYWORDS)
}

/// Classify a query into a capability plan
pub fn classify(query: &str) -> Plan {
    Plan {
        doctor: needs_doctor_recommendation(query),
        research: needs_research_lookup(query),
    }
}

/// Build the search string for a research lookup
pub fn research_query(query: &str) -> String {
    format!("{} {}", query.trim(), RESEARCH_QUALIFIER)
}

/// Whether `term` occurs in `text` on word boundaries (start only for `stem*` terms)
fn matches_term(text: &str, term: &str) -> bool {
    let (needle, stem) = match term.strip_suffix('*') {
        Some(needle) => (needle, true),
        None => (term, false),
    };
    text.match_indices(needle).any(|(start, _)| {
        let starts_word = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let ends_word = stem
            || text[start + needle.len()..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric());
        starts_word && ends_word
    })
}

/// Specialty fragments suggested by the query's vocabulary, in table order.
pub fn specialty_hints(query: &str) -> Vec<&'static str> {
    let text = query.to_lowercase();
    SPECIALTY_HINTS
        .iter()
        .filter(|(terms, _)| terms.iter().any(|term| matches_term(&text, term)))
        .map(|(_, fragment)| *fragment)
        .collect()
}
