//! HealthBuddy dispatcher: decides which capabilities answer a query
//! and assembles the final text.

use chrono::Datelike;
use healthbuddy_core::{
    DoctorDirectory, DoctorRecord, Snippet, compose_answer,
    intent::{self, Plan},
};
use std::sync::Arc;

use super::adapter::{LlmAdapter, SearchAdapter};

/// Returned for blank input instead of calling any capability
pub const EMPTY_QUERY_REPLY: &str =
    "Please ask me a health question, for example \"What are the symptoms of diabetes?\"";

fn system_prompt(year: i32) -> String {
    format!(
        r#"You are HealthBuddy, an AI healthcare assistant that researches medical symptoms and recommends relevant doctors.
The current year is {year}; assume it whenever no other date is mentioned.

Guidelines:
- Answer using the search results and directory entries provided with the question when they are relevant.
- Cite source links, or paper titles and publication dates, for any facts taken from search results.
- If doctors are listed, recommend only those doctors, present their details clearly, and suggest booking an appointment by email. Never invent doctors.
- Keep answers clear and well structured, and remind the user to seek professional care for serious or urgent symptoms.
- Politely decline questions that are not about medical or healthcare topics."#
    )
}

/// Explicit context for answering questions.
///
/// Owns the adapters and the doctor directory so separate instances stay
/// fully isolated from each other.
#[derive(Clone)]
pub struct HealthBuddy {
    llm: Arc<dyn LlmAdapter>,
    search: Arc<dyn SearchAdapter>,
    directory: Arc<DoctorDirectory>,
}

impl HealthBuddy {
    pub fn new(
        llm: Arc<dyn LlmAdapter>,
        search: Arc<dyn SearchAdapter>,
        directory: DoctorDirectory,
    ) -> Self {
        Self {
            llm,
            search,
            directory: Arc::new(directory),
        }
    }

    pub fn directory(&self) -> &DoctorDirectory {
        &self.directory
    }

    /// Append a doctor to the directory and return a confirmation message.
    pub fn add_new_doctor(
        &self,
        name: &str,
        specialty: &str,
        hours: &str,
        location: &str,
        contact: &str,
    ) -> String {
        let message = self
            .directory
            .add_new_doctor(name, specialty, hours, location, contact);
        tracing::info!(name = %name, specialty = %specialty, "Added doctor");
        message
    }

    /// Doctors whose specialty contains `specialty`, ignoring case
    pub fn find_doctor(&self, specialty: &str) -> Vec<DoctorRecord> {
        self.directory.find_doctor(specialty)
    }

    /// Every doctor in the directory
    pub fn doctors(&self) -> Vec<DoctorRecord> {
        self.directory.all()
    }

    /// Answer a health question.
    ///
    /// Runs directory lookup and/or search according to the query's plan,
    /// then asks the LLM to write the answer from what was gathered. Adapter
    /// failures degrade the answer but never empty it.
    pub async fn ask_healthbuddy(&self, query: &str) -> String {
        let query = query.trim();
        if query.is_empty() {
            return EMPTY_QUERY_REPLY.to_string();
        }

        let plan = intent::classify(query);
        tracing::info!(query = %query, route = plan.label(), "Handling query");
        metrics::counter!("healthbuddy_queries_total", "route" => plan.label()).increment(1);

        let doctors = if plan.doctor {
            let picked = self.directory.recommend(query);
            tracing::debug!(matches = picked.len(), "Directory lookup");
            picked
        } else {
            Vec::new()
        };

        let (snippets, degraded) = match search_string(query, plan) {
            Some(search_query) => match self.search.search(&search_query).await {
                Ok(snippets) => {
                    tracing::info!(results = snippets.len(), "Search succeeded");
                    (snippets, false)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Search failed, answering without retrieved context");
                    metrics::counter!("healthbuddy_adapter_failures_total", "adapter" => "search")
                        .increment(1);
                    (Vec::new(), true)
                }
            },
            None => (Vec::new(), false),
        };

        let prompt = system_prompt(chrono::Utc::now().year());
        let user_message = build_user_message(query, &snippets, &doctors);

        let llm_output = match self.llm.complete(Some(&prompt), &user_message).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::error!(error = %e, "LLM call failed, composing from retrieved context");
                metrics::counter!("healthbuddy_adapter_failures_total", "adapter" => "llm")
                    .increment(1);
                None
            }
        };

        compose_answer(llm_output.as_deref(), &snippets, &doctors, degraded)
    }
}

/// The string sent to the search adapter, if the plan calls for one
fn search_string(query: &str, plan: Plan) -> Option<String> {
    if plan.research {
        Some(intent::research_query(query))
    } else if plan.web_search() {
        Some(query.to_string())
    } else {
        None
    }
}

/// Question plus gathered context, as handed to the LLM
fn build_user_message(query: &str, snippets: &[Snippet], doctors: &[DoctorRecord]) -> String {
    let mut message = format!("Question: {query}");

    if !snippets.is_empty() {
        let rendered: Vec<String> = snippets.iter().map(Snippet::render).collect();
        message.push_str("\n\nSearch results:\n\n");
        message.push_str(&rendered.join("\n\n"));
    }

    if !doctors.is_empty() {
        let lines: Vec<String> = doctors
            .iter()
            .map(|doctor| format!("- {}", doctor.summary()))
            .collect();
        message.push_str("\n\nAvailable doctors from the directory:\n");
        message.push_str(&lines.join("\n"));
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use healthbuddy_core::{
        AdapterError,
        compose::{APOLOGY, REDUCED_CONFIDENCE_NOTE, SPECIALISTS_HEADING},
    };
    use std::sync::Mutex;

    /// Records every user message and replies with a fixed answer
    #[derive(Default)]
    struct FakeLlm {
        fail: bool,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmAdapter for FakeLlm {
        async fn complete(
            &self,
            _system: Option<&str>,
            user_message: &str,
        ) -> Result<String, AdapterError> {
            self.seen.lock().unwrap().push(user_message.to_string());
            if self.fail {
                Err(AdapterError::Http("connection refused".to_string()))
            } else {
                Ok("Common symptoms include thirst and fatigue.".to_string())
            }
        }
    }

    #[derive(Default)]
    struct FakeSearch {
        fail: bool,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SearchAdapter for FakeSearch {
        async fn search(&self, query: &str) -> Result<Vec<Snippet>, AdapterError> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail {
                return Err(AdapterError::MissingCredential("Tavily"));
            }
            Ok(vec![Snippet::new(
                "Diabetes overview",
                "https://example.org/diabetes",
                "Increased thirst, frequent urination, fatigue.",
            )])
        }
    }

    fn buddy(llm: Arc<FakeLlm>, search: Arc<FakeSearch>) -> HealthBuddy {
        HealthBuddy::new(llm, search, DoctorDirectory::with_defaults())
    }

    #[tokio::test]
    async fn general_question_searches_then_asks_llm() {
        let llm = Arc::new(FakeLlm::default());
        let search = Arc::new(FakeSearch::default());
        let answer = buddy(llm.clone(), search.clone())
            .ask_healthbuddy("What are diabetes symptoms?")
            .await;

        assert!(answer.starts_with("Common symptoms include"));
        assert!(answer.contains("Sources:\n- Diabetes overview"));
        assert_eq!(
            search.queries.lock().unwrap().as_slice(),
            ["What are diabetes symptoms?"]
        );
        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("Increased thirst"));
    }

    #[tokio::test]
    async fn research_question_appends_qualifier() {
        let search = Arc::new(FakeSearch::default());
        buddy(Arc::new(FakeLlm::default()), search.clone())
            .ask_healthbuddy("Any studies on intermittent fasting?")
            .await;

        assert_eq!(
            search.queries.lock().unwrap().as_slice(),
            ["Any studies on intermittent fasting? research paper"]
        );
    }

    #[tokio::test]
    async fn doctor_request_uses_directory_without_search() {
        let llm = Arc::new(FakeLlm::default());
        let search = Arc::new(FakeSearch::default());
        let answer = buddy(llm.clone(), search.clone())
            .ask_healthbuddy("I have chest pain, can you recommend a doctor?")
            .await;

        assert!(answer.starts_with(SPECIALISTS_HEADING));
        assert!(answer.contains("Dr. Don Blake"));
        assert!(search.queries.lock().unwrap().is_empty());
        assert!(llm.seen.lock().unwrap()[0].contains("Dr. Don Blake"));
    }

    #[tokio::test]
    async fn mixed_query_uses_directory_and_research_search() {
        let llm = Arc::new(FakeLlm::default());
        let search = Arc::new(FakeSearch::default());
        let answer = buddy(llm.clone(), search.clone())
            .ask_healthbuddy("Is there research on palpitations, and which cardiologist should I see?")
            .await;

        assert_eq!(
            search.queries.lock().unwrap().as_slice(),
            ["Is there research on palpitations, and which cardiologist should I see? research paper"]
        );
        assert!(answer.starts_with(&format!("{SPECIALISTS_HEADING}\n- Dr. Don Blake")));
        assert!(answer.contains("Sources:\n- Diabetes overview"));

        let seen = llm.seen.lock().unwrap();
        assert!(seen[0].contains("Search results:"));
        assert!(seen[0].contains("Available doctors from the directory:\n- Dr. Don Blake"));
    }

    #[tokio::test]
    async fn search_failure_degrades_to_llm_only() {
        let llm = Arc::new(FakeLlm::default());
        let search = Arc::new(FakeSearch {
            fail: true,
            ..Default::default()
        });
        let answer = buddy(llm.clone(), search)
            .ask_healthbuddy("What are diabetes symptoms?")
            .await;

        assert!(!answer.is_empty());
        assert!(answer.starts_with("Common symptoms include"));
        assert!(answer.ends_with(REDUCED_CONFIDENCE_NOTE));
        assert!(!llm.seen.lock().unwrap()[0].contains("Search results"));
    }

    #[tokio::test]
    async fn every_adapter_failing_still_answers() {
        let llm = Arc::new(FakeLlm {
            fail: true,
            ..Default::default()
        });
        let search = Arc::new(FakeSearch {
            fail: true,
            ..Default::default()
        });
        let answer = buddy(llm, search).ask_healthbuddy("Is coffee bad for me?").await;

        assert!(answer.starts_with(APOLOGY));
        assert!(answer.ends_with(REDUCED_CONFIDENCE_NOTE));
    }

    #[tokio::test]
    async fn blank_query_gets_prompt() {
        let llm = Arc::new(FakeLlm::default());
        let answer = buddy(llm.clone(), Arc::new(FakeSearch::default()))
            .ask_healthbuddy("   ")
            .await;
        assert_eq!(answer, EMPTY_QUERY_REPLY);
        assert!(llm.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn added_doctor_is_recommended() {
        let hb = HealthBuddy::new(
            Arc::new(FakeLlm {
                fail: true,
                ..Default::default()
            }),
            Arc::new(FakeSearch::default()),
            DoctorDirectory::new(),
        );
        hb.add_new_doctor("Dr. Lee", "Cardiology", "9-5", "Clinic A", "lee@x.com");

        let found = hb.find_doctor("cardio");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Dr. Lee");

        let answer = hb
            .ask_healthbuddy("Which cardiologist can I book an appointment with?")
            .await;
        assert!(answer.starts_with(SPECIALISTS_HEADING));
        assert!(answer.contains("Dr. Lee (Cardiology)"));
    }

    #[test]
    fn system_prompt_mentions_year() {
        assert!(system_prompt(2026).contains("The current year is 2026"));
    }
}
