//! Interactive terminal front-end.
//!
//! Reads one command per line, drives the `WizardController` and prints the
//! current step with its inline errors. Suggestion requests run as spawned
//! tasks; their results come back over a channel so editing continues while
//! they are in flight.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::WizardConfig;
use crate::countries::{self, CountryDirectory, RestCountriesClient};
use crate::error::{self, WizardError};
use crate::form::{
    FamilyFinancialInfo, FamilyFinancialInfoPatch, FormStore, PersonalInfo, PersonalInfoPatch,
    SituationDescription, SituationDescriptionPatch, SituationField,
};
use crate::i18n::{Catalog, Locale, MessageKey};
use crate::notify::Notification;
use crate::phone;
use crate::store::{LibSqlStorage, StateStorage};
use crate::suggestions::{OpenAiGenerator, SuggestionAdapter, SuggestionOutcome};
use crate::validation::FieldErrors;
use crate::wizard::{MemoryNavigator, Route, StepOutcome, StepView, WizardController, WizardStep};

/// Storage key of the last visited path, used to resume after a restart.
pub const LOCATION_KEY: &str = "location";

const MAX_COUNTRY_LINES: usize = 30;

/// Shared services a session runs against.
#[derive(Clone)]
pub struct SessionDeps {
    pub store: Arc<FormStore>,
    pub storage: Arc<dyn StateStorage>,
    pub suggestions: Arc<SuggestionAdapter>,
    pub countries: Arc<CountryDirectory>,
    pub locale: Locale,
}

impl SessionDeps {
    /// Open the database and build the HTTP collaborators from `config`.
    /// Saved form state is not loaded here; see `FormStore::rehydrate`.
    pub async fn open(config: &WizardConfig) -> error::Result<Self> {
        let storage: Arc<dyn StateStorage> =
            Arc::new(LibSqlStorage::new_local(&config.db_path).await?);
        let store = FormStore::new();

        let generator = OpenAiGenerator::new(config.model.clone(), config.http_timeout)?;
        let suggestions = Arc::new(SuggestionAdapter::new(
            Arc::new(generator),
            config.openai_api_key.clone(),
            Arc::clone(&store),
        ));
        let countries = Arc::new(CountryDirectory::new(Arc::new(RestCountriesClient::new(
            config.countries_url.clone(),
            config.http_timeout,
        )?)));

        Ok(Self {
            store,
            storage,
            suggestions,
            countries,
            locale: config.locale,
        })
    }
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `field=value` on the current step.
    Set { field: String, value: String },
    Next,
    Back,
    Go(String),
    Show,
    Suggest(String),
    Regenerate(String),
    Accept(String),
    /// Replace the staged suggestion text before accepting it.
    Edit { field: String, text: String },
    Discard(String),
    Countries(Option<String>),
    Lang(String),
    Stats,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// `None` for blank lines.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        let arg = || rest.to_string();

        let command = match word.to_ascii_lowercase().as_str() {
            "next" | "submit" => Self::Next,
            "back" => Self::Back,
            "go" if !rest.is_empty() => Self::Go(arg()),
            "show" => Self::Show,
            "suggest" if !rest.is_empty() => Self::Suggest(arg()),
            "regen" | "regenerate" if !rest.is_empty() => Self::Regenerate(arg()),
            "accept" if !rest.is_empty() => Self::Accept(arg()),
            "edit" => match rest.split_once(char::is_whitespace) {
                Some((field, text)) if !text.trim().is_empty() => Self::Edit {
                    field: field.to_string(),
                    text: text.trim().to_string(),
                },
                _ => Self::Unknown(line.to_string()),
            },
            "discard" if !rest.is_empty() => Self::Discard(arg()),
            "countries" => Self::Countries((!rest.is_empty()).then(arg)),
            "lang" if !rest.is_empty() => Self::Lang(arg()),
            "stats" => Self::Stats,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "/quit" => Self::Quit,
            _ => match line.split_once('=') {
                Some((field, value)) if !field.trim().is_empty() => Self::Set {
                    field: field.trim().to_string(),
                    value: value.trim().to_string(),
                },
                _ => Self::Unknown(line.to_string()),
            },
        };
        Some(command)
    }
}

/// Output of one command.
#[derive(Debug, Default)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    fn extend(mut self, lines: Vec<String>) -> Self {
        self.lines.extend(lines);
        self
    }
}

/// A suggestion task finishing in the background.
#[derive(Debug)]
pub struct SuggestionEvent {
    pub field: SituationField,
    pub result: Result<SuggestionOutcome, WizardError>,
}

pub struct WizardSession {
    deps: SessionDeps,
    controller: WizardController,
    catalog: Catalog,
    errors: FieldErrors,
    events_tx: mpsc::UnboundedSender<SuggestionEvent>,
    events_rx: mpsc::UnboundedReceiver<SuggestionEvent>,
}

impl WizardSession {
    /// Build a session, resuming at the last saved location.
    pub async fn start(deps: SessionDeps) -> Self {
        let resumed = match deps.storage.load(LOCATION_KEY).await {
            Ok(Some(value)) => value.as_str().and_then(Route::parse),
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to load last location: {}", e);
                None
            }
        };
        let start = resumed.unwrap_or_default();
        let navigator = Arc::new(MemoryNavigator::new(start));
        let controller = WizardController::new(Arc::clone(&deps.store), navigator);
        if start.resolve() != start {
            controller.navigate(start);
        }
        debug!(route = %controller.current_route(), "Session started");

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            catalog: Catalog::new(deps.locale),
            deps,
            controller,
            errors: FieldErrors::default(),
            events_tx,
            events_rx,
        }
    }

    pub fn catalog(&self) -> Catalog {
        self.catalog
    }

    pub fn current_route(&self) -> Route {
        self.controller.current_route()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Read commands from stdin until `quit` or end of input.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        print_lines(&self.render().await);
        print_lines(&[help_text().to_string()]);

        loop {
            eprint!("> ");
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read from stdin")? else {
                        break;
                    };
                    let Some(command) = Command::parse(&line) else {
                        continue;
                    };
                    let reply = self.execute(command).await;
                    print_lines(&reply.lines);
                    if reply.quit {
                        break;
                    }
                }
                Some(event) = self.events_rx.recv() => {
                    eprintln!();
                    print_lines(&self.on_suggestion(event).await);
                }
            }
        }
        Ok(())
    }

    pub async fn execute(&mut self, command: Command) -> Reply {
        let reply = Reply::default();
        match command {
            Command::Set { field, value } => match self.set_field(&field, &value).await {
                Ok(shown) => reply.line(format!("  {field} = {shown}")),
                Err(e) => reply.line(Notification::error(e.to_string()).to_string()),
            },
            Command::Next => self.submit().await,
            Command::Back => match self.controller.back() {
                Some(route) => {
                    self.errors = FieldErrors::default();
                    self.save_location(route).await;
                    reply.extend(self.render().await)
                }
                None => reply.extend(self.render().await),
            },
            Command::Go(path) => match Route::parse(&path) {
                Some(route) => {
                    let landed = self.controller.navigate(route);
                    self.errors = FieldErrors::default();
                    self.save_location(landed).await;
                    reply.extend(self.render().await)
                }
                None => reply.line(format!(
                    "404 {}: {path}",
                    self.catalog.t(MessageKey::PageNotFound)
                )),
            },
            Command::Show => reply.extend(self.render().await),
            Command::Suggest(name) => {
                self.with_situation_field(&name, reply, |s, field| s.spawn_request(field))
                    .await
            }
            Command::Regenerate(name) => {
                self.with_situation_field(&name, reply, |s, field| s.spawn_regenerate(field))
                    .await
            }
            Command::Accept(name) => match SituationField::parse(&name) {
                Some(field) => match self.deps.suggestions.accept(field, &self.catalog).await {
                    Ok(notice) => reply
                        .line(notice.to_string())
                        .extend(self.render().await),
                    Err(e) => reply.line(Notification::error(e.to_string()).to_string()),
                },
                None => reply.line(unknown_situation_field(&name)),
            },
            Command::Edit { field: name, text } => match SituationField::parse(&name) {
                Some(field) => match self.deps.suggestions.edit(field, text).await {
                    Ok(()) => reply.line(format!("  ✏️ Suggestion for {field} updated")),
                    Err(e) => reply.line(Notification::error(e.to_string()).to_string()),
                },
                None => reply.line(unknown_situation_field(&name)),
            },
            Command::Discard(name) => match SituationField::parse(&name) {
                Some(field) => {
                    self.deps.suggestions.discard(field).await;
                    reply.line(
                        Notification::info(self.catalog.t(MessageKey::SuggestionDiscarded))
                            .to_string(),
                    )
                }
                None => reply.line(unknown_situation_field(&name)),
            },
            Command::Countries(query) => {
                let all = self.deps.countries.countries().await;
                let matches =
                    countries::search(&all, query.as_deref().unwrap_or(""), self.catalog.locale);
                let total = matches.len();
                let mut reply = reply;
                for c in matches.iter().take(MAX_COUNTRY_LINES) {
                    reply = reply.line(format!(
                        "  {} {}  {}",
                        c.flag,
                        c.code,
                        c.display_name(self.catalog.locale)
                    ));
                }
                if total > MAX_COUNTRY_LINES {
                    reply = reply.line(format!("  … {} more", total - MAX_COUNTRY_LINES));
                }
                reply
            }
            Command::Lang(tag) => match Locale::parse(&tag) {
                Some(locale) => {
                    self.catalog = Catalog::new(locale);
                    // Messages already rendered stay in the old language
                    self.errors = FieldErrors::default();
                    reply
                        .line(format!("  {} ({:?})", locale.label(), locale.direction()))
                        .extend(self.render().await)
                }
                None => reply.line(format!("  Unsupported language: {tag}")),
            },
            Command::Stats => {
                let stats = self.deps.store.snapshot().await.completion();
                reply
                    .line(format!(
                        "  Step 1: {}/{}",
                        stats.personal.completed, stats.personal.total
                    ))
                    .line(format!(
                        "  Step 2: {}/{}",
                        stats.family.completed, stats.family.total
                    ))
                    .line(format!(
                        "  Step 3: {}/{}",
                        stats.situation.completed, stats.situation.total
                    ))
                    .line(format!(
                        "  Overall: {}/{} ({}%)",
                        stats.overall.completed, stats.overall.total, stats.percentage
                    ))
            }
            Command::Help => reply.line(help_text()),
            Command::Quit => Reply {
                quit: true,
                ..reply
            },
            Command::Unknown(line) => reply.line(format!("  Unknown command: {line} (try 'help')")),
        }
    }

    /// Apply a background suggestion result.
    pub async fn on_suggestion(&mut self, event: SuggestionEvent) -> Vec<String> {
        let field = event.field;
        match event.result {
            Ok(SuggestionOutcome::Staged { text, notification }) => {
                let mut lines = Vec::new();
                if let Some(n) = notification {
                    lines.push(n.to_string());
                }
                lines.push(format!("  ✨ Suggestion for {field}:"));
                lines.push(format!("     {text}"));
                lines.push(format!(
                    "  'accept {field}', 'edit {field} <text>', 'regen {field}' or 'discard {field}'"
                ));
                lines
            }
            Ok(SuggestionOutcome::Busy) => {
                vec![format!("  ⏳ A suggestion for {field} is already in progress")]
            }
            Ok(SuggestionOutcome::Superseded) => Vec::new(),
            Ok(SuggestionOutcome::Failed(notice)) => vec![notice.to_string()],
            Err(e) => vec![Notification::error(e.to_string()).to_string()],
        }
    }

    /// Wait for the next background suggestion result.
    pub async fn next_suggestion_event(&mut self) -> Option<SuggestionEvent> {
        self.events_rx.recv().await
    }

    async fn set_field(&mut self, field: &str, value: &str) -> Result<String, WizardError> {
        if self.controller.current_step() == WizardStep::Idle {
            self.controller.navigate(Route::Home);
        }
        let store = &self.deps.store;
        let shown = match self.controller.current_step() {
            WizardStep::Step1 => {
                let stored = if field == "phone" {
                    phone::to_canonical(value)
                } else {
                    value.to_string()
                };
                let patch = PersonalInfoPatch::default().with_field(field, stored.clone())?;
                store.update_personal_info(patch).await;
                if field == "phone" {
                    phone::format(&stored)
                } else {
                    stored
                }
            }
            WizardStep::Step2 => {
                let patch = FamilyFinancialInfoPatch::default().with_field(field, value)?;
                store.update_family_financial(patch).await;
                value.to_string()
            }
            WizardStep::Step3 => {
                let patch = SituationDescriptionPatch::default().with_field(field, value)?;
                store.update_situation_description(patch).await;
                if let Some(situation_field) = SituationField::parse(field) {
                    self.deps.suggestions.invalidate(situation_field).await;
                }
                value.to_string()
            }
            WizardStep::Idle => return Err(WizardError::UnknownRoute(Route::Home.to_string())),
        };
        debug!(field, "Field edited");
        Ok(shown)
    }

    async fn submit(&mut self) -> Reply {
        let reply = Reply::default();
        match self.controller.submit_current(&self.catalog).await {
            StepOutcome::Advanced(route) => {
                self.errors = FieldErrors::default();
                self.save_location(route).await;
                reply.extend(self.render().await)
            }
            StepOutcome::Rejected(errors) => {
                self.errors = errors;
                reply.extend(self.render().await)
            }
            StepOutcome::Submitted { notification, .. } => {
                self.errors = FieldErrors::default();
                self.deps.suggestions.reset().await;
                self.save_location(self.controller.current_route()).await;
                reply
                    .line(notification.to_string())
                    .extend(self.render().await)
            }
        }
    }

    async fn with_situation_field(
        &self,
        name: &str,
        reply: Reply,
        start: impl FnOnce(&Self, SituationField),
    ) -> Reply {
        if self.controller.current_step() != WizardStep::Step3 {
            return reply.line(format!(
                "  Suggestions are available on {}",
                self.catalog.t(MessageKey::Step3Title)
            ));
        }
        match SituationField::parse(name) {
            Some(field) => {
                start(self, field);
                reply.line(format!("  ⏳ Generating a suggestion for {field}..."))
            }
            None => reply.line(unknown_situation_field(name)),
        }
    }

    fn spawn_request(&self, field: SituationField) {
        let adapter = Arc::clone(&self.deps.suggestions);
        let store = Arc::clone(&self.deps.store);
        let tx = self.events_tx.clone();
        let catalog = self.catalog;
        tokio::spawn(async move {
            let current = store.situation_description().await;
            let outcome = adapter
                .request(field, field.value_in(&current), &catalog)
                .await;
            let _ = tx.send(SuggestionEvent {
                field,
                result: Ok(outcome),
            });
        });
    }

    fn spawn_regenerate(&self, field: SituationField) {
        let adapter = Arc::clone(&self.deps.suggestions);
        let tx = self.events_tx.clone();
        let catalog = self.catalog;
        tokio::spawn(async move {
            let result = adapter.regenerate(field, &catalog).await;
            let _ = tx.send(SuggestionEvent { field, result });
        });
    }

    async fn save_location(&self, route: Route) {
        let value = serde_json::Value::String(route.path().to_string());
        if let Err(e) = self.deps.storage.save(LOCATION_KEY, &value).await {
            warn!("Failed to save location: {}", e);
        }
    }

    /// The current step, its values and any inline errors.
    pub async fn render(&self) -> Vec<String> {
        let step = self.controller.current_step();
        let mut lines = Vec::new();
        if let Some(key) = step.title_key() {
            lines.push(format!("── {} ──", self.catalog.t(key)));
        }
        let fields: Vec<(&'static str, String)> = match self.controller.view().await {
            StepView::Idle => Vec::new(),
            StepView::PersonalInfo(record) => personal_rows(&record),
            StepView::FamilyFinancial(record) => family_rows(&record),
            StepView::SituationDescription(record) => situation_rows(&record),
        };
        for (name, value) in fields {
            let shown = if value.is_empty() { "—".to_string() } else { value };
            lines.push(format!("  {name}: {shown}"));
            if let Some(error) = self.errors.get(name) {
                lines.push(format!("     ⚠ {error}"));
            }
        }
        lines
    }
}

fn personal_rows(record: &PersonalInfo) -> Vec<(&'static str, String)> {
    PersonalInfo::FIELDS
        .iter()
        .map(|&name| {
            let value = record.get(name).unwrap_or_default();
            let shown = match name {
                "phone" if !value.is_empty() => {
                    format!("+{} {}", phone::COUNTRY_CODE, phone::format(phone::local_part(value)))
                }
                "phone" => format!("(e.g. {})", phone::EXAMPLE),
                _ => value.to_string(),
            };
            (name, shown)
        })
        .collect()
}

fn family_rows(record: &FamilyFinancialInfo) -> Vec<(&'static str, String)> {
    FamilyFinancialInfo::FIELDS
        .iter()
        .map(|&name| (name, record.get(name).unwrap_or_default().to_string()))
        .collect()
}

fn situation_rows(record: &SituationDescription) -> Vec<(&'static str, String)> {
    SituationDescription::FIELDS
        .iter()
        .map(|&name| (name, record.get(name).unwrap_or_default().to_string()))
        .collect()
}

fn unknown_situation_field(name: &str) -> String {
    let known: Vec<&str> = SituationField::ALL.iter().map(|f| f.key()).collect();
    format!("  Unknown field '{name}', expected one of: {}", known.join(", "))
}

fn help_text() -> &'static str {
    "\
Commands:
  field=value            set a field on the current step
  next | back            submit this step / go back
  go /step1|/step2|/step3
  suggest <field>        AI suggestion for a step 3 field
  regen|accept|discard <field>
  edit <field> <text>    revise a suggestion before accepting
  countries [query]      list or search countries
  lang en|ar             switch language
  stats | show | help | quit"
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countries::{CountryOption, CountryProvider};
    use crate::error::TransportError;
    use crate::store::LibSqlStorage;
    use crate::suggestions::TextGenerator;
    use async_trait::async_trait;
    use secrecy::SecretString;

    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(
            &self,
            _prompt: &str,
            _api_key: &SecretString,
        ) -> Result<Option<String>, TransportError> {
            Ok(Some("I lost my job and need help with rent".into()))
        }
    }

    struct OfflineCountries;

    #[async_trait]
    impl CountryProvider for OfflineCountries {
        async fn fetch(&self) -> Result<Vec<CountryOption>, TransportError> {
            Err(TransportError::Unknown("offline".into()))
        }
    }

    async fn deps() -> SessionDeps {
        let store = FormStore::new();
        let storage: Arc<dyn StateStorage> = Arc::new(LibSqlStorage::new_memory().await.unwrap());
        let suggestions = Arc::new(SuggestionAdapter::new(
            Arc::new(EchoGenerator),
            Some(SecretString::from("sk-test")),
            Arc::clone(&store),
        ));
        SessionDeps {
            store,
            storage,
            suggestions,
            countries: Arc::new(CountryDirectory::new(Arc::new(OfflineCountries))),
            locale: Locale::En,
        }
    }

    async fn run(session: &mut WizardSession, line: &str) -> Reply {
        session.execute(Command::parse(line).unwrap()).await
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("   "), None);
        assert_eq!(
            Command::parse("name = Fatima Ali"),
            Some(Command::Set {
                field: "name".into(),
                value: "Fatima Ali".into()
            })
        );
        assert_eq!(Command::parse("NEXT"), Some(Command::Next));
        assert_eq!(Command::parse("go /step2"), Some(Command::Go("/step2".into())));
        assert_eq!(Command::parse("countries"), Some(Command::Countries(None)));
        assert_eq!(
            Command::parse("countries arab emirates"),
            Some(Command::Countries(Some("arab emirates".into())))
        );
        assert_eq!(Command::parse("go"), Some(Command::Unknown("go".into())));
    }

    #[tokio::test]
    async fn starts_on_step_one_and_resumes_saved_location() {
        let deps = deps().await;
        let mut session = WizardSession::start(deps.clone()).await;
        assert_eq!(session.current_route(), Route::PersonalInfo);

        run(&mut session, "go /step3").await;
        let resumed = WizardSession::start(deps).await;
        assert_eq!(resumed.current_route(), Route::SituationDescription);
    }

    #[tokio::test]
    async fn phone_is_stored_canonical_and_shown_formatted() {
        let deps = deps().await;
        let mut session = WizardSession::start(deps.clone()).await;

        let reply = run(&mut session, "phone=056 673 6236").await;
        assert_eq!(reply.lines, vec!["  phone = 56 673 6236".to_string()]);
        assert_eq!(deps.store.personal_info().await.phone, "971566736236");
    }

    #[tokio::test]
    async fn rejected_submit_shows_inline_errors() {
        let deps = deps().await;
        let mut session = WizardSession::start(deps).await;

        let reply = run(&mut session, "next").await;
        assert_eq!(session.current_route(), Route::PersonalInfo);
        assert!(reply.lines.iter().any(|l| l.contains("⚠ Name is required")));
        assert!(session.errors().contains("email"));
    }

    #[tokio::test]
    async fn unknown_field_and_path_are_reported() {
        let mut session = WizardSession::start(deps().await).await;
        let reply = run(&mut session, "shoeSize=42").await;
        assert!(reply.lines[0].contains("shoeSize"));

        let reply = run(&mut session, "go /step9").await;
        assert!(reply.lines[0].starts_with("404"));
        assert_eq!(session.current_route(), Route::PersonalInfo);
    }

    #[tokio::test]
    async fn suggestion_round_trip_through_channel() {
        let deps = deps().await;
        let mut session = WizardSession::start(deps.clone()).await;
        run(&mut session, "go /step3").await;

        let reply = run(&mut session, "suggest reasonForApplying").await;
        assert!(reply.lines[0].contains("Generating"));

        let event = session.next_suggestion_event().await.unwrap();
        let lines = session.on_suggestion(event).await;
        assert!(lines.iter().any(|l| l.contains("I lost my job")));

        let reply = run(&mut session, "accept reasonForApplying").await;
        assert_eq!(reply.lines[0], "✅ Suggestion accepted");
        assert_eq!(
            deps.store.situation_description().await.reason_for_applying,
            "I lost my job and need help with rent"
        );
    }

    #[tokio::test]
    async fn suggestions_only_on_step_three() {
        let mut session = WizardSession::start(deps().await).await;
        let reply = run(&mut session, "suggest reasonForApplying").await;
        assert!(reply.lines[0].contains("Step 3"));
    }

    #[tokio::test]
    async fn countries_fall_back_offline() {
        let mut session = WizardSession::start(deps().await).await;
        let reply = run(&mut session, "countries emirates").await;
        assert_eq!(reply.lines.len(), 1);
        assert!(reply.lines[0].contains("AE"));
    }

    #[tokio::test]
    async fn language_switch_changes_messages() {
        let mut session = WizardSession::start(deps().await).await;
        run(&mut session, "lang ar").await;
        assert_eq!(session.catalog().locale, Locale::Ar);
        let reply = run(&mut session, "next").await;
        assert!(reply.lines.iter().any(|l| l.contains("الاسم مطلوب")));
    }

    #[tokio::test]
    async fn stats_and_quit() {
        let mut session = WizardSession::start(deps().await).await;
        run(&mut session, "city=Dubai").await;
        let reply = run(&mut session, "stats").await;
        assert_eq!(reply.lines[0], "  Step 1: 1/10");
        assert!(reply.lines[3].ends_with("(6%)"));
        assert!(run(&mut session, "quit").await.quit);
    }

    #[test]
    fn parses_edit_with_free_text() {
        assert_eq!(
            Command::parse("edit reasonForApplying  My own words, please"),
            Some(Command::Edit {
                field: "reasonForApplying".into(),
                text: "My own words, please".into()
            })
        );
        assert_eq!(
            Command::parse("edit reasonForApplying"),
            Some(Command::Unknown("edit reasonForApplying".into()))
        );
    }

    #[tokio::test]
    async fn edited_suggestion_is_accepted_as_revised() {
        let deps = deps().await;
        let mut session = WizardSession::start(deps.clone()).await;
        run(&mut session, "go /step3").await;

        run(&mut session, "suggest reasonForApplying").await;
        let event = session.next_suggestion_event().await.unwrap();
        session.on_suggestion(event).await;

        let reply = run(&mut session, "edit reasonForApplying I lost my job in March").await;
        assert!(reply.lines[0].contains("updated"));
        run(&mut session, "accept reasonForApplying").await;
        assert_eq!(
            deps.store.situation_description().await.reason_for_applying,
            "I lost my job in March"
        );
    }

    #[tokio::test]
    async fn retyping_a_field_drops_its_staged_suggestion() {
        let deps = deps().await;
        let mut session = WizardSession::start(deps.clone()).await;
        run(&mut session, "go /step3").await;

        run(&mut session, "suggest employmentCircumstances").await;
        let event = session.next_suggestion_event().await.unwrap();
        session.on_suggestion(event).await;
        let field = SituationField::EmploymentCircumstances;
        assert!(deps.suggestions.staged(field).await.is_some());

        run(&mut session, "employmentCircumstances=Laid off after 10 years").await;
        assert_eq!(deps.suggestions.staged(field).await, None);

        let reply = run(&mut session, "accept employmentCircumstances").await;
        assert!(reply.lines[0].starts_with("❌"));
        assert_eq!(
            deps.store.situation_description().await.employment_circumstances,
            "Laid off after 10 years"
        );
    }

    #[tokio::test]
    async fn open_builds_services_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = WizardConfig {
            db_path: dir.path().join("nested").join("wizard.db"),
            locale: Locale::Ar,
            ..Default::default()
        };

        let deps = SessionDeps::open(&config).await.unwrap();
        assert_eq!(deps.locale, Locale::Ar);
        assert!(!deps.suggestions.is_configured());
        assert!(config.db_path.exists());
    }

    #[tokio::test]
    async fn open_reports_unusable_database_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = WizardConfig {
            db_path: file.path().join("wizard.db"),
            ..Default::default()
        };

        let err = SessionDeps::open(&config).await.err().unwrap();
        assert!(matches!(err, error::Error::Storage(_)));
    }
}
